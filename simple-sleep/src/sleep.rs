// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Sleep at various depths

use log::debug;
use log::warn;

use embedded_hal::delay::DelayNs;

use crate::calibration::measure;
use crate::calibration::Calibration;
use crate::chip::Chip;
use crate::clock::ElapsedClock;
use crate::clock::NoClock;
use crate::controller::LowPowerController;
use crate::controller::SleepMode;
use crate::controller::SleepOptions;
use crate::driver::sleep_with_clock;
use crate::driver::sleep_with_watchdog;
use crate::driver::SleepReport;
use crate::snapshot::RegisterSnapshot;
use crate::wake::WakeSignal;
use crate::Config;
use crate::Error;

/// Low-power sleep for a chip
///
/// * [`forever`](Self::forever): power down with interrupts off, only a reset
///   wakes the chip.
/// * [`deeply`](Self::deeply): power down, ADC and peripherals off.
/// * [`lightly`](Self::lightly): extended standby or ADC noise reduction,
///   ADC off.
/// * [`idle`](Self::idle): CPU stopped, timers and the ADC keep running.
///
/// The untimed forms return at the first interrupt of any kind.  The `_for`
/// forms sleep for approximately the requested milliseconds, like a
/// low-power `delay()`.
pub struct Sleep<'a, C, D, T = NoClock>
where
    C: LowPowerController,
    D: DelayNs,
    T: ElapsedClock,
{
    /// Hardware access
    controller: C,

    /// Busy delay for the part of a duration below the watchdog floor
    delay: D,

    /// Elapsed-time clock
    clock: Option<T>,

    /// Signal raised by the watchdog interrupt
    wake: &'a WakeSignal,

    /// Configuration
    config: Config,
}

impl<'a, C, D> Sleep<'a, C, D, NoClock>
where
    C: LowPowerController,
    D: DelayNs,
{
    /// Create a sleep without an elapsed-time clock
    ///
    /// Calibration records are always the identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the chip's watchdog cannot raise an interrupt, since
    /// timed sleeps would then need a clock.
    pub fn new(
        config: Config,
        controller: C,
        delay: D,
        wake: &'a WakeSignal,
    ) -> Result<Self, Error> {
        if !config.chip.has_watchdog_interrupt() {
            return Err(Error::MissingTimeSource);
        }

        Ok(Self {
            controller,
            delay,
            clock: None,
            wake,
            config,
        })
    }
}

impl<'a, C, D, T> Sleep<'a, C, D, T>
where
    C: LowPowerController,
    D: DelayNs,
    T: ElapsedClock,
{
    /// Create a sleep with an elapsed-time clock
    pub fn with_clock(
        config: Config,
        controller: C,
        delay: D,
        clock: T,
        wake: &'a WakeSignal,
    ) -> Self {
        Self {
            controller,
            delay,
            clock: Some(clock),
            wake,
            config,
        }
    }

    /// Return the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Release the inner hardware
    pub fn release(self) -> (C, D, Option<T>) {
        (self.controller, self.delay, self.clock)
    }

    /// Sleep until reset
    ///
    /// The ADC and every peripheral are turned off, and interrupts are
    /// disabled.
    pub fn forever(&mut self) -> ! {
        debug!("Sleep forever");

        let chip = self.config.chip;
        let options = self.options(SleepOptions::HALT);

        self.controller.disable_adc();
        for &(register, mask) in chip.power_reduction() {
            self.controller.set_register_bits(register, mask);
        }

        loop {
            self.controller.enter(SleepMode::PowerDown, options);
        }
    }

    /// Sleep deeply until an interrupt
    pub fn deeply(&mut self) {
        self.deeply_for(0);
    }

    /// Sleep deeply for approximately `millis`
    ///
    /// Zero sleeps until an interrupt.  The ADC and peripherals are turned off
    /// and restored on return.
    pub fn deeply_for(&mut self, millis: u32) -> SleepReport {
        debug!("Sleep deeply for {millis} ms");

        let chip = self.config.chip;
        let options = self.options(SleepOptions::LOW_POWER);

        let mut controller =
            RegisterSnapshot::take(&mut self.controller, chip.deep_sleep_registers());
        controller.disable_adc();
        for &(register, mask) in chip.power_reduction() {
            controller.set_register_bits(register, mask);
        }

        if millis == 0 {
            controller.enter(SleepMode::PowerDown, options);
            return SleepReport::untimed();
        }

        // The busy delay between watchdog periods needs timer0
        if let Some(bit) = chip.timer0_power_bit() {
            controller.clear_register_bits(bit.register, bit.mask);
        }

        timed_sleep(
            &mut *controller,
            &mut self.delay,
            self.clock.as_ref(),
            self.wake,
            chip,
            millis,
            SleepMode::PowerDown,
            options,
        )
    }

    /// Sleep deeply for approximately `millis` corrected by `calibration`
    pub fn deeply_for_calibrated(&mut self, millis: u32, calibration: &Calibration) -> SleepReport {
        match calibrate(millis, *calibration) {
            Some(millis) => self.deeply_for(millis),
            None => SleepReport::untimed(),
        }
    }

    /// Sleep lightly until an interrupt
    pub fn lightly(&mut self) {
        self.lightly_for(0);
    }

    /// Sleep lightly for approximately `millis`
    ///
    /// Zero sleeps until an interrupt.  The ADC is turned off and restored on
    /// return.
    pub fn lightly_for(&mut self, millis: u32) -> SleepReport {
        debug!("Sleep lightly for {millis} ms");

        let chip = self.config.chip;
        let mode = chip.light_sleep_mode();
        let options = self.options(SleepOptions::LOW_POWER);

        let mut controller =
            RegisterSnapshot::take(&mut self.controller, chip.light_sleep_registers());
        controller.disable_adc();

        if millis == 0 {
            controller.enter(mode, options);
            return SleepReport::untimed();
        }

        timed_sleep(
            &mut *controller,
            &mut self.delay,
            self.clock.as_ref(),
            self.wake,
            chip,
            millis,
            mode,
            options,
        )
    }

    /// Sleep lightly for approximately `millis` corrected by `calibration`
    pub fn lightly_for_calibrated(
        &mut self,
        millis: u32,
        calibration: &Calibration,
    ) -> SleepReport {
        match calibrate(millis, *calibration) {
            Some(millis) => self.lightly_for(millis),
            None => SleepReport::untimed(),
        }
    }

    /// Idle until an interrupt
    pub fn idle(&mut self) {
        self.idle_for(0);
    }

    /// Idle for approximately `millis`
    ///
    /// Zero idles until an interrupt.  The elapsed-time clock keeps running.
    pub fn idle_for(&mut self, millis: u32) -> SleepReport {
        debug!("Idle for {millis} ms");

        let options = self.options(SleepOptions::IDLE);

        if millis == 0 {
            self.controller.enter(SleepMode::Idle, options);
            return SleepReport::untimed();
        }

        timed_sleep(
            &mut self.controller,
            &mut self.delay,
            self.clock.as_ref(),
            self.wake,
            self.config.chip,
            millis,
            SleepMode::Idle,
            options,
        )
    }

    /// Idle for approximately `millis` corrected by `calibration`
    pub fn idle_for_calibrated(&mut self, millis: u32, calibration: &Calibration) -> SleepReport {
        match calibrate(millis, *calibration) {
            Some(millis) => self.idle_for(millis),
            None => SleepReport::untimed(),
        }
    }

    /// Measure a calibration record
    ///
    /// This idles for the reference durations, so it takes a little more than
    /// 265 ms and saves no power.  Without a clock, or with calibration
    /// disabled, the identity is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the measurements do not make a valid record.
    pub fn calibration(&mut self) -> Result<Calibration, Error> {
        let kind = self.config.calibration;
        measure(kind, |millis| self.observe_idle(millis))
    }

    /// Idle for `millis` and return the time measured on the clock
    fn observe_idle(&mut self, millis: u32) -> Option<u32> {
        let start = self.clock.as_ref()?.now_ms();
        self.idle_for(millis);
        let observed = self.clock.as_ref()?.elapsed_since(start);
        Some(observed)
    }

    /// Adjust options to what the chip supports
    fn options(&self, options: SleepOptions) -> SleepOptions {
        if self.config.chip.can_disable_brown_out() {
            options
        } else {
            SleepOptions {
                brown_out_detection: true,
                ..options
            }
        }
    }
}

/// Adjust a duration by a calibration
///
/// Zero stays zero, meaning an untimed sleep.  Returns `None` when a positive
/// duration is adjusted down to nothing.
fn calibrate(millis: u32, calibration: Calibration) -> Option<u32> {
    let adjusted = calibration.apply(millis);
    if millis > 0 && adjusted == 0 {
        debug!("Calibrated {millis} ms down to nothing");
        None
    } else {
        Some(adjusted)
    }
}

/// Sleep for `millis` with the watchdog, or by polling the clock on chips
/// lacking a watchdog interrupt
#[expect(clippy::too_many_arguments, reason = "Disjoint borrows of a sleep")]
fn timed_sleep<C, D, T>(
    controller: &mut C,
    delay: &mut D,
    clock: Option<&T>,
    wake: &WakeSignal,
    chip: Chip,
    millis: u32,
    mode: SleepMode,
    options: SleepOptions,
) -> SleepReport
where
    C: LowPowerController,
    D: DelayNs,
    T: ElapsedClock,
{
    if chip.has_watchdog_interrupt() {
        sleep_with_watchdog(
            controller,
            delay,
            wake,
            chip.period_table(),
            millis,
            mode,
            options,
        )
    } else if let Some(clock) = clock {
        sleep_with_clock(controller, clock, millis, options)
    } else {
        warn!("No way to time a sleep on {chip:?}");
        SleepReport::untimed()
    }
}
