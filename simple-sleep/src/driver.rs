// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Timed sleep loops

use log::debug;
use log::trace;

use embedded_hal::delay::DelayNs;

use crate::clock::ElapsedClock;
use crate::controller::LowPowerController;
use crate::controller::SleepMode;
use crate::controller::SleepOptions;
use crate::period::PeriodTable;
use crate::wake::WakeSignal;

/// State of a watchdog-timed sleep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleState {
    /// No period is pending
    Idle,

    /// A period is armed and the chip is asleep
    Armed,

    /// Woken by an unrelated interrupt while a period is pending
    Spurious,

    /// The whole duration has elapsed
    Done,
}

/// Summary of a timed sleep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SleepReport {
    /// Number of watchdog periods armed, or idle wake ups when polling
    pub cycles: u32,

    /// Number of wake ups by unrelated interrupts
    pub spurious_wakes: u32,

    /// Milliseconds spent busy-waiting below the floor
    pub busy_delay_ms: u32,

    /// Final state
    pub state: CycleState,
}

impl SleepReport {
    /// Report of a sleep that has not started yet
    const fn new() -> Self {
        Self {
            cycles: 0,
            spurious_wakes: 0,
            busy_delay_ms: 0,
            state: CycleState::Idle,
        }
    }

    /// Report of a sleep that did not use any timer
    pub(crate) const fn untimed() -> Self {
        Self {
            state: CycleState::Done,
            ..Self::new()
        }
    }
}

/// Sleep for approximately `millis` using the watchdog interrupt
///
/// The duration is split into watchdog periods.  For each one the watchdog is
/// armed and the chip sleeps in `mode` until `wake` is set; wake ups by other
/// interrupts put the chip back to sleep without re-arming, since the
/// watchdog is still counting.
///
/// Interrupts are always enabled while sleeping, otherwise only a reset
/// could end the sleep.
pub fn sleep_with_watchdog<C, D>(
    controller: &mut C,
    delay: &mut D,
    wake: &WakeSignal,
    table: PeriodTable,
    millis: u32,
    mode: SleepMode,
    options: SleepOptions,
) -> SleepReport
where
    C: LowPowerController,
    D: DelayNs,
{
    debug!("Sleep {millis} ms in {mode:?} using watchdog");

    let options = SleepOptions {
        interrupts: true,
        ..options
    };

    let mut budget = millis;
    let mut report = SleepReport::new();

    loop {
        report.state = match report.state {
            CycleState::Idle => match table.select(&mut budget) {
                Some(selection) => {
                    if selection.delay_ms > 0 {
                        delay.delay_ms(selection.delay_ms);
                        report.busy_delay_ms += selection.delay_ms;
                    }
                    wake.clear();
                    controller.arm_watchdog(selection.period);
                    report.cycles += 1;
                    CycleState::Armed
                }
                None => CycleState::Done,
            },
            CycleState::Armed | CycleState::Spurious => {
                controller.enter_unless(mode, options, wake);
                if !wake.is_set() {
                    trace!("Woken before watchdog, back to sleep");
                    report.spurious_wakes += 1;
                    CycleState::Spurious
                } else if budget > 0 {
                    CycleState::Idle
                } else {
                    CycleState::Done
                }
            }
            CycleState::Done => break,
        };
    }

    debug!(
        "Slept {} watchdog periods, {} spurious wake ups",
        report.cycles, report.spurious_wakes
    );

    report
}

/// Sleep for `millis` in idle mode by polling an elapsed-time clock
///
/// Used on chips whose watchdog cannot raise an interrupt.  Only idle mode
/// keeps the clock running, so deeper modes are not available here.
pub fn sleep_with_clock<C, T>(
    controller: &mut C,
    clock: &T,
    millis: u32,
    options: SleepOptions,
) -> SleepReport
where
    C: LowPowerController,
    T: ElapsedClock,
{
    debug!("Sleep {millis} ms in idle polling clock");

    let options = SleepOptions {
        interrupts: true,
        ..options
    };

    let mut report = SleepReport::new();
    let start = clock.now_ms();

    while clock.elapsed_since(start) < millis {
        controller.enter(SleepMode::Idle, options);
        report.cycles += 1;
    }

    report.state = CycleState::Done;

    debug!("Slept {} ms in {} idle cycles", clock.elapsed_since(start), report.cycles);

    report
}
