// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Hardware capabilities needed to put a chip to sleep

use log::trace;

use crate::period::WatchdogPeriod;
use crate::wake::WakeSignal;

/// Bit enabling the ADC in `ADCSRA`
pub const ADC_ENABLE: u8 = 0x80;

/// A sleep mode, from shallowest to deepest
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum SleepMode {
    /// CPU stopped, timers and peripherals running
    Idle,

    /// ADC noise reduction, used as light sleep where extended standby is missing
    AdcNoiseReduction,

    /// Extended standby
    ExtendedStandby,

    /// Power down, only asynchronous wake sources remain
    PowerDown,
}

/// An 8-bit register touched while preparing for sleep
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Register {
    /// ADC control and status register A
    Adcsra,
    /// Power reduction register
    Prr,
    /// Power reduction register 0
    Prr0,
    /// Power reduction register 1
    Prr1,
    /// Power reduction register 2
    Prr2,
    /// Port A power reduction
    PrPa,
    /// Port B power reduction
    PrPb,
    /// Port C power reduction
    PrPc,
    /// Port D power reduction
    PrPd,
    /// Port E power reduction
    PrPe,
    /// Port F power reduction
    PrPf,
    /// General power reduction
    PrGen,
}

impl Register {
    /// Number of registers
    pub const COUNT: usize = 12;
}

/// How the chip behaves while asleep
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SleepOptions {
    /// Keep brown-out detection running
    pub brown_out_detection: bool,

    /// Allow interrupts to wake the chip
    ///
    /// **NOTE**: without interrupts the only way out of sleep is a reset.
    pub interrupts: bool,
}

impl SleepOptions {
    /// Options used by sleep-forever
    pub const HALT: Self = Self {
        brown_out_detection: false,
        interrupts: false,
    };

    /// Brown-out detection off, interrupts on
    pub const LOW_POWER: Self = Self {
        brown_out_detection: false,
        interrupts: true,
    };

    /// Brown-out detection on, interrupts on
    pub const IDLE: Self = Self {
        brown_out_detection: true,
        interrupts: true,
    };
}

/// Primitive operations for putting a chip to sleep
///
/// Implementations map each method to the corresponding instruction or
/// register access of the target.  The provided methods compose them into
/// complete sleep sequences, and can be overridden where a chip needs a
/// different sequence.
pub trait LowPowerController {
    /// Read a register
    fn read_register(&self, register: Register) -> u8;

    /// Write a register
    fn write_register(&mut self, register: Register, value: u8);

    /// Select the mode entered by the next sleep instruction
    fn set_sleep_mode(&mut self, mode: SleepMode);

    /// Set the sleep-enable bit
    fn sleep_enable(&mut self);

    /// Clear the sleep-enable bit
    fn sleep_disable(&mut self);

    /// Turn off brown-out detection for the next sleep instruction
    fn disable_brown_out(&mut self);

    /// Globally enable interrupts
    fn enable_interrupts(&mut self);

    /// Globally disable interrupts
    fn disable_interrupts(&mut self);

    /// Execute the sleep instruction, returning after wake up
    fn sleep_cpu(&mut self);

    /// Start the watchdog in interrupt mode for a period
    ///
    /// The interrupt handler must stop the watchdog and call
    /// [`WakeSignal::notify`].
    fn arm_watchdog(&mut self, period: WatchdogPeriod);

    /// Set bits in a register
    fn set_register_bits(&mut self, register: Register, mask: u8) {
        let value = self.read_register(register);
        self.write_register(register, value | mask);
    }

    /// Clear bits in a register
    fn clear_register_bits(&mut self, register: Register, mask: u8) {
        let value = self.read_register(register);
        self.write_register(register, value & !mask);
    }

    /// Turn off the ADC
    fn disable_adc(&mut self) {
        trace!("Turn off ADC");
        self.clear_register_bits(Register::Adcsra, ADC_ENABLE);
    }

    /// Enter a sleep mode once and return after wake up
    ///
    /// Interrupts are enabled on return regardless of `options`.
    fn enter(&mut self, mode: SleepMode, options: SleepOptions) {
        self.set_sleep_mode(mode);
        self.disable_interrupts();
        self.sleep_enable();
        if !options.brown_out_detection {
            self.disable_brown_out();
        }
        if options.interrupts {
            self.enable_interrupts();
        }
        self.sleep_cpu();
        self.sleep_disable();
        self.enable_interrupts();
    }

    /// Enter a sleep mode unless `wake` is already set
    ///
    /// The signal is checked with interrupts disabled, and the sleep
    /// instruction immediately follows re-enabling them, so a watchdog
    /// interrupt cannot slip in between the check and the sleep.  Interrupts
    /// are enabled on return.
    ///
    /// Returns whether the chip actually slept.
    fn enter_unless(&mut self, mode: SleepMode, options: SleepOptions, wake: &WakeSignal) -> bool {
        self.set_sleep_mode(mode);
        self.disable_interrupts();
        if wake.is_set() {
            self.enable_interrupts();
            return false;
        }
        self.sleep_enable();
        if !options.brown_out_detection {
            self.disable_brown_out();
        }
        if options.interrupts {
            self.enable_interrupts();
        }
        self.sleep_cpu();
        self.sleep_disable();
        self.enable_interrupts();
        true
    }
}
