// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Supported chips and their sleep-related capabilities

use crate::controller::Register;
use crate::controller::SleepMode;
use crate::period::PeriodTable;

/// A supported microcontroller family
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chip {
    /// ATmega48/88/168/328 and their A/P/PA/PB variants
    AtMegaX8,

    /// ATmega8 and ATmega8A
    ///
    /// Its watchdog cannot raise an interrupt, so timed sleeps poll an
    /// elapsed-time clock in idle mode.
    AtMega8,

    /// ATtiny25/45/85
    AtTinyX5,

    /// ATtiny13 and ATtiny13A
    AtTiny13,
}

/// Location of a single bit in a register
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterBit {
    /// Register
    pub register: Register,

    /// Mask of the bit
    pub mask: u8,
}

impl Chip {
    /// Watchdog periods available on this chip
    #[must_use]
    pub const fn period_table(self) -> PeriodTable {
        match self {
            Self::AtMega8 => PeriodTable::UP_TO_2000_MS,
            Self::AtMegaX8 | Self::AtTinyX5 | Self::AtTiny13 => PeriodTable::UP_TO_8000_MS,
        }
    }

    /// Whether the watchdog can wake the chip with an interrupt
    #[must_use]
    pub const fn has_watchdog_interrupt(self) -> bool {
        !matches!(self, Self::AtMega8)
    }

    /// Whether brown-out detection can be turned off during sleep
    #[must_use]
    pub const fn can_disable_brown_out(self) -> bool {
        !matches!(self, Self::AtMega8)
    }

    /// Mode used for light sleep
    #[must_use]
    pub const fn light_sleep_mode(self) -> SleepMode {
        match self {
            Self::AtMegaX8 => SleepMode::ExtendedStandby,
            Self::AtMega8 | Self::AtTinyX5 | Self::AtTiny13 => SleepMode::AdcNoiseReduction,
        }
    }

    /// Power reduction registers and the mask turning off every peripheral
    #[must_use]
    pub const fn power_reduction(self) -> &'static [(Register, u8)] {
        match self {
            Self::AtMegaX8 => &[(Register::Prr, 0xef)],
            Self::AtMega8 => &[],
            Self::AtTinyX5 => &[(Register::Prr, 0x0f)],
            Self::AtTiny13 => &[(Register::Prr, 0x03)],
        }
    }

    /// Power reduction bit of timer0, which drives the elapsed-time clock
    #[must_use]
    pub const fn timer0_power_bit(self) -> Option<RegisterBit> {
        let mask = match self {
            Self::AtMegaX8 => 0x20,
            Self::AtMega8 => return None,
            Self::AtTinyX5 => 0x04,
            Self::AtTiny13 => 0x02,
        };
        Some(RegisterBit {
            register: Register::Prr,
            mask,
        })
    }

    /// Registers saved across a deep sleep
    #[must_use]
    pub const fn deep_sleep_registers(self) -> &'static [Register] {
        match self {
            Self::AtMega8 => &[Register::Adcsra],
            Self::AtMegaX8 | Self::AtTinyX5 | Self::AtTiny13 => &[Register::Adcsra, Register::Prr],
        }
    }

    /// Registers saved across a light sleep
    #[must_use]
    pub const fn light_sleep_registers(self) -> &'static [Register] {
        &[Register::Adcsra]
    }
}
