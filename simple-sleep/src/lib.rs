// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Low-power sleep for 8-bit AVR microcontrollers
//!
//! A [`Sleep`] puts the chip to sleep at one of four depths, either until the
//! next interrupt or for an approximate number of milliseconds timed by the
//! watchdog.  Long durations are split into the fixed watchdog periods, from
//! 8 s down to 15 ms, and the remainder below the floor is busy-waited using a
//! [`DelayNs`](embedded_hal::delay::DelayNs).
//!
//! Hardware is reached through a [`LowPowerController`], and the watchdog
//! interrupt handler must call [`WakeSignal::notify`] on the signal shared
//! with the sleep.
//!
//! The watchdog oscillator drifts by several percent.  When an elapsed-time
//! clock is available, [`Sleep::calibration`] measures a [`Calibration`] that
//! the `*_for_calibrated` methods apply to requests.

#![cfg_attr(not(feature = "std"), no_std)]

mod calibration;
pub use self::calibration::measure;
pub use self::calibration::Calibration;
pub use self::calibration::CalibrationKind;
pub use self::calibration::LONG_REFERENCE_MS;
pub use self::calibration::SHORT_REFERENCE_MS;

mod chip;
pub use self::chip::Chip;
pub use self::chip::RegisterBit;

mod clock;
pub use self::clock::ElapsedClock;
pub use self::clock::NoClock;

mod config;
pub use self::config::Config;

mod controller;
pub use self::controller::LowPowerController;
pub use self::controller::Register;
pub use self::controller::SleepMode;
pub use self::controller::SleepOptions;
pub use self::controller::ADC_ENABLE;

mod driver;
pub use self::driver::sleep_with_clock;
pub use self::driver::sleep_with_watchdog;
pub use self::driver::CycleState;
pub use self::driver::SleepReport;

mod error;
pub use self::error::Error;

mod period;
pub use self::period::Decomposition;
pub use self::period::PeriodTable;
pub use self::period::Selection;
pub use self::period::WatchdogPeriod;

mod sleep;
pub use self::sleep::Sleep;

mod snapshot;
pub use self::snapshot::RegisterSnapshot;

mod wake;
pub use self::wake::WakeSignal;

#[cfg(test)]
mod mock;
