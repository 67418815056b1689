// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Data structures and functions for error handling

/// An error
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// The chip cannot time a sleep
    ///
    /// Its watchdog has no interrupt and no elapsed-time clock was given.
    MissingTimeSource,

    /// A calibration offset does not fit an additive record
    CalibrationOutOfRange {
        /// Requested duration in milliseconds
        reference_ms: u32,

        /// Measured duration in milliseconds
        observed_ms: u32,
    },

    /// The elapsed-time clock did not advance while calibrating
    ClockStalled,
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "{self:?}")
    }
}
