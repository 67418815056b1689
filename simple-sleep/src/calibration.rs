// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Correction of watchdog drift
//!
//! The watchdog runs on an uncalibrated RC oscillator, so its periods are off
//! by several percent depending on temperature and supply voltage.  Timing a
//! short and a long reference sleep against the elapsed-time clock gives a
//! correction that is applied to later requests.
//!
//! Records are not cached.  Measure again whenever conditions change.

use log::debug;
use log::warn;

use crate::Error;

/// Short reference duration, the representative of the 15-120 ms periods
pub const SHORT_REFERENCE_MS: u32 = 15;

/// Long reference duration, the representative of the 250-8000 ms periods
pub const LONG_REFERENCE_MS: u32 = 250;

/// Representation used for calibration records
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalibrationKind {
    /// Integer offsets per reference period
    Additive,

    /// A floating point scale factor
    Multiplicative,

    /// No calibration, every record is the identity
    Disabled,
}

impl CalibrationKind {
    /// Kind selected by the `float-calibration` feature
    pub const DEFAULT: Self = if cfg!(feature = "float-calibration") {
        Self::Multiplicative
    } else {
        Self::Additive
    };
}

impl Default for CalibrationKind {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// A correction for watchdog drift
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Calibration {
    /// Milliseconds to add for every 15 ms and every 250 ms requested
    Additive {
        /// Offset per 15 ms
        adjust_15ms: i8,

        /// Offset per 250 ms
        adjust_250ms: i8,
    },

    /// Factor to scale requests by
    Multiplicative {
        /// Scale factor
        scale: f32,
    },
}

impl Calibration {
    /// A calibration leaving requests unchanged
    pub const IDENTITY: Self = Self::Additive {
        adjust_15ms: 0,
        adjust_250ms: 0,
    };

    /// Compute an additive record from the two reference measurements
    ///
    /// # Errors
    ///
    /// Returns an error if an offset does not fit in an `i8`, which means the
    /// watchdog is off by more than 50%.
    pub fn additive(observed_15ms: u32, observed_250ms: u32) -> Result<Self, Error> {
        Ok(Self::Additive {
            adjust_15ms: offset(SHORT_REFERENCE_MS, observed_15ms)?,
            adjust_250ms: offset(LONG_REFERENCE_MS, observed_250ms)?,
        })
    }

    /// Compute a multiplicative record from the short reference measurement
    ///
    /// # Errors
    ///
    /// Returns an error if no time was observed.
    #[expect(clippy::cast_precision_loss, reason = "Observed times are small")]
    pub fn multiplicative(observed_15ms: u32) -> Result<Self, Error> {
        if observed_15ms == 0 {
            return Err(Error::ClockStalled);
        }
        Ok(Self::Multiplicative {
            scale: SHORT_REFERENCE_MS as f32 / observed_15ms as f32,
        })
    }

    /// Adjust a requested duration
    ///
    /// Zero is always left unchanged.  Results saturate to the range of
    /// `u32`, and multiplicative results are truncated.
    #[must_use]
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "Float to integer casts saturate"
    )]
    pub fn apply(&self, millis: u32) -> u32 {
        match *self {
            Self::Additive {
                adjust_15ms,
                adjust_250ms,
            } => {
                let long_periods = i64::from(millis / LONG_REFERENCE_MS);
                let short_periods = i64::from((millis % LONG_REFERENCE_MS) / SHORT_REFERENCE_MS);
                let adjusted = i64::from(millis)
                    + long_periods * i64::from(adjust_250ms)
                    + short_periods * i64::from(adjust_15ms);
                u32::try_from(adjusted.max(0)).unwrap_or(u32::MAX)
            }
            Self::Multiplicative { scale } => {
                let adjusted = f64::from(millis) * f64::from(scale);
                adjusted as u32
            }
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Difference between a reference and its measurement
///
/// # Errors
///
/// Returns an error if the difference does not fit in an `i8`.
fn offset(reference_ms: u32, observed_ms: u32) -> Result<i8, Error> {
    let difference = i64::from(reference_ms) - i64::from(observed_ms);
    i8::try_from(difference).map_err(|_| Error::CalibrationOutOfRange {
        reference_ms,
        observed_ms,
    })
}

/// Measure a calibration record
///
/// `idle_for` must idle for the given milliseconds using the watchdog and
/// return the time observed on the elapsed-time clock, or `None` if there is
/// no clock.  Each reference is measured once, taking a bit more than 265 ms
/// in total for the additive kind.
///
/// # Errors
///
/// Returns an error if the measurements do not make a valid record.
pub fn measure<F>(kind: CalibrationKind, mut idle_for: F) -> Result<Calibration, Error>
where
    F: FnMut(u32) -> Option<u32>,
{
    debug!("Measure {kind:?} calibration");

    let calibration = match kind {
        CalibrationKind::Disabled => Calibration::IDENTITY,
        CalibrationKind::Additive => {
            let Some(observed_15ms) = idle_for(SHORT_REFERENCE_MS) else {
                warn!("No elapsed-time clock, calibration disabled");
                return Ok(Calibration::IDENTITY);
            };
            let Some(observed_250ms) = idle_for(LONG_REFERENCE_MS) else {
                warn!("No elapsed-time clock, calibration disabled");
                return Ok(Calibration::IDENTITY);
            };
            Calibration::additive(observed_15ms, observed_250ms)?
        }
        CalibrationKind::Multiplicative => {
            let Some(observed_15ms) = idle_for(SHORT_REFERENCE_MS) else {
                warn!("No elapsed-time clock, calibration disabled");
                return Ok(Calibration::IDENTITY);
            };
            Calibration::multiplicative(observed_15ms)?
        }
    };

    debug!("Measured {calibration:?}");

    Ok(calibration)
}
