// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Configuration

use crate::calibration::CalibrationKind;
use crate::chip::Chip;

/// Configuration of a [`Sleep`](crate::Sleep)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Target chip
    pub chip: Chip,

    /// Representation of calibration records
    pub calibration: CalibrationKind,
}

impl Config {
    /// Create a configuration with the default calibration kind
    #[must_use]
    pub const fn new(chip: Chip) -> Self {
        Self {
            chip,
            calibration: CalibrationKind::DEFAULT,
        }
    }

    /// Change the calibration kind
    #[must_use]
    pub const fn with_calibration(self, calibration: CalibrationKind) -> Self {
        Self {
            calibration,
            ..self
        }
    }
}
