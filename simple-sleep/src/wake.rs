// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Signal from the watchdog interrupt to the sleep loop

use core::sync::atomic::AtomicBool;
use core::sync::atomic::Ordering;

/// Flag set when the armed watchdog period has elapsed
///
/// The watchdog interrupt handler is the only writer of a set flag and the
/// sleep loop the only reader; the loop clears it right before arming the
/// next period.  Only plain loads and stores are used, so the flag works on
/// targets without compare-and-swap.
///
/// ```ignore
/// static WAKE: WakeSignal = WakeSignal::new();
///
/// #[avr_device::interrupt(atmega328p)]
/// fn WDT() {
///     // stop the watchdog, then
///     WAKE.notify();
/// }
/// ```
#[derive(Debug)]
pub struct WakeSignal {
    /// Whether the last armed period has elapsed
    triggered: AtomicBool,
}

impl WakeSignal {
    /// Create a signal
    ///
    /// It starts set, meaning no period is pending.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            triggered: AtomicBool::new(true),
        }
    }

    /// Mark the armed period as elapsed
    ///
    /// Call this from the watchdog interrupt handler.
    pub fn notify(&self) {
        self.triggered.store(true, Ordering::Release);
    }

    /// Check whether the armed period has elapsed
    pub fn is_set(&self) -> bool {
        self.triggered.load(Ordering::Acquire)
    }

    /// Mark a period as pending
    pub(crate) fn clear(&self) {
        self.triggered.store(false, Ordering::Release);
    }
}

impl Default for WakeSignal {
    fn default() -> Self {
        Self::new()
    }
}
