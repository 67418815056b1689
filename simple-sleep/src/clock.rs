// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Elapsed-time clock

/// A free-running millisecond counter
///
/// Typically driven by a timer0 overflow interrupt.  It stops counting in any
/// mode deeper than idle, and it is allowed to wrap around.
pub trait ElapsedClock {
    /// Milliseconds since an arbitrary origin
    fn now_ms(&self) -> u32;

    /// Milliseconds elapsed since `start`, accounting for wrap-around
    fn elapsed_since(&self, start: u32) -> u32 {
        self.now_ms().wrapping_sub(start)
    }
}

/// Placeholder for a missing clock
///
/// This type has no values, so a `Sleep` using it never has a clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoClock {}

impl ElapsedClock for NoClock {
    fn now_ms(&self) -> u32 {
        match *self {}
    }
}

impl<T> ElapsedClock for &T
where
    T: ElapsedClock,
{
    fn now_ms(&self) -> u32 {
        T::now_ms(self)
    }
}
