// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Simulated hardware for tests

extern crate std;

use core::cell::Cell;

use std::vec::Vec;

use embedded_hal::delay::DelayNs;

use crate::clock::ElapsedClock;
use crate::controller::LowPowerController;
use crate::controller::Register;
use crate::controller::SleepMode;
use crate::period::WatchdogPeriod;
use crate::wake::WakeSignal;

/// Something observed by the simulated controller
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Watchdog armed
    Armed(WatchdogPeriod),

    /// Sleep instruction executed
    Slept {
        /// Selected mode
        mode: SleepMode,
        /// Whether brown-out detection stayed on
        brown_out_detection: bool,
    },

    /// Watchdog interrupt fired
    WatchdogFired(WatchdogPeriod),

    /// An unrelated interrupt woke the chip
    Spurious,

    /// Timer0 overflow woke the chip from idle
    Tick,

    /// An external interrupt ended an untimed sleep
    ExternalWake,
}

/// Simulated chip
///
/// Time is a shared cell of milliseconds.  An armed watchdog fires at the
/// next sleep instruction after `drift_percent` of its nominal period.
pub struct MockController<'a> {
    /// Current time
    now: &'a Cell<u32>,

    /// Signal raised by the simulated watchdog interrupt
    wake: &'a WakeSignal,

    /// Register file
    registers: [u8; Register::COUNT],

    /// Selected sleep mode
    mode: SleepMode,

    /// Sleep-enable bit
    sleep_enabled: bool,

    /// Global interrupt flag
    pub interrupts_enabled: bool,

    /// Brown-out detection disabled for the next sleep
    brown_out_disabled: bool,

    /// Armed watchdog period
    armed: Option<WatchdogPeriod>,

    /// Actual watchdog period as a percentage of nominal
    drift_percent: u32,

    /// Unrelated interrupts to deliver before anything else
    spurious_pending: u32,

    /// Register file at the last sleep instruction
    pub registers_at_sleep: Option<[u8; Register::COUNT]>,

    /// Observed events
    pub events: Vec<Event>,
}

impl<'a> MockController<'a> {
    /// Create a simulated chip with an exact watchdog
    pub fn new(now: &'a Cell<u32>, wake: &'a WakeSignal) -> Self {
        Self {
            now,
            wake,
            registers: [0; Register::COUNT],
            mode: SleepMode::Idle,
            sleep_enabled: false,
            interrupts_enabled: true,
            brown_out_disabled: false,
            armed: None,
            drift_percent: 100,
            spurious_pending: 0,
            registers_at_sleep: None,
            events: Vec::new(),
        }
    }

    /// Make the watchdog run at a percentage of its nominal period
    #[must_use]
    pub fn with_drift(mut self, drift_percent: u32) -> Self {
        self.drift_percent = drift_percent;
        self
    }

    /// Deliver unrelated interrupts at the next sleeps
    pub fn inject_spurious(&mut self, count: u32) {
        self.spurious_pending += count;
    }

    /// Periods the watchdog was armed for
    pub fn armed_periods(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|event| match *event {
                Event::Armed(period) => Some(period.millis()),
                _ => None,
            })
            .collect()
    }

    /// Number of events matching a predicate
    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|event| predicate(*event)).count()
    }

    /// Value of a register at the last sleep instruction
    pub fn register_at_sleep(&self, register: Register) -> Option<u8> {
        self.registers_at_sleep
            .map(|registers| registers[register as usize])
    }

    /// Advance time
    fn advance(&self, millis: u32) {
        self.now.set(self.now.get().wrapping_add(millis));
    }
}

impl LowPowerController for MockController<'_> {
    fn read_register(&self, register: Register) -> u8 {
        self.registers[register as usize]
    }

    fn write_register(&mut self, register: Register, value: u8) {
        self.registers[register as usize] = value;
    }

    fn set_sleep_mode(&mut self, mode: SleepMode) {
        self.mode = mode;
    }

    fn sleep_enable(&mut self) {
        self.sleep_enabled = true;
    }

    fn sleep_disable(&mut self) {
        self.sleep_enabled = false;
    }

    fn disable_brown_out(&mut self) {
        self.brown_out_disabled = true;
    }

    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }

    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
    }

    fn sleep_cpu(&mut self) {
        assert!(self.sleep_enabled, "sleep instruction without sleep enable");

        self.events.push(Event::Slept {
            mode: self.mode,
            brown_out_detection: !self.brown_out_disabled,
        });
        self.brown_out_disabled = false;
        self.registers_at_sleep = Some(self.registers);

        assert!(self.interrupts_enabled, "halted until reset");

        if self.spurious_pending > 0 {
            self.spurious_pending -= 1;
            self.events.push(Event::Spurious);
        } else if let Some(period) = self.armed.take() {
            self.advance(period.millis() * self.drift_percent / 100);
            self.wake.notify();
            self.events.push(Event::WatchdogFired(period));
        } else if self.mode == SleepMode::Idle {
            self.advance(1);
            self.events.push(Event::Tick);
        } else {
            self.events.push(Event::ExternalWake);
        }
    }

    fn arm_watchdog(&mut self, period: WatchdogPeriod) {
        self.armed = Some(period);
        self.events.push(Event::Armed(period));
    }
}

/// Simulated `millis()` counter
pub struct MockClock<'a> {
    /// Current time
    now: &'a Cell<u32>,
}

impl<'a> MockClock<'a> {
    /// Create a clock reading the shared time
    pub fn new(now: &'a Cell<u32>) -> Self {
        Self { now }
    }
}

impl ElapsedClock for MockClock<'_> {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }
}

/// Simulated busy delay
pub struct MockDelay<'a> {
    /// Current time
    now: &'a Cell<u32>,

    /// Total milliseconds spent busy-waiting
    pub busy_ms: u32,
}

impl<'a> MockDelay<'a> {
    /// Create a delay advancing the shared time
    pub fn new(now: &'a Cell<u32>) -> Self {
        Self { now, busy_ms: 0 }
    }
}

impl DelayNs for MockDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.delay_ms(ns / 1_000_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
        self.busy_ms += ms;
    }
}
