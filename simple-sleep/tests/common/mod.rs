// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Board simulation shared by integration tests

use std::cell::Cell;

use embedded_hal::delay::DelayNs;

use simple_sleep::ElapsedClock;
use simple_sleep::LowPowerController;
use simple_sleep::Register;
use simple_sleep::SleepMode;
use simple_sleep::WakeSignal;
use simple_sleep::WatchdogPeriod;

/// A board whose watchdog interrupt fires at the next sleep
pub struct Board<'a> {
    /// Milliseconds since reset
    pub now: &'a Cell<u32>,

    /// Signal raised by the watchdog interrupt handler
    pub wake: &'a WakeSignal,

    /// Register file
    pub registers: [u8; Register::COUNT],

    /// Selected mode
    pub mode: Option<SleepMode>,

    /// Armed watchdog period
    pub armed: Option<WatchdogPeriod>,

    /// Modes of every executed sleep instruction
    pub sleeps: Vec<SleepMode>,

    /// Global interrupt flag
    pub interrupts_enabled: bool,
}

impl<'a> Board<'a> {
    /// Create a board with every register cleared
    pub fn new(now: &'a Cell<u32>, wake: &'a WakeSignal) -> Self {
        Self {
            now,
            wake,
            registers: [0; Register::COUNT],
            mode: None,
            armed: None,
            sleeps: Vec::new(),
            interrupts_enabled: true,
        }
    }

    /// Watchdog interrupt handler
    fn watchdog_interrupt(&mut self, period: WatchdogPeriod) {
        self.now.set(self.now.get() + period.millis());
        self.wake.notify();
    }
}

impl LowPowerController for Board<'_> {
    fn read_register(&self, register: Register) -> u8 {
        self.registers[register as usize]
    }

    fn write_register(&mut self, register: Register, value: u8) {
        self.registers[register as usize] = value;
    }

    fn set_sleep_mode(&mut self, mode: SleepMode) {
        self.mode = Some(mode);
    }

    fn sleep_enable(&mut self) {}

    fn sleep_disable(&mut self) {}

    fn disable_brown_out(&mut self) {}

    fn enable_interrupts(&mut self) {
        self.interrupts_enabled = true;
    }

    fn disable_interrupts(&mut self) {
        self.interrupts_enabled = false;
    }

    fn sleep_cpu(&mut self) {
        let mode = self.mode.expect("sleep mode selected");
        self.sleeps.push(mode);
        assert!(self.interrupts_enabled, "halted until reset");

        match self.armed.take() {
            Some(period) => self.watchdog_interrupt(period),
            None if mode == SleepMode::Idle => self.now.set(self.now.get() + 1),
            None => {}
        }
    }

    fn arm_watchdog(&mut self, period: WatchdogPeriod) {
        self.armed = Some(period);
    }
}

/// Busy delay advancing the board time
pub struct Busy<'a>(pub &'a Cell<u32>);

impl DelayNs for Busy<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.set(self.0.get() + ns / 1_000_000);
    }
}

/// Board `millis()` counter
pub struct Millis<'a>(pub &'a Cell<u32>);

impl ElapsedClock for Millis<'_> {
    fn now_ms(&self) -> u32 {
        self.0.get()
    }
}
