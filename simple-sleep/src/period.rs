// Copyright Claudio Mattera 2024-2025.
//
// Distributed under the MIT License or the Apache 2.0 License at your option.
// See the accompanying files LICENSE-MIT.txt and LICENSE-APACHE-2.0.txt, or
// online at
// https://opensource.org/licenses/MIT
// https://opensource.org/licenses/Apache-2.0

//! Watchdog periods and decomposition of a duration into periods
//!
//! The AVR watchdog can only count down a handful of fixed periods.  They form
//! two doubling sequences, 250 ms to 8000 ms and 15 ms to 120 ms, so halving
//! 250 ms lands on 120 ms rather than on a fractional 125 ms.

use log::trace;

/// A period the watchdog timer can be armed for
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WatchdogPeriod {
    /// 15 ms
    Ms15,
    /// 30 ms
    Ms30,
    /// 60 ms
    Ms60,
    /// 120 ms
    Ms120,
    /// 250 ms
    Ms250,
    /// 500 ms
    Ms500,
    /// 1 s
    Ms1000,
    /// 2 s
    Ms2000,
    /// 4 s
    Ms4000,
    /// 8 s
    Ms8000,
}

impl WatchdogPeriod {
    /// The shortest period, the floor of every decomposition
    pub const FLOOR: Self = Self::Ms15;

    /// All periods, longest first
    pub const ALL: [Self; 10] = [
        Self::Ms8000,
        Self::Ms4000,
        Self::Ms2000,
        Self::Ms1000,
        Self::Ms500,
        Self::Ms250,
        Self::Ms120,
        Self::Ms60,
        Self::Ms30,
        Self::Ms15,
    ];

    /// Nominal duration in milliseconds
    #[must_use]
    pub const fn millis(self) -> u32 {
        match self {
            Self::Ms15 => 15,
            Self::Ms30 => 30,
            Self::Ms60 => 60,
            Self::Ms120 => 120,
            Self::Ms250 => 250,
            Self::Ms500 => 500,
            Self::Ms1000 => 1000,
            Self::Ms2000 => 2000,
            Self::Ms4000 => 4000,
            Self::Ms8000 => 8000,
        }
    }

    /// Prescaler code written to the watchdog control register
    ///
    /// These are the `WDTO_*` values of avr-libc.
    #[must_use]
    pub const fn prescaler(self) -> u8 {
        match self {
            Self::Ms15 => 0,
            Self::Ms30 => 1,
            Self::Ms60 => 2,
            Self::Ms120 => 3,
            Self::Ms250 => 4,
            Self::Ms500 => 5,
            Self::Ms1000 => 6,
            Self::Ms2000 => 7,
            Self::Ms4000 => 8,
            Self::Ms8000 => 9,
        }
    }

    /// Next shorter period, or `None` below the floor
    ///
    /// Crosses from the long sequence to the short one at 250 ms → 120 ms.
    #[must_use]
    pub const fn shorter(self) -> Option<Self> {
        match self {
            Self::Ms15 => None,
            Self::Ms30 => Some(Self::Ms15),
            Self::Ms60 => Some(Self::Ms30),
            Self::Ms120 => Some(Self::Ms60),
            Self::Ms250 => Some(Self::Ms120),
            Self::Ms500 => Some(Self::Ms250),
            Self::Ms1000 => Some(Self::Ms500),
            Self::Ms2000 => Some(Self::Ms1000),
            Self::Ms4000 => Some(Self::Ms2000),
            Self::Ms8000 => Some(Self::Ms4000),
        }
    }
}

/// One step of a decomposition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    /// Period to arm the watchdog for
    pub period: WatchdogPeriod,

    /// Milliseconds to busy-wait before arming
    ///
    /// Non-zero only on the final step when the remaining budget was between
    /// the floor and the next period.
    pub delay_ms: u32,
}

/// The periods available on a chip, longest first
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PeriodTable {
    /// Longest period the chip supports
    longest: WatchdogPeriod,
}

impl PeriodTable {
    /// Table of chips whose watchdog has the fourth prescaler bit
    pub const UP_TO_8000_MS: Self = Self::new(WatchdogPeriod::Ms8000);

    /// Table of chips limited to 2 s
    pub const UP_TO_2000_MS: Self = Self::new(WatchdogPeriod::Ms2000);

    /// Create a table going from `longest` down to the floor
    #[must_use]
    pub const fn new(longest: WatchdogPeriod) -> Self {
        Self { longest }
    }

    /// Longest period in the table
    #[must_use]
    pub const fn longest(&self) -> WatchdogPeriod {
        self.longest
    }

    /// Iterate over the periods, longest first
    pub fn periods(&self) -> impl Iterator<Item = WatchdogPeriod> {
        let longest = self.longest;
        WatchdogPeriod::ALL
            .into_iter()
            .skip_while(move |period| *period > longest)
    }

    /// Select the next period to sleep for and deduct it from the budget
    ///
    /// Picks the longest period not exceeding `budget`.  Once the budget is
    /// below 30 ms the final step is always the 15 ms floor: any excess above
    /// 15 ms is returned as a busy delay, and a budget below 15 ms is rounded
    /// up to the floor since the watchdog cannot count less.  The budget is
    /// zero after the final step.
    ///
    /// Returns `None` when the budget is already exhausted.
    pub fn select(&self, budget: &mut u32) -> Option<Selection> {
        if *budget == 0 {
            return None;
        }

        let floor = WatchdogPeriod::FLOOR.millis();

        let found = self
            .periods()
            .filter(|period| *period != WatchdogPeriod::FLOOR)
            .find(|period| *budget >= period.millis());

        let selection = if let Some(period) = found {
            *budget -= period.millis();
            Selection {
                period,
                delay_ms: 0,
            }
        } else {
            let delay_ms = budget.saturating_sub(floor);
            *budget = 0;
            Selection {
                period: WatchdogPeriod::FLOOR,
                delay_ms,
            }
        };

        trace!(
            "Selected {} ms period (busy delay {} ms), {} ms left",
            selection.period.millis(),
            selection.delay_ms,
            budget
        );

        Some(selection)
    }

    /// Iterate over the full decomposition of a duration
    #[must_use]
    pub fn decompose(&self, millis: u32) -> Decomposition {
        Decomposition {
            table: *self,
            budget: millis,
        }
    }
}

/// Iterator over the steps of a decomposition
#[derive(Clone, Debug)]
pub struct Decomposition {
    /// Table to select from
    table: PeriodTable,

    /// Remaining budget
    budget: u32,
}

impl Iterator for Decomposition {
    type Item = Selection;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.select(&mut self.budget)
    }
}
