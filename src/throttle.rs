// SPDX-License-Identifier: GPL-3.0-or-later
// Copyright (C) 2026 Signet Contributors

//! Rate gate for coalesced work.
//!
//! A [`Throttle`] can be triggered any number of times; [`Throttle::fire`]
//! reports true at most once per interval, and only when at least one
//! trigger is pending. The caller performs the actual work at fire time,
//! so the work always observes the state current at execution, not at
//! trigger time — intervening queue updates are naturally included.

use std::time::{Duration, Instant};

/// At-most-once-per-interval gate.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    pending: bool,
    last_fired: Option<Instant>,
}

impl Throttle {
    /// Creates a gate with the given minimum interval between firings.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: false,
            last_fired: None,
        }
    }

    /// Records a trigger. Idempotent between firings.
    pub fn trigger(&mut self) {
        self.pending = true;
    }

    /// Returns true when the caller should run the gated action now:
    /// a trigger is pending and the interval has elapsed since the last
    /// firing. Consumes the pending trigger.
    pub fn fire(&mut self, now: Instant) -> bool {
        if !self.pending {
            return false;
        }
        if let Some(last) = self.last_fired
            && now.duration_since(last) < self.interval
        {
            return false;
        }
        self.pending = false;
        self.last_fired = Some(now);
        true
    }

    /// True when a trigger is waiting for the interval to elapse.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }
}
