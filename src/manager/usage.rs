// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Usage accounting derived from successive state reads.

use std::time::Duration;

use tokio::time::Instant;

/// Accumulates how long the light has been on across state reads.
///
/// Each observation closes the interval since the previous one; the
/// interval counts as "on" if the light was on at its start.
#[derive(Debug, Clone, Default)]
pub struct LightUsage {
    on_since: Option<Instant>,
    total: Duration,
}

impl LightUsage {
    /// Creates a tracker that assumes the light starts off.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the light state read at `at`.
    pub fn observe(&mut self, light_on: bool, at: Instant) {
        if let Some(since) = self.on_since {
            self.total += at.saturating_duration_since(since);
        }
        self.on_since = light_on.then_some(at);
    }

    /// Returns the accumulated on-time up to the last observation.
    #[must_use]
    pub fn total(&self) -> Duration {
        self.total
    }

    /// Returns `true` if the light was on at the last observation.
    #[must_use]
    pub fn is_on(&self) -> bool {
        self.on_since.is_some()
    }
}

/// Counts intruder alerts.
///
/// Only a change of the intruder flag from clear to set counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntruderTracker {
    previous: bool,
    occurrences: u32,
}

impl IntruderTracker {
    /// Creates a tracker with no recorded alerts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the intruder flag, returning `true` if this is a new alert.
    pub fn observe(&mut self, intruder: bool) -> bool {
        let raised = intruder && !self.previous;
        if raised {
            self.occurrences = self.occurrences.saturating_add(1);
        }
        self.previous = intruder;
        raised
    }

    /// Returns the number of alerts seen.
    #[must_use]
    pub fn occurrences(&self) -> u32 {
        self.occurrences
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_usage_counts_on_intervals_only() {
        let start = Instant::now();
        let at = |secs| start + Duration::from_secs(secs);
        let mut usage = LightUsage::new();

        usage.observe(false, at(0));
        usage.observe(true, at(10));
        usage.observe(true, at(40));
        usage.observe(false, at(100));
        usage.observe(false, at(500));

        assert_eq!(usage.total(), Duration::from_secs(90));
        assert!(!usage.is_on());
    }

    #[test]
    fn light_usage_starts_off() {
        let start = Instant::now();
        let mut usage = LightUsage::new();

        usage.observe(true, start + Duration::from_secs(60));
        assert_eq!(usage.total(), Duration::ZERO);
        assert!(usage.is_on());
    }

    #[test]
    fn intruder_counts_rising_edges() {
        let mut tracker = IntruderTracker::new();
        let raised: Vec<_> = [false, true, true, false, true, false]
            .into_iter()
            .map(|flag| tracker.observe(flag))
            .collect();

        assert_eq!(raised, vec![false, true, false, false, true, false]);
        assert_eq!(tracker.occurrences(), 2);
    }
}
