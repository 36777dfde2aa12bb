// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-of-day types for the night-lock schedule.
//!
//! The house encodes a time of day as a single integer `HH*100+MM`
//! (`2230` is 22:30, `600` is 06:00).
//!
//! # Types
//!
//! - [`TimeOfDay`] - A validated `HH*100+MM` encoding
//! - [`NightWindow`] - A start/end pair that may wrap past midnight

use std::fmt;

use chrono::{NaiveTime, Timelike};

use crate::error::ValueError;

/// A time of day decoded from its `HH*100+MM` encoding.
///
/// # Examples
///
/// ```
/// use hearth_lib::types::TimeOfDay;
///
/// let time = TimeOfDay::from_encoded(2230).unwrap();
/// assert_eq!(time.encoded(), 2230);
/// assert_eq!(time.to_string(), "22:30");
///
/// // Hours above 23 or minutes above 59 are rejected
/// assert!(TimeOfDay::from_encoded(2500).is_err());
/// assert!(TimeOfDay::from_encoded(1260).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Decodes a `HH*100+MM` value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidTimeOfDay` if the value is negative, the
    /// hour is above 23, or the minute is above 59.
    pub fn from_encoded(value: i32) -> Result<Self, ValueError> {
        let (Ok(hour), Ok(minute)) = (u32::try_from(value / 100), u32::try_from(value % 100))
        else {
            return Err(ValueError::InvalidTimeOfDay(value));
        };

        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or(ValueError::InvalidTimeOfDay(value))
    }

    /// Creates a time of day from hours and minutes.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidTimeOfDay` if the hour or minute is out of range.
    pub fn from_hm(hour: u32, minute: u32) -> Result<Self, ValueError> {
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| {
                let encoded = hour
                    .checked_mul(100)
                    .and_then(|h| h.checked_add(minute))
                    .and_then(|v| i32::try_from(v).ok())
                    .unwrap_or(i32::MAX);
                ValueError::InvalidTimeOfDay(encoded)
            })
    }

    /// Returns the `HH*100+MM` encoding.
    #[must_use]
    pub fn encoded(&self) -> i32 {
        // Safe: hour <= 23 and minute <= 59
        #[allow(clippy::cast_possible_wrap)]
        let encoded = (self.0.hour() * 100 + self.0.minute()) as i32;
        encoded
    }

    /// Returns the time as a `NaiveTime`.
    #[must_use]
    pub const fn as_time(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0.hour(), self.0.minute())
    }
}

impl From<TimeOfDay> for NaiveTime {
    fn from(time: TimeOfDay) -> Self {
        time.0
    }
}

/// The configured range of the day during which a closed door auto-locks.
///
/// When `start` is later than `end` the window wraps past midnight.
/// Both bounds are exclusive.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use hearth_lib::types::NightWindow;
///
/// let window = NightWindow::from_encoded(2200, 600).unwrap();
/// assert!(window.contains(NaiveTime::from_hms_opt(23, 0, 0).unwrap()));
/// assert!(window.contains(NaiveTime::from_hms_opt(3, 0, 0).unwrap()));
/// assert!(!window.contains(NaiveTime::from_hms_opt(13, 0, 0).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NightWindow {
    start: TimeOfDay,
    end: TimeOfDay,
}

impl NightWindow {
    /// Creates a window from two times of day.
    #[must_use]
    pub const fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    /// Creates a window from two `HH*100+MM` encodings.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::InvalidTimeOfDay` if either encoding is invalid.
    pub fn from_encoded(start: i32, end: i32) -> Result<Self, ValueError> {
        Ok(Self::new(
            TimeOfDay::from_encoded(start)?,
            TimeOfDay::from_encoded(end)?,
        ))
    }

    /// Returns the start of the window.
    #[must_use]
    pub const fn start(&self) -> TimeOfDay {
        self.start
    }

    /// Returns the end of the window.
    #[must_use]
    pub const fn end(&self) -> TimeOfDay {
        self.end
    }

    /// Returns `true` if the window wraps past midnight.
    #[must_use]
    pub fn wraps_midnight(&self) -> bool {
        self.start > self.end
    }

    /// Returns `true` if `time` falls strictly inside the window.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        let start = self.start.as_time();
        let end = self.end.as_time();

        (time > start && time < end) || (self.wraps_midnight() && (time > start || time < end))
    }
}
