// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Evaluation log.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

/// Timestamp format of a rendered log line, e.g. `Oct 19,2026 22:15`.
const TIMESTAMP_FORMAT: &str = "%b %d,%Y %H:%M";

/// One human-readable entry of an [`EvaluationLog`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// When the entry was written.
    pub at: NaiveDateTime,
    /// What happened.
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]: {}", self.at.format(TIMESTAMP_FORMAT), self.message)
    }
}

/// Append-only log of one evaluation pass.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use hearth_lib::evaluator::EvaluationLog;
///
/// let now = NaiveDate::from_ymd_opt(2026, 10, 19)
///     .unwrap()
///     .and_hms_opt(22, 15, 0)
///     .unwrap();
///
/// let mut log = EvaluationLog::new();
/// log.push(now, "Closed door");
///
/// assert!(log.contains("Closed"));
/// assert_eq!(log.lines(), vec!["[Oct 19,2026 22:15]: Closed door"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EvaluationLog {
    entries: Vec<LogEntry>,
}

impl EvaluationLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, at: NaiveDateTime, message: impl Into<String>) {
        self.entries.push(LogEntry {
            at,
            message: message.into(),
        });
    }

    /// Returns the entries in the order they were written.
    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Iterates over the bare messages.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.message.as_str())
    }

    /// Returns the entries rendered with their timestamps.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Returns `true` if any message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().any(|message| message.contains(needle))
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was logged.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
