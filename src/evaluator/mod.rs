// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! House state evaluation.
//!
//! A [`StateEvaluator`] takes a proposed house state and returns the state
//! the house is actually allowed to be in, writing a human-readable
//! [`EvaluationLog`] of every decision it made. The production evaluator
//! is [`RuleEvaluator`], which runs a fixed pipeline of safety rules
//! (light guard, door and lock consistency, away timer, alarm arming,
//! HVAC control and the night-lock schedule).
//!
//! # Examples
//!
//! ```
//! use chrono::NaiveDate;
//! use hearth_lib::evaluator::{EvaluationLog, RuleEvaluator, StateEvaluator};
//! use hearth_lib::state::{RawState, StateKey};
//!
//! let now = NaiveDate::from_ymd_opt(2026, 10, 19)
//!     .unwrap()
//!     .and_hms_opt(13, 0, 0)
//!     .unwrap();
//!
//! // Nobody home, but someone asked for the light
//! let mut proposed = RawState::new();
//! proposed.set(StateKey::ProximityState, false).unwrap();
//! proposed.set(StateKey::LightState, true).unwrap();
//!
//! let mut log = EvaluationLog::new();
//! let state = RuleEvaluator::new().evaluate(&proposed, &mut log, now);
//!
//! assert_eq!(state.bool(StateKey::LightState), Some(false));
//! assert!(log.contains("Cannot turn on light because user not home"));
//! ```

mod house;
mod log;
mod rules;

pub use log::{EvaluationLog, LogEntry};

use chrono::NaiveDateTime;

use crate::state::RawState;
use house::HouseState;
use rules::{Pass, RULES};

/// Evaluates a proposed house state against the house rules.
///
/// Implementations hold no per-call state and may be shared between
/// houses.
pub trait StateEvaluator: Send + Sync {
    /// Returns the permitted state for `state` at wall-clock time `now`,
    /// appending one entry per decision to `log`.
    fn evaluate(&self, state: &RawState, log: &mut EvaluationLog, now: NaiveDateTime) -> RawState;
}

/// How a passcode entered to silence a sounding alarm is checked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PasscodeCheck {
    /// The given code must be non-empty and equal to the stored code.
    #[default]
    Exact,
    /// Compatibility mode: the given code is rejected only when it is
    /// non-empty and sorts before the stored code.
    Legacy,
}

impl PasscodeCheck {
    /// Returns `true` if `given` silences an alarm protected by `stored`.
    #[must_use]
    pub fn accepts(self, given: &str, stored: &str) -> bool {
        match self {
            Self::Exact => !given.is_empty() && given == stored,
            Self::Legacy => given.is_empty() || given >= stored,
        }
    }
}

/// The production rule-based evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleEvaluator {
    passcode_check: PasscodeCheck,
}

impl RuleEvaluator {
    /// Creates an evaluator with exact passcode matching.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how alarm passcodes are checked.
    #[must_use]
    pub fn with_passcode_check(mut self, check: PasscodeCheck) -> Self {
        self.passcode_check = check;
        self
    }

    /// Returns the configured passcode check.
    #[must_use]
    pub fn passcode_check(&self) -> PasscodeCheck {
        self.passcode_check
    }
}

impl StateEvaluator for RuleEvaluator {
    fn evaluate(&self, state: &RawState, log: &mut EvaluationLog, now: NaiveDateTime) -> RawState {
        for key in state.unrecognized().keys() {
            tracing::warn!(key = %key, "Unrecognized key in input state");
            log.push(now, format!("Warning: Unrecognized key in input state - {key}"));
        }

        let mut house = HouseState::from_raw(state);
        let mut pass = Pass::new(log, now, self.passcode_check);

        for (name, rule) in RULES {
            rule(&mut house, &mut pass);
            tracing::trace!(rule = name, "Applied house rule");
        }

        tracing::debug!(entries = log.len(), "Evaluated house state");
        house.into_raw()
    }
}
