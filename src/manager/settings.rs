// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! House settings.

use serde::{Deserialize, Serialize};

use crate::error::ValueError;
use crate::state::{RawState, StateKey};

/// User-configured parameters of one house.
///
/// Settings are pushed to the device and merged into every proposed state
/// before it is evaluated. Passcodes are never serialized.
///
/// # Examples
///
/// ```
/// use hearth_lib::manager::Settings;
/// use hearth_lib::state::StateKey;
///
/// let settings = Settings::new()
///     .with_target_temperature(70)
///     .with_night_window(2200, 600)
///     .with_alarm_passcode("1234");
///
/// let state = settings.to_raw_state().unwrap();
/// assert_eq!(state.int(StateKey::NightStart), Some(2200));
/// assert_eq!(state.text(StateKey::AlarmPasscode), Some("1234"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds before an armed alarm sounds.
    pub alarm_delay: Option<i32>,
    /// Desired temperature in degrees Fahrenheit.
    pub target_temperature: Option<i32>,
    /// Night-lock window start, `HH*100+MM`.
    pub night_start: Option<i32>,
    /// Night-lock window end, `HH*100+MM`.
    pub night_end: Option<i32>,
    /// Passcode that silences the alarm.
    #[serde(skip_serializing)]
    pub alarm_passcode: Option<String>,
    /// Passcode that opens the door lock.
    #[serde(skip_serializing)]
    pub door_lock_passcode: Option<String>,
}

impl Settings {
    /// Creates empty settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the alarm delay in seconds.
    #[must_use]
    pub fn with_alarm_delay(mut self, seconds: i32) -> Self {
        self.alarm_delay = Some(seconds);
        self
    }

    /// Sets the target temperature.
    #[must_use]
    pub fn with_target_temperature(mut self, degrees: i32) -> Self {
        self.target_temperature = Some(degrees);
        self
    }

    /// Sets the night-lock window from two `HH*100+MM` encodings.
    #[must_use]
    pub fn with_night_window(mut self, start: i32, end: i32) -> Self {
        self.night_start = Some(start);
        self.night_end = Some(end);
        self
    }

    /// Sets the alarm passcode.
    #[must_use]
    pub fn with_alarm_passcode(mut self, code: impl Into<String>) -> Self {
        self.alarm_passcode = Some(code.into());
        self
    }

    /// Sets the door-lock passcode.
    #[must_use]
    pub fn with_door_lock_passcode(mut self, code: impl Into<String>) -> Self {
        self.door_lock_passcode = Some(code.into());
        self
    }

    /// Merges every settings key present in `state`.
    ///
    /// Returns `true` if any setting changed.
    pub fn merge(&mut self, state: &RawState) -> bool {
        let mut changed = self.absorb_update(state);
        changed |= replace(&mut self.alarm_passcode, state.text(StateKey::AlarmPasscode).map(str::to_string));
        changed |= replace(
            &mut self.door_lock_passcode,
            state.text(StateKey::DoorLockPasscode).map(str::to_string),
        );
        changed
    }

    /// Merges the settings a caller may change alongside a state update:
    /// alarm delay, target temperature and the night window.
    ///
    /// Returns `true` if any setting changed.
    pub fn absorb_update(&mut self, state: &RawState) -> bool {
        let mut changed = false;
        changed |= replace(&mut self.alarm_delay, state.int(StateKey::AlarmDelay));
        changed |= replace(&mut self.target_temperature, state.int(StateKey::TargetTemp));
        changed |= replace(&mut self.night_start, state.int(StateKey::NightStart));
        changed |= replace(&mut self.night_end, state.int(StateKey::NightEnd));
        changed
    }

    /// Returns the configured settings as state values.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::ReservedCharacter` if a passcode contains a
    /// protocol delimiter.
    pub fn to_raw_state(&self) -> Result<RawState, ValueError> {
        let mut state = RawState::new();

        let ints = [
            (StateKey::AlarmDelay, self.alarm_delay),
            (StateKey::TargetTemp, self.target_temperature),
            (StateKey::NightStart, self.night_start),
            (StateKey::NightEnd, self.night_end),
        ];
        for (key, value) in ints {
            if let Some(value) = value {
                state.set(key, value)?;
            }
        }

        if let Some(code) = &self.alarm_passcode {
            state.set(StateKey::AlarmPasscode, code.as_str())?;
        }
        if let Some(code) = &self.door_lock_passcode {
            state.set(StateKey::DoorLockPasscode, code.as_str())?;
        }

        Ok(state)
    }
}

/// Stores `incoming` if present, returning `true` on change.
fn replace<T: PartialEq>(slot: &mut Option<T>, incoming: Option<T>) -> bool {
    match incoming {
        Some(value) if slot.as_ref() != Some(&value) => {
            *slot = Some(value);
            true
        }
        _ => false,
    }
}
