// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Keyed house state.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

use super::{StateKey, StateValue, ValueKind};
use crate::error::{ParseError, ValueError};
use crate::types::HvacMode;

/// Characters the wire protocol reserves as delimiters.
const RESERVED: [char; 6] = [';', ':', '=', '.', '\n', '\r'];

/// A mapping from house keys to typed values.
///
/// Every key appears at most once and every value matches its key's
/// [`ValueKind`]. Pairs that arrived on the wire under an unknown key are
/// held separately so the evaluator can report them; they are never
/// re-encoded.
///
/// Serialized state leaves out every passcode; the wire encoding keeps
/// them.
///
/// # Examples
///
/// ```
/// use hearth_lib::state::{RawState, StateKey};
///
/// let mut state = RawState::new();
/// state.set(StateKey::TempReading, 72).unwrap();
/// state.set(StateKey::DoorState, true).unwrap();
///
/// assert_eq!(state.int(StateKey::TempReading), Some(72));
/// assert_eq!(state.bool(StateKey::DoorState), Some(true));
///
/// // Values of the wrong kind are rejected
/// assert!(state.set(StateKey::DoorState, 1).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawState {
    #[serde(serialize_with = "serialize_public")]
    values: BTreeMap<StateKey, StateValue>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    unrecognized: BTreeMap<String, String>,
}

impl RawState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a value, replacing any previous value for the key.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::KindMismatch` if the value kind does not match
    /// the key, or `ValueError::ReservedCharacter` if a text value contains
    /// a protocol delimiter.
    pub fn set(&mut self, key: StateKey, value: impl Into<StateValue>) -> Result<(), ValueError> {
        let value = value.into();

        if value.kind() != key.kind() {
            return Err(ValueError::KindMismatch {
                key,
                expected: key.kind(),
                actual: value.kind(),
            });
        }

        if let StateValue::Text(text) = &value
            && text.contains(RESERVED)
        {
            return Err(ValueError::ReservedCharacter {
                key,
                value: text.clone(),
            });
        }

        self.values.insert(key, value);
        Ok(())
    }

    /// Builder form of [`set`](Self::set).
    ///
    /// # Errors
    ///
    /// Same as [`set`](Self::set).
    pub fn with(mut self, key: StateKey, value: impl Into<StateValue>) -> Result<Self, ValueError> {
        self.set(key, value)?;
        Ok(self)
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: StateKey) -> Option<&StateValue> {
        self.values.get(&key)
    }

    /// Returns a boolean value, or `None` if absent.
    #[must_use]
    pub fn bool(&self, key: StateKey) -> Option<bool> {
        match self.values.get(&key) {
            Some(StateValue::Bool(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns an integer value, or `None` if absent.
    #[must_use]
    pub fn int(&self, key: StateKey) -> Option<i32> {
        match self.values.get(&key) {
            Some(StateValue::Int(value)) => Some(*value),
            _ => None,
        }
    }

    /// Returns a text value, or `None` if absent.
    #[must_use]
    pub fn text(&self, key: StateKey) -> Option<&str> {
        match self.values.get(&key) {
            Some(StateValue::Text(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns the HVAC mode, or `None` if absent.
    #[must_use]
    pub fn hvac_mode(&self) -> Option<HvacMode> {
        match self.values.get(&StateKey::HvacMode) {
            Some(StateValue::Mode(mode)) => Some(*mode),
            _ => None,
        }
    }

    /// Removes and returns the value for a key.
    pub fn remove(&mut self, key: StateKey) -> Option<StateValue> {
        self.values.remove(&key)
    }

    /// Returns `true` if a value is present for the key.
    #[must_use]
    pub fn contains(&self, key: StateKey) -> bool {
        self.values.contains_key(&key)
    }

    /// Returns the number of recognized values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no recognized values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over the recognized values in vocabulary order.
    pub fn iter(&self) -> impl Iterator<Item = (StateKey, &StateValue)> {
        self.values.iter().map(|(key, value)| (*key, value))
    }

    /// Overlays `other` onto this state. Values from `other` win.
    pub fn merge(&mut self, other: &RawState) {
        for (key, value) in &other.values {
            self.values.insert(*key, value.clone());
        }
        for (key, value) in &other.unrecognized {
            self.unrecognized.insert(key.clone(), value.clone());
        }
    }

    /// Removes the passcodes entered with a single request.
    pub fn strip_transient(&mut self) {
        self.values.retain(|key, _| !key.is_transient());
    }

    /// Decodes one `KEY=VALUE` pair from the wire and stores it.
    ///
    /// Unknown keys are kept as unrecognized pairs.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidValue` if the value cannot be parsed as
    /// the kind the key expects.
    pub fn apply_wire_pair(&mut self, key: &str, raw: &str) -> Result<(), ParseError> {
        let Ok(state_key) = key.parse::<StateKey>() else {
            self.unrecognized.insert(key.to_string(), raw.to_string());
            return Ok(());
        };

        let invalid = |message: String| ParseError::InvalidValue {
            field: key.to_string(),
            message,
        };

        let value = match state_key.kind() {
            ValueKind::Bool => match raw {
                "1" => StateValue::Bool(true),
                "0" => StateValue::Bool(false),
                other => return Err(invalid(format!("expected 1 or 0, got {other:?}"))),
            },
            ValueKind::Int => raw
                .parse::<i32>()
                .map(StateValue::Int)
                .map_err(|e| invalid(e.to_string()))?,
            ValueKind::Text if raw.contains(RESERVED) => {
                return Err(invalid("contains a reserved protocol character".to_string()));
            }
            ValueKind::Text => StateValue::Text(raw.to_string()),
            ValueKind::Mode => raw
                .parse::<HvacMode>()
                .map(StateValue::Mode)
                .map_err(|e| invalid(e.to_string()))?,
        };

        self.values.insert(state_key, value);
        Ok(())
    }

    /// Stores a value whose kind is already known to match its key.
    pub(crate) fn put(&mut self, key: StateKey, value: StateValue) {
        debug_assert_eq!(key.kind(), value.kind());
        self.values.insert(key, value);
    }

    /// Returns the pairs that arrived under unknown keys.
    #[must_use]
    pub fn unrecognized(&self) -> &BTreeMap<String, String> {
        &self.unrecognized
    }

    /// Records a pair under an unknown key.
    pub fn insert_unrecognized(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.unrecognized.insert(key.into(), value.into());
    }
}

fn serialize_public<S: Serializer>(
    values: &BTreeMap<StateKey, StateValue>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(values.iter().filter(|(key, _)| !key.is_secret()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_and_get() {
        let mut state = RawState::new();
        state.set(StateKey::TargetTemp, 70).unwrap();
        state.set(StateKey::AlarmPasscode, "1234").unwrap();
        state.set(StateKey::HvacMode, HvacMode::Heater).unwrap();

        assert_eq!(state.int(StateKey::TargetTemp), Some(70));
        assert_eq!(state.text(StateKey::AlarmPasscode), Some("1234"));
        assert_eq!(state.hvac_mode(), Some(HvacMode::Heater));
        assert_eq!(state.bool(StateKey::TargetTemp), None);
        assert_eq!(state.len(), 3);
    }

    #[test]
    fn set_rejects_wrong_kind() {
        let mut state = RawState::new();
        let err = state.set(StateKey::TempReading, true).unwrap_err();
        assert_eq!(
            err,
            ValueError::KindMismatch {
                key: StateKey::TempReading,
                expected: ValueKind::Int,
                actual: ValueKind::Bool,
            }
        );
        assert!(state.is_empty());
    }

    #[test]
    fn set_rejects_reserved_characters() {
        let mut state = RawState::new();
        for bad in ["12;34", "a:b", "k=v", "end.", "two\nlines"] {
            assert!(matches!(
                state.set(StateKey::GivenPasscode, bad),
                Err(ValueError::ReservedCharacter { .. })
            ));
        }
        state.set(StateKey::GivenPasscode, "").unwrap();
        assert_eq!(state.text(StateKey::GivenPasscode), Some(""));
    }

    #[test]
    fn set_replaces_previous_value() {
        let mut state = RawState::new();
        state.set(StateKey::LightState, true).unwrap();
        state.set(StateKey::LightState, false).unwrap();
        assert_eq!(state.bool(StateKey::LightState), Some(false));
        assert_eq!(state.len(), 1);
    }

    #[test]
    fn merge_right_hand_side_wins() {
        let mut base = RawState::new()
            .with(StateKey::TempReading, 60)
            .unwrap()
            .with(StateKey::DoorState, false)
            .unwrap();
        let overlay = RawState::new()
            .with(StateKey::TempReading, 65)
            .unwrap()
            .with(StateKey::LightState, true)
            .unwrap();

        base.merge(&overlay);

        assert_eq!(base.int(StateKey::TempReading), Some(65));
        assert_eq!(base.bool(StateKey::DoorState), Some(false));
        assert_eq!(base.bool(StateKey::LightState), Some(true));
    }

    #[test]
    fn apply_wire_pair_kinds() {
        let mut state = RawState::new();
        state.apply_wire_pair("DS", "1").unwrap();
        state.apply_wire_pair("TR", "-4").unwrap();
        state.apply_wire_pair("HM", "Chiller").unwrap();
        state.apply_wire_pair("ALARM_PASSCODE", "9876").unwrap();

        assert_eq!(state.bool(StateKey::DoorState), Some(true));
        assert_eq!(state.int(StateKey::TempReading), Some(-4));
        assert_eq!(state.hvac_mode(), Some(HvacMode::Chiller));
        assert_eq!(state.text(StateKey::AlarmPasscode), Some("9876"));
    }

    #[test]
    fn apply_wire_pair_rejects_bad_values() {
        let mut state = RawState::new();
        assert!(matches!(
            state.apply_wire_pair("DS", "true"),
            Err(ParseError::InvalidValue { field, .. }) if field == "DS"
        ));
        assert!(state.apply_wire_pair("TR", "warm").is_err());
        assert!(state.apply_wire_pair("HM", "Fan").is_err());
        assert!(state.apply_wire_pair("GIVEN_PASSCODE", "12=34").is_err());
        assert!(state.is_empty());
    }

    #[test]
    fn apply_wire_pair_keeps_unknown_keys_aside() {
        let mut state = RawState::new();
        state.apply_wire_pair("FOO", "bar").unwrap();

        assert!(state.is_empty());
        assert_eq!(state.unrecognized().get("FOO").map(String::as_str), Some("bar"));
    }

    #[test]
    fn iter_in_vocabulary_order() {
        let state = RawState::new()
            .with(StateKey::AwayTimer, false)
            .unwrap()
            .with(StateKey::TempReading, 70)
            .unwrap()
            .with(StateKey::DoorState, true)
            .unwrap();

        let keys: Vec<_> = state.iter().map(|(key, _)| key).collect();
        assert_eq!(
            keys,
            vec![StateKey::TempReading, StateKey::DoorState, StateKey::AwayTimer]
        );
    }

    #[test]
    fn serializes_with_wire_names() {
        let state = RawState::new()
            .with(StateKey::TempReading, 70)
            .unwrap()
            .with(StateKey::DoorState, true)
            .unwrap();

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["values"]["TR"], 70);
        assert_eq!(json["values"]["DS"], true);
        assert!(json.get("unrecognized").is_none());
    }

    #[test]
    fn serialization_omits_passcodes() {
        let state = RawState::new()
            .with(StateKey::LightState, true)
            .unwrap()
            .with(StateKey::AlarmPasscode, "1234")
            .unwrap()
            .with(StateKey::GivenPasscode, "1234")
            .unwrap()
            .with(StateKey::DoorLockPasscode, "0000")
            .unwrap()
            .with(StateKey::GivenDoorLockPasscode, "0000")
            .unwrap();

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"values":{"LS":true}}"#);
        // Still on the value itself
        assert_eq!(state.text(StateKey::AlarmPasscode), Some("1234"));
    }

    #[test]
    fn strip_transient_keeps_stored_codes() {
        let mut state = RawState::new()
            .with(StateKey::DoorLockPasscode, "0000")
            .unwrap()
            .with(StateKey::GivenDoorLockPasscode, "0000")
            .unwrap()
            .with(StateKey::GivenPasscode, "1234")
            .unwrap();

        state.strip_transient();

        assert_eq!(state.text(StateKey::DoorLockPasscode), Some("0000"));
        assert!(!state.contains(StateKey::GivenDoorLockPasscode));
        assert!(!state.contains(StateKey::GivenPasscode));
    }
}
