// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The house key vocabulary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The kind of value a [`StateKey`] carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// `1` / `0` on the wire.
    Bool,
    /// Decimal integer.
    Int,
    /// Literal text without reserved characters.
    Text,
    /// One of the [`HvacMode`](crate::types::HvacMode) literals.
    Mode,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Text => "text",
            Self::Mode => "HVAC mode",
        })
    }
}

/// A key of the house state vocabulary.
///
/// The wire names are a stable external contract. Variants are declared in
/// vocabulary order, which is also the order pairs are encoded in.
///
/// # Examples
///
/// ```
/// use hearth_lib::state::{StateKey, ValueKind};
///
/// let key: StateKey = "DLS".parse().unwrap();
/// assert_eq!(key, StateKey::DoorLockState);
/// assert_eq!(key.kind(), ValueKind::Bool);
/// assert_eq!(StateKey::AlarmDelay.wire_name(), "ALARM_DELAY");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum StateKey {
    /// Current temperature (`TR`).
    #[serde(rename = "TR")]
    TempReading,
    /// Current humidity (`HR`).
    #[serde(rename = "HR")]
    HumidityReading,
    /// Desired temperature (`TT`).
    #[serde(rename = "TT")]
    TargetTemp,
    /// Night-lock window start, `HH*100+MM` (`NS`).
    #[serde(rename = "NS")]
    NightStart,
    /// Night-lock window end, `HH*100+MM` (`NE`).
    #[serde(rename = "NE")]
    NightEnd,
    /// Humidifier on (`HUS`).
    #[serde(rename = "HUS")]
    HumidifierState,
    /// Door open (`DS`).
    #[serde(rename = "DS")]
    DoorState,
    /// Door locked (`DLS`).
    #[serde(rename = "DLS")]
    DoorLockState,
    /// Light on (`LS`).
    #[serde(rename = "LS")]
    LightState,
    /// House occupied (`PS`).
    #[serde(rename = "PS")]
    ProximityState,
    /// Alarm armed (`AS`).
    #[serde(rename = "AS")]
    AlarmState,
    /// HVAC mode (`HM`).
    #[serde(rename = "HM")]
    HvacMode,
    /// Alarm sounding (`AA`).
    #[serde(rename = "AA")]
    AlarmActive,
    /// Heater on (`HES`).
    #[serde(rename = "HES")]
    HeaterState,
    /// Chiller on (`CHS`).
    #[serde(rename = "CHS")]
    ChillerState,
    /// Intruder flagged (`IS`).
    #[serde(rename = "IS")]
    IntruderState,
    /// Registered phone in proximity (`PP`).
    #[serde(rename = "PP")]
    PhoneProximity,
    /// Away timer set (`AW`).
    #[serde(rename = "AW")]
    AwayTimer,
    /// Alarm delay in seconds (`ALARM_DELAY`).
    #[serde(rename = "ALARM_DELAY")]
    AlarmDelay,
    /// Stored alarm passcode (`ALARM_PASSCODE`).
    #[serde(rename = "ALARM_PASSCODE")]
    AlarmPasscode,
    /// Passcode entered to disarm the alarm (`GIVEN_PASSCODE`).
    #[serde(rename = "GIVEN_PASSCODE")]
    GivenPasscode,
    /// Stored door-lock passcode (`DOOR_LOCK_PASSCODE`).
    #[serde(rename = "DOOR_LOCK_PASSCODE")]
    DoorLockPasscode,
    /// Passcode entered to unlock the door (`GIVEN_DOOR_LOCK_PASSCODE`).
    #[serde(rename = "GIVEN_DOOR_LOCK_PASSCODE")]
    GivenDoorLockPasscode,
}

impl StateKey {
    /// Every key, in vocabulary order.
    pub const ALL: [Self; 23] = [
        Self::TempReading,
        Self::HumidityReading,
        Self::TargetTemp,
        Self::NightStart,
        Self::NightEnd,
        Self::HumidifierState,
        Self::DoorState,
        Self::DoorLockState,
        Self::LightState,
        Self::ProximityState,
        Self::AlarmState,
        Self::HvacMode,
        Self::AlarmActive,
        Self::HeaterState,
        Self::ChillerState,
        Self::IntruderState,
        Self::PhoneProximity,
        Self::AwayTimer,
        Self::AlarmDelay,
        Self::AlarmPasscode,
        Self::GivenPasscode,
        Self::DoorLockPasscode,
        Self::GivenDoorLockPasscode,
    ];

    /// Returns the key as it appears on the wire.
    #[must_use]
    pub const fn wire_name(&self) -> &'static str {
        match self {
            Self::TempReading => "TR",
            Self::HumidityReading => "HR",
            Self::TargetTemp => "TT",
            Self::NightStart => "NS",
            Self::NightEnd => "NE",
            Self::HumidifierState => "HUS",
            Self::DoorState => "DS",
            Self::DoorLockState => "DLS",
            Self::LightState => "LS",
            Self::ProximityState => "PS",
            Self::AlarmState => "AS",
            Self::HvacMode => "HM",
            Self::AlarmActive => "AA",
            Self::HeaterState => "HES",
            Self::ChillerState => "CHS",
            Self::IntruderState => "IS",
            Self::PhoneProximity => "PP",
            Self::AwayTimer => "AW",
            Self::AlarmDelay => "ALARM_DELAY",
            Self::AlarmPasscode => "ALARM_PASSCODE",
            Self::GivenPasscode => "GIVEN_PASSCODE",
            Self::DoorLockPasscode => "DOOR_LOCK_PASSCODE",
            Self::GivenDoorLockPasscode => "GIVEN_DOOR_LOCK_PASSCODE",
        }
    }

    /// Returns the kind of value this key carries.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::TempReading
            | Self::HumidityReading
            | Self::TargetTemp
            | Self::NightStart
            | Self::NightEnd
            | Self::AlarmDelay => ValueKind::Int,
            Self::AlarmPasscode
            | Self::GivenPasscode
            | Self::DoorLockPasscode
            | Self::GivenDoorLockPasscode => ValueKind::Text,
            Self::HvacMode => ValueKind::Mode,
            _ => ValueKind::Bool,
        }
    }

    /// Returns `true` for keys backed by the house settings.
    #[must_use]
    pub const fn is_setting(&self) -> bool {
        matches!(
            self,
            Self::AlarmDelay
                | Self::TargetTemp
                | Self::NightStart
                | Self::NightEnd
                | Self::AlarmPasscode
                | Self::DoorLockPasscode
        )
    }

    /// Returns `true` for the passcodes entered with one request.
    ///
    /// They are checked during that request's evaluation and never kept
    /// on the device.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::GivenPasscode | Self::GivenDoorLockPasscode)
    }

    /// Returns `true` for keys carrying a passcode.
    ///
    /// Secret values travel on the wire but are left out of serialized
    /// state.
    #[must_use]
    pub const fn is_secret(&self) -> bool {
        matches!(self.kind(), ValueKind::Text)
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for StateKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.wire_name() == s)
            .ok_or_else(|| s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_parse_back() {
        for key in StateKey::ALL {
            assert_eq!(key.wire_name().parse::<StateKey>().unwrap(), key);
        }
    }

    #[test]
    fn unknown_wire_name() {
        assert_eq!("XYZ".parse::<StateKey>(), Err("XYZ".to_string()));
        assert!("tr".parse::<StateKey>().is_err());
    }

    #[test]
    fn all_is_in_declaration_order() {
        let mut sorted = StateKey::ALL;
        sorted.sort();
        assert_eq!(sorted, StateKey::ALL);
    }

    #[test]
    fn kinds() {
        assert_eq!(StateKey::TempReading.kind(), ValueKind::Int);
        assert_eq!(StateKey::AlarmDelay.kind(), ValueKind::Int);
        assert_eq!(StateKey::GivenPasscode.kind(), ValueKind::Text);
        assert_eq!(StateKey::HvacMode.kind(), ValueKind::Mode);
        assert_eq!(StateKey::AwayTimer.kind(), ValueKind::Bool);
        assert_eq!(StateKey::DoorLockState.kind(), ValueKind::Bool);
    }

    #[test]
    fn setting_keys() {
        let settings: Vec<_> = StateKey::ALL.into_iter().filter(StateKey::is_setting).collect();
        assert_eq!(
            settings,
            vec![
                StateKey::TargetTemp,
                StateKey::NightStart,
                StateKey::NightEnd,
                StateKey::AlarmDelay,
                StateKey::AlarmPasscode,
                StateKey::DoorLockPasscode,
            ]
        );
    }

    #[test]
    fn transient_and_secret_keys() {
        let transient: Vec<_> = StateKey::ALL.into_iter().filter(StateKey::is_transient).collect();
        assert_eq!(
            transient,
            vec![StateKey::GivenPasscode, StateKey::GivenDoorLockPasscode]
        );

        let secret = StateKey::ALL.into_iter().filter(StateKey::is_secret).count();
        assert_eq!(secret, 4);
        assert!(StateKey::AlarmPasscode.is_secret());
        assert!(!StateKey::AlarmPasscode.is_transient());
        assert!(!StateKey::AlarmDelay.is_secret());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&StateKey::GivenDoorLockPasscode).unwrap();
        assert_eq!(json, "\"GIVEN_DOOR_LOCK_PASSCODE\"");
    }
}
