// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed house record the rules operate on.

use crate::state::{RawState, StateKey, StateValue};
use crate::types::HvacMode;

/// The house state with one field per key.
///
/// Flags the rules need an answer for default to `false`; readings,
/// settings and actuators that may genuinely be unknown stay optional.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct HouseState {
    pub temperature: Option<i32>,
    pub humidity: Option<i32>,
    pub target_temperature: Option<i32>,
    pub night_start: Option<i32>,
    pub night_end: Option<i32>,

    pub humidifier: Option<bool>,
    pub heater: Option<bool>,
    pub chiller: Option<bool>,
    pub hvac_mode: Option<HvacMode>,

    pub door_open: bool,
    pub door_locked: bool,
    pub light_on: bool,
    pub occupied: bool,
    pub armed: bool,
    pub alarm_active: bool,
    pub intruder: bool,
    pub phone_nearby: bool,
    pub away_timer: bool,

    pub alarm_passcode: Option<String>,
    pub given_passcode: String,
    pub door_lock_passcode: Option<String>,
    pub given_door_lock_passcode: String,

    /// Recognized keys the rules do not cover.
    pub passthrough: RawState,
}

impl HouseState {
    /// Builds the record from a raw state.
    ///
    /// Unrecognized pairs are not carried; the caller reports them.
    pub fn from_raw(state: &RawState) -> Self {
        let mut house = Self::default();

        for (key, value) in state.iter() {
            match (key, value) {
                (StateKey::TempReading, StateValue::Int(v)) => house.temperature = Some(*v),
                (StateKey::HumidityReading, StateValue::Int(v)) => house.humidity = Some(*v),
                (StateKey::TargetTemp, StateValue::Int(v)) => house.target_temperature = Some(*v),
                (StateKey::NightStart, StateValue::Int(v)) => house.night_start = Some(*v),
                (StateKey::NightEnd, StateValue::Int(v)) => house.night_end = Some(*v),
                (StateKey::HumidifierState, StateValue::Bool(v)) => house.humidifier = Some(*v),
                (StateKey::HeaterState, StateValue::Bool(v)) => house.heater = Some(*v),
                (StateKey::ChillerState, StateValue::Bool(v)) => house.chiller = Some(*v),
                (StateKey::HvacMode, StateValue::Mode(mode)) => house.hvac_mode = Some(*mode),
                (StateKey::DoorState, StateValue::Bool(v)) => house.door_open = *v,
                (StateKey::DoorLockState, StateValue::Bool(v)) => house.door_locked = *v,
                (StateKey::LightState, StateValue::Bool(v)) => house.light_on = *v,
                (StateKey::ProximityState, StateValue::Bool(v)) => house.occupied = *v,
                (StateKey::AlarmState, StateValue::Bool(v)) => house.armed = *v,
                (StateKey::AlarmActive, StateValue::Bool(v)) => house.alarm_active = *v,
                (StateKey::IntruderState, StateValue::Bool(v)) => house.intruder = *v,
                (StateKey::PhoneProximity, StateValue::Bool(v)) => house.phone_nearby = *v,
                (StateKey::AwayTimer, StateValue::Bool(v)) => house.away_timer = *v,
                (StateKey::AlarmPasscode, StateValue::Text(v)) => {
                    house.alarm_passcode = Some(v.clone());
                }
                (StateKey::GivenPasscode, StateValue::Text(v)) => house.given_passcode.clone_from(v),
                (StateKey::DoorLockPasscode, StateValue::Text(v)) => {
                    house.door_lock_passcode = Some(v.clone());
                }
                (StateKey::GivenDoorLockPasscode, StateValue::Text(v)) => {
                    house.given_door_lock_passcode.clone_from(v);
                }
                (key, value) => house.passthrough.put(key, value.clone()),
            }
        }

        house
    }

    /// Converts the record back into a raw state.
    pub fn into_raw(self) -> RawState {
        let mut state = self.passthrough;

        let ints = [
            (StateKey::TempReading, self.temperature),
            (StateKey::HumidityReading, self.humidity),
            (StateKey::TargetTemp, self.target_temperature),
            (StateKey::NightStart, self.night_start),
            (StateKey::NightEnd, self.night_end),
        ];
        for (key, value) in ints {
            if let Some(value) = value {
                state.put(key, StateValue::Int(value));
            }
        }

        let optional_flags = [
            (StateKey::HumidifierState, self.humidifier),
            (StateKey::HeaterState, self.heater),
            (StateKey::ChillerState, self.chiller),
        ];
        for (key, value) in optional_flags {
            if let Some(value) = value {
                state.put(key, StateValue::Bool(value));
            }
        }

        let flags = [
            (StateKey::DoorState, self.door_open),
            (StateKey::DoorLockState, self.door_locked),
            (StateKey::LightState, self.light_on),
            (StateKey::ProximityState, self.occupied),
            (StateKey::AlarmState, self.armed),
            (StateKey::AlarmActive, self.alarm_active),
            (StateKey::IntruderState, self.intruder),
            (StateKey::PhoneProximity, self.phone_nearby),
            (StateKey::AwayTimer, self.away_timer),
        ];
        for (key, value) in flags {
            state.put(key, StateValue::Bool(value));
        }

        if let Some(mode) = self.hvac_mode {
            state.put(StateKey::HvacMode, StateValue::Mode(mode));
        }
        if let Some(code) = self.alarm_passcode {
            state.put(StateKey::AlarmPasscode, StateValue::Text(code));
        }
        if let Some(code) = self.door_lock_passcode {
            state.put(StateKey::DoorLockPasscode, StateValue::Text(code));
        }
        state.put(StateKey::GivenPasscode, StateValue::Text(self.given_passcode));
        state.put(
            StateKey::GivenDoorLockPasscode,
            StateValue::Text(self.given_door_lock_passcode),
        );

        state
    }
}
