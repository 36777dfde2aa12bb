// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The house rule pipeline.
//!
//! Each rule is a step over the typed [`HouseState`]. Steps run in the
//! order of [`RULES`] and may read anything an earlier step changed in the
//! same pass.

use chrono::NaiveDateTime;

use super::house::HouseState;
use super::{EvaluationLog, PasscodeCheck};
use crate::types::{HvacMode, NightWindow};

/// Context shared by the steps of one evaluation pass.
pub(crate) struct Pass<'a> {
    log: &'a mut EvaluationLog,
    now: NaiveDateTime,
    passcode_check: PasscodeCheck,
    /// Whether the door was open when the door-open rule ran.
    door_was_open: bool,
    /// Set when the away timer fired during this pass.
    away_timer_expired: bool,
}

impl<'a> Pass<'a> {
    pub fn new(log: &'a mut EvaluationLog, now: NaiveDateTime, passcode_check: PasscodeCheck) -> Self {
        Self {
            log,
            now,
            passcode_check,
            door_was_open: false,
            away_timer_expired: false,
        }
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.log.push(self.now, message);
    }
}

/// A single rule step.
pub(crate) type Rule = fn(&mut HouseState, &mut Pass<'_>);

/// The rule pipeline, in evaluation order.
pub(crate) const RULES: [(&str, Rule); 14] = [
    ("light_guard", light_guard),
    ("trusted_proximity", trusted_proximity),
    ("intruder_override", intruder_override),
    ("door_open", door_open),
    ("door_closed", door_closed),
    ("lock_passcode", lock_passcode),
    ("away_timer_expiry", away_timer_expiry),
    ("occupancy", occupancy),
    ("arm_disarm", arm_disarm),
    ("alarm_recompute", alarm_recompute),
    ("hvac_demand", hvac_demand),
    ("hvac_exclusion", hvac_exclusion),
    ("humidifier_gating", humidifier_gating),
    ("night_lock", night_lock),
];

fn light_guard(house: &mut HouseState, pass: &mut Pass<'_>) {
    if !house.light_on {
        pass.note("Light off");
    } else if house.occupied {
        pass.note("Light on");
    } else {
        house.light_on = false;
        pass.note("Cannot turn on light because user not home");
    }
}

fn trusted_proximity(house: &mut HouseState, pass: &mut Pass<'_>) {
    if house.phone_nearby && !house.intruder {
        house.door_locked = false;
        house.door_open = true;
        pass.note("Registered phone detected, opening and unlocking door");
    }
}

fn intruder_override(house: &mut HouseState, pass: &mut Pass<'_>) {
    if house.intruder {
        house.door_open = false;
        house.door_locked = true;
        pass.note("Possible intruder detected");
    } else {
        pass.note("All clear");
    }
}

fn door_open(house: &mut HouseState, pass: &mut Pass<'_>) {
    pass.door_was_open = house.door_open;
    if !house.door_open {
        return;
    }

    if !house.occupied && house.armed {
        house.alarm_active = true;
        pass.note("Break in detected: Activating alarm");
    } else if !house.occupied {
        house.door_open = false;
        pass.note("Closed door because house vacant and no registered devices are in proximity");
    } else if house.door_locked {
        house.door_open = false;
        pass.note("Closed door because the lock is engaged");
    } else {
        pass.note("Door open");
    }
}

/// Runs only when the door was already closed before [`door_open`] ran.
///
/// The break-in check looks at armed and occupied in the same pass, not at
/// a vacant to occupied transition.
fn door_closed(house: &mut HouseState, pass: &mut Pass<'_>) {
    if pass.door_was_open {
        return;
    }

    pass.note("Closed door");
    if house.armed && house.occupied {
        house.alarm_active = true;
        pass.note("Break in detected: Activating alarm");
    }
}

fn lock_passcode(house: &mut HouseState, pass: &mut Pass<'_>) {
    if !house.door_locked {
        return;
    }

    let stored = house.door_lock_passcode.as_deref().unwrap_or_default();
    if stored == house.given_door_lock_passcode && !house.intruder {
        house.door_locked = false;
    } else {
        pass.note("Invalid door lock passcode");
    }
}

fn away_timer_expiry(house: &mut HouseState, pass: &mut Pass<'_>) {
    if !house.away_timer {
        return;
    }

    house.light_on = false;
    pass.note("Away timer expired: turning off lights");
    house.door_open = false;
    house.door_locked = true;
    house.armed = true;
    pass.note("Away timer expired: closing door");
    house.away_timer = false;
    pass.away_timer_expired = true;
}

fn occupancy(house: &mut HouseState, pass: &mut Pass<'_>) {
    if house.occupied {
        pass.note("House is occupied");
        if !house.light_on && !house.armed {
            house.light_on = true;
            pass.note("Turning on light");
        }
    } else if !pass.away_timer_expired {
        house.away_timer = true;
        pass.note("Away timer started because house is empty");
    }
}

fn arm_disarm(house: &mut HouseState, pass: &mut Pass<'_>) {
    if house.armed {
        pass.note("Alarm enabled");
    } else {
        if !house.occupied {
            house.armed = true;
            pass.note("Cannot disable the alarm, house is empty");
        }

        if house.alarm_active {
            let stored = house.alarm_passcode.as_deref().unwrap_or_default();
            if pass.passcode_check.accepts(&house.given_passcode, stored) {
                house.alarm_active = false;
                pass.note("Correct passcode entered, disabled alarm");
            } else {
                house.armed = true;
                pass.note("Cannot disable alarm, invalid passcode given");
            }
        }
    }

    if !house.armed {
        house.alarm_active = false;
        pass.note("Alarm disabled");
    }
}

fn alarm_recompute(house: &mut HouseState, pass: &mut Pass<'_>) {
    house.alarm_active = house.armed
        && ((!house.door_open && house.occupied) || (house.door_open && !house.occupied));

    if house.alarm_active {
        pass.note("Activating alarm");
    } else {
        pass.note("Alarm not activated");
    }
}

fn hvac_demand(house: &mut HouseState, pass: &mut Pass<'_>) {
    let (Some(current), Some(target)) = (house.temperature, house.target_temperature) else {
        return;
    };

    if current < target {
        house.heater = Some(true);
        pass.note(format!(
            "Turning on heater, target temperature = {target}F, current temperature = {current}F"
        ));
    } else {
        house.heater = Some(false);
    }

    if current > target {
        if house.chiller != Some(true) {
            house.chiller = Some(true);
            pass.note(format!(
                "Turning on air conditioner target temperature = {target}F, current temperature = {current}F"
            ));
        }
    } else {
        house.chiller = Some(false);
    }
}

fn hvac_exclusion(house: &mut HouseState, pass: &mut Pass<'_>) {
    if house.chiller == Some(true) {
        house.hvac_mode = Some(HvacMode::Chiller);
    } else if house.heater == Some(true) {
        house.hvac_mode = Some(HvacMode::Heater);
    }

    match house.hvac_mode {
        Some(HvacMode::Heater) => {
            if house.chiller == Some(true) {
                pass.note("Turning off air conditioner");
            }
            house.chiller = Some(false);
            house.humidifier = Some(false);
        }
        Some(HvacMode::Chiller) => {
            if house.heater == Some(true) {
                pass.note("Turning off heater");
            }
            house.heater = Some(false);
        }
        Some(HvacMode::Off) | None => {}
    }
}

fn humidifier_gating(house: &mut HouseState, pass: &mut Pass<'_>) {
    if house.humidifier == Some(true) && house.hvac_mode == Some(HvacMode::Chiller) {
        pass.note("Enabled Dehumidifier");
    } else {
        house.humidifier = Some(false);
        pass.note("Automatically disabled dehumidifier when running heater");
    }
}

fn night_lock(house: &mut HouseState, pass: &mut Pass<'_>) {
    let (Some(start), Some(end)) = (house.night_start, house.night_end) else {
        return;
    };
    if start == end {
        return;
    }

    match NightWindow::from_encoded(start, end) {
        Ok(window) => {
            if window.contains(pass.now.time()) && !house.door_open {
                house.door_locked = true;
                pass.note("Night lock engaged");
            }
        }
        Err(_) => pass.note("Night lock is disabled due to invalid time specifications"),
    }
}
