// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Point-in-time view of a house.

use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{HouseId, Settings};
use crate::state::RawState;

/// What a read of the house returned.
///
/// A snapshot with no `state` is the "unknown" placeholder returned when
/// the device is not connected; every other field is still filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HouseSnapshot {
    /// The house this snapshot belongs to.
    pub house: HouseId,
    /// Wall-clock time of the read.
    pub taken_at: NaiveDateTime,
    /// The device state, if it could be read.
    pub state: Option<RawState>,
    /// The cached settings.
    pub settings: Settings,
    /// Log lines of the most recent evaluation.
    pub log: Vec<String>,
    /// Accumulated light-on time.
    pub lights_on: Duration,
    /// Number of intruder alerts seen.
    pub intruder_occurrences: u32,
    /// Whether the device was connected at the time of the read.
    pub connected: bool,
}

impl HouseSnapshot {
    /// Returns `true` if the snapshot carries a device state.
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.state.is_some()
    }

    /// Returns the number of whole minutes the light has been on.
    #[must_use]
    pub fn light_minutes(&self) -> u64 {
        self.lights_on.as_secs() / 60
    }
}
