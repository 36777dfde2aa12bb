// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Identity of a controlled house.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Random identity assigned to a [`ControlManager`](super::ControlManager).
///
/// It tags the manager's tracing events and every [`HouseSnapshot`](super::HouseSnapshot)
/// it produces, so recordings of several houses can share one sink. It
/// serializes as a bare hyphenated UUID and parses back from one.
///
/// # Examples
///
/// ```
/// use hearth_lib::manager::HouseId;
///
/// let id = HouseId::new();
/// let parsed: HouseId = id.to_string().parse().unwrap();
/// assert_eq!(parsed, id);
/// assert_eq!(id.short().len(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HouseId(Uuid);

impl HouseId {
    /// Draws a fresh random (v4) identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Returns the leading eight hex digits, used as a compact label.
    #[must_use]
    pub fn short(&self) -> String {
        let mut label = self.0.simple().to_string();
        label.truncate(8);
        label
    }
}

impl Default for HouseId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HouseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for HouseId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXED: &str = "5f0c9a3e-7b21-4d8e-9c44-0a1b2c3d4e5f";

    #[test]
    fn fresh_ids_differ() {
        assert_ne!(HouseId::new(), HouseId::default());
    }

    #[test]
    fn parses_and_displays_hyphenated() {
        let id: HouseId = FIXED.parse().unwrap();
        assert_eq!(id.to_string(), FIXED);
        assert_eq!(id.short(), "5f0c9a3e");
        assert_eq!(id.as_uuid(), Uuid::parse_str(FIXED).unwrap());
    }

    #[test]
    fn rejects_non_uuid_text() {
        assert!("house-1".parse::<HouseId>().is_err());
    }

    #[test]
    fn serde_is_transparent() {
        let id: HouseId = FIXED.parse().unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{FIXED}\""));

        let back: HouseId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
