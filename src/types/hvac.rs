// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HVAC mode type.

use std::fmt;
use std::str::FromStr;

use crate::error::ValueError;

/// HVAC operating mode as carried by the `HM` key.
///
/// # Examples
///
/// ```
/// use hearth_lib::types::HvacMode;
///
/// let mode: HvacMode = "Chiller".parse().unwrap();
/// assert_eq!(mode, HvacMode::Chiller);
/// assert_eq!(HvacMode::Heater.to_string(), "Heater");
/// assert!("cool".parse::<HvacMode>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum HvacMode {
    /// Heating.
    Heater,
    /// Cooling (air conditioner with optional dehumidifier).
    Chiller,
    /// Neither heating nor cooling.
    Off,
}

impl HvacMode {
    /// Returns the wire literal for this mode.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Heater => "Heater",
            Self::Chiller => "Chiller",
            Self::Off => "Off",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Heater" => Ok(Self::Heater),
            "Chiller" => Ok(Self::Chiller),
            "Off" => Ok(Self::Off),
            other => Err(ValueError::InvalidHvacMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_literals() {
        assert_eq!("Heater".parse::<HvacMode>().unwrap(), HvacMode::Heater);
        assert_eq!("Chiller".parse::<HvacMode>().unwrap(), HvacMode::Chiller);
        assert_eq!("Off".parse::<HvacMode>().unwrap(), HvacMode::Off);
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(
            "heater".parse::<HvacMode>(),
            Err(ValueError::InvalidHvacMode("heater".to_string()))
        );
    }

    #[test]
    fn display_matches_wire_literal() {
        for mode in [HvacMode::Heater, HvacMode::Chiller, HvacMode::Off] {
            assert_eq!(mode.to_string().parse::<HvacMode>().unwrap(), mode);
        }
    }
}
