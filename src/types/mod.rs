// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types with validation.
//!
//! This module provides type-safe wrappers for the constrained values the
//! house works with.

mod hvac;
mod time_of_day;

pub use hvac::HvacMode;
pub use time_of_day::{NightWindow, TimeOfDay};
