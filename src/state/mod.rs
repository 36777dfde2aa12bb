// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! House state types.
//!
//! A house is described by a [`RawState`]: a map from the fixed
//! [`StateKey`] vocabulary to typed [`StateValue`]s. Values are checked
//! against their key's [`ValueKind`] when they enter the map, so the rule
//! engine and the wire codec never see a mistyped value.
//!
//! # Examples
//!
//! ```
//! use hearth_lib::state::{RawState, StateKey};
//!
//! let mut state = RawState::new();
//! state.set(StateKey::ProximityState, true).unwrap();
//! state.set(StateKey::TargetTemp, 70).unwrap();
//!
//! assert_eq!(state.bool(StateKey::ProximityState), Some(true));
//! assert_eq!(state.int(StateKey::TargetTemp), Some(70));
//! ```

mod key;
mod raw_state;
mod value;

pub use key::{StateKey, ValueKind};
pub use raw_state::RawState;
pub use value::StateValue;
