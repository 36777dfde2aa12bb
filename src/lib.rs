// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `Hearth` Lib - A Rust library to keep a smart house in a safe state.
//!
//! This library evaluates proposed house states against a fixed set of
//! safety rules and drives the house's device endpoint over a small
//! line-oriented text protocol.
//!
//! # Supported Features
//!
//! - **Rule evaluation**: Light guard, door and lock consistency, intruder
//!   lockdown, away timer, alarm arming, HVAC control, night lock
//! - **Device protocol**: `GS` / `SS` / `SU` / `OK` frames over TCP with
//!   bounded round trips
//! - **House control**: Per-house serialized reads and writes, deferred
//!   settings pushes, light-usage and intruder accounting
//! - **Recording**: Periodic snapshots to a channel or a JSON-lines writer
//!
//! # Quick Start
//!
//! ## Evaluating a State
//!
//! ```
//! use chrono::NaiveDate;
//! use hearth_lib::evaluator::{EvaluationLog, RuleEvaluator, StateEvaluator};
//! use hearth_lib::state::{RawState, StateKey};
//!
//! let now = NaiveDate::from_ymd_opt(2026, 10, 19)
//!     .unwrap()
//!     .and_hms_opt(23, 0, 0)
//!     .unwrap();
//!
//! let mut proposed = RawState::new();
//! proposed.set(StateKey::ProximityState, true).unwrap();
//! proposed.set(StateKey::DoorState, false).unwrap();
//! proposed.set(StateKey::NightStart, 2200).unwrap();
//! proposed.set(StateKey::NightEnd, 600).unwrap();
//!
//! let mut log = EvaluationLog::new();
//! let state = RuleEvaluator::new().evaluate(&proposed, &mut log, now);
//!
//! // Closed door at night gets locked
//! assert_eq!(state.bool(StateKey::DoorLockState), Some(true));
//! assert!(log.contains("Night lock engaged"));
//! ```
//!
//! ## Controlling a House
//!
//! ```no_run
//! use hearth_lib::manager::{ControlManager, Settings};
//! use hearth_lib::protocol::LinkConfig;
//! use hearth_lib::state::{RawState, StateKey};
//!
//! #[tokio::main]
//! async fn main() -> hearth_lib::Result<()> {
//!     let settings = Settings::new()
//!         .with_target_temperature(70)
//!         .with_night_window(2200, 600)
//!         .with_alarm_passcode("1234")
//!         .with_door_lock_passcode("0000");
//!
//!     let house = ControlManager::tcp(LinkConfig::new("192.168.1.50"), settings);
//!     house.connect().await?;
//!
//!     let mut update = RawState::new();
//!     update.set(StateKey::LightState, true)?;
//!     let evaluation = house.process_state_update(&update).await?;
//!     println!("light: {:?}", evaluation.state.bool(StateKey::LightState));
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod evaluator;
pub mod manager;
pub mod protocol;
pub mod state;
pub mod types;

pub use error::{Error, ParseError, ProtocolError, RecordError, Result, ValueError};
pub use evaluator::{EvaluationLog, PasscodeCheck, RuleEvaluator, StateEvaluator};
pub use manager::{ControlManager, Evaluation, Historian, HouseId, HouseSnapshot, Settings};
pub use protocol::{DeviceLink, Frame, LinkConfig, TcpDeviceLink};
pub use state::{RawState, StateKey, StateValue};
pub use types::{HvacMode, NightWindow, TimeOfDay};
