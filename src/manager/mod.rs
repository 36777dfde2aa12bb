// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! House control and recording.
//!
//! This module provides the [`ControlManager`], which owns one house's
//! device link, settings and cached state, and the [`Historian`], which
//! records that house on a fixed period.
//!
//! # Features
//!
//! - **Per-house lock**: every device round trip of one house is serialized
//! - **Deferred settings**: settings changed while offline are pushed on connect
//! - **Usage accounting**: light-on time and intruder alerts across reads
//! - **Recording**: periodic snapshots to a channel or a JSON-lines writer

mod control_manager;
mod historian;
mod house_id;
mod settings;
mod snapshot;
mod usage;

pub use control_manager::{Clock, ControlManager, Evaluation};
pub use historian::{ChannelRecorder, Historian, JsonLinesRecorder, Recorder};
pub use house_id::HouseId;
pub use settings::Settings;
pub use snapshot::HouseSnapshot;
pub use usage::{IntruderTracker, LightUsage};
