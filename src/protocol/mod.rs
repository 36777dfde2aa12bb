// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Protocol implementation for talking to the house device endpoint.
//!
//! This module provides the wire [`Frame`] codec and the [`DeviceLink`]
//! transport abstraction.
//!
//! # Frames
//!
//! - `GS:.` asks the device for its full state
//! - `SS:K=V;K=V.` asks the device to apply a state
//! - `SU:K=V;K=V.` is the device's full state
//! - `OK` acknowledges a set
//!
//! # Links
//!
//! - [`TcpDeviceLink`]: line-oriented TCP client with bounded round trips

mod codec;
mod tcp;

pub use codec::{Frame, decode, encode};
pub use tcp::{LinkConfig, TcpDeviceLink};

use std::future::Future;

use crate::error::ProtocolError;
use crate::state::RawState;

/// Connection state of a device link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected.
    Disconnected,
    /// Connected and ready to exchange frames.
    Connected,
    /// The last connection attempt failed.
    Failed(String),
}

impl ConnectionState {
    /// Returns true if the link is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Returns true if the last connection attempt failed.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Request/response transport to a device endpoint.
///
/// A link carries one exchange at a time; callers serialize access. The
/// returned futures are `Send` so a link can be driven from spawned tasks.
pub trait DeviceLink: Send {
    /// Opens the connection. Connecting an already connected link is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the endpoint cannot be reached.
    fn connect(&mut self) -> impl Future<Output = Result<(), ProtocolError>> + Send;

    /// Closes the connection. Always leaves the link disconnected.
    fn disconnect(&mut self) -> impl Future<Output = ()> + Send;

    /// Returns `true` while the link is connected.
    fn is_connected(&self) -> bool;

    /// Sends one frame and waits for the reply frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the link is disconnected, the round trip
    /// fails or times out, or the reply cannot be decoded.
    fn exchange(
        &mut self,
        frame: &Frame,
    ) -> impl Future<Output = Result<Frame, ProtocolError>> + Send;
}

/// Requests the device's full state (`GS` answered by `SU`).
///
/// # Errors
///
/// Returns `ProtocolError::UnexpectedReply` if the device answers with
/// anything but a state update, or any error of the exchange.
pub async fn fetch_state<L: DeviceLink>(link: &mut L) -> Result<RawState, ProtocolError> {
    match link.exchange(&Frame::GetState).await? {
        Frame::StateUpdate(state) => Ok(state),
        other => Err(ProtocolError::UnexpectedReply {
            expected: "SU",
            actual: other.command(),
        }),
    }
}

/// Asks the device to apply a state (`SS` answered by `OK`).
///
/// # Errors
///
/// Returns `ProtocolError::UnexpectedReply` if the device answers with
/// anything but an acknowledgment, or any error of the exchange.
pub async fn push_state<L: DeviceLink>(link: &mut L, state: RawState) -> Result<(), ProtocolError> {
    match link.exchange(&Frame::SetState(state)).await? {
        Frame::Ack => Ok(()),
        other => Err(ProtocolError::UnexpectedReply {
            expected: "OK",
            actual: other.command(),
        }),
    }
}
