// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `Hearth` library.
//!
//! This module provides the error hierarchy for the library: typed value
//! validation, wire-frame decoding, device transport, and state recording.

use thiserror::Error;

use crate::state::{StateKey, ValueKind};

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Error occurred while talking to the device endpoint.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A frame decoded directly with [`decode`](crate::protocol::decode)
    /// was malformed.
    ///
    /// Replies read through a device link arrive as
    /// [`ProtocolError::InvalidFrame`] instead.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Error occurred while recording a state snapshot.
    #[error("record error: {0}")]
    Record(#[from] RecordError),

    /// The house is not connected, so no state can be written.
    #[error("house is not connected")]
    NotConnected,
}

/// Errors related to typed state values.
///
/// These are raised at the boundary, when a value enters a
/// [`RawState`](crate::state::RawState) or a constrained type is built.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A value of the wrong kind was supplied for a key.
    #[error("{key} expects a value of kind {expected}, got {actual}")]
    KindMismatch {
        /// The key being set.
        key: StateKey,
        /// The kind the key accepts.
        expected: ValueKind,
        /// The kind that was supplied.
        actual: ValueKind,
    },

    /// A text value contains a character reserved by the wire protocol.
    #[error("{key} value {value:?} contains a reserved protocol character")]
    ReservedCharacter {
        /// The key being set.
        key: StateKey,
        /// The rejected value.
        value: String,
    },

    /// A `HH*100+MM` time encoding is outside the valid hour/minute range.
    #[error("invalid time of day encoding: {0}")]
    InvalidTimeOfDay(i32),

    /// An HVAC mode literal is not one of the known modes.
    #[error("invalid HVAC mode: {0}")]
    InvalidHvacMode(String),
}

/// Errors related to decoding wire frames.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The frame was empty.
    #[error("empty frame")]
    EmptyFrame,

    /// The frame has no `:` separating command and pairs.
    #[error("frame is missing the command delimiter: {0:?}")]
    MissingDelimiter(String),

    /// The frame does not end with the `.` terminator.
    #[error("frame is missing the terminator: {0:?}")]
    MissingTerminator(String),

    /// The command tag is not a known command.
    #[error("unknown command: {0:?}")]
    UnknownCommand(String),

    /// A pair is not of the form `KEY=VALUE`.
    #[error("malformed pair: {0:?}")]
    MalformedPair(String),

    /// A command that takes no pairs carried some.
    #[error("{0} frames take no pairs")]
    UnexpectedPairs(&'static str),

    /// A value could not be parsed as the kind its key expects.
    #[error("failed to parse {field}: {message}")]
    InvalidValue {
        /// The key whose value failed to parse.
        field: String,
        /// Description of the parsing failure.
        message: String,
    },
}

/// Errors related to the device link.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Connection to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// The round trip did not complete in time.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// An exchange was attempted without a connection.
    #[error("device link is not connected")]
    NotConnected,

    /// The device closed the connection.
    #[error("connection closed by device")]
    ConnectionClosed,

    /// Socket I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The device replied with a frame that could not be decoded.
    #[error("invalid frame: {0}")]
    InvalidFrame(#[from] ParseError),

    /// The device replied with a frame of the wrong kind.
    #[error("expected {expected} reply, got {actual}")]
    UnexpectedReply {
        /// The reply kind that was expected.
        expected: &'static str,
        /// The reply kind that arrived.
        actual: &'static str,
    },
}

/// Errors related to recording state snapshots.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Writing the record failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing the record failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The receiving side of the recorder is gone.
    #[error("recorder channel closed")]
    ChannelClosed,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
