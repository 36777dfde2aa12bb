// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire frame codec.
//!
//! Frames are ASCII text of the form `COMMAND ":" PAIR (";" PAIR)* "."`
//! with `PAIR = KEY "=" VALUE`, plus the bare acknowledgment `OK`.

use std::fmt;

use crate::error::ParseError;
use crate::state::RawState;

/// Delimiter between the command and its pairs.
const COMMAND_DELIMITER: char = ':';
/// Delimiter between pairs.
const PAIR_DELIMITER: char = ';';
/// Delimiter between a key and its value.
const VALUE_DELIMITER: char = '=';
/// Frame terminator.
const TERMINATOR: char = '.';
/// The acknowledgment literal.
const ACK: &str = "OK";

/// One complete protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// `GS`: request the full current state.
    GetState,
    /// `SS`: apply the carried state.
    SetState(RawState),
    /// `SU`: the device's full current state.
    StateUpdate(RawState),
    /// `OK`: acknowledgment of a set.
    Ack,
}

impl Frame {
    /// Returns the command tag of this frame.
    #[must_use]
    pub const fn command(&self) -> &'static str {
        match self {
            Self::GetState => "GS",
            Self::SetState(_) => "SS",
            Self::StateUpdate(_) => "SU",
            Self::Ack => ACK,
        }
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode(self))
    }
}

/// Encodes a frame to its wire text.
///
/// Pairs are written in vocabulary order. Unrecognized pairs held by the
/// state are not written.
///
/// # Examples
///
/// ```
/// use hearth_lib::protocol::{encode, Frame};
/// use hearth_lib::state::{RawState, StateKey};
///
/// assert_eq!(encode(&Frame::GetState), "GS:.");
///
/// let mut state = RawState::new();
/// state.set(StateKey::DoorState, true).unwrap();
/// state.set(StateKey::TempReading, 70).unwrap();
/// assert_eq!(encode(&Frame::SetState(state)), "SS:TR=70;DS=1.");
/// ```
#[must_use]
pub fn encode(frame: &Frame) -> String {
    match frame {
        Frame::Ack => ACK.to_string(),
        Frame::GetState => format!("{}{COMMAND_DELIMITER}{TERMINATOR}", frame.command()),
        Frame::SetState(state) | Frame::StateUpdate(state) => {
            let pairs = state
                .iter()
                .map(|(key, value)| format!("{key}{VALUE_DELIMITER}{value}"))
                .collect::<Vec<_>>()
                .join(&PAIR_DELIMITER.to_string());
            format!("{}{COMMAND_DELIMITER}{pairs}{TERMINATOR}", frame.command())
        }
    }
}

/// Decodes wire text into a frame.
///
/// Surrounding whitespace is ignored, as are empty segments between pair
/// delimiters. Pairs under unknown keys are kept as unrecognized pairs of
/// the decoded state.
///
/// # Errors
///
/// Returns `ParseError` if the text is not a well-formed frame, the command
/// is unknown, or a value does not parse as its key's kind.
///
/// # Examples
///
/// ```
/// use hearth_lib::protocol::{decode, Frame};
/// use hearth_lib::state::StateKey;
///
/// let Frame::StateUpdate(state) = decode("SU:TR=68;LS=0.").unwrap() else {
///     panic!("expected a state update");
/// };
/// assert_eq!(state.int(StateKey::TempReading), Some(68));
/// assert_eq!(state.bool(StateKey::LightState), Some(false));
///
/// assert!(decode("XX:.").is_err());
/// ```
pub fn decode(text: &str) -> Result<Frame, ParseError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ParseError::EmptyFrame);
    }
    if text == ACK {
        return Ok(Frame::Ack);
    }

    let (command, rest) = text
        .split_once(COMMAND_DELIMITER)
        .ok_or_else(|| ParseError::MissingDelimiter(text.to_string()))?;
    let body = rest
        .strip_suffix(TERMINATOR)
        .ok_or_else(|| ParseError::MissingTerminator(text.to_string()))?;

    match command {
        "GS" => {
            if body.split(PAIR_DELIMITER).any(|segment| !segment.is_empty()) {
                return Err(ParseError::UnexpectedPairs("GS"));
            }
            Ok(Frame::GetState)
        }
        "SS" => decode_pairs(body).map(Frame::SetState),
        "SU" => decode_pairs(body).map(Frame::StateUpdate),
        other => Err(ParseError::UnknownCommand(other.to_string())),
    }
}

fn decode_pairs(body: &str) -> Result<RawState, ParseError> {
    let mut state = RawState::new();

    for segment in body.split(PAIR_DELIMITER).filter(|s| !s.is_empty()) {
        let (key, value) = segment
            .split_once(VALUE_DELIMITER)
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| ParseError::MalformedPair(segment.to_string()))?;
        state.apply_wire_pair(key, value)?;
    }

    Ok(state)
}
