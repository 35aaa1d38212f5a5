// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for MIDI file construction.

use thiserror::Error;

use crate::music::Pitch;

/// Errors produced while building or serializing a MIDI file
#[derive(Debug, Error)]
pub enum Error {
    /// A MIDI channel outside 0-15
    #[error("channel {0} out of range (0-15)")]
    ChannelOutOfRange(u8),

    /// A 7-bit data field (key, velocity, program, controller, value)
    /// outside 0-127
    #[error("{field} {value} out of range (0-127)")]
    DataOutOfRange {
        /// Name of the offending field
        field: &'static str,
        /// The rejected value
        value: u8,
    },

    /// A pitch/octave pair that does not map to a MIDI key (0-127)
    #[error("note {pitch}{octave} is outside the MIDI key range")]
    KeyOutOfRange {
        /// Pitch class of the rejected note
        pitch: Pitch,
        /// Octave of the rejected note
        octave: i8,
    },

    /// A track index that was never created by this writer
    #[error("no track with index {0}")]
    UnknownTrack(usize),

    /// The writer has already been finalized; tracks are frozen and the
    /// file cannot be written a second time
    #[error("writer already finalized")]
    AlreadyFinalized,

    /// The output sink rejected a write
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result alias for fallible writer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Reject channels above 15.
pub(crate) fn check_channel(channel: u8) -> Result<u8> {
    if channel > 15 {
        return Err(Error::ChannelOutOfRange(channel));
    }
    Ok(channel)
}

/// Reject 7-bit data values above 127.
pub(crate) fn check_data(field: &'static str, value: u8) -> Result<u8> {
    if value > 127 {
        return Err(Error::DataOutOfRange { field, value });
    }
    Ok(value)
}
