// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timed MIDI events and their binary encoding.
//!
//! An [`Event`] pairs a delta-time (ticks since the previous event on the
//! same track) with one channel message, and knows how to encode itself
//! into the byte layout a Standard MIDI File track chunk expects.

pub mod vlq;

use crate::error::{check_channel, check_data, Result};

/// MIDI status-byte constants (upper nibble; lower nibble carries the channel)
pub mod status {
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const CONTROL_CHANGE: u8 = 0xB0;
    pub const PROGRAM_CHANGE: u8 = 0xC0;
}

/// Controller numbers used by the writer
pub mod controller {
    /// Channel main volume (controller 7)
    pub const MAIN_VOLUME: u8 = 0x07;
}

/// The channel message carried by an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Start sounding a key
    NoteOn { channel: u8, key: u8, velocity: u8 },
    /// Stop sounding a key
    NoteOff { channel: u8, key: u8, velocity: u8 },
    /// Select the program (instrument patch) for a channel
    ProgramChange { channel: u8, program: u8 },
    /// Change a controller value on a channel
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl EventKind {
    /// Check every field against its MIDI range (channel 0-15, data 0-127).
    pub fn validate(&self) -> Result<()> {
        match *self {
            EventKind::NoteOn { channel, key, velocity }
            | EventKind::NoteOff { channel, key, velocity } => {
                check_channel(channel)?;
                check_data("key", key)?;
                check_data("velocity", velocity)?;
            }
            EventKind::ProgramChange { channel, program } => {
                check_channel(channel)?;
                check_data("program", program)?;
            }
            EventKind::ControlChange { channel, controller, value } => {
                check_channel(channel)?;
                check_data("controller", controller)?;
                check_data("value", value)?;
            }
        }
        Ok(())
    }
}

/// A timed MIDI message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    /// Ticks since the previous event on the same track
    delta: u32,
    /// The message itself
    kind: EventKind,
}

impl Event {
    /// Create an event, rejecting out-of-range fields.
    pub fn new(delta: u32, kind: EventKind) -> Result<Self> {
        kind.validate()?;
        Ok(Self { delta, kind })
    }

    /// Create a note on event.
    pub fn note_on(delta: u32, channel: u8, key: u8, velocity: u8) -> Result<Self> {
        Self::new(delta, EventKind::NoteOn { channel, key, velocity })
    }

    /// Create a note off event.
    pub fn note_off(delta: u32, channel: u8, key: u8, velocity: u8) -> Result<Self> {
        Self::new(delta, EventKind::NoteOff { channel, key, velocity })
    }

    /// Create a program change event.
    pub fn program_change(delta: u32, channel: u8, program: u8) -> Result<Self> {
        Self::new(delta, EventKind::ProgramChange { channel, program })
    }

    /// Create a control change event.
    pub fn control_change(delta: u32, channel: u8, controller: u8, value: u8) -> Result<Self> {
        Self::new(delta, EventKind::ControlChange { channel, controller, value })
    }

    /// Build an event from fields that are already known to be in range.
    pub(crate) fn from_parts(delta: u32, kind: EventKind) -> Self {
        Self { delta, kind }
    }

    /// Delta-time in ticks
    pub fn delta(&self) -> u32 {
        self.delta
    }

    /// The channel message
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// Append the encoded event (VLQ delta-time + message bytes) to `out`.
    pub fn encode_into(&self, out: &mut Vec<u8>) {
        vlq::encode_into(self.delta, out);
        match self.kind {
            EventKind::NoteOn { channel, key, velocity } => {
                out.extend_from_slice(&[status::NOTE_ON | channel, key, velocity]);
            }
            EventKind::NoteOff { channel, key, velocity } => {
                out.extend_from_slice(&[status::NOTE_OFF | channel, key, velocity]);
            }
            EventKind::ProgramChange { channel, program } => {
                out.extend_from_slice(&[status::PROGRAM_CHANGE | channel, program]);
            }
            EventKind::ControlChange { channel, controller, value } => {
                out.extend_from_slice(&[status::CONTROL_CHANGE | channel, controller, value]);
            }
        }
    }

    /// Encode into a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4);
        self.encode_into(&mut out);
        out
    }
}
