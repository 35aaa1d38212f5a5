// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Note and instrument descriptors for the writer API.
//!
//! Everything a caller hands to a track is normalized into one of these
//! canonical descriptors on entry, with every field range-checked at
//! construction time. Out-of-range values are rejected before they can
//! reach the encoder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{check_channel, check_data, Error, Result};

/// Standard General MIDI drum keys (channel 10 percussion map)
pub mod gm_drums {
    pub const KICK: u8 = 36;
    pub const SNARE: u8 = 38;
    pub const CLOSED_HAT: u8 = 42;
    pub const OPEN_HAT: u8 = 46;
    pub const LOW_TOM: u8 = 45;
    pub const MID_TOM: u8 = 47;
    pub const HIGH_TOM: u8 = 50;
    pub const CRASH: u8 = 49;
    pub const RIDE: u8 = 51;
    pub const CLAP: u8 = 39;
    pub const RIM: u8 = 37;
    pub const COWBELL: u8 = 56;
}

/// Note names (pitch classes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pitch {
    C,
    Cs, // C# / Db
    D,
    Ds, // D# / Eb
    E,
    F,
    Fs, // F# / Gb
    G,
    Gs, // G# / Ab
    A,
    As, // A# / Bb
    B,
}

impl Pitch {
    /// All pitches in chromatic order
    pub const ALL: [Pitch; 12] = [
        Pitch::C,
        Pitch::Cs,
        Pitch::D,
        Pitch::Ds,
        Pitch::E,
        Pitch::F,
        Pitch::Fs,
        Pitch::G,
        Pitch::Gs,
        Pitch::A,
        Pitch::As,
        Pitch::B,
    ];

    /// Get the pitch class (0-11) for this pitch
    pub fn pitch_class(self) -> u8 {
        match self {
            Pitch::C => 0,
            Pitch::Cs => 1,
            Pitch::D => 2,
            Pitch::Ds => 3,
            Pitch::E => 4,
            Pitch::F => 5,
            Pitch::Fs => 6,
            Pitch::G => 7,
            Pitch::Gs => 8,
            Pitch::A => 9,
            Pitch::As => 10,
            Pitch::B => 11,
        }
    }

    /// Parse a pitch from string (e.g., "C", "C#", "Db", "F#")
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_uppercase();
        match s.as_str() {
            "C" => Some(Pitch::C),
            "C#" | "CS" | "DB" => Some(Pitch::Cs),
            "D" => Some(Pitch::D),
            "D#" | "DS" | "EB" => Some(Pitch::Ds),
            "E" | "FB" => Some(Pitch::E),
            "F" | "E#" | "ES" => Some(Pitch::F),
            "F#" | "FS" | "GB" => Some(Pitch::Fs),
            "G" => Some(Pitch::G),
            "G#" | "GS" | "AB" => Some(Pitch::Gs),
            "A" => Some(Pitch::A),
            "A#" | "AS" | "BB" => Some(Pitch::As),
            "B" | "CB" => Some(Pitch::B),
            _ => None,
        }
    }

    /// MIDI key number for this pitch in `octave`.
    ///
    /// Octave -1 holds key 0 (C-1); the range tops out at G9 (key 127).
    pub fn midi_note(self, octave: i8) -> Result<u8> {
        let key = (octave as i16 + 1) * 12 + self.pitch_class() as i16;
        if !(0..=127).contains(&key) {
            return Err(Error::KeyOutOfRange { pitch: self, octave });
        }
        Ok(key as u8)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pitch::C => write!(f, "C"),
            Pitch::Cs => write!(f, "C#"),
            Pitch::D => write!(f, "D"),
            Pitch::Ds => write!(f, "D#"),
            Pitch::E => write!(f, "E"),
            Pitch::F => write!(f, "F"),
            Pitch::Fs => write!(f, "F#"),
            Pitch::G => write!(f, "G"),
            Pitch::Gs => write!(f, "G#"),
            Pitch::A => write!(f, "A"),
            Pitch::As => write!(f, "A#"),
            Pitch::B => write!(f, "B"),
        }
    }
}

/// A note as requested by the caller, before scheduling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteSpec {
    key: u8,
    velocity: u8,
    channel: Option<u8>,
    force: bool,
}

impl NoteSpec {
    /// Create a note from a raw MIDI key number (0-127).
    pub fn new(key: u8, velocity: u8) -> Result<Self> {
        Ok(Self {
            key: check_data("key", key)?,
            velocity: check_data("velocity", velocity)?,
            channel: None,
            force: false,
        })
    }

    /// Create a note from a pitch class and octave.
    pub fn from_pitch(pitch: Pitch, octave: i8, velocity: u8) -> Result<Self> {
        Self::new(pitch.midi_note(octave)?, velocity)
    }

    /// Route this note to an explicit channel instead of the track default.
    pub fn with_channel(mut self, channel: u8) -> Result<Self> {
        self.channel = Some(check_channel(channel)?);
        Ok(self)
    }

    /// Keep the requested key even when the track is in percussion mode.
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// MIDI key number (0-127)
    pub fn key(&self) -> u8 {
        self.key
    }

    /// Velocity (0-127)
    pub fn velocity(&self) -> u8 {
        self.velocity
    }

    /// Explicit channel, if any
    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Whether the key survives a percussion override
    pub fn is_forced(&self) -> bool {
        self.force
    }
}

/// An instrument selection for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instrument {
    program: u8,
    channel: Option<u8>,
    percussion: bool,
}

impl Instrument {
    /// Select a melodic program (patch) by General MIDI number (0-127).
    pub fn new(program: u8) -> Result<Self> {
        Ok(Self {
            program: check_data("program", program)?,
            channel: None,
            percussion: false,
        })
    }

    /// Select a percussion sound by its fixed drum key (0-127).
    ///
    /// Notes played after this selection land on channel 9 with this key,
    /// unless the note is [`forced`](NoteSpec::forced).
    pub fn percussion(key: u8) -> Result<Self> {
        Ok(Self {
            program: check_data("key", key)?,
            channel: None,
            percussion: true,
        })
    }

    /// Route the program change to an explicit channel.
    pub fn with_channel(mut self, channel: u8) -> Result<Self> {
        self.channel = Some(check_channel(channel)?);
        Ok(self)
    }

    /// Program number, or the fixed drum key for percussion
    pub fn program(&self) -> u8 {
        self.program
    }

    /// Explicit channel, if any
    pub fn channel(&self) -> Option<u8> {
        self.channel
    }

    /// Whether this selects a percussion sound
    pub fn is_percussion(&self) -> bool {
        self.percussion
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_class() {
        assert_eq!(Pitch::C.pitch_class(), 0);
        assert_eq!(Pitch::A.pitch_class(), 9);
        assert_eq!(Pitch::B.pitch_class(), 11);
    }

    #[test]
    fn test_pitch_all_chromatic_order() {
        for (i, pitch) in Pitch::ALL.iter().enumerate() {
            assert_eq!(pitch.pitch_class() as usize, i);
        }
    }

    #[test]
    fn test_pitch_parse() {
        assert_eq!(Pitch::parse("C"), Some(Pitch::C));
        assert_eq!(Pitch::parse("c#"), Some(Pitch::Cs));
        assert_eq!(Pitch::parse("Db"), Some(Pitch::Cs));
        assert_eq!(Pitch::parse("H"), None);
    }

    #[test]
    fn test_midi_note_numbers() {
        // C-1 is key 0, middle C (C4) is 60, A4 is 69, G9 is 127
        assert_eq!(Pitch::C.midi_note(-1).unwrap(), 0);
        assert_eq!(Pitch::C.midi_note(4).unwrap(), 60);
        assert_eq!(Pitch::A.midi_note(4).unwrap(), 69);
        assert_eq!(Pitch::G.midi_note(9).unwrap(), 127);
    }

    #[test]
    fn test_midi_note_out_of_range() {
        assert!(Pitch::Gs.midi_note(9).is_err());
        assert!(Pitch::C.midi_note(-2).is_err());
        assert!(Pitch::C.midi_note(10).is_err());
    }

    #[test]
    fn test_note_spec() {
        let note = NoteSpec::new(60, 100).unwrap();
        assert_eq!(note.key(), 60);
        assert_eq!(note.velocity(), 100);
        assert_eq!(note.channel(), None);
        assert!(!note.is_forced());
    }

    #[test]
    fn test_note_spec_from_pitch() {
        let note = NoteSpec::from_pitch(Pitch::A, 4, 90).unwrap();
        assert_eq!(note.key(), 69);
    }

    #[test]
    fn test_note_spec_builders() {
        let note = NoteSpec::new(60, 100)
            .unwrap()
            .with_channel(3)
            .unwrap()
            .forced();
        assert_eq!(note.channel(), Some(3));
        assert!(note.is_forced());
    }

    #[test]
    fn test_note_spec_rejects_bad_values() {
        assert!(NoteSpec::new(128, 100).is_err());
        assert!(NoteSpec::new(60, 255).is_err());
        assert!(NoteSpec::new(60, 100).unwrap().with_channel(16).is_err());
    }

    #[test]
    fn test_instrument() {
        let organ = Instrument::new(19).unwrap();
        assert_eq!(organ.program(), 19);
        assert!(!organ.is_percussion());

        let kick = Instrument::percussion(gm_drums::KICK).unwrap();
        assert_eq!(kick.program(), 36);
        assert!(kick.is_percussion());
    }

    #[test]
    fn test_instrument_rejects_bad_values() {
        assert!(Instrument::new(128).is_err());
        assert!(Instrument::percussion(200).is_err());
        assert!(Instrument::new(0).unwrap().with_channel(16).is_err());
    }
}
