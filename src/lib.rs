// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file construction.
//!
//! Build multi-track MIDI files from high-level note descriptions:
//! request tracks from a [`MidiWriter`], schedule notes with relative
//! timing, and serialize the whole structure to any byte sink in the
//! SMF format 1 binary layout.
//!
//! ```
//! use midiwrite::{MidiWriter, NoteSpec};
//!
//! let mut writer = MidiWriter::new();
//! let track = writer.add_track()?;
//!
//! // A quarter-note middle C followed by a D, at the fixed 120 BPM
//! track.add_note(NoteSpec::new(60, 100)?, 500, 0);
//! track.add_note(NoteSpec::new(62, 100)?, 500, 500);
//!
//! let bytes = writer.to_bytes()?;
//! assert_eq!(&bytes[0..4], b"MThd");
//! # Ok::<(), midiwrite::Error>(())
//! ```

mod error;
pub mod event;
pub mod music;
pub mod track;
pub mod writer;

pub use error::{Error, Result};
pub use event::{Event, EventKind};
pub use music::{Instrument, NoteSpec, Pitch};
pub use track::{NoteRequest, Track, PERCUSSION_CHANNEL};
pub use writer::{MidiWriter, WriterConfig};
