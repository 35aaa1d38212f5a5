// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Standard MIDI file writer.
//!
//! Owns the tracks under construction and serializes them as an SMF
//! format 1 (multi-track) file: one header chunk followed by one track
//! chunk per track, in creation order.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{check_data, Error, Result};
use crate::event::{controller, Event, EventKind};
use crate::track::Track;

/// Fixed tempo for all produced files
const BEATS_PER_MINUTE: u32 = 120;

/// Ticks per quarter note written to the header.
///
/// At the fixed 120 BPM a tick is one millisecond, so callers can think
/// of note durations and deltas as milliseconds.
const TICKS_PER_BEAT: u16 = (60_000 / BEATS_PER_MINUTE) as u16;

/// SMF format 1: simultaneous tracks
const FORMAT_MULTI_TRACK: u16 = 1;

/// End-of-track meta event, required to close every track chunk
const END_OF_TRACK: [u8; 4] = [0x00, 0xFF, 0x2F, 0x00];

/// Configuration for a [`MidiWriter`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriterConfig {
    /// Channel volume (0-127) written to the head of every track.
    ///
    /// Zero is honored as an explicit choice; only an absent field falls
    /// back to the default of 63.
    #[serde(default = "default_volume")]
    pub volume: u8,
}

fn default_volume() -> u8 {
    63
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            volume: default_volume(),
        }
    }
}

impl WriterConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the per-track channel volume
    pub fn with_volume(mut self, volume: u8) -> Result<Self> {
        self.volume = check_data("volume", volume)?;
        Ok(self)
    }
}

/// Builder and serializer for one MIDI file
#[derive(Debug)]
pub struct MidiWriter {
    /// Tracks in creation order (which is serialization order)
    tracks: Vec<Track>,
    /// File-level options
    config: WriterConfig,
    /// Set once the file has been written; the writer is then frozen
    finalized: bool,
}

impl MidiWriter {
    /// Create a writer with default configuration.
    pub fn new() -> Self {
        Self {
            tracks: Vec::new(),
            config: WriterConfig::default(),
            finalized: false,
        }
    }

    /// Create a writer with the given configuration, rejecting
    /// out-of-range settings.
    pub fn with_config(config: WriterConfig) -> Result<Self> {
        check_data("volume", config.volume)?;
        Ok(Self {
            tracks: Vec::new(),
            config,
            finalized: false,
        })
    }

    /// The active configuration
    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Number of tracks created so far
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Create a new track and hand back a handle to it.
    ///
    /// The track's default channel is assigned from its creation index,
    /// skipping the percussion channel. Fails once the writer has been
    /// finalized.
    pub fn add_track(&mut self) -> Result<&mut Track> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        let index = self.tracks.len();
        self.tracks.push(Track::new(index));
        Ok(&mut self.tracks[index])
    }

    /// Re-borrow a previously created track by its creation index.
    ///
    /// Fails once the writer has been finalized.
    pub fn track_mut(&mut self, index: usize) -> Result<&mut Track> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        self.tracks.get_mut(index).ok_or(Error::UnknownTrack(index))
    }

    /// Read a track by its creation index.
    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Serialize the file into `sink`.
    ///
    /// This is the one-shot terminal operation: it injects the configured
    /// channel volume at the head of every track, writes the header chunk
    /// and every track chunk, and freezes the writer. A second call fails
    /// with [`Error::AlreadyFinalized`]. Sink errors abort serialization
    /// immediately; discarding partial output is the caller's concern.
    pub fn write<W: Write>(&mut self, sink: &mut W) -> Result<()> {
        if self.finalized {
            return Err(Error::AlreadyFinalized);
        }
        self.finalized = true;

        for track in &mut self.tracks {
            let volume = Event::from_parts(
                0,
                EventKind::ControlChange {
                    channel: track.default_channel(),
                    controller: controller::MAIN_VOLUME,
                    value: self.config.volume,
                },
            );
            track.insert_front(volume);
        }

        debug!(tracks = self.tracks.len(), "writing MIDI file");

        self.write_header(sink)?;
        for track in &self.tracks {
            write_track(sink, track)?;
        }
        Ok(())
    }

    /// Serialize the file to a fresh byte buffer.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>> {
        let mut buffer = Vec::new();
        self.write(&mut buffer)?;
        Ok(buffer)
    }

    /// Serialize the file to `path`, creating or truncating it.
    pub fn write_to_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let mut file = File::create(path)?;
        self.write(&mut file)
    }

    /// Write the MThd chunk.
    fn write_header<W: Write>(&self, sink: &mut W) -> Result<()> {
        sink.write_all(b"MThd")?;
        sink.write_all(&6u32.to_be_bytes())?;
        sink.write_all(&FORMAT_MULTI_TRACK.to_be_bytes())?;
        sink.write_all(&(self.tracks.len() as u16).to_be_bytes())?;
        sink.write_all(&TICKS_PER_BEAT.to_be_bytes())?;
        Ok(())
    }
}

impl Default for MidiWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// Write one MTrk chunk: magic, byte length, events, end-of-track.
fn write_track<W: Write>(sink: &mut W, track: &Track) -> Result<()> {
    let mut data = Vec::new();
    for event in track.events() {
        event.encode_into(&mut data);
    }

    let length = (data.len() + END_OF_TRACK.len()) as u32;

    sink.write_all(b"MTrk")?;
    sink.write_all(&length.to_be_bytes())?;
    sink.write_all(&data)?;
    sink.write_all(&END_OF_TRACK)?;

    debug!(track = track.index(), bytes = length, "wrote track chunk");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::music::NoteSpec;

    fn note(key: u8) -> NoteSpec {
        NoteSpec::new(key, 100).unwrap()
    }

    #[test]
    fn test_ticks_per_beat_constant() {
        // 120 BPM over a 60000ms minute: one tick per millisecond
        assert_eq!(TICKS_PER_BEAT, 500);
    }

    #[test]
    fn test_empty_file_header() {
        let bytes = MidiWriter::new().to_bytes().unwrap();

        // Header only: no tracks means no track chunks
        assert_eq!(bytes.len(), 14);
        assert_eq!(&bytes[0..4], b"MThd");
        assert_eq!(&bytes[4..8], &[0x00, 0x00, 0x00, 0x06]);
        assert_eq!(&bytes[8..10], &[0x00, 0x01]); // format 1
        assert_eq!(&bytes[10..12], &[0x00, 0x00]); // track count 0
        assert_eq!(&bytes[12..14], &500u16.to_be_bytes());
    }

    #[test]
    fn test_track_count_in_header() {
        let mut writer = MidiWriter::new();
        writer.add_track().unwrap();
        writer.add_track().unwrap();
        writer.add_track().unwrap();

        let bytes = writer.to_bytes().unwrap();
        assert_eq!(&bytes[10..12], &[0x00, 0x03]);
    }

    #[test]
    fn test_single_note_file_is_byte_exact() {
        let mut writer = MidiWriter::new();
        writer.add_track().unwrap().add_note(note(60), 480, 0);

        let bytes = writer.to_bytes().unwrap();
        let chunk = &bytes[14..];

        assert_eq!(&chunk[0..4], b"MTrk");
        // volume (4) + note on (4) + note off (5) + end marker (4)
        assert_eq!(&chunk[4..8], &17u32.to_be_bytes());
        assert_eq!(
            &chunk[8..],
            &[
                0x00, 0xB0, 0x07, 0x3F, // volume controller, value 63
                0x00, 0x90, 0x3C, 0x64, // note on, key 60, velocity 100
                0x83, 0x60, 0x80, 0x3C, 0x64, // note off after 480 ticks
                0x00, 0xFF, 0x2F, 0x00, // end of track
            ]
        );
    }

    #[test]
    fn test_chunk_length_matches_payload() {
        let mut writer = MidiWriter::new();
        let track = writer.add_track().unwrap();
        for i in 0..40 {
            track.add_note(note(40 + i), 100 + i as u32 * 30, (i as u32 % 5) * 7);
        }

        let bytes = writer.to_bytes().unwrap();
        let declared =
            u32::from_be_bytes([bytes[18], bytes[19], bytes[20], bytes[21]]) as usize;
        let payload = bytes.len() - 14 - 8;
        assert_eq!(declared, payload);
    }

    #[test]
    fn test_volume_injected_per_track() {
        let mut writer =
            MidiWriter::with_config(WriterConfig::new().with_volume(100).unwrap()).unwrap();
        writer.add_track().unwrap();
        writer.add_track().unwrap();
        writer.to_bytes().unwrap();

        for index in 0..2 {
            let track = writer.track(index).unwrap();
            let head = track.events()[0];
            assert_eq!(head.delta(), 0);
            assert_eq!(
                head.kind(),
                EventKind::ControlChange {
                    channel: track.default_channel(),
                    controller: 0x07,
                    value: 100,
                }
            );
            // Exactly one volume controller per track
            let volume_events = track
                .events()
                .iter()
                .filter(|e| {
                    matches!(e.kind(), EventKind::ControlChange { controller: 0x07, .. })
                })
                .count();
            assert_eq!(volume_events, 1);
        }
    }

    #[test]
    fn test_explicit_zero_volume_is_honored() {
        let config = WriterConfig::new().with_volume(0).unwrap();
        let mut writer = MidiWriter::with_config(config).unwrap();
        writer.add_track().unwrap();

        let bytes = writer.to_bytes().unwrap();
        // volume controller value byte
        assert_eq!(bytes[14 + 8 + 3], 0x00);
    }

    #[test]
    fn test_config_defaults() {
        assert_eq!(WriterConfig::default().volume, 63);
        assert_eq!(MidiWriter::new().config().volume, 63);
    }

    #[test]
    fn test_config_rejects_bad_volume() {
        assert!(WriterConfig::new().with_volume(128).is_err());
        assert!(MidiWriter::with_config(WriterConfig { volume: 255 }).is_err());
    }

    #[test]
    fn test_write_is_one_shot() {
        let mut writer = MidiWriter::new();
        writer.add_track().unwrap();
        writer.to_bytes().unwrap();

        assert!(matches!(writer.to_bytes(), Err(Error::AlreadyFinalized)));
        assert!(matches!(writer.add_track(), Err(Error::AlreadyFinalized)));
        assert!(matches!(writer.track_mut(0), Err(Error::AlreadyFinalized)));
    }

    #[test]
    fn test_track_mut_unknown_index() {
        let mut writer = MidiWriter::new();
        assert!(matches!(writer.track_mut(3), Err(Error::UnknownTrack(3))));
    }

    #[test]
    fn test_sink_failure_propagates() {
        struct FailingSink;

        impl Write for FailingSink {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "sink closed"))
            }
            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = MidiWriter::new();
        writer.add_track().unwrap();
        assert!(matches!(
            writer.write(&mut FailingSink),
            Err(Error::Io(_))
        ));
    }
}
