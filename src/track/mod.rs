// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Track state and note scheduling.
//!
//! A [`Track`] owns an ordered sequence of encoded-ready events plus the
//! state that shapes incoming notes: its default channel and an optional
//! percussion override. Notes arrive as [`NoteRequest`] batches timed
//! relative to each other and leave as correctly ordered MIDI events with
//! re-relativized delta-times.

use tracing::trace;

use crate::event::{Event, EventKind};
use crate::music::{Instrument, NoteSpec};

/// The channel reserved for percussion by General MIDI
pub const PERCUSSION_CHANNEL: u8 = 9;

/// A single note to schedule on a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRequest {
    /// The note descriptor
    pub note: NoteSpec,
    /// How long the note sounds, in ticks
    pub duration: u32,
    /// Ticks between the previous request's start and this one's
    pub delta: u32,
}

impl NoteRequest {
    /// Create a note request
    pub fn new(note: NoteSpec, duration: u32, delta: u32) -> Self {
        Self {
            note,
            duration,
            delta,
        }
    }
}

/// One track of a MIDI file under construction
#[derive(Debug, Clone)]
pub struct Track {
    /// Events in serialization order
    events: Vec<Event>,
    /// Creation index within the owning writer
    index: usize,
    /// Channel used when a note names none
    default_channel: u8,
    /// Fixed drum key while percussion mode is active
    percussion_key: Option<u8>,
}

impl Track {
    /// Create the track with creation index `index`.
    ///
    /// Default channels are handed out round-robin over the 15 melodic
    /// channels; channel 9 is reserved for percussion and never assigned.
    pub(crate) fn new(index: usize) -> Self {
        let mut channel = (index % 15) as u8;
        if channel >= PERCUSSION_CHANNEL {
            channel += 1;
        }
        Self {
            events: Vec::new(),
            index,
            default_channel: channel,
            percussion_key: None,
        }
    }

    /// Creation index within the owning writer
    pub fn index(&self) -> usize {
        self.index
    }

    /// The channel notes fall on when they name none
    pub fn default_channel(&self) -> u8 {
        self.default_channel
    }

    /// The fixed drum key, while percussion mode is active
    pub fn percussion_key(&self) -> Option<u8> {
        self.percussion_key
    }

    /// Events appended so far, in serialization order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Schedule a single note.
    ///
    /// `delta` is the tick distance from the start of the previously
    /// scheduled note (0 continues at the current end of the track).
    pub fn add_note(&mut self, note: NoteSpec, duration: u32, delta: u32) {
        self.add_notes([NoteRequest::new(note, duration, delta)]);
    }

    /// Schedule a batch of notes.
    ///
    /// Each request is timed relative to the previous request's *start*,
    /// so a chord is a run of requests with delta 0. The batch is resolved
    /// to absolute tick positions, ordered, and appended as note on/off
    /// pairs with re-relativized delta-times. Time zero of the batch is
    /// the end of the track's existing event chain.
    pub fn add_notes(&mut self, notes: impl IntoIterator<Item = NoteRequest>) {
        let mut provisional: Vec<(u64, EventKind)> = Vec::new();
        let mut absolute = 0u64;

        for request in notes {
            let spec = request.note;
            let (channel, key) = match self.percussion_key {
                // Percussion mode pins the channel; the key too, unless forced
                Some(fixed) => {
                    let key = if spec.is_forced() { spec.key() } else { fixed };
                    (PERCUSSION_CHANNEL, key)
                }
                None => (spec.channel().unwrap_or(self.default_channel), spec.key()),
            };

            absolute += request.delta as u64;
            provisional.push((
                absolute,
                EventKind::NoteOn {
                    channel,
                    key,
                    velocity: spec.velocity(),
                },
            ));
            provisional.push((
                absolute + request.duration as u64,
                EventKind::NoteOff {
                    channel,
                    key,
                    velocity: spec.velocity(),
                },
            ));
        }

        // Stable sort: equal times keep insertion order, so a chord's note
        // ons stay contiguous and a note on always precedes its own note off
        provisional.sort_by_key(|(time, _)| *time);

        let mut previous = 0u64;
        for (time, kind) in provisional {
            let delta = (time - previous) as u32;
            previous = time;
            self.events.push(Event::from_parts(delta, kind));
        }

        trace!(
            track = self.index,
            events = self.events.len(),
            "scheduled note batch"
        );
    }

    /// Select the instrument for subsequent notes.
    ///
    /// A percussion instrument switches the track into percussion mode and
    /// emits nothing; a melodic instrument leaves percussion mode and
    /// appends a program change at the current position.
    pub fn set_instrument(&mut self, instrument: Instrument) {
        if instrument.is_percussion() {
            self.percussion_key = Some(instrument.program());
            return;
        }

        self.percussion_key = None;
        let channel = instrument.channel().unwrap_or(self.default_channel);
        self.events.push(Event::from_parts(
            0,
            EventKind::ProgramChange {
                channel,
                program: instrument.program(),
            },
        ));
    }

    /// Append a pre-built event directly, bypassing scheduling.
    ///
    /// The event's delta-time is taken as-is; the caller is responsible
    /// for timing it against the track's existing event chain.
    pub fn push_event(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Insert an event before everything scheduled so far.
    pub(crate) fn insert_front(&mut self, event: Event) {
        self.events.insert(0, event);
    }
}
