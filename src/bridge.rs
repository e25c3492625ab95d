// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! A note-on/note-off front end for the drum engine, for callers written
//! against a general MIDI synthesizer.

use std::sync::Arc;

use midly::{live::LiveEvent, MidiMessage};
use tracing::{debug, info, warn};

use crate::engine::{DrumEngine, MAX_VELOCITY};

/// The General MIDI percussion channel (channel 10), zero based.
pub const DRUM_CHANNEL: u8 = 9;

/// Forwards note-on calls to a [`DrumEngine`]. Drum hits are one-shots, so
/// note-off and stop-all are accepted and ignored.
#[derive(Clone, Debug)]
pub struct LegacyBridge {
    engine: Arc<DrumEngine>,
}

impl LegacyBridge {
    pub fn new(engine: Arc<DrumEngine>) -> LegacyBridge {
        LegacyBridge { engine }
    }

    /// Gets the engine this bridge plays through.
    pub fn engine(&self) -> &Arc<DrumEngine> {
        &self.engine
    }

    /// Plays `note`. The channel is ignored. Returns false if nothing played.
    pub fn note_on(&self, channel: i32, note: i32, velocity: i32, delay: f64) -> bool {
        let Ok(note) = u8::try_from(note) else {
            warn!(channel, note, "Note id out of range.");
            return false;
        };
        self.engine.play_by_note_id(note, velocity, delay)
    }

    /// Always succeeds: a drum hit can't be stopped.
    pub fn note_off(&self, _channel: i32, _note: i32, _delay: f64) -> bool {
        true
    }

    /// Always succeeds: scheduled hits can't be cancelled.
    pub fn stop_all_notes(&self) -> bool {
        debug!("Ignoring stop all notes, drum hits play to the end.");
        true
    }

    /// Plays `note` on the drum channel at full velocity with no delay.
    pub fn play_single_note(&self, note: i32) -> bool {
        self.note_on(DRUM_CHANNEL as i32, note, MAX_VELOCITY, 0.0)
    }

    /// Plays `note` and logs whether it worked.
    pub fn test_drum_sound(&self, note: i32) -> bool {
        let played = self.play_single_note(note);
        if played {
            info!(note, result = "SUCCESS", "Drum sound test.");
        } else {
            warn!(note, result = "FAILED", "Drum sound test.");
        }
        played
    }

    /// Handles a raw live MIDI message. Note on plays right away, note off (or
    /// note on with velocity 0) is accepted and ignored. Returns false for
    /// anything else, including bytes that don't parse.
    pub fn handle_midi(&self, raw: &[u8]) -> bool {
        let event = match LiveEvent::parse(raw) {
            Ok(event) => event,
            Err(e) => {
                warn!(err = %e, "Unable to parse MIDI message.");
                return false;
            }
        };

        match event {
            LiveEvent::Midi {
                channel,
                message: MidiMessage::NoteOn { key, vel },
            } if vel.as_int() > 0 => self.note_on(
                channel.as_int() as i32,
                key.as_int() as i32,
                vel.as_int() as i32,
                0.0,
            ),
            LiveEvent::Midi {
                channel,
                message: MidiMessage::NoteOn { key, .. } | MidiMessage::NoteOff { key, .. },
            } => self.note_off(channel.as_int() as i32, key.as_int() as i32, 0.0),
            other => {
                debug!(event = ?other, "Ignoring MIDI message.");
                false
            }
        }
    }
}
