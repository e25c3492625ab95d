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

//! The drum event table: which sample a note id plays.
//!
//! Note ids are borrowed from the MIDI percussion key map, with a few
//! editor-specific articulations (ghost notes, flams, metronome clicks) placed on
//! otherwise unused keys. Some samples are reachable from more than one note id;
//! both the current and the legacy assignments are kept.

use std::collections::BTreeSet;
use std::fmt;

pub const KICK_NORMAL: u8 = 35;

pub const SNARE_NORMAL: u8 = 38;
pub const SNARE_GHOST: u8 = 21;
pub const SNARE_ACCENT: u8 = 22;
pub const SNARE_XSTICK: u8 = 37;
pub const SNARE_FLAM: u8 = 25;
pub const SNARE_DRAG: u8 = 23;
pub const SNARE_BUZZ: u8 = 24;

pub const HIHAT_NORMAL: u8 = 42;
pub const HIHAT_OPEN: u8 = 46;
pub const HIHAT_FOOT: u8 = 44;
pub const HIHAT_ACCENT: u8 = 108;
pub const HIHAT_ACCENT_LEGACY: u8 = 26;
pub const RIDE: u8 = 51;
pub const RIDE_BELL: u8 = 53;
pub const COWBELL: u8 = 105;
pub const COWBELL_LEGACY: u8 = 56;
pub const CRASH: u8 = 49;
pub const STACKER: u8 = 52;
pub const STACKER_LEGACY: u8 = 55;

pub const TOM1: u8 = 48;
pub const TOM2: u8 = 47;
pub const TOM3: u8 = 45;
pub const TOM4: u8 = 43;

pub const METRONOME_NORMAL: u8 = 76;
pub const METRONOME_ACCENT: u8 = 77;

/// A single entry of the drum event table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrumEvent {
    /// The note id that triggers this event.
    pub note: u8,
    /// The logical sample name played for this event.
    pub sample: &'static str,
    /// A human readable name for the articulation.
    pub label: &'static str,
}

impl fmt::Display for DrumEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) -> {}", self.label, self.note, self.sample)
    }
}

const fn event(note: u8, sample: &'static str, label: &'static str) -> DrumEvent {
    DrumEvent {
        note,
        sample,
        label,
    }
}

static STANDARD_EVENTS: [DrumEvent; 26] = [
    event(KICK_NORMAL, "kick", "Kick"),
    event(SNARE_NORMAL, "snare_normal", "Snare Normal"),
    event(SNARE_GHOST, "snare_ghost", "Snare Ghost"),
    event(SNARE_ACCENT, "snare_accent", "Snare Accent"),
    event(SNARE_XSTICK, "snare_xstick", "Cross Stick"),
    event(SNARE_FLAM, "snare_flam", "Snare Flam"),
    event(SNARE_DRAG, "snare_drag", "Snare Drag"),
    event(SNARE_BUZZ, "snare_buzz", "Snare Buzz"),
    event(HIHAT_NORMAL, "hihat_normal", "Hi-hat Normal"),
    event(HIHAT_OPEN, "hihat_open", "Hi-hat Open"),
    event(HIHAT_FOOT, "hihat_foot", "Hi-hat Foot"),
    event(HIHAT_ACCENT, "hihat_accent", "Hi-hat Accent"),
    event(HIHAT_ACCENT_LEGACY, "hihat_accent", "Hi-hat Accent (legacy)"),
    event(RIDE, "ride", "Ride"),
    event(RIDE_BELL, "ride_bell", "Ride Bell"),
    event(COWBELL, "cowbell", "Cowbell"),
    event(COWBELL_LEGACY, "cowbell", "Cowbell (legacy)"),
    event(CRASH, "crash", "Crash"),
    event(STACKER, "stacker", "Stacker"),
    event(STACKER_LEGACY, "stacker", "Stacker (legacy)"),
    event(TOM1, "tom1", "High Tom"),
    event(TOM2, "tom2", "Mid Tom"),
    event(TOM3, "tom3", "Low Tom"),
    event(TOM4, "tom4", "Floor Tom"),
    event(METRONOME_NORMAL, "metronome_normal", "Metronome"),
    event(METRONOME_ACCENT, "metronome_accent", "Metronome Accent"),
];

static STANDARD: DrumMap = DrumMap {
    events: &STANDARD_EVENTS,
};

/// A constant table from note id to sample name.
#[derive(Debug)]
pub struct DrumMap {
    events: &'static [DrumEvent],
}

impl DrumMap {
    /// Returns the drum map used by the editor.
    pub fn standard() -> &'static DrumMap {
        &STANDARD
    }

    /// Looks up the event for a note id.
    pub fn event(&self, note: u8) -> Option<&'static DrumEvent> {
        self.events.iter().find(|event| event.note == note)
    }

    /// Looks up the sample name for a note id.
    pub fn sample_for(&self, note: u8) -> Option<&'static str> {
        self.event(note).map(|event| event.sample)
    }

    /// Returns every note id that plays the given sample.
    pub fn notes_for(&self, sample: &str) -> Vec<u8> {
        self.events
            .iter()
            .filter(|event| event.sample == sample)
            .map(|event| event.note)
            .collect()
    }

    /// Returns all events in table order.
    pub fn events(&self) -> &'static [DrumEvent] {
        self.events
    }

    /// Returns the distinct sample names referenced by the table.
    pub fn sample_names(&self) -> BTreeSet<&'static str> {
        self.events.iter().map(|event| event.sample).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_note_ids_are_unique() {
        let map = DrumMap::standard();
        let mut seen = HashSet::new();
        for event in map.events() {
            assert!(seen.insert(event.note), "duplicate note {}", event.note);
        }
    }

    #[test]
    fn test_aliases() {
        let map = DrumMap::standard();
        assert_eq!(map.sample_for(HIHAT_ACCENT), Some("hihat_accent"));
        assert_eq!(map.sample_for(HIHAT_ACCENT_LEGACY), Some("hihat_accent"));
        assert_eq!(map.sample_for(COWBELL), map.sample_for(COWBELL_LEGACY));
        assert_eq!(map.sample_for(STACKER), map.sample_for(STACKER_LEGACY));

        let mut notes = map.notes_for("cowbell");
        notes.sort();
        assert_eq!(notes, vec![56, 105]);
    }

    #[test]
    fn test_unmapped() {
        let map = DrumMap::standard();
        assert_eq!(map.sample_for(0), None);
        assert_eq!(map.sample_for(36), None);
        assert_eq!(map.sample_for(127), None);
        assert!(map.notes_for("tambourine").is_empty());
    }

    #[test]
    fn test_sample_names() {
        let names = DrumMap::standard().sample_names();
        assert_eq!(names.len(), 23);
        assert!(names.contains("kick"));
        assert!(names.contains("metronome_accent"));
    }
}
