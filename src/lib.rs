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

//! Drum sample playback for groove notation editors.
//!
//! The [`DrumEngine`] owns an audio output context, preloads a kit of drum samples
//! and plays them by drum-event note id. The [`LegacyBridge`] exposes the same
//! playback behind a note-on/note-off call signature.

pub mod audio;
pub mod bridge;
pub mod check;
pub mod config;
pub mod engine;
pub mod mapping;
pub mod samples;

#[cfg(test)]
mod testutil;

pub use bridge::LegacyBridge;
pub use engine::{DrumEngine, EngineState, InitError, PlaybackError, Ready};
pub use mapping::{DrumEvent, DrumMap};
pub use samples::LoadStatus;
