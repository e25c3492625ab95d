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

//! Drum sample loading and preparation.
//!
//! This module provides:
//! - Concurrent loading of a kit into a [`SampleRegistry`]
//! - Playback strategies that turn encoded sample files into voices
//! - The voice source that replays decoded audio through the mixer

mod loader;
mod registry;
mod strategy;
mod voice;

pub use loader::{SampleLoadError, SampleLoader};
pub use registry::{LoadStatus, SampleRegistry};
pub use strategy::{
    strategy_for, BufferedStrategy, ElementStrategy, PlaybackStrategy, PreparedSample,
    StrategyKind,
};
pub use voice::SampleVoice;
