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
use crate::audio::{decode::DecodeError, AudioError};

/// Errors raised while initializing the engine.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("audio output is not supported: {0}")]
    UnsupportedPlatform(String),

    #[error("unable to create audio output: {0}")]
    Context(#[source] AudioError),

    #[error("the engine is already initializing")]
    AlreadyInitializing,

    #[error("the engine was shut down while initializing")]
    Interrupted,
}

impl From<AudioError> for InitError {
    fn from(e: AudioError) -> Self {
        match e {
            AudioError::Unsupported(reason) => InitError::UnsupportedPlatform(reason),
            e => InitError::Context(e),
        }
    }
}

/// Reasons a play request produced no sound.
#[derive(Debug, thiserror::Error)]
pub enum PlaybackError {
    #[error("the engine is not initialized")]
    NotInitialized,

    #[error("note {0} is not mapped to a drum sound")]
    UnmappedNote(u8),

    #[error("sample {0} is not loaded")]
    SampleUnavailable(String),

    #[error("unable to create voice: {0}")]
    Voice(#[from] DecodeError),

    #[error("unable to schedule voice: {0}")]
    Output(#[from] AudioError),
}

impl PlaybackError {
    /// True for errors that are part of normal operation, like playing before the
    /// kit has loaded, as opposed to an output failure.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            PlaybackError::NotInitialized
                | PlaybackError::UnmappedNote(_)
                | PlaybackError::SampleUnavailable(_)
        )
    }
}
