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
use std::fmt;
use std::sync::Arc;

use crate::config;

pub mod cpal;
pub mod decode;
pub mod mixer;
pub mod mock;

pub use mixer::{ActiveVoice, AudioMixer, VoiceSource};

/// Errors raised by an audio output.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    #[error("audio output unsupported: {0}")]
    Unsupported(String),

    #[error("audio device error: {0}")]
    Device(String),

    #[error("audio stream error: {0}")]
    Stream(String),

    #[error("audio output context is closed")]
    Closed,
}

/// The lifecycle state of an output context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContextState {
    /// The context exists but is not producing audio yet.
    Suspended,
    /// The context is producing audio.
    Running,
    /// The context has been released.
    Closed,
}

/// A platform capable of producing audio output.
pub trait Platform: fmt::Display + Send + Sync {
    /// Creates a new output context. Fails with [`AudioError::Unsupported`] when
    /// the platform has no audio output at all.
    fn create_context(&self) -> Result<Arc<dyn OutputContext>, AudioError>;
}

/// An open audio output that voices can be scheduled on.
pub trait OutputContext: Send + Sync {
    /// The sample rate of the output in Hz.
    fn sample_rate(&self) -> u32;

    /// The number of output channels.
    fn channels(&self) -> u16;

    /// The current state of the context.
    fn state(&self) -> ContextState;

    /// Starts audio production on a suspended context.
    fn resume(&self) -> Result<(), AudioError>;

    /// The number of frames the output has rendered so far.
    fn current_sample(&self) -> u64;

    /// Hands a voice to the output. The call never blocks on the audio thread.
    fn schedule(&self, voice: ActiveVoice) -> Result<(), AudioError>;

    /// Releases the output. Scheduling on a closed context fails.
    fn close(&self) -> Result<(), AudioError>;

    /// The output clock in seconds.
    fn current_time(&self) -> f64 {
        self.current_sample() as f64 / self.sample_rate() as f64
    }
}

/// Lists output devices known to cpal.
pub fn list_devices() -> Result<Vec<String>, AudioError> {
    cpal::list_devices()
}

/// Gets the platform for the given audio configuration.
pub fn get_platform(config: &config::Audio) -> Arc<dyn Platform> {
    let device = config.device();
    if device.starts_with("mock") {
        return Arc::new(mock::Platform::get(device));
    }

    Arc::new(cpal::Platform::new(config))
}
