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
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::{debug, info};

use super::{ActiveVoice, AudioError, AudioMixer, ContextState, OutputContext};

const MOCK_SAMPLE_RATE: u32 = 44100;
const MOCK_CHANNELS: u16 = 2;

/// A mock platform. Doesn't actually play anything, but mixes on demand.
///
/// The name selects the behavior: names containing "unsupported" have no audio
/// output, names containing "suspended" create contexts that start suspended.
pub struct Platform {
    name: String,
    start_suspended: bool,
    unsupported: bool,
    sample_rate: u32,
    last_context: Mutex<Option<Arc<Context>>>,
    contexts_created: AtomicUsize,
}

impl Platform {
    /// Gets the given mock platform.
    pub fn get(name: &str) -> Platform {
        Platform {
            name: name.to_string(),
            start_suspended: name.contains("suspended"),
            unsupported: name.contains("unsupported"),
            sample_rate: MOCK_SAMPLE_RATE,
            last_context: Mutex::new(None),
            contexts_created: AtomicUsize::new(0),
        }
    }

    /// Returns a copy of the platform running at a different sample rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Platform {
        self.sample_rate = sample_rate;
        self
    }

    /// Returns the most recently created context.
    pub fn context(&self) -> Option<Arc<Context>> {
        self.last_context.lock().clone()
    }

    /// Returns how many contexts have been created.
    pub fn contexts_created(&self) -> usize {
        self.contexts_created.load(Ordering::Relaxed)
    }
}

impl super::Platform for Platform {
    fn create_context(&self) -> Result<Arc<dyn OutputContext>, AudioError> {
        if self.unsupported {
            return Err(AudioError::Unsupported(format!(
                "{} has no audio output",
                self.name
            )));
        }

        let state = if self.start_suspended {
            ContextState::Suspended
        } else {
            ContextState::Running
        };
        let context = Arc::new(Context {
            name: self.name.clone(),
            sample_rate: self.sample_rate,
            channels: MOCK_CHANNELS,
            state: Mutex::new(state),
            clock: AtomicU64::new(0),
            mixer: Mutex::new(AudioMixer::new(MOCK_CHANNELS, self.sample_rate)),
            scheduled: Mutex::new(Vec::new()),
        });
        self.contexts_created.fetch_add(1, Ordering::Relaxed);
        *self.last_context.lock() = Some(context.clone());

        info!(device = self.name, state = ?state, "Created mock output context.");
        Ok(context)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (Mock)", self.name)
    }
}

/// A voice as it was handed to the mock output.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledPlay {
    pub id: u64,
    pub sample: String,
    pub gain: f32,
    pub start_at_sample: u64,
}

/// A mock output context. Audio is only produced when [`Context::render`] is called.
pub struct Context {
    name: String,
    sample_rate: u32,
    channels: u16,
    state: Mutex<ContextState>,
    clock: AtomicU64,
    mixer: Mutex<AudioMixer>,
    scheduled: Mutex<Vec<ScheduledPlay>>,
}

impl Context {
    /// Renders the given number of frames and advances the clock. A context that
    /// isn't running produces nothing and its clock stands still.
    pub fn render(&self, frames: usize) -> Vec<f32> {
        if *self.state.lock() != ContextState::Running {
            return Vec::new();
        }

        let mut output = vec![0.0; frames * self.channels as usize];
        let first_sample = self.clock.load(Ordering::Acquire);
        self.mixer.lock().process_into(&mut output, first_sample);
        self.clock.fetch_add(frames as u64, Ordering::Release);
        output
    }

    /// Returns every voice scheduled on this context, in order.
    pub fn scheduled(&self) -> Vec<ScheduledPlay> {
        self.scheduled.lock().clone()
    }

    /// Returns the number of voices queued or playing.
    pub fn active_voices(&self) -> usize {
        self.mixer.lock().active_count()
    }
}

impl OutputContext for Context {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn state(&self) -> ContextState {
        *self.state.lock()
    }

    fn resume(&self) -> Result<(), AudioError> {
        let mut state = self.state.lock();
        match *state {
            ContextState::Closed => Err(AudioError::Closed),
            _ => {
                *state = ContextState::Running;
                debug!(device = self.name, "Mock output context resumed.");
                Ok(())
            }
        }
    }

    fn current_sample(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }

    fn schedule(&self, voice: ActiveVoice) -> Result<(), AudioError> {
        if *self.state.lock() == ContextState::Closed {
            return Err(AudioError::Closed);
        }

        self.scheduled.lock().push(ScheduledPlay {
            id: voice.id(),
            sample: voice.sample().to_string(),
            gain: voice.gain(),
            start_at_sample: voice.start_at_sample(),
        });
        self.mixer.lock().add_voice(voice);
        Ok(())
    }

    fn close(&self) -> Result<(), AudioError> {
        *self.state.lock() = ContextState::Closed;
        self.mixer.lock().clear();
        info!(device = self.name, "Closed mock output context.");
        Ok(())
    }
}
