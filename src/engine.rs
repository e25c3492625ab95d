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

//! The drum engine: owns the output context and the loaded kit, and turns play
//! requests into voices.

use std::{
    collections::BTreeSet,
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::{
    audio::{self, ActiveVoice, ContextState, OutputContext, Platform},
    config::{ConfigError, EngineConfig, Kit},
    mapping::DrumMap,
    samples::{strategy_for, LoadStatus, SampleLoader, SampleRegistry},
};

mod error;

pub use error::{InitError, PlaybackError};

/// The velocity of a full-strength hit.
pub const MAX_VELOCITY: i32 = 127;

/// Global counter for voice IDs.
static VOICE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies a scheduled voice.
pub type VoiceId = u64;

/// The externally visible state of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    Uninitialized,
    Initializing,
    Ready,
    ShutDown,
}

/// The result of a successful initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ready {
    status: LoadStatus,
}

impl Ready {
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    /// The number of samples that loaded.
    pub fn loaded(&self) -> usize {
        self.status.loaded()
    }

    /// The number of samples the kit names.
    pub fn total(&self) -> usize {
        self.status.total()
    }

    /// True if some samples failed to load.
    pub fn is_degraded(&self) -> bool {
        !self.status.is_complete()
    }
}

/// Everything that exists only while the engine is ready.
struct Session {
    context: Arc<dyn OutputContext>,
    registry: SampleRegistry,
    /// Fixed output latency added to every voice, in frames.
    latency_samples: u64,
}

enum Lifecycle {
    Uninitialized,
    Initializing {
        generation: u64,
        /// The state to fall back to if this initialization fails.
        previous: EngineState,
    },
    Ready(Arc<Session>),
    ShutDown,
}

impl Lifecycle {
    fn state(&self) -> EngineState {
        match self {
            Lifecycle::Uninitialized => EngineState::Uninitialized,
            Lifecycle::Initializing { .. } => EngineState::Initializing,
            Lifecycle::Ready(_) => EngineState::Ready,
            Lifecycle::ShutDown => EngineState::ShutDown,
        }
    }

    fn is_attempt(&self, attempt: u64) -> bool {
        matches!(self, Lifecycle::Initializing { generation, .. } if *generation == attempt)
    }
}

/// Plays drum samples by drum-event note id.
///
/// The engine is shared by `Arc` and every operation takes `&self`. Play calls
/// never block on loading or on the audio thread: they clone the current
/// session and schedule an independent voice on it.
pub struct DrumEngine {
    /// Where output contexts come from.
    platform: Arc<dyn Platform>,
    /// The kit to load on initialization.
    kit: Kit,
    /// Fixed latency added to every scheduled voice.
    latency: Duration,
    map: &'static DrumMap,
    lifecycle: RwLock<Lifecycle>,
    /// Counts initialization attempts so a stale attempt can tell it lost.
    generation: AtomicU64,
}

/// Returns an initialization attempt to its previous state unless it completed.
/// Covers both failures and an initialize future that was dropped midway.
struct Attempt<'a> {
    engine: &'a DrumEngine,
    generation: u64,
    settled: bool,
}

impl Drop for Attempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let mut lifecycle = self.engine.lifecycle.write();
        let previous = match &*lifecycle {
            Lifecycle::Initializing {
                generation,
                previous,
            } if *generation == self.generation => *previous,
            _ => return,
        };
        *lifecycle = match previous {
            EngineState::ShutDown => Lifecycle::ShutDown,
            _ => Lifecycle::Uninitialized,
        };
    }
}

impl DrumEngine {
    /// Creates a new, uninitialized engine.
    pub fn new(platform: Arc<dyn Platform>, kit: Kit, latency: Duration) -> DrumEngine {
        DrumEngine {
            platform,
            kit,
            latency,
            map: DrumMap::standard(),
            lifecycle: RwLock::new(Lifecycle::Uninitialized),
            generation: AtomicU64::new(0),
        }
    }

    /// Creates a new engine from the configuration.
    pub fn from_config(config: &EngineConfig) -> Result<DrumEngine, ConfigError> {
        Ok(DrumEngine::new(
            audio::get_platform(config.audio()),
            config.kit().clone(),
            config.audio().latency()?,
        ))
    }

    /// Creates the output context and loads the kit.
    ///
    /// Samples that fail to load are logged and skipped, so this succeeds with a
    /// partial kit as long as an output context exists. Calling this on a ready
    /// engine returns the current status without reloading.
    pub async fn initialize(&self) -> Result<Ready, InitError> {
        let generation = {
            let mut lifecycle = self.lifecycle.write();
            let previous = match &*lifecycle {
                Lifecycle::Ready(session) => {
                    debug!("Drum engine already initialized.");
                    return Ok(Ready {
                        status: session.registry.status(),
                    });
                }
                Lifecycle::Initializing { .. } => return Err(InitError::AlreadyInitializing),
                resting => resting.state(),
            };
            let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
            *lifecycle = Lifecycle::Initializing {
                generation,
                previous,
            };
            generation
        };
        let mut attempt = Attempt {
            engine: self,
            generation,
            settled: false,
        };

        info!(
            platform = %self.platform,
            strategy = %self.kit.strategy(),
            samples = self.kit.samples().len(),
            "Initializing drum engine."
        );

        let context = self.platform.create_context().map_err(|e| {
            error!(err = %e, "Unable to create output context.");
            InitError::from(e)
        })?;

        // Output contexts usually start suspended until something resumes them.
        if context.state() == ContextState::Suspended {
            if let Err(e) = context.resume() {
                warn!(err = %e, "Unable to resume output context, call resume later.");
            }
        }

        let loader = SampleLoader::new(strategy_for(self.kit.strategy()), context.sample_rate());
        let registry = loader.load_kit(&self.kit).await;
        let status = registry.status();
        let latency_samples =
            (self.latency.as_secs_f64() * context.sample_rate() as f64).round() as u64;

        {
            let mut lifecycle = self.lifecycle.write();
            if lifecycle.is_attempt(generation) {
                *lifecycle = Lifecycle::Ready(Arc::new(Session {
                    context: context.clone(),
                    registry,
                    latency_samples,
                }));
                attempt.settled = true;
            }
        }

        if !attempt.settled {
            warn!("Drum engine was shut down while initializing.");
            if let Err(e) = context.close() {
                error!(err = %e, "Error closing output context.");
            }
            return Err(InitError::Interrupted);
        }

        if status.is_complete() {
            info!(loaded = status.loaded(), "Drum engine ready.");
        } else {
            warn!(
                loaded = status.loaded(),
                total = status.total(),
                "Drum engine ready with missing samples."
            );
        }
        Ok(Ready { status })
    }

    /// Plays the drum sound mapped to `note`. Velocity is clamped to 0..=127 and
    /// the delay is in seconds from now. Returns false if nothing was scheduled.
    pub fn play_by_note_id(&self, note: u8, velocity: i32, delay_seconds: f64) -> bool {
        report(self.try_play_by_note_id(note, velocity, delay_seconds))
    }

    /// Plays the drum sound mapped to `note` at full velocity, right away.
    pub fn play_note(&self, note: u8) -> bool {
        self.play_by_note_id(note, MAX_VELOCITY, 0.0)
    }

    /// Like [`DrumEngine::play_by_note_id`], but reports why nothing played.
    pub fn try_play_by_note_id(
        &self,
        note: u8,
        velocity: i32,
        delay_seconds: f64,
    ) -> Result<VoiceId, PlaybackError> {
        let event = self
            .map
            .event(note)
            .ok_or(PlaybackError::UnmappedNote(note))?;
        self.try_play_sample(event.sample, velocity_to_gain(velocity), delay_seconds)
    }

    /// Plays a loaded sample by name. Gain is clamped into [0, 1]; `when_seconds`
    /// is an offset from the output clock, and anything not positive plays as
    /// soon as possible. Returns false if nothing was scheduled.
    pub fn play_sample(&self, sample_name: &str, gain: f32, when_seconds: f64) -> bool {
        report(self.try_play_sample(sample_name, gain, when_seconds))
    }

    /// Like [`DrumEngine::play_sample`], but reports why nothing played.
    pub fn try_play_sample(
        &self,
        sample_name: &str,
        gain: f32,
        when_seconds: f64,
    ) -> Result<VoiceId, PlaybackError> {
        let session = self.session().ok_or(PlaybackError::NotInitialized)?;
        let sample = session
            .registry
            .get(sample_name)
            .ok_or_else(|| PlaybackError::SampleUnavailable(sample_name.to_string()))?;

        let context = &session.context;
        let start_at_sample = context
            .current_sample()
            .saturating_add(session.latency_samples)
            .saturating_add(delay_samples(when_seconds, context.sample_rate()));
        let id = VOICE_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
        let gain = clamp_gain(gain);

        context.schedule(ActiveVoice::new(
            id,
            Arc::from(sample_name),
            sample.create_voice()?,
            gain,
            start_at_sample,
        ))?;

        debug!(
            id,
            sample = sample_name,
            gain,
            start_at_sample,
            "Scheduled voice."
        );
        Ok(id)
    }

    /// Resumes a suspended output context. Returns false if the engine isn't
    /// ready or the context can't be resumed.
    pub fn resume(&self) -> bool {
        let Some(session) = self.session() else {
            warn!("Cannot resume, drum engine not initialized.");
            return false;
        };

        match session.context.resume() {
            Ok(()) => true,
            Err(e) => {
                warn!(err = %e, "Unable to resume output context.");
                false
            }
        }
    }

    /// Closes the output context and drops the loaded kit. Play calls fail until
    /// the engine is initialized again.
    pub fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.lifecycle.write(), Lifecycle::ShutDown);
        match previous {
            Lifecycle::Ready(session) => {
                if let Err(e) = session.context.close() {
                    error!(err = %e, "Error closing output context.");
                }
                info!("Drum engine shut down.");
            }
            Lifecycle::Initializing { .. } => {
                info!("Drum engine shut down during initialization.");
            }
            Lifecycle::Uninitialized | Lifecycle::ShutDown => {
                debug!("Drum engine shut down without an output context.");
            }
        }
    }

    /// The names of every loaded sample.
    pub fn loaded_samples(&self) -> BTreeSet<String> {
        self.session()
            .map(|session| session.registry.names())
            .unwrap_or_default()
    }

    /// How much of the kit is loaded. Nothing is loaded unless the engine is ready.
    pub fn load_status(&self) -> LoadStatus {
        match self.session() {
            Some(session) => session.registry.status(),
            None => LoadStatus::new(0, self.kit.samples().len()),
        }
    }

    pub fn state(&self) -> EngineState {
        self.lifecycle.read().state()
    }

    /// The note id to sample mapping used for playback.
    pub fn mapping(&self) -> &'static DrumMap {
        self.map
    }

    /// The kit this engine loads.
    pub fn kit(&self) -> &Kit {
        &self.kit
    }

    /// The output clock in seconds, if the engine is ready.
    pub fn current_time(&self) -> Option<f64> {
        self.session().map(|session| session.context.current_time())
    }

    /// Clones the current session, if any, and releases the lock right away.
    fn session(&self) -> Option<Arc<Session>> {
        match &*self.lifecycle.read() {
            Lifecycle::Ready(session) => Some(session.clone()),
            _ => None,
        }
    }
}

impl fmt::Debug for DrumEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrumEngine")
            .field("platform", &self.platform.to_string())
            .field("state", &self.state())
            .field("strategy", &self.kit.strategy())
            .field("latency", &self.latency)
            .finish()
    }
}

/// Logs a failed play request and flattens it to a bool.
fn report(result: Result<VoiceId, PlaybackError>) -> bool {
    match result {
        Ok(_) => true,
        Err(e) if e.is_expected() => {
            warn!(err = %e, "Unable to play drum sound.");
            false
        }
        Err(e) => {
            error!(err = %e, "Unable to play drum sound.");
            false
        }
    }
}

/// Maps a MIDI velocity to a linear gain. Out of range velocities are clamped.
fn velocity_to_gain(velocity: i32) -> f32 {
    velocity.clamp(0, MAX_VELOCITY) as f32 / MAX_VELOCITY as f32
}

fn clamp_gain(gain: f32) -> f32 {
    if gain.is_nan() {
        return 0.0;
    }
    gain.clamp(0.0, 1.0)
}

/// Converts a delay in seconds to frames. Anything not positive and finite is
/// no delay at all.
fn delay_samples(when_seconds: f64, sample_rate: u32) -> u64 {
    if !when_seconds.is_finite() || when_seconds <= 0.0 {
        return 0;
    }
    (when_seconds * sample_rate as f64).round() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_velocity_to_gain() {
        assert_eq!(velocity_to_gain(127), 1.0);
        assert_eq!(velocity_to_gain(0), 0.0);
        assert_eq!(velocity_to_gain(-10), velocity_to_gain(0));
        assert_eq!(velocity_to_gain(999), velocity_to_gain(127));
        assert!((velocity_to_gain(64) - 64.0 / 127.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_clamp_gain() {
        assert_eq!(clamp_gain(0.5), 0.5);
        assert_eq!(clamp_gain(2.0), 1.0);
        assert_eq!(clamp_gain(-1.0), 0.0);
        assert_eq!(clamp_gain(f32::NAN), 0.0);
        assert_eq!(clamp_gain(f32::INFINITY), 1.0);
    }

    #[test]
    fn test_delay_samples() {
        assert_eq!(delay_samples(0.0, 44100), 0);
        assert_eq!(delay_samples(-1.0, 44100), 0);
        assert_eq!(delay_samples(f64::NAN, 44100), 0);
        assert_eq!(delay_samples(f64::INFINITY, 44100), 0);
        assert_eq!(delay_samples(0.5, 44100), 22050);
        assert_eq!(delay_samples(0.01, 48000), 480);
        assert_eq!(delay_samples(1e15, 44100), u64::MAX);
    }

    #[test]
    fn test_ready() {
        let ready = Ready {
            status: LoadStatus::new(22, 23),
        };
        assert_eq!(ready.loaded(), 22);
        assert_eq!(ready.total(), 23);
        assert!(ready.is_degraded());
    }
}
