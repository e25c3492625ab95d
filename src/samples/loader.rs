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

//! Concurrent loading of a drum kit into a [`SampleRegistry`].
//!
//! Every sample is read and decoded at the same time. A sample that fails is
//! logged and left out of the registry; it never fails the load as a whole.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::task::{JoinError, JoinSet};
use tracing::{debug, info, warn};

use crate::audio::decode::DecodeError;
use crate::config::Kit;

use super::{PlaybackStrategy, PreparedSample, SampleRegistry};

/// Why a single sample didn't load.
#[derive(Debug, thiserror::Error)]
pub enum SampleLoadError {
    #[error("unable to read sample {name} from {}: {source}", path.display())]
    Fetch {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to decode sample {name}: {source}")]
    Decode {
        name: String,
        #[source]
        source: DecodeError,
    },

    #[error("sample loading task failed: {0}")]
    Task(#[from] JoinError),
}

/// Loads samples with a playback strategy for a fixed output sample rate.
pub struct SampleLoader {
    strategy: Arc<dyn PlaybackStrategy>,
    target_sample_rate: u32,
}

impl SampleLoader {
    /// Creates a new sample loader.
    pub fn new(strategy: Arc<dyn PlaybackStrategy>, target_sample_rate: u32) -> SampleLoader {
        SampleLoader {
            strategy,
            target_sample_rate,
        }
    }

    /// Loads a single sample.
    pub async fn load(
        &self,
        name: &str,
        path: &Path,
    ) -> Result<Arc<dyn PreparedSample>, SampleLoadError> {
        load_sample(
            self.strategy.clone(),
            self.target_sample_rate,
            name.to_string(),
            path.to_path_buf(),
        )
        .await
    }

    /// Loads every sample of the kit concurrently and waits for all of them to
    /// settle. Failed samples are logged and skipped.
    pub async fn load_kit(&self, kit: &Kit) -> SampleRegistry {
        let started = Instant::now();
        let mut registry = SampleRegistry::new(kit.samples().len());
        let mut tasks = JoinSet::new();

        for name in kit.samples().keys() {
            let Some(path) = kit.resolve(name) else {
                continue;
            };
            let strategy = self.strategy.clone();
            let target_sample_rate = self.target_sample_rate;
            let name = name.clone();
            tasks.spawn(async move {
                let result = load_sample(strategy, target_sample_rate, name.clone(), path).await;
                (name, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((name, Ok(sample))) => {
                    debug!(sample = name, "Sample ready");
                    registry.insert(name, sample);
                }
                Ok((name, Err(e))) => {
                    warn!(sample = name, err = %e, "Failed to load sample");
                }
                Err(e) => {
                    warn!(err = %SampleLoadError::from(e), "Failed to load sample");
                }
            }
        }

        let status = registry.status();
        info!(
            loaded = status.loaded(),
            total = status.total(),
            strategy = %self.strategy.kind(),
            memory_kb = registry.memory_usage() / 1024,
            elapsed_ms = started.elapsed().as_millis(),
            "Kit loaded"
        );
        registry
    }
}

impl std::fmt::Debug for SampleLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampleLoader")
            .field("strategy", &self.strategy.kind())
            .field("target_sample_rate", &self.target_sample_rate)
            .finish()
    }
}

/// Reads the file asynchronously and decodes it on the blocking pool.
async fn load_sample(
    strategy: Arc<dyn PlaybackStrategy>,
    target_sample_rate: u32,
    name: String,
    path: PathBuf,
) -> Result<Arc<dyn PreparedSample>, SampleLoadError> {
    let encoded = match tokio::fs::read(&path).await {
        Ok(encoded) => encoded,
        Err(source) => return Err(SampleLoadError::Fetch { name, path, source }),
    };
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .map(str::to_string);

    debug!(sample = name, path = ?path, bytes = encoded.len(), "Decoding sample");
    tokio::task::spawn_blocking(move || {
        strategy.prepare(encoded, extension.as_deref(), target_sample_rate)
    })
    .await?
    .map_err(|source| SampleLoadError::Decode { name, source })
}
