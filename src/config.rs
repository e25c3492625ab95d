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
use std::path::Path;

use config::{Config, File};
use serde::Deserialize;

pub mod audio;
pub mod error;
pub mod kit;

pub use audio::Audio;
pub use error::ConfigError;
pub use kit::Kit;

/// The top level configuration for the drum engine.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct EngineConfig {
    /// The audio output configuration.
    #[serde(default)]
    audio: Audio,

    /// The drum kit to load.
    #[serde(default)]
    kit: Kit,
}

impl EngineConfig {
    /// Creates a new engine configuration.
    pub fn new(audio: Audio, kit: Kit) -> EngineConfig {
        EngineConfig { audio, kit }
    }

    /// Parse an engine configuration from a YAML file.
    pub fn deserialize(path: &Path) -> Result<EngineConfig, ConfigError> {
        Ok(Config::builder()
            .add_source(File::from(path))
            .build()?
            .try_deserialize::<EngineConfig>()?)
    }

    /// Gets the audio configuration.
    pub fn audio(&self) -> &Audio {
        &self.audio
    }

    /// Gets the kit configuration.
    pub fn kit(&self) -> &Kit {
        &self.kit
    }
}
