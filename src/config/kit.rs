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
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::samples::StrategyKind;

/// The directory the editor ships its drum samples in.
pub const DEFAULT_SAMPLE_PATH: &str = "soundfont/NewDrumSamples/MP3";

/// The sample files of the stock kit, by logical sample name.
pub const DEFAULT_SAMPLE_FILES: [(&str, &str); 23] = [
    ("kick", "Kick.mp3"),
    ("snare_normal", "Snare Normal.mp3"),
    ("snare_ghost", "Snare Ghost.mp3"),
    ("snare_accent", "Snare Accent.mp3"),
    ("snare_xstick", "Snare Cross Stick.mp3"),
    ("snare_flam", "Snare Flam.mp3"),
    ("snare_drag", "Drag.mp3"),
    ("snare_buzz", "Buzz.mp3"),
    ("hihat_normal", "Hi Hat Normal.mp3"),
    ("hihat_open", "Hi Hat Open.mp3"),
    ("hihat_foot", "Hi Hat Foot.mp3"),
    ("hihat_accent", "Hi Hat Accent.mp3"),
    ("ride", "Ride.mp3"),
    ("ride_bell", "Bell.mp3"),
    ("cowbell", "Cowbell.mp3"),
    ("crash", "Crash.mp3"),
    ("stacker", "Stacker.mp3"),
    ("tom1", "10 Tom.mp3"),
    ("tom2", "16 Tom.mp3"),
    ("tom3", "Rack Tom.mp3"),
    ("tom4", "Floor Tom.mp3"),
    ("metronome_normal", "metronomeClick.mp3"),
    ("metronome_accent", "metronome1Count.mp3"),
];

/// A YAML representation of a drum kit.
#[derive(Deserialize, Clone, Debug)]
pub struct Kit {
    /// Base path for resolving relative sample files.
    #[serde(default = "default_path")]
    path: PathBuf,

    /// How loaded samples are turned into voices.
    #[serde(default)]
    strategy: StrategyKind,

    /// Sample files by logical sample name.
    #[serde(default = "default_samples")]
    samples: BTreeMap<String, String>,
}

fn default_path() -> PathBuf {
    PathBuf::from(DEFAULT_SAMPLE_PATH)
}

fn default_samples() -> BTreeMap<String, String> {
    DEFAULT_SAMPLE_FILES
        .iter()
        .map(|(name, file)| (name.to_string(), file.to_string()))
        .collect()
}

impl Default for Kit {
    fn default() -> Self {
        Kit {
            path: default_path(),
            strategy: StrategyKind::default(),
            samples: default_samples(),
        }
    }
}

impl Kit {
    /// Creates a new kit.
    pub fn new(path: PathBuf, strategy: StrategyKind, samples: BTreeMap<String, String>) -> Kit {
        Kit {
            path,
            strategy,
            samples,
        }
    }

    /// Returns a copy of the kit rooted at a different directory.
    pub fn with_path(mut self, path: PathBuf) -> Kit {
        self.path = path;
        self
    }

    /// Returns a copy of the kit using a different playback strategy.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> Kit {
        self.strategy = strategy;
        self
    }

    /// Gets the base path of the kit.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the playback strategy.
    pub fn strategy(&self) -> StrategyKind {
        self.strategy
    }

    /// Gets the sample files by name.
    pub fn samples(&self) -> &BTreeMap<String, String> {
        &self.samples
    }

    /// Resolves the full path of the named sample.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        self.samples.get(name).map(|file| {
            if Path::new(file).is_absolute() {
                PathBuf::from(file)
            } else {
                self.path.join(file)
            }
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mapping::DrumMap;

    #[test]
    fn test_default_kit_covers_mapping() {
        let kit = Kit::default();
        for sample in DrumMap::standard().sample_names() {
            assert!(kit.samples().contains_key(sample), "{} has no file", sample);
        }
    }

    #[test]
    fn test_resolve() {
        let kit = Kit::default().with_path(PathBuf::from("/kits/studio"));
        assert_eq!(
            kit.resolve("crash"),
            Some(PathBuf::from("/kits/studio/Crash.mp3"))
        );
        assert_eq!(kit.resolve("gong"), None);

        let mut samples = BTreeMap::new();
        samples.insert("kick".to_string(), "/abs/kick.wav".to_string());
        let kit = Kit::new(PathBuf::from("rel"), StrategyKind::Buffered, samples);
        assert_eq!(kit.resolve("kick"), Some(PathBuf::from("/abs/kick.wav")));
    }
}
