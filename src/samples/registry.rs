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
    collections::{BTreeSet, HashMap},
    fmt,
    sync::Arc,
};

use super::PreparedSample;

/// How much of a kit loaded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadStatus {
    loaded: usize,
    total: usize,
}

impl LoadStatus {
    /// Creates a new load status.
    pub fn new(loaded: usize, total: usize) -> LoadStatus {
        LoadStatus { loaded, total }
    }

    /// The number of samples that loaded.
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// The number of samples the kit names.
    pub fn total(&self) -> usize {
        self.total
    }

    /// The share of the kit that loaded, from 0 to 100. An empty kit is complete.
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        self.loaded as f64 * 100.0 / self.total as f64
    }

    /// True if every sample loaded.
    pub fn is_complete(&self) -> bool {
        self.loaded >= self.total
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} ({:.0}%)",
            self.loaded,
            self.total,
            self.percentage()
        )
    }
}

/// Prepared samples by logical sample name. Filled once while loading and
/// read-only afterwards.
pub struct SampleRegistry {
    samples: HashMap<String, Arc<dyn PreparedSample>>,
    total: usize,
}

impl SampleRegistry {
    /// Creates an empty registry for a kit of `total` samples.
    pub fn new(total: usize) -> SampleRegistry {
        SampleRegistry {
            samples: HashMap::with_capacity(total),
            total,
        }
    }

    /// Adds a loaded sample.
    pub fn insert(&mut self, name: String, sample: Arc<dyn PreparedSample>) {
        self.samples.insert(name, sample);
    }

    /// Gets the named sample if it loaded.
    pub fn get(&self, name: &str) -> Option<Arc<dyn PreparedSample>> {
        self.samples.get(name).cloned()
    }

    /// True if the named sample loaded.
    pub fn contains(&self, name: &str) -> bool {
        self.samples.contains_key(name)
    }

    /// The names of every loaded sample.
    pub fn names(&self) -> BTreeSet<String> {
        self.samples.keys().cloned().collect()
    }

    pub fn status(&self) -> LoadStatus {
        LoadStatus::new(self.samples.len(), self.total)
    }

    /// Returns the total memory used by loaded samples.
    pub fn memory_usage(&self) -> usize {
        self.samples.values().map(|s| s.memory_size()).sum()
    }
}

impl fmt::Debug for SampleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleRegistry")
            .field("loaded", &self.samples.len())
            .field("total", &self.total)
            .field("total_memory_kb", &(self.memory_usage() / 1024))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::samples::{BufferedStrategy, PlaybackStrategy};
    use crate::testutil::wav_bytes;

    #[test]
    fn test_load_status() {
        let status = LoadStatus::new(3, 4);
        assert_eq!(status.percentage(), 75.0);
        assert!(!status.is_complete());
        assert_eq!(status.to_string(), "3/4 (75%)");

        let empty = LoadStatus::new(0, 0);
        assert_eq!(empty.percentage(), 100.0);
        assert!(empty.is_complete());
    }

    #[test]
    fn test_registry() {
        let mut registry = SampleRegistry::new(2);
        assert_eq!(registry.status(), LoadStatus::new(0, 2));
        assert!(registry.get("kick").is_none());

        let sample = BufferedStrategy
            .prepare(wav_bytes(1, 44100, 10, 0.5), Some("wav"), 44100)
            .unwrap();
        registry.insert("kick".to_string(), sample);

        assert!(registry.contains("kick"));
        assert!(!registry.contains("snare_normal"));
        assert!(registry.get("kick").is_some());
        assert_eq!(registry.names(), BTreeSet::from(["kick".to_string()]));
        assert_eq!(registry.status(), LoadStatus::new(1, 2));
        assert_eq!(registry.memory_usage(), 40);
    }
}
