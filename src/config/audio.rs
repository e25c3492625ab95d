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
use std::time::Duration;

use duration_string::DurationString;
use serde::Deserialize;

use super::error::ConfigError;

const DEFAULT_DEVICE: &str = "default";
const DEFAULT_LATENCY: Duration = Duration::ZERO;

/// A YAML representation of the audio output configuration.
#[derive(Deserialize, Clone, Debug)]
pub struct Audio {
    /// The audio device. "default" picks the host's default output, names
    /// starting with "mock" select the mock output.
    #[serde(default = "default_device")]
    device: String,

    /// Requested stream buffer size in frames. When unset the backend default is used.
    buffer_size: Option<u32>,

    /// Fixed delay added to every trigger so that voices always start on a
    /// sample boundary ahead of the mixing position.
    latency: Option<String>,
}

fn default_device() -> String {
    DEFAULT_DEVICE.to_string()
}

impl Default for Audio {
    fn default() -> Self {
        Audio::new(DEFAULT_DEVICE)
    }
}

impl Audio {
    /// New will create a new Audio configuration.
    pub fn new(device: &str) -> Audio {
        Audio {
            device: device.to_string(),
            buffer_size: None,
            latency: None,
        }
    }

    /// Returns a copy of this configuration with the given latency.
    pub fn with_latency(mut self, latency: &str) -> Audio {
        self.latency = Some(latency.to_string());
        self
    }

    /// Returns the device from the configuration.
    pub fn device(&self) -> &str {
        &self.device
    }

    /// Returns the requested stream buffer size.
    pub fn buffer_size(&self) -> Option<u32> {
        self.buffer_size
    }

    /// Returns the trigger latency from the configuration.
    pub fn latency(&self) -> Result<Duration, ConfigError> {
        match &self.latency {
            Some(latency) => parse_duration(latency),
            None => Ok(DEFAULT_LATENCY),
        }
    }
}

/// Parses a human readable duration such as "250ms".
pub fn parse_duration(value: &str) -> Result<Duration, ConfigError> {
    DurationString::from_string(value.to_string())
        .map(Duration::from)
        .map_err(|e| ConfigError::InvalidDuration {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert!(matches!(
            parse_duration("later"),
            Err(ConfigError::InvalidDuration { .. })
        ));
    }

    #[test]
    fn test_with_latency() {
        let audio = Audio::new("mock").with_latency("5ms");
        assert_eq!(audio.device(), "mock");
        assert_eq!(audio.latency().unwrap(), Duration::from_millis(5));
    }
}
