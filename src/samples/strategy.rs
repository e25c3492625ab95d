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
use std::{fmt, sync::Arc};

use serde::Deserialize;
use tracing::debug;

use crate::audio::{
    decode::{self, DecodeError},
    VoiceSource,
};

use super::SampleVoice;

/// Selects how loaded samples become voices.
#[derive(Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Decode once at load time and share the decoded buffer between voices.
    #[default]
    Buffered,
    /// Decode once at load time and give every voice a private copy.
    Element,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Buffered => write!(f, "buffered"),
            StrategyKind::Element => write!(f, "element"),
        }
    }
}

/// Turns an encoded sample file into something voices can be created from.
pub trait PlaybackStrategy: Send + Sync {
    /// The kind of this strategy.
    fn kind(&self) -> StrategyKind;

    /// Prepares a sample for playback at `target_rate`. Fails if the file can't
    /// be decoded.
    fn prepare(
        &self,
        encoded: Vec<u8>,
        extension: Option<&str>,
        target_rate: u32,
    ) -> Result<Arc<dyn PreparedSample>, DecodeError>;
}

/// A sample that is ready to play.
pub trait PreparedSample: Send + Sync {
    /// Creates a new, independent voice for this sample.
    fn create_voice(&self) -> Result<Box<dyn VoiceSource>, DecodeError>;

    /// The number of channels voices will produce.
    fn channel_count(&self) -> u16;

    /// Bytes held in memory for this sample.
    fn memory_size(&self) -> usize;
}

/// Returns the strategy for the given kind.
pub fn strategy_for(kind: StrategyKind) -> Arc<dyn PlaybackStrategy> {
    match kind {
        StrategyKind::Buffered => Arc::new(BufferedStrategy),
        StrategyKind::Element => Arc::new(ElementStrategy),
    }
}

/// Decodes once and replays the shared buffer.
#[derive(Debug, Default)]
pub struct BufferedStrategy;

impl PlaybackStrategy for BufferedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Buffered
    }

    fn prepare(
        &self,
        encoded: Vec<u8>,
        extension: Option<&str>,
        target_rate: u32,
    ) -> Result<Arc<dyn PreparedSample>, DecodeError> {
        let decoded = decode::decode(encoded, extension)?.resampled(target_rate);
        Ok(Arc::new(BufferedSample {
            data: Arc::new(decoded.samples),
            channels: decoded.channels,
        }))
    }
}

struct BufferedSample {
    data: Arc<Vec<f32>>,
    channels: u16,
}

impl PreparedSample for BufferedSample {
    fn create_voice(&self) -> Result<Box<dyn VoiceSource>, DecodeError> {
        Ok(Box::new(SampleVoice::new(self.data.clone(), self.channels)))
    }

    fn channel_count(&self) -> u16 {
        self.channels
    }

    fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

/// Decodes once and gives every voice its own copy of the decoded audio.
#[derive(Debug, Default)]
pub struct ElementStrategy;

impl PlaybackStrategy for ElementStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Element
    }

    fn prepare(
        &self,
        encoded: Vec<u8>,
        extension: Option<&str>,
        target_rate: u32,
    ) -> Result<Arc<dyn PreparedSample>, DecodeError> {
        let decoded = decode::decode(encoded, extension)?.resampled(target_rate);
        Ok(Arc::new(ElementSample {
            data: decoded.samples.into(),
            channels: decoded.channels,
        }))
    }
}

struct ElementSample {
    /// The template every voice copies from. Never handed out directly.
    data: Box<[f32]>,
    channels: u16,
}

impl PreparedSample for ElementSample {
    fn create_voice(&self) -> Result<Box<dyn VoiceSource>, DecodeError> {
        debug!(samples = self.data.len(), "Copying sample for a voice");
        Ok(Box::new(SampleVoice::new(
            Arc::new(self.data.to_vec()),
            self.channels,
        )))
    }

    fn channel_count(&self) -> u16 {
        self.channels
    }

    fn memory_size(&self) -> usize {
        self.data.len() * std::mem::size_of::<f32>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::wav_bytes;

    fn drain(mut voice: Box<dyn VoiceSource>) -> Vec<f32> {
        let mut frame = vec![0.0; voice.channel_count() as usize];
        let mut samples = Vec::new();
        while voice.next_frame(&mut frame) {
            samples.extend_from_slice(&frame);
        }
        samples
    }

    #[test]
    fn test_buffered_voices_share_audio() {
        let strategy = strategy_for(StrategyKind::Buffered);
        assert_eq!(strategy.kind(), StrategyKind::Buffered);

        let sample = strategy
            .prepare(wav_bytes(1, 44100, 100, 0.5), Some("wav"), 44100)
            .unwrap();
        assert_eq!(sample.channel_count(), 1);
        assert_eq!(sample.memory_size(), 100 * 4);

        let first = drain(sample.create_voice().unwrap());
        let second = drain(sample.create_voice().unwrap());
        assert_eq!(first.len(), 100);
        assert_eq!(first, second);
        assert!((first[0] - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_element_voices_copy_decoded_audio() {
        let strategy = strategy_for(StrategyKind::Element);
        assert_eq!(strategy.kind(), StrategyKind::Element);

        // Decoded and resampled once, at load time.
        let sample = strategy
            .prepare(wav_bytes(2, 22050, 50, 0.25), Some("wav"), 44100)
            .unwrap();
        assert_eq!(sample.channel_count(), 2);
        assert_eq!(sample.memory_size(), 100 * 2 * 4);

        let first = drain(sample.create_voice().unwrap());
        let second = drain(sample.create_voice().unwrap());
        assert_eq!(first.len(), 200);
        assert_eq!(first, second);
        assert!((first[1] - 0.25).abs() < 0.001);
    }

    #[test]
    fn test_resamples_to_output_rate() {
        let sample = BufferedStrategy
            .prepare(wav_bytes(1, 22050, 100, 0.5), Some("wav"), 44100)
            .unwrap();
        let voice = drain(sample.create_voice().unwrap());
        assert_eq!(voice.len(), 200);
    }

    #[test]
    fn test_rejects_garbage() {
        let garbage = b"definitely not audio".to_vec();
        assert!(BufferedStrategy
            .prepare(garbage.clone(), Some("wav"), 44100)
            .is_err());
        assert!(ElementStrategy.prepare(garbage, Some("wav"), 44100).is_err());
    }

    #[test]
    fn test_strategy_names() {
        assert_eq!(StrategyKind::Buffered.to_string(), "buffered");
        assert_eq!(StrategyKind::Element.to_string(), "element");
    }
}
