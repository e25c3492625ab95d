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
// Core voice mixing logic shared by the cpal output and the mock output.
use std::fmt;
use std::sync::Arc;

/// A source of audio frames for a single voice.
pub trait VoiceSource: Send {
    /// The number of interleaved channels the source produces.
    fn channel_count(&self) -> u16;

    /// Writes the next frame into `frame`, which holds `channel_count()` samples.
    /// Returns false once the source is exhausted.
    fn next_frame(&mut self, frame: &mut [f32]) -> bool;
}

/// A voice handed to the mixer: one independent playback of a sample.
pub struct ActiveVoice {
    /// Unique ID for this voice.
    id: u64,
    /// The sample this voice plays.
    sample: Arc<str>,
    /// The audio for this voice.
    source: Box<dyn VoiceSource>,
    /// Linear gain in [0, 1].
    gain: f32,
    /// The output frame at which the voice starts.
    start_at_sample: u64,
}

impl ActiveVoice {
    /// Creates a new voice.
    pub fn new(
        id: u64,
        sample: Arc<str>,
        source: Box<dyn VoiceSource>,
        gain: f32,
        start_at_sample: u64,
    ) -> ActiveVoice {
        ActiveVoice {
            id,
            sample,
            source,
            gain,
            start_at_sample,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn sample(&self) -> &str {
        &self.sample
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn start_at_sample(&self) -> u64 {
        self.start_at_sample
    }
}

impl fmt::Debug for ActiveVoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveVoice")
            .field("id", &self.id)
            .field("sample", &self.sample)
            .field("gain", &self.gain)
            .field("start_at_sample", &self.start_at_sample)
            .finish()
    }
}

/// Sums any number of voices into an interleaved output buffer.
pub struct AudioMixer {
    /// Voices that are waiting to start or still playing.
    voices: Vec<ActiveVoice>,
    /// Number of output channels.
    num_channels: u16,
    /// Sample rate.
    sample_rate: u32,
    /// Scratch frame reused for every voice.
    frame: Vec<f32>,
}

impl AudioMixer {
    /// Creates a new audio mixer.
    pub fn new(num_channels: u16, sample_rate: u32) -> Self {
        Self {
            voices: Vec::new(),
            num_channels: num_channels.max(1),
            sample_rate,
            frame: Vec::with_capacity(2),
        }
    }

    /// Adds a voice to the mixer.
    pub fn add_voice(&mut self, voice: ActiveVoice) {
        self.voices.push(voice);
    }

    /// Mixes into `output`, whose first frame is output frame `first_sample`.
    /// Voices scheduled later than the buffer stay queued, voices that run out
    /// are dropped.
    pub fn process_into(&mut self, output: &mut [f32], first_sample: u64) {
        output.fill(0.0);

        let channels = self.num_channels as usize;
        let frames = output.len() / channels;
        let end_sample = first_sample + frames as u64;
        let Self { voices, frame, .. } = self;

        voices.retain_mut(|voice| {
            if voice.start_at_sample >= end_sample {
                return true;
            }

            let source_channels = voice.source.channel_count().max(1) as usize;
            frame.resize(source_channels, 0.0);

            let offset = voice.start_at_sample.saturating_sub(first_sample) as usize;
            for out in output[offset * channels..frames * channels].chunks_exact_mut(channels) {
                if !voice.source.next_frame(frame) {
                    return false;
                }
                // Mono sources feed every output channel.
                for (channel, sample) in out.iter_mut().enumerate() {
                    *sample += frame[channel % source_channels] * voice.gain;
                }
            }
            true
        });
    }

    /// Returns the number of voices that are queued or playing.
    pub fn active_count(&self) -> usize {
        self.voices.len()
    }

    /// Drops every voice.
    pub fn clear(&mut self) {
        self.voices.clear();
    }

    /// Gets the number of output channels.
    pub fn num_channels(&self) -> u16 {
        self.num_channels
    }

    /// Gets the sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

impl fmt::Debug for AudioMixer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioMixer")
            .field("voices", &self.voices.len())
            .field("num_channels", &self.num_channels)
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}
