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
use std::sync::Arc;

use crate::audio::VoiceSource;

/// Replays interleaved, already decoded audio from the start to the end.
pub struct SampleVoice {
    /// The audio, possibly shared with other voices.
    data: Arc<Vec<f32>>,
    /// Number of interleaved channels in `data`.
    channels: u16,
    /// Index of the next sample to read.
    position: usize,
}

impl SampleVoice {
    /// Creates a new voice over the given audio.
    pub fn new(data: Arc<Vec<f32>>, channels: u16) -> SampleVoice {
        SampleVoice {
            data,
            channels: channels.max(1),
            position: 0,
        }
    }

    /// Returns the number of frames left to play.
    pub fn remaining_frames(&self) -> usize {
        (self.data.len() - self.position) / self.channels as usize
    }
}

impl VoiceSource for SampleVoice {
    fn channel_count(&self) -> u16 {
        self.channels
    }

    fn next_frame(&mut self, frame: &mut [f32]) -> bool {
        let channels = self.channels as usize;
        let end = self.position + channels;
        if end > self.data.len() || frame.len() < channels {
            return false;
        }

        frame[..channels].copy_from_slice(&self.data[self.position..end]);
        self.position = end;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plays_to_the_end() {
        let mut voice = SampleVoice::new(Arc::new(vec![0.1, 0.2, 0.3, 0.4]), 2);
        let mut frame = [0.0; 2];

        assert_eq!(voice.remaining_frames(), 2);
        assert!(voice.next_frame(&mut frame));
        assert_eq!(frame, [0.1, 0.2]);
        assert!(voice.next_frame(&mut frame));
        assert_eq!(frame, [0.3, 0.4]);
        assert!(!voice.next_frame(&mut frame));
        assert_eq!(voice.remaining_frames(), 0);
    }

    #[test]
    fn test_shared_data_is_independent() {
        let data = Arc::new(vec![0.5, 0.25]);
        let mut first = SampleVoice::new(data.clone(), 1);
        let mut second = SampleVoice::new(data, 1);
        let mut frame = [0.0; 1];

        assert!(first.next_frame(&mut frame));
        assert!(first.next_frame(&mut frame));
        assert_eq!(frame, [0.25]);

        // The second voice still starts from the beginning.
        assert!(second.next_frame(&mut frame));
        assert_eq!(frame, [0.5]);
    }

    #[test]
    fn test_partial_frame_is_dropped() {
        let mut voice = SampleVoice::new(Arc::new(vec![0.1, 0.2, 0.3]), 2);
        let mut frame = [0.0; 2];
        assert!(voice.next_frame(&mut frame));
        assert!(!voice.next_frame(&mut frame));
    }
}
