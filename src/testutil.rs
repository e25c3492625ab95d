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
    collections::BTreeMap,
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use hound::{SampleFormat, WavSpec, WavWriter};
use tempfile::TempDir;

use crate::{
    audio::mock,
    config::{kit::DEFAULT_SAMPLE_FILES, Kit},
    engine::DrumEngine,
    samples::StrategyKind,
};

/// Frames in every test kit sample: 10ms at 44.1kHz.
pub const TEST_SAMPLE_FRAMES: usize = 441;

/// Amplitude of every test kit sample.
pub const TEST_SAMPLE_AMPLITUDE: f32 = 0.5;

/// Encodes a 16 bit WAV file holding a constant signal.
pub fn wav_bytes(channels: u16, sample_rate: u32, frames: usize, amplitude: f32) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(
            &mut cursor,
            WavSpec {
                channels,
                sample_rate,
                bits_per_sample: 16,
                sample_format: SampleFormat::Int,
            },
        )
        .unwrap();

        let value = (amplitude * i16::MAX as f32) as i16;
        for _ in 0..frames * channels as usize {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Builds an MPEG-1 Layer III stream of silent frames: 128kbps, 44.1kHz, mono.
/// Every frame is a header followed by zeroed side info and main data.
pub fn mp3_bytes(frames: usize) -> Vec<u8> {
    const HEADER: [u8; 4] = [0xFF, 0xFB, 0x90, 0xC4];
    // 144 * 128000 / 44100, no padding.
    const FRAME_LEN: usize = 417;

    let mut bytes = Vec::with_capacity(frames * FRAME_LEN);
    for _ in 0..frames {
        bytes.extend_from_slice(&HEADER);
        bytes.resize(bytes.len() + FRAME_LEN - HEADER.len(), 0);
    }
    bytes
}

/// Writes a WAV file holding a constant signal.
pub fn write_wav(path: &Path, channels: u16, sample_rate: u32, frames: usize, amplitude: f32) {
    std::fs::write(path, wav_bytes(channels, sample_rate, frames, amplitude)).unwrap();
}

/// A full drum kit of short WAV files in a temporary directory.
pub struct TestKit {
    dir: TempDir,
    kit: Kit,
}

impl TestKit {
    /// A kit where every sample loads.
    pub fn full() -> TestKit {
        TestKit::new(&[], &[])
    }

    /// A kit where the `missing` samples have no file and the `corrupt` samples
    /// aren't audio.
    pub fn new(missing: &[&str], corrupt: &[&str]) -> TestKit {
        let dir = tempfile::tempdir().unwrap();
        let mut samples = BTreeMap::new();

        for (name, _) in DEFAULT_SAMPLE_FILES {
            let file = format!("{}.wav", name);
            let path = dir.path().join(&file);
            if corrupt.contains(&name) {
                std::fs::write(&path, b"this sample file is corrupt").unwrap();
            } else if !missing.contains(&name) {
                write_wav(
                    &path,
                    1,
                    44100,
                    TEST_SAMPLE_FRAMES,
                    TEST_SAMPLE_AMPLITUDE,
                );
            }
            samples.insert(name.to_string(), file);
        }

        let kit = Kit::new(dir.path().to_path_buf(), StrategyKind::Buffered, samples);
        TestKit { dir, kit }
    }

    /// Switches the playback strategy of the kit.
    pub fn with_strategy(mut self, strategy: StrategyKind) -> TestKit {
        self.kit = self.kit.with_strategy(strategy);
        self
    }

    pub fn kit(&self) -> Kit {
        self.kit.clone()
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }
}

/// Creates an uninitialized engine on the named mock platform.
pub fn mock_engine(device: &str, kit: Kit) -> (Arc<DrumEngine>, Arc<mock::Platform>) {
    let platform = Arc::new(mock::Platform::get(device));
    let engine = Arc::new(DrumEngine::new(platform.clone(), kit, Duration::ZERO));
    (engine, platform)
}

/// Creates an engine on a mock platform and loads the test kit.
pub async fn ready_engine(test_kit: &TestKit) -> (Arc<DrumEngine>, Arc<mock::Platform>) {
    let (engine, platform) = mock_engine("mock", test_kit.kit());
    engine.initialize().await.unwrap();
    (engine, platform)
}
