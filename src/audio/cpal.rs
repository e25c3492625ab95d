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
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    thread,
};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tracing::{debug, error, info, span, Level};

use super::{ActiveVoice, AudioError, AudioMixer, ContextState, OutputContext};
use crate::config;

/// The device name that selects the host's default output.
const DEFAULT_DEVICE: &str = "default";

/// Messages from the context to its output thread.
enum Control {
    /// Start the stream and report back.
    Resume(Sender<Result<(), AudioError>>),
    /// Drop the stream and exit.
    Close,
}

/// An audio platform backed by a cpal output device.
pub struct Platform {
    /// The name of the output device.
    device: String,
    /// A fixed buffer size in frames, if configured.
    buffer_size: Option<u32>,
}

impl Platform {
    /// Creates a new cpal platform from the audio configuration.
    pub fn new(config: &config::Audio) -> Platform {
        Platform {
            device: config.device().to_string(),
            buffer_size: config.buffer_size(),
        }
    }

    /// Finds the configured output device.
    fn find_device(&self) -> Result<cpal::Device, AudioError> {
        let host = cpal::default_host();
        if self.device == DEFAULT_DEVICE {
            return host.default_output_device().ok_or_else(|| {
                AudioError::Unsupported(format!("host {} has no output device", host.id().name()))
            });
        }

        let devices = host
            .output_devices()
            .map_err(|e| AudioError::Device(e.to_string()))?;
        for device in devices {
            match device.name() {
                Ok(name) if name.trim() == self.device => return Ok(device),
                Ok(_) => {}
                Err(e) => debug!(err = e.to_string(), "Skipping device without a name."),
            }
        }

        Err(AudioError::Device(format!(
            "no device found with name {}",
            self.device
        )))
    }
}

impl super::Platform for Platform {
    fn create_context(&self) -> Result<Arc<dyn OutputContext>, AudioError> {
        let span = span!(Level::INFO, "create context (cpal)");
        let _enter = span.enter();

        let device = self.find_device()?;
        let supported = device
            .default_output_config()
            .map_err(|e| AudioError::Unsupported(e.to_string()))?;
        let sample_format = supported.sample_format();
        let mut stream_config: cpal::StreamConfig = supported.config();
        if let Some(buffer_size) = self.buffer_size {
            stream_config.buffer_size = cpal::BufferSize::Fixed(buffer_size);
        }

        let sample_rate = stream_config.sample_rate.0;
        let channels = stream_config.channels;
        let clock = Arc::new(AtomicU64::new(0));
        let (voice_tx, voice_rx) = crossbeam_channel::unbounded();
        let (control_tx, control_rx) = crossbeam_channel::unbounded();
        let (setup_tx, setup_rx) = crossbeam_channel::bounded(1);

        // cpal streams can't always be moved between threads, so the stream is
        // built and owned by its own thread for its whole life.
        let output_clock = clock.clone();
        let output_thread = thread::Builder::new()
            .name("grooveplay-output".to_string())
            .spawn(move || {
                run_output(
                    device,
                    stream_config,
                    sample_format,
                    voice_rx,
                    output_clock,
                    control_rx,
                    setup_tx,
                )
            })
            .map_err(|e| AudioError::Stream(e.to_string()))?;

        setup_rx
            .recv()
            .map_err(|_| AudioError::Stream("output thread exited during setup".to_string()))??;

        info!(
            device = self.device,
            sample_rate,
            channels,
            format = ?sample_format,
            "Created output context."
        );

        Ok(Arc::new(Context {
            device: self.device.clone(),
            sample_rate,
            channels,
            state: Mutex::new(ContextState::Suspended),
            clock,
            voice_tx,
            control_tx,
            output_thread: Mutex::new(Some(output_thread)),
        }))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (cpal)", self.device)
    }
}

/// Builds the stream, reports the outcome and then serves control messages
/// until the context closes.
fn run_output(
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    voice_rx: Receiver<ActiveVoice>,
    clock: Arc<AtomicU64>,
    control_rx: Receiver<Control>,
    setup_tx: Sender<Result<(), AudioError>>,
) {
    let mixer = AudioMixer::new(config.channels, config.sample_rate.0);
    let stream = match sample_format {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, mixer, voice_rx, clock),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, mixer, voice_rx, clock),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, mixer, voice_rx, clock),
        cpal::SampleFormat::I32 => build_stream::<i32>(&device, &config, mixer, voice_rx, clock),
        other => Err(AudioError::Unsupported(format!(
            "sample format {:?} is not supported",
            other
        ))),
    };

    let stream = match stream {
        Ok(stream) => {
            let _ = setup_tx.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = setup_tx.send(Err(e));
            return;
        }
    };

    for control in control_rx.iter() {
        match control {
            Control::Resume(reply) => {
                let result = stream
                    .play()
                    .map_err(|e| AudioError::Stream(e.to_string()));
                let _ = reply.send(result);
            }
            Control::Close => break,
        }
    }

    if let Err(e) = stream.pause() {
        debug!(err = e.to_string(), "Unable to pause stream before closing.");
    }
}

/// Builds an output stream that mixes incoming voices and advances the clock.
fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut mixer: AudioMixer,
    voice_rx: Receiver<ActiveVoice>,
    clock: Arc<AtomicU64>,
) -> Result<cpal::Stream, AudioError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels.max(1) as usize;
    let mut scratch: Vec<f32> = Vec::new();

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                while let Ok(voice) = voice_rx.try_recv() {
                    mixer.add_voice(voice);
                }

                scratch.resize(data.len(), 0.0);
                let first_sample = clock.load(Ordering::Acquire);
                mixer.process_into(&mut scratch, first_sample);
                for (dst, &src) in data.iter_mut().zip(scratch.iter()) {
                    *dst = T::from_sample(src);
                }
                clock.fetch_add((data.len() / channels) as u64, Ordering::Release);
            },
            |err| error!(err = err.to_string(), "Output stream error."),
            None,
        )
        .map_err(|e| AudioError::Stream(e.to_string()))
}

/// An output context backed by a running cpal stream.
pub struct Context {
    device: String,
    sample_rate: u32,
    channels: u16,
    state: Mutex<ContextState>,
    /// Frames rendered by the audio callback.
    clock: Arc<AtomicU64>,
    voice_tx: Sender<ActiveVoice>,
    control_tx: Sender<Control>,
    output_thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl OutputContext for Context {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn state(&self) -> ContextState {
        *self.state.lock()
    }

    fn resume(&self) -> Result<(), AudioError> {
        match *self.state.lock() {
            ContextState::Closed => return Err(AudioError::Closed),
            ContextState::Running => return Ok(()),
            ContextState::Suspended => {}
        }

        // The state lock is not held across the round trip. A second resume
        // racing this one only starts the stream again.
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.control_tx
            .send(Control::Resume(reply_tx))
            .map_err(|_| AudioError::Closed)?;
        reply_rx.recv().map_err(|_| AudioError::Closed)??;

        let mut state = self.state.lock();
        if *state == ContextState::Closed {
            return Err(AudioError::Closed);
        }
        *state = ContextState::Running;
        info!(device = self.device, "Output context resumed.");
        Ok(())
    }

    fn current_sample(&self) -> u64 {
        self.clock.load(Ordering::Acquire)
    }

    fn schedule(&self, voice: ActiveVoice) -> Result<(), AudioError> {
        if *self.state.lock() == ContextState::Closed {
            return Err(AudioError::Closed);
        }

        self.voice_tx.send(voice).map_err(|_| AudioError::Closed)
    }

    fn close(&self) -> Result<(), AudioError> {
        {
            let mut state = self.state.lock();
            if *state == ContextState::Closed {
                return Ok(());
            }
            *state = ContextState::Closed;
        }

        // The thread may already be gone if the stream died.
        let _ = self.control_tx.send(Control::Close);
        if let Some(output_thread) = self.output_thread.lock().take() {
            output_thread
                .join()
                .map_err(|_| AudioError::Stream("output thread panicked".to_string()))?;
        }

        info!(device = self.device, "Closed output context.");
        Ok(())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            error!(err = e.to_string(), "Error closing output context.");
        }
    }
}

/// Lists the output devices of every available cpal host.
pub fn list_devices() -> Result<Vec<String>, AudioError> {
    // Suppress noisy output here.
    let _shh_stdout = shh::stdout().map_err(|e| AudioError::Device(e.to_string()))?;
    let _shh_stderr = shh::stderr().map_err(|e| AudioError::Device(e.to_string()))?;

    let mut devices: Vec<String> = Vec::new();
    for host_id in cpal::available_hosts() {
        let host = match cpal::host_from_id(host_id) {
            Ok(host) => host,
            Err(e) => {
                error!(
                    err = e.to_string(),
                    host = host_id.name(),
                    "Unable to open host"
                );
                continue;
            }
        };
        let host_devices = match host.output_devices() {
            Ok(host_devices) => host_devices,
            Err(e) => {
                error!(
                    err = e.to_string(),
                    host = host_id.name(),
                    "Unable to list devices for host"
                );
                continue;
            }
        };

        for device in host_devices {
            let Ok(output_configs) = device.supported_output_configs() else {
                continue;
            };
            let max_channels = output_configs
                .map(|output_config| output_config.channels())
                .max()
                .unwrap_or(0);
            if max_channels == 0 {
                continue;
            }

            let Ok(name) = device.name() else {
                continue;
            };
            devices.push(format!(
                "{} (Channels={}) ({})",
                name,
                max_channels,
                host_id.name()
            ));
        }
    }

    devices.sort();
    Ok(devices)
}
