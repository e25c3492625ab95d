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
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{crate_version, Parser, Subcommand};
use grooveplay::{
    audio, check,
    config::{self, EngineConfig},
    engine::MAX_VELOCITY,
    DrumEngine, DrumMap,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How long to let the last hit ring out before closing the output.
const RING_OUT: Duration = Duration::from_secs(1);

#[derive(Parser)]
#[clap(
    author = "Michael Wilson",
    version = crate_version!(),
    about = "A drum sample player for groove notation."
)]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lists the available audio output devices.
    Devices {},
    /// Prints the note id to drum sample mapping.
    Mapping {},
    /// Plays every drum sound once and reports which ones work.
    Check {
        /// The path to the engine config.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The pause between drum sounds.
        #[arg(short, long, default_value = "250ms")]
        interval: String,
        /// The velocity to play at (0-127).
        #[arg(short, long, default_value_t = MAX_VELOCITY)]
        velocity: i32,
    },
    /// Plays the given note ids in sequence.
    Play {
        /// The path to the engine config.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// The velocity to play at (0-127).
        #[arg(short, long, default_value_t = MAX_VELOCITY)]
        velocity: i32,
        /// The time between notes.
        #[arg(short, long, default_value = "200ms")]
        interval: String,
        /// The note ids to play.
        #[arg(required = true)]
        notes: Vec<u8>,
    },
}

/// Loads the engine config, falling back to the defaults.
fn load_config(path: Option<PathBuf>) -> Result<EngineConfig, Box<dyn Error>> {
    Ok(match path {
        Some(path) => EngineConfig::deserialize(&path)?,
        None => EngineConfig::default(),
    })
}

/// Creates and initializes an engine for the config.
async fn start_engine(path: Option<PathBuf>) -> Result<Arc<DrumEngine>, Box<dyn Error>> {
    let config = load_config(path)?;
    let engine = Arc::new(DrumEngine::from_config(&config)?);
    let ready = engine.initialize().await?;
    info!(status = %ready.status(), "Kit loaded.");
    Ok(engine)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Devices {} => {
            let devices = audio::list_devices()?;

            if devices.is_empty() {
                println!("No devices found.");
                return Ok(());
            }

            println!("Devices:");
            for device in devices {
                println!("- {}", device);
            }
        }
        Commands::Mapping {} => {
            println!("Drum mapping:");
            for event in DrumMap::standard().events() {
                println!("- {:>3}: {} ({})", event.note, event.sample, event.label);
            }
        }
        Commands::Check {
            config,
            interval,
            velocity,
        } => {
            let interval = config::audio::parse_duration(&interval)?;
            let engine = start_engine(config).await?;

            let report = check::check_kit(&engine, velocity, interval).await;
            tokio::time::sleep(RING_OUT).await;
            engine.shutdown();

            println!("{}", report);
            if !report.is_success() {
                return Err(format!("{} drum sounds failed", report.broken().len()).into());
            }
        }
        Commands::Play {
            config,
            velocity,
            interval,
            notes,
        } => {
            let interval = config::audio::parse_duration(&interval)?;
            let engine = start_engine(config).await?;

            let mut failed = Vec::new();
            for (index, note) in notes.iter().enumerate() {
                let delay = interval.as_secs_f64() * index as f64;
                if !engine.play_by_note_id(*note, velocity, delay) {
                    failed.push(*note);
                }
            }

            tokio::time::sleep(play_duration(interval, notes.len())).await;
            engine.shutdown();

            if !failed.is_empty() {
                return Err(format!("unable to play notes {:?}", failed).into());
            }
        }
    }

    Ok(())
}

/// How long a `play` run lasts: one interval per note plus the ring out.
/// Saturates instead of overflowing on absurd intervals.
fn play_duration(interval: Duration, notes: usize) -> Duration {
    interval
        .saturating_mul(u32::try_from(notes).unwrap_or(u32::MAX))
        .saturating_add(RING_OUT)
}
