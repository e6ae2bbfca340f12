//! Pixtone - Play pictures as sound

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use pixtone::config::{self, PixtoneConfig, DEFAULT_CONFIG_FILE};
use pixtone::engine::{default_output, list_output_devices, Engine, EngineHandle, Player};
use pixtone::mapping::{SamplePoint, ToneMapper, ToneMode};
use pixtone::render::{render_seed, render_to_wav, RenderOptions, DEFAULT_TAIL};
use pixtone::session::Session;
use pixtone::surface::{open_surface, Surface};
use pixtone::viz::{self, VizState};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

mod cli;

use cli::{Cli, Commands};

/// One probed point, as printed by `probe --json`
#[derive(Serialize)]
struct ProbeReport {
    x: u32,
    y: u32,
    rgb: [u8; 3],
    hex: String,
    mode: &'static str,
    frequency_hz: Option<f64>,
    pitch: Option<String>,
}

fn load_surface(cfg: &PixtoneConfig, image: Option<PathBuf>, seed: Option<u64>) -> Result<Arc<dyn Surface>> {
    let image = image.or_else(|| cfg.surface.image.clone());
    let seed = seed.or(cfg.surface.seed);
    open_surface(image.as_deref(), seed, cfg.surface.max_dimension).context("failed to load picture")
}

/// Open the sound card and an engine running at its rate
fn open_audio(cfg: &PixtoneConfig) -> Result<(Player, EngineHandle)> {
    let player = Player::open(cfg.audio.device.as_deref(), cfg.audio.buffer_size)?;
    let engine = EngineHandle::new(Engine::new(player.sample_rate() as f64, &cfg.sound));
    Ok((player, engine))
}

fn init_logging(default_filter: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // The TUI owns the terminal, so it only logs what RUST_LOG asks for
    init_logging(match cli.command {
        Commands::Play { .. } => "off",
        _ => "info",
    });

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Play { image, seed } => {
            let cfg = config::load_or_default(config_path)?;
            let surface = load_surface(&cfg, image, seed)?;

            let rt = tokio::runtime::Runtime::new()?;
            let (mut player, engine) = open_audio(&cfg)?;
            let mut state = VizState::new(cfg.visualizer.buffer_size);
            player.start(&engine, Some(state.sample_buffer.clone()))?;

            let running = state.running.clone();
            ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;

            let mut session = Session::from_config(&cfg, surface, engine, rt.handle().clone())?;
            session.play_intro();
            let result = viz::run_viz(&mut session, &mut state);

            drop(session);
            player.stop();
            result?;
        }

        Commands::Probe {
            x,
            y,
            mode,
            image,
            seed,
            json,
        } => {
            let cfg = config::load_or_default(config_path)?;
            let surface = load_surface(&cfg, image, seed)?;
            let mut mapping = cfg.mapping_config()?;
            if let Some(mode) = mode {
                mapping.mode = mode.into();
            }

            let (width, height) = (surface.width(), surface.height());
            let (x, y) = (x.min(width.saturating_sub(1)), y.min(height.saturating_sub(1)));
            let point = SamplePoint::new(x, y, surface.read_pixel(x, y));
            let mapper = ToneMapper::with_tuning(cfg.mapping.tuning_hz);
            let frequency = mapper.map_to_frequency(&point, width, height, &mapping);
            let pitch = match mapping.mode {
                ToneMode::ByCoordinate => mapper
                    .pitch_name(&point, width, height, &mapping)
                    .map(|(note, octave)| format!("{}{}", note, octave)),
                ToneMode::ByColor => None,
            };

            let report = ProbeReport {
                x,
                y,
                rgb: [point.rgb.r, point.rgb.g, point.rgb.b],
                hex: point.rgb.hex(),
                mode: mapping.mode.label(),
                frequency_hz: frequency.hz(),
                pitch,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("Point ({}, {}) of {}x{}", report.x, report.y, width, height);
                println!("  Colour: {} rgb{}", report.hex, point.rgb);
                println!("  Mode: {}", report.mode);
                if let Some(pitch) = &report.pitch {
                    println!("  Pitch: {}", pitch);
                }
                match report.frequency_hz {
                    Some(hz) => println!("  Frequency: {:.2} Hz", hz),
                    None => println!("  Frequency: unresolved"),
                }
            }
        }

        Commands::Sequence { image, seed, repeat } => {
            let cfg = config::load_or_default(config_path)?;
            let surface = load_surface(&cfg, image, seed)?;

            let rt = tokio::runtime::Runtime::new()?;
            let (mut player, engine) = open_audio(&cfg)?;
            player.start(&engine, None)?;

            let running = Arc::new(AtomicBool::new(true));
            let running_for_ctrlc = running.clone();
            ctrlc::set_handler(move || running_for_ctrlc.store(false, Ordering::SeqCst))?;

            let mut session = Session::from_config(&cfg, surface, engine, rt.handle().clone())?;
            println!(
                "Playing {} in {} mode{}",
                session.mapping().scale.name(),
                session.mapping().mode.label(),
                if repeat { " (Ctrl-C to stop)" } else { "" }
            );

            let mut played = 0usize;
            while running.load(Ordering::SeqCst) {
                let task = session.play_sequence(false);
                let report = rt.block_on(task)?;
                played += 1;
                println!("  Sequence {}: {} notes, {} skipped", played, report.emitted, report.skipped);
                if !repeat {
                    break;
                }
            }

            // let the last notes ring out
            std::thread::sleep(DEFAULT_TAIL);
            drop(session);
            player.stop();
        }

        Commands::Render {
            output,
            count,
            seed,
            image,
            json,
        } => {
            let cfg = config::load_or_default(config_path)?;
            let seed = render_seed(seed, &cfg);
            let surface = load_surface(&cfg, image, Some(seed))?;

            println!("Rendering {} sequence(s) to {:?}...", count, output);
            let options = RenderOptions {
                count,
                seed,
                ..RenderOptions::default()
            };
            let report = render_to_wav(&cfg, surface.as_ref(), &output, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("  Notes: {} ({} skipped)", report.notes, report.skipped);
                println!("  Length: {:.2}s, peak {:.3}", report.seconds, report.peak);
                println!("Rendered to {:?}", output);
            }
        }

        Commands::Devices => {
            println!("Available audio devices:\n");

            if let Some((name, config)) = default_output() {
                println!("Default output: {}", name);
                println!(
                    "  Sample rate: {} Hz, Channels: {}",
                    config.sample_rate.0, config.channels
                );
                println!();
            }

            println!("Output devices:");
            let devices = list_output_devices();
            if devices.is_empty() {
                println!("  (none found)");
            }
            for (name, config) in devices {
                println!("  - {} ({} Hz, {} ch)", name, config.sample_rate.0, config.channels);
            }
        }

        Commands::Check => {
            let path = config_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));
            println!("Checking configuration at {:?}...", path);

            match config::load_config(path) {
                Ok(cfg) => {
                    println!("Configuration is valid!");
                    println!("  Sample rate: {} Hz", cfg.audio.sample_rate);
                    println!("  Buffer size: {}", cfg.audio.buffer_size);
                    println!("  Scale: {}", cfg.mapping.scale);
                    println!("  Mode: {}", cfg.mapping.mode.label());
                    println!(
                        "  Octaves: {}-{}, colour range {}-{} Hz",
                        cfg.mapping.min_octave,
                        cfg.mapping.max_octave,
                        cfg.mapping.min_freq_hz,
                        cfg.mapping.max_freq_hz
                    );
                    println!("  Waveform: {}", cfg.sound.waveform);
                    println!("  Volume: {} dB", cfg.sound.volume_db);
                    println!("  Delay: {}, reverb decay: {}s", cfg.sound.delay, cfg.sound.reverb_decay);
                    println!(
                        "  Sequences: {} samples, {}ms apart",
                        cfg.sequence.sample_count, cfg.sequence.interval_ms
                    );
                    match &cfg.surface.image {
                        Some(image) => println!("  Image: {:?}", image),
                        None => println!("  Image: generated pattern"),
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let example_config = include_str!("../pixtone.example.yaml");

            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                println!("{} already exists. Not overwriting.", DEFAULT_CONFIG_FILE);
            } else {
                std::fs::write(DEFAULT_CONFIG_FILE, example_config)?;
                info!("wrote {}", DEFAULT_CONFIG_FILE);
                println!("Created {} with example configuration.", DEFAULT_CONFIG_FILE);
            }
        }
    }

    Ok(())
}
