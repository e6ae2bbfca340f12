//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::mapping::{MappingConfig, Scale, ToneMode};
use crate::synth::Waveform;

/// Quietest selectable volume in dB
pub const MIN_VOLUME_DB: f64 = -60.0;

/// Loudest selectable volume in dB
pub const MAX_VOLUME_DB: f64 = 0.0;

/// Longest selectable reverb decay in seconds
pub const MAX_REVERB_DECAY: f64 = 10.0;

/// Octaves that stay inside the MIDI note range
pub const MIN_OCTAVE: i32 = -1;
pub const MAX_OCTAVE: i32 = 9;

/// Main configuration for pixtone
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PixtoneConfig {
    /// Audio output settings
    #[serde(default)]
    pub audio: AudioConfig,

    /// How samples turn into pitches
    #[serde(default)]
    pub mapping: MappingSettings,

    /// Tone shape and effects
    #[serde(default)]
    pub sound: SoundSettings,

    /// Random preview sequences
    #[serde(default)]
    pub sequence: SequenceSettings,

    /// The picture to play
    #[serde(default)]
    pub surface: SurfaceSettings,

    /// Waveform display
    #[serde(default)]
    pub visualizer: VisualizerSettings,
}

impl PixtoneConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        // Validate audio settings
        if self.audio.sample_rate < 8000 || self.audio.sample_rate > 192000 {
            bail!("Sample rate must be between 8000 and 192000");
        }
        if self.audio.buffer_size < 64 || self.audio.buffer_size > 8192 {
            bail!("Buffer size must be between 64 and 8192");
        }

        // Validate mapping settings
        let mapping = &self.mapping;
        for octave in [mapping.min_octave, mapping.max_octave] {
            if !(MIN_OCTAVE..=MAX_OCTAVE).contains(&octave) {
                bail!("Octaves must be between {} and {}, got {}", MIN_OCTAVE, MAX_OCTAVE, octave);
            }
        }
        if mapping.min_octave > mapping.max_octave {
            bail!(
                "min_octave ({}) must not exceed max_octave ({})",
                mapping.min_octave,
                mapping.max_octave
            );
        }
        if mapping.min_freq_hz <= 0.0 || mapping.min_freq_hz >= mapping.max_freq_hz {
            bail!("Frequency range must be positive with min_freq_hz below max_freq_hz");
        }
        if mapping.tuning_hz <= 0.0 {
            bail!("tuning_hz must be positive");
        }
        Scale::from_name(&mapping.scale)?;

        // Validate sound settings
        let sound = &self.sound;
        if sound.volume_db < MIN_VOLUME_DB || sound.volume_db > MAX_VOLUME_DB {
            bail!("Volume must be between {} and {} dB", MIN_VOLUME_DB, MAX_VOLUME_DB);
        }
        if !(0.0..=1.0).contains(&sound.delay) {
            bail!("Delay must be between 0.0 and 1.0");
        }
        if !(0.0..=MAX_REVERB_DECAY).contains(&sound.reverb_decay) {
            bail!("Reverb decay must be between 0 and {} seconds", MAX_REVERB_DECAY);
        }

        if self.sequence.interval_ms == 0 {
            bail!("Sequence interval must be at least 1ms");
        }
        if self.surface.max_dimension == 0 {
            bail!("max_dimension must be at least 1");
        }
        if self.visualizer.buffer_size == 0 {
            bail!("Visualizer buffer size must be at least 1");
        }

        Ok(())
    }

    /// Mapping settings as the mapper reads them
    pub fn mapping_config(&self) -> Result<MappingConfig> {
        let mapping = &self.mapping;
        Ok(MappingConfig {
            scale: Scale::from_name(&mapping.scale)?,
            mode: mapping.mode,
            min_octave: mapping.min_octave,
            max_octave: mapping.max_octave,
            min_freq_hz: mapping.min_freq_hz,
            max_freq_hz: mapping.max_freq_hz,
        })
    }
}

/// Audio output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Sample rate in Hz (default: 44100)
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Buffer size in samples (default: 512)
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// Output device name (None = default device)
    #[serde(default)]
    pub device: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            buffer_size: default_buffer_size(),
            device: None,
        }
    }
}

fn default_sample_rate() -> u32 { 44100 }
fn default_buffer_size() -> usize { 512 }

/// Mapping settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingSettings {
    /// Scale name (default: C major)
    #[serde(default = "default_scale")]
    pub scale: String,

    /// Tone mode (default: by_color)
    #[serde(default)]
    pub mode: ToneMode,

    /// Octave at the bottom of the picture (default: 2)
    #[serde(default = "default_min_octave")]
    pub min_octave: i32,

    /// Octave at the top of the picture (default: 6)
    #[serde(default = "default_max_octave")]
    pub max_octave: i32,

    /// Pitch of a black pixel (default: 100)
    #[serde(default = "default_min_freq")]
    pub min_freq_hz: f64,

    /// Pitch of a white pixel (default: 1000)
    #[serde(default = "default_max_freq")]
    pub max_freq_hz: f64,

    /// Reference pitch of A4 (default: 440)
    #[serde(default = "default_tuning")]
    pub tuning_hz: f64,
}

impl Default for MappingSettings {
    fn default() -> Self {
        Self {
            scale: default_scale(),
            mode: ToneMode::default(),
            min_octave: default_min_octave(),
            max_octave: default_max_octave(),
            min_freq_hz: default_min_freq(),
            max_freq_hz: default_max_freq(),
            tuning_hz: default_tuning(),
        }
    }
}

fn default_scale() -> String { "C major".to_string() }
fn default_min_octave() -> i32 { 2 }
fn default_max_octave() -> i32 { 6 }
fn default_min_freq() -> f64 { 100.0 }
fn default_max_freq() -> f64 { 1000.0 }
fn default_tuning() -> f64 { 440.0 }

/// Sound settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SoundSettings {
    /// Oscillator shape (default: sine)
    #[serde(default)]
    pub waveform: Waveform,

    /// Output level in dB (default: -10)
    #[serde(default = "default_volume_db")]
    pub volume_db: f64,

    /// Delay wet mix 0.0-1.0 (default: 0.0)
    #[serde(default)]
    pub delay: f64,

    /// Reverb decay in seconds (default: 1.5)
    #[serde(default = "default_reverb_decay")]
    pub reverb_decay: f64,

    /// Glide time of the held tone in ms (default: 50)
    #[serde(default = "default_glide_ms")]
    pub glide_ms: u64,

    /// Length of a sequence note before release in ms (default: 250)
    #[serde(default = "default_note_ms")]
    pub note_ms: u64,
}

impl Default for SoundSettings {
    fn default() -> Self {
        Self {
            waveform: Waveform::default(),
            volume_db: default_volume_db(),
            delay: 0.0,
            reverb_decay: default_reverb_decay(),
            glide_ms: default_glide_ms(),
            note_ms: default_note_ms(),
        }
    }
}

fn default_volume_db() -> f64 { -10.0 }
fn default_reverb_decay() -> f64 { 1.5 }
fn default_glide_ms() -> u64 { 50 }
fn default_note_ms() -> u64 { 250 }

/// Sequence settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSettings {
    /// Samples per sequence (default: 4)
    #[serde(default = "default_sample_count")]
    pub sample_count: usize,

    /// Pause after each sample in ms (default: 200)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Play a sequence whenever a picture is loaded (default: true)
    #[serde(default = "default_intro")]
    pub intro: bool,
}

impl Default for SequenceSettings {
    fn default() -> Self {
        Self {
            sample_count: default_sample_count(),
            interval_ms: default_interval_ms(),
            intro: default_intro(),
        }
    }
}

fn default_sample_count() -> usize { 4 }
fn default_interval_ms() -> u64 { 200 }
fn default_intro() -> bool { true }

/// Surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceSettings {
    /// PNG to play (None = generated pattern)
    #[serde(default)]
    pub image: Option<PathBuf>,

    /// Seed of the generated pattern (None = random)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Longest side a loaded picture is scaled down to (default: 2000)
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
}

impl Default for SurfaceSettings {
    fn default() -> Self {
        Self {
            image: None,
            seed: None,
            max_dimension: default_max_dimension(),
        }
    }
}

fn default_max_dimension() -> u32 { 2000 }

/// Visualizer settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualizerSettings {
    /// Samples shown in the waveform (default: 64)
    #[serde(default = "default_viz_buffer")]
    pub buffer_size: usize,
}

impl Default for VisualizerSettings {
    fn default() -> Self {
        Self {
            buffer_size: default_viz_buffer(),
        }
    }
}

fn default_viz_buffer() -> usize { 64 }
