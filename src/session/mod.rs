//! Interactive session state
//!
//! A [`Session`] owns everything the pointer and the settings controls act
//! on: the mapping settings, the sound settings, the current picture, the
//! held tone and the sequence player. Input arrives as [`InputEvent`]s.
//! Sequences run as tasks on the tokio runtime the session was given, so
//! handling an event never waits for one to finish.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::config::{PixtoneConfig, SoundSettings, MAX_REVERB_DECAY, MAX_VOLUME_DB, MIN_VOLUME_DB};
use crate::engine::{EngineHandle, ToneHandle};
use crate::mapping::{Frequency, MappingConfig, SamplePoint, Scale, ToneMapper, ToneMode, SCALE_CATALOG};
use crate::sequence::{randomize, SequencePlayer, SequenceReport, SequenceRequest};
use crate::surface::{Rgb, Surface};
use crate::synth::Waveform;

/// A sequence running in the background
pub type SequenceTask = JoinHandle<SequenceReport>;

/// Pointer and settings input
#[derive(Clone)]
pub enum InputEvent {
    PointerEnter,
    /// Pointer position in picture pixels
    PointerMove { x: u32, y: u32 },
    PointerLeave,
    SetMode(ToneMode),
    Randomize,
    SetScale(String),
    SetWaveform(Waveform),
    /// Volume in dB
    SetVolume(f64),
    /// Delay wet mix 0.0-1.0
    SetDelay(f64),
    /// Reverb decay in seconds
    SetReverbDecay(f64),
    LoadSurface(Arc<dyn Surface>),
}

impl fmt::Debug for InputEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputEvent::PointerEnter => write!(f, "PointerEnter"),
            InputEvent::PointerMove { x, y } => write!(f, "PointerMove({}, {})", x, y),
            InputEvent::PointerLeave => write!(f, "PointerLeave"),
            InputEvent::SetMode(mode) => write!(f, "SetMode({})", mode.label()),
            InputEvent::Randomize => write!(f, "Randomize"),
            InputEvent::SetScale(name) => write!(f, "SetScale({})", name),
            InputEvent::SetWaveform(waveform) => write!(f, "SetWaveform({})", waveform),
            InputEvent::SetVolume(db) => write!(f, "SetVolume({})", db),
            InputEvent::SetDelay(amount) => write!(f, "SetDelay({})", amount),
            InputEvent::SetReverbDecay(seconds) => write!(f, "SetReverbDecay({})", seconds),
            InputEvent::LoadSurface(surface) => {
                write!(f, "LoadSurface({}x{})", surface.width(), surface.height())
            }
        }
    }
}

/// What the pointer is over
#[derive(Debug, Clone, PartialEq)]
pub struct Readout {
    pub x: u32,
    pub y: u32,
    pub rgb: Rgb,
    pub frequency: Frequency,
    /// Pitch name such as `F4`, in coordinate mode
    pub pitch: Option<String>,
}

impl Readout {
    pub fn hex(&self) -> String {
        self.rgb.hex()
    }
}

/// One interactive session
pub struct Session {
    mapping: MappingConfig,
    sound: SoundSettings,
    surface: Arc<dyn Surface>,
    engine: EngineHandle,
    tone: Option<ToneHandle>,
    player: SequencePlayer,
    runtime: Handle,
    rng: StdRng,
    readout: Option<Readout>,
    intro: bool,
}

impl Session {
    pub fn new(
        mapping: MappingConfig,
        sound: SoundSettings,
        surface: Arc<dyn Surface>,
        engine: EngineHandle,
        player: SequencePlayer,
        runtime: Handle,
    ) -> Self {
        Self {
            mapping,
            sound,
            surface,
            engine,
            tone: None,
            player,
            runtime,
            rng: StdRng::from_entropy(),
            readout: None,
            intro: true,
        }
    }

    /// Build a session from a loaded configuration
    pub fn from_config(
        config: &PixtoneConfig,
        surface: Arc<dyn Surface>,
        engine: EngineHandle,
        runtime: Handle,
    ) -> Result<Self> {
        let player = SequencePlayer::new(
            ToneMapper::with_tuning(config.mapping.tuning_hz),
            config.sequence.sample_count,
            Duration::from_millis(config.sequence.interval_ms),
        );
        let mut session = Self::new(
            config.mapping_config()?,
            config.sound.clone(),
            surface,
            engine,
            player,
            runtime,
        );
        session.intro = config.sequence.intro;
        Ok(session)
    }

    /// Use a fixed seed for sequence sampling and randomizing
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn mapping(&self) -> &MappingConfig {
        &self.mapping
    }

    pub fn sound(&self) -> &SoundSettings {
        &self.sound
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn readout(&self) -> Option<&Readout> {
        self.readout.as_ref()
    }

    /// True while the held tone is sounding
    pub fn has_tone(&self) -> bool {
        self.tone.is_some()
    }

    /// True while a blocking sequence keeps the pointer out
    pub fn is_interaction_blocked(&self) -> bool {
        self.player.gate().is_blocked()
    }

    pub fn is_playing_sequence(&self) -> bool {
        self.player.is_playing()
    }

    /// Apply one input event
    ///
    /// Returns the sequence the event started, if any.
    pub fn handle(&mut self, event: InputEvent) -> Result<Option<SequenceTask>> {
        debug!("input: {:?}", event);

        match event {
            InputEvent::PointerEnter => {
                if !self.is_interaction_blocked() {
                    self.acquire_tone();
                }
            }
            InputEvent::PointerMove { x, y } => {
                if !self.is_interaction_blocked() {
                    self.pointer_moved(x, y);
                }
            }
            InputEvent::PointerLeave => {
                self.tone = None;
                self.readout = None;
            }
            InputEvent::SetMode(mode) => {
                self.mapping.mode = mode;
                info!("tone mode: {}", mode.label());
                return Ok(Some(self.play_sequence(false)));
            }
            InputEvent::Randomize => {
                self.randomize_settings()?;
                return Ok(Some(self.play_sequence(true)));
            }
            InputEvent::SetScale(name) => {
                self.mapping.scale = Scale::from_name(&name)?;
                info!("scale: {}", self.mapping.scale.name());
            }
            InputEvent::SetWaveform(waveform) => {
                self.sound.waveform = waveform;
                self.engine.lock().set_waveform(waveform);
            }
            InputEvent::SetVolume(db) => {
                self.sound.volume_db = db.clamp(MIN_VOLUME_DB, MAX_VOLUME_DB);
                self.engine.lock().set_volume_db(self.sound.volume_db);
            }
            InputEvent::SetDelay(amount) => {
                self.sound.delay = amount.clamp(0.0, 1.0);
                self.engine.lock().set_delay(self.sound.delay);
            }
            InputEvent::SetReverbDecay(seconds) => {
                self.sound.reverb_decay = seconds.clamp(0.0, MAX_REVERB_DECAY);
                self.engine.lock().set_reverb_decay(self.sound.reverb_decay);
            }
            InputEvent::LoadSurface(surface) => {
                info!("picture loaded: {}x{}", surface.width(), surface.height());
                self.surface = surface;
                self.readout = None;
                return Ok(self.play_intro());
            }
        }

        Ok(None)
    }

    /// Start the intro sequence, unless intros are turned off
    pub fn play_intro(&mut self) -> Option<SequenceTask> {
        self.intro.then(|| self.play_sequence(false))
    }

    /// Start a sequence over the current picture and settings
    ///
    /// It queues behind any sequence already running.
    pub fn play_sequence(&mut self, block_interaction: bool) -> SequenceTask {
        let request = SequenceRequest {
            surface: Arc::clone(&self.surface),
            config: self.mapping.clone(),
            block_interaction,
        };
        let player = self.player.clone();
        let engine = self.engine.clone();
        let seed = self.rng.gen();

        self.runtime.spawn(async move {
            let mut rng = StdRng::seed_from_u64(seed);
            player.play(request, &mut rng, |hz| engine.trigger_note(hz)).await
        })
    }

    fn acquire_tone(&mut self) -> &ToneHandle {
        let engine = &self.engine;
        self.tone.get_or_insert_with(|| engine.acquire_tone())
    }

    fn pointer_moved(&mut self, x: u32, y: u32) {
        let (width, height) = (self.surface.width(), self.surface.height());
        let point = SamplePoint::new(x, y, self.surface.read_pixel(x, y));

        let mapper = self.player.mapper();
        let frequency = mapper.map_to_frequency(&point, width, height, &self.mapping);
        let pitch = match self.mapping.mode {
            ToneMode::ByCoordinate => mapper
                .pitch_name(&point, width, height, &self.mapping)
                .map(|(note, octave)| format!("{}{}", note, octave)),
            ToneMode::ByColor => None,
        };

        let glide = Duration::from_millis(self.sound.glide_ms);
        let tone = self.acquire_tone();
        if let Frequency::Hz(hz) = frequency {
            tone.glide_to(hz, glide);
        }

        self.readout = Some(Readout {
            x,
            y,
            rgb: point.rgb,
            frequency,
            pitch,
        });
    }

    fn randomize_settings(&mut self) -> Result<()> {
        let settings = randomize(&mut self.rng, SCALE_CATALOG);
        info!(
            "randomized: {} / {} / delay {} / decay {}",
            settings.waveform,
            settings.scale.as_deref().unwrap_or("-"),
            settings.delay,
            settings.reverb_decay
        );

        if let Some(name) = &settings.scale {
            self.mapping.scale = Scale::from_name(name)?;
        }
        self.sound.waveform = settings.waveform;
        self.sound.delay = settings.delay;
        self.sound.reverb_decay = settings.reverb_decay;

        let mut engine = self.engine.lock();
        engine.set_waveform(settings.waveform);
        engine.set_delay(settings.delay);
        engine.set_reverb_decay(settings.reverb_decay);
        Ok(())
    }
}
