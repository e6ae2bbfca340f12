//! Audio engine for pixtone
//!
//! Mixes the held tone and sequence notes through the delay and reverb.
//! The engine is shared between the UI and the audio thread behind an
//! [`EngineHandle`]; the held tone is owned through a [`ToneHandle`] that
//! silences it when dropped.

mod player;
mod recorder;

pub use player::{default_output, list_output_devices, Player};
pub use recorder::{Recorder, RecordingStats};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::debug;

use crate::config::SoundSettings;
use crate::effects::{FeedbackDelay, Reverb};
use crate::synth::{db_to_gain, GlideVoice, NoteVoice, Voice, Waveform};

/// Frequency a freshly acquired held tone starts at
const HELD_START_HZ: f64 = 440.0;

/// Time a volume change takes to settle on the held tone
const VOLUME_RAMP_SECONDS: f64 = 0.1;

/// Fixed wet mix of the reverb send
const REVERB_WET: f64 = 0.5;

/// The main audio engine
pub struct Engine {
    sample_rate: f64,
    waveform: Waveform,
    gain: f64,
    note_seconds: f64,
    held: Option<(u64, GlideVoice)>,
    notes: Vec<Box<dyn Voice>>,
    delay: FeedbackDelay,
    reverb: Reverb,
    next_id: u64,
}

impl Engine {
    /// Create a new engine with the given sound settings
    pub fn new(sample_rate: f64, sound: &SoundSettings) -> Self {
        let mut delay = FeedbackDelay::eighth_note(sample_rate);
        delay.set_wet(sound.delay);

        Self {
            sample_rate,
            waveform: sound.waveform,
            gain: db_to_gain(sound.volume_db),
            note_seconds: sound.note_ms as f64 / 1000.0,
            held: None,
            notes: Vec::new(),
            delay,
            reverb: Reverb::new(sample_rate, sound.reverb_decay, REVERB_WET),
            next_id: 0,
        }
    }

    pub fn waveform(&self) -> Waveform {
        self.waveform
    }

    /// Change the shape of the held tone and of future notes
    pub fn set_waveform(&mut self, waveform: Waveform) {
        self.waveform = waveform;
        if let Some((_, voice)) = &mut self.held {
            voice.set_waveform(waveform);
        }
    }

    /// Change the output level; the held tone ramps to it
    pub fn set_volume_db(&mut self, db: f64) {
        self.gain = db_to_gain(db);
        if let Some((_, voice)) = &mut self.held {
            voice.ramp_gain(self.gain, VOLUME_RAMP_SECONDS);
        }
    }

    pub fn set_delay(&mut self, wet: f64) {
        self.delay.set_wet(wet);
    }

    pub fn set_reverb_decay(&mut self, seconds: f64) {
        self.reverb.set_decay(seconds);
    }

    /// Start the held tone, replacing any previous one; returns its id
    pub fn start_held(&mut self) -> u64 {
        self.next_id += 1;
        let voice = GlideVoice::new(self.waveform, HELD_START_HZ, self.gain, self.sample_rate);
        self.held = Some((self.next_id, voice));
        debug!("held tone {} started", self.next_id);
        self.next_id
    }

    /// Glide held tone `id` toward `frequency`; false if it is gone
    pub fn glide_held(&mut self, id: u64, frequency: f64, glide: Duration) -> bool {
        match &mut self.held {
            Some((held_id, voice)) if *held_id == id => {
                voice.glide_to(frequency, glide.as_secs_f64());
                true
            }
            _ => false,
        }
    }

    /// Stop held tone `id` if it is still the current one
    pub fn stop_held(&mut self, id: u64) {
        if matches!(&self.held, Some((held_id, _)) if *held_id == id) {
            self.held = None;
            debug!("held tone {} stopped", id);
        }
    }

    /// Target frequency of the held tone, if one is sounding
    pub fn held_frequency(&self) -> Option<f64> {
        self.held.as_ref().map(|(_, voice)| voice.target_frequency())
    }

    /// Play a note that releases itself after the note length
    pub fn trigger_note(&mut self, frequency: f64) {
        let note = NoteVoice::new(self.waveform, frequency, self.gain, self.note_seconds, self.sample_rate);
        self.notes.push(Box::new(note));
    }

    /// Number of notes still sounding
    pub fn active_notes(&self) -> usize {
        self.notes.len()
    }

    /// Generate the next sample
    pub fn process(&mut self) -> f64 {
        let mut mix = 0.0;

        if let Some((_, voice)) = &mut self.held {
            mix += voice.process();
        }
        for note in &mut self.notes {
            mix += note.process();
        }
        self.notes.retain(|note| note.is_active());

        let mix = mix as f32;
        let wet = self.delay.process(mix) + self.reverb.process(mix);
        (wet * 0.5) as f64
    }

    /// Fill a buffer with samples
    pub fn fill_buffer(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.process() as f32;
        }
    }
}

/// Shared, lockable engine
#[derive(Clone)]
pub struct EngineHandle {
    inner: Arc<Mutex<Engine>>,
}

impl EngineHandle {
    pub fn new(engine: Engine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    /// The shared engine, for the audio thread
    pub fn shared(&self) -> Arc<Mutex<Engine>> {
        Arc::clone(&self.inner)
    }

    /// Lock the engine; a panic on another thread does not poison it for us
    pub fn lock(&self) -> MutexGuard<'_, Engine> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a held tone owned by the returned handle
    pub fn acquire_tone(&self) -> ToneHandle {
        let id = self.lock().start_held();
        ToneHandle {
            engine: self.clone(),
            id,
        }
    }

    pub fn trigger_note(&self, frequency: f64) {
        self.lock().trigger_note(frequency);
    }
}

/// Ownership of the held tone; dropping it stops the tone
pub struct ToneHandle {
    engine: EngineHandle,
    id: u64,
}

impl ToneHandle {
    /// Ramp the held tone toward `frequency`
    pub fn glide_to(&self, frequency: f64, glide: Duration) -> bool {
        self.engine.lock().glide_held(self.id, frequency, glide)
    }
}

impl Drop for ToneHandle {
    fn drop(&mut self) {
        self.engine.lock().stop_held(self.id);
    }
}
