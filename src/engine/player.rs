//! Live output through the sound card

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{
    BufferSize, Device, FromSample, Host, SampleFormat, SizedSample, Stream, StreamConfig, SupportedBufferSize,
};
use log::{error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use super::{Engine, EngineHandle};
use crate::viz::SampleBuffer;

/// Plays an engine on an output device
pub struct Player {
    device: Device,
    config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    running: Arc<AtomicBool>,
}

impl Player {
    /// Open an output device by name, or the default one
    ///
    /// `buffer_size` frames per callback are requested, clamped to what the
    /// device reports it supports.
    pub fn open(device_name: Option<&str>, buffer_size: usize) -> Result<Self> {
        let host = cpal::default_host();
        let device = find_device(&host, device_name)?;

        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let buffer = stream_buffer_size(buffer_size, supported.buffer_size());
        let mut config: StreamConfig = supported.into();
        config.buffer_size = buffer;

        info!(
            "output device: {} ({} Hz, {} ch, {:?}, buffer {:?})",
            device.name().unwrap_or_else(|_| "unknown".to_string()),
            config.sample_rate.0,
            config.channels,
            sample_format,
            config.buffer_size
        );

        Ok(Self {
            device,
            config,
            sample_format,
            stream: None,
            running: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Rate the engine has to be built with
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate.0
    }

    /// Start pulling audio from `engine`, copying it into `scope` when given
    pub fn start(&mut self, engine: &EngineHandle, scope: Option<Arc<Mutex<SampleBuffer>>>) -> Result<()> {
        self.running.store(true, Ordering::SeqCst);

        let engine = engine.shared();
        let stream = match self.sample_format {
            SampleFormat::F32 => self.build_stream::<f32>(engine, scope)?,
            SampleFormat::I16 => self.build_stream::<i16>(engine, scope)?,
            SampleFormat::U16 => self.build_stream::<u16>(engine, scope)?,
            other => return Err(anyhow!("unsupported sample format {:?}", other)),
        };

        stream.play()?;
        self.stream = Some(stream);
        Ok(())
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        self.stream = None;
    }

    fn build_stream<T>(&self, engine: Arc<Mutex<Engine>>, scope: Option<Arc<Mutex<SampleBuffer>>>) -> Result<Stream>
    where
        T: SizedSample + FromSample<f32>,
    {
        let channels = self.config.channels as usize;
        let running = Arc::clone(&self.running);

        let stream = self.device.build_output_stream(
            &self.config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                if !running.load(Ordering::SeqCst) {
                    silence(data);
                    return;
                }
                // never block the audio thread on the UI
                match engine.try_lock() {
                    Ok(mut engine) => {
                        let mut scope = scope.as_ref().and_then(|s| s.try_lock().ok());
                        write_frames(data, channels, &mut engine, scope.as_deref_mut());
                    }
                    Err(_) => silence(data),
                }
            },
            |err| error!("audio stream error: {}", err),
            None,
        )?;

        Ok(stream)
    }
}

fn find_device(host: &Host, name: Option<&str>) -> Result<Device> {
    match name {
        Some(name) => {
            let found = host
                .output_devices()?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false));
            found.ok_or_else(|| anyhow!("no output device named '{}'", name))
        }
        None => host
            .default_output_device()
            .ok_or_else(|| anyhow!("no output device available")),
    }
}

/// Requested frames per callback, kept inside the device's range
fn stream_buffer_size(requested: usize, supported: &SupportedBufferSize) -> BufferSize {
    let requested = u32::try_from(requested).unwrap_or(u32::MAX);
    match *supported {
        SupportedBufferSize::Range { min, max } => BufferSize::Fixed(requested.clamp(min, max.max(min))),
        SupportedBufferSize::Unknown => {
            warn!("device does not report buffer sizes, using its default");
            BufferSize::Default
        }
    }
}

fn silence<T: FromSample<f32> + cpal::Sample>(data: &mut [T]) {
    for sample in data.iter_mut() {
        *sample = T::from_sample(0.0f32);
    }
}

/// Fill interleaved frames with the mono engine output on every channel
fn write_frames<T: FromSample<f32> + cpal::Sample>(
    data: &mut [T],
    channels: usize,
    engine: &mut Engine,
    mut scope: Option<&mut SampleBuffer>,
) {
    for frame in data.chunks_mut(channels.max(1)) {
        let sample = engine.process() as f32;
        if let Some(scope) = scope.as_deref_mut() {
            scope.push(sample);
        }
        for out in frame.iter_mut() {
            *out = T::from_sample(sample);
        }
    }
}

/// Name and stream settings of the default output device
pub fn default_output() -> Option<(String, StreamConfig)> {
    let device = cpal::default_host().default_output_device()?;
    let name = device.name().ok()?;
    match device.default_output_config() {
        Ok(config) => Some((name, config.into())),
        Err(e) => {
            warn!("default output {} has no usable config: {}", name, e);
            None
        }
    }
}

/// Every output device with its default stream settings
pub fn list_output_devices() -> Vec<(String, StreamConfig)> {
    let host = cpal::default_host();
    let Ok(devices) = host.output_devices() else {
        return Vec::new();
    };

    devices
        .filter_map(|device| {
            let name = device.name().ok()?;
            let config = device.default_output_config().ok()?;
            Some((name, config.into()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoundSettings;

    fn engine_with_note() -> Engine {
        let mut engine = Engine::new(8000.0, &SoundSettings::default());
        engine.trigger_note(440.0);
        engine
    }

    #[test]
    fn test_write_frames_copies_mono_to_every_channel() {
        let mut engine = engine_with_note();
        let mut data = vec![0.0f32; 800];

        write_frames(&mut data, 2, &mut engine, None);

        for frame in data.chunks(2) {
            assert_eq!(frame[0], frame[1]);
        }
        assert!(data.iter().any(|s| s.abs() > 0.0));
    }

    #[test]
    fn test_write_frames_feeds_scope_once_per_frame() {
        let mut engine = engine_with_note();
        let mut scope = SampleBuffer::new(8);
        let mut data = vec![0.0f32; 16];

        write_frames(&mut data, 2, &mut engine, Some(&mut scope));

        // 8 frames, so the scope holds the left channel in order
        let left: Vec<f32> = data.chunks(2).map(|frame| frame[0]).collect();
        assert_eq!(scope.get_samples(), left);
    }

    #[test]
    fn test_buffer_size_is_applied_within_device_range() {
        let range = SupportedBufferSize::Range { min: 128, max: 4096 };

        assert_eq!(stream_buffer_size(512, &range), BufferSize::Fixed(512));
        assert_eq!(stream_buffer_size(64, &range), BufferSize::Fixed(128));
        assert_eq!(stream_buffer_size(8192, &range), BufferSize::Fixed(4096));
        assert_eq!(stream_buffer_size(512, &SupportedBufferSize::Unknown), BufferSize::Default);
    }

    #[test]
    fn test_silence_integer_format() {
        let mut data = vec![123i16; 4];
        silence(&mut data);
        assert!(data.iter().all(|&s| s == 0));
    }
}
