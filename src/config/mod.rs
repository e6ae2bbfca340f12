//! Configuration loading and validation

mod schema;

pub use schema::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a YAML file
pub fn load_config(path: &Path) -> Result<PixtoneConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {:?}", path))?;
    let config: PixtoneConfig = serde_yaml::from_str(&contents)?;
    config.validate()?;
    Ok(config)
}

/// Configuration picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "pixtone.yaml";

/// Load `path` if given, else `pixtone.yaml` when present, else the defaults
pub fn load_or_default(path: Option<&Path>) -> Result<PixtoneConfig> {
    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    match path {
        Some(path) => load_config(path),
        None if fallback.exists() => load_config(fallback),
        None => Ok(PixtoneConfig::default()),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ToneMode;
    use crate::synth::Waveform;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_minimal_config() {
        let yaml = r#"
audio:
  sample_rate: 44100
  buffer_size: 512

sound:
  volume_db: -12
"#;
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.sample_rate, 44100);
        assert_eq!(config.sound.volume_db, -12.0);
        assert_eq!(config.sequence.sample_count, 4);
        assert_eq!(config.visualizer.buffer_size, 64);
    }

    #[test]
    fn test_load_empty_file_gives_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{}").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.mapping.scale, "C major");
        assert_eq!(config.mapping.mode, ToneMode::ByColor);
        assert_eq!(config.sound.waveform, Waveform::Sine);
    }

    #[test]
    fn test_load_rejects_invalid() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"mapping:\n  scale: nonsense\n").unwrap();
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Path::new("/nonexistent/pixtone.yaml")).is_err());
        assert!(load_or_default(None).is_ok());
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = PixtoneConfig::default();
        config.mapping.mode = ToneMode::ByCoordinate;
        config.sound.waveform = Waveform::Triangle;

        let yaml = serde_yaml::to_string(&config).unwrap();
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let loaded = load_config(file.path()).unwrap();
        assert_eq!(loaded.mapping.mode, ToneMode::ByCoordinate);
        assert_eq!(loaded.sound.waveform, Waveform::Triangle);
    }
}
