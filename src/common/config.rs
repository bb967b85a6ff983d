//! # Configuration Utilities
//!
//! TOML configuration for the HTTP server and the CLI.
//!
//! ```toml
//! [server]
//! address = "127.0.0.1:8000"
//! max_upload_bytes = 26214400
//! static_dir = "frontend/out"
//!
//! [glitch]
//! intensity = 0.8
//! ```

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::fs;

/// Load a TOML configuration file and deserialize it into the specified type.
///
/// # Example
/// ```ignore
/// let config: MirageConfig = load_config("config/mirage.toml")?;
/// ```
pub fn load_config<T>(path: &str) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let content = fs::read_to_string(path)?;
    let config: T = toml::from_str(&content)?;
    Ok(config)
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MirageConfig {
    pub server: ServerSection,
    pub glitch: GlitchSection,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Socket address to bind (e.g., "127.0.0.1:8000")
    pub address: String,
    /// Largest accepted multipart request body, in bytes
    pub max_upload_bytes: usize,
    /// Optional directory of static frontend files served at `/`
    pub static_dir: Option<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8000".to_string(),
            max_upload_bytes: 25 * 1024 * 1024,
            static_dir: None,
        }
    }
}

/// Glitch corruption applied to rejected decode attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlitchSection {
    /// Corruption strength in `[0, 1]`
    pub intensity: f32,
}

impl Default for GlitchSection {
    fn default() -> Self {
        Self { intensity: 0.8 }
    }
}

impl MirageConfig {
    /// Load from `path`, or fall back to defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let config = match path {
            Some(path) => load_config(path)?,
            None => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.glitch.intensity) {
            bail!(
                "glitch.intensity must be within [0, 1], got {}",
                self.glitch.intensity
            );
        }
        if self.server.max_upload_bytes == 0 {
            bail!("server.max_upload_bytes must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = MirageConfig::load(None).unwrap();
        assert_eq!(config.server.address, "127.0.0.1:8000");
        assert_eq!(config.glitch.intensity, 0.8);
        assert!(config.server.static_dir.is_none());
    }

    #[test]
    fn test_load_partial_file() {
        let file = write_config(
            r#"
            [server]
            address = "0.0.0.0:9000"
            "#,
        );
        let config = MirageConfig::load(file.path().to_str()).unwrap();
        assert_eq!(config.server.address, "0.0.0.0:9000");
        assert_eq!(config.server.max_upload_bytes, 25 * 1024 * 1024);
        assert_eq!(config.glitch.intensity, 0.8);
    }

    #[test]
    fn test_invalid_intensity_rejected() {
        let file = write_config("[glitch]\nintensity = 1.5\n");
        assert!(MirageConfig::load(file.path().to_str()).is_err());
    }

    #[test]
    fn test_missing_file() {
        assert!(MirageConfig::load(Some("/nonexistent/mirage.toml")).is_err());
    }
}
