//! Relay configuration
//!
//! Loaded from TOML. Every section and field is optional and falls back to
//! the defaults in [`crate::constants`].

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::*;
use crate::error::{Error, Result};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    pub playback: PlaybackConfig,
    pub spatial: SpatialConfig,
    pub network: NetworkConfig,
}

/// Playback engine settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Samples copied out of the asset per tick (all channels)
    pub working_buffer_samples: usize,
    /// Ticks per second driven by the host pump
    pub frame_rate_hz: u32,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            working_buffer_samples: DEFAULT_WORKING_BUFFER_SAMPLES,
            frame_rate_hz: DEFAULT_FRAME_RATE_HZ,
        }
    }
}

/// 3D attenuation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpatialConfig {
    /// Distance at which attenuation reaches zero
    pub max_distance: f32,
    /// Snap the emitter to the listener position every tick
    pub follow_listener: bool,
}

impl Default for SpatialConfig {
    fn default() -> Self {
        Self {
            max_distance: DEFAULT_MAX_DISTANCE,
            follow_listener: false,
        }
    }
}

/// Outbound transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Controller id stamped on every envelope
    pub controller_id: u8,
    /// Local bind address for the UDP send channel
    pub bind_address: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            controller_id: DEFAULT_CONTROLLER_ID,
            bind_address: "0.0.0.0:0".to_string(),
        }
    }
}

impl RelayConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: RelayConfig =
            toml::from_str(text).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Serialize back to TOML
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.playback.working_buffer_samples == 0 {
            return Err(Error::Config(
                "playback.working_buffer_samples must be greater than zero".into(),
            ));
        }
        if self.playback.frame_rate_hz == 0 {
            return Err(Error::Config(
                "playback.frame_rate_hz must be greater than zero".into(),
            ));
        }
        if !self.spatial.max_distance.is_finite() || self.spatial.max_distance <= 0.0 {
            return Err(Error::Config(format!(
                "spatial.max_distance must be positive, got {}",
                self.spatial.max_distance
            )));
        }
        Ok(())
    }

    /// Interval between scheduler ticks
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.playback.frame_rate_hz as f64)
    }
}
