use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Result, RingVizError};

/// Width and height of the square drawing surface in pixels.
pub const SCREEN_SIZE: u32 = 800;
/// Ring and particle origin.
pub const CENTER: (f32, f32) = (SCREEN_SIZE as f32 / 2.0, SCREEN_SIZE as f32 / 2.0);

pub const SAMPLE_RATE: u32 = 44_100;
/// Mono frames delivered per audio callback.
pub const BUFFER_SIZE: usize = 2048;
/// Wall-clock span of one buffer in milliseconds (2048 / 44100 ≈ 46 ms).
pub const BUFFER_PERIOD_MS: f64 = BUFFER_SIZE as f64 * 1000.0 / SAMPLE_RATE as f64;
/// Divisor that maps a signed 16-bit sample onto [-1, 1].
pub const FULL_SCALE: f32 = 32_768.0;

pub const MAX_PARTICLES: usize = 300;
pub const BASE_RADIUS: f32 = 100.0;
pub const BEAT_THRESHOLD: f32 = 1.4;
/// Weight of the newest buffer in the beat-energy baseline.
pub const EMA_FACTOR: f32 = 0.1;
/// Degrees added to the hue once per audio buffer.
pub const HUE_STEP: f32 = 0.3;
/// Opacity removed from a particle on every advance.
pub const ALPHA_DECAY: u8 = 8;

/// Inclusive particle lifespan range, in frames.
pub const LIFETIME_RANGE: (i32, i32) = (20, 49);
/// Inclusive particle speed range, in pixels per frame.
pub const SPEED_RANGE: (f32, f32) = (1.0, 3.0);

pub const RING_POINTS: usize = 180;
pub const RING_STEP_DEGREES: f32 = 2.0;
/// Pixels of radius gained per unit of amplitude.
pub const RING_AMPLITUDE_GAIN: f32 = 150.0;
/// Pixels of radius lost per second since the last onset.
pub const RING_DECAY_GAIN: f32 = 50.0;
pub const RING_SATURATION: f32 = 0.8;
pub const RING_LIGHTNESS: f32 = 0.6;
pub const PARTICLE_SATURATION: f32 = 0.8;
pub const PARTICLE_LIGHTNESS: f32 = 0.7;

pub const BACKGROUND: [u8; 4] = [20, 20, 30, 255];

/// Top-level configuration structure for the application.
///
/// Only the headless run harness is configurable. Stream shape and visual
/// constants above are fixed, and unknown sections are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn live_defaults() -> Self {
        Self::default()
    }

    /// Parses a JSON document, filling any missing field with its default.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    fn validate(&self) -> Result<()> {
        if self.simulation.frame_interval_ms == 0 {
            return Err(RingVizError::Config(
                "frame_interval_ms must be non-zero".into(),
            ));
        }
        if self.simulation.bpm <= 0.0 {
            return Err(RingVizError::Config("bpm must be positive".into()));
        }
        Ok(())
    }
}

/// Parameters of the headless simulation driven by a synthetic signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    pub frames: u32,
    pub frame_interval_ms: u64,
    pub seed: u64,
    pub bpm: f32,
    /// Normalised level of each kick pulse.
    pub pulse_level: f32,
    /// Normalised level of the signal between pulses.
    pub floor_level: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_interval_ms: 16,
            seed: 0x5eed,
            bpm: 120.0,
            pulse_level: 0.6,
            floor_level: 0.02,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_period_follows_stream_constants() {
        assert_eq!(SAMPLE_RATE, 44_100);
        assert_eq!(BUFFER_SIZE, 2048);
        assert!((BUFFER_PERIOD_MS - 46.44).abs() < 0.01);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = AppConfig::from_json_str(r#"{ "simulation": { "frames": 10 } }"#).unwrap();
        assert_eq!(config.simulation.frames, 10);
        assert_eq!(config.simulation.frame_interval_ms, 16);
        assert_eq!(config.simulation.seed, SimulationConfig::default().seed);
    }

    #[test]
    fn stream_shape_cannot_be_overridden() {
        let err = AppConfig::from_json_str(r#"{ "audio": { "sample_rate": 8000, "buffer_size": 64 } }"#)
            .unwrap_err();
        assert!(matches!(err, RingVizError::Json(_)));

        let err = AppConfig::from_json_str(r#"{ "simulation": { "buffer_size": 64 } }"#).unwrap_err();
        assert!(matches!(err, RingVizError::Json(_)));
    }

    #[test]
    fn rejects_zero_frame_interval() {
        let err = AppConfig::from_json_str(r#"{ "simulation": { "frame_interval_ms": 0 } }"#)
            .unwrap_err();
        assert!(matches!(err, RingVizError::Config(_)));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = AppConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, RingVizError::Json(_)));
    }
}
