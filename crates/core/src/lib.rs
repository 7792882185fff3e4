//! Core library for the Ring Visualiser.
//!
//! An audio callback and a render loop share one [`VisualState`] behind a
//! single lock. The audio side ([`AudioFeed`]) measures loudness, detects
//! onsets, spawns particles and rotates the hue once per buffer. The render
//! side ([`FrameRenderer`]) sizes the ring from loudness and beat recency and
//! advances and draws the particle pool once per frame. Window, device and
//! GPU concerns stay outside behind [`Surface`] and [`Clock`].

pub mod analysis;
pub mod audio;
pub mod color;
pub mod config;
pub mod error;
pub mod particles;
pub mod render;
pub mod state;
pub mod timeline;

pub use analysis::{buffer_energy, AnalysisFrame, BeatDetector};
pub use audio::{downmix_to_mono, AudioFeed, MonoBlocker, SignalGenerator};
pub use color::{hsl_to_rgb, Rgb, Rgba};
pub use config::{AppConfig, SimulationConfig};
pub use error::{Result, RingVizError};
pub use particles::{Particle, ParticlePool, SpawnParams};
pub use render::{Canvas, FrameRenderer, FrameStats, Surface};
pub use state::{SharedVisualState, VisualState};
pub use timeline::{Clock, ManualClock, MonotonicClock};
