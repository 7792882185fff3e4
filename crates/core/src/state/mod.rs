use std::sync::{Arc, Mutex, MutexGuard};

use rand::Rng;

use crate::{
    analysis::{buffer_energy, AnalysisFrame, BeatDetector},
    audio::AudioFeed,
    color::hsl_to_rgb,
    config::{
        BASE_RADIUS, CENTER, HUE_STEP, PARTICLE_LIGHTNESS, PARTICLE_SATURATION,
        RING_AMPLITUDE_GAIN, RING_DECAY_GAIN, RING_LIGHTNESS, RING_POINTS, RING_SATURATION,
        RING_STEP_DEGREES,
    },
    particles::ParticlePool,
    render::{FrameRenderer, FrameStats, Surface},
    timeline::Clock,
    Result, RingVizError,
};

/// Everything the audio callback and the render loop share.
///
/// The audio side writes loudness, the beat baseline, the onset timestamp and
/// the hue, and spawns particles. The render side advances and draws
/// particles. Both go through [`SharedVisualState`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualState {
    pub amplitude: f32,
    pub detector: BeatDetector,
    pub last_beat_ms: u64,
    pub particles: ParticlePool,
    /// Degrees, kept in [0, 360).
    pub hue: f32,
}

impl VisualState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Smoothed loudness baseline used for onset detection.
    pub fn beat_energy(&self) -> f32 {
        self.detector.beat_energy()
    }

    /// Audio write domain: runs once per delivered buffer.
    pub fn apply_audio<R: Rng + ?Sized>(
        &mut self,
        samples: &[i16],
        now_ms: u64,
        rng: &mut R,
    ) -> AnalysisFrame {
        let frame = self.detector.process(buffer_energy(samples));
        self.amplitude = frame.energy;

        if frame.onset {
            self.last_beat_ms = now_ms;
            let slot = self.particles.spawn(CENTER, rng);
            tracing::trace!(
                energy = frame.energy,
                baseline = frame.baseline,
                ?slot,
                "beat onset"
            );
        }

        self.hue = (self.hue + HUE_STEP) % 360.0;
        frame
    }

    /// Seconds since the last onset. Grows without bound during silence.
    pub fn beat_strength(&self, now_ms: u64) -> f32 {
        now_ms.saturating_sub(self.last_beat_ms) as f32 / 1000.0
    }

    /// `100 + amplitude * 150 - seconds_since_beat * 50`, never clamped.
    pub fn ring_radius(&self, now_ms: u64) -> f32 {
        BASE_RADIUS + self.amplitude * RING_AMPLITUDE_GAIN
            - self.beat_strength(now_ms) * RING_DECAY_GAIN
    }

    /// Render write domain: draws the ring, then advances and draws every
    /// active particle.
    pub fn render_frame<S: Surface + ?Sized>(&mut self, now_ms: u64, surface: &mut S) -> FrameStats {
        let radius = self.ring_radius(now_ms);
        let ring_points = draw_ring(surface, radius, self.hue);

        let particle_color = hsl_to_rgb(self.hue, PARTICLE_SATURATION, PARTICLE_LIGHTNESS);
        let particles_drawn = self.particles.advance_and_draw(surface, particle_color);

        FrameStats {
            radius,
            ring_points,
            particles_drawn,
            active_particles: self.particles.active_count(),
        }
    }
}

fn draw_ring<S: Surface + ?Sized>(surface: &mut S, radius: f32, hue: f32) -> usize {
    let color = hsl_to_rgb(hue, RING_SATURATION, RING_LIGHTNESS).with_alpha(u8::MAX);
    surface.set_color(color);

    for step in 0..RING_POINTS {
        let angle = (step as f32 * RING_STEP_DEGREES).to_radians();
        let x = CENTER.0 + angle.cos() * radius;
        let y = CENTER.1 + angle.sin() * radius;
        surface.draw_point(x as i32, y as i32);
    }
    RING_POINTS
}

/// The single lock around [`VisualState`].
///
/// Cloning is cheap and every clone refers to the same state.
#[derive(Debug, Clone, Default)]
pub struct SharedVisualState {
    inner: Arc<Mutex<VisualState>>,
}

impl SharedVisualState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Audio-callback handle. The RNG drives particle spawns.
    pub fn producer<C: Clock, R: Rng + Send>(&self, clock: C, rng: R) -> AudioFeed<C, R> {
        AudioFeed::new(self.clone(), clock, rng)
    }

    /// Render-loop handle.
    pub fn renderer<C: Clock>(&self, clock: C) -> FrameRenderer<C> {
        FrameRenderer::new(self.clone(), clock)
    }

    /// Consistent copy of the whole state.
    pub fn snapshot(&self) -> Result<VisualState> {
        Ok(self.lock()?.clone())
    }

    pub fn lock(&self) -> Result<MutexGuard<'_, VisualState>> {
        self.inner
            .lock()
            .map_err(|_| RingVizError::Poisoned("visual state"))
    }
}
