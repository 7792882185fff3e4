use std::f32::consts::TAU;

use rand::Rng;

use crate::{
    color::Rgb,
    config::{ALPHA_DECAY, LIFETIME_RANGE, MAX_PARTICLES, SPEED_RANGE},
    render::Surface,
};

/// A single short-lived point flung outward from the ring center.
///
/// A particle with `lifetime <= 0` is inactive: its slot may be reused and it
/// is neither advanced nor drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    /// Frames remaining.
    pub lifetime: i32,
    pub alpha: u8,
}

impl Particle {
    pub fn is_active(&self) -> bool {
        self.lifetime > 0
    }

    /// Moves one frame forward. Alpha stops at zero instead of wrapping back
    /// to opaque.
    pub fn advance(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
        self.lifetime -= 1;
        self.alpha = self.alpha.saturating_sub(ALPHA_DECAY);
    }
}

/// Parameters drawn from the RNG for one spawn, in draw order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnParams {
    pub angle: f32,
    pub speed: f32,
    pub lifetime: i32,
}

impl SpawnParams {
    pub fn sample<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..TAU);
        let speed = rng.gen_range(SPEED_RANGE.0..=SPEED_RANGE.1);
        let lifetime = rng.gen_range(LIFETIME_RANGE.0..=LIFETIME_RANGE.1);
        Self {
            angle,
            speed,
            lifetime,
        }
    }

    fn into_particle(self, origin: (f32, f32)) -> Particle {
        Particle {
            x: origin.0,
            y: origin.1,
            dx: self.angle.cos() * self.speed,
            dy: self.angle.sin() * self.speed,
            lifetime: self.lifetime,
            alpha: u8::MAX,
        }
    }
}

/// Fixed-capacity arena of particles addressed by slot index.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticlePool {
    slots: Vec<Particle>,
}

impl Default for ParticlePool {
    fn default() -> Self {
        Self::with_capacity(MAX_PARTICLES)
    }
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a pool of `capacity` inactive slots. The slot count never
    /// changes afterwards.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: usize) -> Option<&Particle> {
        self.slots.get(slot)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.is_active()).count()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Particle)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, particle)| particle.is_active())
    }

    /// Initialises the lowest-indexed free slot at `origin`.
    ///
    /// Returns the slot used, or `None` without touching the RNG or any slot
    /// when every slot is active.
    pub fn spawn<R: Rng + ?Sized>(&mut self, origin: (f32, f32), rng: &mut R) -> Option<usize> {
        let slot = self.slots.iter().position(|p| !p.is_active())?;
        self.slots[slot] = SpawnParams::sample(rng).into_particle(origin);
        Some(slot)
    }

    /// Advances every particle active at the start of the call and draws it
    /// at its new position. A particle that expires on this step is still
    /// drawn once.
    ///
    /// Returns the number of points drawn.
    pub fn advance_and_draw<S: Surface + ?Sized>(&mut self, surface: &mut S, color: Rgb) -> usize {
        let mut drawn = 0;
        for particle in self.slots.iter_mut().filter(|p| p.is_active()) {
            particle.advance();
            surface.set_color(color.with_alpha(particle.alpha));
            surface.draw_point(particle.x as i32, particle.y as i32);
            drawn += 1;
        }
        drawn
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, SeedableRng};

    use super::*;
    use crate::render::Canvas;

    const ORIGIN: (f32, f32) = (400.0, 400.0);

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    #[test]
    fn spawn_fills_lowest_free_slot() {
        let mut pool = ParticlePool::new();
        let mut rng = rng();

        assert_eq!(pool.spawn(ORIGIN, &mut rng), Some(0));
        assert_eq!(pool.spawn(ORIGIN, &mut rng), Some(1));

        pool.slots[0].lifetime = 0;
        assert_eq!(pool.spawn(ORIGIN, &mut rng), Some(0));
        assert_eq!(pool.active_count(), 2);
    }

    #[test]
    fn spawned_particle_is_within_ranges() {
        let mut pool = ParticlePool::new();
        let mut rng = rng();
        for _ in 0..MAX_PARTICLES {
            pool.spawn(ORIGIN, &mut rng).unwrap();
        }

        for (_, particle) in pool.iter_active() {
            assert_eq!((particle.x, particle.y), ORIGIN);
            assert_eq!(particle.alpha, 255);
            assert!((20..=49).contains(&particle.lifetime));
            let speed = particle.dx.hypot(particle.dy);
            assert!((0.999..=3.001).contains(&speed), "speed {speed}");
        }
    }

    #[test]
    fn full_pool_spawn_is_a_no_op() {
        let mut pool = ParticlePool::new();
        let mut rng = rng();
        for _ in 0..MAX_PARTICLES {
            pool.spawn(ORIGIN, &mut rng).unwrap();
        }
        let before = pool.clone();

        assert_eq!(pool.spawn(ORIGIN, &mut rng), None);
        assert_eq!(pool, before);
        assert_eq!(pool.active_count(), MAX_PARTICLES);
    }

    #[test]
    fn spawn_is_deterministic_for_a_seed() {
        let mut a = ParticlePool::new();
        let mut b = ParticlePool::new();
        let (mut rng_a, mut rng_b) = (rng(), rng());
        for _ in 0..16 {
            a.spawn(ORIGIN, &mut rng_a);
            b.spawn(ORIGIN, &mut rng_b);
        }
        assert_eq!(a, b);

        let mut params_rng = rng();
        let params = SpawnParams::sample(&mut params_rng);
        assert_eq!(a.get(0).unwrap().lifetime, params.lifetime);
        assert!((a.get(0).unwrap().dx - params.angle.cos() * params.speed).abs() < f32::EPSILON);
    }

    #[test]
    fn expires_after_exactly_lifetime_steps() {
        for lifetime in [20, 33, 49] {
            let mut particle = Particle {
                lifetime,
                alpha: 255,
                ..Default::default()
            };
            for step in 1..=lifetime {
                assert!(particle.is_active(), "inactive before step {step}");
                particle.advance();
            }
            assert!(!particle.is_active());
        }
    }

    #[test]
    fn alpha_floors_at_zero_within_32_steps() {
        let mut particle = Particle {
            lifetime: 100,
            alpha: 255,
            ..Default::default()
        };
        for _ in 0..32 {
            particle.advance();
        }
        assert_eq!(particle.alpha, 0);
        particle.advance();
        assert_eq!(particle.alpha, 0, "alpha must not wrap back to opaque");
        assert!(particle.is_active());
    }

    #[test]
    fn expiring_particle_is_drawn_on_its_last_frame() {
        let mut pool = ParticlePool::with_capacity(2);
        pool.slots[0] = Particle {
            x: 10.0,
            y: 10.0,
            dx: 1.0,
            dy: 0.0,
            lifetime: 1,
            alpha: 255,
        };
        let mut canvas = Canvas::new(64, 64);

        assert_eq!(pool.advance_and_draw(&mut canvas, Rgb::new(255, 0, 0)), 1);
        assert!(!pool.get(0).unwrap().is_active());
        // Drawn at alpha 247 over an empty canvas.
        assert_eq!(canvas.pixel(11, 10).unwrap().r, 247);

        assert_eq!(pool.advance_and_draw(&mut canvas, Rgb::new(255, 0, 0)), 0);
        assert_eq!(pool.get(0).unwrap().x, 11.0);
    }
}
