use crate::config::FULL_SCALE;

/// Length of each kick, in milliseconds.
const KICK_MS: f64 = 60.0;

/// Deterministic synthetic mono source for headless runs and tests.
///
/// Levels are normalised rectified amplitudes: a buffer generated at level
/// `L` has a [`buffer_energy`](crate::analysis::buffer_energy) of about `L`.
#[derive(Debug, Clone)]
pub struct SignalGenerator {
    sample_rate: u32,
    buffer_size: usize,
    position: u64,
}

impl SignalGenerator {
    pub fn new(sample_rate: u32, buffer_size: usize) -> Self {
        Self {
            sample_rate,
            buffer_size,
            position: 0,
        }
    }

    /// Samples generated so far.
    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn silence(&mut self) -> Vec<i16> {
        self.steady(0.0)
    }

    /// Square wave at the given level.
    pub fn steady(&mut self, level: f32) -> Vec<i16> {
        let start = self.position;
        self.position += self.buffer_size as u64;
        (start..self.position).map(|n| square(n, level)).collect()
    }

    /// A kick of `pulse_level` at the start of every beat over a constant
    /// `floor_level` bed.
    pub fn kick_train(&mut self, bpm: f32, pulse_level: f32, floor_level: f32) -> Vec<i16> {
        let period = (self.sample_rate as f64 * 60.0 / bpm.max(1.0) as f64).max(1.0) as u64;
        let kick_len = (self.sample_rate as f64 * KICK_MS / 1000.0) as u64;

        let start = self.position;
        self.position += self.buffer_size as u64;
        (start..self.position)
            .map(|n| {
                let level = if n % period < kick_len {
                    pulse_level
                } else {
                    floor_level
                };
                square(n, level)
            })
            .collect()
    }
}

fn square(n: u64, level: f32) -> i16 {
    let magnitude = (level.clamp(0.0, 1.0) * FULL_SCALE).min(i16::MAX as f32) as i16;
    if n % 2 == 0 {
        magnitude
    } else {
        -magnitude
    }
}
