use serde::{Deserialize, Serialize};

use crate::config::{BEAT_THRESHOLD, EMA_FACTOR, FULL_SCALE};

/// Outcome of analysing a single audio buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFrame {
    /// Mean rectified amplitude of the buffer, normalised to [0, 1].
    pub energy: f32,
    /// Baseline the onset test compared against, before it absorbed `energy`.
    pub baseline: f32,
    pub onset: bool,
}

/// Mean normalised rectified amplitude: `(Σ|s| / 32768) / N`.
///
/// An empty buffer has no energy.
pub fn buffer_energy(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum: f32 = samples
        .iter()
        .map(|&sample| (sample as f32).abs() / FULL_SCALE)
        .sum();
    sum / samples.len() as f32
}

/// Energy-ratio onset detector over an exponentially smoothed baseline.
///
/// The detector starts from a zero baseline, so the first non-silent buffer
/// always registers as an onset.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BeatDetector {
    beat_energy: f32,
}

impl BeatDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current smoothed baseline.
    pub fn beat_energy(&self) -> f32 {
        self.beat_energy
    }

    /// Tests `energy` against the current baseline, then folds it in.
    pub fn process(&mut self, energy: f32) -> AnalysisFrame {
        let baseline = self.beat_energy;
        let onset = energy > baseline * BEAT_THRESHOLD;
        self.beat_energy = (1.0 - EMA_FACTOR) * baseline + EMA_FACTOR * energy;

        AnalysisFrame {
            energy,
            baseline,
            onset,
        }
    }

    /// Convenience wrapper combining [`buffer_energy`] and [`Self::process`].
    pub fn process_block(&mut self, samples: &[i16]) -> AnalysisFrame {
        self.process(buffer_energy(samples))
    }
}
