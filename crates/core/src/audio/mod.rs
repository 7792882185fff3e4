//! Producer side of the shared state: whatever delivers audio buffers calls
//! into an [`AudioFeed`].

mod signal;

pub use signal::SignalGenerator;

use std::fmt;

use rand::Rng;

use crate::{analysis::AnalysisFrame, state::SharedVisualState, timeline::Clock, Result};

/// Audio-callback handle onto the shared visual state.
///
/// Owns the RNG used for particle spawns so that a seeded feed replays the
/// same particles for the same input.
pub struct AudioFeed<C: Clock, R: Rng> {
    shared: SharedVisualState,
    clock: C,
    rng: R,
    buffers: u64,
    onsets: u64,
}

impl<C: Clock, R: Rng> AudioFeed<C, R> {
    pub fn new(shared: SharedVisualState, clock: C, rng: R) -> Self {
        Self {
            shared,
            clock,
            rng,
            buffers: 0,
            onsets: 0,
        }
    }

    /// Body of the platform audio callback for one mono buffer.
    ///
    /// Reads the clock once, then holds the state lock for the whole
    /// analyse/spawn/hue update.
    pub fn on_buffer(&mut self, samples: &[i16]) -> Result<AnalysisFrame> {
        let now = self.clock.now_ms();
        let frame = {
            let mut state = self.shared.lock()?;
            state.apply_audio(samples, now, &mut self.rng)
        };

        self.buffers += 1;
        if frame.onset {
            self.onsets += 1;
        }
        Ok(frame)
    }

    /// Buffers delivered so far.
    pub fn buffers(&self) -> u64 {
        self.buffers
    }

    pub fn onsets(&self) -> u64 {
        self.onsets
    }
}

impl<C: Clock, R: Rng> fmt::Debug for AudioFeed<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioFeed")
            .field("buffers", &self.buffers)
            .field("onsets", &self.onsets)
            .finish()
    }
}

/// Averages interleaved frames down to one channel, appending to `out`.
///
/// Device streams are opened with their native channel count; the core only
/// ever sees the result of this. A trailing partial frame is dropped.
pub fn downmix_to_mono(interleaved: &[i16], channels: usize, out: &mut Vec<i16>) {
    if channels <= 1 {
        out.extend_from_slice(interleaved);
        return;
    }

    out.extend(interleaved.chunks_exact(channels).map(|frame| {
        let sum: i32 = frame.iter().map(|&s| s as i32).sum();
        (sum / channels as i32) as i16
    }));
}

/// Re-chunks interleaved device blocks of any size into fixed-size mono
/// blocks.
///
/// Storage is allocated once; pushing never allocates as long as each host
/// block fits the initial capacity.
#[derive(Debug, Clone)]
pub struct MonoBlocker {
    channels: usize,
    block_size: usize,
    pending: Vec<i16>,
}

impl MonoBlocker {
    pub fn new(channels: usize, block_size: usize) -> Self {
        Self {
            channels: channels.max(1),
            block_size: block_size.max(1),
            pending: Vec::with_capacity(block_size.max(1) * 4),
        }
    }

    /// Mono samples waiting for a full block.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Downmixes `interleaved` and hands every completed block to
    /// `on_block`, oldest first. Returns the number of blocks emitted.
    pub fn push<F>(&mut self, interleaved: &[i16], mut on_block: F) -> usize
    where
        F: FnMut(&[i16]),
    {
        downmix_to_mono(interleaved, self.channels, &mut self.pending);

        let mut emitted = 0;
        while self.pending.len() >= self.block_size {
            on_block(&self.pending[..self.block_size]);
            self.pending.drain(..self.block_size);
            emitted += 1;
        }
        emitted
    }
}
