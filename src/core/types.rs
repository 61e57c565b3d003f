//! Core types shared across the crate: samples, planar blocks, and options.

use crate::error::TempoError;
use serde::{Deserialize, Serialize};

/// A single audio sample (32-bit float, range -1.0 to 1.0).
pub type Sample = f32;

/// Maximum number of audio channels the engine supports.
pub const MAX_CHANNELS: usize = 8;

fn default_min_playback_rate() -> f64 {
    0.25
}

fn default_max_playback_rate() -> f64 {
    4.0
}

fn default_ola_window_size_ms() -> f64 {
    20.0
}

fn default_wsola_search_interval_ms() -> f64 {
    30.0
}

/// Tuning options for the time-scale engine.
///
/// Playback rates outside `[min_playback_rate, max_playback_rate]` are muted:
/// the engine emits silence and discards the corresponding input. The window
/// and search interval sizes are given in milliseconds and converted to frames
/// against the stream's sample rate at construction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TempoOptions {
    /// Slowest supported playback rate before the output is muted.
    #[serde(default = "default_min_playback_rate")]
    pub min_playback_rate: f64,
    /// Fastest supported playback rate before the output is muted.
    #[serde(default = "default_max_playback_rate")]
    pub max_playback_rate: f64,
    /// Overlap-and-add window size in milliseconds.
    #[serde(default = "default_ola_window_size_ms")]
    pub ola_window_size_ms: f64,
    /// Width of the similarity search interval in milliseconds.
    #[serde(default = "default_wsola_search_interval_ms")]
    pub wsola_search_interval_ms: f64,
}

impl Default for TempoOptions {
    fn default() -> Self {
        Self {
            min_playback_rate: default_min_playback_rate(),
            max_playback_rate: default_max_playback_rate(),
            ola_window_size_ms: default_ola_window_size_ms(),
            wsola_search_interval_ms: default_wsola_search_interval_ms(),
        }
    }
}

impl TempoOptions {
    /// Checks that the option values are internally consistent.
    pub fn validate(&self) -> Result<(), TempoError> {
        if !(self.min_playback_rate > 0.0) {
            return Err(TempoError::InvalidOptions(format!(
                "min_playback_rate must be positive, got {}",
                self.min_playback_rate
            )));
        }
        if self.max_playback_rate < self.min_playback_rate {
            return Err(TempoError::InvalidOptions(format!(
                "max_playback_rate {} below min_playback_rate {}",
                self.max_playback_rate, self.min_playback_rate
            )));
        }
        if !(self.ola_window_size_ms > 0.0) {
            return Err(TempoError::InvalidOptions(format!(
                "ola_window_size_ms must be positive, got {}",
                self.ola_window_size_ms
            )));
        }
        if !(self.wsola_search_interval_ms > 0.0) {
            return Err(TempoError::InvalidOptions(format!(
                "wsola_search_interval_ms must be positive, got {}",
                self.wsola_search_interval_ms
            )));
        }
        Ok(())
    }

    /// Serializes the options as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, TempoError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| TempoError::InvalidOptions(format!("failed to serialize options: {}", e)))
    }

    /// Parses options from JSON. Missing fields fall back to their defaults.
    pub fn from_json(json: &str) -> Result<Self, TempoError> {
        let opts: Self = serde_json::from_str(json)
            .map_err(|e| TempoError::InvalidOptions(format!("failed to parse options: {}", e)))?;
        opts.validate()?;
        Ok(opts)
    }
}

/// Fixed-size planar sample storage: one contiguous plane per channel.
///
/// Rows keep stable lengths for the lifetime of the block; callers index
/// channels and receive plain slices.
#[derive(Debug, Clone)]
pub struct PlanarBlock {
    planes: Vec<Vec<Sample>>,
    frames: usize,
}

impl PlanarBlock {
    /// Creates a zero-filled block of `channels` x `frames` samples.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            planes: vec![vec![0.0; frames]; channels],
            frames,
        }
    }

    /// Returns the number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.planes.len()
    }

    /// Returns the number of frames per channel.
    #[inline]
    pub fn frames(&self) -> usize {
        self.frames
    }

    /// Returns the samples of one channel.
    #[inline]
    pub fn channel(&self, ch: usize) -> &[Sample] {
        &self.planes[ch]
    }

    /// Returns the samples of one channel, mutably.
    #[inline]
    pub fn channel_mut(&mut self, ch: usize) -> &mut [Sample] {
        &mut self.planes[ch]
    }

    /// Zeroes every plane.
    pub fn zero(&mut self) {
        for plane in &mut self.planes {
            plane.fill(0.0);
        }
    }
}
