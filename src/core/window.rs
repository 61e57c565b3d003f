//! Window tables for overlap-add and transition blending.
//!
//! Both tables are computed once at engine construction and never mutated.

use std::f64::consts::PI;

use crate::core::types::Sample;

/// Generates a symmetric Hann window.
///
/// `w[i] = 0.5 * (1 - cos(2*pi*i / (size - 1)))`. With 50% overlap, shifted
/// copies of this window sum to 1 within a small ripple, so blind overlap-add
/// preserves amplitude.
pub fn hann_window(size: usize) -> Vec<Sample> {
    match size {
        0 => return vec![],
        1 => return vec![1.0],
        _ => {}
    }
    let n = size as f64;
    (0..size)
        .map(|i| {
            let x = (2.0 * PI * i as f64) / (n - 1.0);
            (0.5 * (1.0 - x.cos())) as Sample
        })
        .collect()
}

/// Generates the transition window used to cross-blend the target and
/// optimal blocks: a clamped linear ramp of length `2 * size`.
///
/// The first half rises 0 -> 1 and weights the incoming block; the second
/// half falls 1 -> 0 and weights the block being faded out. Complementary
/// entries `t[i] + t[i + size]` sum to ~1 across the whole window.
pub fn transition_ramp(size: usize) -> Vec<Sample> {
    match size {
        0 => return vec![],
        1 => return vec![1.0, 1.0],
        _ => {}
    }
    let n = size as f64;
    (0..2 * size)
        .map(|i| {
            let t = i as f64 / (n - 1.0);
            let t = if i < size { t } else { 2.0 - t };
            t.clamp(0.0, 1.0) as Sample
        })
        .collect()
}
