#![forbid(unsafe_code)]
//! Streaming time-scale modification for planar float audio.
//!
//! `scaletempo` changes the playback speed of a PCM stream by an arbitrary,
//! time-varying rational factor without altering pitch, using Waveform
//! Similarity Overlap-Add (WSOLA). It is built to sit inside a media
//! pipeline: the consumer appends decoded planar frames, pulls rate-adjusted
//! frames for a sink with a fixed sample rate, and may change the rate on
//! every call while the user scrubs playback speed.
//!
//! # Quick Start
//!
//! ```
//! use scaletempo::{scale_tempo, TempoOptions};
//!
//! // 1 second of 440 Hz sine at 44.1 kHz, mono
//! let input: Vec<Vec<f32>> = vec![(0..44100)
//!     .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect()];
//!
//! let output = scale_tempo(&input, 44100, 2.0, &TempoOptions::default()).unwrap();
//! // Twice the speed: roughly half the frames, same pitch.
//! assert!(!output[0].is_empty());
//! assert!(output[0].len() < input[0].len());
//! ```
//!
//! # Streaming
//!
//! For pipeline use, drive a [`TempoScaler`] directly:
//!
//! ```
//! use scaletempo::{TempoOptions, TempoScaler};
//!
//! let mut scaler = TempoScaler::new(TempoOptions::default(), 2, 48000).unwrap();
//! // scaler.fill_input_buffer(&planes, frames, rate) as decoded audio arrives
//! // scaler.fill_buffer(&mut dest, frames, rate) from the sink callback
//! // scaler.set_final() at end of stream, then drain
//! ```

pub mod core;
pub mod error;
pub mod wsola;

pub use crate::core::types::{Sample, TempoOptions, MAX_CHANNELS};
pub use crate::error::TempoError;
pub use crate::wsola::TempoScaler;

/// Output chunk size used by the one-shot driver.
const DRIVER_CHUNK_FRAMES: usize = 4096;

/// Scales a complete planar buffer by `playback_rate` in one call.
///
/// `input` holds one `Vec<f32>` per channel; all planes must have equal
/// length. This drives a [`TempoScaler`] through its full
/// fill/drain/finalize cycle and returns the planar output.
///
/// # Errors
///
/// Returns [`TempoError`] for invalid channel counts, sample rates, or
/// options, exactly as [`TempoScaler::new`] does.
///
/// # Example
///
/// ```
/// use scaletempo::{scale_tempo, TempoOptions};
///
/// let input: Vec<Vec<f32>> = vec![vec![0.5; 8000]; 2];
/// let output = scale_tempo(&input, 44100, 0.5, &TempoOptions::default()).unwrap();
/// assert_eq!(output.len(), 2);
/// // Half speed: roughly twice the frames.
/// assert!(output[0].len() > input[0].len());
/// ```
pub fn scale_tempo(
    input: &[Vec<Sample>],
    sample_rate: u32,
    playback_rate: f64,
    opts: &TempoOptions,
) -> Result<Vec<Vec<Sample>>, TempoError> {
    let channels = input.len();
    let mut scaler = TempoScaler::new(*opts, channels, sample_rate)?;

    let total_frames = input.iter().map(|p| p.len()).min().unwrap_or(0);
    let mut output: Vec<Vec<Sample>> = vec![Vec::new(); channels];
    let mut chunk: Vec<Vec<Sample>> = vec![vec![0.0; DRIVER_CHUNK_FRAMES]; channels];

    let mut consumed = 0usize;
    let mut finalized = false;
    loop {
        let accepted = if consumed < total_frames {
            let planes: Vec<&[Sample]> = input.iter().map(|p| &p[consumed..total_frames]).collect();
            let accepted = scaler.fill_input_buffer(&planes, total_frames - consumed, playback_rate);
            consumed += accepted;
            accepted
        } else {
            if !finalized {
                scaler.set_final();
                finalized = true;
            }
            0
        };

        let mut views: Vec<&mut [Sample]> = chunk.iter_mut().map(|p| p.as_mut_slice()).collect();
        let produced = scaler.fill_buffer(&mut views, DRIVER_CHUNK_FRAMES, playback_rate);
        for (out, plane) in output.iter_mut().zip(&chunk) {
            out.extend_from_slice(&plane[..produced]);
        }

        if finalized && produced == 0 {
            break;
        }
        if accepted == 0 && produced == 0 && !finalized {
            // No forward progress is possible; avoid spinning.
            break;
        }
    }

    Ok(output)
}
