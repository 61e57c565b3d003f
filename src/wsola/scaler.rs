//! The streaming WSOLA engine.
//!
//! `TempoScaler` consumes planar input frames, produces rate-adjusted planar
//! output frames on demand, and keeps output time, input indices, and
//! end-of-stream padding consistent across variable-rate iterations. One
//! WSOLA iteration extracts a target block (the natural continuation of what
//! has already been emitted), searches the input for the most similar
//! candidate block, cross-fades the two, and overlap-adds the result into the
//! output accumulator using a Hann window at 50% overlap.

use crate::core::input_queue::InputQueue;
use crate::core::types::{PlanarBlock, Sample, TempoOptions, MAX_CHANNELS};
use crate::core::window::{hann_window, transition_ramp};
use crate::error::TempoError;
use crate::wsola::search::SimilaritySearch;

/// Converts a duration in milliseconds to a frame count at `sample_rate`.
#[inline]
fn frames_from_ms(ms: f64, sample_rate: u32) -> usize {
    (ms * sample_rate as f64 / 1000.0).round() as usize
}

/// Streaming pitch-preserving playback rate scaler.
///
/// The engine is single-threaded and synchronous: every call returns
/// immediately, and the caller serializes access. Input is appended with
/// [`fill_input_buffer`](Self::fill_input_buffer) (which applies
/// backpressure), output is pulled with [`fill_buffer`](Self::fill_buffer),
/// and [`set_final`](Self::set_final) flushes the tail with silence padding.
#[derive(Debug)]
pub struct TempoScaler {
    opts: TempoOptions,
    channels: usize,
    sample_rate: u32,
    /// Fractional input frames still to be skipped while muted.
    muted_partial_frame: f64,
    /// Current time of generated audio in input frames; the virtual center
    /// of the next search block. Advanced by `ola_hop_size * playback_rate`
    /// per iteration and rebased on input eviction.
    output_time: f64,
    /// Offset of the search block's center frame from its first frame.
    search_block_center_offset: isize,
    /// First frame of the search block; may be negative (zero-prepended).
    search_block_index: isize,
    num_candidate_blocks: usize,
    /// First frame of the target block; may be negative (zero-prepended).
    target_block_index: isize,
    ola_window_size: usize,
    ola_hop_size: usize,
    search_block_size: usize,
    /// Frames at the head of `wsola_output` whose overlap-add is final.
    num_complete_frames: usize,
    /// Whether the first hop has been emitted; the trailing half-window of
    /// `wsola_output` then holds in-progress overlap-add state.
    wsola_output_started: bool,
    ola_window: Vec<Sample>,
    transition_window: Vec<Sample>,
    wsola_output: PlanarBlock,
    optimal_block: PlanarBlock,
    search_block: PlanarBlock,
    target_block: PlanarBlock,
    input_buffer: InputQueue,
    /// Silence frames still to be injected after `set_final`.
    input_buffer_final_frames: usize,
    /// Silence frames already injected for the final flush.
    input_buffer_added_silence: usize,
    search: SimilaritySearch,
}

impl TempoScaler {
    /// Creates an engine for a fixed `(channels, sample_rate, opts)` triple.
    ///
    /// # Errors
    ///
    /// Returns [`TempoError`] when `channels` is outside `1..=8`, the sample
    /// rate is zero, or the options round to degenerate block sizes.
    pub fn new(
        opts: TempoOptions,
        channels: usize,
        sample_rate: u32,
    ) -> Result<Self, TempoError> {
        if channels == 0 || channels > MAX_CHANNELS {
            return Err(TempoError::InvalidChannelCount {
                provided: channels,
                maximum: MAX_CHANNELS,
            });
        }
        if sample_rate == 0 {
            return Err(TempoError::InvalidSampleRate {
                provided: sample_rate,
            });
        }
        opts.validate()?;

        let mut ola_window_size = frames_from_ms(opts.ola_window_size_ms, sample_rate);
        ola_window_size += ola_window_size % 2; // 50% overlap needs an even window
        let num_candidate_blocks = frames_from_ms(opts.wsola_search_interval_ms, sample_rate);
        if ola_window_size < 2 || num_candidate_blocks == 0 {
            return Err(TempoError::InvalidOptions(format!(
                "window of {} frames with {} candidate blocks at {} Hz is degenerate",
                ola_window_size, num_candidate_blocks, sample_rate
            )));
        }

        let ola_hop_size = ola_window_size / 2;
        let search_block_center_offset =
            (num_candidate_blocks / 2 + (ola_window_size / 2 - 1)) as isize;
        let search_block_size = num_candidate_blocks + ola_window_size - 1;

        let mut scaler = Self {
            opts,
            channels,
            sample_rate,
            muted_partial_frame: 0.0,
            output_time: 0.0,
            search_block_center_offset,
            search_block_index: 0,
            num_candidate_blocks,
            target_block_index: 0,
            ola_window_size,
            ola_hop_size,
            search_block_size,
            num_complete_frames: 0,
            wsola_output_started: false,
            ola_window: hann_window(ola_window_size),
            transition_window: transition_ramp(ola_window_size),
            wsola_output: PlanarBlock::new(channels, 2 * ola_window_size),
            optimal_block: PlanarBlock::new(channels, ola_window_size),
            search_block: PlanarBlock::new(channels, search_block_size),
            target_block: PlanarBlock::new(channels, ola_window_size),
            input_buffer: InputQueue::new(channels),
            input_buffer_final_frames: 0,
            input_buffer_added_silence: 0,
            search: SimilaritySearch::new(channels, ola_window_size, num_candidate_blocks),
        };
        scaler.reset();
        Ok(scaler)
    }

    /// Number of channels.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Sample rate in Hz.
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Overlap-add window size in frames.
    #[inline]
    pub fn ola_window_size(&self) -> usize {
        self.ola_window_size
    }

    /// Overlap-add hop size in frames (half the window).
    #[inline]
    pub fn ola_hop_size(&self) -> usize {
        self.ola_hop_size
    }

    /// Number of candidate offsets examined per similarity search.
    #[inline]
    pub fn num_candidate_blocks(&self) -> usize {
        self.num_candidate_blocks
    }

    /// Search block length in frames.
    #[inline]
    pub fn search_block_size(&self) -> usize {
        self.search_block_size
    }

    /// Number of input frames currently buffered (EOS padding included).
    #[inline]
    pub fn buffered_input_frames(&self) -> usize {
        self.input_buffer.frames()
    }

    /// Clears all buffers and restores the freshly-created state. Window
    /// tables and allocations are kept.
    pub fn reset(&mut self) {
        self.muted_partial_frame = 0.0;
        self.output_time = 0.0;
        self.search_block_index = self.search_block_index_for(0.0);
        self.target_block_index = -((self.ola_window_size / 2) as isize);
        self.num_complete_frames = 0;
        self.wsola_output_started = false;
        self.wsola_output.zero();
        self.input_buffer.clear();
        self.input_buffer_final_frames = 0;
        self.input_buffer_added_silence = 0;
    }

    /// Appends planar input frames, subject to backpressure.
    ///
    /// At most [`frames_needed`](Self::frames_needed) frames are accepted;
    /// the return value is the number actually consumed, possibly zero when
    /// the engine is already buffered far enough ahead.
    pub fn fill_input_buffer(
        &mut self,
        planes: &[&[Sample]],
        frames: usize,
        playback_rate: f64,
    ) -> usize {
        assert_eq!(planes.len(), self.channels, "channel count mismatch");
        let read = self.frames_needed(playback_rate).min(frames);
        if read == 0 {
            return 0;
        }
        self.input_buffer.append(planes, read)
    }

    /// Input frames the engine still needs before the next iteration can run.
    ///
    /// The requirement is purely geometric: both the target block and the
    /// search block the next iteration reads must fit inside the buffer.
    /// The rate argument is kept for interface symmetry with the other
    /// rate-taking calls.
    pub fn frames_needed(&self, _playback_rate: f64) -> usize {
        let buffered = self.input_buffer.frames() as isize;
        let for_target = self.target_block_index + self.ola_window_size as isize - buffered;
        let for_search = self.search_block_index + self.search_block_size as isize - buffered;
        for_target.max(for_search).max(0) as usize
    }

    /// Marks the stream finite and arms the trailing silence needed to flush
    /// the remaining buffered content. Idempotent; a no-op on an engine that
    /// has never buffered or produced anything.
    pub fn set_final(&mut self) {
        if self.input_buffer_final_frames > 0 || self.input_buffer_added_silence > 0 {
            return;
        }
        if self.input_buffer.frames() > 0 || self.wsola_output_started {
            self.input_buffer_final_frames = self.ola_window_size + self.search_block_size;
        }
    }

    /// True when a call to [`fill_buffer`](Self::fill_buffer) could produce
    /// at least one frame without more input.
    pub fn frames_available(&self, playback_rate: f64) -> bool {
        if playback_rate <= 0.0 {
            return false;
        }
        if self.is_muted(playback_rate) {
            return self.input_buffer.frames() as f64 / playback_rate >= 1.0;
        }
        if self.num_complete_frames > 0 {
            return true;
        }
        let needed = self.frames_needed(playback_rate);
        needed == 0 || needed <= self.input_buffer_final_frames
    }

    /// Delay in input frames between the last appended input frame and the
    /// next frame that will be emitted.
    pub fn get_latency(&self, playback_rate: f64) -> f64 {
        let pending = self.input_buffer.frames() as f64
            - (self.output_time - self.target_block_index as f64)
            + self.num_complete_frames as f64 * playback_rate;
        pending.max(0.0)
    }

    /// Produces up to `frames` rate-adjusted output frames into planar
    /// `dest` slices. Returns the number of frames written, possibly zero
    /// when the engine is starved.
    ///
    /// Rates outside the configured band emit silence while discarding the
    /// corresponding input (`frames * playback_rate`, carried fractionally
    /// across calls).
    pub fn fill_buffer(
        &mut self,
        dest: &mut [&mut [Sample]],
        frames: usize,
        playback_rate: f64,
    ) -> usize {
        assert_eq!(dest.len(), self.channels, "channel count mismatch");
        for plane in dest.iter() {
            assert!(plane.len() >= frames, "destination plane too short");
        }
        if playback_rate <= 0.0 {
            return 0;
        }

        if self.input_buffer_final_frames > 0 {
            self.add_final_silence(playback_rate);
        }

        if self.is_muted(playback_rate) {
            return self.fill_muted(dest, frames, playback_rate);
        }

        let mut rendered = 0;
        loop {
            rendered += self.write_completed_frames(dest, rendered, frames - rendered);
            if rendered >= frames || !self.run_one_wsola_iteration(playback_rate) {
                break;
            }
        }
        rendered
    }

    #[inline]
    fn is_muted(&self, playback_rate: f64) -> bool {
        playback_rate < self.opts.min_playback_rate || playback_rate > self.opts.max_playback_rate
    }

    /// Muted band: emit zeros and skip over the equivalent input, keeping
    /// the fractional remainder for the next call.
    fn fill_muted(
        &mut self,
        dest: &mut [&mut [Sample]],
        frames: usize,
        playback_rate: f64,
    ) -> usize {
        let available = (self.input_buffer.frames() as f64 / playback_rate) as usize;
        let to_render = frames.min(available);

        self.muted_partial_frame += to_render as f64 * playback_rate;
        let skip = self.muted_partial_frame as usize;
        let skipped = self.input_buffer.evict(skip);
        self.muted_partial_frame -= skipped as f64;

        for plane in dest.iter_mut() {
            plane[..to_render].fill(0.0);
        }
        to_render
    }

    /// Injects pending EOS silence, bounded by what the next iteration needs
    /// and by the remaining budget.
    fn add_final_silence(&mut self, playback_rate: f64) {
        let needed = self.frames_needed(playback_rate);
        let inject = needed.min(self.input_buffer_final_frames);
        if inject == 0 {
            return;
        }
        self.input_buffer.append_silence(inject);
        self.input_buffer_final_frames -= inject;
        self.input_buffer_added_silence += inject;
    }

    /// Copies completed frames from the head of `wsola_output` into `dest`
    /// and shifts the accumulator left.
    fn write_completed_frames(
        &mut self,
        dest: &mut [&mut [Sample]],
        dest_offset: usize,
        requested: usize,
    ) -> usize {
        let rendered = self.num_complete_frames.min(requested);
        if rendered == 0 {
            return 0;
        }
        let capacity = self.wsola_output.frames();
        for (ch, plane) in dest.iter_mut().enumerate() {
            let out = self.wsola_output.channel_mut(ch);
            plane[dest_offset..dest_offset + rendered].copy_from_slice(&out[..rendered]);
            out.copy_within(rendered..capacity, 0);
        }
        self.num_complete_frames -= rendered;
        rendered
    }

    /// Produces one hop of output. Returns false when starved.
    fn run_one_wsola_iteration(&mut self, playback_rate: f64) -> bool {
        if !self.can_perform_wsola(playback_rate) {
            return false;
        }

        self.get_optimal_block();

        // Overlap-and-add into the accumulator. The first half lands on the
        // in-progress tail of the previous hop; the second half starts the
        // tail for the next one.
        let hop = self.ola_hop_size;
        let offset = self.num_complete_frames;
        for ch in 0..self.channels {
            let block = self.optimal_block.channel(ch);
            let out = self.wsola_output.channel_mut(ch);
            for i in 0..hop {
                out[offset + i] += self.ola_window[i] * block[i];
            }
            for i in hop..self.ola_window_size {
                out[offset + i] = self.ola_window[i] * block[i];
            }
        }

        self.num_complete_frames += hop;
        self.wsola_output_started = true;
        self.update_output_time(hop as f64 * playback_rate);
        self.evict_old_input_frames();
        true
    }

    #[inline]
    fn can_perform_wsola(&self, playback_rate: f64) -> bool {
        self.frames_needed(playback_rate) == 0
    }

    #[inline]
    fn search_block_index_for(&self, time: f64) -> isize {
        time.floor() as isize - self.search_block_center_offset
    }

    fn update_output_time(&mut self, time_change: f64) {
        self.output_time += time_change;
        self.search_block_index = self.search_block_index_for(self.output_time);
    }

    /// Drops input frames no future block extraction can reach, rebasing all
    /// indices so they keep addressing the same audio.
    fn evict_old_input_frames(&mut self) {
        let earliest_used = self.target_block_index.min(self.search_block_index);
        if earliest_used <= 0 {
            return;
        }
        let evicted = self.input_buffer.evict(earliest_used as usize);
        self.target_block_index -= evicted as isize;
        self.search_block_index -= evicted as isize;
        self.output_time -= evicted as f64;
    }

    #[inline]
    fn target_is_within_search_region(&self) -> bool {
        self.target_block_index >= self.search_block_index
            && self.target_block_index + self.ola_window_size as isize
                <= self.search_block_index + self.search_block_size as isize
    }

    /// Candidate offset whose center coincides with the projected output
    /// time.
    fn projected_center_offset(&self) -> usize {
        let half_window = (self.ola_window_size / 2 - 1) as f64;
        let ideal = self.output_time - self.search_block_index as f64 - half_window;
        (ideal.round() as isize).clamp(0, self.num_candidate_blocks as isize - 1) as usize
    }

    /// Fills `optimal_block` with the block to overlap-add next and advances
    /// the target index one hop past it.
    ///
    /// When the target already lies inside the search region there is no
    /// discontinuity to fix, so the target itself is used unmodified; this
    /// is what makes rate 1.0 a pure overlap-add passthrough. Otherwise the
    /// similarity search picks the candidate and the transition window
    /// cross-fades from the target (left half) to the candidate (right
    /// half), smoothing the seam introduced by the adaptive shift.
    fn get_optimal_block(&mut self) {
        let optimal_index;
        if self.target_is_within_search_region() {
            optimal_index = self.target_block_index;
            self.input_buffer
                .peek_with_zero_prepend(optimal_index, &mut self.optimal_block);
        } else {
            self.input_buffer
                .peek_with_zero_prepend(self.target_block_index, &mut self.target_block);
            self.input_buffer
                .peek_with_zero_prepend(self.search_block_index, &mut self.search_block);

            let center = self.projected_center_offset();
            let offset = self.search.find_optimal_offset(
                &self.target_block,
                &self.search_block,
                &self.ola_window,
                center,
            );
            optimal_index = self.search_block_index + offset as isize;

            for ch in 0..self.channels {
                let src = &self.search_block.channel(ch)[offset..offset + self.ola_window_size];
                self.optimal_block.channel_mut(ch).copy_from_slice(src);
            }
            for ch in 0..self.channels {
                let target = self.target_block.channel(ch);
                let block = self.optimal_block.channel_mut(ch);
                for i in 0..self.ola_window_size {
                    block[i] = self.transition_window[self.ola_window_size + i] * target[i]
                        + self.transition_window[i] * block[i];
                }
            }
        }

        // The next target is one hop past the block we are about to emit.
        self.target_block_index = optimal_index + self.ola_hop_size as isize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn scaler(channels: usize, sample_rate: u32) -> TempoScaler {
        TempoScaler::new(TempoOptions::default(), channels, sample_rate).unwrap()
    }

    fn sine(freq: f32, sr: u32, n: usize) -> Vec<Sample> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f32 / sr as f32).sin())
            .collect()
    }

    /// Feeds as much of `input` as the engine accepts and pulls one chunk.
    fn feed_and_pull(
        s: &mut TempoScaler,
        input: &[Sample],
        consumed: &mut usize,
        rate: f64,
        chunk: usize,
    ) -> usize {
        if *consumed < input.len() {
            let planes = [&input[*consumed..]];
            *consumed += s.fill_input_buffer(&planes, input.len() - *consumed, rate);
        }
        let mut out = vec![0.0f32; chunk];
        let mut views = [out.as_mut_slice()];
        s.fill_buffer(&mut views, chunk, rate)
    }

    #[test]
    fn test_create_rejects_invalid_arguments() {
        let opts = TempoOptions::default();
        assert!(matches!(
            TempoScaler::new(opts, 0, 44100),
            Err(TempoError::InvalidChannelCount { .. })
        ));
        assert!(matches!(
            TempoScaler::new(opts, 9, 44100),
            Err(TempoError::InvalidChannelCount { .. })
        ));
        assert!(matches!(
            TempoScaler::new(opts, 2, 0),
            Err(TempoError::InvalidSampleRate { .. })
        ));

        let mut bad = TempoOptions::default();
        bad.ola_window_size_ms = 0.0;
        assert!(TempoScaler::new(bad, 2, 44100).is_err());

        // 20ms rounds to zero frames at 1 Hz
        assert!(matches!(
            TempoScaler::new(opts, 1, 1),
            Err(TempoError::InvalidOptions(_))
        ));
    }

    #[test]
    fn test_block_sizing_at_44100() {
        let s = scaler(2, 44100);
        assert_eq!(s.ola_window_size(), 882);
        assert_eq!(s.ola_hop_size(), 441);
        assert_eq!(s.num_candidate_blocks(), 1323);
        assert_eq!(s.search_block_size(), 2204);
        assert_eq!(s.search_block_center_offset, 1101);
    }

    #[test]
    fn test_window_size_forced_even() {
        // 20ms at 44075 Hz rounds to 882 already; pick a rate that rounds odd
        let s = scaler(1, 44050); // 20ms -> 881 -> forced to 882
        assert_eq!(s.ola_window_size() % 2, 0);
        assert_eq!(s.ola_window_size(), 882);
    }

    #[test]
    fn test_initial_indices_follow_output_time() {
        let s = scaler(1, 44100);
        assert_eq!(s.output_time, 0.0);
        assert_eq!(s.search_block_index, -1101);
        assert_eq!(s.target_block_index, -441);
    }

    #[test]
    fn test_backpressure_accepts_only_needed_frames() {
        let mut s = scaler(1, 44100);
        let input = sine(440.0, 44100, 5000);
        // Exactly enough for the first search block to fit: its index is
        // -1101 and it spans 2204 frames, so 1103 frames are required.
        let needed = s.frames_needed(1.0);
        assert_eq!(needed, 1103);

        let accepted = s.fill_input_buffer(&[&input], input.len(), 1.0);
        assert_eq!(accepted, needed);
        assert_eq!(s.fill_input_buffer(&[&input], input.len(), 1.0), 0);
        assert_eq!(s.frames_needed(1.0), 0);
    }

    #[test]
    fn test_starved_engine_produces_nothing() {
        let mut s = scaler(1, 44100);
        let mut out = vec![0.0f32; 256];
        let mut views = [out.as_mut_slice()];
        assert_eq!(s.fill_buffer(&mut views, 256, 1.0), 0);
        assert!(!s.frames_available(1.0));
    }

    #[test]
    fn test_search_index_invariant_across_iterations_and_evictions() {
        let mut s = scaler(1, 44100);
        let input = sine(330.0, 44100, 60_000);
        let mut consumed = 0;
        for _ in 0..40 {
            feed_and_pull(&mut s, &input, &mut consumed, 1.25, 512);
            let expected = s.output_time.floor() as isize - s.search_block_center_offset;
            assert_eq!(
                s.search_block_index, expected,
                "search_block_index detached from output_time"
            );
        }
        assert!(consumed > 0);
    }

    #[test]
    fn test_eviction_keeps_buffer_bounded() {
        let mut s = scaler(1, 44100);
        let input = sine(330.0, 44100, 200_000);
        let mut consumed = 0;
        for _ in 0..200 {
            feed_and_pull(&mut s, &input, &mut consumed, 1.0, 441);
        }
        // Old frames must be evicted rather than accumulating forever.
        assert!(
            s.buffered_input_frames() < 4 * s.search_block_size(),
            "input buffer grew to {} frames",
            s.buffered_input_frames()
        );
    }

    #[test]
    fn test_muted_rate_emits_zeros_and_discards_input() {
        let mut s = scaler(1, 44100);
        let input = sine(440.0, 44100, 1000);
        let accepted = s.fill_input_buffer(&[&input[..]], 1000, 10.0);
        assert_eq!(accepted, 1000);

        let mut out = vec![1.0f32; 500];
        let mut views = [out.as_mut_slice()];
        let produced = s.fill_buffer(&mut views, 500, 10.0);
        // 1000 buffered frames at 10x cover exactly 100 output frames.
        assert_eq!(produced, 100);
        assert!(out[..produced].iter().all(|&v| v == 0.0));
        assert_eq!(s.buffered_input_frames(), 0);
        assert!((s.muted_partial_frame - 0.0).abs() < 1e-9);

        // Drained: nothing further to emit.
        let mut views = [out.as_mut_slice()];
        assert_eq!(s.fill_buffer(&mut views, 500, 10.0), 0);
    }

    #[test]
    fn test_muted_partial_frame_carries_fraction() {
        let mut s = scaler(1, 44100);
        let input = vec![0.25f32; 2000];
        s.fill_input_buffer(&[&input[..]], 2000, 0.125);

        let mut out = vec![0.0f32; 3];
        let mut views = [out.as_mut_slice()];
        let produced = s.fill_buffer(&mut views, 3, 0.125);
        assert_eq!(produced, 3);
        // 3 * 0.125 = 0.375 input frames: none evictable yet.
        assert!((s.muted_partial_frame - 0.375).abs() < 1e-9);

        let mut views = [out.as_mut_slice()];
        s.fill_buffer(&mut views, 3, 0.125);
        // 0.75 total, still below one frame.
        assert!((s.muted_partial_frame - 0.75).abs() < 1e-9);

        let mut views = [out.as_mut_slice()];
        s.fill_buffer(&mut views, 3, 0.125);
        // 1.125 total: one frame evicted, 0.125 carried.
        assert!((s.muted_partial_frame - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_set_final_arms_silence_budget_once() {
        let mut s = scaler(1, 44100);
        assert_eq!(s.input_buffer_final_frames, 0);

        // Final on a never-fed engine arms nothing.
        s.set_final();
        assert_eq!(s.input_buffer_final_frames, 0);

        let input = sine(440.0, 44100, 2000);
        s.fill_input_buffer(&[&input[..]], 2000, 1.0);
        s.set_final();
        let budget = s.ola_window_size() + s.search_block_size();
        assert_eq!(s.input_buffer_final_frames, budget);

        s.set_final();
        assert_eq!(s.input_buffer_final_frames, budget, "set_final not idempotent");
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut s = scaler(1, 44100);
        let input = sine(440.0, 44100, 20_000);
        let mut consumed = 0;
        for _ in 0..10 {
            feed_and_pull(&mut s, &input, &mut consumed, 1.5, 441);
        }
        s.set_final();
        s.reset();

        assert_eq!(s.output_time, 0.0);
        assert_eq!(s.search_block_index, -1101);
        assert_eq!(s.target_block_index, -441);
        assert_eq!(s.num_complete_frames, 0);
        assert!(!s.wsola_output_started);
        assert_eq!(s.buffered_input_frames(), 0);
        assert_eq!(s.input_buffer_final_frames, 0);
        assert_eq!(s.input_buffer_added_silence, 0);
        assert!(s.wsola_output.channel(0).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_latency_zero_on_fresh_engine() {
        let s = scaler(2, 44100);
        assert_eq!(s.get_latency(1.0), 0.0);
    }

    #[test]
    fn test_latency_tracks_buffered_input() {
        let mut s = scaler(1, 44100);
        let input = sine(440.0, 44100, 4000);
        let accepted = s.fill_input_buffer(&[&input[..]], 4000, 1.0);
        let latency = s.get_latency(1.0);
        assert!(latency > 0.0);
        assert!(
            latency <= (accepted + s.ola_window_size()) as f64,
            "latency {} exceeds buffered {} + window",
            latency,
            accepted
        );
    }

    #[test]
    fn test_frames_available_transitions() {
        let mut s = scaler(1, 44100);
        assert!(!s.frames_available(1.0));

        let input = sine(440.0, 44100, 3000);
        s.fill_input_buffer(&[&input[..]], 3000, 1.0);
        assert!(s.frames_available(1.0));

        // Muted rates depend only on buffered input.
        assert!(s.frames_available(10.0));
        assert!(!s.frames_available(0.0));
    }
}
