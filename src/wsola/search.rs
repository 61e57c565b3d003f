//! Similarity search over the candidate blocks of a search region.
//!
//! For every candidate offset `k` the search scores how well the input block
//! starting at `k` continues the target block, using an energy-normalized
//! windowed dot product biased toward the projected center of the search
//! region. Candidate energies are maintained with an incremental
//! slide-out/slide-in update; the dot products run either in the time domain
//! or through an FFT cross-correlation, depending on the candidate count.

use rustfft::{num_complex::Complex, FftPlanner};

use crate::core::types::{PlanarBlock, Sample};

/// Zero-valued complex number, used for FFT buffer initialization.
const COMPLEX_ZERO: Complex<f32> = Complex::new(0.0, 0.0);

/// Guard against division by zero in similarity normalization.
const ENERGY_EPSILON: f64 = f32::MIN_POSITIVE as f64;
/// Minimum number of candidates to justify FFT-based correlation over direct
/// computation.
const FFT_CANDIDATE_THRESHOLD: usize = 64;
/// Minimum window length for FFT-based correlation to be worthwhile.
const FFT_WINDOW_THRESHOLD: usize = 32;

/// Reusable state for the candidate search.
///
/// All scratch buffers grow on first use and are reused across iterations so
/// the per-hop path stays allocation-free at steady state.
pub struct SimilaritySearch {
    channels: usize,
    window_size: usize,
    num_candidates: usize,
    planner: FftPlanner<f32>,
    /// Reusable FFT buffer for the windowed target.
    fft_target_buf: Vec<Complex<f32>>,
    /// Reusable FFT buffer for the search region.
    fft_search_buf: Vec<Complex<f32>>,
    /// Reusable FFT buffer for the correlation result.
    fft_corr_buf: Vec<Complex<f32>>,
    /// Target samples with the OLA window applied, one channel at a time.
    windowed_target: Vec<Sample>,
    /// Per-candidate dot products, summed across channels.
    dot_products: Vec<f64>,
    /// Per-channel, per-candidate block energies.
    candidate_energies: Vec<f32>,
}

impl std::fmt::Debug for SimilaritySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilaritySearch")
            .field("channels", &self.channels)
            .field("window_size", &self.window_size)
            .field("num_candidates", &self.num_candidates)
            .finish()
    }
}

impl SimilaritySearch {
    /// Creates a search over `num_candidates` offsets for blocks of
    /// `window_size` frames.
    pub fn new(channels: usize, window_size: usize, num_candidates: usize) -> Self {
        Self {
            channels,
            window_size,
            num_candidates,
            planner: FftPlanner::new(),
            fft_target_buf: Vec::new(),
            fft_search_buf: Vec::new(),
            fft_corr_buf: Vec::new(),
            windowed_target: vec![0.0; window_size],
            dot_products: vec![0.0; num_candidates],
            candidate_energies: vec![0.0; channels * num_candidates],
        }
    }

    /// Returns the candidate offset in `[0, num_candidates)` whose block best
    /// continues `target`, preferring offsets near `center_offset`.
    ///
    /// `search` must hold `num_candidates + window_size - 1` frames. If the
    /// target or the whole search region is silent, `center_offset` is
    /// returned unchanged so silence causes no adaptive shift.
    pub fn find_optimal_offset(
        &mut self,
        target: &PlanarBlock,
        search: &PlanarBlock,
        ola_window: &[Sample],
        center_offset: usize,
    ) -> usize {
        debug_assert_eq!(target.frames(), self.window_size);
        debug_assert_eq!(search.frames(), self.num_candidates + self.window_size - 1);
        debug_assert!(center_offset < self.num_candidates);

        moving_block_energies(search, self.window_size, &mut self.candidate_energies);

        let target_energy = self.windowed_target_energy(target, ola_window);
        self.compute_dot_products(target, search, ola_window);

        let mut any_energy = false;
        let mut best_offset = center_offset;
        let mut best_score = 0.0f64;

        for k in 0..self.num_candidates {
            let mut energy = 0.0f64;
            for ch in 0..self.channels {
                energy += self.candidate_energies[ch * self.num_candidates + k] as f64;
            }
            if energy >= ENERGY_EPSILON {
                any_energy = true;
            }

            let dot = self.dot_products[k];
            if dot <= 0.0 {
                continue;
            }
            let similarity = dot * dot / (target_energy * energy + ENERGY_EPSILON);
            let center_bias =
                1.0 - (k as f64 - center_offset as f64).abs() / self.num_candidates as f64;
            let score = similarity * center_bias;
            if score > best_score {
                best_score = score;
                best_offset = k;
            }
        }

        if !any_energy || target_energy < ENERGY_EPSILON {
            return center_offset;
        }
        best_offset
    }

    /// Energy of the windowed target, summed across channels.
    fn windowed_target_energy(&self, target: &PlanarBlock, ola_window: &[Sample]) -> f64 {
        let mut energy = 0.0f64;
        for ch in 0..self.channels {
            for (&w, &t) in ola_window.iter().zip(target.channel(ch)) {
                let v = (w * t) as f64;
                energy += v * v;
            }
        }
        energy
    }

    /// Fills `dot_products[k]` with the windowed correlation of the target
    /// against candidate `k`, summed across channels.
    fn compute_dot_products(
        &mut self,
        target: &PlanarBlock,
        search: &PlanarBlock,
        ola_window: &[Sample],
    ) {
        self.dot_products.fill(0.0);

        let use_fft = self.num_candidates > FFT_CANDIDATE_THRESHOLD
            && self.window_size >= FFT_WINDOW_THRESHOLD;

        for ch in 0..self.channels {
            for ((slot, &w), &t) in self
                .windowed_target
                .iter_mut()
                .zip(ola_window.iter())
                .zip(target.channel(ch))
            {
                *slot = w * t;
            }
            if use_fft {
                self.accumulate_dot_products_fft(search.channel(ch));
            } else {
                accumulate_dot_products_direct(
                    &self.windowed_target,
                    search.channel(ch),
                    &mut self.dot_products,
                );
            }
        }
    }

    /// FFT cross-correlation of the windowed target against the search
    /// region; lag `k` of the result is candidate `k`'s dot product.
    fn accumulate_dot_products_fft(&mut self, search: &[Sample]) {
        let conv_len = search.len() + self.window_size - 1;
        let fft_size = conv_len.next_power_of_two();

        let fft_fwd = self.planner.plan_fft_forward(fft_size);
        let fft_inv = self.planner.plan_fft_inverse(fft_size);

        self.fft_target_buf.resize(fft_size, COMPLEX_ZERO);
        self.fft_target_buf.fill(COMPLEX_ZERO);
        for (slot, &s) in self.fft_target_buf.iter_mut().zip(&self.windowed_target) {
            *slot = Complex::new(s, 0.0);
        }

        self.fft_search_buf.resize(fft_size, COMPLEX_ZERO);
        self.fft_search_buf.fill(COMPLEX_ZERO);
        for (slot, &s) in self.fft_search_buf.iter_mut().zip(search.iter()) {
            *slot = Complex::new(s, 0.0);
        }

        fft_fwd.process(&mut self.fft_target_buf);
        fft_fwd.process(&mut self.fft_search_buf);

        self.fft_corr_buf.resize(fft_size, COMPLEX_ZERO);
        for i in 0..fft_size {
            self.fft_corr_buf[i] = self.fft_target_buf[i].conj() * self.fft_search_buf[i];
        }

        fft_inv.process(&mut self.fft_corr_buf);

        let norm = 1.0 / fft_size as f64;
        for (dot, corr) in self.dot_products.iter_mut().zip(&self.fft_corr_buf) {
            *dot += corr.re as f64 * norm;
        }
    }
}

/// Computes the energy of every candidate block of `block_len` frames within
/// `search`, per channel.
///
/// The first block's energy is summed from scratch; each following block
/// reuses the previous one, subtracting the sample sliding out and adding the
/// sample sliding in: `E[k+1] = E[k] - x[k]^2 + x[k+len]^2`.
pub fn moving_block_energies(search: &PlanarBlock, block_len: usize, energies: &mut [f32]) {
    let num_blocks = search.frames() - (block_len - 1);
    debug_assert_eq!(energies.len(), search.channels() * num_blocks);

    for ch in 0..search.channels() {
        let plane = search.channel(ch);
        let out = &mut energies[ch * num_blocks..(ch + 1) * num_blocks];

        let mut energy: f32 = plane[..block_len].iter().map(|&x| x * x).sum();
        out[0] = energy;
        for k in 1..num_blocks {
            let slide_out = plane[k - 1];
            let slide_in = plane[k + block_len - 1];
            energy += slide_in * slide_in - slide_out * slide_out;
            out[k] = energy;
        }
    }
}

/// Direct time-domain dot products, used below the FFT thresholds.
fn accumulate_dot_products_direct(
    windowed_target: &[Sample],
    search: &[Sample],
    dot_products: &mut [f64],
) {
    for (k, dot) in dot_products.iter_mut().enumerate() {
        let sum: f64 = windowed_target
            .iter()
            .zip(&search[k..k + windowed_target.len()])
            .map(|(&t, &s)| (t as f64) * (s as f64))
            .sum();
        *dot += sum;
    }
}
