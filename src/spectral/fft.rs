/*
 *  Copyright (C) 2025 Michael Bachmann
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU Affero General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU Affero General Public License for more details.
 *
 *  You should have received a copy of the GNU Affero General Public License
 *  along with this program.  If not, see <https://www.gnu.org/licenses/>.
 */

//! Windowed real-to-complex FFT plan. Ported from the upstream
//! `pass_fftw_plan_init` / `pass_fftw_execute` routines, swapping the
//! original's direct `fftw` binding for the pure-Rust `realfft` planner.

use crate::error::{VibrascopeError, VibrascopeResult};
use crate::sample::SampleArray;
use realfft::RealFftPlanner;
use realfft::num_complex::Complex;
use std::f64::consts::PI;
use std::sync::Arc;

/// Owns the input buffer, Hann window, complex scratch buffer and the
/// forward real-to-complex transform descriptor for one sample rate `R`.
pub struct FftPlan {
    sample_rate: usize,
    output_rate: usize,
    window: Vec<f64>,
    input: Vec<f64>,
    scratch: Vec<Complex<f64>>,
    processor: Arc<dyn realfft::RealToComplex<f64>>,
}

impl FftPlan {
    pub fn new(sample_rate: usize) -> Self {
        let output_rate = sample_rate / 2 + 1;
        let mut planner = RealFftPlanner::<f64>::new();
        let processor = planner.plan_fft_forward(sample_rate);
        Self {
            sample_rate,
            output_rate,
            window: hann_window(sample_rate),
            input: processor.make_input_vec(),
            scratch: processor.make_output_vec(),
            processor,
        }
    }

    pub fn output_rate(&self) -> usize {
        self.output_rate
    }

    /// Executes the forward transform over `values[0..R)` (caller ensures
    /// `values.count() >= R`) and writes the power spectrum back into
    /// `values`, with `count == output_rate` and the tail zeroed.
    pub fn execute(&mut self, values: &mut SampleArray) -> VibrascopeResult<()> {
        values.require_capacity(self.output_rate)?;

        let source = values.as_full_slice();
        for i in 0..self.sample_rate {
            self.input[i] = source[i] * self.window[i];
        }

        self.processor
            .process(&mut self.input, &mut self.scratch)
            .map_err(|e| VibrascopeError::NoMemory(format!("fft process failed: {e:?}")))?;

        let out = values.values_mut();
        out[0] = self.scratch[0].re * self.scratch[0].re;
        for i in 1..self.output_rate {
            let c = self.scratch[i];
            out[i] = 2.0 * (c.re * c.re + c.im * c.im);
        }
        values.set_count(self.output_rate);

        Ok(())
    }
}

/// Hann window of length `n`, normalized so `sum(w[i]^2) == 1`.
fn hann_window(n: usize) -> Vec<f64> {
    let mut w = vec![0.0; n];
    let denom = (n - 1) as f64;
    for (i, wi) in w.iter_mut().enumerate() {
        let x = 2.0 * PI * i as f64 / denom;
        *wi = 0.5 - 0.5 * x.cos();
    }
    let sum_sq: f64 = w.iter().map(|v| v * v).sum();
    let norm = sum_sq.sqrt();
    for wi in &mut w {
        *wi /= norm;
    }
    w
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_window_normalized() {
        let w = hann_window(16);
        let sum_sq: f64 = w.iter().map(|v| v * v).sum();
        assert!((sum_sq - 1.0).abs() < 1e-9);
    }

    #[test]
    fn fft_of_sine_peaks_at_bin() {
        let n = 16;
        let mut plan = FftPlan::new(n);
        // allocate with enough total capacity for both the n-sample input
        // and the (smaller) output_rate-sized power spectrum
        let mut values = SampleArray::allocate(n.max(plan.output_rate()));
        {
            let slice = values.values_mut();
            for (i, s) in slice.iter_mut().enumerate().take(n) {
                *s = (2.0 * PI * 2.0 * i as f64 / n as f64).sin();
            }
        }

        plan.execute(&mut values).unwrap();
        assert_eq!(values.count(), plan.output_rate());

        let spectrum = values.as_slice();
        let max_index = spectrum
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.partial_cmp(b.1).unwrap())
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(max_index, 2);
        assert!(spectrum[0].abs() < 1e-6);
    }
}
