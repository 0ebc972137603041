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

//! Spectral pipeline: windowed FFT, frequency-bin aggregation, octave-band
//! summation and decibel conversion.

pub mod bins;
pub mod db;
pub mod fft;
pub mod octave;

pub use bins::frequency_bins;
pub use db::decibels;
pub use fft::FftPlan;
pub use octave::octave_bands;
