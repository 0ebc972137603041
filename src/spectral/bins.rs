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

//! Frequency-bin aggregation. Ported from the upstream
//! `pass_frequency_bins` routine.
//!
//! Note the contract is quartic, not a plain re-aggregation: the values are
//! already a power spectrum, and this step sums their *squares* again. This
//! is intentional; downstream code depends on it.

use crate::error::VibrascopeResult;
use crate::sample::SampleArray;

/// For `j = 0, 1, ...` and `i = lower + j*stride` while `i + stride <=
/// upper`, `values[j] := sum_{k=i..i+stride} values[k]^2`. Sets `count :=
/// j` (== `floor((upper-lower)/stride)`) and zeroes the tail. Only
/// complete strides are emitted; a trailing partial stride is dropped.
///
/// Fails with `NoMemory` if `values`'s total capacity is smaller than
/// `upper`, the highest index this operation reads.
pub fn frequency_bins(values: &mut SampleArray, lower: usize, upper: usize, stride: usize) -> VibrascopeResult<()> {
    if upper <= lower || stride == 0 {
        values.set_count(0);
        return Ok(());
    }

    values.require_capacity(upper)?;

    let source = values.as_full_slice().to_vec();
    let mut j = 0usize;
    let mut i = lower;
    let out = values.values_mut();
    while i + stride <= upper {
        let mut sum = 0.0;
        for k in i..(i + stride) {
            sum += source[k] * source[k];
        }
        out[j] = sum;
        j += 1;
        i += stride;
    }
    values.set_count(j);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bin_count_matches_floor_division() {
        let mut v = SampleArray::allocate(64);
        {
            let s = v.values_mut();
            s.fill(1.0);
        }
        frequency_bins(&mut v, 0, 10, 3).unwrap();
        assert_eq!(v.count(), 3); // floor(10/3) == 3, the trailing partial stride [9,10) is dropped
        assert!(v.as_full_slice()[v.count()..].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn empty_range_yields_zero_count() {
        let mut v = SampleArray::allocate(16);
        frequency_bins(&mut v, 10, 5, 2).unwrap();
        assert_eq!(v.count(), 0);
    }

    #[test]
    fn sums_squares_of_power_spectrum_values() {
        let mut v = SampleArray::allocate(8);
        {
            let s = v.values_mut();
            s[0..4].copy_from_slice(&[1.0, 2.0, 3.0, 4.0]);
        }
        frequency_bins(&mut v, 0, 4, 2).unwrap();
        assert_eq!(v.count(), 2);
        assert_eq!(v.as_slice(), &[1.0 + 4.0, 9.0 + 16.0]);
    }

    #[test]
    fn rejects_undersized_array() {
        let mut v = SampleArray::allocate(5);
        let result = frequency_bins(&mut v, 0, 10, 3);
        assert!(result.is_err());
    }
}
