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

//! Third-octave band table and aggregation. The 44-entry table (bands
//! 10..53), with its concrete bin numbers and fractional edge weights,
//! is carried over verbatim from the upstream acquisition firmware.

use crate::error::VibrascopeResult;
use crate::sample::SampleArray;

pub struct Band {
    pub band: u32,
    pub lower: usize,
    pub upper: usize,
    pub lower_weight: f64,
    pub upper_weight: f64,
}

pub const SMALLEST_BAND: u32 = 10;
pub const LARGEST_BAND: u32 = 53;

pub const TABLE: [Band; 44] = [
    Band { band: 10, lower: 9, upper: 11, lower_weight: 0.087491, upper_weight: 0.220185 },
    Band { band: 11, lower: 11, upper: 14, lower_weight: 0.779815, upper_weight: 0.125375 },
    Band { band: 12, lower: 14, upper: 18, lower_weight: 0.874625, upper_weight: 0.782794 },
    Band { band: 13, lower: 18, upper: 22, lower_weight: 0.217206, upper_weight: 0.387211 },
    Band { band: 14, lower: 22, upper: 28, lower_weight: 0.612789, upper_weight: 0.183829 },
    Band { band: 15, lower: 28, upper: 35, lower_weight: 0.816171, upper_weight: 0.481339 },
    Band { band: 16, lower: 35, upper: 45, lower_weight: 0.518661, upper_weight: 0.668359 },
    Band { band: 17, lower: 45, upper: 56, lower_weight: 0.331641, upper_weight: 0.234133 },
    Band { band: 18, lower: 56, upper: 71, lower_weight: 0.765867, upper_weight: 0.794578 },
    Band { band: 19, lower: 71, upper: 89, lower_weight: 0.205422, upper_weight: 0.125094 },
    Band { band: 20, lower: 89, upper: 112, lower_weight: 0.874906, upper_weight: 0.201845 },
    Band { band: 21, lower: 112, upper: 141, lower_weight: 0.798155, upper_weight: 0.253754 },
    Band { band: 22, lower: 141, upper: 178, lower_weight: 0.746246, upper_weight: 0.827941 },
    Band { band: 23, lower: 178, upper: 224, lower_weight: 0.172059, upper_weight: 0.872114 },
    Band { band: 24, lower: 224, upper: 282, lower_weight: 0.127886, upper_weight: 0.838293 },
    Band { band: 25, lower: 282, upper: 355, lower_weight: 0.161707, upper_weight: 0.813389 },
    Band { band: 26, lower: 355, upper: 447, lower_weight: 0.186611, upper_weight: 0.683592 },
    Band { band: 27, lower: 447, upper: 562, lower_weight: 0.316408, upper_weight: 0.341325 },
    Band { band: 28, lower: 562, upper: 708, lower_weight: 0.658675, upper_weight: 0.945784 },
    Band { band: 29, lower: 708, upper: 891, lower_weight: 0.054216, upper_weight: 0.250938 },
    Band { band: 30, lower: 891, upper: 1122, lower_weight: 0.749062, upper_weight: 0.018454 },
    Band { band: 31, lower: 1122, upper: 1413, lower_weight: 0.981546, upper_weight: 0.537545 },
    Band { band: 32, lower: 1413, upper: 1778, lower_weight: 0.462455, upper_weight: 0.279410 },
    Band { band: 33, lower: 1778, upper: 2239, lower_weight: 0.720590, upper_weight: 0.721139 },
    Band { band: 34, lower: 2239, upper: 2818, lower_weight: 0.278861, upper_weight: 0.382931 },
    Band { band: 35, lower: 2818, upper: 3548, lower_weight: 0.617069, upper_weight: 0.133892 },
    Band { band: 36, lower: 3548, upper: 4467, lower_weight: 0.866108, upper_weight: 0.835922 },
    Band { band: 37, lower: 4467, upper: 5623, lower_weight: 0.164078, upper_weight: 0.413252 },
    Band { band: 38, lower: 5623, upper: 7079, lower_weight: 0.586748, upper_weight: 0.457844 },
    Band { band: 39, lower: 7079, upper: 8913, lower_weight: 0.542156, upper_weight: 0.509381 },
    Band { band: 40, lower: 8913, upper: 11220, lower_weight: 0.490619, upper_weight: 0.184543 },
    Band { band: 41, lower: 11220, upper: 14125, lower_weight: 0.815457, upper_weight: 0.375446 },
    Band { band: 42, lower: 14125, upper: 17783, lower_weight: 0.624554, upper_weight: 0.794100 },
    Band { band: 43, lower: 17783, upper: 22387, lower_weight: 0.205900, upper_weight: 0.211386 },
    Band { band: 44, lower: 22387, upper: 28184, lower_weight: 0.788614, upper_weight: 0.829313 },
    Band { band: 45, lower: 28184, upper: 35481, lower_weight: 0.170687, upper_weight: 0.338923 },
    Band { band: 46, lower: 35481, upper: 44668, lower_weight: 0.661077, upper_weight: 0.359215 },
    Band { band: 47, lower: 44668, upper: 56234, lower_weight: 0.640785, upper_weight: 0.132519 },
    Band { band: 48, lower: 56234, upper: 70795, lower_weight: 0.867481, upper_weight: 0.578438 },
    Band { band: 49, lower: 70795, upper: 89125, lower_weight: 0.421562, upper_weight: 0.093813 },
    Band { band: 50, lower: 89125, upper: 112202, lower_weight: 0.906187, upper_weight: 0.845430 },
    Band { band: 51, lower: 112202, upper: 141254, lower_weight: 0.154570, upper_weight: 0.754462 },
    Band { band: 52, lower: 141254, upper: 177828, lower_weight: 0.245538, upper_weight: 0.941004 },
    Band { band: 53, lower: 177828, upper: 223872, lower_weight: 0.058996, upper_weight: 0.113857 },];

/// Aggregates power-spectrum bins into octave bands over `[lower, upper]`
/// clamped to `[10, 53]`. Writes sums densely from index 0, sets `count` to
/// the number of bands emitted, and zeroes the tail.
///
/// Fails with `NoMemory` if `values`'s total capacity is smaller than the
/// highest bin index the selected bands touch.
pub fn octave_bands(values: &mut SampleArray, lower: u32, upper: u32) -> VibrascopeResult<()> {
    let index_lower = if lower <= SMALLEST_BAND {
        0
    } else {
        (lower - SMALLEST_BAND) as usize
    };
    let index_upper = if upper >= LARGEST_BAND {
        (LARGEST_BAND - SMALLEST_BAND) as usize
    } else {
        upper.saturating_sub(SMALLEST_BAND) as usize
    };

    if index_upper > index_lower {
        let highest_bin = TABLE[index_upper - 1].upper;
        values.require_capacity(highest_bin + 1)?;
    }

    let source = values.as_full_slice().to_vec();
    let mut i = 0usize;
    let out = values.values_mut();
    for entry in TABLE.iter().take(index_upper).skip(index_lower) {
        let mut sum = entry.lower_weight * source[entry.lower];
        for k in (entry.lower + 1)..entry.upper {
            sum += source[k];
        }
        sum += entry.upper_weight * source[entry.upper];
        out[i] = sum;
        i += 1;
    }
    values.set_count(i);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_has_44_entries_for_bands_10_to_53() {
        assert_eq!(TABLE.len(), 44);
        assert_eq!(TABLE[0].band, 10);
        assert_eq!(TABLE[43].band, 53);
    }

    #[test]
    fn dense_power_spectrum_yields_weighted_sums() {
        // values[0..64) = 1.0, bands (10, 15) -> index_lower=0, index_upper=5
        let mut v = SampleArray::allocate(256);
        {
            let s = v.values_mut();
            s[0..64].fill(1.0);
        }
        octave_bands(&mut v, 10, 15).unwrap();
        assert_eq!(v.count(), 5);
        for (i, out) in v.as_slice().iter().enumerate() {
            let e = &TABLE[i];
            let expected = e.lower_weight + (e.upper - e.lower - 1) as f64 + e.upper_weight;
            assert!((out - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn count_matches_clamped_range() {
        // clamp(upper, 10, 53) - max(lower, 10) == 53 - 10 == 43: the
        // table's 44th entry (band 53) is never reachable through the
        // clamped upper bound, matching octave_band_largest - smallest in
        // the upstream pass_octave_bands routine.
        let mut v = SampleArray::allocate(250_000);
        v.values_mut().fill(1.0);
        octave_bands(&mut v, 0, 1000).unwrap();
        assert_eq!(v.count(), 43);
    }

    #[test]
    fn rejects_undersized_array() {
        // bands (10, 15) touch bins up to TABLE[4].upper == 28; a
        // 10-element array can't supply that.
        let mut v = SampleArray::allocate(10);
        let result = octave_bands(&mut v, 10, 15);
        assert!(result.is_err());
    }
}
