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

//! Decibel conversion. Ported from the upstream `pass_decibels` routine.

use crate::sample::SampleArray;

/// In place: `values[i] := 10*log10(values[i] / reference) + correction`.
/// Division by zero or negative inputs produce the IEEE-standard result
/// (+-inf/NaN) without error; the caller is expected to ensure positivity.
pub fn decibels(values: &mut SampleArray, reference: f64, correction: f64) {
    let count = values.count();
    let slice = &mut values.values_mut()[..count];
    for v in slice {
        *v = 10.0 * (*v / reference).log10() + correction;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_in_place_up_to_count() {
        let mut v = SampleArray::allocate(4);
        {
            let s = v.values_mut();
            s[0] = 1.0;
            s[1] = 10.0;
        }
        v.set_count(2);
        decibels(&mut v, 1.0, 0.0);
        assert!((v.as_slice()[0] - 0.0).abs() < 1e-9);
        assert!((v.as_slice()[1] - 10.0).abs() < 1e-9);
    }

    #[test]
    fn zero_input_yields_negative_infinity() {
        let mut v = SampleArray::allocate(1);
        v.set_count(1);
        decibels(&mut v, 1.0, 0.0);
        assert_eq!(v.as_slice()[0], f64::NEG_INFINITY);
    }
}
