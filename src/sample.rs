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

//! Bounded sample array: `count <= total` f64 values, plus the sequence id
//! of the frame they were derived from. Elements beyond `count` are always
//! zero after any shrinking operation, mirroring the upstream `pass_array`
//! type.

use crate::error::{VibrascopeError, VibrascopeResult};

#[derive(Debug, Clone)]
pub struct SampleArray {
    pub sequence_id: u32,
    count: usize,
    values: Vec<f64>,
}

impl SampleArray {
    pub fn allocate(total: usize) -> Self {
        Self {
            sequence_id: 0,
            count: 0,
            values: vec![0.0; total],
        }
    }

    pub fn total(&self) -> usize {
        self.values.len()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values[..self.count]
    }

    pub fn as_full_slice(&self) -> &[f64] {
        &self.values
    }

    /// Sets the valid length to `count` and zeroes everything at or beyond
    /// it, up to `total`.
    pub(crate) fn set_count(&mut self, count: usize) {
        debug_assert!(count <= self.values.len());
        self.count = count;
        self.values[count..].fill(0.0);
    }

    pub(crate) fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Requires `total() >= required`, else returns `NoMemory`.
    pub(crate) fn require_capacity(&self, required: usize) -> VibrascopeResult<()> {
        if self.values.len() < required {
            return Err(VibrascopeError::NoMemory(format!(
                "destination array has capacity {}, need {required}",
                self.values.len()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_count_zeroes_tail() {
        let mut a = SampleArray::allocate(8);
        a.values_mut().fill(1.0);
        a.set_count(3);
        assert_eq!(a.count(), 3);
        assert_eq!(a.as_slice(), &[1.0, 1.0, 1.0]);
        assert!(a.as_full_slice()[3..].iter().all(|&v| v == 0.0));
    }
}
