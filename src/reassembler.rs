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

//! Boundary-respecting reassembler and gap detector.
//!
//! The scratch buffer *is* the state: a linear byte accumulator with
//! `count` valid bytes at the front, sized 2x an `expected_block` so one
//! in-flight partial frame can always coexist with a fully arrived one.
//! Ported from the upstream `pass_gaps_detection` routine.

use crate::frame;
use tracing::{instrument, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum ReassembleOutcome {
    /// A complete (header, payload) pair was extracted; `sequence_id` comes
    /// from header bytes 28..32.
    Success { sequence_id: u32 },
    /// No complete frame could be extracted this call. The scratch buffer
    /// may have been wiped.
    GapDetected,
}

/// The scratch buffer accumulator. Invariant: `count <= scratch.len()`, and
/// `scratch[count..]` is always zero.
pub struct Reassembler {
    scratch: Vec<u8>,
    count: usize,
    expected_payload: usize,
    header: Vec<u8>,
    payload: Vec<u8>,
}

impl Reassembler {
    pub fn new(sensors: usize, channels: usize, sample_rate: usize) -> Self {
        let expected_payload = frame::expected_payload(sensors, channels, sample_rate);
        let expected_block = expected_payload + frame::HEADER_SIZE;
        Self {
            scratch: vec![0u8; 2 * expected_block],
            count: 0,
            expected_payload,
            header: vec![0u8; frame::HEADER_SIZE],
            payload: vec![0u8; expected_payload],
        }
    }

    pub fn header(&self) -> &[u8] {
        &self.header
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    pub(crate) fn payload_mut(&mut self) -> &mut [u8] {
        &mut self.payload
    }

    fn wipe(&mut self) {
        self.scratch[..self.count].fill(0);
        self.count = 0;
    }

    /// Shifts `scratch[from..count)` down to offset 0 and zeroes the tail.
    fn compact_from(&mut self, from: usize) {
        self.scratch.copy_within(from..self.count, 0);
        let new_count = self.count - from;
        self.scratch[new_count..self.count].fill(0);
        self.count = new_count;
    }

    /// Consumes one freshly-read block of `expected_block` bytes and
    /// attempts to extract exactly one aligned frame.
    #[instrument(skip(self, block), fields(len = block.len()))]
    pub fn consume(&mut self, block: &[u8]) -> ReassembleOutcome {
        let expected_block = self.expected_payload + frame::HEADER_SIZE;
        debug_assert_eq!(block.len(), expected_block);

        if self.count + expected_block > self.scratch.len() {
            warn!("scratch buffer overflow, wiping");
            self.wipe();
            return ReassembleOutcome::GapDetected;
        }

        self.scratch[self.count..self.count + expected_block].copy_from_slice(block);
        self.count += expected_block;

        let mut payload_extracted = false;
        let mut sequence_id = 0u32;

        loop {
            if self.count < frame::HEADER_SIZE {
                if payload_extracted {
                    break;
                }
                return ReassembleOutcome::GapDetected;
            }

            let h1 = frame::find_header(&self.scratch, 0, self.count);
            if h1 == self.count {
                warn!("no header found in scratch buffer, wiping");
                self.wipe();
                return ReassembleOutcome::GapDetected;
            }

            let h2 = frame::find_header(&self.scratch, h1 + frame::HEADER_SIZE, self.count);
            let received = h2 - (h1 + frame::HEADER_SIZE);

            if received == self.expected_payload {
                self.header.copy_from_slice(&self.scratch[h1..h1 + frame::HEADER_SIZE]);
                self.payload.copy_from_slice(
                    &self.scratch[h1 + frame::HEADER_SIZE..h1 + frame::HEADER_SIZE + self.expected_payload],
                );
                sequence_id = frame::sequence_id(&self.header);
                payload_extracted = true;
                self.compact_from(h2);
                // there may be another complete frame already buffered
                continue;
            } else if received > self.expected_payload {
                warn!("oversized payload between headers, wiping");
                self.wipe();
                return ReassembleOutcome::GapDetected;
            } else if h2 < self.count {
                warn!("second header arrived too early, wiping");
                self.wipe();
                return ReassembleOutcome::GapDetected;
            } else {
                self.compact_from(h1);
                break;
            }
        }

        ReassembleOutcome::Success { sequence_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_header(seq: u32) -> Vec<u8> {
        let mut h = vec![0u8; frame::HEADER_SIZE];
        h[0..4].copy_from_slice(&frame::MAGIC.to_le_bytes());
        h[4..8].copy_from_slice(&frame::MAGIC.to_le_bytes());
        h[8..12].copy_from_slice(&1u32.to_le_bytes());
        h[12..16].copy_from_slice(&2u32.to_le_bytes());
        h[28..32].copy_from_slice(&seq.to_be_bytes());
        h
    }

    fn frame_bytes(seq: u32, payload_len: usize) -> Vec<u8> {
        let mut f = make_header(seq);
        f.extend(vec![seq as u8; payload_len]);
        f
    }

    #[test]
    fn scratch_invariant_holds_after_every_call() {
        // S=1, C=1, R=4 -> expected_payload = 8, expected_block = 50
        let mut r = Reassembler::new(1, 1, 4);
        let stream = [frame_bytes(1, 8), frame_bytes(2, 8), frame_bytes(3, 8)].concat();

        // deliver in 50-byte chunks, split across the natural boundary
        let chunk = r.expected_payload + frame::HEADER_SIZE;
        let mut offset = 0;
        while offset + chunk <= stream.len() {
            r.consume(&stream[offset..offset + chunk]);
            assert!(r.count <= r.scratch.len());
            assert!(r.scratch[r.count..].iter().all(|&b| b == 0));
            offset += chunk;
        }
    }

    #[test]
    fn clean_multi_frame_stream_yields_sequence_ids_in_order() {
        let mut r = Reassembler::new(1, 1, 4);
        let chunk = r.expected_payload + frame::HEADER_SIZE;
        let stream = [frame_bytes(10, 8), frame_bytes(11, 8), frame_bytes(12, 8)].concat();

        let mut seen = Vec::new();
        let mut offset = 0;
        while offset + chunk <= stream.len() {
            if let ReassembleOutcome::Success { sequence_id } = r.consume(&stream[offset..offset + chunk]) {
                seen.push(sequence_id);
            }
            offset += chunk;
        }
        assert_eq!(seen, vec![10, 11, 12]);
        assert_eq!(r.count, 0);
    }

    #[test]
    fn oversized_payload_reports_gap_and_wipes() {
        let mut r = Reassembler::new(1, 1, 4);
        // payload twice the expected size before the next header appears
        let mut stream = make_header(1);
        stream.extend(vec![0xAAu8; 16]);
        stream.extend(make_header(2));
        stream.extend(vec![0xBBu8; 8]);

        let chunk = r.expected_payload + frame::HEADER_SIZE; // 50
        while stream.len() % chunk != 0 {
            stream.push(0);
        }

        let mut gap_seen = false;
        let mut offset = 0;
        while offset + chunk <= stream.len() {
            if r.consume(&stream[offset..offset + chunk]) == ReassembleOutcome::GapDetected {
                gap_seen = true;
                break;
            }
            offset += chunk;
        }
        assert!(gap_seen);
        assert_eq!(r.count, 0);
    }

    #[test]
    fn missing_header_at_stream_start_reports_gap_then_recovers() {
        let mut r = Reassembler::new(1, 1, 4);
        let chunk = r.expected_payload + frame::HEADER_SIZE;
        let garbage = vec![0x11u8; chunk];
        let outcome = r.consume(&garbage);
        assert_eq!(outcome, ReassembleOutcome::GapDetected);
        assert_eq!(r.count, 0);

        let good = frame_bytes(5, 8);
        let outcome2 = r.consume(&good);
        assert_eq!(outcome2, ReassembleOutcome::Success { sequence_id: 5 });
    }
}
