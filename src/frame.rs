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

//! Frame header layout and the magic-header search predicate.
//!
//! A frame is a fixed 42-byte header followed by one second of interleaved
//! 16-bit PCM payload. The header's first two 32-bit words are the fixed
//! magic `0xC0C0C0C0`; words 2 and 3 must *not* both equal the magic, which
//! disambiguates a real header from payload bytes that happen to contain the
//! magic pattern. Bytes 28..32 hold a big-endian sequence id.
//!
//! The packed layout below (`magic: u64`, `id: u64`, `version: u64`,
//! `timestamp: u64`, `reserved: u64`, `checksum: i16`) mirrors the emitter
//! header struct used by the upstream acquisition hardware; the core only
//! interprets the magic words and the sequence id.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

pub const HEADER_SIZE: usize = 42;
pub const MAGIC: u32 = 0xC0C0_C0C0;
const SEQUENCE_ID_OFFSET: usize = 28;

/// Number of bytes read per ingest iteration: header (if present) plus one
/// second of interleaved S*C*R 16-bit samples.
pub fn expected_block(sensors: usize, channels: usize, sample_rate: usize, has_header: bool) -> usize {
    expected_payload(sensors, channels, sample_rate) + if has_header { HEADER_SIZE } else { 0 }
}

pub fn expected_payload(sensors: usize, channels: usize, sample_rate: usize) -> usize {
    sensors * channels * sample_rate * 2
}

/// Reads four little-endian 32-bit words at `offset` without requiring
/// alignment: the bytes are authoritative, word interpretation is only a
/// fast path over them.
fn word(buffer: &[u8], offset: usize, index: usize) -> u32 {
    let start = offset + index * 4;
    LittleEndian::read_u32(&buffer[start..start + 4])
}

/// True if `buffer[offset..offset+42]` starts with a valid frame header:
/// words 0 and 1 equal the magic, and words 2 and 3 do not.
pub fn is_header_at(buffer: &[u8], offset: usize) -> bool {
    if offset + HEADER_SIZE > buffer.len() {
        return false;
    }
    word(buffer, offset, 0) == MAGIC
        && word(buffer, offset, 1) == MAGIC
        && word(buffer, offset, 2) != MAGIC
        && word(buffer, offset, 3) != MAGIC
}

/// Scans `buffer[start..end)` for the first offset `i` (with `i + 42 <=
/// end`) at which a header signature matches. Returns `end` if none found.
pub fn find_header(buffer: &[u8], start: usize, end: usize) -> usize {
    let mut i = start;
    while i + HEADER_SIZE <= end {
        if is_header_at(buffer, i) {
            return i;
        }
        i += 1;
    }
    end
}

/// Extracts the big-endian u32 sequence id from header bytes 28..32.
pub fn sequence_id(header: &[u8]) -> u32 {
    BigEndian::read_u32(&header[SEQUENCE_ID_OFFSET..SEQUENCE_ID_OFFSET + 4])
}
