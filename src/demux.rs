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

//! Sample demultiplexing, endian normalization and linear calibration.
//! Ported from the upstream `pass_endian_swap` / `pass_convert_to_doubles`
//! routines.

use crate::sample::SampleArray;
use byteorder::{ByteOrder, LittleEndian};

/// Byte-swaps every 16-bit element of `payload` in place. A pure array map,
/// applied when the upstream device is big-endian.
pub fn endian_swap(payload: &mut [u8]) {
    for chunk in payload.chunks_exact_mut(2) {
        chunk.swap(0, 1);
    }
}

/// Extracts the `R` raw `int16` samples of sensor `s`, channel `c` into
/// `out`, without calibration. Used by the WAV writer, which appends the
/// device's original samples rather than a calibrated `f64` stream
/// (`pass_wav_write` indexes the payload directly).
pub fn extract_channel(payload: &[u8], sensors: usize, channels: usize, sample_rate: usize, sensor: usize, channel: usize, out: &mut [i16]) {
    debug_assert_eq!(out.len(), sample_rate);
    let stride = sensors * channels;
    let start = sensor * channels + channel;
    for (t, slot) in out.iter_mut().enumerate() {
        let index = (t * stride + start) * 2;
        *slot = LittleEndian::read_i16(&payload[index..index + 2]);
    }
}

/// Extracts the `R` samples of sensor `s`, channel `c` from the
/// time-major/sensor-major/channel-minor interleaved payload, applying
/// `gradient * x + offset`, and writes them into `out`.
///
/// Fails with `NoMem` (via [`SampleArray::require_capacity`]) if `out`'s
/// total capacity is smaller than the sample rate.
pub fn demux_and_calibrate(
    payload: &[u8],
    sensors: usize,
    channels: usize,
    sample_rate: usize,
    sensor: usize,
    channel: usize,
    gradient: f64,
    offset: f64,
    sequence_id: u32,
    out: &mut SampleArray,
) -> crate::error::VibrascopeResult<()> {
    out.require_capacity(sample_rate)?;

    let stride = sensors * channels;
    let start = sensor * channels + channel;

    let values = out.values_mut();
    for t in 0..sample_rate {
        let index = (t * stride + start) * 2;
        let raw = LittleEndian::read_i16(&payload[index..index + 2]);
        values[t] = f64::from(raw) * gradient + offset;
    }
    out.set_count(sample_rate);
    out.sequence_id = sequence_id;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interleaved(sensors: usize, channels: usize, rate: usize) -> Vec<u8> {
        let mut buf = vec![0u8; sensors * channels * rate * 2];
        let mut i = 0i16;
        for chunk in buf.chunks_exact_mut(2) {
            LittleEndian::write_i16(chunk, i);
            i = i.wrapping_add(1);
        }
        buf
    }

    #[test]
    fn endian_swap_is_involution() {
        let mut payload = interleaved(1, 2, 4);
        let original = payload.clone();
        endian_swap(&mut payload);
        assert_ne!(payload, original);
        endian_swap(&mut payload);
        assert_eq!(payload, original);
    }

    #[test]
    fn demux_extracts_strided_channel() {
        // S=1, C=2, R=3: samples interleaved as [s0c0, s0c1, s1c0, s1c1, ...]
        let payload = interleaved(1, 2, 3);
        let mut out = SampleArray::allocate(3);
        demux_and_calibrate(&payload, 1, 2, 3, 0, 1, 1.0, 0.0, 7, &mut out).unwrap();
        assert_eq!(out.count(), 3);
        assert_eq!(out.sequence_id, 7);
        // channel 1 values are at raw indices 1, 3, 5
        assert_eq!(out.as_slice(), &[1.0, 3.0, 5.0]);
    }

    #[test]
    fn extract_channel_matches_calibrated_demux_at_unity_gain() {
        let payload = interleaved(1, 2, 3);
        let mut raw = vec![0i16; 3];
        extract_channel(&payload, 1, 2, 3, 0, 1, &mut raw);
        assert_eq!(raw, vec![1, 3, 5]);
    }

    #[test]
    fn demux_is_bijection_with_reinterleave() {
        let (sensors, channels, rate) = (2, 2, 5);
        let payload = interleaved(sensors, channels, rate);
        let mut rebuilt = vec![0u8; payload.len()];

        for s in 0..sensors {
            for c in 0..channels {
                let mut out = SampleArray::allocate(rate);
                demux_and_calibrate(&payload, sensors, channels, rate, s, c, 1.0, 0.0, 0, &mut out).unwrap();
                let stride = sensors * channels;
                let start = s * channels + c;
                for (t, &v) in out.as_slice().iter().enumerate() {
                    let index = (t * stride + start) * 2;
                    LittleEndian::write_i16(&mut rebuilt[index..index + 2], v as i16);
                }
            }
        }

        assert_eq!(rebuilt, payload);
    }

    #[test]
    fn demux_rejects_undersized_destination() {
        let payload = interleaved(1, 1, 4);
        let mut out = SampleArray::allocate(2);
        let result = demux_and_calibrate(&payload, 1, 1, 4, 0, 0, 1.0, 0.0, 0, &mut out);
        assert!(result.is_err());
    }
}
