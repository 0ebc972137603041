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

//! Segmented WAV writer. Ported from the upstream `pass_wav_init` /
//! `pass_wav_write` routines.

use crate::error::VibrascopeResult;
use chrono::Local;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::instrument;

/// A single (sensor, channel) segmented WAV sink. Begins at
/// `seconds_written == 0`; each call to [`WavSegment::write_second`] appends
/// one second of 16-bit PCM and advances the counter, which wraps at
/// `duration`, opening a new timestamped file on the next call.
pub struct WavSegment {
    directory: PathBuf,
    prefix: String,
    sample_rate: usize,
    duration: usize,
    seconds_written: usize,
    filename: Option<PathBuf>,
}

impl WavSegment {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, sample_rate: usize, duration: usize) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            sample_rate,
            duration,
            seconds_written: 0,
            filename: None,
        }
    }

    fn new_filename(&self) -> PathBuf {
        let stamp = Local::now().format("%Y.%m.%d.%H.%M.%S");
        self.directory.join(format!("{}.{}.wav", self.prefix, stamp))
    }

    /// Appends one second of samples (extracted for this segment's
    /// (sensor, channel) from the demuxed payload) to the current file,
    /// opening a fresh file with a RIFF header at the start of a segment.
    #[instrument(skip(self, samples), fields(filename))]
    pub async fn write_second(&mut self, samples: &[i16]) -> VibrascopeResult<()> {
        debug_assert_eq!(samples.len(), self.sample_rate);

        let is_new_segment = self.seconds_written == 0;
        if is_new_segment {
            self.filename = Some(self.new_filename());
        }
        let filename = match &self.filename {
            Some(filename) => filename.clone(),
            None => self.new_filename(),
        };

        let mut file = OpenOptions::new().create(true).append(true).open(&filename).await?;

        if is_new_segment {
            let header = riff_header(self.sample_rate as u32, self.duration as u32);
            file.write_all(&header).await?;
        }

        let mut body = Vec::with_capacity(samples.len() * 2);
        for &s in samples {
            body.extend_from_slice(&s.to_le_bytes());
        }
        file.write_all(&body).await?;

        self.seconds_written += 1;
        if self.seconds_written == self.duration {
            self.seconds_written = 0;
        }

        Ok(())
    }

    pub fn current_filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }
}

/// Builds the 44-byte RIFF/fmt/data header for a mono 16-bit PCM WAV file
/// of `duration` seconds at `sample_rate`.
fn riff_header(sample_rate: u32, duration: u32) -> [u8; 44] {
    let data_chunk_size = duration * sample_rate * 2;
    let total_length = 44 + data_chunk_size;

    let mut h = [0u8; 44];
    h[0..4].copy_from_slice(b"RIFF");
    h[4..8].copy_from_slice(&(total_length - 8).to_le_bytes());
    h[8..12].copy_from_slice(b"WAVE");

    h[12..16].copy_from_slice(b"fmt ");
    h[16..20].copy_from_slice(&16u32.to_le_bytes()); // fmt chunk size
    h[20..22].copy_from_slice(&1u16.to_le_bytes()); // PCM
    h[22..24].copy_from_slice(&1u16.to_le_bytes()); // mono
    h[24..28].copy_from_slice(&sample_rate.to_le_bytes());
    h[28..32].copy_from_slice(&(2 * sample_rate).to_le_bytes()); // avg bytes/sec
    h[32..34].copy_from_slice(&2u16.to_le_bytes()); // block align
    h[34..36].copy_from_slice(&16u16.to_le_bytes()); // bits per sample

    h[36..40].copy_from_slice(b"data");
    h[40..44].copy_from_slice(&data_chunk_size.to_le_bytes());

    h
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_44_bytes_with_expected_chunk_sizes() {
        let h = riff_header(48_000, 2);
        assert_eq!(&h[0..4], b"RIFF");
        assert_eq!(&h[8..12], b"WAVE");
        assert_eq!(&h[12..16], b"fmt ");
        assert_eq!(&h[36..40], b"data");

        let data_size = u32::from_le_bytes(h[40..44].try_into().unwrap());
        assert_eq!(data_size, 2 * 48_000 * 2);

        let riff_size = u32::from_le_bytes(h[4..8].try_into().unwrap());
        assert_eq!(riff_size, 44 + data_size - 8);
    }

    #[tokio::test]
    async fn rotates_to_a_new_file_after_duration_seconds() {
        let dir = std::env::temp_dir().join(format!("vibrascope-wav-test-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.unwrap();

        let mut seg = WavSegment::new(&dir, "sensor0channel0", 4, 2);
        let samples = vec![0i16; 4];

        seg.write_second(&samples).await.unwrap();
        let first_name = seg.current_filename().unwrap().to_path_buf();

        seg.write_second(&samples).await.unwrap();
        assert_eq!(seg.current_filename().unwrap(), first_name);

        // filenames have one-second resolution; wait out the current
        // second so the rotated segment gets a distinct name
        tokio::time::sleep(std::time::Duration::from_millis(1100)).await;

        // third write starts a new segment (seconds_written wrapped to 0)
        seg.write_second(&samples).await.unwrap();
        let third_name = seg.current_filename().unwrap().to_path_buf();

        let meta_first = tokio::fs::metadata(&first_name).await.unwrap();
        // first file holds header + 2 seconds of 4 samples * 2 bytes
        assert_eq!(meta_first.len(), 44 + 2 * 4 * 2);

        tokio::fs::remove_dir_all(&dir).await.ok();
        let _ = third_name;
    }
}
