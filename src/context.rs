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

//! Acquisition context: the single owner of the socket, the read/scratch/
//! payload buffers and the current `sequence_id`. Mirrors the upstream
//! `pass_context` / `pass_context_init` / `pass_read` contract, generalized
//! from a bare global struct into an object the ingest task holds
//! exclusively.

use crate::config::Config;
use crate::demux;
use crate::error::VibrascopeResult;
use crate::reassembler::{ReassembleOutcome, Reassembler};
use crate::socket;
use tokio::net::TcpStream;
use tracing::instrument;

/// Outcome of one `read_frame` call: either a usable frame (gap detection
/// passed, or was skipped because the stream carries no header) or a
/// reported gap, which callers must skip without emitting downstream.
#[derive(Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    Frame { sequence_id: u32 },
    Gap,
}

pub struct AcquisitionContext {
    stream: TcpStream,
    reassembler: Option<Reassembler>,
    read_buf: Vec<u8>,
    sensors: usize,
    channels: usize,
    sample_rate: usize,
    endian_swap: bool,
    sequence_id: u32,
}

impl AcquisitionContext {
    #[instrument(skip(config))]
    pub async fn connect(config: &Config) -> VibrascopeResult<Self> {
        let stream = socket::connect(&config.host, config.port).await?;
        let reassembler = config
            .has_header
            .then(|| Reassembler::new(config.sensors, config.channels, config.sample_rate));
        let read_buf = vec![0u8; config.expected_block()];

        Ok(Self {
            stream,
            reassembler,
            read_buf,
            sensors: config.sensors,
            channels: config.channels,
            sample_rate: config.sample_rate,
            endian_swap: config.endian_swap,
            sequence_id: 0,
        })
    }

    pub fn sensors(&self) -> usize {
        self.sensors
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn sample_rate(&self) -> usize {
        self.sample_rate
    }

    pub fn sequence_id(&self) -> u32 {
        self.sequence_id
    }

    /// The most recently assembled frame payload: `S*C*R*2` bytes of
    /// interleaved 16-bit PCM, ready for demuxing.
    pub fn payload(&self) -> &[u8] {
        match &self.reassembler {
            Some(r) => r.payload(),
            None => &self.read_buf,
        }
    }

    fn payload_mut(&mut self) -> &mut [u8] {
        match &mut self.reassembler {
            Some(r) => r.payload_mut(),
            None => &mut self.read_buf,
        }
    }

    /// Reads one `expected_block`, reassembles it (or passes it through
    /// directly when the stream carries no header), and applies the
    /// configured endian swap to the resulting payload.
    #[instrument(skip(self))]
    pub async fn read_frame(&mut self) -> VibrascopeResult<IngestOutcome> {
        socket::read_block(&mut self.stream, &mut self.read_buf).await?;

        let outcome = match &mut self.reassembler {
            Some(r) => r.consume(&self.read_buf),
            None => ReassembleOutcome::Success {
                sequence_id: self.sequence_id.wrapping_add(1),
            },
        };

        match outcome {
            ReassembleOutcome::GapDetected => Ok(IngestOutcome::Gap),
            ReassembleOutcome::Success { sequence_id } => {
                self.sequence_id = sequence_id;
                if self.endian_swap {
                    demux::endian_swap(self.payload_mut());
                }
                Ok(IngestOutcome::Frame { sequence_id })
            }
        }
    }
}
