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

//! Real-time acoustic/vibration telemetry processor: stream reassembly,
//! spectral analysis, and segmented WAV output for interleaved multi-sensor
//! multi-channel 16-bit PCM streams.

pub mod config;
pub mod context;
pub mod demux;
pub mod error;
pub mod frame;
pub mod ingest;
pub mod publisher;
pub mod reassembler;
pub mod sample;
pub mod socket;
pub mod spectral;
pub mod wav;

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber. Call once at process entry.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
