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

//! Driver loop wiring. Connects an [`AcquisitionContext`] to a downstream
//! sink per `(sensor, channel)`, cooperatively cancelled through a
//! [`SubsystemHandle`]. Mirrors the read -> gap-detect -> endian-swap ->
//! per-(s,c) pipeline loops in the upstream `multi_octave_bands` /
//! `multi_wav_file` utilities.

use crate::config::Config;
use crate::context::{AcquisitionContext, IngestOutcome};
use crate::demux;
use crate::error::VibrascopeResult;
use crate::publisher::Publisher;
use crate::sample::SampleArray;
use crate::spectral::{FftPlan, decibels, octave_bands};
use crate::wav::WavSegment;
use tokio::select;
use tokio_graceful_shutdown::SubsystemHandle;
use tracing::{error, info, warn};

/// Default octave-band range posted by the upstream sample invocation;
/// not exposed as a config option since nothing names one.
const OCTAVE_BAND_LOWER: u32 = 10;
const OCTAVE_BAND_UPPER: u32 = 36;
const DECIBEL_REFERENCE: f64 = 1.0;
const DECIBEL_CORRECTION: f64 = 0.0;
const CALIBRATION_GRADIENT: f64 = 1.0;
const CALIBRATION_OFFSET: f64 = 0.0;

/// Octave-band pipeline: demux+calibrate -> FFT -> octave bands -> dB ->
/// publish, for every `(sensor, channel)` pair, repeated per frame.
pub async fn run_octave_bands(subsys: SubsystemHandle, config: Config) -> VibrascopeResult<()> {
    let mut ctx = AcquisitionContext::connect(&config).await?;
    let publisher = config.url.as_deref().map(Publisher::new);

    let sensors = ctx.sensors();
    let channels = ctx.channels();
    let sample_rate = ctx.sample_rate();

    let mut plan = FftPlan::new(sample_rate);
    let working_total = sample_rate.max(plan.output_rate());
    let mut values: Vec<SampleArray> = (0..sensors * channels)
        .map(|_| SampleArray::allocate(working_total))
        .collect();

    loop {
        let outcome = select! {
            result = ctx.read_frame() => result,
            _ = subsys.on_shutdown_requested() => break,
        };

        match outcome {
            Ok(IngestOutcome::Gap) => {
                warn!("gap detected");
                continue;
            }
            Ok(IngestOutcome::Frame { sequence_id }) => {
                let payload = ctx.payload();
                let mut k = 0;
                for s in 0..sensors {
                    for c in 0..channels {
                        let v = &mut values[k];
                        k += 1;

                        demux::demux_and_calibrate(
                            payload,
                            sensors,
                            channels,
                            sample_rate,
                            s,
                            c,
                            CALIBRATION_GRADIENT,
                            CALIBRATION_OFFSET,
                            sequence_id,
                            v,
                        )?;
                        plan.execute(v)?;
                        octave_bands(v, OCTAVE_BAND_LOWER, OCTAVE_BAND_UPPER)?;
                        decibels(v, DECIBEL_REFERENCE, DECIBEL_CORRECTION);

                        if let Some(publisher) = &publisher {
                            let name = format!("Sensor {s}, Channel {c}");
                            if let Err(e) = publisher.post(&name, "octavebands", s, c, v.as_slice()).await {
                                warn!("publisher failed: {e}");
                            }
                        }
                    }
                }
            }
            Err(e) => {
                error!("fatal ingest error: {e}");
                return Err(e);
            }
        }
    }

    info!("shutdown requested, exiting octave-band ingest loop");
    Ok(())
}

/// WAV segment sink: appends the raw (uncalibrated) per-channel samples of
/// every frame to that channel's rotating segment file.
pub async fn run_wav_writer(subsys: SubsystemHandle, config: Config) -> VibrascopeResult<()> {
    let mut ctx = AcquisitionContext::connect(&config).await?;

    let sensors = ctx.sensors();
    let channels = ctx.channels();
    let sample_rate = ctx.sample_rate();

    let mut segments = Vec::with_capacity(sensors * channels);
    for s in 0..sensors {
        for c in 0..channels {
            segments.push(WavSegment::new(".", format!("sensor{s}channel{c}"), sample_rate, config.duration));
        }
    }

    let mut raw = vec![0i16; sample_rate];

    loop {
        let outcome = select! {
            result = ctx.read_frame() => result,
            _ = subsys.on_shutdown_requested() => break,
        };

        match outcome {
            Ok(IngestOutcome::Gap) => {
                warn!("gap detected");
                continue;
            }
            Ok(IngestOutcome::Frame { .. }) => {
                let payload = ctx.payload();
                let mut k = 0;
                for s in 0..sensors {
                    for c in 0..channels {
                        demux::extract_channel(payload, sensors, channels, sample_rate, s, c, &mut raw);
                        segments[k].write_second(&raw).await?;
                        k += 1;
                    }
                }
            }
            Err(e) => {
                error!("fatal ingest error: {e}");
                return Err(e);
            }
        }
    }

    info!("shutdown requested, exiting WAV ingest loop");
    Ok(())
}
