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

//! Entry point for the octave-band publisher: reads the sensor stream,
//! runs the spectral pipeline per `(sensor, channel)`, and POSTs the
//! result to the configured publisher URL. Mirrors the upstream
//! `multi_octave_bands` utility's `main`.

use miette::IntoDiagnostic;
use std::time::Duration;
use tokio::runtime;
use tokio_graceful_shutdown::{SubsystemBuilder, Toplevel};
use tracing::info;
use vibrascope::config::Config;
use vibrascope::ingest::run_octave_bands;

fn main() -> miette::Result<()> {
    vibrascope::init_tracing();

    runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .into_diagnostic()?
        .block_on(async_main())
}

async fn async_main() -> miette::Result<()> {
    let config = Config::load().await.into_diagnostic()?;

    info!(
        sensors = config.sensors,
        channels = config.channels,
        sample_rate = config.sample_rate,
        "starting octave-band ingest"
    );

    Toplevel::new(move |s| async move {
        s.start(SubsystemBuilder::new("octavebands", move |s| async move {
            run_octave_bands(s, config).await.into_diagnostic()
        }));
    })
    .catch_signals()
    .handle_shutdown_requests(Duration::from_secs(1))
    .await
    .into_diagnostic()?;

    Ok(())
}
