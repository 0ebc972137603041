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

use crate::error::VibrascopeResult;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument, warn};

#[derive(Parser)]
#[command(author, version, about, long_about)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, env = "VIBRASCOPE_CONFIG")]
    config: Option<PathBuf>,
}

/// Recognized configuration options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Number of sensors, S >= 1.
    pub sensors: usize,
    /// Number of channels per sensor, C >= 1.
    pub channels: usize,
    /// Sample rate R; one FFT frame is produced per second.
    pub sample_rate: usize,
    /// Whether frames include the 42-byte header. If false, payload is read
    /// directly and gap detection is skipped.
    #[serde(default = "default_true")]
    pub has_header: bool,
    /// Byte-swap 16-bit samples after read.
    #[serde(default)]
    pub endian_swap: bool,
    /// WAV segment duration, in seconds.
    #[serde(default = "default_duration")]
    pub duration: usize,
    /// Publisher endpoint.
    #[serde(default)]
    pub url: Option<String>,
    /// Source stream host.
    pub host: String,
    /// Source stream port.
    pub port: u16,
}

fn default_true() -> bool {
    true
}

fn default_duration() -> usize {
    60
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensors: 1,
            channels: 1,
            sample_rate: 48_000,
            has_header: true,
            endian_swap: false,
            duration: 60,
            url: Some("http://localhost:5100/data".to_owned()),
            host: "127.0.0.1".to_owned(),
            port: 1234,
        }
    }
}

impl Config {
    #[instrument]
    pub async fn load() -> VibrascopeResult<Config> {
        let args = Args::parse();

        info!("Loading config …");

        Config::load_from_file(args.config.as_deref()).await
    }

    #[instrument]
    async fn load_from_file(path: Option<&Path>) -> VibrascopeResult<Config> {
        match path {
            Some(path) => {
                let content = fs::read_to_string(&path).await?;
                let config = serde_yaml::from_str(&content)?;
                info!("Config loaded from {}", path.to_string_lossy());
                Ok(config)
            }
            None => {
                let path = if cfg!(debug_assertions) {
                    let it = "./config-dev.yaml";
                    warn!("No config file specified, using {it}");
                    it
                } else {
                    let it = "/etc/vibrascope/config.yaml";
                    warn!("No config file specified, using {it}");
                    it
                };
                match fs::read_to_string(path).await {
                    Ok(it) => {
                        let config = serde_yaml::from_str(&it)?;
                        info!("Config loaded from {path}");
                        Ok(config)
                    }
                    Err(_) => {
                        warn!("Could not read config file {path}, using default config.");
                        Ok(Config::default())
                    }
                }
            }
        }
    }

    pub fn expected_block(&self) -> usize {
        crate::frame::expected_block(self.sensors, self.channels, self.sample_rate, self.has_header)
    }
}
