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

use miette::Diagnostic;
use std::io;
use thiserror::Error;

/// The seven-member error taxonomy of the telemetry core.
///
/// `Success` has no variant here: a successful operation is represented by
/// `Ok` in the `Result` this type is paired with.
#[derive(Error, Debug, Diagnostic)]
pub enum VibrascopeError {
    #[error("no connection: {0}")]
    NoConnection(String),

    #[error("out of memory: {0}")]
    NoMemory(String),

    #[error("I/O error: {0}")]
    Generic(#[from] io::Error),

    #[error("gap detected: {0}")]
    GapDetected(String),

    #[error("no data")]
    NoData,

    #[error("publisher failure: {0}")]
    PublisherFailure(String),

    #[error("config error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("HTTP request error: {0}")]
    HttpRequestError(#[from] reqwest::Error),

    #[error("JSON serde error: {0}")]
    JsonSerdeError(#[from] serde_json::Error),

    #[error("address parse error: {0}")]
    AddrParseError(#[from] std::net::AddrParseError),
}

pub type VibrascopeResult<T> = Result<T, VibrascopeError>;
