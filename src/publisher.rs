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

//! External result publisher. Per processed frame and per
//! `(sensor, channel)`, POSTs the final `f64` array with a human name and a
//! message-type tag. Grounded on the upstream `pass_curl_init` /
//! `pass_curl_post` contract, swapped for `reqwest` since the core no longer
//! links `libcurl` directly.
//!
//! Failures are [`VibrascopeError::PublisherFailure`] and are always
//! non-fatal to the caller; the driver logs and continues.

use crate::error::{VibrascopeError, VibrascopeResult};
use serde::Serialize;
use tracing::instrument;

#[derive(Serialize)]
struct Payload<'a> {
    name: &'a str,
    message_type: &'a str,
    sensor: usize,
    channel: usize,
    values: &'a [f64],
}

pub struct Publisher {
    client: reqwest::Client,
    url: String,
}

impl Publisher {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }

    #[instrument(skip(self, values), fields(sensor, channel, len = values.len()))]
    pub async fn post(
        &self,
        name: &str,
        message_type: &str,
        sensor: usize,
        channel: usize,
        values: &[f64],
    ) -> VibrascopeResult<()> {
        let body = Payload {
            name,
            message_type,
            sensor,
            channel,
            values,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| VibrascopeError::PublisherFailure(e.to_string()))?;

        if !response.status().is_success() {
            return Err(VibrascopeError::PublisherFailure(format!(
                "server responded with {}",
                response.status()
            )));
        }

        Ok(())
    }
}
