/*
 *  spotify/http.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Blocking reqwest client for the Spotify accounts and web API
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use log::debug;
use reqwest::blocking::Client;
use reqwest::header;
use std::time::Duration;

use super::{HttpReply, SpotifyApi};
use crate::constants::{CURRENTLY_PLAYING_URL, REQUEST_TIMEOUT_SECS, TOKEN_URL, USER_AGENT};
use crate::error::SpotifyResult;

/// Production provider client.
#[derive(Debug, Clone)]
pub struct HttpSpotify {
    client: Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    playing_url: String,
}

impl HttpSpotify {
    /// Creates a client with the default headers and the bounded request timeout.
    pub fn new(client_id: &str, client_secret: &str) -> SpotifyResult<Self> {
        Self::with_timeout(client_id, client_secret, Duration::from_secs(REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(client_id: &str, client_secret: &str, timeout: Duration) -> SpotifyResult<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::USER_AGENT, header::HeaderValue::from_static(USER_AGENT));
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .connect_timeout(timeout)
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            token_url: TOKEN_URL.to_string(),
            playing_url: CURRENTLY_PLAYING_URL.to_string(),
        })
    }

    /// Point both endpoints at another base, e.g. a local stub server.
    pub fn with_endpoints(mut self, token_url: &str, playing_url: &str) -> Self {
        self.token_url = token_url.to_string();
        self.playing_url = playing_url.to_string();
        self
    }
}

impl SpotifyApi for HttpSpotify {
    fn request_token(&self, form: &[(&str, &str)]) -> SpotifyResult<HttpReply> {
        let response = self
            .client
            .post(&self.token_url)
            .basic_auth(&self.client_id, Some(&self.client_secret))
            .form(form)
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;
        debug!("token endpoint replied {status}");
        Ok(HttpReply { status, body })
    }

    fn currently_playing(&self, access_token: &str) -> SpotifyResult<HttpReply> {
        let response = self
            .client
            .get(&self.playing_url)
            .bearer_auth(access_token)
            .send()?;

        let status = response.status().as_u16();
        let body = response.text()?;
        debug!("currently-playing replied {status} ({} bytes)", body.len());
        Ok(HttpReply { status, body })
    }
}
