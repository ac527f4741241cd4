/*
 *  error.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Unified error types for the token lifecycle and provider client
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

use thiserror::Error;

/// Every failure the plugin can meet while talking to the provider.
///
/// None of these ever reach the host: the plugin hooks log them and degrade
/// to a status string or the last known track.
#[derive(Debug, Error)]
pub enum SpotifyError {
    /// Client credentials, refresh token or auth code not supplied.
    #[error("configuration missing: {0}")]
    ConfigurationMissing(&'static str),

    /// Timeout, DNS or connection failure.
    #[error("network error: {0}")]
    Network(String),

    /// 401 or rejected grant.
    #[error("authorization failed: {0}")]
    Auth(String),

    /// Unexpected status code or malformed body.
    #[error("unexpected provider response: {0}")]
    Protocol(String),

    /// Token file could not be written.
    #[error("token persistence failed: {0}")]
    Persistence(#[from] TokenStoreError),
}

impl From<reqwest::Error> for SpotifyError {
    fn from(err: reqwest::Error) -> Self {
        SpotifyError::Network(err.to_string())
    }
}

/// Errors raised while writing the token file.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SpotifyResult<T> = Result<T, SpotifyError>;
