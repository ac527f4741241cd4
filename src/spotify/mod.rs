/*
 *  spotify/mod.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Provider client seam: token endpoint and currently-playing endpoint
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

//! Only two provider calls are ever made:
//!
//! - `POST /api/token` with Basic client auth (authorization-code and
//!   refresh-token grants)
//! - `GET /v1/me/player/currently-playing` with a Bearer access token
//!
//! [`SpotifyApi`] is the seam between the plugin logic and the wire. The
//! production implementation is [`HttpSpotify`]; [`ScriptedApi`] replays
//! canned replies for tests and bench runs.

pub mod auth;
pub mod http;
pub mod mock;
pub mod track;

pub use auth::TokenLifecycle;
pub use http::HttpSpotify;
pub use mock::{ScriptedApi, ScriptedApiState, ScriptedRequest};
pub use track::{CurrentlyPlaying, format_track};

use crate::error::SpotifyResult;

pub const STATUS_OK: u16 = 200;
pub const STATUS_NO_CONTENT: u16 = 204;
pub const STATUS_UNAUTHORIZED: u16 = 401;

/// Status line and raw body of a provider response.
///
/// Status interpretation is left to the caller, since the token endpoint and
/// the playback endpoint treat codes differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self { status, body: body.into() }
    }
}

/// Blocking provider calls. Network-level failures come back as
/// [`SpotifyError::Network`](crate::error::SpotifyError::Network); any
/// response with a status line is an `Ok(HttpReply)`.
pub trait SpotifyApi {
    /// POST a form-encoded grant to the token endpoint with client Basic auth.
    fn request_token(&self, form: &[(&str, &str)]) -> SpotifyResult<HttpReply>;

    /// GET the currently playing item with a Bearer access token.
    fn currently_playing(&self, access_token: &str) -> SpotifyResult<HttpReply>;
}
