/*
 *  spotify/mock.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Scripted provider for testing without network access
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

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{HttpReply, SpotifyApi};
use crate::error::{SpotifyError, SpotifyResult};

/// One request as seen by the scripted provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedRequest {
    Token { form: Vec<(String, String)> },
    CurrentlyPlaying { access_token: String },
}

impl ScriptedRequest {
    /// Value of a form field, for token requests.
    pub fn form_value(&self, key: &str) -> Option<&str> {
        match self {
            ScriptedRequest::Token { form } => form
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            ScriptedRequest::CurrentlyPlaying { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
enum Scripted {
    Reply(HttpReply),
    NetworkDown,
}

/// Shared state for the scripted provider (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct ScriptedApiState {
    token_replies: VecDeque<Scripted>,
    playing_replies: VecDeque<Scripted>,

    /// Every request, in order
    pub requests: Vec<ScriptedRequest>,
}

impl ScriptedApiState {
    pub fn token_requests(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| matches!(r, ScriptedRequest::Token { .. }))
            .count()
    }

    pub fn playing_requests(&self) -> usize {
        self.requests
            .iter()
            .filter(|r| matches!(r, ScriptedRequest::CurrentlyPlaying { .. }))
            .count()
    }
}

/// Provider that replays queued replies and records what was asked.
///
/// Cloning shares the script, so a test can keep one handle while the plugin
/// owns another. An exhausted queue behaves like an unreachable provider.
#[derive(Debug, Clone, Default)]
pub struct ScriptedApi {
    state: Arc<Mutex<ScriptedApiState>>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_token_reply(&self, status: u16, body: &str) -> &Self {
        self.lock().token_replies.push_back(Scripted::Reply(HttpReply::new(status, body)));
        self
    }

    pub fn push_token_network_error(&self) -> &Self {
        self.lock().token_replies.push_back(Scripted::NetworkDown);
        self
    }

    pub fn push_playing_reply(&self, status: u16, body: &str) -> &Self {
        self.lock().playing_replies.push_back(Scripted::Reply(HttpReply::new(status, body)));
        self
    }

    pub fn push_playing_network_error(&self) -> &Self {
        self.lock().playing_replies.push_back(Scripted::NetworkDown);
        self
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<ScriptedApiState>> {
        Arc::clone(&self.state)
    }

    pub fn requests(&self) -> Vec<ScriptedRequest> {
        self.lock().requests.clone()
    }

    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    fn lock(&self) -> MutexGuard<'_, ScriptedApiState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn answer(next: Option<Scripted>) -> SpotifyResult<HttpReply> {
        match next {
            Some(Scripted::Reply(reply)) => Ok(reply),
            Some(Scripted::NetworkDown) => Err(SpotifyError::Network("connection refused".into())),
            None => Err(SpotifyError::Network("no scripted reply".into())),
        }
    }
}

impl SpotifyApi for ScriptedApi {
    fn request_token(&self, form: &[(&str, &str)]) -> SpotifyResult<HttpReply> {
        let mut state = self.lock();
        state.requests.push(ScriptedRequest::Token {
            form: form.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        });
        let next = state.token_replies.pop_front();
        Self::answer(next)
    }

    fn currently_playing(&self, access_token: &str) -> SpotifyResult<HttpReply> {
        let mut state = self.lock();
        state.requests.push(ScriptedRequest::CurrentlyPlaying {
            access_token: access_token.to_string(),
        });
        let next = state.playing_replies.pop_front();
        Self::answer(next)
    }
}
