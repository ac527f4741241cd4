/*
 *  connection.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Connection manager - throttled attempts to reach an authorized state
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

use log::{debug, info};
use std::time::{Duration, Instant};

use crate::error::SpotifyError;
use crate::spotify::{STATUS_UNAUTHORIZED, SpotifyApi, TokenLifecycle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connected,
}

/// Decides when to try connecting and what to try.
///
/// The retry timer is the only throttle: at most one attempt per
/// `retry_interval`, no backoff.
#[derive(Debug)]
pub struct ConnectionManager {
    state: ConnectionState,
    retry_interval: Duration,
    last_attempt: Option<Instant>,
}

impl ConnectionManager {
    pub fn new(retry_interval: Duration) -> Self {
        Self {
            state: ConnectionState::Disconnected,
            retry_interval,
            last_attempt: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    /// Drop back to Disconnected; the next due tick reconnects.
    pub fn disconnect(&mut self, reason: &str) {
        if self.state == ConnectionState::Connected {
            info!("Disconnected: {reason}");
        }
        self.state = ConnectionState::Disconnected;
    }

    pub fn try_connect(
        &mut self,
        api: &dyn SpotifyApi,
        auth: &mut TokenLifecycle,
        auth_code: Option<&str>,
    ) -> ConnectionState {
        self.try_connect_at(Instant::now(), api, auth, auth_code)
    }

    /// One tick while Disconnected. A no-op when already connected or when
    /// the previous attempt was less than `retry_interval` ago.
    pub fn try_connect_at(
        &mut self,
        now: Instant,
        api: &dyn SpotifyApi,
        auth: &mut TokenLifecycle,
        auth_code: Option<&str>,
    ) -> ConnectionState {
        if self.is_connected() {
            return self.state;
        }
        if let Some(last) = self.last_attempt {
            if now.saturating_duration_since(last) < self.retry_interval {
                return self.state;
            }
        }

        self.last_attempt = Some(now);
        info!("Attempting to connect...");

        if self.attempt(api, auth, auth_code) {
            info!("Connected to Spotify");
            self.state = ConnectionState::Connected;
        }
        self.state
    }

    fn attempt(&self, api: &dyn SpotifyApi, auth: &mut TokenLifecycle, auth_code: Option<&str>) -> bool {
        if let Some(token) = auth.access_token().map(str::to_owned) {
            // any answer but 401 means the token is still accepted
            return match api.currently_playing(&token) {
                Ok(reply) if reply.status != STATUS_UNAUTHORIZED => true,
                Ok(_) => auth.refresh(api).is_ok(),
                Err(e) => {
                    info!("Connection test failed, will retry... ({e})");
                    false
                }
            };
        }

        match auth.exchange_authorization_code(api, auth_code.unwrap_or_default()) {
            Ok(_) => true,
            Err(e @ SpotifyError::ConfigurationMissing(_)) => {
                debug!("{e}, idling");
                false
            }
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::ScriptedApi;
    use crate::tokens::{Credentials, TokenStore};
    use tempfile::{TempDir, tempdir};

    const RETRY: Duration = Duration::from_secs(5);

    fn lifecycle(creds: Option<Credentials>) -> (TempDir, TokenLifecycle) {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"));
        if let Some(creds) = creds {
            store.save(&creds).unwrap();
        }
        let mut auth = TokenLifecycle::new(store, "http://localhost:8080");
        auth.load_persisted();
        (dir, auth)
    }

    #[test]
    fn test_initial_state_is_disconnected() {
        let manager = ConnectionManager::new(RETRY);
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }

    #[test]
    fn test_valid_token_check_connects() {
        let (_dir, mut auth) = lifecycle(Some(Credentials::new("A", "R")));
        let api = ScriptedApi::new();
        api.push_playing_reply(204, "");

        let mut manager = ConnectionManager::new(RETRY);
        assert_eq!(manager.try_connect_at(Instant::now(), &api, &mut auth, None), ConnectionState::Connected);
        assert_eq!(api.requests(), vec![crate::spotify::ScriptedRequest::CurrentlyPlaying {
            access_token: "A".into()
        }]);
    }

    #[test]
    fn test_non_401_error_status_still_counts_as_valid() {
        let (_dir, mut auth) = lifecycle(Some(Credentials::new("A", "R")));
        let api = ScriptedApi::new();
        api.push_playing_reply(503, "unavailable");

        let mut manager = ConnectionManager::new(RETRY);
        assert!(manager.try_connect_at(Instant::now(), &api, &mut auth, None) == ConnectionState::Connected);
    }

    #[test]
    fn test_401_token_check_refreshes_inline() {
        let (_dir, mut auth) = lifecycle(Some(Credentials::new("A", "R")));
        let api = ScriptedApi::new();
        api.push_playing_reply(401, "");
        api.push_token_reply(200, r#"{"access_token":"A2"}"#);

        let mut manager = ConnectionManager::new(RETRY);
        manager.try_connect_at(Instant::now(), &api, &mut auth, Some("ignored"));
        assert!(manager.is_connected());
        assert_eq!(auth.access_token(), Some("A2"));
        // the auth code is never used while an access token exists
        assert!(api.requests().iter().all(|r| r.form_value("code").is_none()));
    }

    #[test]
    fn test_401_token_check_with_failed_refresh_stays_disconnected() {
        let (_dir, mut auth) = lifecycle(Some(Credentials::new("A", "R")));
        let api = ScriptedApi::new();
        api.push_playing_reply(401, "");
        api.push_token_reply(400, r#"{"error":"invalid_grant"}"#);

        let mut manager = ConnectionManager::new(RETRY);
        assert_eq!(
            manager.try_connect_at(Instant::now(), &api, &mut auth, Some("code")),
            ConnectionState::Disconnected
        );
        assert_eq!(api.request_count(), 2);
    }

    #[test]
    fn test_network_failure_on_token_check_stays_disconnected() {
        let (_dir, mut auth) = lifecycle(Some(Credentials::new("A", "R")));
        let api = ScriptedApi::new();
        api.push_playing_network_error();

        let mut manager = ConnectionManager::new(RETRY);
        assert!(!manager.is_connected());
        manager.try_connect_at(Instant::now(), &api, &mut auth, None);
        assert!(!manager.is_connected());
    }

    #[test]
    fn test_auth_code_exchange_when_no_token() {
        let (_dir, mut auth) = lifecycle(None);
        let api = ScriptedApi::new();
        api.push_token_reply(200, r#"{"access_token":"A","refresh_token":"R"}"#);

        let mut manager = ConnectionManager::new(RETRY);
        manager.try_connect_at(Instant::now(), &api, &mut auth, Some("code"));
        assert!(manager.is_connected());
        assert_eq!(api.requests()[0].form_value("code"), Some("code"));
    }

    #[test]
    fn test_nothing_configured_makes_no_request() {
        let (_dir, mut auth) = lifecycle(None);
        let api = ScriptedApi::new();

        let mut manager = ConnectionManager::new(RETRY);
        manager.try_connect_at(Instant::now(), &api, &mut auth, None);
        manager.try_connect_at(Instant::now() + RETRY * 2, &api, &mut auth, Some(""));
        assert!(!manager.is_connected());
        assert_eq!(api.request_count(), 0);
    }

    #[test]
    fn test_retry_is_throttled() {
        let (_dir, mut auth) = lifecycle(None);
        let api = ScriptedApi::new();
        api.push_token_reply(400, "bad code");
        api.push_token_reply(400, "bad code");

        let start = Instant::now();
        let mut manager = ConnectionManager::new(RETRY);
        manager.try_connect_at(start, &api, &mut auth, Some("code"));
        manager.try_connect_at(start + Duration::from_secs(1), &api, &mut auth, Some("code"));
        manager.try_connect_at(start + Duration::from_millis(4999), &api, &mut auth, Some("code"));
        assert_eq!(api.request_count(), 1);

        manager.try_connect_at(start + RETRY, &api, &mut auth, Some("code"));
        assert_eq!(api.request_count(), 2);
    }

    #[test]
    fn test_disconnect_returns_to_disconnected() {
        let (_dir, mut auth) = lifecycle(Some(Credentials::new("A", "R")));
        let api = ScriptedApi::new();
        api.push_playing_reply(200, "");

        let mut manager = ConnectionManager::new(RETRY);
        manager.try_connect_at(Instant::now(), &api, &mut auth, None);
        assert!(manager.is_connected());
        manager.disconnect("track fetch failed");
        assert_eq!(manager.state(), ConnectionState::Disconnected);
    }
}
