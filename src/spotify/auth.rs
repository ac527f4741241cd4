/*
 *  spotify/auth.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  OAuth2 token lifecycle: authorization-code exchange and refresh
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

use log::{error, info, warn};
use serde::Deserialize;

use super::{HttpReply, STATUS_OK, SpotifyApi};
use crate::error::{SpotifyError, SpotifyResult};
use crate::tokens::{Credentials, TokenStore};

const GRANT_AUTHORIZATION_CODE: &str = "authorization_code";
const GRANT_REFRESH_TOKEN: &str = "refresh_token";

/// Token endpoint response; everything beyond the two tokens is ignored.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Owns the in-memory credential pair and keeps the token file in step.
///
/// Neither operation retries on its own; the connection manager decides
/// when to try again.
#[derive(Debug)]
pub struct TokenLifecycle {
    store: TokenStore,
    creds: Credentials,
    redirect_uri: String,
}

impl TokenLifecycle {
    pub fn new(store: TokenStore, redirect_uri: impl Into<String>) -> Self {
        Self {
            store,
            creds: Credentials::default(),
            redirect_uri: redirect_uri.into(),
        }
    }

    /// Replace the in-memory pair with whatever the token file holds.
    /// Returns false on first run (no file, or a file we cannot parse).
    pub fn load_persisted(&mut self) -> bool {
        match self.store.load() {
            Some(creds) => {
                self.creds = creds;
                true
            }
            None => false,
        }
    }

    pub fn access_token(&self) -> Option<&str> {
        self.creds.access_token.as_deref().filter(|t| !t.is_empty())
    }

    pub fn has_access_token(&self) -> bool {
        self.creds.has_access_token()
    }

    /// Trade a one-time authorization code for a fresh pair and persist it.
    pub fn exchange_authorization_code(&mut self, api: &dyn SpotifyApi, code: &str) -> SpotifyResult<&Credentials> {
        if code.is_empty() {
            return Err(SpotifyError::ConfigurationMissing("auth_code"));
        }

        let form = [
            ("grant_type", GRANT_AUTHORIZATION_CODE),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];
        let tokens = Self::grant(api, &form).inspect_err(|e| error!("Token exchange failed: {e}"))?;

        let Some(refresh_token) = tokens.refresh_token else {
            let err = SpotifyError::Protocol("token exchange response lacks refresh_token".into());
            error!("Token exchange failed: {err}");
            return Err(err);
        };

        self.creds = Credentials {
            access_token: Some(tokens.access_token),
            refresh_token: Some(refresh_token),
        };
        info!("Successfully got access token");
        self.persist();
        Ok(&self.creds)
    }

    /// Mint a new access token from the refresh token.
    ///
    /// The file is only rewritten when the provider rotates the refresh
    /// token. Any failure means re-authorization is required.
    pub fn refresh(&mut self, api: &dyn SpotifyApi) -> SpotifyResult<&Credentials> {
        if !self.creds.has_refresh_token() {
            return Err(SpotifyError::Auth("no refresh token".into()));
        }
        let refresh_token = self.creds.refresh_token.clone().unwrap_or_default();

        let form = [
            ("grant_type", GRANT_REFRESH_TOKEN),
            ("refresh_token", refresh_token.as_str()),
        ];
        let tokens = Self::grant(api, &form).inspect_err(|e| error!("Token refresh failed: {e}"))?;

        self.creds.access_token = Some(tokens.access_token);
        if let Some(rotated) = tokens.refresh_token {
            self.creds.refresh_token = Some(rotated);
            self.persist();
        }
        info!("Successfully refreshed access token");
        Ok(&self.creds)
    }

    fn grant(api: &dyn SpotifyApi, form: &[(&str, &str)]) -> SpotifyResult<TokenResponse> {
        let reply = api.request_token(form)?;
        Self::decode(reply)
    }

    fn decode(reply: HttpReply) -> SpotifyResult<TokenResponse> {
        match reply.status {
            STATUS_OK => serde_json::from_str(&reply.body)
                .map_err(|e| SpotifyError::Protocol(format!("malformed token response: {e}"))),
            400 | 401 => Err(SpotifyError::Auth(format!("{} {}", reply.status, reply.body.trim()))),
            other => Err(SpotifyError::Protocol(format!("token endpoint returned {other}: {}", reply.body.trim()))),
        }
    }

    /// Write failures are logged; the in-memory pair stays usable.
    fn persist(&self) {
        match self.store.save(&self.creds) {
            Ok(()) => info!("Tokens saved successfully"),
            Err(e) => warn!("{} ({})", SpotifyError::from(e), self.store.path().display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spotify::ScriptedApi;
    use tempfile::tempdir;

    const REDIRECT: &str = "http://localhost:8080";

    fn lifecycle_in(dir: &std::path::Path) -> TokenLifecycle {
        TokenLifecycle::new(TokenStore::new(dir.join("tokens.json")), REDIRECT)
    }

    #[test]
    fn test_exchange_sends_code_grant_and_persists() {
        let dir = tempdir().unwrap();
        let mut auth = lifecycle_in(dir.path());
        let api = ScriptedApi::new();
        api.push_token_reply(200, r#"{"access_token":"A1","refresh_token":"R1","expires_in":3600}"#);

        let creds = auth.exchange_authorization_code(&api, "the-code").unwrap().clone();
        assert_eq!(creds, Credentials::new("A1", "R1"));

        let requests = api.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].form_value("grant_type"), Some("authorization_code"));
        assert_eq!(requests[0].form_value("code"), Some("the-code"));
        assert_eq!(requests[0].form_value("redirect_uri"), Some(REDIRECT));

        assert_eq!(TokenStore::new(dir.path().join("tokens.json")).load(), Some(creds));
    }

    #[test]
    fn test_exchange_without_code_is_configuration_missing() {
        let dir = tempdir().unwrap();
        let mut auth = lifecycle_in(dir.path());
        let api = ScriptedApi::new();

        assert!(matches!(
            auth.exchange_authorization_code(&api, ""),
            Err(SpotifyError::ConfigurationMissing("auth_code"))
        ));
        assert_eq!(api.request_count(), 0);
    }

    #[test]
    fn test_refresh_with_blank_refresh_token_makes_no_request() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        TokenStore::new(&path).save(&Credentials::new("A0", "")).unwrap();
        let mut auth = lifecycle_in(dir.path());
        assert!(auth.load_persisted());

        let api = ScriptedApi::new();
        assert!(matches!(auth.refresh(&api), Err(SpotifyError::Auth(_))));
        assert_eq!(api.request_count(), 0);
        assert_eq!(auth.access_token(), Some("A0"));
    }

    #[test]
    fn test_exchange_failure_is_not_retried() {
        let dir = tempdir().unwrap();
        let mut auth = lifecycle_in(dir.path());
        let api = ScriptedApi::new();
        api.push_token_reply(400, r#"{"error":"invalid_grant"}"#);

        let err = auth.exchange_authorization_code(&api, "stale").unwrap_err();
        assert!(matches!(err, SpotifyError::Auth(_)));
        assert_eq!(api.request_count(), 1);
        assert!(!auth.has_access_token());
        assert!(!dir.path().join("tokens.json").exists());
    }

    #[test]
    fn test_exchange_network_failure_surfaces_as_failure() {
        let dir = tempdir().unwrap();
        let mut auth = lifecycle_in(dir.path());
        let api = ScriptedApi::new();
        api.push_token_network_error();

        assert!(matches!(
            auth.exchange_authorization_code(&api, "code"),
            Err(SpotifyError::Network(_))
        ));
    }

    #[test]
    fn test_refresh_without_refresh_token_makes_no_request() {
        let dir = tempdir().unwrap();
        let mut auth = lifecycle_in(dir.path());
        let api = ScriptedApi::new();

        let err = auth.refresh(&api).unwrap_err();
        assert!(matches!(err, SpotifyError::Auth(ref m) if m == "no refresh token"));
        assert_eq!(api.request_count(), 0);
    }

    #[test]
    fn test_refresh_keeps_refresh_token_unless_rotated() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        TokenStore::new(&path).save(&Credentials::new("A0", "R0")).unwrap();

        let mut auth = lifecycle_in(dir.path());
        assert!(auth.load_persisted());

        let api = ScriptedApi::new();
        api.push_token_reply(200, r#"{"access_token":"A1"}"#);
        let creds = auth.refresh(&api).unwrap().clone();
        assert_eq!(creds, Credentials::new("A1", "R0"));
        assert_eq!(api.requests()[0].form_value("grant_type"), Some("refresh_token"));
        assert_eq!(api.requests()[0].form_value("refresh_token"), Some("R0"));
        // not rotated, so the file still holds the old pair
        assert_eq!(TokenStore::new(&path).load(), Some(Credentials::new("A0", "R0")));

        api.push_token_reply(200, r#"{"access_token":"A2","refresh_token":"R2"}"#);
        auth.refresh(&api).unwrap();
        assert_eq!(TokenStore::new(&path).load(), Some(Credentials::new("A2", "R2")));
    }

    #[test]
    fn test_unwritable_store_keeps_tokens_in_memory() {
        let dir = tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("missing-dir").join("tokens.json"));
        let mut auth = TokenLifecycle::new(store, REDIRECT);
        let api = ScriptedApi::new();
        api.push_token_reply(200, r#"{"access_token":"A1","refresh_token":"R1"}"#);

        assert!(auth.exchange_authorization_code(&api, "code").is_ok());
        assert_eq!(auth.access_token(), Some("A1"));
    }

    #[test]
    fn test_malformed_token_body_is_protocol_error() {
        let dir = tempdir().unwrap();
        let mut auth = lifecycle_in(dir.path());
        let api = ScriptedApi::new();
        api.push_token_reply(200, "<html>oops</html>");
        api.push_token_reply(503, "busy");

        assert!(matches!(auth.exchange_authorization_code(&api, "c"), Err(SpotifyError::Protocol(_))));
        assert!(matches!(auth.exchange_authorization_code(&api, "c"), Err(SpotifyError::Protocol(_))));
    }
}
