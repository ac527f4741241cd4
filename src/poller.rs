/*
 *  poller.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Currently-playing poller - sole writer of the track text
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

use log::{debug, error, info, warn};
use std::time::{Duration, Instant};

use crate::connection::ConnectionManager;
use crate::constants::{NO_TRACK_PLAYING, WAITING_FOR_TRACK};
use crate::spotify::{
    CurrentlyPlaying, STATUS_NO_CONTENT, STATUS_OK, STATUS_UNAUTHORIZED, SpotifyApi, TokenLifecycle,
};

/// A 401 buys at most this many refresh-and-refetch rounds per poll.
const MAX_REFRESH_RETRIES: usize = 1;

/// Result of a single fetch.
#[derive(Debug)]
enum Fetch {
    Done,
    Unauthorized,
    Failed(String),
}

/// Fetches the playing item on a fixed interval and keeps the last good
/// track line.
#[derive(Debug)]
pub struct TrackPoller {
    track_text: String,
    check_interval: Duration,
    last_check: Option<Instant>,
}

impl TrackPoller {
    pub fn new(check_interval: Duration) -> Self {
        Self {
            track_text: WAITING_FOR_TRACK.to_string(),
            check_interval,
            last_check: None,
        }
    }

    pub fn track_text(&self) -> &str {
        &self.track_text
    }

    pub fn is_due_at(&self, now: Instant) -> bool {
        self.last_check
            .is_none_or(|last| now.saturating_duration_since(last) >= self.check_interval)
    }

    /// Poll when connected and a full `check_interval` has passed since the
    /// last poll. Returns whether a poll ran.
    pub fn poll_if_due_at(
        &mut self,
        now: Instant,
        api: &dyn SpotifyApi,
        auth: &mut TokenLifecycle,
        conn: &mut ConnectionManager,
    ) -> bool {
        if !conn.is_connected() || !self.is_due_at(now) {
            return false;
        }
        self.last_check = Some(now);
        self.poll(api, auth, conn);
        true
    }

    /// One poll, ungated by the timer. A 401 triggers one refresh and one
    /// refetch; anything unrecoverable drops the connection.
    pub fn poll(
        &mut self,
        api: &dyn SpotifyApi,
        auth: &mut TokenLifecycle,
        conn: &mut ConnectionManager,
    ) -> &str {
        if !conn.is_connected() {
            return &self.track_text;
        }

        for attempt in 0..=MAX_REFRESH_RETRIES {
            match self.fetch_once(api, auth) {
                Fetch::Done => return &self.track_text,
                Fetch::Failed(reason) => {
                    conn.disconnect(&reason);
                    return &self.track_text;
                }
                Fetch::Unauthorized if attempt < MAX_REFRESH_RETRIES => {
                    if let Err(e) = auth.refresh(api) {
                        conn.disconnect(&format!("token refresh failed: {e}"));
                        return &self.track_text;
                    }
                    debug!("access token refreshed, fetching again");
                }
                Fetch::Unauthorized => {}
            }
        }

        conn.disconnect("still unauthorized after token refresh");
        &self.track_text
    }

    fn fetch_once(&mut self, api: &dyn SpotifyApi, auth: &TokenLifecycle) -> Fetch {
        let Some(token) = auth.access_token() else {
            return Fetch::Failed("no access token".into());
        };

        let reply = match api.currently_playing(token) {
            Ok(reply) => reply,
            Err(e) => {
                error!("Network error during track fetch: {e}");
                return Fetch::Failed(e.to_string());
            }
        };

        match reply.status {
            STATUS_OK => match CurrentlyPlaying::from_body(&reply.body) {
                Ok(playing) => {
                    match playing.and_then(|p| p.track_line()) {
                        Some(line) => {
                            if line != self.track_text {
                                info!("Now playing: {line}");
                            }
                            self.track_text = line;
                        }
                        None => debug!("200 without an item, keeping last track"),
                    }
                    Fetch::Done
                }
                Err(e) => {
                    warn!("Track fetch error: {e}");
                    Fetch::Failed(e.to_string())
                }
            },
            STATUS_NO_CONTENT => {
                self.track_text = NO_TRACK_PLAYING.to_string();
                Fetch::Done
            }
            STATUS_UNAUTHORIZED => Fetch::Unauthorized,
            other => {
                error!("Unexpected status code: {other}");
                Fetch::Failed(format!("unexpected status {other}"))
            }
        }
    }
}
