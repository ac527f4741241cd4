/*
 *  spotify/track.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Currently-playing payload and track line formatting
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

use serde::Deserialize;

use crate::constants::{NOTE_GLYPH, UNKNOWN_ARTIST};
use crate::error::{SpotifyError, SpotifyResult};

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentlyPlaying {
    #[serde(default)]
    pub item: Option<Item>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
}

impl CurrentlyPlaying {
    /// Decode a 200 body. A blank body or a JSON `null` carries no item.
    pub fn from_body(body: &str) -> SpotifyResult<Option<Self>> {
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str::<Option<CurrentlyPlaying>>(body)
            .map_err(|e| SpotifyError::Protocol(format!("malformed currently-playing body: {e}")))
    }

    /// The display line for the current item, if there is one.
    pub fn track_line(&self) -> Option<String> {
        let item = self.item.as_ref()?;
        let artist = item
            .artists
            .first()
            .map(|a| a.name.as_str())
            .unwrap_or(UNKNOWN_ARTIST);
        Some(format_track(&item.name, artist))
    }
}

/// `♫ {track} - {artist}`
pub fn format_track(track: &str, artist: &str) -> String {
    format!("{NOTE_GLYPH} {track} - {artist}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_line_uses_primary_artist() {
        let body = r#"{
            "is_playing": true,
            "item": {
                "name": "Windowlicker",
                "artists": [{"name": "Aphex Twin"}, {"name": "Someone Else"}],
                "album": {"name": "ignored"}
            }
        }"#;
        let playing = CurrentlyPlaying::from_body(body).unwrap().unwrap();
        assert_eq!(playing.track_line().as_deref(), Some("♫ Windowlicker - Aphex Twin"));
    }

    #[test]
    fn test_blank_and_null_bodies_have_no_item() {
        assert!(CurrentlyPlaying::from_body("").unwrap().is_none());
        assert!(CurrentlyPlaying::from_body("  \n").unwrap().is_none());
        assert!(CurrentlyPlaying::from_body("null").unwrap().is_none());

        let idle = CurrentlyPlaying::from_body(r#"{"is_playing": false, "item": null}"#)
            .unwrap()
            .unwrap();
        assert!(idle.track_line().is_none());
    }

    #[test]
    fn test_missing_artists_fall_back() {
        let body = r#"{"item": {"name": "Episode 12"}}"#;
        let playing = CurrentlyPlaying::from_body(body).unwrap().unwrap();
        assert_eq!(playing.track_line().as_deref(), Some("♫ Episode 12 - Unknown artist"));
    }

    #[test]
    fn test_malformed_body_is_protocol_error() {
        let err = CurrentlyPlaying::from_body("{not json").unwrap_err();
        assert!(matches!(err, SpotifyError::Protocol(_)));
    }
}
