//! This module contains global constants used across the plugin and its host glue.

/// Element id of the single text widget owned by the plugin.
pub const ELEMENT_ID: &str = "pwnspotify";

/// Shown before the first track has been observed.
pub const WAITING_FOR_TRACK: &str = "Waiting for track...";
/// Shown while the connection manager is still trying to connect.
pub const CONNECTING: &str = "Connecting to Spotify...";
/// Shown when nothing is playing, or the track text is empty.
pub const NO_TRACK_PLAYING: &str = "No track playing";
/// Used when the provider returns an item without any artist.
pub const UNKNOWN_ARTIST: &str = "Unknown artist";
/// Prefix glyph for a formatted track line.
pub const NOTE_GLYPH: char = '♫';

/// Provider endpoints.
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const CURRENTLY_PLAYING_URL: &str = "https://api.spotify.com/v1/me/player/currently-playing";

/// Bounded request timeout for every provider call, in seconds.
pub const REQUEST_TIMEOUT_SECS: u64 = 5;

// option defaults
pub const DEFAULT_REDIRECT_URI: &str = "http://localhost:8080";
pub const DEFAULT_SCROLL_SPEED: usize = 2;
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_RETRY_INTERVAL_SECS: u64 = 5;
pub const DEFAULT_TOKEN_FILE: &str = "/root/.spotify_tokens";
pub const DEFAULT_DISPLAY_POSITION: (i32, i32) = (8, 90);
pub const DEFAULT_DISPLAY_WIDTH: usize = 12;
pub const DEFAULT_STATIC_DISPLAY_SECS: u64 = 3;

/// User-Agent presented to the provider.
pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));
