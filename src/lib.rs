/*
 *  lib.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Spotify now-playing marquee plugin for small status displays
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

//! Polls the Spotify currently-playing endpoint and renders the track as a
//! scrolling marquee in a single host-owned text element.
//!
//! Leaf to root:
//!
//! - [`tokens`] persists the access/refresh pair
//! - [`spotify::TokenLifecycle`] runs the code exchange and refresh grants
//! - [`connection`] throttles connection attempts
//! - [`poller`] fetches the playing item and owns the track text
//! - [`scroller`] turns the track text into fixed-width frames
//! - [`plugin`] drives all of it from the host's update tick

pub mod config;
pub mod connection;
pub mod constants;
pub mod error;
pub mod host;
pub mod plugin;
pub mod poller;
pub mod scroller;
pub mod spotify;
pub mod tokens;

pub use config::{Config, SpotifyOptions};
pub use connection::{ConnectionManager, ConnectionState};
pub use error::{SpotifyError, TokenStoreError};
pub use host::{MemoryUi, Plugin, PluginInfo, TextWidget, Ui};
pub use plugin::SpotifyPlugin;
pub use poller::TrackPoller;
pub use scroller::ScrollRenderer;
pub use tokens::{Credentials, TokenStore};
