/*
 *  plugin.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  The now-playing plugin: wires tokens, connection, poller and scroller
 *  into the host lifecycle hooks
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
use std::time::Instant;

use crate::config::SpotifyOptions;
use crate::connection::{ConnectionManager, ConnectionState};
use crate::constants::{CONNECTING, ELEMENT_ID};
use crate::error::SpotifyError;
use crate::host::{Plugin, PluginInfo, TextWidget, Ui};
use crate::poller::TrackPoller;
use crate::scroller::ScrollRenderer;
use crate::spotify::{HttpSpotify, SpotifyApi, TokenLifecycle};
use crate::tokens::TokenStore;

pub const PLUGIN_INFO: PluginInfo = PluginInfo {
    name: "pwnspotify",
    author: env!("CARGO_PKG_AUTHORS"),
    version: env!("CARGO_PKG_VERSION"),
    license: "GPL3",
    description: "Shows currently playing Spotify track with scrolling animation",
};

/// Spotify now-playing marquee.
///
/// Every tick: while disconnected, try to connect (throttled) and show the
/// connecting banner; once connected, poll on the check interval and show
/// the next marquee frame of the current track line.
pub struct SpotifyPlugin {
    options: SpotifyOptions,
    api: Option<Box<dyn SpotifyApi>>,
    auth: TokenLifecycle,
    conn: ConnectionManager,
    poller: TrackPoller,
    scroller: ScrollRenderer,
    ready: bool,
}

impl SpotifyPlugin {
    /// Build the plugin against the real provider.
    ///
    /// Without client credentials there is nothing to talk to, so the plugin
    /// stays idle behind the connecting banner.
    pub fn new(options: SpotifyOptions) -> Self {
        let api: Option<Box<dyn SpotifyApi>> = if !options.has_client_credentials() {
            warn!("{}", SpotifyError::ConfigurationMissing("client_id/client_secret"));
            None
        } else {
            match HttpSpotify::new(&options.client_id, &options.client_secret) {
                Ok(client) => Some(Box::new(client)),
                Err(e) => {
                    error!("Unable to build HTTP client: {e}");
                    None
                }
            }
        };
        Self::build(options, api)
    }

    /// Build the plugin against any provider implementation.
    pub fn with_api(options: SpotifyOptions, api: Box<dyn SpotifyApi>) -> Self {
        Self::build(options, Some(api))
    }

    fn build(options: SpotifyOptions, api: Option<Box<dyn SpotifyApi>>) -> Self {
        let store = TokenStore::new(options.token_file.clone());
        Self {
            auth: TokenLifecycle::new(store, options.redirect_uri.clone()),
            conn: ConnectionManager::new(options.retry_interval()),
            poller: TrackPoller::new(options.check_interval()),
            scroller: ScrollRenderer::new(options.scroll_speed, options.static_display_time()),
            options,
            api,
            ready: false,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.conn.state()
    }

    pub fn track_text(&self) -> &str {
        self.poller.track_text()
    }

    /// One host tick at `now`; returns the string pushed to the widget.
    pub fn tick_at(&mut self, now: Instant, ui: &mut dyn Ui) -> Option<String> {
        if !self.ready {
            return None;
        }

        let Some(api) = self.api.as_deref() else {
            ui.set(ELEMENT_ID, CONNECTING);
            return Some(CONNECTING.to_string());
        };

        if !self.conn.is_connected() {
            self.conn
                .try_connect_at(now, api, &mut self.auth, self.options.auth_code());
            ui.set(ELEMENT_ID, CONNECTING);
            return Some(CONNECTING.to_string());
        }

        self.poller
            .poll_if_due_at(now, api, &mut self.auth, &mut self.conn);

        let frame = self
            .scroller
            .render_at(now, self.poller.track_text(), self.options.display_width);
        ui.set(ELEMENT_ID, &frame);
        Some(frame)
    }
}

impl Plugin for SpotifyPlugin {
    fn info(&self) -> PluginInfo {
        PLUGIN_INFO
    }

    fn on_loaded(&mut self) {
        if !self.options.enabled {
            info!("Plugin disabled, staying idle");
            return;
        }
        info!("Plugin loaded.");
        if !self.auth.load_persisted() && self.options.auth_code().is_none() {
            info!("No tokens and no auth code yet; waiting for configuration");
        }
        self.ready = true;
    }

    fn on_ui_setup(&mut self, ui: &mut dyn Ui) {
        ui.remove_element(ELEMENT_ID);
        ui.add_element(
            ELEMENT_ID,
            TextWidget {
                value: self.poller.track_text().to_string(),
                position: self.options.display_position,
                font: self.options.font,
                color: self.options.color,
            },
        );
    }

    fn on_ui_update(&mut self, ui: &mut dyn Ui) {
        self.tick_at(Instant::now(), ui);
    }

    fn on_unload(&mut self, ui: &mut dyn Ui) {
        if ui.remove_element(ELEMENT_ID) {
            info!("Plugin unloaded, widget removed");
        }
    }
}
