/*
 *  scroller.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Fixed-width marquee for the track line
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

use log::debug;
use std::iter;
use std::time::{Duration, Instant};

use crate::constants::NO_TRACK_PLAYING;

/// Scroll state for the one line of text
#[derive(Debug, Clone, Default)]
struct ScrollState {
    text: String,
    current_offset: usize,
    paused: bool,
    pause_started_at: Option<Instant>,
}

impl ScrollState {
    fn set_text(&mut self, text: &str) {
        // Only reset scroll state if text actually changed
        if self.text != text {
            self.text = text.to_string();
            self.reset();
        }
    }

    fn reset(&mut self) {
        self.current_offset = 0;
        self.paused = false;
        self.pause_started_at = None;
    }

    fn enter_pause(&mut self, now: Instant) {
        self.paused = true;
        self.pause_started_at = Some(now);
        self.current_offset = 0;
    }
}

/// Character-window marquee.
///
/// Each distinct text cycles through two phases: the scroll phase walks a
/// `width`-character window across the text padded with `width` blanks, and
/// the pause phase shows the whole text unchanged for `static_display`.
/// Windows are counted in chars, so the note glyph is one column.
#[derive(Debug, Clone)]
pub struct ScrollRenderer {
    state: ScrollState,
    scroll_speed: usize,
    static_display: Duration,
}

impl ScrollRenderer {
    pub fn new(scroll_speed: usize, static_display: Duration) -> Self {
        Self {
            state: ScrollState::default(),
            scroll_speed: scroll_speed.max(1),
            static_display,
        }
    }

    pub fn offset(&self) -> usize {
        self.state.current_offset
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn render(&mut self, text: &str, width: usize) -> String {
        self.render_at(Instant::now(), text, width)
    }

    pub fn render_at(&mut self, now: Instant, text: &str, width: usize) -> String {
        if text.is_empty() {
            return NO_TRACK_PLAYING.to_string();
        }
        self.state.set_text(text);

        if self.state.paused {
            let since = self
                .state
                .pause_started_at
                .map(|t| now.saturating_duration_since(t))
                .unwrap_or_default();
            if since > self.static_display {
                self.state.reset();
            } else {
                return text.to_string();
            }
        }

        let padded: Vec<char> = text.chars().chain(iter::repeat_n(' ', width)).collect();
        let offset = self.state.current_offset;

        if offset >= padded.len() - width {
            debug!("scroll cycle complete, holding full text");
            self.state.enter_pause(now);
            return text.to_string();
        }

        let end = (offset + width).min(padded.len());
        let mut window: String = padded[offset..end].iter().collect();
        let shown = end - offset;
        window.extend(iter::repeat_n(' ', width - shown));

        self.state.current_offset += self.scroll_speed;
        window
    }
}
