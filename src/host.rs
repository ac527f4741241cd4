/*
 *  host.rs
 *
 *  LySpot - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Host plugin contract and UI surface
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

//! The status-display host owns the screen, the fonts and the update
//! cadence. A plugin only gets lifecycle callbacks and a handle to a small
//! set of named text elements.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Host font choices for a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Font {
    Small,
    #[default]
    Medium,
    Bold,
    Huge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    #[default]
    Black,
    White,
}

/// Declarative text element: where, in what font, in what colour.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextWidget {
    pub value: String,
    pub position: (i32, i32),
    pub font: Font,
    pub color: Color,
}

/// The UI surface handed to plugins.
pub trait Ui {
    fn add_element(&mut self, id: &str, widget: TextWidget);

    /// Remove if present; returns whether anything was removed.
    fn remove_element(&mut self, id: &str) -> bool;

    fn has_element(&self, id: &str) -> bool;

    /// Update the text of an element. Unknown ids are ignored.
    fn set(&mut self, id: &str, value: &str);
}

/// Static plugin metadata reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    pub name: &'static str,
    pub author: &'static str,
    pub version: &'static str,
    pub license: &'static str,
    pub description: &'static str,
}

/// Lifecycle hooks the host calls, one at a time, at its own cadence.
/// None of them may fail: problems are logged and absorbed.
pub trait Plugin {
    fn info(&self) -> PluginInfo;

    fn on_loaded(&mut self) {}

    fn on_ui_setup(&mut self, _ui: &mut dyn Ui) {}

    /// The tick. Driven by the host's display refresh.
    fn on_ui_update(&mut self, _ui: &mut dyn Ui) {}

    fn on_unload(&mut self, _ui: &mut dyn Ui) {}
}

/// In-memory UI surface, for bench hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryUi {
    elements: BTreeMap<String, TextWidget>,
    /// Number of `set` calls that hit an element
    pub updates: usize,
}

impl MemoryUi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn element(&self, id: &str) -> Option<&TextWidget> {
        self.elements.get(id)
    }

    pub fn value(&self, id: &str) -> Option<&str> {
        self.elements.get(id).map(|w| w.value.as_str())
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Ui for MemoryUi {
    fn add_element(&mut self, id: &str, widget: TextWidget) {
        self.elements.insert(id.to_string(), widget);
    }

    fn remove_element(&mut self, id: &str) -> bool {
        self.elements.remove(id).is_some()
    }

    fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    fn set(&mut self, id: &str, value: &str) {
        if let Some(widget) = self.elements.get_mut(id) {
            widget.value = value.to_string();
            self.updates += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(value: &str) -> TextWidget {
        TextWidget {
            value: value.to_string(),
            position: (8, 90),
            font: Font::Medium,
            color: Color::Black,
        }
    }

    #[test]
    fn test_remove_if_present() {
        let mut ui = MemoryUi::new();
        assert!(!ui.remove_element("missing"));

        ui.add_element("a", widget("x"));
        assert!(ui.has_element("a"));
        assert!(ui.remove_element("a"));
        assert!(!ui.has_element("a"));
        assert!(ui.is_empty());
    }

    #[test]
    fn test_set_only_touches_known_elements() {
        let mut ui = MemoryUi::new();
        ui.set("ghost", "boo");
        assert_eq!(ui.updates, 0);
        assert!(ui.value("ghost").is_none());

        ui.add_element("a", widget("x"));
        ui.set("a", "y");
        assert_eq!(ui.value("a"), Some("y"));
        assert_eq!(ui.element("a").map(|w| w.position), Some((8, 90)));
        assert_eq!(ui.updates, 1);
    }

    #[test]
    fn test_font_and_color_names() {
        let font: Font = serde_yaml::from_str("bold").unwrap();
        assert_eq!(font, Font::Bold);
        let color: Color = serde_yaml::from_str("white").unwrap();
        assert_eq!(color, Color::White);
        assert_eq!(Font::default(), Font::Medium);
    }
}
