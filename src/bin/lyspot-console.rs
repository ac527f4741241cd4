/*
 *  bin/lyspot-console.rs
 *
 *  LySpot console host - bench testing tool
 *
 *  (c) 2020-26 Stuart Hunter
 *
 *  Drives the plugin lifecycle from a terminal, printing the widget text
 *  on every tick instead of drawing it on a panel.
 *
 *  Usage:
 *    cargo run --bin lyspot-console -- --config lyspot.yaml
 *    cargo run --bin lyspot-console -- --enable --auth-code <code> --ticks 60
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 */

use env_logger::Env;
use log::info;
use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use lyspot::config;
use lyspot::host::{Plugin, TextWidget, Ui};
use lyspot::plugin::SpotifyPlugin;

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

const DEFAULT_TICK_MS: u64 = 1000;

/// Single-line terminal "display".
#[derive(Default)]
struct ConsoleUi {
    element: Option<(String, TextWidget)>,
}

impl Ui for ConsoleUi {
    fn add_element(&mut self, id: &str, widget: TextWidget) {
        info!("element '{}' at {:?} ({:?}, {:?})", id, widget.position, widget.font, widget.color);
        self.element = Some((id.to_string(), widget));
    }

    fn remove_element(&mut self, id: &str) -> bool {
        if self.has_element(id) {
            self.element = None;
            true
        } else {
            false
        }
    }

    fn has_element(&self, id: &str) -> bool {
        self.element.as_ref().is_some_and(|(eid, _)| eid == id)
    }

    fn set(&mut self, id: &str, value: &str) {
        if let Some((eid, widget)) = self.element.as_mut() {
            if eid == id && widget.value != value {
                widget.value = value.to_string();
                print!("\r\x1b[2K[{value}]");
                let _ = io::stdout().flush();
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    let (cfg, cli) = config::load()?;

    if cli.dump_config {
        println!("{}", serde_yaml::to_string(&cfg)?);
        return Ok(());
    }

    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} v{} built {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), BUILD_DATE);

    let options = cfg.spotify_options();
    let tick = Duration::from_millis(cfg.tick_ms.unwrap_or(DEFAULT_TICK_MS));

    let mut plugin = SpotifyPlugin::new(options);
    let mut ui = ConsoleUi::default();

    let meta = plugin.info();
    info!("plugin {} {} by {} ({})", meta.name, meta.version, meta.author, meta.license);

    plugin.on_loaded();
    plugin.on_ui_setup(&mut ui);

    let mut ticks = 0u64;
    while cli.ticks.is_none_or(|limit| ticks < limit) {
        plugin.on_ui_update(&mut ui);
        ticks += 1;
        thread::sleep(tick);
    }

    println!();
    plugin.on_unload(&mut ui);
    info!("stopped after {ticks} ticks");
    Ok(())
}
