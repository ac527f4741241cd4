use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}, time::Duration};
use thiserror::Error;

use crate::constants::*;
use crate::host::{Color, Font};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level configuration file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub tick_ms: Option<u64>,          // console host update cadence
    pub spotify: Option<SpotifyConfig>,
}

/// Plugin options as supplied by the host, every field optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SpotifyConfig {
    pub enabled: Option<bool>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: Option<String>,
    pub scroll_speed: Option<usize>,
    pub check_interval: Option<u64>,   // seconds
    pub auth_code: Option<String>,
    pub retry_interval: Option<u64>,   // seconds
    pub token_file: Option<PathBuf>,
    pub display_position: Option<(i32, i32)>,
    pub display_width: Option<usize>,
    pub static_display_time: Option<u64>, // seconds
    pub font: Option<Font>,
    pub color: Option<Color>,
}

/// Resolved plugin options; absent values take the stock defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpotifyOptions {
    pub enabled: bool,
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub scroll_speed: usize,
    pub check_interval: u64,
    pub auth_code: Option<String>,
    pub retry_interval: u64,
    pub token_file: PathBuf,
    pub display_position: (i32, i32),
    pub display_width: usize,
    pub static_display_time: u64,
    pub font: Font,
    pub color: Color,
}

impl Default for SpotifyOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: DEFAULT_REDIRECT_URI.to_string(),
            scroll_speed: DEFAULT_SCROLL_SPEED,
            check_interval: DEFAULT_CHECK_INTERVAL_SECS,
            auth_code: None,
            retry_interval: DEFAULT_RETRY_INTERVAL_SECS,
            token_file: PathBuf::from(DEFAULT_TOKEN_FILE),
            display_position: DEFAULT_DISPLAY_POSITION,
            display_width: DEFAULT_DISPLAY_WIDTH,
            static_display_time: DEFAULT_STATIC_DISPLAY_SECS,
            font: Font::default(),
            color: Color::default(),
        }
    }
}

impl SpotifyOptions {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval)
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval)
    }

    pub fn static_display_time(&self) -> Duration {
        Duration::from_secs(self.static_display_time)
    }

    pub fn has_client_credentials(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }

    /// The auth code, if one is configured and non-blank.
    pub fn auth_code(&self) -> Option<&str> {
        self.auth_code.as_deref().map(str::trim).filter(|c| !c.is_empty())
    }
}

impl SpotifyConfig {
    pub fn resolve(&self) -> SpotifyOptions {
        let d = SpotifyOptions::default();
        SpotifyOptions {
            enabled: self.enabled.unwrap_or(d.enabled),
            client_id: self.client_id.clone().unwrap_or(d.client_id),
            client_secret: self.client_secret.clone().unwrap_or(d.client_secret),
            redirect_uri: self.redirect_uri.clone().unwrap_or(d.redirect_uri),
            scroll_speed: self.scroll_speed.unwrap_or(d.scroll_speed),
            check_interval: self.check_interval.unwrap_or(d.check_interval),
            auth_code: self.auth_code.clone().or(d.auth_code),
            retry_interval: self.retry_interval.unwrap_or(d.retry_interval),
            token_file: self.token_file.clone().unwrap_or(d.token_file),
            display_position: self.display_position.unwrap_or(d.display_position),
            display_width: self.display_width.unwrap_or(d.display_width),
            static_display_time: self.static_display_time.unwrap_or(d.static_display_time),
            font: self.font.unwrap_or(d.font),
            color: self.color.unwrap_or(d.color),
        }
    }
}

impl Config {
    pub fn spotify_options(&self) -> SpotifyOptions {
        self.spotify.as_ref().map(SpotifyConfig::resolve).unwrap_or_default()
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "lyspot-console", about = "LySpot bench host", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, short = 'c', value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub tick_ms: Option<u64>,
    /// One-time authorization code from the OAuth redirect
    #[arg(long)]
    pub auth_code: Option<String>,
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub token_file: Option<PathBuf>,
    #[arg(long)]
    pub display_width: Option<usize>,
    #[arg(long)]
    pub scroll_speed: Option<usize>,
    /// force the plugin on regardless of the config file
    #[arg(long, action = ArgAction::SetTrue)]
    pub enable: bool,
    /// stop after this many ticks (runs until killed otherwise)
    #[arg(long)]
    pub ticks: Option<u64>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Parse CLI, read YAML, merge, validate.
pub fn load() -> Result<(Config, Cli), ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;
    Ok((cfg, cli))
}

pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;

    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    if let Some(home) = home_dir() {
        let p = home.join(".config/lyspot/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/lyspot.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["lyspot.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

pub fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.tick_ms.is_some()        { dst.tick_ms = src.tick_ms; }
    match (&mut dst.spotify, src.spotify) {
        (None, Some(s)) => dst.spotify = Some(s),
        (Some(d), Some(s)) => merge_spotify(d, s),
        _ => {}
    }
}

fn merge_spotify(dst: &mut SpotifyConfig, src: SpotifyConfig) {
    if src.enabled.is_some()             { dst.enabled = src.enabled; }
    if src.client_id.is_some()           { dst.client_id = src.client_id; }
    if src.client_secret.is_some()       { dst.client_secret = src.client_secret; }
    if src.redirect_uri.is_some()        { dst.redirect_uri = src.redirect_uri; }
    if src.scroll_speed.is_some()        { dst.scroll_speed = src.scroll_speed; }
    if src.check_interval.is_some()      { dst.check_interval = src.check_interval; }
    if src.auth_code.is_some()           { dst.auth_code = src.auth_code; }
    if src.retry_interval.is_some()      { dst.retry_interval = src.retry_interval; }
    if src.token_file.is_some()          { dst.token_file = src.token_file; }
    if src.display_position.is_some()    { dst.display_position = src.display_position; }
    if src.display_width.is_some()       { dst.display_width = src.display_width; }
    if src.static_display_time.is_some() { dst.static_display_time = src.static_display_time; }
    if src.font.is_some()                { dst.font = src.font; }
    if src.color.is_some()               { dst.color = src.color; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.tick_ms.is_some()         { cfg.tick_ms = cli.tick_ms; }
    let any_spotify = cli.auth_code.is_some()
        || cli.token_file.is_some()
        || cli.display_width.is_some()
        || cli.scroll_speed.is_some()
        || cli.enable;

    if any_spotify && cfg.spotify.is_none() {
        cfg.spotify = Some(SpotifyConfig::default());
    }
    if let Some(spotify) = cfg.spotify.as_mut() {
        if cli.auth_code.is_some()      { spotify.auth_code = cli.auth_code.clone(); }
        if cli.token_file.is_some()     { spotify.token_file = cli.token_file.clone(); }
        if cli.display_width.is_some()  { spotify.display_width = cli.display_width; }
        if cli.scroll_speed.is_some()   { spotify.scroll_speed = cli.scroll_speed; }
        if cli.enable                   { spotify.enabled = Some(true); }
    }
}

/// Range checks only. Missing credentials are not an error: the plugin idles.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.tick_ms == Some(0) {
        return Err(ConfigError::Validation("tick_ms must be > 0".into()));
    }
    if let Some(spotify) = cfg.spotify.as_ref() {
        if spotify.display_width == Some(0) {
            return Err(ConfigError::Validation("spotify display_width must be > 0".into()));
        }
        if spotify.scroll_speed == Some(0) {
            return Err(ConfigError::Validation("spotify scroll_speed must be > 0".into()));
        }
        if spotify.check_interval == Some(0) {
            return Err(ConfigError::Validation("spotify check_interval must be > 0".into()));
        }
    }
    Ok(())
}
