/*
 *  config.rs
 *
 *  vuscape - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 *
 *  Configuration - YAML file layered under command line overrides
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 400;
pub const DEFAULT_ROTATE_DEG: u16 = 90;
pub const DEFAULT_FPS: u32 = 30;
pub const DEFAULT_SCREEN: &str = "nowplaying";
pub const DEFAULT_REDRAW_ALPHA: f32 = 0.1;

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

/// Top-level app configuration, every field optional so layers merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    pub log_level: Option<String>,     // e.g., "info" | "debug"
    pub display: Option<DisplayConfig>,
    /// screen to show, see `display::SCREEN_NAMES`
    pub screen: Option<String>,
    /// smoothing of the redraw percentage, 0 < alpha <= 1
    pub redraw_alpha: Option<f32>,
    /// stop after this many frames (runs forever when absent)
    pub frames: Option<u64>,
    /// log sibling overlaps after layout
    pub check_layout: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DisplayConfig {
    /// logical canvas width
    pub width: Option<u32>,
    /// logical canvas height
    pub height: Option<u32>,
    /// panel mounting relative to the canvas
    pub rotate_deg: Option<u16>,
    pub fps: Option<u32>,
}

/// Effective values after defaults are filled in
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub log_level: String,
    pub width: u32,
    pub height: u32,
    pub rotate_deg: u16,
    pub fps: u32,
    pub screen: String,
    pub redraw_alpha: f32,
    pub frames: Option<u64>,
    pub check_layout: bool,
}

impl Config {
    pub fn settings(&self) -> Settings {
        let display = self.display.clone().unwrap_or_default();
        Settings {
            log_level: self.log_level.clone().unwrap_or_else(|| "info".to_string()),
            width: display.width.unwrap_or(DEFAULT_WIDTH),
            height: display.height.unwrap_or(DEFAULT_HEIGHT),
            rotate_deg: display.rotate_deg.unwrap_or(DEFAULT_ROTATE_DEG),
            fps: display.fps.unwrap_or(DEFAULT_FPS),
            screen: self.screen.clone().unwrap_or_else(|| DEFAULT_SCREEN.to_string()),
            redraw_alpha: self.redraw_alpha.unwrap_or(DEFAULT_REDRAW_ALPHA),
            frames: self.frames,
            check_layout: self.check_layout.unwrap_or(false),
        }
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "vuscape", about = "vuscape audio dashboard", disable_help_flag = false)]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub log_level: Option<String>,
    #[arg(long)]
    pub display_width: Option<u32>,
    #[arg(long)]
    pub display_height: Option<u32>,
    #[arg(long)]
    pub display_rotate_deg: Option<u16>,
    #[arg(long)]
    pub fps: Option<u32>,
    /// screen to show
    #[arg(long, short = 's')]
    pub screen: Option<String>,
    #[arg(long)]
    pub redraw_alpha: Option<f32>,
    /// stop after N frames
    #[arg(long, short = 'n')]
    pub frames: Option<u64>,
    /// log sibling overlaps after layout
    #[arg(long, action = ArgAction::SetTrue)]
    pub check_layout: bool,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Everything `load` does except parsing argv and dumping
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
    // XDG-style: ~/.config/vuscape/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/vuscape/config.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["vuscape.yaml", "config.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
pub fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some()      { dst.log_level = src.log_level; }
    if src.screen.is_some()         { dst.screen = src.screen; }
    if src.redraw_alpha.is_some()   { dst.redraw_alpha = src.redraw_alpha; }
    if src.frames.is_some()         { dst.frames = src.frames; }
    if src.check_layout.is_some()   { dst.check_layout = src.check_layout; }
    // display
    match (&mut dst.display, src.display) {
        (None, Some(c)) => dst.display = Some(c),
        (Some(d), Some(s)) => merge_display(d, s),
        _ => {}
    }
}

fn merge_display(dst: &mut DisplayConfig, src: DisplayConfig) {
    if src.width.is_some()       { dst.width = src.width; }
    if src.height.is_some()      { dst.height = src.height; }
    if src.rotate_deg.is_some()  { dst.rotate_deg = src.rotate_deg; }
    if src.fps.is_some()         { dst.fps = src.fps; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some()       { cfg.log_level = cli.log_level.clone(); }
    if cli.screen.is_some()          { cfg.screen = cli.screen.clone(); }
    if cli.redraw_alpha.is_some()    { cfg.redraw_alpha = cli.redraw_alpha; }
    if cli.frames.is_some()          { cfg.frames = cli.frames; }
    if cli.check_layout              { cfg.check_layout = Some(true); }
    let any_case = cli.display_width.is_some()
        || cli.display_height.is_some()
        || cli.display_rotate_deg.is_some()
        || cli.fps.is_some();

    if any_case && cfg.display.is_none() {
        cfg.display = Some(DisplayConfig::default());
    }
    if let Some(display) = cfg.display.as_mut() {
        if cli.display_width.is_some()       { display.width = cli.display_width; }
        if cli.display_height.is_some()      { display.height = cli.display_height; }
        if cli.display_rotate_deg.is_some()  { display.rotate_deg = cli.display_rotate_deg; }
        if cli.fps.is_some()                 { display.fps = cli.fps; }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(display) = cfg.display.as_ref() {
        if display.width == Some(0) || display.height == Some(0) {
            return Err(ConfigError::Validation("display width/height must be > 0".into()));
        }
        if let Some(rot) = display.rotate_deg {
            match rot {
                0 | 90 | 180 | 270 => {},
                _ => return Err(ConfigError::Validation("display rotate_deg must be 0|90|180|270".into()))
            }
        }
        if let Some(fps) = display.fps {
            if fps == 0 || fps > 240 {
                return Err(ConfigError::Validation("display fps must be 1..=240".into()));
            }
        }
    }
    if let Some(alpha) = cfg.redraw_alpha {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(ConfigError::Validation("redraw_alpha must be in (0,1]".into()));
        }
    }
    if let Some(screen) = cfg.screen.as_deref() {
        if screen.trim().is_empty() {
            return Err(ConfigError::Validation("screen must not be empty".into()));
        }
    }
    Ok(())
}
