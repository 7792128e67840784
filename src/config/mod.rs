//! Configuration for the dashboard
//!
//! Configuration is loaded in order of precedence:
//! 1. Command-line flags (applied by `main`)
//! 2. Environment variables
//! 3. Config file (~/.config/azstore/config.toml)
//! 4. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::pipeline::PipelineConfig;
use crate::tui::theme::ThemeKind;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod observability;
mod scroll;
mod serialization;
mod source;


pub use observability::{FileLogging, LogRotation, LoggingConfig};
pub use scroll::{FileScroll, ScrollConfig};
pub use source::{FileSource, SourceConfig};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Use the synthetic log source instead of Docker
    pub demo: bool,

    /// Show the welcome overlay on startup
    pub show_welcome: bool,

    /// UI tick interval in milliseconds
    pub tick_ms: u64,

    pub theme: ThemeKind,

    /// Where log lines come from
    pub source: SourceConfig,

    /// Scrollback and paging
    pub scroll: ScrollConfig,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            demo: false,
            show_welcome: true,
            tick_ms: 100,
            theme: ThemeKind::default(),
            source: SourceConfig::default(),
            scroll: ScrollConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure, every key optional
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub demo: Option<bool>,
    pub show_welcome: Option<bool>,
    pub tick_ms: Option<u64>,
    pub theme: Option<ThemeKind>,

    /// Optional [source] section
    pub source: Option<FileSource>,

    /// Optional [scroll] section
    pub scroll: Option<FileScroll>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/azstore/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("azstore").join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be read or parsed exits the
    /// process with a clear error instead of falling back to defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Invalid boolean values (use true/false)");
                    eprintln!("    - Unknown theme names (dark, light, mono)");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `azstore config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Self {
        Self::resolve(Self::load_file_config(), |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // Demo mode: env > file > default
        let demo = env("AZSTORE_DEMO")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .or(file.demo)
            .unwrap_or(defaults.demo);

        let show_welcome = file.show_welcome.unwrap_or(defaults.show_welcome);
        let tick_ms = file.tick_ms.filter(|ms| *ms > 0).unwrap_or(defaults.tick_ms);
        let theme = file.theme.unwrap_or(defaults.theme);

        let mut source = SourceConfig::from_file(file.source);
        if let Some(name) = env("AZSTORE_CONTAINER").filter(|v| !v.trim().is_empty()) {
            source.container_name = name.trim().to_string();
        }

        let mut scroll = ScrollConfig::from_file(file.scroll);
        if let Some(capacity) = env("AZSTORE_SCROLLBACK").and_then(|v| v.trim().parse().ok()) {
            scroll.capacity = capacity;
        }

        Self {
            demo,
            show_welcome,
            tick_ms,
            theme,
            source,
            scroll,
            logging: LoggingConfig::from_file(file.logging),
        }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    /// Settings handed to the log pipeline actor
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            capacity: self.scroll.capacity,
            channel_capacity: self.scroll.channel_capacity,
            page_step: self.scroll.page_step(),
            reattach_timeout: self.source.reattach_timeout(),
        }
    }
}
