use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Claude Code usage and network monitor")]
pub struct Config {
    /// Enable debug mode
    #[arg(short, long, global = true)]
    pub debug: bool,

    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Polling interval in milliseconds
    #[arg(short = 'i', long, global = true)]
    pub poll_interval: Option<u64>,

    /// Skip ccusage and only monitor the network
    #[arg(long, global = true)]
    pub no_usage: bool,

    /// Disable desktop notifications
    #[arg(long, global = true)]
    pub no_notify: bool,

    /// Write logs to this file instead of the default location
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Subcommand
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Monitor network reachability only
    Net,
    /// Run a single poll cycle and print the snapshot as JSON
    Once,
}

impl Config {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Check if running in network-only mode
    pub fn is_network_only(&self) -> bool {
        self.no_usage || matches!(self.command, Some(Command::Net))
    }

    /// Check if running a single cycle
    pub fn is_once(&self) -> bool {
        matches!(self.command, Some(Command::Once))
    }
}

/// Application settings (from config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Polling interval in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// UI redraw interval in milliseconds
    #[serde(default = "default_ui_tick")]
    pub ui_tick_ms: u64,

    /// Network probe settings
    #[serde(default)]
    pub network: NetworkSettings,

    /// ccusage settings
    #[serde(default)]
    pub usage: UsageSettings,

    /// Desktop notification settings
    #[serde(default)]
    pub notifications: NotificationSettings,

    /// UI settings
    #[serde(default)]
    pub ui: UiSettings,
}

fn default_poll_interval() -> u64 {
    3000
}

fn default_ui_tick() -> u64 {
    100
}

/// Network probe settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSettings {
    /// Host to ping
    #[serde(default = "default_host")]
    pub host: String,

    /// URL for the HTTP check
    #[serde(default = "default_url")]
    pub url: String,

    /// Timeout for each probe in seconds
    #[serde(default = "default_network_timeout")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "google.com".to_string()
}

fn default_url() -> String {
    "https://www.google.com".to_string()
}

fn default_network_timeout() -> u64 {
    5
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            url: default_url(),
            timeout_secs: default_network_timeout(),
        }
    }
}

/// ccusage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageSettings {
    /// Run ccusage at all
    #[serde(default = "default_usage_enabled")]
    pub enabled: bool,

    /// npm package spec passed to npx
    #[serde(default = "default_package")]
    pub package: String,

    /// Explicit npx path (auto-detected when unset)
    #[serde(default)]
    pub npx_path: Option<PathBuf>,

    /// Timeout for each ccusage run in seconds
    #[serde(default = "default_usage_timeout")]
    pub timeout_secs: u64,

    /// Consecutive failures before ccusage is re-installed
    #[serde(default = "default_max_failures")]
    pub max_failures: u32,
}

fn default_usage_enabled() -> bool {
    true
}

fn default_package() -> String {
    "ccusage@latest".to_string()
}

fn default_usage_timeout() -> u64 {
    30
}

fn default_max_failures() -> u32 {
    3
}

impl Default for UsageSettings {
    fn default() -> Self {
        Self {
            enabled: default_usage_enabled(),
            package: default_package(),
            npx_path: None,
            timeout_secs: default_usage_timeout(),
            max_failures: default_max_failures(),
        }
    }
}

/// Desktop notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationSettings {
    /// Send desktop notifications on connectivity changes
    #[serde(default = "default_notify_enabled")]
    pub enabled: bool,

    /// Application name used in notification titles
    #[serde(default = "default_notify_title")]
    pub title: String,
}

fn default_notify_enabled() -> bool {
    true
}

fn default_notify_title() -> String {
    "ccmon".to_string()
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: default_notify_enabled(),
            title: default_notify_title(),
        }
    }
}

/// UI-related settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiSettings {
    /// Days shown in the cost history chart
    #[serde(default = "default_history_days")]
    pub history_days: usize,

    /// Show the cost history panel on startup
    #[serde(default = "default_show_history")]
    pub show_history: bool,
}

fn default_history_days() -> usize {
    7
}

fn default_show_history() -> bool {
    true
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            history_days: default_history_days(),
            show_history: default_show_history(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            ui_tick_ms: default_ui_tick(),
            network: NetworkSettings::default(),
            usage: UsageSettings::default(),
            notifications: NotificationSettings::default(),
            ui: UiSettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from config file or use defaults
    pub fn load(path: Option<&PathBuf>) -> Result<Self> {
        // Try custom path first
        if let Some(p) = path {
            if p.exists() {
                return Self::load_file(p);
            }
        }

        let default_paths = [
            dirs::config_dir().map(|p| p.join("ccmon/config.toml")),
            dirs::home_dir().map(|p| p.join(".config/ccmon/config.toml")),
            dirs::home_dir().map(|p| p.join(".ccmon.toml")),
        ];

        for path in default_paths.iter().flatten() {
            if path.exists() {
                return Self::load_file(path);
            }
        }

        Ok(Self::default())
    }

    fn load_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Merge CLI config into settings (CLI takes precedence)
    pub fn merge_cli(&mut self, cli: &Config) {
        if let Some(poll_interval) = cli.poll_interval {
            self.poll_interval_ms = poll_interval;
        }
        if cli.is_network_only() {
            self.usage.enabled = false;
        }
        if cli.no_notify {
            self.notifications.enabled = false;
        }
    }

    /// Validate and normalize settings values
    pub fn validate(&mut self) {
        const MIN_POLL_INTERVAL: u64 = 500;
        const MIN_UI_TICK: u64 = 16;

        self.poll_interval_ms = self.poll_interval_ms.max(MIN_POLL_INTERVAL);
        self.ui_tick_ms = self.ui_tick_ms.max(MIN_UI_TICK);
        self.network.timeout_secs = self.network.timeout_secs.max(1);
        self.usage.timeout_secs = self.usage.timeout_secs.max(1);
        self.usage.max_failures = self.usage.max_failures.max(1);
        self.ui.history_days = self.ui.history_days.max(1);
    }
}
