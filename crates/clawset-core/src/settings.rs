//! Runtime settings, resolved once at startup and passed down by reference.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::i18n::Locale;

/// Minimum log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse a level name, falling back to `Info` for anything unrecognised.
    pub fn parse_lenient(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }

    /// Directive understood by `tracing_subscriber::EnvFilter`.
    pub fn as_directive(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown log level: {}", other)),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_directive())
    }
}

/// Everything the tool needs to know about its environment.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Root of the OpenClaw configuration tree.
    pub config_dir: PathBuf,

    /// Minimum log level.
    pub log_level: LogLevel,

    /// Language for user-facing messages.
    pub locale: Locale,

    /// Program invoked to list the model catalog.
    pub openclaw_bin: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config_dir: Self::default_config_dir(),
            log_level: LogLevel::default(),
            locale: Locale::default(),
            openclaw_bin: "openclaw".to_string(),
        }
    }
}

impl Settings {
    /// Settings rooted at `config_dir`, everything else defaulted.
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            ..Default::default()
        }
    }

    /// `~/.openclaw`, or `./.openclaw` when no home directory is known.
    pub fn default_config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".openclaw")
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the main `openclaw.json` document.
    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("openclaw.json")
    }

    /// Path of the main agent's credential document.
    pub fn auth_profiles_path(&self) -> PathBuf {
        self.config_dir
            .join("agents")
            .join("main")
            .join("agent")
            .join("auth-profiles.json")
    }
}
