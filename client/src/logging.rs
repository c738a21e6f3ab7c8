//! Log setup for the claim CLI.
//!
//! `RUST_LOG` wins over the level picked from `-v` flags.

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    /// `-q`: warnings and errors only.
    Warn,
    /// Default: one line per claim attempt plus the batch summary.
    #[default]
    Info,
    /// Adds transaction and RPC progress.
    Debug,
    Trace,
}

impl LogLevel {
    /// `0` → `Info`, `1` → `Debug`, `2+` → `Trace`
    pub fn from_verbosity(count: u8) -> Self {
        match count {
            0 => Self::Info,
            1 => Self::Debug,
            _ => Self::Trace,
        }
    }

    /// `-q` overrides any `-v`.
    pub fn from_flags(verbosity: u8, quiet: bool) -> Self {
        if quiet {
            Self::Warn
        } else {
            Self::from_verbosity(verbosity)
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Installs the global subscriber; fails if one is already set.
pub fn try_init(level: LogLevel) -> Result<(), String> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| e.to_string())
}
