//! Configuration types for the bootstrap runner.

use std::path::PathBuf;

/// Identifier of the primary wiki in a default installation.
pub const DEFAULT_PRIMARY_WIKI: &str = "xwiki";

/// Top-level bootstrap configuration.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    /// Identifier of the primary (main) wiki.
    pub primary_wiki: String,
    /// Wikis to initialize, in order. Empty means the primary wiki only.
    pub wikis: Vec<String>,
    /// Where documents are loaded from and saved to.
    pub store: StoreConfig,
    /// Logging setup used by the binary.
    pub log: LogConfig,
}

impl BootstrapConfig {
    /// Wikis to initialize, falling back to the primary wiki.
    #[must_use]
    pub fn effective_wikis(&self) -> Vec<String> {
        if self.wikis.is_empty() {
            vec![self.primary_wiki.clone()]
        } else {
            self.wikis.clone()
        }
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            primary_wiki: DEFAULT_PRIMARY_WIKI.to_string(),
            wikis: Vec::new(),
            store: StoreConfig::default(),
            log: LogConfig::default(),
        }
    }
}

/// Document store selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StoreConfig {
    /// Documents live in memory and vanish on exit (dry run).
    #[default]
    Memory,
    /// One JSON file per document under the given root.
    Directory(PathBuf),
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Pretty,
            filter: "info".to_string(),
        }
    }
}
