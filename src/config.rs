//! Settings of a benchmark run.
//!
//! Every field has a default, so a JSON file only needs the keys that differ:
//! ```json
//! { "native_url": "http://localhost:8098/graphql", "iterations": 20, "delay_ms": 500 }
//! ```
use crate::bench::RunOptions;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Endpoints, repetitions and pacing of a benchmark run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BenchConfig {
    /// GraphQL endpoint of the service under test, queried with POST.
    pub native_url: String,
    /// SPARQL endpoint, queried with GET.
    pub sparql_url: String,
    /// Trials per query and endpoint.
    pub iterations: usize,
    /// Pause after each request in milliseconds.
    pub delay_ms: u64,
    /// Client side timeout of a single request in seconds.
    pub timeout_secs: u64,
    /// Server side execution limit passed to the SPARQL endpoint as `timeout`, in milliseconds.
    pub sparql_timeout_ms: u64,
    /// Whether to pass `debug=on` to the SPARQL endpoint.
    pub sparql_debug: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            native_url: "http://localhost:8098/graphql".to_owned(),
            sparql_url: "http://localhost:3330/dataset/sparql".to_owned(),
            iterations: 10,
            delay_ms: 1000,
            timeout_secs: 60,
            sparql_timeout_ms: 30000,
            sparql_debug: true,
        }
    }
}

/// The error type for loading a [`BenchConfig`].
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read benchmark configuration")]
    Io(#[from] std::io::Error),
    #[error("invalid benchmark configuration JSON")]
    Json(#[from] serde_json::Error),
    #[error("invalid benchmark configuration: {0}")]
    Invalid(String),
}

impl BenchConfig {
    /// Load from a JSON file, missing keys keep their defaults.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        let config: BenchConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings a run cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.iterations == 0 {
            return Err(ConfigError::Invalid("iterations must be at least 1".to_owned()));
        }
        for (name, url) in [("native_url", &self.native_url), ("sparql_url", &self.sparql_url)] {
            url::Url::parse(url).map_err(|e| ConfigError::Invalid(format!("{name} '{url}': {e}")))?;
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Fixed query string parameters sent along with every SPARQL query.
    pub fn sparql_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("format".to_owned(), "application/sparql-results+json".to_owned()),
            ("timeout".to_owned(), self.sparql_timeout_ms.to_string()),
        ];
        if self.sparql_debug {
            params.push(("debug".to_owned(), "on".to_owned()));
        }
        params
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions { iterations: self.iterations, delay: self.delay() }
    }
}
