//! Sequential latency measurement of query pairs against a SPARQL and a native endpoint.
//!
//! For every [`QueryPair`] the SPARQL form is sent `iterations` times to the SPARQL endpoint,
//! then the native form `iterations` times to the native endpoint. Requests never overlap and
//! are separated by a fixed delay. A failed request aborts the run, there are no retries.
use crate::query::Dialect;
use crate::stats;
use bytesize::ByteSize;
use fs_err as fs;
use log::{debug, info};
use std::fmt;
use std::io;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

pub mod endpoint;

pub use endpoint::{Endpoint, EndpointError, NativeEndpoint, SparqlEndpoint};

/// Which endpoint a sample was taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndpointKind {
    Sparql,
    Native,
}

impl fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EndpointKind::Sparql => "sparql",
            EndpointKind::Native => "native",
        })
    }
}

/// The same query in the native dialect and in SPARQL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPair {
    pub name: String,
    pub native: String,
    pub sparql: String,
}

impl QueryPair {
    pub fn new(name: impl Into<String>, native: impl Into<String>, sparql: impl Into<String>) -> Self {
        QueryPair { name: name.into(), native: native.into(), sparql: sparql.into() }
    }

    /// Read both forms from query files.
    pub fn load(name: impl Into<String>, native_path: &Path, sparql_path: &Path) -> io::Result<Self> {
        Ok(Self::new(name, fs::read_to_string(native_path)?, fs::read_to_string(sparql_path)?))
    }

    /// Pairs `depth_1..=depth_n` from directories filled by [`crate::query::write_queries`].
    pub fn load_depths(
        native_dir: &Path, native_dialect: Dialect, sparql_dir: &Path, depth: usize,
    ) -> io::Result<Vec<Self>> {
        (1..=depth)
            .map(|d| {
                Self::load(
                    format!("depth_{d}"),
                    &native_dir.join(native_dialect.file_name(d)),
                    &sparql_dir.join(Dialect::Sparql.file_name(d)),
                )
            })
            .collect()
    }
}

/// One timed request.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingSample {
    pub query: String,
    pub endpoint: EndpointKind,
    /// 1-based trial number.
    pub trial: usize,
    pub elapsed: Duration,
    /// Size of the response body.
    pub bytes: usize,
}

/// All trials of one query at one endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointSummary {
    /// Latency of each trial in seconds, in trial order.
    pub latencies: Vec<f64>,
    /// Mean latency in seconds after removing outliers.
    pub trimmed_mean: f64,
    /// Response size of the last trial.
    pub response_bytes: usize,
}

impl EndpointSummary {
    /// `None` if there are no samples.
    pub fn from_samples(samples: &[TimingSample]) -> Option<Self> {
        let latencies: Vec<f64> = samples.iter().map(|s| s.elapsed.as_secs_f64()).collect();
        Some(EndpointSummary {
            trimmed_mean: stats::trimmed_mean(&latencies)?,
            response_bytes: samples.last()?.bytes,
            latencies,
        })
    }
}

/// Comparison of both endpoints for one query pair.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateResult {
    pub query: String,
    pub sparql: EndpointSummary,
    pub native: EndpointSummary,
    /// `|native - sparql|` of the trimmed means, in seconds.
    pub difference: f64,
    /// [`Self::difference`] relative to the mean of both trimmed means, in percent.
    pub difference_pct: f64,
}

impl AggregateResult {
    pub fn new(query: impl Into<String>, sparql: EndpointSummary, native: EndpointSummary) -> Self {
        let difference = (native.trimmed_mean - sparql.trimmed_mean).abs();
        let mean = (native.trimmed_mean + sparql.trimmed_mean) / 2.0;
        let difference_pct = if mean > 0.0 { difference / mean * 100.0 } else { 0.0 };
        AggregateResult { query: query.into(), sparql, native, difference, difference_pct }
    }
}

/// How often and how fast to send requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Trials per query and endpoint.
    pub iterations: usize,
    /// Pause after each request.
    pub delay: Duration,
}

/// The error type for a benchmark run.
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("at least one iteration is required")]
    NoIterations,
    #[error("trial {trial} of query {query} at the {endpoint} endpoint failed")]
    Trial {
        query: String,
        endpoint: EndpointKind,
        trial: usize,
        #[source]
        source: EndpointError,
    },
}

/// Times query pairs against a SPARQL endpoint `S` and a native endpoint `N`.
#[derive(Debug)]
pub struct Runner<S, N> {
    sparql: S,
    native: N,
    options: RunOptions,
}

impl Runner<SparqlEndpoint, NativeEndpoint> {
    /// HTTP endpoints and options as configured.
    pub fn from_config(config: &crate::BenchConfig) -> Result<Self, EndpointError> {
        Ok(Runner::new(
            SparqlEndpoint::from_config(config)?,
            NativeEndpoint::from_config(config)?,
            config.run_options(),
        ))
    }
}

impl<S: Endpoint, N: Endpoint> Runner<S, N> {
    pub fn new(sparql: S, native: N, options: RunOptions) -> Self {
        Runner { sparql, native, options }
    }

    pub fn options(&self) -> RunOptions {
        self.options
    }

    /// Send one form of the pair `iterations` times, strictly one after the other.
    pub fn measure(&self, pair: &QueryPair, kind: EndpointKind) -> Result<Vec<TimingSample>, RunError> {
        let query = match kind {
            EndpointKind::Sparql => pair.sparql.as_str(),
            EndpointKind::Native => pair.native.as_str(),
        };
        let mut samples = Vec::with_capacity(self.options.iterations);
        for trial in 1..=self.options.iterations {
            let start = Instant::now();
            let response = match kind {
                EndpointKind::Sparql => self.sparql.execute(query),
                EndpointKind::Native => self.native.execute(query),
            };
            let bytes = response.map_err(|source| RunError::Trial {
                query: pair.name.clone(),
                endpoint: kind,
                trial,
                source,
            })?;
            let elapsed = start.elapsed();
            debug!("{} {kind} trial {trial}: {elapsed:.2?}, {}", pair.name, ByteSize(bytes as u64));
            samples.push(TimingSample { query: pair.name.clone(), endpoint: kind, trial, elapsed, bytes });
            if !self.options.delay.is_zero() {
                thread::sleep(self.options.delay);
            }
        }
        Ok(samples)
    }

    /// Time both forms of a pair, SPARQL first.
    pub fn run_pair(&self, pair: &QueryPair) -> Result<AggregateResult, RunError> {
        if self.options.iterations == 0 {
            return Err(RunError::NoIterations);
        }
        let sparql = self.measure(pair, EndpointKind::Sparql)?;
        let native = self.measure(pair, EndpointKind::Native)?;
        // measure returned exactly `iterations` samples, so neither side is empty
        let (Some(sparql), Some(native)) =
            (EndpointSummary::from_samples(&sparql), EndpointSummary::from_samples(&native))
        else {
            return Err(RunError::NoIterations);
        };
        let result = AggregateResult::new(pair.name.clone(), sparql, native);
        info!(
            "{}: sparql {:.4}s ({}), native {:.4}s ({}), difference {:.4}s ({:.1}%)",
            result.query,
            result.sparql.trimmed_mean,
            ByteSize(result.sparql.response_bytes as u64),
            result.native.trimmed_mean,
            ByteSize(result.native.response_bytes as u64),
            result.difference,
            result.difference_pct
        );
        Ok(result)
    }

    /// Time all pairs in order.
    pub fn run(&self, pairs: &[QueryPair]) -> Result<Vec<AggregateResult>, RunError> {
        info!(
            "timing {} query pairs, {} iterations each, {:?} between requests",
            pairs.len(),
            self.options.iterations,
            self.options.delay
        );
        pairs.iter().map(|pair| self.run_pair(pair)).collect()
    }
}
