#![deny(unsafe_code)]
//! Evaluation harness for a GraphQL-over-RDF query service.
//!
//! The crate generates synthetic RDF fixtures, expands query templates of increasing depth
//! in several query dialects, times those queries against a native GraphQL endpoint and a
//! SPARQL endpoint and renders the comparison as CSV tables and SVG charts.
//!
//! # Example
//! ```no_run
//! use hgql_bench::query::{Dialect, Shape, expand};
//!
//! for (depth, query) in expand(Dialect::Sparql, Shape::Nested, 3).iter().enumerate() {
//!     println!("depth {}:\n{query}", depth + 1);
//! }
//! ```
/// Benchmark runner and HTTP endpoints.
pub mod bench;
/// Benchmark configuration.
pub mod config;
/// Synthetic RDF fixtures.
pub mod fixture;
/// Nested and flat query generation.
pub mod query;
/// CSV and SVG output.
pub mod report;
/// Descriptive statistics over latency samples.
pub mod stats;

pub use bench::{AggregateResult, EndpointKind, QueryPair, Runner, TimingSample};
pub use config::BenchConfig;
pub use query::{Dialect, QueryPlan, Shape};
