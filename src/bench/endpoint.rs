//! HTTP endpoints a query can be timed against.
use crate::config::BenchConfig;
use log::debug;
use reqwest::blocking::Client;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// The error type for a single request.
#[derive(thiserror::Error, Debug)]
pub enum EndpointError {
    #[error("invalid endpoint URL '{url}'")]
    Url {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
    #[error("HTTP request to {url} failed")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered with status {status}: {body}")]
    Status { url: String, status: u16, body: String },
}

/// Something a query can be sent to.
pub trait Endpoint {
    /// Send the query and read the complete response, returning the size of its body in bytes.
    fn execute(&self, query: &str) -> Result<usize, EndpointError>;
}

impl<F> Endpoint for F
where
    F: Fn(&str) -> Result<usize, EndpointError>,
{
    fn execute(&self, query: &str) -> Result<usize, EndpointError> {
        self(query)
    }
}

fn parse_url(url: &str) -> Result<Url, EndpointError> {
    Url::parse(url).map_err(|source| EndpointError::Url { url: url.to_owned(), source })
}

fn client(timeout: Duration) -> Result<Client, EndpointError> {
    Client::builder().timeout(timeout).build().map_err(EndpointError::Client)
}

// reads the whole body so that transfer time is part of the measurement
fn body_len(url: &Url, resp: reqwest::blocking::Response) -> Result<usize, EndpointError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().unwrap_or_default();
        return Err(EndpointError::Status { url: url.to_string(), status: status.as_u16(), body });
    }
    let bytes = resp.bytes().map_err(|source| EndpointError::Http { url: url.to_string(), source })?;
    Ok(bytes.len())
}

/// GraphQL endpoint of the service under test.
/// Queries are POSTed as `{"query": ..., "variables": {}}`.
#[derive(Debug, Clone)]
pub struct NativeEndpoint {
    client: Client,
    url: Url,
}

impl NativeEndpoint {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, EndpointError> {
        Ok(NativeEndpoint { client: client(timeout)?, url: parse_url(url)? })
    }

    pub fn from_config(config: &BenchConfig) -> Result<Self, EndpointError> {
        Self::new(&config.native_url, config.timeout())
    }

    /// JSON body sent for a query.
    pub fn request_body(query: &str) -> serde_json::Value {
        json!({ "query": query, "variables": {} })
    }
}

impl Endpoint for NativeEndpoint {
    fn execute(&self, query: &str) -> Result<usize, EndpointError> {
        debug!("POST {}", self.url);
        let resp = self
            .client
            .post(self.url.clone())
            .json(&Self::request_body(query))
            .send()
            .map_err(|source| EndpointError::Http { url: self.url.to_string(), source })?;
        body_len(&self.url, resp)
    }
}

/// SPARQL protocol endpoint, queried with GET and a form encoded `query` parameter.
#[derive(Debug, Clone)]
pub struct SparqlEndpoint {
    client: Client,
    url: Url,
    params: Vec<(String, String)>,
}

impl SparqlEndpoint {
    /// `params` are appended after the query, e.g. `format` or `timeout`.
    pub fn new(url: &str, timeout: Duration, params: Vec<(String, String)>) -> Result<Self, EndpointError> {
        Ok(SparqlEndpoint { client: client(timeout)?, url: parse_url(url)?, params })
    }

    pub fn from_config(config: &BenchConfig) -> Result<Self, EndpointError> {
        Self::new(&config.sparql_url, config.timeout(), config.sparql_params())
    }

    /// Full request URL for a query.
    pub fn request_url(&self, query: &str) -> Url {
        let mut url = self.url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("query", query);
            for (k, v) in &self.params {
                pairs.append_pair(k, v);
            }
        }
        url
    }
}

impl Endpoint for SparqlEndpoint {
    fn execute(&self, query: &str) -> Result<usize, EndpointError> {
        let url = self.request_url(query);
        debug!("GET {} ({} byte query)", self.url, query.len());
        let resp = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/sparql-results+json")
            .send()
            .map_err(|source| EndpointError::Http { url: self.url.to_string(), source })?;
        body_len(&self.url, resp)
    }
}
