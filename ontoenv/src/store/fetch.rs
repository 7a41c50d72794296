//! Network retrieval of remote ontology documents.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;

/// Raw bytes returned by a successful fetch.
#[derive(Debug, Clone)]
pub struct Fetched {
    /// Response body.
    pub bytes: Vec<u8>,
    /// Media type reported by the server, if any.
    pub content_type: Option<String>,
}

/// Why a fetch produced no document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The URI is not something this fetcher can dereference.
    #[error("{0} is not an http(s) URI")]
    UnsupportedScheme(String),

    /// The server answered with a non-success status.
    #[error("HTTP status {status} for {uri}")]
    Status {
        /// Requested URI.
        uri: String,
        /// Numeric status code.
        status: u16,
    },

    /// The request could not be sent or the body could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Network access is disabled for this environment.
    #[error("network access disabled; cannot fetch {0}")]
    Offline(String),
}

/// Something that can dereference a URI into document bytes.
pub trait Fetcher {
    /// Retrieves `uri`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the URI cannot be retrieved.
    fn fetch(&self, uri: &str) -> Result<Fetched, FetchError>;
}

const ACCEPT_RDF: &str =
    "text/turtle, application/rdf+xml;q=0.9, application/n-triples;q=0.8, */*;q=0.1";

/// Blocking HTTP(S) fetcher with content negotiation for RDF.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Builds a fetcher with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("ontoenv/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, uri: &str) -> Result<Fetched, FetchError> {
        if !(uri.starts_with("http://") || uri.starts_with("https://")) {
            return Err(FetchError::UnsupportedScheme(uri.to_string()));
        }
        let response = self.client.get(uri).header(ACCEPT, ACCEPT_RDF).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                uri: uri.to_string(),
                status: status.as_u16(),
            });
        }
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes()?.to_vec();
        Ok(Fetched {
            bytes,
            content_type,
        })
    }
}

/// A fetcher that refuses every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

impl Fetcher for OfflineFetcher {
    fn fetch(&self, uri: &str) -> Result<Fetched, FetchError> {
        Err(FetchError::Offline(uri.to_string()))
    }
}
