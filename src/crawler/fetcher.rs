//! HTTP fetcher implementation
//!
//! This module is the crawler's only contact with the network:
//! - The `Transport` trait, the seam crawl tasks fetch through
//! - Building the reqwest client (user agent, redirects, connect timeout)
//! - Cookie header assembly from the operator string
//! - Scheme checks and status classification

use crate::config::TransportConfig;
use crate::link::Scheme;
use crate::{TransportError, TransportResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};
use reqwest::header::COOKIE;
use reqwest::{redirect::Policy, Client};

/// Browser-like user agent sent when none is configured
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/537.11 (KHTML, like Gecko) Chrome/23.0.1271.95 Safari/537.11";

/// Maximum number of redirects followed for one fetch
pub const MAX_REDIRECTS: usize = 10;

/// Response body delivered chunk by chunk
pub type BodyStream = BoxStream<'static, TransportResult<Bytes>>;

/// Something that can open a body stream for an absolute URL
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a GET for `url` and returns its body
    ///
    /// # Returns
    ///
    /// * `Ok(BodyStream)` - The response was successful; chunks follow
    /// * `Err(TransportError)` - Malformed URL, connection failure or error status
    async fn fetch(&self, url: &str) -> TransportResult<BodyStream>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The transport configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use spoder::config::TransportConfig;
/// use spoder::crawler::build_http_client;
///
/// let client = build_http_client(&TransportConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &TransportConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(MAX_REDIRECTS))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Normalizes an operator cookie string into a Cookie header value
///
/// Pairs are split on `;`, trimmed, and rejoined with `"; "`. Returns `None`
/// when nothing remains.
///
/// # Example
///
/// ```
/// use spoder::crawler::cookie_header;
///
/// assert_eq!(cookie_header("a=1;  b=2;").as_deref(), Some("a=1; b=2"));
/// assert_eq!(cookie_header(" ; "), None);
/// ```
pub fn cookie_header(raw: &str) -> Option<String> {
    let pairs: Vec<&str> = raw
        .split(';')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();

    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

/// [`Transport`] over HTTP and HTTPS using reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    cookie: Option<String>,
}

impl HttpTransport {
    /// Creates a transport from configuration
    ///
    /// # Returns
    ///
    /// * `Ok(HttpTransport)` - Client built
    /// * `Err(TransportError::Client)` - reqwest rejected the client settings
    pub fn new(config: &TransportConfig) -> TransportResult<Self> {
        let client = build_http_client(config)?;
        let cookie = config.cookies.as_deref().and_then(cookie_header);

        Ok(Self { client, cookie })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> TransportResult<BodyStream> {
        let scheme =
            Scheme::of(url).ok_or_else(|| TransportError::MalformedUrl(url.to_string()))?;
        url::Url::parse(url)
            .map_err(|e| TransportError::MalformedUrl(format!("{} ({})", url, e)))?;

        tracing::debug!("GET {} ({})", url, scheme);

        let mut request = self.client.get(url);
        if let Some(cookie) = &self.cookie {
            request = request.header(COOKIE, cookie);
        }

        let response = request.send().await.map_err(|source| TransportError::Http {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(TransportError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let url = url.to_string();
        Ok(response
            .bytes_stream()
            .map_err(move |source| TransportError::Http {
                url: url.clone(),
                source,
            })
            .boxed())
    }
}
