//! In-memory transports for tests

use crate::crawler::fetcher::{BodyStream, Transport};
use crate::{TransportError, TransportResult};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Serves fixed pages chunk by chunk; unknown URLs answer 404
#[derive(Debug, Default)]
pub struct MockTransport {
    pages: HashMap<String, Vec<String>>,
    fetches: AtomicUsize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, chunks: &[&str]) -> Self {
        self.pages.insert(
            url.to_string(),
            chunks.iter().map(|chunk| chunk.to_string()).collect(),
        );
        self
    }

    /// Number of fetches issued, including failed ones
    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn fetch(&self, url: &str) -> TransportResult<BodyStream> {
        self.fetches.fetch_add(1, Ordering::SeqCst);

        match self.pages.get(url) {
            Some(chunks) => {
                let chunks: Vec<TransportResult<Bytes>> = chunks
                    .iter()
                    .map(|chunk| Ok(Bytes::from(chunk.clone())))
                    .collect();
                Ok(stream::iter(chunks).boxed())
            }
            None => Err(TransportError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}

/// Opens a body that never delivers a chunk
#[derive(Debug, Default)]
pub struct HangingTransport;

#[async_trait]
impl Transport for HangingTransport {
    async fn fetch(&self, _url: &str) -> TransportResult<BodyStream> {
        Ok(stream::pending::<TransportResult<Bytes>>().boxed())
    }
}
