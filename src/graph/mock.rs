//! In-process stand-in for the Graph API used by unit tests

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Notify;

use super::client::{ByteStream, GraphApi};
use super::error::FetchError;

/// How a mocked download behaves
#[derive(Debug, Clone)]
pub enum MockBody {
    /// Whole body delivered in two chunks
    Complete(Vec<u8>),
    /// First chunk delivered, then the connection drops
    Truncated(Vec<u8>),
}

/// Pauses a request until the test releases it
pub struct Gate {
    pub path: String,
    pub started: Arc<Notify>,
    pub release: Arc<Notify>,
}

#[derive(Default)]
pub struct MockGraph {
    responses: HashMap<String, String>,
    bodies: HashMap<String, MockBody>,
    gate: Option<Gate>,
    calls: Mutex<Vec<String>>,
}

impl MockGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `path` (segments joined with `/`) with `body`; unknown paths
    /// fail with a transport error
    pub fn with_response(mut self, path: &str, body: &str) -> Self {
        self.responses.insert(path.to_string(), body.to_string());
        self
    }

    pub fn with_download(mut self, url: &str, body: MockBody) -> Self {
        self.bodies.insert(url.to_string(), body);
        self
    }

    /// Block requests for `path` until `release` is notified
    pub fn with_gate(mut self, path: &str) -> (Self, Arc<Notify>, Arc<Notify>) {
        let started = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        self.gate = Some(Gate {
            path: path.to_string(),
            started: started.clone(),
            release: release.clone(),
        });
        (self, started, release)
    }

    /// Every path or URL requested so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl GraphApi for MockGraph {
    async fn request(
        &self,
        path: &[&str],
        _params: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let path = path.join("/");
        self.calls.lock().push(path.clone());

        if let Some(gate) = self.gate.as_ref().filter(|g| g.path == path) {
            gate.started.notify_one();
            gate.release.notified().await;
        }

        self.responses
            .get(&path)
            .cloned()
            .ok_or_else(|| FetchError::Other(format!("no route to {}", path)))
    }

    async fn download(&self, url: &str) -> Result<ByteStream, FetchError> {
        self.calls.lock().push(url.to_string());

        let chunks: Vec<Result<Bytes, FetchError>> = match self.bodies.get(url) {
            Some(MockBody::Complete(data)) => {
                let (head, tail) = data.split_at(data.len() / 2);
                vec![Ok(Bytes::copy_from_slice(head)), Ok(Bytes::copy_from_slice(tail))]
            }
            Some(MockBody::Truncated(data)) => vec![
                Ok(Bytes::copy_from_slice(data)),
                Err(FetchError::Other("connection reset".into())),
            ],
            None => return Err(FetchError::Other(format!("no route to {}", url))),
        };

        Ok(stream::iter(chunks).boxed())
    }
}
