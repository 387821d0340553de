//! Graph API HTTP client

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, StreamExt};
use reqwest::Client;
use tracing::debug;
use url::Url;

use super::error::FetchError;
use super::session::Session;

/// Default Graph API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://graph.facebook.com";

/// Chunked response body
pub type ByteStream = BoxStream<'static, Result<Bytes, FetchError>>;

/// The two calls the gallery needs from the social graph
///
/// `request` reads the Graph object under `path` and returns the raw JSON
/// body. Each element of `path` is one URL path segment, so an object id
/// is always passed as a single element. `download` opens an arbitrary URL
/// (image CDN) as a byte stream.
#[async_trait]
pub trait GraphApi: Send + Sync {
    async fn request(&self, path: &[&str], params: &[(&str, &str)])
    -> Result<String, FetchError>;

    async fn download(&self, url: &str) -> Result<ByteStream, FetchError>;
}

/// HTTP client for the Graph API
#[derive(Clone)]
pub struct GraphClient {
    endpoint: Url,
    session: Session,
    http_client: Client,
}

impl GraphClient {
    /// Create a new Graph client bound to a session
    pub fn new(endpoint: &str, session: Session) -> Result<Self> {
        let endpoint = format!("{}/", endpoint.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .with_context(|| format!("Invalid Graph endpoint {}", endpoint))?;

        let http_client = Client::builder()
            .user_agent(concat!("musicdash/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            endpoint,
            session,
            http_client,
        })
    }

    /// Build a request URL with the access token attached
    ///
    /// Segments are percent-encoded, so `/`, `?` and `#` inside an id never
    /// leave the endpoint or add query parameters.
    fn build_url(&self, path: &[&str], params: &[(&str, &str)]) -> Result<Url, FetchError> {
        if let Some(segment) = path.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(FetchError::InvalidPath(segment.to_string()));
        }

        let mut url = self.endpoint.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Other(format!("{} cannot be a base url", self.endpoint)))?
            .pop_if_empty()
            .extend(path);
        {
            let mut query = url.query_pairs_mut();
            for (key, value) in params {
                query.append_pair(key, value);
            }
            query.append_pair("access_token", self.session.access_token());
        }
        Ok(url)
    }
}

#[async_trait]
impl GraphApi for GraphClient {
    async fn request(
        &self,
        path: &[&str],
        params: &[(&str, &str)],
    ) -> Result<String, FetchError> {
        let url = self.build_url(path, params)?;
        debug!("Graph request: {}", url.path());

        let response = self.http_client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                url: url.path().to_string(),
            });
        }

        Ok(response.text().await?)
    }

    async fn download(&self, url: &str) -> Result<ByteStream, FetchError> {
        let url = Url::parse(url)?;
        debug!("Downloading {}", url);

        let response = self.http_client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                url: url.to_string(),
            });
        }

        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(FetchError::from))
            .boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> GraphClient {
        GraphClient::new(endpoint, Session::new("tok en", None)).unwrap()
    }

    #[test]
    fn test_build_url_appends_token() {
        let url = client(DEFAULT_ENDPOINT)
            .build_url(&["me", "music.listens"], &[])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://graph.facebook.com/me/music.listens?access_token=tok+en"
        );
    }

    #[test]
    fn test_build_url_with_params_and_trailing_slash() {
        let url = client("https://graph.example.com/v2/")
            .build_url(&["me"], &[("fields", "name,picture")])
            .unwrap();
        assert_eq!(url.path(), "/v2/me");
        let pairs: Vec<_> = url.query_pairs().collect();
        assert_eq!(pairs[0].0, "fields");
        assert_eq!(pairs[0].1, "name,picture");
        assert_eq!(pairs[1].0, "access_token");
    }

    #[test]
    fn test_object_id_stays_under_endpoint() {
        let client = client("https://graph.example.com/v2");

        let url = client.build_url(&["http://evil.example/steal"], &[]).unwrap();
        assert_eq!(url.host_str(), Some("graph.example.com"));
        assert_eq!(url.path(), "/v2/http:%2F%2Fevil.example%2Fsteal");

        let url = client.build_url(&["123?x=1#frag"], &[]).unwrap();
        assert_eq!(url.path_segments().unwrap().count(), 2);
        assert_eq!(url.fragment(), None);
        let keys: Vec<_> = url.query_pairs().map(|(k, _)| k.into_owned()).collect();
        assert_eq!(keys, vec!["access_token"]);
    }

    #[test]
    fn test_dot_segments_rejected() {
        let client = client(DEFAULT_ENDPOINT);
        for id in ["", ".", ".."] {
            assert!(matches!(
                client.build_url(&[id], &[]),
                Err(FetchError::InvalidPath(_))
            ));
        }
    }

    #[test]
    fn test_invalid_endpoint_rejected() {
        assert!(GraphClient::new("not a url", Session::new("t", None)).is_err());
    }
}
