use std::env;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response, header};
use url::Url;

use crate::error::{Error, Result};
use crate::types::ChatRequest;

/// Environment variable holding the endpoint's base URL.
pub const API_URL_ENV: &str = "CUSTODIAN_API_URL";

/// Path of the chat endpoint relative to the base URL.
const CHAT_PATH: &str = "api/chat";

/// Raw response body, chunk by chunk, as the transport delivers it.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Something that can carry a chat request and stream back its reply.
#[async_trait::async_trait]
pub trait ChatBackend: Send + Sync {
    /// Send `request` and return the response body once headers arrive.
    ///
    /// Non-success statuses are errors; the body of a successful response is
    /// returned unparsed.
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream>;
}

/// HTTP client for the chat endpoint.
///
/// No request timeout is configured: a reply may stream for as long as the
/// endpoint keeps the connection open.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: ReqwestClient,
    base_url: Option<String>,
}

impl ChatClient {
    /// Create a new client.
    ///
    /// The base URL can be provided directly or read from the
    /// `CUSTODIAN_API_URL` environment variable.  It is not checked here; a
    /// missing or malformed value surfaces when a request is attempted.
    pub fn new(base_url: Option<String>) -> Result<Self> {
        let base_url = base_url.or_else(|| env::var(API_URL_ENV).ok());
        let client = ReqwestClient::builder().build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {}", e),
                Some(Box::new(e)),
            )
        })?;
        Ok(Self { client, base_url })
    }

    /// The configured base URL, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// The absolute URL of the chat endpoint.
    pub fn endpoint(&self) -> Result<Url> {
        let base = self.base_url.as_deref().ok_or_else(|| {
            Error::validation(
                format!("no base URL configured; set {API_URL_ENV}"),
                Some("api_url".to_string()),
            )
        })?;
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(base.join(CHAT_PATH)?)
    }

    /// Create and return default headers for chat requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        headers
    }

    /// Convert a non-success response into an error carrying its body.
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();
        match response.text().await {
            Ok(body) => Error::api(status_code, body),
            Err(e) => Error::api(status_code, format!("unreadable error body: {e}")),
        }
    }
}

#[async_trait::async_trait]
impl ChatBackend for ChatClient {
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream> {
        let url = self.endpoint()?;

        let response = self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    Error::connection(format!("Connection error: {}", e), Some(Box::new(e)))
                } else {
                    Error::http_client(format!("Request failed: {}", e), Some(Box::new(e)))
                }
            })?;

        if !response.status().is_success() {
            return Err(Self::process_error_response(response).await);
        }

        let stream = response.bytes_stream().map(|result| {
            result.map_err(|e| {
                Error::streaming(format!("Error in HTTP stream: {}", e), Some(Box::new(e)))
            })
        });
        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_from_base() {
        let client = ChatClient::new(Some("https://example.com".to_string())).unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "https://example.com/api/chat"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_and_prefix() {
        let client = ChatClient::new(Some("https://example.com/".to_string())).unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "https://example.com/api/chat"
        );

        let client = ChatClient::new(Some("http://localhost:8080/proxy".to_string())).unwrap();
        assert_eq!(
            client.endpoint().unwrap().as_str(),
            "http://localhost:8080/proxy/api/chat"
        );
    }

    #[test]
    fn malformed_base_fails_at_request_time() {
        let client = ChatClient::new(Some("not a url".to_string())).unwrap();
        assert_eq!(client.base_url(), Some("not a url"));
        let err = client.endpoint().unwrap_err();
        assert!(err.is_transport());
    }
}
