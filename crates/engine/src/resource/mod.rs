// ABOUTME: HTTP fetch capability used for page snapshots and terminal PDF downloads.
// ABOUTME: Maps 404 to ResourceAbsent, enforces a body size limit, and decodes text by charset.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::EngineError;
use crate::options::EngineOptions;

/// Maximum allowed content length (25 MB). Box-score and stats PDFs can be large.
pub const MAX_CONTENT_LENGTH: usize = 25 * 1024 * 1024;

/// Result of a successful fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub url: String,
    pub final_url: String,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl FetchResult {
    /// Decode the body as UTF-8 text, using charset hints from the content-type header.
    pub fn text(&self) -> String {
        decode_body(&self.body, self.content_type.as_deref())
    }
}

/// Retrieves a resource by URL.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET `url`. Only 2xx responses are returned; 404 is `ResourceAbsent`.
    async fn get(&self, url: &str) -> Result<FetchResult, EngineError>;
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct ReqwestFetcher {
    client: reqwest::Client,
}

impl ReqwestFetcher {
    pub fn new(opts: &EngineOptions) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .user_agent(&opts.user_agent)
            .timeout(opts.page_load_timeout)
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| {
                EngineError::config(
                    "http client",
                    format!("failed to build HTTP client: {}", e),
                )
            })?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for ReqwestFetcher {
    async fn get(&self, url: &str) -> Result<FetchResult, EngineError> {
        let parsed = url::Url::parse(url).map_err(|e| {
            EngineError::fetch(url, "Fetch", Some(anyhow::anyhow!("invalid URL: {}", e)))
        })?;
        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(EngineError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("scheme must be http or https")),
            ));
        }

        debug!(url, "fetching");
        let response = self.client.get(parsed).send().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::timeout(url, "Fetch", Some(e.into()))
            } else {
                EngineError::fetch(url, "Fetch", Some(anyhow::anyhow!("request failed: {}", e)))
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(EngineError::resource_absent(url, "Fetch"));
        }
        if !status.is_success() {
            return Err(EngineError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("HTTP status {}", status.as_u16())),
            ));
        }

        if let Some(len) = response.content_length() {
            if len as usize > MAX_CONTENT_LENGTH {
                return Err(EngineError::fetch(
                    url,
                    "Fetch",
                    Some(anyhow::anyhow!("content too large")),
                ));
            }
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_lowercase());

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                EngineError::timeout(url, "Fetch", Some(e.into()))
            } else {
                EngineError::fetch(
                    url,
                    "Fetch",
                    Some(anyhow::anyhow!("failed to read body: {}", e)),
                )
            }
        })?;

        if body.len() > MAX_CONTENT_LENGTH {
            return Err(EngineError::fetch(
                url,
                "Fetch",
                Some(anyhow::anyhow!("content too large")),
            ));
        }

        Ok(FetchResult {
            status: status.as_u16(),
            url: url.to_string(),
            final_url,
            content_type,
            body,
        })
    }
}

/// Decode body bytes to a String using charset from content-type header or detection.
pub fn decode_body(body: &[u8], content_type: Option<&str>) -> String {
    if let Some(ct) = content_type {
        if let Some(charset) = extract_charset(ct) {
            if let Some(encoding) = encoding_rs::Encoding::for_label(charset.as_bytes()) {
                let (decoded, _, _) = encoding.decode(body);
                return decoded.into_owned();
            }
        }
    }

    let mut detector = chardetng::EncodingDetector::new();
    detector.feed(body, true);
    let encoding = detector.guess(None, true);
    let (decoded, _, _) = encoding.decode(body);
    decoded.into_owned()
}

fn extract_charset(content_type: &str) -> Option<String> {
    let lower = content_type.to_lowercase();
    lower.split(';').find_map(|part| {
        part.trim()
            .strip_prefix("charset=")
            .map(|cs| cs.trim_matches('"').trim_matches('\'').to_string())
    })
}
