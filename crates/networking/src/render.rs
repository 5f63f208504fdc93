//! Render backend client
//!
//! The schedule image is composited server-side. A request carries the room
//! number, the eight palette slots as a JSON `colorScheme`, the background key
//! and a cache-busting nonce, all as query parameters of a single GET:
//!
//! ```text
//! GET <endpoint>?room=276&colorScheme={"bg":{...},...}&bg=none&r=<nonce>
//! ```
//!
//! A 2xx response body is the JPEG image. Any other status is a failure with
//! no structured body.

use app_ui::{Background, Palette};
use reqwest::{Client as ReqwestClient, Url};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Render request errors
#[derive(Debug, Error)]
pub enum RenderError {
    /// Transport failure (connection refused, reset, timeout)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("Render backend returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// Endpoint could not be parsed as a URL
    #[error("Invalid render endpoint: {0}")]
    InvalidUrl(String),

    /// Palette could not be encoded
    #[error("Failed to encode color scheme: {0}")]
    Encode(#[from] serde_json::Error),
}

impl RenderError {
    /// HTTP status for [`RenderError::Status`]
    pub fn status(&self) -> Option<u16> {
        match self {
            RenderError::Status { status } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for render operations
pub type Result<T> = std::result::Result<T, RenderError>;

// =============================================================================
// Request Types
// =============================================================================

/// One render request
///
/// Built fresh per submit; the nonce keeps caches from serving an older image
/// for the same parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderRequest {
    /// Room number as typed
    pub room: String,
    /// Colors to render with
    pub palette: Palette,
    /// Background overlay
    pub background: Background,
    /// Cache-busting nonce
    pub nonce: String,
}

impl RenderRequest {
    /// Create a request with a fresh random nonce
    pub fn new(room: impl Into<String>, palette: Palette, background: Background) -> Self {
        Self {
            room: room.into(),
            palette,
            background,
            nonce: uuid::Uuid::new_v4().simple().to_string(),
        }
    }

    /// Replace the nonce
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = nonce.into();
        self
    }

    /// The `colorScheme` parameter: the eight slots as a JSON object
    ///
    /// The theme name is never included.
    pub fn color_scheme(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.palette)?)
    }

    /// Query parameters in wire order
    pub fn query_pairs(&self) -> Result<Vec<(&'static str, String)>> {
        Ok(vec![
            ("room", self.room.clone()),
            ("colorScheme", self.color_scheme()?),
            ("bg", self.background.key().to_string()),
            ("r", self.nonce.clone()),
        ])
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// Configuration for the render client
#[derive(Debug, Clone)]
pub struct RenderClientConfig {
    /// Render endpoint URL
    pub endpoint: String,
    /// Request timeout; `None` waits indefinitely
    pub timeout: Option<Duration>,
    /// User agent string
    pub user_agent: String,
    /// Headers sent with every request (ambient credentials)
    pub default_headers: HashMap<String, String>,
}

impl Default for RenderClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/render".to_string(),
            timeout: None,
            user_agent: format!("Schedule-Studio/{}", env!("CARGO_PKG_VERSION")),
            default_headers: HashMap::new(),
        }
    }
}

impl RenderClientConfig {
    /// Create a config for an endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Add a default header
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// Client
// =============================================================================

/// HTTP client for the render backend
#[derive(Debug, Clone)]
pub struct RenderClient {
    client: ReqwestClient,
    config: RenderClientConfig,
}

impl RenderClient {
    /// Create a new render client
    pub fn new(config: RenderClientConfig) -> Result<Self> {
        let mut builder = ReqwestClient::builder().user_agent(&config.user_agent);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }

    /// Get the client configuration
    pub fn config(&self) -> &RenderClientConfig {
        &self.config
    }

    /// Full URL for a request, with the query string encoded
    ///
    /// This is also the direct link handed to clients that cannot save a
    /// downloaded blob.
    pub fn request_url(&self, request: &RenderRequest) -> Result<Url> {
        let pairs = request.query_pairs()?;
        Url::parse_with_params(&self.config.endpoint, pairs)
            .map_err(|e| RenderError::InvalidUrl(format!("{}: {}", self.config.endpoint, e)))
    }

    /// Request a render and return the image bytes
    pub async fn fetch(&self, request: &RenderRequest) -> Result<Vec<u8>> {
        let url = self.request_url(request)?;
        tracing::debug!(room = %request.room, bg = request.background.key(), "Requesting render");

        let bytes = self.fetch_url(url).await?;
        tracing::debug!(room = %request.room, size = bytes.len(), "Render complete");
        Ok(bytes)
    }

    /// GET an already-built render URL with the configured headers
    ///
    /// Direct links are fetched through here so they carry the same
    /// credentials as the original request.
    pub async fn fetch_url(&self, url: Url) -> Result<Vec<u8>> {
        let mut req = self.client.get(url);
        for (key, value) in &self.config.default_headers {
            req = req.header(key, value);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Status { status: status.as_u16() });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

// =============================================================================
// Tests
// =============================================================================
