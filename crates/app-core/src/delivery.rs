//! Image delivery
//!
//! A rendered schedule reaches the user one of two ways. Most clients get the
//! downloaded bytes handed over as a blob and saved as `<room>.jpg`. Embedded
//! in-app browsers cannot save blobs, so they get the render URL itself with
//! the suggested filename and fetch it on their own. Both paths yield the same
//! byte stream.

use async_trait::async_trait;
use image::ImageFormat;
use networking::{RenderClient, RenderError};
use regex::Regex;
use reqwest::Url;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

/// Delivery errors
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Filesystem failure while saving
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Filename would escape the output directory
    #[error("Invalid filename: {0:?}")]
    InvalidFilename(String),

    /// Fetching a direct link failed
    #[error("Failed to fetch image: {0}")]
    Fetch(#[from] RenderError),

    /// Background save task did not complete
    #[error("Save task failed: {0}")]
    Task(String),
}

/// Result type for delivery operations
pub type Result<T> = std::result::Result<T, DeliveryError>;

// =============================================================================
// Delivery Types
// =============================================================================

/// How a rendered image is handed to the user
#[derive(Debug, Clone, PartialEq)]
pub enum Delivery {
    /// Navigate to the render URL directly
    Link {
        /// Render URL, query string included
        url: Url,
        /// Suggested filename
        filename: String,
    },
    /// Save downloaded bytes
    Blob {
        /// Image bytes
        bytes: Vec<u8>,
        /// Filename to save under
        filename: String,
    },
}

impl Delivery {
    /// Filename the user ends up with
    pub fn filename(&self) -> &str {
        match self {
            Delivery::Link { filename, .. } | Delivery::Blob { filename, .. } => filename,
        }
    }

    /// Whether this is a direct-link delivery
    pub fn is_link(&self) -> bool {
        matches!(self, Delivery::Link { .. })
    }
}

/// Filename for a room's image
pub fn image_filename(room: &str) -> String {
    format!("{}.jpg", room.trim())
}

/// Something that can receive a rendered image
#[async_trait]
pub trait DeliveryTarget: Send + Sync {
    /// Hand the image over; returns once it is fully delivered
    async fn deliver(&self, delivery: Delivery) -> Result<()>;
}

// =============================================================================
// Capability Detection
// =============================================================================

/// What the current client can do with a downloaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryCapability {
    /// Whether downloaded bytes can be saved directly
    pub supports_blob_save: bool,
}

impl Default for DeliveryCapability {
    fn default() -> Self {
        Self { supports_blob_save: true }
    }
}

impl DeliveryCapability {
    /// Capability of a regular browser
    pub fn blob() -> Self {
        Self { supports_blob_save: true }
    }

    /// Capability of an embedded browser that needs a direct link
    pub fn link_only() -> Self {
        Self { supports_blob_save: false }
    }

    /// Derive the capability from a user-agent string
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self { supports_blob_save: !is_in_app_browser(user_agent) }
    }
}

/// Whether a user agent belongs to a known embedded in-app browser
///
/// Covers LINE, Facebook, Instagram, Messenger, WeChat, KakaoTalk, TikTok and
/// Twitter.
pub fn is_in_app_browser(user_agent: &str) -> bool {
    static IN_APP_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let re = IN_APP_REGEX.get_or_init(|| {
        Regex::new(
            r"(?i)\b(?:line/|fban|fbav|instagram|messenger|micromessenger|kakaotalk|tiktok|bytedancewebview|musical_ly|twitter)",
        )
        .ok()
    });
    re.as_ref().is_some_and(|re| re.is_match(user_agent))
}

// =============================================================================
// Directory Target
// =============================================================================

/// Delivers images into a local directory
///
/// Blobs are written to a temporary file in the directory and renamed into
/// place, so a failed save never leaves a partial `<room>.jpg` behind. Links
/// are fetched through the render client, with its headers and user agent, and
/// saved the same way.
#[derive(Debug, Clone)]
pub struct DirectoryTarget {
    dir: PathBuf,
    client: RenderClient,
}

impl DirectoryTarget {
    /// Create a target writing into `dir`, fetching links with `client`
    pub fn new(dir: impl Into<PathBuf>, client: RenderClient) -> Self {
        Self { dir: dir.into(), client }
    }

    /// Output directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where a filename ends up
    pub fn path_for(&self, filename: &str) -> Result<PathBuf> {
        let name = Path::new(filename);
        let is_plain = name.file_name().is_some_and(|f| f == name.as_os_str());
        if filename.is_empty() || !is_plain || filename.starts_with('.') {
            return Err(DeliveryError::InvalidFilename(filename.to_string()));
        }
        Ok(self.dir.join(name))
    }

    async fn save(&self, bytes: Vec<u8>, filename: &str) -> Result<PathBuf> {
        let path = self.path_for(filename)?;
        warn_if_not_jpeg(&bytes, filename);

        let dir = self.dir.clone();
        let target = path.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            std::fs::create_dir_all(&dir)?;
            let mut file = tempfile::NamedTempFile::new_in(&dir)?;
            file.write_all(&bytes)?;
            file.flush()?;
            // Dropping the temp file on error removes it
            file.persist(&target).map_err(|e| DeliveryError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| DeliveryError::Task(e.to_string()))??;

        Ok(path)
    }

    async fn fetch_link(&self, url: Url) -> Result<Vec<u8>> {
        Ok(self.client.fetch_url(url).await?)
    }
}

#[async_trait]
impl DeliveryTarget for DirectoryTarget {
    async fn deliver(&self, delivery: Delivery) -> Result<()> {
        let (bytes, filename) = match delivery {
            Delivery::Blob { bytes, filename } => (bytes, filename),
            Delivery::Link { url, filename } => (self.fetch_link(url).await?, filename),
        };

        let size = bytes.len();
        let path = self.save(bytes, &filename).await?;
        tracing::info!(path = %path.display(), size, "Saved schedule image");
        Ok(())
    }
}

fn warn_if_not_jpeg(bytes: &[u8], filename: &str) {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => {}
        Ok(format) => tracing::warn!(filename, ?format, "Render response is not a JPEG"),
        Err(_) => tracing::warn!(filename, size = bytes.len(), "Render response is not an image"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use networking::RenderClientConfig;

    fn directory_target(dir: &Path) -> DirectoryTarget {
        let client = RenderClient::new(RenderClientConfig::default()).unwrap();
        DirectoryTarget::new(dir, client)
    }

    const JPEG_MAGIC: [u8; 4] = [0xFF, 0xD8, 0xFF, 0xE0];

    #[test]
    fn test_in_app_browser_detection() {
        let in_app = [
            "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148 Line/13.1.0",
            "Mozilla/5.0 (iPhone) AppleWebKit/605.1.15 Mobile/15E148 [FBAN/FBIOS;FBAV/400.0.0]",
            "Mozilla/5.0 (Linux; Android 13) Chrome/116.0 Mobile Safari/537.36 Instagram 300.0.0",
            "Mozilla/5.0 (Linux; Android 12) Chrome/110.0 Mobile MicroMessenger/8.0.40",
            "Mozilla/5.0 (Linux; Android 12) KAKAOTALK 10.2.1",
            "Mozilla/5.0 (iPhone) Mobile/15E148 musical_ly_31.0.0 BytedanceWebview/d8a21c6",
            "Mozilla/5.0 (iPhone) Mobile/15E148 Twitter for iPhone/10.0",
        ];
        for ua in in_app {
            assert!(is_in_app_browser(ua), "{}", ua);
            assert!(!DeliveryCapability::from_user_agent(ua).supports_blob_save);
        }
    }

    #[test]
    fn test_regular_browsers_support_blob() {
        let regular = [
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36",
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_0) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
            "Mozilla/5.0 (X11; Linux x86_64; rv:120.0) Gecko/20100101 Firefox/120.0",
        ];
        for ua in regular {
            assert!(!is_in_app_browser(ua), "{}", ua);
            assert_eq!(DeliveryCapability::from_user_agent(ua), DeliveryCapability::blob());
        }
    }

    #[test]
    fn test_image_filename() {
        assert_eq!(image_filename("276"), "276.jpg");
        assert_eq!(image_filename(" 65 "), "65.jpg");
    }

    #[test]
    fn test_path_for_rejects_escapes() {
        let target = directory_target(Path::new("/tmp/out"));
        assert!(target.path_for("276.jpg").is_ok());
        assert!(matches!(target.path_for("../x.jpg"), Err(DeliveryError::InvalidFilename(_))));
        assert!(matches!(target.path_for("a/b.jpg"), Err(DeliveryError::InvalidFilename(_))));
        assert!(matches!(target.path_for(""), Err(DeliveryError::InvalidFilename(_))));
        assert!(matches!(target.path_for(".."), Err(DeliveryError::InvalidFilename(_))));
    }

    #[tokio::test]
    async fn test_blob_delivery_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let target = directory_target(dir.path());

        target
            .deliver(Delivery::Blob { bytes: JPEG_MAGIC.to_vec(), filename: "276.jpg".into() })
            .await
            .unwrap();

        let written = std::fs::read(dir.path().join("276.jpg")).unwrap();
        assert_eq!(written, JPEG_MAGIC);
        // Only the final file remains
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_blob_delivery_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let target = directory_target(dir.path());
        std::fs::write(dir.path().join("65.jpg"), b"old").unwrap();

        target
            .deliver(Delivery::Blob { bytes: JPEG_MAGIC.to_vec(), filename: "65.jpg".into() })
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.path().join("65.jpg")).unwrap(), JPEG_MAGIC);
    }

    #[tokio::test]
    async fn test_link_delivery_fetches_same_bytes() {
        use wiremock::matchers::{header, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/render"))
            .and(header("X-Session", "abc"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(JPEG_MAGIC.to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let client = RenderClient::new(
            RenderClientConfig::new(format!("{}/render", server.uri())).with_header("X-Session", "abc"),
        )
        .unwrap();
        let target = DirectoryTarget::new(dir.path(), client);
        let url = Url::parse(&format!("{}/render?room=70", server.uri())).unwrap();

        let delivery = Delivery::Link { url, filename: "70.jpg".into() };
        assert!(delivery.is_link());
        target.deliver(delivery).await.unwrap();

        assert_eq!(std::fs::read(dir.path().join("70.jpg")).unwrap(), JPEG_MAGIC);
    }

    #[tokio::test]
    async fn test_link_delivery_failure_leaves_nothing() {
        use wiremock::{matchers::method, Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let target = directory_target(dir.path());
        let url = Url::parse(&server.uri()).unwrap();

        let result = target.deliver(Delivery::Link { url, filename: "70.jpg".into() }).await;
        assert!(matches!(result, Err(DeliveryError::Fetch(ref e)) if e.status() == Some(404)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
