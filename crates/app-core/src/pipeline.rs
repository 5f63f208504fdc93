//! Image request pipeline
//!
//! Turns the current room, palette and background into a render request,
//! fetches the image and hands it to a [`DeliveryTarget`]. The pipeline is
//! either idle or requesting; a submit while a request is in flight is
//! ignored, so rapid repeated submits produce exactly one network call.

use app_state::Notifier;
use app_ui::{Background, Palette};
use networking::{RenderClient, RenderError, RenderRequest};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use storage::LocalStore;
use thiserror::Error;

use crate::delivery::{image_filename, Delivery, DeliveryCapability, DeliveryError, DeliveryTarget};
use crate::room::RoomValidator;

/// Pipeline errors
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Room is not on the allow-list
    #[error("Invalid room: {0:?}")]
    InvalidRoom(String),

    /// Render request failed
    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    /// Image could not be delivered
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// What a submit did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Image delivered
    Delivered {
        /// Delivered filename, `<room>.jpg`
        filename: String,
        /// Whether it went out as a direct link
        via_link: bool,
    },
    /// Another request was in flight; nothing happened
    AlreadyRequesting,
}

/// Messages shown on the error channel
const MSG_INVALID_ROOM: &str = "Invalid room number";
const MSG_RENDER_FAILED: &str = "Could not create the image, please try again";

/// Idle/requesting flag, reset when dropped
struct RequestGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RequestGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RequestGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// The image request pipeline
pub struct ImagePipeline {
    client: RenderClient,
    validator: RoomValidator,
    local: LocalStore,
    notifier: Notifier,
    target: Arc<dyn DeliveryTarget>,
    capability: DeliveryCapability,
    requesting: AtomicBool,
}

impl ImagePipeline {
    /// Create a pipeline with the default allow-list and blob delivery
    pub fn new(
        client: RenderClient,
        local: LocalStore,
        notifier: Notifier,
        target: Arc<dyn DeliveryTarget>,
    ) -> Self {
        Self {
            client,
            validator: RoomValidator::default(),
            local,
            notifier,
            target,
            capability: DeliveryCapability::default(),
            requesting: AtomicBool::new(false),
        }
    }

    /// Use a custom allow-list
    pub fn with_validator(mut self, validator: RoomValidator) -> Self {
        self.validator = validator;
        self
    }

    /// Set the delivery capability of the current client
    pub fn with_capability(mut self, capability: DeliveryCapability) -> Self {
        self.capability = capability;
        self
    }

    /// Whether a request is in flight
    pub fn is_requesting(&self) -> bool {
        self.requesting.load(Ordering::Acquire)
    }

    /// Delivery capability in use
    pub fn capability(&self) -> DeliveryCapability {
        self.capability
    }

    /// Request and deliver the schedule image for a room
    pub async fn submit(
        &self,
        room: &str,
        palette: &Palette,
        background: Background,
    ) -> Result<SubmitOutcome> {
        let Some(_guard) = RequestGuard::acquire(&self.requesting) else {
            tracing::debug!(room, "Submit ignored; request already in flight");
            return Ok(SubmitOutcome::AlreadyRequesting);
        };

        if !self.validator.is_valid(room) {
            tracing::debug!(room, "Rejected invalid room");
            self.notifier.error(MSG_INVALID_ROOM);
            return Err(PipelineError::InvalidRoom(room.to_string()));
        }

        if let Err(e) = self.local.set_last_room(room) {
            tracing::warn!("Failed to remember room: {}", e);
        }

        let request = RenderRequest::new(room.trim(), *palette, background);
        let bytes = match self.client.fetch(&request).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(room, "Render request failed: {}", e);
                self.notifier.error(MSG_RENDER_FAILED);
                return Err(e.into());
            }
        };

        let filename = image_filename(room);
        let delivery = if self.capability.supports_blob_save {
            Delivery::Blob { bytes, filename: filename.clone() }
        } else {
            let url = self.client.request_url(&request)?;
            Delivery::Link { url, filename: filename.clone() }
        };
        let via_link = delivery.is_link();

        if let Err(e) = self.target.deliver(delivery).await {
            tracing::warn!(room, "Delivery failed: {}", e);
            self.notifier.error(MSG_RENDER_FAILED);
            return Err(e.into());
        }

        tracing::info!(room, %filename, via_link, "Delivered schedule image");
        Ok(SubmitOutcome::Delivered { filename, via_link })
    }
}
