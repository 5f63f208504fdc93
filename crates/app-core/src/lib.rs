//! Core application logic for Schedule Studio
//!
//! This crate validates room numbers, runs the image request pipeline and
//! delivers rendered schedule images to the user.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod delivery;
pub mod pipeline;
pub mod room;

pub use config::StudioConfig;
pub use delivery::{
    image_filename, is_in_app_browser, Delivery, DeliveryCapability, DeliveryError,
    DeliveryTarget, DirectoryTarget,
};
pub use pipeline::{ImagePipeline, PipelineError, SubmitOutcome};
pub use room::{default_rooms, is_valid_room, RoomInput, RoomValidator, MAX_ROOM_LEN};
