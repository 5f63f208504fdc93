//! Networking for Schedule Studio
//!
//! This crate provides the HTTP client for the server-side schedule
//! renderer: request encoding, the configured reqwest client and
//! status handling.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod render;

pub use render::{RenderClient, RenderClientConfig, RenderError, RenderRequest};
