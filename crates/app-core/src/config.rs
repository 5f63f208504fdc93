//! Studio configuration
//!
//! Collects the settings of every layer in one place so the binary can map
//! command-line flags onto it.

use app_state::DEFAULT_NOTIFICATION_DURATION;
use app_ui::ContrastThresholds;
use networking::RenderClientConfig;
use std::path::PathBuf;
use std::time::Duration;
use storage::KvConfig;

use crate::room::RoomValidator;

/// Top-level configuration
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Render backend client settings
    pub render: RenderClientConfig,
    /// Local key-value store settings
    pub kv: KvConfig,
    /// Allowed rooms
    pub rooms: RoomValidator,
    /// Light/dark classification thresholds
    pub thresholds: ContrastThresholds,
    /// How long notifications stay visible
    pub notification_duration: Duration,
    /// Where delivered images are saved
    pub output_dir: PathBuf,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            render: RenderClientConfig::default(),
            kv: KvConfig::default(),
            rooms: RoomValidator::default(),
            thresholds: ContrastThresholds::default(),
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            output_dir: PathBuf::from("."),
        }
    }
}

impl StudioConfig {
    /// Create a config for a render endpoint
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            render: RenderClientConfig::new(endpoint),
            ..Default::default()
        }
    }

    /// Set the render client config
    pub fn with_render(mut self, render: RenderClientConfig) -> Self {
        self.render = render;
        self
    }

    /// Set the key-value store config
    pub fn with_kv(mut self, kv: KvConfig) -> Self {
        self.kv = kv;
        self
    }

    /// Restrict rooms to a custom list
    pub fn with_rooms(mut self, rooms: impl IntoIterator<Item = u16>) -> Self {
        self.rooms = RoomValidator::new(rooms);
        self
    }

    /// Set the contrast thresholds
    pub fn with_thresholds(mut self, thresholds: ContrastThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Set the notification duration
    pub fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    /// Set the output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }
}
