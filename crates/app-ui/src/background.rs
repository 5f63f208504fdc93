//! Decorative background overlays for the schedule card

use serde::{Deserialize, Serialize};

/// Decorative overlay composited behind the schedule
///
/// The wire keys are shared with the render backend and the preference store
/// and must not change (including the historical `ordaments` spelling).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Background {
    /// No overlay
    #[default]
    None,
    /// Christmas town ornaments
    Ordaments,
    /// Mistletoe garland
    Mistletoe,
    /// Sticker sheet
    Sticker,
}

impl Background {
    /// All variants in display order
    pub const ALL: [Background; 4] =
        [Background::None, Background::Ordaments, Background::Mistletoe, Background::Sticker];

    /// Wire key sent to the render backend
    pub fn key(&self) -> &'static str {
        match self {
            Background::None => "none",
            Background::Ordaments => "ordaments",
            Background::Mistletoe => "mistletoe",
            Background::Sticker => "sticker",
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Background::None => "None",
            Background::Ordaments => "Christmas Town",
            Background::Mistletoe => "Mistletoe",
            Background::Sticker => "Stickers",
        }
    }
}

impl std::fmt::Display for Background {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl std::str::FromStr for Background {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Background::ALL
            .into_iter()
            .find(|bg| bg.key() == s)
            .ok_or_else(|| format!("Unknown background: {}", s))
    }
}
