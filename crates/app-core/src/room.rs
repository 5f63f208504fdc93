//! Room number validation
//!
//! Rooms are typed free-form (at most three characters) and checked against a
//! closed allow-list of integers. Validation runs on every edit and again,
//! independently, when an image is requested.

use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Longest accepted room input
pub const MAX_ROOM_LEN: usize = 3;

/// Rooms accepted when no list is configured
const DEFAULT_ROOM_RANGES: [RangeInclusive<u16>; 6] =
    [65..=68, 70..=78, 171..=179, 271..=279, 371..=379, 471..=479];

/// Check a typed room against an allow-list
///
/// Unparseable input is simply invalid.
pub fn is_valid_room(input: &str, allow_list: &BTreeSet<u16>) -> bool {
    input.trim().parse::<u16>().is_ok_and(|room| allow_list.contains(&room))
}

/// The built-in allow-list
pub fn default_rooms() -> BTreeSet<u16> {
    DEFAULT_ROOM_RANGES.iter().cloned().flatten().collect()
}

/// Allow-list wrapper
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomValidator {
    rooms: BTreeSet<u16>,
}

impl Default for RoomValidator {
    fn default() -> Self {
        Self { rooms: default_rooms() }
    }
}

impl RoomValidator {
    /// Create a validator for a custom allow-list
    pub fn new(rooms: impl IntoIterator<Item = u16>) -> Self {
        Self { rooms: rooms.into_iter().collect() }
    }

    /// Check a typed room
    pub fn is_valid(&self, input: &str) -> bool {
        is_valid_room(input, &self.rooms)
    }

    /// Allowed rooms
    pub fn rooms(&self) -> &BTreeSet<u16> {
        &self.rooms
    }
}

/// The room text field
///
/// Holds the typed value and its validity, recomputed on every accepted edit.
#[derive(Debug, Clone)]
pub struct RoomInput {
    value: String,
    valid: bool,
    validator: RoomValidator,
}

impl RoomInput {
    /// Create an input pre-filled with `initial` (usually the last submitted room)
    ///
    /// An over-long initial value is discarded.
    pub fn new(validator: RoomValidator, initial: Option<&str>) -> Self {
        let mut input = Self { value: String::new(), valid: false, validator };
        if let Some(initial) = initial {
            input.set(initial);
        }
        input
    }

    /// Replace the value; edits longer than [`MAX_ROOM_LEN`] are rejected
    ///
    /// Returns whether the edit was accepted.
    pub fn set(&mut self, value: &str) -> bool {
        if value.chars().count() > MAX_ROOM_LEN {
            return false;
        }
        self.value = value.to_string();
        self.valid = self.validator.is_valid(&self.value);
        true
    }

    /// Current text
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Whether the current text is an allowed room
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The validator in use
    pub fn validator(&self) -> &RoomValidator {
        &self.validator
    }
}
