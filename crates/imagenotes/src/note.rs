//! The note record and its identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Record schema version written by this build.
pub const NOTE_SCHEMA_VERSION: u32 = 1;

/// Version assumed for records persisted before the field existed.
const LEGACY_SCHEMA_VERSION: u32 = 1;

/// Unique note identifier.
///
/// Ids are milliseconds since the Unix epoch at creation time, bumped forward
/// when needed so that every id in a store is unique and strictly increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    /// Wrap a raw id.
    #[must_use]
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// The raw integer value.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Allocate an id for a note created at `now_millis`.
    ///
    /// Returns `now_millis` unless that would not sort after `last`, in which
    /// case `last + 1` is used. Two notes created in the same clock tick, or
    /// after the clock stepped backwards, still get distinct ordered ids.
    #[must_use]
    pub fn allocate(now_millis: i64, last: Option<NoteId>) -> Self {
        match last {
            Some(NoteId(last)) if now_millis <= last => Self(last.saturating_add(1)),
            _ => Self(now_millis),
        }
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for NoteId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A saved note: an embedded image plus its description.
///
/// Notes are never edited after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier, ordered by creation time.
    pub id: NoteId,

    /// The image as a self-contained `data:` URL.
    pub image: String,

    /// The user's description, stored verbatim (unescaped).
    pub description: String,

    /// Display date, formatted at creation time.
    pub date: String,

    /// Record schema version.
    #[serde(default = "legacy_version")]
    pub version: u32,
}

fn legacy_version() -> u32 {
    LEGACY_SCHEMA_VERSION
}

impl Note {
    /// Create a note at the current schema version.
    #[must_use]
    pub fn new(
        id: NoteId,
        image: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            id,
            image: image.into(),
            description: description.into(),
            date: date.into(),
            version: NOTE_SCHEMA_VERSION,
        }
    }

    /// MIME type of the embedded image, if the data URL declares one.
    #[must_use]
    pub fn image_mime(&self) -> Option<&str> {
        self.image
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(';'))
            .map(|(mime, _)| mime)
            .filter(|mime| !mime.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_uses_clock_when_ahead() {
        assert_eq!(NoteId::allocate(1_000, None), NoteId::new(1_000));
        assert_eq!(
            NoteId::allocate(1_000, Some(NoteId::new(999))),
            NoteId::new(1_000)
        );
    }

    #[test]
    fn test_allocate_same_tick_is_distinct() {
        let first = NoteId::allocate(1_000, None);
        let second = NoteId::allocate(1_000, Some(first));
        let third = NoteId::allocate(1_000, Some(second));
        assert_eq!(second, NoteId::new(1_001));
        assert_eq!(third, NoteId::new(1_002));
    }

    #[test]
    fn test_allocate_clock_went_backwards() {
        let id = NoteId::allocate(500, Some(NoteId::new(1_000)));
        assert_eq!(id, NoteId::new(1_001));
    }

    #[test]
    fn test_note_id_parse_and_display() {
        let id: NoteId = " 1700000000000 ".parse().unwrap();
        assert_eq!(id.get(), 1_700_000_000_000);
        assert_eq!(id.to_string(), "1700000000000");
        assert!("abc".parse::<NoteId>().is_err());
    }

    #[test]
    fn test_note_serializes_with_flat_id() {
        let note = Note::new(NoteId::new(42), "data:image/png;base64,AA==", "hi", "1/2/2026");
        let json = serde_json::to_value(&note).unwrap();
        assert_eq!(json["id"], 42);
        assert_eq!(json["version"], NOTE_SCHEMA_VERSION);
        assert_eq!(json["description"], "hi");
    }

    #[test]
    fn test_legacy_record_without_version() {
        let json = r#"{"id":1,"image":"data:image/png;base64,AA==","description":"x","date":"1/1/2024"}"#;
        let note: Note = serde_json::from_str(json).unwrap();
        assert_eq!(note.version, 1);
        assert_eq!(note.id, NoteId::new(1));
    }

    #[test]
    fn test_image_mime() {
        let note = Note::new(NoteId::new(1), "data:image/jpeg;base64,AA==", "x", "d");
        assert_eq!(note.image_mime(), Some("image/jpeg"));

        let broken = Note::new(NoteId::new(1), "photo.jpg", "x", "d");
        assert_eq!(broken.image_mime(), None);

        let untyped = Note::new(NoteId::new(1), "data:;base64,AA==", "x", "d");
        assert_eq!(untyped.image_mime(), None);
    }
}
