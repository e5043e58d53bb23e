//! Serialized form of the note sequence.
//!
//! The slot holds a JSON array of note objects in insertion order. Decoding
//! checks every record instead of trusting whatever is in the slot.
//!
//! Any base64 `data:` URL is accepted as a stored image, whatever its media
//! type: older slots hold untyped payloads. Only new submissions are required
//! to be images, and that is checked by the image decoder.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::note::{Note, NOTE_SCHEMA_VERSION};

fn data_url_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r"^data:(?:[A-Za-z0-9.+-]+/[A-Za-z0-9.+-]+)?(?:;[A-Za-z0-9.+_-]+=[A-Za-z0-9.+_-]+)*;base64,[A-Za-z0-9+/]*={0,2}$",
        )
            .expect("data URL pattern is valid")
    })
}

/// Whether `image` is a self-contained base64 `data:` URL.
#[must_use]
pub fn is_base64_data_url(image: &str) -> bool {
    data_url_pattern().is_match(image)
}

/// Serialize notes for the slot.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn encode(notes: &[Note]) -> Result<String> {
    Ok(serde_json::to_string(notes)?)
}

/// Parse and validate slot content.
///
/// # Errors
///
/// Returns [`Error::SlotCorrupt`] naming `key` if the content is not a JSON
/// array of valid, uniquely identified note records.
pub fn decode(key: &str, raw: &str) -> Result<Vec<Note>> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::slot_corrupt(key, e.to_string()))?;

    let Value::Array(records) = value else {
        return Err(Error::slot_corrupt(key, "expected a JSON array of notes"));
    };

    let mut seen = HashSet::with_capacity(records.len());
    let mut notes = Vec::with_capacity(records.len());

    for (index, record) in records.into_iter().enumerate() {
        let note: Note = serde_json::from_value(record)
            .map_err(|e| Error::slot_corrupt(key, format!("record {index}: {e}")))?;

        if note.version == 0 || note.version > NOTE_SCHEMA_VERSION {
            return Err(Error::slot_corrupt(
                key,
                format!(
                    "record {index}: unsupported schema version {} (supported up to {NOTE_SCHEMA_VERSION})",
                    note.version
                ),
            ));
        }

        if !is_base64_data_url(&note.image) {
            return Err(Error::slot_corrupt(
                key,
                format!("record {index}: image is not a base64 data URL"),
            ));
        }

        if !seen.insert(note.id) {
            return Err(Error::slot_corrupt(
                key,
                format!("record {index}: duplicate id {}", note.id),
            ));
        }

        notes.push(note);
    }

    Ok(notes)
}
