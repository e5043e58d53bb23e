//! Error types for imagenotes.
//!
//! Every fallible boundary in the crate (slot reads, slot writes, image
//! decoding, form validation, configuration) reports through the single
//! [`Error`] enum defined here.

use std::path::PathBuf;
use thiserror::Error;

use crate::note::NoteId;

/// The main error type for imagenotes operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Form Errors ===
    /// The submitted form is incomplete.
    #[error("invalid note: {reason}")]
    Validation {
        /// What is missing from the form.
        reason: String,
    },

    // === Image Errors ===
    /// The selected image file could not be read.
    #[error("failed to read image {path}: {source}")]
    ImageRead {
        /// Path of the image file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The selected file is not an image we can embed.
    #[error("cannot decode image {path}: {reason}")]
    ImageDecode {
        /// Path of the image file.
        path: PathBuf,
        /// Why the file was rejected.
        reason: String,
    },

    /// The selected image exceeds the configured size limit.
    #[error("image {path} is {size} bytes, larger than the {max} byte limit")]
    ImageTooLarge {
        /// Path of the image file.
        path: PathBuf,
        /// Size of the file in bytes.
        size: u64,
        /// Configured limit in bytes.
        max: u64,
    },

    // === Store Errors ===
    /// The persisted slot holds content that is not a valid note sequence.
    #[error("slot '{key}' is corrupt: {reason}")]
    SlotCorrupt {
        /// The slot key.
        key: String,
        /// What failed to decode.
        reason: String,
    },

    /// Writing the slot failed.
    #[error("failed to write slot '{key}': {message}")]
    SlotWrite {
        /// The slot key.
        key: String,
        /// Description of what went wrong.
        message: String,
    },

    /// A note with this id is already stored.
    #[error("a note with id {0} already exists")]
    DuplicateId(NoteId),

    /// No note with this id is stored.
    #[error("no note with id {0}")]
    NoteNotFound(NoteId),

    // === Database Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for imagenotes operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Create a new image decode error.
    #[must_use]
    pub fn image_decode(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::ImageDecode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a new corrupt slot error.
    #[must_use]
    pub fn slot_corrupt(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SlotCorrupt {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error is a form validation failure.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error came from reading or decoding an image.
    #[must_use]
    pub fn is_image_error(&self) -> bool {
        matches!(
            self,
            Self::ImageRead { .. } | Self::ImageDecode { .. } | Self::ImageTooLarge { .. }
        )
    }

    /// Check if this error indicates unreadable slot content.
    #[must_use]
    pub fn is_corrupt_slot(&self) -> bool {
        matches!(self, Self::SlotCorrupt { .. })
    }
}
