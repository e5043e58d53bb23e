//! `imagenotes` - Notes made of an image and a short description
//!
//! This library keeps an ordered list of image notes in a single persisted
//! slot and renders them as HTML cards. The [`View`] turns submit and delete
//! intents into [`Store`] updates and keeps the rendered cards in sync.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod html;
pub mod image;
pub mod logging;
pub mod note;
pub mod storage;
pub mod view;

pub use config::Config;
pub use context::{AppContext, Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use image::{DecodedImage, FsImageReader, ImageDecoder, ImageFile, ImageReader};
pub use logging::init_logging;
pub use note::{Note, NoteId};
pub use storage::{MemorySlots, SlotBackend, SqliteSlots, Store, StoreStats};
pub use view::{DeleteOutcome, NoteForm, Prompter, View};
