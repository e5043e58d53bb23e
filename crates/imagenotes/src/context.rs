//! The application context shared by the store and the view.
//!
//! Built once at startup from [`Config`]; holds the slot key, limits, display
//! texts and the clock used for ids and dates.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};

use crate::config::Config;

/// Source of the current time.
pub trait Clock: Send + Sync + fmt::Debug {
    /// The current local time.
    fn now(&self) -> DateTime<Local>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock stopped at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Local>);

impl FixedClock {
    /// Stop the clock at `millis` since the Unix epoch.
    ///
    /// # Panics
    ///
    /// Panics if `millis` is outside chrono's representable range.
    #[must_use]
    pub fn at_millis(millis: i64) -> Self {
        let instant = Local
            .timestamp_millis_opt(millis)
            .single()
            .expect("timestamp in range");
        Self(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Everything the store and view need to know about their environment.
#[derive(Debug, Clone)]
pub struct AppContext {
    config: Config,
    clock: Arc<dyn Clock>,
}

impl AppContext {
    /// Build a context running on the system clock.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a context with an explicit clock.
    #[must_use]
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// The configuration this context was built from.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Key of the slot holding the serialized notes.
    #[must_use]
    pub fn slot_key(&self) -> &str {
        &self.config.storage.slot_key
    }

    /// Whether unreadable slot content is treated as empty.
    #[must_use]
    pub fn discard_corrupt_slot(&self) -> bool {
        self.config.storage.discard_corrupt_slot
    }

    /// Largest image accepted, `None` when unlimited.
    #[must_use]
    pub fn max_image_bytes(&self) -> Option<u64> {
        self.config.max_image_bytes()
    }

    /// Whether `mime` may be embedded in a note.
    #[must_use]
    pub fn is_allowed_type(&self, mime: &str) -> bool {
        self.config
            .image
            .allowed_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime))
    }

    /// The current time.
    #[must_use]
    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    /// Format `instant` as a card date.
    #[must_use]
    pub fn format_date(&self, instant: DateTime<Local>) -> String {
        instant.format(&self.config.view.date_format).to_string()
    }

    /// Title of the rendered page.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.config.view.title
    }

    /// Text shown when there are no notes.
    #[must_use]
    pub fn placeholder_text(&self) -> &str {
        &self.config.view.placeholder
    }

    /// Question asked before deleting a note.
    #[must_use]
    pub fn confirm_delete_text(&self) -> &str {
        &self.config.view.confirm_delete
    }

    /// Alert shown when the form is incomplete.
    #[must_use]
    pub fn validation_text(&self) -> &str {
        &self.config.view.validation_message
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
