//! Note store.
//!
//! The store owns the canonical, insertion-ordered note sequence. The whole
//! sequence lives in a single slot of a [`SlotBackend`] and is rewritten in
//! full on every change. There is no locking: one writer per slot.

pub mod backend;
pub mod codec;
pub mod migrations;
pub mod schema;

use std::sync::Arc;

use tracing::{debug, info, warn};

pub use backend::{MemorySlots, SlotBackend, SqliteSlots};

use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::note::{Note, NoteId};

/// Ordered collection of notes persisted in one slot.
#[derive(Debug)]
pub struct Store<B: SlotBackend> {
    backend: B,
    ctx: Arc<AppContext>,
}

impl<B: SlotBackend> Store<B> {
    /// Create a store over `backend`, using the slot named by `ctx`.
    #[must_use]
    pub fn new(backend: B, ctx: Arc<AppContext>) -> Self {
        Self { backend, ctx }
    }

    /// The backend holding the slot.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The context this store was built with.
    #[must_use]
    pub fn context(&self) -> &Arc<AppContext> {
        &self.ctx
    }

    /// Read all notes, oldest first.
    ///
    /// An absent slot is an empty sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SlotCorrupt`] if the slot content cannot be decoded,
    /// or a backend error if the slot cannot be read.
    pub fn load(&self) -> Result<Vec<Note>> {
        let key = self.ctx.slot_key();
        match self.backend.get(key)? {
            None => Ok(Vec::new()),
            Some(raw) => codec::decode(key, &raw),
        }
    }

    /// Read all notes, treating unreadable content as no notes.
    #[must_use]
    pub fn load_lenient(&self) -> Vec<Note> {
        self.load().unwrap_or_else(|e| {
            warn!("Discarding unreadable notes: {}", e);
            Vec::new()
        })
    }

    /// Read all notes according to the configured corruption policy.
    ///
    /// # Errors
    ///
    /// Same as [`Store::load`], except corrupt content is not an error when
    /// `storage.discard_corrupt_slot` is set.
    pub fn load_with_policy(&self) -> Result<Vec<Note>> {
        match self.load() {
            Err(e) if e.is_corrupt_slot() && self.ctx.discard_corrupt_slot() => {
                warn!("Discarding unreadable notes: {}", e);
                Ok(Vec::new())
            }
            other => other,
        }
    }

    /// Allocate an id for a note created now.
    ///
    /// # Errors
    ///
    /// Returns an error if the current notes cannot be loaded.
    pub fn next_id(&self) -> Result<NoteId> {
        let last = self.load_with_policy()?.iter().map(|n| n.id).max();
        Ok(NoteId::allocate(self.ctx.now().timestamp_millis(), last))
    }

    /// Append a note and rewrite the slot.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateId`] if the id is already stored, or a
    /// load/write error.
    pub fn append(&mut self, note: Note) -> Result<()> {
        let mut notes = self.load_with_policy()?;
        if notes.iter().any(|n| n.id == note.id) {
            return Err(Error::DuplicateId(note.id));
        }

        let id = note.id;
        notes.push(note);
        self.write(&notes)?;

        info!("Saved note {} ({} total)", id, notes.len());
        Ok(())
    }

    /// Remove the note with `id` and return what remains, oldest first.
    ///
    /// Removing an id that is not stored leaves the slot untouched.
    ///
    /// # Errors
    ///
    /// Returns a load/write error.
    pub fn remove(&mut self, id: NoteId) -> Result<Vec<Note>> {
        let mut notes = self.load_with_policy()?;
        let before = notes.len();
        notes.retain(|n| n.id != id);

        if notes.len() == before {
            debug!("Note {} not stored, nothing to remove", id);
            return Ok(notes);
        }

        self.write(&notes)?;
        info!("Deleted note {} ({} remaining)", id, notes.len());
        Ok(notes)
    }

    /// Look up a single note.
    ///
    /// # Errors
    ///
    /// Returns a load error.
    pub fn get(&self, id: NoteId) -> Result<Option<Note>> {
        Ok(self.load_with_policy()?.into_iter().find(|n| n.id == id))
    }

    /// Number of stored notes.
    ///
    /// # Errors
    ///
    /// Returns a load error.
    pub fn count(&self) -> Result<usize> {
        Ok(self.load_with_policy()?.len())
    }

    /// Drop the slot entirely. Returns `true` if it existed.
    ///
    /// # Errors
    ///
    /// Returns a backend error.
    pub fn clear(&mut self) -> Result<bool> {
        let removed = self.backend.remove(self.ctx.slot_key())?;
        if removed {
            info!("Cleared slot '{}'", self.ctx.slot_key());
        }
        Ok(removed)
    }

    /// Summary of what is stored.
    ///
    /// # Errors
    ///
    /// Returns a load error.
    pub fn stats(&self) -> Result<StoreStats> {
        let slot_bytes = self
            .backend
            .get(self.ctx.slot_key())?
            .map_or(0, |raw| raw.len());
        let notes = self.load_with_policy()?;

        Ok(StoreStats {
            note_count: notes.len(),
            slot_bytes,
            oldest: notes.iter().map(|n| n.id).min(),
            newest: notes.iter().map(|n| n.id).max(),
            location: self.backend.location(),
        })
    }

    fn write(&mut self, notes: &[Note]) -> Result<()> {
        let raw = codec::encode(notes)?;
        self.backend.set(self.ctx.slot_key(), &raw)
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of notes stored.
    pub note_count: usize,
    /// Size of the serialized slot in bytes.
    pub slot_bytes: usize,
    /// Id of the oldest note.
    pub oldest: Option<NoteId>,
    /// Id of the newest note.
    pub newest: Option<NoteId>,
    /// Where the slot lives.
    pub location: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::FixedClock;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    fn ctx_at(millis: i64) -> Arc<AppContext> {
        crate::logging::init_test_logging();
        Arc::new(AppContext::with_clock(
            Config::default(),
            Arc::new(FixedClock::at_millis(millis)),
        ))
    }

    fn create_test_store() -> Store<MemorySlots> {
        Store::new(MemorySlots::new(), ctx_at(1_000))
    }

    fn note(id: i64) -> Note {
        Note::new(NoteId::new(id), PNG, format!("note {id}"), "10/18/2026")
    }

    #[test]
    fn test_load_absent_slot_is_empty() {
        let store = create_test_store();
        assert!(store.load().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_append_keeps_insertion_order() {
        let mut store = create_test_store();
        store.append(note(1)).unwrap();
        store.append(note(2)).unwrap();
        store.append(note(3)).unwrap();

        let ids: Vec<i64> = store.load().unwrap().iter().map(|n| n.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_append_rewrites_slot_as_json_array() {
        let mut store = create_test_store();
        store.append(note(1)).unwrap();

        let raw = store.backend().get("imageNotes").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value.as_array().map(Vec::len), Some(1));
        assert_eq!(value[0]["id"], 1);
    }

    #[test]
    fn test_append_duplicate_id() {
        let mut store = create_test_store();
        store.append(note(1)).unwrap();

        let err = store.append(note(1)).unwrap_err();
        assert!(matches!(err, Error::DuplicateId(id) if id == NoteId::new(1)));
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn test_remove_returns_remaining() {
        let mut store = create_test_store();
        store.append(note(1)).unwrap();
        store.append(note(2)).unwrap();

        let remaining = store.remove(NoteId::new(1)).unwrap();
        assert_eq!(remaining, vec![note(2)]);
        assert_eq!(store.load().unwrap(), vec![note(2)]);

        let remaining = store.remove(NoteId::new(2)).unwrap();
        assert!(remaining.is_empty());
    }

    #[test]
    fn test_remove_absent_id_leaves_slot_unchanged() {
        let mut store = create_test_store();
        store.append(note(1)).unwrap();
        let before = store.backend().get("imageNotes").unwrap();

        let remaining = store.remove(NoteId::new(42)).unwrap();
        assert_eq!(remaining, vec![note(1)]);
        assert_eq!(store.backend().get("imageNotes").unwrap(), before);
    }

    #[test]
    fn test_remove_from_empty_store_does_not_create_slot() {
        let mut store = create_test_store();
        assert!(store.remove(NoteId::new(1)).unwrap().is_empty());
        assert_eq!(store.backend().get("imageNotes").unwrap(), None);
    }

    #[test]
    fn test_next_id_follows_clock() {
        let store = create_test_store();
        assert_eq!(store.next_id().unwrap(), NoteId::new(1_000));
    }

    #[test]
    fn test_next_id_same_tick_is_unique() {
        let mut store = create_test_store();
        let first = store.next_id().unwrap();
        store.append(Note::new(first, PNG, "a", "d")).unwrap();
        let second = store.next_id().unwrap();

        assert!(second > first);
        store.append(Note::new(second, PNG, "b", "d")).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn test_load_corrupt_slot_is_error() {
        let store = Store::new(MemorySlots::with_slot("imageNotes", "garbage"), ctx_at(0));
        let err = store.load().unwrap_err();
        assert!(err.is_corrupt_slot());
        assert!(store.load_lenient().is_empty());
    }

    #[test]
    fn test_append_refuses_to_overwrite_corrupt_slot() {
        let mut store = Store::new(MemorySlots::with_slot("imageNotes", "garbage"), ctx_at(0));
        assert!(store.append(note(1)).is_err());
        assert_eq!(
            store.backend().get("imageNotes").unwrap().as_deref(),
            Some("garbage")
        );
    }

    #[test]
    fn test_untyped_payload_does_not_block_changes() {
        let legacy = r#"[{"id":1,"image":"data:application/octet-stream;base64,AAEC","description":"old","date":"d"}]"#;
        let mut store = Store::new(MemorySlots::with_slot("imageNotes", legacy), ctx_at(1_000));

        store.append(note(2)).unwrap();
        assert_eq!(store.count().unwrap(), 2);

        let remaining = store.remove(NoteId::new(2)).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].description, "old");
    }

    #[test]
    fn test_discard_corrupt_slot_policy() {
        let mut config = Config::default();
        config.storage.discard_corrupt_slot = true;
        let ctx = Arc::new(AppContext::with_clock(
            config,
            Arc::new(FixedClock::at_millis(0)),
        ));
        let mut store = Store::new(MemorySlots::with_slot("imageNotes", "garbage"), ctx);

        assert!(store.load_with_policy().unwrap().is_empty());
        store.append(note(1)).unwrap();
        assert_eq!(store.load().unwrap(), vec![note(1)]);
    }

    #[test]
    fn test_slot_key_from_context() {
        let mut config = Config::default();
        config.storage.slot_key = "otherNotes".to_string();
        let ctx = Arc::new(AppContext::new(config));
        let mut store = Store::new(MemorySlots::new(), ctx);

        store.append(note(1)).unwrap();
        assert!(store.backend().get("otherNotes").unwrap().is_some());
        assert!(store.backend().get("imageNotes").unwrap().is_none());
    }

    #[test]
    fn test_get() {
        let mut store = create_test_store();
        store.append(note(7)).unwrap();

        assert_eq!(store.get(NoteId::new(7)).unwrap(), Some(note(7)));
        assert_eq!(store.get(NoteId::new(8)).unwrap(), None);
    }

    #[test]
    fn test_clear() {
        let mut store = create_test_store();
        store.append(note(1)).unwrap();

        assert!(store.clear().unwrap());
        assert!(!store.clear().unwrap());
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_stats() {
        let mut store = create_test_store();
        let empty = store.stats().unwrap();
        assert_eq!(empty.note_count, 0);
        assert_eq!(empty.slot_bytes, 0);
        assert!(empty.oldest.is_none());

        store.append(note(5)).unwrap();
        store.append(note(9)).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.note_count, 2);
        assert!(stats.slot_bytes > 0);
        assert_eq!(stats.oldest, Some(NoteId::new(5)));
        assert_eq!(stats.newest, Some(NoteId::new(9)));
        assert_eq!(stats.location, ":memory:");
    }

    #[test]
    fn test_store_over_sqlite() {
        let backend = SqliteSlots::open_in_memory().unwrap();
        let mut store = Store::new(backend, ctx_at(0));
        store.append(note(1)).unwrap();
        store.append(note(2)).unwrap();
        store.remove(NoteId::new(1)).unwrap();

        assert_eq!(store.load().unwrap(), vec![note(2)]);
    }

    #[derive(Debug, Default)]
    struct ReadOnlySlots(MemorySlots);

    impl SlotBackend for ReadOnlySlots {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key)
        }

        fn set(&mut self, key: &str, _value: &str) -> Result<()> {
            Err(Error::SlotWrite {
                key: key.to_string(),
                message: "quota exceeded".to_string(),
            })
        }

        fn remove(&mut self, key: &str) -> Result<bool> {
            self.0.remove(key)
        }

        fn location(&self) -> String {
            "read-only".to_string()
        }
    }

    #[test]
    fn test_write_failure_is_surfaced() {
        let mut store = Store::new(ReadOnlySlots::default(), ctx_at(0));
        let err = store.append(note(1)).unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
        assert!(store.load().unwrap().is_empty());
    }
}
