//! The note view.
//!
//! Keeps a [`Document`] of cards in sync with the [`Store`] and turns the two
//! user intents, submit and delete, into store calls. Cards are updated
//! incrementally after the store write succeeds; the store is never re-read
//! to refresh the list.

mod document;
mod form;
mod prompt;

use std::sync::Arc;

use tracing::{debug, info};

pub use document::{Card, DisplayState, Document};
pub use form::{DecodedSubmission, NoteForm, Submission};
pub use prompt::{AssumeYes, Prompter, ScriptedPrompter, TerminalPrompter};

use crate::context::AppContext;
use crate::error::{Error, Result};
use crate::html;
use crate::image::ImageDecoder;
use crate::note::{Note, NoteId};
use crate::storage::{SlotBackend, Store};

/// What happened to a delete intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined the confirmation.
    Cancelled,
    /// The note was removed.
    Deleted {
        /// Notes left in the store.
        remaining: usize,
    },
}

/// Renders the store and handles user intents.
#[derive(Debug)]
pub struct View<B: SlotBackend, P: Prompter> {
    store: Store<B>,
    prompter: P,
    document: Document,
    ctx: Arc<AppContext>,
}

impl<B: SlotBackend, P: Prompter> View<B, P> {
    /// Create a view over `store`. Nothing is rendered until
    /// [`View::initial_render`].
    pub fn new(store: Store<B>, prompter: P) -> Self {
        let ctx = Arc::clone(store.context());
        Self {
            store,
            prompter,
            document: Document::new(),
            ctx,
        }
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    /// The prompter.
    #[must_use]
    pub fn prompter(&self) -> &P {
        &self.prompter
    }

    /// The rendered cards.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Render every stored note, newest first, or the placeholder.
    ///
    /// # Errors
    ///
    /// Returns the store's load error.
    pub fn initial_render(&mut self) -> Result<()> {
        let notes = self.store.load_with_policy()?;
        self.document.clear();

        if notes.is_empty() {
            self.document.show_placeholder();
            debug!("No notes to render");
            return Ok(());
        }

        self.document.hide_placeholder();
        for note in notes.iter().rev() {
            self.document.append(Card::render(note));
        }
        debug!("Rendered {} notes", notes.len());
        Ok(())
    }

    /// Validate the form, alerting the user when it is incomplete.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`]; nothing is changed.
    pub fn prepare(&mut self, form: &NoteForm) -> Result<Submission> {
        form.prepare().map_err(|e| {
            self.prompter.alert(self.ctx.validation_text());
            e
        })
    }

    /// Finish a submission once its image decode has completed.
    ///
    /// On success the note is persisted, its card is put at the top, the
    /// placeholder is hidden and the form is cleared. On a decode failure the
    /// user is alerted and the form keeps its inputs.
    ///
    /// # Errors
    ///
    /// Returns the decode error, or a store error from persisting the note.
    pub fn complete(
        &mut self,
        decoded: Result<DecodedSubmission>,
        form: &mut NoteForm,
    ) -> Result<Note> {
        let decoded = decoded.map_err(|e| {
            self.prompter.alert(&format!("Could not add the image: {e}"));
            e
        })?;

        let id = self.store.next_id()?;
        let date = self.ctx.format_date(self.ctx.now());
        let note = Note::new(id, decoded.image.data_url, decoded.description, date);

        self.store.append(note.clone())?;
        self.document.prepend(Card::render(&note));
        self.document.hide_placeholder();
        form.reset();

        info!("Added note {}", note.id);
        Ok(note)
    }

    /// Handle a submit intent from start to finish.
    ///
    /// # Errors
    ///
    /// Returns a validation, decode or store error. Only a store error can
    /// occur after the user has been shown something other than an alert.
    pub async fn submit(&mut self, form: &mut NoteForm, decoder: &ImageDecoder) -> Result<Note> {
        let submission = self.prepare(form)?;
        let decoded = submission.decode(decoder).await;
        self.complete(decoded, form)
    }

    /// Handle a delete intent for the card showing `id`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoteNotFound`] if no such note is stored, or a store
    /// error. If the store write fails the card stays.
    pub fn delete(&mut self, id: NoteId) -> Result<DeleteOutcome> {
        if self.store.get(id)?.is_none() {
            return Err(Error::NoteNotFound(id));
        }

        if !self.prompter.confirm(self.ctx.confirm_delete_text()) {
            debug!("Delete of note {} cancelled", id);
            return Ok(DeleteOutcome::Cancelled);
        }

        let remaining = self.store.remove(id)?;
        self.document.remove(id);
        if remaining.is_empty() {
            self.document.show_placeholder();
        }

        Ok(DeleteOutcome::Deleted {
            remaining: remaining.len(),
        })
    }

    /// Markup for the card list and placeholder.
    #[must_use]
    pub fn render_html(&self) -> String {
        self.document.to_html(self.ctx.placeholder_text())
    }

    /// A complete standalone page with the form and the cards.
    #[must_use]
    pub fn render_page(&self) -> String {
        html::render_page(self.ctx.title(), &self.render_html())
    }
}
