//! The rendered card list.

use crate::html;
use crate::note::{Note, NoteId};

/// Whether the list or the "no notes" placeholder is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayState {
    /// No cards; the placeholder is visible.
    Placeholder,
    /// At least one card; the placeholder is hidden.
    Notes,
}

/// One rendered note.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    id: NoteId,
    html: String,
}

impl Card {
    /// Render `note` as a card.
    #[must_use]
    pub fn render(note: &Note) -> Self {
        Self {
            id: note.id,
            html: html::render_card(note),
        }
    }

    /// Id of the note this card shows.
    #[must_use]
    pub fn id(&self) -> NoteId {
        self.id
    }

    /// The card markup.
    #[must_use]
    pub fn html(&self) -> &str {
        &self.html
    }
}

/// Cards in display order (newest first) plus the placeholder flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    cards: Vec<Card>,
    placeholder_visible: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            cards: Vec::new(),
            placeholder_visible: true,
        }
    }
}

impl Document {
    /// An empty document with the placeholder showing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card at the bottom.
    pub fn append(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Add a card at the top.
    pub fn prepend(&mut self, card: Card) {
        self.cards.insert(0, card);
    }

    /// Remove the card for `id`. Returns `true` if one was showing.
    pub fn remove(&mut self, id: NoteId) -> bool {
        match self.cards.iter().position(|c| c.id == id) {
            Some(index) => {
                self.cards.remove(index);
                true
            }
            None => false,
        }
    }

    /// Remove every card.
    pub fn clear(&mut self) {
        self.cards.clear();
    }

    /// Show the placeholder.
    pub fn show_placeholder(&mut self) {
        self.placeholder_visible = true;
    }

    /// Hide the placeholder.
    pub fn hide_placeholder(&mut self) {
        self.placeholder_visible = false;
    }

    /// Whether the placeholder is visible.
    #[must_use]
    pub fn is_placeholder_visible(&self) -> bool {
        self.placeholder_visible
    }

    /// Current display state.
    #[must_use]
    pub fn state(&self) -> DisplayState {
        if self.placeholder_visible {
            DisplayState::Placeholder
        } else {
            DisplayState::Notes
        }
    }

    /// Cards in display order.
    #[must_use]
    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Ids of the shown cards, top to bottom.
    #[must_use]
    pub fn card_ids(&self) -> Vec<NoteId> {
        self.cards.iter().map(Card::id).collect()
    }

    /// Number of cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether no cards are shown.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Markup for the whole list and the placeholder.
    #[must_use]
    pub fn to_html(&self, placeholder: &str) -> String {
        html::render_notes(
            self.cards.iter().map(Card::html),
            placeholder,
            self.placeholder_visible,
        )
    }
}
