//! HTML rendering.
//!
//! Every piece of user-supplied text goes through [`escape_html`] before it
//! reaches markup. Descriptions are stored verbatim and escaped only here.

use std::fmt::Write as _;

use crate::note::Note;

/// Escape text for use in element content or a quoted attribute value.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Markup for one note card.
#[must_use]
pub fn render_card(note: &Note) -> String {
    let id = note.id;
    format!(
        r#"<div class="note-card" data-id="{id}">
    <img src="{image}" alt="Note Image" class="note-image">
    <div class="note-content">
        <p class="note-date">{date}</p>
        <p class="note-description">{description}</p>
        <button type="button" class="btn-delete" data-action="delete" data-id="{id}">Delete Note</button>
    </div>
</div>"#,
        image = escape_html(&note.image),
        date = escape_html(&note.date),
        description = escape_html(&note.description),
    )
}

/// Markup for the card list followed by the "no notes" placeholder.
///
/// `cards` are already-rendered cards in display order.
#[must_use]
pub fn render_notes<'a>(
    cards: impl IntoIterator<Item = &'a str>,
    placeholder: &str,
    placeholder_visible: bool,
) -> String {
    let mut html = String::from("<div id=\"notesContainer\" class=\"notes-container\">\n");
    for card in cards {
        html.push_str(card);
        html.push('\n');
    }
    html.push_str("</div>\n");

    let class = if placeholder_visible {
        "no-notes"
    } else {
        "no-notes hidden"
    };
    let _ = writeln!(
        html,
        "<p id=\"noNotesMessage\" class=\"{class}\">{}</p>",
        escape_html(placeholder)
    );
    html
}

/// A complete standalone page: the note form and the rendered notes.
#[must_use]
pub fn render_page(title: &str, notes_html: &str) -> String {
    let title = escape_html(title);
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<style>.hidden {{ display: none; }}</style>
</head>
<body>
<h1>{title}</h1>
<form id="noteForm">
    <input type="file" id="imageInput" accept="image/*" required>
    <textarea id="descriptionInput" placeholder="Enter a description" required></textarea>
    <button type="submit">Save Note</button>
</form>
{notes_html}</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::note::NoteId;

    const PNG: &str = "data:image/png;base64,iVBORw0KGgo=";

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("plain"), "plain");
        assert_eq!(
            escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
        );
        assert_eq!(escape_html("héllo 世界"), "héllo 世界");
    }

    #[test]
    fn test_render_card_structure() {
        let note = Note::new(NoteId::new(42), PNG, "hello", "10/18/2026");
        let html = render_card(&note);

        assert!(html.starts_with(r#"<div class="note-card" data-id="42">"#));
        assert!(html.contains(&format!(r#"<img src="{PNG}""#)));
        assert!(html.contains(r#"<p class="note-date">10/18/2026</p>"#));
        assert!(html.contains(r#"<p class="note-description">hello</p>"#));
        assert!(html.contains("Delete Note"));
    }

    #[test]
    fn test_render_card_escapes_markup_in_description() {
        let hostile = r#"<img src=x onerror="alert(1)">"#;
        let note = Note::new(NoteId::new(1), PNG, hostile, "d");
        let html = render_card(&note);

        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;img src=x onerror=&quot;alert(1)&quot;&gt;"));
        // The record itself keeps the raw text.
        assert_eq!(note.description, hostile);
    }

    #[test]
    fn test_render_card_escapes_image_attribute() {
        let note = Note::new(NoteId::new(1), "data:image/png;base64,\"><script>", "x", "d");
        let html = render_card(&note);
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_render_notes_placeholder_visibility() {
        let shown = render_notes(std::iter::empty(), "No notes", true);
        assert!(shown.contains(r#"class="no-notes">No notes</p>"#));

        let hidden = render_notes(["<div>card</div>"], "No notes", false);
        assert!(hidden.contains(r#"class="no-notes hidden""#));
        assert!(hidden.contains("<div>card</div>"));
    }

    #[test]
    fn test_render_page() {
        let page = render_page("Notes <3", "<div id=\"notesContainer\"></div>\n");
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<title>Notes &lt;3</title>"));
        assert!(page.contains(r#"<form id="noteForm">"#));
        assert!(page.contains("notesContainer"));
        assert!(page.contains(".hidden { display: none; }"));
    }
}
