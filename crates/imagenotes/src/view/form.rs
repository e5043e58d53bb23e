//! The note form and the stages of a submission.
//!
//! A submission runs in three steps so that other intents can be handled
//! while the image is being decoded:
//! 1. [`NoteForm::prepare`] validates the inputs (synchronous).
//! 2. [`Submission::decode`] reads the image (asynchronous, borrows nothing).
//! 3. [`super::View::complete`] persists the note and updates the cards.

use crate::error::{Error, Result};
use crate::image::{DecodedImage, ImageDecoder, ImageFile};

/// The two inputs of the note form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteForm {
    image: Option<ImageFile>,
    description: String,
}

impl NoteForm {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A form filled with both inputs.
    #[must_use]
    pub fn filled(image: ImageFile, description: impl Into<String>) -> Self {
        Self {
            image: Some(image),
            description: description.into(),
        }
    }

    /// Choose the image file.
    pub fn select_image(&mut self, image: ImageFile) {
        self.image = Some(image);
    }

    /// Set the description text.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    /// The selected image, if any.
    #[must_use]
    pub fn image(&self) -> Option<&ImageFile> {
        self.image.as_ref()
    }

    /// The description as typed.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether both inputs are blank.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.description.is_empty()
    }

    /// Clear both inputs.
    pub fn reset(&mut self) {
        self.image = None;
        self.description.clear();
    }

    /// Validate the inputs and capture them for decoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if no image is selected or the trimmed
    /// description is empty.
    pub fn prepare(&self) -> Result<Submission> {
        let description = self.description.trim();
        match (&self.image, description.is_empty()) {
            (None, true) => Err(Error::validation("no image selected and description is empty")),
            (None, false) => Err(Error::validation("no image selected")),
            (Some(_), true) => Err(Error::validation("description is empty")),
            (Some(image), false) => Ok(Submission {
                image: image.clone(),
                description: description.to_string(),
            }),
        }
    }
}

/// A validated form awaiting image decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    image: ImageFile,
    description: String,
}

impl Submission {
    /// The image to decode.
    #[must_use]
    pub fn image(&self) -> &ImageFile {
        &self.image
    }

    /// The trimmed description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Decode the image.
    ///
    /// # Errors
    ///
    /// Returns the decoder's error if the image cannot be read or embedded.
    pub async fn decode(self, decoder: &ImageDecoder) -> Result<DecodedSubmission> {
        let image = decoder.decode(&self.image).await?;
        Ok(DecodedSubmission {
            image,
            description: self.description,
        })
    }
}

/// A submission whose image is ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSubmission {
    /// The decoded image.
    pub image: DecodedImage,
    /// The trimmed description.
    pub description: String,
}
