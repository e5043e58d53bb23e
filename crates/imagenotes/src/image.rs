//! Image decoding.
//!
//! Turns a selected image file into a self-contained `data:` URL so that a
//! note never refers to an external file. Reading is asynchronous and is the
//! only suspension point of a submission.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::debug;

use crate::context::AppContext;
use crate::error::{Error, Result};

/// An image chosen by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    path: PathBuf,
}

impl ImageFile {
    /// Select the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the selected file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
    }
}

/// Source of image bytes.
#[async_trait]
pub trait ImageReader: Send + Sync + std::fmt::Debug {
    /// Size of the file in bytes, checked before reading it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageRead`] if the file cannot be inspected.
    async fn size(&self, file: &ImageFile) -> Result<u64>;

    /// Read the whole file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ImageRead`] if the file cannot be read.
    async fn read(&self, file: &ImageFile) -> Result<Vec<u8>>;
}

/// Reads images from the local file system.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsImageReader;

#[async_trait]
impl ImageReader for FsImageReader {
    async fn size(&self, file: &ImageFile) -> Result<u64> {
        let metadata = tokio::fs::metadata(file.path())
            .await
            .map_err(|source| Error::ImageRead {
                path: file.path().to_path_buf(),
                source,
            })?;
        if !metadata.is_file() {
            return Err(Error::image_decode(file.path(), "not a regular file"));
        }
        Ok(metadata.len())
    }

    async fn read(&self, file: &ImageFile) -> Result<Vec<u8>> {
        tokio::fs::read(file.path())
            .await
            .map_err(|source| Error::ImageRead {
                path: file.path().to_path_buf(),
                source,
            })
    }
}

/// The result of decoding an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Detected MIME type.
    pub mime: &'static str,
    /// Size of the original file in bytes.
    pub size: usize,
    /// `data:<mime>;base64,<payload>`
    pub data_url: String,
}

/// Decodes selected files into embeddable data URLs.
#[derive(Debug, Clone)]
pub struct ImageDecoder {
    reader: Arc<dyn ImageReader>,
    ctx: Arc<AppContext>,
}

impl ImageDecoder {
    /// Decoder reading from the file system.
    #[must_use]
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self::with_reader(Arc::new(FsImageReader), ctx)
    }

    /// Decoder over a custom reader.
    #[must_use]
    pub fn with_reader(reader: Arc<dyn ImageReader>, ctx: Arc<AppContext>) -> Self {
        Self { reader, ctx }
    }

    /// Read `file` and encode it as a data URL.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read, is empty, is over the size limit, or
    /// is not one of the allowed image types.
    pub async fn decode(&self, file: &ImageFile) -> Result<DecodedImage> {
        let path = file.path();

        if let Some(max) = self.ctx.max_image_bytes() {
            let size = self.reader.size(file).await?;
            if size > max {
                return Err(Error::ImageTooLarge {
                    path: path.to_path_buf(),
                    size,
                    max,
                });
            }
        }

        let bytes = self.reader.read(file).await?;
        if bytes.is_empty() {
            return Err(Error::image_decode(path, "file is empty"));
        }

        let mime = sniff_mime(&bytes, file.extension().as_deref())
            .ok_or_else(|| Error::image_decode(path, "not a recognized image format"))?;
        if !self.ctx.is_allowed_type(mime) {
            return Err(Error::image_decode(
                path,
                format!("{mime} images are not allowed"),
            ));
        }

        debug!("Decoded {} as {} ({} bytes)", path.display(), mime, bytes.len());
        Ok(DecodedImage {
            mime,
            size: bytes.len(),
            data_url: format!("data:{mime};base64,{}", STANDARD.encode(&bytes)),
        })
    }
}

/// Identify an image format from its leading bytes.
///
/// SVG has no magic number, so it is accepted only for `.svg` files whose
/// text contains an `<svg` element.
#[must_use]
pub fn sniff_mime(bytes: &[u8], extension: Option<&str>) -> Option<&'static str> {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";

    if bytes.starts_with(PNG) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") && bytes.len() > 14 {
        Some("image/bmp")
    } else if extension == Some("svg") && looks_like_svg(bytes) {
        Some("image/svg+xml")
    } else {
        None
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    std::str::from_utf8(bytes)
        .map(|text| text.trim_start_matches('\u{feff}').contains("<svg"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\x00\x00\x00\x0dIHDR";

    #[derive(Debug)]
    struct BytesReader(Vec<u8>);

    #[async_trait]
    impl ImageReader for BytesReader {
        async fn size(&self, _file: &ImageFile) -> Result<u64> {
            Ok(self.0.len() as u64)
        }

        async fn read(&self, _file: &ImageFile) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    fn decoder_for(bytes: &[u8]) -> ImageDecoder {
        ImageDecoder::with_reader(
            Arc::new(BytesReader(bytes.to_vec())),
            Arc::new(AppContext::default()),
        )
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(PNG_BYTES, None), Some("image/png"));
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0], None), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"GIF89a....", None), Some("image/gif"));
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 ", None), Some("image/webp"));
        assert_eq!(sniff_mime(b"hello world", None), None);
    }

    #[test]
    fn test_sniff_svg_requires_extension() {
        let svg = br#"<?xml version="1.0"?><svg xmlns="http://www.w3.org/2000/svg"/>"#;
        assert_eq!(sniff_mime(svg, Some("svg")), Some("image/svg+xml"));
        assert_eq!(sniff_mime(svg, Some("txt")), None);
        assert_eq!(sniff_mime(b"plain text", Some("svg")), None);
    }

    #[tokio::test]
    async fn test_decode_png_to_data_url() {
        let decoded = decoder_for(PNG_BYTES)
            .decode(&ImageFile::new("photo.png"))
            .await
            .unwrap();

        assert_eq!(decoded.mime, "image/png");
        assert_eq!(decoded.size, PNG_BYTES.len());
        assert!(decoded.data_url.starts_with("data:image/png;base64,"));
        assert!(crate::storage::codec::is_base64_data_url(&decoded.data_url));

        let payload = decoded.data_url.split_once(',').unwrap().1;
        assert_eq!(STANDARD.decode(payload).unwrap(), PNG_BYTES);
    }

    #[tokio::test]
    async fn test_decode_empty_file() {
        let err = decoder_for(&[]).decode(&ImageFile::new("x.png")).await.unwrap_err();
        assert!(err.is_image_error());
        assert!(err.to_string().contains("empty"));
    }

    #[tokio::test]
    async fn test_decode_not_an_image() {
        let err = decoder_for(b"just some text")
            .decode(&ImageFile::new("notes.txt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a recognized image format"));
    }

    #[tokio::test]
    async fn test_decode_disallowed_type() {
        let mut config = Config::default();
        config.image.allowed_types = vec!["image/jpeg".to_string()];
        let decoder = ImageDecoder::with_reader(
            Arc::new(BytesReader(PNG_BYTES.to_vec())),
            Arc::new(AppContext::new(config)),
        );

        let err = decoder.decode(&ImageFile::new("a.png")).await.unwrap_err();
        assert!(err.to_string().contains("image/png images are not allowed"));
    }

    #[tokio::test]
    async fn test_decode_too_large() {
        let mut config = Config::default();
        config.image.max_bytes = 4;
        let decoder = ImageDecoder::with_reader(
            Arc::new(BytesReader(PNG_BYTES.to_vec())),
            Arc::new(AppContext::new(config)),
        );

        let err = decoder.decode(&ImageFile::new("a.png")).await.unwrap_err();
        assert!(matches!(err, Error::ImageTooLarge { max: 4, .. }));
    }

    #[tokio::test]
    async fn test_fs_reader_missing_file() {
        let decoder = ImageDecoder::new(Arc::new(AppContext::default()));
        let err = decoder
            .decode(&ImageFile::new("/nonexistent/imagenotes/photo.png"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ImageRead { .. }));
    }

    #[tokio::test]
    async fn test_fs_reader_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, PNG_BYTES).unwrap();

        let decoded = ImageDecoder::new(Arc::new(AppContext::default()))
            .decode(&ImageFile::new(&path))
            .await
            .unwrap();
        assert_eq!(decoded.mime, "image/png");
    }

    #[tokio::test]
    async fn test_fs_reader_rejects_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageDecoder::new(Arc::new(AppContext::default()))
            .decode(&ImageFile::new(dir.path()))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not a regular file"));
    }
}
