use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("unsupported image type: {0} (expected png, jpg, jpeg, bmp, gif or webp)")]
    Unsupported(PathBuf),
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is empty")]
    Empty(PathBuf),
}

/// An encoded image ready to be sent to the model.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageInput {
    bytes: Vec<u8>,
    mime_type: &'static str,
}

impl ImageInput {
    pub fn new(bytes: Vec<u8>, mime_type: &'static str) -> Self {
        Self { bytes, mime_type }
    }

    /// Read an image file, picking the MIME type from its extension.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let path = path.as_ref();
        let mime_type =
            mime_for_path(path).ok_or_else(|| ImageError::Unsupported(path.to_path_buf()))?;

        let bytes = tokio::fs::read(path).await.map_err(|source| ImageError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        if bytes.is_empty() {
            return Err(ImageError::Empty(path.to_path_buf()));
        }

        Ok(Self { bytes, mime_type })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime_type(&self) -> &'static str {
        self.mime_type
    }
}

// Image bytes are noise in logs and test failures.
impl fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageInput")
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "bmp" => Some("image/bmp"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_mime_for_path() {
        assert_eq!(mime_for_path(Path::new("eq.PNG")), Some("image/png"));
        assert_eq!(mime_for_path(Path::new("a/b/photo.jpeg")), Some("image/jpeg"));
        assert_eq!(mime_for_path(Path::new("notes.txt")), None);
        assert_eq!(mime_for_path(Path::new("no_extension")), None);
    }

    #[tokio::test]
    async fn test_load_reads_bytes() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89, b'P', b'N', b'G']).unwrap();

        let image = ImageInput::load(file.path()).await.unwrap();
        assert_eq!(image.mime_type(), "image/png");
        assert_eq!(image.bytes(), &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_load_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
        let err = ImageInput::load(file.path()).await.unwrap_err();
        assert!(matches!(err, ImageError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_load_rejects_empty_file() {
        let file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        let err = ImageInput::load(file.path()).await.unwrap_err();
        assert!(matches!(err, ImageError::Empty(_)));
    }

    #[tokio::test]
    async fn test_load_missing_file() {
        let err = ImageInput::load("/definitely/not/here.png").await.unwrap_err();
        assert!(matches!(err, ImageError::Read { .. }));
    }
}
