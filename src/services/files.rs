use crate::errors::ServiceError;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, instrument};

/// Extensions probed, in order, when resolving a stored file by id
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "pdf", "png", "jpg", "jpeg", "gif", "webp", "svg", "txt", "csv", "json", "xlsx", "docx",
    "zip", "step", "stp", "dxf",
];

/// A file read from the upload directory
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Read-only access to uploaded files stored as `<dir>/<id>.<ext>`
#[derive(Clone)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

impl FileStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: Arc::new(root.as_ref().to_path_buf()),
        }
    }

    /// Ids are opaque tokens; anything that could escape the upload directory is rejected.
    fn is_safe_id(id: &str) -> bool {
        !id.is_empty()
            && id.len() <= 128
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }

    #[instrument(skip(self))]
    pub async fn download(&self, id: &str) -> Result<Option<StoredFile>, ServiceError> {
        if !Self::is_safe_id(id) {
            debug!("rejected unsafe file id");
            return Ok(None);
        }

        for ext in KNOWN_EXTENSIONS {
            let filename = format!("{id}.{ext}");
            let path = self.root.join(&filename);
            match tokio::fs::read(&path).await {
                Ok(bytes) => {
                    debug!(file = %filename, size = bytes.len(), "serving stored file");
                    return Ok(Some(StoredFile { filename, bytes }));
                }
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => {
                    error!(error = %e, path = %path.display(), "failed to read stored file");
                    return Err(ServiceError::InternalError(
                        "Failed to read file".to_string(),
                    ));
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_file_by_known_extension() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("drawing-7.dxf"), b"0\nSECTION")
            .await
            .unwrap();

        let store = FileStore::new(dir.path());
        let file = store.download("drawing-7").await.unwrap().unwrap();
        assert_eq!(file.filename, "drawing-7.dxf");
        assert_eq!(file.bytes, b"0\nSECTION");
    }

    #[tokio::test]
    async fn unknown_extension_and_missing_files_are_absent() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("macro.exe"), b"MZ").await.unwrap();

        let store = FileStore::new(dir.path());
        assert!(store.download("macro").await.unwrap().is_none());
        assert!(store.download("nothing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn path_traversal_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        assert!(store.download("../secret").await.unwrap().is_none());
        assert!(store.download("a/b").await.unwrap().is_none());
        assert!(store.download("").await.unwrap().is_none());
    }
}
