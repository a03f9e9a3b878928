//! Logo file storage.
//!
//! Uploaded logos are written under the configured uploads directory with a
//! generated name; the store keeps only the opaque `/uploads/<file>`
//! reference, which the server serves as a static asset. The extension of
//! the uploaded file is preserved so browsers infer the content type.

use std::path::Path;

use uuid::Uuid;

use crate::errors::Error;

/// Persist logo bytes and return the reference path to record on the store.
pub async fn store_logo(directory: &Path, original_name: Option<&str>, bytes: &[u8]) -> Result<String, Error> {
    let extension = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let file_name = format!("{}{}", Uuid::new_v4(), extension);

    tokio::fs::create_dir_all(directory).await.map_err(|e| Error::Internal {
        operation: format!("create uploads directory: {e}"),
    })?;
    tokio::fs::write(directory.join(&file_name), bytes)
        .await
        .map_err(|e| Error::Internal {
            operation: format!("write logo file: {e}"),
        })?;

    Ok(format!("/uploads/{file_name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_logo_preserves_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_logo(dir.path(), Some("logo.png"), b"\x89PNG").await.unwrap();

        assert!(path.starts_with("/uploads/"));
        assert!(path.ends_with(".png"));

        let file_name = path.strip_prefix("/uploads/").unwrap();
        let written = tokio::fs::read(dir.path().join(file_name)).await.unwrap();
        assert_eq!(written, b"\x89PNG");
    }

    #[tokio::test]
    async fn test_store_logo_without_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = store_logo(dir.path(), None, b"data").await.unwrap();

        let file_name = path.strip_prefix("/uploads/").unwrap();
        assert!(!file_name.contains('.'));
    }
}
