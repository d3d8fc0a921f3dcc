//! On-disk attachment storage.
//!
//! Blobs live as flat files under one directory, named `uuid + original
//! extension`. Message rows reference them by path string; resolution back
//! to disk only ever uses the final path component, so a stored reference
//! can never escape the directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct Storage {
    dir: Arc<PathBuf>,
}

impl Storage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Attachment storage directory: {}", dir.display());
        Ok(Self { dir: Arc::new(dir) })
    }

    /// Unique on-disk name keeping the original extension, so MIME inference
    /// on download has something to work with.
    pub fn stored_name(original: &str) -> String {
        let id = Uuid::new_v4();
        match Path::new(original).extension().and_then(|e| e.to_str()) {
            Some(ext) if !ext.is_empty() => format!("{id}.{ext}"),
            _ => id.to_string(),
        }
    }

    /// Resolve a stored reference to a path inside the storage directory.
    /// Only the final path component counts; traversal attempts resolve to
    /// nothing.
    pub fn resolve(&self, reference: &str) -> Option<PathBuf> {
        // file_name() is None for "", "/" and paths ending in "..".
        let name = Path::new(reference).file_name()?;
        Some(self.dir.join(name))
    }

    /// Write a blob and return its full path.
    pub async fn save(&self, stored_name: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.dir.join(stored_name);
        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_at(dir: &str) -> Storage {
        Storage {
            dir: Arc::new(PathBuf::from(dir)),
        }
    }

    #[test]
    fn stored_name_keeps_extension() {
        let name = Storage::stored_name("devoir maths.pdf");
        assert!(name.ends_with(".pdf"));
        let bare = Storage::stored_name("README");
        assert!(!bare.contains('.'));
    }

    #[test]
    fn resolve_uses_only_the_final_component() {
        let storage = storage_at("/var/carnet/uploads");
        assert_eq!(
            storage.resolve("abc.pdf"),
            Some(PathBuf::from("/var/carnet/uploads/abc.pdf"))
        );
        // A full stored path resolves to the same place.
        assert_eq!(
            storage.resolve("/var/carnet/uploads/abc.pdf"),
            Some(PathBuf::from("/var/carnet/uploads/abc.pdf"))
        );
        // Traversal collapses to the file name or resolves to nothing.
        assert_eq!(
            storage.resolve("../../etc/passwd"),
            Some(PathBuf::from("/var/carnet/uploads/passwd"))
        );
        assert_eq!(storage.resolve(".."), None);
        assert_eq!(storage.resolve(""), None);
        assert_eq!(storage.resolve("/"), None);
    }
}
