//! Upload store: one flat directory, timestamp-derived names, on-demand
//! catalog enumeration.

use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::ErrorKind;
use uuid::Uuid;

use crate::atomic::AtomicFile;

#[derive(Debug)]
pub struct UploadStore {
    root: PathBuf,
    strict_unique_names: bool,
}

impl UploadStore {
    pub fn new(root: PathBuf, strict_unique_names: bool) -> Self {
        Self {
            root,
            strict_unique_names,
        }
    }

    /// Creates the storage directory if absent. Idempotent.
    pub async fn ensure_root(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root).await
    }

    pub fn root_path(&self) -> &Path {
        &self.root
    }

    /// Derives a stored name from the upload instant and the original
    /// extension. In the default mode two uploads within the same millisecond
    /// produce the same name and the second overwrites the first; the strict
    /// mode adds a random token so names cannot collide.
    pub fn generate_name(&self, original_name: &str) -> String {
        let millis = Utc::now().timestamp_millis();
        let stem = if self.strict_unique_names {
            format!("{millis}-{}", Uuid::new_v4().simple())
        } else {
            millis.to_string()
        };
        match Path::new(original_name).extension() {
            Some(ext) => format!("{stem}.{}", ext.to_string_lossy()),
            None => stem,
        }
    }

    /// Validates that `name` is a plain, non-hidden file name and resolves it
    /// inside the storage directory. Path separators, traversal segments, and
    /// dot-prefixed names (where atomic temp files live) are rejected.
    fn resolve(&self, name: &str) -> Result<PathBuf, StorageError> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains(['/', '\\'])
            || name.contains("..")
        {
            return Err(StorageError::InvalidName);
        }
        Ok(self.root.join(name))
    }

    /// Opens a temp-file writer that lands at `name` on finalize.
    pub async fn begin_write(&self, name: &str) -> Result<AtomicFile, StorageError> {
        let target = self.resolve(name)?;
        Ok(AtomicFile::new(&target).await?)
    }

    /// Opens a stored file for reading along with its metadata.
    pub async fn open(&self, name: &str) -> Result<(File, std::fs::Metadata), StorageError> {
        let target = self.resolve(name)?;
        let metadata = fs::metadata(&target).await?;
        if !metadata.is_file() {
            return Err(StorageError::NotFound);
        }
        let file = File::open(&target).await?;
        Ok((file, metadata))
    }

    /// Enumerates the directory afresh. Regular files only; hidden names are
    /// skipped. Sorted for stable presentation, though callers must not rely
    /// on a particular order.
    pub async fn list_all(&self) -> Result<Vec<String>, StorageError> {
        let mut dir = fs::read_dir(&self.root).await?;
        let mut names = Vec::new();

        while let Some(entry) = dir.next_entry().await? {
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            names.push(name);
        }

        names.sort();
        Ok(names)
    }

    /// Removes a stored file. A missing file is reported as `NotFound`,
    /// distinct from other I/O failures, so callers can choose responses.
    pub async fn delete(&self, name: &str) -> Result<(), StorageError> {
        let target = self.resolve(name)?;
        fs::remove_file(&target).await?;
        Ok(())
    }
}

#[derive(Debug)]
pub enum StorageError {
    InvalidName,
    NotFound,
    Io(io::Error),
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        if err.kind() == ErrorKind::NotFound {
            StorageError::NotFound
        } else {
            StorageError::Io(err)
        }
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageError::InvalidName => write!(f, "invalid file name"),
            StorageError::NotFound => write!(f, "file not found"),
            StorageError::Io(err) => write!(f, "{err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StorageError, UploadStore};
    use tempfile::tempdir;
    use tokio::io::AsyncWriteExt;

    fn make_store(strict: bool) -> (tempfile::TempDir, UploadStore) {
        let temp = tempdir().expect("tempdir");
        let root = temp.path().join("uploads");
        std::fs::create_dir_all(&root).expect("create uploads root");
        (temp, UploadStore::new(root, strict))
    }

    #[tokio::test]
    async fn generated_name_keeps_original_extension() {
        let (_temp, store) = make_store(false);
        let name = store.generate_name("photo.png");
        assert!(name.ends_with(".png"));
        assert!(name.trim_end_matches(".png").parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn generated_name_without_extension_is_bare_timestamp() {
        let (_temp, store) = make_store(false);
        let name = store.generate_name("README");
        assert!(name.parse::<i64>().is_ok());
    }

    #[tokio::test]
    async fn strict_mode_yields_distinct_names() {
        let (_temp, store) = make_store(true);
        let a = store.generate_name("a.txt");
        let b = store.generate_name("a.txt");
        assert_ne!(a, b);
        assert!(a.ends_with(".txt") && b.ends_with(".txt"));
    }

    #[tokio::test]
    async fn stored_bytes_round_trip_and_appear_in_catalog() {
        let (_temp, store) = make_store(false);
        let name = store.generate_name("note.txt");

        let mut writer = store.begin_write(&name).await.expect("begin write");
        writer
            .file_mut()
            .write_all(b"hello upload")
            .await
            .expect("write");
        writer.finalize().await.expect("finalize");

        let listed = store.list_all().await.expect("list");
        assert_eq!(listed, vec![name.clone()]);

        let (_file, metadata) = store.open(&name).await.expect("open");
        assert_eq!(metadata.len(), 12);
        let content = tokio::fs::read(store.root_path().join(&name))
            .await
            .expect("read back");
        assert_eq!(content, b"hello upload");
    }

    #[tokio::test]
    async fn delete_removes_file_and_second_delete_is_not_found() {
        let (_temp, store) = make_store(false);
        std::fs::write(store.root_path().join("123.txt"), b"x").expect("seed file");

        store.delete("123.txt").await.expect("delete");
        assert!(store.list_all().await.expect("list").is_empty());
        assert!(matches!(
            store.delete("123.txt").await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            store.open("123.txt").await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn catalog_skips_directories_and_hidden_files() {
        let (_temp, store) = make_store(false);
        std::fs::write(store.root_path().join("1.txt"), b"a").expect("seed");
        std::fs::write(store.root_path().join(".1.txt.tmp.abc"), b"b").expect("seed temp");
        std::fs::create_dir(store.root_path().join("subdir")).expect("seed dir");

        assert_eq!(store.list_all().await.expect("list"), vec!["1.txt"]);
    }

    #[tokio::test]
    async fn resolve_rejects_traversal_and_hidden_names() {
        let (_temp, store) = make_store(false);
        for bad in ["../secret", "a/b.txt", "a\\b.txt", ".hidden", ""] {
            assert!(
                matches!(store.delete(bad).await, Err(StorageError::InvalidName)),
                "expected InvalidName for {bad:?}"
            );
        }
    }
}
