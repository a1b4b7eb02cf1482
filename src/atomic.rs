//! Temp-file write with atomic rename into the final name.

use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use uuid::Uuid;

/// A write destined for `target`, staged in a hidden temp file alongside it.
/// The final name never refers to a half-written file: either `finalize`
/// renames the complete temp file into place or nothing appears at all.
pub struct AtomicFile {
    target: PathBuf,
    temp_path: PathBuf,
    file: File,
}

impl AtomicFile {
    pub async fn new(target: &Path) -> std::io::Result<Self> {
        let parent = target.parent().unwrap_or_else(|| Path::new("."));
        let base = target
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_else(|| "file".into());
        let temp_path = parent.join(format!(".{base}.tmp.{}", Uuid::new_v4()));
        let file = File::create(&temp_path).await?;
        Ok(Self {
            target: target.to_path_buf(),
            temp_path,
            file,
        })
    }

    pub fn file_mut(&mut self) -> &mut File {
        &mut self.file
    }

    /// Abandons the write and removes the temp file.
    pub async fn cleanup(self) {
        let _ = fs::remove_file(&self.temp_path).await;
    }

    /// Flushes and renames the temp file onto the target.
    pub async fn finalize(self) -> std::io::Result<()> {
        self.file.sync_all().await?;
        drop(self.file);

        if let Err(err) = fs::rename(&self.temp_path, &self.target).await {
            let _ = fs::remove_file(&self.temp_path).await;
            return Err(err);
        }
        Ok(())
    }
}
