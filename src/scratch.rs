//! Scoped temporary files.
//!
//! Resized copies of oversized images are written here and referenced by the
//! workbook until it is saved. [`Scratch::release`] removes them once the
//! document is on disk; dropping a `Scratch` does the same, so a failed save
//! or an early `?` return cleans up too.

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Scratch {
    dir: Option<TempDir>,
    files: Vec<PathBuf>,
}

impl Scratch {
    pub fn new() -> std::io::Result<Self> {
        let dir = tempfile::Builder::new().prefix("folder2doc-").tempdir()?;
        tracing::debug!("scratch directory {}", dir.path().display());
        Ok(Self {
            dir: Some(dir),
            files: Vec::new(),
        })
    }

    /// Directory holding the scratch files, `None` after release.
    pub fn path(&self) -> Option<&Path> {
        self.dir.as_ref().map(|d| d.path())
    }

    /// Reserve a unique path for a new temporary file and track it.
    ///
    /// `stem` is only used to keep names recognizable; the running index
    /// makes each path unique.
    pub fn path_for(&mut self, stem: &str, extension: &str) -> Option<PathBuf> {
        let dir = self.dir.as_ref()?;
        let safe: String = stem
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        let path = dir
            .path()
            .join(format!("{:04}-{}.{}", self.files.len(), safe, extension));
        self.files.push(path.clone());
        Some(path)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Delete every tracked file, then the directory. Failures are logged
    /// and otherwise ignored.
    pub fn release(&mut self) {
        for file in self.files.drain(..) {
            match fs::remove_file(&file) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => tracing::debug!("could not remove {}: {}", file.display(), e),
            }
        }
        if let Some(dir) = self.dir.take() {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                tracing::debug!("could not remove {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        self.release();
    }
}
