//! Filesystem scanning.
//!
//! First stage of every conversion. Lists the immediate subdirectories of a
//! source folder and the images inside each one, producing the ordered
//! [`ScanResult`] the emitters consume.
//!
//! ## Directory Structure
//!
//! ```text
//! photos/                      # Source root
//! ├── 2023 Summer/             # Becomes a sheet / heading / PDF section
//! │   ├── beach.jpg
//! │   └── hotel.PNG            # Extension match is case-insensitive
//! ├── Empty/                   # No images → skipped entirely
//! │   └── notes.txt
//! ├── Receipts/
//! │   └── scan-001.tiff
//! └── cover.jpg                # Files in the root itself are ignored
//! ```
//!
//! ## Rules
//!
//! - Only direct children of the root are considered; nested folders are not
//!   descended into.
//! - Subdirectories and images are sorted by file name.
//! - Dot-named entries count like any other; only `.DS_Store` and
//!   AppleDouble `._*` files are ignored.
//! - A subdirectory with no recognized image is dropped.
//! - A subdirectory that cannot be read is logged and dropped; the run goes on.
//! - A root that cannot be read is fatal.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Source folder not found: {0}")]
    NotFound(PathBuf),
    #[error("Source path is not a folder: {0}")]
    NotADirectory(PathBuf),
    #[error("Cannot read source folder {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Recognized image extensions, compared lower-cased.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"];

/// Outcome of scanning a source folder.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub root: PathBuf,
    /// Final path component of the root, used in document titles.
    pub root_name: String,
    /// Every readable or unreadable subdirectory, qualifying or not.
    pub subdirectory_count: usize,
    /// Qualifying subdirectories in name order.
    pub subdirectories: Vec<SourceSubdirectory>,
    /// Subdirectories that could not be listed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<PathBuf>,
}

/// A direct child directory holding at least one image.
#[derive(Debug, Clone, Serialize)]
pub struct SourceSubdirectory {
    pub name: String,
    pub path: PathBuf,
    pub images: Vec<ImageEntry>,
}

/// An image file inside a [`SourceSubdirectory`].
///
/// Pixel dimensions are not read here; emitters ask the image backend when
/// they compute a placement.
#[derive(Debug, Clone, Serialize)]
pub struct ImageEntry {
    pub path: PathBuf,
    pub file_name: String,
    /// Lower-cased extension, one of [`IMAGE_EXTENSIONS`].
    pub extension: String,
}

/// Why a scan produced nothing to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyOutcome {
    /// The root has no subdirectories at all.
    NoSubdirectories,
    /// Subdirectories exist but none contains an image.
    NoImages,
}

impl EmptyOutcome {
    /// Text written into the placeholder document.
    pub fn message(self) -> &'static str {
        match self {
            EmptyOutcome::NoSubdirectories => "no subdirectories found",
            EmptyOutcome::NoImages => "no subdirectories with images found",
        }
    }
}

impl ScanResult {
    /// `None` when there is at least one qualifying subdirectory.
    pub fn empty_outcome(&self) -> Option<EmptyOutcome> {
        if !self.subdirectories.is_empty() {
            None
        } else if self.subdirectory_count == 0 {
            Some(EmptyOutcome::NoSubdirectories)
        } else {
            Some(EmptyOutcome::NoImages)
        }
    }

    pub fn image_count(&self) -> usize {
        self.subdirectories.iter().map(|d| d.images.len()).sum()
    }
}

pub fn scan(root: &Path) -> Result<ScanResult, ScanError> {
    if !root.exists() {
        return Err(ScanError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }

    let subdirs = collect_entries(root)
        .map_err(|source| ScanError::Io {
            path: root.to_path_buf(),
            source,
        })?
        .into_iter()
        .filter(|p| p.is_dir())
        .collect::<Vec<_>>();

    tracing::info!(count = subdirs.len(), "found subdirectories in {}", root.display());

    let mut subdirectories = Vec::new();
    let mut skipped = Vec::new();

    for dir in &subdirs {
        match collect_images(dir) {
            Ok(images) if images.is_empty() => {
                tracing::debug!("no images in {}, skipping", dir.display());
            }
            Ok(images) => subdirectories.push(SourceSubdirectory {
                name: file_name(dir),
                path: dir.clone(),
                images,
            }),
            Err(e) => {
                tracing::warn!("cannot read {}: {}, skipping", dir.display(), e);
                skipped.push(dir.clone());
            }
        }
    }

    Ok(ScanResult {
        root: root.to_path_buf(),
        root_name: root_display_name(root),
        subdirectory_count: subdirs.len(),
        subdirectories,
        skipped,
    })
}

/// Entries of a directory, sorted by name, minus OS metadata files.
fn collect_entries(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(path)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| !is_os_metadata(&file_name(p)))
        .collect();

    entries.sort_by_key(|p| p.file_name().map(|n| n.to_os_string()));
    Ok(entries)
}

/// macOS Finder state and AppleDouble resource forks (`._photo.jpg`).
fn is_os_metadata(name: &str) -> bool {
    name == ".DS_Store" || name.starts_with("._")
}

fn collect_images(dir: &Path) -> std::io::Result<Vec<ImageEntry>> {
    Ok(collect_entries(dir)?
        .into_iter()
        .filter_map(|p| {
            let extension = image_extension(&p)?;
            Some(ImageEntry {
                file_name: file_name(&p),
                path: p,
                extension,
            })
        })
        .collect())
}

/// Lower-cased extension if `path` is a file with a recognized image extension.
fn image_extension(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let ext = path.extension()?.to_string_lossy().to_lowercase();
    IMAGE_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Name of the root for titles. `.` and similar relative roots are
/// canonicalized first so the title is the real folder name.
fn root_display_name(root: &Path) -> String {
    let name = file_name(root);
    if !name.is_empty() {
        return name;
    }
    root.canonicalize()
        .ok()
        .map(|p| file_name(&p))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| root.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use tempfile::TempDir;

    #[test]
    fn subdirectories_sorted_by_name() {
        let tmp = TempDir::new().unwrap();
        for dir in ["b-second", "a-first", "c-third"] {
            write_fake_image(&tmp.path().join(dir).join("x.jpg"));
        }

        let result = scan(tmp.path()).unwrap();
        assert_eq!(section_names(&result), vec!["a-first", "b-second", "c-third"]);
    }

    #[test]
    fn images_sorted_by_file_name() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("album");
        for name in ["c.png", "a.jpg", "b.gif"] {
            write_fake_image(&dir.join(name));
        }

        let result = scan(tmp.path()).unwrap();
        assert_eq!(image_names(&result.subdirectories[0]), vec!["a.jpg", "b.gif", "c.png"]);
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("album");
        for name in ["UPPER.JPG", "Mixed.Png", "scan.TIFF", "anim.gif", "pic.webp", "old.bmp"] {
            write_fake_image(&dir.join(name));
        }

        let result = scan(tmp.path()).unwrap();
        let images = &result.subdirectories[0].images;
        assert_eq!(images.len(), 6);
        assert!(images.iter().any(|i| i.extension == "jpg"));
        assert!(images.iter().any(|i| i.extension == "tiff"));
    }

    #[test]
    fn non_image_files_ignored() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("album");
        write_fake_image(&dir.join("keep.jpeg"));
        std::fs::write(dir.join("notes.txt"), "hello").unwrap();
        std::fs::write(dir.join("raw.cr2"), "raw").unwrap();
        std::fs::create_dir_all(dir.join("nested.png")).unwrap();

        let result = scan(tmp.path()).unwrap();
        assert_eq!(image_names(&result.subdirectories[0]), vec!["keep.jpeg"]);
    }

    #[test]
    fn empty_subdirectory_excluded() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("empty")).unwrap();
        std::fs::write(tmp.path().join("empty/readme.md"), "none").unwrap();
        write_fake_image(&tmp.path().join("full/a.png"));

        let result = scan(tmp.path()).unwrap();
        assert_eq!(result.subdirectory_count, 2);
        assert_eq!(section_names(&result), vec!["full"]);
        assert_eq!(result.empty_outcome(), None);
    }

    #[test]
    fn only_empty_subdirectory_reports_no_images() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("empty")).unwrap();

        let result = scan(tmp.path()).unwrap();
        assert!(result.subdirectories.is_empty());
        assert_eq!(result.empty_outcome(), Some(EmptyOutcome::NoImages));
    }

    #[test]
    fn no_subdirectories_reported() {
        let tmp = TempDir::new().unwrap();
        write_fake_image(&tmp.path().join("loose.jpg"));

        let result = scan(tmp.path()).unwrap();
        assert_eq!(result.subdirectory_count, 0);
        assert_eq!(result.empty_outcome(), Some(EmptyOutcome::NoSubdirectories));
        assert_eq!(
            EmptyOutcome::NoSubdirectories.message(),
            "no subdirectories found"
        );
    }

    #[test]
    fn dot_entries_included() {
        let tmp = TempDir::new().unwrap();
        write_fake_image(&tmp.path().join(".album/a.png"));
        write_fake_image(&tmp.path().join("b/.cover.jpg"));

        let result = scan(tmp.path()).unwrap();
        assert_eq!(result.subdirectory_count, 2);
        assert_eq!(section_names(&result), vec![".album", "b"]);
        assert_eq!(image_names(&result.subdirectories[1]), vec![".cover.jpg"]);
        assert_eq!(result.empty_outcome(), None);
    }

    #[test]
    fn os_metadata_ignored() {
        let tmp = TempDir::new().unwrap();
        write_fake_image(&tmp.path().join("album/._real.jpg"));
        write_fake_image(&tmp.path().join("album/real.jpg"));
        std::fs::write(tmp.path().join("album/.DS_Store"), b"").unwrap();
        write_fake_image(&tmp.path().join("._album/a.jpg"));

        let result = scan(tmp.path()).unwrap();
        assert_eq!(section_names(&result), vec!["album"]);
        assert_eq!(image_names(&result.subdirectories[0]), vec!["real.jpg"]);
    }

    #[test]
    fn nested_directories_not_descended() {
        let tmp = TempDir::new().unwrap();
        write_fake_image(&tmp.path().join("outer/inner/deep.jpg"));

        let result = scan(tmp.path()).unwrap();
        assert_eq!(result.empty_outcome(), Some(EmptyOutcome::NoImages));
    }

    #[test]
    fn missing_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let result = scan(&tmp.path().join("nope"));
        assert!(matches!(result, Err(ScanError::NotFound(_))));
    }

    #[test]
    fn file_root_is_error() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("file.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(matches!(scan(&file), Err(ScanError::NotADirectory(_))));
    }

    #[test]
    fn root_name_from_last_component() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("My Photos");
        write_fake_image(&root.join("a/x.jpg"));

        let result = scan(&root).unwrap();
        assert_eq!(result.root_name, "My Photos");
        assert_eq!(result.image_count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_subdirectory_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        write_fake_image(&tmp.path().join("locked/a.jpg"));
        write_fake_image(&tmp.path().join("open/b.jpg"));
        let locked = tmp.path().join("locked");
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o000)).unwrap();

        // Root can ignore permission bits; nothing to assert in that case.
        let readable_anyway = std::fs::read_dir(&locked).is_ok();
        let result = scan(tmp.path()).unwrap();
        std::fs::set_permissions(&locked, std::fs::Permissions::from_mode(0o755)).unwrap();

        if !readable_anyway {
            assert_eq!(section_names(&result), vec!["open"]);
            assert_eq!(result.skipped, vec![locked]);
        }
    }
}
