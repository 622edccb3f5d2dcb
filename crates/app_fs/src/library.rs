//! Library listing - one level of folders and documents under a root

use crate::{natural_cmp, FsError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Image extensions shown as pages and used for folder thumbnails
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// One library item: a folder of images or a standalone document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryEntry {
    pub name: String,
    pub path: PathBuf,
    /// First image found in the folder, in directory-listing order
    pub thumbnail: Option<PathBuf>,
    pub is_file: bool,
}

impl LibraryEntry {
    /// Folders without a thumbnail have nothing to read
    pub fn is_selectable(&self) -> bool {
        self.thumbnail.is_some() || self.is_file
    }

    /// Is this entry a PDF document
    pub fn is_pdf(&self) -> bool {
        self.is_file && is_pdf_file(&self.path)
    }

    /// Path as stored in the favorites list
    pub fn path_key(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }
}

/// Check the extension against [`IMAGE_EXTENSIONS`], ignoring case
pub fn is_image_file<P: AsRef<Path>>(path: P) -> bool {
    extension_lower(path.as_ref())
        .map_or(false, |ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// Check for a `.pdf` extension, ignoring case
pub fn is_pdf_file<P: AsRef<Path>>(path: P) -> bool {
    extension_lower(path.as_ref()).map_or(false, |ext| ext == "pdf")
}

fn extension_lower(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}

/// List library entries under `root`, logging and returning an empty list on failure
pub fn list_entries<P: AsRef<Path>>(root: P) -> Vec<LibraryEntry> {
    let root = root.as_ref();
    match read_entries(root) {
        Ok(entries) => {
            tracing::debug!(root = %root.display(), count = entries.len(), "Listed library");
            entries
        }
        Err(e) => {
            tracing::warn!(root = %root.display(), "Failed to list library: {}", e);
            Vec::new()
        }
    }
}

/// List library entries under `root`.
///
/// Subdirectories become folder entries; `.pdf` files become document entries.
/// Everything else is skipped. Order follows the directory listing.
pub fn read_entries(root: &Path) -> Result<Vec<LibraryEntry>> {
    let dir = fs::read_dir(root).map_err(|e| FsError::from_io(root, e))?;
    let mut entries = Vec::new();

    for entry in dir {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("Skipping unreadable entry in {}: {}", root.display(), e);
                continue;
            }
        };

        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(_) => continue,
        };

        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if file_type.is_dir() || (file_type.is_symlink() && path.is_dir()) {
            entries.push(LibraryEntry {
                thumbnail: find_thumbnail(&path),
                name,
                path,
                is_file: false,
            });
        } else if is_pdf_file(&path) {
            entries.push(LibraryEntry {
                name,
                path,
                thumbnail: None,
                is_file: true,
            });
        }
    }

    Ok(entries)
}

/// First image in `dir` in listing order; unreadable folders have none
fn find_thumbnail(dir: &Path) -> Option<PathBuf> {
    let reader = match fs::read_dir(dir) {
        Ok(r) => r,
        Err(e) => {
            tracing::debug!("Cannot scan {} for a thumbnail: {}", dir.display(), e);
            return None;
        }
    };

    reader
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .find(|p| is_image_file(p) && !p.is_dir())
}

/// List page images in `folder` sorted naturally, empty on failure
pub fn list_pages<P: AsRef<Path>>(folder: P) -> Vec<PathBuf> {
    let folder = folder.as_ref();
    match read_pages(folder) {
        Ok(pages) => pages,
        Err(e) => {
            tracing::warn!(folder = %folder.display(), "Failed to list pages: {}", e);
            Vec::new()
        }
    }
}

/// List page images in `folder` sorted naturally by file name
pub fn read_pages(folder: &Path) -> Result<Vec<PathBuf>> {
    let dir = fs::read_dir(folder).map_err(|e| FsError::from_io(folder, e))?;

    let mut pages: Vec<PathBuf> = dir
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| is_image_file(p) && !p.is_dir())
        .collect();

    pages.sort_by(|a, b| natural_cmp(&a.to_string_lossy(), &b.to_string_lossy()));
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::write(path, b"x").unwrap();
    }

    fn names(entries: &[LibraryEntry]) -> Vec<String> {
        let mut n: Vec<String> = entries.iter().map(|e| e.name.clone()).collect();
        n.sort();
        n
    }

    #[test]
    fn test_entries_folders_and_pdfs_only() {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("Vol1")).unwrap();
        touch(&root.path().join("Vol1").join("001.png"));
        touch(&root.path().join("book.PDF"));
        touch(&root.path().join("cover.jpg"));
        touch(&root.path().join("notes.txt"));

        let entries = read_entries(root.path()).unwrap();
        assert_eq!(names(&entries), vec!["Vol1", "book.PDF"]);

        let pdf = entries.iter().find(|e| e.is_file).unwrap();
        assert!(pdf.is_pdf());
        assert!(pdf.thumbnail.is_none());
    }

    #[test]
    fn test_thumbnail_detection() {
        let root = TempDir::new().unwrap();
        let a = root.path().join("A");
        let b = root.path().join("B");
        fs::create_dir(&a).unwrap();
        fs::create_dir(&b).unwrap();
        touch(&a.join("readme.txt"));
        touch(&b.join("Page.JPEG"));

        let entries = read_entries(root.path()).unwrap();
        let a_entry = entries.iter().find(|e| e.name == "A").unwrap();
        let b_entry = entries.iter().find(|e| e.name == "B").unwrap();

        assert_eq!(a_entry.thumbnail, None);
        assert!(!a_entry.is_selectable());
        assert_eq!(b_entry.thumbnail, Some(b.join("Page.JPEG")));
        assert!(b_entry.is_selectable());
    }

    #[test]
    fn test_no_descent_past_depth_one() {
        let root = TempDir::new().unwrap();
        let nested = root.path().join("Series").join("Inner");
        fs::create_dir_all(&nested).unwrap();
        touch(&nested.join("deep.pdf"));

        let entries = read_entries(root.path()).unwrap();
        assert_eq!(names(&entries), vec!["Series"]);
        assert_eq!(entries[0].thumbnail, None);
    }

    #[test]
    fn test_missing_root_is_soft() {
        let root = TempDir::new().unwrap();
        let missing = root.path().join("gone");
        assert!(list_entries(&missing).is_empty());
        assert!(matches!(read_entries(&missing), Err(FsError::NotFound(_))));
    }

    #[test]
    fn test_pages_sorted_naturally() {
        let folder = TempDir::new().unwrap();
        for name in ["page10.png", "page2.png", "Page1.webp", "info.txt", "page3.GIF"] {
            touch(&folder.path().join(name));
        }

        let pages = list_pages(folder.path());
        let file_names: Vec<String> = pages
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(file_names, vec!["Page1.webp", "page2.png", "page3.GIF", "page10.png"]);
        assert!(pages.iter().all(|p| p.is_absolute()));
    }

    #[test]
    fn test_is_image_file() {
        assert!(is_image_file("a/b/c.JPG"));
        assert!(is_image_file("x.webp"));
        assert!(!is_image_file("x.bmp"));
        assert!(!is_image_file("noext"));
    }
}
