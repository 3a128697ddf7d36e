//! # Book Library
//!
//! Books live on disk as `<books_dir>/<grade>/<subject>/<file>.pdf`. Grade and
//! subject are taken verbatim from the directory names; they become the exact
//! match filter values of every retrieval, so their spelling and case matter.

use crate::errors::IngestError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One PDF found in the library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookFile {
    pub path: PathBuf,
    pub file_name: String,
    pub grade: String,
    pub subject: String,
}

/// Sorted names of the sub-directories of `dir`. A missing directory is empty.
fn sorted_subdirectories(dir: &Path) -> Result<Vec<String>, IngestError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "Directory does not exist");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(IngestError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| IngestError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// The grades available in the library, for a grade picker.
pub fn list_grades(books_dir: impl AsRef<Path>) -> Result<Vec<String>, IngestError> {
    sorted_subdirectories(books_dir.as_ref())
}

/// The subjects available for `grade`.
pub fn list_subjects(
    books_dir: impl AsRef<Path>,
    grade: &str,
) -> Result<Vec<String>, IngestError> {
    // A grade is a single directory name, never a path.
    if grade.is_empty() || grade.contains(['/', '\\']) || grade == ".." {
        return Ok(Vec::new());
    }
    sorted_subdirectories(&books_dir.as_ref().join(grade))
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Walks `books_dir` and returns every PDF with its grade and subject, sorted by path.
///
/// PDFs that are not exactly two levels deep are logged and ignored.
pub fn discover_books(books_dir: impl AsRef<Path>) -> Result<Vec<BookFile>, IngestError> {
    let root = books_dir.as_ref();
    let mut books = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let entries = std::fs::read_dir(&dir).map_err(|source| IngestError::Io {
            path: dir.clone(),
            source,
        })?;
        for entry in entries {
            let path = entry
                .map_err(|source| IngestError::Io {
                    path: dir.clone(),
                    source,
                })?
                .path();
            if path.is_dir() {
                pending.push(path);
            } else if is_pdf(&path) {
                match book_from_path(root, &path) {
                    Some(book) => books.push(book),
                    None => warn!(path = %path.display(), "PDF is not under <grade>/<subject>/, skipping"),
                }
            }
        }
    }

    books.sort_by(|a, b| a.path.cmp(&b.path));
    debug!(count = books.len(), root = %root.display(), "Discovered books");
    Ok(books)
}

fn book_from_path(root: &Path, path: &Path) -> Option<BookFile> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    let [grade, subject, file_name] = parts.as_slice() else {
        return None;
    };
    Some(BookFile {
        path: path.to_path_buf(),
        file_name: file_name.clone(),
        grade: grade.clone(),
        subject: subject.clone(),
    })
}
