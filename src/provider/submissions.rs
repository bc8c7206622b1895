#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use tracing::warn;

use super::{SourceFile, SubmissionSource};
use crate::util::find_files;

/// Submissions extracted on disk: `<root>/<student>/**/*.java`.
#[derive(Clone, Debug)]
pub struct DirectorySubmissions {
    /// directory holding one sub-directory per student
    root: PathBuf,
}

/// `path` relative to `base`, with `/` separators.
fn relative(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

impl DirectorySubmissions {
    /// Submissions under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        ensure!(root.is_dir(), "Submissions directory {} does not exist", root.display());
        Ok(Self { root })
    }

    /// The submissions directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every student id, sorted. Hidden directories are ignored.
    pub fn list_students(&self) -> Result<Vec<String>> {
        let mut students = Vec::new();
        let entries = fs::read_dir(&self.root)
            .with_context(|| format!("Could not list {}", self.root.display()))?;
        for entry in entries {
            let entry = entry.with_context(|| format!("Could not list {}", self.root.display()))?;
            if !entry.file_type().map(|t| t.is_dir()).unwrap_or(false) {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) if !name.starts_with('.') => students.push(name),
                Ok(_) => {}
                Err(name) => warn!("Skipping student directory with a non UTF-8 name: {name:?}"),
            }
        }
        students.sort();
        Ok(students)
    }
}

impl SubmissionSource for DirectorySubmissions {
    fn list_java_sources(&self, student_id: &str) -> Result<Vec<SourceFile>> {
        ensure!(
            !student_id.contains(['/', '\\']) && student_id != ".." && !student_id.is_empty(),
            "`{student_id}` is not a valid student id"
        );
        let dir = self.root.join(student_id);
        ensure!(dir.is_dir(), "No submission directory for student `{student_id}`");

        let sources = find_files("java", 1, &dir)?
            .into_iter()
            .map(|path| {
                let text = fs::read_to_string(&path).map_err(|e| {
                    warn!("Could not read {}: {e}", path.display());
                    e.to_string()
                });
                SourceFile {
                    relative_path: relative(&dir, &path),
                    text,
                }
            })
            .collect();
        Ok(sources)
    }
}
