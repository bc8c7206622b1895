#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::glob;

use crate::constants::{ID_NOISE, ID_NUMERIC_PREFIX, ID_SEPARATORS};

/// A glob utility function to find paths to files with certain extension
///
/// * `extension`: the file extension to find paths for
/// * `search_depth`: how many folders deep to search for
/// * `root_dir`: the root directory where search starts
pub fn find_files(extension: &str, search_depth: i8, root_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pattern = root_dir.to_path_buf();

    for _ in 0..search_depth {
        pattern.push("**");
    }

    pattern.push(format!("*.{extension}"));
    let pattern = pattern
        .to_str()
        .context("Could not convert root_dir to string")?
        .to_string();

    let mut files: Vec<PathBuf> = glob(&pattern)
        .context("Could not create glob")?
        .filter_map(Result::ok)
        .collect();
    files.sort();
    files.dedup();
    Ok(files)
}

/// Normalises an exercise id or file stem for matching: drops everything but
/// word characters and `-`, collapses `-`/`_` runs into one `-`, lowercases,
/// and strips a numeric ordering prefix such as `01-`.
pub fn normalize_exercise_id(id: &str) -> String {
    let id = ID_NOISE.replace_all(id, "");
    let id = ID_SEPARATORS.replace_all(&id, "-").to_lowercase();
    ID_NUMERIC_PREFIX.replace(&id, "").into_owned()
}

/// Whether `needle` occurs in `haystack` without splitting a number:
/// `ex1` occurs in `ex1-v2` but not in `ex10`.
fn contains_whole_number(haystack: &str, needle: &str) -> bool {
    let digit = |c: Option<char>| c.is_some_and(|c| c.is_ascii_digit());
    haystack.match_indices(needle).any(|(start, _)| {
        let end = start + needle.len();
        let splits_before =
            digit(needle.chars().next()) && digit(haystack[..start].chars().next_back());
        let splits_after =
            digit(needle.chars().next_back()) && digit(haystack[end..].chars().next());
        !splits_before && !splits_after
    })
}

/// Finds the exercise a file belongs to: the first id whose normalised form,
/// or the last `-`-separated segment of it, occurs in the normalised file
/// name without cutting through a number.
pub fn match_exercise<'a>(
    file_name: &str,
    exercise_ids: impl IntoIterator<Item = &'a str>,
) -> Option<&'a str> {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file_name);
    let file = normalize_exercise_id(stem);
    if file.is_empty() {
        return None;
    }

    exercise_ids.into_iter().find(|id| {
        let normalized = normalize_exercise_id(id);
        if normalized.is_empty() {
            return false;
        }
        let last = normalized.rsplit('-').next().unwrap_or(&normalized);
        contains_whole_number(&file, &normalized)
            || (!last.is_empty() && contains_whole_number(&file, last))
    })
}
