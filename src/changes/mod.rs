//! Pending-change detection.
//!
//! Produces one unified diff blob per run describing everything that would
//! go into the next commit, or nothing when the tree is clean. Detection
//! must leave the index exactly as it found it: untracked entries are
//! registered with intent-to-add only for the duration of the diff and the
//! registration is reverted immediately afterwards.

use std::path::Path;

use tracing::warn;

use crate::error::GitError;
use crate::git;

/// Detect pending changes in `workdir`.
///
/// Returns the diff text, or `None` when there is nothing to commit. Git
/// command failures are reported and degrade to `None`; detection never
/// lets a failed diff proceed toward a commit.
pub fn detect_changes(workdir: &Path) -> Option<String> {
    match collect(workdir) {
        Ok(diff) => diff,
        Err(e) => {
            eprintln!("Could not inspect working tree: {e}");
            None
        }
    }
}

fn collect(workdir: &Path) -> Result<Option<String>, GitError> {
    if !git::is_repository(workdir) {
        return detect_outside_repository(workdir);
    }

    let status = git::status_porcelain(workdir)?;
    if status.is_empty() {
        println!("No changes detected.");
        return Ok(None);
    }

    println!("Changes detected:");
    println!("{status}");

    let diff = if has_untracked(&status) {
        diff_with_untracked(workdir)?
    } else {
        git::diff_worktree(workdir)?
    };

    if diff.is_empty() {
        println!("No differences found to describe.");
        return Ok(None);
    }

    Ok(Some(diff))
}

/// Diff a directory that is not under version control by synthesizing a
/// listing of its top-level entries and comparing against an empty baseline.
fn detect_outside_repository(workdir: &Path) -> Result<Option<String>, GitError> {
    let entries = list_candidate_entries(workdir);
    if entries.is_empty() {
        println!("No files found to commit.");
        return Ok(None);
    }

    println!("Files detected:");
    for name in &entries {
        println!("?? {name}");
    }

    let diff = git::diff_no_index(workdir)?;
    if diff.is_empty() {
        return Ok(None);
    }
    Ok(Some(diff))
}

/// Top-level entries that would be committed, skipping hidden and
/// double-underscore names.
fn list_candidate_entries(workdir: &Path) -> Vec<String> {
    let Ok(read_dir) = std::fs::read_dir(workdir) else {
        return Vec::new();
    };

    let mut entries: Vec<String> = read_dir
        .filter_map(|e| e.ok())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.') && !name.starts_with("__"))
        .collect();
    entries.sort();
    entries
}

/// Whether the porcelain status lists untracked entries.
fn has_untracked(status: &str) -> bool {
    status.lines().any(|line| line.starts_with("??"))
}

/// Diff including untracked content: register untracked entries with
/// intent-to-add, diff, then revert the registration.
///
/// The reset runs even when the diff fails so the index is never left with
/// the temporary registration.
fn diff_with_untracked(workdir: &Path) -> Result<String, GitError> {
    git::intent_to_add_all(workdir)?;

    let diff = git::diff_worktree(workdir);

    if let Err(e) = git::reset_index(workdir) {
        warn!("failed to revert intent-to-add registration: {e}");
    }

    diff
}
