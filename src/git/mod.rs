//! Git operations over the system `git` binary.
//!
//! Everything shells out through `std::process::Command`, inheriting the
//! user's existing git config and credential store. The functions here are
//! the complete command vocabulary the rest of the crate is allowed to use.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Check that the `git` binary is reachable.
///
/// Uses the `which` crate for cross-platform executable detection.
pub fn git_available() -> Result<(), GitError> {
    if which::which("git").is_err() {
        return Err(GitError::NotInstalled);
    }
    Ok(())
}

/// Whether `workdir` is the root of a git repository.
pub fn is_repository(workdir: &Path) -> bool {
    workdir.join(".git").exists()
}

/// `git init`
pub fn init_repository(workdir: &Path) -> Result<(), GitError> {
    run_git(workdir, &["init"], "init")?;
    Ok(())
}

/// `git config user.name <name>` followed by `git config user.email <email>`.
pub fn set_committer(workdir: &Path, name: &str, email: &str) -> Result<(), GitError> {
    run_git(workdir, &["config", "user.name", name], "config user.name")?;
    run_git(workdir, &["config", "user.email", email], "config user.email")?;
    Ok(())
}

/// `git status --porcelain`, trimmed.
pub fn status_porcelain(workdir: &Path) -> Result<String, GitError> {
    run_git(workdir, &["status", "--porcelain"], "status")
}

/// `git diff` against the index, trimmed.
pub fn diff_worktree(workdir: &Path) -> Result<String, GitError> {
    run_git(workdir, &["diff"], "diff")
}

/// `git diff --no-index <empty> .`: synthesize a diff for a directory that
/// is not under version control, comparing an empty baseline directory
/// against the current tree so every file shows as an addition.
///
/// `diff --no-index` exits 1 whenever differences exist, so the exit status
/// is ignored and stdout is taken as-is.
pub fn diff_no_index(workdir: &Path) -> Result<String, GitError> {
    let baseline = tempfile::tempdir().map_err(|source| GitError::SpawnFailed {
        operation: "diff --no-index",
        source,
    })?;

    let output = Command::new("git")
        .current_dir(workdir)
        .arg("diff")
        .arg("--no-index")
        .arg(baseline.path())
        .arg(".")
        .output()
        .map_err(|source| GitError::SpawnFailed {
            operation: "diff --no-index",
            source,
        })?;

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// `git add -N .`: register untracked entries with intent-to-add so they
/// show up in the next worktree diff without staging their content.
pub fn intent_to_add_all(workdir: &Path) -> Result<(), GitError> {
    run_git(workdir, &["add", "-N", "."], "add -N")?;
    Ok(())
}

/// `git reset`: drop any index registration made by [`intent_to_add_all`].
pub fn reset_index(workdir: &Path) -> Result<(), GitError> {
    run_git(workdir, &["reset"], "reset")?;
    Ok(())
}

/// `git add <path>`
pub fn stage_path(workdir: &Path, path: &str) -> Result<(), GitError> {
    run_git(workdir, &["add", path], "add")?;
    Ok(())
}

/// Remove `path` from the staged state, best-effort.
///
/// Runs both `git reset HEAD <path>` and `git restore --staged <path>`;
/// either may fail in a repository with no commits yet or outside a
/// repository, and both outcomes are ignored.
pub fn unstage_path(workdir: &Path, path: &str) {
    if let Err(e) = run_git(workdir, &["reset", "HEAD", path], "reset HEAD") {
        debug!("unstage via reset failed (ignored): {e}");
    }
    if let Err(e) = run_git(workdir, &["restore", "--staged", path], "restore --staged") {
        debug!("unstage via restore failed (ignored): {e}");
    }
}

/// `git add --all`
pub fn stage_all(workdir: &Path) -> Result<(), GitError> {
    run_git(workdir, &["add", "--all"], "add --all")?;
    Ok(())
}

/// `git commit -m <message>`
pub fn commit(workdir: &Path, message: &str) -> Result<(), GitError> {
    run_git(workdir, &["commit", "-m", message], "commit")?;
    Ok(())
}

/// Run a git command in `workdir` and return its trimmed stdout.
fn run_git(workdir: &Path, args: &[&str], operation: &'static str) -> Result<String, GitError> {
    let output = Command::new("git")
        .current_dir(workdir)
        .args(args)
        .output()
        .map_err(|source| GitError::SpawnFailed { operation, source })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(GitError::NonZeroExit { operation, stderr });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}
