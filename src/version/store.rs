//! The on-disk VERSION record.
//!
//! The store is the only code that touches the record or its staged
//! state; callers hold a [`VersionStore`] and go through it.

use std::path::{Path, PathBuf};

use semver::Version;
use tracing::debug;

use crate::error::VersionError;
use crate::git;

/// File holding the persisted version, a single `MAJOR.MINOR.PATCH` line.
pub const VERSION_FILE: &str = "VERSION";

/// Owner of the VERSION record and any staged-but-uncommitted change to it.
pub struct VersionStore {
    workdir: PathBuf,
}

impl VersionStore {
    pub fn new(workdir: impl Into<PathBuf>) -> Self {
        Self {
            workdir: workdir.into(),
        }
    }

    pub fn file_path(&self) -> PathBuf {
        self.workdir.join(VERSION_FILE)
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Read the persisted version.
    ///
    /// An absent record is created with `1.0.0`. Malformed content
    /// normalizes to `1.0.0` in memory; the fix is not persisted until
    /// the next write.
    pub fn read(&self) -> Result<Version, VersionError> {
        let path = self.file_path();
        if !path.exists() {
            let initial = Version::new(1, 0, 0);
            self.write(&initial)?;
            return Ok(initial);
        }

        let raw = std::fs::read_to_string(&path).map_err(VersionError::ReadFailed)?;
        Ok(parse_or_default(&raw))
    }

    /// Persist the version as a single line. On failure the prior on-disk
    /// content is untouched.
    pub fn write(&self, version: &Version) -> Result<(), VersionError> {
        std::fs::write(self.file_path(), format!("{version}\n"))
            .map_err(VersionError::WriteFailed)
    }

    /// Register the record for inclusion in the next commit.
    ///
    /// Non-fatal: staging can fail when there is no repository yet, and
    /// the bump itself is still valid.
    pub fn stage_for_commit(&self) {
        if let Err(e) = git::stage_path(&self.workdir, VERSION_FILE) {
            debug!("could not stage {VERSION_FILE} (ignored): {e}");
        }
    }

    /// Undo a staged bump: take the record out of the staged state
    /// (best-effort) and rewrite the previous content.
    pub fn roll_back(&self, previous: &Version) {
        println!("Restoring previous version: {previous}");

        git::unstage_path(&self.workdir, VERSION_FILE);

        match self.write(previous) {
            Ok(()) => println!("Version restored to {previous}."),
            Err(e) => eprintln!("Could not restore version record: {e}"),
        }
    }
}

/// Parse one line of record content; anything that is not a plain
/// three-component version falls back to `1.0.0`.
fn parse_or_default(raw: &str) -> Version {
    let trimmed = raw.trim();
    match Version::parse(trimmed) {
        Ok(v) if v.pre.is_empty() && v.build.is_empty() => v,
        _ => Version::new(1, 0, 0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_record_is_created_with_initial_version() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        let version = store.read().unwrap();
        assert_eq!(version, Version::new(1, 0, 0));
        assert_eq!(
            std::fs::read_to_string(store.file_path()).unwrap(),
            "1.0.0\n"
        );
    }

    #[test]
    fn test_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        let version = Version::new(4, 7, 19);
        store.write(&version).unwrap();
        assert_eq!(store.read().unwrap(), version);
    }

    #[test]
    fn test_malformed_record_normalizes_without_persisting() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        std::fs::write(store.file_path(), "not.a.version\n").unwrap();
        assert_eq!(store.read().unwrap(), Version::new(1, 0, 0));
        // The on-disk content is only fixed by the next write
        assert_eq!(
            std::fs::read_to_string(store.file_path()).unwrap(),
            "not.a.version\n"
        );
    }

    #[test]
    fn test_two_component_record_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        std::fs::write(store.file_path(), "1.2\n").unwrap();
        assert_eq!(store.read().unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_prerelease_record_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        std::fs::write(store.file_path(), "1.2.3-beta.1\n").unwrap();
        assert_eq!(store.read().unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_empty_record_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        std::fs::write(store.file_path(), "\n").unwrap();
        assert_eq!(store.read().unwrap(), Version::new(1, 0, 0));
    }

    #[test]
    fn test_roll_back_outside_repository_still_restores_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        store.write(&Version::new(2, 0, 0)).unwrap();
        store.roll_back(&Version::new(1, 4, 2));

        assert_eq!(store.read().unwrap(), Version::new(1, 4, 2));
    }
}
