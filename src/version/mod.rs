//! Semantic-version management: the VERSION record, severity
//! classification, and the bump transaction.

pub mod bump;
pub mod classify;
pub mod store;

pub use bump::{increment, Severity};
pub use classify::classify_severity;
pub use store::{VersionStore, VERSION_FILE};

use semver::Version;

use crate::provider::TextModel;

/// The pairing created when a bump is staged; lives for one run and either
/// becomes permanent with the commit or is rolled back.
#[derive(Debug, Clone)]
pub struct VersionTransaction {
    pub new: Version,
    pub previous: Version,
}

/// Classify the diff, bump the version, persist it, and stage the record.
///
/// Returns `None` when the current version should stand: the record could
/// not be read or written, or the computed version equals the current one.
/// The caller keeps the returned transaction for potential rollback.
pub async fn update_version(
    store: &VersionStore,
    client: &dyn TextModel,
    models: &[&str],
    diff: &str,
) -> Option<VersionTransaction> {
    let current = match store.read() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Could not read version record: {e}");
            return None;
        }
    };
    println!("Current version: {current}");

    println!("Classifying change severity for versioning...");
    let severity = classify_severity(client, models, diff).await;

    let new = increment(&current, severity);
    if new == current {
        println!("Version stays at {current}.");
        return None;
    }

    println!("{severity} increment: {current} -> {new}");
    if let Err(e) = store.write(&new) {
        eprintln!("Could not write version record: {e}");
        return None;
    }
    store.stage_for_commit();

    Some(VersionTransaction {
        new,
        previous: current,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedModel;
    use crate::provider::CallOutcome;

    #[tokio::test]
    async fn test_minor_classification_stages_a_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());
        store.write(&Version::new(1, 2, 3)).unwrap();

        let model = ScriptedModel::new(vec![CallOutcome::Text("MINOR".to_string())]);
        let transaction = update_version(&store, &model, &["a"], "+x")
            .await
            .unwrap();

        assert_eq!(transaction.previous, Version::new(1, 2, 3));
        assert_eq!(transaction.new, Version::new(1, 3, 0));
        assert_eq!(store.read().unwrap(), Version::new(1, 3, 0));
    }

    #[tokio::test]
    async fn test_failed_classification_still_bumps_patch() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());
        store.write(&Version::new(0, 9, 9)).unwrap();

        let model = ScriptedModel::new(vec![CallOutcome::Failed("down".to_string())]);
        let transaction = update_version(&store, &model, &["a"], "+x")
            .await
            .unwrap();

        assert_eq!(transaction.new, Version::new(0, 9, 10));
    }

    #[tokio::test]
    async fn test_absent_record_bumps_from_initial() {
        let dir = tempfile::tempdir().unwrap();
        let store = VersionStore::new(dir.path());

        let model = ScriptedModel::new(vec![CallOutcome::Text("MAJOR".to_string())]);
        let transaction = update_version(&store, &model, &["a"], "+x")
            .await
            .unwrap();

        assert_eq!(transaction.previous, Version::new(1, 0, 0));
        assert_eq!(transaction.new, Version::new(2, 0, 0));
    }
}
