//! The commit run: a single pass from change detection to commit or
//! rollback.
//!
//! Rollback is an exit invariant, not a side effect of error handling.
//! Once a version bump has been staged, every path out of the run
//! (decline, dry run, interrupt, commit failure) settles the transaction
//! through the same compensating action.

use std::path::Path;

use dialoguer::Confirm;

use crate::changes::detect_changes;
use crate::config::Config;
use crate::error::{GitError, RunError};
use crate::git;
use crate::message::{annotate_title, generate_message, FALLBACK_MESSAGE};
use crate::provider::{GeminiClient, TextModel, DEFAULT_MODELS};
use crate::version::{update_version, VersionStore, VersionTransaction};

/// CLI-derived knobs for one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Generate the message but stop before confirmation and commit.
    pub dry_run: bool,
    /// Answer both yes/no prompts affirmatively.
    pub assume_yes: bool,
    /// Disable the version workflow regardless of configuration.
    pub no_versioning: bool,
}

/// Run the commit workflow in the current directory.
pub async fn run(config: &Config, options: &RunOptions) -> Result<(), RunError> {
    git::git_available()?;

    let workdir = std::env::current_dir().map_err(RunError::WorkingDirectory)?;

    let client = GeminiClient::new(config.api_key.clone()).map_err(RunError::HttpClient)?;

    execute(&workdir, &client, config, options).await
}

/// The run proper, with the working directory and model client injected.
async fn execute(
    workdir: &Path,
    client: &dyn TextModel,
    config: &Config,
    options: &RunOptions,
) -> Result<(), RunError> {
    println!("Working directory: {}", workdir.display());

    ensure_repository(workdir, config, options)?;

    let Some(diff) = detect_changes(workdir) else {
        return Ok(());
    };

    let store = VersionStore::new(workdir);

    let versioning = config.versioning_enabled && !options.no_versioning;
    let transaction = if versioning {
        update_version(&store, client, &DEFAULT_MODELS, &diff).await
    } else {
        None
    };

    // From here on every exit settles the transaction.
    match finish(client, &store, &diff, transaction.as_ref(), options).await {
        Outcome::Committed => Ok(()),
        Outcome::NotCommitted => {
            if let Some(t) = &transaction {
                store.roll_back(&t.previous);
            }
            Ok(())
        }
        Outcome::CommitFailed(e) => {
            if let Some(t) = &transaction {
                store.roll_back(&t.previous);
            }
            Err(RunError::CommitFailed(e))
        }
    }
}

/// Verify the directory is a repository, offering to initialize one.
///
/// Declining the offer ends the run with nothing changed.
fn ensure_repository(
    workdir: &Path,
    config: &Config,
    options: &RunOptions,
) -> Result<(), RunError> {
    if git::is_repository(workdir) {
        return Ok(());
    }

    let initialize = options.assume_yes
        || Confirm::new()
            .with_prompt("Not a git repository. Initialize one here?")
            .default(false)
            .interact()
            .unwrap_or(false);

    if !initialize {
        println!("Operation cancelled.");
        return Err(RunError::RepositoryDeclined);
    }

    git::init_repository(workdir).map_err(RunError::InitFailed)?;
    git::set_committer(workdir, &config.git_user_name, &config.git_user_email)
        .map_err(RunError::InitFailed)?;
    println!("Repository initialized.");
    Ok(())
}

/// How the post-bump half of the run ended.
enum Outcome {
    Committed,
    NotCommitted,
    CommitFailed(GitError),
}

/// Message generation, confirmation, and commit application.
///
/// Never rolls back itself; it reports how things went and the caller
/// applies the compensating action.
async fn finish(
    client: &dyn TextModel,
    store: &VersionStore,
    diff: &str,
    transaction: Option<&VersionTransaction>,
    options: &RunOptions,
) -> Outcome {
    // An interrupt while waiting on the remote counts as a decline.
    let mut message = tokio::select! {
        message = generate_message(client, &DEFAULT_MODELS, diff) => message,
        _ = tokio::signal::ctrl_c() => {
            println!();
            println!("Run interrupted.");
            return Outcome::NotCommitted;
        }
    };

    if let Some(t) = transaction {
        message = annotate_title(&message, &t.new);
    }

    println!();
    if message == FALLBACK_MESSAGE {
        println!("Message that will be used: '{message}'");
    } else {
        println!("Generated message:\n{message}");
    }

    if options.dry_run {
        println!();
        println!("Dry run: no commit created.");
        return Outcome::NotCommitted;
    }

    // dialoguer reports Ctrl-C during the wait as an error, which counts
    // as a decline.
    let confirmed = options.assume_yes
        || Confirm::new()
            .with_prompt("Use this message for the commit?")
            .default(false)
            .interact()
            .unwrap_or(false);

    if !confirmed {
        println!("Commit cancelled.");
        return Outcome::NotCommitted;
    }

    let commit_result =
        git::stage_all(store.workdir()).and_then(|()| git::commit(store.workdir(), &message));

    match commit_result {
        Ok(()) => {
            println!("Commit created.");
            Outcome::Committed
        }
        Err(e) => {
            eprintln!("Failed to create commit: {e}");
            Outcome::CommitFailed(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::testing::ScriptedModel;
    use crate::provider::CallOutcome;
    use semver::Version;

    fn test_config(versioning: bool) -> Config {
        Config {
            api_key: "test-key".to_string(),
            git_user_name: "Test".to_string(),
            git_user_email: "test@test.com".to_string(),
            versioning_enabled: versioning,
        }
    }

    fn init_repo_with_commit(dir: &Path) {
        git::init_repository(dir).unwrap();
        git::set_committer(dir, "Test", "test@test.com").unwrap();
        std::fs::write(dir.join("base.txt"), "base\n").unwrap();
        git::stage_all(dir).unwrap();
        git::commit(dir, "init").unwrap();
    }

    fn last_commit_message(dir: &Path) -> String {
        let output = std::process::Command::new("git")
            .current_dir(dir)
            .args(["log", "-1", "--pretty=%B"])
            .output()
            .unwrap();
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    #[tokio::test]
    async fn test_clean_tree_makes_no_remote_calls() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_commit(dir.path());

        let model = ScriptedModel::new(vec![]);
        let options = RunOptions {
            assume_yes: true,
            ..Default::default()
        };

        execute(dir.path(), &model, &test_config(true), &options)
            .await
            .unwrap();

        assert!(model.calls.lock().unwrap().is_empty());
        assert_eq!(last_commit_message(dir.path()), "init");
    }

    #[tokio::test]
    async fn test_empty_directory_ends_at_change_detection_after_init() {
        let dir = tempfile::tempdir().unwrap();

        let model = ScriptedModel::new(vec![]);
        let options = RunOptions {
            assume_yes: true,
            ..Default::default()
        };

        execute(dir.path(), &model, &test_config(true), &options)
            .await
            .unwrap();

        // The initialization offer was taken, then the run ended with
        // nothing to commit and no remote calls
        assert!(git::is_repository(dir.path()));
        assert!(model.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_commit_with_version_annotated_title() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_commit(dir.path());

        let store = VersionStore::new(dir.path());
        store.write(&Version::new(1, 2, 3)).unwrap();
        git::stage_all(dir.path()).unwrap();
        git::commit(dir.path(), "add version record").unwrap();

        std::fs::write(dir.path().join("feature.txt"), "new feature\n").unwrap();

        let model = ScriptedModel::new(vec![
            CallOutcome::Text("MINOR".to_string()),
            CallOutcome::Text("Add feature\n\nDetails.".to_string()),
        ]);
        let options = RunOptions {
            assume_yes: true,
            ..Default::default()
        };

        execute(dir.path(), &model, &test_config(true), &options)
            .await
            .unwrap();

        assert_eq!(store.read().unwrap(), Version::new(1, 3, 0));
        let message = last_commit_message(dir.path());
        assert!(message.starts_with("Add feature (v1.3.0)"));
        assert!(message.contains("Details."));
    }

    #[tokio::test]
    async fn test_dry_run_rolls_back_staged_bump() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_commit(dir.path());

        let store = VersionStore::new(dir.path());
        store.write(&Version::new(1, 4, 2)).unwrap();
        git::stage_all(dir.path()).unwrap();
        git::commit(dir.path(), "add version record").unwrap();

        std::fs::write(dir.path().join("feature.txt"), "breaking\n").unwrap();

        let model = ScriptedModel::new(vec![
            CallOutcome::Text("MAJOR".to_string()),
            CallOutcome::Text("Break everything".to_string()),
        ]);
        let options = RunOptions {
            dry_run: true,
            assume_yes: true,
            ..Default::default()
        };

        execute(dir.path(), &model, &test_config(true), &options)
            .await
            .unwrap();

        // Record restored, record unstaged, no commit created
        assert_eq!(store.read().unwrap(), Version::new(1, 4, 2));
        let status = git::status_porcelain(dir.path()).unwrap();
        assert!(!status.lines().any(|l| l.starts_with("M  VERSION")));
        assert_eq!(last_commit_message(dir.path()), "add version record");
    }

    #[tokio::test]
    async fn test_versioning_disabled_skips_classification() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_commit(dir.path());

        std::fs::write(dir.path().join("fix.txt"), "fix\n").unwrap();

        let model = ScriptedModel::new(vec![CallOutcome::Text("Fix something".to_string())]);
        let options = RunOptions {
            assume_yes: true,
            ..Default::default()
        };

        execute(dir.path(), &model, &test_config(false), &options)
            .await
            .unwrap();

        // Only the message generation call happened
        assert_eq!(model.calls.lock().unwrap().len(), 1);
        assert!(!dir.path().join("VERSION").exists());
        assert_eq!(last_commit_message(dir.path()), "Fix something");
    }

    #[tokio::test]
    async fn test_fallback_message_commits_when_confirmed() {
        let dir = tempfile::tempdir().unwrap();
        init_repo_with_commit(dir.path());

        std::fs::write(dir.path().join("change.txt"), "x\n").unwrap();

        let model = ScriptedModel::new(vec![
            CallOutcome::ModelUnsupported(404),
            CallOutcome::Failed("down".to_string()),
            CallOutcome::Failed("down".to_string()),
        ]);
        let options = RunOptions {
            assume_yes: true,
            ..Default::default()
        };

        execute(dir.path(), &model, &test_config(false), &options)
            .await
            .unwrap();

        assert_eq!(last_commit_message(dir.path()), FALLBACK_MESSAGE);
    }
}
