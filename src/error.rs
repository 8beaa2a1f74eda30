//! Error types for autocommit modules using thiserror.

use thiserror::Error;

/// Errors from configuration loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "The following environment variables are not set: {}\n\n\
         Copy .env.example to .env and configure your values.",
        .0.join(", ")
    )]
    MissingVariables(Vec<String>),
}

/// Errors from git subprocess invocations.
#[derive(Error, Debug)]
pub enum GitError {
    #[error("git executable not found on PATH. Install git and try again.")]
    NotInstalled,

    #[error("Failed to spawn git {operation}: {source}")]
    SpawnFailed {
        operation: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("git {operation} failed: {stderr}")]
    NonZeroExit {
        operation: &'static str,
        stderr: String,
    },
}

/// Errors from the VERSION record on disk.
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("Failed to read VERSION file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("Failed to write VERSION file: {0}")]
    WriteFailed(#[source] std::io::Error),
}

/// Errors that end a run early.
#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Git(#[from] GitError),

    #[error("Failed to resolve working directory: {0}")]
    WorkingDirectory(#[source] std::io::Error),

    #[error("Not a git repository and initialization was declined")]
    RepositoryDeclined,

    #[error("Failed to initialize repository: {0}")]
    InitFailed(#[source] GitError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("Failed to create commit: {0}")]
    CommitFailed(#[source] GitError),
}
