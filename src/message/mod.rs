//! Commit message generation.
//!
//! Builds the instruction prompt around the diff, walks the endpoint
//! chain, and falls back to a fixed message when no endpoint answers.
//! Generation never fails past this boundary.

use std::time::Duration;

use semver::Version;

use crate::provider::{request_text, TextModel};

/// Message used when every endpoint fails.
pub const FALLBACK_MESSAGE: &str = "Automatic commit";

/// Per-endpoint timeout for message generation.
pub const GENERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the instruction prompt embedding the diff verbatim.
pub fn build_message_prompt(diff: &str) -> String {
    format!(
        "Write a detailed commit message describing the following changes. \
         The first line of your answer must be the title:\n{diff}"
    )
}

/// Generate a commit message for `diff`, or the fixed fallback.
pub async fn generate_message(client: &dyn TextModel, models: &[&str], diff: &str) -> String {
    let prompt = build_message_prompt(diff);

    println!("Generating commit message...");

    match request_text(client, models, &prompt, GENERATION_TIMEOUT).await {
        Some(message) => message,
        None => {
            eprintln!("No model produced a commit message.");
            println!("Using fallback message: '{FALLBACK_MESSAGE}'");
            FALLBACK_MESSAGE.to_string()
        }
    }
}

/// Append a version tag to the message's title line, preserving the body.
///
/// `"Fix parser\n\ndetails"` with version 1.3.0 becomes
/// `"Fix parser (v1.3.0)\n\ndetails"`.
pub fn annotate_title(message: &str, version: &Version) -> String {
    match message.split_once('\n') {
        Some((title, rest)) => format!("{title} (v{version})\n{rest}"),
        None => format!("{message} (v{version})"),
    }
}
