//! Change-severity classification through the endpoint chain.

use std::time::Duration;

use tracing::debug;

use super::bump::Severity;
use crate::provider::{request_text, TextModel};

/// Per-endpoint timeout for classification; shorter than message
/// generation since the expected answer is a single word.
pub const CLASSIFY_TIMEOUT: Duration = Duration::from_secs(15);

/// Only this much of the diff is fed into the classification prompt.
pub const MAX_DIFF_CHARS: usize = 5_000;

/// Build the classification prompt around a capped slice of the diff.
fn build_classify_prompt(diff: &str) -> String {
    let capped = truncate_chars(diff, MAX_DIFF_CHARS);
    format!(
        "Analyze the following code changes and determine the change type \
         following Semantic Versioning (SemVer).\n\
         Respond with EXACTLY one of the three words: MAJOR, MINOR or PATCH\n\n\
         - MAJOR: incompatible changes that break the existing API or behavior\n\
         - MINOR: new functionality added in a backwards-compatible manner\n\
         - PATCH: bug fixes and small changes that do not alter functionality\n\n\
         Be conservative: prefer PATCH for fixes and MINOR for new features.\n\
         Use MAJOR only for changes that break compatibility.\n\n\
         Changes:\n{capped}"
    )
}

/// Classify the diff. Unparseable answers and exhausted chains both fall
/// back to PATCH, the conservative default.
pub async fn classify_severity(client: &dyn TextModel, models: &[&str], diff: &str) -> Severity {
    let prompt = build_classify_prompt(diff);

    match request_text(client, models, &prompt, CLASSIFY_TIMEOUT).await {
        Some(answer) => Severity::parse(&answer).unwrap_or_else(|| {
            debug!("unrecognized severity answer: {answer:?}");
            Severity::Patch
        }),
        None => Severity::Patch,
    }
}

/// Take at most `max_chars` characters, never splitting a code point.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
