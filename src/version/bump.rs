//! Semver increment rules.

use std::fmt;

use semver::Version;

/// Severity of a change set, as classified from its diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Major,
    Minor,
    Patch,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Major => "MAJOR",
            Severity::Minor => "MINOR",
            Severity::Patch => "PATCH",
        }
    }

    /// Parse a classifier answer. The answer must be exactly one of the
    /// three keywords after trimming, case-insensitively.
    pub fn parse(answer: &str) -> Option<Self> {
        match answer.trim().to_uppercase().as_str() {
            "MAJOR" => Some(Severity::Major),
            "MINOR" => Some(Severity::Minor),
            "PATCH" => Some(Severity::Patch),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Apply a severity to a version.
///
/// - MAJOR resets minor and patch
/// - MINOR resets patch
/// - PATCH bumps the last component
pub fn increment(current: &Version, severity: Severity) -> Version {
    match severity {
        Severity::Major => Version::new(current.major + 1, 0, 0),
        Severity::Minor => Version::new(current.major, current.minor + 1, 0),
        Severity::Patch => Version::new(current.major, current.minor, current.patch + 1),
    }
}
