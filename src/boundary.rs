use std::fmt;

/// Non-fatal findings made while gating a release.
/// These are reported to the operator but never change the decision.
#[derive(Debug, Clone, PartialEq)]
pub enum GateWarning {
    /// Declared version is not valid semver; the raw string is still used
    NonSemverVersion { version: String, reason: String },
    /// Manifest declares several `version = "..."` lines; the first one is used
    MultipleVersionLines { used: String, count: usize },
    /// Another run created the tag between the existence check and the create
    ConcurrentRelease { tag: String },
    /// Remote tags were not fetched; the decision only reflects local tags
    FetchDisabled { remote: String },
    /// Tag was created locally but not pushed
    PushDisabled { tag: String },
}

impl fmt::Display for GateWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateWarning::NonSemverVersion { version, reason } => {
                write!(f, "Version '{}' is not valid semver: {}", version, reason)
            }
            GateWarning::MultipleVersionLines { used, count } => {
                write!(
                    f,
                    "Manifest declares {} version lines; using the first ('{}')",
                    count, used
                )
            }
            GateWarning::ConcurrentRelease { tag } => {
                write!(f, "Tag '{}' was created by a concurrent run", tag)
            }
            GateWarning::FetchDisabled { remote } => {
                write!(
                    f,
                    "Tags were not fetched from '{}'; checking local tags only",
                    remote
                )
            }
            GateWarning::PushDisabled { tag } => {
                write!(f, "Tag '{}' was created locally and not pushed", tag)
            }
        }
    }
}
