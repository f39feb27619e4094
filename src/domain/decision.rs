use std::fmt;

use serde::Serialize;

use crate::error::{GateError, Result};

/// Why the gate stopped the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    /// A release with this tag already exists
    AlreadyReleased,
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::AlreadyReleased => write!(f, "already released"),
        }
    }
}

/// Terminal outcome of a single gate evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    /// New release point; downstream stages run
    Proceed {
        version: String,
        tag: String,
        commit: String,
        /// False when the tag was only planned (dry run)
        created: bool,
    },
    /// Nothing to do; downstream stages are skipped
    Abort {
        version: String,
        tag: String,
        reason: AbortReason,
    },
}

impl GateDecision {
    pub fn tag(&self) -> &str {
        match self {
            GateDecision::Proceed { tag, .. } | GateDecision::Abort { tag, .. } => tag,
        }
    }

    pub fn version(&self) -> &str {
        match self {
            GateDecision::Proceed { version, .. } | GateDecision::Abort { version, .. } => version,
        }
    }

    pub fn is_proceed(&self) -> bool {
        matches!(self, GateDecision::Proceed { .. })
    }

    /// Convert an abort into `GateError::DuplicateVersion`
    pub fn into_result(self) -> Result<GateDecision> {
        match self {
            GateDecision::Abort { tag, .. } => Err(GateError::DuplicateVersion { tag }),
            proceed => Ok(proceed),
        }
    }
}
