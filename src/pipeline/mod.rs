//! Fan-out of a single gate decision to per-target builds and one publish.
//!
//! The gate runs once. Its decision becomes a [ReleasePlan] holding one
//! [BuildJob] per target; jobs are built independently and never evaluate
//! the gate again.

pub mod command;

pub use command::{CommandBuilder, CommandPublisher, ReleaseContext};

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Serialize;

use crate::domain::GateDecision;
use crate::error::{GateError, Result};

/// One independent build for a target platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildJob {
    pub target: String,
}

/// Everything downstream stages need from a passed gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
    pub tag: String,
    pub version: String,
    pub commit: String,
    pub jobs: Vec<BuildJob>,
}

impl ReleasePlan {
    /// Build a plan from a `Proceed` decision.
    ///
    /// # Errors
    /// * `GateError::DuplicateVersion` - The decision was an abort
    /// * `GateError::Config` - No targets, or a target listed twice
    pub fn from_decision(decision: &GateDecision, targets: &[String]) -> Result<Self> {
        let GateDecision::Proceed {
            version,
            tag,
            commit,
            ..
        } = decision
        else {
            return Err(GateError::DuplicateVersion {
                tag: decision.tag().to_string(),
            });
        };

        if targets.is_empty() {
            return Err(GateError::config("A release plan needs at least one target"));
        }

        let mut seen = HashSet::new();
        let mut jobs = Vec::with_capacity(targets.len());
        for target in targets {
            if !seen.insert(target.as_str()) {
                return Err(GateError::config(format!(
                    "Build target '{}' is listed more than once",
                    target
                )));
            }
            jobs.push(BuildJob {
                target: target.clone(),
            });
        }

        Ok(ReleasePlan {
            tag: tag.clone(),
            version: version.clone(),
            commit: commit.clone(),
            jobs,
        })
    }

    /// Target names in plan order
    pub fn targets(&self) -> Vec<&str> {
        self.jobs.iter().map(|job| job.target.as_str()).collect()
    }
}

/// Produces the artifacts for one target
pub trait Builder {
    fn build(&self, plan: &ReleasePlan, job: &BuildJob) -> Result<Vec<PathBuf>>;
}

/// Creates or updates the release labelled `plan.tag` with the given artifacts
pub trait Publisher {
    fn publish(&self, plan: &ReleasePlan, artifacts: &[PathBuf]) -> Result<()>;
}

/// What a completed release produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseOutcome {
    pub tag: String,
    pub artifacts: Vec<PathBuf>,
}

/// Build every job, then publish once.
///
/// Stops at the first failing build; the publisher is then never called and
/// the already created tag is left in place.
pub fn run_release<B, P>(plan: &ReleasePlan, builder: &B, publisher: &P) -> Result<ReleaseOutcome>
where
    B: Builder + ?Sized,
    P: Publisher + ?Sized,
{
    let mut artifacts = Vec::new();
    for job in &plan.jobs {
        artifacts.extend(builder.build(plan, job)?);
    }

    publisher.publish(plan, &artifacts)?;

    Ok(ReleaseOutcome {
        tag: plan.tag.clone(),
        artifacts,
    })
}
