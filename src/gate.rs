//! The release gate: one decision per pipeline run.
//!
//! Reads the declared version, asks the release host whether it has been
//! released, and marks a new release point when it has not. The gate has two
//! terminal outcomes, [GateDecision::Proceed] and [GateDecision::Abort], and
//! never retries.

use crate::boundary::GateWarning;
use crate::domain::{AbortReason, GateDecision, TagPattern, VersionToken};
use crate::error::Result;
use crate::host::ReleaseHost;

/// Version-gated release trigger over a [ReleaseHost]
pub struct ReleaseGate<H: ReleaseHost> {
    host: H,
    pattern: TagPattern,
    dry_run: bool,
}

/// A decision together with the non-fatal findings made while reaching it
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub decision: GateDecision,
    pub warnings: Vec<GateWarning>,
}

impl<H: ReleaseHost> ReleaseGate<H> {
    /// Create a gate using the default `v{version}` tag pattern
    pub fn new(host: H) -> Self {
        ReleaseGate {
            host,
            pattern: TagPattern::default(),
            dry_run: false,
        }
    }

    pub fn with_pattern(mut self, pattern: TagPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// In dry-run mode the gate decides but never creates the tag
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Decide whether the manifest's version is a new release.
    ///
    /// On `Proceed` (outside dry run) the tag has been created at `commit_ref`.
    /// On `Abort` nothing was changed.
    ///
    /// # Errors
    /// * `GateError::Config` - No usable `version = "..."` line
    /// * `GateError::ExternalService` - The host could not be queried or refused the tag
    pub fn evaluate(&self, manifest_contents: &str, commit_ref: &str) -> Result<GateDecision> {
        self.evaluate_with_warnings(manifest_contents, commit_ref)
            .map(|evaluation| evaluation.decision)
    }

    /// Same as [ReleaseGate::evaluate], also returning the warnings raised on the way
    pub fn evaluate_with_warnings(
        &self,
        manifest_contents: &str,
        commit_ref: &str,
    ) -> Result<Evaluation> {
        let token = VersionToken::from_manifest(manifest_contents)?;
        let tag = self.pattern.tag_for(&token);
        let mut warnings = manifest_warnings(manifest_contents, &token);

        if self.host.release_exists(&tag)? {
            return Ok(Evaluation {
                decision: abort(&token, tag),
                warnings,
            });
        }

        if self.dry_run {
            return Ok(Evaluation {
                decision: GateDecision::Proceed {
                    version: token.raw().to_string(),
                    tag,
                    commit: commit_ref.to_string(),
                    created: false,
                },
                warnings,
            });
        }

        // Lost the race against a concurrent run: the other run owns this release.
        if !self.host.create_tag(&tag, commit_ref)? {
            warnings.push(GateWarning::ConcurrentRelease { tag: tag.clone() });
            return Ok(Evaluation {
                decision: abort(&token, tag),
                warnings,
            });
        }

        Ok(Evaluation {
            decision: GateDecision::Proceed {
                version: token.raw().to_string(),
                tag,
                commit: commit_ref.to_string(),
                created: true,
            },
            warnings,
        })
    }
}

fn abort(token: &VersionToken, tag: String) -> GateDecision {
    GateDecision::Abort {
        version: token.raw().to_string(),
        tag,
        reason: AbortReason::AlreadyReleased,
    }
}

fn manifest_warnings(contents: &str, token: &VersionToken) -> Vec<GateWarning> {
    let mut warnings = Vec::new();

    if let Err(e) = token.semver() {
        warnings.push(GateWarning::NonSemverVersion {
            version: token.raw().to_string(),
            reason: e.to_string(),
        });
    }

    let declarations = VersionToken::count_declarations(contents);
    if declarations > 1 {
        warnings.push(GateWarning::MultipleVersionLines {
            used: token.raw().to_string(),
            count: declarations,
        });
    }

    warnings
}
