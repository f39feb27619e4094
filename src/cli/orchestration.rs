//! Main workflow orchestration logic
//!
//! Wires configuration, the git release host, the gate and the release plan
//! together. Kept apart from clap so the workflow can be driven
//! programmatically and from tests.

use std::fs;
use std::path::{Path, PathBuf};

use crate::boundary::GateWarning;
use crate::config::Config;
use crate::domain::GateDecision;
use crate::error::{GateError, Result};
use crate::gate::ReleaseGate;
use crate::host::GitReleaseHost;
use crate::outputs;
use crate::pipeline::{self, CommandBuilder, CommandPublisher, ReleaseOutcome, ReleasePlan};
use crate::ui;

/// Arguments for the gate workflow
///
/// Mirrors the CLI Args in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq)]
pub struct GateWorkflowArgs {
    /// Directory inside the repository to gate
    pub repo_dir: PathBuf,

    /// Manifest path overriding the configured one
    pub manifest: Option<PathBuf>,

    /// Revision to tag
    pub commit: String,

    /// Remote overriding the configured one
    pub remote: Option<String>,

    /// Fetch remote tags before checking (still subject to config)
    pub fetch: bool,

    /// Push the created tag (still subject to config)
    pub push: bool,

    /// Decide without creating the tag or running builds
    pub dry_run: bool,

    /// Step output file to append to
    pub output: Option<PathBuf>,

    /// Run the configured build and publish commands after the gate passes
    pub run: bool,
}

impl Default for GateWorkflowArgs {
    fn default() -> Self {
        GateWorkflowArgs {
            repo_dir: PathBuf::from("."),
            manifest: None,
            commit: "HEAD".to_string(),
            remote: None,
            fetch: true,
            push: true,
            dry_run: false,
            output: None,
            run: false,
        }
    }
}

/// Result of a completed gate workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    pub decision: GateDecision,

    /// Present when the gate proceeded
    pub plan: Option<ReleasePlan>,

    /// Present when builds and publish were run
    pub outcome: Option<ReleaseOutcome>,

    pub warnings: Vec<GateWarning>,
}

/// Main gate workflow
///
/// 1. Read the manifest and resolve the commit to tag
/// 2. Fetch remote tags (unless disabled)
/// 3. Evaluate the gate once
/// 4. Write step outputs
/// 5. On proceed, plan per-target jobs and optionally build and publish
///
/// An abort is returned as a normal result; callers decide how to surface it.
pub fn run_gate_workflow(args: &GateWorkflowArgs, config: &Config) -> Result<WorkflowResult> {
    config.validate()?;

    let manifest_path = args
        .repo_dir
        .join(args.manifest.as_ref().unwrap_or(&config.manifest));
    let contents = read_manifest(&manifest_path)?;

    let remote = args
        .remote
        .clone()
        .unwrap_or_else(|| config.remote.name.clone());
    let fetch = args.fetch && config.remote.fetch;
    let push = args.push && config.remote.push && !args.dry_run;

    let host = GitReleaseHost::open(&args.repo_dir)?.with_remote(remote.clone(), push);
    let commit = host.resolve_commit(&args.commit)?.to_string();

    let mut warnings = Vec::new();
    if fetch {
        ui::display_status(&format!("Fetching tags from '{}'...", remote));
        host.fetch_tags()?;
    } else {
        warnings.push(GateWarning::FetchDisabled {
            remote: remote.clone(),
        });
    }

    let gate = ReleaseGate::new(&host)
        .with_pattern(config.tag_pattern()?)
        .dry_run(args.dry_run);
    let evaluation = gate.evaluate_with_warnings(&contents, &commit)?;
    warnings.extend(evaluation.warnings);
    let decision = evaluation.decision;

    if let GateDecision::Proceed { tag, created: true, .. } = &decision {
        if !host.pushes() {
            warnings.push(GateWarning::PushDisabled { tag: tag.clone() });
        }
    }

    for warning in &warnings {
        ui::display_warning(warning);
    }

    if let Some(output) = &args.output {
        outputs::write_outputs(output, &decision, &config.targets)?;
    }

    ui::display_decision(&decision);
    if !decision.is_proceed() {
        return Ok(WorkflowResult {
            decision,
            plan: None,
            outcome: None,
            warnings,
        });
    }

    if warnings.contains(&GateWarning::PushDisabled {
        tag: decision.tag().to_string(),
    }) {
        ui::display_manual_push_instruction(decision.tag(), &remote);
    }

    let plan = ReleasePlan::from_decision(&decision, &config.targets)?;
    ui::display_plan(&plan);

    let outcome = if !args.run {
        None
    } else if args.dry_run {
        ui::display_status("Dry run: skipping build and publish");
        None
    } else {
        Some(run_configured_release(&plan, config, &host.workdir())?)
    };

    Ok(WorkflowResult {
        decision,
        plan: Some(plan),
        outcome,
        warnings,
    })
}

fn run_configured_release(
    plan: &ReleasePlan,
    config: &Config,
    workdir: &Path,
) -> Result<ReleaseOutcome> {
    let build = config
        .build
        .clone()
        .ok_or_else(|| GateError::config("--run requires a [build] section"))?;
    let publish = config
        .publish
        .clone()
        .ok_or_else(|| GateError::config("--run requires a [publish] section"))?;

    let builder = CommandBuilder::new(build, workdir);
    let publisher = CommandPublisher::new(publish, workdir);

    ui::display_status(&format!(
        "Building {} for {} target(s)",
        plan.tag,
        plan.jobs.len()
    ));
    let outcome = pipeline::run_release(plan, &builder, &publisher)?;
    ui::display_success(&format!(
        "Published {} with {} artifact(s)",
        outcome.tag,
        outcome.artifacts.len()
    ));

    Ok(outcome)
}

fn read_manifest(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        GateError::config(format!("Cannot read manifest '{}': {}", path.display(), e))
    })
}
