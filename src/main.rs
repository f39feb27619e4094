use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use release_gate::cli::{run_gate_workflow, GateWorkflowArgs};
use release_gate::{config, ui, GateError};

#[derive(clap::Parser)]
#[command(
    name = "release-gate",
    about = "Tag a new release when the manifest version has not been released yet"
)]
struct Args {
    #[arg(short, long, help = "Custom configuration file path")]
    config: Option<String>,

    #[arg(short, long, help = "Manifest declaring the version [default: Cargo.toml]")]
    manifest: Option<PathBuf>,

    #[arg(
        long,
        env = "GITHUB_SHA",
        default_value = "HEAD",
        help = "Commit to tag"
    )]
    commit: String,

    #[arg(long, help = "Remote to fetch tags from and push the new tag to")]
    remote: Option<String>,

    #[arg(long, help = "Check local tags only; do not fetch from the remote")]
    no_fetch: bool,

    #[arg(long, help = "Create the tag locally without pushing it")]
    no_push: bool,

    #[arg(long, help = "Preview the decision without creating a tag")]
    dry_run: bool,

    #[arg(short, long, env = "GITHUB_OUTPUT", help = "Append step outputs to this file")]
    output: Option<PathBuf>,

    #[arg(long, help = "Run the configured build and publish commands when the gate passes")]
    run: bool,

    #[arg(long, help = "Show configured build targets and exit")]
    list_targets: bool,

    #[arg(short, long, help = "Print version information")]
    version: bool,
}

fn main() {
    let args = Args::parse();

    if let Err(err) = run(args) {
        let gate_err = err.downcast_ref::<GateError>();

        // The decision summary already told the operator there is nothing to do.
        if !gate_err.is_some_and(GateError::is_duplicate) {
            ui::display_error(&format!("{:#}", err));
        }
        std::process::exit(gate_err.map(GateError::exit_code).unwrap_or(2));
    }
}

fn run(args: Args) -> Result<()> {
    if args.version {
        println!("release-gate {}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config =
        config::load_config(args.config.as_deref()).context("Error loading config")?;

    if args.list_targets {
        ui::display_targets(&config.targets);
        return Ok(());
    }

    let workflow_args = GateWorkflowArgs {
        repo_dir: PathBuf::from("."),
        manifest: args.manifest,
        commit: args.commit,
        remote: args.remote,
        fetch: !args.no_fetch,
        push: !args.no_push,
        dry_run: args.dry_run,
        output: args.output,
        run: args.run,
    };

    let result = run_gate_workflow(&workflow_args, &config)?;
    result.decision.into_result()?;

    Ok(())
}
