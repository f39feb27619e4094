//! Pure formatting functions for operator output.
//!
//! Styling goes through `console`, which drops colors when `NO_COLOR` is set
//! or the stream is not a terminal.

use console::style;

use crate::boundary::GateWarning;
use crate::domain::GateDecision;
use crate::pipeline::ReleasePlan;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().for_stderr(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display a gate warning to the operator.
pub fn display_warning(warning: &GateWarning) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow().for_stderr(), warning);
}

/// One-line summary of a gate decision
pub fn format_decision(decision: &GateDecision) -> String {
    match decision {
        GateDecision::Proceed {
            tag,
            commit,
            created: true,
            ..
        } => format!("New release {} tagged at {}", tag, commit),
        GateDecision::Proceed {
            tag,
            commit,
            created: false,
            ..
        } => format!("Dry run: would tag {} at {}", tag, commit),
        GateDecision::Abort { tag, reason, .. } => {
            format!("Nothing to do: {} {}", tag, reason)
        }
    }
}

/// Display the gate decision.
///
/// A proceed is a success; an abort is the expected "nothing to do" status.
pub fn display_decision(decision: &GateDecision) {
    let summary = format_decision(decision);
    if decision.is_proceed() {
        display_success(&summary);
    } else {
        display_status(&summary);
    }
}

/// Display the per-target jobs a plan fans out to.
pub fn display_plan(plan: &ReleasePlan) {
    println!(
        "\n{}",
        style(format!("Release plan for {}", plan.tag)).bold()
    );
    for (i, target) in plan.targets().iter().enumerate() {
        println!("  {}. {}", i + 1, target);
    }
}

/// Display configured build targets.
pub fn display_targets(targets: &[String]) {
    println!("{}", style("Configured targets:").bold());
    for target in targets {
        println!("  - {}", target);
    }
}

/// Display manual push instruction for a tag that was only created locally.
pub fn display_manual_push_instruction(tag: &str, remote: &str) {
    println!(
        "\n{} To push this tag later, run:\n  {}",
        style("→").yellow(),
        style(format!("git push {} refs/tags/{}", remote, tag)).cyan()
    );
}
