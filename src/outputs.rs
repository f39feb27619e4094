//! Step outputs in the `key=value` output-file format of CI runners.
//!
//! Downstream stages read `proceed` to decide whether to run at all and
//! `targets` (a JSON array) to fan out one build per target.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::domain::GateDecision;
use crate::error::{GateError, Result};

/// Render the outputs for a decision.
///
/// `proceed` is only true when this run created the tag; a dry run reports
/// `proceed=false` with `dry_run=true` so downstream stages stay idle.
/// `commit` and `targets` are only emitted alongside `proceed=true`.
pub fn render_outputs(decision: &GateDecision, targets: &[String]) -> Result<String> {
    let created = matches!(decision, GateDecision::Proceed { created: true, .. });
    let mut lines = vec![
        format!("proceed={}", created),
        format!("tag={}", decision.tag()),
        format!("version={}", decision.version()),
    ];

    match decision {
        GateDecision::Proceed { commit, created: true, .. } => {
            let targets = serde_json::to_string(targets)
                .map_err(|e| GateError::config(format!("Cannot encode targets: {}", e)))?;
            lines.push(format!("commit={}", commit));
            lines.push(format!("targets={}", targets));
        }
        GateDecision::Proceed { created: false, .. } => lines.push("dry_run=true".to_string()),
        GateDecision::Abort { .. } => {}
    }

    let mut rendered = lines.join("\n");
    rendered.push('\n');
    Ok(rendered)
}

/// Append the outputs for a decision to `path`, creating it if needed
pub fn write_outputs(path: &Path, decision: &GateDecision, targets: &[String]) -> Result<()> {
    let rendered = render_outputs(decision, targets)?;

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(rendered.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::AbortReason;

    fn targets() -> Vec<String> {
        vec![
            "x86_64-unknown-linux-gnu".to_string(),
            "aarch64-apple-darwin".to_string(),
        ]
    }

    #[test]
    fn test_proceed_outputs() {
        let decision = GateDecision::Proceed {
            version: "2.3.1".to_string(),
            tag: "v2.3.1".to_string(),
            commit: "abc123".to_string(),
            created: true,
        };

        let rendered = render_outputs(&decision, &targets()).unwrap();
        assert_eq!(
            rendered,
            "proceed=true\ntag=v2.3.1\nversion=2.3.1\ncommit=abc123\n\
             targets=[\"x86_64-unknown-linux-gnu\",\"aarch64-apple-darwin\"]\n"
        );
    }

    #[test]
    fn test_dry_run_outputs_do_not_proceed() {
        let decision = GateDecision::Proceed {
            version: "2.3.1".to_string(),
            tag: "v2.3.1".to_string(),
            commit: "abc123".to_string(),
            created: false,
        };

        let rendered = render_outputs(&decision, &targets()).unwrap();
        assert_eq!(
            rendered,
            "proceed=false\ntag=v2.3.1\nversion=2.3.1\ndry_run=true\n"
        );
    }

    #[test]
    fn test_abort_outputs_omit_targets() {
        let decision = GateDecision::Abort {
            version: "2.3.1".to_string(),
            tag: "v2.3.1".to_string(),
            reason: AbortReason::AlreadyReleased,
        };

        let rendered = render_outputs(&decision, &targets()).unwrap();
        assert_eq!(rendered, "proceed=false\ntag=v2.3.1\nversion=2.3.1\n");
    }

    #[test]
    fn test_write_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("outputs");
        std::fs::write(&path, "existing=1\n").unwrap();

        let decision = GateDecision::Abort {
            version: "1.0.0".to_string(),
            tag: "v1.0.0".to_string(),
            reason: AbortReason::AlreadyReleased,
        };
        write_outputs(&path, &decision, &[]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("existing=1\nproceed=false\n"));
    }
}
