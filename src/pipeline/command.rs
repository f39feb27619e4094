use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::{BuildConfig, PublishConfig};
use crate::error::{GateError, Result};
use crate::pipeline::{BuildJob, Builder, Publisher, ReleasePlan};

/// Values substituted into command templates and exported to commands
#[derive(Debug, Clone)]
pub struct ReleaseContext {
    pub tag: String,
    pub version: String,
    pub commit: String,
    pub target: Option<String>,
    pub artifacts: Vec<PathBuf>,
}

impl ReleaseContext {
    fn for_plan(plan: &ReleasePlan) -> Self {
        ReleaseContext {
            tag: plan.tag.clone(),
            version: plan.version.clone(),
            commit: plan.commit.clone(),
            target: None,
            artifacts: Vec::new(),
        }
    }

    /// Replace `{tag}`, `{version}`, `{commit}`, `{target}` and `{artifacts}`
    pub fn render(&self, template: &str) -> String {
        let artifacts = self
            .artifacts
            .iter()
            .map(|path| path.display().to_string())
            .collect::<Vec<_>>()
            .join(" ");

        template
            .replace("{tag}", &self.tag)
            .replace("{version}", &self.version)
            .replace("{commit}", &self.commit)
            .replace("{target}", self.target.as_deref().unwrap_or(""))
            .replace("{artifacts}", &artifacts)
    }

    /// Maps context fields to RELEASEGATE_* environment variables
    pub fn to_env_vars(&self) -> HashMap<String, String> {
        let mut env = HashMap::new();

        env.insert("RELEASEGATE_TAG".to_string(), self.tag.clone());
        env.insert("RELEASEGATE_VERSION".to_string(), self.version.clone());
        env.insert("RELEASEGATE_COMMIT".to_string(), self.commit.clone());

        if let Some(ref target) = self.target {
            env.insert("RELEASEGATE_TARGET".to_string(), target.clone());
        }

        if !self.artifacts.is_empty() {
            let joined = self
                .artifacts
                .iter()
                .map(|path| path.display().to_string())
                .collect::<Vec<_>>()
                .join("\n");
            env.insert("RELEASEGATE_ARTIFACTS".to_string(), joined);
        }

        env
    }
}

/// Runs `command` through `sh -c` in `workdir`.
///
/// Returns a description of the failure (exit code, stdout, stderr) on a
/// non-zero exit so callers can wrap it in their own error variant.
fn run_shell(command: &str, workdir: &Path, context: &ReleaseContext) -> std::result::Result<(), String> {
    let rendered = context.render(command);

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&rendered).current_dir(workdir);
    for (key, value) in context.to_env_vars() {
        cmd.env(key, value);
    }

    let output = cmd
        .output()
        .map_err(|e| format!("Failed to execute '{}': {}", rendered, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        return Err(format!(
            "'{}' failed with exit code {}\nStdout: {}\nStderr: {}",
            rendered,
            output.status.code().unwrap_or(-1),
            stdout.trim_end(),
            stderr.trim_end()
        ));
    }

    Ok(())
}

/// Builder running the configured `[build]` command once per target
pub struct CommandBuilder {
    config: BuildConfig,
    workdir: PathBuf,
}

impl CommandBuilder {
    pub fn new(config: BuildConfig, workdir: impl Into<PathBuf>) -> Self {
        CommandBuilder {
            config,
            workdir: workdir.into(),
        }
    }
}

impl Builder for CommandBuilder {
    fn build(&self, plan: &ReleasePlan, job: &BuildJob) -> Result<Vec<PathBuf>> {
        let mut context = ReleaseContext::for_plan(plan);
        context.target = Some(job.target.clone());

        run_shell(&self.config.command, &self.workdir, &context)
            .map_err(|message| GateError::build(&job.target, message))?;

        let mut artifacts = Vec::with_capacity(self.config.artifacts.len());
        for template in &self.config.artifacts {
            let path = self.workdir.join(context.render(template));
            if !path.is_file() {
                return Err(GateError::build(
                    &job.target,
                    format!("expected artifact not found: {}", path.display()),
                ));
            }
            artifacts.push(path);
        }

        Ok(artifacts)
    }
}

/// Publisher running the configured `[publish]` command once
pub struct CommandPublisher {
    config: PublishConfig,
    workdir: PathBuf,
}

impl CommandPublisher {
    pub fn new(config: PublishConfig, workdir: impl Into<PathBuf>) -> Self {
        CommandPublisher {
            config,
            workdir: workdir.into(),
        }
    }
}

impl Publisher for CommandPublisher {
    fn publish(&self, plan: &ReleasePlan, artifacts: &[PathBuf]) -> Result<()> {
        let mut context = ReleaseContext::for_plan(plan);
        context.artifacts = artifacts.to_vec();

        run_shell(&self.config.command, &self.workdir, &context).map_err(GateError::publish)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan() -> ReleasePlan {
        ReleasePlan {
            tag: "v1.2.3".to_string(),
            version: "1.2.3".to_string(),
            commit: "abc123".to_string(),
            jobs: vec![BuildJob {
                target: "x86_64-unknown-linux-gnu".to_string(),
            }],
        }
    }

    #[test]
    fn test_render_placeholders() {
        let mut context = ReleaseContext::for_plan(&plan());
        context.target = Some("aarch64-apple-darwin".to_string());
        context.artifacts = vec![PathBuf::from("a.tar.gz"), PathBuf::from("a.sha256")];

        assert_eq!(
            context.render("upload {tag} {version} {target} {commit} {artifacts}"),
            "upload v1.2.3 1.2.3 aarch64-apple-darwin abc123 a.tar.gz a.sha256"
        );
    }

    #[test]
    fn test_env_vars_minimal() {
        let env = ReleaseContext::for_plan(&plan()).to_env_vars();
        assert_eq!(env.len(), 3);
        assert_eq!(env.get("RELEASEGATE_TAG"), Some(&"v1.2.3".to_string()));
        assert_eq!(env.get("RELEASEGATE_VERSION"), Some(&"1.2.3".to_string()));
        assert!(env.get("RELEASEGATE_TARGET").is_none());
        assert!(env.get("RELEASEGATE_ARTIFACTS").is_none());
    }

    #[test]
    fn test_env_vars_all_fields() {
        let mut context = ReleaseContext::for_plan(&plan());
        context.target = Some("x86_64-unknown-linux-gnu".to_string());
        context.artifacts = vec![PathBuf::from("a"), PathBuf::from("b")];

        let env = context.to_env_vars();
        assert_eq!(
            env.get("RELEASEGATE_TARGET"),
            Some(&"x86_64-unknown-linux-gnu".to_string())
        );
        assert_eq!(env.get("RELEASEGATE_ARTIFACTS"), Some(&"a\nb".to_string()));
    }

    #[cfg(unix)]
    #[test]
    fn test_builder_collects_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(
            BuildConfig {
                command: "mkdir -p dist && echo built > dist/app-$RELEASEGATE_TARGET.tar.gz"
                    .to_string(),
                artifacts: vec!["dist/app-{target}.tar.gz".to_string()],
            },
            dir.path(),
        );

        let plan = plan();
        let artifacts = builder.build(&plan, &plan.jobs[0]).unwrap();

        assert_eq!(
            artifacts,
            vec![dir.path().join("dist/app-x86_64-unknown-linux-gnu.tar.gz")]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_builder_missing_artifact_fails() {
        let dir = tempfile::tempdir().unwrap();
        let builder = CommandBuilder::new(
            BuildConfig {
                command: "true".to_string(),
                artifacts: vec!["dist/missing-{target}.zip".to_string()],
            },
            dir.path(),
        );

        let plan = plan();
        let err = builder.build(&plan, &plan.jobs[0]).unwrap_err();
        assert!(err.to_string().contains("expected artifact not found"));
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_command_reports_exit_code() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = CommandPublisher::new(
            PublishConfig {
                command: "echo nope >&2; exit 7".to_string(),
            },
            dir.path(),
        );

        let err = publisher.publish(&plan(), &[]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("Publish failed"));
        assert!(msg.contains("exit code 7"));
        assert!(msg.contains("nope"));
    }

    #[cfg(unix)]
    #[test]
    fn test_publisher_receives_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let publisher = CommandPublisher::new(
            PublishConfig {
                command: "printf '%s' \"$RELEASEGATE_TAG {artifacts}\" > published.txt".to_string(),
            },
            dir.path(),
        );

        publisher
            .publish(&plan(), &[PathBuf::from("a.tar.gz"), PathBuf::from("a.sha256")])
            .unwrap();

        let published = std::fs::read_to_string(dir.path().join("published.txt")).unwrap();
        assert_eq!(published, "v1.2.3 a.tar.gz a.sha256");
    }
}
