use std::cell::Cell;
use std::path::{Path, PathBuf};

use git2::{AutotagOption, ErrorCode, FetchOptions, Oid, PushOptions, RemoteCallbacks, Repository};

use crate::error::{GateError, Result};
use crate::host::ReleaseHost;

/// Release host backed by the tag namespace of a git repository.
///
/// When a remote is attached, tags can be fetched from it before the check and
/// every created tag is pushed to it, so the remote is the shared source of truth.
pub struct GitReleaseHost {
    repo: Repository,
    remote: Option<String>,
    push: bool,
}

impl GitReleaseHost {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Repository::discover(path.as_ref()).map_err(|e| {
            GateError::config(format!(
                "Not in a git repository ({}): {}",
                path.as_ref().display(),
                e.message()
            ))
        })?;
        Ok(Self::from_git2(repo))
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Repository) -> Self {
        GitReleaseHost {
            repo,
            remote: None,
            push: false,
        }
    }

    /// Attach a remote used for fetching tags and, if `push` is set, publishing them
    pub fn with_remote(mut self, name: impl Into<String>, push: bool) -> Self {
        self.remote = Some(name.into());
        self.push = push;
        self
    }

    /// Whether created tags are pushed to the remote
    pub fn pushes(&self) -> bool {
        self.push && self.remote.is_some()
    }

    /// Working directory of the repository (the git dir for bare repositories)
    pub fn workdir(&self) -> PathBuf {
        self.repo
            .workdir()
            .unwrap_or_else(|| self.repo.path())
            .to_path_buf()
    }

    /// Fetches all tags from the attached remote.
    ///
    /// Local tags are overwritten by the remote's view so the existence check
    /// answers for the shared namespace. Supports SSH authentication via keys in
    /// `~/.ssh/` or the SSH agent.
    ///
    /// # Returns
    /// * `Ok(())` - Tags are up to date with the remote
    /// * `Err(GateError::Config)` - No remote attached or remote not found
    /// * `Err(GateError::ExternalService)` - Fetch failed (network, authentication)
    pub fn fetch_tags(&self) -> Result<()> {
        let remote_name = self
            .remote
            .as_deref()
            .ok_or_else(|| GateError::config("No remote configured for fetching tags"))?;

        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| GateError::config(format!("Remote '{}' not found", remote_name)))?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(credential_callbacks());
        fetch_options.download_tags(AutotagOption::None);

        remote
            .fetch(&["+refs/tags/*:refs/tags/*"], Some(&mut fetch_options), None)
            .map_err(|e| {
                GateError::external(format!(
                    "Failed to fetch tags from remote '{}': {}",
                    remote_name,
                    e.message()
                ))
            })?;

        Ok(())
    }

    /// Resolves a revision (`HEAD`, a branch, a full or short hash) to a commit id
    pub fn resolve_commit(&self, commit_ref: &str) -> Result<Oid> {
        let commit = self
            .repo
            .revparse_single(commit_ref)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| {
                GateError::config(format!(
                    "Cannot resolve commit '{}': {}",
                    commit_ref,
                    e.message()
                ))
            })?;
        Ok(commit.id())
    }

    /// Commit a tag points at, if the tag exists
    pub fn tag_target(&self, tag: &str) -> Result<Option<Oid>> {
        let reference_name = tag_reference(tag)?;

        match self.repo.find_reference(&reference_name) {
            Ok(reference) => {
                let commit = reference.peel_to_commit()?;
                Ok(Some(commit.id()))
            }
            Err(e) if e.code() == ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GateError::external(format!(
                "Cannot look up tag '{}': {}",
                tag,
                e.message()
            ))),
        }
    }

    /// Pushes `refs/tags/<tag>` unless the remote already holds that tag.
    ///
    /// # Returns
    /// * `Ok(true)` - The remote accepted the new tag
    /// * `Ok(false)` - The remote already had the tag; nothing was pushed
    /// * `Err(GateError::ExternalService)` - Push failed or was rejected
    fn push_tag(&self, tag: &str, remote_name: &str) -> Result<bool> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|_| GateError::config(format!("Remote '{}' not found", remote_name)))?;

        let reference_name = tag_reference(tag)?;
        let taken = Cell::new(false);

        let mut callbacks = credential_callbacks();
        // libgit2 replaces an existing remote tag even without `+`; refuse instead.
        callbacks.push_negotiation(|updates| {
            let exists = updates.iter().any(|update| {
                update.dst_refname() == Some(reference_name.as_str()) && !update.src().is_zero()
            });
            if exists {
                taken.set(true);
                return Err(git2::Error::from_str(&format!(
                    "{} already exists on the remote",
                    reference_name
                )));
            }
            Ok(())
        });
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("{}:{}", reference_name, reference_name);
        let pushed = remote.push(&[refspec.as_str()], Some(&mut push_options));
        drop(push_options);

        match pushed {
            Ok(()) => Ok(true),
            Err(_) if taken.get() => Ok(false),
            Err(e) => {
                let kind = match e.class() {
                    git2::ErrorClass::Net => "Network error",
                    git2::ErrorClass::Reference => "Reference error",
                    _ => "Push failed",
                };
                Err(GateError::external(format!(
                    "{} while pushing tag '{}' to '{}': {}",
                    kind,
                    tag,
                    remote_name,
                    e.message()
                )))
            }
        }
    }
}

impl ReleaseHost for GitReleaseHost {
    fn release_exists(&self, tag: &str) -> Result<bool> {
        Ok(self.tag_target(tag)?.is_some())
    }

    fn create_tag(&self, tag: &str, commit_ref: &str) -> Result<bool> {
        tag_reference(tag)?;
        let oid = self.resolve_commit(commit_ref)?;
        let object = self.repo.find_object(oid, None)?;

        match self.repo.tag_lightweight(tag, &object, false) {
            Ok(_) => {}
            Err(e) if e.code() == ErrorCode::Exists => return Ok(false),
            Err(e) => {
                return Err(GateError::external(format!(
                    "Cannot create tag '{}': {}",
                    tag,
                    e.message()
                )))
            }
        }

        if let (true, Some(remote)) = (self.push, self.remote.as_deref()) {
            // The remote is authoritative; a tag it did not take must not linger locally.
            match self.push_tag(tag, remote) {
                Ok(true) => {}
                Ok(false) => {
                    self.repo
                        .tag_delete(tag)
                        .map_err(|e| rollback_failed(tag, None, &e))?;
                    return Ok(false);
                }
                Err(cause) => {
                    return Err(match self.repo.tag_delete(tag) {
                        Ok(()) => cause,
                        Err(e) => rollback_failed(tag, Some(&cause), &e),
                    });
                }
            }
        }

        Ok(true)
    }
}

/// Error for a local tag that stayed behind after the remote did not take it
fn rollback_failed(tag: &str, cause: Option<&GateError>, err: &git2::Error) -> GateError {
    let cause = match cause {
        Some(cause) => cause.to_string(),
        None => format!("Tag '{}' already exists on the remote", tag),
    };
    GateError::external(format!(
        "{}; local tag '{}' could not be removed: {}",
        cause,
        tag,
        err.message()
    ))
}

fn tag_reference(tag: &str) -> Result<String> {
    let reference_name = format!("refs/tags/{}", tag);
    if tag.is_empty() || !git2::Reference::is_valid_name(&reference_name) {
        return Err(GateError::config(format!("'{}' is not a valid tag name", tag)));
    }
    Ok(reference_name)
}

fn credential_callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(|_url, username_from_url, allowed_types| {
        let username = username_from_url.unwrap_or("git");

        if allowed_types.contains(git2::CredentialType::SSH_KEY) {
            if let Some(home) = dirs::home_dir() {
                for key in ["id_ed25519", "id_rsa", "id_ecdsa"] {
                    let path = home.join(".ssh").join(key);
                    if path.exists() {
                        if let Ok(cred) = git2::Cred::ssh_key(username, None, &path, None) {
                            return Ok(cred);
                        }
                    }
                }
            }

            if let Ok(cred) = git2::Cred::ssh_key_from_agent(username) {
                return Ok(cred);
            }
        }

        git2::Cred::default()
    });
    callbacks
}
