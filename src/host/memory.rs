use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::{GateError, Result};
use crate::host::ReleaseHost;

/// In-memory release host holding a tag set
pub struct MemoryReleaseHost {
    tags: Mutex<BTreeMap<String, String>>,
    failure: Option<String>,
}

impl MemoryReleaseHost {
    /// Create an empty host
    pub fn new() -> Self {
        MemoryReleaseHost {
            tags: Mutex::new(BTreeMap::new()),
            failure: None,
        }
    }

    /// Create a host whose tag set already contains `tags`
    pub fn with_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags = tags
            .into_iter()
            .map(|tag| (tag.into(), String::new()))
            .collect();
        MemoryReleaseHost {
            tags: Mutex::new(tags),
            failure: None,
        }
    }

    /// Create a host that fails every call with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        MemoryReleaseHost {
            tags: Mutex::new(BTreeMap::new()),
            failure: Some(message.into()),
        }
    }

    /// Current tag names, sorted
    pub fn tags(&self) -> Vec<String> {
        self.state().keys().cloned().collect()
    }

    /// Commit reference a tag was created at, if it was created through this host
    pub fn commit_for(&self, tag: &str) -> Option<String> {
        self.state()
            .get(tag)
            .filter(|commit| !commit.is_empty())
            .cloned()
    }

    fn state(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.tags.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_available(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(GateError::external(message.clone())),
            None => Ok(()),
        }
    }
}

impl Default for MemoryReleaseHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ReleaseHost for MemoryReleaseHost {
    fn release_exists(&self, tag: &str) -> Result<bool> {
        self.check_available()?;
        Ok(self.state().contains_key(tag))
    }

    fn create_tag(&self, tag: &str, commit_ref: &str) -> Result<bool> {
        self.check_available()?;
        let mut tags = self.state();
        if tags.contains_key(tag) {
            return Ok(false);
        }
        tags.insert(tag.to_string(), commit_ref.to_string());
        Ok(true)
    }
}
