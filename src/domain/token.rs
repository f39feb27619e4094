use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{GateError, Result};

static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*version[ \t]*=[ \t]*"([^"]*)""#).expect("version line pattern")
});

/// Version declared in a project manifest.
///
/// Created fresh for every gate evaluation and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionToken {
    raw: String,
}

impl VersionToken {
    /// Create a token from an already extracted version string
    pub fn new(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(GateError::config("Manifest declares an empty version"));
        }
        Ok(VersionToken { raw })
    }

    /// Extract the version from the first `version = "..."` line of a manifest.
    ///
    /// # Returns
    /// * `Ok(VersionToken)` - The first declared version
    /// * `Err(GateError::Config)` - If no version line exists or the value is empty
    ///
    /// # Example
    /// ```rust
    /// # use release_gate::domain::VersionToken;
    /// let token = VersionToken::from_manifest("[package]\nversion = \"2.3.1\"\n").unwrap();
    /// assert_eq!(token.raw(), "2.3.1");
    /// assert_eq!(token.tag_name(), "v2.3.1");
    /// ```
    pub fn from_manifest(contents: &str) -> Result<Self> {
        let captures = VERSION_LINE.captures(contents).ok_or_else(|| {
            GateError::config("Manifest has no `version = \"...\"` declaration")
        })?;
        Self::new(&captures[1])
    }

    /// Number of `version = "..."` lines in a manifest
    pub fn count_declarations(contents: &str) -> usize {
        VERSION_LINE.find_iter(contents).count()
    }

    /// The version exactly as declared
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Default tag name: `"v"` followed by the raw version
    pub fn tag_name(&self) -> String {
        format!("v{}", self.raw)
    }

    /// Parse the raw version as semver, if it is one
    pub fn semver(&self) -> std::result::Result<semver::Version, semver::Error> {
        semver::Version::parse(&self.raw)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
