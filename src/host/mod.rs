//! Release host abstraction layer
//!
//! The gate never talks to a concrete tag store directly. It asks a
//! [ReleaseHost] whether a release exists and asks it to create the tag
//! that marks a new release point.
//!
//! - [git::GitReleaseHost]: tags in a git repository, optionally mirrored to a remote
//! - [memory::MemoryReleaseHost]: in-memory tag set for tests and embedders
//!
//! ```rust
//! # use release_gate::host::{MemoryReleaseHost, ReleaseHost};
//! let host = MemoryReleaseHost::with_tags(["v2.3.0"]);
//! assert!(host.release_exists("v2.3.0").unwrap());
//! assert!(host.create_tag("v2.3.1", "HEAD").unwrap());
//! assert!(!host.create_tag("v2.3.1", "HEAD").unwrap());
//! ```

pub mod git;
pub mod memory;

pub use git::GitReleaseHost;
pub use memory::MemoryReleaseHost;

use crate::error::Result;

/// Capability interface over the shared tag namespace
///
/// ## Error Handling
///
/// Query and creation failures (network, authentication, rate limits) must be
/// reported as [crate::error::GateError::ExternalService]. Implementations never
/// answer `false` from [ReleaseHost::release_exists] when the host could not be asked.
pub trait ReleaseHost {
    /// Whether a release labelled `tag` already exists
    fn release_exists(&self, tag: &str) -> Result<bool>;

    /// Create `tag` at `commit_ref` unless it already exists
    ///
    /// # Returns
    /// * `Ok(true)` - This call created the tag
    /// * `Ok(false)` - The tag already existed; nothing was changed
    /// * `Err` - The host could not be reached or rejected the request
    fn create_tag(&self, tag: &str, commit_ref: &str) -> Result<bool>;
}

impl<H: ReleaseHost + ?Sized> ReleaseHost for &H {
    fn release_exists(&self, tag: &str) -> Result<bool> {
        (**self).release_exists(tag)
    }

    fn create_tag(&self, tag: &str, commit_ref: &str) -> Result<bool> {
        (**self).create_tag(tag, commit_ref)
    }
}
