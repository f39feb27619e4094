//! Domain logic - pure release rules independent of git operations

pub mod decision;
pub mod tag;
pub mod token;

pub use decision::{AbortReason, GateDecision};
pub use tag::TagPattern;
pub use token::VersionToken;
