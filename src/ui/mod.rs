//! Operator-facing output.
//!
//! The gate runs unattended in CI, so this module only reports; it never prompts.

pub mod formatter;

pub use formatter::{
    display_decision, display_error, display_manual_push_instruction, display_plan,
    display_status, display_success, display_targets, display_warning, format_decision,
};
