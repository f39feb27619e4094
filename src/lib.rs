pub mod boundary;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod gate;
pub mod host;
pub mod outputs;
pub mod pipeline;
pub mod ui;

pub use error::{GateError, Result};
pub use gate::ReleaseGate;
