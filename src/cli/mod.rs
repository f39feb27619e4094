pub mod orchestration;

pub use orchestration::{run_gate_workflow, GateWorkflowArgs, WorkflowResult};
