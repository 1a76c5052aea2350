// pipeline/src/core/mod.rs

pub mod context_data;
pub mod control;
pub mod handler;
pub mod step;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use handler::Handler;
pub use step::StepDef;
