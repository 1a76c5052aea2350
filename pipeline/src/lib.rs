// pipeline/src/lib.rs

//! A small asynchronous step pipeline.
//!
//! A pipeline is an ordered list of named steps. Each step can carry `before`,
//! `on` and `after` handlers that receive a shared [`ContextData`] and decide
//! whether the run continues or stops. The storefront uses it to sequence
//! multi-call flows against remote collaborators (add-to-cart, checkout) where
//! every call can fail and the remaining calls must not run.
//!
//! ```ignore
//! let mut p = Pipeline::<OrderCtx, AppError>::new(&[
//!   ("create_order", false, None),
//!   ("notify", true, None),
//! ]);
//! p.on_root("create_order", |ctx: ContextData<OrderCtx>| Box::pin(async move {
//!   // ...
//!   Ok::<_, AppError>(PipelineControl::Continue)
//! }));
//! let outcome = p.run(ContextData::new(OrderCtx::default())).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};
pub use crate::error::{PipelineError, PipelineResultExt};
pub use crate::pipeline::Pipeline;
pub use crate::registry::Registry;
