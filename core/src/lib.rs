// bazaar-flow/src/lib.rs

//! bazaar-flow: async, type-safe step pipelines with saga-style compensation.
//!
//! A pipeline is an ordered list of named steps over one shared context:
//!  - each step has `before`, `on` and `after` handlers, run in that order;
//!  - steps can be optional or carry a skip condition;
//!  - any handler can stop the run early without error;
//!  - each step can register compensators which undo its effects when a
//!    later step fails, giving all-or-nothing behaviour across stores that
//!    have no shared transaction;
//!  - a `FlowRegistry` dispatches a context to the pipeline registered for
//!    its type.
//!
//! ```ignore
//! let mut p = Pipeline::<Ctx, AppError>::new(&[("reserve", false, None), ("charge", false, None)]);
//! p.on("reserve", |ctx| Box::pin(async move { /* ... */ Ok::<_, AppError>(PipelineControl::Continue) }));
//! p.compensate("reserve", |ctx| Box::pin(async move { /* release */ Ok(()) }));
//! registry.register_pipeline(p);
//! registry.run(ContextData::new(Ctx::default())).await?;
//! ```

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context::{BoxFuture, Compensator, Handler};
pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;
