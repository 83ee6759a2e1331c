// bazaar-flow/src/core/context.rs

//! Boxed handler types stored by a pipeline.

use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use std::future::Future;
use std::pin::Pin;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// A step handler.
///
/// Receives a clone of the shared `ContextData<TData>` and resolves to a
/// `PipelineControl` or the pipeline's error. Handlers must release their
/// lock guards before awaiting anything.
pub type Handler<TData, Err> = Box<dyn Fn(ContextData<TData>) -> BoxFuture<Result<PipelineControl, Err>> + Send + Sync>;

/// Undoes the externally visible effects of a step after a later failure.
///
/// Compensators read whatever the step recorded in the context (ids it
/// created, quantities it moved) and must tolerate a step that only got
/// partway through.
pub type Compensator<TData> = Box<dyn Fn(ContextData<TData>) -> BoxFuture<anyhow::Result<()>> + Send + Sync>;
