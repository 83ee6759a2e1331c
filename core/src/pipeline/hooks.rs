// bazaar-flow/src/pipeline/hooks.rs

//! Registration of `before`, `on`, `after` and `compensate` handlers.

use crate::core::context::{BoxFuture, Compensator, Handler};
use crate::core::context_data::ContextData;
use crate::core::control::PipelineControl;
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use std::future::Future;
use tracing::{event, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  fn wrap_handler<F, HandlerErr>(handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static) -> Handler<TData, Err>
  where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    Box::new(move |ctx_data: ContextData<TData>| -> BoxFuture<Result<PipelineControl, Err>> {
      let user_fut = handler_fn(ctx_data);
      Box::pin(async move { user_fut.await.map_err(Into::into) })
    })
  }

  /// Registers a handler that runs before the step's `on` handlers.
  ///
  /// The handler may return any error convertible into the pipeline's `Err`.
  pub fn before<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self
      .before
      .entry(step_name.to_string())
      .or_default()
      .push(Self::wrap_handler(handler_fn));
  }

  /// Registers a main handler for a step.
  pub fn on<F, HandlerErr>(&mut self, step_name: &str, handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self
      .on
      .entry(step_name.to_string())
      .or_default()
      .push(Self::wrap_handler(handler_fn));
  }

  pub fn after<F, HandlerErr>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, HandlerErr>> + Send + 'static,
    HandlerErr: Into<Err> + Send + Sync + 'static,
  {
    self.ensure_step_exists(step_name);
    self
      .after
      .entry(step_name.to_string())
      .or_default()
      .push(Self::wrap_handler(handler_fn));
  }

  /// Registers a compensator for a step.
  ///
  /// If any later handler (or this step's own handlers) fails, compensators of
  /// every step that started run in reverse step order. Several compensators
  /// on one step run in reverse registration order.
  pub fn compensate<F>(&mut self, step_name: &str, compensator_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static)
  where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
  {
    self.ensure_step_exists(step_name);
    let compensator: Compensator<TData> =
      Box::new(move |ctx_data: ContextData<TData>| -> BoxFuture<anyhow::Result<()>> { Box::pin(compensator_fn(ctx_data)) });
    self
      .compensators
      .entry(step_name.to_string())
      .or_default()
      .push(compensator);
    event!(Level::DEBUG, %step_name, "Compensator registered.");
  }
}
