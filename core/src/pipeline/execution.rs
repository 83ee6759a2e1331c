// bazaar-flow/src/pipeline/execution.rs

//! `Pipeline::run()`: step execution and reverse-order compensation.

use crate::core::context::Handler;
use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::error::FlowError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, span, Instrument, Level};

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Executes the pipeline against `ctx_data`.
  ///
  /// Steps run in order; for each step the `before`, `on` and `after` handlers
  /// run in registration order. A `Stop` ends the run with
  /// `PipelineResult::Stopped`. On the first error, the compensators of every
  /// step that started (the failing one included) run from last to first and
  /// the original error is returned. Compensator failures are logged only.
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    let run_span = span!(
      Level::INFO,
      "Pipeline::run",
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    );
    self.run_steps(ctx_data).instrument(run_span).await
  }

  async fn run_steps(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline execution starting.");
    let mut started: Vec<&str> = Vec::with_capacity(self.steps.len());

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();
      let step_span = span!(
        Level::INFO,
        "pipeline_step",
        step_name,
        step_index = step_idx,
        optional = step_def.optional
      );

      if let Some(skip_cond_fn) = &step_def.skip_if {
        if skip_cond_fn(ctx_data.clone()) {
          step_span.in_scope(|| event!(Level::DEBUG, "Step skipped by its condition."));
          continue;
        }
      }

      let phases = [
        ("before", self.before.get(step_name)),
        ("on", self.on.get(step_name)),
        ("after", self.after.get(step_name)),
      ];
      let has_handlers = phases.iter().any(|(_, handlers)| handlers.is_some_and(|v| !v.is_empty()));

      if !has_handlers {
        if step_def.optional {
          step_span.in_scope(|| event!(Level::DEBUG, "Optional step has no handlers, skipping."));
          continue;
        }
        step_span.in_scope(|| event!(Level::ERROR, "Non-optional step has no handlers."));
        self.run_compensation(&started, &ctx_data).await;
        return Err(Err::from(FlowError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      started.push(step_name);

      for (phase, handlers) in phases {
        let Some(handlers) = handlers else { continue };
        match Self::run_phase(phase, handlers, &ctx_data).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => return Ok(PipelineResult::Stopped),
          Err(e) => {
            self.run_compensation(&started, &ctx_data).await;
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }

  async fn run_phase(
    phase: &'static str,
    handlers: &[Handler<TData, Err>],
    ctx_data: &ContextData<TData>,
  ) -> Result<PipelineControl, Err> {
    for (handler_idx, handler_fn) in handlers.iter().enumerate() {
      match handler_fn(ctx_data.clone()).await {
        Ok(PipelineControl::Continue) => {}
        Ok(PipelineControl::Stop) => {
          event!(Level::INFO, phase, handler_index = handler_idx, "Pipeline stopped by handler.");
          return Ok(PipelineControl::Stop);
        }
        Err(e) => {
          event!(Level::ERROR, phase, handler_index = handler_idx, error = %e, "Handler failed.");
          return Err(e);
        }
      }
    }
    Ok(PipelineControl::Continue)
  }

  /// Runs compensators for `started` steps, last step first. Returns how many failed.
  async fn run_compensation(&self, started: &[&str], ctx_data: &ContextData<TData>) -> usize {
    let mut failures = 0;
    for step_name in started.iter().rev() {
      let Some(compensators) = self.compensators.get(*step_name) else {
        continue;
      };
      for compensator in compensators.iter().rev() {
        event!(Level::WARN, step_name = *step_name, "Compensating step.");
        if let Err(source) = compensator(ctx_data.clone()).await {
          failures += 1;
          let err = FlowError::CompensationFailed {
            step_name: (*step_name).to_string(),
            source,
          };
          event!(Level::ERROR, error = %err, "Compensation failed; manual repair may be needed.");
        }
      }
    }
    failures
  }
}
