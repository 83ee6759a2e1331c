// tests/common/mod.rs
#![allow(dead_code)]

use bazaar_flow::{ContextData, FlowError, PipelineControl};
use once_cell::sync::Lazy;
use tracing::Level;

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub message: String,
  pub steps_executed: Vec<String>,
  pub should_stop_at: Option<String>,
  pub compensated: Vec<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  // FlowError is not PartialEq, keep its Debug rendering for assertions.
  #[error("flow error: {0}")]
  Flow(String),

  #[error("handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(err: FlowError) -> Self {
    TestError::Flow(format!("{:?}", err))
  }
}

pub fn create_simple_handler(step_name: &'static str, message_to_append: &'static str) -> bazaar_flow::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| -> bazaar_flow::BoxFuture<Result<PipelineControl, TestError>> {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.message.push_str(message_to_append);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "executed");
      if guard.should_stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn create_failing_handler(step_name: &'static str, error_message: &'static str) -> bazaar_flow::Handler<TestContext, TestError> {
  Box::new(move |ctx: ContextData<TestContext>| -> bazaar_flow::BoxFuture<Result<PipelineControl, TestError>> {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(error_message.to_string()))
    })
  })
}

/// Compensator that records `label` in `compensated`, or fails when `fail` is set.
pub fn create_compensator(
  label: &'static str,
  fail: bool,
) -> impl Fn(ContextData<TestContext>) -> bazaar_flow::BoxFuture<anyhow::Result<()>> + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> bazaar_flow::BoxFuture<anyhow::Result<()>> {
    Box::pin(async move {
      if fail {
        anyhow::bail!("compensator {} failed", label);
      }
      ctx.write().compensated.push(label.to_string());
      Ok(())
    })
  }
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
