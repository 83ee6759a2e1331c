// tests/compensation_tests.rs
mod common;

use bazaar_flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult};
use common::*;
use serial_test::serial;
use std::sync::Arc;

fn three_step_pipeline() -> Pipeline<TestContext, TestError> {
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("reserve", false, None), ("record", false, None), ("charge", false, None)]);
  pipeline.on("reserve", create_simple_handler("reserve", "R"));
  pipeline.on("record", create_simple_handler("record", "W"));
  pipeline.compensate("reserve", create_compensator("release", false));
  pipeline.compensate("record", create_compensator("erase", false));
  pipeline
}

#[tokio::test]
#[serial]
async fn test_failure_runs_compensators_in_reverse_order() {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on("charge", create_failing_handler("charge", "card declined"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("card declined".to_string()));
  assert_eq!(ctx.read().compensated, vec!["erase", "release"]);
}

#[tokio::test]
#[serial]
async fn test_failing_step_compensates_its_own_partial_work() {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on("charge", create_failing_handler("charge", "half done"));
  pipeline.compensate("charge", create_compensator("refund", false));

  let ctx = ContextData::new(TestContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_err());
  assert_eq!(ctx.read().compensated, vec!["refund", "erase", "release"]);
}

#[tokio::test]
#[serial]
async fn test_success_and_stop_do_not_compensate() {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.on("charge", create_simple_handler("charge", "C"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert!(ctx.read().compensated.is_empty());

  let stopping = ContextData::new(TestContext {
    should_stop_at: Some("record".to_string()),
    ..Default::default()
  });
  assert_eq!(pipeline.run(stopping.clone()).await.unwrap(), PipelineResult::Stopped);
  assert!(stopping.read().compensated.is_empty());
}

#[tokio::test]
#[serial]
async fn test_skipped_steps_are_not_compensated() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("maybe", false, Some(Arc::new(|_ctx: ContextData<TestContext>| true))),
    ("always", false, None),
    ("boom", false, None),
  ]);
  pipeline.on("maybe", create_simple_handler("maybe", "M"));
  pipeline.on("always", create_simple_handler("always", "A"));
  pipeline.on("boom", create_failing_handler("boom", "boom"));
  pipeline.compensate("maybe", create_compensator("undo_maybe", false));
  pipeline.compensate("always", create_compensator("undo_always", false));

  let ctx = ContextData::new(TestContext::default());
  assert!(pipeline.run(ctx.clone()).await.is_err());
  assert_eq!(ctx.read().compensated, vec!["undo_always"]);
}

#[tokio::test]
#[serial]
async fn test_compensator_failure_keeps_original_error_and_continues() {
  setup_tracing();
  let mut pipeline = three_step_pipeline();
  pipeline.compensate("record", create_compensator("broken", true));
  pipeline.on("charge", |_ctx: ContextData<TestContext>| async move {
    Err::<PipelineControl, _>(TestError::Handler("original".to_string()))
  });

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("original".to_string()));
  // "broken" ran first (last registered) and failed; the rest still ran.
  assert_eq!(ctx.read().compensated, vec!["erase", "release"]);
}

#[tokio::test]
#[serial]
async fn test_missing_handler_compensates_started_steps() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("reserve", false, None), ("unwired", false, None)]);
  pipeline.on("reserve", create_simple_handler("reserve", "R"));
  pipeline.compensate("reserve", create_compensator("release", false));

  let ctx = ContextData::new(TestContext::default());
  match pipeline.run(ctx.clone()).await {
    Err(TestError::Flow(s)) => assert!(s.contains("HandlerMissing")),
    other => panic!("expected HandlerMissing, got {:?}", other),
  }
  assert_eq!(ctx.read().compensated, vec!["release"]);
}

#[tokio::test]
#[serial]
async fn test_flow_error_from_handler_converts() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, FlowError>::new(&[("task", false, None)]);
  pipeline.on("task", |_ctx: ContextData<TestContext>| async move {
    Err::<PipelineControl, _>(FlowError::from(anyhow::anyhow!("upstream unavailable")))
  });

  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  match result {
    Err(FlowError::HandlerError { source }) => assert_eq!(source.to_string(), "upstream unavailable"),
    other => panic!("expected HandlerError, got {:?}", other),
  }
}
