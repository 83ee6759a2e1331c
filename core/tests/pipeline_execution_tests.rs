// tests/pipeline_execution_tests.rs
mod common;

use bazaar_flow::{ContextData, FlowError, Pipeline, PipelineControl, PipelineResult};
use common::*;
use serial_test::serial;
use std::sync::Arc;

#[tokio::test]
#[serial]
async fn test_pipeline_runs_steps_in_order() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("step1", false, None), ("step2", false, None), ("step3", false, None)]);

  pipeline.on("step1", create_simple_handler("step1", " S1"));
  pipeline.on("step2", create_simple_handler("step2", " S2"));
  pipeline.on("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Completed);
  let guard = ctx.read();
  assert_eq!(guard.counter, 3);
  assert_eq!(guard.message, " S1 S2 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step2", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_stops_on_pipeline_control_stop() {
  setup_tracing();
  let mut pipeline =
    Pipeline::<TestContext, TestError>::new(&[("stepA", false, None), ("stopStep", false, None), ("stepC", false, None)]);

  pipeline.on("stepA", create_simple_handler("stepA", "A"));
  pipeline.on("stopStep", |ctx: ContextData<TestContext>| async move {
    ctx.write().steps_executed.push("stopStep".to_string());
    Ok::<PipelineControl, FlowError>(PipelineControl::Stop)
  });
  pipeline.on("stepC", create_simple_handler("stepC", "C"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap(), PipelineResult::Stopped);
  let guard = ctx.read();
  assert_eq!(guard.counter, 1);
  assert_eq!(guard.steps_executed, vec!["stepA", "stopStep"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_propagates_handler_error() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("good_step", false, None),
    ("bad_step", false, None),
    ("another_step", false, None),
  ]);

  pipeline.on("good_step", create_simple_handler("good_step", "Good"));
  pipeline.on("bad_step", create_failing_handler("bad_step", "I am a bad step!"));
  pipeline.on("another_step", create_simple_handler("another_step", "NeverRun"));

  let ctx = ContextData::new(TestContext::default());
  let result = pipeline.run(ctx.clone()).await;

  assert_eq!(result.unwrap_err(), TestError::Handler("I am a bad step!".to_string()));
  let guard = ctx.read();
  assert_eq!(guard.message, "Good");
  assert_eq!(guard.steps_executed, vec!["good_step", "bad_step"]);
}

#[tokio::test]
#[serial]
async fn test_pipeline_skips_step_if_condition_met() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[
    ("step1", false, None),
    (
      "step_to_skip",
      false,
      Some(Arc::new(|ctx: ContextData<TestContext>| ctx.read().counter > 0)),
    ),
    ("step3", false, None),
  ]);

  pipeline.on("step1", create_simple_handler("step1", " S1"));
  pipeline.on("step_to_skip", create_simple_handler("step_to_skip", " SKIPPED"));
  pipeline.on("step3", create_simple_handler("step3", " S3"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);

  let guard = ctx.read();
  assert_eq!(guard.message, " S1 S3");
  assert_eq!(guard.steps_executed, vec!["step1", "step3"]);
}

#[tokio::test]
#[serial]
async fn test_non_optional_step_missing_handler_fails() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("step_with_no_handler", false, None)]);

  let result = pipeline.run(ContextData::new(TestContext::default())).await;

  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("HandlerMissing"));
      assert!(s.contains("step_with_no_handler"));
    }
    other => panic!("Expected FlowError::HandlerMissing, got {:?}", other),
  }
}

#[tokio::test]
#[serial]
async fn test_optional_step_missing_handler_succeeds() {
  setup_tracing();
  let pipeline = Pipeline::<TestContext, TestError>::new(&[("optional_step_no_handler", true, None)]);

  let result = pipeline.run(ContextData::new(TestContext::default())).await;
  assert_eq!(result.unwrap(), PipelineResult::Completed);
}

#[tokio::test]
#[serial]
async fn test_before_on_after_execution_order() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("main_step", false, None)]);

  pipeline.after("main_step", create_simple_handler("after_main", "After;"));
  pipeline.on("main_step", create_simple_handler("on_main", "On;"));
  pipeline.before("main_step", create_simple_handler("before_main", "Before;"));

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();

  let guard = ctx.read();
  assert_eq!(guard.message, "Before;On;After;");
  assert_eq!(guard.steps_executed, vec!["before_main", "on_main", "after_main"]);
}

#[tokio::test]
#[serial]
async fn test_inserted_steps_run_in_position() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("first", false, None), ("last", false, None)]);
  pipeline.insert_before_step("last", "middle", false, None);
  pipeline.insert_after_step("last", "trailer", true, None);
  assert_eq!(pipeline.step_names(), vec!["first", "middle", "last", "trailer"]);

  pipeline.on("first", create_simple_handler("first", "1"));
  pipeline.on("middle", create_simple_handler("middle", "2"));
  pipeline.on("last", create_simple_handler("last", "3"));

  let ctx = ContextData::new(TestContext::default());
  assert_eq!(pipeline.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().message, "123");

  pipeline.remove_step("middle");
  pipeline.set_optional("last", true);
  assert_eq!(pipeline.step_names(), vec!["first", "last", "trailer"]);
}

#[tokio::test]
#[should_panic(expected = "not found in pipeline definition")]
async fn test_registering_handler_for_unknown_step_panics() {
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("known", false, None)]);
  pipeline.on("unknown", create_simple_handler("unknown", ""));
}

#[tokio::test]
#[serial]
async fn test_context_data_is_shared_between_handlers() {
  setup_tracing();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("write", false, None), ("read_modify", false, None)]);

  pipeline.on("write", |ctx: ContextData<TestContext>| async move {
    let mut guard = ctx.write();
    guard.counter = 10;
    guard.message = "SetByWrite".to_string();
    Ok::<_, FlowError>(PipelineControl::Continue)
  });
  pipeline.on("read_modify", |ctx: ContextData<TestContext>| async move {
    let seen = ctx.with(|c| c.counter);
    tokio::time::sleep(std::time::Duration::from_millis(1)).await;
    ctx.write().counter = seen + 5;
    Ok::<_, FlowError>(PipelineControl::Continue)
  });

  let ctx = ContextData::new(TestContext::default());
  pipeline.run(ctx.clone()).await.unwrap();
  assert_eq!(ctx.read().counter, 15);
  assert_eq!(ctx.read().message, "SetByWrite");

  let inner = ctx.try_into_inner().expect("pipeline should not retain the context");
  assert_eq!(inner.counter, 15);
}
