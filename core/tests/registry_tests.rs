// tests/registry_tests.rs
mod common;

use bazaar_flow::{ContextData, FlowError, FlowRegistry, Pipeline, PipelineControl, PipelineResult};
use common::*;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct AlphaContext {
  val: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct BetaContext {
  num: i32,
}

#[tokio::test]
async fn test_registry_runs_pipeline_for_context_type() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let mut alpha = Pipeline::<AlphaContext, TestError>::new(&[("alpha_task", false, None)]);
  alpha.on("alpha_task", |ctx: ContextData<AlphaContext>| async move {
    ctx.write().val = "alpha_processed".to_string();
    Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
  });
  registry.register_pipeline(alpha);

  let mut beta = Pipeline::<BetaContext, TestError>::new(&[("beta_task", false, None)]);
  beta.on("beta_task", |ctx: ContextData<BetaContext>| async move {
    ctx.write().num = 100;
    Ok::<PipelineControl, FlowError>(PipelineControl::Continue)
  });
  registry.register_pipeline(beta);

  assert!(registry.is_registered::<AlphaContext>());
  assert!(registry.is_registered::<BetaContext>());

  let ctx_alpha = ContextData::new(AlphaContext::default());
  assert_eq!(registry.run(ctx_alpha.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx_alpha.read().val, "alpha_processed");

  let ctx_beta = ContextData::new(BetaContext::default());
  assert_eq!(registry.run(ctx_beta.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx_beta.read().num, 100);
}

#[tokio::test]
async fn test_registry_reports_unregistered_context() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::new();

  let result = registry.run(ContextData::new(AlphaContext::default())).await;
  match result {
    Err(TestError::Flow(s)) => {
      assert!(s.contains("NotRegistered"));
      assert!(s.contains("AlphaContext"));
    }
    other => panic!("expected NotRegistered, got {:?}", other),
  }
}

#[tokio::test]
async fn test_registry_propagates_handler_error() {
  setup_tracing();
  let registry = FlowRegistry::<TestError>::default();
  let mut pipeline = Pipeline::<TestContext, TestError>::new(&[("fails", false, None)]);
  pipeline.on("fails", create_failing_handler("fails", "nope"));
  registry.register_pipeline(pipeline);

  let result = registry.run(ContextData::new(TestContext::default())).await;
  assert_eq!(result.unwrap_err(), TestError::Handler("nope".to_string()));
}
