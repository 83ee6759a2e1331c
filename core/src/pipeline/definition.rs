// bazaar-flow/src/pipeline/definition.rs

//! The `Pipeline<TData, Err>` struct and its structural editing methods.

use crate::core::context::{Compensator, Handler};
use crate::core::step::{SkipCondition, StepDef};
use crate::error::FlowError;
use std::collections::HashMap;

/// An ordered list of named steps over a shared context `TData`.
///
/// Handlers return `Result<PipelineControl, Err>`. `Err` must be buildable from
/// `FlowError` so that engine failures (such as a missing handler) surface
/// through the same error type as business failures.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,

  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,

  pub(crate) compensators: HashMap<String, Vec<Compensator<TData>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<FlowError> + Send + Sync + 'static,
{
  /// Creates a pipeline from `(name, optional, skip_if)` tuples.
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef::new(*name, *optional, skip_if.clone()))
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
      compensators: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  fn position_of(&self, step_name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == step_name)
  }

  /// # Panics
  /// When `step_name` is not part of the definition. Registering a handler
  /// against an unknown step is a wiring mistake, caught at startup.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) {
    if self.position_of(step_name).is_none() {
      panic!("bazaar-flow setup error: step '{}' not found in pipeline definition", step_name);
    }
  }

  fn insert_at(&mut self, idx: usize, new_step_name: String, optional: bool, skip_if: Option<SkipCondition<TData>>) {
    if self.position_of(&new_step_name).is_some() {
      panic!("bazaar-flow setup error: step '{}' already exists in pipeline definition", new_step_name);
    }
    self.steps.insert(idx, StepDef::new(new_step_name, optional, skip_if));
  }

  /// # Panics
  /// When `existing_step_name` is unknown or `new_step_name` is already taken.
  pub fn insert_before_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) {
    match self.position_of(existing_step_name) {
      Some(idx) => self.insert_at(idx, new_step_name.into(), optional, skip_if),
      None => self.ensure_step_exists(existing_step_name),
    }
  }

  /// # Panics
  /// When `existing_step_name` is unknown or `new_step_name` is already taken.
  pub fn insert_after_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) {
    match self.position_of(existing_step_name) {
      Some(idx) => self.insert_at(idx + 1, new_step_name.into(), optional, skip_if),
      None => self.ensure_step_exists(existing_step_name),
    }
  }

  /// Removes a step with all of its handlers and compensators. Unknown names are ignored.
  pub fn remove_step(&mut self, step_name: &str) {
    if let Some(idx) = self.position_of(step_name) {
      self.steps.remove(idx);
      self.before.remove(step_name);
      self.on.remove(step_name);
      self.after.remove(step_name);
      self.compensators.remove(step_name);
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) {
    self.ensure_step_exists(step_name);
    if let Some(step) = self.steps.iter_mut().find(|s| s.name == step_name) {
      step.optional = optional;
    }
  }
}
