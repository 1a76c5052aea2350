// pipeline/src/pipeline/definition.rs

//! `Pipeline<TData, Err>` and its structural editing methods.

use crate::core::handler::Handler;
use crate::core::step::{SkipCondition, StepDef};
use crate::error::PipelineError;
use std::collections::HashMap;

/// An ordered set of named steps over context data `TData`.
///
/// Handlers return `Result<PipelineControl, Err>`. `Err` must absorb
/// `PipelineError` so that structural failures (a required step with no
/// handler, for instance) surface through the same error type.
pub struct Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub(crate) steps: Vec<StepDef<TData>>,
  pub(crate) before: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) on: HashMap<String, Vec<Handler<TData, Err>>>,
  pub(crate) after: HashMap<String, Vec<Handler<TData, Err>>>,
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  pub fn new(step_defs: &[(&str, bool, Option<SkipCondition<TData>>)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(name, optional, skip_if)| StepDef {
        name: (*name).to_string(),
        optional: *optional,
        skip_if: skip_if.clone(),
      })
      .collect();

    Self {
      steps,
      before: HashMap::new(),
      on: HashMap::new(),
      after: HashMap::new(),
    }
  }

  /// Step names in execution order.
  pub fn step_names(&self) -> Vec<&str> {
    self.steps.iter().map(|s| s.name.as_str()).collect()
  }

  fn position_of(&self, step_name: &str) -> Option<usize> {
    self.steps.iter().position(|s| s.name == step_name)
  }

  /// Panics on an unknown step: a misspelled step name is a wiring bug, not
  /// a runtime condition.
  pub(crate) fn ensure_step_exists(&self, step_name: &str) -> usize {
    match self.position_of(step_name) {
      Some(idx) => idx,
      None => panic!("Pipeline setup error: step '{}' is not defined.", step_name),
    }
  }

  fn ensure_step_not_exists(&self, step_name: &str) {
    if self.position_of(step_name).is_some() {
      panic!("Pipeline setup error: step '{}' is already defined.", step_name);
    }
  }

  fn insert_at(&mut self, idx: usize, name: String, optional: bool, skip_if: Option<SkipCondition<TData>>) {
    self.ensure_step_not_exists(&name);
    self.steps.insert(idx, StepDef { name, optional, skip_if });
  }

  pub fn insert_before_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) {
    let idx = self.ensure_step_exists(existing_step_name);
    self.insert_at(idx, new_step_name.into(), optional, skip_if);
  }

  pub fn insert_after_step<S: Into<String>>(
    &mut self,
    existing_step_name: &str,
    new_step_name: S,
    optional: bool,
    skip_if: Option<SkipCondition<TData>>,
  ) {
    let idx = self.ensure_step_exists(existing_step_name);
    self.insert_at(idx + 1, new_step_name.into(), optional, skip_if);
  }

  /// Removes a step and every handler attached to it. Unknown names are ignored.
  pub fn remove_step(&mut self, step_name: &str) {
    if let Some(idx) = self.position_of(step_name) {
      self.steps.remove(idx);
      self.before.remove(step_name);
      self.on.remove(step_name);
      self.after.remove(step_name);
    }
  }

  pub fn set_optional(&mut self, step_name: &str, optional: bool) {
    let idx = self.ensure_step_exists(step_name);
    self.steps[idx].optional = optional;
  }

  pub fn set_skip_condition(&mut self, step_name: &str, skip_if: Option<SkipCondition<TData>>) {
    let idx = self.ensure_step_exists(step_name);
    self.steps[idx].skip_if = skip_if;
  }
}
