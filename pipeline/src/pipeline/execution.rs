// pipeline/src/pipeline/execution.rs

//! `Pipeline::run`.

use crate::core::context_data::ContextData;
use crate::core::control::{PipelineControl, PipelineResult};
use crate::core::handler::Handler;
use crate::error::PipelineError;
use crate::pipeline::definition::Pipeline;
use tracing::{event, info_span, instrument, Instrument, Level};

/// Result of running the handlers of one phase.
enum PhaseOutcome {
  Continue,
  Stop,
}

async fn run_phase<TData, Err>(
  phase: &'static str,
  handlers: Option<&Vec<Handler<TData, Err>>>,
  ctx_data: &ContextData<TData>,
) -> Result<PhaseOutcome, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + Send + Sync + 'static,
{
  let Some(handlers) = handlers else {
    return Ok(PhaseOutcome::Continue);
  };

  for (handler_idx, handler_fn) in handlers.iter().enumerate() {
    let span = tracing::debug_span!("pipeline_handler", phase, handler_index = handler_idx);
    match handler_fn(ctx_data.clone()).instrument(span).await {
      Ok(PipelineControl::Continue) => {}
      Ok(PipelineControl::Stop) => {
        event!(Level::INFO, phase, "Pipeline stopped by handler.");
        return Ok(PhaseOutcome::Stop);
      }
      Err(e) => {
        event!(Level::ERROR, phase, error = %e, "Handler failed.");
        return Err(e);
      }
    }
  }
  Ok(PhaseOutcome::Continue)
}

impl<TData, Err> Pipeline<TData, Err>
where
  TData: 'static + Send + Sync,
  Err: std::error::Error + From<PipelineError> + Send + Sync + 'static,
{
  fn has_handlers(&self, step_name: &str) -> bool {
    [&self.before, &self.on, &self.after]
      .iter()
      .any(|map| map.get(step_name).is_some_and(|v| !v.is_empty()))
  }

  /// Runs every step in order against `ctx_data`.
  ///
  /// Returns `Stopped` as soon as a handler asks to stop and the first handler
  /// error unchanged. A non-optional step without any handler is reported as
  /// `PipelineError::HandlerMissing` converted into `Err`.
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(
      context_type = %std::any::type_name::<TData>(),
      num_steps = self.steps.len(),
    ),
    err(Display)
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, Err> {
    event!(Level::DEBUG, "Pipeline run starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let step_name = step_def.name.as_str();

      if let Some(skip_if) = &step_def.skip_if {
        if skip_if(ctx_data.clone()) {
          event!(Level::INFO, step = step_name, "Step skipped by condition.");
          continue;
        }
      }

      if !self.has_handlers(step_name) {
        if step_def.optional {
          event!(Level::DEBUG, step = step_name, "Optional step has no handlers, skipping.");
          continue;
        }
        event!(Level::ERROR, step = step_name, "Required step has no handlers.");
        return Err(Err::from(PipelineError::HandlerMissing {
          step_name: step_def.name.clone(),
        }));
      }

      let step_span = info_span!("pipeline_step", step = step_name, step_index = step_idx);
      let outcome = async {
        for (phase, handlers) in [
          ("before", self.before.get(step_name)),
          ("on", self.on.get(step_name)),
          ("after", self.after.get(step_name)),
        ] {
          if let PhaseOutcome::Stop = run_phase(phase, handlers, &ctx_data).await? {
            return Ok::<_, Err>(PhaseOutcome::Stop);
          }
        }
        Ok(PhaseOutcome::Continue)
      }
      .instrument(step_span)
      .await?;

      if let PhaseOutcome::Stop = outcome {
        return Ok(PipelineResult::Stopped);
      }
    }

    event!(Level::DEBUG, "Pipeline run completed.");
    Ok(PipelineResult::Completed)
  }
}
