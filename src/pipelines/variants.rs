// SPDX-License-Identifier: GPL-3.0-only

//! The three pipeline programs
//!
//! Each variant builds the same capture → filter → decode chain and differs
//! only in its terminal stage and in how it waits for termination.

use super::bus::{MessageHandler, RunOutcome};
use super::orchestrator::{Orchestrator, RunMode};
use super::sample::{self, SampleHandler};
use crate::config::{PipelineConfig, Variant};
use crate::constants::{exit_codes, stage_names};
use crate::errors::{PipelineError, PipelineResult};
use std::sync::atomic::Ordering;
use tracing::info;

/// Build, link and configure the chain for `variant`
///
/// On error every stage created so far has already been released.
pub fn prepare(config: &PipelineConfig, variant: Variant) -> PipelineResult<Orchestrator> {
    gstreamer::init()?;

    info!(
        %variant,
        device = ?config.device,
        filter = %config.filter,
        "Preparing pipeline"
    );

    let mut orchestrator = Orchestrator::new(config.name.as_str(), config.stage_specs(variant));
    orchestrator.build()?;
    orchestrator.link()?;
    orchestrator.configure()?;
    Ok(orchestrator)
}

/// File sink, blocking wait for ERROR or EOS
pub fn run_static(config: &PipelineConfig) -> PipelineResult<RunOutcome> {
    let mut orchestrator = prepare(config, Variant::Static)?;
    orchestrator.activate()?;

    let outcome = orchestrator.run_blocking();
    orchestrator.shutdown();
    outcome
}

/// File sink, loop mode with `handler` deciding when to stop
pub fn run_event_loop<H>(config: &PipelineConfig, handler: &mut H) -> PipelineResult<RunOutcome>
where
    H: MessageHandler + ?Sized,
{
    let mut orchestrator = prepare(config, Variant::EventLoop)?;
    orchestrator.activate()?;

    println!("Running...");
    let outcome = orchestrator.run(RunMode::Loop, handler);
    println!("Returned");
    orchestrator.shutdown();
    outcome
}

/// Application sink feeding `samples`, loop mode with `handler`
pub fn run_pull<S, H>(
    config: &PipelineConfig,
    samples: S,
    handler: &mut H,
) -> PipelineResult<RunOutcome>
where
    S: SampleHandler,
    H: MessageHandler + ?Sized,
{
    let mut orchestrator = prepare(config, Variant::Pull)?;

    let Some(appsink) = orchestrator.app_sink(stage_names::SINK) else {
        let factory = orchestrator
            .stages()
            .last()
            .map(|s| s.factory.clone())
            .unwrap_or_default();
        orchestrator.shutdown();
        return Err(PipelineError::StageCreation {
            stage: stage_names::SINK.to_string(),
            factory,
        });
    };
    let delivered = sample::register(&appsink, samples);

    orchestrator.activate()?;
    println!("Running...");
    let outcome = orchestrator.run(RunMode::Loop, handler);
    println!();
    println!("Returned");
    orchestrator.shutdown();

    info!(units = delivered.load(Ordering::Relaxed), "Pull pipeline finished");
    outcome
}

/// Process exit code for a finished run
///
/// Runtime bus errors still end the run cleanly and map to success.
pub fn exit_code(result: &PipelineResult<RunOutcome>) -> i32 {
    match result {
        Ok(_) => exit_codes::SUCCESS,
        Err(_) => exit_codes::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_error_exits_cleanly() {
        let result = Ok(RunOutcome::Failed(PipelineError::Runtime {
            source: None,
            message: "Internal data stream error.".to_string(),
            debug: None,
        }));
        assert_eq!(exit_code(&result), 0);
    }

    #[test]
    fn test_setup_errors_exit_with_failure() {
        let result: PipelineResult<RunOutcome> = Err(PipelineError::Link {
            upstream: "dec".to_string(),
            downstream: "sink".to_string(),
        });
        assert_eq!(exit_code(&result), -1);
    }
}
