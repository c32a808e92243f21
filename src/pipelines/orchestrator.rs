// SPDX-License-Identifier: GPL-3.0-only

//! Pipeline lifecycle: build, link, configure, activate, run, shut down
//!
//! The orchestrator exclusively owns the pipeline and every stage element.
//! Each failing step releases everything before returning, and dropping the
//! orchestrator always shuts the pipeline down.

use super::bus::{self, BusEvent, MessageHandler, RunOutcome};
use super::sample;
use super::stage::StageSpec;
use crate::constants::timing;
use crate::errors::{PipelineError, PipelineResult};
use futures::StreamExt;
use gstreamer::prelude::*;
use gstreamer_app::AppSink;
use std::fmt;
use tracing::{debug, error, info, warn};

/// Lifecycle state of an orchestrated pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Unbuilt,
    Built,
    Linked,
    Running,
    /// Run ended on end-of-stream
    Stopped,
    /// Run ended on a bus error
    Failed,
    /// All stage handles released; terminal
    Released,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Unbuilt => "Unbuilt",
            PipelineState::Built => "Built",
            PipelineState::Linked => "Linked",
            PipelineState::Running => "Running",
            PipelineState::Stopped => "Stopped",
            PipelineState::Failed => "Failed",
            PipelineState::Released => "Released",
        };
        f.write_str(name)
    }
}

/// How [`Orchestrator::run`] waits for termination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Filtered wait for ERROR or EOS with no timeout
    Blocking,
    /// Cooperative loop dispatching every bus message to a handler
    Loop,
}

/// Owner of one pipeline and its stages
pub struct Orchestrator {
    name: String,
    specs: Vec<StageSpec>,
    pipeline: Option<gstreamer::Pipeline>,
    elements: Vec<gstreamer::Element>,
    state: PipelineState,
}

impl Orchestrator {
    /// Describe a pipeline; nothing is instantiated until [`build`](Self::build)
    pub fn new(name: impl Into<String>, specs: Vec<StageSpec>) -> Self {
        Self {
            name: name.into(),
            specs,
            pipeline: None,
            elements: Vec::new(),
            state: PipelineState::Unbuilt,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn stages(&self) -> &[StageSpec] {
        &self.specs
    }

    /// The pipeline handle, while it is still owned
    pub fn pipeline(&self) -> Option<&gstreamer::Pipeline> {
        self.pipeline.as_ref()
    }

    /// Instantiate every stage and add them to a new pipeline
    ///
    /// All elements are created before any is added, so a missing factory
    /// leaves nothing behind.
    pub fn build(&mut self) -> PipelineResult<()> {
        self.expect_state("build", PipelineState::Unbuilt)?;
        info!(pipeline = %self.name, stages = self.specs.len(), "Creating pipeline elements");

        let mut elements = Vec::with_capacity(self.specs.len());
        for spec in &self.specs {
            match spec.create() {
                Ok(element) => {
                    debug!(stage = %spec.name, factory = %spec.factory, "Created stage");
                    elements.push(element);
                }
                Err(e) => {
                    error!(stage = %spec.name, factory = %spec.factory, "Not all elements could be created");
                    self.state = PipelineState::Released;
                    return Err(e);
                }
            }
        }

        let pipeline = gstreamer::Pipeline::with_name(&self.name);
        for element in &elements {
            if let Err(e) = pipeline.add(element) {
                error!(element = %element.name(), error = %e, "Failed to add element to pipeline");
                self.state = PipelineState::Released;
                return Err(PipelineError::StageCreation {
                    stage: element.name().to_string(),
                    factory: element
                        .factory()
                        .map(|f| f.name().to_string())
                        .unwrap_or_default(),
                });
            }
        }

        self.pipeline = Some(pipeline);
        self.elements = elements;
        self.state = PipelineState::Built;
        Ok(())
    }

    /// Link stages in declared order
    pub fn link(&mut self) -> PipelineResult<()> {
        self.expect_state("link", PipelineState::Built)?;

        let failed = self
            .elements
            .windows(2)
            .find(|pair| pair[0].link(&pair[1]).is_err())
            .map(|pair| (pair[0].name().to_string(), pair[1].name().to_string()));

        if let Some((upstream, downstream)) = failed {
            error!(%upstream, %downstream, "Elements could not be linked");
            self.shutdown();
            return Err(PipelineError::Link {
                upstream,
                downstream,
            });
        }

        debug!(pipeline = %self.name, "Stages linked");
        self.state = PipelineState::Linked;
        Ok(())
    }

    /// Apply every stage's typed configuration
    pub fn configure(&mut self) -> PipelineResult<()> {
        self.expect_state("configure", PipelineState::Linked)?;

        let result = self
            .specs
            .iter()
            .zip(&self.elements)
            .try_for_each(|(spec, element)| spec.apply(element));

        if let Err(e) = result {
            error!(error = %e, "Stage configuration failed");
            self.shutdown();
            return Err(e);
        }
        Ok(())
    }

    /// Look up the application sink stage by name
    pub fn app_sink(&self, stage: &str) -> Option<AppSink> {
        self.elements
            .iter()
            .find(|e| e.name().as_str() == stage)
            .and_then(|e| e.clone().dynamic_cast::<AppSink>().ok())
    }

    /// Request the transition to PLAYING
    pub fn activate(&mut self) -> PipelineResult<()> {
        self.expect_state("activate", PipelineState::Linked)?;
        let pipeline = self.owned_pipeline("activate")?;

        match pipeline.set_state(gstreamer::State::Playing) {
            Ok(success) => {
                debug!(result = ?success, "Pipeline set to PLAYING");
                self.state = PipelineState::Running;
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Unable to set the pipeline to the playing state");
                self.shutdown();
                Err(PipelineError::Activation(e.to_string()))
            }
        }
    }

    /// Run until a terminal condition in the given mode
    ///
    /// In [`RunMode::Blocking`] the handler is never consulted.
    pub fn run<H>(&mut self, mode: RunMode, handler: &mut H) -> PipelineResult<RunOutcome>
    where
        H: MessageHandler + ?Sized,
    {
        match mode {
            RunMode::Blocking => self.run_blocking(),
            RunMode::Loop => self.run_loop(handler),
        }
    }

    /// Wait for ERROR or EOS, ignoring every other message
    pub fn run_blocking(&mut self) -> PipelineResult<RunOutcome> {
        self.expect_state("run", PipelineState::Running)?;
        let bus = self.bus("run")?;

        let terminal = bus
            .timed_pop_filtered(
                gstreamer::ClockTime::NONE,
                &[gstreamer::MessageType::Error, gstreamer::MessageType::Eos],
            )
            .map(|msg| BusEvent::from_message(&msg));

        match &terminal {
            Some(event) => bus::report_terminal(event),
            None => warn!("Bus returned no message"),
        }

        Ok(self.finish(terminal))
    }

    /// Dispatch bus messages to `handler` on a single-threaded control loop
    pub fn run_loop<H>(&mut self, handler: &mut H) -> PipelineResult<RunOutcome>
    where
        H: MessageHandler + ?Sized,
    {
        self.expect_state("run", PipelineState::Running)?;
        let bus = self.bus("run")?;

        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|e| PipelineError::ControlLoop(e.to_string()))?;

        info!(pipeline = %self.name, "Entering control loop");
        let terminal = runtime.block_on(async {
            let mut events = bus.stream().map(|msg| BusEvent::from_message(&msg));
            bus::drive(&mut events, handler).await
        });
        debug!(pipeline = %self.name, "Control loop returned");

        if terminal.is_none() {
            warn!("Bus stream ended without a terminal message");
        }

        Ok(self.finish(terminal))
    }

    /// Drive the pipeline to NULL and release every stage handle
    ///
    /// Safe to call in any state and any number of times.
    pub fn shutdown(&mut self) {
        if self.state == PipelineState::Released {
            debug!(pipeline = %self.name, "Pipeline already released");
            return;
        }

        for element in &self.elements {
            if let Some(appsink) = element.downcast_ref::<AppSink>() {
                sample::unregister(appsink);
            }
        }

        if let Some(pipeline) = self.pipeline.take() {
            if let Err(e) = pipeline.set_state(gstreamer::State::Null) {
                warn!(error = %e, "Failed to set pipeline to NULL");
            }
            let (result, state, _) = pipeline.state(gstreamer::ClockTime::from_seconds(
                timing::STOP_TIMEOUT_SECS,
            ));
            debug!(?result, ?state, "Pipeline stopped");
            info!(pipeline = %self.name, "Deleting pipeline");
        }

        self.elements.clear();
        self.state = PipelineState::Released;
    }

    fn finish(&mut self, terminal: Option<BusEvent>) -> RunOutcome {
        let outcome = RunOutcome::from_event(terminal);
        self.state = if outcome.is_failed() {
            PipelineState::Failed
        } else {
            PipelineState::Stopped
        };
        outcome
    }

    fn bus(&self, operation: &'static str) -> PipelineResult<gstreamer::Bus> {
        self.owned_pipeline(operation)?
            .bus()
            .ok_or_else(|| PipelineError::ControlLoop("pipeline has no bus".to_string()))
    }

    fn owned_pipeline(&self, operation: &'static str) -> PipelineResult<&gstreamer::Pipeline> {
        self.pipeline.as_ref().ok_or(PipelineError::InvalidState {
            operation,
            state: self.state,
        })
    }

    fn expect_state(&self, operation: &'static str, expected: PipelineState) -> PipelineResult<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PipelineError::InvalidState {
                operation,
                state: self.state,
            })
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orchestrator")
            .field("name", &self.name)
            .field("stages", &self.specs.len())
            .field("state", &self.state)
            .finish()
    }
}
