// SPDX-License-Identifier: GPL-3.0-only

//! Error types for pipeline orchestration

use crate::pipelines::PipelineState;
use std::fmt;

/// Result type alias using PipelineError
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Pipeline orchestration errors
///
/// Build, configure, link and activation errors are detected synchronously and
/// always leave the pipeline released. Runtime errors arrive over the bus and
/// end a run normally, so they are carried in [`crate::pipelines::RunOutcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// GStreamer could not be initialized
    Init(String),
    /// A stage's element factory is unavailable
    StageCreation { stage: String, factory: String },
    /// Two adjacent stages could not be linked
    Link { upstream: String, downstream: String },
    /// A stage does not expose a property its configuration sets
    Configuration { stage: String, property: String },
    /// The pipeline refused to transition to PLAYING
    Activation(String),
    /// Error posted on the bus while the pipeline was running
    Runtime {
        source: Option<String>,
        message: String,
        debug: Option<String>,
    },
    /// The control loop driving the bus could not be started
    ControlLoop(String),
    /// Operation attempted from the wrong lifecycle state
    InvalidState {
        operation: &'static str,
        state: PipelineState,
    },
    /// Configuration file could not be read or parsed
    Config(String),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Init(msg) => write!(f, "Failed to initialize GStreamer: {}", msg),
            PipelineError::StageCreation { stage, factory } => {
                write!(f, "Stage '{}' could not be created (factory '{}')", stage, factory)
            }
            PipelineError::Link {
                upstream,
                downstream,
            } => write!(f, "Elements could not be linked: {} -> {}", upstream, downstream),
            PipelineError::Configuration { stage, property } => {
                write!(f, "Stage '{}' has no property '{}'", stage, property)
            }
            PipelineError::Activation(msg) => {
                write!(f, "Unable to set the pipeline to the playing state: {}", msg)
            }
            PipelineError::Runtime {
                source, message, ..
            } => match source {
                Some(src) => write!(f, "Error received from element {}: {}", src, message),
                None => write!(f, "Error: {}", message),
            },
            PipelineError::ControlLoop(msg) => write!(f, "Control loop error: {}", msg),
            PipelineError::InvalidState { operation, state } => {
                write!(f, "Cannot {} a pipeline in state {}", operation, state)
            }
            PipelineError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<gstreamer::glib::Error> for PipelineError {
    fn from(err: gstreamer::glib::Error) -> Self {
        PipelineError::Init(err.to_string())
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_creation_names_missing_stage() {
        let err = PipelineError::StageCreation {
            stage: "dec".to_string(),
            factory: "jpegdec".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("dec"));
        assert!(text.contains("jpegdec"));
    }

    #[test]
    fn test_runtime_error_without_source() {
        let err = PipelineError::Runtime {
            source: None,
            message: "device busy".to_string(),
            debug: None,
        };
        assert_eq!(err.to_string(), "Error: device busy");
    }
}
