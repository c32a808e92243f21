// SPDX-License-Identifier: GPL-3.0-only

//! Capture Pipeline - V4L2 JPEG capture pipelines on GStreamer
//!
//! Builds a fixed capture → JPEG caps filter → decode → sink pipeline and
//! runs it until end-of-stream or error.
//!
//! # Architecture
//!
//! - [`pipelines`]: stage descriptions, the orchestrator and the three variants
//! - [`config`]: per-run configuration with compiled-in defaults
//! - [`constants`]: device paths, filter format, element factories
//! - [`errors`]: pipeline error type
//!
//! # Example
//!
//! ```ignore
//! use capture_pipeline::{PipelineConfig, Variant};
//! use capture_pipeline::pipelines::run_static;
//!
//! let config = PipelineConfig::for_variant(Variant::Static);
//! let outcome = run_static(&config)?;
//! ```

pub mod config;
pub mod constants;
pub mod errors;
pub mod pipelines;

// Re-export commonly used types
pub use config::{PipelineConfig, Variant};
pub use errors::{PipelineError, PipelineResult};
pub use pipelines::{Orchestrator, PipelineState, RunOutcome};
