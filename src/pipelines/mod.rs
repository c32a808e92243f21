// SPDX-License-Identifier: GPL-3.0-only

//! Capture pipelines
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────┐   ┌────────────┐   ┌─────────┐   ┌──────────────────────┐
//! │ v4l2src  │ ─▶│ capsfilter │ ─▶│ jpegdec │ ─▶│ filesink  (static,   │
//! │ (source) │   │   (caps)   │   │  (dec)  │   │           event-loop)│
//! └──────────┘   └────────────┘   └─────────┘   │ appsink   (pull)     │
//!                                               └──────────────────────┘
//! ```
//!
//! - [`stage`]: typed stage descriptions and their configuration
//! - [`orchestrator`]: pipeline lifecycle and state machine
//! - [`bus`]: bus messages, the loop-mode handler and its driver
//! - [`sample`]: per-unit callbacks for the application sink
//! - [`variants`]: the three pipeline programs

pub mod bus;
pub mod orchestrator;
pub mod sample;
pub mod stage;
pub mod variants;

pub use bus::{BusEvent, LoopControl, MessageHandler, ReportingHandler, RunOutcome};
pub use orchestrator::{Orchestrator, PipelineState, RunMode};
pub use sample::{DecodedUnit, MarkerAck, SampleHandler};
pub use stage::{AppSinkOptions, FilterSpec, StageConfig, StageSpec};
pub use variants::{exit_code, run_event_loop, run_pull, run_static};
