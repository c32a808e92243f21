// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants
//!
//! Compiled-in defaults for the capture pipelines. Everything here can be
//! overridden through [`crate::config::PipelineConfig`].

/// Capture device defaults
pub mod devices {
    /// First V4L2 capture device (static and event-loop pipelines)
    pub const PRIMARY: &str = "/dev/video0";

    /// Second V4L2 capture device (pull-callback pipeline)
    pub const SECONDARY: &str = "/dev/video1";
}

/// File output defaults
pub mod output {
    /// Destination written by the file-sink pipelines
    pub const DEFAULT_LOCATION: &str = "file2.yuv";
}

/// Format constraint between the capture stage and the decoder
pub mod filter {
    /// Media type produced by the camera
    pub const MEDIA_TYPE: &str = "image/jpeg";

    /// Frame width in pixels
    pub const WIDTH: i32 = 160;

    /// Frame height in pixels
    pub const HEIGHT: i32 = 120;

    /// Frame rate numerator
    pub const FRAMERATE_NUM: i32 = 30;

    /// Frame rate denominator
    pub const FRAMERATE_DEN: i32 = 1;
}

/// GStreamer element factories for each stage
pub mod factories {
    pub const SOURCE: &str = "v4l2src";
    pub const FILTER: &str = "capsfilter";
    pub const DECODER: &str = "jpegdec";
    pub const FILE_SINK: &str = "filesink";
    pub const APP_SINK: &str = "appsink";
}

/// Element names inside the pipeline
pub mod stage_names {
    pub const PIPELINE: &str = "test-pipeline";
    pub const SOURCE: &str = "source";
    pub const FILTER: &str = "caps";
    pub const DECODER: &str = "dec";
    pub const SINK: &str = "sink";
}

/// Application sink tuning
pub mod pipeline {
    /// Maximum queued samples in the application sink before upstream blocks
    pub const MAX_BUFFERS: u32 = 2;
}

/// Timing constants
pub mod timing {
    /// Upper bound when waiting for the pipeline to settle in NULL during shutdown
    pub const STOP_TIMEOUT_SECS: u64 = 2;

    /// Log delivered-sample statistics every N units
    pub const SAMPLE_LOG_INTERVAL: u64 = 30;
}

/// Process exit codes
pub mod exit_codes {
    /// Clean shutdown, including a run that ended on a bus error
    pub const SUCCESS: i32 = 0;

    /// Stage creation, configuration, link or activation failure
    pub const FAILURE: i32 = -1;
}
