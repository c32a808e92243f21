// SPDX-License-Identifier: GPL-3.0-only

//! Stage descriptions and their typed configuration
//!
//! Each stage kind has its own configuration struct listing the properties it
//! recognizes, replacing string-keyed property bags.

use crate::constants::{filter, pipeline};
use crate::errors::{PipelineError, PipelineResult};
use gstreamer::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Format constraint applied between the capture stage and the decoder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Media type (e.g., "image/jpeg")
    pub media_type: String,
    /// Width in pixels
    pub width: i32,
    /// Height in pixels
    pub height: i32,
    /// Frame rate numerator
    pub framerate_num: i32,
    /// Frame rate denominator
    pub framerate_den: i32,
}

impl Default for FilterSpec {
    fn default() -> Self {
        Self {
            media_type: filter::MEDIA_TYPE.to_string(),
            width: filter::WIDTH,
            height: filter::HEIGHT,
            framerate_num: filter::FRAMERATE_NUM,
            framerate_den: filter::FRAMERATE_DEN,
        }
    }
}

impl FilterSpec {
    /// Build the GStreamer caps for this constraint
    pub fn to_caps(&self) -> gstreamer::Caps {
        gstreamer::Caps::builder(self.media_type.as_str())
            .field("width", self.width)
            .field("height", self.height)
            .field(
                "framerate",
                gstreamer::Fraction::new(self.framerate_num, self.framerate_den),
            )
            .build()
    }
}

impl fmt::Display for FilterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},width={},height={},framerate={}/{}",
            self.media_type, self.width, self.height, self.framerate_num, self.framerate_den
        )
    }
}

/// Capture stage options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Device node to open; `None` keeps the element's default
    pub device: Option<String>,
    /// Stop after this many buffers and send EOS
    pub num_buffers: Option<i32>,
}

/// File output stage options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileOutputConfig {
    /// Destination file
    pub location: PathBuf,
}

/// Application sink options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSinkOptions {
    /// Maximum queued samples before upstream blocks (or drops)
    pub max_buffers: u32,
    /// Drop the oldest sample instead of blocking when the queue is full
    pub drop: bool,
    /// Synchronize delivery against the pipeline clock
    pub sync: bool,
}

impl Default for AppSinkOptions {
    fn default() -> Self {
        Self {
            max_buffers: pipeline::MAX_BUFFERS,
            drop: false,
            sync: false,
        }
    }
}

/// Stage kind together with its configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageConfig {
    /// Video capture source
    Capture(CaptureConfig),
    /// Caps filter constraining the captured format
    Filter(FilterSpec),
    /// JPEG decoder; takes no options
    Decoder,
    /// Sink writing decoded data to a file
    FileOutput(FileOutputConfig),
    /// Sink handing decoded units to application code
    AppOutput(AppSinkOptions),
}

impl StageConfig {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            StageConfig::Capture(_) => "capture",
            StageConfig::Filter(_) => "filter",
            StageConfig::Decoder => "decoder",
            StageConfig::FileOutput(_) => "file-output",
            StageConfig::AppOutput(_) => "app-output",
        }
    }
}

/// One stage of the pipeline: element name, factory and configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    pub name: String,
    pub factory: String,
    pub config: StageConfig,
}

impl StageSpec {
    pub fn new(name: impl Into<String>, factory: impl Into<String>, config: StageConfig) -> Self {
        Self {
            name: name.into(),
            factory: factory.into(),
            config,
        }
    }

    /// Instantiate the element for this stage
    pub fn create(&self) -> PipelineResult<gstreamer::Element> {
        gstreamer::ElementFactory::make(self.factory.as_str())
            .name(self.name.as_str())
            .build()
            .map_err(|e| {
                debug!(stage = %self.name, factory = %self.factory, error = %e, "Element creation failed");
                PipelineError::StageCreation {
                    stage: self.name.clone(),
                    factory: self.factory.clone(),
                }
            })
    }

    /// Apply this stage's configuration to its element
    ///
    /// Values are not validated; bad values surface when the pipeline starts.
    pub fn apply(&self, element: &gstreamer::Element) -> PipelineResult<()> {
        match &self.config {
            StageConfig::Capture(capture) => {
                if let Some(device) = &capture.device {
                    self.require(element, "device")?;
                    element.set_property("device", device.as_str());
                }
                if let Some(count) = capture.num_buffers {
                    self.require(element, "num-buffers")?;
                    element.set_property("num-buffers", count);
                }
            }
            StageConfig::Filter(spec) => {
                self.require(element, "caps")?;
                element.set_property("caps", spec.to_caps());
            }
            StageConfig::Decoder => {}
            StageConfig::FileOutput(output) => {
                self.require(element, "location")?;
                // filesink takes a UTF-8 string; refuse paths it cannot represent
                let location = output.location.to_str().ok_or_else(|| {
                    PipelineError::Configuration {
                        stage: self.name.clone(),
                        property: "location".to_string(),
                    }
                })?;
                element.set_property("location", location);
            }
            StageConfig::AppOutput(options) => {
                for property in ["emit-signals", "max-buffers", "drop", "sync"] {
                    self.require(element, property)?;
                }
                // Samples are delivered through typed callbacks, not signals
                element.set_property("emit-signals", false);
                element.set_property("max-buffers", options.max_buffers);
                element.set_property("drop", options.drop);
                element.set_property("sync", options.sync);
            }
        }

        debug!(stage = %self.name, kind = self.config.kind(), "Stage configured");
        Ok(())
    }

    fn require(&self, element: &gstreamer::Element, property: &str) -> PipelineResult<()> {
        if element.find_property(property).is_some() {
            Ok(())
        } else {
            Err(PipelineError::Configuration {
                stage: self.name.clone(),
                property: property.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_matches_camera_format() {
        let spec = FilterSpec::default();
        assert_eq!(
            spec.to_string(),
            "image/jpeg,width=160,height=120,framerate=30/1"
        );
    }

    #[test]
    fn test_filter_caps_fields() {
        let _ = gstreamer::init();

        let caps = FilterSpec::default().to_caps();
        let structure = caps.structure(0).expect("caps have one structure");
        assert_eq!(structure.name().as_str(), "image/jpeg");
        assert_eq!(structure.get::<i32>("width").unwrap(), 160);
        assert_eq!(structure.get::<i32>("height").unwrap(), 120);
        assert_eq!(
            structure.get::<gstreamer::Fraction>("framerate").unwrap(),
            gstreamer::Fraction::new(30, 1)
        );
    }

    #[test]
    fn test_unknown_factory_is_stage_creation_error() {
        let _ = gstreamer::init();

        let spec = StageSpec::new("dec", "no-such-decoder", StageConfig::Decoder);
        assert_eq!(
            spec.create().unwrap_err(),
            PipelineError::StageCreation {
                stage: "dec".to_string(),
                factory: "no-such-decoder".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_property_is_configuration_error() {
        let _ = gstreamer::init();

        // fakesrc has no "device" property
        let spec = StageSpec::new(
            "source",
            "fakesrc",
            StageConfig::Capture(CaptureConfig {
                device: Some("/dev/video0".to_string()),
                num_buffers: None,
            }),
        );
        let element = spec.create().unwrap();
        assert_eq!(
            spec.apply(&element).unwrap_err(),
            PipelineError::Configuration {
                stage: "source".to_string(),
                property: "device".to_string(),
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_location_is_configuration_error() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let _ = gstreamer::init();

        let spec = StageSpec::new(
            "sink",
            "filesink",
            StageConfig::FileOutput(FileOutputConfig {
                location: PathBuf::from(OsStr::from_bytes(&[b'f', 0xff, b'.', b'y'])),
            }),
        );
        let element = spec.create().unwrap();
        assert_eq!(
            spec.apply(&element).unwrap_err(),
            PipelineError::Configuration {
                stage: "sink".to_string(),
                property: "location".to_string(),
            }
        );
        assert_eq!(element.property::<Option<String>>("location"), None);
    }
}
