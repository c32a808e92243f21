// SPDX-License-Identifier: GPL-3.0-only

use crate::constants::{devices, factories, output, stage_names};
use crate::errors::PipelineResult;
use crate::pipelines::stage::{
    AppSinkOptions, CaptureConfig, FileOutputConfig, FilterSpec, StageConfig, StageSpec,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Which of the three pipeline programs to run
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Variant {
    /// File sink, blocking filtered wait
    Static,
    /// File sink, cooperative loop with a message handler
    EventLoop,
    /// Application sink with a per-unit callback
    Pull,
}

impl Variant {
    pub const ALL: [Variant; 3] = [Variant::Static, Variant::EventLoop, Variant::Pull];

    /// Whether the last stage writes to a file
    pub fn writes_file(&self) -> bool {
        !matches!(self, Variant::Pull)
    }

    pub fn default_device(&self) -> &'static str {
        match self {
            Variant::Static | Variant::EventLoop => devices::PRIMARY,
            Variant::Pull => devices::SECONDARY,
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Static => write!(f, "static"),
            Variant::EventLoop => write!(f, "event-loop"),
            Variant::Pull => write!(f, "pull"),
        }
    }
}

/// GStreamer factory used for each stage
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StageFactories {
    pub source: String,
    pub filter: String,
    pub decoder: String,
    pub file_sink: String,
    pub app_sink: String,
}

impl Default for StageFactories {
    fn default() -> Self {
        Self {
            source: factories::SOURCE.to_string(),
            filter: factories::FILTER.to_string(),
            decoder: factories::DECODER.to_string(),
            file_sink: factories::FILE_SINK.to_string(),
            app_sink: factories::APP_SINK.to_string(),
        }
    }
}

/// Parameters for one pipeline run
///
/// Every field has a compiled-in default; a JSON file or command-line flags
/// may override them.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Pipeline element name
    pub name: String,
    /// Capture device; `None` leaves the source element's default
    pub device: Option<String>,
    /// Destination for the file-sink variants
    pub output: PathBuf,
    /// Format constraint between capture and decoder
    pub filter: FilterSpec,
    /// Stop the source after this many buffers
    pub num_buffers: Option<i32>,
    /// Application sink tuning for the pull variant
    pub app_sink: AppSinkOptions,
    pub factories: StageFactories,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::for_variant(Variant::Static)
    }
}

impl PipelineConfig {
    /// Compiled-in defaults for a variant
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            name: stage_names::PIPELINE.to_string(),
            device: Some(variant.default_device().to_string()),
            output: PathBuf::from(output::DEFAULT_LOCATION),
            filter: FilterSpec::default(),
            num_buffers: None,
            app_sink: AppSinkOptions::default(),
            factories: StageFactories::default(),
        }
    }

    /// Layer a JSON file over the defaults for `variant`
    ///
    /// Fields absent from the file, including fields of nested objects, keep
    /// the variant's defaults.
    pub fn load(path: &Path, variant: Variant) -> PipelineResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let overrides: Value = serde_json::from_str(&text)?;

        let mut merged = serde_json::to_value(Self::for_variant(variant))?;
        merge_json(&mut merged, overrides);
        let config = serde_json::from_value(merged)?;

        info!(path = %path.display(), %variant, "Loaded pipeline configuration");
        Ok(config)
    }

    /// Stage chain for a variant: capture → filter → decode → output
    pub fn stage_specs(&self, variant: Variant) -> Vec<StageSpec> {
        let sink = if variant.writes_file() {
            StageSpec::new(
                stage_names::SINK,
                self.factories.file_sink.as_str(),
                StageConfig::FileOutput(FileOutputConfig {
                    location: self.output.clone(),
                }),
            )
        } else {
            StageSpec::new(
                stage_names::SINK,
                self.factories.app_sink.as_str(),
                StageConfig::AppOutput(self.app_sink),
            )
        };

        vec![
            StageSpec::new(
                stage_names::SOURCE,
                self.factories.source.as_str(),
                StageConfig::Capture(CaptureConfig {
                    device: self.device.clone(),
                    num_buffers: self.num_buffers,
                }),
            ),
            StageSpec::new(
                stage_names::FILTER,
                self.factories.filter.as_str(),
                StageConfig::Filter(self.filter.clone()),
            ),
            StageSpec::new(
                stage_names::DECODER,
                self.factories.decoder.as_str(),
                StageConfig::Decoder,
            ),
            sink,
        ]
    }
}

/// Recursively overlay `overlay` onto `base`; non-object values replace
fn merge_json(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_json(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        let specs = PipelineConfig::default().stage_specs(Variant::Static);
        let names: Vec<&str> = specs.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["source", "caps", "dec", "sink"]);
    }

    #[test]
    fn test_pull_variant_ends_in_app_sink() {
        let config = PipelineConfig::for_variant(Variant::Pull);
        let specs = config.stage_specs(Variant::Pull);
        let sink = specs.last().unwrap();
        assert_eq!(sink.factory, "appsink");
        assert!(matches!(sink.config, StageConfig::AppOutput(_)));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "device": "/dev/video4", "num_buffers": 10 }"#).unwrap();
        assert_eq!(config.device.as_deref(), Some("/dev/video4"));
        assert_eq!(config.num_buffers, Some(10));
        assert_eq!(config.filter, FilterSpec::default());
        assert_eq!(config.factories, StageFactories::default());
    }

    #[test]
    fn test_merge_replaces_leaves_and_keeps_siblings() {
        let mut base = serde_json::json!({
            "device": "/dev/video1",
            "filter": { "width": 160, "height": 120 }
        });
        merge_json(
            &mut base,
            serde_json::json!({ "filter": { "width": 320 }, "device": null }),
        );
        assert_eq!(
            base,
            serde_json::json!({
                "device": null,
                "filter": { "width": 320, "height": 120 }
            })
        );
    }
}
