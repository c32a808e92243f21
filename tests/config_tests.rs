// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for configuration module

use capture_pipeline::pipelines::StageConfig;
use capture_pipeline::{PipelineConfig, Variant};

#[test]
fn test_config_default() {
    let config = PipelineConfig::default();

    assert_eq!(config.device.as_deref(), Some("/dev/video0"));
    assert_eq!(config.output.to_str(), Some("file2.yuv"));
    assert_eq!(config.num_buffers, None, "Capture should run until EOS by default");
}

#[test]
fn test_pull_variant_uses_second_device() {
    let config = PipelineConfig::for_variant(Variant::Pull);
    assert_eq!(config.device.as_deref(), Some("/dev/video1"));
}

#[test]
fn test_every_variant_shares_the_filter() {
    for variant in Variant::ALL {
        let config = PipelineConfig::for_variant(variant);
        let specs = config.stage_specs(variant);
        assert_eq!(specs.len(), 4, "{} should have four stages", variant);
        match &specs[1].config {
            StageConfig::Filter(spec) => assert_eq!(spec, &config.filter),
            other => panic!("second stage of {} is not a filter: {:?}", variant, other),
        }
    }
}

#[test]
fn test_config_round_trips_through_json() {
    let mut config = PipelineConfig::for_variant(Variant::EventLoop);
    config.num_buffers = Some(25);
    config.app_sink.drop = true;

    let json = serde_json::to_string(&config).unwrap();
    let loaded: PipelineConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_load_missing_file_is_config_error() {
    let path = std::env::temp_dir().join("capture-pipeline-no-such-config.json");
    let err = PipelineConfig::load(&path, Variant::Static).unwrap_err();
    assert!(matches!(err, capture_pipeline::PipelineError::Config(_)));
}

fn write_config(test: &str, contents: &str) -> std::path::PathBuf {
    let path = std::env::temp_dir().join(format!(
        "capture-pipeline-{}-{}.json",
        test,
        std::process::id()
    ));
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_empty_config_file_keeps_variant_device() {
    let path = write_config("empty", "{}");

    let pull = PipelineConfig::load(&path, Variant::Pull).unwrap();
    let event_loop = PipelineConfig::load(&path, Variant::EventLoop).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(pull.device.as_deref(), Some("/dev/video1"));
    assert_eq!(pull, PipelineConfig::for_variant(Variant::Pull));
    assert_eq!(event_loop.device.as_deref(), Some("/dev/video0"));
}

#[test]
fn test_partial_filter_keeps_other_fields() {
    let path = write_config("partial-filter", r#"{ "filter": { "width": 640, "height": 480 } }"#);

    let config = PipelineConfig::load(&path, Variant::Pull).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.filter.width, 640);
    assert_eq!(config.filter.height, 480);
    assert_eq!(config.filter.media_type, "image/jpeg");
    assert_eq!(config.filter.framerate_num, 30);
    assert_eq!(config.device.as_deref(), Some("/dev/video1"));
}

#[test]
fn test_null_device_clears_default() {
    let path = write_config("null-device", r#"{ "device": null }"#);

    let config = PipelineConfig::load(&path, Variant::Pull).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.device, None);
}
