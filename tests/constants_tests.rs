// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for constants module

use capture_pipeline::constants::{devices, exit_codes, factories, filter};

#[test]
fn test_filter_format() {
    assert_eq!(filter::MEDIA_TYPE, "image/jpeg");
    assert_eq!((filter::WIDTH, filter::HEIGHT), (160, 120));
    assert_eq!((filter::FRAMERATE_NUM, filter::FRAMERATE_DEN), (30, 1));
}

#[test]
fn test_variants_default_to_different_devices() {
    assert_ne!(devices::PRIMARY, devices::SECONDARY);
    assert!(devices::PRIMARY.starts_with("/dev/video"));
    assert!(devices::SECONDARY.starts_with("/dev/video"));
}

#[test]
fn test_stage_factories_are_named() {
    for factory in [
        factories::SOURCE,
        factories::FILTER,
        factories::DECODER,
        factories::FILE_SINK,
        factories::APP_SINK,
    ] {
        assert!(!factory.is_empty());
    }
}

#[test]
fn test_exit_codes() {
    assert_eq!(exit_codes::SUCCESS, 0);
    assert_eq!(exit_codes::FAILURE, -1);
}
