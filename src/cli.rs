// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the capture pipelines
//!
//! This module provides command-line functionality for:
//! - Running one of the three pipeline variants
//! - Checking which element factories are installed

use capture_pipeline::pipelines::{self, MarkerAck, ReportingHandler, RunOutcome};
use capture_pipeline::{PipelineConfig, PipelineResult, Variant};
use std::path::PathBuf;
use tracing::info;

/// Overrides shared by every run command
#[derive(clap::Args, Debug, Default)]
pub struct RunArgs {
    /// JSON configuration file (fields not present keep their defaults)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Capture device (default depends on the variant)
    #[arg(short, long)]
    pub device: Option<String>,

    /// Output file for the file-sink variants
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Stop the capture source after this many buffers
    #[arg(short, long)]
    pub num_buffers: Option<i32>,
}

impl RunArgs {
    /// Variant defaults, then the config file, then explicit flags
    pub fn resolve(&self, variant: Variant) -> PipelineResult<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load(path, variant)?,
            None => PipelineConfig::for_variant(variant),
        };

        if let Some(device) = &self.device {
            config.device = Some(device.clone());
        }
        if let Some(output) = &self.output {
            config.output = output.clone();
        }
        if self.num_buffers.is_some() {
            config.num_buffers = self.num_buffers;
        }

        Ok(config)
    }
}

/// Run a pipeline variant to completion
pub fn run(variant: Variant, args: &RunArgs) -> PipelineResult<RunOutcome> {
    let config = args.resolve(variant)?;
    info!(%variant, ?config, "Starting pipeline");

    match variant {
        Variant::Static => pipelines::run_static(&config),
        Variant::EventLoop => pipelines::run_event_loop(&config, &mut ReportingHandler),
        Variant::Pull => {
            pipelines::run_pull(&config, MarkerAck::default(), &mut ReportingHandler)
        }
    }
}

/// List the element factories each variant needs and whether they are installed
pub fn list_stages(args: &RunArgs) -> PipelineResult<()> {
    gstreamer::init()?;

    for variant in Variant::ALL {
        let config = args.resolve(variant)?;
        println!("{}:", variant);
        for spec in config.stage_specs(variant) {
            let available = gstreamer::ElementFactory::find(spec.factory.as_str()).is_some();
            println!(
                "  {} {:<8} {}",
                if available { "✓" } else { "✗" },
                spec.name,
                spec.factory
            );
        }
        println!();
    }

    Ok(())
}
