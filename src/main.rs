// SPDX-License-Identifier: GPL-3.0-only

use capture_pipeline::Variant;
use capture_pipeline::constants::exit_codes;
use capture_pipeline::pipelines::exit_code;
use clap::{Parser, Subcommand};

mod cli;

#[derive(Parser)]
#[command(name = "capture-pipeline")]
#[command(about = "V4L2 JPEG capture pipelines built on GStreamer")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Capture to a file and block until end-of-stream or error
    Static(cli::RunArgs),

    /// Capture to a file, driven by a message-handling run loop
    EventLoop(cli::RunArgs),

    /// Deliver decoded frames to a callback (prints one '*' per frame)
    Pull(cli::RunArgs),

    /// Show which element factories are installed
    List(cli::RunArgs),
}

fn main() {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=capture_pipeline=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    let (variant, args) = match cli.command {
        Commands::Static(args) => (Variant::Static, args),
        Commands::EventLoop(args) => (Variant::EventLoop, args),
        Commands::Pull(args) => (Variant::Pull, args),
        Commands::List(args) => {
            let code = match cli::list_stages(&args) {
                Ok(()) => exit_codes::SUCCESS,
                Err(e) => {
                    eprintln!("{}", e);
                    exit_codes::FAILURE
                }
            };
            std::process::exit(code);
        }
    };

    let result = cli::run(variant, &args);
    if let Err(e) = &result {
        eprintln!("{}", e);
    }
    std::process::exit(exit_code(&result));
}
