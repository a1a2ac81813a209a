// ============================================================================
// main.rs — generate-icons CLI entry point
// ============================================================================

use std::process;

use clap::Parser;
use icongen::{generate_icons, GenerateOptions, GenerateRequest, GeneratorConfig, IconError, Reporter};

fn main() {
    let options = GenerateOptions::parse();
    let reporter = Reporter::new(options.verbose);

    if !options.input.exists() {
        reporter.error(format!("Input PNG file not found: {}", options.input.display()));
        process::exit(1);
    }

    let config = match &options.config {
        Some(path) => match GeneratorConfig::load(path) {
            Ok(c) => {
                reporter.detail(format!("Using settings from {}", path.display()));
                c
            }
            Err(e) => {
                reporter.error(format!("Configuration error: {:#}", e));
                process::exit(1);
            }
        },
        None => GeneratorConfig::default(),
    };

    let request = GenerateRequest {
        generate_header: options.generate_header(),
        input: options.input,
        output_dir: options.output_dir,
        config,
    };

    // Per-artifact failures are already reported and do not affect the exit status
    if let Err(e) = generate_icons(&request, &reporter) {
        match e {
            IconError::InputNotFound(_) => reporter.error(e.to_string()),
            _ => reporter.error(format!("Icon generation aborted: {}", e)),
        }
        process::exit(1);
    }
}
