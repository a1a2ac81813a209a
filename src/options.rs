// ============================================================================
// options.rs — Command-line arguments (CLI)
// ============================================================================

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "generate-icons", version)]
#[command(about = "generate-icons: Generate platform-specific icons from PNG source", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct GenerateOptions {
    /// Input PNG file path
    #[arg(value_name = "INPUT_PNG")]
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Generate C header files (default)
    #[arg(long = "header", overrides_with = "no_header")]
    pub header: bool,

    /// Do not generate C header files
    #[arg(long = "no-header", overrides_with = "header")]
    pub no_header: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Generator settings file (TOML); built-in defaults when omitted
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl GenerateOptions {
    /// Headers are on unless `--no-header` was the last of the pair given
    pub fn generate_header(&self) -> bool {
        !self.no_header
    }
}
