// ============================================================================
// lib.rs — Library API (shared by the CLI and the integration tests)
// ============================================================================

pub mod config;
pub mod convert;
pub mod error;
pub mod header;
pub mod options;
pub mod pipeline;
pub mod report;

pub use config::GeneratorConfig;
pub use convert::{generate_bmp, generate_icns, generate_ico, generate_png, IcnsOutcome, SourceImage};
pub use error::IconError;
pub use header::{generate_c_header, generate_combined_header, render_byte_array_header, render_combined_header};
pub use options::GenerateOptions;
pub use pipeline::{generate_icons, ArtifactPaths, GenerateRequest, GenerationReport};
pub use report::Reporter;
