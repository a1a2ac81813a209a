// ============================================================================
// pipeline.rs — Runs every conversion and header step in a fixed order
// ============================================================================
//
// Order: PNG, BMP, ICO, ICNS, then (optionally) PNG header, BMP header and
// the combined header. Only a missing input, an undecodable input or an
// uncreatable output directory stop the run; every other problem is
// recorded in the report and the next step still runs.
// ============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::GeneratorConfig;
use crate::convert::{self, IcnsOutcome, SourceImage};
use crate::error::{IconError, Result};
use crate::header::{self, BMP_ARRAY_NAME, PNG_ARRAY_NAME};
use crate::report::Reporter;

#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub generate_header: bool,
    pub config: GeneratorConfig,
}

/// Output file names for one input stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub png: PathBuf,
    pub bmp: PathBuf,
    pub ico: PathBuf,
    pub icns: PathBuf,
    pub png_header: PathBuf,
    pub bmp_header: PathBuf,
    pub combined_header: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output_dir: &Path, stem: &str, config: &GeneratorConfig) -> Self {
        Self {
            png: output_dir.join(format!("{}_{}.png", stem, config.png_size)),
            bmp: output_dir.join(format!("{}_{}.bmp", stem, config.bmp_size)),
            ico: output_dir.join(format!("{}.ico", stem)),
            icns: output_dir.join(format!("{}.icns", stem)),
            png_header: output_dir.join(format!("{}_icon_png.h", stem)),
            bmp_header: output_dir.join(format!("{}_icon_bmp.h", stem)),
            combined_header: output_dir.join(format!("{}_icon.h", stem)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: &'static str,
    pub message: String,
}

/// What one run produced. Failures never change the exit status.
#[derive(Debug, Default)]
pub struct GenerationReport {
    pub generated: Vec<PathBuf>,
    pub fallbacks: Vec<PathBuf>,
    pub failures: Vec<StepFailure>,
}

impl GenerationReport {
    fn fail(&mut self, step: &'static str, message: impl Into<String>) {
        self.failures.push(StepFailure { step, message: message.into() });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failed(&self, step: &str) -> bool {
        self.failures.iter().any(|f| f.step == step)
    }
}

/// Full run. Errors returned here are the fatal preconditions only.
pub fn generate_icons(request: &GenerateRequest, reporter: &Reporter) -> Result<GenerationReport> {
    request.config.validate()?;
    // Fails with InputNotFound before anything touches the output directory
    let source = SourceImage::load(&request.input)?;

    fs::create_dir_all(&request.output_dir).map_err(|e| IconError::io(&request.output_dir, e))?;

    reporter.detail(format!("Generating icons from: {}", request.input.display()));
    reporter.detail(format!("Output directory: {}", request.output_dir.display()));
    let (w, h) = source.dimensions();
    reporter.detail(format!("  source: {}x{} {:?}", w, h, source.image().color()));

    let config = &request.config;
    let paths = ArtifactPaths::new(&request.output_dir, &source.stem(), config);
    let mut report = GenerationReport::default();

    // --- Plain PNG (embedding and Linux) ---
    let png_ok = match convert::generate_png(&source, &paths.png, config.png_size, reporter) {
        Some(p) => {
            report.generated.push(p);
            true
        }
        None => {
            report.fail("png", format!("could not write {}", paths.png.display()));
            false
        }
    };

    // --- BMP (embedding without PNG support) ---
    let bmp_ok = match convert::generate_bmp(&source, &paths.bmp, config.bmp_size, reporter) {
        Ok(p) => {
            report.generated.push(p);
            true
        }
        Err(e) => {
            report.fail("bmp", e.to_string());
            false
        }
    };

    // --- ICO (Windows) ---
    match convert::generate_ico(&source, &paths.ico, &config.ico_sizes, reporter) {
        Ok(p) => report.generated.push(p),
        Err(e) => report.fail("ico", e.to_string()),
    }

    // --- ICNS (macOS) ---
    match convert::generate_icns(&source, &paths.icns, config, reporter) {
        IcnsOutcome::Packed(p) => report.generated.push(p),
        IcnsOutcome::Fallback(p) => report.fallbacks.push(p),
        IcnsOutcome::ToolFailed { stderr } => report.fail("icns", stderr),
        IcnsOutcome::Failed(msg) => report.fail("icns", msg),
    }

    if request.generate_header {
        emit_headers(&source.stem(), &paths, png_ok, bmp_ok, config, reporter, &mut report);
    } else {
        reporter.detail("Skipping C headers (--no-header)");
    }

    if reporter.is_verbose() {
        summarize(&report, reporter);
    }
    reporter.info("Icon generation complete!");
    Ok(report)
}

fn emit_headers(
    base_name: &str,
    paths: &ArtifactPaths,
    png_ok: bool,
    bmp_ok: bool,
    config: &GeneratorConfig,
    reporter: &Reporter,
    report: &mut GenerationReport,
) {
    let png_header_ok = png_ok
        && emit_byte_array(&paths.png, &paths.png_header, PNG_ARRAY_NAME, "png_header", reporter, report);
    if !png_ok {
        reporter.warn(format!("Skipping {}: PNG was not generated", paths.png_header.display()));
        report.fail("png_header", "source PNG missing");
    }

    let bmp_header_ok = bmp_ok
        && emit_byte_array(&paths.bmp, &paths.bmp_header, BMP_ARRAY_NAME, "bmp_header", reporter, report);
    if !bmp_ok {
        reporter.warn(format!("Skipping {}: BMP was not generated", paths.bmp_header.display()));
        report.fail("bmp_header", "source BMP missing");
    }

    if !(png_header_ok && bmp_header_ok) {
        reporter.warn(format!(
            "Skipping {}: both byte-array headers are required",
            paths.combined_header.display()
        ));
        report.fail("combined_header", "byte-array headers missing");
        return;
    }

    match header::generate_combined_header(&paths.combined_header, base_name, &config.feature_macro) {
        Ok(()) => {
            reporter.success(format!("generated combined header: {}", paths.combined_header.display()));
            report.generated.push(paths.combined_header.clone());
        }
        Err(e) => {
            reporter.error(format!("error generating combined header: {}", e));
            report.fail("combined_header", e.to_string());
        }
    }
}

fn emit_byte_array(
    icon: &Path,
    header_path: &Path,
    array_name: &str,
    step: &'static str,
    reporter: &Reporter,
    report: &mut GenerationReport,
) -> bool {
    match header::generate_c_header(icon, header_path, array_name) {
        Ok(()) => {
            reporter.success(format!("generated c header: {}", header_path.display()));
            report.generated.push(header_path.to_path_buf());
            true
        }
        Err(e) => {
            reporter.error(format!("error generating c header: {}", e));
            report.fail(step, e.to_string());
            false
        }
    }
}

fn summarize(report: &GenerationReport, reporter: &Reporter) {
    reporter.info("");
    reporter.info(format!("  Generated : {}", report.generated.len()));
    for p in &report.generated {
        reporter.info(format!("    - {}", p.display()));
    }
    if !report.fallbacks.is_empty() {
        reporter.info(format!("  Fallbacks : {}", report.fallbacks.len()));
        for p in &report.fallbacks {
            reporter.info(format!("    - {}", p.display()));
        }
    }
    if !report.is_clean() {
        reporter.info(format!("  Failed    : {}", report.failures.len()));
        for f in &report.failures {
            reporter.info(format!("    - {}: {}", f.step, f.message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths_default_names() {
        let paths = ArtifactPaths::new(Path::new("out"), "logo", &GeneratorConfig::default());
        assert_eq!(paths.png, PathBuf::from("out/logo_64.png"));
        assert_eq!(paths.bmp, PathBuf::from("out/logo_32.bmp"));
        assert_eq!(paths.ico, PathBuf::from("out/logo.ico"));
        assert_eq!(paths.icns, PathBuf::from("out/logo.icns"));
        assert_eq!(paths.png_header, PathBuf::from("out/logo_icon_png.h"));
        assert_eq!(paths.bmp_header, PathBuf::from("out/logo_icon_bmp.h"));
        assert_eq!(paths.combined_header, PathBuf::from("out/logo_icon.h"));
    }

    #[test]
    fn test_artifact_paths_follow_config_sizes() {
        let config = GeneratorConfig {
            bmp_size: 48,
            png_size: 128,
            ..GeneratorConfig::default()
        };
        let paths = ArtifactPaths::new(Path::new("."), "app", &config);
        assert_eq!(paths.png.file_name().unwrap(), "app_128.png");
        assert_eq!(paths.bmp.file_name().unwrap(), "app_48.bmp");
    }

    #[test]
    fn test_missing_input_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let request = GenerateRequest {
            input: dir.path().join("nope.png"),
            output_dir: out.clone(),
            generate_header: true,
            config: GeneratorConfig::default(),
        };
        let err = generate_icons(&request, &Reporter::new(false)).unwrap_err();
        assert!(matches!(err, IconError::InputNotFound(_)));
        assert!(!out.exists());
    }

    #[test]
    fn test_headers_skipped_when_bmp_fails() {
        let mut report = GenerationReport::default();
        let dir = tempfile::tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path(), "logo", &GeneratorConfig::default());
        fs::write(&paths.png, [0x89, b'P', b'N', b'G']).unwrap();

        emit_headers(
            "logo",
            &paths,
            true,
            false,
            &GeneratorConfig::default(),
            &Reporter::new(false),
            &mut report,
        );

        assert!(paths.png_header.exists());
        assert!(!paths.bmp_header.exists());
        assert!(!paths.combined_header.exists());
        assert!(report.failed("bmp_header"));
        assert!(report.failed("combined_header"));
        assert!(!report.failed("png_header"));
    }
}
