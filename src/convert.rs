// ============================================================================
// convert.rs — Source image loading and per-platform renditions
// ============================================================================
//
// Every rendition is resampled with Lanczos3 from the untouched source.
// Failure policy differs per format and is part of each signature:
//   BMP, ICO  -> reported, then returned as Err
//   PNG       -> reported and swallowed (Option)
//   ICNS      -> never fails the caller; see IcnsOutcome
// ============================================================================

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use std::process::Command;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage, RgbaImage};

use crate::config::GeneratorConfig;
use crate::error::{IconError, Result};
use crate::report::Reporter;

const FILTER: FilterType = FilterType::Lanczos3;

/// Square sizes Apple requires in an iconset
pub const ICNS_SIZES: [u32; 7] = [16, 32, 64, 128, 256, 512, 1024];
pub const ICNS_MAX_SIZE: u32 = 1024;

// ---------------------------------------------------------------------------
// Source image
// ---------------------------------------------------------------------------

/// The decoded input. Renditions borrow it and never modify it.
#[derive(Debug, Clone)]
pub struct SourceImage {
    path: PathBuf,
    image: DynamicImage,
}

impl SourceImage {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(IconError::InputNotFound(path.to_path_buf()));
        }
        let image = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|e| IconError::io(path, e))?
            .decode()
            .map_err(|source| IconError::Decode { path: path.to_path_buf(), source })?;

        Ok(Self { path: path.to_path_buf(), image })
    }

    pub fn from_image(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self { path: path.into(), image }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// File stem used to name every artifact
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "icon".to_string())
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }

    pub fn has_alpha(&self) -> bool {
        self.image.color().has_alpha()
    }
}

/// Blends every pixel over opaque white, dropping the alpha channel.
pub fn composite_over_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        let a = a as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(r), blend(g), blend(b)]));
    }
    out
}

// ---------------------------------------------------------------------------
// BMP
// ---------------------------------------------------------------------------

fn write_bmp(source: &SourceImage, bmp_path: &Path, size: u32) -> Result<()> {
    let rgb = if source.has_alpha() {
        composite_over_white(source.image())
    } else {
        source.image().to_rgb8()
    };
    let resized = imageops::resize(&rgb, size, size, FILTER);
    resized
        .save_with_format(bmp_path, ImageFormat::Bmp)
        .map_err(|e| IconError::image(bmp_path, e))
}

/// Opaque `size`x`size` BMP; transparency is flattened onto white first.
pub fn generate_bmp(source: &SourceImage, bmp_path: &Path, size: u32, reporter: &Reporter) -> Result<PathBuf> {
    match write_bmp(source, bmp_path, size) {
        Ok(()) => {
            reporter.success(format!("Generated BMP: {}", bmp_path.display()));
            Ok(bmp_path.to_path_buf())
        }
        Err(e) => {
            reporter.error(format!("Error generating BMP: {}", e));
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// ICO
// ---------------------------------------------------------------------------

fn write_ico(source: &SourceImage, ico_path: &Path, sizes: &[u32]) -> Result<()> {
    let rgba = source.image().to_rgba8();
    let mut icon_dir = ico::IconDir::new(ico::ResourceType::Icon);

    for &size in sizes {
        let resized = imageops::resize(&rgba, size, size, FILTER);
        let icon_image = ico::IconImage::from_rgba_data(size, size, resized.into_raw());
        let entry = ico::IconDirEntry::encode(&icon_image)
            .map_err(|source| IconError::Ico { path: ico_path.to_path_buf(), source })?;
        icon_dir.add_entry(entry);
    }

    let file = File::create(ico_path).map_err(|e| IconError::io(ico_path, e))?;
    icon_dir
        .write(BufWriter::new(file))
        .map_err(|source| IconError::Ico { path: ico_path.to_path_buf(), source })
}

/// One ICO container holding a layer per entry of `sizes`, in that order.
pub fn generate_ico(source: &SourceImage, ico_path: &Path, sizes: &[u32], reporter: &Reporter) -> Result<PathBuf> {
    match write_ico(source, ico_path, sizes) {
        Ok(()) => {
            reporter.success(format!("Generated ICO: {}", ico_path.display()));
            reporter.detail(format!("  sizes: {:?}", sizes));
            Ok(ico_path.to_path_buf())
        }
        Err(e) => {
            reporter.error(format!("Error generating ICO: {}", e));
            Err(e)
        }
    }
}

// ---------------------------------------------------------------------------
// ICNS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconsetEntry {
    pub pixels: u32,
    pub file_name: String,
}

/// Names and pixel sizes staged for the ICNS packer.
/// Retina (@2x) variants are added for bases up to 512 whose double fits
/// within ICNS_MAX_SIZE; larger doubles are skipped, never clamped.
pub fn iconset_entries() -> Vec<IconsetEntry> {
    let mut entries = Vec::new();
    for size in ICNS_SIZES {
        entries.push(IconsetEntry {
            pixels: size,
            file_name: format!("icon_{0}x{0}.png", size),
        });
        if size <= 512 {
            let retina = size * 2;
            if retina <= ICNS_MAX_SIZE {
                entries.push(IconsetEntry {
                    pixels: retina,
                    file_name: format!("icon_{0}x{0}@2x.png", size),
                });
            }
        }
    }
    entries
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IcnsOutcome {
    /// The packer produced the ICNS container
    Packed(PathBuf),
    /// The packer is not installed; a single PNG was written instead
    Fallback(PathBuf),
    /// The packer ran and exited unsuccessfully
    ToolFailed { stderr: String },
    /// Staging or the fallback write failed
    Failed(String),
}

fn stage_iconset(source: &SourceImage, iconset: &Path, reporter: &Reporter) -> Result<()> {
    fs::create_dir_all(iconset).map_err(|e| IconError::io(iconset, e))?;
    let rgba = source.image().to_rgba8();
    let entries = iconset_entries();

    let bar = reporter.progress(entries.len() as u64, "staging iconset");
    for entry in &entries {
        let resized: RgbaImage = imageops::resize(&rgba, entry.pixels, entry.pixels, FILTER);
        let path = iconset.join(&entry.file_name);
        resized
            .save_with_format(&path, ImageFormat::Png)
            .map_err(|e| IconError::image(&path, e))?;
        bar.inc(1);
    }
    bar.finish_and_clear();
    Ok(())
}

fn write_icns_fallback(source: &SourceImage, icns_path: &Path, size: u32) -> Result<PathBuf> {
    let fallback_path = icns_path.with_extension("png");
    source
        .image()
        .resize_exact(size, size, FILTER)
        .save_with_format(&fallback_path, ImageFormat::Png)
        .map_err(|e| IconError::image(&fallback_path, e))?;
    Ok(fallback_path)
}

fn build_icns(
    source: &SourceImage,
    icns_path: &Path,
    config: &GeneratorConfig,
    reporter: &Reporter,
) -> Result<IcnsOutcome> {
    let parent = match icns_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    // Removed on drop, including every early return below
    let staging = tempfile::Builder::new()
        .prefix("iconset.")
        .tempdir_in(&parent)
        .map_err(|e| IconError::io(&parent, e))?;
    let iconset = staging.path().join(format!("{}.iconset", source.stem()));

    stage_iconset(source, &iconset, reporter)?;

    reporter.detail(format!("  running {} -c icns {}", config.iconutil, iconset.display()));
    let output = Command::new(&config.iconutil)
        .arg("-c")
        .arg("icns")
        .arg(&iconset)
        .arg("-o")
        .arg(icns_path)
        .output();

    let outcome = match output {
        Ok(out) if out.status.success() => {
            reporter.success(format!("Generated ICNS: {}", icns_path.display()));
            IcnsOutcome::Packed(icns_path.to_path_buf())
        }
        Ok(out) => {
            let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
            reporter.error(format!("Error running {} ({}): {}", config.iconutil, out.status, stderr));
            reporter.error("Note: iconutil is only available on macOS");
            IcnsOutcome::ToolFailed { stderr }
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            reporter.warn(format!("{} not found - creating PNG-based ICNS fallback", config.iconutil));
            let fallback = write_icns_fallback(source, icns_path, config.icns_fallback_size)?;
            reporter.success(format!("Generated ICNS fallback PNG: {}", fallback.display()));
            IcnsOutcome::Fallback(fallback)
        }
        Err(e) => return Err(IconError::io(&config.iconutil, e)),
    };

    let _ = staging.close();
    Ok(outcome)
}

/// Stages the iconset PNGs and packs them with the configured tool.
/// Problems are reported here and folded into the outcome.
pub fn generate_icns(
    source: &SourceImage,
    icns_path: &Path,
    config: &GeneratorConfig,
    reporter: &Reporter,
) -> IcnsOutcome {
    match build_icns(source, icns_path, config, reporter) {
        Ok(outcome) => outcome,
        Err(e) => {
            reporter.error(format!("Error generating ICNS: {}", e));
            IcnsOutcome::Failed(e.to_string())
        }
    }
}

// ---------------------------------------------------------------------------
// Plain PNG
// ---------------------------------------------------------------------------

/// `size`x`size` PNG in the source's own pixel format (alpha kept).
pub fn generate_png(source: &SourceImage, png_path: &Path, size: u32, reporter: &Reporter) -> Option<PathBuf> {
    let result = source
        .image()
        .resize_exact(size, size, FILTER)
        .save_with_format(png_path, ImageFormat::Png);

    match result {
        Ok(()) => {
            reporter.success(format!("Generated PNG: {}", png_path.display()));
            Some(png_path.to_path_buf())
        }
        Err(e) => {
            reporter.error(format!("Error generating PNG: {}", e));
            None
        }
    }
}
