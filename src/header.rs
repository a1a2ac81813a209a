// ============================================================================
// header.rs — C header emitters for embedding icon bytes
// ============================================================================
//
// Two kinds of output: a byte-array header for one binary file, and a
// combined header that picks between the PNG-backed and BMP-backed arrays
// with a preprocessor flag. Output depends only on the inputs.
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{IconError, Result};

pub const PNG_ARRAY_NAME: &str = "app_icon_png_data";
pub const BMP_ARRAY_NAME: &str = "app_icon_bmp_data";

const BYTES_PER_ROW: usize = 16;

/// `app_icon_png_data` -> `app_icon_png_size`
pub fn size_symbol(array_name: &str) -> String {
    array_name.replace("_data", "_size")
}

/// Renders the header text for `data`. `source_name` only feeds the leading comment.
pub fn render_byte_array_header(source_name: &str, data: &[u8], array_name: &str) -> String {
    let size_name = size_symbol(array_name);
    // "0x00, " is six bytes per value plus row indentation
    let mut out = String::with_capacity(256 + data.len() * 6);

    let _ = writeln!(out, "// auto-generated icon data from {}", source_name);
    out.push_str("#pragma once\n\n");
    out.push_str("#include <stddef.h>\n\n");
    let _ = writeln!(out, "extern const unsigned char {}[];", array_name);
    let _ = writeln!(out, "extern const size_t {};\n", size_name);
    let _ = writeln!(out, "const unsigned char {}[] = {{", array_name);

    let rows = data.len().div_ceil(BYTES_PER_ROW);
    for (i, chunk) in data.chunks(BYTES_PER_ROW).enumerate() {
        out.push_str("    ");
        for (j, byte) in chunk.iter().enumerate() {
            if j > 0 {
                out.push_str(", ");
            }
            let _ = write!(out, "0x{:02x}", byte);
        }
        if i + 1 < rows {
            out.push(',');
        }
        out.push('\n');
    }

    out.push_str("};\n\n");
    let _ = writeln!(out, "const size_t {} = sizeof({});", size_name, array_name);
    out
}

/// Reads `icon_path` and writes its bytes as a C array to `header_path`.
pub fn generate_c_header(icon_path: &Path, header_path: &Path, array_name: &str) -> Result<()> {
    let data = fs::read(icon_path).map_err(|e| IconError::io(icon_path, e))?;
    let source_name = icon_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let text = render_byte_array_header(&source_name, &data, array_name);
    fs::write(header_path, text).map_err(|e| IconError::io(header_path, e))
}

pub fn render_combined_header(base_name: &str, feature_macro: &str) -> String {
    let png_size = size_symbol(PNG_ARRAY_NAME);
    let bmp_size = size_symbol(BMP_ARRAY_NAME);
    let mut out = String::new();

    out.push_str("// auto-generated combined icon header\n");
    out.push_str("#pragma once\n\n");
    let _ = writeln!(out, "#include \"{}_icon_png.h\"", base_name);
    let _ = writeln!(out, "#include \"{}_icon_bmp.h\"\n", base_name);
    out.push_str("// cross-platform icon data selection\n");
    let _ = writeln!(out, "#ifdef {}", feature_macro);
    let _ = writeln!(out, "static const unsigned char* const app_icon_data = {};", PNG_ARRAY_NAME);
    let _ = writeln!(out, "static const size_t app_icon_size = {};", png_size);
    out.push_str("#else\n");
    let _ = writeln!(out, "static const unsigned char* const app_icon_data = {};", BMP_ARRAY_NAME);
    let _ = writeln!(out, "static const size_t app_icon_size = {};", bmp_size);
    out.push_str("#endif\n");
    out
}

pub fn generate_combined_header(header_path: &Path, base_name: &str, feature_macro: &str) -> Result<()> {
    let text = render_combined_header(base_name, feature_macro);
    fs::write(header_path, text).map_err(|e| IconError::io(header_path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts the `0x..` literals between the array braces.
    fn count_literals(header: &str) -> usize {
        let start = header.find("[] = {").unwrap();
        let end = header[start..].find("};").unwrap() + start;
        header[start..end].matches("0x").count()
    }

    #[test]
    fn test_size_symbol() {
        assert_eq!(size_symbol("app_icon_png_data"), "app_icon_png_size");
        assert_eq!(size_symbol("icon"), "icon");
    }

    #[test]
    fn test_layout_of_short_array() {
        let text = render_byte_array_header("logo_32.bmp", &[0x42, 0x4d, 0x00, 0xff], "app_icon_bmp_data");
        let expected = "\
// auto-generated icon data from logo_32.bmp
#pragma once

#include <stddef.h>

extern const unsigned char app_icon_bmp_data[];
extern const size_t app_icon_bmp_size;

const unsigned char app_icon_bmp_data[] = {
    0x42, 0x4d, 0x00, 0xff
};

const size_t app_icon_bmp_size = sizeof(app_icon_bmp_data);
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_rows_of_sixteen_without_trailing_comma() {
        let data: Vec<u8> = (0..=33).collect();
        let text = render_byte_array_header("x.png", &data, "app_icon_png_data");
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("    0x")).collect();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].matches("0x").count(), 16);
        assert!(rows[0].ends_with("0x0f,"));
        assert!(rows[1].starts_with("    0x10, 0x11"));
        assert!(rows[1].ends_with(","));
        assert_eq!(rows[2], "    0x20, 0x21");
        assert_eq!(count_literals(&text), data.len());
    }

    #[test]
    fn test_exact_multiple_of_row_width() {
        let data = vec![0xabu8; 32];
        let text = render_byte_array_header("x.png", &data, "app_icon_png_data");
        let rows: Vec<&str> = text.lines().filter(|l| l.starts_with("    0x")).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].ends_with(','));
        assert!(rows[1].ends_with("0xab"));
    }

    #[test]
    fn test_file_roundtrip_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let icon = dir.path().join("icon.bin");
        let data: Vec<u8> = (0..1000u32).map(|i| (i * 7 % 256) as u8).collect();
        fs::write(&icon, &data).unwrap();

        let first = dir.path().join("first.h");
        let second = dir.path().join("second.h");
        generate_c_header(&icon, &first, PNG_ARRAY_NAME).unwrap();
        generate_c_header(&icon, &second, PNG_ARRAY_NAME).unwrap();

        let a = fs::read(&first).unwrap();
        let b = fs::read(&second).unwrap();
        assert_eq!(a, b);
        assert_eq!(count_literals(&String::from_utf8(a).unwrap()), data.len());
    }

    #[test]
    fn test_missing_source_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = generate_c_header(
            &dir.path().join("absent.bmp"),
            &dir.path().join("absent.h"),
            BMP_ARRAY_NAME,
        );
        assert!(matches!(result, Err(IconError::Io { .. })));
        assert!(!dir.path().join("absent.h").exists());
    }

    #[test]
    fn test_combined_header_branches() {
        let text = render_combined_header("logo", "HAVE_SDL_IMAGE");
        assert!(text.contains("#include \"logo_icon_png.h\"\n#include \"logo_icon_bmp.h\"\n"));

        let (png_branch, bmp_branch) = text.split_once("#else").unwrap();
        assert!(png_branch.contains("#ifdef HAVE_SDL_IMAGE"));
        assert!(png_branch.contains("app_icon_data = app_icon_png_data;"));
        assert!(png_branch.contains("app_icon_size = app_icon_png_size;"));
        assert!(bmp_branch.contains("app_icon_data = app_icon_bmp_data;"));
        assert!(bmp_branch.contains("app_icon_size = app_icon_bmp_size;"));
        assert!(bmp_branch.trim_end().ends_with("#endif"));
    }
}
