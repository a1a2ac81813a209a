// config.rs - Generator settings, optionally read from a TOML file
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::error::IconError;

pub const DEFAULT_ICO_SIZES: [u32; 4] = [16, 32, 48, 64];
pub const DEFAULT_FEATURE_MACRO: &str = "HAVE_SDL_IMAGE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Edge length of the opaque BMP rendition
    pub bmp_size: u32,
    /// ICO layers, written in this order
    pub ico_sizes: Vec<u32>,
    /// Edge length of the plain PNG rendition
    pub png_size: u32,
    /// Edge length of the PNG written when the ICNS packer is missing
    pub icns_fallback_size: u32,
    /// Preprocessor flag selecting PNG data in the combined header
    pub feature_macro: String,
    /// Program that packs the staged iconset into an ICNS container
    pub iconutil: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bmp_size: 32,
            ico_sizes: DEFAULT_ICO_SIZES.to_vec(),
            png_size: 64,
            icns_fallback_size: 512,
            feature_macro: DEFAULT_FEATURE_MACRO.to_string(),
            iconutil: "iconutil".to_string(),
        }
    }
}

impl GeneratorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: GeneratorConfig = toml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IconError> {
        let named = [
            ("bmp_size", self.bmp_size),
            ("png_size", self.png_size),
            ("icns_fallback_size", self.icns_fallback_size),
        ];
        for (name, value) in named {
            if value == 0 {
                return Err(IconError::InvalidConfig(format!("{} must be greater than 0", name)));
            }
        }

        if self.ico_sizes.is_empty() {
            return Err(IconError::InvalidConfig("ico_sizes must not be empty".to_string()));
        }
        // ICO directory entries store each dimension in one byte (0 meaning 256)
        if let Some(bad) = self.ico_sizes.iter().find(|&&s| s == 0 || s > 256) {
            return Err(IconError::InvalidConfig(format!(
                "ico size {} is out of range (1..=256)",
                bad
            )));
        }

        if !is_c_identifier(&self.feature_macro) {
            return Err(IconError::InvalidConfig(format!(
                "feature_macro '{}' is not a valid C identifier",
                self.feature_macro
            )));
        }

        if self.iconutil.trim().is_empty() {
            return Err(IconError::InvalidConfig("iconutil must not be empty".to_string()));
        }

        Ok(())
    }
}

fn is_c_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        write!(tmp, "{}", content).unwrap();
        tmp
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = GeneratorConfig::default();
        assert_eq!(config.bmp_size, 32);
        assert_eq!(config.ico_sizes, vec![16, 32, 48, 64]);
        assert_eq!(config.png_size, 64);
        assert_eq!(config.feature_macro, "HAVE_SDL_IMAGE");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tmp = write_config("ico_sizes = [256, 16]\nfeature_macro = \"USE_PNG_ICON\"\n");
        let config = GeneratorConfig::load(tmp.path()).unwrap();
        assert_eq!(config.ico_sizes, vec![256, 16]);
        assert_eq!(config.feature_macro, "USE_PNG_ICON");
        assert_eq!(config.bmp_size, 32);
        assert_eq!(config.iconutil, "iconutil");
    }

    #[test]
    fn test_unknown_key_rejected() {
        let tmp = write_config("background = \"black\"\n");
        assert!(GeneratorConfig::load(tmp.path()).is_err());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let tmp = write_config("ico_sizes = []\n");
        assert!(GeneratorConfig::load(tmp.path()).is_err());

        let tmp = write_config("ico_sizes = [16, 512]\n");
        assert!(GeneratorConfig::load(tmp.path()).is_err());

        let tmp = write_config("bmp_size = 0\n");
        assert!(GeneratorConfig::load(tmp.path()).is_err());

        let tmp = write_config("feature_macro = \"1BAD-NAME\"\n");
        assert!(GeneratorConfig::load(tmp.path()).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = GeneratorConfig::load("/nonexistent/icons.toml").unwrap_err();
        assert!(err.to_string().contains("reading config file"));
    }
}
