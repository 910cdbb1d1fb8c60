//! Export configuration, loaded from an optional TOML file.
//!
//! ```toml
//! include_size_24 = false
//! upscale_128 = true
//! output_format = "Raster"
//! product_tag = "VCL_EXPORT"
//! default_archive_name = "EXPORT.zip"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pass::ArchiveNaming;
use crate::target::{OutputFormat, Preferences};

pub const DEFAULT_PRODUCT_TAG: &str = "VCL_EXPORT";
pub const DEFAULT_ARCHIVE_NAME: &str = "EXPORT.zip";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    pub include_size_24: bool,
    pub upscale_128: bool,
    pub output_format: OutputFormat,
    pub product_tag: String,
    pub default_archive_name: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        let prefs = Preferences::default();
        ExportConfig {
            include_size_24: prefs.include_size_24,
            upscale_128: prefs.upscale_128,
            output_format: prefs.output_format,
            product_tag: DEFAULT_PRODUCT_TAG.to_string(),
            default_archive_name: DEFAULT_ARCHIVE_NAME.to_string(),
        }
    }
}

impl ExportConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<ExportConfig> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| Error::LoadConfig {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ExportConfig = toml::from_str(&contents).map_err(|source| Error::ParseConfig {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), ?config, "Loaded configuration");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let tag_ok = !self.product_tag.is_empty()
            && self
                .product_tag
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !tag_ok {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "product_tag `{}` must be non-empty and use only letters, digits, `_` or `-`",
                    self.product_tag
                ),
            });
        }

        if !self.default_archive_name.to_ascii_lowercase().ends_with(".zip")
            || self.default_archive_name.len() <= ".zip".len()
        {
            return Err(Error::InvalidConfig {
                reason: format!(
                    "default_archive_name `{}` must be a `.zip` file name",
                    self.default_archive_name
                ),
            });
        }

        Ok(())
    }

    pub fn preferences(&self) -> Preferences {
        Preferences {
            include_size_24: self.include_size_24,
            upscale_128: self.upscale_128,
            output_format: self.output_format,
        }
    }

    pub fn naming(&self) -> ArchiveNaming {
        ArchiveNaming {
            product_tag: self.product_tag.clone(),
            default_name: self.default_archive_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert!(!config.include_size_24);
        assert!(config.upscale_128);
        assert_eq!(config.output_format, OutputFormat::Raster);
        assert_eq!(config.product_tag, "VCL_EXPORT");
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("varpack.toml");
        std::fs::write(&path, "output_format = \"Vector\"\nproduct_tag = \"ICONS\"\n").unwrap();

        let config = ExportConfig::load(&path).unwrap();
        assert_eq!(config.output_format, OutputFormat::Vector);
        assert_eq!(config.product_tag, "ICONS");
        assert!(config.upscale_128);
        assert_eq!(config.default_archive_name, DEFAULT_ARCHIVE_NAME);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("varpack.toml");
        std::fs::write(&path, "upscale = false\n").unwrap();
        assert!(matches!(
            ExportConfig::load(&path),
            Err(Error::ParseConfig { .. })
        ));
    }

    #[test]
    fn test_invalid_values() {
        let config = ExportConfig {
            product_tag: "has space".into(),
            ..ExportConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));

        let config = ExportConfig {
            default_archive_name: "export.tar".into(),
            ..ExportConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ExportConfig::load("/nonexistent/varpack.toml"),
            Err(Error::LoadConfig { .. })
        ));
    }
}
