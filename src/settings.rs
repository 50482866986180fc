//! Conversion settings module.
//!
//! Handles loading and validating `webpress.toml`. Settings are an explicit
//! struct threaded as a parameter into every core call — no component reads
//! configuration ambiently, so a batch and a one-off conversion can run with
//! different settings in the same process.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! quality = 80                      # WebP encoding quality (1-100)
//! keep_original = true              # Keep the source file after conversion
//! auto_convert = false              # Convert on upload (caller-enforced gate)
//! max_file_size_bytes = 10485760    # Inputs above this are skipped (10 MiB)
//! max_dimension_px = 8192           # Inputs wider/taller than this are skipped
//! memory_budget_bytes = 536870912   # Peak decode memory budget (512 MiB)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Settings validation error: {0}")]
    Validation(String),
}

/// Conversion settings loaded from `webpress.toml`.
///
/// All fields have defaults. Settings files need only specify the values they
/// want to override. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConversionSettings {
    /// WebP encoding quality, 1-100.
    pub quality: u32,
    /// Keep the original raster file after a successful conversion.
    pub keep_original: bool,
    /// Whether upload-time triggers should convert at all. The engine never
    /// reads this itself; it gates whether the caller invokes the engine.
    pub auto_convert: bool,
    /// Inputs larger than this many bytes are skipped, not failed.
    pub max_file_size_bytes: u64,
    /// Inputs wider or taller than this are skipped.
    pub max_dimension_px: u32,
    /// Conservative peak-memory budget for a single decode/encode.
    pub memory_budget_bytes: u64,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            quality: 80,
            keep_original: true,
            auto_convert: false,
            max_file_size_bytes: 10 * 1024 * 1024,
            max_dimension_px: 8192,
            memory_budget_bytes: 512 * 1024 * 1024,
        }
    }
}

impl ConversionSettings {
    /// Load settings from a TOML file. A missing file yields the defaults;
    /// a malformed file is an error.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        let settings: Self = toml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate settings values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.quality == 0 || self.quality > 100 {
            return Err(SettingsError::Validation("quality must be 1-100".into()));
        }
        if self.max_file_size_bytes == 0 {
            return Err(SettingsError::Validation(
                "max_file_size_bytes must be non-zero".into(),
            ));
        }
        if self.max_dimension_px == 0 {
            return Err(SettingsError::Validation(
                "max_dimension_px must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// The stock settings file with all options documented.
pub fn stock_settings_toml() -> &'static str {
    r##"# Webpress Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Unknown keys will cause an error.

# WebP encoding quality (1 = smallest, 100 = best).
quality = 80

# Keep the original JPEG/PNG after a successful conversion. When false, the
# source file is deleted only after the WebP output has been validated.
keep_original = true

# Convert images at upload time. Webpress itself never reads this flag; it
# tells the hosting environment whether to invoke the converter on upload.
auto_convert = false

# Inputs larger than this many bytes are skipped (policy, not an error).
max_file_size_bytes = 10485760

# Inputs wider or taller than this many pixels are skipped.
max_dimension_px = 8192

# Peak memory budget for a single decode/encode. Images whose estimated
# working set exceeds this are skipped instead of risking the process.
memory_budget_bytes = 536870912
"##
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let s = ConversionSettings::default();
        assert_eq!(s.quality, 80);
        assert!(s.keep_original);
        assert!(!s.auto_convert);
        assert_eq!(s.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(s.max_dimension_px, 8192);
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let s: ConversionSettings = toml::from_str("quality = 65").unwrap();
        assert_eq!(s.quality, 65);
        assert!(s.keep_original);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<ConversionSettings, _> = toml::from_str("qualty = 65");
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_out_of_range_quality() {
        let mut s = ConversionSettings::default();
        s.quality = 0;
        assert!(s.validate().is_err());
        s.quality = 101;
        assert!(s.validate().is_err());
        s.quality = 100;
        assert!(s.validate().is_ok());
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let tmp = tempfile::TempDir::new().unwrap();
        let s = ConversionSettings::load(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(s, ConversionSettings::default());
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("webpress.toml");
        std::fs::write(&path, "quality = 42\nkeep_original = false\n").unwrap();
        let s = ConversionSettings::load(&path).unwrap();
        assert_eq!(s.quality, 42);
        assert!(!s.keep_original);
    }

    #[test]
    fn stock_settings_toml_roundtrips_to_defaults() {
        let s: ConversionSettings = toml::from_str(stock_settings_toml()).unwrap();
        assert_eq!(s, ConversionSettings::default());
    }
}
