// Configuration for one presence analysis run
//
// Loaded from TOML so the same timescale and tolerance can be shared between
// the producers of presence data and the reporting tools that consume it.

use crate::error::Result as PresenceResult;
use crate::timescale::Timescale;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Timescale parameters as written in configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimescaleConfig {
    pub t0: f64,
    pub t1: f64,
    pub bin_width: f64,
}

/// Configuration for building a presence matrix and querying it
///
/// # Example TOML
/// ```toml
/// tolerance = 1e-6
/// apply_closure = true
///
/// [timescale]
/// t0 = 0.0
/// t1 = 24.0
/// bin_width = 1.0
/// ```
///
/// # Example
/// ```
/// use presence_calculus::config::AnalysisConfig;
///
/// let config = AnalysisConfig::new(0.0, 6.0, 1.0);
/// assert_eq!(config.tolerance, 1e-6);
/// assert!(config.apply_closure);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Discretization of the observation period
    pub timescale: TimescaleConfig,

    /// Absolute tolerance for checking `L = Λ·w`
    ///
    /// Default: 1e-6
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Reduce each (element, boundary) cover to its closure before building
    /// the matrix
    ///
    /// Without closure, overlapping records of one stay are counted once per
    /// record. Disable only when the input is known to be canonical.
    ///
    /// Default: true
    #[serde(default = "default_apply_closure")]
    pub apply_closure: bool,
}

fn default_tolerance() -> f64 {
    1e-6
}

fn default_apply_closure() -> bool {
    true
}

impl AnalysisConfig {
    /// Configuration over `[t0, t1)` with default tolerance and closure enabled
    pub fn new(t0: f64, t1: f64, bin_width: f64) -> Self {
        Self {
            timescale: TimescaleConfig { t0, t1, bin_width },
            tolerance: default_tolerance(),
            apply_closure: default_apply_closure(),
        }
    }

    /// Same timescale, but presences are used exactly as given
    pub fn raw(t0: f64, t1: f64, bin_width: f64) -> Self {
        Self {
            apply_closure: false,
            ..Self::new(t0, t1, bin_width)
        }
    }

    /// Parse configuration from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).context("Failed to parse TOML analysis configuration")?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid analysis configuration: {}", e))?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    ///
    /// # Errors
    /// Returns error if the file can't be read, has invalid TOML syntax, or
    /// fails validation.
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read analysis config: {}",
                path.as_ref().display()
            )
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("In analysis config: {}", path.as_ref().display()))
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        let ts = &self.timescale;
        if !(ts.t0.is_finite() && ts.t1.is_finite() && ts.bin_width.is_finite()) {
            return Err(format!(
                "timescale bounds and bin_width must be finite, got t0={}, t1={}, bin_width={}",
                ts.t0, ts.t1, ts.bin_width
            ));
        }

        if ts.t1 <= ts.t0 {
            return Err(format!(
                "timescale t1 must be greater than t0, got t0={}, t1={}",
                ts.t0, ts.t1
            ));
        }

        if ts.bin_width <= 0.0 {
            return Err(format!(
                "timescale bin_width must be positive, got {}",
                ts.bin_width
            ));
        }

        if self.tolerance.is_nan() || self.tolerance < 0.0 {
            return Err(format!(
                "tolerance must be non-negative, got {}",
                self.tolerance
            ));
        }

        self.timescale().map_err(|e| e.to_string())?;

        Ok(())
    }

    /// Build the configured timescale
    pub fn timescale(&self) -> PresenceResult<Timescale> {
        Timescale::new(
            self.timescale.t0,
            self.timescale.t1,
            self.timescale.bin_width,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_new_defaults() {
        let config = AnalysisConfig::new(0.0, 6.0, 1.0);
        assert_eq!(config.tolerance, 1e-6);
        assert!(config.apply_closure);
        assert_eq!(config.timescale().unwrap().num_bins(), 6);
    }

    #[test]
    fn test_raw_disables_closure() {
        let config = AnalysisConfig::raw(0.0, 6.0, 1.0);
        assert!(!config.apply_closure);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_with_defaults() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            [timescale]
            t0 = 0.0
            t1 = 24.0
            bin_width = 0.5
            "#,
        )
        .unwrap();
        assert_eq!(config.timescale.bin_width, 0.5);
        assert_eq!(config.tolerance, 1e-6);
        assert!(config.apply_closure);
        assert_eq!(config.timescale().unwrap().num_bins(), 48);
    }

    #[test]
    fn test_parse_overrides() {
        let config = AnalysisConfig::from_toml_str(
            r#"
            tolerance = 1e-9
            apply_closure = false

            [timescale]
            t0 = 10.0
            t1 = 20.0
            bin_width = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.tolerance, 1e-9);
        assert!(!config.apply_closure);
    }

    #[test]
    fn test_parse_rejects_invalid_timescale() {
        let result = AnalysisConfig::from_toml_str(
            r#"
            [timescale]
            t0 = 5.0
            t1 = 5.0
            bin_width = 1.0
            "#,
        );
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Invalid analysis configuration"));
    }

    #[test]
    fn test_parse_rejects_missing_timescale() {
        assert!(AnalysisConfig::from_toml_str("tolerance = 0.1").is_err());
    }

    #[test]
    fn test_invalid_tolerance() {
        let mut config = AnalysisConfig::new(0.0, 1.0, 0.1);
        config.tolerance = -1.0;
        assert!(config.validate().is_err());
        config.tolerance = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_bin_width() {
        let config = AnalysisConfig::new(0.0, 1.0, 0.0);
        assert!(config.validate().is_err());
        assert!(config.timescale().is_err());
    }

    #[test]
    fn test_rejects_timescale_with_too_many_bins() {
        let err = AnalysisConfig::from_toml_str(
            r#"
            [timescale]
            t0 = 0.0
            t1 = 1.0
            bin_width = 1e-19
            "#,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("too many bins"));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[timescale]\nt0 = 0.0\nt1 = 6.0\nbin_width = 1.0").unwrap();

        let config = AnalysisConfig::from_toml(file.path()).unwrap();
        assert_eq!(config, AnalysisConfig::new(0.0, 6.0, 1.0));
    }

    #[test]
    fn test_from_toml_missing_file() {
        let err = AnalysisConfig::from_toml("/nonexistent/analysis.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read analysis config"));
    }
}
