//! Stream configuration.
//!
//! A stream either runs a named filter template (with optional integrated
//! decimation) or, when `method` is set, one of the standalone decimators.
//! Configuration can be loaded from TOML:
//!
//! ```toml
//! filter = "fir_12_19"
//! decimation_factor = 6
//! buffer_size = 16384
//! sample_rate = 12000000
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::constants::{DEFAULT_AVERAGE_THRESHOLD, DEFAULT_BUFFER_SIZE, DEFAULT_SAMPLE_RATE};
use crate::decimate::DecimationMethod;
use crate::error::{FirError, Result};
use crate::fir::FilterRegistry;

/// Configuration for one sample stream.
///
/// # Example
/// ```
/// use magfir::config::StreamConfig;
///
/// let config = StreamConfig::from_toml_str("filter = \"hann_8\"\ndecimation_factor = 2").unwrap();
/// assert_eq!(config.filter, "hann_8");
/// assert_eq!(config.decimation_factor, 2);
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Filter template name
    pub filter: String,
    /// Keep 1 of every N samples (0 = no decimation)
    pub decimation_factor: u32,
    /// Standalone decimator to use instead of the filter
    pub method: Option<DecimationMethod>,
    /// Magnitude threshold for the `average-magnitude` method. Filter
    /// templates with built-in average decimation use their own threshold.
    pub threshold: i16,
    /// Processing block size in samples
    pub buffer_size: usize,
    /// Input sample rate in Hz
    pub sample_rate: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            filter: "fir_12_19".to_string(),
            decimation_factor: 0,
            method: None,
            threshold: DEFAULT_AVERAGE_THRESHOLD,
            buffer_size: DEFAULT_BUFFER_SIZE,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl StreamConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FirError::Config(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Check the settings against `registry` before any samples flow.
    pub fn validate(&self, registry: &FilterRegistry) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(FirError::Config("buffer_size must be positive".to_string()));
        }
        if self.sample_rate == 0 {
            return Err(FirError::Config("sample_rate must be positive".to_string()));
        }
        let factor = self.decimation_factor as usize;
        if factor > 1 && self.buffer_size % factor != 0 {
            log::warn!(
                "buffer_size {} is not a multiple of decimation factor {}; \
                 decimation phase restarts every buffer",
                self.buffer_size,
                factor
            );
        }
        match self.method {
            Some(_) if self.decimation_factor == 0 => Err(FirError::Config(
                "standalone decimation needs a factor of at least 1".to_string(),
            )),
            Some(_) => Ok(()),
            None if registry.get(&self.filter).is_none() => {
                Err(FirError::UnknownFilter(self.filter.clone()))
            }
            None => Ok(()),
        }
    }

    /// Sample rate after decimation
    pub fn output_sample_rate(&self) -> u32 {
        match self.decimation_factor {
            0 => self.sample_rate,
            factor => self.sample_rate / factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = StreamConfig::default();
        assert!(config.validate(FilterRegistry::builtin()).is_ok());
        assert_eq!(config.output_sample_rate(), DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = StreamConfig::from_toml_str("decimation_factor = 6").unwrap();
        assert_eq!(config.filter, "fir_12_19");
        assert_eq!(config.buffer_size, DEFAULT_BUFFER_SIZE);
        assert_eq!(config.output_sample_rate(), 2_000_000);
    }

    #[test]
    fn test_method_from_toml() {
        let config =
            StreamConfig::from_toml_str("method = \"max-magnitude\"\ndecimation_factor = 3")
                .unwrap();
        assert_eq!(config.method, Some(DecimationMethod::MaxMagnitude));
        assert!(config.validate(FilterRegistry::builtin()).is_ok());
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(StreamConfig::from_toml_str("filtr = \"box_4\"").is_err());
    }

    #[test]
    fn test_validate_unknown_filter() {
        let config = StreamConfig {
            filter: "nope".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(FilterRegistry::builtin()),
            Err(FirError::UnknownFilter(_))
        ));
    }

    #[test]
    fn test_validate_method_needs_factor() {
        let config = StreamConfig {
            method: Some(DecimationMethod::First),
            ..Default::default()
        };
        assert!(config.validate(FilterRegistry::builtin()).is_err());
    }

    #[test]
    fn test_validate_zero_buffer() {
        let config = StreamConfig {
            buffer_size: 0,
            ..Default::default()
        };
        assert!(config.validate(FilterRegistry::builtin()).is_err());
    }
}
