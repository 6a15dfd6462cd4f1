//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.canonicalize.max_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "canonicalize.max_dimension must be > 0".into(),
            ));
        }
        if !self.canonicalize.contrast_factor.is_finite() || self.canonicalize.contrast_factor <= 0.0
        {
            return Err(ConfigError::ValidationError(
                "canonicalize.contrast_factor must be a positive number".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.decode_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.decode_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.providers.gemini.endpoint.is_empty() || self.providers.openrouter.endpoint.is_empty()
        {
            return Err(ConfigError::ValidationError(
                "providers.*.endpoint must not be empty".into(),
            ));
        }
        if !matches!(self.output.format.as_str(), "text" | "json") {
            return Err(ConfigError::ValidationError(format!(
                "output.format must be \"text\" or \"json\", got \"{}\"",
                self.output.format
            )));
        }
        if let Some(model) = self.models.iter().find(|m| m.id.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "models entry \"{}\" has an empty id",
                model.name
            )));
        }
        if self.registry().describe(&self.analysis.default_model).is_none() {
            return Err(ConfigError::ValidationError(format!(
                "analysis.default_model \"{}\" is not in the model catalogue",
                self.analysis.default_model
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_max_dimension() {
        let mut config = Config::default();
        config.canonicalize.max_dimension = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_dimension"));
    }

    #[test]
    fn test_validate_rejects_bad_contrast() {
        let mut config = Config::default();
        config.canonicalize.contrast_factor = 0.0;
        assert!(config.validate().is_err());

        config.canonicalize.contrast_factor = f32::NAN;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("contrast_factor"));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let mut config = Config::default();
        config.limits.request_timeout_ms = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_ms"));
    }

    #[test]
    fn test_validate_rejects_unknown_output_format() {
        let mut config = Config::default();
        config.output.format = "yaml".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("output.format"));
    }

    #[test]
    fn test_validate_rejects_unknown_default_model() {
        let mut config = Config::default();
        config.analysis.default_model = "not/a-model".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("not/a-model"));
    }

    #[test]
    fn test_zero_pass_delay_is_allowed() {
        let mut config = Config::default();
        config.analysis.pass_delay_ms = 0;
        assert!(config.validate().is_ok());
    }
}
