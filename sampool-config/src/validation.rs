//! Custom validation functions for configuration.

use validator::ValidationError;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a default log level name.
pub fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    if LOG_LEVELS.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_log_level"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_levels_case_insensitively() {
        assert!(validate_log_level("info").is_ok());
        assert!(validate_log_level("WARN").is_ok());
        assert!(validate_log_level("verbose").is_err());
        assert!(validate_log_level("").is_err());
    }
}
