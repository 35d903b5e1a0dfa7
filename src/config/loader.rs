//! Session configuration loading
//!
//! Reads a YAML file, strips a UTF-8 BOM, enforces a size limit,
//! deserializes and validates.

use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;

use super::schema::SessionConfig;

/// Largest configuration file accepted, in bytes.
pub const MAX_CONFIG_SIZE: u64 = 64 * 1024;

/// Loads and validates a session configuration file.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The file exceeds [`MAX_CONFIG_SIZE`]
/// - YAML parsing fails or the document is empty
/// - Validation fails
pub fn load_config(path: &Path) -> Result<SessionConfig, ConfigError> {
    let metadata = std::fs::metadata(path).map_err(|_| ConfigError::MissingFile {
        path: path.to_path_buf(),
    })?;
    if metadata.len() > MAX_CONFIG_SIZE {
        return Err(ConfigError::InvalidValue {
            field: "file_size".to_owned(),
            value: format!("{} bytes", metadata.len()),
            expected: format!("at most {MAX_CONFIG_SIZE} bytes"),
        });
    }

    let raw = std::fs::read_to_string(path).map_err(|_| ConfigError::MissingFile {
        path: path.to_path_buf(),
    })?;
    let config = parse_config(&raw, path)?;
    debug!(path = %path.display(), "session configuration loaded");
    Ok(config)
}

/// Parses and validates configuration text; `origin` is used in errors.
///
/// # Errors
///
/// Returns `ConfigError::ParseError` for malformed or empty YAML and
/// `ConfigError::InvalidValue` for out-of-range values.
pub fn parse_config(raw: &str, origin: &Path) -> Result<SessionConfig, ConfigError> {
    let raw = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let root: serde_yaml::Value =
        serde_yaml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: e.location().map(|l| l.line()),
            message: e.to_string(),
        })?;

    if root.is_null() {
        return Err(ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: None,
            message: "Configuration file is empty".to_string(),
        });
    }

    let config: SessionConfig =
        serde_yaml::from_value(root).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            line: None,
            message: format!("Failed to deserialize configuration: {e}"),
        })?;

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_file_with_bom() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "\u{feff}canvas:\n  width: 500\n").unwrap();
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.canvas.width, 500.0);
    }

    #[test]
    fn missing_file_reported() {
        let err = load_config(Path::new("/nonexistent/vague.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingFile { .. }));
    }

    #[test]
    fn empty_document_is_parse_error() {
        let err = parse_config("   \n", Path::new("empty.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { line: None, .. }));
    }

    #[test]
    fn malformed_yaml_reports_line() {
        let err = parse_config("timing:\n  countdown_secs: [\n", Path::new("bad.yaml")).unwrap_err();
        match err {
            ConfigError::ParseError { line, .. } => assert!(line.is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn invalid_values_surface_after_parse() {
        let err = parse_config("milestones:\n  tolerance: 0.9\n", Path::new("t.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn oversized_file_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let padding = "#".repeat(usize::try_from(MAX_CONFIG_SIZE).unwrap() + 1);
        writeln!(file, "{padding}").unwrap();
        let err = load_config(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "file_size"));
    }
}
