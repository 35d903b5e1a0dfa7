//! Error types for `vague`
//!
//! Domain errors for configuration, the cycle engine and the preference
//! store, aggregated into [`VagueError`] with CLI exit code mapping.

use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `vague` CLI operations.
///
/// These codes follow Unix conventions.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution
    pub const SUCCESS: i32 = 0;

    /// General error
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid YAML, invalid pattern, validation failure)
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error (file not found, permission denied)
    pub const IO_ERROR: i32 = 3;

    /// Cycle engine error (rejected intent)
    pub const ENGINE_ERROR: i32 = 5;

    /// Preference store error
    pub const PREFERENCES_ERROR: i32 = 6;

    /// Usage error (invalid arguments, missing required options)
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C)
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `vague` operations.
///
/// Aggregates all domain-specific errors and provides a unified
/// interface for error handling and exit code mapping.
#[derive(Debug, Error)]
pub enum VagueError {
    /// Configuration loading or validation error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Cycle engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Preference store error
    #[error(transparent)]
    Preferences(#[from] PreferencesError),

    /// Invalid command-line usage
    #[error("usage error: {0}")]
    Usage(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl VagueError {
    /// Returns the appropriate exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Json(_) | Self::Yaml(_) => ExitCode::CONFIG_ERROR,
            Self::Engine(_) => ExitCode::ENGINE_ERROR,
            Self::Preferences(_) => ExitCode::PREFERENCES_ERROR,
            Self::Usage(_) => ExitCode::USAGE_ERROR,
            Self::Io(_) => ExitCode::IO_ERROR,
        }
    }
}

// ============================================================================
// Configuration Errors
// ============================================================================

/// Configuration loading and validation errors.
///
/// Covers session configuration files as well as breathing patterns
/// supplied on the command line or from stored preferences.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed
    #[error("parse error in {path}: {message}")]
    ParseError {
        /// Path to the configuration file
        path: PathBuf,
        /// Line number where the error occurred (if available)
        line: Option<usize>,
        /// Error message from the parser
        message: String,
    },

    /// Referenced configuration file not found
    #[error("file not found: {path}")]
    MissingFile {
        /// Path to the missing file
        path: PathBuf,
    },

    /// Field has an invalid value
    #[error("invalid value for '{field}': got '{value}', expected {expected}")]
    InvalidValue {
        /// Name of the field with invalid value
        field: String,
        /// The actual value provided
        value: String,
        /// Description of what was expected
        expected: String,
    },

    /// Breathing pattern rejected (wrong arity, non-positive or non-finite duration)
    #[error("invalid breathing pattern '{input}': {reason}")]
    InvalidPattern {
        /// The rejected input, as given
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Unknown difficulty level name
    #[error("unknown level '{name}'{}", did_you_mean(.suggestion))]
    UnknownLevel {
        /// The name that did not match
        name: String,
        /// Closest known level, if any
        suggestion: Option<String>,
    },
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    suggestion
        .as_ref()
        .map_or_else(String::new, |s| format!(" (did you mean '{s}'?)"))
}

// ============================================================================
// Engine Errors
// ============================================================================

/// Cycle engine and session intent errors.
///
/// Tick processing never produces these; they are only returned from
/// user intents the current state does not allow.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// Pattern changes are locked while a cycle is running or counting down
    #[error("cannot change the breathing pattern while a session is {state}")]
    PatternLocked {
        /// Session state that locked the pattern
        state: &'static str,
    },
}

// ============================================================================
// Preference Errors
// ============================================================================

/// Preference store failures.
///
/// Reads never fail (missing or corrupt data falls back to defaults);
/// only writes surface these.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// Backing file could not be written
    #[error("failed to write preferences to {path}: {source}")]
    Write {
        /// Preference file path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Preferences could not be encoded
    #[error("failed to encode preferences: {0}")]
    Encode(#[from] serde_json::Error),
}
