//! Error taxonomy for the planning engine
//!
//! Every engine operation returns [`Result`]. Nothing in the engine recovers
//! locally; the CLI decides how each kind maps to a message and exit code.

use std::path::PathBuf;

/// Result alias used throughout `supe_core`
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Project name failed validation
    #[error("Invalid project name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// Unknown or incompatible framework, package manager, UI library or theme,
    /// and misconfigured verification options
    #[error("{0}")]
    Configuration(String),

    /// A preset entry is malformed or references something unknown
    #[error("Preset '{id}' is invalid: {problem}")]
    PresetValidation { id: String, problem: String },

    /// SHA-256 of a preset pack did not match the expected digest
    #[error("Integrity check failed for {}: expected sha256 {expected}, got {actual}", path.display())]
    Integrity {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// A signature was checked and rejected
    #[error("Signature verification failed ({provider}): {detail}")]
    SignatureVerification {
        provider: &'static str,
        detail: String,
    },

    /// External verification tooling is not installed
    #[error("Signature provider '{provider}' requires '{tool}', which is not installed or not on PATH")]
    SignatureToolMissing {
        provider: &'static str,
        tool: &'static str,
    },

    /// Unbalanced quoting in a planned command
    #[error("Malformed command (unbalanced quotes): {command}")]
    MalformedCommand { command: String },

    /// A planned command tries to run a program outside the allow-list
    #[error("Blocked executable '{executable}' in command: {command}")]
    BlockedExecutable { executable: String, command: String },

    /// A spawned command exited non-zero, timed out or could not start
    #[error("Scaffold command failed: {command} ({reason})")]
    ScaffoldExecution { command: String, reason: String },

    /// The policy document is not a JSON object
    #[error("Policy file {} is not a valid policy object: {detail}", path.display())]
    PolicyFileFormat { path: PathBuf, detail: String },

    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Stable name of the error kind, used in machine-readable output
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidName { .. } => "InvalidNameError",
            Error::Configuration(_) => "ConfigurationError",
            Error::PresetValidation { .. } => "PresetValidationError",
            Error::Integrity { .. } => "IntegrityError",
            Error::SignatureVerification { .. } => "SignatureVerificationError",
            Error::SignatureToolMissing { .. } => "SignatureToolMissingError",
            Error::MalformedCommand { .. } => "MalformedCommandError",
            Error::BlockedExecutable { .. } => "BlockedExecutableError",
            Error::ScaffoldExecution { .. } => "ScaffoldExecutionError",
            Error::PolicyFileFormat { .. } => "PolicyFileFormatError",
            Error::Io { .. } => "IoError",
        }
    }

    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }

    pub(crate) fn preset(id: impl Into<String>, problem: impl Into<String>) -> Self {
        Error::PresetValidation {
            id: id.into(),
            problem: problem.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
