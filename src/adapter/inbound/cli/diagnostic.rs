//! Miette-based error diagnostics for CLI error presentation.
//!
//! Configuration errors are rendered with the offending TOML snippet and a
//! label pointing at the problem; ledger rejections carry a help line
//! naming their error class.

use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::domain::{ErrorKind, LedgerError};
use crate::error::{ConfigError, Error};

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(oddsledger::config))]
pub struct ConfigDiagnostic {
    /// Human-readable error message.
    pub message: String,

    /// Source content (the configuration file).
    #[source_code]
    pub src: NamedSource<String>,

    /// Byte offset and length of the problematic region.
    #[label("here")]
    pub span: Option<SourceSpan>,

    /// Optional help text with suggestions for fixing the error.
    #[help]
    pub help: Option<String>,
}

impl ConfigDiagnostic {
    /// Create a configuration diagnostic.
    #[must_use]
    pub fn new(message: impl Into<String>, name: &str, src: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(name, src.into()),
            span: None,
            help: None,
        }
    }

    /// Point the diagnostic at `len` bytes from `offset`.
    #[must_use]
    pub fn with_span(mut self, offset: usize, len: usize) -> Self {
        self.span = Some((offset, len).into());
        self
    }

    /// Add a help suggestion to the error.
    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Ledger rejection surfaced on the command line.
#[derive(Debug, Error, Diagnostic)]
#[error("{source}")]
#[diagnostic(code(oddsledger::ledger))]
pub struct LedgerDiagnostic {
    #[source]
    pub source: LedgerError,

    #[help]
    pub help: Option<String>,
}

impl From<LedgerError> for LedgerDiagnostic {
    fn from(source: LedgerError) -> Self {
        let help = match source.kind() {
            ErrorKind::Validation => Some("check the command arguments".to_string()),
            ErrorKind::State => {
                Some("inspect the market with `oddsledger market show`".to_string())
            }
            ErrorKind::Authorization => {
                Some("pass an account holding the role with `--caller`".to_string())
            }
            ErrorKind::External => Some("the ledger was rolled back; retry later".to_string()),
            ErrorKind::Ledger => None,
        };
        Self { source, help }
    }
}

/// Build the richest diagnostic available for `err`.
///
/// Configuration errors re-read `config_path` so the snippet can be shown.
#[must_use]
pub fn report(err: Error, config_path: &Path) -> miette::Report {
    match err {
        Error::Config(ConfigError::Parse(parse)) => {
            let name = config_path.display().to_string();
            let content = std::fs::read_to_string(config_path).unwrap_or_default();
            let mut diagnostic = ConfigDiagnostic::new(parse.message().to_string(), &name, content);
            if let Some(range) = parse.span() {
                diagnostic = diagnostic.with_span(range.start, range.len().max(1));
            }
            miette::Report::new(diagnostic.with_help("fix the TOML syntax and retry"))
        }
        Error::Config(ConfigError::ReadFile(io)) => miette::Report::new(
            ConfigDiagnostic::new(
                format!("failed to read {}: {io}", config_path.display()),
                &config_path.display().to_string(),
                String::new(),
            )
            .with_help("create the file or pass another one with --config"),
        ),
        Error::Config(other) => {
            let name = config_path.display().to_string();
            let content = std::fs::read_to_string(config_path).unwrap_or_default();
            let mut diagnostic = ConfigDiagnostic::new(other.to_string(), &name, content.clone());
            if let Some(field) = field_of(&other) {
                if let Some(offset) = content.find(field) {
                    diagnostic = diagnostic.with_span(offset, field.len());
                }
            }
            miette::Report::new(diagnostic)
        }
        Error::Ledger(ledger) => miette::Report::new(LedgerDiagnostic::from(ledger)),
        other => miette::Report::msg(other.to_string()),
    }
}

fn field_of(err: &ConfigError) -> Option<&'static str> {
    match err {
        ConfigError::MissingField { field } | ConfigError::InvalidValue { field, .. } => {
            Some(*field)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_errors_get_help() {
        let diagnostic = LedgerDiagnostic::from(LedgerError::Paused);
        assert!(diagnostic.help.is_some());
    }

    #[test]
    fn invalid_value_points_at_field() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("oddsledger.toml");
        std::fs::write(&path, "[ledger]\nfee_bps = 5000\n").unwrap();

        let err = Error::Config(ConfigError::InvalidValue {
            field: "fee_bps",
            reason: "must be at most 1000".into(),
        });
        let report = report(err, &path);
        assert!(report.to_string().contains("fee_bps"));
    }
}
