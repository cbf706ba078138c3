use thiserror::Error;

/// A value that could not be normalized (date or decimal text).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {expected} '{input}'")]
pub struct ParseError {
    pub input: String,
    pub expected: String,
}

impl ParseError {
    pub fn new(input: impl Into<String>, expected: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            expected: expected.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    /// A required setting is missing. Not retried.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A sheet could not be fetched or read as a table.
    #[error("source `{sheet}` unavailable: {message}")]
    SourceUnavailable { sheet: String, message: String },

    /// A sheet was fetched but its header lacks a schema column.
    #[error("source `{sheet}` unavailable: missing required column `{column}`")]
    MissingColumn { sheet: String, column: String },

    #[error("{context}: {source}")]
    Parse {
        context: String,
        #[source]
        source: ParseError,
    },

    #[error("no deals match the current filter selection")]
    EmptySelection,

    #[error("terminal error: {0}")]
    Terminal(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl AppError {
    pub fn source_unavailable(sheet: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SourceUnavailable {
            sheet: sheet.into(),
            message: message.into(),
        }
    }

    pub fn parse(context: impl Into<String>, source: ParseError) -> Self {
        Self::Parse {
            context: context.into(),
            source,
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            AppError::Configuration(_) | AppError::Export(_) => 2,
            AppError::Parse { .. } | AppError::EmptySelection => 3,
            AppError::SourceUnavailable { .. }
            | AppError::MissingColumn { .. }
            | AppError::Terminal(_) => 4,
        }
    }
}
