//! Error types.
//!
//! - `TrendError` is what the analysis engine returns. Each variant names the
//!   offending input location so callers can point at the bad row.
//! - `AppError` is the binary-facing error: a message plus a process exit code.

use thiserror::Error;

/// Failures raised by the trend engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrendError {
    /// Date text that is not a valid `YYYY-MM-DD` calendar date.
    #[error("invalid date '{text}' (expected YYYY-MM-DD)")]
    DateParse { text: String },

    /// Structurally invalid input (unordered dates, empty series, bad parameters).
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Not enough usable points for a fit or a segmentation.
    #[error("insufficient data: needed at least {needed} point(s), found {found}{}", location_suffix(.at))]
    InsufficientData {
        needed: usize,
        found: usize,
        /// Position range `[start, end]` the request covered, when it was a sub-range.
        at: Option<(usize, usize)>,
    },
}

fn location_suffix(at: &Option<(usize, usize)>) -> String {
    match at {
        Some((start, end)) => format!(" in positions {start}..={end}"),
        None => String::new(),
    }
}

impl TrendError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn insufficient(needed: usize, found: usize) -> Self {
        Self::InsufficientData {
            needed,
            found,
            at: None,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<TrendError> for AppError {
    fn from(err: TrendError) -> Self {
        let exit_code = match err {
            TrendError::DateParse { .. } | TrendError::InvalidInput { .. } => 2,
            TrendError::InsufficientData { .. } => 3,
        };
        Self::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
