//! Error types for board loading and move application.

/// Errors surfaced by the engine.
#[derive(thiserror::Error, Debug)]
pub enum SameGameError {
    /// A row did not contain exactly `width` tokens.
    #[error("line {line}: expected {expected} cells, found {found}")]
    RowLength {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// A token was not an integer.
    #[error("line {line}: invalid token {token:?}")]
    InvalidToken { line: usize, token: String },

    /// A color code fell outside the playable range once offset.
    #[error("line {line}: color code {code} out of range")]
    ColorOutOfRange { line: usize, code: i64 },

    /// Input ended before `height` rows were read.
    #[error("expected {expected} rows, found {found}")]
    MissingRows { expected: usize, found: usize },

    /// `apply` was called with an action that is not a playable representative.
    #[error("invalid move at cell {index}")]
    InvalidMove { index: usize },

    /// Grid construction with inconsistent dimensions.
    #[error("grid dimension mismatch: expected {expected} cells, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Reading the board source failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl SameGameError {
    /// True for errors raised while parsing board text.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            SameGameError::RowLength { .. }
                | SameGameError::InvalidToken { .. }
                | SameGameError::ColorOutOfRange { .. }
                | SameGameError::MissingRows { .. }
        )
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, SameGameError>;
