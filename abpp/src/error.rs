use thiserror::Error;

/// Everything that can stop a single pipeline run
///
/// None of these are transient: they all point at input data that needs
/// to be corrected, so callers should report them and move on to the next
/// dataset rather than retry.
#[derive(Error, Debug)]
pub enum Error {
    /// Expected columns are absent or misnamed
    #[error("schema error: {0}")]
    Schema(String),

    /// A column (or the whole matrix) lacks the observed values needed to
    /// fit the imputation model
    #[error("imputation error: {0}")]
    Imputation(String),

    /// A row cannot be tested, e.g. fewer than 2 values
    #[error("statistical error: {0}")]
    Statistical(String),

    /// Rows or replicate columns no longer line up between stages
    #[error("alignment error: {0}")]
    Alignment(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error in {path}, line {line}: {reason}")]
    Parse {
        path: String,
        line: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
