use thiserror::Error;

/// Errors raised by gridstate.
///
/// Only *configuration* mistakes and fetch failures surface as errors.
/// Malformed wire strings never do: the codecs are total on parse and
/// degrade to the slice's default value instead (see [`crate::codec`]).
#[derive(Error, Debug)]
pub enum GridError {
    #[error("column '{0}' has type option/multiOption but no static options, no transform function, and its data is not option-shaped")]
    MissingOptionSource(String),

    #[error("column '{0}' is not an option or multi-option column")]
    NotOptionColumn(String),

    #[error("duplicate column id '{0}'")]
    DuplicateColumn(String),

    #[error("unknown column id '{0}'")]
    UnknownColumn(String),

    #[error("filter values for column '{column}' are {got}, expected {expected}")]
    ValueTypeMismatch {
        column: String,
        expected: &'static str,
        got: &'static str,
    },

    #[error("fetch failed: {0}")]
    Fetch(String),
}

pub type Result<T> = std::result::Result<T, GridError>;
