use thiserror::Error;

/// Errors produced by type construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} {value:?} contains forbidden character {ch:?}")]
    ForbiddenChar {
        field: &'static str,
        value: String,
        ch: char,
    },
}
