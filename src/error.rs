//! Rich diagnostic error types for vpdt-digest.
//!
//! Each subsystem defines its own error type with miette `#[diagnostic]` derives,
//! providing error codes and help text so users know what went wrong and how to
//! fix it. [`VpdtError`] wraps them without losing any of that.

use miette::Diagnostic;
use thiserror::Error;

use crate::attachment::error::CodecError;
use crate::config::ConfigError;
use crate::paths::PathError;
use crate::portal::PortalError;
use crate::summary::SummaryError;

/// Top-level error type.
#[derive(Debug, Error, Diagnostic)]
pub enum VpdtError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Portal(#[from] PortalError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Summary(#[from] SummaryError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Path(#[from] PathError),

    #[error("no document numbered {index}; the list has {count}")]
    #[diagnostic(
        code(vpdt::digest::no_such_document),
        help("Document numbers start at 1. Refresh the list with `r` if it changed.")
    )]
    NoSuchDocument { index: usize, count: usize },
}

/// Convenience alias.
pub type VpdtResult<T> = std::result::Result<T, VpdtError>;
