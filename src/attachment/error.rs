//! Diagnostic error types for attachment path decoding.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from decoding a composite attachment path.
#[derive(Debug, Error, Diagnostic)]
pub enum CodecError {
    #[error("attachment path has no host segment: \"{path}\"")]
    #[diagnostic(
        code(vpdt::attachment::missing_host_segment),
        help(
            "Attachment paths carry the storage host after a `___` delimiter. \
             The portal returned a path without one, so no download URL can be built."
        )
    )]
    MissingHostSegment { path: String },

    #[error("attachment path has an empty host fragment: \"{path}\"")]
    #[diagnostic(
        code(vpdt::attachment::empty_host),
        help("The segment after `___` must start with the storage host, e.g. `https-host.example`.")
    )]
    EmptyHost { path: String },
}

/// Convenience alias for codec results.
pub type CodecResult<T> = std::result::Result<T, CodecError>;
