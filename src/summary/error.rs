//! Rich diagnostic error types for the summary pipeline.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from producing a spoken summary.
#[derive(Debug, Error, Diagnostic)]
pub enum SummaryError {
    #[error("fetch error for URL \"{url}\": {message}")]
    #[diagnostic(
        code(vpdt::summary::fetch),
        help(
            "The attachment could not be downloaded. The link embeds the refresh token; \
             check that it is still valid."
        )
    )]
    Fetch { url: String, message: String },

    #[error("could not extract text from \"{origin}\": {message}")]
    #[diagnostic(
        code(vpdt::summary::extract),
        help("The file is not a readable PDF, or it only contains scanned images.")
    )]
    Extract { origin: String, message: String },

    #[error("no text to summarize: {message}")]
    #[diagnostic(
        code(vpdt::summary::no_content),
        help("None of the document's PDF attachments could be downloaded and read.")
    )]
    NoContent { message: String },

    #[error("language model request failed: {message}")]
    #[diagnostic(
        code(vpdt::summary::llm),
        help("Check GROQ_API_KEY and that the configured model is still served.")
    )]
    Llm { message: String },

    #[error("speech synthesis failed: {message}")]
    #[diagnostic(
        code(vpdt::summary::speech),
        help("The text-to-speech service refused the request. The text summary is still usable.")
    )]
    Speech { message: String },
}

/// Convenience alias for summary pipeline results.
pub type SummaryResult<T> = std::result::Result<T, SummaryError>;
