//! Rich diagnostic error types for the portal session and queries.

use miette::Diagnostic;
use thiserror::Error;

/// Errors from talking to the e-office portal.
#[derive(Debug, Error, Diagnostic)]
pub enum PortalError {
    #[error("request to {url} failed: {message}")]
    #[diagnostic(
        code(vpdt::portal::transport),
        help(
            "The portal could not be reached (DNS, TLS, connection or timeout). \
             Check the network and the configured portal URLs."
        )
    )]
    Transport { url: String, message: String },

    #[error("authentication failed: {message}")]
    #[diagnostic(
        code(vpdt::portal::auth),
        help(
            "Check the username and password. If the portal reports an invalid token, \
             the configured refresh token has expired: set a fresh VPDT_REFRESH_TOKEN."
        )
    )]
    Auth { message: String },

    #[error("API call to {url} returned HTTP {status}: {message}")]
    #[diagnostic(
        code(vpdt::portal::api),
        help("The access token may have expired. Log in again and retry.")
    )]
    Api {
        url: String,
        status: u16,
        message: String,
    },

    #[error("portal rejected {endpoint}: {message}")]
    #[diagnostic(
        code(vpdt::portal::rejected),
        help("The portal answered with `success: false`. The message above is the portal's own.")
    )]
    Rejected { endpoint: String, message: String },

    #[error("unexpected response from {url}: {message}")]
    #[diagnostic(
        code(vpdt::portal::malformed),
        help("The portal's response format may have changed.")
    )]
    Malformed { url: String, message: String },

    #[error("staff profile has no {field}")]
    #[diagnostic(
        code(vpdt::portal::missing_field),
        help("The account is not attached to a staff post the document queue can be read for.")
    )]
    MissingField { field: String },
}

/// Convenience alias for portal results.
pub type PortalResult<T> = std::result::Result<T, PortalError>;
