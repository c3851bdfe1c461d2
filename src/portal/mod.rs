//! Client for the provincial e-office portal.
//!
//! - [`client`]: login handshake, token exchange and authenticated calls
//! - [`queries`]: staff profile, inbound queue, outbound search
//! - [`session`]: token and header state owned by one client
//! - [`transport`]: the HTTP seam (`ureq` in production)

pub mod client;
pub mod error;
pub mod login;
pub mod model;
pub mod queries;
pub mod session;
pub mod transport;

pub use client::{ApiBody, PortalClient};
pub use error::{PortalError, PortalResult};
pub use model::{InboundDocument, OutboundDetail, StaffProfile};
pub use queries::OutboundQuery;
pub use session::{Credentials, SessionState, TokenGrant};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
