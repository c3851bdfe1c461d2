// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # vpdt-digest
//!
//! A terminal client for a provincial e-office portal ("văn phòng điện tử")
//! that lists a staff member's pending inbound documents and produces spoken
//! Vietnamese summaries of their PDF attachments.
//!
//! ## Architecture
//!
//! - **Attachment codec** (`attachment`): composite attachment paths to file names and URLs
//! - **Portal client** (`portal`): login handshake, bearer-token session, document queries
//! - **Summary pipeline** (`summary`): PDF download and extraction, chat-model summary, TTS
//! - **Digest** (`digest`): profile and inbox state for one logged-in user
//! - **Config** (`config`, `paths`): TOML file, `.env` and environment overrides, XDG paths
//!
//! ## Library usage
//!
//! ```no_run
//! use vpdt_digest::config::AppConfig;
//! use vpdt_digest::digest::Digest;
//! use vpdt_digest::portal::{Credentials, PortalClient};
//!
//! let config = AppConfig::default();
//! let client = PortalClient::connect(config.portal.clone(), "refresh-token");
//! let mut digest = Digest::new(client);
//! digest.open(Credentials::new("user", "secret")).unwrap();
//! for doc in digest.documents() {
//!     println!("{:?}: {:?}", doc.document_number, digest.attachment_urls(doc));
//! }
//! ```

pub mod attachment;
pub mod config;
pub mod digest;
pub mod error;
pub mod paths;
pub mod portal;
pub mod render;
pub mod summary;
