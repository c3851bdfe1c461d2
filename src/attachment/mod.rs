//! Attachment path codec.
//!
//! The portal addresses each attached file with a composite identifier:
//!
//! ```text
//! <storage path>___<host fragment>__<folder>__...__<hh>_<mm>_am_<file name>
//! ```
//!
//! A document's `file_dinh_kem` field joins several such identifiers with `:`.
//! This module splits that field, recovers the human file name and builds the
//! `read-file` URL the portal serves attachments from.

pub mod error;
pub mod host;

use crate::attachment::error::{CodecError, CodecResult};
use crate::attachment::host::HostFragment;

/// Separates the storage path from the host fragment.
const OUTER_DELIMITER: &str = "___";
/// Separates the host fragment, folders and the timestamped file name.
const INNER_DELIMITER: &str = "__";
/// Separates attachment identifiers inside a document's attachment field.
const FIELD_DELIMITER: char = ':';
/// Path prefix of the portal's file-serving endpoint.
const READ_FILE_ENDPOINT: &str = "/api/file-manage/read-file/";
/// Characters skipped after a time-of-day marker: the marker plus one separator.
const MARKER_SKIP: usize = 3;

/// How the portal should serve a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileMode {
    #[default]
    View,
    Download,
}

impl FileMode {
    fn segment(&self) -> &'static str {
        match self {
            Self::View => "/view/",
            Self::Download => "/download/",
        }
    }
}

/// Recover the human file name from a composite attachment path.
///
/// The last `__` segment looks like `10_15_am_Quyet dinh.pdf`. The name starts
/// three characters after the first `am`, or after the first `pm` when one is
/// present. Without either marker the whole segment is the name. The marker
/// search is purely textual, so a name like `Hamlet.pdf` is cut too.
pub fn extract_file_name(path: &str) -> String {
    let last = path.split(INNER_DELIMITER).last().unwrap_or(path);

    let mut marker = last.find("am");
    if let Some(pos) = last.find("pm") {
        marker = Some(pos);
    }

    match marker {
        Some(pos) => last[pos..].chars().skip(MARKER_SKIP).collect(),
        None => last.to_string(),
    }
}

/// Build the `read-file` URL for an attachment, or report why it cannot be built.
pub fn try_build_file_url(path: &str, mode: FileMode, refresh_token: &str) -> CodecResult<String> {
    let file_name = extract_file_name(path);

    let host_segment = path
        .split(OUTER_DELIMITER)
        .nth(1)
        .ok_or_else(|| CodecError::MissingHostSegment { path: path.into() })?;
    let raw_host = host_segment.split(INNER_DELIMITER).next().unwrap_or(host_segment);
    let host = HostFragment::parse(raw_host)
        .ok_or_else(|| CodecError::EmptyHost { path: path.into() })?;

    Ok(format!(
        "{host}{READ_FILE_ENDPOINT}{path}{}{refresh_token}/{file_name}",
        mode.segment()
    ))
}

/// Build the `read-file` URL for an attachment.
///
/// Decode failures are logged and yield an empty string; callers skip empty
/// URLs.
pub fn build_file_url(path: &str, mode: FileMode, refresh_token: &str) -> String {
    match try_build_file_url(path, mode, refresh_token) {
        Ok(url) => url,
        Err(e) => {
            tracing::warn!(error = %e, "cannot build attachment URL");
            String::new()
        }
    }
}

/// One PDF attachment of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
    /// Identifier as it appears in the attachment field.
    pub raw: String,
    /// Percent-encoded identifier, used to address the file.
    pub encoded: String,
}

impl AttachmentDescriptor {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            encoded: encode_path(raw),
        }
    }

    /// Human file name, decoded from the raw identifier.
    pub fn file_name(&self) -> String {
        extract_file_name(&self.raw)
    }

    /// Portal URL for this attachment; empty if the identifier is malformed.
    pub fn url(&self, mode: FileMode, refresh_token: &str) -> String {
        build_file_url(&self.encoded, mode, refresh_token)
    }
}

/// Split a document's attachment field into its PDF descriptors.
///
/// Non-PDF entries are dropped. An empty field yields no descriptors.
pub fn attachment_descriptors(field: &str) -> Vec<AttachmentDescriptor> {
    field
        .split(FIELD_DELIMITER)
        .filter(|entry| entry.to_lowercase().ends_with(".pdf"))
        .map(AttachmentDescriptor::new)
        .collect()
}

/// A decoded attachment: display name and fetchable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentLink {
    pub file_name: String,
    pub url: String,
}

/// Links for every PDF attachment in a field, skipping undecodable ones.
pub fn attachment_links(field: &str, mode: FileMode, refresh_token: &str) -> Vec<AttachmentLink> {
    attachment_descriptors(field)
        .iter()
        .map(|d| AttachmentLink {
            file_name: d.file_name(),
            url: d.url(mode, refresh_token),
        })
        .filter(|link| !link.url.is_empty())
        .collect()
}

/// Fetchable URLs for every PDF attachment in a field, skipping undecodable ones.
pub fn attachment_urls(field: &str, mode: FileMode, refresh_token: &str) -> Vec<String> {
    attachment_links(field, mode, refresh_token)
        .into_iter()
        .map(|link| link.url)
        .collect()
}

/// Percent-encode a path, leaving `/` and unreserved characters intact.
fn encode_path(path: &str) -> String {
    urlencoding::encode(path).replace("%2F", "/")
}
