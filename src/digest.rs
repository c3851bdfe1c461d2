//! One user's working view of the portal: profile, inbox and attachment links.
//!
//! [`Digest`] owns the logged-in [`PortalClient`] and the last fetched lists.
//! The CLI drives it; `refresh` re-runs the query pipeline.

use crate::attachment::{AttachmentLink, FileMode};
use crate::error::{VpdtError, VpdtResult};
use crate::portal::transport::{HttpTransport, UreqTransport};
use crate::portal::{
    Credentials, InboundDocument, OutboundDetail, OutboundQuery, PortalClient, PortalError,
    PortalResult, StaffProfile,
};

pub struct Digest<T = UreqTransport> {
    client: PortalClient<T>,
    profiles: Vec<StaffProfile>,
    documents: Vec<InboundDocument>,
}

impl<T: HttpTransport> Digest<T> {
    pub fn new(client: PortalClient<T>) -> Self {
        Self {
            client,
            profiles: Vec::new(),
            documents: Vec::new(),
        }
    }

    /// Log in and load the profile and inbox.
    pub fn open(&mut self, credentials: Credentials) -> PortalResult<()> {
        self.client.login(credentials)?;
        self.refresh()
    }

    /// Exchange the refresh token for a new access token, then reload.
    /// Use once the access token has expired.
    pub fn reauthenticate(&mut self) -> PortalResult<()> {
        let refresh_token = self.client.session().refresh_token().to_string();
        self.client.exchange_refresh_token(&refresh_token)?;
        self.refresh()
    }

    /// Log out, then run the full login handshake with new credentials.
    pub fn relogin(&mut self, credentials: Credentials) -> PortalResult<()> {
        self.close();
        self.open(credentials)
    }

    /// Re-fetch profiles, then the inbox of the first staff post.
    pub fn refresh(&mut self) -> PortalResult<()> {
        let profiles = self.client.staff_profile()?;
        let primary = profiles.first().ok_or(PortalError::MissingField {
            field: "staff profile".into(),
        })?;
        let staff_id = required(&primary.staff_id, "ma_ctcb_kc")?;
        let full_name = required(&primary.full_name, "ho_va_ten_can_bo")?;

        let documents = self.client.inbound_documents_for_year(
            &staff_id,
            &full_name,
            primary.parent_org_id.as_deref().unwrap_or_default(),
        )?;

        self.profiles = profiles;
        self.documents = documents;
        Ok(())
    }

    pub fn profiles(&self) -> &[StaffProfile] {
        &self.profiles
    }

    pub fn documents(&self) -> &[InboundDocument] {
        &self.documents
    }

    pub fn client(&self) -> &PortalClient<T> {
        &self.client
    }

    /// Document by its 1-based position in the inbox.
    pub fn document(&self, index: usize) -> VpdtResult<&InboundDocument> {
        index
            .checked_sub(1)
            .and_then(|i| self.documents.get(i))
            .ok_or(VpdtError::NoSuchDocument {
                index,
                count: self.documents.len(),
            })
    }

    /// Named viewable attachment links of a document.
    pub fn attachment_links(&self, doc: &InboundDocument) -> Vec<AttachmentLink> {
        doc.attachment_links(FileMode::View, self.client.session().refresh_token())
    }

    /// Viewable attachment URLs of a document.
    pub fn attachment_urls(&self, doc: &InboundDocument) -> Vec<String> {
        doc.attachment_urls(FileMode::View, self.client.session().refresh_token())
    }

    /// Outbound search as the configured detail staff post, falling back to
    /// the first profile's post.
    pub fn outbound(&self, filters: Vec<(String, String)>) -> PortalResult<Vec<OutboundDetail>> {
        let staff_id = self
            .client
            .config()
            .detail_staff_id
            .clone()
            .or_else(|| self.profiles.first().and_then(|p| p.staff_id.clone()))
            .ok_or(PortalError::MissingField {
                field: "ma_ctcb_kc".into(),
            })?;
        self.client
            .search_outbound_documents(&OutboundQuery { filters, staff_id })
    }

    /// Log out and drop the fetched lists.
    pub fn close(&mut self) {
        self.client.logout();
        self.profiles.clear();
        self.documents.clear();
    }
}

impl<T> std::fmt::Debug for Digest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Digest")
            .field("client", &self.client)
            .field("profiles", &self.profiles.len())
            .field("documents", &self.documents.len())
            .finish()
    }
}

/// A profile field the inbox query cannot do without.
fn required(value: &Option<String>, field: &str) -> PortalResult<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| PortalError::MissingField {
            field: field.into(),
        })
}
