//! Portal records.
//!
//! Field names on the wire are the portal's own Vietnamese keys. Every field
//! is optional and accepts a string or a number, since the API is not
//! consistent about either.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::attachment::{self, AttachmentDescriptor, AttachmentLink, FileMode};

/// One staff post held by the logged-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
    /// Internal staff-post ID (`ma_ctcb_kc`); keys the document queue.
    #[serde(rename = "ma_ctcb_kc", default, deserialize_with = "lenient_string")]
    pub staff_id: Option<String>,
    #[serde(rename = "ho_va_ten_can_bo", default, deserialize_with = "lenient_string")]
    pub full_name: Option<String>,
    #[serde(rename = "ten_chuc_vu", default, deserialize_with = "lenient_string")]
    pub role: Option<String>,
    #[serde(rename = "ten_don_vi", default, deserialize_with = "lenient_string")]
    pub org_unit: Option<String>,
    #[serde(rename = "di_dong_can_bo", default, deserialize_with = "lenient_string")]
    pub phone: Option<String>,
    /// Administering parent unit (`ma_don_vi_cha`).
    #[serde(rename = "ma_don_vi_cha", default, deserialize_with = "lenient_string")]
    pub parent_org_id: Option<String>,
}

/// A document in the inbound queue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundDocument {
    #[serde(rename = "so_ky_hieu", default, deserialize_with = "lenient_string")]
    pub document_number: Option<String>,
    #[serde(rename = "trich_yeu", default, deserialize_with = "lenient_string")]
    pub subject: Option<String>,
    /// ISO 8601.
    #[serde(rename = "ngay_ban_hanh", default, deserialize_with = "lenient_string")]
    pub issue_date: Option<String>,
    #[serde(rename = "nguoi_ky", default, deserialize_with = "lenient_string")]
    pub signer: Option<String>,
    #[serde(rename = "ten_co_quan_ban_hanh", default, deserialize_with = "lenient_string")]
    pub issuing_org: Option<String>,
    #[serde(rename = "nguoi_xu_ly_chinh", default, deserialize_with = "lenient_string")]
    pub primary_handler_name: Option<String>,
    /// ISO 8601; compared as a string when sorting.
    #[serde(rename = "ngay_den", default, deserialize_with = "lenient_string")]
    pub received_date: Option<String>,
    /// `:`-separated attachment identifiers.
    #[serde(rename = "file_dinh_kem", default, deserialize_with = "lenient_string")]
    pub attachment_field: Option<String>,
}

impl InboundDocument {
    /// True if the primary handler field names `staff_full_name`.
    ///
    /// A blank name matches nothing.
    pub fn is_handled_by(&self, staff_full_name: &str) -> bool {
        let name = staff_full_name.trim();
        if name.is_empty() {
            return false;
        }
        self.primary_handler_name
            .as_deref()
            .is_some_and(|handler| handler.contains(name))
    }

    /// PDF attachments of this document; empty when the field is absent.
    pub fn attachments(&self) -> Vec<AttachmentDescriptor> {
        attachment::attachment_descriptors(self.attachment_field.as_deref().unwrap_or(""))
    }

    /// Named links to the PDF attachments.
    pub fn attachment_links(&self, mode: FileMode, refresh_token: &str) -> Vec<AttachmentLink> {
        attachment::attachment_links(
            self.attachment_field.as_deref().unwrap_or(""),
            mode,
            refresh_token,
        )
    }

    /// Fetchable URLs of the PDF attachments.
    pub fn attachment_urls(&self, mode: FileMode, refresh_token: &str) -> Vec<String> {
        attachment::attachment_urls(
            self.attachment_field.as_deref().unwrap_or(""),
            mode,
            refresh_token,
        )
    }
}

/// Detail record of one outbound document, or why it could not be fetched.
#[derive(Debug)]
pub struct OutboundDetail {
    pub document_id: String,
    pub result: crate::portal::PortalResult<Value>,
}

impl OutboundDetail {
    pub fn detail(&self) -> Option<&Value> {
        self.result.as_ref().ok()
    }
}

/// Accept strings, numbers and booleans; `null` and missing become `None`.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
