//! Document queries built on the authenticated client.

use chrono::Datelike;
use serde_json::Value;

use crate::portal::client::PortalClient;
use crate::portal::error::{PortalError, PortalResult};
use crate::portal::model::{InboundDocument, OutboundDetail, StaffProfile};
use crate::portal::transport::{HttpTransport, Method};

const STAFF_PROFILE_PATH: &str = "/can-bo/danh-sach-cong-tac-can-bo";
const INBOUND_LIST_PATH: &str =
    "/van-ban-den/danh-sach-van-ban-den-theo-trang-thai-cua-chuyen-vien";
const OUTBOUND_SEARCH_PATH: &str = "/van-ban/tra-cuu-van-ban-di-agg";
const OUTBOUND_DETAIL_PATH: &str = "/van-ban-di/chi-tiet-van-ban-di";

/// Outbound document search: portal filter fields plus the staff post the
/// detail records are read as.
#[derive(Debug, Clone, Default)]
pub struct OutboundQuery {
    pub filters: Vec<(String, String)>,
    pub staff_id: String,
}

/// Form payload for a staff member's pending inbound documents in `year`.
pub fn inbound_filter_form(
    year: i32,
    staff_internal_id: &str,
    parent_org_id: &str,
) -> Vec<(String, String)> {
    [
        ("co_tep_tin", "-1".to_string()),
        ("ma_can_bo", staff_internal_id.to_string()),
        ("ma_don_vi_quan_tri", parent_org_id.to_string()),
        ("ma_loai_ttdh", "0".to_string()),
        ("ma_yeu_cau", "2".to_string()),
        ("nam", year.to_string()),
        ("nhan_den_ngay", format!("31/12/{year}")),
        ("nhan_tu_ngay", format!("01/01/{year}")),
        ("page", "1".to_string()),
        ("size", "20".to_string()),
        ("trang_thai_ttdh_gui", "-1".to_string()),
        ("trang_thai_xu_ly", "1".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// Keep documents handled by `staff_full_name`, newest received first.
///
/// The sort compares the received-date strings and is stable, so documents
/// received at the same instant keep the portal's order.
pub fn select_assigned(
    documents: Vec<InboundDocument>,
    staff_full_name: &str,
) -> Vec<InboundDocument> {
    let mut assigned: Vec<InboundDocument> = documents
        .into_iter()
        .filter(|doc| doc.is_handled_by(staff_full_name))
        .collect();
    assigned.sort_by(|a, b| {
        let a = a.received_date.as_deref().unwrap_or("");
        let b = b.received_date.as_deref().unwrap_or("");
        b.cmp(a)
    });
    assigned
}

/// Normalize a document ID that may arrive as `123`, `123.0` or `"123"`.
pub fn document_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(|id| id.to_string()),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| (f.trunc() as i64).to_string()),
        _ => None,
    }
}

/// The `data` of a `{success, message, data}` envelope.
fn unwrap_envelope(endpoint: &str, body: Value) -> PortalResult<Value> {
    if body["success"].as_bool() == Some(true) {
        Ok(body.get("data").cloned().unwrap_or(Value::Null))
    } else {
        Err(PortalError::Rejected {
            endpoint: endpoint.into(),
            message: body["message"].as_str().unwrap_or("no message").to_string(),
        })
    }
}

/// Deserialize a list payload; `null` is an empty list.
fn list_of<R: serde::de::DeserializeOwned>(url: &str, data: Value) -> PortalResult<Vec<R>> {
    if data.is_null() {
        return Ok(Vec::new());
    }
    serde_json::from_value(data).map_err(|e| PortalError::Malformed {
        url: url.into(),
        message: e.to_string(),
    })
}

impl<T: HttpTransport> PortalClient<T> {
    /// Staff posts held by the logged-in user.
    pub fn staff_profile(&self) -> PortalResult<Vec<StaffProfile>> {
        let credentials = self.credentials().ok_or_else(|| PortalError::Auth {
            message: "not logged in".into(),
        })?;
        let url = self.api_url(STAFF_PROFILE_PATH);
        let form = vec![
            ("password".to_string(), credentials.password().to_string()),
            ("username".to_string(), credentials.username.clone()),
        ];

        let body = self.request(Method::Post, &url, form, &[])?.into_json(&url)?;
        let profiles: Vec<StaffProfile> =
            list_of(&url, unwrap_envelope(STAFF_PROFILE_PATH, body)?)?;
        tracing::info!(count = profiles.len(), "fetched staff profiles");
        Ok(profiles)
    }

    /// This year's pending inbound documents handled by the given staff member.
    pub fn inbound_documents_for_year(
        &self,
        staff_internal_id: &str,
        staff_full_name: &str,
        parent_org_id: &str,
    ) -> PortalResult<Vec<InboundDocument>> {
        let year = chrono::Local::now().year();
        self.inbound_documents_in(year, staff_internal_id, staff_full_name, parent_org_id)
    }

    /// Pending inbound documents of `year` handled by the given staff member.
    pub fn inbound_documents_in(
        &self,
        year: i32,
        staff_internal_id: &str,
        staff_full_name: &str,
        parent_org_id: &str,
    ) -> PortalResult<Vec<InboundDocument>> {
        let url = self.api_url(INBOUND_LIST_PATH);
        let form = inbound_filter_form(year, staff_internal_id, parent_org_id);

        let body = self.request(Method::Post, &url, form, &[])?.into_json(&url)?;
        let documents: Vec<InboundDocument> =
            list_of(&url, unwrap_envelope(INBOUND_LIST_PATH, body)?)?;
        let received = documents.len();
        let assigned = select_assigned(documents, staff_full_name);
        tracing::info!(year, received, assigned = assigned.len(), "fetched inbound documents");
        Ok(assigned)
    }

    /// Search outbound documents, then fetch each hit's detail record.
    ///
    /// Details come back in search order. A failed detail fetch is recorded
    /// on its own item and does not abort the others.
    pub fn search_outbound_documents(
        &self,
        query: &OutboundQuery,
    ) -> PortalResult<Vec<OutboundDetail>> {
        let search_url = self.api_url(OUTBOUND_SEARCH_PATH);
        let body = self
            .request(Method::Post, &search_url, query.filters.clone(), &[])?
            .into_json(&search_url)?;
        let hits = unwrap_envelope(OUTBOUND_SEARCH_PATH, body)?;

        let ids: Vec<String> = hits
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        let id = document_id(&item["ma_van_ban"]);
                        if id.is_none() {
                            tracing::warn!("outbound search hit without a usable ma_van_ban");
                        }
                        id
                    })
                    .collect()
            })
            .unwrap_or_default();

        let detail_url = self.api_url(OUTBOUND_DETAIL_PATH);
        let details: Vec<OutboundDetail> = ids
            .into_iter()
            .map(|id| {
                let result = self
                    .request(
                        Method::Get,
                        &detail_url,
                        Vec::new(),
                        &[("ma_van_ban_di", id.as_str()), ("ma_ctcb", query.staff_id.as_str())],
                    )
                    .and_then(|body| body.into_json(&detail_url))
                    .map(|body| {
                        body.get("data")
                            .cloned()
                            .unwrap_or_else(|| Value::Object(Default::default()))
                    });
                if let Err(e) = &result {
                    tracing::warn!(document_id = %id, error = %e, "outbound detail fetch failed");
                }
                OutboundDetail {
                    document_id: id,
                    result,
                }
            })
            .collect();

        tracing::info!(count = details.len(), "fetched outbound document details");
        Ok(details)
    }
}
