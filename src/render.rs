//! Plain-text rendering of portal records for the terminal.

use std::fmt::Write;

use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::attachment::AttachmentLink;
use crate::portal::{InboundDocument, OutboundDetail, StaffProfile};

/// Shown in place of a missing field or an unparseable date.
pub const NO_DATA: &str = "Không có dữ liệu";

const RULE: &str = "---";

/// Format an ISO 8601 date or datetime as `dd/mm/yyyy`.
///
/// The date is taken as written; offsets are not converted to local time.
/// Anything unparseable renders as [`NO_DATA`].
pub fn format_date(iso: &str) -> String {
    let iso = iso.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(iso) {
        return dt.format("%d/%m/%Y").to_string();
    }
    if let Ok(dt) = DateTime::parse_from_str(iso, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return dt.format("%d/%m/%Y").to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(iso, pattern) {
            return dt.format("%d/%m/%Y").to_string();
        }
    }
    match NaiveDate::parse_from_str(iso, "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => NO_DATA.to_string(),
    }
}

fn or_no_data(value: &Option<String>) -> &str {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => v,
        _ => NO_DATA,
    }
}

/// Staff details, one post per block.
pub fn render_profiles(profiles: &[StaffProfile]) -> String {
    let mut out = String::from("Thông tin cán bộ\n");
    for profile in profiles {
        let _ = writeln!(out, "Tên cán bộ: {}", or_no_data(&profile.full_name));
        let _ = writeln!(out, "Chức vụ: {}", or_no_data(&profile.role));
        let _ = writeln!(out, "Đơn vị: {}", or_no_data(&profile.org_unit));
        let _ = writeln!(out, "Số điện thoại: {}", or_no_data(&profile.phone));
        let _ = writeln!(out, "{RULE}");
    }
    out
}

/// One inbound document with its numbered position and attachment links.
pub fn render_document(index: usize, doc: &InboundDocument, links: &[AttachmentLink]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "[{index}] Số ký hiệu: {}", or_no_data(&doc.document_number));
    let _ = writeln!(out, "    Trích yếu: {}", or_no_data(&doc.subject));
    let _ = writeln!(
        out,
        "    Ngày ban hành: {}",
        format_date(doc.issue_date.as_deref().unwrap_or(""))
    );
    let _ = writeln!(out, "    Người ký: {}", or_no_data(&doc.signer));
    let _ = writeln!(out, "    Tên cơ quan ban hành: {}", or_no_data(&doc.issuing_org));
    for link in links {
        let _ = writeln!(out, "    - {}: {}", link.file_name, link.url);
    }
    let _ = writeln!(out, "{RULE}");
    out
}

/// Outbound search results: the detail JSON, or the per-item failure.
pub fn render_outbound(details: &[OutboundDetail]) -> String {
    if details.is_empty() {
        return format!("{NO_DATA}\n");
    }
    let mut out = String::new();
    for detail in details {
        match &detail.result {
            Ok(value) => {
                let pretty =
                    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
                let _ = writeln!(out, "Văn bản {}:\n{pretty}", detail.document_id);
            }
            Err(e) => {
                let _ = writeln!(out, "Văn bản {}: lỗi: {e}", detail.document_id);
            }
        }
        let _ = writeln!(out, "{RULE}");
    }
    out
}
