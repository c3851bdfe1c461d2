//! Staff profile, inbox and outbound queries through a scripted portal, and
//! the digest built on top of them.

mod common;

use common::*;
use serde_json::json;
use vpdt_digest::attachment::FileMode;
use vpdt_digest::digest::Digest;
use vpdt_digest::error::VpdtError;
use vpdt_digest::portal::{
    Credentials, HttpResponse, Method, OutboundQuery, PortalError, SessionState,
};

const STAFF_PATH: &str = "/can-bo/danh-sach-cong-tac-can-bo";
const INBOUND_PATH: &str = "/van-ban-den/danh-sach-van-ban-den-theo-trang-thai-cua-chuyen-vien";
const OUTBOUND_SEARCH_PATH: &str = "/van-ban/tra-cuu-van-ban-di-agg";
const OUTBOUND_DETAIL_PATH: &str = "/van-ban-di/chi-tiet-van-ban-di";

const PDF_ENTRY: &str = "up___httplocalhost8080__vb__09_am_QD 12.pdf";

fn staff_response() -> serde_json::Value {
    json!({
        "success": true,
        "message": "OK",
        "data": [{
            "ma_ctcb_kc": 2195,
            "ho_va_ten_can_bo": "Nguyễn Văn A",
            "ten_chuc_vu": "Chuyên viên",
            "ten_don_vi": "Văn phòng UBND tỉnh",
            "di_dong_can_bo": "0900000000",
            "ma_don_vi_cha": 88
        }]
    })
}

fn inbound_response() -> serde_json::Value {
    json!({
        "success": true,
        "data": [
            {
                "so_ky_hieu": "10/QĐ-UBND",
                "trich_yeu": "Quyết định cũ",
                "nguoi_xu_ly_chinh": "Nguyễn Văn A",
                "ngay_den": "2024-02-01T08:00:00Z",
                "file_dinh_kem": PDF_ENTRY
            },
            {
                "so_ky_hieu": "11/CV-STC",
                "nguoi_xu_ly_chinh": "Lê Văn C",
                "ngay_den": "2024-09-01T08:00:00Z",
                "file_dinh_kem": PDF_ENTRY
            },
            {
                "so_ky_hieu": "12/TB-VP",
                "trich_yeu": "Thông báo mới",
                "nguoi_xu_ly_chinh": "Trần Thị B, Nguyễn Văn A",
                "ngay_den": "2024-06-01T08:00:00Z",
                "file_dinh_kem": ""
            },
            {
                "so_ky_hieu": "13/KH-UBND",
                "nguoi_xu_ly_chinh": null,
                "ngay_den": "2024-12-01T08:00:00Z"
            }
        ]
    })
}

fn portal_with_inbox() -> ScriptedTransport {
    ScriptedTransport::new()
        .json(Method::Post, &api(STAFF_PATH), staff_response())
        .json(Method::Post, &api(INBOUND_PATH), inbound_response())
}

#[test]
fn staff_profile_posts_credentials_and_decodes_numbers() {
    let client = logged_in(portal_with_inbox());
    let profiles = client.staff_profile().unwrap();

    assert_eq!(profiles.len(), 1);
    assert_eq!(profiles[0].staff_id.as_deref(), Some("2195"));
    assert_eq!(profiles[0].parent_org_id.as_deref(), Some("88"));
    assert_eq!(profiles[0].full_name.as_deref(), Some("Nguyễn Văn A"));

    let sent = client.transport().sent_to(&api(STAFF_PATH));
    assert_eq!(sent[0].form_value("username"), Some("nva"));
    assert_eq!(sent[0].form_value("password"), Some("mat-khau"));
}

#[test]
fn staff_profile_rejection_carries_server_message() {
    let client = logged_in(ScriptedTransport::new().json(
        Method::Post,
        &api(STAFF_PATH),
        json!({"success": false, "message": "Tài khoản bị khóa"}),
    ));

    match client.staff_profile().unwrap_err() {
        PortalError::Rejected { message, .. } => assert_eq!(message, "Tài khoản bị khóa"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn staff_profile_as_text_is_malformed() {
    let client = logged_in(ScriptedTransport::new().route(Method::Post, &api(STAFF_PATH), |_| {
        Ok(HttpResponse::new(200, "<html>login</html>"))
    }));

    assert!(matches!(
        client.staff_profile(),
        Err(PortalError::Malformed { .. })
    ));
}

#[test]
fn inbox_keeps_assigned_documents_newest_first() {
    let client = logged_in(portal_with_inbox());
    let docs = client
        .inbound_documents_in(2024, "2195", "Nguyễn Văn A", "88")
        .unwrap();

    let numbers: Vec<_> = docs.iter().filter_map(|d| d.document_number.as_deref()).collect();
    assert_eq!(numbers, vec!["12/TB-VP", "10/QĐ-UBND"]);

    let sent = client.transport().sent_to(&api(INBOUND_PATH));
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].form_value("ma_can_bo"), Some("2195"));
    assert_eq!(sent[0].form_value("ma_don_vi_quan_tri"), Some("88"));
    assert_eq!(sent[0].form_value("nhan_tu_ngay"), Some("01/01/2024"));
    assert_eq!(sent[0].form_value("nhan_den_ngay"), Some("31/12/2024"));
}

#[test]
fn document_without_attachments_is_listed_with_no_urls() {
    let client = logged_in(portal_with_inbox());
    let docs = client
        .inbound_documents_in(2024, "2195", "Nguyễn Văn A", "88")
        .unwrap();

    assert!(docs[0].attachment_urls(FileMode::View, REFRESH_TOKEN).is_empty());
    assert_eq!(
        docs[1].attachment_urls(FileMode::View, REFRESH_TOKEN),
        vec![format!(
            "http://localhost:8080/api/file-manage/read-file/\
             up___httplocalhost8080__vb__09_am_QD%2012.pdf/view/{REFRESH_TOKEN}/QD%2012.pdf"
        )]
    );
}

#[test]
fn inbox_rejection_is_an_error() {
    let client = logged_in(ScriptedTransport::new().json(
        Method::Post,
        &api(INBOUND_PATH),
        json!({"success": false, "message": "Hết phiên làm việc"}),
    ));

    let err = client
        .inbound_documents_in(2024, "2195", "Nguyễn Văn A", "88")
        .unwrap_err();
    assert!(err.to_string().contains("Hết phiên làm việc"));
}

#[test]
fn outbound_details_keep_search_order_and_isolate_failures() {
    let detail_url = api(OUTBOUND_DETAIL_PATH);
    let transport = ScriptedTransport::new()
        .json(
            Method::Post,
            &api(OUTBOUND_SEARCH_PATH),
            json!({"success": true, "data": [
                {"ma_van_ban": 301},
                {"ma_van_ban": "302"},
                {"ma_van_ban": null},
                {"ma_van_ban": 303.0}
            ]}),
        )
        .route(Method::Get, &detail_url, |req| match req.query_value("ma_van_ban_di") {
            Some("302") => Ok(HttpResponse::new(500, "lỗi máy chủ")),
            Some(id) => Ok(HttpResponse::new(
                200,
                json!({"success": true, "data": {"ma_van_ban_di": id}}).to_string(),
            )),
            None => Ok(HttpResponse::new(400, "missing id")),
        });
    let client = logged_in(transport);

    let query = OutboundQuery {
        filters: vec![("nam".into(), "2024".into())],
        staff_id: "2195".into(),
    };
    let details = client.search_outbound_documents(&query).unwrap();

    let ids: Vec<_> = details.iter().map(|d| d.document_id.as_str()).collect();
    assert_eq!(ids, vec!["301", "302", "303"]);
    assert_eq!(details[0].detail(), Some(&json!({"ma_van_ban_di": "301"})));
    assert!(matches!(details[1].result, Err(PortalError::Api { status: 500, .. })));
    assert_eq!(details[2].detail(), Some(&json!({"ma_van_ban_di": "303"})));

    let search = client.transport().sent_to(&api(OUTBOUND_SEARCH_PATH));
    assert_eq!(search[0].form_value("nam"), Some("2024"));
    let detail_calls = client.transport().sent_to(&detail_url);
    assert_eq!(detail_calls.len(), 3);
    assert!(detail_calls.iter().all(|r| r.query_value("ma_ctcb") == Some("2195")));
}

#[test]
fn digest_loads_profile_and_inbox_on_open() {
    let mut digest = Digest::new(client(portal_with_inbox().with_login()));
    digest.open(credentials()).unwrap();

    assert_eq!(digest.profiles().len(), 1);
    assert_eq!(digest.documents().len(), 2);
    assert_eq!(
        digest.document(2).unwrap().document_number.as_deref(),
        Some("10/QĐ-UBND")
    );
    assert_eq!(digest.attachment_urls(digest.document(2).unwrap()).len(), 1);

    let inbound = digest.client().transport().sent_to(&api(INBOUND_PATH));
    assert_eq!(inbound[0].form_value("ma_can_bo"), Some("2195"));
}

#[test]
fn digest_rejects_out_of_range_documents() {
    let mut digest = Digest::new(client(portal_with_inbox().with_login()));
    digest.open(credentials()).unwrap();

    assert!(matches!(
        digest.document(0),
        Err(VpdtError::NoSuchDocument { index: 0, count: 2 })
    ));
    assert!(matches!(
        digest.document(3),
        Err(VpdtError::NoSuchDocument { index: 3, count: 2 })
    ));
}

#[test]
fn digest_requires_a_staff_id() {
    let transport = ScriptedTransport::new().json(
        Method::Post,
        &api(STAFF_PATH),
        json!({"success": true, "data": [{"ho_va_ten_can_bo": "Nguyễn Văn A"}]}),
    );
    let mut digest = Digest::new(client(transport.with_login()));

    match digest.open(credentials()).unwrap_err() {
        PortalError::MissingField { field } => assert_eq!(field, "ma_ctcb_kc"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(digest.documents().is_empty());
}

#[test]
fn digest_requires_a_staff_name() {
    let transport = ScriptedTransport::new()
        .json(
            Method::Post,
            &api(STAFF_PATH),
            json!({"success": true, "data": [{"ma_ctcb_kc": 2195, "ma_don_vi_cha": 88}]}),
        )
        .json(
            Method::Post,
            &api(INBOUND_PATH),
            json!({"success": true, "data": [
                {"so_ky_hieu": "11/CV-STC", "nguoi_xu_ly_chinh": "Lê Văn C"},
                {"so_ky_hieu": "12/TB-VP", "nguoi_xu_ly_chinh": "Trần Thị B"}
            ]}),
        );
    let mut digest = Digest::new(client(transport.with_login()));

    match digest.open(credentials()).unwrap_err() {
        PortalError::MissingField { field } => assert_eq!(field, "ho_va_ten_can_bo"),
        other => panic!("unexpected error: {other}"),
    }
    assert!(digest.documents().is_empty());
    assert!(digest.client().transport().sent_to(&api(INBOUND_PATH)).is_empty());
}

#[test]
fn digest_treats_a_blank_staff_name_as_missing() {
    let transport = ScriptedTransport::new().json(
        Method::Post,
        &api(STAFF_PATH),
        json!({"success": true, "data": [{"ma_ctcb_kc": 2195, "ho_va_ten_can_bo": "  "}]}),
    );
    let mut digest = Digest::new(client(transport.with_login()));

    assert!(matches!(
        digest.open(credentials()),
        Err(PortalError::MissingField { .. })
    ));
}

#[test]
fn digest_reauthenticate_uses_a_fresh_token_and_reloads() {
    let mut digest = Digest::new(client(portal_with_inbox().rotating_tokens().with_login()));
    digest.open(credentials()).unwrap();
    assert_eq!(digest.client().session().access_token(), Some("tok-1"));

    digest.reauthenticate().unwrap();

    assert_eq!(digest.client().session().access_token(), Some("tok-2"));
    assert_eq!(digest.documents().len(), 2);
    let inbound = digest.client().transport().sent_to(&api(INBOUND_PATH));
    assert_eq!(inbound.len(), 2);
    assert_eq!(
        inbound[1].headers.get("Authorization").map(String::as_str),
        Some("Bearer tok-2")
    );
}

#[test]
fn digest_reauthenticate_refused_leaves_the_session_failed() {
    let mut refused = Digest::new(client(
        ScriptedTransport::new()
            .json(
                Method::Get,
                &api("/can-bo/access-token"),
                json!({"success": false, "message": "Refresh token hết hạn"}),
            )
            .with_login(),
    ));
    let err = refused.reauthenticate().unwrap_err();
    assert!(err.to_string().contains("Refresh token hết hạn"));
    assert_eq!(refused.client().state(), SessionState::Failed);
}

#[test]
fn digest_relogin_runs_the_full_handshake_again() {
    let mut digest = Digest::new(client(portal_with_inbox().rotating_tokens().with_login()));
    digest.open(credentials()).unwrap();

    digest.relogin(Credentials::new("ttb", "mat-khau-2")).unwrap();

    assert_eq!(digest.documents().len(), 2);
    assert_eq!(digest.client().session().access_token(), Some("tok-2"));
    let forms = digest.client().transport().sent_to(PORTAL_URL);
    let posted: Vec<_> = forms.iter().filter(|r| r.method == Method::Post).collect();
    assert_eq!(posted.len(), 2);
    assert_eq!(posted[1].form_value("Username"), Some("ttb"));
    assert_eq!(
        digest.client().credentials().map(|c| c.username.as_str()),
        Some("ttb")
    );
}

#[test]
fn digest_close_logs_out() {
    let mut digest = Digest::new(client(portal_with_inbox().with_login()));
    digest.open(credentials()).unwrap();
    digest.close();

    assert!(digest.documents().is_empty());
    assert!(digest.refresh().is_err());
}
