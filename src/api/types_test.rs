use super::*;
use serde_json::json;

// =============================================================================
// ApiResult
// =============================================================================

#[test]
fn sparse_envelope_parses_with_defaults() {
    let env: ApiResult<LoginPayload> = serde_json::from_value(json!({})).unwrap();
    assert!(!env.flag);
    assert_eq!(env.code, 0);
    assert!(env.msg.is_empty());
    assert_eq!(env.data, None);
}

#[test]
fn null_data_is_none() {
    let env: ApiResult<UserInfo> = serde_json::from_value(json!({ "flag": true, "data": null })).unwrap();
    assert!(env.is_success());
    assert_eq!(env.data, None);
}

#[test]
fn is_success_accepts_flag_or_code() {
    let by_flag = ApiResult::<()> { flag: true, code: 0, msg: String::new(), data: None };
    let by_code = ApiResult::<()> { flag: false, code: SUCCESS_CODE, msg: String::new(), data: None };
    let neither = ApiResult::<()> { flag: false, code: 500, msg: "boom".into(), data: None };
    assert!(by_flag.is_success());
    assert!(by_code.is_success());
    assert!(!neither.is_success());
}

#[test]
fn into_data_rejects_with_server_message() {
    let env = ApiResult::<()> { flag: false, code: 403, msg: "forbidden".into(), data: None };
    match env.into_data() {
        Err(ApiError::Rejected { code, message }) => {
            assert_eq!(code, 403);
            assert_eq!(message, "forbidden");
        }
        other => panic!("expected Rejected, got {other:?}"),
    }
}

// =============================================================================
// ApiError
// =============================================================================

#[test]
fn transport_errors_are_retryable() {
    assert!(ApiError::Request("connection refused".into()).retryable());
    assert!(ApiError::Status { status: 503, body: String::new() }.retryable());
    assert!(ApiError::Status { status: 429, body: String::new() }.retryable());
    assert!(!ApiError::Status { status: 404, body: String::new() }.retryable());
    assert!(!ApiError::Rejected { code: 500, message: String::new() }.retryable());
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(ApiError::Parse("x".into()).error_code(), "E_API_PARSE");
    assert_eq!(ApiError::ClientBuild("x".into()).error_code(), "E_HTTP_CLIENT_BUILD");
}

// =============================================================================
// Auth payloads
// =============================================================================

#[test]
fn login_form_debug_redacts_password() {
    let form = LoginForm { username: "admin".into(), password: "hunter2".into() };
    let rendered = format!("{form:?}");
    assert!(rendered.contains("admin"));
    assert!(!rendered.contains("hunter2"));
}

#[test]
fn login_payload_token_is_optional_and_never_serialized() {
    let payload: LoginPayload =
        serde_json::from_value(json!({ "id": 1, "username": "admin", "avatar": "a.png", "token": "t" })).unwrap();
    assert_eq!(payload.token.as_deref(), Some("t"));

    let out = serde_json::to_value(&payload).unwrap();
    assert!(out.get("token").is_none());
    assert_eq!(out["username"], "admin");
}

#[test]
fn user_info_reads_camel_case_lists() {
    let info: UserInfo = serde_json::from_value(json!({
        "id": 1,
        "roleList": ["admin"],
        "permissionList": ["monitor:edit", "alarm:view"],
        "avatar": "a.png"
    }))
    .unwrap();
    assert_eq!(info.role_list, vec!["admin"]);
    assert_eq!(info.permission_list.len(), 2);
}

// =============================================================================
// Alarms & monitors
// =============================================================================

#[test]
fn alarm_page_parses_record_list() {
    let page: PageResult<AlarmForm> = serde_json::from_value(json!({
        "recordList": [{
            "id": 3,
            "location": "Gate 2",
            "threshold": 0.8,
            "photo": "p.jpg",
            "pid": 11,
            "create_time": "2024-05-01 12:00:00"
        }],
        "count": 1
    }))
    .unwrap();
    assert_eq!(page.count, 1);
    assert_eq!(page.record_list[0].pid, 11);
    assert_eq!(page.record_list[0].create_time.as_deref(), Some("2024-05-01 12:00:00"));
    assert_eq!(page.record_list[0].remark, None);
}

#[test]
fn monitor_form_keeps_unknown_fields() {
    let form: MonitorForm = serde_json::from_value(json!({
        "id": 4,
        "location": "Crossing A",
        "threshold": 12.5,
        "streamUrl": "rtsp://cam/4"
    }))
    .unwrap();
    assert_eq!(form.extra["streamUrl"], "rtsp://cam/4");

    let out = serde_json::to_value(&form).unwrap();
    assert_eq!(out["streamUrl"], "rtsp://cam/4");
    assert!(out.get("description").is_none());
}
