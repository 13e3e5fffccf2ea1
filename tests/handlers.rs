//! HTTP API tests - status codes and JSON shapes of every endpoint

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use common::*;

/// Generate a license over HTTP and return its key
async fn generate_via_api(state: &AppState, body: Value) -> String {
    let response = test_app(state.clone())
        .oneshot(json_post("/admin/generate", &body, Some(ADMIN_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    json["key"].as_str().expect("response should include key").to_string()
}

async fn validate_via_api(state: &AppState, body: Value) -> (StatusCode, Value) {
    let response = test_app(state.clone())
        .oneshot(json_post("/validate", &body, None))
        .await
        .unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

// ============ Health ============

#[tokio::test]
async fn test_health() {
    let response = test_app(create_test_app_state())
        .oneshot(admin_get("/health", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

// ============ Validate ============

#[tokio::test]
async fn test_validate_binds_then_counts() {
    let state = create_test_app_state();
    let key = generate_via_api(&state, json!({})).await;

    let (status, json) = validate_via_api(&state, json!({"key": key, "fingerprint": "M1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], true);
    assert_eq!(json["activation_count"], 1);
    assert!(
        json.get("reason").is_none(),
        "valid verdict should not include a reason"
    );

    let (_, json) = validate_via_api(&state, json!({"key": key, "fingerprint": "M1"})).await;
    assert_eq!(json["valid"], true);
    assert_eq!(json["activation_count"], 2);
}

#[tokio::test]
async fn test_validate_failures_are_200_with_reason() {
    let state = create_test_app_state();
    let key = generate_via_api(&state, json!({})).await;
    validate_via_api(&state, json!({"key": key, "fingerprint": "M1"})).await;

    let cases = [
        (json!({"key": key, "fingerprint": "M2"}), "machine_mismatch"),
        (json!({"key": "nope", "fingerprint": "M1"}), "not_found"),
        (json!({"key": key}), "missing_parameters"),
        (json!({"fingerprint": "M1"}), "missing_parameters"),
        (json!({"key": "", "fingerprint": ""}), "missing_parameters"),
    ];

    for (body, expected) in cases {
        let (status, json) = validate_via_api(&state, body.clone()).await;
        assert_eq!(status, StatusCode::OK, "verdicts are data, not errors: {}", body);
        assert_eq!(json["valid"], false, "body {} should be invalid", body);
        assert_eq!(json["reason"], expected, "body {}", body);
        assert!(json["message"].is_string());
        assert!(json.get("activation_count").is_none());
    }
}

#[tokio::test]
async fn test_validate_accepts_legacy_field_names() {
    let state = create_test_app_state();
    let key = generate_via_api(&state, json!({})).await;

    let (status, json) =
        validate_via_api(&state, json!({"license_key": key, "machine_code": "legacy-box"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], true);

    let (_, json) = validate_via_api(&state, json!({"key": key, "fingerprint": "legacy-box"})).await;
    assert_eq!(json["valid"], true, "both spellings address the same binding");
    assert_eq!(json["activation_count"], 2);
}

#[tokio::test]
async fn test_validate_with_both_spellings_prefers_current_names() {
    let state = create_test_app_state();
    let key = generate_via_api(&state, json!({})).await;

    let (status, json) = validate_via_api(
        &state,
        json!({
            "key": key,
            "license_key": "stale-key",
            "fingerprint": "box",
            "machine_code": "stale-box",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], true, "sending both spellings must not be rejected");

    // A blank current field falls back to the legacy one
    let (_, json) = validate_via_api(
        &state,
        json!({"key": "", "license_key": key, "fingerprint": "box"}),
    )
    .await;
    assert_eq!(json["valid"], true);
    assert_eq!(json["activation_count"], 2);
}

#[tokio::test]
async fn test_validate_malformed_body_is_missing_parameters() {
    let state = create_test_app_state();

    for raw in ["not json", "", "[1,2,3]", "{\"key\": 5}"] {
        let response = test_app(state.clone())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/validate")
                    .header("content-type", "application/json")
                    .body(Body::from(raw))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK, "body {:?}", raw);
        let json = body_json(response).await;
        assert_eq!(json["valid"], false);
        assert_eq!(json["reason"], "missing_parameters", "body {:?}", raw);
    }
}

#[tokio::test]
async fn test_validate_expired_and_deactivated() {
    let state = create_test_app_state();
    let expired = generate_via_api(&state, json!({"expires_at": past_timestamp(1)})).await;
    let (_, json) = validate_via_api(&state, json!({"key": expired, "fingerprint": "M1"})).await;
    assert_eq!(json["reason"], "expired");

    let key = generate_via_api(&state, json!({})).await;
    let response = test_app(state.clone())
        .oneshot(json_post("/admin/deactivate", &json!({"key": key}), Some(ADMIN_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (_, json) = validate_via_api(&state, json!({"key": key, "fingerprint": "M1"})).await;
    assert_eq!(json["reason"], "deactivated");
}

// ============ Generate ============

#[tokio::test]
async fn test_generate_requires_admin_key() {
    let state = create_test_app_state();

    for credential in [None, Some("wrong-key"), Some("")] {
        let response = test_app(state.clone())
            .oneshot(json_post("/admin/generate", &json!({}), credential))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "credential {:?}", credential);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Unauthorized");
    }

    let admin = state.licenses.authorize(Some(ADMIN_KEY)).unwrap();
    assert!(
        state.licenses.list(&admin).unwrap().is_empty(),
        "rejected generate requests must not create records"
    );
}

#[tokio::test]
async fn test_generate_response_carries_legacy_key_field() {
    let response = test_app(create_test_app_state())
        .oneshot(json_post("/admin/generate", &json!({}), Some(ADMIN_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert!(json["key"].is_string());
    assert_eq!(json["license_key"], json["key"]);
}

#[tokio::test]
async fn test_generate_accepts_bearer_token() {
    let state = create_test_app_state();
    let response = test_app(state)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin/generate")
                .header("Authorization", format!("Bearer {}", ADMIN_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert!(json["expires_at"].is_null(), "empty body means no expiry");
}

#[tokio::test]
async fn test_generate_expiry_formats() {
    let state = create_test_app_state();
    let admin = state.licenses.authorize(Some(ADMIN_KEY)).unwrap();

    let unix = generate_via_api(&state, json!({"expires_at": 1_900_000_000})).await;
    let text = generate_via_api(&state, json!({"expires_at": "2030-01-01 00:00:00"})).await;
    let rfc = generate_via_api(&state, json!({"expires_at": "2030-01-01T00:00:00Z"})).await;
    let never = generate_via_api(&state, json!({"expires_at": null})).await;
    let before = now();
    let relative = generate_via_api(&state, json!({"expires_in_days": 30})).await;

    let listed = state.licenses.list(&admin).unwrap();
    let expires_of = |key: &str| listed.iter().find(|l| l.key == key).unwrap().expires_at;

    assert_eq!(expires_of(unix.as_str()), Some(1_900_000_000));
    assert_eq!(expires_of(text.as_str()), Some(1_893_456_000));
    assert_eq!(expires_of(rfc.as_str()), Some(1_893_456_000));
    assert_eq!(expires_of(never.as_str()), None);
    let relative_exp = expires_of(relative.as_str()).unwrap();
    assert!(relative_exp >= before + 30 * ONE_DAY && relative_exp <= now() + 30 * ONE_DAY);
}

#[tokio::test]
async fn test_generate_rejects_bad_expiry() {
    let state = create_test_app_state();

    for body in [
        json!({"expires_at": "whenever"}),
        json!({"expires_at": 1_900_000_000, "expires_in_days": 3}),
        json!({"expires_in_days": 0}),
        json!({"expires_at": true}),
    ] {
        let response = test_app(state.clone())
            .oneshot(json_post("/admin/generate", &body, Some(ADMIN_KEY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
        let json = body_json(response).await;
        assert_eq!(json["success"], false);
    }
}

// ============ List ============

#[tokio::test]
async fn test_list_returns_every_field() {
    let state = create_test_app_state();
    let key = generate_via_api(&state, json!({"expires_at": 1_900_000_000})).await;
    validate_via_api(&state, json!({"key": key, "fingerprint": "box-1"})).await;

    let response = test_app(state)
        .oneshot(admin_get("/admin/licenses", Some(ADMIN_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    let records = json.as_array().expect("list should be a JSON array");
    assert_eq!(records.len(), 1);

    let record = &records[0];
    assert_eq!(record["key"], key.as_str());
    assert_eq!(record["machine_fingerprint"], "box-1");
    assert!(record["created_at"].is_i64());
    assert_eq!(record["expires_at"], 1_900_000_000);
    assert_eq!(record["active"], true);
    assert_eq!(record["activation_count"], 1);
}

#[tokio::test]
async fn test_list_requires_admin_key() {
    let response = test_app(create_test_app_state())
        .oneshot(admin_get("/admin/licenses", Some("nope")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============ Deactivate ============

#[tokio::test]
async fn test_deactivate_reports_existence() {
    let state = create_test_app_state();
    let key = generate_via_api(&state, json!({})).await;

    for (body, expected) in [
        (json!({"key": key}), true),
        (json!({"license_key": key}), true),
        (json!({"key": "unknown"}), false),
    ] {
        let response = test_app(state.clone())
            .oneshot(json_post("/admin/deactivate", &body, Some(ADMIN_KEY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["success"], expected, "body {}", body);
    }
}

#[tokio::test]
async fn test_deactivate_missing_key_is_bad_request() {
    let state = create_test_app_state();

    for body in [json!({}), json!({"key": ""})] {
        let response = test_app(state.clone())
            .oneshot(json_post("/admin/deactivate", &body, Some(ADMIN_KEY)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body {}", body);
        let json = body_json(response).await;
        assert_eq!(json["error"], "Missing parameters");
    }
}

#[tokio::test]
async fn test_deactivate_checks_credential_before_body() {
    let state = create_test_app_state();
    let key = generate_via_api(&state, json!({})).await;

    let response = test_app(state.clone())
        .oneshot(json_post("/admin/deactivate", &json!({"key": key}), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (_, json) = validate_via_api(&state, json!({"key": key, "fingerprint": "M1"})).await;
    assert_eq!(json["valid"], true, "unauthorized deactivation must have no effect");
}

// ============ Internal errors ============

#[tokio::test]
async fn test_database_failure_is_opaque_500_for_admin_and_verdict_for_validate() {
    // Break the schema underneath a running service
    let store = sqlite_memory_store();
    store
        .pool()
        .get()
        .unwrap()
        .execute_batch("DROP TABLE licenses;")
        .unwrap();
    let broken = AppState::new(std::sync::Arc::new(store), ADMIN_KEY);

    let response = test_app(broken.clone())
        .oneshot(admin_get("/admin/licenses", Some(ADMIN_KEY)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Internal server error");
    assert!(json.get("details").is_none(), "internal detail must not leak");

    let (status, json) = validate_via_api(&broken, json!({"key": "k", "fingerprint": "m"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["valid"], false);
    assert_eq!(json["reason"], "internal_error");
}
