//! API client contract tests
//!
//! Bearer attachment, 401 recovery and error propagation against an
//! in-process mock backend.
//!
//! Run with: cargo test --test client_tests

mod common;

use attendify::api::models::Id;
use attendify::auth::{Credentials, Role};
use attendify::cli::commands::dashboard_summary;
use attendify::Error;
use common::Harness;
use futures_util::future::join_all;
use serde_json::json;

#[tokio::test]
async fn test_bearer_attached_when_token_present() {
    let h = Harness::start().await;
    h.sign_in("abc");

    h.client.students().list().await.unwrap();

    let request = h.backend.last();
    assert_eq!(request.authorization.as_deref(), Some("Bearer abc"));
}

#[tokio::test]
async fn test_no_credential_without_session() {
    let h = Harness::start().await;

    h.client.students().list().await.unwrap();

    assert_eq!(h.backend.last().authorization, None);
}

#[tokio::test]
async fn test_token_read_at_call_time() {
    let h = Harness::start().await;
    h.sign_in("first");
    h.client.batches().list().await.unwrap();

    h.sign_in("second");
    h.client.batches().list().await.unwrap();

    let auth: Vec<_> = h
        .backend
        .requests()
        .into_iter()
        .map(|r| r.authorization)
        .collect();
    assert_eq!(
        auth,
        vec![Some("Bearer first".to_string()), Some("Bearer second".to_string())]
    );
}

#[tokio::test]
async fn test_unauthorized_clears_session_and_redirects() {
    let h = Harness::start().await;
    h.sign_in("abc");
    h.backend
        .respond("GET", "/students", 401, json!({ "message": "token expired" }));

    let err = h.client.students().list().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Not authorized: token expired");
    assert_eq!(h.session.get_token(), None);
    assert!(h.session.identity().is_none());
    assert_eq!(h.navigator.count(), 1);
    assert_eq!(h.navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_unauthorized_without_session_still_redirects() {
    let h = Harness::start().await;
    h.backend.respond("GET", "/auth/me", 401, json!({}));

    let err = h.client.accounts().me().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.session.get_token(), None);
    assert_eq!(h.navigator.count(), 1);
}

#[tokio::test]
async fn test_concurrent_unauthorized_reaches_same_end_state() {
    let h = Harness::start().await;
    h.sign_in("abc");
    h.backend.respond("GET", "/students", 401, json!({}));
    h.backend.respond("GET", "/batches", 401, json!({}));
    h.backend.respond("GET", "/subjects", 401, json!({}));

    let (students, batches, subjects, again) = tokio::join!(
        h.client.students().list(),
        h.client.batches().list(),
        h.client.subjects().list(),
        h.client.students().list(),
    );

    for result in [students, batches, subjects, again] {
        assert!(matches!(result, Err(Error::Unauthorized { .. })));
    }
    assert_eq!(h.session.get_token(), None);
    // No deduplication: each failure issues its own redirect
    assert_eq!(h.navigator.count(), 4);
    assert!(h.navigator.routes().iter().all(|r| r == "/login"));
}

#[tokio::test]
async fn test_many_concurrent_unauthorized_calls() {
    let h = Harness::start().await;
    h.sign_in("abc");
    h.backend.respond("GET", "/attendance/student/1", 401, json!({}));

    let attendance = h.client.attendance();
    let student = Id::from(1u64);
    let results = join_all((0..8).map(|_| attendance.for_student(&student))).await;

    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|r| matches!(r, Err(e) if e.is_unauthorized())));
    assert!(!h.session.is_present());
    assert_eq!(h.navigator.count(), 8);
}

#[tokio::test]
async fn test_other_failures_leave_session_untouched() {
    let h = Harness::start().await;
    h.sign_in("abc");

    let cases = [
        ("/students/1", 400u16),
        ("/students/2", 403),
        ("/students/3", 404),
        ("/students/4", 409),
        ("/students/5", 422),
        ("/students/6", 500),
        ("/students/7", 503),
    ];
    for (path, status) in cases {
        h.backend
            .respond("GET", path, status, json!({ "message": "nope" }));
    }

    for (path, status) in cases {
        let id = Id::from(path.trim_start_matches("/students/"));
        let err = h.client.students().get(&id).await.unwrap_err();
        assert_eq!(err.status(), Some(status), "status for {}", path);
        assert!(!err.is_unauthorized());
        assert_eq!(h.session.get_token().as_deref(), Some("abc"));
    }

    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn test_error_taxonomy_variants() {
    let h = Harness::start().await;
    h.sign_in("abc");
    h.backend.respond(
        "POST",
        "/students",
        400,
        json!({ "message": "roll number already exists" }),
    );
    h.backend.respond("GET", "/batches/9", 404, json!({}));
    h.backend.respond("DELETE", "/subjects/3", 409, json!({ "error": "in use" }));
    h.backend.respond("GET", "/boards", 500, json!({}));

    let err = h
        .client
        .students()
        .create(&attendify::api::models::NewStudent::new("Asha", "R-1"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation { status: 400, ref message } if message == "roll number already exists"));

    let err = h.client.batches().get(&Id::from(9u64)).await.unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));

    let err = h.client.subjects().delete(&Id::from(3u64)).await.unwrap_err();
    assert!(matches!(err, Error::Conflict { ref message } if message == "in use"));

    let err = h.client.master_data().boards().await.unwrap_err();
    assert!(matches!(err, Error::Server { status: 500, .. }));
}

#[tokio::test]
async fn test_transport_failure_leaves_session_untouched() {
    let session = attendify::SessionStore::in_memory();
    session
        .set_session(attendify::auth::Identity::with_role(Role::Manager), "abc")
        .unwrap();
    let navigator = std::sync::Arc::new(attendify::auth::RecordingNavigator::new());

    // Nothing listens on the discard port
    let client = attendify::ApiClient::new("http://127.0.0.1:9/api", session.clone(), navigator.clone())
        .unwrap();

    let err = client.students().list().await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(session.get_token().as_deref(), Some("abc"));
    assert_eq!(navigator.count(), 0);
}

#[tokio::test]
async fn test_success_payload_passed_through_unchanged() {
    let h = Harness::start().await;
    h.sign_in("abc");
    let payload = json!([
        { "id": 1, "name": "Asha", "status": "ACTIVE", "extra": { "nested": [1, 2, 3] } },
        { "id": 2, "name": null }
    ]);
    h.backend.respond("GET", "/students", 200, payload.clone());

    let value = h.client.students().list().await.unwrap();
    assert_eq!(value, payload);
}

#[tokio::test]
async fn test_login_stores_session() {
    let h = Harness::start().await;
    h.backend.respond(
        "POST",
        "/institute/login",
        200,
        json!({ "institute_id": 5, "name": "Bright Minds", "email": "owner@bright.in", "token": "jwt-1" }),
    );

    let credentials = Credentials {
        email: "owner@bright.in".into(),
        password: "secret".into(),
    };
    let session = h.client.login(Role::InstituteAdmin, &credentials).await.unwrap();

    assert_eq!(session.token.as_deref(), Some("jwt-1"));
    assert_eq!(h.session.get_token().as_deref(), Some("jwt-1"));
    assert_eq!(h.session.get_role(), Some(Role::InstituteAdmin));
    assert_eq!(
        h.session.identity().unwrap().institute_id,
        Some(Id::from(5u64))
    );

    let request = h.backend.last();
    assert_eq!(request.method, "POST");
    assert_eq!(request.path, "/institute/login");
    assert_eq!(request.authorization, None);
    assert_eq!(
        request.body,
        json!({ "email": "owner@bright.in", "password": "secret" })
    );
}

#[tokio::test]
async fn test_manager_login_uses_manager_endpoint() {
    let h = Harness::start().await;
    h.backend.respond(
        "POST",
        "/manager/login",
        200,
        json!({ "token": "m-1", "role": "MANAGER", "name": "Ravi", "id": 3 }),
    );

    let credentials = Credentials {
        email: "ravi@bright.in".into(),
        password: "pw".into(),
    };
    h.client.login(Role::Manager, &credentials).await.unwrap();

    assert_eq!(h.backend.last().path, "/manager/login");
    assert_eq!(h.session.get_role(), Some(Role::Manager));
    assert_eq!(h.session.identity().unwrap().manager_id, Some(Id::from(3u64)));
}

#[tokio::test]
async fn test_failed_login_does_not_redirect() {
    let h = Harness::start().await;
    h.sign_in("previous");
    h.backend
        .respond("POST", "/institute/login", 401, json!({ "message": "bad credentials" }));

    let credentials = Credentials {
        email: "owner@bright.in".into(),
        password: "wrong".into(),
    };
    let err = h
        .client
        .login(Role::InstituteAdmin, &credentials)
        .await
        .unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(h.navigator.count(), 0);
    assert_eq!(h.session.get_token().as_deref(), Some("previous"));
}

#[tokio::test]
async fn test_logout_clears_session() {
    let h = Harness::start().await;
    h.sign_in("abc");

    h.client.logout().unwrap();
    h.client.logout().unwrap();

    assert_eq!(h.session.get_token(), None);
    assert_eq!(h.navigator.count(), 0);
}

#[tokio::test]
async fn test_dashboard_summary_counts() {
    let h = Harness::start().await;
    h.sign_in("abc");
    let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
    let stats = json!({ "present": 40, "absent": 3, "late": 1 });
    h.backend
        .respond("GET", "/students", 200, json!([{ "id": 1 }, { "id": 2 }, { "id": 3 }]));
    h.backend
        .respond("GET", "/students/inactive", 200, json!([{ "id": 9 }]));
    h.backend
        .respond("GET", "/batches", 200, json!([{ "id": 1 }, { "id": 2 }]));
    h.backend
        .respond("GET", "/attendance/stats/date/2025-03-14", 200, stats.clone());

    let summary = dashboard_summary(&h.client, today).await.unwrap();

    assert_eq!(
        summary,
        json!({
            "date": "2025-03-14",
            "students": 3,
            "inactive_students": 1,
            "batches": 2,
            "attendance": stats,
        })
    );
    assert_eq!(h.backend.requests().len(), 4);
    assert!(h
        .backend
        .requests()
        .iter()
        .all(|r| r.authorization.as_deref() == Some("Bearer abc")));
}

#[tokio::test]
async fn test_dashboard_summary_unauthorized_arm_ends_session() {
    let h = Harness::start().await;
    h.sign_in("abc");
    h.backend
        .respond("GET", "/students/inactive", 401, json!({ "message": "expired" }));
    let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

    let err = dashboard_summary(&h.client, today).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert!(!h.session.is_present());
    assert_eq!(h.navigator.count(), 1);
    assert_eq!(h.navigator.last().as_deref(), Some("/login"));
}

#[tokio::test]
async fn test_dashboard_summary_non_list_payloads_count_zero() {
    let h = Harness::start().await;
    h.sign_in("abc");
    let today = chrono::NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();

    // Default mock answer is an object, not a list
    let summary = dashboard_summary(&h.client, today).await.unwrap();

    assert_eq!(summary["students"], json!(0));
    assert_eq!(summary["batches"], json!(0));
    assert_eq!(summary["attendance"], json!({ "ok": true }));
}
