//! Access gate integration tests
//!
//! Run with: cargo test --test gate_tests

use attendify::auth::{AccessGate, Gate, Identity, Role, SessionStore, View};
use std::cell::Cell;

const ALL_VIEWS: &[View] = &[
    View::Login,
    View::ForgotPassword,
    View::Dashboard,
    View::Students,
    View::AddStudent,
    View::UpdateStudent,
    View::ViewStudent,
    View::SearchStudent,
    View::InactiveStudents,
    View::DeleteStudent,
    View::StudentProfile,
    View::Attendance,
    View::BatchManagement,
    View::Subjects,
    View::Institutes,
    View::Settings,
];

#[test]
fn test_dashboard_without_session_redirects() {
    let gate = AccessGate::new(SessionStore::in_memory());
    let rendered = Cell::new(false);

    let outcome = gate.enter(View::Dashboard, |_| rendered.set(true));

    assert_eq!(outcome, Gate::Redirect("/login".to_string()));
    assert!(!rendered.get());
}

#[test]
fn test_every_protected_view_redirects() {
    let gate = AccessGate::new(SessionStore::in_memory());

    for view in ALL_VIEWS.iter().filter(|v| v.is_protected()) {
        let rendered = Cell::new(false);
        let outcome = gate.enter(*view, |_| rendered.set(true));
        assert!(outcome.is_redirect(), "{:?} rendered without a session", view);
        assert!(!rendered.get());
    }
}

#[test]
fn test_public_views_render_without_session() {
    let gate = AccessGate::new(SessionStore::in_memory());

    for view in [View::Login, View::ForgotPassword] {
        let outcome = gate.enter(view, |session| session.is_present());
        assert_eq!(outcome, Gate::Render(false));
    }
}

#[test]
fn test_session_present_renders_with_identity() {
    let store = SessionStore::in_memory();
    store
        .set_session(
            Identity::with_role(Role::Manager).name("Ravi"),
            "tok",
        )
        .unwrap();
    let gate = AccessGate::new(store);

    let outcome = gate.enter(View::Attendance, |session| session.identity.name.clone());

    assert_eq!(outcome.rendered(), Some(Some("Ravi".to_string())));
}

#[test]
fn test_gate_follows_store_changes() {
    let store = SessionStore::in_memory();
    let gate = AccessGate::new(store.clone());

    assert!(gate.guard(|_| ()).is_redirect());

    store
        .set_session(Identity::with_role(Role::InstituteAdmin), "tok")
        .unwrap();
    assert_eq!(gate.guard(|_| 1), Gate::Render(1));

    store.clear_session().unwrap();
    assert!(gate.guard(|_| ()).is_redirect());
}

#[test]
fn test_configured_login_route() {
    let gate = AccessGate::with_login_route(SessionStore::in_memory(), "/signin");

    assert_eq!(gate.guard(|_| ()), Gate::Redirect("/signin".to_string()));
    assert_eq!(gate.login_route(), "/signin");
}

#[test]
fn test_routes_are_distinct() {
    let mut routes: Vec<_> = ALL_VIEWS.iter().map(View::route).collect();
    routes.sort();
    routes.dedup();
    assert_eq!(routes.len(), ALL_VIEWS.len());
}
