//! Access gate for protected views

use crate::auth::models::Session;
use crate::auth::session::SessionStore;

/// Console views, named after the routes they replace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    Login,
    ForgotPassword,
    Dashboard,
    Students,
    AddStudent,
    UpdateStudent,
    ViewStudent,
    SearchStudent,
    InactiveStudents,
    DeleteStudent,
    StudentProfile,
    Attendance,
    BatchManagement,
    Subjects,
    Institutes,
    Settings,
}

impl View {
    pub fn route(&self) -> &'static str {
        match self {
            View::Login => "/login",
            View::ForgotPassword => "/forgot-password",
            View::Dashboard => "/dashboard",
            View::Students => "/students",
            View::AddStudent => "/add-student",
            View::UpdateStudent => "/update-student",
            View::ViewStudent => "/view-student",
            View::SearchStudent => "/search-student",
            View::InactiveStudents => "/inactive-student",
            View::DeleteStudent => "/delete-student",
            View::StudentProfile => "/student-profile",
            View::Attendance => "/attendance",
            View::BatchManagement => "/batch-management",
            View::Subjects => "/subjects",
            View::Institutes => "/institutes",
            View::Settings => "/settings",
        }
    }

    /// Everything except the login and recovery flows needs a session
    pub fn is_protected(&self) -> bool {
        !matches!(self, View::Login | View::ForgotPassword)
    }
}

/// Outcome of evaluating the gate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate<V> {
    Render(V),
    Redirect(String),
}

impl<V> Gate<V> {
    pub fn is_redirect(&self) -> bool {
        matches!(self, Gate::Redirect(_))
    }

    pub fn rendered(self) -> Option<V> {
        match self {
            Gate::Render(v) => Some(v),
            Gate::Redirect(_) => None,
        }
    }
}

/// Presence check evaluated before a protected view renders.
///
/// The gate does not validate the token; an expired token is discovered by
/// the API client on first use.
#[derive(Debug, Clone)]
pub struct AccessGate {
    store: SessionStore,
    login_route: String,
}

impl AccessGate {
    pub fn new(store: SessionStore) -> Self {
        Self::with_login_route(store, View::Login.route())
    }

    pub fn with_login_route(store: SessionStore, login_route: impl Into<String>) -> Self {
        Self {
            store,
            login_route: login_route.into(),
        }
    }

    pub fn login_route(&self) -> &str {
        &self.login_route
    }

    /// Run `render` only when a session is present; otherwise redirect to login
    /// without invoking it.
    pub fn guard<V, F>(&self, render: F) -> Gate<V>
    where
        F: FnOnce(&Session) -> V,
    {
        let session = self.store.snapshot();
        if !session.is_present() {
            tracing::debug!("No session, redirecting to {}", self.login_route);
            return Gate::Redirect(self.login_route.clone());
        }
        Gate::Render(render(&session))
    }

    /// Gate a named view. Public views always render.
    pub fn enter<V, F>(&self, view: View, render: F) -> Gate<V>
    where
        F: FnOnce(&Session) -> V,
    {
        if view.is_protected() {
            self.guard(render)
        } else {
            Gate::Render(render(&self.store.snapshot()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::{Identity, Role};
    use std::cell::Cell;

    #[test]
    fn test_redirects_without_session() {
        let store = SessionStore::in_memory();
        let gate = AccessGate::new(store);
        let rendered = Cell::new(false);

        let outcome = gate.enter(View::Dashboard, |_| rendered.set(true));

        assert_eq!(outcome, Gate::Redirect("/login".to_string()));
        assert!(!rendered.get());
    }

    #[test]
    fn test_renders_with_session() {
        let store = SessionStore::in_memory();
        store
            .set_session(Identity::with_role(Role::InstituteAdmin), "tok")
            .unwrap();
        let gate = AccessGate::new(store);

        let outcome = gate.enter(View::Dashboard, |session| session.identity.role);
        assert_eq!(outcome, Gate::Render(Some(Role::InstituteAdmin)));
    }

    #[test]
    fn test_public_view_renders_without_session() {
        let gate = AccessGate::new(SessionStore::in_memory());
        let outcome = gate.enter(View::Login, |_| "login form");
        assert_eq!(outcome.rendered(), Some("login form"));
    }

    #[test]
    fn test_custom_login_route() {
        let gate = AccessGate::with_login_route(SessionStore::in_memory(), "/signin");
        assert_eq!(gate.guard(|_| ()), Gate::Redirect("/signin".to_string()));
    }

    #[test]
    fn test_routes() {
        assert_eq!(View::Dashboard.route(), "/dashboard");
        assert!(!View::Login.is_protected());
        assert!(View::Settings.is_protected());
    }
}
