//! Outbound HTTP client
//!
//! Every call to the backend goes through [`ApiClient`]. It attaches the
//! session token as a bearer credential and, when the backend answers 401,
//! clears the session and issues the login redirect before handing the
//! error back to the caller.

use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::auth::{Credentials, Navigator, Role, Session, SessionStore, View};
use crate::config::Config;
use crate::error::{Error, Result};

use super::{Accounts, Attendance, Batches, Institutes, MasterData, Students, Subjects};

/// Whether a request carries the session credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Attach the token when present; a 401 ends the session
    Bearer,
    /// Login, registration and recovery calls made without a session
    Public,
}

/// Single chokepoint for backend calls
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base: Url,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
    login_route: String,
}

impl ApiClient {
    /// Create a client rooted at `base_url`
    pub fn new(
        base_url: &str,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let base = Url::parse(base_url).map_err(|e| Error::Url(format!("{}: {}", base_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(Error::Url(format!("{} cannot be used as a base URL", base_url)));
        }

        let http = reqwest::Client::builder()
            .user_agent(concat!("attendify/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            session,
            navigator,
            login_route: View::Login.route().to_string(),
        })
    }

    /// Create a client from loaded configuration
    pub fn from_config(
        config: &Config,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self> {
        let mut client = Self::new(&config.api.base_url, session, navigator)?;
        client.login_route = config.console.login_route.clone();
        Ok(client)
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn students(&self) -> Students<'_> {
        Students::new(self)
    }

    pub fn batches(&self) -> Batches<'_> {
        Batches::new(self)
    }

    pub fn subjects(&self) -> Subjects<'_> {
        Subjects::new(self)
    }

    pub fn attendance(&self) -> Attendance<'_> {
        Attendance::new(self)
    }

    pub fn institutes(&self) -> Institutes<'_> {
        Institutes::new(self)
    }

    pub fn master_data(&self) -> MasterData<'_> {
        MasterData::new(self)
    }

    pub fn accounts(&self) -> Accounts<'_> {
        Accounts::new(self)
    }

    /// Authenticate as `role` and store the resulting session
    pub async fn login(&self, role: Role, credentials: &Credentials) -> Result<Session> {
        let body = match role {
            Role::InstituteAdmin => self.accounts().login_institute(credentials).await?,
            Role::Manager => self.accounts().login_manager(credentials).await?,
        };

        let session = Session::from_login(role, &credentials.email, &body)?;
        let token = session.token.clone().unwrap_or_default();
        self.session.set_session(session.identity.clone(), token)?;

        tracing::info!("Logged in as {} ({})", credentials.email, role);
        Ok(session)
    }

    /// Forget the stored session
    pub fn logout(&self) -> Result<()> {
        self.session.clear_session()?;
        tracing::info!("Logged out");
        Ok(())
    }

    pub async fn get(&self, path: &[&str]) -> Result<Value> {
        let req = self.request(Method::GET, path, Access::Bearer)?;
        self.dispatch(req, Method::GET, path, Access::Bearer).await
    }

    pub async fn get_with<Q>(&self, path: &[&str], query: &Q) -> Result<Value>
    where
        Q: Serialize + ?Sized,
    {
        let req = self.request(Method::GET, path, Access::Bearer)?.query(query);
        self.dispatch(req, Method::GET, path, Access::Bearer).await
    }

    pub async fn post<B>(&self, path: &[&str], body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body, Access::Bearer).await
    }

    pub async fn put<B>(&self, path: &[&str], body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::PUT, path, body, Access::Bearer).await
    }

    /// PATCH with an empty JSON object, as the status transitions expect
    pub async fn patch(&self, path: &[&str]) -> Result<Value> {
        let empty = serde_json::Map::new();
        self.send_json(Method::PATCH, path, &empty, Access::Bearer).await
    }

    pub async fn delete(&self, path: &[&str]) -> Result<Value> {
        let req = self.request(Method::DELETE, path, Access::Bearer)?;
        self.dispatch(req, Method::DELETE, path, Access::Bearer).await
    }

    /// POST without the session credential
    pub async fn post_public<B>(&self, path: &[&str], body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.send_json(Method::POST, path, body, Access::Public).await
    }

    async fn send_json<B>(
        &self,
        method: Method,
        path: &[&str],
        body: &B,
        access: Access,
    ) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let req = self.request(method.clone(), path, access)?.json(body);
        self.dispatch(req, method, path, access).await
    }

    /// Resolve `path` segments against the base address.
    ///
    /// Empty, `.` and `..` segments are rejected: the URL parser would fold
    /// them into the parent path and address a different resource.
    pub fn url(&self, path: &[&str]) -> Result<Url> {
        if let Some(bad) = path.iter().find(|s| matches!(s.trim(), "" | "." | "..")) {
            return Err(Error::Url(format!(
                "invalid path segment '{}' in /{}",
                bad,
                path.join("/")
            )));
        }

        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Url(format!("{} cannot be used as a base URL", self.base)))?
            .pop_if_empty()
            .extend(path);
        Ok(url)
    }

    fn request(&self, method: Method, path: &[&str], access: Access) -> Result<RequestBuilder> {
        let url = self.url(path)?;
        let mut req = self.http.request(method, url);

        if access == Access::Bearer {
            if let Some(token) = self.session.get_token() {
                req = req.bearer_auth(token);
            }
        }

        Ok(req)
    }

    async fn dispatch(
        &self,
        req: RequestBuilder,
        method: Method,
        path: &[&str],
        access: Access,
    ) -> Result<Value> {
        let route = path.join("/");
        tracing::debug!("{} /{}", method, route);

        let response = req.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            return Ok(parse_body(&text));
        }

        tracing::debug!("{} /{} failed with {}", method, route, status);
        let err = Error::from_status(status.as_u16(), &text);
        if err.is_unauthorized() && access == Access::Bearer {
            self.end_session();
        }
        Err(err)
    }

    /// Clear the session and send the caller to login
    fn end_session(&self) {
        tracing::warn!("Backend rejected the session credential, signing out");
        if let Err(e) = self.session.clear_session() {
            tracing::warn!("Failed to remove stored session: {}", e);
        }
        self.navigator.redirect(&self.login_route);
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base", &self.base.as_str())
            .field("session", &self.session)
            .finish()
    }
}

/// Response bodies pass through untouched; empty bodies become `null`
/// and non-JSON bodies are returned as a string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
