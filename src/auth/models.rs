//! Authentication models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::api::models::Id;
use crate::error::{Error, Result};

/// Caller roles known to the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Institute administrator - owns batches, students and managers
    InstituteAdmin,
    /// Manager - takes attendance for the batches assigned to them
    Manager,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::InstituteAdmin => "institute-admin",
            Role::Manager => "manager",
        }
    }

    /// Route a freshly authenticated caller lands on
    pub fn landing_route(&self) -> &'static str {
        LANDING_ROUTES
            .iter()
            .find(|(role, _)| role == self)
            .map(|(_, route)| *route)
            .unwrap_or(DEFAULT_LANDING_ROUTE)
    }

    /// Login endpoint path segments for this role
    pub fn login_path(&self) -> &'static [&'static str] {
        match self {
            Role::InstituteAdmin => &["institute", "login"],
            Role::Manager => &["manager", "login"],
        }
    }
}

/// Role to landing-route table, consulted once after authentication
pub const LANDING_ROUTES: &[(Role, &str)] = &[
    (Role::InstituteAdmin, "/dashboard"),
    (Role::Manager, "/attendance"),
];

const DEFAULT_LANDING_ROUTE: &str = "/dashboard";

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "institute-admin" | "institute" | "admin" => Ok(Role::InstituteAdmin),
            "manager" => Ok(Role::Manager),
            other => Err(Error::Other(format!("Unknown role: {}", other))),
        }
    }
}

/// Identity attributes cached alongside the token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub institute_id: Option<Id>,
    #[serde(default)]
    pub manager_id: Option<Id>,
}

impl Identity {
    /// Identity with only a role set
    pub fn with_role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Default::default()
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::InstituteAdmin)
    }
}

/// The caller's current credential plus identity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub identity: Identity,
}

impl Session {
    pub fn new(identity: Identity, token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            identity,
        }
    }

    /// A session is present once a token has been stored
    pub fn is_present(&self) -> bool {
        self.token.is_some()
    }

    /// Build a session from a login response body.
    ///
    /// Login responses differ between roles: institute logins return
    /// `institute_id`, the generic auth response returns `id` and `role`.
    /// Fields missing from the body fall back to what the caller logged in with.
    pub fn from_login(role: Role, email: &str, body: &Value) -> Result<Self> {
        let token = body
            .get("token")
            .and_then(Value::as_str)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Other("Login response did not contain a token".to_string()))?;

        let role = text_field(body, &["role"])
            .and_then(|r| r.parse().ok())
            .unwrap_or(role);
        let generic_id = id_field(body, &["id"]);

        let institute_id = id_field(body, &["institute_id", "instituteId"]).or_else(|| {
            if role == Role::InstituteAdmin {
                generic_id.clone()
            } else {
                None
            }
        });
        let manager_id = id_field(body, &["manager_id", "managerId"]).or_else(|| {
            if role == Role::Manager {
                generic_id.clone()
            } else {
                None
            }
        });

        let identity = Identity {
            name: text_field(body, &["name", "coachingName"]),
            email: text_field(body, &["email"]).or_else(|| Some(email.to_string())),
            role: Some(role),
            institute_id,
            manager_id,
        };

        Ok(Session::new(identity, token))
    }
}

fn text_field(body: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .find_map(|k| body.get(*k).and_then(Value::as_str))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn id_field(body: &Value, keys: &[&str]) -> Option<Id> {
    keys.iter().find_map(|k| body.get(*k).and_then(Id::from_json))
}

/// Login credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Institute or manager registration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
    /// Owning institute, required for manager registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institute_id: Option<Id>,
}

/// Password rotation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Profile fields the caller may edit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile: Option<String>,
}
