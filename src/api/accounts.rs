//! Institute/manager identity: login, registration, credential recovery

use serde::Serialize;
use serde_json::Value;

use super::ApiClient;
use crate::auth::{Credentials, PasswordChange, ProfileUpdate, Registration, Role};
use crate::error::Result;

#[derive(Serialize)]
struct ForgotPassword<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct ResetPassword<'a> {
    token: &'a str,
    password: &'a str,
}

#[derive(Clone, Copy)]
pub struct Accounts<'a> {
    client: &'a ApiClient,
}

impl<'a> Accounts<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn login_institute(self, credentials: &Credentials) -> Result<Value> {
        self.client
            .post_public(Role::InstituteAdmin.login_path(), credentials)
            .await
    }

    pub async fn login_manager(self, credentials: &Credentials) -> Result<Value> {
        self.client
            .post_public(Role::Manager.login_path(), credentials)
            .await
    }

    pub async fn register_institute(self, registration: &Registration) -> Result<Value> {
        self.client
            .post_public(&["institute", "register"], registration)
            .await
    }

    /// Managers are registered by a signed-in institute
    pub async fn register_manager(self, registration: &Registration) -> Result<Value> {
        self.client
            .post(&["manager", "register"], registration)
            .await
    }

    /// Ask the backend whether the stored token is still accepted
    pub async fn verify(self) -> Result<Value> {
        self.client.get(&["auth", "verify"]).await
    }

    pub async fn me(self) -> Result<Value> {
        self.client.get(&["auth", "me"]).await
    }

    pub async fn update_profile(self, profile: &ProfileUpdate) -> Result<Value> {
        self.client.put(&["auth", "profile"], profile).await
    }

    pub async fn change_password(self, change: &PasswordChange) -> Result<Value> {
        self.client.put(&["auth", "change-password"], change).await
    }

    pub async fn forgot_password(self, email: &str) -> Result<Value> {
        self.client
            .post_public(&["auth", "forgot-password"], &ForgotPassword { email })
            .await
    }

    pub async fn reset_password(self, token: &str, new_password: &str) -> Result<Value> {
        self.client
            .post_public(
                &["auth", "reset-password"],
                &ResetPassword {
                    token,
                    password: new_password,
                },
            )
            .await
    }
}
