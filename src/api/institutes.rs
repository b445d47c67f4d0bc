//! Institute administration

use serde_json::Value;

use super::models::{Id, InstitutePayload};
use super::ApiClient;
use crate::auth::PasswordChange;
use crate::error::Result;

#[derive(Clone, Copy)]
pub struct Institutes<'a> {
    client: &'a ApiClient,
}

impl<'a> Institutes<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<Value> {
        self.client.get(&["institute"]).await
    }

    pub async fn get(self, id: &Id) -> Result<Value> {
        self.client.get(&["institute", id.as_str()]).await
    }

    /// The institute owning the current session
    pub async fn profile(self) -> Result<Value> {
        self.client.get(&["institute", "profile"]).await
    }

    pub async fn update(self, id: &Id, institute: &InstitutePayload) -> Result<Value> {
        self.client.put(&["institute", id.as_str()], institute).await
    }

    pub async fn delete(self, id: &Id) -> Result<Value> {
        self.client.delete(&["institute", id.as_str()]).await
    }

    pub async fn change_password(self, change: &PasswordChange) -> Result<Value> {
        self.client
            .put(&["institute", "change-password"], change)
            .await
    }
}
