//! Reference data lookups

use serde_json::Value;

use super::ApiClient;
use crate::error::Result;

#[derive(Clone, Copy)]
pub struct MasterData<'a> {
    client: &'a ApiClient,
}

impl<'a> MasterData<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn class_levels(self) -> Result<Value> {
        self.client.get(&["class-levels"]).await
    }

    pub async fn boards(self) -> Result<Value> {
        self.client.get(&["boards"]).await
    }

    pub async fn streams(self) -> Result<Value> {
        self.client.get(&["streams"]).await
    }
}
