//! Batch resource operations

use serde_json::Value;

use super::models::{BatchPayload, Id};
use super::ApiClient;
use crate::error::Result;

#[derive(Clone, Copy)]
pub struct Batches<'a> {
    client: &'a ApiClient,
}

impl<'a> Batches<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<Value> {
        self.client.get(&["batches"]).await
    }

    pub async fn get(self, id: &Id) -> Result<Value> {
        self.client.get(&["batches", id.as_str()]).await
    }

    pub async fn create(self, batch: &BatchPayload) -> Result<Value> {
        self.client.post(&["batches"], batch).await
    }

    pub async fn update(self, id: &Id, batch: &BatchPayload) -> Result<Value> {
        self.client.put(&["batches", id.as_str()], batch).await
    }

    pub async fn delete(self, id: &Id) -> Result<Value> {
        self.client.delete(&["batches", id.as_str()]).await
    }

    pub async fn by_institute(self, institute_id: &Id) -> Result<Value> {
        self.client
            .get(&["batches", "institute", institute_id.as_str()])
            .await
    }

    pub async fn by_manager(self, manager_id: &Id) -> Result<Value> {
        self.client
            .get(&["batches", "manager", manager_id.as_str()])
            .await
    }
}
