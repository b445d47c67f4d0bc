//! Student resource operations

use serde_json::Value;

use super::models::{Id, NewStudent, StudentUpdate};
use super::ApiClient;
use crate::error::Result;

/// `/students` and the student views of `/batches`
#[derive(Clone, Copy)]
pub struct Students<'a> {
    client: &'a ApiClient,
}

impl<'a> Students<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<Value> {
        self.client.get(&["students"]).await
    }

    pub async fn get(self, id: &Id) -> Result<Value> {
        self.client.get(&["students", id.as_str()]).await
    }

    pub async fn create(self, student: &NewStudent) -> Result<Value> {
        self.client.post(&["students"], student).await
    }

    pub async fn update(self, id: &Id, update: &StudentUpdate) -> Result<Value> {
        self.client.put(&["students", id.as_str()], update).await
    }

    pub async fn delete(self, id: &Id) -> Result<Value> {
        self.client.delete(&["students", id.as_str()]).await
    }

    /// INACTIVE -> ACTIVE
    pub async fn activate(self, id: &Id) -> Result<Value> {
        self.client.patch(&["students", id.as_str(), "activate"]).await
    }

    /// ACTIVE -> INACTIVE
    pub async fn deactivate(self, id: &Id) -> Result<Value> {
        self.client.patch(&["students", id.as_str(), "deactivate"]).await
    }

    /// Free-text search over name, roll number and contact fields
    pub async fn search(self, query: &str) -> Result<Value> {
        self.client
            .get_with(&["students", "search"], &[("q", query)])
            .await
    }

    pub async fn by_stream(self, stream: &str) -> Result<Value> {
        self.client.get(&["students", "stream", stream]).await
    }

    pub async fn inactive(self) -> Result<Value> {
        self.client.get(&["students", "inactive"]).await
    }

    pub async fn by_roll_no(self, roll_no: &str) -> Result<Value> {
        self.client.get(&["students", "roll", roll_no]).await
    }

    pub async fn by_batch(self, batch_id: &Id) -> Result<Value> {
        self.client
            .get(&["batches", batch_id.as_str(), "students"])
            .await
    }
}
