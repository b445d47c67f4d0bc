//! Subject resource operations and batch association

use serde_json::Value;

use super::models::{Id, SubjectLink, SubjectPayload};
use super::ApiClient;
use crate::error::Result;

#[derive(Clone, Copy)]
pub struct Subjects<'a> {
    client: &'a ApiClient,
}

impl<'a> Subjects<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(self) -> Result<Value> {
        self.client.get(&["subjects"]).await
    }

    pub async fn get(self, id: &Id) -> Result<Value> {
        self.client.get(&["subjects", id.as_str()]).await
    }

    pub async fn create(self, subject: &SubjectPayload) -> Result<Value> {
        self.client.post(&["subjects"], subject).await
    }

    pub async fn update(self, id: &Id, subject: &SubjectPayload) -> Result<Value> {
        self.client.put(&["subjects", id.as_str()], subject).await
    }

    pub async fn delete(self, id: &Id) -> Result<Value> {
        self.client.delete(&["subjects", id.as_str()]).await
    }

    pub async fn by_batch(self, batch_id: &Id) -> Result<Value> {
        self.client
            .get(&["batches", batch_id.as_str(), "subjects"])
            .await
    }

    pub async fn add_to_batch(self, batch_id: &Id, subject_id: &Id) -> Result<Value> {
        self.client
            .post(
                &["batches", batch_id.as_str(), "subjects"],
                &SubjectLink { subject_id },
            )
            .await
    }

    pub async fn remove_from_batch(self, batch_id: &Id, subject_id: &Id) -> Result<Value> {
        self.client
            .delete(&["batches", batch_id.as_str(), "subjects", subject_id.as_str()])
            .await
    }
}
