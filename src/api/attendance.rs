//! Attendance records and aggregate statistics

use chrono::NaiveDate;
use serde_json::Value;

use super::models::{AttendanceQuery, AttendanceSheet, DateRange, Id, OpenRange};
use super::ApiClient;
use crate::error::Result;

#[derive(Clone, Copy)]
pub struct Attendance<'a> {
    client: &'a ApiClient,
}

impl<'a> Attendance<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Record one batch/subject/day sheet
    pub async fn mark(self, sheet: &AttendanceSheet) -> Result<Value> {
        self.client.post(&["attendance"], sheet).await
    }

    pub async fn by_date(self, query: &AttendanceQuery) -> Result<Value> {
        self.client.get_with(&["attendance"], query).await
    }

    /// Attendance recorded for the local current date
    pub async fn today(self) -> Result<Value> {
        let today = chrono::Local::now().date_naive();
        self.by_date(&AttendanceQuery::on(today)).await
    }

    pub async fn by_range(self, range: &DateRange) -> Result<Value> {
        self.client.get_with(&["attendance", "range"], range).await
    }

    pub async fn for_student(self, student_id: &Id) -> Result<Value> {
        self.client
            .get(&["attendance", "student", student_id.as_str()])
            .await
    }

    pub async fn stats_by_date(self, date: NaiveDate) -> Result<Value> {
        let date = date.format("%Y-%m-%d").to_string();
        self.client
            .get(&["attendance", "stats", "date", date.as_str()])
            .await
    }

    pub async fn stats_by_range(self, range: &DateRange) -> Result<Value> {
        self.client
            .get_with(&["attendance", "stats", "range"], range)
            .await
    }

    pub async fn by_stream(self, stream: &str, date: NaiveDate) -> Result<Value> {
        self.client
            .get_with(&["attendance", "stream", stream], &[("date", date)])
            .await
    }

    /// All-time statistics, or bounded by whichever ends of `range` are set
    pub async fn overall_stats(self, range: &OpenRange) -> Result<Value> {
        self.client
            .get_with(&["attendance", "stats", "overall"], range)
            .await
    }

    pub async fn update(self, id: &Id, sheet: &AttendanceSheet) -> Result<Value> {
        self.client.put(&["attendance", id.as_str()], sheet).await
    }

    pub async fn delete(self, id: &Id) -> Result<Value> {
        self.client.delete(&["attendance", id.as_str()]).await
    }
}
