//! Job records
//!
//! A job is identified by its title together with the owning company's
//! handle. Updates and deletes address jobs by title.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::sql::filter::FilterRequest;
use crate::sql::update::UpdateRequest;
use crate::store::{RecordStore, into_typed};

/// A stored job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub title: String,
    pub salary: Option<i32>,
    /// Fraction of the company offered; serialized as a decimal string
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Data for a new job
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company_handle: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            salary: None,
            equity: None,
            company_handle: company_handle.into(),
        }
    }

    pub fn salary(mut self, salary: i32) -> Self {
        self.salary = Some(salary);
        self
    }

    pub fn equity(mut self, equity: Decimal) -> Self {
        self.equity = Some(equity);
        self
    }
}

/// Job operations on a [`RecordStore`]
pub struct Jobs<'a> {
    store: &'a RecordStore,
}

impl<'a> Jobs<'a> {
    pub(crate) fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Create a job. Fails with `Conflict` if the company already has a job
    /// with this title.
    pub async fn create(&self, job: NewJob) -> Result<Job> {
        let properties = serde_json::to_value(&job)?;
        let record = self
            .store
            .insert(self.store.job_table(), &properties)
            .await?;
        into_typed(record)
    }

    /// Jobs matching `filters` (`title`, `minSalary`, `maxSalary`,
    /// `hasEquity`), ordered by creation. No match is `NotFound`.
    pub async fn find(&self, filters: &FilterRequest) -> Result<Vec<Job>> {
        let records = self.store.find(self.store.job_table(), filters).await?;
        records.into_iter().map(into_typed).collect()
    }

    /// Every job; an empty table is `NotFound`
    pub async fn all(&self) -> Result<Vec<Job>> {
        self.find(&FilterRequest::new()).await
    }

    pub async fn get(&self, title: &str) -> Result<Job> {
        let record = self.store.get(self.store.job_table(), title).await?;
        into_typed(record)
    }

    /// Partially update the job titled `title` from a JSON object such as
    /// `{"salary": 70000, "companyHandle": "c2"}`.
    pub async fn update(&self, title: &str, data: &serde_json::Value) -> Result<Job> {
        let update = UpdateRequest::from_json(data, self.store.job_table())?;
        self.update_fields(title, &update).await
    }

    /// Partially update the job titled `title` with already-typed values
    pub async fn update_fields(&self, title: &str, update: &UpdateRequest) -> Result<Job> {
        let record = self
            .store
            .update(self.store.job_table(), title, update)
            .await?;
        into_typed(record)
    }

    pub async fn remove(&self, title: &str) -> Result<()> {
        self.store.remove(self.store.job_table(), title).await
    }
}
