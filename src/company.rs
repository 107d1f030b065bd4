//! Company records, keyed by handle

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::job::Job;
use crate::sql::filter::FilterRequest;
use crate::sql::update::UpdateRequest;
use crate::store::{RecordStore, into_typed};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: Option<String>,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Data for a new company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

impl NewCompany {
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            name: name.into(),
            description: None,
            num_employees: None,
            logo_url: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn num_employees(mut self, num_employees: i32) -> Self {
        self.num_employees = Some(num_employees);
        self
    }

    pub fn logo_url(mut self, logo_url: impl Into<String>) -> Self {
        self.logo_url = Some(logo_url.into());
        self
    }
}

/// A company together with the jobs it offers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<Job>,
}

/// Company operations on a [`RecordStore`]
pub struct Companies<'a> {
    store: &'a RecordStore,
}

impl<'a> Companies<'a> {
    pub(crate) fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Create a company. Fails with `Conflict` if the handle is taken.
    pub async fn create(&self, company: NewCompany) -> Result<Company> {
        let properties = serde_json::to_value(&company)?;
        let record = self
            .store
            .insert(self.store.company_table(), &properties)
            .await?;
        into_typed(record)
    }

    /// Companies matching `filters` (`name`, `minEmployees`,
    /// `maxEmployees`), ordered by name. No match is `NotFound`.
    pub async fn find(&self, filters: &FilterRequest) -> Result<Vec<Company>> {
        let records = self
            .store
            .find(self.store.company_table(), filters)
            .await?;
        records.into_iter().map(into_typed).collect()
    }

    pub async fn all(&self) -> Result<Vec<Company>> {
        self.find(&FilterRequest::new()).await
    }

    /// The company with `handle` and its jobs. A company with no jobs is not
    /// an error.
    pub async fn get(&self, handle: &str) -> Result<CompanyDetail> {
        let record = self.store.get(self.store.company_table(), handle).await?;
        let company: Company = into_typed(record)?;

        let jobs = self
            .store
            .find_by(self.store.job_table(), "company_handle", handle)
            .await?
            .into_iter()
            .map(into_typed)
            .collect::<Result<Vec<Job>>>()?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Partially update the company from a JSON object such as
    /// `{"numEmployees": 12, "logoUrl": null}`.
    pub async fn update(&self, handle: &str, data: &serde_json::Value) -> Result<Company> {
        let update = UpdateRequest::from_json(data, self.store.company_table())?;
        self.update_fields(handle, &update).await
    }

    pub async fn update_fields(&self, handle: &str, update: &UpdateRequest) -> Result<Company> {
        let record = self
            .store
            .update(self.store.company_table(), handle, update)
            .await?;
        into_typed(record)
    }

    pub async fn remove(&self, handle: &str) -> Result<()> {
        self.store.remove(self.store.company_table(), handle).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_company_builder() {
        let company = NewCompany::new("c1", "C1")
            .description("Desc1")
            .num_employees(1)
            .logo_url("http://c1.img");

        assert_eq!(company.handle, "c1");
        assert_eq!(company.description.as_deref(), Some("Desc1"));
        assert_eq!(company.num_employees, Some(1));
        assert_eq!(company.logo_url.as_deref(), Some("http://c1.img"));
    }

    #[test]
    fn test_company_detail_flattens_company() {
        let detail = CompanyDetail {
            company: Company {
                handle: "c2".to_string(),
                name: "C2".to_string(),
                description: None,
                num_employees: Some(2),
                logo_url: None,
            },
            jobs: vec![],
        };

        assert_eq!(
            serde_json::to_value(&detail).unwrap(),
            json!({
                "handle": "c2",
                "name": "C2",
                "description": null,
                "numEmployees": 2,
                "logoUrl": null,
                "jobs": []
            })
        );
    }
}
