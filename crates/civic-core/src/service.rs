//! Issue Service: the operations exposed over the issue collection
use crate::data_model::{
    Issue, IssueFields, IssueFilter, IssueId, IssueStats, ServiceBanner, AVERAGE_RESOLUTION_TIME,
    STATUS_IN_PROGRESS, STATUS_PENDING, STATUS_RESOLVED,
};
use crate::error::{CivicError, CivicResult};
use crate::store::IssueStore;
use crate::CIVIC_VERSION;
use chrono::Utc;
use std::sync::Arc;

/// Route descriptions listed by the banner, in `METHOD /path - summary` form.
pub const ENDPOINTS: &[&str] = &[
    "GET / - Service banner",
    "GET /api/issues - Get all issues",
    "POST /api/issues - Create new issue",
    "PUT /api/issues/{id} - Update issue",
    "GET /api/stats - Get statistics",
    "GET /api/issues/category/{category} - Get issues by category",
    "GET /api/issues/status/{status} - Get issues by status",
    "GET /health - Liveness check",
    "GET /metrics - Prometheus metrics",
];

#[derive(Clone)]
pub struct IssueService {
    store: Arc<dyn IssueStore>,
}

impl IssueService {
    pub fn new(store: Arc<dyn IssueStore>) -> Self {
        Self { store }
    }

    pub fn banner(&self) -> ServiceBanner {
        ServiceBanner {
            message: "🚀 Civic Reports API is running!".to_string(),
            version: CIVIC_VERSION.to_string(),
            status: "Active".to_string(),
            endpoints: ENDPOINTS.iter().map(|e| e.to_string()).collect(),
        }
    }

    pub async fn list_issues(&self) -> CivicResult<Vec<Issue>> {
        Ok(self.store.find_all_sorted().await?)
    }

    /// Files a new issue. The id comes from the store's sequence, never from
    /// the caller; `status` and `date_reported` are defaulted when absent.
    pub async fn create_issue(&self, fields: IssueFields) -> CivicResult<Issue> {
        let sequence = self.store.next_sequence().await?;
        let issue = Issue::new(IssueId::from_sequence(sequence), fields, Utc::now());
        let issue = self.store.insert(issue).await?;

        tracing::info!(id = %issue.id, status = %issue.status, "issue created");
        Ok(issue)
    }

    pub async fn update_issue(&self, id: &str, fields: IssueFields) -> CivicResult<Issue> {
        let id = IssueId::from(id);
        let updated = self.store.find_one_and_update(&id, fields).await?;
        match updated {
            Some(issue) => {
                tracing::info!(id = %issue.id, status = %issue.status, "issue updated");
                Ok(issue)
            }
            None => Err(CivicError::NotFound(id.to_string())),
        }
    }

    pub async fn stats(&self) -> CivicResult<IssueStats> {
        Ok(IssueStats {
            total_reports: self.store.count(&IssueFilter::all()).await?,
            pending: self.store.count(&IssueFilter::status(STATUS_PENDING)).await?,
            in_progress: self
                .store
                .count(&IssueFilter::status(STATUS_IN_PROGRESS))
                .await?,
            resolved: self.store.count(&IssueFilter::status(STATUS_RESOLVED)).await?,
            average_resolution_time: AVERAGE_RESOLUTION_TIME.to_string(),
        })
    }

    pub async fn issues_by_category(&self, category: &str) -> CivicResult<Vec<Issue>> {
        Ok(self.store.find(&IssueFilter::category(category)).await?)
    }

    pub async fn issues_by_status(&self, status: &str) -> CivicResult<Vec<Issue>> {
        Ok(self.store.find(&IssueFilter::status(status)).await?)
    }
}
