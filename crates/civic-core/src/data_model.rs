//! Data Model: Issue, IssueFields, IssueStats, ServiceBanner
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Status assigned to an issue when the caller does not supply one
pub const STATUS_PENDING: &str = "Pending";
pub const STATUS_IN_PROGRESS: &str = "In Progress";
pub const STATUS_RESOLVED: &str = "Resolved";

/// Placeholder reported by the statistics endpoint; not derived from data
pub const AVERAGE_RESOLUTION_TIME: &str = "5.2 days";

const ID_PREFIX: &str = "CIV";
const ID_MIN_WIDTH: usize = 3;

/// Public issue identifier (ex: "CIV001")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IssueId(String);

impl IssueId {
    /// Formats a sequence number as `CIV` + at least three digits.
    /// Wider numbers are never truncated: 1000 becomes `CIV1000`.
    pub fn from_sequence(seq: u64) -> Self {
        Self(format!("{ID_PREFIX}{seq:0width$}", width = ID_MIN_WIDTH))
    }

    /// Sequence number encoded in the id, if it follows the `CIV<digits>` scheme.
    pub fn sequence(&self) -> Option<u64> {
        self.0.strip_prefix(ID_PREFIX)?.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for IssueId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for IssueId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lng: Option<f64>,
}

/// A citizen-reported civic problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: IssueId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Free text (ex: "Roads", "Lighting")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Free-form label; see the `STATUS_*` constants for the well-known ones
    pub status: String,
    pub date_reported: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
    /// URI or encoded image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Issue {
    /// Builds a new issue from caller-supplied fields, filling `status` and
    /// `date_reported` when absent.
    pub fn new(id: IssueId, fields: IssueFields, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: fields.title,
            category: fields.category,
            location: fields.location,
            description: fields.description,
            priority: fields.priority,
            status: fields.status.unwrap_or_else(|| STATUS_PENDING.to_string()),
            date_reported: fields.date_reported.unwrap_or(now),
            reported_by: fields.reported_by,
            photo: fields.photo,
            department: fields.department,
            coordinates: fields.coordinates,
        }
    }

    /// Shallow merge: every field present in `fields` replaces the stored
    /// value, absent fields are left untouched. The id never changes.
    pub fn apply(&mut self, fields: IssueFields) {
        let IssueFields {
            title,
            category,
            location,
            description,
            priority,
            status,
            date_reported,
            reported_by,
            photo,
            department,
            coordinates,
        } = fields;

        overwrite(&mut self.title, title);
        overwrite(&mut self.category, category);
        overwrite(&mut self.location, location);
        overwrite(&mut self.description, description);
        overwrite(&mut self.priority, priority);
        overwrite(&mut self.reported_by, reported_by);
        overwrite(&mut self.photo, photo);
        overwrite(&mut self.department, department);
        overwrite(&mut self.coordinates, coordinates);
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(date_reported) = date_reported {
            self.date_reported = date_reported;
        }
    }
}

fn overwrite<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

/// Partial issue accepted by create and update. `id` is deliberately absent:
/// a client-supplied id is dropped during deserialization.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_reported: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

/// Exact-match filter over stored issues. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub category: Option<String>,
    pub status: Option<String>,
}

impl IssueFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
            ..Self::default()
        }
    }

    pub fn status(status: impl Into<String>) -> Self {
        Self {
            status: Some(status.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        let category_ok = match &self.category {
            Some(category) => issue.category.as_deref() == Some(category.as_str()),
            None => true,
        };
        let status_ok = match &self.status {
            Some(status) => issue.status == *status,
            None => true,
        };
        category_ok && status_ok
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueStats {
    pub total_reports: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub resolved: u64,
    pub average_resolution_time: String,
}

/// Static description served on `GET /`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceBanner {
    pub message: String,
    pub version: String,
    pub status: String,
    pub endpoints: Vec<String>,
}
