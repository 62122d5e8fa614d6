//! Integration tests for the Issue Service over an in-memory document store.

use chrono::{Duration, TimeZone, Utc};
use civic_core::{
    CivicError, DocumentStore, IssueFields, IssueService, STATUS_IN_PROGRESS, STATUS_PENDING,
    STATUS_RESOLVED,
};
use std::sync::Arc;

fn service() -> IssueService {
    IssueService::new(Arc::new(DocumentStore::in_memory()))
}

fn with_status(status: &str) -> IssueFields {
    IssueFields {
        status: Some(status.to_string()),
        ..IssueFields::default()
    }
}

fn titled(title: &str, category: &str) -> IssueFields {
    IssueFields {
        title: Some(title.to_string()),
        category: Some(category.to_string()),
        location: Some("Main St & 3rd Ave".to_string()),
        priority: Some("High".to_string()),
        ..IssueFields::default()
    }
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_sequential_creates_get_sequential_ids() {
    let service = service();
    let mut ids = Vec::new();
    for i in 0..12 {
        let issue = service
            .create_issue(titled(&format!("issue {i}"), "Roads"))
            .await
            .unwrap();
        ids.push(issue.id.to_string());
    }

    let expected: Vec<String> = (1..=12).map(|n| format!("CIV{n:03}")).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_create_applies_defaults() {
    let service = service();
    let before = Utc::now();
    let issue = service
        .create_issue(titled("Streetlight out", "Lighting"))
        .await
        .unwrap();

    assert_eq!(issue.id.as_str(), "CIV001");
    assert_eq!(issue.status, STATUS_PENDING);
    assert!(issue.date_reported >= before);
    assert_eq!(issue.title.as_deref(), Some("Streetlight out"));
}

#[tokio::test]
async fn test_create_ignores_client_supplied_id() {
    let service = service();
    let fields: IssueFields =
        serde_json::from_value(serde_json::json!({ "id": "CIV999", "title": "Graffiti" }))
            .unwrap();

    let issue = service.create_issue(fields).await.unwrap();
    assert_eq!(issue.id.as_str(), "CIV001");
}

#[tokio::test]
async fn test_concurrent_creates_get_distinct_ids() {
    let service = service();
    let mut handles = Vec::new();
    for _ in 0..32 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.create_issue(IssueFields::default()).await.unwrap()
        }));
    }

    let mut ids = Vec::new();
    for handle in handles {
        ids.push(handle.await.unwrap().id.to_string());
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 32);
    assert_eq!(service.stats().await.unwrap().total_reports, 32);
}

// =============================================================================
// List
// =============================================================================

#[tokio::test]
async fn test_list_is_most_recent_first() {
    let service = service();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
    for day in 0..3 {
        service
            .create_issue(IssueFields {
                date_reported: Some(base + Duration::days(day)),
                ..titled(&format!("day {day}"), "Roads")
            })
            .await
            .unwrap();
    }

    let titles: Vec<_> = service
        .list_issues()
        .await
        .unwrap()
        .into_iter()
        .map(|i| i.title.unwrap())
        .collect();
    assert_eq!(titles, ["day 2", "day 1", "day 0"]);
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn test_update_changes_only_target() {
    let service = service();
    let first = service.create_issue(titled("Pothole", "Roads")).await.unwrap();
    let second = service.create_issue(titled("Dark alley", "Lighting")).await.unwrap();

    let updated = service
        .update_issue(first.id.as_str(), with_status(STATUS_RESOLVED))
        .await
        .unwrap();

    assert_eq!(updated.id, first.id);
    assert_eq!(updated.status, STATUS_RESOLVED);
    assert_eq!(updated.title, first.title);
    assert_eq!(updated.category, first.category);
    assert_eq!(updated.location, first.location);
    assert_eq!(updated.priority, first.priority);
    assert_eq!(updated.date_reported, first.date_reported);

    let untouched = service.issues_by_category("Lighting").await.unwrap();
    assert_eq!(untouched, vec![second]);

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.pending, 1);
    assert_eq!(stats.resolved, 1);
}

#[tokio::test]
async fn test_update_missing_id_is_not_found() {
    let service = service();
    service.create_issue(titled("Pothole", "Roads")).await.unwrap();
    let before = service.list_issues().await.unwrap();

    let err = service
        .update_issue("CIV404", with_status(STATUS_RESOLVED))
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert!(matches!(err, CivicError::NotFound(ref id) if id == "CIV404"));
    assert_eq!(service.list_issues().await.unwrap(), before);
}

#[tokio::test]
async fn test_update_accepts_any_status_label() {
    let service = service();
    let issue = service.create_issue(IssueFields::default()).await.unwrap();

    let updated = service
        .update_issue(issue.id.as_str(), with_status("Escalated"))
        .await
        .unwrap();
    assert_eq!(updated.status, "Escalated");
}

// =============================================================================
// Stats and filters
// =============================================================================

#[tokio::test]
async fn test_stats_counts_by_status() {
    let service = service();
    for status in [STATUS_PENDING, STATUS_PENDING, STATUS_IN_PROGRESS, STATUS_RESOLVED] {
        service.create_issue(with_status(status)).await.unwrap();
    }

    let stats = service.stats().await.unwrap();
    assert_eq!(stats.total_reports, 4);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.in_progress, 1);
    assert_eq!(stats.resolved, 1);
    assert_eq!(stats.average_resolution_time, "5.2 days");
}

#[tokio::test]
async fn test_stats_on_empty_collection() {
    let stats = service().stats().await.unwrap();
    assert_eq!(stats.total_reports, 0);
    assert_eq!(stats.pending, 0);
}

#[tokio::test]
async fn test_filter_by_category_is_exact() {
    let service = service();
    service.create_issue(titled("a", "Roads")).await.unwrap();
    service.create_issue(titled("b", "Lighting")).await.unwrap();
    service.create_issue(titled("c", "Roads")).await.unwrap();
    service.create_issue(titled("d", "roads")).await.unwrap();

    let roads = service.issues_by_category("Roads").await.unwrap();
    let titles: Vec<_> = roads.iter().map(|i| i.title.as_deref().unwrap()).collect();
    assert_eq!(titles, ["a", "c"]);
    assert!(service.issues_by_category("Parks").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_filter_by_status() {
    let service = service();
    service.create_issue(with_status(STATUS_IN_PROGRESS)).await.unwrap();
    service.create_issue(IssueFields::default()).await.unwrap();

    let in_progress = service.issues_by_status(STATUS_IN_PROGRESS).await.unwrap();
    assert_eq!(in_progress.len(), 1);
    assert_eq!(in_progress[0].id.as_str(), "CIV001");
}

#[test]
fn test_banner_is_static() {
    let banner = service().banner();
    assert_eq!(banner.message, "🚀 Civic Reports API is running!");
    assert_eq!(banner.status, "Active");
    assert_eq!(banner.version, "1.0.0");
    assert!(banner
        .endpoints
        .iter()
        .any(|e| e == "POST /api/issues - Create new issue"));
}
