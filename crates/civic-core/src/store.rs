//! Storage collaborator: a document collection of issues.
//!
//! `IssueStore` is the seam the service talks to. `DocumentStore` is the
//! bundled implementation, selected by connection URL:
//!
//! - `memory://` keeps the collection in process memory only.
//! - `file://<path>` keeps a JSON snapshot on disk, rewritten after every
//!   mutation (temp file + rename) and reloaded on open.
//!
//! The id sequence lives next to the documents so that identifiers are handed
//! out by a single writer even when creates race.
use crate::data_model::{Issue, IssueFields, IssueFilter, IssueId};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::RwLock;

const MEMORY_SCHEME: &str = "memory://";
const FILE_SCHEME: &str = "file://";

static SNAPSHOT_WRITES: AtomicU64 = AtomicU64::new(0);

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage snapshot is not valid: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("duplicate issue id: {0}")]
    DuplicateId(IssueId),

    #[error("unsupported storage url: {0}")]
    UnsupportedUrl(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Operations the issue service needs from its document store.
#[async_trait]
pub trait IssueStore: Send + Sync {
    /// Atomically advances the id sequence and returns the new value.
    async fn next_sequence(&self) -> StoreResult<u64>;

    /// Inserts a new document. Rejects an id that is already stored.
    async fn insert(&self, issue: Issue) -> StoreResult<Issue>;

    /// All documents, most recent `date_reported` first.
    async fn find_all_sorted(&self) -> StoreResult<Vec<Issue>>;

    /// Documents matching `filter`, in insertion order.
    async fn find(&self, filter: &IssueFilter) -> StoreResult<Vec<Issue>>;

    async fn count(&self, filter: &IssueFilter) -> StoreResult<u64>;

    /// Shallow-merges `fields` into the document with `id` and returns the
    /// updated document, or `None` when nothing matches.
    async fn find_one_and_update(
        &self,
        id: &IssueId,
        fields: IssueFields,
    ) -> StoreResult<Option<Issue>>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Collection {
    #[serde(default)]
    sequence: u64,
    #[serde(default)]
    issues: Vec<Issue>,
}

impl Collection {
    /// Raises the sequence past every stored id so a reload never reissues one.
    fn reconcile_sequence(&mut self) {
        let highest = self
            .issues
            .iter()
            .filter_map(|issue| issue.id.sequence())
            .max()
            .unwrap_or(0);
        let count = self.issues.len() as u64;
        self.sequence = self.sequence.max(highest).max(count);
    }
}

pub struct DocumentStore {
    collection: RwLock<Collection>,
    path: Option<PathBuf>,
}

impl DocumentStore {
    pub fn in_memory() -> Self {
        Self {
            collection: RwLock::new(Collection::default()),
            path: None,
        }
    }

    /// Opens (or creates) a file-backed collection.
    pub async fn open_file(path: impl Into<PathBuf>) -> StoreResult<Self> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut collection = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Collection::default(),
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Collection::default(),
            Err(err) => return Err(err.into()),
        };
        collection.reconcile_sequence();

        tracing::debug!(
            path = %path.display(),
            issues = collection.issues.len(),
            sequence = collection.sequence,
            "opened issue collection"
        );

        Ok(Self {
            collection: RwLock::new(collection),
            path: Some(path),
        })
    }

    /// Opens a store from a connection URL (`memory://` or `file://<path>`).
    pub async fn connect(url: &str) -> StoreResult<Self> {
        if url == MEMORY_SCHEME {
            return Ok(Self::in_memory());
        }
        match url.strip_prefix(FILE_SCHEME) {
            Some(path) if !path.is_empty() => Self::open_file(path).await,
            _ => Err(StoreError::UnsupportedUrl(url.to_string())),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Rewrites the snapshot through a temp file unique to this write, so
    /// stores sharing a path never clobber each other's temp file. The temp
    /// file is removed when the write or rename fails.
    async fn persist(&self, collection: &Collection) -> StoreResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let bytes = serde_json::to_vec_pretty(collection)?;
        let mut tmp = path.clone().into_os_string();
        tmp.push(format!(
            ".{}.{}.tmp",
            std::process::id(),
            SNAPSHOT_WRITES.fetch_add(1, Ordering::Relaxed)
        ));
        let tmp = PathBuf::from(tmp);

        let written = match tokio::fs::write(&tmp, &bytes).await {
            Ok(()) => tokio::fs::rename(&tmp, path).await,
            Err(err) => Err(err),
        };
        if let Err(err) = written {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %tmp.display(), error = %cleanup, "stale snapshot temp file");
                }
            }
            return Err(err.into());
        }
        Ok(())
    }
}

#[async_trait]
impl IssueStore for DocumentStore {
    /// Reserves the next value in memory only; the bump reaches disk with the
    /// insert that uses it. A reload reconciles against stored ids anyway.
    async fn next_sequence(&self) -> StoreResult<u64> {
        let mut collection = self.collection.write().await;
        collection.sequence += 1;
        Ok(collection.sequence)
    }

    async fn insert(&self, issue: Issue) -> StoreResult<Issue> {
        let mut collection = self.collection.write().await;
        if collection.issues.iter().any(|stored| stored.id == issue.id) {
            return Err(StoreError::DuplicateId(issue.id));
        }

        let previous = collection.sequence;
        let sequence = issue.id.sequence();
        if let Some(sequence) = sequence {
            collection.sequence = previous.max(sequence);
        }
        collection.issues.push(issue.clone());
        if let Err(err) = self.persist(&collection).await {
            collection.issues.pop();
            // the id was the latest reservation: hand it out again
            collection.sequence = match sequence {
                Some(sequence) if sequence == previous => previous.saturating_sub(1),
                _ => previous,
            };
            return Err(err);
        }
        Ok(issue)
    }

    async fn find_all_sorted(&self) -> StoreResult<Vec<Issue>> {
        let collection = self.collection.read().await;
        let mut issues = collection.issues.clone();
        // stable: equal timestamps keep insertion order
        issues.sort_by(|a, b| b.date_reported.cmp(&a.date_reported));
        Ok(issues)
    }

    async fn find(&self, filter: &IssueFilter) -> StoreResult<Vec<Issue>> {
        let collection = self.collection.read().await;
        Ok(collection
            .issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .cloned()
            .collect())
    }

    async fn count(&self, filter: &IssueFilter) -> StoreResult<u64> {
        let collection = self.collection.read().await;
        Ok(collection
            .issues
            .iter()
            .filter(|issue| filter.matches(issue))
            .count() as u64)
    }

    async fn find_one_and_update(
        &self,
        id: &IssueId,
        fields: IssueFields,
    ) -> StoreResult<Option<Issue>> {
        let mut collection = self.collection.write().await;
        let Some(index) = collection.issues.iter().position(|issue| issue.id == *id) else {
            return Ok(None);
        };

        let previous = collection.issues[index].clone();
        collection.issues[index].apply(fields);
        if let Err(err) = self.persist(&collection).await {
            collection.issues[index] = previous;
            return Err(err);
        }
        Ok(Some(collection.issues[index].clone()))
    }
}
