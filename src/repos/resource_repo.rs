//! Resource store interface used by the resource-loading middleware and handlers.
//!
//! Workflows and templates share one shape: an owner, a JSON document and an
//! embedded `SharePolicy`. How they are stored is up to the implementation.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::repos::error::RepoResult;
use crate::services::auth::Identity;
use crate::services::sharing::SharePolicy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Workflow,
    Template,
}

impl ResourceKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::Workflow => "workflows",
            Self::Template => "templates",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Workflow => "workflow",
            Self::Template => "template",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRecord {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub body: serde_json::Value,
    pub share: SharePolicy,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewResource {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub body: serde_json::Value,
    pub share: SharePolicy,
}

/// `LIMIT` / `OFFSET` window for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

/// Partial update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct ResourceChanges {
    pub name: Option<String>,
    pub body: Option<serde_json::Value>,
}

/// Implementations must be cheap to share (`Arc<dyn ResourceStore>` in `AppState`).
#[async_trait]
pub trait ResourceStore: Send + Sync + 'static {
    // Returns the backend name (for logging).
    fn backend_name(&self) -> &'static str;

    async fn find(&self, kind: ResourceKind, id: &str) -> RepoResult<Option<ResourceRecord>>;

    // Newest first, narrowed to rows `viewer` can read (owner, binding or public).
    async fn list(
        &self,
        kind: ResourceKind,
        viewer: &Identity,
        page: Page,
    ) -> RepoResult<Vec<ResourceRecord>>;

    async fn insert(&self, kind: ResourceKind, new: NewResource) -> RepoResult<ResourceRecord>;

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        changes: ResourceChanges,
    ) -> RepoResult<Option<ResourceRecord>>;

    // Replaces the whole policy; binding order is kept as given.
    async fn set_share(
        &self,
        kind: ResourceKind,
        id: &str,
        share: SharePolicy,
    ) -> RepoResult<Option<ResourceRecord>>;

    async fn delete(&self, kind: ResourceKind, id: &str) -> RepoResult<bool>;
}
