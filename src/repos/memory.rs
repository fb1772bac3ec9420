use std::collections::HashMap;

use async_trait::async_trait;
use axum::http::Method;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource_repo::{
    NewResource, Page, ResourceChanges, ResourceKind, ResourceRecord, ResourceStore,
};
use crate::services::auth::Identity;
use crate::services::sharing::{self, SharePolicy};

/// Process-local store, used when no `DATABASE_URL` is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryResourceStore {
    items: RwLock<HashMap<(ResourceKind, String), ResourceRecord>>,
}

impl MemoryResourceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResourceStore for MemoryResourceStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, kind: ResourceKind, id: &str) -> RepoResult<Option<ResourceRecord>> {
        let items = self.items.read().await;
        Ok(items.get(&(kind, id.to_string())).cloned())
    }

    async fn list(
        &self,
        kind: ResourceKind,
        viewer: &Identity,
        page: Page,
    ) -> RepoResult<Vec<ResourceRecord>> {
        let items = self.items.read().await;
        let mut rows: Vec<&ResourceRecord> = items
            .iter()
            .filter(|((k, _), r)| {
                *k == kind
                    && sharing::resolve(viewer, &r.owner_id, &r.share, &Method::GET).is_ok()
            })
            .map(|(_, r)| r)
            .collect();

        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));

        let offset = usize::try_from(page.offset).unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(0);
        Ok(rows.into_iter().skip(offset).take(limit).cloned().collect())
    }

    async fn insert(&self, kind: ResourceKind, new: NewResource) -> RepoResult<ResourceRecord> {
        let mut items = self.items.write().await;
        let key = (kind, new.id.clone());
        if items.contains_key(&key) {
            return Err(RepoError::Conflict(new.id));
        }

        let now = Utc::now();
        let record = ResourceRecord {
            id: new.id,
            owner_id: new.owner_id,
            name: new.name,
            body: new.body,
            share: new.share,
            created_at: now,
            updated_at: now,
        };
        items.insert(key, record.clone());

        Ok(record)
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        changes: ResourceChanges,
    ) -> RepoResult<Option<ResourceRecord>> {
        let mut items = self.items.write().await;
        let Some(record) = items.get_mut(&(kind, id.to_string())) else {
            return Ok(None);
        };

        if let Some(name) = changes.name {
            record.name = name;
        }
        if let Some(body) = changes.body {
            record.body = body;
        }
        record.updated_at = Utc::now();

        Ok(Some(record.clone()))
    }

    async fn set_share(
        &self,
        kind: ResourceKind,
        id: &str,
        share: SharePolicy,
    ) -> RepoResult<Option<ResourceRecord>> {
        let mut items = self.items.write().await;
        let Some(record) = items.get_mut(&(kind, id.to_string())) else {
            return Ok(None);
        };

        record.share = share;
        record.updated_at = Utc::now();

        Ok(Some(record.clone()))
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> RepoResult<bool> {
        let mut items = self.items.write().await;
        Ok(items.remove(&(kind, id.to_string())).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sharing::{RoleBinding, ShareRole, SubjectType};
    use serde_json::json;

    const PAGE: Page = Page {
        limit: 50,
        offset: 0,
    };

    fn new_resource(id: &str) -> NewResource {
        NewResource {
            id: id.into(),
            owner_id: "u1".into(),
            name: "flow".into(),
            body: json!({ "nodes": [] }),
            share: SharePolicy::default(),
        }
    }

    #[tokio::test]
    async fn kinds_are_separate_namespaces() {
        let store = MemoryResourceStore::new();
        store
            .insert(ResourceKind::Workflow, new_resource("r1"))
            .await
            .unwrap();

        assert!(store.find(ResourceKind::Workflow, "r1").await.unwrap().is_some());
        assert!(store.find(ResourceKind::Template, "r1").await.unwrap().is_none());
        let owner = Identity::user("u1");
        assert!(
            store
                .list(ResourceKind::Template, &owner, PAGE)
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn list_only_returns_readable_rows() {
        let store = MemoryResourceStore::new();
        store
            .insert(ResourceKind::Workflow, new_resource("own"))
            .await
            .unwrap();

        let mut shared = new_resource("shared");
        shared.owner_id = "u9".into();
        shared.share.bindings = vec![RoleBinding::new(SubjectType::User, "u1", ShareRole::Reader)];
        store.insert(ResourceKind::Workflow, shared).await.unwrap();

        let mut public = new_resource("public");
        public.owner_id = "u9".into();
        public.share.public = true;
        store.insert(ResourceKind::Workflow, public).await.unwrap();

        let mut private = new_resource("private");
        private.owner_id = "u9".into();
        store.insert(ResourceKind::Workflow, private).await.unwrap();

        let ids = |rows: Vec<ResourceRecord>| {
            let mut ids: Vec<String> = rows.into_iter().map(|r| r.id).collect();
            ids.sort();
            ids
        };

        let rows = store
            .list(ResourceKind::Workflow, &Identity::user("u1"), PAGE)
            .await
            .unwrap();
        assert_eq!(ids(rows), vec!["own", "public", "shared"]);

        let rows = store
            .list(ResourceKind::Workflow, &Identity::anonymous(), PAGE)
            .await
            .unwrap();
        assert_eq!(ids(rows), vec!["public"]);
    }

    #[tokio::test]
    async fn list_applies_limit_and_offset() {
        let store = MemoryResourceStore::new();
        for id in ["a", "b", "c"] {
            store
                .insert(ResourceKind::Workflow, new_resource(id))
                .await
                .unwrap();
        }
        let owner = Identity::user("u1");

        let all = store
            .list(ResourceKind::Workflow, &owner, PAGE)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let window = store
            .list(
                ResourceKind::Workflow,
                &owner,
                Page {
                    limit: 1,
                    offset: 1,
                },
            )
            .await
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].id, all[1].id);
    }

    #[tokio::test]
    async fn duplicate_id_is_a_conflict() {
        let store = MemoryResourceStore::new();
        store
            .insert(ResourceKind::Workflow, new_resource("r1"))
            .await
            .unwrap();

        let err = store
            .insert(ResourceKind::Workflow, new_resource("r1"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Conflict(id) if id == "r1"));
    }

    #[tokio::test]
    async fn set_share_keeps_binding_order() {
        let store = MemoryResourceStore::new();
        store
            .insert(ResourceKind::Template, new_resource("t1"))
            .await
            .unwrap();

        let bindings = vec![
            RoleBinding::new(SubjectType::User, "u2", ShareRole::Reader),
            RoleBinding::new(SubjectType::User, "u2", ShareRole::Owner),
        ];
        let updated = store
            .set_share(
                ResourceKind::Template,
                "t1",
                SharePolicy {
                    public: false,
                    public_writeable: false,
                    bindings: bindings.clone(),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.share.bindings, bindings);
    }

    #[tokio::test]
    async fn update_and_delete_missing_rows() {
        let store = MemoryResourceStore::new();
        assert!(
            store
                .update(ResourceKind::Workflow, "nope", ResourceChanges::default())
                .await
                .unwrap()
                .is_none()
        );
        assert!(!store.delete(ResourceKind::Workflow, "nope").await.unwrap());
    }
}
