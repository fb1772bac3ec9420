/*
 * Responsibility
 * - workflows / templates テーブル向け SQLx 操作
 * - share policy は public / publicWriteable 列 + shares (JSONB 配列) に保存する
 *   - JSONB 配列なので binding の順序はそのまま保たれる
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use crate::repos::error::{RepoError, RepoResult};
use crate::repos::resource_repo::{
    NewResource, Page, ResourceChanges, ResourceKind, ResourceRecord, ResourceStore,
};
use crate::services::auth::Identity;
use crate::services::sharing::{RoleBinding, SharePolicy};

const COLUMNS: &str = r#"id, "ownerId", name, body, public, "publicWriteable", shares, "createdAt", "updatedAt""#;

#[derive(Debug, FromRow)]
struct ResourceRow {
    id: String,
    #[sqlx(rename = "ownerId")]
    owner_id: String,
    name: String,
    body: Json<serde_json::Value>,
    public: bool,
    #[sqlx(rename = "publicWriteable")]
    public_writeable: bool,
    shares: Json<Vec<RoleBinding>>,
    #[sqlx(rename = "createdAt")]
    created_at: DateTime<Utc>,
    #[sqlx(rename = "updatedAt")]
    updated_at: DateTime<Utc>,
}

impl From<ResourceRow> for ResourceRecord {
    fn from(row: ResourceRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            body: row.body.0,
            share: SharePolicy {
                public: row.public,
                public_writeable: row.public_writeable,
                bindings: row.shares.0,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PgResourceStore {
    db: PgPool,
}

impl PgResourceStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ResourceStore for PgResourceStore {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn find(&self, kind: ResourceKind, id: &str) -> RepoResult<Option<ResourceRecord>> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE id = $1", kind.table());

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list(
        &self,
        kind: ResourceKind,
        viewer: &Identity,
        page: Page,
    ) -> RepoResult<Vec<ResourceRecord>> {
        // Coarse visibility in SQL; callers still run the resolver on each row.
        // Anonymous viewers bind NULL / an empty array and only see public rows.
        let sql = format!(
            r#"
            SELECT {COLUMNS} FROM {}
            WHERE public
               OR ($1::text IS NOT NULL AND "publicWriteable")
               OR "ownerId" = $1
               OR EXISTS (
                   SELECT 1 FROM jsonb_array_elements(shares) AS b
                   WHERE (b->>'subjectType' = 'user' AND b->>'subjectId' = $1)
                      OR (b->>'subjectType' = 'mail' AND lower(b->>'subjectId') = lower($2))
                      OR (b->>'subjectType' = 'group' AND b->>'subjectId' = ANY($3))
               )
            ORDER BY "createdAt" DESC, id
            LIMIT $4 OFFSET $5
            "#,
            kind.table()
        );

        let subject = viewer.subject();
        let roles: &[String] = if subject.is_some() { &viewer.roles } else { &[] };

        let rows = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(subject)
            .bind(subject.and(viewer.email.as_deref()))
            .bind(roles)
            .bind(page.limit)
            .bind(page.offset)
            .fetch_all(&self.db)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn insert(&self, kind: ResourceKind, new: NewResource) -> RepoResult<ResourceRecord> {
        let sql = format!(
            r#"
            INSERT INTO {} (id, "ownerId", name, body, public, "publicWriteable", shares)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {COLUMNS}
            "#,
            kind.table()
        );

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(&new.id)
            .bind(&new.owner_id)
            .bind(&new.name)
            .bind(Json(&new.body))
            .bind(new.share.public)
            .bind(new.share.public_writeable)
            .bind(Json(&new.share.bindings))
            .fetch_one(&self.db)
            .await
            .map_err(RepoError::from_sqlx)?;

        Ok(row.into())
    }

    async fn update(
        &self,
        kind: ResourceKind,
        id: &str,
        changes: ResourceChanges,
    ) -> RepoResult<Option<ResourceRecord>> {
        let sql = format!(
            r#"
            UPDATE {}
            SET
                name = COALESCE($2, name),
                body = COALESCE($3, body),
                "updatedAt" = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
            kind.table()
        );

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(id)
            .bind(changes.name)
            .bind(changes.body.map(Json))
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn set_share(
        &self,
        kind: ResourceKind,
        id: &str,
        share: SharePolicy,
    ) -> RepoResult<Option<ResourceRecord>> {
        let sql = format!(
            r#"
            UPDATE {}
            SET
                public = $2,
                "publicWriteable" = $3,
                shares = $4,
                "updatedAt" = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#,
            kind.table()
        );

        let row = sqlx::query_as::<_, ResourceRow>(&sql)
            .bind(id)
            .bind(share.public)
            .bind(share.public_writeable)
            .bind(Json(share.bindings))
            .fetch_optional(&self.db)
            .await?;

        Ok(row.map(Into::into))
    }

    async fn delete(&self, kind: ResourceKind, id: &str) -> RepoResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", kind.table());

        let result = sqlx::query(&sql).bind(id).execute(&self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}
