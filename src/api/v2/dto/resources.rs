/*
 * Responsibility
 * - Workflow / Template の request/response DTO
 * - validation (形式チェック) 用の validate() を持たせる
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::repos::{Page, ResourceRecord};
use crate::services::sharing::{ResourceAccess, SharePolicy};

const MAX_NAME_LEN: usize = 256;

const DEFAULT_PAGE_LIMIT: i64 = 50;
const MAX_PAGE_LIMIT: i64 = 100;

/// `?limit=&offset=` for listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    pub fn page(&self) -> Result<Page, &'static str> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
            return Err("limit must be between 1 and 100");
        }
        let offset = self.offset.unwrap_or(0);
        if offset < 0 {
            return Err("offset must be >= 0");
        }
        Ok(Page { limit, offset })
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateResourceRequest {
    pub name: String,
    #[serde(default)]
    pub body: serde_json::Value,
    #[serde(default)]
    pub share: Option<SharePolicy>,
}

impl CreateResourceRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.name.trim().is_empty() {
            return Err("name is required");
        }
        if self.name.chars().count() > MAX_NAME_LEN {
            return Err("name must be <= 256 chars");
        }
        if let Some(share) = &self.share {
            validate_share(share)?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateResourceRequest {
    pub name: Option<String>,
    pub body: Option<serde_json::Value>,
}

impl UpdateResourceRequest {
    pub fn validate(&self) -> Result<(), &'static str> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("name cannot be empty");
        }
        if let Some(name) = &self.name
            && name.chars().count() > MAX_NAME_LEN
        {
            return Err("name must be <= 256 chars");
        }
        Ok(())
    }
}

pub fn validate_share(share: &SharePolicy) -> Result<(), &'static str> {
    if share
        .bindings
        .iter()
        .any(|b| b.subject_id.trim().is_empty())
    {
        return Err("binding subjectId is required");
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub body: serde_json::Value,
    pub share: SharePolicy,
    pub access: ResourceAccess,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ResourceResponse {
    pub fn new(row: ResourceRecord, access: ResourceAccess) -> Self {
        Self {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            body: row.body,
            share: row.share,
            access,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::sharing::{RoleBinding, ShareRole, SubjectType};

    #[test]
    fn create_requires_name() {
        let req: CreateResourceRequest = serde_json::from_str(r#"{ "name": "  " }"#).unwrap();
        assert!(req.validate().is_err());

        let req: CreateResourceRequest = serde_json::from_str(r#"{ "name": "flow" }"#).unwrap();
        assert!(req.validate().is_ok());
        assert!(req.body.is_null());
        assert!(req.share.is_none());
    }

    #[test]
    fn name_limit_counts_chars() {
        // 256 three-byte chars: 768 bytes, still within the limit
        let name = "ワ".repeat(MAX_NAME_LEN);
        let req = CreateResourceRequest {
            name: name.clone(),
            body: serde_json::Value::Null,
            share: None,
        };
        assert!(req.validate().is_ok());
        let req = UpdateResourceRequest {
            name: Some(name),
            body: None,
        };
        assert!(req.validate().is_ok());

        let req = CreateResourceRequest {
            name: "ワ".repeat(MAX_NAME_LEN + 1),
            body: serde_json::Value::Null,
            share: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn list_query_defaults_and_bounds() {
        let page = ListQuery::default().page().unwrap();
        assert_eq!(page, Page { limit: 50, offset: 0 });

        let q = ListQuery { limit: Some(101), offset: None };
        assert!(q.page().is_err());
        let q = ListQuery { limit: Some(0), offset: None };
        assert!(q.page().is_err());
        let q = ListQuery { limit: Some(10), offset: Some(-1) };
        assert!(q.page().is_err());
    }

    #[test]
    fn share_bindings_need_subject() {
        let share = SharePolicy {
            bindings: vec![RoleBinding::new(SubjectType::User, " ", ShareRole::Reader)],
            ..SharePolicy::default()
        };
        assert!(validate_share(&share).is_err());
    }
}
