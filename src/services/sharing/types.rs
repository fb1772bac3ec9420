/*
 * Responsibility
 * - resource (workflow / template) に埋め込まれた共有設定の型
 * - 計算済みのアクセス権 (owner ⇒ writeable ⇒ readable) の型
 */
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    User,
    Mail,
    Group,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShareRole {
    Owner,
    Contributor,
    Reader,
}

/// Explicit grant of a role to one subject on one resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleBinding {
    pub subject_type: SubjectType,
    pub subject_id: String,
    pub role: ShareRole,
}

impl RoleBinding {
    #[cfg(test)]
    pub fn new(subject_type: SubjectType, subject_id: impl Into<String>, role: ShareRole) -> Self {
        Self {
            subject_type,
            subject_id: subject_id.into(),
            role,
        }
    }
}

/// Sharing configuration stored with a resource.
///
/// Binding order is significant (first match wins) and must survive storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SharePolicy {
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub public_writeable: bool,
    #[serde(default)]
    pub bindings: Vec<RoleBinding>,
}

/// Access grant for one caller on one resource.
///
/// Fields are private: every constructor closes the chain
/// `is_owner ⇒ is_writeable ⇒ is_readable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAccess {
    is_owner: bool,
    is_writeable: bool,
    is_readable: bool,
}

impl ResourceAccess {
    pub fn from_grants(owner: bool, write: bool, read: bool) -> Self {
        let is_writeable = owner || write;
        Self {
            is_owner: owner,
            is_writeable,
            is_readable: is_writeable || read,
        }
    }

    pub fn read_only() -> Self {
        Self::from_grants(false, false, true)
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn is_writeable(&self) -> bool {
        self.is_writeable
    }

    pub fn is_readable(&self) -> bool {
        self.is_readable
    }
}
