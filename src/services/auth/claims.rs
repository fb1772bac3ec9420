/*
 * Responsibility
 * - Claims (動的な map) → Identity への変換を一箇所に閉じ込める
 * - 欠損・型違いの claim は黙って無視する (エラーにしない)
 */
use serde::Serialize;
use serde_json::Value;

use crate::services::auth::token::Claims;

/// The resolved caller for the current request.
///
/// An empty or missing `subject` means "anonymous".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub subject: Option<String>,
    pub roles: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Identity {
    #[cfg(test)]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn user(subject: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn with_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles = roles.into_iter().map(Into::into).collect();
        self
    }

    #[cfg(test)]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// The subject id, if the caller is authenticated.
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref().filter(|s| !s.is_empty())
    }

    pub fn is_anonymous(&self) -> bool {
        self.subject().is_none()
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// `sub` wins; `userId` is the legacy fallback. Empty when neither is a non-empty string.
pub fn extract_user_id(claims: &Claims) -> String {
    non_empty_str(claims, "sub")
        .or_else(|| non_empty_str(claims, "userId"))
        .unwrap_or_default()
        .to_string()
}

/// String elements of the `roles` array, in order.
///
/// `None` when the claim is absent or not an array; an explicit `[]` gives `Some(vec![])`.
pub fn extract_roles(claims: &Claims) -> Option<Vec<String>> {
    let Value::Array(items) = claims.get("roles")? else {
        return None;
    };

    Some(
        items
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

pub fn extract_email(claims: &Claims) -> Option<String> {
    non_empty_str(claims, "email").map(str::to_string)
}

fn non_empty_str<'a>(claims: &'a Claims, key: &str) -> Option<&'a str> {
    claims
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(value: Value) -> Claims {
        match value {
            Value::Object(map) => map,
            _ => panic!("claims must be an object"),
        }
    }

    #[test]
    fn sub_is_preferred_over_user_id() {
        let c = claims(json!({ "sub": "from-sub", "userId": "from-user-id" }));
        assert_eq!(extract_user_id(&c), "from-sub");
    }

    #[test]
    fn user_id_is_used_when_sub_is_empty_or_missing() {
        assert_eq!(
            extract_user_id(&claims(json!({ "sub": "", "userId": "legacy" }))),
            "legacy"
        );
        assert_eq!(
            extract_user_id(&claims(json!({ "userId": "legacy" }))),
            "legacy"
        );
        assert_eq!(
            extract_user_id(&claims(json!({ "sub": 42, "userId": "legacy" }))),
            "legacy"
        );
    }

    #[test]
    fn non_string_subjects_yield_empty() {
        for value in [json!(7), json!(true), json!(["u1"]), json!({ "id": "u1" }), Value::Null] {
            let c = claims(json!({ "sub": value.clone(), "userId": value }));
            assert_eq!(extract_user_id(&c), "");
        }
        assert_eq!(extract_user_id(&Claims::new()), "");
    }

    #[test]
    fn roles_keep_only_strings_in_order() {
        let c = claims(json!({ "roles": ["admin", 1, "subscriber", null, true, {"x": 1}, "beta"] }));
        assert_eq!(
            extract_roles(&c),
            Some(vec![
                "admin".to_string(),
                "subscriber".to_string(),
                "beta".to_string()
            ])
        );
    }

    #[test]
    fn absent_roles_differ_from_empty_roles() {
        assert_eq!(extract_roles(&Claims::new()), None);
        assert_eq!(extract_roles(&claims(json!({ "roles": "admin" }))), None);
        assert_eq!(extract_roles(&claims(json!({ "roles": [] }))), Some(vec![]));
        assert_eq!(extract_roles(&claims(json!({ "roles": [1, 2] }))), Some(vec![]));
    }

    #[test]
    fn email_requires_non_empty_string() {
        assert_eq!(
            extract_email(&claims(json!({ "email": "a@example.com" }))),
            Some("a@example.com".to_string())
        );
        assert_eq!(extract_email(&claims(json!({ "email": "" }))), None);
        assert_eq!(extract_email(&claims(json!({ "email": 3 }))), None);
    }

    #[test]
    fn empty_subject_is_anonymous() {
        assert!(Identity::anonymous().is_anonymous());
        assert!(Identity::user("").is_anonymous());
        assert!(!Identity::user("u1").is_anonymous());
    }
}
