//! Resource access resolution.
//!
//! Given the caller identity (possibly anonymous), the resource owner id and the
//! resource's `SharePolicy`, compute the `ResourceAccess` grant. Only the read
//! fast-path and read denial are enforced here; handlers decide what a mutating
//! method needs from the grant.

use axum::http::Method;
use thiserror::Error;

use crate::services::auth::Identity;
use crate::services::sharing::types::{
    ResourceAccess, RoleBinding, ShareRole, SharePolicy, SubjectType,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("authentication required")]
    AuthenticationRequired,
    #[error("access denied")]
    AccessDenied,
}

/// Idempotent retrieval methods.
pub fn is_read_method(method: &Method) -> bool {
    method == Method::GET || method == Method::HEAD
}

pub fn resolve(
    identity: &Identity,
    owner_id: &str,
    policy: &SharePolicy,
    method: &Method,
) -> Result<ResourceAccess, AccessError> {
    let read = is_read_method(method);

    let Some(caller_id) = identity.subject() else {
        if read && policy.public {
            return Ok(ResourceAccess::read_only());
        }
        return Err(AccessError::AuthenticationRequired);
    };

    let role = find_binding(identity, &policy.bindings).map(|b| b.role);

    // owner by id wins over whatever binding the caller also holds
    let owner = caller_id == owner_id || role == Some(ShareRole::Owner);
    let write = role == Some(ShareRole::Contributor) || policy.public_writeable;
    let reader = role == Some(ShareRole::Reader) || policy.public;

    let access = ResourceAccess::from_grants(owner, write, reader);

    if read && !access.is_readable() {
        return Err(AccessError::AccessDenied);
    }

    Ok(access)
}

/// First binding naming the caller. Bindings are not deduplicated.
pub fn find_binding<'a>(identity: &Identity, bindings: &'a [RoleBinding]) -> Option<&'a RoleBinding> {
    bindings.iter().find(|b| binding_matches(identity, b))
}

fn binding_matches(identity: &Identity, binding: &RoleBinding) -> bool {
    match binding.subject_type {
        SubjectType::User => identity.subject() == Some(binding.subject_id.as_str()),
        SubjectType::Mail => identity
            .email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(&binding.subject_id)),
        SubjectType::Group => identity.has_role(&binding.subject_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(subject_type: SubjectType, id: &str, role: ShareRole) -> RoleBinding {
        RoleBinding::new(subject_type, id, role)
    }

    fn policy(public: bool, public_writeable: bool, bindings: Vec<RoleBinding>) -> SharePolicy {
        SharePolicy {
            public,
            public_writeable,
            bindings,
        }
    }

    #[test]
    fn anonymous_get_on_public_resource_is_read_only() {
        let access = resolve(
            &Identity::anonymous(),
            "u1",
            &policy(true, false, vec![]),
            &Method::GET,
        )
        .unwrap();
        assert_eq!(access, ResourceAccess::from_grants(false, false, true));
        assert!(!access.is_owner());
        assert!(!access.is_writeable());
        assert!(access.is_readable());
    }

    #[test]
    fn anonymous_is_rejected_otherwise() {
        let anon = Identity::anonymous();
        assert_eq!(
            resolve(&anon, "u1", &policy(false, false, vec![]), &Method::GET),
            Err(AccessError::AuthenticationRequired)
        );
        assert_eq!(
            resolve(&anon, "u1", &policy(true, true, vec![]), &Method::PUT),
            Err(AccessError::AuthenticationRequired)
        );
        assert_eq!(
            resolve(&Identity::user(""), "", &policy(false, false, vec![]), &Method::GET),
            Err(AccessError::AuthenticationRequired)
        );
    }

    #[test]
    fn owner_by_id_wins_over_reader_binding() {
        let p = policy(
            false,
            false,
            vec![binding(SubjectType::User, "u1", ShareRole::Reader)],
        );
        let access = resolve(&Identity::user("u1"), "u1", &p, &Method::GET).unwrap();
        assert!(access.is_owner());
        assert!(access.is_writeable());
    }

    #[test]
    fn first_matching_binding_wins() {
        let p = policy(
            false,
            false,
            vec![
                binding(SubjectType::User, "u2", ShareRole::Reader),
                binding(SubjectType::User, "u2", ShareRole::Owner),
            ],
        );
        let access = resolve(&Identity::user("u2"), "u1", &p, &Method::GET).unwrap();
        assert!(!access.is_owner());
        assert!(!access.is_writeable());
        assert!(access.is_readable());
    }

    #[test]
    fn role_bindings_map_to_tiers() {
        let p = policy(
            false,
            false,
            vec![
                binding(SubjectType::User, "owner", ShareRole::Owner),
                binding(SubjectType::User, "contrib", ShareRole::Contributor),
                binding(SubjectType::User, "reader", ShareRole::Reader),
            ],
        );

        let owner = resolve(&Identity::user("owner"), "u1", &p, &Method::PUT).unwrap();
        assert_eq!(owner, ResourceAccess::from_grants(true, true, true));

        let contrib = resolve(&Identity::user("contrib"), "u1", &p, &Method::PUT).unwrap();
        assert_eq!(contrib, ResourceAccess::from_grants(false, true, true));

        let reader = resolve(&Identity::user("reader"), "u1", &p, &Method::PUT).unwrap();
        assert_eq!(reader, ResourceAccess::from_grants(false, false, true));
    }

    #[test]
    fn stranger_cannot_read_private_resource() {
        assert_eq!(
            resolve(
                &Identity::user("u9"),
                "u1",
                &policy(false, false, vec![]),
                &Method::GET
            ),
            Err(AccessError::AccessDenied)
        );
    }

    #[test]
    fn stranger_on_mutation_gets_empty_grant_for_handler_to_enforce() {
        let access = resolve(
            &Identity::user("u9"),
            "u1",
            &policy(false, false, vec![]),
            &Method::DELETE,
        )
        .unwrap();
        assert!(!access.is_readable());
    }

    #[test]
    fn public_writeable_grants_write_to_any_authenticated_caller() {
        let access = resolve(
            &Identity::user("u9"),
            "u1",
            &policy(false, true, vec![]),
            &Method::PATCH,
        )
        .unwrap();
        assert!(!access.is_owner());
        assert!(access.is_writeable());
        assert!(access.is_readable());
    }

    #[test]
    fn mail_and_group_bindings_match() {
        let p = policy(
            false,
            false,
            vec![
                binding(SubjectType::Mail, "Team@Example.com", ShareRole::Contributor),
                binding(SubjectType::Group, "editors", ShareRole::Owner),
            ],
        );

        let by_mail = Identity::user("u2").with_email("team@example.com");
        assert!(resolve(&by_mail, "u1", &p, &Method::GET).unwrap().is_writeable());

        let by_group = Identity::user("u3").with_roles(["subscriber", "editors"]);
        assert!(resolve(&by_group, "u1", &p, &Method::GET).unwrap().is_owner());

        // a user binding never matches by email or role
        let p = policy(
            false,
            false,
            vec![binding(SubjectType::User, "editors", ShareRole::Owner)],
        );
        assert_eq!(
            resolve(&by_group, "u1", &p, &Method::GET),
            Err(AccessError::AccessDenied)
        );
    }

    #[test]
    fn privilege_chain_holds_for_every_combination() {
        let roles = [None, Some(ShareRole::Owner), Some(ShareRole::Contributor), Some(ShareRole::Reader)];
        let methods = [Method::GET, Method::HEAD, Method::PUT, Method::DELETE];

        for public in [false, true] {
            for public_writeable in [false, true] {
                for role in roles {
                    for is_owner_id in [false, true] {
                        for method in &methods {
                            let bindings = role
                                .map(|r| vec![binding(SubjectType::User, "me", r)])
                                .unwrap_or_default();
                            let p = policy(public, public_writeable, bindings);
                            let owner_id = if is_owner_id { "me" } else { "someone" };

                            if let Ok(a) = resolve(&Identity::user("me"), owner_id, &p, method) {
                                assert!(!a.is_owner() || a.is_writeable());
                                assert!(!a.is_writeable() || a.is_readable());
                                if is_owner_id {
                                    assert!(a.is_owner());
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}
