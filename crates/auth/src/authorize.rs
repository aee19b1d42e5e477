use std::collections::BTreeSet;

use serde::Serialize;
use thiserror::Error;

use notekeep_core::UserId;

use crate::{Permission, Principal, Role, RolePermissions};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing permission '{0}'")]
    Forbidden(String),
}

/// Access requirement declared on an operation.
///
/// Every protected route states one of these explicitly; nothing is inferred
/// from the absence of a permission.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Access {
    /// Any caller with a valid credential.
    Authenticated,
    /// The credential must carry exactly this permission claim.
    Permission(Permission),
}

impl Access {
    pub fn permission(permission: Permission) -> Self {
        Self::Permission(permission)
    }
}

impl core::fmt::Display for Access {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Access::Authenticated => f.write_str("authenticated"),
            Access::Permission(p) => write!(f, "permission:{p}"),
        }
    }
}

/// Gate: allow iff the principal carries a permission claim equal to
/// `required`.
///
/// - No IO
/// - No panics
/// - No wildcard or hierarchy
pub fn authorize(principal: &Principal, required: &Permission) -> Result<(), AuthzError> {
    if principal.has_permission(required) {
        Ok(())
    } else {
        Err(AuthzError::Forbidden(required.as_str().to_string()))
    }
}

/// Evaluate an operation's declared [`Access`] for a principal.
pub fn check_access(principal: &Principal, access: &Access) -> Result<(), AuthzError> {
    match access {
        Access::Authenticated => Ok(()),
        Access::Permission(required) => authorize(principal, required),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authorization Explanation (Audit Trail)
// ─────────────────────────────────────────────────────────────────────────────

/// Detailed explanation of an authorization decision.
///
/// Answers "why was this request allowed/denied?" without changing the
/// decision itself, which is always [`authorize`].
#[derive(Debug, Clone, Serialize)]
pub struct AuthorizationExplanation {
    pub required_permission: String,
    pub granted: bool,
    pub reason: String,
    pub principal: PrincipalState,
    pub denial_reason: Option<DenialReason>,
}

/// Snapshot of the principal being checked.
#[derive(Debug, Clone, Serialize)]
pub struct PrincipalState {
    pub user_id: UserId,
    pub role: Role,
    pub effective_permissions: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DenialReason {
    pub kind: DenialKind,
    pub message: String,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialKind {
    MissingPermission,
    /// The role table grants it now, but the credential predates that grant
    /// (or a role change) and still carries the old claim set.
    StaleCredential,
}

pub fn explain_authorization(
    principal: &Principal,
    required: &Permission,
    mapping: &RolePermissions,
) -> AuthorizationExplanation {
    let required_str = required.as_str();

    let effective: BTreeSet<String> = principal
        .permissions
        .iter()
        .map(|p| p.as_str().to_string())
        .collect();
    let state = PrincipalState {
        user_id: principal.user_id,
        role: principal.role,
        effective_permissions: effective.into_iter().collect(),
    };

    if authorize(principal, required).is_ok() {
        return AuthorizationExplanation {
            required_permission: required_str.to_string(),
            granted: true,
            reason: format!("Credential carries permission '{required_str}'"),
            principal: state,
            denial_reason: None,
        };
    }

    let granting_roles = mapping.roles_granting(required);
    let denial = if granting_roles.contains(&principal.role) {
        DenialReason {
            kind: DenialKind::StaleCredential,
            message: format!(
                "Role {} grants '{required_str}' but the credential was issued without it",
                principal.role
            ),
            suggestions: vec!["Sign in again to obtain a credential with the current grants".to_string()],
        }
    } else {
        let mut suggestions = Vec::new();
        if granting_roles.is_empty() {
            suggestions.push(format!("No role grants '{required_str}'; update the role mapping"));
        } else {
            let names: Vec<&str> = granting_roles.iter().map(Role::as_str).collect();
            suggestions.push(format!(
                "Ask an administrator for one of the roles granting it: {}",
                names.join(", ")
            ));
        }
        DenialReason {
            kind: DenialKind::MissingPermission,
            message: format!("Missing required permission: '{required_str}'"),
            suggestions,
        }
    };

    AuthorizationExplanation {
        required_permission: required_str.to_string(),
        granted: false,
        reason: format!(
            "Credential does not carry permission '{required_str}'. Current permissions: {:?}",
            state.effective_permissions
        ),
        principal: state,
        denial_reason: Some(denial),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use proptest::prelude::*;

    use super::*;
    use crate::permissions::{catalogue, notes, reminders, users};

    fn principal_with(role: Role, mapping: &RolePermissions) -> Principal {
        let now = Utc::now();
        Principal {
            user_id: UserId::new(1),
            name: "alice".to_string(),
            role,
            permissions: mapping.permissions_for(role).to_vec(),
            issued_at: now,
            expires_at: now + Duration::hours(2),
        }
    }

    #[test]
    fn user_cannot_manage_users() {
        let mapping = RolePermissions::default();
        let user = principal_with(Role::User, &mapping);
        assert_eq!(
            authorize(&user, &users::MANAGE),
            Err(AuthzError::Forbidden("Permissions.Users.Manage".to_string()))
        );
    }

    #[test]
    fn user_can_view_notes() {
        let mapping = RolePermissions::default();
        assert_eq!(authorize(&principal_with(Role::User, &mapping), &notes::VIEW), Ok(()));
    }

    #[test]
    fn manage_does_not_imply_view() {
        let mapping = RolePermissions::builder().grant(Role::User, [notes::MANAGE]).build();
        let user = principal_with(Role::User, &mapping);
        assert!(authorize(&user, &notes::MANAGE).is_ok());
        assert!(authorize(&user, &notes::VIEW).is_err());
    }

    #[test]
    fn empty_role_denies_everything() {
        let mapping = RolePermissions::builder().grant(Role::Admin, [users::VIEW]).build();
        let user = principal_with(Role::User, &mapping);
        for permission in catalogue() {
            assert!(authorize(&user, &permission).is_err());
        }
    }

    #[test]
    fn authenticated_access_needs_no_permission() {
        let mapping = RolePermissions::builder().build();
        let nobody = principal_with(Role::User, &mapping);
        assert_eq!(check_access(&nobody, &Access::Authenticated), Ok(()));
        assert!(check_access(&nobody, &Access::permission(reminders::VIEW)).is_err());
    }

    #[test]
    fn explanation_points_at_granting_roles() {
        let mapping = RolePermissions::default();
        let user = principal_with(Role::User, &mapping);
        let explanation = explain_authorization(&user, &users::MANAGE, &mapping);
        assert!(!explanation.granted);
        let denial = explanation.denial_reason.unwrap();
        assert_eq!(denial.kind, DenialKind::MissingPermission);
        assert!(denial.suggestions[0].contains("Admin"));
    }

    #[test]
    fn explanation_detects_stale_credentials() {
        let mapping = RolePermissions::default();
        let mut user = principal_with(Role::User, &mapping);
        user.permissions.clear();
        let explanation = explain_authorization(&user, &notes::VIEW, &mapping);
        assert_eq!(explanation.denial_reason.unwrap().kind, DenialKind::StaleCredential);
    }

    #[test]
    fn explanation_for_granted_permission() {
        let mapping = RolePermissions::default();
        let admin = principal_with(Role::Admin, &mapping);
        let explanation = explain_authorization(&admin, &users::VIEW, &mapping);
        assert!(explanation.granted);
        assert!(explanation.denial_reason.is_none());
    }

    proptest! {
        /// Property: gate(role, p) == (p ∈ mapping[role]) for every pair.
        #[test]
        fn gate_agrees_with_mapping(
            role in prop::sample::select(Role::ALL.to_vec()),
            permission in prop::sample::select(catalogue().to_vec()),
        ) {
            let mapping = RolePermissions::default();
            let principal = principal_with(role, &mapping);
            prop_assert_eq!(
                authorize(&principal, &permission).is_ok(),
                mapping.grants(role, &permission)
            );
        }

        /// Property: unknown permission strings are never granted.
        #[test]
        fn unknown_permissions_are_denied(
            role in prop::sample::select(Role::ALL.to_vec()),
            name in "[A-Za-z.]{1,40}",
        ) {
            let permission = Permission::new(name);
            prop_assume!(!catalogue().contains(&permission));
            let principal = principal_with(role, &RolePermissions::default());
            prop_assert!(authorize(&principal, &permission).is_err());
        }
    }
}
