//! Role → permission table.
//!
//! The table is built once at startup and shared read-only (usually behind an
//! `Arc`) by the token issuer, the gate helpers and the RBAC audit endpoints.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::permissions::{notes, reminders, users};
use crate::{Permission, Role};

/// Immutable mapping from each [`Role`] to the permissions it grants.
///
/// # Invariants
/// - Every `Role` variant has an entry (possibly empty).
/// - Each entry is duplicate-free and keeps first-grant order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissions {
    grants: BTreeMap<Role, Vec<Permission>>,
}

impl RolePermissions {
    pub fn builder() -> RolePermissionsBuilder {
        RolePermissionsBuilder::default()
    }

    /// Permissions granted to `role`. A role without grants yields an empty
    /// slice; this is never an error.
    pub fn permissions_for(&self, role: Role) -> &[Permission] {
        self.grants.get(&role).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn grants(&self, role: Role, permission: &Permission) -> bool {
        self.permissions_for(role).contains(permission)
    }

    /// Roles whose entry contains `permission`.
    pub fn roles_granting(&self, permission: &Permission) -> Vec<Role> {
        self.grants
            .iter()
            .filter(|(_, perms)| perms.contains(permission))
            .map(|(role, _)| *role)
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &[Permission])> {
        self.grants.iter().map(|(role, perms)| (*role, perms.as_slice()))
    }

    /// Snapshot of the table for audit/display.
    pub fn definitions(&self) -> Vec<RoleDefinition> {
        self.iter()
            .map(|(role, perms)| RoleDefinition {
                name: role,
                permissions: perms.iter().map(|p| p.as_str().to_string()).collect(),
                description: role_description(role),
            })
            .collect()
    }
}

impl Default for RolePermissions {
    /// The production table.
    fn default() -> Self {
        Self::builder()
            .grant(
                Role::Admin,
                [
                    users::MANAGE,
                    users::VIEW,
                    notes::MANAGE,
                    notes::VIEW,
                    reminders::MANAGE,
                    reminders::VIEW,
                ],
            )
            .grant(
                Role::User,
                [notes::MANAGE, notes::VIEW, reminders::MANAGE, reminders::VIEW],
            )
            .build()
    }
}

#[derive(Debug, Default)]
pub struct RolePermissionsBuilder {
    grants: BTreeMap<Role, Vec<Permission>>,
}

impl RolePermissionsBuilder {
    pub fn grant(mut self, role: Role, permissions: impl IntoIterator<Item = Permission>) -> Self {
        let entry = self.grants.entry(role).or_default();
        for permission in permissions {
            if !entry.contains(&permission) {
                entry.push(permission);
            }
        }
        self
    }

    pub fn build(mut self) -> RolePermissions {
        for role in Role::ALL {
            self.grants.entry(role).or_default();
        }
        RolePermissions {
            grants: self.grants,
        }
    }
}

/// Role definition with its granted permissions (for audit/display).
#[derive(Debug, Clone, Serialize)]
pub struct RoleDefinition {
    pub name: Role,
    pub permissions: Vec<String>,
    pub description: Option<String>,
}

fn role_description(role: Role) -> Option<String> {
    match role {
        Role::Admin => Some("Administrator: manages user accounts and all personal data".to_string()),
        Role::User => Some("Regular user: manages own notes and reminders".to_string()),
    }
}
