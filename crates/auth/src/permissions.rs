use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Permission identifier.
///
/// Permissions are opaque strings namespaced by resource and action
/// (e.g. `Permissions.Notes.Manage`). Matching is exact: there is no wildcard
/// and no implication between actions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permission(Cow<'static, str>);

impl Permission {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    /// Const constructor for the static catalogue below.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

pub mod users {
    use super::Permission;

    pub const VIEW: Permission = Permission::from_static("Permissions.Users.View");
    pub const MANAGE_SELF: Permission = Permission::from_static("Permissions.Users.ManageSelf");
    pub const MANAGE: Permission = Permission::from_static("Permissions.Users.Manage");
}

pub mod notes {
    use super::Permission;

    pub const VIEW: Permission = Permission::from_static("Permissions.Notes.View");
    pub const MANAGE: Permission = Permission::from_static("Permissions.Notes.Manage");
}

pub mod reminders {
    use super::Permission;

    pub const VIEW: Permission = Permission::from_static("Permissions.Reminders.View");
    pub const MANAGE: Permission = Permission::from_static("Permissions.Reminders.Manage");
}

/// Every permission the application defines.
pub fn catalogue() -> [Permission; 7] {
    [
        users::VIEW,
        users::MANAGE_SELF,
        users::MANAGE,
        notes::VIEW,
        notes::MANAGE,
        reminders::VIEW,
        reminders::MANAGE,
    ]
}
