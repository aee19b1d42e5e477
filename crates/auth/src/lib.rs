//! `notekeep-auth`: credential issuance and the permission gate.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod config;
pub mod mapping;
pub mod permissions;
pub mod principal;
pub mod roles;
pub mod token;

pub use authorize::{Access, AuthzError, authorize, check_access, explain_authorization};
pub use claims::{AccessClaims, AuthnError, PERMISSION_CLAIM, validate_claims};
pub use config::{ConfigError, JwtConfig};
pub use mapping::{RoleDefinition, RolePermissions};
pub use permissions::Permission;
pub use principal::{Principal, VerifiedIdentity};
pub use roles::{Role, UnknownRole};
pub use token::{Hs256TokenValidator, IssueError, IssuedToken, TokenIssuer, TokenValidator};
