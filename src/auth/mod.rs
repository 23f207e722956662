//! Authorization
//!
//! The executor asks a single question of the auth layer: may the session of
//! this context perform a permission. Each `Auth` also supplies the
//! `Authenticator` the wire protocol uses to check handshake credentials.

pub mod native;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::executor::Context;

pub use native::{NativeAuth, NativeUser};

/// Auth plugin announced for native password authentication
pub const AUTH_PLUGIN_NATIVE: &str = "mysql_native_password";

/// Authorization errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// Session user lacks the permission, or is unknown
    #[error("user '{user}' is not authorized to {permission}")]
    PermissionDenied { user: String, permission: Permission },

    /// Permission name not recognised
    #[error("unknown permission: {0}")]
    UnknownPermission(String),

    /// Users file is not valid JSON
    #[error("invalid users file: {0}")]
    InvalidUsersFile(#[from] serde_json::Error),

    /// Users file could not be read
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// Operations a session may be allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Read data
    Read,
    /// Modify data
    Write,
}

impl Permission {
    /// Parse permission name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Some(Permission::Read),
            "write" => Some(Permission::Write),
            _ => None,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }

    fn bit(&self) -> u8 {
        match self {
            Permission::Read => 1,
            Permission::Write => 1 << 1,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

/// Set of permissions granted to a user.
///
/// Defaults to read-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionSet(u8);

impl PermissionSet {
    pub fn empty() -> Self {
        PermissionSet(0)
    }

    pub fn all() -> Self {
        PermissionSet(Permission::Read.bit() | Permission::Write.bit())
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    pub fn insert(&mut self, permission: Permission) {
        self.0 |= permission.bit();
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl Default for PermissionSet {
    fn default() -> Self {
        let mut set = PermissionSet::empty();
        set.insert(Permission::Read);
        set
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<T: IntoIterator<Item = Permission>>(iter: T) -> Self {
        let mut set = PermissionSet::empty();
        for p in iter {
            set.insert(p);
        }
        set
    }
}

/// Protocol-level credential check
pub trait Authenticator: Send + Sync {
    /// Auth plugin announced in the handshake
    fn plugin(&self) -> &'static str;

    /// Check a handshake response scrambled with `scramble`
    fn validate(&self, user: &str, scramble: &[u8], auth_response: &[u8]) -> bool;
}

/// Authorization capability consumed by the executor
pub trait Auth: Send + Sync {
    /// Authenticator for the wire protocol
    fn authenticator(&self) -> Arc<dyn Authenticator>;

    /// Check whether the context's session may perform `permission`
    fn allowed(&self, ctx: &Context, permission: Permission) -> AuthResult<()>;
}

/// Auth method that always succeeds
#[derive(Debug, Clone, Copy, Default)]
pub struct NoneAuth;

struct AcceptAll;

impl Authenticator for AcceptAll {
    fn plugin(&self) -> &'static str {
        AUTH_PLUGIN_NATIVE
    }

    fn validate(&self, _user: &str, _scramble: &[u8], _auth_response: &[u8]) -> bool {
        true
    }
}

impl Auth for NoneAuth {
    fn authenticator(&self) -> Arc<dyn Authenticator> {
        Arc::new(AcceptAll)
    }

    fn allowed(&self, _ctx: &Context, _permission: Permission) -> AuthResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{Client, Session};

    #[test]
    fn test_permission_parse() {
        assert_eq!(Permission::parse("READ"), Some(Permission::Read));
        assert_eq!(Permission::parse("write"), Some(Permission::Write));
        assert_eq!(Permission::parse("drop"), None);
    }

    #[test]
    fn test_permission_set() {
        let set = PermissionSet::default();
        assert!(set.contains(Permission::Read));
        assert!(!set.contains(Permission::Write));

        let all = PermissionSet::all();
        assert!(all.contains(Permission::Write));
        assert_eq!(
            [Permission::Write].into_iter().collect::<PermissionSet>(),
            {
                let mut s = PermissionSet::empty();
                s.insert(Permission::Write);
                s
            }
        );
    }

    #[test]
    fn test_none_always_allows() {
        let ctx = Context::new(Arc::new(Session::new(Client::new("anyone", "10.0.0.1"))));
        let auth = NoneAuth;
        assert!(auth.allowed(&ctx, Permission::Read).is_ok());
        assert!(auth.allowed(&ctx, Permission::Write).is_ok());

        let authenticator = auth.authenticator();
        assert_eq!(authenticator.plugin(), AUTH_PLUGIN_NATIVE);
        assert!(authenticator.validate("anyone", b"scramble", b"garbage"));
    }
}
