//! Native password authentication
//!
//! Users carry a `mysql_native_password` hash and a permission set. The
//! stored hash is `*` followed by the uppercase hex of SHA1(SHA1(password)).
//!
//! Users file format:
//!
//! ```json
//! [
//!   {"name": "root", "password": "secret", "permissions": ["read", "write"]},
//!   {"name": "reader", "password": "*14E65567ABDB5135D0CFD9A70B3032C179A49EE7"}
//! ]
//! ```
//!
//! A password starting with `*` is taken as an already computed hash. Users
//! without permissions get read-only access.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::debug;

use super::{
    Auth, AuthError, AuthResult, Authenticator, Permission, PermissionSet, AUTH_PLUGIN_NATIVE,
};
use crate::executor::Context;

/// Length of a stored hash: `*` plus 40 hex digits
const NATIVE_HASH_LEN: usize = 41;

/// User known to native auth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeUser {
    pub name: String,
    /// Stored hash, empty for users without a password
    pub password_hash: String,
    pub permissions: PermissionSet,
}

impl NativeUser {
    pub fn new(name: impl Into<String>, password: &str, permissions: PermissionSet) -> Self {
        NativeUser {
            name: name.into(),
            password_hash: stored_hash(password),
            permissions,
        }
    }
}

#[derive(Deserialize)]
struct UserEntry {
    name: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    permissions: Vec<String>,
}

type UserMap = Arc<RwLock<HashMap<String, NativeUser>>>;

/// Auth backed by an in-memory user table
#[derive(Debug, Clone, Default)]
pub struct NativeAuth {
    users: UserMap,
}

impl NativeAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native auth with a single user
    pub fn single(name: &str, password: &str, permissions: PermissionSet) -> Self {
        let auth = Self::new();
        auth.add_user(NativeUser::new(name, password, permissions));
        auth
    }

    /// Add or replace a user
    pub fn add_user(&self, user: NativeUser) {
        self.users.write().insert(user.name.clone(), user);
    }

    pub fn user(&self, name: &str) -> Option<NativeUser> {
        self.users.read().get(name).cloned()
    }

    /// Load users from a JSON document
    pub fn from_json(json: &str) -> AuthResult<Self> {
        let entries: Vec<UserEntry> = serde_json::from_str(json)?;
        let auth = Self::new();
        for entry in entries {
            let permissions = if entry.permissions.is_empty() {
                PermissionSet::default()
            } else {
                entry
                    .permissions
                    .iter()
                    .map(|p| Permission::parse(p).ok_or_else(|| AuthError::UnknownPermission(p.clone())))
                    .collect::<AuthResult<PermissionSet>>()?
            };
            auth.add_user(NativeUser::new(entry.name, &entry.password, permissions));
        }
        Ok(auth)
    }

    /// Load users from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> AuthResult<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

impl Auth for NativeAuth {
    fn authenticator(&self) -> Arc<dyn Authenticator> {
        Arc::new(NativeAuthenticator {
            users: self.users.clone(),
        })
    }

    fn allowed(&self, ctx: &Context, permission: Permission) -> AuthResult<()> {
        let user = ctx.session().user();
        let granted = self
            .users
            .read()
            .get(user)
            .is_some_and(|u| u.permissions.contains(permission));

        if granted {
            return Ok(());
        }
        debug!(user, %permission, "permission denied");
        Err(AuthError::PermissionDenied {
            user: user.to_string(),
            permission,
        })
    }
}

struct NativeAuthenticator {
    users: UserMap,
}

impl Authenticator for NativeAuthenticator {
    fn plugin(&self) -> &'static str {
        AUTH_PLUGIN_NATIVE
    }

    fn validate(&self, user: &str, scramble: &[u8], auth_response: &[u8]) -> bool {
        match self.users.read().get(user) {
            Some(u) => verify_native_password(&u.password_hash, scramble, auth_response),
            None => false,
        }
    }
}

/// Compute the stored hash for a plaintext password.
///
/// Empty passwords store an empty hash.
pub fn native_password_hash(password: &str) -> String {
    if password.is_empty() {
        return String::new();
    }
    let stage1 = Sha1::digest(password.as_bytes());
    let stage2 = Sha1::digest(stage1);
    format!("*{}", hex::encode_upper(stage2))
}

fn stored_hash(password: &str) -> String {
    if password.starts_with('*') && password.len() == NATIVE_HASH_LEN {
        password.to_ascii_uppercase()
    } else {
        native_password_hash(password)
    }
}

fn decode_hash(hash: &str) -> Option<[u8; 20]> {
    let digits = hash.strip_prefix('*')?;
    let mut out = [0u8; 20];
    hex::decode_to_slice(digits, &mut out).ok()?;
    Some(out)
}

/// Check a scrambled handshake response against a stored hash.
///
/// The client sends SHA1(password) XOR SHA1(scramble || SHA1(SHA1(password))).
pub fn verify_native_password(stored: &str, scramble: &[u8], auth_response: &[u8]) -> bool {
    if stored.is_empty() {
        return auth_response.is_empty();
    }
    let Some(stage2) = decode_hash(stored) else {
        return false;
    };
    if auth_response.len() != stage2.len() {
        return false;
    }

    let mut hasher = Sha1::new();
    hasher.update(scramble);
    hasher.update(stage2);
    let mask = hasher.finalize();

    let stage1: Vec<u8> = auth_response
        .iter()
        .zip(mask.iter())
        .map(|(a, b)| a ^ b)
        .collect();
    Sha1::digest(&stage1).as_slice() == stage2.as_slice()
}

/// Client side of the handshake: scramble a password
pub fn scramble_password(scramble: &[u8], password: &str) -> Vec<u8> {
    if password.is_empty() {
        return Vec::new();
    }
    let stage1 = Sha1::digest(password.as_bytes());
    let stage2 = Sha1::digest(stage1);

    let mut hasher = Sha1::new();
    hasher.update(scramble);
    hasher.update(stage2);
    let mask = hasher.finalize();

    stage1.iter().zip(mask.iter()).map(|(a, b)| a ^ b).collect()
}
