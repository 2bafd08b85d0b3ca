use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use objstore_types::ObjectCoordinates;
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{ServiceError, ServiceResult};

/// The caller behind a request. `name` is what gets recorded as
/// `createdBy` / `updatedBy`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub name: String,
    pub is_admin: bool,
}

impl Identity {
    pub fn anonymous() -> Self {
        Self {
            name: "anonymous".into(),
            is_admin: false,
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_admin: false,
        }
    }

    pub fn admin(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_admin: true,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        !self.is_admin && self.name == "anonymous"
    }
}

#[derive(Clone, Debug)]
pub enum Credentials {
    Bearer(String),
    Anonymous,
}

impl Credentials {
    /// Parse an `Authorization` header value. Anything other than a
    /// non-empty bearer token counts as anonymous.
    pub fn from_authorization(value: Option<&str>) -> Self {
        match value.and_then(|v| v.strip_prefix("Bearer ")).map(str::trim) {
            Some(token) if !token.is_empty() => Self::Bearer(token.to_string()),
            _ => Self::Anonymous,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    Read { coordinates: ObjectCoordinates },
    Write { coordinates: ObjectCoordinates },
    Delete { coordinates: ObjectCoordinates },
    /// Run a search over the given kinds; empty means all kinds.
    Search { kinds: Vec<String> },
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { coordinates } => write!(f, "read:{coordinates}"),
            Self::Write { coordinates } => write!(f, "write:{coordinates}"),
            Self::Delete { coordinates } => write!(f, "delete:{coordinates}"),
            Self::Search { kinds } if kinds.is_empty() => write!(f, "search:*"),
            Self::Search { kinds } => write!(f, "search:{}", kinds.join(",")),
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn authenticate(&self, credentials: &Credentials) -> ServiceResult<Identity>;
    async fn authorize(&self, identity: &Identity, action: &Action) -> ServiceResult<bool>;
}

#[async_trait]
impl<T: AuthProvider + ?Sized> AuthProvider for Arc<T> {
    async fn authenticate(&self, credentials: &Credentials) -> ServiceResult<Identity> {
        (**self).authenticate(credentials).await
    }

    async fn authorize(&self, identity: &Identity, action: &Action) -> ServiceResult<bool> {
        (**self).authorize(identity, action).await
    }
}

pub struct AllowAllAuth;

#[async_trait]
impl AuthProvider for AllowAllAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServiceResult<Identity> {
        match credentials {
            Credentials::Bearer(token) => {
                let prefix: String = token.chars().take(8).collect();
                Ok(Identity::user(format!("bearer:{prefix}")))
            }
            Credentials::Anonymous => Ok(Identity::anonymous()),
        }
    }

    async fn authorize(&self, _identity: &Identity, _action: &Action) -> ServiceResult<bool> {
        Ok(true)
    }
}

/// Access level granted on a kind. `Write` implies `Read`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    Read,
    Write,
}

/// Grant for every kind.
pub const ANY_KIND: &str = "*";

/// Bearer tokens mapped to users, plus per-kind grants for each user.
///
/// Admins may do anything. Anonymous callers may read and search only when
/// `allow_anonymous_read` is set. Everyone else needs a grant on the kind.
/// Search itself is open to any authenticated user; each hit is checked
/// separately as a read.
#[derive(Debug, Default)]
pub struct KindAclAuth {
    tokens: BTreeMap<String, String>,
    admins: BTreeSet<String>,
    grants: BTreeMap<String, BTreeMap<String, Access>>,
    allow_anonymous_read: bool,
}

impl KindAclAuth {
    pub fn new(allow_anonymous_read: bool) -> Self {
        Self { allow_anonymous_read, ..Default::default() }
    }

    pub fn from_config(config: &AuthConfig, allow_anonymous_read: bool) -> Self {
        let mut auth = Self::new(allow_anonymous_read);
        for (token, user) in &config.tokens {
            auth = auth.with_token(token.clone(), user.clone());
        }
        for admin in &config.admins {
            auth = auth.with_admin(admin.clone());
        }
        for grant in &config.grants {
            auth = auth.grant(grant.user.clone(), grant.kind.clone(), grant.access);
        }
        auth
    }

    pub fn with_token(mut self, token: impl Into<String>, user: impl Into<String>) -> Self {
        self.tokens.insert(token.into(), user.into());
        self
    }

    pub fn with_admin(mut self, user: impl Into<String>) -> Self {
        self.admins.insert(user.into());
        self
    }

    /// Grant `access` on `kind` (or [`ANY_KIND`]). A wider existing grant
    /// is kept.
    pub fn grant(
        mut self,
        user: impl Into<String>,
        kind: impl Into<String>,
        access: Access,
    ) -> Self {
        let slot = self
            .grants
            .entry(user.into())
            .or_default()
            .entry(kind.into())
            .or_insert(access);
        *slot = (*slot).max(access);
        self
    }

    fn access_on(&self, user: &str, kind: &str) -> Option<Access> {
        let grants = self.grants.get(user)?;
        let exact = grants.get(kind).copied();
        let any = grants.get(ANY_KIND).copied();
        exact.max(any)
    }

    fn allows(&self, identity: &Identity, kind: &str, needed: Access) -> bool {
        if identity.is_anonymous() {
            return needed == Access::Read && self.allow_anonymous_read;
        }
        self.access_on(&identity.name, kind).is_some_and(|granted| granted >= needed)
    }
}

#[async_trait]
impl AuthProvider for KindAclAuth {
    async fn authenticate(&self, credentials: &Credentials) -> ServiceResult<Identity> {
        match credentials {
            Credentials::Anonymous => Ok(Identity::anonymous()),
            Credentials::Bearer(token) => {
                let user = self
                    .tokens
                    .get(token)
                    .ok_or_else(|| ServiceError::Unauthenticated("unknown bearer token".into()))?;
                if self.admins.contains(user) {
                    Ok(Identity::admin(user.clone()))
                } else {
                    Ok(Identity::user(user.clone()))
                }
            }
        }
    }

    async fn authorize(&self, identity: &Identity, action: &Action) -> ServiceResult<bool> {
        if identity.is_admin {
            return Ok(true);
        }
        Ok(match action {
            Action::Read { coordinates } => self.allows(identity, &coordinates.kind, Access::Read),
            Action::Write { coordinates } | Action::Delete { coordinates } => {
                self.allows(identity, &coordinates.kind, Access::Write)
            }
            Action::Search { .. } => !identity.is_anonymous() || self.allow_anonymous_read,
        })
    }
}
