use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::auth::Access;
use crate::error::{ServiceError, ServiceResult};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub allow_anonymous_read: bool,
    /// Answer CORS preflights from any origin.
    pub permissive_cors: bool,
    pub max_batch_size: usize,
    pub default_history_limit: usize,
    pub max_history_limit: usize,
    pub default_search_limit: usize,
    pub max_search_limit: usize,
    /// Token and grant table. When absent every caller may do everything.
    pub auth: Option<AuthConfig>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 8080)),
            allow_anonymous_read: true,
            permissive_cors: false,
            max_batch_size: 100,
            default_history_limit: 20,
            max_history_limit: 100,
            default_search_limit: 100,
            max_search_limit: 1000,
            auth: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml_str(text: &str) -> ServiceResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| ServiceError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ServiceResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ServiceError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> ServiceResult<String> {
        toml::to_string_pretty(self).map_err(|e| ServiceError::Config(e.to_string()))
    }

    pub fn validate(&self) -> ServiceResult<()> {
        let limits = [
            ("max_batch_size", self.max_batch_size),
            ("default_history_limit", self.default_history_limit),
            ("max_history_limit", self.max_history_limit),
            ("default_search_limit", self.default_search_limit),
            ("max_search_limit", self.max_search_limit),
        ];
        if let Some((name, _)) = limits.iter().find(|(_, value)| *value == 0) {
            return Err(ServiceError::Config(format!("{name} must be greater than zero")));
        }
        if self.default_history_limit > self.max_history_limit {
            return Err(ServiceError::Config(
                "default_history_limit exceeds max_history_limit".into(),
            ));
        }
        if self.default_search_limit > self.max_search_limit {
            return Err(ServiceError::Config(
                "default_search_limit exceeds max_search_limit".into(),
            ));
        }
        if let Some(auth) = &self.auth {
            auth.validate()?;
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Bearer token to user name.
    pub tokens: std::collections::BTreeMap<String, String>,
    pub admins: Vec<String>,
    pub grants: Vec<GrantConfig>,
}

impl AuthConfig {
    fn validate(&self) -> ServiceResult<()> {
        if let Some(grant) = self.grants.iter().find(|g| g.user.is_empty() || g.kind.is_empty()) {
            return Err(ServiceError::Config(format!(
                "grant {:?} on {:?} needs both a user and a kind",
                grant.user, grant.kind
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrantConfig {
    pub user: String,
    /// A kind, or `*` for all kinds.
    pub kind: String,
    pub access: Access,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(c.max_batch_size, 100);
        assert_eq!(c.default_history_limit, 20);
        assert_eq!(c.max_search_limit, 1000);
        assert!(c.allow_anonymous_read);
        assert!(c.auth.is_none());
        c.validate().unwrap();
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let c = ServerConfig::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:9000"
            max_batch_size = 10
            "#,
        )
        .unwrap();
        assert_eq!(c.bind_addr.port(), 9000);
        assert_eq!(c.max_batch_size, 10);
        assert_eq!(c.max_history_limit, 100);
    }

    #[test]
    fn auth_section() {
        let c = ServerConfig::from_toml_str(
            r#"
            allow_anonymous_read = false

            [auth]
            admins = ["root"]

            [auth.tokens]
            "secret-1" = "alice"

            [[auth.grants]]
            user = "alice"
            kind = "dashboard"
            access = "write"
            "#,
        )
        .unwrap();
        let auth = c.auth.unwrap();
        assert_eq!(auth.tokens.get("secret-1").map(String::as_str), Some("alice"));
        assert_eq!(auth.grants[0].access, Access::Write);
        assert_eq!(auth.admins, ["root"]);
    }

    #[test]
    fn rejects_bad_limits() {
        let zero = ServerConfig::from_toml_str("max_batch_size = 0").unwrap_err();
        assert!(zero.to_string().contains("max_batch_size"));

        let inverted = ServerConfig::from_toml_str(
            "default_search_limit = 50\nmax_search_limit = 10",
        )
        .unwrap_err();
        assert!(matches!(inverted, ServiceError::Config(_)));
    }

    #[test]
    fn rejects_incomplete_grant() {
        let err = ServerConfig::from_toml_str(
            "[[auth.grants]]\nuser = \"\"\nkind = \"dashboard\"\naccess = \"read\"",
        )
        .unwrap_err();
        assert!(err.to_string().contains("needs both"));
    }

    #[test]
    fn rejects_unparsable_toml() {
        assert!(ServerConfig::from_toml_str("bind_addr = 12").is_err());
    }

    #[test]
    fn toml_round_trip() {
        let c = ServerConfig::default();
        let text = c.to_toml_string().unwrap();
        assert_eq!(ServerConfig::from_toml_str(&text).unwrap(), c);
    }
}
