use std::net::SocketAddr;
use std::path::PathBuf;

use serde::Deserialize;
use snafu::ResultExt;

use crate::auth::{Authenticator, Credentials};
use crate::error::{ApplicationError, ConfigLoadSnafu};

/// Process configuration, read once from the environment at startup.
#[derive(Deserialize, Clone)]
pub struct Config {
    /// the single accepted username
    pub user: String,
    /// the password for `user`
    pub password: String,

    #[serde(rename = "host_address", default = "default_host")]
    pub host: SocketAddr,

    /// SQLite file, or `:memory:`
    #[serde(default = "default_database_path")]
    pub database_path: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

fn default_host() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 5000))
}

fn default_database_path() -> String {
    "database.db".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

pub fn load() -> Result<Config, ApplicationError> {
    envy::from_env::<Config>().context(ConfigLoadSnafu)
}

impl Config {
    pub fn credentials(&self) -> Credentials {
        Credentials::new(self.user.clone(), self.password.clone())
    }

    pub fn authenticator(&self) -> Authenticator {
        Authenticator::new(self.credentials())
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host", &self.host)
            .field("database_path", &self.database_path)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_to_optional_variables() {
        let config: Config =
            envy::from_iter(vars(&[("USER", "admin"), ("PASSWORD", "secret")])).unwrap();

        assert_eq!(config.user, "admin");
        assert_eq!(config.password, "secret");
        assert_eq!(config.host, default_host());
        assert_eq!(config.database_path, "database.db");
        assert_eq!(config.log_dir, PathBuf::from("logs"));
    }

    #[test]
    fn reads_overrides() {
        let config: Config = envy::from_iter(vars(&[
            ("USER", "admin"),
            ("PASSWORD", "secret"),
            ("HOST_ADDRESS", "0.0.0.0:8080"),
            ("DATABASE_PATH", ":memory:"),
            ("LOG_DIR", "/var/log/videos"),
        ]))
        .unwrap();

        assert_eq!(config.host, "0.0.0.0:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.log_dir, PathBuf::from("/var/log/videos"));
    }

    #[test]
    fn password_is_required() {
        let result = envy::from_iter::<_, Config>(vars(&[("USER", "admin")]));
        assert!(result.is_err());
    }

    #[test]
    fn debug_hides_password() {
        let config: Config =
            envy::from_iter(vars(&[("USER", "admin"), ("PASSWORD", "hunter2")])).unwrap();

        let printed = format!("{config:?}");
        assert!(printed.contains("admin"));
        assert!(!printed.contains("hunter2"));
    }
}
