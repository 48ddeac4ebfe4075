use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Process-wide configuration, read once from the environment.
pub static CONFIG: LazyLock<Config> = LazyLock::new(|| {
    Config::from_env().unwrap_or_else(|e| {
        eprintln!("invalid configuration, falling back to defaults: {e}");
        Config::default()
    })
});

/// Inbound webhooks whose timestamp drifts further than this from now are rejected.
pub const WEBHOOK_TOLERANCE_SECS: i64 = 5 * 60;

/// Hard cap on inbound request bodies.
pub const BODY_LIMIT_BYTES: usize = 1024 * 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite connection string. Required by every path that touches storage.
    pub database_url: Option<String>,
    /// Webhook signing secret, `whsec_<base64>` or bare base64.
    pub webhook_secret: Option<String>,
    pub listen_addr: String,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: None,
            webhook_secret: None,
            listen_addr: "0.0.0.0:8000".to_string(),
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, figment::Error> {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Env::raw().only(&[
                "DATABASE_URL",
                "WEBHOOK_SECRET",
                "LISTEN_ADDR",
                "LOGLEVEL",
            ]))
            .extract()
    }

    /// Connection string, treating a blank value as unset.
    pub fn database_url(&self) -> Option<&str> {
        non_blank(self.database_url.as_deref())
    }

    /// Signing secret, treating a blank value as unset.
    pub fn webhook_secret(&self) -> Option<&str> {
        non_blank(self.webhook_secret.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_values_count_as_missing() {
        let cfg = Config {
            database_url: Some("   ".to_string()),
            webhook_secret: Some(String::new()),
            ..Config::default()
        };
        assert_eq!(cfg.database_url(), None);
        assert_eq!(cfg.webhook_secret(), None);
    }

    #[test]
    fn env_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("DATABASE_URL", "sqlite::memory:");
            jail.set_env("LOGLEVEL", "debug");
            let cfg = Config::from_env()?;
            assert_eq!(cfg.database_url(), Some("sqlite::memory:"));
            assert_eq!(cfg.loglevel, "debug");
            assert_eq!(cfg.listen_addr, "0.0.0.0:8000");
            assert_eq!(cfg.webhook_secret(), None);
            Ok(())
        });
    }
}
