use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    #[validate(nested)]
    pub gateway: GatewayConfig,
    #[validate(nested)]
    #[serde(default)]
    pub auth: AuthConfig,
    /// PostgreSQL connection URL. `DATABASE_URL` takes precedence when set.
    #[serde(default)]
    pub postgres_url: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct GatewayConfig {
    pub host: String,
    #[validate(range(min = 1))]
    pub port: u16,
}

/// Settings handed to `AuthService::new`.
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct AuthConfig {
    /// Session token lifetime in seconds
    #[validate(range(min = 1))]
    pub token_ttl_secs: u64,
    /// Upper bound for a single storage call in milliseconds
    #[validate(range(min = 1))]
    pub op_timeout_ms: u64,
    #[validate(nested)]
    #[serde(default)]
    pub password: PasswordConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: 3600,
            op_timeout_ms: 5000,
            password: PasswordConfig::default(),
        }
    }
}

impl AuthConfig {
    pub fn token_ttl(&self) -> Duration {
        Duration::from_secs(self.token_ttl_secs)
    }

    pub fn op_timeout(&self) -> Duration {
        Duration::from_millis(self.op_timeout_ms)
    }
}

/// Argon2id work factor
#[derive(Debug, Serialize, Deserialize, Clone, Validate)]
pub struct PasswordConfig {
    #[validate(range(min = 8))]
    pub memory_kib: u32,
    #[validate(range(min = 1))]
    pub iterations: u32,
    #[validate(range(min = 1, max = 16))]
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        // argon2 crate defaults (OWASP minimum for Argon2id)
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;
        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file: {}", config_path))?;

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.postgres_url = Some(url);
        }
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config yaml")?;
        config.validate().context("Config validation failed")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
log_level: info
log_dir: ./logs
log_file: sso.log
use_json: false
rotation: daily
gateway:
  host: 127.0.0.1
  port: 8080
auth:
  token_ttl_secs: 900
  op_timeout_ms: 2000
  password:
    memory_kib: 4096
    iterations: 3
    parallelism: 1
"#;

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.auth.token_ttl(), Duration::from_secs(900));
        assert_eq!(config.auth.op_timeout(), Duration::from_millis(2000));
        assert_eq!(config.auth.password.memory_kib, 4096);
        assert!(config.postgres_url.is_none());
    }

    #[test]
    fn test_auth_section_defaults() {
        let yaml = r#"
log_level: info
log_dir: ./logs
log_file: sso.log
use_json: true
rotation: never
gateway:
  host: 0.0.0.0
  port: 9000
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.auth.token_ttl_secs, 3600);
        assert_eq!(config.auth.password.iterations, 2);
    }

    #[test]
    fn test_zero_ttl_rejected() {
        let yaml = SAMPLE.replace("token_ttl_secs: 900", "token_ttl_secs: 0");
        let err = AppConfig::from_yaml(&yaml).unwrap_err();
        assert!(format!("{:#}", err).contains("validation"));
    }

    #[test]
    fn test_zero_iterations_rejected() {
        let yaml = SAMPLE.replace("iterations: 3", "iterations: 0");
        assert!(AppConfig::from_yaml(&yaml).is_err());
    }
}
