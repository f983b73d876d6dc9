use std::path::PathBuf;

use anyhow::{Context, Result, bail};

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

#[derive(Debug)]
pub struct ServerConfig {
    pub jwt_secret: String,
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("ECHOVERSE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("ECHOVERSE_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let db_path = get("ECHOVERSE_DB_PATH")
            .unwrap_or_else(|| "echoverse.db".into())
            .into();
        let host = get("ECHOVERSE_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = get("ECHOVERSE_PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .context("ECHOVERSE_PORT must be a port number")?;

        Ok(Self {
            jwt_secret,
            db_path,
            host,
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let config = config_from(&[("ECHOVERSE_JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.db_path, PathBuf::from("echoverse.db"));
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn placeholder_secret_is_refused() {
        assert!(config_from(&[]).is_err());
        assert!(config_from(&[("ECHOVERSE_JWT_SECRET", "dev-secret-change-me")]).is_err());
    }

    #[test]
    fn bad_port_is_an_error() {
        let result = config_from(&[("ECHOVERSE_JWT_SECRET", "s3cret"), ("ECHOVERSE_PORT", "http")]);
        assert!(result.is_err());
    }
}
