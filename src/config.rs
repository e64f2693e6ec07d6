use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Absent key means the adapter runs in fallback-only mode.
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_uri: String,
    pub jwt: JwtConfig,
    pub provider: ProviderConfig,
    pub snapshot_dir: String,
    pub allowed_origin: Option<String>,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_uri = std::env::var("DATABASE_URI")
            .map_err(|_| anyhow::anyhow!("DATABASE_URI is required"))?;
        let jwt = JwtConfig {
            secret: std::env::var("AUTH_SECRET")
                .map_err(|_| anyhow::anyhow!("AUTH_SECRET is required"))?,
            issuer: std::env::var("AUTH_ISSUER").unwrap_or_else(|_| "snapui".into()),
            audience: std::env::var("AUTH_AUDIENCE").unwrap_or_else(|_| "snapui-users".into()),
            ttl_hours: std::env::var("AUTH_TOKEN_TTL_HOURS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(24 * 7),
        };
        let provider = ProviderConfig {
            api_key: std::env::var("PROVIDER_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            model: std::env::var("PROVIDER_MODEL").unwrap_or_else(|_| "gemini-2.5-flash".into()),
            timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30),
        };
        Ok(Self {
            database_uri,
            jwt,
            provider,
            snapshot_dir: std::env::var("SNAPSHOT_DIR").unwrap_or_else(|_| "./snapshots".into()),
            allowed_origin: std::env::var("ALLOWED_ORIGIN").ok().filter(|o| !o.is_empty()),
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse::<u16>().ok())
                .unwrap_or(4000),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_reads_bind_address() {
        std::env::set_var("DATABASE_URI", "postgres://postgres@localhost/snapui");
        std::env::set_var("AUTH_SECRET", "test-secret");
        std::env::set_var("HOST", "127.0.0.1");
        std::env::set_var("PORT", "9099");

        let config = AppConfig::from_env().expect("config should load");
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9099);
        assert_eq!(config.jwt.ttl_hours, 24 * 7);

        std::env::remove_var("HOST");
        std::env::remove_var("PORT");
    }
}
