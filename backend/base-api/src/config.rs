use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 6 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    /// Access token lifetime in seconds.
    pub token_ttl_secs: i64,
    /// Interval between expired-revocation sweeps.
    pub sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, crate::error::AppError> {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| crate::error::AppError::Config("DATABASE_URL missing".into()))?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| crate::error::AppError::Config("JWT_SECRET missing".into()))?;
        if jwt_secret.len() < 32 {
            return Err(crate::error::AppError::Config(
                "JWT_SECRET must be at least 32 bytes".into(),
            ));
        }

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = env::var("PORT")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(8080);
        let jwt_issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| "base-api".into());
        let jwt_audience = env::var("JWT_AUDIENCE").unwrap_or_else(|_| "base-api-users".into());
        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(3600);
        let sweep_interval = Duration::from_secs(
            env::var("SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
        );

        Ok(Self {
            host,
            port,
            database_url,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_ttl_secs,
            sweep_interval,
        })
    }

    #[cfg(test)]
    pub fn test_defaults() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8080,
            database_url: "postgres://localhost/test".into(),
            jwt_secret: "test-secret-test-secret-test-secret!".into(),
            jwt_issuer: "base-api".into(),
            jwt_audience: "base-api-users".into(),
            token_ttl_secs: 3600,
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
        }
    }
}
