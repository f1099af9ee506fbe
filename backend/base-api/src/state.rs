use crate::config::Config;
use crate::security::jwt::JwtCodec;
use actix_middleware::RevocationStore;
use sqlx::PgPool;
use std::sync::Arc;

/// Shared application state, cloned into every worker.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub store: Arc<dyn RevocationStore>,
    pub jwt: Arc<JwtCodec>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        db: PgPool,
        store: Arc<dyn RevocationStore>,
        jwt: JwtCodec,
        config: Config,
    ) -> Self {
        Self {
            db,
            store,
            jwt: Arc::new(jwt),
            config: Arc::new(config),
        }
    }
}
