use actix_middleware::{
    Logging, RevocationStore, SecurityHeaders, TokenRevocationMiddleware, XssScanMiddleware,
};
use actix_web::{web, App, HttpServer};
use base_api::{
    config::Config,
    db::PgRevocationStore,
    error::AppError,
    handlers, logging, migrations,
    security::JwtCodec,
    services::sweeper::spawn_revocation_sweeper,
    state::AppState,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), AppError> {
    logging::init_tracing();
    let config = Config::from_env()?;

    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .map_err(|e| AppError::StartServer(format!("db: {e}")))?;

    // Run embedded migrations (idempotent)
    migrations::run_all(&db)
        .await
        .map_err(|e| AppError::StartServer(format!("database migrations failed: {e}")))?;

    let store: Arc<dyn RevocationStore> = Arc::new(PgRevocationStore::new(db.clone()));
    let jwt = JwtCodec::new(
        &config.jwt_secret,
        &config.jwt_issuer,
        &config.jwt_audience,
        config.token_ttl_secs,
    );

    let sweeper = spawn_revocation_sweeper(store.clone(), config.sweep_interval);

    let bind = (config.host.clone(), config.port);
    let state = AppState::new(db, store.clone(), jwt, config);

    tracing::info!(host = %bind.0, port = bind.1, "base-api listening");

    let result = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure)
            // Last wrap is outermost: scan runs first, then the revocation
            // check, and the security headers cover every response
            .wrap(TokenRevocationMiddleware::new(store.clone()))
            .wrap(XssScanMiddleware::new())
            .wrap(SecurityHeaders)
            .wrap(Logging)
    })
    .bind(bind)
    .map_err(|e| AppError::StartServer(format!("bind: {e}")))?
    .run()
    .await
    .map_err(|e| AppError::StartServer(format!("server: {e}")));

    sweeper.abort();
    result
}
