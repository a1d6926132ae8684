use std::sync::{Arc, Mutex};

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use beautybar::config::AppConfig;
use beautybar::db;
use beautybar::handlers;
use beautybar::reference::ReferenceGenerator;
use beautybar::services::notify::Notifier;
use beautybar::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    if config.admin_key.is_none() {
        tracing::warn!("ADMIN_KEY not set, admin endpoints are disabled");
    }

    let notifier = Notifier::from_config(&config);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        notifier,
        references: ReferenceGenerator::default(),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/bookings",
            post(handlers::bookings::create_booking)
                .get(handlers::bookings::bookings_query)
                .patch(handlers::bookings::admin_update_status)
                .delete(handlers::bookings::delete_booking),
        )
        .route(
            "/bookings/notify",
            post(handlers::bookings::send_notification),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
