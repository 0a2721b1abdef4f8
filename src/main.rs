use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use nearby_alerts::config::Settings;
use nearby_alerts::routes::{self, alerts::AppState};
use nearby_alerts::services::{FirebaseClient, FirebasePaths, SnapshotCache};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_logging(level: &str, format: &str) {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true);

    if format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
        }
    };

    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| settings.logging.format.clone());
    init_logging(&settings.logging.level, &log_format);

    info!("Starting Nearby Alerts service...");

    let paths = FirebasePaths {
        alerts: settings.paths.alerts.clone(),
        users: settings.paths.users.clone(),
        notifications: settings.paths.notifications.clone(),
    };

    let firebase = match FirebaseClient::new(
        settings.firebase.database_url.clone(),
        settings.firebase.auth_token.clone(),
        Duration::from_secs(settings.firebase.timeout_secs.unwrap_or(30)),
        paths,
    ) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to create database client: {}", e);
            return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
        }
    };

    info!("Database client initialized for {}", settings.firebase.database_url);

    let cache = Arc::new(SnapshotCache::new(settings.alerts.snapshot_ttl_secs));

    info!(
        "Snapshot cache initialized (TTL: {}s), default radius {}km, max {}km",
        settings.alerts.snapshot_ttl_secs,
        settings.alerts.default_radius_km,
        settings.alerts.max_radius_km
    );

    let app_state = AppState {
        firebase,
        cache,
        alerts: settings.alerts.clone(),
    };

    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .configure(routes::extractor_config)
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
