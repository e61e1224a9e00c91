use std::net::SocketAddr;
use std::sync::Arc;

use commerce_db::services::OrderStatusService;
use commerce_events::{EmailConfig, SmtpStatusMailer, StatusChangeNotifier, StatusMailer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use commerce_api::config::ServerConfig;
use commerce_api::router::build_app_router;
use commerce_api::state::AppState;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "commerce_api=debug,commerce_db=debug,commerce_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = commerce_db::create_pool(&database_url, config.db_max_connections)
        .await
        .expect("Failed to connect to database");
    tracing::info!(max_connections = config.db_max_connections, "Database connection pool created");

    commerce_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    commerce_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Services ---
    let order_statuses = Arc::new(OrderStatusService::new(pool.clone()));
    let notifier = build_notifier(Arc::clone(&order_statuses));

    let state = AppState {
        pool,
        order_statuses,
        notifier,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Build the status change notifier when SMTP is configured.
///
/// A transport that fails to build is logged and the server runs without
/// notifications.
fn build_notifier(order_statuses: Arc<OrderStatusService>) -> Option<Arc<StatusChangeNotifier>> {
    let Some(email_config) = EmailConfig::from_env() else {
        tracing::info!("SMTP_HOST not set, status change emails disabled");
        return None;
    };

    match SmtpStatusMailer::new(&email_config) {
        Ok(mailer) => {
            tracing::info!(
                smtp_host = %email_config.smtp_host,
                smtp_port = email_config.smtp_port,
                "Status change emails enabled"
            );
            let mailer: Arc<dyn StatusMailer> = Arc::new(mailer);
            Some(Arc::new(StatusChangeNotifier::new(order_statuses, mailer)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to build SMTP transport, status change emails disabled");
            None
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
