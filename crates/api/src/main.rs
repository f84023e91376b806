use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use staffpurchase_api::auth::identity::JwtVerifier;
use staffpurchase_api::config::ServerConfig;
use staffpurchase_api::router::build_app_router;
use staffpurchase_api::state::AppState;
use staffpurchase_db::seed::{seed_products, DEFAULT_PRODUCTS};
use staffpurchase_db::{MemoryStore, PgStore, ProductStore, PurchaseRequestStore, StaffStore};
use staffpurchase_events::{
    EmailConfig, EventBus, LogMailer, Mailer, NotificationDispatcher, NotificationSettings,
    ReminderScheduler, SmtpMailer, Templates,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

struct Stores {
    requests: Arc<dyn PurchaseRequestStore>,
    products: Arc<dyn ProductStore>,
    staff: Arc<dyn StaffStore>,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "staffpurchase_api=debug,staffpurchase_events=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    // --- Storage ---
    let stores = connect_stores().await;

    if config.seed_products {
        seed_products(stores.products.as_ref(), DEFAULT_PRODUCTS)
            .await
            .expect("Failed to seed product catalogue");
    }

    // --- Email ---
    let mailer: Arc<dyn Mailer> = match EmailConfig::from_env() {
        Some(email_config) => {
            tracing::info!(host = %email_config.smtp_host, "SMTP delivery enabled");
            Arc::new(SmtpMailer::new(email_config).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, notification emails will only be logged");
            Arc::new(LogMailer)
        }
    };
    let templates = Templates::new(config.notifications.base_url.clone());

    // --- Event bus ---
    let event_bus = Arc::new(EventBus::default());

    // Spawn notification dispatcher (turns workflow events into emails).
    let dispatcher = NotificationDispatcher::new(
        Arc::clone(&mailer),
        templates.clone(),
        NotificationSettings {
            admin_email: config.notifications.admin_email.clone(),
            rebate_email: config.notifications.rebate_email.clone(),
        },
    );
    let dispatcher_handle = tokio::spawn(dispatcher.run(event_bus.subscribe()));

    // Spawn reminder scheduler (daily sweep of pending requests).
    let reminders = Arc::new(ReminderScheduler::new(
        Arc::clone(&stores.requests),
        Arc::clone(&mailer),
        templates,
        config.reminder_hour,
    ));
    let reminder_cancel = tokio_util::sync::CancellationToken::new();
    let reminder_handle = {
        let reminders = Arc::clone(&reminders);
        let cancel = reminder_cancel.clone();
        tokio::spawn(async move { reminders.run(cancel).await })
    };

    tracing::info!("Event services started (notification dispatcher, reminder scheduler)");

    // --- App state ---
    let state = AppState {
        requests: stores.requests,
        products: stores.products,
        staff: stores.staff,
        identity: Arc::new(JwtVerifier::new(config.jwt.clone())),
        config: Arc::new(config.clone()),
        event_bus: Arc::clone(&event_bus),
        reminders,
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

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");
    let drain = Duration::from_secs(config.shutdown_timeout_secs);

    reminder_cancel.cancel();
    let _ = tokio::time::timeout(drain, reminder_handle).await;
    tracing::info!("Reminder scheduler stopped");

    // Dropping the last bus handle closes the channel; the dispatcher drains
    // what is buffered and exits.
    drop(event_bus);
    let _ = tokio::time::timeout(drain, dispatcher_handle).await;
    tracing::info!("Notification dispatcher shut down");

    tracing::info!("Graceful shutdown complete");
}

/// PostgreSQL when `DATABASE_URL` is set, otherwise an in-memory store.
async fn connect_stores() -> Stores {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        tracing::warn!("DATABASE_URL not set, using in-memory store; data will not survive a restart");
        let store = Arc::new(MemoryStore::new());
        return Stores {
            requests: store.clone(),
            products: store.clone(),
            staff: store,
        };
    };

    let pool = staffpurchase_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    staffpurchase_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    staffpurchase_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    let store = Arc::new(PgStore::new(pool));
    Stores {
        requests: store.clone(),
        products: store.clone(),
        staff: store,
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
