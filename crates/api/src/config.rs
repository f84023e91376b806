use staffpurchase_core::reminder::DEFAULT_REMINDER_HOUR;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `5001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to drain after the server stops.
    pub shutdown_timeout_secs: u64,
    /// Identity token verification.
    pub jwt: JwtConfig,
    pub notifications: NotificationConfig,
    /// Local hour of the daily reminder sweep (default: `8`).
    pub reminder_hour: u32,
    /// Seed the standard product catalogue on startup.
    pub seed_products: bool,
}

/// Addresses used when composing notifications.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    /// Administrator mailbox: registration alerts and the fallback sender of
    /// publicly created requests.
    pub admin_email: String,
    /// Receives purchase requests that carry no submitter email.
    pub rebate_email: Option<String>,
    /// Public origin the response links point at.
    pub base_url: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                 | Default                 |
    /// |-------------------------|-------------------------|
    /// | `HOST`                  | `0.0.0.0`               |
    /// | `PORT`                  | `5001`                  |
    /// | `CORS_ORIGINS`          | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`  | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS` | `30`                    |
    /// | `ADMIN_EMAIL`           | `admin@localhost`       |
    /// | `REBATE_EMAIL`          | unset                   |
    /// | `BASE_URL`              | `http://localhost:5173` |
    /// | `REMINDER_HOUR`         | `8`                     |
    /// | `SEED_PRODUCTS`         | `false`                 |
    ///
    /// `JWT_SECRET` is required; see [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "5001".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let reminder_hour: u32 = std::env::var("REMINDER_HOUR")
            .unwrap_or_else(|_| DEFAULT_REMINDER_HOUR.to_string())
            .parse()
            .expect("REMINDER_HOUR must be a valid u32");
        assert!(reminder_hour < 24, "REMINDER_HOUR must be between 0 and 23");

        let seed_products = std::env::var("SEED_PRODUCTS")
            .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        let notifications = NotificationConfig {
            admin_email: std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@localhost".into()),
            rebate_email: std::env::var("REBATE_EMAIL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            base_url: std::env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt: JwtConfig::from_env(),
            notifications,
            reminder_hour,
            seed_products,
        }
    }
}
