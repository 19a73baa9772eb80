use sentinelle_core::dashboard::{
    DashboardSettings, DEFAULT_DUE_SOON_DAYS, DEFAULT_INSPECTION_HORIZON_DAYS,
};

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Windows of the dashboard counters.
    pub dashboard: DashboardSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                 |
    /// |---------------------------|-------------------------|
    /// | `HOST`                    | `0.0.0.0`               |
    /// | `PORT`                    | `3000`                  |
    /// | `CORS_ORIGINS`            | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                    |
    /// | `DUE_SOON_DAYS`           | `7`                     |
    /// | `INSPECTION_HORIZON_DAYS` | `30`                    |
    ///
    /// Panics on malformed numbers so misconfiguration fails at startup.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] over an arbitrary variable source.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let host = var("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = var("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let due_soon_days: u32 = var("DUE_SOON_DAYS")
            .map(|v| v.parse().expect("DUE_SOON_DAYS must be a valid u32"))
            .unwrap_or(DEFAULT_DUE_SOON_DAYS);

        let inspection_horizon_days: u32 = var("INSPECTION_HORIZON_DAYS")
            .map(|v| v.parse().expect("INSPECTION_HORIZON_DAYS must be a valid u32"))
            .unwrap_or(DEFAULT_INSPECTION_HORIZON_DAYS);

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            dashboard: DashboardSettings {
                due_soon_days,
                inspection_horizon_days,
            },
        }
    }
}
