use serde::Deserialize;
use std::env;

// Top-level configuration container.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub inventory: InventoryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub rust_log: String,
}

// Tuning knobs for the seat-inventory commit path.
#[derive(Debug, Clone, Deserialize)]
pub struct InventoryConfig {
    /// Attempts to win a row's commit scope before surfacing `Contention`.
    pub max_commit_attempts: u32,
    /// Page size used by `GET /events` when the caller sends none.
    pub default_page_size: u32,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            app: AppConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .unwrap_or_else(|_| "8000".to_string())
                    .parse()
                    .expect("PORT must be a valid number"),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
                rust_log: env::var("RUST_LOG")
                    .unwrap_or_else(|_| "boxoffice=debug,tower_http=debug".to_string()),
            },
            inventory: InventoryConfig {
                max_commit_attempts: env::var("MAX_COMMIT_ATTEMPTS")
                    .unwrap_or_else(|_| "1024".to_string())
                    .parse()
                    .expect("MAX_COMMIT_ATTEMPTS must be a valid number"),
                default_page_size: env::var("DEFAULT_PAGE_SIZE")
                    .unwrap_or_else(|_| "6".to_string())
                    .parse()
                    .expect("DEFAULT_PAGE_SIZE must be a valid number"),
            },
        }
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        InventoryConfig {
            max_commit_attempts: 1024,
            default_page_size: 6,
        }
    }
}
