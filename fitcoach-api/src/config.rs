/// Configuration management for the API server
///
/// This module loads configuration from environment variables and provides
/// a type-safe configuration struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` or unset for any
/// - `PRODUCTION`: Enables HSTS and `Secure` cookies (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `SUPABASE_URL` / `NEXT_PUBLIC_SUPABASE_URL`: Identity provider URL (required)
/// - `SUPABASE_ANON_KEY` / `NEXT_PUBLIC_SUPABASE_ANON_KEY`: Provider API key (required)
/// - `GEMINI_API_KEY`: Model API key (required)
/// - `GEMINI_MODEL`: Model name (default: gemini-1.5-flash)
/// - `GEMINI_BASE_URL`: Model endpoint override
/// - `NEXT_PUBLIC_SITE_URL`: Front-end origin for redirects (default: http://localhost:3000)
/// - `NEXT_PUBLIC_CHAT_COMING_SOON`: Restrict chat to admins (default: false)
/// - `MAINTENANCE_MODE`: Start in maintenance mode (default: false)
/// - `RUST_LOG`: Log filter (default: fitcoach_api=debug,tower_http=debug)
///
/// Boolean flags accept `true`, `1`, `yes` and `on` (case-insensitive).
///
/// # Example
///
/// ```no_run
/// use fitcoach_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use fitcoach_shared::llm::gemini::DEFAULT_BASE_URL as GEMINI_DEFAULT_BASE_URL;
use serde::{Deserialize, Serialize};
use std::env;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Identity provider configuration
    pub supabase: SupabaseConfig,

    /// Language model configuration
    pub gemini: GeminiConfig,

    /// Front-end site and feature flags
    pub site: SiteConfig,

    /// Initial maintenance flag
    pub maintenance_mode: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,

    /// Production deployment
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Identity provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupabaseConfig {
    /// Project URL, e.g. `https://abc.supabase.co`
    pub url: String,

    /// Public anon key sent as `apikey`
    pub anon_key: String,
}

/// Language model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

/// Front-end site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Origin that relative redirects are resolved against
    pub url: String,

    /// Chat is restricted to admins while this is set
    pub chat_coming_soon: bool,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Required environment variables are missing
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |keys: &[&str]| -> anyhow::Result<String> {
            keys.iter()
                .find_map(|key| var(key))
                .ok_or_else(|| anyhow::anyhow!("{} environment variable is required", keys[0]))
        };
        let flag = |key: &str| -> anyhow::Result<bool> {
            match var(key) {
                Some(value) => parse_bool(&value)
                    .ok_or_else(|| anyhow::anyhow!("{} must be a boolean, got {:?}", key, value)),
                None => Ok(false),
            }
        };

        let api_port = var("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse::<u32>()
            .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;

        let cors_origins = var("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            api: ApiConfig {
                host: var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: api_port,
                cors_origins,
                production: flag("PRODUCTION")?,
            },
            database: DatabaseConfig {
                url: required(&["DATABASE_URL"])?,
                max_connections,
            },
            supabase: SupabaseConfig {
                url: required(&["SUPABASE_URL", "NEXT_PUBLIC_SUPABASE_URL"])?,
                anon_key: required(&["SUPABASE_ANON_KEY", "NEXT_PUBLIC_SUPABASE_ANON_KEY"])?,
            },
            gemini: GeminiConfig {
                api_key: required(&["GEMINI_API_KEY"])?,
                model: var("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string()),
                base_url: var("GEMINI_BASE_URL")
                    .unwrap_or_else(|| GEMINI_DEFAULT_BASE_URL.to_string()),
            },
            site: SiteConfig {
                url: var("NEXT_PUBLIC_SITE_URL")
                    .unwrap_or_else(|| "http://localhost:3000".to_string())
                    .trim_end_matches('/')
                    .to_string(),
                chat_coming_soon: flag("NEXT_PUBLIC_CHAT_COMING_SOON")?,
            },
            maintenance_mode: flag("MAINTENANCE_MODE")?,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Parses a boolean flag value
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
