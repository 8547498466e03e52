use anyhow::{Context, Result};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Top-level application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub sites: SitesConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// HTTP client configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Listing page per site
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SitesConfig {
    #[serde(default = "default_codeforces_url")]
    pub codeforces_url: String,

    #[serde(default = "default_atcoder_url")]
    pub atcoder_url: String,

    #[serde(default = "default_codechef_url")]
    pub codechef_url: String,
}

/// Zone start times are displayed in
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub utc_offset_hours: i32,
}

/// HTTP service configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

// ── Defaults ─────────────────────────────────────────────────────────────────

fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    "contest-radar/0.1 (upcoming contest listings)".to_string()
}
fn default_codeforces_url() -> String {
    crate::scraper::sites::CODEFORCES.url.to_string()
}
fn default_atcoder_url() -> String {
    crate::scraper::sites::ATCODER.url.to_string()
}
fn default_codechef_url() -> String {
    crate::scraper::sites::CODECHEF.url.to_string()
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SitesConfig {
    fn default() -> Self {
        Self {
            codeforces_url: default_codeforces_url(),
            atcoder_url: default_atcoder_url(),
            codechef_url: default_codechef_url(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl DisplayConfig {
    pub fn offset(&self) -> Result<FixedOffset> {
        self.utc_offset_hours
            .checked_mul(3600)
            .and_then(FixedOffset::east_opt)
            .with_context(|| format!("display.utc_offset_hours out of range: {}", self.utc_offset_hours))
    }
}

// ── Loader ───────────────────────────────────────────────────────────────────

impl AppConfig {
    /// Load configuration from file + environment overrides
    pub fn load() -> Result<Self> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(
                config::File::with_name("config/default")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(
                config::File::with_name("config/local")
                    .required(false)
                    .format(config::FileFormat::Toml),
            )
            .add_source(config::Environment::with_prefix("CONTESTS").separator("__"))
            .build()?;

        cfg.try_deserialize().context("Invalid configuration")
    }
}
