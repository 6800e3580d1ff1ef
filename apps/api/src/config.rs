use anyhow::{bail, Context, Result};

const DEFAULT_AI_SERVICE_URL: &str = "http://127.0.0.1:8000";

/// Which object store backs resume uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    Local { upload_dir: String },
    S3(S3Settings),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub bucket: String,
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Resolved once at startup; fails fast if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    /// Always carries a scheme and never ends in `/`.
    pub ai_service_url: String,
    pub ai_timeout_secs: u64,
    pub storage: StorageBackend,
    pub match_concurrency: usize,
    pub cors_allowed_origins: Vec<String>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let storage = match or_default("STORAGE_BACKEND", "local").to_lowercase().as_str() {
            "local" => StorageBackend::Local {
                upload_dir: or_default("UPLOAD_DIR", "uploads"),
            },
            "s3" => StorageBackend::S3(S3Settings {
                bucket: require("S3_BUCKET")?,
                endpoint: require("S3_ENDPOINT")?,
                region: or_default("S3_REGION", "us-east-1"),
                access_key_id: require("AWS_ACCESS_KEY_ID")?,
                secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            }),
            other => bail!("STORAGE_BACKEND must be 'local' or 's3', got '{other}'"),
        };

        let match_concurrency = or_default("MATCH_CONCURRENCY", "4")
            .parse::<usize>()
            .context("MATCH_CONCURRENCY must be a positive integer")?;
        if match_concurrency == 0 {
            bail!("MATCH_CONCURRENCY must be at least 1");
        }

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            jwt_secret: require("JWT_SECRET")?,
            ai_service_url: normalize_base_url(&or_default(
                "AI_SERVICE_URL",
                DEFAULT_AI_SERVICE_URL,
            ))?,
            ai_timeout_secs: or_default("AI_TIMEOUT_SECS", "60")
                .parse::<u64>()
                .context("AI_TIMEOUT_SECS must be a number of seconds")?,
            storage,
            match_concurrency,
            cors_allowed_origins: or_default("CORS_ALLOWED_ORIGINS", "")
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            port: or_default("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}

/// Ensures the AI service base URL has a scheme and no trailing slash.
pub fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        bail!("AI_SERVICE_URL must not be empty");
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("http://{trimmed}"))
    }
}
