use std::env;
use std::sync::Arc;

use base64::Engine as _;
use color_eyre::eyre::{eyre, WrapErr as _};
use tower_cookies::Key;

use crate::store::{memory::MemoryStore, postgres::PgStore, Store};
use crate::password::DecoyHash;
use crate::uploads::UploadSigner;

/// Settings for the media CDN that receives direct uploads
#[derive(Clone, Debug)]
pub struct MediaConfig {
    pub public_key: String,
    pub private_key: String,
    pub url_endpoint: String,
    /// Where browsers POST the file itself
    pub upload_url: String,
    /// Lifetime of issued upload tokens, in seconds
    pub token_ttl_secs: i64,
}

impl MediaConfig {
    /// Upload tokens may live at most an hour
    pub const MAX_TOKEN_TTL_SECS: i64 = 60 * 60;
    pub const DEFAULT_TOKEN_TTL_SECS: i64 = 30 * 60;
    pub const DEFAULT_UPLOAD_URL: &'static str = "https://upload.imagekit.io/api/v1/files/upload";

    pub fn from_env() -> crate::Result<Self> {
        let public_key = required_var("MEDIA_PUBLIC_KEY")?;
        let private_key = required_var("MEDIA_PRIVATE_KEY")?;
        let url_endpoint = required_var("MEDIA_URL_ENDPOINT")?;
        let upload_url =
            env::var("MEDIA_UPLOAD_URL").unwrap_or_else(|_| Self::DEFAULT_UPLOAD_URL.to_string());
        let token_ttl_secs =
            parse_var("UPLOAD_TOKEN_TTL_SECS")?.unwrap_or(Self::DEFAULT_TOKEN_TTL_SECS);

        Ok(Self {
            public_key,
            private_key,
            url_endpoint,
            upload_url,
            token_ttl_secs: token_ttl_secs.clamp(1, Self::MAX_TOKEN_TTL_SECS),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub domain: String,
    pub protocol: String,
    pub session_duration_days: i64,
    pub bcrypt_cost: u32,
    pub media: MediaConfig,
}

impl Config {
    pub const DEFAULT_SESSION_DURATION_DAYS: i64 = 30;
    pub const MAX_SESSION_DURATION_DAYS: i64 = 3650;

    pub fn from_env() -> crate::Result<Self> {
        let bcrypt_cost = parse_var("BCRYPT_COST")?.unwrap_or(bcrypt::DEFAULT_COST);
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(eyre!("BCRYPT_COST must be between 4 and 31, got {}", bcrypt_cost));
        }

        let session_duration_days =
            Self::session_duration_days(parse_var("SESSION_DURATION_DAYS")?)?;

        Ok(Self {
            domain: required_var("DOMAIN")?,
            protocol: env::var("PROTO").unwrap_or_else(|_| "https".to_string()),
            session_duration_days,
            bcrypt_cost,
            media: MediaConfig::from_env()?,
        })
    }

    fn session_duration_days(raw: Option<i64>) -> crate::Result<i64> {
        let days = raw.unwrap_or(Self::DEFAULT_SESSION_DURATION_DAYS);
        if !(1..=Self::MAX_SESSION_DURATION_DAYS).contains(&days) {
            return Err(eyre!(
                "SESSION_DURATION_DAYS must be between 1 and {}, got {}",
                Self::MAX_SESSION_DURATION_DAYS,
                days
            ));
        }

        Ok(days)
    }

    /// Whether cookies should carry the `Secure` attribute
    pub fn secure_cookies(&self) -> bool {
        self.protocol == "https"
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub cookie_key: Key,
    pub config: Arc<Config>,
    pub uploads: UploadSigner,
    pub decoy_hash: DecoyHash,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>, cookie_key: Key) -> Self {
        let uploads = UploadSigner::new(&config.media);
        let decoy_hash = DecoyHash::new(config.bcrypt_cost);

        Self {
            store,
            cookie_key,
            config: Arc::new(config),
            uploads,
            decoy_hash,
        }
    }

    pub async fn from_env() -> crate::Result<Self> {
        let config = Config::from_env()?;
        let cookie_key = cookie_key_from_env_or_generate()?;

        let database_url =
            env::var("DATABASE_URL").wrap_err("DATABASE_URL environment variable not set")?;
        let store: Arc<dyn Store> = if database_url == "memory" {
            tracing::warn!("DATABASE_URL=memory, users and sessions will not survive a restart");
            Arc::new(MemoryStore::default())
        } else {
            let pool = crate::db::get_pool().await?;
            Arc::new(PgStore::new(pool.clone()))
        };

        tracing::info!(
            domain = %config.domain,
            media_endpoint = %config.media.url_endpoint,
            "Loaded configuration"
        );

        let state = Self::new(config, store, cookie_key);
        state.decoy_hash.get().await?;

        Ok(state)
    }
}

/// Reads `COOKIE_KEY` (base64, at least 64 bytes) or generates a throwaway key
pub fn cookie_key_from_env_or_generate() -> crate::Result<Key> {
    match env::var("COOKIE_KEY") {
        Ok(encoded) => {
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(encoded.trim())
                .wrap_err("COOKIE_KEY is not valid base64")?;

            Key::try_from(bytes.as_slice())
                .map_err(|e| eyre!("COOKIE_KEY must decode to at least 64 bytes: {}", e))
        }
        Err(_) => {
            tracing::warn!("COOKIE_KEY not set, generating one. Sessions will not survive a restart");
            Ok(Key::generate())
        }
    }
}

fn required_var(name: &str) -> crate::Result<String> {
    env::var(name).map_err(|_| eyre!("{} environment variable not set", name))
}

fn parse_var<T>(name: &str) -> crate::Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| eyre!("Invalid value for {}: {}", name, e)),
        Err(_) => Ok(None),
    }
}
