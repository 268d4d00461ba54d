use std::sync::Arc;

use tower_cookies::Key;

use crate::{
    state::{Config, MediaConfig},
    store::memory::MemoryStore,
    AppState,
};

pub(crate) fn config() -> Config {
    Config {
        domain: "localhost:3000".to_string(),
        protocol: "http".to_string(),
        session_duration_days: Config::DEFAULT_SESSION_DURATION_DAYS,
        bcrypt_cost: 4,
        media: MediaConfig {
            public_key: "public_test_key".to_string(),
            private_key: "private_test_key".to_string(),
            url_endpoint: "https://cdn.example.com/reelup".to_string(),
            upload_url: "https://upload.example.com/api/v1/files/upload".to_string(),
            token_ttl_secs: MediaConfig::DEFAULT_TOKEN_TTL_SECS,
        },
    }
}

pub(crate) fn state() -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState::new(config(), store.clone(), Key::generate());
    (state, store)
}
