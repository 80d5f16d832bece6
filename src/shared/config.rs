use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncEngineConfig {
    pub database: DatabaseConfig,
    pub remote: RemoteConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    pub auto_sync: bool,
    pub sync_interval_secs: u64,
    pub max_retries: i32,
    pub pull_page_size: u32,
}

impl Default for SyncEngineConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: 5,
            },
            remote: RemoteConfig {
                base_url: "http://localhost:54321/rest/v1".to_string(),
                request_timeout_secs: 30,
            },
            sync: SyncConfig {
                auto_sync: true,
                sync_interval_secs: 300, // 5 minutes
                max_retries: 3,
                pull_page_size: 500,
            },
        }
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("./data"))
        .join("medsync");
    format!("sqlite://{}?mode=rwc", dir.join("medsync.db").display())
}

impl SyncEngineConfig {
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("MEDSYNC_DATABASE_URL") {
            if !v.trim().is_empty() {
                cfg.database.url = v;
            }
        }
        if let Ok(v) = std::env::var("MEDSYNC_REMOTE_URL") {
            if !v.trim().is_empty() {
                cfg.remote.base_url = v;
            }
        }
        if let Ok(v) = std::env::var("MEDSYNC_REQUEST_TIMEOUT_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.remote.request_timeout_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("MEDSYNC_AUTO_SYNC") {
            cfg.sync.auto_sync = parse_bool(&v, cfg.sync.auto_sync);
        }
        if let Ok(v) = std::env::var("MEDSYNC_SYNC_INTERVAL_SECS") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.sync_interval_secs = value.max(1);
            }
        }
        if let Ok(v) = std::env::var("MEDSYNC_MAX_RETRIES") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.max_retries = value.clamp(1, i32::MAX as u64) as i32;
            }
        }
        if let Ok(v) = std::env::var("MEDSYNC_PULL_PAGE_SIZE") {
            if let Some(value) = parse_u64(&v) {
                cfg.sync.pull_page_size = value.clamp(1, u32::MAX as u64) as u32;
            }
        }

        cfg
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.database.url.trim().is_empty() {
            return Err("Database url must not be empty".to_string());
        }
        if self.database.max_connections == 0 {
            return Err("Database max_connections must be greater than 0".to_string());
        }
        if self.remote.base_url.trim().is_empty() {
            return Err("Remote base_url must not be empty".to_string());
        }
        if self.sync.sync_interval_secs == 0 {
            return Err("Sync interval must be greater than 0".to_string());
        }
        if self.sync.max_retries <= 0 {
            return Err("Sync max_retries must be greater than 0".to_string());
        }
        if self.sync.pull_page_size == 0 {
            return Err("Pull page size must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn parse_bool(s: &str, default: bool) -> bool {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn parse_u64(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok()
}
