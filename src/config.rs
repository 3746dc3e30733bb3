use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub probe: ProbeConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Adds a permissive CORS layer when true (chart client served from
    /// another origin).
    #[serde(default)]
    pub permissive_cors: bool,
    /// Directory served at the root path (the chart client build). Off when
    /// unset.
    #[serde(default)]
    pub static_dir: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Keep a created_at index on the results table. Toggling is applied at
    /// startup and is idempotent either way.
    #[serde(default = "default_time_index")]
    pub time_index: bool,
}

fn default_time_index() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    pub target_addr: String,
    /// Label stored on every sample; aggregation fans out by this value.
    pub network_type: String,
    pub interval_ms: u64,
    #[serde(default = "default_probe_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub use_ipv6: bool,
}

fn default_probe_timeout_secs() -> u64 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// How often to log app stats (samples inserted, insert failures) at INFO level.
    pub stats_log_interval_secs: u64,
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            !self.probe.target_addr.is_empty(),
            "probe.target_addr must be non-empty"
        );
        anyhow::ensure!(
            !self.probe.network_type.is_empty(),
            "probe.network_type must be non-empty"
        );
        anyhow::ensure!(
            self.probe.interval_ms > 0,
            "probe.interval_ms must be > 0, got {}",
            self.probe.interval_ms
        );
        anyhow::ensure!(
            self.probe.timeout_secs > 0,
            "probe.timeout_secs must be > 0, got {}",
            self.probe.timeout_secs
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
