use serde::Deserialize;

use crate::scheduler::parse_schedule;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Snapshots older than this are deleted by the retention sweep.
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
}

fn default_retention_days() -> u32 {
    14
}

/// Cron expressions (UTC). Five-field standard syntax or six/seven-field with seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_collect_schedule")]
    pub collect: String,
    #[serde(default = "default_retention_schedule")]
    pub retention: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            collect: default_collect_schedule(),
            retention: default_retention_schedule(),
        }
    }
}

fn default_collect_schedule() -> String {
    "* * * * *".into()
}

fn default_retention_schedule() -> String {
    "0 0 * * *".into()
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

    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.database.retention_days))
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
            self.database.retention_days > 0,
            "database.retention_days must be > 0, got {}",
            self.database.retention_days
        );
        parse_schedule(&self.schedule.collect)
            .map_err(|e| anyhow::anyhow!("schedule.collect: {}", e))?;
        parse_schedule(&self.schedule.retention)
            .map_err(|e| anyhow::anyhow!("schedule.retention: {}", e))?;
        Ok(())
    }
}
