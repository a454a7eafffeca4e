use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub alert_query: AlertQueryConfig,
    #[serde(default)]
    pub prometheus: PrometheusConfig,
    #[serde(default)]
    pub notify: NotifyConfig,
    #[serde(default)]
    pub high_availability: HighAvailabilityConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: default_http_port(),
            database: DatabaseConfig::default(),
            alert_query: AlertQueryConfig::default(),
            prometheus: PrometheusConfig::default(),
            notify: NotifyConfig::default(),
            high_availability: HighAvailabilityConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{path}'"))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{path}'"))?;
        Ok(config)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Full connection URL. When absent a SQLite file under `data_dir` is used.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            data_dir: default_data_dir(),
        }
    }
}

impl DatabaseConfig {
    pub fn connection_url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!(
                "sqlite://{}/fleetwatch.db?mode=rwc",
                self.data_dir.trim_end_matches('/')
            ),
        }
    }

    /// Connection URL with any password replaced, for logging.
    pub fn redacted_url(&self) -> String {
        let url = self.connection_url();
        let Some((scheme, rest)) = url.split_once("://") else {
            return url;
        };
        let Some((userinfo, host)) = rest.split_once('@') else {
            return url;
        };
        match userinfo.split_once(':') {
            Some((user, _)) => format!("{scheme}://{user}:***@{host}"),
            None => url,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertQueryConfig {
    #[serde(default = "default_alert_query_enabled")]
    pub enabled: bool,
    #[serde(default = "default_alert_query_interval_secs")]
    pub interval_secs: u64,
    /// Delay before the first pass so the backend has evaluated its rules.
    #[serde(default = "default_alert_query_initial_delay_secs")]
    pub initial_delay_secs: u64,
    #[serde(default = "default_alert_query_batch_size")]
    pub batch_size: usize,
}

impl Default for AlertQueryConfig {
    fn default() -> Self {
        Self {
            enabled: default_alert_query_enabled(),
            interval_secs: default_alert_query_interval_secs(),
            initial_delay_secs: default_alert_query_initial_delay_secs(),
            batch_size: default_alert_query_batch_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrometheusConfig {
    /// When false the backend is treated as reporting nothing, which
    /// resolves every firing alert on the next pass.
    #[serde(default = "default_prometheus_enabled")]
    pub enabled: bool,
    #[serde(default = "default_prometheus_base_url")]
    pub base_url: String,
    #[serde(default = "default_prometheus_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PrometheusConfig {
    fn default() -> Self {
        Self {
            enabled: default_prometheus_enabled(),
            base_url: default_prometheus_base_url(),
            timeout_secs: default_prometheus_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Dispatch endpoint signalled after each pass. Unset means log only.
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default = "default_notify_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            timeout_secs: default_notify_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Leader,
    Follower,
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "leader" => Ok(Role::Leader),
            "follower" => Ok(Role::Follower),
            _ => Err(format!("unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HighAvailabilityConfig {
    #[serde(default = "default_role")]
    pub role: Role,
    /// File holding `leader` or `follower`, re-read on every tick. Overrides
    /// `role` while present and readable.
    #[serde(default)]
    pub follower_marker_file: Option<String>,
}

impl Default for HighAvailabilityConfig {
    fn default() -> Self {
        Self {
            role: default_role(),
            follower_marker_file: None,
        }
    }
}

// ---- Seed file types (used by `init-catalog` CLI subcommand) ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSeedFile {
    #[serde(default)]
    pub configurations: Vec<SeedConfiguration>,
    #[serde(default)]
    pub definitions: Vec<SeedDefinition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConfiguration {
    pub id: String,
    pub customer_id: String,
    pub name: String,
    #[serde(default = "default_seed_target_type")]
    pub target_type: String,
    #[serde(default = "default_seed_severity")]
    pub default_severity: String,
    #[serde(default = "default_seed_active")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedDefinition {
    pub id: String,
    pub customer_id: String,
    pub configuration_id: String,
}

fn default_http_port() -> u16 {
    8080
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_alert_query_enabled() -> bool {
    true
}

fn default_alert_query_interval_secs() -> u64 {
    30
}

fn default_alert_query_initial_delay_secs() -> u64 {
    30
}

fn default_alert_query_batch_size() -> usize {
    fleetwatch_alert::DEFAULT_BATCH_SIZE
}

fn default_prometheus_enabled() -> bool {
    true
}

fn default_prometheus_base_url() -> String {
    "http://localhost:9090".to_string()
}

fn default_prometheus_timeout_secs() -> u64 {
    10
}

fn default_notify_timeout_secs() -> u64 {
    10
}

fn default_role() -> Role {
    Role::Leader
}

fn default_seed_target_type() -> String {
    "UNIVERSE".to_string()
}

fn default_seed_severity() -> String {
    "SEVERE".to_string()
}

fn default_seed_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_uses_defaults() {
        let config: ServerConfig = toml::from_str("").unwrap();
        assert_eq!(config.http_port, 8080);
        assert!(config.alert_query.enabled);
        assert_eq!(config.alert_query.interval_secs, 30);
        assert_eq!(config.alert_query.initial_delay_secs, 30);
        assert_eq!(config.alert_query.batch_size, 1000);
        assert_eq!(config.high_availability.role, Role::Leader);
        assert!(config.notify.webhook_url.is_none());
        assert_eq!(
            config.database.connection_url(),
            "sqlite://data/fleetwatch.db?mode=rwc"
        );
    }

    #[test]
    fn load_reads_every_section() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
http_port = 9100

[database]
url = "postgres://fw:secret@db:5432/fleetwatch"

[alert_query]
interval_secs = 15
batch_size = 250

[prometheus]
enabled = false
base_url = "http://prom:9090"

[notify]
webhook_url = "http://dispatcher/hook"

[high_availability]
role = "follower"
follower_marker_file = "/run/fleetwatch/role"
"#
        )
        .unwrap();

        let config = ServerConfig::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.http_port, 9100);
        assert_eq!(config.alert_query.interval_secs, 15);
        assert_eq!(config.alert_query.initial_delay_secs, 30);
        assert_eq!(config.alert_query.batch_size, 250);
        assert!(!config.prometheus.enabled);
        assert_eq!(config.prometheus.timeout_secs, 10);
        assert_eq!(config.notify.webhook_url.as_deref(), Some("http://dispatcher/hook"));
        assert_eq!(config.high_availability.role, Role::Follower);
        assert_eq!(
            config.database.redacted_url(),
            "postgres://fw:***@db:5432/fleetwatch"
        );
    }

    #[test]
    fn load_reports_missing_file() {
        let err = ServerConfig::load("/nonexistent/fleetwatch.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let result: Result<ServerConfig, _> =
            toml::from_str("[high_availability]\nrole = \"observer\"\n");
        assert!(result.is_err());
        assert_eq!("LEADER".parse::<Role>(), Ok(Role::Leader));
    }
}
