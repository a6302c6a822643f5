use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub security: SecurityConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub routing: RoutingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Tracking subsystem tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackingConfig {
    /// Drivers with a ping newer than this are reported online.
    #[serde(default = "default_online_threshold")]
    pub online_threshold_secs: i64,

    /// GeoPoint retention window for the cleanup job.
    #[serde(default = "default_retention_days")]
    pub geo_point_retention_days: u32,

    /// Lifetime of an in-memory geofence registration.
    #[serde(default = "default_geofence_ttl_hours")]
    pub geofence_ttl_hours: i64,

    /// Cluster radius used when the map view does not specify one.
    #[serde(default = "default_cluster_radius_km")]
    pub default_cluster_radius_km: f64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            online_threshold_secs: default_online_threshold(),
            geo_point_retention_days: default_retention_days(),
            geofence_ttl_hours: default_geofence_ttl_hours(),
            default_cluster_radius_km: default_cluster_radius_km(),
        }
    }
}

/// Routing provider selection.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Provider: "stub" (no road network) or "osrm".
    #[serde(default = "default_routing_provider")]
    pub provider: String,

    /// OSRM service URL (required for the osrm provider).
    #[serde(default)]
    pub url: String,

    /// Request timeout in milliseconds for provider calls.
    #[serde(default = "default_routing_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            provider: default_routing_provider(),
            url: String::new(),
            timeout_ms: default_routing_timeout_ms(),
        }
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_online_threshold() -> i64 {
    300
}
fn default_retention_days() -> u32 {
    30
}
fn default_geofence_ttl_hours() -> i64 {
    24
}
fn default_cluster_radius_km() -> f64 {
    2.0
}
fn default_routing_provider() -> String {
    "stub".to_string()
}
fn default_routing_timeout_ms() -> u64 {
    10_000
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with LM__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("LM").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    /// Socket address the server binds to.
    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .expect("Invalid server host/port configuration")
    }
}
