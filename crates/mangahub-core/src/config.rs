use std::net::SocketAddr;

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{MangahubError, Result};

pub const DEFAULT_GATEWAY_PORT: u16 = 8080;
pub const DEFAULT_UDP_PORT: u16 = 12345;
pub const DEFAULT_SYNC_PORT: u16 = 8081;
pub const DEFAULT_LOOKUP_PORT: u16 = 50051;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_CONFIG_FILE: &str = "mangahub.toml";

pub const HUB_QUEUE_CAPACITY: usize = 1024;
pub const HUB_WRITE_TIMEOUT_MS: u64 = 5_000;
/// Datagrams longer than this are truncated by the kernel on receive.
pub const UDP_BUFFER_BYTES: usize = 1024;
pub const SYNC_MAX_FRAME_BYTES: usize = 16 * 1024;
pub const SYNC_READ_TIMEOUT_SECS: u64 = 30;
pub const MAX_CHAT_FRAME_BYTES: usize = 64 * 1024;
pub const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;
pub const LOOKUP_TIMEOUT_MS: u64 = 2_000;

/// Top-level config (mangahub.toml + MANGAHUB_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MangahubConfig {
    #[serde(default)]
    pub gateway: GatewayConfig,
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub udp: UdpConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub lookup: LookupConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_gateway_port")]
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: DEFAULT_GATEWAY_PORT,
        }
    }
}

impl GatewayConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.bind, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubConfig {
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// A sink that does not accept a write within this window is evicted.
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: HUB_QUEUE_CAPACITY,
            write_timeout_ms: HUB_WRITE_TIMEOUT_MS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UdpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_udp_port")]
    pub port: u16,
    #[serde(default = "default_udp_buffer")]
    pub buffer_bytes: usize,
    /// Where the gateway sends admin notifications. Usually its own ingress.
    #[serde(default = "default_notify_target")]
    pub notify_target: String,
}

impl Default for UdpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: DEFAULT_UDP_PORT,
            buffer_bytes: UDP_BUFFER_BYTES,
            notify_target: default_notify_target(),
        }
    }
}

impl UdpConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.bind, self.port)
    }

    pub fn notify_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.notify_target)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_sync_port")]
    pub port: u16,
    #[serde(default = "default_max_frame_bytes")]
    pub max_frame_bytes: usize,
    #[serde(default = "default_read_timeout_secs")]
    pub read_timeout_secs: u64,
    /// Address the gateway dials to forward progress updates.
    #[serde(default = "default_sync_target")]
    pub target: String,
    /// Run the progress relay inside the gateway process instead of standalone.
    #[serde(default)]
    pub embedded: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: DEFAULT_SYNC_PORT,
            max_frame_bytes: SYNC_MAX_FRAME_BYTES,
            read_timeout_secs: SYNC_READ_TIMEOUT_SECS,
            target: default_sync_target(),
            embedded: false,
        }
    }
}

impl SyncConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.bind, self.port)
    }

    pub fn target_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.target)
    }
}

/// Internal catalogue lookup service (gRPC).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_lookup_port")]
    pub port: u16,
    /// Address the gateway dials for manga lookups.
    #[serde(default = "default_lookup_target")]
    pub target: String,
    /// Per-call deadline on the gateway side.
    #[serde(default = "default_lookup_timeout_ms")]
    pub timeout_ms: u64,
    /// Serve lookups from inside the gateway process. Turn off when a
    /// standalone `mangahub-lookup` answers on `target`.
    #[serde(default = "default_true")]
    pub embedded: bool,
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: DEFAULT_LOOKUP_PORT,
            target: default_lookup_target(),
            timeout_ms: LOOKUP_TIMEOUT_MS,
            embedded: true,
        }
    }
}

impl LookupConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        socket_addr(&self.bind, self.port)
    }

    pub fn target_addr(&self) -> Result<SocketAddr> {
        parse_addr(&self.target)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used both to sign and to verify session tokens.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl")]
    pub token_ttl_secs: u64,
    /// Optional admin account created on startup when missing.
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_secs: TOKEN_TTL_SECS,
            admin_username: None,
            admin_password: None,
        }
    }
}

fn default_bind() -> String {
    DEFAULT_BIND.to_string()
}
fn default_gateway_port() -> u16 {
    DEFAULT_GATEWAY_PORT
}
fn default_udp_port() -> u16 {
    DEFAULT_UDP_PORT
}
fn default_sync_port() -> u16 {
    DEFAULT_SYNC_PORT
}
fn default_queue_capacity() -> usize {
    HUB_QUEUE_CAPACITY
}
fn default_write_timeout_ms() -> u64 {
    HUB_WRITE_TIMEOUT_MS
}
fn default_udp_buffer() -> usize {
    UDP_BUFFER_BYTES
}
fn default_notify_target() -> String {
    format!("127.0.0.1:{}", DEFAULT_UDP_PORT)
}
fn default_max_frame_bytes() -> usize {
    SYNC_MAX_FRAME_BYTES
}
fn default_read_timeout_secs() -> u64 {
    SYNC_READ_TIMEOUT_SECS
}
fn default_sync_target() -> String {
    format!("127.0.0.1:{}", DEFAULT_SYNC_PORT)
}
fn default_lookup_port() -> u16 {
    DEFAULT_LOOKUP_PORT
}
fn default_lookup_target() -> String {
    format!("127.0.0.1:{}", DEFAULT_LOOKUP_PORT)
}
fn default_lookup_timeout_ms() -> u64 {
    LOOKUP_TIMEOUT_MS
}
fn default_true() -> bool {
    true
}
fn default_db_path() -> String {
    "data/mangahub.db".to_string()
}
fn default_jwt_secret() -> String {
    "change-me".to_string()
}
fn default_token_ttl() -> u64 {
    TOKEN_TTL_SECS
}

fn socket_addr(bind: &str, port: u16) -> Result<SocketAddr> {
    parse_addr(&format!("{}:{}", bind, port))
}

fn parse_addr(s: &str) -> Result<SocketAddr> {
    s.parse()
        .map_err(|e| MangahubError::InvalidAddress(format!("{s}: {e}")))
}

impl MangahubConfig {
    /// Load config from a TOML file with MANGAHUB_* env var overrides.
    ///
    /// Nested keys use a double underscore: `MANGAHUB_AUTH__JWT_SECRET`.
    /// A missing file is not an error; every field has a default.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_FILE);

        Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("MANGAHUB_").split("__"))
            .extract()
            .map_err(|e| MangahubError::Config(e.to_string()))
    }

    /// Resolve the config path: explicit argument, then `MANGAHUB_CONFIG`.
    pub fn resolve_path(explicit: Option<String>) -> Option<String> {
        explicit.or_else(|| std::env::var("MANGAHUB_CONFIG").ok())
    }
}
