//! Server configuration module.
//!
//! Handles loading configuration from environment variables with sensible defaults.

use anyhow::{anyhow, bail, Context, Result};
use shared::models::OrganizationId;
use shared::tenancy::{AccessTokenEntry, TagEntry};
use std::net::SocketAddr;
use std::str::FromStr;

/// Secret used to digest tokens when `OTELGATE_TOKEN_SECRET` is unset.
pub const DEV_TOKEN_SECRET: &str = "otelgate-dev-secret";

/// Where converted documents are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    /// Process-local, lost on restart.
    #[default]
    Memory,
    /// `ClickHouse` tables.
    ClickHouse,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "clickhouse" => Ok(Self::ClickHouse),
            other => bail!("unknown storage backend: {other}"),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => bail!("unknown log format: {other}"),
        }
    }
}

/// Server configuration.
///
/// Configuration values can be set via environment variables:
/// - `OTELGATE_HOST`: The host address to bind to (default: "0.0.0.0")
/// - `OTELGATE_HTTP_PORT`: The HTTP port (default: 8080)
/// - `OTELGATE_GRPC_PORT`: The OTLP gRPC port (default: 4317)
/// - `OTELGATE_TOKEN_SECRET`: Key for token digests
/// - `OTELGATE_ACCESS_TOKENS`: Comma-separated `digest[:organization]` entries
/// - `OTELGATE_ORGANIZATIONS`: Comma-separated organizations served at startup
/// - `OTELGATE_TAGS`: Comma-separated `organization:tag` entries accepted as upload tags
/// - `OTELGATE_ADMIN_TOKEN`: Bearer token guarding the admin routes
/// - `OTELGATE_STORAGE`: `memory` or `clickhouse` (default: memory)
/// - `OTELGATE_LOG_FORMAT`: `pretty` or `json` (default: pretty)
#[derive(Debug, Clone)]
pub struct Config {
    /// The host address to bind to.
    pub host: String,
    /// The HTTP port.
    pub http_port: u16,
    /// The gRPC port.
    pub grpc_port: u16,
    /// Key for token digests.
    pub token_secret: String,
    /// Pre-provisioned access tokens.
    pub access_tokens: Vec<AccessTokenEntry>,
    /// Organizations registered at startup.
    pub organizations: Vec<OrganizationId>,
    /// Tags accepted on uploads, per organization.
    pub tags: Vec<TagEntry>,
    /// Bearer token guarding the admin routes; unguarded when `None`.
    pub admin_token: Option<String>,
    /// Storage backend.
    pub storage: StorageBackend,
    /// Log output format.
    pub log_format: LogFormat,
}

fn parse_list<T>(raw: Option<String>, what: &str) -> Result<Vec<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>()
                .map_err(|e| anyhow!("invalid {what} entry {item:?}: {e}"))
        })
        .collect()
}

fn parse_port(raw: Option<String>, var: &str, default: u16) -> Result<u16> {
    raw.map(|p| p.parse::<u16>())
        .transpose()
        .with_context(|| format!("{var} is not a valid port"))
        .map(|port| port.unwrap_or(default))
}

impl Config {
    /// Creates a new configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates a configuration reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is set but cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Ok(Self {
            host: non_empty("OTELGATE_HOST").unwrap_or(defaults.host),
            http_port: parse_port(
                non_empty("OTELGATE_HTTP_PORT"),
                "OTELGATE_HTTP_PORT",
                defaults.http_port,
            )?,
            grpc_port: parse_port(
                non_empty("OTELGATE_GRPC_PORT"),
                "OTELGATE_GRPC_PORT",
                defaults.grpc_port,
            )?,
            token_secret: non_empty("OTELGATE_TOKEN_SECRET").unwrap_or(defaults.token_secret),
            access_tokens: parse_list(non_empty("OTELGATE_ACCESS_TOKENS"), "access token")?,
            organizations: parse_list(non_empty("OTELGATE_ORGANIZATIONS"), "organization")?,
            tags: parse_list(non_empty("OTELGATE_TAGS"), "tag")?,
            admin_token: non_empty("OTELGATE_ADMIN_TOKEN"),
            storage: non_empty("OTELGATE_STORAGE")
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
            log_format: non_empty("OTELGATE_LOG_FORMAT")
                .map(|s| s.parse())
                .transpose()?
                .unwrap_or_default(),
        })
    }

    /// Returns the socket address of the HTTP server.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not a valid address.
    pub fn http_addr(&self) -> Result<SocketAddr> {
        self.socket_addr(self.http_port)
    }

    /// Returns the socket address of the gRPC server.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is not a valid address.
    pub fn grpc_addr(&self) -> Result<SocketAddr> {
        self.socket_addr(self.grpc_port)
    }

    fn socket_addr(&self, port: u16) -> Result<SocketAddr> {
        format!("{}:{}", self.host, port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, port))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            http_port: 8080,
            grpc_port: 4317,
            token_secret: DEV_TOKEN_SECRET.to_string(),
            access_tokens: Vec::new(),
            organizations: Vec::new(),
            tags: Vec::new(),
            admin_token: None,
            storage: StorageBackend::Memory,
            log_format: LogFormat::Pretty,
        }
    }
}
