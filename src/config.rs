//! Start-up configuration.
//!
//! Everything here is resolved once before the server is initialized and is
//! never changed afterwards. Buffer capacities are not configurable at
//! runtime at all; they are const generic parameters of
//! [`BufferPool`](crate::buffer::BufferPool) with the defaults below.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use serde::Deserialize;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BACKLOG: i32 = 2;
pub const DEFAULT_MAX_ACCEPT_PER_POLL: usize = 1;
pub const DEFAULT_RECEIVE_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 2000;
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// Request scratch space. Browsers send a lot of headers, but only the
/// request line has to fit.
pub const DEFAULT_REQUEST_CAPACITY: usize = 512;
/// Response scratch space: dashboard page plus headers plus margin.
pub const DEFAULT_RESPONSE_CAPACITY: usize = 1400;

/// Environment variable naming an optional YAML config file.
pub const CONFIG_PATH_ENV: &str = "PICODASH_CONFIG";
/// Environment variable overriding `server.listen_addr`.
pub const LISTEN_ENV: &str = "LISTEN";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sampler: SamplerConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
    pub backlog: i32,
    /// Upper bound on connections handled by one `poll` call.
    pub max_accept_per_poll: usize,
    pub receive_timeout_ms: u64,
    pub send_timeout_ms: u64,
    /// How often the embedding loop calls `poll`.
    pub poll_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            backlog: DEFAULT_BACKLOG,
            max_accept_per_poll: DEFAULT_MAX_ACCEPT_PER_POLL,
            receive_timeout_ms: DEFAULT_RECEIVE_TIMEOUT_MS,
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl ServerConfig {
    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.receive_timeout_ms)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Bounds of the simulated sensor random walk.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub temperature_start: f32,
    pub temperature_min: f32,
    pub temperature_max: f32,
    pub water_start: f32,
    pub water_min: f32,
    pub water_max: f32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            temperature_start: 22.0,
            temperature_min: 15.0,
            temperature_max: 35.0,
            water_start: 50.0,
            water_min: 0.0,
            water_max: 100.0,
        }
    }
}

impl Config {
    /// Defaults, then the YAML file named by `PICODASH_CONFIG` (if set), then
    /// the `LISTEN` override.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };

        if let Ok(listen) = std::env::var(LISTEN_ENV) {
            cfg.server.listen_addr = listen
                .parse()
                .with_context(|| format!("invalid {LISTEN_ENV} address: {listen}"))?;
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_yaml_str(raw: &str) -> anyhow::Result<Self> {
        let cfg: Config = serde_yaml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_accept_per_poll == 0 {
            anyhow::bail!("server.max_accept_per_poll must be at least 1");
        }
        if self.server.backlog <= 0 {
            anyhow::bail!("server.backlog must be positive");
        }
        if self.server.receive_timeout_ms == 0 || self.server.send_timeout_ms == 0 {
            // a zero Duration is rejected by set_read_timeout/set_write_timeout
            anyhow::bail!("socket timeouts must be non-zero");
        }
        let s = &self.sampler;
        if !(s.temperature_min <= s.temperature_max && s.water_min <= s.water_max) {
            anyhow::bail!("sampler bounds are inverted");
        }
        Ok(())
    }
}
