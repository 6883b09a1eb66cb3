use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub receiver: ReceiverConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    /// Idle limit for a connection outside `Idle`.
    pub watchdog_ms: u64,
    /// Grace period before a finished connection is closed.
    pub cooldown_ms: u64,
    /// Period of the scheduling loop driving the engine.
    pub tick_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:8080".to_string(),
            watchdog_ms: 1000,
            cooldown_ms: 10,
            tick_ms: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Interval between two recorded time samples.
    pub interval_ms: u64,
}

impl Default for ReceiverConfig {
    fn default() -> Self {
        Self { interval_ms: 60_000 }
    }
}

impl Config {
    /// Loads the YAML file named by `DCF77_CONFIG` (or `config.yaml`), then
    /// applies the `LISTEN` override.
    ///
    /// A missing `config.yaml` is not an error; a missing file that was asked
    /// for explicitly is.
    pub fn load() -> anyhow::Result<Self> {
        let mut cfg = match std::env::var("DCF77_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(DEFAULT_CONFIG_PATH)?
            }
            Err(_) => Self::default(),
        };

        if let Ok(listen_addr) = std::env::var("LISTEN") {
            cfg.server.listen_addr = listen_addr;
        }

        Ok(cfg)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}
