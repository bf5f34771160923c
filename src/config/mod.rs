use serde::Deserialize;
use std::path::{Path, PathBuf};

const DEFAULT_PORT: u16 = 3000;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `{data_dir}/config.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// HTTP server port (default: 3000).
    port: Option<u16>,
    /// Bind address (default: 127.0.0.1).
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,taskd=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" or "json" (default: "pretty").
    log_format: Option<String>,
    /// Environment name reported by /health (default: "development").
    environment: Option<String>,
    /// Allowed CORS origin; "*" = any origin (default: "*").
    cors_origin: Option<String>,
    /// Storage backend: "sqlite" or "memory" (default: "sqlite").
    storage: Option<String>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let contents = std::fs::read_to_string(&path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            // Logging is not initialized yet at config-assembly time.
            eprintln!(
                "warn: failed to parse {} — using defaults: {e}",
                path.display()
            );
            None
        }
    }
}

// ─── ServerConfig ─────────────────────────────────────────────────────────────

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub bind_address: String,
    /// Holds `config.toml` and `taskd.db`.
    pub data_dir: PathBuf,
    pub log: String,
    /// "pretty" | "json"
    pub log_format: String,
    /// Environment name reported by /health.
    pub environment: String,
    /// "*" = any origin, otherwise the exact allowed origin.
    pub cors_origin: String,
    /// "sqlite" | "memory"
    pub storage: String,
}

impl ServerConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. Built-in defaults
    pub fn new(
        port: Option<u16>,
        bind_address: Option<String>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        in_memory: bool,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);

        // Load TOML as the lowest-priority override layer
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let bind_address = bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("TASKD_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let environment = std::env::var("TASKD_ENV")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.environment)
            .unwrap_or_else(|| "development".to_string());

        let cors_origin = std::env::var("TASKD_CORS_ORIGIN")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.cors_origin)
            .unwrap_or_else(|| "*".to_string());

        let storage = if in_memory {
            "memory".to_string()
        } else {
            toml.storage.unwrap_or_else(|| "sqlite".to_string())
        };

        Self {
            port,
            bind_address,
            data_dir,
            log,
            log_format,
            environment,
            cors_origin,
            storage,
        }
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskd");
        }
    }
    #[cfg(target_os = "linux")]
    {
        // $XDG_DATA_HOME/taskd or ~/.local/share/taskd
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("taskd");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskd");
        }
    }
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("taskd");
        }
    }
    PathBuf::from(".taskd")
}
