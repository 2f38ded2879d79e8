//! Server Configuration
//!
//! Resolves the configuration file before tracing is initialised, so progress
//! is reported on stderr.

use std::path::{Path, PathBuf};

use datastream_tsdb::config::Config;

/// Default configuration file looked up in the working directory
const DEFAULT_CONFIG_FILE: &str = "application.toml";

/// Load configuration from file or environment
///
/// Priority:
/// 1. `explicit` path (the `--config` flag)
/// 2. DATASTREAM_CONFIG environment variable
/// 3. application.toml
/// 4. Default configuration
///
/// Environment overrides are applied in every case. A path given through
/// the flag or the environment variable must load; only the implicit
/// application.toml falls back to defaults on error.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, String> {
    let from_env = std::env::var("DATASTREAM_CONFIG").ok().map(PathBuf::from);

    if let Some(path) = explicit.map(Path::to_path_buf).or(from_env) {
        let config = Config::load_with_env(&path)
            .map_err(|e| format!("failed to load config from {}: {}", path.display(), e))?;
        eprintln!("[config] Loaded configuration from: {}", path.display());
        return Ok(config);
    }

    let default_path = Path::new(DEFAULT_CONFIG_FILE);
    if default_path.exists() {
        match Config::load_with_env(default_path) {
            Ok(config) => {
                eprintln!("[config] Loaded configuration from {}", DEFAULT_CONFIG_FILE);
                return Ok(config);
            },
            Err(e) => {
                eprintln!(
                    "[config] Failed to parse {}: {}. Using defaults.",
                    DEFAULT_CONFIG_FILE, e
                );
            },
        }
    }

    eprintln!("[config] Using default configuration");
    Ok(Config::from_env())
}

/// Apply `--listen host:port` to the server section
pub fn apply_listen_override(config: &mut Config, listen: &str) -> Result<(), String> {
    let (host, port) = listen
        .rsplit_once(':')
        .ok_or_else(|| format!("listen address '{}' must be host:port", listen))?;
    config.server.port = port
        .parse()
        .map_err(|_| format!("invalid port in listen address '{}'", listen))?;
    config.server.host = host.to_string();
    Ok(())
}
