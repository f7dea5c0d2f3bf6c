use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DATABASE: &str = "todo.db";

/// Contents of `todo.toml`. Every key is optional.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TodoConfig {
    pub database: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl TodoConfig {
    /// The file written by `init`.
    pub fn with_defaults(database: &Path) -> Self {
        Self {
            database: Some(database.display().to_string()),
            host: Some(DEFAULT_HOST.to_string()),
            port: Some(DEFAULT_PORT),
        }
    }
}

/// Fully resolved server settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub host: String,
    pub port: u16,
    pub database: PathBuf,
}

impl Settings {
    /// Command-line values win over the config file, which wins over defaults.
    pub fn resolve(
        host: Option<String>,
        port: Option<u16>,
        database: Option<PathBuf>,
        file: Option<TodoConfig>,
    ) -> Self {
        let file = file.unwrap_or_default();
        Self {
            host: host
                .or(file.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: port.or(file.port).unwrap_or(DEFAULT_PORT),
            database: database
                .or(file.database.map(PathBuf::from))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE)),
        }
    }
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("todo.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<TodoConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: TodoConfig = toml::from_str(&contents)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &TodoConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
