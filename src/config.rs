use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk settings, loaded from `microblog.toml`.
/// CLI flags take precedence over the file; the file over the defaults.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MicroblogConfig {
    pub database: Option<String>,
    pub port: Option<u16>,
}

/// Port the original service listened on; kept as the default
pub const DEFAULT_PORT: u16 = 4000;

pub fn default_config_path() -> PathBuf {
    PathBuf::from("microblog.toml")
}

pub fn default_database_path_in(base: &Path) -> PathBuf {
    base.join(".microblog").join("microblog.db")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<MicroblogConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: MicroblogConfig = toml::from_str(&contents)?;
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &MicroblogConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Resolve the database path: flag > config file > default
pub fn resolve_database_path(flag: Option<PathBuf>, config: Option<&MicroblogConfig>) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Some(database) = config.and_then(|c| c.database.as_ref()) {
        return PathBuf::from(database);
    }
    default_database_path_in(Path::new("."))
}

/// Resolve the listen port: flag > config file > default
pub fn resolve_port(flag: Option<u16>, config: Option<&MicroblogConfig>) -> u16 {
    flag.or_else(|| config.and_then(|c| c.port)).unwrap_or(DEFAULT_PORT)
}

pub fn ensure_db_dir(db_path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
