use super::{RenderConfig, ShaderConfig, WindowConfig};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::LevelFilter;
use serde::{Deserialize, Serialize};
use std::env;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Names the combined shader file drawn by the `glpaint` binary.
pub const SHADER_ENV: &str = "SHADER_PATH";
/// Consulted when [`SHADER_ENV`] is unset or empty.
pub const SHADER_ENV_ALIAS: &str = "GLPAINT_SHADER";
/// Overrides where the TOML config is read from.
pub const CONFIG_ENV: &str = "GLPAINT_CONFIG";

const CONFIG_FILE: &str = "glpaint.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: String,
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub shader: ShaderConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            window: WindowConfig::default(),
            render: RenderConfig::default(),
            shader: ShaderConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn level_filter(&self) -> LevelFilter {
        self.log_level.parse().unwrap_or(LevelFilter::Info)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }
        let toml_content = toml::to_string_pretty(self)?;
        fs::write(path, toml_content).context("Failed to write config file")
    }

    /// Reads the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_or_create(path: &Path) -> Result<Self> {
        if !path.exists() {
            let default_config = AppConfig::default();
            default_config.save_to(path)?;
            return Ok(default_config);
        }

        Self::load_from(path)
    }
}

pub fn load_or_create_config() -> Result<AppConfig> {
    AppConfig::load_or_create(&get_config_path()?)
}

fn get_config_path() -> Result<PathBuf> {
    if let Some(path) = non_empty_path(env::var_os(CONFIG_ENV)) {
        return Ok(path);
    }

    let proj_dirs = ProjectDirs::from("com", "MetroManDevTeam", "glpaint")
        .context("Couldn't determine project directory")?;
    Ok(proj_dirs.config_dir().join(CONFIG_FILE))
}

pub fn shader_path_from_env() -> Option<PathBuf> {
    shader_path_from(|name| env::var_os(name))
}

fn shader_path_from(lookup: impl Fn(&str) -> Option<OsString>) -> Option<PathBuf> {
    [SHADER_ENV, SHADER_ENV_ALIAS]
        .into_iter()
        .find_map(|name| non_empty_path(lookup(name)))
}

fn non_empty_path(value: Option<OsString>) -> Option<PathBuf> {
    value.filter(|v| !v.is_empty()).map(PathBuf::from)
}
