//! Configuration management utilities.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dirs_next::config_dir;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

static DEFAULT_CONFIG: Lazy<&'static str> =
    Lazy::new(|| include_str!("../../assets/default-config.toml"));
static DEFAULT_WORKSPACE_CONFIG_PATH: &str = ".locus/config.toml";

/// Layered configuration loaded from defaults, user, workspace, and env.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub bridge: Bridge,
    #[serde(default)]
    pub parser: Parser,
}

/// Settings for the loopback bridge endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bridge {
    #[serde(default = "Bridge::default_host")]
    pub host: String,
    #[serde(default = "Bridge::default_port")]
    pub port: u16,
    #[serde(default = "Bridge::default_max_body_kib")]
    pub max_body_kib: usize,
}

impl Bridge {
    fn default_host() -> String {
        "127.0.0.1".to_owned()
    }

    fn default_port() -> u16 {
        8790
    }

    fn default_max_body_kib() -> usize {
        200
    }

    /// Request body ceiling in bytes.
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_kib * 1024
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
            max_body_kib: Self::default_max_body_kib(),
        }
    }
}

/// Settings for the stack-text frame parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parser {
    /// File extensions admitted as source frames.
    #[serde(default = "Parser::default_extensions")]
    pub extensions: Vec<String>,
}

impl Parser {
    fn default_extensions() -> Vec<String> {
        crate::app::parser::DEFAULT_SOURCE_EXTENSIONS
            .iter()
            .map(|ext| ext.to_string())
            .collect()
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self {
            extensions: Self::default_extensions(),
        }
    }
}

/// Environment overrides for critical settings.
#[derive(Debug, Default, Clone)]
pub struct EnvOverrides {
    host: Option<String>,
    port: Option<u16>,
}

impl EnvOverrides {
    fn from_env() -> Self {
        Self {
            host: env::var("LOCUS_HOST").ok(),
            port: env::var("LOCUS_PORT").ok().and_then(|raw| raw.parse().ok()),
        }
    }

    #[cfg(test)]
    fn for_tests(host: &str, port: u16) -> Self {
        Self {
            host: Some(host.to_owned()),
            port: Some(port),
        }
    }
}

impl Config {
    /// Load configuration from defaults, user/global config, workspace config, and env overrides.
    pub fn load() -> Result<Self> {
        let env = EnvOverrides::from_env();
        let global = global_config_path();
        let workspace = workspace_config_path()?;
        Self::load_with_layers(global, workspace, env)
    }

    fn load_with_layers(
        global: Option<PathBuf>,
        workspace: Option<PathBuf>,
        env_overrides: EnvOverrides,
    ) -> Result<Self> {
        let mut layers: Vec<Config> = Vec::new();

        layers.push(Self::from_str(&DEFAULT_CONFIG)?);

        if let Some(global_path) = global.filter(|path| path.exists()) {
            layers.push(Self::from_file(&global_path)?);
        }

        if let Some(workspace_path) = workspace.filter(|path| path.exists()) {
            layers.push(Self::from_file(&workspace_path)?);
        }

        let merged = layers.into_iter().reduce(Config::merge).unwrap_or_default();
        Ok(apply_env_overrides(merged, env_overrides))
    }

    fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_str(&data)
    }

    fn from_str(contents: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(contents).with_context(|| "failed to parse TOML config".to_string())?;
        Ok(config)
    }

    fn merge(self, other: Self) -> Self {
        Self {
            bridge: merge_bridge(self.bridge, other.bridge),
            parser: merge_parser(self.parser, other.parser),
        }
    }
}

fn merge_bridge(base: Bridge, overlay: Bridge) -> Bridge {
    Bridge {
        host: if overlay.host != Bridge::default_host() {
            overlay.host
        } else {
            base.host
        },
        port: if overlay.port != Bridge::default_port() {
            overlay.port
        } else {
            base.port
        },
        max_body_kib: if overlay.max_body_kib != Bridge::default_max_body_kib() {
            overlay.max_body_kib
        } else {
            base.max_body_kib
        },
    }
}

fn merge_parser(base: Parser, overlay: Parser) -> Parser {
    let mut extensions: BTreeSet<String> = base.extensions.into_iter().collect();
    extensions.extend(overlay.extensions);

    Parser {
        extensions: extensions.into_iter().collect(),
    }
}

fn global_config_path() -> Option<PathBuf> {
    config_dir().map(|base| base.join("locus/config.toml"))
}

fn workspace_config_path() -> Result<Option<PathBuf>> {
    let cwd = env::current_dir()?;
    let root = find_repo_root(&cwd).unwrap_or(cwd);
    Ok(Some(root.join(DEFAULT_WORKSPACE_CONFIG_PATH)))
}

fn find_repo_root(start: &Path) -> Option<PathBuf> {
    let mut current = start;
    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

fn apply_env_overrides(mut config: Config, env: EnvOverrides) -> Config {
    if let Some(host) = env.host {
        config.bridge.host = host;
    }
    if let Some(port) = env.port {
        config.bridge.port = port;
    }
    config
}
