use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use crate::assets;

pub const APP_NAME: &str = "assay";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    #[serde(skip)]
    pub source_config_file: Option<PathBuf>,
    pub toolchain: ToolchainConfig,
    pub limits: LimitsConfig,
    pub sandbox: SandboxConfig,
    pub server: ServerConfig,
}

/// How a submission is turned into a runnable program.
///
/// `compile`, `run` and `artifact` are `#{var}` templates expanded against the
/// materialized source file (see [`crate::str_interp::FileVars`]).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolchainConfig {
    pub language: String,
    pub source_extension: String,
    pub shell: PathBuf,
    pub compile: String,
    pub run: String,
    pub artifact: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LimitsConfig {
    #[serde(rename = "compile_timeout_ms", with = "serdable::duration_ms")]
    pub compile_timeout: Duration,

    #[serde(rename = "run_timeout_ms", with = "serdable::duration_ms")]
    pub run_timeout: Duration,

    pub output_capture_max_bytes: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxConfig {
    pub scratch_root: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            language: "java".to_owned(),
            source_extension: "java".to_owned(),
            shell: PathBuf::from("/bin/sh"),
            compile: "javac #{fileName}".to_owned(),
            run: "java #{fileStem}".to_owned(),
            artifact: "#{fileStem}.class".to_owned(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            compile_timeout: Duration::from_secs(30),
            run_timeout: Duration::from_secs(10),
            output_capture_max_bytes: 1024 * 1024,
        }
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            scratch_root: std::env::temp_dir().join("java-assessment"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
        }
    }
}

/// `ASSAY_*` environment variables, applied on top of the file config.
#[derive(Debug, Default, Deserialize)]
struct EnvOverrides {
    bind_addr: Option<SocketAddr>,
    scratch_root: Option<PathBuf>,
}

impl Config {
    pub const FILENAME: &str = "assay.toml";
    const ENV_PREFIX: &str = "ASSAY_";

    pub fn example_toml() -> anyhow::Result<String> {
        assets::read_str(Self::FILENAME)
    }

    pub fn from_toml(s: &str) -> StdResult<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn from_toml_file(filepath: PathBuf) -> anyhow::Result<Self> {
        let toml = fsutil::read_to_string(&filepath).context("Cannot read a config file")?;
        let mut cfg = Self::from_toml(&toml)
            .with_context(|| format!("Invalid config TOML: {:?}", filepath))?;
        cfg.source_config_file = Some(filepath);
        Ok(cfg)
    }

    /// `<user config dir>/assay/assay.toml`
    pub fn global_filepath() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_NAME).join(Self::FILENAME))
    }

    /// Resolution order: explicit path, `cur_dir` and its ancestors, the global
    /// config file, built-in defaults. Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>, cur_dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let found = explicit
            .map(Path::to_path_buf)
            .or_else(|| fsutil::find_file_in_ancestors(&cur_dir, Self::FILENAME))
            .or_else(|| Self::global_filepath().filter(|p| p.is_file()));

        let cfg = match found {
            Some(path) => {
                log::debug!("Loading config from {:?}", path);
                Self::from_toml_file(path)?
            }
            None => {
                log::debug!("No {} found; using built-in defaults", Self::FILENAME);
                Self::default()
            }
        };
        cfg.with_env_overrides()
    }

    pub fn with_env_overrides(self) -> anyhow::Result<Self> {
        let env: EnvOverrides = envy::prefixed(Self::ENV_PREFIX)
            .from_env()
            .context("Invalid ASSAY_* environment variable")?;
        Ok(self.with_overrides(env))
    }

    fn with_overrides(mut self, env: EnvOverrides) -> Self {
        let EnvOverrides {
            bind_addr,
            scratch_root,
        } = env;
        if let Some(addr) = bind_addr {
            self.server.bind_addr = addr;
        }
        if let Some(dir) = scratch_root {
            self.sandbox.scratch_root = dir;
        }
        self
    }
}
