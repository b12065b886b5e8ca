//! Installer configuration, optionally loaded from `n8n-install.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "n8n-install.toml";

/// Installer configuration (TOML).
///
/// Every field is optional in the file; missing fields take the defaults the
/// installer has always used.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InstallerConfig {
    /// Directory the deployment files are written to.
    pub deploy_dir: PathBuf,

    /// Value written to `N8N_VERSION` and used as the image tag.
    pub n8n_version: String,

    /// Host port n8n is published on and the tunnel forwards to.
    pub host_port: u16,

    /// Per-command wall-clock limit for docker and installer scripts.
    pub command_timeout_secs: u64,

    /// Truncate captured child output beyond this many bytes.
    pub output_limit_bytes: usize,

    pub runtime: RuntimeConfig,
    pub cloudflare: CloudflareConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Readiness probes before giving up on the container runtime.
    pub readiness_attempts: u32,
    pub readiness_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CloudflareConfig {
    pub api_base: String,
    pub connector_image: String,
    pub http_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            readiness_attempts: 60,
            readiness_interval_secs: 5,
        }
    }
}

impl Default for CloudflareConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.cloudflare.com/client/v4".to_string(),
            connector_image: "cloudflare/cloudflared:latest".to_string(),
            http_timeout_secs: 30,
        }
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            deploy_dir: PathBuf::from("n8n"),
            n8n_version: "latest".to_string(),
            host_port: 5678,
            command_timeout_secs: 30 * 60,
            output_limit_bytes: 1_000_000,
            runtime: RuntimeConfig::default(),
            cloudflare: CloudflareConfig::default(),
        }
    }
}

impl InstallerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.deploy_dir.as_os_str().is_empty() {
            return Err(anyhow!("deploy_dir must not be empty"));
        }
        if self.n8n_version.trim().is_empty() || self.n8n_version.contains(char::is_whitespace) {
            return Err(anyhow!("n8n_version must be a single non-empty tag"));
        }
        if self.host_port == 0 {
            return Err(anyhow!("host_port must be > 0"));
        }
        if self.command_timeout_secs == 0 {
            return Err(anyhow!("command_timeout_secs must be > 0"));
        }
        if self.output_limit_bytes == 0 {
            return Err(anyhow!("output_limit_bytes must be > 0"));
        }
        if self.runtime.readiness_attempts == 0 {
            return Err(anyhow!("runtime.readiness_attempts must be > 0"));
        }
        if self.cloudflare.http_timeout_secs == 0 {
            return Err(anyhow!("cloudflare.http_timeout_secs must be > 0"));
        }
        if !self.cloudflare.api_base.starts_with("https://")
            && !self.cloudflare.api_base.starts_with("http://")
        {
            return Err(anyhow!("cloudflare.api_base must be an http(s) URL"));
        }
        if self.cloudflare.connector_image.trim().is_empty() {
            return Err(anyhow!("cloudflare.connector_image must not be empty"));
        }
        Ok(())
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    pub fn readiness_interval(&self) -> Duration {
        Duration::from_secs(self.runtime.readiness_interval_secs)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.cloudflare.http_timeout_secs)
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `InstallerConfig::default()`.
pub fn load_config(path: &Path) -> Result<InstallerConfig> {
    if !path.exists() {
        let cfg = InstallerConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: InstallerConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk (temp file + rename).
pub fn write_config(path: &Path, cfg: &InstallerConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

/// Write the default config to `path` for the operator to edit.
///
/// Refuses to replace an existing file unless `force` is set.
pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists (pass --force to overwrite)",
            path.display()
        );
    }
    write_config(path, &InstallerConfig::default())
}

fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let parent = path
        .parent()
        .with_context(|| format!("config path missing parent {}", path.display()))?;
    if !parent.as_os_str().is_empty() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("toml.tmp");
    fs::write(&tmp_path, contents)
        .with_context(|| format!("write temp config {}", tmp_path.display()))?;
    fs::rename(&tmp_path, path).with_context(|| format!("replace config {}", path.display()))?;
    Ok(())
}
