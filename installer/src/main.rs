//! Interactive n8n installer.
//!
//! Walks the operator through the configuration questions, writes
//! `n8n/.env` and `n8n/docker-compose.yaml`, starts the container and
//! optionally provisions a Cloudflare Tunnel in front of it.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use installer::check::{check_catalog, key_listing};
use installer::exit_codes;
use installer::install::{InstallEnv, InstallOptions, run_install};
use installer::io::config::{DEFAULT_CONFIG_FILE, InstallerConfig, init_config, load_config};
use installer::io::deploy::parse_packages;
use installer::io::process::SystemRunner;
use installer::io::runtime::{GithubReleases, RuntimeNotReady};
use installer::io::system::{HostOs, local_timezone};
use installer::io::terminal::DialoguerTerminal;
use installer::io::tunnel::CloudflareConnector;
use installer::logging;

#[derive(Parser)]
#[command(
    name = "n8n-install",
    version,
    about = "Interactive installer for a self-hosted n8n"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the setup questions, write the deployment and start n8n.
    Install {
        /// Deployment directory (overrides the config file).
        #[arg(long)]
        dir: Option<PathBuf>,
        /// Installer config file.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Assume docker is already installed and running.
        #[arg(long)]
        skip_runtime: bool,
        /// Print the resulting `.env` instead of deploying.
        #[arg(long)]
        dry_run: bool,
        /// Build a local image with extra Alpine packages.
        #[arg(long)]
        custom_image: bool,
        /// Comma-separated Alpine packages for `--custom-image`.
        #[arg(long, requires = "custom_image")]
        packages: Option<String>,
    },
    /// Write the default installer config file for editing.
    InitConfig {
        /// Where to write the config.
        #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
        config: PathBuf,
        /// Replace an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Check the question catalog and option tables for violations.
    Check,
    /// Print every environment key with its section and seeded default.
    Keys,
}

fn main() {
    logging::init();
    let code = match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{:#}", err);
            if err.downcast_ref::<RuntimeNotReady>().is_some() {
                exit_codes::RUNTIME_NOT_READY
            } else {
                exit_codes::FAILED
            }
        }
    };
    std::process::exit(code);
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    match cli.command {
        Command::Install {
            dir,
            config,
            skip_runtime,
            dry_run,
            custom_image,
            packages,
        } => {
            let mut cfg = load_config(&config)?;
            if let Some(dir) = dir {
                cfg.deploy_dir = dir;
            }
            let opts = InstallOptions {
                skip_runtime,
                dry_run,
                custom_image,
                packages: parse_packages(packages.as_deref().unwrap_or_default())?,
            };
            cmd_install(&cfg, &opts)
        }
        Command::InitConfig { config, force } => {
            init_config(&config, force)?;
            println!("wrote {}", config.display());
            Ok(exit_codes::OK)
        }
        Command::Check => Ok(cmd_check()),
        Command::Keys => {
            for line in key_listing() {
                println!("{line}");
            }
            Ok(exit_codes::OK)
        }
    }
}

fn cmd_install(cfg: &InstallerConfig, opts: &InstallOptions) -> Result<i32> {
    let runner = SystemRunner {
        timeout: cfg.command_timeout(),
        output_limit_bytes: cfg.output_limit_bytes,
    };
    let releases = GithubReleases::new(cfg.http_timeout())?;
    let tunnels = CloudflareConnector {
        api_base: cfg.cloudflare.api_base.clone(),
        timeout: cfg.http_timeout(),
    };
    let terminal = DialoguerTerminal::new();
    let env = InstallEnv {
        terminal: &terminal,
        runner: &runner,
        releases: &releases,
        tunnels: &tunnels,
        os: HostOs::current(),
        local_timezone: local_timezone(),
    };
    run_install(cfg, opts, &env)?;
    Ok(exit_codes::OK)
}

fn cmd_check() -> i32 {
    let errors = check_catalog();
    if errors.is_empty() {
        println!("catalog ok");
        exit_codes::OK
    } else {
        eprintln!("catalog violations:\n- {}", errors.join("\n- "));
        exit_codes::INVALID_CATALOG
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_install_flags() {
        let cli = Cli::parse_from([
            "n8n-install",
            "install",
            "--dry-run",
            "--custom-image",
            "--packages",
            "ffmpeg,git",
        ]);
        match cli.command {
            Command::Install {
                dry_run,
                custom_image,
                packages,
                config,
                ..
            } => {
                assert!(dry_run);
                assert!(custom_image);
                assert_eq!(packages.as_deref(), Some("ffmpeg,git"));
                assert_eq!(config, PathBuf::from(DEFAULT_CONFIG_FILE));
            }
            _ => panic!("expected install"),
        }
    }

    #[test]
    fn packages_require_custom_image() {
        let result = Cli::try_parse_from(["n8n-install", "install", "--packages", "ffmpeg"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_init_config() {
        let cli = Cli::parse_from(["n8n-install", "init-config", "--force"]);
        match cli.command {
            Command::InitConfig { config, force } => {
                assert!(force);
                assert_eq!(config, PathBuf::from(DEFAULT_CONFIG_FILE));
            }
            _ => panic!("expected init-config"),
        }
    }

    #[test]
    fn parse_check() {
        let cli = Cli::parse_from(["n8n-install", "check"]);
        assert!(matches!(cli.command, Command::Check));
    }
}
