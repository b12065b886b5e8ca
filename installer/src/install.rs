//! `n8n-install install`: runtime, wizard, deployment, tunnel.

use anyhow::{Context, Result, bail};
use tracing::{info, instrument};

use crate::core::catalog::{CatalogContext, build_catalog};
use crate::core::env_file::render_env_file;
use crate::core::invariants::validate_tree;
use crate::core::snapshot::ConfigSnapshot;
use crate::io::config::InstallerConfig;
use crate::io::deploy::{DeployPlan, deploy};
use crate::io::process::CommandRunner;
use crate::io::runtime::{ReleaseSource, ensure_runtime};
use crate::io::system::{HostOs, local_ip};
use crate::io::terminal::Terminal;
use crate::io::tunnel::{ConnectorTarget, CreatedTunnel, TunnelConnector, provision_tunnel};
use crate::wizard::{WizardOutcome, run_wizard};

const BANNER: &str = "
There is no undo functionality. If you enter a question wrong and submit it you must run the installer again.

Reminder: You will have keys in a .env file on your system after this process. You are responsible to secure it.
";

const THANKS: &str = "
Thank you for using n8n-install!
Please share feedback if you have any.
";

/// Flags of one install run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub skip_runtime: bool,
    /// Ask the questions and print the `.env` without side effects.
    pub dry_run: bool,
    pub custom_image: bool,
    pub packages: Vec<String>,
}

/// Collaborators an install run talks to.
pub struct InstallEnv<'a> {
    pub terminal: &'a dyn Terminal,
    pub runner: &'a dyn CommandRunner,
    pub releases: &'a dyn ReleaseSource,
    pub tunnels: &'a dyn TunnelConnector,
    pub os: HostOs,
    pub local_timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub wizard: WizardOutcome,
    pub tunnel: Option<CreatedTunnel>,
}

#[instrument(skip_all, fields(dry_run = opts.dry_run, custom_image = opts.custom_image))]
pub fn run_install(
    cfg: &InstallerConfig,
    opts: &InstallOptions,
    env: &InstallEnv<'_>,
) -> Result<InstallReport> {
    if opts.skip_runtime || opts.dry_run {
        info!("skipping container runtime setup");
    } else {
        ensure_runtime(env.runner, env.releases, env.os, cfg)?;
    }

    let tree = build_catalog(&CatalogContext {
        local_timezone: env.local_timezone.clone(),
    });
    let errors = validate_tree(&tree);
    if !errors.is_empty() {
        bail!("question catalog is invalid:\n- {}", errors.join("\n- "));
    }

    println!("{BANNER}");
    let wizard = run_wizard(&tree, env.terminal, ConfigSnapshot::seeded())?;
    info!(
        changed = wizard.snapshot.changed_since(&ConfigSnapshot::seeded()).len(),
        "answers collected"
    );

    if opts.dry_run {
        print!("{}", render_env_file(&wizard.snapshot, &cfg.n8n_version));
        return Ok(InstallReport {
            wizard,
            tunnel: None,
        });
    }

    let plan = DeployPlan {
        dir: cfg.deploy_dir.clone(),
        n8n_version: cfg.n8n_version.clone(),
        host_port: cfg.host_port,
        custom_image: opts.custom_image,
        packages: opts.packages.clone(),
    };
    println!("\nstarting n8n...");
    deploy(env.runner, &wizard.snapshot, &plan)?;
    println!("n8n started");

    let tunnel = match &wizard.tunnel {
        Some(request) => {
            let target = ConnectorTarget {
                local_ip: local_ip(env.runner, env.os)?,
                port: cfg.host_port,
                image: cfg.cloudflare.connector_image.clone(),
            };
            let session = env
                .tunnels
                .connect(request)
                .context("connect to Cloudflare")?;
            Some(provision_tunnel(&*session, env.runner, request, &target)?)
        }
        None => None,
    };

    println!("{THANKS}");
    Ok(InstallReport { wizard, tunnel })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::ids;
    use crate::test_support::{FakeTunnelApi, RecordingRunner, ScriptedTerminal};
    use anyhow::anyhow;

    fn no_network() -> Result<String> {
        Err(anyhow!("network disabled in tests"))
    }

    #[test]
    fn dry_run_touches_nothing() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = InstallerConfig {
            deploy_dir: temp.path().join("n8n"),
            ..InstallerConfig::default()
        };
        let terminal = ScriptedTerminal::accepting_defaults();
        let runner = RecordingRunner::default();
        let api = FakeTunnelApi::new("tid", "zone");
        let env = InstallEnv {
            terminal: &terminal,
            runner: &runner,
            releases: &no_network,
            tunnels: &api,
            os: HostOs::Linux,
            local_timezone: "Europe/Berlin".to_string(),
        };
        let opts = InstallOptions {
            dry_run: true,
            ..InstallOptions::default()
        };
        let report = run_install(&cfg, &opts, &env).expect("install");
        assert!(runner.commands().is_empty());
        assert!(api.calls().is_empty());
        assert!(!cfg.deploy_dir.exists());
        assert!(report.wizard.answers.contains(ids::TIMEZONE));
    }
}
