//! Container runtime installation and readiness polling.

use std::fmt;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::io::config::InstallerConfig;
use crate::io::process::{CommandRunner, CommandSpec, run_checked};
use crate::io::system::HostOs;

const COMPOSE_RELEASES_URL: &str = "https://api.github.com/repos/docker/compose/releases/latest";
const COMPOSE_PATH: &str = "/usr/local/bin/docker-compose";
const HOMEBREW_INSTALL: &str = r#"/bin/bash -c "$(curl -fsSL https://raw.githubusercontent.com/Homebrew/install/HEAD/install.sh)""#;

/// The daemon never answered within the polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeNotReady {
    pub attempts: u32,
}

impl fmt::Display for RuntimeNotReady {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Docker daemon didn't start within the expected time ({} attempts). \
Ensure that Docker Desktop opened and the engine is running, then run the installer again.",
            self.attempts
        )
    }
}

impl std::error::Error for RuntimeNotReady {}

/// Source of the newest docker compose release tag.
pub trait ReleaseSource {
    fn latest_compose_tag(&self) -> Result<String>;
}

impl<F: Fn() -> Result<String>> ReleaseSource for F {
    fn latest_compose_tag(&self) -> Result<String> {
        self()
    }
}

/// GitHub releases API.
pub struct GithubReleases {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

impl GithubReleases {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("n8n-install/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            url: COMPOSE_RELEASES_URL.to_string(),
        })
    }
}

impl ReleaseSource for GithubReleases {
    fn latest_compose_tag(&self) -> Result<String> {
        let release: Release = self
            .http
            .get(&self.url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .context("fetch the latest Docker Compose version")?;
        Ok(release.tag_name)
    }
}

/// True when the docker CLI exists and the daemon answers.
pub fn docker_ready<R: CommandRunner + ?Sized>(runner: &R) -> bool {
    if !runner.has_program("docker") {
        return false;
    }
    runner
        .run(&CommandSpec::new("docker").arg("info"))
        .map(|output| output.success())
        .unwrap_or(false)
}

/// How long to wait for the daemon after launching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Readiness {
    pub attempts: u32,
    pub interval: Duration,
}

impl Readiness {
    pub fn from_config(cfg: &InstallerConfig) -> Self {
        Self {
            attempts: cfg.runtime.readiness_attempts,
            interval: cfg.readiness_interval(),
        }
    }
}

/// Poll `probe` up to `readiness.attempts` times, calling `sleep` with the
/// configured interval between tries.
pub fn wait_until_ready<P, S>(
    mut probe: P,
    readiness: Readiness,
    mut sleep: S,
) -> Result<(), RuntimeNotReady>
where
    P: FnMut() -> bool,
    S: FnMut(Duration),
{
    let attempts = readiness.attempts;
    println!("Waiting for Docker daemon to start...");
    for attempt in 0..attempts {
        if probe() {
            println!("Docker daemon is now running.");
            return Ok(());
        }
        if attempt > 0 && attempt % 10 == 0 {
            println!("Still waiting for Docker daemon... (Attempt {attempt}/{attempts})");
        }
        if attempt + 1 < attempts {
            sleep(readiness.interval);
        }
    }
    Err(RuntimeNotReady { attempts })
}

/// Make sure docker (and compose) are installed and the daemon is running.
#[instrument(skip_all, fields(os = ?os))]
pub fn ensure_runtime<R, S>(runner: &R, releases: &S, os: HostOs, cfg: &InstallerConfig) -> Result<()>
where
    R: CommandRunner + ?Sized,
    S: ReleaseSource + ?Sized,
{
    match os {
        HostOs::Linux => install_linux(runner, releases),
        HostOs::MacOs => install_macos(runner, Readiness::from_config(cfg)),
        HostOs::Other => bail!("unsupported operating system: {}", std::env::consts::OS),
    }
}

fn install_linux<R, S>(runner: &R, releases: &S) -> Result<()>
where
    R: CommandRunner + ?Sized,
    S: ReleaseSource + ?Sized,
{
    println!("\nChecking if docker is installed...");
    if docker_ready(runner) {
        println!("Docker is already installed.");
    } else {
        println!("Installing Docker...");
        let steps = [
            CommandSpec::new("curl").args(["-fsSL", "https://get.docker.com", "-o", "get-docker.sh"]),
            CommandSpec::new("sudo").args(["sh", "get-docker.sh"]).interactive(),
            CommandSpec::new("rm").args(["-f", "get-docker.sh"]),
        ];
        for step in &steps {
            run_checked(runner, step).context("install docker")?;
        }
        info!("docker installed");
    }

    if runner.has_program("docker-compose") {
        println!("Docker Compose is already installed.");
        return Ok(());
    }
    let tag = releases.latest_compose_tag()?;
    debug!(tag = %tag, "installing docker compose");
    let download = CommandSpec::shell(format!(
        "sudo curl -L https://github.com/docker/compose/releases/download/{tag}/docker-compose-$(uname -s)-$(uname -m) -o {COMPOSE_PATH}"
    ))
    .interactive();
    run_checked(runner, &download).context("download docker compose")?;
    run_checked(
        runner,
        &CommandSpec::new("sudo")
            .args(["chmod", "+x", COMPOSE_PATH])
            .interactive(),
    )
    .context("make docker compose executable")?;
    println!("Docker Compose {tag} has been installed successfully!");
    Ok(())
}

fn install_macos<R: CommandRunner + ?Sized>(runner: &R, readiness: Readiness) -> Result<()> {
    println!("\nChecking if docker is installed...");
    if docker_ready(runner) {
        println!("Docker is installed.");
        return Ok(());
    }

    if !runner.has_program("brew") {
        println!("Homebrew not found. Installing Homebrew...");
        run_checked(runner, &CommandSpec::shell(HOMEBREW_INSTALL).interactive())
            .context("install homebrew")?;
        println!("Homebrew installed successfully.");
    }

    println!(
        "Installing Docker via homebrew... (this will take a few minutes and will require a password)"
    );
    run_checked(
        runner,
        &CommandSpec::new("brew")
            .args(["install", "--cask", "docker"])
            .interactive(),
    )
    .context("install docker desktop")?;
    println!("Docker Desktop has been installed.");

    println!("Launching Docker Desktop...");
    run_checked(
        runner,
        &CommandSpec::new("open").arg("/Applications/Docker.app"),
    )
    .context("launch docker desktop")?;
    println!(
        "\nIf Docker Desktop does not open automatically, open it from the Applications folder.\n\
Setup continues once the engine is running (whale icon in the menu bar)."
    );

    wait_until_ready(|| docker_ready(runner), readiness, thread::sleep)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRunner;
    use anyhow::anyhow;

    fn fast() -> InstallerConfig {
        let mut cfg = InstallerConfig::default();
        cfg.runtime.readiness_attempts = 3;
        cfg.runtime.readiness_interval_secs = 0;
        cfg
    }

    fn quick(attempts: u32) -> Readiness {
        Readiness {
            attempts,
            interval: Duration::ZERO,
        }
    }

    fn no_network() -> Result<String> {
        Err(anyhow!("network disabled in tests"))
    }

    #[test]
    fn ready_after_a_few_probes() {
        let mut calls = 0;
        let result = wait_until_ready(
            || {
                calls += 1;
                calls == 3
            },
            quick(60),
            |_| {},
        );
        assert!(result.is_ok());
        assert_eq!(calls, 3);
    }

    #[test]
    fn gives_up_after_attempts() {
        let mut calls = 0;
        let err = wait_until_ready(
            || {
                calls += 1;
                false
            },
            quick(12),
            |_| {},
        )
        .expect_err("never ready");
        assert_eq!(err, RuntimeNotReady { attempts: 12 });
        assert_eq!(calls, 12);
        assert!(err.to_string().contains("run the installer again"));
    }

    #[test]
    fn configured_interval_reaches_the_loop() {
        let mut cfg = InstallerConfig::default();
        cfg.runtime.readiness_attempts = 3;
        cfg.runtime.readiness_interval_secs = 7;
        let mut slept = Vec::new();
        let err = wait_until_ready(|| false, Readiness::from_config(&cfg), |d| slept.push(d))
            .expect_err("never ready");
        assert_eq!(err.attempts, 3);
        assert_eq!(slept, vec![Duration::from_secs(7); 2]);
    }

    #[test]
    fn linux_with_docker_and_compose_runs_only_probe() {
        let runner = RecordingRunner::default();
        ensure_runtime(&runner, &no_network, HostOs::Linux, &fast()).expect("ok");
        assert_eq!(runner.command_lines(), vec!["docker info".to_string()]);
    }

    #[test]
    fn linux_installs_docker_and_compose() {
        let runner = RecordingRunner::default()
            .without_program("docker")
            .without_program("docker-compose");
        let releases = || Ok("v2.29.7".to_string());
        ensure_runtime(&runner, &releases, HostOs::Linux, &fast()).expect("ok");
        let lines = runner.command_lines();
        assert_eq!(lines[0], "curl -fsSL https://get.docker.com -o get-docker.sh");
        assert_eq!(lines[1], "sudo sh get-docker.sh");
        assert!(lines[3].contains("releases/download/v2.29.7/docker-compose-"));
        assert_eq!(lines[4], "sudo chmod +x /usr/local/bin/docker-compose");
    }

    #[test]
    fn compose_tag_failure_aborts() {
        let runner = RecordingRunner::default().without_program("docker-compose");
        let err = ensure_runtime(&runner, &no_network, HostOs::Linux, &fast()).expect_err("fail");
        assert!(err.to_string().contains("network disabled"));
    }

    #[test]
    fn macos_times_out_as_runtime_not_ready() {
        let runner = RecordingRunner::default()
            .without_program("brew")
            .failing("docker info", "Cannot connect to the Docker daemon");
        let err = ensure_runtime(&runner, &no_network, HostOs::MacOs, &fast()).expect_err("fail");
        assert!(err.downcast_ref::<RuntimeNotReady>().is_some());
        let lines = runner.command_lines();
        assert!(lines.iter().any(|line| line.contains("Homebrew/install")));
        assert!(lines.contains(&"brew install --cask docker".to_string()));
        assert!(lines.contains(&"open /Applications/Docker.app".to_string()));
    }

    #[test]
    fn other_os_is_fatal() {
        let runner = RecordingRunner::default();
        let err = ensure_runtime(&runner, &no_network, HostOs::Other, &fast()).expect_err("fail");
        assert!(err.to_string().contains("unsupported operating system"));
        assert!(runner.commands().is_empty());
    }
}
