//! Deployment directory writer and container launch.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use minijinja::{Environment, context};
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::core::env_file::{compose_environment, render_env_file};
use crate::core::snapshot::ConfigSnapshot;
use crate::io::process::{CommandRunner, CommandSpec, run_checked};

const COMPOSE_TEMPLATE: &str = include_str!("templates/docker-compose.yaml.j2");
const DOCKERFILE_TEMPLATE: &str = include_str!("templates/Dockerfile.j2");
const ENTRYPOINT_SCRIPT: &str = include_str!("templates/docker-entrypoint.sh");

pub const ENV_FILE: &str = ".env";
pub const COMPOSE_FILE: &str = "docker-compose.yaml";
pub const DOCKERFILE: &str = "Dockerfile";
pub const ENTRYPOINT_FILE: &str = "docker-entrypoint.sh";

static PACKAGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._+-]*(=[A-Za-z0-9._+~-]+)?$")
        .expect("package regex should be valid")
});

/// What to deploy and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    pub dir: PathBuf,
    pub n8n_version: String,
    pub host_port: u16,
    /// Build a local image with extra Alpine packages instead of pulling.
    pub custom_image: bool,
    pub packages: Vec<String>,
}

/// Rendered contents of every file in the deployment directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentFiles {
    pub env: String,
    pub compose: String,
    /// Present for custom images only.
    pub dockerfile: Option<String>,
}

/// Split a comma-separated package list, dropping blanks.
pub fn parse_packages(csv: &str) -> Result<Vec<String>> {
    let mut packages = Vec::new();
    for item in csv.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        if !PACKAGE_RE.is_match(item) {
            bail!("invalid package name {item:?}");
        }
        packages.push(item.to_string());
    }
    Ok(packages)
}

struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_keep_trailing_newline(true);
        env.add_template("compose", COMPOSE_TEMPLATE)
            .expect("compose template should be valid");
        env.add_template("dockerfile", DOCKERFILE_TEMPLATE)
            .expect("dockerfile template should be valid");
        Self { env }
    }

    fn render_compose(&self, environment: &[String], plan: &DeployPlan) -> Result<String> {
        let template = self.env.get_template("compose")?;
        let rendered = template.render(context! {
            custom_image => plan.custom_image,
            environment => environment,
            host_port => plan.host_port,
        })?;
        Ok(rendered)
    }

    fn render_dockerfile(&self, packages: &[String]) -> Result<String> {
        let template = self.env.get_template("dockerfile")?;
        let rendered = template.render(context! { packages => packages })?;
        Ok(rendered)
    }
}

pub fn render_deployment(snapshot: &ConfigSnapshot, plan: &DeployPlan) -> Result<DeploymentFiles> {
    let engine = TemplateEngine::new();
    let environment = compose_environment(snapshot);
    let compose = engine
        .render_compose(&environment, plan)
        .context("render docker-compose.yaml")?;
    let dockerfile = if plan.custom_image {
        Some(
            engine
                .render_dockerfile(&plan.packages)
                .context("render Dockerfile")?,
        )
    } else {
        None
    };
    Ok(DeploymentFiles {
        env: render_env_file(snapshot, &plan.n8n_version),
        compose,
        dockerfile,
    })
}

/// Write the rendered files into `dir`, creating it if needed.
pub fn write_deployment(dir: &Path, files: &DeploymentFiles) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))?;
    write_file(&dir.join(ENV_FILE), &files.env)?;
    write_file(&dir.join(COMPOSE_FILE), &files.compose)?;
    if let Some(dockerfile) = &files.dockerfile {
        write_file(&dir.join(DOCKERFILE), dockerfile)?;
        let entrypoint = dir.join(ENTRYPOINT_FILE);
        write_file(&entrypoint, ENTRYPOINT_SCRIPT)?;
        make_executable(&entrypoint)?;
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod {}", path.display()))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<()> {
    Ok(())
}

/// Render, write and start the deployment.
#[instrument(skip_all, fields(dir = %plan.dir.display(), custom_image = plan.custom_image))]
pub fn deploy<R: CommandRunner + ?Sized>(
    runner: &R,
    snapshot: &ConfigSnapshot,
    plan: &DeployPlan,
) -> Result<()> {
    println!("\nCreating config files...");
    let files = render_deployment(snapshot, plan)?;
    write_deployment(&plan.dir, &files)?;
    println!("Files created");
    debug!(
        dockerfile = files.dockerfile.is_some(),
        "deployment files written"
    );

    if plan.custom_image {
        println!("\nBuilding image. This might take a few minutes...");
        let build = CommandSpec::new("docker")
            .args(["compose", "build"])
            .current_dir(&plan.dir)
            .interactive();
        run_checked(runner, &build).context("build custom image")?;
        println!("\nImage build complete.");
    }

    println!("\nStarting container. This might take a minute...");
    let up = CommandSpec::new("docker")
        .args(["compose", "up", "-d"])
        .current_dir(&plan.dir)
        .interactive();
    run_checked(runner, &up).context("start n8n container")?;
    info!("n8n container started");
    println!(
        "Container started. It should now be locally available at http://localhost:{}",
        plan.host_port
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::EnvKey;
    use crate::test_support::RecordingRunner;

    fn plan(dir: &Path, custom_image: bool, packages: &[&str]) -> DeployPlan {
        DeployPlan {
            dir: dir.to_path_buf(),
            n8n_version: "latest".to_string(),
            host_port: 5678,
            custom_image,
            packages: packages.iter().map(|p| p.to_string()).collect(),
        }
    }

    #[test]
    fn parses_package_list() {
        assert_eq!(
            parse_packages(" ffmpeg, ,python3 ,").expect("parse"),
            vec!["ffmpeg".to_string(), "python3".to_string()]
        );
        assert!(parse_packages("").expect("parse").is_empty());
        assert!(parse_packages("ffmpeg; rm -rf /").is_err());
    }

    #[test]
    fn default_image_compose() {
        let mut snapshot = ConfigSnapshot::seeded();
        snapshot.set(EnvKey::GenericTimezone, "Europe/Berlin");
        let files =
            render_deployment(&snapshot, &plan(Path::new("n8n"), false, &[])).expect("render");
        assert!(files.dockerfile.is_none());
        assert!(files.compose.starts_with("volumes:\n  n8n_storage:\nservices:\n  n8n:\n"));
        assert!(
            files
                .compose
                .contains("    image: docker.n8n.io/n8nio/n8n:${N8N_VERSION}\n")
        );
        assert!(files.compose.contains("      - GENERIC_TIMEZONE=${GENERIC_TIMEZONE}\n"));
        assert!(!files.compose.contains("N8N_VERSION=${N8N_VERSION}"));
        assert!(files.compose.contains("      - 5678:5678\n"));
        assert!(files.compose.ends_with("      - n8n_storage:/home/node/.n8n\n"));
    }

    #[test]
    fn custom_image_dockerfile_lists_packages() {
        let files = render_deployment(
            &ConfigSnapshot::seeded(),
            &plan(Path::new("n8n"), true, &["ffmpeg", "python3"]),
        )
        .expect("render");
        assert!(files.compose.contains("    build:\n      context: .\n"));
        assert!(!files.compose.contains("image:"));
        let dockerfile = files.dockerfile.expect("dockerfile");
        assert!(dockerfile.contains("# ffmpeg\nRUN apk add ffmpeg\n"));
        assert!(dockerfile.contains("# python3\nRUN apk add python3\n"));
        assert!(dockerfile.ends_with("ENTRYPOINT [\"tini\", \"--\", \"/docker-entrypoint.sh\"]\n"));
    }

    #[test]
    fn deploy_writes_files_and_starts() {
        let temp = tempfile::tempdir().expect("tempdir");
        let dir = temp.path().join("n8n");
        let runner = RecordingRunner::default();
        deploy(&runner, &ConfigSnapshot::seeded(), &plan(&dir, true, &["ffmpeg"])).expect("deploy");

        assert!(dir.join(ENV_FILE).exists());
        assert!(dir.join(COMPOSE_FILE).exists());
        assert!(dir.join(DOCKERFILE).exists());
        let entrypoint = fs::read_to_string(dir.join(ENTRYPOINT_FILE)).expect("read");
        assert!(entrypoint.starts_with("#!/bin/sh\n"));
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(dir.join(ENTRYPOINT_FILE))
                .expect("metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o755);
        }

        assert_eq!(
            runner.command_lines(),
            vec![
                "docker compose build".to_string(),
                "docker compose up -d".to_string()
            ]
        );
        assert!(
            runner
                .commands()
                .iter()
                .all(|spec| spec.cwd.as_deref() == Some(dir.as_path()))
        );
    }

    #[test]
    fn failed_start_is_reported() {
        let temp = tempfile::tempdir().expect("tempdir");
        let runner = RecordingRunner::default().failing("up -d", "port is already allocated");
        let err = deploy(
            &runner,
            &ConfigSnapshot::seeded(),
            &plan(&temp.path().join("n8n"), false, &[]),
        )
        .expect_err("fails");
        assert!(format!("{err:#}").contains("port is already allocated"));
    }
}
