//! End-to-end walks of the shipped question tree with a scripted terminal.
//!
//! Each scenario drives the wizard (and, for the full install, fake docker
//! and Cloudflare collaborators) and checks what lands in the snapshot.

use std::collections::BTreeSet;

use installer::core::catalog::{METRIC_TOGGLES, ids};
use installer::core::options::{Complexity, ReverseProxy};
use installer::core::snapshot::{ConfigSnapshot, EnvKey};
use installer::install::{InstallEnv, InstallOptions, run_install};
use installer::io::config::InstallerConfig;
use installer::io::system::HostOs;
use installer::io::tunnel::TunnelRequest;
use installer::test_support::{
    FakeTunnelApi, RecordingRunner, Reply, ScriptedTerminal, test_catalog,
};
use installer::wizard::{WizardOutcome, run_wizard};

fn basics(terminal: ScriptedTerminal, complexity: Complexity, proxy: ReverseProxy) -> ScriptedTerminal {
    terminal
        .answer("How customized", Reply::pick(complexity.label()))
        .answer("What's your domain", Reply::text("n8n.example.com"))
        .answer("set up your domain", Reply::pick(proxy.label()))
        .answer("Cloudflare Account ID", Reply::text("acct-1"))
        .answer("CloudFlare Token", Reply::secret("cf-secret"))
}

fn walk(terminal: &ScriptedTerminal) -> WizardOutcome {
    run_wizard(&test_catalog(), terminal, ConfigSnapshot::seeded()).expect("walk")
}

fn changed(outcome: &WizardOutcome) -> BTreeSet<EnvKey> {
    outcome
        .snapshot
        .changed_since(&ConfigSnapshot::seeded())
        .into_iter()
        .collect()
}

fn position(prompts: &[String], fragment: &str) -> usize {
    prompts
        .iter()
        .position(|prompt| prompt.contains(fragment))
        .unwrap_or_else(|| panic!("{fragment:?} was never asked"))
}

#[test]
fn simple_path_only_sets_basics() {
    let terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Simple,
        ReverseProxy::Nothing,
    );
    let outcome = walk(&terminal);

    assert_eq!(terminal.prompts().len(), 4);
    assert!(terminal.notices().is_empty());
    assert_eq!(
        changed(&outcome),
        BTreeSet::from([EnvKey::EditorBaseUrl, EnvKey::WebhookUrl, EnvKey::GenericTimezone])
    );
    assert_eq!(
        outcome.snapshot.get(EnvKey::EditorBaseUrl),
        Some("https://n8n.example.com")
    );
    assert_eq!(
        outcome.snapshot.get(EnvKey::GenericTimezone),
        Some("America/New_York")
    );
    assert!(outcome.tunnel.is_none());
}

#[test]
fn tunnel_credentials_come_before_detailed_questions() {
    let terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Detailed,
        ReverseProxy::Cloudflare,
    );
    let outcome = walk(&terminal);
    let prompts = terminal.prompts();

    let account = position(&prompts, "Cloudflare Account ID");
    let token = position(&prompts, "CloudFlare Token");
    let first_detailed = position(&prompts, "keep the default database setup");
    assert_eq!(token, account + 1);
    assert!(token < first_detailed);

    assert_eq!(
        outcome.tunnel,
        Some(TunnelRequest {
            domain: "n8n.example.com".to_string(),
            account_id: "acct-1".to_string(),
            api_token: "cf-secret".to_string(),
        })
    );
    assert_eq!(outcome.answers.get(ids::DOMAIN), Some("n8n.example.com"));
    assert_eq!(
        outcome.snapshot.get(EnvKey::WebhookUrl),
        Some("https://n8n.example.com")
    );
}

#[test]
fn credentials_never_reach_the_snapshot() {
    let terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Simple,
        ReverseProxy::Cloudflare,
    );
    let outcome = walk(&terminal);
    assert!(
        outcome
            .snapshot
            .iter()
            .all(|(_, value)| value != Some("cf-secret") && value != Some("acct-1"))
    );
}

#[test]
fn enabling_metrics_asks_prefix_and_ten_toggles() {
    let terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Detailed,
        ReverseProxy::Nothing,
    )
    .answer("keep n8n metrics disabled", Reply::no());
    let outcome = walk(&terminal);

    assert_eq!(terminal.asked("n8n metrics prefix"), 1);
    for (_, prompt, _) in METRIC_TOGGLES {
        assert_eq!(terminal.asked(prompt), 1, "{prompt}");
    }
    assert_eq!(METRIC_TOGGLES.len(), 10);
    assert_eq!(outcome.snapshot.get(EnvKey::Metrics), Some("true"));
    assert_eq!(outcome.snapshot.get(EnvKey::MetricsPrefix), Some("n8n_"));
    assert_eq!(
        outcome.snapshot.get(EnvKey::MetricsIncludeApiEndpoints),
        Some("true")
    );
}

#[test]
fn keeping_metrics_disabled_leaves_the_key_untouched() {
    let terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Detailed,
        ReverseProxy::Nothing,
    );
    let mut start = ConfigSnapshot::seeded();
    start.set(EnvKey::Metrics, "from-an-earlier-write");
    let outcome = run_wizard(&test_catalog(), &terminal, start).expect("walk");

    assert_eq!(terminal.asked("keep n8n metrics disabled"), 1);
    assert_eq!(
        outcome.snapshot.get(EnvKey::Metrics),
        Some("from-an-earlier-write")
    );
}

#[test]
fn metrics_kept_disabled_changes_no_metrics_keys() {
    let terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Detailed,
        ReverseProxy::Nothing,
    );
    let outcome = walk(&terminal);

    assert_eq!(terminal.asked("n8n metrics prefix"), 0);
    for (_, prompt, _) in METRIC_TOGGLES {
        assert_eq!(terminal.asked(prompt), 0, "{prompt}");
    }
    let metrics_keys: Vec<EnvKey> = changed(&outcome)
        .into_iter()
        .filter(|key| key.as_str().starts_with("N8N_METRICS"))
        .collect();
    assert!(metrics_keys.is_empty(), "{metrics_keys:?}");
}

/// (prompt fragment, key, value on yes, value on no)
const INVERTED: &[(&str, EnvKey, &str, &str)] = &[
    ("Show the usage and plan page", EnvKey::HideUsagePage, "false", "true"),
    ("Do you want a UI for n8n", EnvKey::DisableUi, "false", "true"),
    ("Disable preview mode", EnvKey::PreviewMode, "false", "true"),
    ("Disable workflow templates", EnvKey::TemplatesEnabled, "false", "true"),
    ("Enable the n8n API", EnvKey::PublicApiDisabled, "false", "true"),
    (
        "Disable save data on execution progress",
        EnvKey::ExecutionsDataSaveOnProgress,
        "false",
        "true",
    ),
    ("Disable database logging", EnvKey::DbLoggingEnabled, "false", "true"),
    ("Disable code node logging", EnvKey::CodeEnableStdout, "false", "true"),
    (
        "Allow users to access environment variables",
        EnvKey::BlockEnvAccessInNode,
        "false",
        "true",
    ),
    (
        "Enable the onboarding tips",
        EnvKey::OnboardingFlowDisabled,
        "false",
        "true",
    ),
    (
        "Enable tags for organizing workflows",
        EnvKey::WorkflowTagsDisabled,
        "false",
        "true",
    ),
];

fn detailed_with_inverted(reply: fn() -> Reply) -> (ScriptedTerminal, WizardOutcome) {
    let mut terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Detailed,
        ReverseProxy::Nothing,
    )
    .answer("default log settings", Reply::no())
    .answer("Keep security settings default", Reply::no());
    for (fragment, _, _, _) in INVERTED {
        terminal = terminal.answer(fragment, reply());
    }
    let outcome = walk(&terminal);
    (terminal, outcome)
}

#[test]
fn inverted_questions_negate_yes() {
    let (terminal, outcome) = detailed_with_inverted(Reply::yes);
    for (fragment, key, on_yes, _) in INVERTED {
        assert_eq!(terminal.asked(fragment), 1, "{fragment}");
        assert_eq!(outcome.snapshot.get(*key), Some(*on_yes), "{key}");
    }
}

#[test]
fn inverted_questions_negate_no() {
    let (_, outcome) = detailed_with_inverted(Reply::no);
    for (_, key, _, on_no) in INVERTED {
        assert_eq!(outcome.snapshot.get(*key), Some(*on_no), "{key}");
    }
}

#[test]
fn save_modes_persist_option_names() {
    let terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Detailed,
        ReverseProxy::Nothing,
    )
    .answer("Save data on execution error", Reply::no());
    let outcome = walk(&terminal);
    assert_eq!(
        outcome.snapshot.get(EnvKey::ExecutionsDataSaveOnError),
        Some("none")
    );
    assert_eq!(
        outcome.snapshot.get(EnvKey::ExecutionsDataSaveOnSuccess),
        Some("all")
    );
}

#[test]
fn full_install_deploys_and_provisions_tunnel() {
    let temp = tempfile::tempdir().expect("tempdir");
    let cfg = InstallerConfig {
        deploy_dir: temp.path().join("n8n"),
        ..InstallerConfig::default()
    };
    let terminal = basics(
        ScriptedTerminal::accepting_defaults(),
        Complexity::Simple,
        ReverseProxy::Cloudflare,
    );
    let runner = RecordingRunner::default().responding(
        "ip route get 1",
        "1.0.0.0 via 192.168.1.1 dev eth0 src 192.168.1.42 uid 1000\n",
    );
    let api = FakeTunnelApi::new("tid-7", "zone-3");
    let no_network = || -> anyhow::Result<String> { anyhow::bail!("network disabled in tests") };
    let env = InstallEnv {
        terminal: &terminal,
        runner: &runner,
        releases: &no_network,
        tunnels: &api,
        os: HostOs::Linux,
        local_timezone: "America/New_York".to_string(),
    };

    let report = run_install(&cfg, &InstallOptions::default(), &env).expect("install");

    let env_file = std::fs::read_to_string(cfg.deploy_dir.join(".env")).expect("read .env");
    assert!(env_file.contains("N8N_EDITOR_BASE_URL=\"https://n8n.example.com\""));
    assert!(!env_file.contains("cf-secret"));
    assert!(cfg.deploy_dir.join("docker-compose.yaml").exists());

    let lines = runner.command_lines();
    assert_eq!(lines[0], "docker info");
    assert!(lines.contains(&"docker compose up -d".to_string()));
    let connector = lines.last().expect("connector command");
    assert!(connector.starts_with("docker run -d cloudflare/cloudflared:latest tunnel"));
    assert!(connector.ends_with("--token ***"));

    let calls = api.calls();
    assert_eq!(calls[1].1["config"]["ingress"][0]["service"], "http://192.168.1.42:5678");
    assert_eq!(report.tunnel.map(|tunnel| tunnel.id).as_deref(), Some("tid-7"));
}
