//! Walk the question tree against a terminal and fill the snapshot.

use anyhow::{Context, Result};
use tracing::{debug, instrument, trace};

use crate::core::catalog::ids;
use crate::core::flow::{Action, Answers, Node};
use crate::core::options::ReverseProxy;
use crate::core::router::commit;
use crate::core::snapshot::ConfigSnapshot;
use crate::io::terminal::{Terminal, ask};
use crate::io::tunnel::TunnelRequest;

/// Everything a finished walk produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardOutcome {
    pub snapshot: ConfigSnapshot,
    pub answers: Answers,
    /// Present when the operator chose the Cloudflare tunnel.
    pub tunnel: Option<TunnelRequest>,
}

/// Ask every reachable question in pre-order.
///
/// A node whose guards fail is skipped together with its subtree. Guards
/// only look at ancestors, so each decision is final once made.
#[instrument(skip_all)]
pub fn run_wizard<T: Terminal + ?Sized>(
    tree: &Node,
    terminal: &T,
    snapshot: ConfigSnapshot,
) -> Result<WizardOutcome> {
    let mut state = WalkState {
        snapshot,
        answers: Answers::default(),
    };
    visit(tree, terminal, &mut state)?;
    debug!(answered = state.answers.len(), "wizard finished");

    let tunnel = tunnel_request(&state.answers);
    Ok(WizardOutcome {
        snapshot: state.snapshot,
        answers: state.answers,
        tunnel,
    })
}

struct WalkState {
    snapshot: ConfigSnapshot,
    answers: Answers,
}

fn visit<T: Terminal + ?Sized>(node: &Node, terminal: &T, state: &mut WalkState) -> Result<()> {
    if !node.guards_hold(&state.answers) {
        trace!(node = node.id, "guards failed, skipping subtree");
        return Ok(());
    }
    match &node.action {
        Action::Group => {}
        Action::Notice(text) => terminal.notice(text),
        Action::Ask { question, derived } => {
            let raw = ask(terminal, question)?;
            let resolved = commit(question, &raw, &mut state.snapshot);
            for derive in derived {
                derive
                    .write(&resolved, &mut state.snapshot)
                    .with_context(|| format!("derive {} from {}", derive.key, node.id))?;
            }
            state.answers.record(node.id, resolved);
        }
    }
    for child in &node.children {
        visit(child, terminal, state)?;
    }
    Ok(())
}

fn tunnel_request(answers: &Answers) -> Option<TunnelRequest> {
    let proxy = answers.get(ids::REVERSE_PROXY).and_then(ReverseProxy::from_label);
    if proxy != Some(ReverseProxy::Cloudflare) {
        return None;
    }
    Some(TunnelRequest {
        domain: answers.get(ids::DOMAIN)?.to_string(),
        account_id: answers.get(ids::CF_ACCOUNT_ID)?.to_string(),
        api_token: answers.get(ids::CF_TOKEN)?.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::flow::{DeriveRule, yes};
    use crate::core::question::{NO, Question};
    use crate::core::snapshot::EnvKey;
    use crate::test_support::{Reply, ScriptedTerminal};

    fn small_tree() -> Node {
        Node::group("root").child(
            Node::ask(
                "metrics",
                Question::yes_no("Enable metrics?").writes(EnvKey::Metrics),
            )
            .derive(EnvKey::MetricsIncludeDefaultMetrics, DeriveRule::Lowercase)
            .child(
                Node::ask(
                    "prefix",
                    Question::text("Prefix?").writes(EnvKey::MetricsPrefix),
                )
                .when(yes("metrics")),
            )
            .child(Node::notice("done", "metrics configured")),
        )
    }

    #[test]
    fn failed_guard_skips_subtree() {
        let terminal = ScriptedTerminal::new([Reply::no()]);
        let outcome =
            run_wizard(&small_tree(), &terminal, ConfigSnapshot::seeded()).expect("walk");
        assert_eq!(terminal.asked("Prefix?"), 0);
        assert_eq!(outcome.answers.get("metrics"), Some(NO));
        assert_eq!(
            outcome.snapshot.get(EnvKey::MetricsIncludeDefaultMetrics),
            Some("false")
        );
        assert_eq!(terminal.notices(), vec!["metrics configured".to_string()]);
    }

    #[test]
    fn passing_guard_asks_children_in_order() {
        let terminal = ScriptedTerminal::new([Reply::yes(), Reply::text("n8n_")]);
        let outcome =
            run_wizard(&small_tree(), &terminal, ConfigSnapshot::seeded()).expect("walk");
        assert_eq!(
            terminal.prompts(),
            vec!["Enable metrics?".to_string(), "Prefix?".to_string()]
        );
        assert_eq!(outcome.snapshot.get(EnvKey::MetricsPrefix), Some("n8n_"));
        assert!(outcome.tunnel.is_none());
    }

    #[test]
    fn closed_input_aborts_walk() {
        let terminal = ScriptedTerminal::new([Reply::yes()]);
        let err = run_wizard(&small_tree(), &terminal, ConfigSnapshot::seeded())
            .expect_err("closed");
        assert!(err.to_string().contains("input stream closed"));
    }
}
