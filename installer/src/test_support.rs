//! Test-only fakes for the terminal, command runner and tunnel API.

use std::cell::RefCell;
use std::collections::VecDeque;

use anyhow::{Result, anyhow};
use serde_json::{Value, json};

use crate::core::catalog::{CatalogContext, build_catalog};
use crate::core::flow::Node;
use crate::io::process::{CommandOutput, CommandRunner, CommandSpec};
use crate::io::terminal::Terminal;
use crate::io::tunnel::{CreatedTunnel, TunnelApi, TunnelConnector, TunnelRequest};

/// One canned answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Text(String),
    /// Choose by label.
    Pick(String),
    /// Choose by index.
    Select(usize),
    Confirm(bool),
    Secret(String),
    /// Accept whatever default the prompt offers.
    Default,
}

impl Reply {
    pub fn text(value: &str) -> Self {
        Reply::Text(value.to_string())
    }

    pub fn pick(label: &str) -> Self {
        Reply::Pick(label.to_string())
    }

    pub fn secret(value: &str) -> Self {
        Reply::Secret(value.to_string())
    }

    pub fn yes() -> Self {
        Reply::Confirm(true)
    }

    pub fn no() -> Self {
        Reply::Confirm(false)
    }
}

/// Terminal that replays canned answers and records what it was asked.
///
/// Replies are resolved in order: the first rule whose fragment appears in
/// the prompt, then the queue, then (when enabled) the prompt's default.
/// Running out of replies behaves like a closed input stream.
#[derive(Debug, Default)]
pub struct ScriptedTerminal {
    queue: RefCell<VecDeque<Reply>>,
    rules: Vec<(String, Reply)>,
    accept_defaults: bool,
    prompts: RefCell<Vec<String>>,
    notices: RefCell<Vec<String>>,
}

impl ScriptedTerminal {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        Self {
            queue: RefCell::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Accept the default for every prompt without a matching rule.
    pub fn accepting_defaults() -> Self {
        Self {
            accept_defaults: true,
            ..Self::default()
        }
    }

    /// Answer every prompt containing `fragment` with `reply`.
    pub fn answer(mut self, fragment: &str, reply: Reply) -> Self {
        self.rules.push((fragment.to_string(), reply));
        self
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }

    pub fn notices(&self) -> Vec<String> {
        self.notices.borrow().clone()
    }

    /// Number of prompts asked that contain `fragment`.
    pub fn asked(&self, fragment: &str) -> usize {
        self.prompts
            .borrow()
            .iter()
            .filter(|prompt| prompt.contains(fragment))
            .count()
    }

    fn next(&self, prompt: &str) -> Result<Reply> {
        self.prompts.borrow_mut().push(prompt.to_string());
        if let Some((_, reply)) = self
            .rules
            .iter()
            .find(|(fragment, _)| prompt.contains(fragment.as_str()))
        {
            return Ok(reply.clone());
        }
        if let Some(reply) = self.queue.borrow_mut().pop_front() {
            return Ok(reply);
        }
        if self.accept_defaults {
            return Ok(Reply::Default);
        }
        Err(anyhow!("input stream closed while asking {prompt:?}"))
    }
}

fn mismatch(reply: &Reply, prompt: &str) -> anyhow::Error {
    anyhow!("scripted reply {reply:?} does not fit prompt {prompt:?}")
}

impl Terminal for ScriptedTerminal {
    fn text(&self, prompt: &str, _default: Option<&str>) -> Result<String> {
        match self.next(prompt)? {
            Reply::Text(value) => Ok(value),
            Reply::Default => Ok(String::new()),
            other => Err(mismatch(&other, prompt)),
        }
    }

    fn select(&self, prompt: &str, choices: &[String], default: usize) -> Result<usize> {
        match self.next(prompt)? {
            Reply::Pick(label) => choices
                .iter()
                .position(|choice| *choice == label)
                .ok_or_else(|| anyhow!("{label:?} is not a choice of {prompt:?}")),
            Reply::Select(index) => Ok(index),
            Reply::Default => Ok(default),
            other => Err(mismatch(&other, prompt)),
        }
    }

    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        match self.next(prompt)? {
            Reply::Confirm(value) => Ok(value),
            Reply::Default => Ok(default),
            other => Err(mismatch(&other, prompt)),
        }
    }

    fn secret(&self, prompt: &str) -> Result<String> {
        match self.next(prompt)? {
            Reply::Secret(value) | Reply::Text(value) => Ok(value),
            Reply::Default => Ok(String::new()),
            other => Err(mismatch(&other, prompt)),
        }
    }

    fn notice(&self, message: &str) {
        self.notices.borrow_mut().push(message.to_string());
    }
}

/// The shipped catalog with a fixed host timezone.
pub fn test_catalog() -> Node {
    build_catalog(&CatalogContext {
        local_timezone: "America/New_York".to_string(),
    })
}

/// Command runner that records invocations instead of spawning them.
///
/// Commands succeed with empty output unless a rule matches their display
/// form.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: RefCell<Vec<CommandSpec>>,
    failures: Vec<(String, String)>,
    responses: Vec<(String, String)>,
    missing: Vec<String>,
}

impl RecordingRunner {
    /// Fail commands containing `fragment` with exit code 1 and `stderr`.
    pub fn failing(mut self, fragment: &str, stderr: &str) -> Self {
        self.failures.push((fragment.to_string(), stderr.to_string()));
        self
    }

    /// Answer commands containing `fragment` with `stdout`.
    pub fn responding(mut self, fragment: &str, stdout: &str) -> Self {
        self.responses.push((fragment.to_string(), stdout.to_string()));
        self
    }

    /// Report `program` as absent from `PATH`.
    pub fn without_program(mut self, program: &str) -> Self {
        self.missing.push(program.to_string());
        self
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.borrow().clone()
    }

    pub fn command_lines(&self) -> Vec<String> {
        self.commands
            .borrow()
            .iter()
            .map(|spec| spec.to_string())
            .collect()
    }
}

fn canned_output(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
    CommandOutput {
        code: Some(code),
        stdout: stdout.as_bytes().to_vec(),
        stderr: stderr.as_bytes().to_vec(),
        stdout_truncated: 0,
        stderr_truncated: 0,
        timed_out: false,
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        self.commands.borrow_mut().push(spec.clone());
        let line = spec.to_string();
        if let Some((_, stderr)) = self.failures.iter().find(|(f, _)| line.contains(f.as_str())) {
            return Ok(canned_output(1, "", stderr));
        }
        if let Some((_, stdout)) = self.responses.iter().find(|(f, _)| line.contains(f.as_str())) {
            return Ok(canned_output(0, stdout, ""));
        }
        Ok(canned_output(0, "", ""))
    }

    fn has_program(&self, program: &str) -> bool {
        !self.missing.iter().any(|missing| missing == program)
    }
}

/// In-memory tunnel API that records each call with its payload.
#[derive(Debug)]
pub struct FakeTunnelApi {
    tunnel_id: String,
    zone_id: Option<String>,
    calls: RefCell<Vec<(String, Value)>>,
}

impl FakeTunnelApi {
    pub fn new(tunnel_id: &str, zone_id: &str) -> Self {
        Self {
            tunnel_id: tunnel_id.to_string(),
            zone_id: Some(zone_id.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Zone lookups find nothing.
    pub fn without_zone(mut self) -> Self {
        self.zone_id = None;
        self
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.borrow().clone()
    }

    fn record(&self, name: &str, payload: Value) {
        self.calls.borrow_mut().push((name.to_string(), payload));
    }
}

impl TunnelApi for FakeTunnelApi {
    fn create_tunnel(&self, _account_id: &str, payload: &Value) -> Result<CreatedTunnel> {
        self.record("create_tunnel", payload.clone());
        Ok(CreatedTunnel {
            id: self.tunnel_id.clone(),
            name: payload["name"].as_str().unwrap_or_default().to_string(),
            token: format!("token-for-{}", self.tunnel_id),
        })
    }

    fn configure_tunnel(&self, _account_id: &str, _tunnel_id: &str, payload: &Value) -> Result<()> {
        self.record("configure_tunnel", payload.clone());
        Ok(())
    }

    fn find_zone(&self, _account_id: &str, zone_name: &str) -> Result<String> {
        self.record("find_zone", json!(zone_name));
        self.zone_id
            .clone()
            .ok_or_else(|| anyhow!("no zone found for domain {zone_name}"))
    }

    fn create_dns_record(&self, _zone_id: &str, payload: &Value) -> Result<()> {
        self.record("create_dns_record", payload.clone());
        Ok(())
    }
}

impl TunnelConnector for FakeTunnelApi {
    fn connect(&self, _request: &TunnelRequest) -> Result<Box<dyn TunnelApi + '_>> {
        Ok(Box::new(self))
    }
}
