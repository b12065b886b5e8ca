//! Cloudflare Tunnel provisioning.
//!
//! Four REST calls (create tunnel, set ingress, look up zone, add CNAME) and
//! one container launch for the connector. Every failure aborts; resources
//! already created in the account are left in place.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use rand::RngCore;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info, instrument};

use crate::core::domain::split_domain;
use crate::io::process::{CommandRunner, CommandSpec, run_checked};

/// Credentials and hostname handed over by the wizard, unprefixed.
#[derive(Clone, PartialEq, Eq)]
pub struct TunnelRequest {
    pub domain: String,
    pub account_id: String,
    pub api_token: String,
}

impl fmt::Debug for TunnelRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TunnelRequest")
            .field("domain", &self.domain)
            .field("account_id", &self.account_id)
            .field("api_token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedTunnel {
    pub id: String,
    pub name: String,
    /// Connector token used to run `cloudflared`.
    pub token: String,
}

pub trait TunnelApi {
    fn create_tunnel(&self, account_id: &str, payload: &Value) -> Result<CreatedTunnel>;
    fn configure_tunnel(&self, account_id: &str, tunnel_id: &str, payload: &Value) -> Result<()>;
    /// Zone id for an exact zone name within the account.
    fn find_zone(&self, account_id: &str, zone_name: &str) -> Result<String>;
    fn create_dns_record(&self, zone_id: &str, payload: &Value) -> Result<()>;
}

impl<A: TunnelApi + ?Sized> TunnelApi for &A {
    fn create_tunnel(&self, account_id: &str, payload: &Value) -> Result<CreatedTunnel> {
        (**self).create_tunnel(account_id, payload)
    }

    fn configure_tunnel(&self, account_id: &str, tunnel_id: &str, payload: &Value) -> Result<()> {
        (**self).configure_tunnel(account_id, tunnel_id, payload)
    }

    fn find_zone(&self, account_id: &str, zone_name: &str) -> Result<String> {
        (**self).find_zone(account_id, zone_name)
    }

    fn create_dns_record(&self, zone_id: &str, payload: &Value) -> Result<()> {
        (**self).create_dns_record(zone_id, payload)
    }
}

/// Opens an API session with the operator's credentials.
pub trait TunnelConnector {
    fn connect(&self, request: &TunnelRequest) -> Result<Box<dyn TunnelApi + '_>>;
}

/// Connects to the real Cloudflare API.
#[derive(Debug, Clone)]
pub struct CloudflareConnector {
    pub api_base: String,
    pub timeout: Duration,
}

impl TunnelConnector for CloudflareConnector {
    fn connect(&self, request: &TunnelRequest) -> Result<Box<dyn TunnelApi + '_>> {
        let client = CloudflareClient::new(&self.api_base, &request.api_token, self.timeout)?;
        Ok(Box::new(client))
    }
}

/// Where the connector forwards traffic and which image runs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectorTarget {
    pub local_ip: String,
    pub port: u16,
    pub image: String,
}

pub fn tunnel_name(domain: &str) -> String {
    format!("n8n {domain} tunnel")
}

/// 32 random bytes, standard base64.
pub fn generate_tunnel_secret() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    STANDARD.encode(bytes)
}

pub fn create_tunnel_payload(domain: &str, secret: &str) -> Value {
    json!({
        "config_src": "cloudflare",
        "name": tunnel_name(domain),
        "tunnel_secret": secret,
    })
}

pub fn ingress_payload(domain: &str, local_ip: &str, port: u16) -> Value {
    json!({
        "config": {
            "ingress": [
                { "hostname": domain, "service": format!("http://{local_ip}:{port}") },
                { "service": "http_status:404" },
            ],
        },
    })
}

pub fn dns_record_payload(record_name: &str, tunnel_id: &str) -> Value {
    json!({
        "type": "CNAME",
        "name": record_name,
        "content": format!("{tunnel_id}.cfargotunnel.com"),
        "ttl": 1,
        "proxied": true,
        "comment": format!("Added by n8n-install for tunnel ID: {tunnel_id}"),
    })
}

pub fn connector_command(image: &str, tunnel_token: &str) -> CommandSpec {
    CommandSpec::new("docker")
        .args(["run", "-d", image, "tunnel", "--no-autoupdate", "run", "--token"])
        .sensitive_arg(tunnel_token)
}

/// Create the tunnel, route `request.domain` through it, and start the connector.
#[instrument(skip_all, fields(domain = %request.domain))]
pub fn provision_tunnel<A, R>(
    api: &A,
    runner: &R,
    request: &TunnelRequest,
    target: &ConnectorTarget,
) -> Result<CreatedTunnel>
where
    A: TunnelApi + ?Sized,
    R: CommandRunner + ?Sized,
{
    let parts = split_domain(&request.domain)?;

    println!("\nCreating Cloudflare Tunnel in account...");
    let secret = generate_tunnel_secret();
    let tunnel = api
        .create_tunnel(
            &request.account_id,
            &create_tunnel_payload(&request.domain, &secret),
        )
        .context("create tunnel")?;
    info!(tunnel_id = %tunnel.id, "tunnel created");
    println!("Tunnel '{}' created successfully", tunnel.name);

    println!("\nAdding configuration to Cloudflare Tunnel...");
    api.configure_tunnel(
        &request.account_id,
        &tunnel.id,
        &ingress_payload(&request.domain, &target.local_ip, target.port),
    )
    .context("configure tunnel ingress")?;
    println!("Tunnel configuration updated successfully");

    println!(
        "\nPointing {} DNS records to Cloudflare Tunnel...",
        request.domain
    );
    let zone_id = api
        .find_zone(&request.account_id, &parts.registrable)
        .with_context(|| format!("find zone {}", parts.registrable))?;
    debug!(zone_id = %zone_id, record = parts.record_name(), "creating dns record");
    api.create_dns_record(
        &zone_id,
        &dns_record_payload(parts.record_name(), &tunnel.id),
    )
    .context("create dns record")?;
    println!("DNS records updated successfully");

    println!("\nStarting Cloudflare Tunnel Docker Container...");
    run_checked(runner, &connector_command(&target.image, &tunnel.token))
        .context("start tunnel connector")?;
    println!("Container successfully started");
    println!("visit https://{} to test it out\n", request.domain);

    Ok(tunnel)
}

/// Cloudflare v4 REST client.
pub struct CloudflareClient {
    http: Client,
    base_url: String,
    api_token: String,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

impl CloudflareClient {
    pub fn new(base_url: &str, api_token: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token: api_token.to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(&self, request: RequestBuilder, what: &str) -> Result<Option<T>> {
        let response = request
            .bearer_auth(&self.api_token)
            .send()
            .with_context(|| format!("{what}: request failed"))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("{what}: read response body"))?;
        let envelope: Envelope<T> = serde_json::from_str(&body)
            .with_context(|| format!("{what}: unexpected response ({status}): {body}"))?;
        if !status.is_success() || !envelope.success {
            let errors: Vec<String> = envelope
                .errors
                .iter()
                .map(|err| format!("{} {}", err.code, err.message))
                .collect();
            bail!("{what} failed ({status}): {}", errors.join("; "));
        }
        Ok(envelope.result)
    }
}

impl TunnelApi for CloudflareClient {
    fn create_tunnel(&self, account_id: &str, payload: &Value) -> Result<CreatedTunnel> {
        let request = self
            .http
            .post(self.url(&format!("accounts/{account_id}/cfd_tunnel")))
            .json(payload);
        self.send(request, "create tunnel")?
            .ok_or_else(|| anyhow!("create tunnel: response has no result"))
    }

    fn configure_tunnel(&self, account_id: &str, tunnel_id: &str, payload: &Value) -> Result<()> {
        let request = self
            .http
            .put(self.url(&format!(
                "accounts/{account_id}/cfd_tunnel/{tunnel_id}/configurations"
            )))
            .json(payload);
        self.send::<Value>(request, "configure tunnel")?;
        Ok(())
    }

    fn find_zone(&self, account_id: &str, zone_name: &str) -> Result<String> {
        let request = self
            .http
            .get(self.url("zones"))
            .query(&[("name", zone_name), ("account.id", account_id)]);
        let zones: Vec<Zone> = self.send(request, "list zones")?.unwrap_or_default();
        zones
            .into_iter()
            .next()
            .map(|zone| zone.id)
            .ok_or_else(|| anyhow!("no zone found for domain {zone_name}"))
    }

    fn create_dns_record(&self, zone_id: &str, payload: &Value) -> Result<()> {
        let request = self
            .http
            .post(self.url(&format!("zones/{zone_id}/dns_records")))
            .json(payload);
        self.send::<Value>(request, "create dns record")?;
        Ok(())
    }
}
