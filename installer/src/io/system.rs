//! Host probes: operating system, local timezone, LAN address.

use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::debug;

use crate::core::timezones::FALLBACK_TIMEZONE;
use crate::io::process::{CommandRunner, CommandSpec, run_checked};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOs {
    Linux,
    MacOs,
    Other,
}

impl HostOs {
    pub fn current() -> Self {
        match std::env::consts::OS {
            "linux" => HostOs::Linux,
            "macos" => HostOs::MacOs,
            _ => HostOs::Other,
        }
    }
}

/// Host timezone from `TZ`, `/etc/timezone`, or the `/etc/localtime` link.
pub fn local_timezone() -> String {
    let tz_env = std::env::var("TZ").ok();
    let etc_timezone = fs::read_to_string("/etc/timezone").ok();
    let localtime = fs::read_link("/etc/localtime").ok();
    let zone = detect_timezone(
        tz_env.as_deref(),
        etc_timezone.as_deref(),
        localtime.as_deref(),
    );
    debug!(zone = %zone, "detected local timezone");
    zone
}

pub fn detect_timezone(
    tz_env: Option<&str>,
    etc_timezone: Option<&str>,
    localtime_link: Option<&Path>,
) -> String {
    if let Some(tz) = tz_env.map(|tz| tz.trim().trim_start_matches(':'))
        && is_zone_name(tz)
    {
        return tz.to_string();
    }
    if let Some(zone) = etc_timezone.map(str::trim)
        && is_zone_name(zone)
    {
        return zone.to_string();
    }
    if let Some(link) = localtime_link {
        let link = link.to_string_lossy();
        if let Some((_, zone)) = link.split_once("zoneinfo/")
            && is_zone_name(zone)
        {
            return zone.to_string();
        }
    }
    FALLBACK_TIMEZONE.to_string()
}

fn is_zone_name(value: &str) -> bool {
    !value.is_empty() && !value.starts_with('/') && (value.contains('/') || value == "UTC")
}

static IP_ROUTE_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bsrc\s+(\d{1,3}(?:\.\d{1,3}){3})\b").expect("ip route regex should be valid")
});

static IFCONFIG_INET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\binet\s+(?:addr:)?(\d{1,3}(?:\.\d{1,3}){3})\b")
        .expect("ifconfig regex should be valid")
});

/// Source address of the default route, from `ip route get 1` output.
pub fn parse_ip_route(output: &str) -> Option<String> {
    IP_ROUTE_SRC
        .captures(output)
        .map(|caps| caps[1].to_string())
}

/// First non-loopback IPv4 address in `ifconfig` output.
pub fn parse_ifconfig(output: &str) -> Option<String> {
    IFCONFIG_INET
        .captures_iter(output)
        .map(|caps| caps[1].to_string())
        .find(|ip| !ip.starts_with("127."))
}

/// LAN address the tunnel connector forwards to.
pub fn local_ip<R: CommandRunner + ?Sized>(runner: &R, os: HostOs) -> Result<String> {
    let ip = match os {
        HostOs::Linux => {
            let output = run_checked(runner, &CommandSpec::new("ip").args(["route", "get", "1"]))
                .context("query default route")?;
            parse_ip_route(&output)
        }
        HostOs::MacOs => {
            let output =
                run_checked(runner, &CommandSpec::new("ifconfig")).context("query interfaces")?;
            parse_ifconfig(&output)
        }
        HostOs::Other => bail!("unsupported operating system: {}", std::env::consts::OS),
    };
    ip.context("unable to determine local IP address")
}
