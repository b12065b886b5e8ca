//! Interactive n8n installer.
//!
//! Asks the operator a tree of configuration questions, renders the answers
//! into an `.env` file, starts n8n with docker compose, and optionally
//! exposes it through a Cloudflare Tunnel.
//!
//! - **[`core`]**: Pure, deterministic logic (questions, option tables, the
//!   question tree, the snapshot and its rendering). No I/O.
//! - **[`io`]**: Side-effecting operations (terminal, processes, files,
//!   HTTP). Each seam is a trait so tests can swap in fakes.
//!
//! Orchestration modules ([`wizard`], [`install`], [`check`]) coordinate
//! core logic with I/O to implement CLI commands.

pub mod check;
pub mod core;
pub mod exit_codes;
pub mod install;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod wizard;
