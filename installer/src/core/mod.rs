//! Deterministic, pure logic for the installer wizard.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod catalog;
pub mod domain;
pub mod env_file;
pub mod flow;
pub mod invariants;
pub mod options;
pub mod question;
pub mod router;
pub mod snapshot;
pub mod timezones;
