//! Side-effecting operations: terminal, processes, filesystem, network.

pub mod config;
pub mod deploy;
pub mod process;
pub mod runtime;
pub mod system;
pub mod terminal;
pub mod tunnel;
