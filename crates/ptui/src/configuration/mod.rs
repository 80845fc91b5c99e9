//! Configuration management for the terminal interface.
//!
//! Settings come from built-in defaults, the TOML config file (which also
//! lists the tenants), environment variables and command line flags, in
//! increasing order of precedence.

mod config;

pub use config::*;
