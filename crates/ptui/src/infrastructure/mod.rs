//! Infrastructure layer providing external integrations.
//!
//! This module contains the Physna API client implementations and the
//! logging plumbing that feeds both the log file and the in-app Log pane.

pub mod clients;
pub mod logging;
