//! Tenants, folders, models and the state machine of the browser.
//!
//! Nothing in here talks to a terminal or to the network directly, the
//! services only exchange `Action`s and `Event`s over channels.

pub mod models;
pub mod services;
