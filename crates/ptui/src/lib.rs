//! Terminal user interface for browsing Physna tenants.
//!
//! Lists the tenants of a config file, then lets the user browse folders,
//! search models and inspect geometric matches of the selected tenant.

pub mod application;
pub mod configuration;
pub mod domain;
pub mod infrastructure;
pub use application::ui::{destruct_terminal_for_panic, start_loop};
pub use configuration::{Config, ConfigKey};
pub use domain::models::{Action, ApiClient, Event, Folder, Model, ModelMatch, Tenant};
pub use domain::services::AppStateProps;
