pub mod actions;
mod app_state;
pub mod events;
mod selection;

pub use app_state::*;
pub use selection::*;
