mod action;
mod api_client;
mod event;
mod folder;
mod help;
mod mode;
mod model;
mod tenant;
mod text_field;

pub use action::*;
pub use api_client::*;
pub use event::*;
pub use folder::*;
pub use help::*;
pub use mode::*;
pub use model::*;
pub use tenant::*;
pub use text_field::*;
