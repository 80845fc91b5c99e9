//! Application layer driving the terminal interface.
//!
//! Parses the command line, owns the UI loop and draws the application state.

pub mod cli;
pub mod render;
pub mod ui;
