//! Platform layer
//!
//! Handles browser/native differences for:
//! - Keyboard input
//! - The JavaScript bridge that feeds detector landmarks in (WASM only)

pub mod input;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use input::command_for_key;
