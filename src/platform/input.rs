//! Keyboard to command mapping

use crate::sim::Command;

/// Map a key name (`KeyboardEvent.key` on the web) to a session command.
/// Unknown keys map to `None` and are ignored.
pub fn command_for_key(key: &str) -> Option<Command> {
    match key {
        "r" | "R" => Some(Command::Reset),
        "q" | "Q" | "Escape" => Some(Command::Quit),
        _ => None,
    }
}
