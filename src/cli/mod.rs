pub mod commands;
pub mod prompt;

pub use commands::{Cli, Commands, run};
pub use prompt::TerminalPrompter;
