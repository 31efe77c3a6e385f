//! Passport application shell
//!
//! Menu-driven front end over [`passport_gateway::PassportClient`]. Input and
//! output are generic so the shell runs against stdin/stdout or in-memory
//! buffers alike.

pub mod cli;
pub mod prompt;
pub mod render;
pub mod shell;

pub use cli::{Cli, Command};
pub use prompt::Prompter;
pub use shell::{Shell, ShellError};
