pub mod commands;
pub mod context;
pub mod logging;
pub mod player;
pub mod repl;
pub mod script_file;
pub mod speech;

pub use context::CliContext;
pub use repl::readline;
