//! Timed narration scripts
//!
//! A script is plain text, one cue per line:
//!
//! ```text
//! ; comment lines start with a semicolon
//! 00:01:05 1.5 1.2 The door opens slowly.
//! 95 0 1 Rain starts.
//! ```
//!
//! Fields are `timecode [pause] [rate] [text...]`, separated by spaces.
//! Every parse produces a fresh cue sequence that replaces the previous one.

mod cue;
mod error;
mod parser;
mod source;
mod store;

pub use cue::Cue;
pub use error::ScriptError;
pub use parser::{parse_script, parse_timecode};
pub use source::{MemoryScript, ScriptSource, watch_source};
pub use store::ScriptStore;
