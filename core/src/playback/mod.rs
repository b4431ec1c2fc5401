//! Collaborator interfaces
//!
//! The engine only talks to the video player and the speech backend through
//! these traits:
//! - **Player**: position, state, play/pause, and change notifications
//! - **Speech**: speak an utterance at a rate, optionally reporting completion

mod error;
mod player;
mod speech;

pub use error::{PlayerError, SpeechError};
pub use player::{PlaybackSnapshot, PlaybackState, Player, PlayerEvent, snapshot};
pub use speech::{Speech, SpeechCompletion};
