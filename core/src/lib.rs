pub mod context;
pub mod playback;
pub mod script;
pub mod sync;

// Re-exports for convenience
pub use context::{AppConfig, AppConfigExt, ConfigError, EngineSettings};
pub use playback::{
    PlaybackSnapshot, PlaybackState, Player, PlayerError, PlayerEvent, Speech, SpeechCompletion,
    SpeechError,
};
pub use script::{Cue, MemoryScript, ScriptError, ScriptSource, ScriptStore, parse_script, parse_timecode};
pub use sync::{EngineHandle, EngineStats, EngineStatus, SyncEngine, TriggerGuard};
