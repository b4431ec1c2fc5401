use tokio::sync::broadcast;

use super::PlayerError;

/// Coarse playback state; everything that is neither playing nor paused
/// (buffering, ended, not started) is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Other,
}

/// Notifications a player pushes to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// Player finished loading and accepts commands
    Ready,
    StateChanged(PlaybackState),
    /// Playback speed changed (multiplier)
    RateChanged(f64),
}

impl PlayerEvent {
    /// Events after which the engine re-checks position right away
    pub fn wants_immediate_tick(&self) -> bool {
        match self {
            PlayerEvent::Ready | PlayerEvent::RateChanged(_) => true,
            PlayerEvent::StateChanged(state) => {
                matches!(state, PlaybackState::Playing | PlaybackState::Paused)
            }
        }
    }
}

/// Video player as seen by the engine
pub trait Player: Send + Sync + 'static {
    /// Playhead position in seconds
    fn current_time(&self) -> Result<f64, PlayerError>;
    fn playback_state(&self) -> Result<PlaybackState, PlayerError>;
    fn play(&self) -> Result<(), PlayerError>;
    fn pause(&self) -> Result<(), PlayerError>;
    /// Readiness and state-change notifications
    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent>;
}

/// Position and state read together once per poll tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSnapshot {
    pub current_time: f64,
    pub is_playing: bool,
}

pub fn snapshot<P: Player + ?Sized>(player: &P) -> Result<PlaybackSnapshot, PlayerError> {
    let current_time = player.current_time()?;
    let state = player.playback_state()?;
    Ok(PlaybackSnapshot {
        current_time,
        is_playing: state == PlaybackState::Playing,
    })
}
