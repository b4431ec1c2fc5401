//! Simulated video player
//!
//! Stands in for a real video: a clock that advances while playing, can be
//! paused, seeked and sped up, and stops at an optional end time. Commands
//! are rejected until `mark_ready` is called, like a player still loading.

use std::sync::{Mutex, MutexGuard};

use narrator_core::{PlaybackState, Player, PlayerError, PlayerEvent};
use tokio::sync::broadcast;
use tokio::time::Instant;

const EVENT_CAPACITY: usize = 32;

#[derive(Debug)]
struct Clock {
    ready: bool,
    /// Position when the clock was last anchored
    position: f64,
    /// Set while playing
    anchor: Option<Instant>,
    rate: f64,
    duration: Option<f64>,
}

impl Clock {
    fn now(&self) -> f64 {
        let mut time = self.position;
        if let Some(anchor) = self.anchor {
            time += anchor.elapsed().as_secs_f64() * self.rate;
        }
        match self.duration {
            Some(end) => time.min(end),
            None => time,
        }
    }

    fn ended(&self) -> bool {
        self.duration.is_some_and(|end| self.now() >= end)
    }

    fn state(&self) -> PlaybackState {
        match self.anchor {
            Some(_) if self.ended() => PlaybackState::Other,
            Some(_) => PlaybackState::Playing,
            None => PlaybackState::Paused,
        }
    }

    /// Fold elapsed time into `position` and restart the anchor
    fn rebase(&mut self) {
        self.position = self.now();
        if self.anchor.is_some() {
            self.anchor = Some(Instant::now());
        }
    }
}

#[derive(Debug)]
pub struct ClockPlayer {
    clock: Mutex<Clock>,
    events: broadcast::Sender<PlayerEvent>,
}

impl ClockPlayer {
    /// Paused at 0, not ready yet
    pub fn new(duration: Option<f64>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            clock: Mutex::new(Clock {
                ready: false,
                position: 0.0,
                anchor: None,
                rate: 1.0,
                duration: duration.filter(|d| d.is_finite() && *d > 0.0),
            }),
            events,
        }
    }

    fn clock(&self) -> Result<MutexGuard<'_, Clock>, PlayerError> {
        self.clock.lock().map_err(|_| PlayerError::Disconnected)
    }

    fn ready_clock(&self) -> Result<MutexGuard<'_, Clock>, PlayerError> {
        let clock = self.clock()?;
        if !clock.ready {
            return Err(PlayerError::NotReady);
        }
        Ok(clock)
    }

    fn emit(&self, event: PlayerEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn mark_ready(&self) -> Result<(), PlayerError> {
        self.clock()?.ready = true;
        self.emit(PlayerEvent::Ready);
        Ok(())
    }

    /// Jump to `position` seconds, keeping the play/pause state
    pub fn seek(&self, position: f64) -> Result<(), PlayerError> {
        let state = {
            let mut clock = self.ready_clock()?;
            let mut target = position.max(0.0);
            if let Some(end) = clock.duration {
                target = target.min(end);
            }
            clock.position = target;
            if clock.anchor.is_some() {
                clock.anchor = Some(Instant::now());
            }
            clock.state()
        };
        tracing::debug!(position, "Seek");
        self.emit(PlayerEvent::StateChanged(state));
        Ok(())
    }

    pub fn set_rate(&self, rate: f64) -> Result<(), PlayerError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(PlayerError::Command {
                command: "set_rate",
                reason: format!("invalid playback rate {rate}"),
            });
        }
        {
            let mut clock = self.ready_clock()?;
            clock.rebase();
            clock.rate = rate;
        }
        self.emit(PlayerEvent::RateChanged(rate));
        Ok(())
    }

    pub fn rate(&self) -> Result<f64, PlayerError> {
        Ok(self.clock()?.rate)
    }

    pub fn duration(&self) -> Result<Option<f64>, PlayerError> {
        Ok(self.clock()?.duration)
    }
}

impl Player for ClockPlayer {
    fn current_time(&self) -> Result<f64, PlayerError> {
        Ok(self.ready_clock()?.now())
    }

    fn playback_state(&self) -> Result<PlaybackState, PlayerError> {
        Ok(self.ready_clock()?.state())
    }

    fn play(&self) -> Result<(), PlayerError> {
        {
            let mut clock = self.ready_clock()?;
            if clock.ended() {
                return Err(PlayerError::Command {
                    command: "play",
                    reason: "end of video reached".to_string(),
                });
            }
            if clock.anchor.is_none() {
                clock.anchor = Some(Instant::now());
            }
        }
        self.emit(PlayerEvent::StateChanged(PlaybackState::Playing));
        Ok(())
    }

    fn pause(&self) -> Result<(), PlayerError> {
        {
            let mut clock = self.ready_clock()?;
            clock.position = clock.now();
            clock.anchor = None;
        }
        self.emit(PlayerEvent::StateChanged(PlaybackState::Paused));
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ready_player(duration: Option<f64>) -> ClockPlayer {
        let player = ClockPlayer::new(duration);
        player.mark_ready().unwrap();
        player
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_commands_until_ready() {
        let player = ClockPlayer::new(None);
        assert!(matches!(player.current_time(), Err(PlayerError::NotReady)));
        assert!(matches!(player.play(), Err(PlayerError::NotReady)));

        player.mark_ready().unwrap();
        assert_eq!(player.current_time().unwrap(), 0.0);
        assert_eq!(player.playback_state().unwrap(), PlaybackState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn advances_only_while_playing() {
        let player = ready_player(None);
        player.play().unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!((player.current_time().unwrap() - 1.5).abs() < 1e-6);

        player.pause().unwrap();
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert!((player.current_time().unwrap() - 1.5).abs() < 1e-6);
        assert_eq!(player.playback_state().unwrap(), PlaybackState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn rate_scales_elapsed_time() {
        let player = ready_player(None);
        player.play().unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        player.set_rate(2.0).unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!((player.current_time().unwrap() - 3.0).abs() < 1e-6);
        assert!(player.set_rate(0.0).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn stops_at_duration() {
        let player = ready_player(Some(2.0));
        player.play().unwrap();
        tokio::time::sleep(Duration::from_secs(5)).await;

        assert_eq!(player.current_time().unwrap(), 2.0);
        assert_eq!(player.playback_state().unwrap(), PlaybackState::Other);
        player.pause().unwrap();
        assert!(player.play().is_err());

        player.seek(0.5).unwrap();
        player.play().unwrap();
        assert_eq!(player.playback_state().unwrap(), PlaybackState::Playing);
    }

    #[tokio::test(start_paused = true)]
    async fn emits_notifications() {
        let player = ClockPlayer::new(None);
        let mut events = player.subscribe();

        player.mark_ready().unwrap();
        player.play().unwrap();
        player.pause().unwrap();

        assert_eq!(events.recv().await.unwrap(), PlayerEvent::Ready);
        assert_eq!(
            events.recv().await.unwrap(),
            PlayerEvent::StateChanged(PlaybackState::Playing)
        );
        assert_eq!(
            events.recv().await.unwrap(),
            PlayerEvent::StateChanged(PlaybackState::Paused)
        );
    }
}
