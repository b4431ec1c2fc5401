//! Synchronization engine
//!
//! Polls the player on a fixed interval, matches cues against the playhead
//! and sequences pause → speak → resume. Everything runs on one tokio task:
//! the poll sleep is re-armed in place, so there is never more than one
//! outstanding poll timer, and the pending resume lives on the same task.
//!
//! # Failure policy
//!
//! - Player unavailable while polling: the tick is skipped, polling continues
//! - Pause or speak fails: that cue's narration is abandoned
//! - Play fails on resume: logged, the engine goes back to polling
//!
//! Nothing but an explicit shutdown (or dropping the handle) ends the loop.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use narrator_types::{EngineSettings, OverlapPolicy, ResumePolicy};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, sleep_until};

use super::TriggerGuard;
use crate::playback::{Player, PlayerEvent, Speech, SpeechCompletion, snapshot};
use crate::script::{Cue, ScriptStore};

/// Observable engine state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineStatus {
    /// Created, loop not started yet
    Idle,
    Polling,
    /// Playback paused and the cue at `cue_time` is being spoken
    Triggered { cue_time: f64 },
    /// Narration finished, play issued
    Resuming,
    Stopped,
}

/// Counters published after every tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub ticks: u64,
    /// Cues that matched, narrated or not
    pub triggered: u64,
    /// Cues actually spoken
    pub narrated: u64,
    pub resumed: u64,
    /// Ticks dropped because the player could not be read
    pub skipped_ticks: u64,
}

/// Engine configuration; `spawn` starts the polling loop.
pub struct SyncEngine<P, S> {
    player: Arc<P>,
    speech: Arc<S>,
    store: ScriptStore,
    settings: EngineSettings,
}

impl<P: Player, S: Speech> SyncEngine<P, S> {
    pub fn new(player: Arc<P>, speech: Arc<S>, store: ScriptStore, settings: EngineSettings) -> Self {
        Self {
            player,
            speech,
            store,
            settings,
        }
    }

    /// Start the polling loop on the current tokio runtime
    pub fn spawn(self) -> EngineHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let (status_tx, status_rx) = watch::channel(EngineStatus::Idle);
        let (stats_tx, stats_rx) = watch::channel(EngineStats::default());

        // Subscribe here so notifications sent right after spawn() are seen
        let events = self.player.subscribe();

        let poll = PollLoop {
            guard: TriggerGuard::new(self.settings.trigger_window()),
            player: self.player,
            speech: self.speech,
            store: self.store,
            settings: self.settings,
            pending: None,
            queue: VecDeque::new(),
            stats: EngineStats::default(),
            status_tx,
            stats_tx,
            shutdown: shutdown_rx,
        };
        let task = tokio::spawn(poll.run(events));

        EngineHandle {
            shutdown: shutdown_tx,
            status: status_rx,
            stats: stats_rx,
            task: Some(task),
        }
    }
}

/// Handle to a running engine. Dropping it also stops the loop.
pub struct EngineHandle {
    shutdown: watch::Sender<bool>,
    status: watch::Receiver<EngineStatus>,
    stats: watch::Receiver<EngineStats>,
    task: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn status(&self) -> EngineStatus {
        *self.status.borrow()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<EngineStatus> {
        self.status.clone()
    }

    pub fn stats(&self) -> EngineStats {
        *self.stats.borrow()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop polling, drop any pending resume and wait for the loop to exit.
    /// No player or speech command is issued afterwards. Safe to call twice.
    pub async fn shutdown(&mut self) {
        self.shutdown.send_replace(true);
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Sync engine task ended abnormally");
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Poll loop
// ─────────────────────────────────────────────────────────────────────────────

/// Deferred play for the narration in progress
struct PendingResume {
    cue_time: f64,
    done: Pin<Box<dyn Future<Output = ()> + Send>>,
}

impl PendingResume {
    fn new(
        cue_time: f64,
        hold_secs: f64,
        completion: Option<SpeechCompletion>,
        policy: ResumePolicy,
    ) -> Self {
        let hold = Duration::try_from_secs_f64(hold_secs).unwrap_or(Duration::MAX);
        let done: Pin<Box<dyn Future<Output = ()> + Send>> = match (policy, completion) {
            (ResumePolicy::AfterSpeech, Some(completion)) => Box::pin(async move {
                tokio::join!(completion.wait(), sleep(hold));
            }),
            _ => Box::pin(sleep(hold)),
        };
        Self { cue_time, done }
    }
}

async fn wait_pending(pending: &mut Option<PendingResume>) {
    match pending {
        Some(resume) => resume.done.as_mut().await,
        None => std::future::pending().await,
    }
}

struct PollLoop<P, S> {
    player: Arc<P>,
    speech: Arc<S>,
    store: ScriptStore,
    settings: EngineSettings,
    guard: TriggerGuard,
    pending: Option<PendingResume>,
    /// Cues matched while another was being narrated (queue policy)
    queue: VecDeque<Cue>,
    stats: EngineStats,
    status_tx: watch::Sender<EngineStatus>,
    stats_tx: watch::Sender<EngineStats>,
    shutdown: watch::Receiver<bool>,
}

impl<P: Player, S: Speech> PollLoop<P, S> {
    async fn run(mut self, mut events: broadcast::Receiver<PlayerEvent>) {
        let interval = self.settings.poll_interval();
        let mut events_open = true;
        let mut next_tick = Instant::now();

        self.set_status(EngineStatus::Polling);
        tracing::info!(
            poll_ms = interval.as_millis() as u64,
            window_secs = self.guard.window(),
            resume = ?self.settings.resume_policy,
            overlap = ?self.settings.overlap_policy,
            "Sync engine started"
        );

        loop {
            tokio::select! {
                biased;

                // Err means the handle was dropped
                _ = self.shutdown.changed() => break,

                _ = wait_pending(&mut self.pending), if self.pending.is_some() => {
                    self.finish_narration();
                }

                event = events.recv(), if events_open => match event {
                    Ok(event) if event.wants_immediate_tick() => {
                        tracing::debug!(?event, "Player notification, polling now");
                        self.tick().await;
                        next_tick = Instant::now() + interval;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Player notifications lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("Player notifications closed, polling only");
                        events_open = false;
                    }
                },

                _ = sleep_until(next_tick) => {
                    self.tick().await;
                    next_tick = Instant::now() + interval;
                }
            }
        }

        self.stop();
    }

    fn is_stopped(&self) -> bool {
        *self.shutdown.borrow()
    }

    async fn tick(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.stats.ticks += 1;

        let playback = match snapshot(self.player.as_ref()) {
            Ok(playback) => playback,
            Err(e) => {
                self.stats.skipped_ticks += 1;
                if e.is_retryable() {
                    tracing::debug!(error = %e, "Player unavailable, skipping tick");
                } else {
                    tracing::warn!(error = %e, "Failed to read player, skipping tick");
                }
                self.publish_stats();
                return;
            }
        };

        let cues = self.store.snapshot().await;
        let matched = self.guard.collect_matches(&cues, playback.current_time);

        for cue in matched {
            self.stats.triggered += 1;
            tracing::debug!(
                trigger_time = cue.trigger_time(),
                current_time = playback.current_time,
                playing = playback.is_playing,
                text = cue.text(),
                "Cue triggered"
            );

            if self.pending.is_some() && self.settings.overlap_policy == OverlapPolicy::Queue {
                tracing::debug!(trigger_time = cue.trigger_time(), "Narration in progress, cue queued");
                self.queue.push_back(cue);
                continue;
            }

            // Paused by the user: record the trigger but stay silent
            if !playback.is_playing {
                continue;
            }

            self.begin_narration(cue, true);
        }

        self.publish_stats();
    }

    /// Pause (optionally), speak and arm the resume. Returns false when the
    /// narration could not start.
    fn begin_narration(&mut self, cue: Cue, pause_player: bool) -> bool {
        if self.is_stopped() {
            return false;
        }
        let cue_time = cue.trigger_time();

        if pause_player {
            if let Err(e) = self.player.pause() {
                tracing::warn!(error = %e, cue_time, "Failed to pause for narration");
                return false;
            }
        }
        self.set_status(EngineStatus::Triggered { cue_time });

        let completion = match self.speech.speak(cue.text(), cue.speech_rate()) {
            Ok(completion) => completion,
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(error = %e, cue_time, "Failed to speak cue");
                } else {
                    tracing::error!(error = %e, cue_time, "Speech backend failed");
                }
                if pause_player && self.pending.is_none() {
                    self.resume();
                }
                return false;
            }
        };

        tracing::info!(cue_time, rate = cue.speech_rate(), text = cue.text(), "Narrating");
        self.stats.narrated += 1;
        self.pending = Some(PendingResume::new(
            cue_time,
            cue.pause_duration(),
            completion,
            self.settings.resume_policy,
        ));
        true
    }

    /// Current narration is done: speak the next queued cue or resume
    fn finish_narration(&mut self) {
        if let Some(done) = self.pending.take() {
            tracing::debug!(cue_time = done.cue_time, "Narration finished");
        }

        while let Some(cue) = self.queue.pop_front() {
            if self.begin_narration(cue, false) {
                return;
            }
        }

        self.resume();
    }

    fn resume(&mut self) {
        if self.is_stopped() {
            return;
        }
        self.set_status(EngineStatus::Resuming);
        match self.player.play() {
            Ok(()) => self.stats.resumed += 1,
            Err(e) => tracing::warn!(error = %e, "Failed to resume playback"),
        }
        self.set_status(EngineStatus::Polling);
        self.publish_stats();
    }

    fn stop(&mut self) {
        self.queue.clear();
        if let Some(pending) = self.pending.take() {
            tracing::debug!(cue_time = pending.cue_time, "Dropping pending resume");
            self.speech.cancel();
        }
        self.set_status(EngineStatus::Stopped);
        self.publish_stats();
        tracing::info!(
            ticks = self.stats.ticks,
            triggered = self.stats.triggered,
            narrated = self.stats.narrated,
            "Sync engine stopped"
        );
    }

    fn set_status(&self, status: EngineStatus) {
        self.status_tx.send_replace(status);
    }

    fn publish_stats(&self) {
        self.stats_tx.send_replace(self.stats);
    }
}
