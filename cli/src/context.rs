use std::path::Path;
use std::sync::Arc;

use narrator_core::script::watch_source;
use narrator_core::{AppConfig, EngineHandle, ScriptSource, ScriptStore, SyncEngine};
use tokio::task::JoinHandle;

use crate::player::ClockPlayer;
use crate::script_file::FileScript;
use crate::speech::TtsSpeech;

#[derive(Default)]
pub struct BackgroundTasks {
    pub script_watch: Option<JoinHandle<()>>,
}

impl BackgroundTasks {
    pub fn abort_all(&mut self) {
        if let Some(handle) = self.script_watch.take() {
            handle.abort();
        }
    }
}

/// Holds all state for one narrated playback session.
/// This is a lightweight container - logic lives in the individual types.
pub struct CliContext {
    pub config: AppConfig,
    pub player: Arc<ClockPlayer>,
    pub script: Arc<FileScript>,
    pub store: ScriptStore,
    engine: EngineHandle,
    tasks: BackgroundTasks,
}

impl CliContext {
    /// Load the script, start watching it and spawn the engine. The player
    /// is marked ready once everything is wired, so the engine sees the
    /// `Ready` notification.
    pub async fn start(
        script_path: &Path,
        config: AppConfig,
        duration: Option<f64>,
    ) -> Result<Self, String> {
        let script = Arc::new(FileScript::open(script_path)?);
        let text = script.current_text().map_err(|e| e.to_string())?;

        let store = ScriptStore::new();
        let count = store.replace_text(&text).await;
        println!("Loaded {} cues from {}", count, script.path().display());

        let tasks = BackgroundTasks {
            script_watch: Some(watch_source(Arc::clone(&script), store.clone())),
        };

        let player = Arc::new(ClockPlayer::new(duration));
        let speech = Arc::new(TtsSpeech::new(config.audio.clone()));
        let engine = SyncEngine::new(
            Arc::clone(&player),
            speech,
            store.clone(),
            config.engine.clone(),
        )
        .spawn();

        player.mark_ready().map_err(|e| e.to_string())?;

        Ok(Self {
            config,
            player,
            script,
            store,
            engine,
            tasks,
        })
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    /// Stop the engine and the script watcher
    pub async fn shutdown(&mut self) {
        self.tasks.abort_all();
        self.engine.shutdown().await;
    }
}
