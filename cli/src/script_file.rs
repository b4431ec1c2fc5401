//! Script file source
//!
//! Watches the script's directory (editors often replace the file instead of
//! writing in place) and bumps a revision whenever the script is created or
//! modified.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use narrator_core::{ScriptError, ScriptSource};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::watch;

pub struct FileScript {
    path: PathBuf,
    revision: Arc<watch::Sender<u64>>,
    _watcher: Mutex<RecommendedWatcher>,
}

impl FileScript {
    pub fn open(path: &Path) -> Result<Self, String> {
        let path = std::fs::canonicalize(path)
            .map_err(|e| format!("Cannot open script {}: {}", path.display(), e))?;
        let dir = path
            .parent()
            .ok_or_else(|| format!("Script {} has no parent directory", path.display()))?
            .to_path_buf();

        let (revision, _) = watch::channel(0u64);
        let revision = Arc::new(revision);

        let watched = path.clone();
        let notifier = Arc::clone(&revision);
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if is_script_change(&event, &watched) => {
                    notifier.send_modify(|rev| *rev += 1);
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "Script watcher error"),
            },
            Config::default(),
        )
        .map_err(|e| format!("Failed to start script watcher: {}", e))?;

        watcher
            .watch(&dir, RecursiveMode::NonRecursive)
            .map_err(|e| format!("Failed to watch {}: {}", dir.display(), e))?;

        tracing::info!(path = %path.display(), "Watching script");

        Ok(Self {
            path,
            revision,
            _watcher: Mutex::new(watcher),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Force a re-parse without a file change
    pub fn touch(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

fn is_script_change(event: &Event, script: &Path) -> bool {
    matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
        && event.paths.iter().any(|p| p.file_name() == script.file_name())
}

impl ScriptSource for FileScript {
    fn current_text(&self) -> Result<String, ScriptError> {
        std::fs::read_to_string(&self.path).map_err(|source| ScriptError::ReadFile {
            path: self.path.clone(),
            source,
        })
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}
