//! Script text sources and the re-parse task
//!
//! A source exposes its current text and a revision counter that ticks on
//! every change. `watch_source` keeps a `ScriptStore` in step with it.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::{ScriptError, ScriptStore};

/// Anything that can provide script text and announce edits
pub trait ScriptSource: Send + Sync + 'static {
    /// Full text as it is now
    fn current_text(&self) -> Result<String, ScriptError>;

    /// Revision counter, bumped on every change
    fn subscribe(&self) -> watch::Receiver<u64>;
}

/// Parse the source once, then again on every change notification.
///
/// A failed read keeps the previous cues. The task runs until it is aborted
/// or the source's revision channel closes.
pub fn watch_source<S: ScriptSource>(source: Arc<S>, store: ScriptStore) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut changes = source.subscribe();
        loop {
            changes.borrow_and_update();
            match source.current_text() {
                Ok(text) => {
                    let count = store.replace_text(&text).await;
                    tracing::info!(cues = count, "Script parsed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to read script, keeping previous cues");
                }
            }

            if changes.changed().await.is_err() {
                tracing::debug!("Script source closed");
                break;
            }
        }
    })
}

/// In-memory script, edited through `set_text`
#[derive(Debug)]
pub struct MemoryScript {
    text: RwLock<String>,
    revision: watch::Sender<u64>,
}

impl MemoryScript {
    pub fn new(text: impl Into<String>) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            text: RwLock::new(text.into()),
            revision,
        }
    }

    /// Replace the text and notify subscribers
    pub fn set_text(&self, text: impl Into<String>) {
        if let Ok(mut current) = self.text.write() {
            *current = text.into();
        }
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl ScriptSource for MemoryScript {
    fn current_text(&self) -> Result<String, ScriptError> {
        self.text
            .read()
            .map(|text| text.clone())
            .map_err(|_| ScriptError::Closed)
    }

    fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    async fn wait_for_len(store: &ScriptStore, len: usize) {
        for _ in 0..100 {
            if store.len().await == len {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("store never reached {len} cues");
    }

    #[tokio::test]
    async fn edits_are_reparsed() {
        let source = Arc::new(MemoryScript::new("1 0 1 a"));
        let store = ScriptStore::new();
        let task = watch_source(Arc::clone(&source), store.clone());

        wait_for_len(&store, 1).await;

        source.set_text("1 0 1 a\n2 0 1 b\n; c");
        wait_for_len(&store, 2).await;
        assert_eq!(store.snapshot().await[1].text(), "b");

        task.abort();
    }

    struct FlakySource {
        fail: std::sync::atomic::AtomicBool,
        revision: watch::Sender<u64>,
    }

    impl ScriptSource for FlakySource {
        fn current_text(&self) -> Result<String, ScriptError> {
            if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
                Err(ScriptError::Closed)
            } else {
                Ok("1 0 1 a\n2 0 1 b".to_string())
            }
        }

        fn subscribe(&self) -> watch::Receiver<u64> {
            self.revision.subscribe()
        }
    }

    #[tokio::test]
    async fn failed_read_keeps_previous_cues() {
        let (revision, _) = watch::channel(0);
        let source = Arc::new(FlakySource {
            fail: std::sync::atomic::AtomicBool::new(false),
            revision,
        });
        let store = ScriptStore::new();
        let task = watch_source(Arc::clone(&source), store.clone());
        wait_for_len(&store, 2).await;

        source.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        source.revision.send_modify(|rev| *rev += 1);
        tokio::time::sleep(Duration::from_millis(20)).await;

        assert_eq!(store.len().await, 2);
        task.abort();
    }
}
