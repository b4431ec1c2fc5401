//! Shared, atomically replaced cue sequence
//!
//! The script side is the only writer; the poll loop reads a snapshot each
//! tick. Readers clone the inner `Arc` and release the lock immediately.

use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Cue, parse_script};

#[derive(Debug, Clone, Default)]
pub struct ScriptStore {
    cues: Arc<RwLock<Arc<[Cue]>>>,
}

impl ScriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store already holding the cues parsed from `raw`
    pub fn from_text(raw: &str) -> Self {
        Self::from_cues(parse_script(raw))
    }

    pub fn from_cues(cues: Vec<Cue>) -> Self {
        Self {
            cues: Arc::new(RwLock::new(cues.into())),
        }
    }

    /// Re-parse `raw` and swap in the result. Returns the new cue count.
    pub async fn replace_text(&self, raw: &str) -> usize {
        let cues = parse_script(raw);
        let count = cues.len();
        self.replace(cues).await;
        count
    }

    /// Replace the whole sequence
    pub async fn replace(&self, cues: Vec<Cue>) {
        *self.cues.write().await = cues.into();
    }

    /// Current sequence. Later replacements do not affect the returned slice.
    pub async fn snapshot(&self) -> Arc<[Cue]> {
        Arc::clone(&*self.cues.read().await)
    }

    pub async fn len(&self) -> usize {
        self.cues.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replace_swaps_the_whole_sequence() {
        let store = ScriptStore::from_text("1 0 1 one\n2 0 1 two");
        let before = store.snapshot().await;

        let count = store.replace_text("5 0 1 five").await;

        assert_eq!(count, 1);
        assert_eq!(before.len(), 2, "old snapshot must stay intact");
        let after = store.snapshot().await;
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].text(), "five");
    }

    #[tokio::test]
    async fn clones_share_the_sequence() {
        let store = ScriptStore::new();
        let reader = store.clone();
        assert!(reader.is_empty().await);

        store.replace(vec![Cue::new(3.0, 0.0, 1.0, "x")]).await;
        assert_eq!(reader.len().await, 1);
    }
}
