use tokio::sync::oneshot;

use super::SpeechError;

/// Signal that an utterance finished.
///
/// The backend fires (or drops) the paired sender when speaking ends; both
/// count as completion.
#[derive(Debug)]
pub struct SpeechCompletion {
    rx: oneshot::Receiver<()>,
}

impl SpeechCompletion {
    /// Create a completion handle and the sender the backend keeps
    pub fn channel() -> (oneshot::Sender<()>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }

    pub async fn wait(self) {
        let _ = self.rx.await;
    }
}

/// Text-to-speech backend as seen by the engine
pub trait Speech: Send + Sync + 'static {
    /// Start speaking `text` at `rate` (1.0 = normal).
    ///
    /// Returns a completion handle when the backend can report the end of
    /// the utterance, `None` otherwise.
    fn speak(&self, text: &str, rate: f32) -> Result<Option<SpeechCompletion>, SpeechError>;

    /// Stop any utterance in progress
    fn cancel(&self) {}
}
