//! Text-to-speech backend
//!
//! Uses the `tts` crate on Windows/macOS, owned by a dedicated worker
//! thread, and an `espeak` subprocess on Linux.
//! Both report completion, so the engine can resume as soon as speech ends.

use narrator_core::{Speech, SpeechCompletion, SpeechError};
use narrator_types::AudioSettings;

/// Speech backend selected for the current platform
pub struct TtsSpeech {
    settings: AudioSettings,
    backend: backend::Backend,
}

impl TtsSpeech {
    pub fn new(settings: AudioSettings) -> Self {
        let backend = backend::Backend::new(&settings);
        Self { settings, backend }
    }
}

impl Speech for TtsSpeech {
    fn speak(&self, text: &str, rate: f32) -> Result<Option<SpeechCompletion>, SpeechError> {
        if !self.settings.enabled {
            tracing::debug!(text, "Audio disabled, not speaking");
            return Ok(None);
        }
        self.backend.speak(text, rate)
    }

    fn cancel(&self) {
        self.backend.cancel();
    }
}

/// Words per minute for `rate`, within what espeak accepts
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn words_per_minute(base: u32, rate: f32) -> u32 {
    ((base as f32) * rate).round().clamp(80.0, 450.0) as u32
}

#[cfg(target_os = "linux")]
mod backend {
    use std::io::ErrorKind;
    use std::process::{Command, Stdio};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    use narrator_core::{SpeechCompletion, SpeechError};
    use narrator_types::AudioSettings;

    use super::words_per_minute;

    const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(20);

    pub(super) struct Backend {
        base_wpm: u32,
        voice: Option<String>,
        /// Bumped by `cancel`; utterances started under an older value are killed
        generation: Arc<AtomicU64>,
    }

    impl Backend {
        pub(super) fn new(settings: &AudioSettings) -> Self {
            Self {
                base_wpm: settings.base_words_per_minute,
                voice: settings.voice.clone(),
                generation: Arc::new(AtomicU64::new(0)),
            }
        }

        pub(super) fn speak(
            &self,
            text: &str,
            rate: f32,
        ) -> Result<Option<SpeechCompletion>, SpeechError> {
            let mut command = Command::new("espeak");
            command
                .arg("-s")
                .arg(words_per_minute(self.base_wpm, rate).to_string());
            if let Some(voice) = &self.voice {
                command.arg("-v").arg(voice);
            }
            command
                .arg("--")
                .arg(text)
                .stdout(Stdio::null())
                .stderr(Stdio::null());

            let mut child = command.spawn().map_err(|e| match e.kind() {
                ErrorKind::NotFound => SpeechError::Unavailable {
                    reason: "espeak is not installed".to_string(),
                },
                _ => SpeechError::Spawn(e),
            })?;

            let (done, completion) = SpeechCompletion::channel();
            let generation = Arc::clone(&self.generation);
            let started = generation.load(Ordering::SeqCst);

            std::thread::spawn(move || {
                loop {
                    match child.try_wait() {
                        Ok(Some(_)) | Err(_) => break,
                        Ok(None) => {}
                    }
                    if generation.load(Ordering::SeqCst) != started {
                        let _ = child.kill();
                        let _ = child.wait();
                        break;
                    }
                    std::thread::sleep(EXIT_POLL_INTERVAL);
                }
                let _ = done.send(());
            });

            Ok(Some(completion))
        }

        pub(super) fn cancel(&self) {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[cfg(not(target_os = "linux"))]
mod backend {
    use std::collections::VecDeque;
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};

    use narrator_core::{SpeechCompletion, SpeechError};
    use narrator_types::AudioSettings;
    use tokio::sync::oneshot;

    enum Request {
        Speak {
            text: String,
            rate: f32,
            done: oneshot::Sender<()>,
        },
        Stop,
    }

    pub(super) struct Backend {
        requests: Mutex<mpsc::Sender<Request>>,
    }

    impl Backend {
        pub(super) fn new(settings: &AudioSettings) -> Self {
            let (tx, rx) = mpsc::channel();
            let voice = settings.voice.clone();
            std::thread::spawn(move || run_worker(rx, voice));
            Self {
                requests: Mutex::new(tx),
            }
        }

        pub(super) fn speak(
            &self,
            text: &str,
            rate: f32,
        ) -> Result<Option<SpeechCompletion>, SpeechError> {
            let (done, completion) = SpeechCompletion::channel();
            self.send(Request::Speak {
                text: text.to_string(),
                rate,
                done,
            })?;
            Ok(Some(completion))
        }

        pub(super) fn cancel(&self) {
            let _ = self.send(Request::Stop);
        }

        fn send(&self, request: Request) -> Result<(), SpeechError> {
            let unavailable = || SpeechError::Unavailable {
                reason: "speech worker stopped".to_string(),
            };
            self.requests
                .lock()
                .map_err(|_| unavailable())?
                .send(request)
                .map_err(|_| unavailable())
        }
    }

    /// Owns the TTS engine. Completion senders wait in `waiting` until the
    /// utterance-end callback fires; without callback support they are
    /// dropped right away, which the engine reads as "no completion signal".
    fn run_worker(rx: mpsc::Receiver<Request>, voice: Option<String>) {
        let mut tts = match tts::Tts::default() {
            Ok(engine) => engine,
            Err(e) => {
                tracing::warn!(error = %e, "TTS unavailable, narration will be silent");
                // dropping each request resolves its completion immediately
                while rx.recv().is_ok() {}
                return;
            }
        };

        if let Some(name) = voice {
            if let Ok(voices) = tts.voices() {
                match voices.iter().find(|v| v.name() == name) {
                    Some(v) => {
                        let _ = tts.set_voice(v);
                    }
                    None => tracing::warn!(voice = %name, "Voice not found, using default"),
                }
            }
        }

        let waiting: Arc<Mutex<VecDeque<oneshot::Sender<()>>>> = Arc::default();
        let callbacks = tts.supported_features().utterance_callbacks;
        if callbacks {
            let waiting = Arc::clone(&waiting);
            let _ = tts.on_utterance_end(Some(Box::new(move |_id: tts::UtteranceId| {
                if let Ok(mut queue) = waiting.lock() {
                    if let Some(done) = queue.pop_front() {
                        let _ = done.send(());
                    }
                }
            })));
        }

        let normal = tts.normal_rate();
        let (min, max) = (tts.min_rate(), tts.max_rate());

        while let Ok(request) = rx.recv() {
            match request {
                Request::Speak { text, rate, done } => {
                    let _ = tts.set_rate((normal * rate).clamp(min, max));
                    match tts.speak(text, false) {
                        Ok(_) if callbacks => {
                            if let Ok(mut queue) = waiting.lock() {
                                queue.push_back(done);
                            }
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!(error = %e, "TTS failed to speak"),
                    }
                }
                Request::Stop => {
                    let _ = tts.stop();
                    if let Ok(mut queue) = waiting.lock() {
                        queue.clear();
                    }
                }
            }
        }
    }
}
