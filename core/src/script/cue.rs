/// One parsed script line.
///
/// Cues are immutable once built; a re-parse replaces the whole sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct Cue {
    trigger_time: f64,
    pause_duration: f64,
    speech_rate: f32,
    text: String,
}

impl Cue {
    /// Build a cue, coercing out-of-range values to the parser defaults
    /// (negative or non-finite times become 0, non-positive rates become 1).
    pub fn new(trigger_time: f64, pause_duration: f64, speech_rate: f32, text: impl Into<String>) -> Self {
        Self {
            trigger_time: non_negative(trigger_time),
            pause_duration: non_negative(pause_duration),
            speech_rate: if speech_rate.is_finite() && speech_rate > 0.0 {
                speech_rate
            } else {
                1.0
            },
            text: text.into(),
        }
    }

    /// Playback position (seconds) at which the cue fires
    pub fn trigger_time(&self) -> f64 {
        self.trigger_time
    }

    /// Seconds to hold the video after speaking starts
    pub fn pause_duration(&self) -> f64 {
        self.pause_duration
    }

    pub fn speech_rate(&self) -> f32 {
        self.speech_rate
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 { value } else { 0.0 }
}
