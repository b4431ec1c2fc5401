//! Trigger window matching
//!
//! A cue fires when the playhead sits strictly inside
//! `(trigger_time, trigger_time + window)`. Exact equality does not match,
//! and a cue can be skipped entirely if the poll interval is longer than the
//! window.
//!
//! Duplicate suppression uses the last triggered time, plus the trigger
//! times of every cue that already fired while the playhead is still inside
//! its window. The second part keeps two cues with overlapping windows from
//! re-arming each other on every tick.

use crate::script::Cue;

#[derive(Debug, Clone)]
pub struct TriggerGuard {
    window: f64,
    last_triggered_time: Option<f64>,
    /// Fired cues whose window still contains the playhead
    held: Vec<f64>,
}

impl TriggerGuard {
    pub fn new(window: f64) -> Self {
        Self {
            window,
            last_triggered_time: None,
            held: Vec::new(),
        }
    }

    pub fn window(&self) -> f64 {
        self.window
    }

    /// Trigger time of the most recent match
    pub fn last_triggered_time(&self) -> Option<f64> {
        self.last_triggered_time
    }

    pub fn in_window(&self, cue_time: f64, current_time: f64) -> bool {
        current_time > cue_time && current_time < cue_time + self.window
    }

    /// Cues (in sequence order) that fire at `current_time`.
    ///
    /// Each match is recorded before the next cue is tested, so a cue never
    /// fires twice while the playhead stays inside its window.
    pub fn collect_matches(&mut self, cues: &[Cue], current_time: f64) -> Vec<Cue> {
        let window = self.window;
        self.held
            .retain(|&time| current_time > time && current_time < time + window);

        let mut matched = Vec::new();
        for cue in cues {
            let time = cue.trigger_time();
            if self.last_triggered_time == Some(time) || self.held.contains(&time) {
                continue;
            }
            if self.in_window(time, current_time) {
                self.last_triggered_time = Some(time);
                self.held.push(time);
                matched.push(cue.clone());
            }
        }
        matched
    }

    pub fn reset(&mut self) {
        self.last_triggered_time = None;
        self.held.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;

    fn cue(time: f64) -> Cue {
        Cue::new(time, 0.0, 1.0, format!("at {time}"))
    }

    #[test]
    fn fires_once_across_ticks_inside_window() {
        let cues = vec![cue(10.0)];
        let mut guard = TriggerGuard::new(0.2);

        let fired: usize = [10.05, 10.1, 10.15]
            .into_iter()
            .map(|now| guard.collect_matches(&cues, now).len())
            .sum();

        assert_eq!(fired, 1);
        assert_eq!(guard.last_triggered_time(), Some(10.0));
    }

    #[test]
    fn window_is_open_on_both_ends() {
        let cues = vec![cue(10.0)];

        for now in [10.0, 10.2, 10.25, 9.99] {
            let mut guard = TriggerGuard::new(0.2);
            assert!(
                guard.collect_matches(&cues, now).is_empty(),
                "{now} must not trigger"
            );
        }

        for now in [10.001, 10.1, 10.199] {
            let mut guard = TriggerGuard::new(0.2);
            assert_eq!(guard.collect_matches(&cues, now).len(), 1, "{now} must trigger");
        }
    }

    #[test]
    fn fires_again_after_another_cue() {
        let cues = vec![cue(10.0), cue(20.0)];
        let mut guard = TriggerGuard::new(0.2);

        assert_eq!(guard.collect_matches(&cues, 10.1).len(), 1);
        assert_eq!(guard.collect_matches(&cues, 20.1).len(), 1);
        // seeking back re-arms the first cue
        assert_eq!(guard.collect_matches(&cues, 10.1).len(), 1);
    }

    #[test]
    fn overlapping_windows_match_in_sequence_order() {
        let cues = parse_script("10.1 0 1 second\n10 0 1 first");
        let mut guard = TriggerGuard::new(0.2);

        let matched = guard.collect_matches(&cues, 10.15);
        let texts: Vec<&str> = matched.iter().map(Cue::text).collect();

        assert_eq!(texts, vec!["second", "first"]);
        assert_eq!(guard.last_triggered_time(), Some(10.0));
    }

    #[test]
    fn overlapping_windows_do_not_rearm_each_other() {
        let cues = vec![cue(10.0), cue(10.1)];
        let mut guard = TriggerGuard::new(0.2);

        assert_eq!(guard.collect_matches(&cues, 10.15).len(), 2);
        assert!(guard.collect_matches(&cues, 10.15).is_empty());
        assert!(guard.collect_matches(&cues, 10.18).is_empty());
        assert_eq!(guard.last_triggered_time(), Some(10.1));
    }

    #[test]
    fn seeking_back_without_another_cue_does_not_refire() {
        let cues = vec![cue(10.0)];
        let mut guard = TriggerGuard::new(0.2);

        assert_eq!(guard.collect_matches(&cues, 10.1).len(), 1);
        assert!(guard.collect_matches(&cues, 12.0).is_empty());
        assert!(guard.collect_matches(&cues, 10.1).is_empty());
    }

    #[test]
    fn duplicate_trigger_times_fire_once() {
        let cues = vec![cue(10.0), cue(10.0)];
        let mut guard = TriggerGuard::new(0.2);
        assert_eq!(guard.collect_matches(&cues, 10.1).len(), 1);
    }

    #[test]
    fn reset_rearms() {
        let cues = vec![cue(10.0)];
        let mut guard = TriggerGuard::new(0.2);
        guard.collect_matches(&cues, 10.1);
        guard.reset();
        assert_eq!(guard.collect_matches(&cues, 10.1).len(), 1);
    }
}
