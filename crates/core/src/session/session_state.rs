use crate::classification::domain::mood::{Mood, MoodReading};

/// Lifecycle phase of a detection session.
///
/// `Idle → Starting` on a successful source open, `Starting → Detecting`
/// once the stabilization delay has elapsed, and back to `Idle` on stop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Starting,
    Detecting,
}

/// Mutable per-session detection state, updated once per tick.
#[derive(Clone, Debug)]
pub struct SessionState {
    phase: SessionPhase,
    current: Option<MoodReading>,
    previous_mood: Option<Mood>,
    change_count: u64,
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            phase: SessionPhase::Idle,
            current: None,
            previous_mood: None,
            change_count: 0,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: SessionPhase) {
        self.phase = phase;
    }

    pub fn current(&self) -> Option<MoodReading> {
        self.current
    }

    pub fn change_count(&self) -> u64 {
        self.change_count
    }

    /// Record a new per-tick reading. Returns `true` when the mood differs
    /// from the previous tick (the first reading always counts as a change).
    pub fn record(&mut self, reading: MoodReading) -> bool {
        let changed = self.previous_mood != Some(reading.mood);
        self.previous_mood = Some(reading.mood);
        self.current = Some(reading);
        if changed {
            self.change_count += 1;
        }
        changed
    }

    /// Return to idle, clearing all per-session readings.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_idle_and_empty() {
        let state = SessionState::new();
        assert_eq!(state.phase(), SessionPhase::Idle);
        assert!(state.current().is_none());
        assert_eq!(state.change_count(), 0);
    }

    #[test]
    fn test_first_reading_counts_as_change() {
        let mut state = SessionState::new();
        assert!(state.record(MoodReading::new(Mood::Happy, 0.8)));
        assert_eq!(state.change_count(), 1);
    }

    #[test]
    fn test_repeated_mood_is_not_a_change() {
        let mut state = SessionState::new();
        state.record(MoodReading::new(Mood::Happy, 0.8));
        assert!(!state.record(MoodReading::new(Mood::Happy, 0.9)));
        assert_eq!(state.change_count(), 1);
    }

    #[test]
    fn test_mood_switch_bumps_counter() {
        let mut state = SessionState::new();
        state.record(MoodReading::new(Mood::Happy, 0.8));
        assert!(state.record(MoodReading::new(Mood::Sad, 0.7)));
        assert!(state.record(MoodReading::new(Mood::Happy, 0.8)));
        assert_eq!(state.change_count(), 3);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = SessionState::new();
        state.set_phase(SessionPhase::Detecting);
        state.record(MoodReading::new(Mood::Focused, 0.75));
        state.reset();
        assert_eq!(state.phase(), SessionPhase::Idle);
        assert!(state.current().is_none());
        assert_eq!(state.change_count(), 0);
    }
}
