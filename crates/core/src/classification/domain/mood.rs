use std::fmt;

/// Discrete mood label derived from facial geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Mood {
    Happy,
    Sad,
    Excited,
    Relaxed,
    Focused,
}

impl Mood {
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Sad,
        Mood::Excited,
        Mood::Relaxed,
        Mood::Focused,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Excited => "excited",
            Mood::Relaxed => "relaxed",
            Mood::Focused => "focused",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classification outcome. Created once per detection cycle and
/// replaced, never mutated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MoodReading {
    pub mood: Mood,
    /// In [0, 1].
    pub confidence: f64,
}

impl MoodReading {
    pub fn new(mood: Mood, confidence: f64) -> Self {
        debug_assert!((0.0..=1.0).contains(&confidence));
        Self { mood, confidence }
    }
}
