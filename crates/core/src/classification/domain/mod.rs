pub mod fallback_classifier;
pub mod features;
pub mod mood;
pub mod mood_classifier;
