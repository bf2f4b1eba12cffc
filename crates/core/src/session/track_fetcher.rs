use crate::classification::domain::mood::Mood;

/// Fetches a playlist of tracks matching a detected mood.
///
/// Implementations run on the session's fetch worker thread and may block.
/// Returns the number of tracks fetched.
pub trait TrackFetcher: Send {
    fn fetch_tracks(&mut self, mood: Mood) -> Result<usize, Box<dyn std::error::Error>>;
}
