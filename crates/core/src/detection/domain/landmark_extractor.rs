use crate::shared::frame::Frame;
use crate::shared::landmarks::LandmarkSet;

/// Domain interface for face-mesh landmark extraction.
///
/// Returns one `LandmarkSet` per detected face; an empty vector means no
/// face was found in the frame. Implementations may be stateful (e.g.
/// holding an inference session), hence `&mut self`.
pub trait LandmarkExtractor: Send {
    fn extract(&mut self, frame: &Frame) -> Result<Vec<LandmarkSet>, Box<dyn std::error::Error>>;
}
