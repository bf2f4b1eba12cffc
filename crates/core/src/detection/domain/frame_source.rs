use thiserror::Error;

use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum FrameSourceError {
    /// Device access was refused. Fatal to the session: the caller must
    /// not retry automatically.
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("frame source exhausted")]
    Exhausted,
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("failed to open frame source: {0}")]
    Open(String),
}

/// Pixel dimensions reported by an opened source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameFormat {
    pub width: u32,
    pub height: u32,
}

/// Supplies frames to the detection loop.
///
/// The session opens the source once during `Idle → Starting`, captures
/// one frame per tick, and closes the source on stop or teardown. A
/// capture error is per-tick and non-fatal; only `PermissionDenied` at
/// open time aborts the session.
pub trait FrameSource: Send {
    fn open(&mut self) -> Result<FrameFormat, FrameSourceError>;

    fn capture(&mut self) -> Result<Frame, FrameSourceError>;

    /// Releases the device or file handles. Must be safe to call twice.
    fn close(&mut self);
}
