pub const FACE_MESH_MODEL_NAME: &str = "face_mesh_468.onnx";
pub const FACE_MESH_MODEL_URL: &str =
    "https://github.com/moodsense/moodsense/releases/download/v0.1.0/face_mesh_468.onnx";

/// Full face-mesh landmark count for one detected face.
pub const FACE_MESH_LANDMARK_COUNT: usize = 468;

/// Heuristic minimum landmark count for a usable mesh.
pub const MIN_LANDMARK_COUNT: usize = 200;

/// Minimum inter-eye distance in normalized image space. Anything smaller
/// is a degenerate or far-too-small face and is rejected outright.
pub const MIN_EYE_DISTANCE: f64 = 0.01;

/// Epsilon added to mouth height before dividing, so a fully closed mouth
/// does not blow up the smile ratio.
pub const SMILE_RATIO_EPSILON: f64 = 0.001;

/// Default milliseconds between classification ticks.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 2000;

/// Default milliseconds to wait after the camera goes live before the
/// first classification, letting exposure and focus settle.
pub const DEFAULT_STABILIZATION_MS: u64 = 2000;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];

// ---------------------------------------------------------------------------
// Reference landmark indices (MediaPipe face-mesh numbering)
// ---------------------------------------------------------------------------

pub const LEFT_MOUTH_CORNER: usize = 61;
pub const RIGHT_MOUTH_CORNER: usize = 291;
pub const UPPER_LIP: usize = 13;
pub const LOWER_LIP: usize = 14;
pub const LEFT_EYE_OUTER: usize = 33;
pub const LEFT_EYE_INNER: usize = 133;
pub const RIGHT_EYE_INNER: usize = 362;
pub const RIGHT_EYE_OUTER: usize = 263;
pub const LEFT_EYEBROW: usize = 105;
pub const RIGHT_EYEBROW: usize = 334;
pub const NOSE_TIP: usize = 1;

/// All eleven reference indices. Every one must resolve to a finite point
/// for feature normalization to proceed.
pub const REFERENCE_INDICES: [usize; 11] = [
    LEFT_MOUTH_CORNER,
    RIGHT_MOUTH_CORNER,
    UPPER_LIP,
    LOWER_LIP,
    LEFT_EYE_OUTER,
    LEFT_EYE_INNER,
    RIGHT_EYE_INNER,
    RIGHT_EYE_OUTER,
    LEFT_EYEBROW,
    RIGHT_EYEBROW,
    NOSE_TIP,
];
