/// Face-mesh landmark extractor using ONNX Runtime via `ort`.
///
/// Runs a 468-point face-mesh model on each frame and converts the raw
/// landmark tensor into normalized image coordinates.
use std::path::Path;

use crate::detection::domain::landmark_extractor::LandmarkExtractor;
use crate::detection::infrastructure::execution_provider::preferred_execution_providers;
use crate::shared::constants::FACE_MESH_LANDMARK_COUNT;
use crate::shared::frame::Frame;
use crate::shared::landmarks::{Landmark, LandmarkSet};

/// Fallback input resolution when the model shape is dynamic.
const DEFAULT_INPUT_SIZE: u32 = 192;

/// Face-presence score threshold. Below this the frame is treated as
/// containing no face.
const FACE_FLAG_THRESHOLD: f32 = 0.5;

/// Face-mesh landmark extractor backed by an ONNX Runtime session.
///
/// The model outputs a landmark tensor of 468 × (x, y, z) values in input
/// pixel space, plus an optional face-presence score.
pub struct OnnxFaceMeshExtractor {
    session: ort::session::Session,
    input_size: u32,
}

impl OnnxFaceMeshExtractor {
    /// Load a face-mesh ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting NCHW).
    /// Falls back to 192 if the shape is dynamic or unreadable.
    pub fn new(model_path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        // Try to read input size from model metadata (NCHW: [1, 3, H, W])
        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            input_size,
        })
    }
}

impl LandmarkExtractor for OnnxFaceMeshExtractor {
    fn extract(&mut self, frame: &Frame) -> Result<Vec<LandmarkSet>, Box<dyn std::error::Error>> {
        // 1. Preprocess: resize to input_size², normalize to [0,1], NCHW
        let input_tensor = preprocess(frame, self.input_size);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;

        if outputs.len() == 0 {
            return Err("face-mesh model produced no outputs".into());
        }

        // 3. Face-presence gate (second output, when present)
        if outputs.len() >= 2 {
            let flag = outputs[1].try_extract_array::<f32>()?;
            if let Some(&raw) = flag.iter().next() {
                if sigmoid(raw) < FACE_FLAG_THRESHOLD {
                    return Ok(Vec::new());
                }
            }
        }

        // 4. Decode landmark tensor: 468 × (x, y, z) in input pixel space
        let landmarks = outputs[0].try_extract_array::<f32>()?;
        let data = landmarks.as_slice().ok_or("Cannot get landmark slice")?;

        let needed = FACE_MESH_LANDMARK_COUNT * 3;
        if data.len() < needed {
            return Err(format!(
                "face-mesh output too short: {} values, expected {}",
                data.len(),
                needed
            )
            .into());
        }

        let set = decode_landmarks(&data[..needed], self.input_size);
        Ok(vec![set])
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Resize frame to `size × size` and normalize to [0,1] NCHW float32.
fn preprocess(frame: &Frame, size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray();
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let s = size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, s, s));

    for y in 0..s {
        let src_y = (((y as f64 + 0.5) * src_h as f64 / s as f64) as usize).min(src_h - 1);
        for x in 0..s {
            let src_x = (((x as f64 + 0.5) * src_w as f64 / s as f64) as usize).min(src_w - 1);
            for c in 0..3 {
                tensor[[0, c, y, x]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    tensor
}

// ---------------------------------------------------------------------------
// Landmark decoding
// ---------------------------------------------------------------------------

/// Convert raw (x, y, z) triples in input pixel space to normalized
/// coordinates in [0, 1] of the original frame.
///
/// Because preprocessing stretches the frame to a square, normalizing by the
/// input size maps each point straight back to the frame's unit square.
fn decode_landmarks(data: &[f32], input_size: u32) -> LandmarkSet {
    let inv = 1.0 / input_size as f64;
    let points = data
        .chunks_exact(3)
        .map(|p| Landmark::with_depth(p[0] as f64 * inv, p[1] as f64 * inv, p[2] as f64 * inv))
        .collect();
    LandmarkSet::new(points)
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}
