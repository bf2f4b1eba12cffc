pub mod execution_provider;
pub mod image_sequence_source;
pub mod model_cache;
pub mod model_resolver;
pub mod onnx_face_mesh_extractor;
