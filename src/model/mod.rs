pub mod artifact;
pub mod linear;
pub mod loader;
pub mod onnx;
pub mod registry;
