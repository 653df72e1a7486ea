//! Deferred rendering components
//!
//! The engine owns the frame sequencing; the pieces here (frame buffers,
//! the shading effect, camera, lights, renderables) are the building blocks
//! it wires together each frame.

pub mod camera;
pub mod effect;
pub mod frame_buffer;
pub mod light;
pub mod quad;
pub mod render_engine;
pub mod renderable;

pub use camera::Camera;
pub use effect::{Effect, ParamType, ParamValue, PassConstant, PassId, ShadingPass};
pub use frame_buffer::{FrameBuffer, COLOR_TARGET_FORMAT, DEPTH_TARGET_FORMAT};
pub use light::{AmbientLight, DirectionalLight};
pub use quad::Quad;
pub use render_engine::{
    RenderEngine, G_BUFFER_TARGETS, PASS_AMBIENT, PASS_GBUFFER, PASS_SRGB, PASS_SUN,
};
pub use renderable::{Material, StaticMesh, VERTEX_FLOATS, VERTEX_STRIDE};
