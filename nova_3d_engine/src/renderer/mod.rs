//! Backend abstraction layer
//!
//! Trait-based seam between the engine core and a concrete GPU backend.
//! The device is the factory; every resource is a `Send + Sync` trait
//! object shared through `Arc` and released when the last reference drops.

mod buffer;
mod command_list;
mod device;
mod pipeline;
mod shader;
mod swap_chain;
mod texture;

#[cfg(test)]
pub mod mock;

pub use buffer::{Buffer, BufferDesc, BufferUsage};
pub use command_list::{ColorLoadOp, CommandList, DepthLoadOp, Viewport};
pub use device::GraphicsDevice;
pub use pipeline::{
    BlendFactor, BlendOp, ColorBlendState, CompareOp, CullMode, DepthStencilState,
    FrontFace, IndexType, Pipeline, PipelineDesc, PrimitiveTopology,
    RasterizationState, VertexAttribute, VertexFormat, VertexLayout,
};
pub use shader::{Shader, ShaderDesc, ShaderStage, ShaderStageFlags};
pub use swap_chain::{SwapChain, SWAP_CHAIN_BUFFER_COUNT};
pub use texture::{ShaderView, Texture, TextureDesc, TextureFormat, TextureInfo, TextureUsage};
