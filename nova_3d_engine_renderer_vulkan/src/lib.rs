/*!
# Nova 3D Engine - Vulkan Renderer Backend

Vulkan implementation of the Nova 3D rendering engine.

This crate provides a Vulkan backend that implements the nova_3d_engine
traits using the Ash library for Vulkan bindings and gpu-allocator for
memory management. It requires Vulkan 1.3 (dynamic rendering).

The device captures the window surface at construction:

```no_run
use std::sync::Arc;
use nova_3d_engine::nova3d::GraphicsDevice;
use nova_3d_engine_renderer_vulkan::VulkanDevice;

# fn demo(window: &winit::window::Window) -> nova_3d_engine::nova3d::Result<()> {
let device: Arc<dyn GraphicsDevice> = Arc::new(VulkanDevice::new(window)?);
# Ok(()) }
```
*/

// Vulkan implementation modules
mod vulkan;
mod vulkan_buffer;
mod vulkan_command_list;
mod vulkan_pipeline;
mod vulkan_shader;
mod vulkan_swapchain;
mod vulkan_texture;

pub use vulkan::VulkanDevice;
pub use vulkan_command_list::VulkanCommandList;
pub use vulkan_swapchain::VulkanSwapChain;
pub use vulkan_texture::VulkanTexture;
