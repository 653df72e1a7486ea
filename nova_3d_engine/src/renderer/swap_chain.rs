/// SwapChain trait - the presentable surface bound to one window

use std::sync::Arc;
use crate::error::Result;
use crate::renderer::Texture;

/// Number of images every swap chain is created with (double buffering)
pub const SWAP_CHAIN_BUFFER_COUNT: u32 = 2;

/// Swap chain bound to exactly one window surface
///
/// Implemented by backend-specific types (e.g., VulkanSwapChain). A window
/// resize must go through `resize()`, which resizes the buffers in place:
/// the trait object's identity and the underlying OS surface are preserved,
/// only the presentable images are rebuilt.
pub trait SwapChain: Send + Sync {
    /// Resize the presentable buffers in place
    ///
    /// # Arguments
    ///
    /// * `width` - New width in pixels (> 0)
    /// * `height` - New height in pixels (> 0)
    fn resize(&mut self, width: u32, height: u32) -> Result<()>;

    /// Get the back buffer as a texture, so a frame buffer can wrap it as
    /// its color target. The returned texture is owned by the swap chain;
    /// it changes identity after `resize()`.
    fn back_buffer(&self) -> Result<Arc<dyn Texture>>;

    /// Present the back buffer with no vsync wait (sync interval 0)
    fn present(&mut self) -> Result<()>;

    /// Current width in pixels
    fn width(&self) -> u32;

    /// Current height in pixels
    fn height(&self) -> u32;

    /// Number of presentable buffers (always `SWAP_CHAIN_BUFFER_COUNT`)
    fn buffer_count(&self) -> u32;
}
