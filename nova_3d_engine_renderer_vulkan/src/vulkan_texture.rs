/// VulkanTexture - Vulkan implementation of the Texture trait

use std::sync::{Arc, Mutex};

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::renderer::{ShaderView, Texture, TextureDesc, TextureInfo};

use crate::vulkan::{format_to_vk, image_aspect};

/// Vulkan texture with its image view and device memory
///
/// The current image layout is tracked so the command list can emit the
/// right transition when the texture changes role (render target, sampled
/// input, blit source).
pub struct VulkanTexture {
    pub image: vk::Image,
    pub view: vk::ImageView,
    pub layout: Mutex<vk::ImageLayout>,
    pub info: TextureInfo,
    pub allocation: Option<Allocation>,
    pub device: ash::Device,
    pub allocator: Arc<Mutex<Allocator>>,
}

impl VulkanTexture {
    /// Create an image, allocate GPU memory for it, and create its view
    ///
    /// Initial data upload is handled by the device, not here.
    pub(crate) fn create(
        device: &ash::Device,
        allocator: &Arc<Mutex<Allocator>>,
        desc: &TextureDesc,
        usage: vk::ImageUsageFlags,
    ) -> Result<Self> {
        let format = format_to_vk(desc.format);
        let aspect = image_aspect(desc.format);

        unsafe {
            let image_create_info = vk::ImageCreateInfo::default()
                .image_type(vk::ImageType::TYPE_2D)
                .format(format)
                .extent(vk::Extent3D {
                    width: desc.width,
                    height: desc.height,
                    depth: 1,
                })
                .mip_levels(1)
                .array_layers(1)
                .samples(vk::SampleCountFlags::TYPE_1)
                .tiling(vk::ImageTiling::OPTIMAL)
                .usage(usage)
                .sharing_mode(vk::SharingMode::EXCLUSIVE)
                .initial_layout(vk::ImageLayout::UNDEFINED);

            let image = device
                .create_image(&image_create_info, None)
                .map_err(|e| Error::BackendError(format!("Failed to create image: {:?}", e)))?;

            let requirements = device.get_image_memory_requirements(image);
            let allocation = match allocator.lock().unwrap().allocate(&AllocationCreateDesc {
                name: "texture",
                requirements,
                location: gpu_allocator::MemoryLocation::GpuOnly,
                linear: false,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            }) {
                Ok(allocation) => allocation,
                Err(_) => {
                    device.destroy_image(image, None);
                    return Err(Error::OutOfMemory);
                }
            };

            // From here on a failure must release both the image and its
            // memory; Drop only runs for a fully constructed texture
            if let Err(e) = device.bind_image_memory(image, allocation.memory(), allocation.offset())
            {
                allocator.lock().unwrap().free(allocation).ok();
                device.destroy_image(image, None);
                return Err(Error::BackendError(format!(
                    "Failed to bind image memory: {:?}",
                    e
                )));
            }

            let view_create_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format)
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: aspect,
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });

            let view = match device.create_image_view(&view_create_info, None) {
                Ok(view) => view,
                Err(e) => {
                    allocator.lock().unwrap().free(allocation).ok();
                    device.destroy_image(image, None);
                    return Err(Error::BackendError(format!(
                        "Failed to create image view: {:?}",
                        e
                    )));
                }
            };

            Ok(Self {
                image,
                view,
                layout: Mutex::new(vk::ImageLayout::UNDEFINED),
                info: TextureInfo {
                    width: desc.width,
                    height: desc.height,
                    format: desc.format,
                    usage: desc.usage,
                },
                allocation: Some(allocation),
                device: device.clone(),
                allocator: allocator.clone(),
            })
        }
    }

    /// Current image layout
    pub(crate) fn current_layout(&self) -> vk::ImageLayout {
        *self.layout.lock().unwrap()
    }

    /// Record the layout the image was transitioned into
    pub(crate) fn set_layout(&self, layout: vk::ImageLayout) {
        *self.layout.lock().unwrap() = layout;
    }
}

impl Texture for VulkanTexture {
    fn info(&self) -> &TextureInfo {
        &self.info
    }
}

impl Drop for VulkanTexture {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_image_view(self.view, None);
            self.device.destroy_image(self.image, None);
        }
        if let Some(allocation) = self.allocation.take() {
            self.allocator.lock().unwrap().free(allocation).ok();
        }
    }
}

/// Shader-readable view over a Vulkan texture
///
/// Keeps the underlying texture alive and carries its view handle so the
/// command list can write descriptors without another downcast.
pub struct VulkanShaderView {
    pub texture: Arc<dyn Texture>,
    pub view: vk::ImageView,
}

impl VulkanShaderView {
    /// The concrete texture behind this view
    pub(crate) fn vulkan_texture(&self) -> &VulkanTexture {
        // Only Vulkan textures ever reach a Vulkan device
        unsafe { &*(self.texture.as_ref() as *const dyn Texture as *const VulkanTexture) }
    }
}

impl ShaderView for VulkanShaderView {
    fn texture_info(&self) -> &TextureInfo {
        self.texture.info()
    }
}
