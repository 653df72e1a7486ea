/// VulkanSwapChain - Vulkan implementation of the SwapChain trait
///
/// The engine renders into a stable offscreen back-buffer texture; present
/// acquires a swapchain image, blits the back buffer into it, and queues
/// the present without waiting for vertical sync. Resizing recreates the
/// vkSwapchainKHR in place (chained through `old_swapchain`) and replaces
/// the back-buffer texture, so the `SwapChain` object itself survives.

use std::sync::{Arc, Mutex};

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::renderer::{
    SwapChain, Texture, TextureDesc, TextureFormat, TextureUsage, SWAP_CHAIN_BUFFER_COUNT,
};

use crate::vulkan::submit_one_time;
use crate::vulkan_command_list::transition_image;
use crate::vulkan_texture::VulkanTexture;

pub struct VulkanSwapChain {
    device: ash::Device,
    swapchain_loader: ash::khr::swapchain::Device,
    surface_loader: ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
    swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    format: vk::Format,
    color_space: vk::ColorSpaceKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,
    back_buffer: Arc<dyn Texture>,
    graphics_queue: vk::Queue,
    command_pool: vk::CommandPool,
    acquire_fence: vk::Fence,
    allocator: Arc<Mutex<Allocator>>,
}

impl VulkanSwapChain {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn create(
        device: &ash::Device,
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: &ash::khr::surface::Instance,
        graphics_queue: vk::Queue,
        command_pool: vk::CommandPool,
        allocator: &Arc<Mutex<Allocator>>,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        let swapchain_loader = ash::khr::swapchain::Device::new(instance, device);

        let (surface_format, present_mode) = unsafe {
            let formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to get surface formats: {:?}", e))
                })?;
            let surface_format = formats
                .iter()
                .find(|f| f.format == vk::Format::B8G8R8A8_UNORM)
                .copied()
                .unwrap_or(formats[0]);

            // Sync interval 0: immediate presentation when the driver offers
            // it, FIFO as the always-available fallback
            let present_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to get present modes: {:?}", e))
                })?;
            let present_mode = if present_modes.contains(&vk::PresentModeKHR::IMMEDIATE) {
                vk::PresentModeKHR::IMMEDIATE
            } else {
                vk::PresentModeKHR::FIFO
            };
            (surface_format, present_mode)
        };

        let acquire_fence = unsafe {
            device
                .create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| Error::BackendError(format!("Failed to create fence: {:?}", e)))?
        };

        let mut swap_chain = Self {
            device: device.clone(),
            swapchain_loader,
            surface_loader: surface_loader.clone(),
            surface,
            physical_device,
            swapchain: vk::SwapchainKHR::null(),
            images: Vec::new(),
            format: surface_format.format,
            color_space: surface_format.color_space,
            present_mode,
            extent: vk::Extent2D::default(),
            back_buffer: Arc::new(Self::create_back_buffer(device, allocator, 1, 1)?),
            graphics_queue,
            command_pool,
            acquire_fence,
            allocator: allocator.clone(),
        };
        swap_chain.rebuild(width, height)?;
        Ok(swap_chain)
    }

    /// Offscreen texture the engine renders into between presents
    fn create_back_buffer(
        device: &ash::Device,
        allocator: &Arc<Mutex<Allocator>>,
        width: u32,
        height: u32,
    ) -> Result<VulkanTexture> {
        VulkanTexture::create(
            device,
            allocator,
            &TextureDesc {
                width,
                height,
                format: TextureFormat::B8G8R8A8_UNORM,
                usage: TextureUsage::RenderTarget,
                data: None,
            },
            vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_SRC,
        )
    }

    /// (Re)create the vkSwapchainKHR and the back-buffer texture
    fn rebuild(&mut self, width: u32, height: u32) -> Result<()> {
        unsafe {
            let capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to get surface capabilities: {:?}", e))
                })?;

            let extent = if capabilities.current_extent.width != u32::MAX {
                capabilities.current_extent
            } else {
                vk::Extent2D {
                    width: width.clamp(
                        capabilities.min_image_extent.width,
                        capabilities.max_image_extent.width,
                    ),
                    height: height.clamp(
                        capabilities.min_image_extent.height,
                        capabilities.max_image_extent.height,
                    ),
                }
            };

            let mut image_count = SWAP_CHAIN_BUFFER_COUNT.max(capabilities.min_image_count);
            if capabilities.max_image_count > 0 {
                image_count = image_count.min(capabilities.max_image_count);
            }

            let old_swapchain = self.swapchain;
            let create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(image_count)
                .image_format(self.format)
                .image_color_space(self.color_space)
                .image_extent(extent)
                .image_array_layers(1)
                .image_usage(
                    vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_DST,
                )
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(capabilities.current_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(self.present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain = self
                .swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to create swapchain: {:?}", e))
                })?;
            if old_swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(old_swapchain, None);
            }

            self.swapchain = swapchain;
            self.extent = extent;
            self.images = self
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to get swapchain images: {:?}", e))
                })?;
            self.back_buffer = Arc::new(Self::create_back_buffer(
                &self.device,
                &self.allocator,
                extent.width,
                extent.height,
            )?);
        }
        Ok(())
    }

    fn back_buffer_texture(&self) -> &VulkanTexture {
        // The back buffer is always the texture created by rebuild()
        unsafe {
            &*(self.back_buffer.as_ref() as *const dyn Texture as *const VulkanTexture)
        }
    }
}

impl SwapChain for VulkanSwapChain {
    fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        unsafe {
            self.device.device_wait_idle().map_err(|e| {
                Error::BackendError(format!("Failed to wait idle before resize: {:?}", e))
            })?;
        }
        self.rebuild(width, height)
    }

    fn back_buffer(&self) -> Result<Arc<dyn Texture>> {
        Ok(self.back_buffer.clone())
    }

    fn present(&mut self) -> Result<()> {
        unsafe {
            let image_index = match self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                vk::Semaphore::null(),
                self.acquire_fence,
            ) {
                Ok((index, _suboptimal)) => index,
                // The surface changed under us; the next resize rebuilds
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => return Ok(()),
                Err(e) => {
                    return Err(Error::BackendError(format!(
                        "Failed to acquire swapchain image: {:?}",
                        e
                    )));
                }
            };

            self.device
                .wait_for_fences(&[self.acquire_fence], true, u64::MAX)
                .map_err(|e| Error::BackendError(format!("Failed to wait for fence: {:?}", e)))?;
            self.device
                .reset_fences(&[self.acquire_fence])
                .map_err(|e| Error::BackendError(format!("Failed to reset fence: {:?}", e)))?;

            let swapchain_image = self.images[image_index as usize];
            let back_buffer = self.back_buffer_texture();
            let extent = self.extent;

            submit_one_time(
                &self.device,
                self.command_pool,
                self.graphics_queue,
                |command_buffer| {
                    transition_image(
                        &self.device,
                        command_buffer,
                        back_buffer.image,
                        vk::ImageAspectFlags::COLOR,
                        back_buffer.current_layout(),
                        vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                    );
                    transition_image(
                        &self.device,
                        command_buffer,
                        swapchain_image,
                        vk::ImageAspectFlags::COLOR,
                        vk::ImageLayout::UNDEFINED,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    );

                    let subresource = vk::ImageSubresourceLayers {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        mip_level: 0,
                        base_array_layer: 0,
                        layer_count: 1,
                    };
                    let region = vk::ImageBlit::default()
                        .src_subresource(subresource)
                        .src_offsets([
                            vk::Offset3D { x: 0, y: 0, z: 0 },
                            vk::Offset3D {
                                x: extent.width as i32,
                                y: extent.height as i32,
                                z: 1,
                            },
                        ])
                        .dst_subresource(subresource)
                        .dst_offsets([
                            vk::Offset3D { x: 0, y: 0, z: 0 },
                            vk::Offset3D {
                                x: extent.width as i32,
                                y: extent.height as i32,
                                z: 1,
                            },
                        ]);
                    self.device.cmd_blit_image(
                        command_buffer,
                        back_buffer.image,
                        vk::ImageLayout::TRANSFER_SRC_OPTIMAL,
                        swapchain_image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[region],
                        vk::Filter::NEAREST,
                    );

                    transition_image(
                        &self.device,
                        command_buffer,
                        swapchain_image,
                        vk::ImageAspectFlags::COLOR,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        vk::ImageLayout::PRESENT_SRC_KHR,
                    );
                },
            )?;
            back_buffer.set_layout(vk::ImageLayout::TRANSFER_SRC_OPTIMAL);

            // The blit completed on the CPU timeline, so no wait semaphore
            let swapchains = [self.swapchain];
            let image_indices = [image_index];
            let present_info = vk::PresentInfoKHR::default()
                .swapchains(&swapchains)
                .image_indices(&image_indices);
            match self
                .swapchain_loader
                .queue_present(self.graphics_queue, &present_info)
            {
                Ok(_) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(()),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(()),
                Err(e) => Err(Error::BackendError(format!("Failed to present: {:?}", e))),
            }
        }
    }

    fn width(&self) -> u32 {
        self.extent.width
    }

    fn height(&self) -> u32 {
        self.extent.height
    }

    fn buffer_count(&self) -> u32 {
        self.images.len() as u32
    }
}

impl Drop for VulkanSwapChain {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();
            self.device.destroy_fence(self.acquire_fence, None);
            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}
