/// VulkanDevice - Vulkan implementation of the GraphicsDevice trait
///
/// The device captures the window surface at construction, so swap chain
/// creation later needs only dimensions. Vulkan 1.3 dynamic rendering is
/// required; no render pass objects exist in this backend.

use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex, OnceLock};

use ash::vk;
use gpu_allocator::vulkan::{
    Allocation, AllocationCreateDesc, AllocationScheme, Allocator, AllocatorCreateDesc,
};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;

use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::renderer::{
    BlendFactor, BlendOp, Buffer, BufferDesc, CommandList, CompareOp, CullMode, FrontFace,
    GraphicsDevice, Pipeline, PipelineDesc, PrimitiveTopology, Shader, ShaderDesc,
    ShaderStageFlags, ShaderView, SwapChain, Texture, TextureDesc, TextureFormat, TextureUsage,
    VertexFormat,
};

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_command_list::{transition_image, VulkanCommandList};
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_shader::VulkanShader;
use crate::vulkan_swapchain::VulkanSwapChain;
use crate::vulkan_texture::{VulkanShaderView, VulkanTexture};

// ============================================================================
// Enum conversions
// ============================================================================

pub(crate) fn format_to_vk(format: TextureFormat) -> vk::Format {
    match format {
        TextureFormat::R8G8B8A8_UNORM => vk::Format::R8G8B8A8_UNORM,
        TextureFormat::R8G8B8A8_SRGB => vk::Format::R8G8B8A8_SRGB,
        TextureFormat::B8G8R8A8_UNORM => vk::Format::B8G8R8A8_UNORM,
        TextureFormat::D32_FLOAT => vk::Format::D32_SFLOAT,
    }
}

pub(crate) fn image_aspect(format: TextureFormat) -> vk::ImageAspectFlags {
    if format.is_depth() {
        vk::ImageAspectFlags::DEPTH
    } else {
        vk::ImageAspectFlags::COLOR
    }
}

pub(crate) fn vertex_format_to_vk(format: VertexFormat) -> vk::Format {
    match format {
        VertexFormat::Float32 => vk::Format::R32_SFLOAT,
        VertexFormat::Float32x2 => vk::Format::R32G32_SFLOAT,
        VertexFormat::Float32x3 => vk::Format::R32G32B32_SFLOAT,
        VertexFormat::Float32x4 => vk::Format::R32G32B32A32_SFLOAT,
    }
}

pub(crate) fn topology_to_vk(topology: PrimitiveTopology) -> vk::PrimitiveTopology {
    match topology {
        PrimitiveTopology::TriangleList => vk::PrimitiveTopology::TRIANGLE_LIST,
        PrimitiveTopology::TriangleStrip => vk::PrimitiveTopology::TRIANGLE_STRIP,
    }
}

pub(crate) fn cull_mode_to_vk(cull_mode: CullMode) -> vk::CullModeFlags {
    match cull_mode {
        CullMode::None => vk::CullModeFlags::NONE,
        CullMode::Front => vk::CullModeFlags::FRONT,
        CullMode::Back => vk::CullModeFlags::BACK,
    }
}

pub(crate) fn front_face_to_vk(front_face: FrontFace) -> vk::FrontFace {
    match front_face {
        FrontFace::CounterClockwise => vk::FrontFace::COUNTER_CLOCKWISE,
        FrontFace::Clockwise => vk::FrontFace::CLOCKWISE,
    }
}

pub(crate) fn compare_op_to_vk(compare_op: CompareOp) -> vk::CompareOp {
    match compare_op {
        CompareOp::Never => vk::CompareOp::NEVER,
        CompareOp::Less => vk::CompareOp::LESS,
        CompareOp::LessOrEqual => vk::CompareOp::LESS_OR_EQUAL,
        CompareOp::Greater => vk::CompareOp::GREATER,
        CompareOp::GreaterOrEqual => vk::CompareOp::GREATER_OR_EQUAL,
        CompareOp::Always => vk::CompareOp::ALWAYS,
    }
}

pub(crate) fn blend_factor_to_vk(factor: BlendFactor) -> vk::BlendFactor {
    match factor {
        BlendFactor::Zero => vk::BlendFactor::ZERO,
        BlendFactor::One => vk::BlendFactor::ONE,
        BlendFactor::SrcColor => vk::BlendFactor::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => vk::BlendFactor::ONE_MINUS_SRC_COLOR,
        BlendFactor::SrcAlpha => vk::BlendFactor::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => vk::BlendFactor::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstColor => vk::BlendFactor::DST_COLOR,
        BlendFactor::DstAlpha => vk::BlendFactor::DST_ALPHA,
    }
}

pub(crate) fn blend_op_to_vk(op: BlendOp) -> vk::BlendOp {
    match op {
        BlendOp::Add => vk::BlendOp::ADD,
        BlendOp::Subtract => vk::BlendOp::SUBTRACT,
        BlendOp::ReverseSubtract => vk::BlendOp::REVERSE_SUBTRACT,
    }
}

pub(crate) fn shader_stage_flags_to_vk(flags: ShaderStageFlags) -> vk::ShaderStageFlags {
    let mut vk_flags = vk::ShaderStageFlags::empty();
    if flags.contains(ShaderStageFlags::VERTEX) {
        vk_flags |= vk::ShaderStageFlags::VERTEX;
    }
    if flags.contains(ShaderStageFlags::FRAGMENT) {
        vk_flags |= vk::ShaderStageFlags::FRAGMENT;
    }
    vk_flags
}

/// Map an abstract texture usage to image usage flags
///
/// Render-target color images additionally allow transfer-src so the swap
/// chain blit path works; sampled images allow transfer-dst for the initial
/// data upload.
fn usage_to_vk(usage: TextureUsage, format: TextureFormat) -> vk::ImageUsageFlags {
    match usage {
        TextureUsage::Sampled => {
            vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::TRANSFER_DST
        }
        TextureUsage::RenderTarget => {
            vk::ImageUsageFlags::COLOR_ATTACHMENT | vk::ImageUsageFlags::TRANSFER_SRC
        }
        TextureUsage::SampledAndRenderTarget => {
            vk::ImageUsageFlags::SAMPLED | vk::ImageUsageFlags::COLOR_ATTACHMENT
        }
        TextureUsage::DepthStencil => {
            debug_assert!(format.is_depth());
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT
        }
    }
}

// ============================================================================
// One-time submission helper
// ============================================================================

/// Record and execute a short command buffer, waiting for completion
pub(crate) fn submit_one_time(
    device: &ash::Device,
    command_pool: vk::CommandPool,
    queue: vk::Queue,
    record: impl FnOnce(vk::CommandBuffer),
) -> Result<()> {
    unsafe {
        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffer = device
            .allocate_command_buffers(&allocate_info)
            .map_err(|e| {
                Error::BackendError(format!("Failed to allocate command buffer: {:?}", e))
            })?[0];

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        device
            .begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| Error::BackendError(format!("Failed to begin command buffer: {:?}", e)))?;

        record(command_buffer);

        device
            .end_command_buffer(command_buffer)
            .map_err(|e| Error::BackendError(format!("Failed to end command buffer: {:?}", e)))?;

        let fence = device
            .create_fence(&vk::FenceCreateInfo::default(), None)
            .map_err(|e| Error::BackendError(format!("Failed to create fence: {:?}", e)))?;

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        let result = device
            .queue_submit(queue, &[submit_info], fence)
            .map_err(|e| Error::BackendError(format!("Failed to submit: {:?}", e)))
            .and_then(|_| {
                device
                    .wait_for_fences(&[fence], true, u64::MAX)
                    .map_err(|e| Error::BackendError(format!("Failed to wait for fence: {:?}", e)))
            });

        device.destroy_fence(fence, None);
        device.free_command_buffers(command_pool, &command_buffers);
        result
    }
}

// ============================================================================
// Device
// ============================================================================

/// Process-wide Vulkan entry point, loaded once
fn vulkan_entry() -> Result<ash::Entry> {
    static ENTRY: OnceLock<ash::Entry> = OnceLock::new();
    if let Some(entry) = ENTRY.get() {
        return Ok(entry.clone());
    }
    let entry = unsafe { ash::Entry::load() }.map_err(|e| {
        Error::InitializationFailed(format!("Failed to load Vulkan: {}", e))
    })?;
    Ok(ENTRY.get_or_init(|| entry).clone())
}

pub struct VulkanDevice {
    _entry: ash::Entry,
    instance: ash::Instance,
    physical_device: vk::PhysicalDevice,
    device: ash::Device,
    graphics_queue: vk::Queue,
    graphics_queue_family: u32,
    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,
    // ManuallyDrop to free GPU memory before the device is destroyed
    allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,
    command_pool: vk::CommandPool,
    submit_fence: vk::Fence,
    sampler: vk::Sampler,
    max_push_constants_size: u32,
}

impl VulkanDevice {
    /// Create a Vulkan device rendering to `window`
    ///
    /// The surface is captured here; `create_swap_chain` targets it.
    pub fn new(window: &Window) -> Result<Self> {
        unsafe {
            let entry = vulkan_entry()?;

            let app_name = CString::new("nova3d").map_err(|e| {
                Error::InitializationFailed(format!("Invalid app name: {}", e))
            })?;
            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 0, 1, 0))
                .engine_name(c"Nova3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_3);

            let display_handle = window.display_handle().map_err(|e| {
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            let extension_names =
                ash_window::enumerate_required_extensions(display_handle.as_raw())
                    .map_err(|e| {
                        Error::InitializationFailed(format!(
                            "Failed to get required extensions: {:?}",
                            e
                        ))
                    })?
                    .to_vec();

            let layer_names = if cfg!(feature = "vulkan-validation") {
                vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
            } else {
                vec![]
            };

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);
            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            let window_handle = window.window_handle().map_err(|e| {
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;
            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            // Pick the first GPU with a queue family doing both graphics and
            // present on this surface
            let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
                Error::InitializationFailed(format!(
                    "Failed to enumerate physical devices: {:?}",
                    e
                ))
            })?;
            let mut selected = None;
            for physical_device in physical_devices {
                let queue_families =
                    instance.get_physical_device_queue_family_properties(physical_device);
                let family = queue_families.iter().enumerate().find(|(index, family)| {
                    family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
                        && surface_loader
                            .get_physical_device_surface_support(
                                physical_device,
                                *index as u32,
                                surface,
                            )
                            .unwrap_or(false)
                });
                if let Some((index, _)) = family {
                    selected = Some((physical_device, index as u32));
                    break;
                }
            }
            let (physical_device, graphics_queue_family) = selected.ok_or_else(|| {
                Error::InitializationFailed("No suitable Vulkan GPU found".to_string())
            })?;
            let limits = instance
                .get_physical_device_properties(physical_device)
                .limits;

            let queue_priorities = [1.0];
            let queue_create_infos = [vk::DeviceQueueCreateInfo::default()
                .queue_family_index(graphics_queue_family)
                .queue_priorities(&queue_priorities)];
            let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
            let mut vulkan13_features =
                vk::PhysicalDeviceVulkan13Features::default().dynamic_rendering(true);
            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .push_next(&mut vulkan13_features);
            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(graphics_queue_family, 0);

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;

            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
            let command_pool = device
                .create_command_pool(&command_pool_create_info, None)
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to create command pool: {:?}", e))
                })?;

            let submit_fence = device
                .create_fence(&vk::FenceCreateInfo::default(), None)
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to create fence: {:?}", e))
                })?;

            // One linear sampler shared by every shader view slot
            let sampler_create_info = vk::SamplerCreateInfo::default()
                .mag_filter(vk::Filter::LINEAR)
                .min_filter(vk::Filter::LINEAR)
                .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
                .address_mode_u(vk::SamplerAddressMode::REPEAT)
                .address_mode_v(vk::SamplerAddressMode::REPEAT)
                .address_mode_w(vk::SamplerAddressMode::REPEAT);
            let sampler = device
                .create_sampler(&sampler_create_info, None)
                .map_err(|e| {
                    Error::InitializationFailed(format!("Failed to create sampler: {:?}", e))
                })?;

            Ok(Self {
                _entry: entry,
                instance,
                physical_device,
                device,
                graphics_queue,
                graphics_queue_family,
                surface,
                surface_loader,
                allocator: ManuallyDrop::new(Arc::new(Mutex::new(allocator))),
                command_pool,
                submit_fence,
                sampler,
                max_push_constants_size: limits.max_push_constants_size,
            })
        }
    }

    /// Copy initial pixel data into a freshly created texture through a
    /// staging buffer, leaving it in shader-read layout
    fn upload_texture(&self, texture: &VulkanTexture, data: &[u8]) -> Result<()> {
        unsafe {
            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(data.len() as u64)
                .usage(vk::BufferUsageFlags::TRANSFER_SRC)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);
            let staging = self
                .device
                .create_buffer(&buffer_create_info, None)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to create staging buffer: {:?}", e))
                })?;

            let requirements = self.device.get_buffer_memory_requirements(staging);
            let mut allocation: Allocation = self
                .allocator
                .lock()
                .unwrap()
                .allocate(&AllocationCreateDesc {
                    name: "staging",
                    requirements,
                    location: gpu_allocator::MemoryLocation::CpuToGpu,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| Error::OutOfMemory)?;
            self.device
                .bind_buffer_memory(staging, allocation.memory(), allocation.offset())
                .map_err(|e| {
                    Error::BackendError(format!("Failed to bind staging memory: {:?}", e))
                })?;
            match allocation.mapped_slice_mut() {
                Some(mapped) => mapped[..data.len()].copy_from_slice(data),
                None => {
                    return Err(Error::BackendError(
                        "Staging allocation is not host-visible".to_string(),
                    ));
                }
            }

            let info = &texture.info;
            let result = submit_one_time(
                &self.device,
                self.command_pool,
                self.graphics_queue,
                |command_buffer| {
                    transition_image(
                        &self.device,
                        command_buffer,
                        texture.image,
                        vk::ImageAspectFlags::COLOR,
                        vk::ImageLayout::UNDEFINED,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    );
                    let region = vk::BufferImageCopy::default()
                        .image_subresource(vk::ImageSubresourceLayers {
                            aspect_mask: vk::ImageAspectFlags::COLOR,
                            mip_level: 0,
                            base_array_layer: 0,
                            layer_count: 1,
                        })
                        .image_extent(vk::Extent3D {
                            width: info.width,
                            height: info.height,
                            depth: 1,
                        });
                    self.device.cmd_copy_buffer_to_image(
                        command_buffer,
                        staging,
                        texture.image,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        &[region],
                    );
                    transition_image(
                        &self.device,
                        command_buffer,
                        texture.image,
                        vk::ImageAspectFlags::COLOR,
                        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                    );
                },
            );

            self.device.destroy_buffer(staging, None);
            self.allocator.lock().unwrap().free(allocation).ok();
            result?;
            texture.set_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
            Ok(())
        }
    }
}

impl GraphicsDevice for VulkanDevice {
    fn create_texture(&self, desc: &TextureDesc) -> Result<Arc<dyn Texture>> {
        let usage = usage_to_vk(desc.usage, desc.format);
        let texture = VulkanTexture::create(&self.device, &self.allocator, desc, usage)?;

        if let Some(data) = &desc.data {
            let expected = (desc.width as usize) * (desc.height as usize) * 4;
            if desc.format.is_depth() || data.len() != expected {
                return Err(Error::InvalidResource(format!(
                    "create_texture: {} bytes of initial data for a {}x{} {:?} texture",
                    data.len(),
                    desc.width,
                    desc.height,
                    desc.format
                )));
            }
            self.upload_texture(&texture, data)?;
        }

        Ok(Arc::new(texture))
    }

    fn create_shader_view(&self, texture: &Arc<dyn Texture>) -> Result<Arc<dyn ShaderView>> {
        let info = texture.info();
        if !info.usage.is_sampled() {
            return Err(Error::InvalidResource(format!(
                "create_shader_view: texture usage {:?} is not shader-readable",
                info.usage
            )));
        }
        // Only Vulkan textures ever reach a Vulkan device
        let vulkan_texture =
            unsafe { &*(texture.as_ref() as *const dyn Texture as *const VulkanTexture) };
        Ok(Arc::new(VulkanShaderView {
            texture: texture.clone(),
            view: vulkan_texture.view,
        }))
    }

    fn create_buffer(&self, desc: &BufferDesc, data: &[u8]) -> Result<Arc<dyn Buffer>> {
        if data.len() as u64 != desc.size {
            return Err(Error::InvalidResource(format!(
                "create_buffer: {} bytes of data for a {} byte buffer",
                data.len(),
                desc.size
            )));
        }
        Ok(Arc::new(VulkanBuffer::create(
            &self.device,
            &self.allocator,
            desc,
            data,
        )?))
    }

    fn create_shader(&self, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        Ok(Arc::new(VulkanShader::create(&self.device, desc)?))
    }

    fn create_pipeline(&self, desc: &PipelineDesc) -> Result<Arc<dyn Pipeline>> {
        crate::vulkan_pipeline::check_constant_block_limit(
            desc.constant_block_size,
            self.max_push_constants_size,
        )?;
        Ok(Arc::new(VulkanPipeline::create(&self.device, desc)?))
    }

    fn create_swap_chain(&self, width: u32, height: u32) -> Result<Box<dyn SwapChain>> {
        Ok(Box::new(VulkanSwapChain::create(
            &self.device,
            &self.instance,
            self.physical_device,
            self.surface,
            &self.surface_loader,
            self.graphics_queue,
            self.command_pool,
            &self.allocator,
            width,
            height,
        )?))
    }

    fn create_command_list(&self) -> Result<Box<dyn CommandList>> {
        unsafe {
            let allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);
            let command_buffer = self
                .device
                .allocate_command_buffers(&allocate_info)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to allocate command buffer: {:?}", e))
                })?[0];

            // Descriptor sets are allocated per bind and reclaimed when the
            // pool goes away with the command list
            let pool_sizes = [vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: 256,
            }];
            let pool_create_info = vk::DescriptorPoolCreateInfo::default()
                .max_sets(128)
                .pool_sizes(&pool_sizes);
            let descriptor_pool = self
                .device
                .create_descriptor_pool(&pool_create_info, None)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to create descriptor pool: {:?}", e))
                })?;

            Ok(Box::new(VulkanCommandList::new(
                self.device.clone(),
                self.command_pool,
                command_buffer,
                descriptor_pool,
                self.sampler,
            )))
        }
    }

    fn submit(&self, cmd_list: &mut dyn CommandList) -> Result<()> {
        // Only Vulkan command lists ever reach a Vulkan device
        let vulkan_cmd = unsafe {
            &*(cmd_list as *const dyn CommandList as *const VulkanCommandList)
        };
        unsafe {
            let command_buffers = [vulkan_cmd.command_buffer];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
            self.device
                .queue_submit(self.graphics_queue, &[submit_info], self.submit_fence)
                .map_err(|e| Error::BackendError(format!("Failed to submit: {:?}", e)))?;
            self.device
                .wait_for_fences(&[self.submit_fence], true, u64::MAX)
                .map_err(|e| Error::BackendError(format!("Failed to wait for fence: {:?}", e)))?;
            self.device
                .reset_fences(&[self.submit_fence])
                .map_err(|e| Error::BackendError(format!("Failed to reset fence: {:?}", e)))
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| Error::BackendError(format!("Failed to wait idle: {:?}", e)))
        }
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            self.device.destroy_sampler(self.sampler, None);
            self.device.destroy_fence(self.submit_fence, None);
            self.device.destroy_command_pool(self.command_pool, None);

            // Free GPU memory while the device is still valid
            ManuallyDrop::drop(&mut self.allocator);

            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);
            self.instance.destroy_instance(None);
        }
    }
}

impl VulkanDevice {
    /// Queue family used for graphics and present
    pub fn graphics_queue_family(&self) -> u32 {
        self.graphics_queue_family
    }
}

#[cfg(test)]
#[path = "vulkan_format_tests.rs"]
mod tests;
