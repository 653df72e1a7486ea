/// VulkanCommandList - Vulkan implementation of the CommandList trait
///
/// Target passes map to dynamic rendering. Image layout transitions are
/// recorded outside rendering scopes: targets move to attachment layouts
/// when a pass begins, and sampled-capable color targets move to
/// shader-read layout when their pass ends.

use std::sync::Arc;

use ash::vk;
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::renderer::{
    Buffer, ColorLoadOp, CommandList, DepthLoadOp, IndexType, Pipeline, ShaderView, Texture,
    Viewport,
};

use crate::vulkan_buffer::VulkanBuffer;
use crate::vulkan_pipeline::VulkanPipeline;
use crate::vulkan_texture::{VulkanShaderView, VulkanTexture};

/// Record a full image layout transition with conservative barriers
pub(crate) fn transition_image(
    device: &ash::Device,
    command_buffer: vk::CommandBuffer,
    image: vk::Image,
    aspect: vk::ImageAspectFlags,
    old_layout: vk::ImageLayout,
    new_layout: vk::ImageLayout,
) {
    if old_layout == new_layout {
        return;
    }
    let barrier = vk::ImageMemoryBarrier::default()
        .old_layout(old_layout)
        .new_layout(new_layout)
        .src_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .dst_queue_family_index(vk::QUEUE_FAMILY_IGNORED)
        .image(image)
        .src_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
        .dst_access_mask(vk::AccessFlags::MEMORY_READ | vk::AccessFlags::MEMORY_WRITE)
        .subresource_range(vk::ImageSubresourceRange {
            aspect_mask: aspect,
            base_mip_level: 0,
            level_count: 1,
            base_array_layer: 0,
            layer_count: 1,
        });
    unsafe {
        device.cmd_pipeline_barrier(
            command_buffer,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::PipelineStageFlags::ALL_COMMANDS,
            vk::DependencyFlags::empty(),
            &[],
            &[],
            &[barrier],
        );
    }
}

fn vulkan_texture(texture: &Arc<dyn Texture>) -> &VulkanTexture {
    // Only Vulkan textures ever reach a Vulkan command list
    unsafe { &*(texture.as_ref() as *const dyn Texture as *const VulkanTexture) }
}

/// State captured from the currently bound pipeline
struct BoundPipeline {
    layout: vk::PipelineLayout,
    set_layout: vk::DescriptorSetLayout,
    texture_slot_count: u32,
    constant_block_size: u32,
    constant_stages: vk::ShaderStageFlags,
}

pub struct VulkanCommandList {
    pub(crate) command_buffer: vk::CommandBuffer,
    command_pool: vk::CommandPool,
    descriptor_pool: vk::DescriptorPool,
    sampler: vk::Sampler,
    device: ash::Device,
    bound: Option<BoundPipeline>,
    /// Color targets of the open target pass
    open_targets: Vec<Arc<dyn Texture>>,
}

impl VulkanCommandList {
    pub(crate) fn new(
        device: ash::Device,
        command_pool: vk::CommandPool,
        command_buffer: vk::CommandBuffer,
        descriptor_pool: vk::DescriptorPool,
        sampler: vk::Sampler,
    ) -> Self {
        Self {
            command_buffer,
            command_pool,
            descriptor_pool,
            sampler,
            device,
            bound: None,
            open_targets: Vec::new(),
        }
    }
}

impl CommandList for VulkanCommandList {
    fn begin(&mut self) -> Result<()> {
        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe {
            self.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to begin command buffer: {:?}", e))
                })
        }
    }

    fn end(&mut self) -> Result<()> {
        unsafe {
            self.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to end command buffer: {:?}", e))
                })
        }
    }

    fn begin_target_pass(
        &mut self,
        color_targets: &[Arc<dyn Texture>],
        color_ops: &[ColorLoadOp],
        depth_target: Option<&Arc<dyn Texture>>,
        depth_op: DepthLoadOp,
    ) -> Result<()> {
        if color_targets.len() != color_ops.len() {
            return Err(Error::InvalidResource(format!(
                "begin_target_pass: {} color targets but {} load ops",
                color_targets.len(),
                color_ops.len()
            )));
        }
        if color_targets.is_empty() {
            return Err(Error::InvalidResource(
                "begin_target_pass: at least one color target required".to_string(),
            ));
        }

        let info = color_targets[0].info();
        let extent = vk::Extent2D {
            width: info.width,
            height: info.height,
        };

        let mut color_attachments = Vec::with_capacity(color_targets.len());
        for (target, op) in color_targets.iter().zip(color_ops) {
            let texture = vulkan_texture(target);
            transition_image(
                &self.device,
                self.command_buffer,
                texture.image,
                vk::ImageAspectFlags::COLOR,
                texture.current_layout(),
                vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
            );
            texture.set_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL);

            let mut attachment = vk::RenderingAttachmentInfo::default()
                .image_view(texture.view)
                .image_layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)
                .store_op(vk::AttachmentStoreOp::STORE);
            attachment = match op {
                ColorLoadOp::Clear(color) => attachment
                    .load_op(vk::AttachmentLoadOp::CLEAR)
                    .clear_value(vk::ClearValue {
                        color: vk::ClearColorValue { float32: *color },
                    }),
                ColorLoadOp::Load => attachment.load_op(vk::AttachmentLoadOp::LOAD),
            };
            color_attachments.push(attachment);
        }

        let depth_attachment = depth_target.map(|target| {
            let texture = vulkan_texture(target);
            transition_image(
                &self.device,
                self.command_buffer,
                texture.image,
                vk::ImageAspectFlags::DEPTH,
                texture.current_layout(),
                vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL,
            );
            texture.set_layout(vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL);

            let mut attachment = vk::RenderingAttachmentInfo::default()
                .image_view(texture.view)
                .image_layout(vk::ImageLayout::DEPTH_ATTACHMENT_OPTIMAL)
                .store_op(vk::AttachmentStoreOp::STORE);
            attachment = match depth_op {
                DepthLoadOp::Clear { depth, stencil } => attachment
                    .load_op(vk::AttachmentLoadOp::CLEAR)
                    .clear_value(vk::ClearValue {
                        depth_stencil: vk::ClearDepthStencilValue { depth, stencil },
                    }),
                DepthLoadOp::Load => attachment.load_op(vk::AttachmentLoadOp::LOAD),
            };
            attachment
        });

        let mut rendering_info = vk::RenderingInfo::default()
            .render_area(vk::Rect2D {
                offset: vk::Offset2D { x: 0, y: 0 },
                extent,
            })
            .layer_count(1)
            .color_attachments(&color_attachments);
        if let Some(depth_attachment) = &depth_attachment {
            rendering_info = rendering_info.depth_attachment(depth_attachment);
        }

        unsafe {
            self.device.cmd_begin_rendering(self.command_buffer, &rendering_info);
        }
        self.open_targets = color_targets.to_vec();
        Ok(())
    }

    fn end_target_pass(&mut self) -> Result<()> {
        unsafe {
            self.device.cmd_end_rendering(self.command_buffer);
        }
        // Sampled-capable targets become pass inputs from here on
        for target in self.open_targets.drain(..) {
            let texture = vulkan_texture(&target);
            if texture.info.usage.is_sampled() {
                transition_image(
                    &self.device,
                    self.command_buffer,
                    texture.image,
                    vk::ImageAspectFlags::COLOR,
                    texture.current_layout(),
                    vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                );
                texture.set_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
            }
        }
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        // Negative height flips Vulkan's y-down clip space to match the
        // engine's left-handed conventions
        let vk_viewport = vk::Viewport::default()
            .x(viewport.x)
            .y(viewport.y + viewport.height)
            .width(viewport.width)
            .height(-viewport.height)
            .min_depth(viewport.min_depth)
            .max_depth(viewport.max_depth);
        let scissor = vk::Rect2D {
            offset: vk::Offset2D {
                x: viewport.x as i32,
                y: viewport.y as i32,
            },
            extent: vk::Extent2D {
                width: viewport.width as u32,
                height: viewport.height as u32,
            },
        };
        unsafe {
            self.device.cmd_set_viewport(self.command_buffer, 0, &[vk_viewport]);
            self.device.cmd_set_scissor(self.command_buffer, 0, &[scissor]);
        }
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        // Only Vulkan pipelines ever reach a Vulkan command list
        let vulkan_pipeline = unsafe {
            &*(pipeline.as_ref() as *const dyn Pipeline as *const VulkanPipeline)
        };
        unsafe {
            self.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vulkan_pipeline.pipeline,
            );
        }
        self.bound = Some(BoundPipeline {
            layout: vulkan_pipeline.layout,
            set_layout: vulkan_pipeline.set_layout,
            texture_slot_count: vulkan_pipeline.texture_slot_count,
            constant_block_size: vulkan_pipeline.constant_block_size,
            constant_stages: vulkan_pipeline.constant_stages,
        });
        Ok(())
    }

    fn bind_shader_views(&mut self, views: &[Arc<dyn ShaderView>]) -> Result<()> {
        let Some(bound) = &self.bound else {
            return Err(Error::InvalidResource(
                "bind_shader_views: no pipeline bound".to_string(),
            ));
        };
        if views.len() as u32 != bound.texture_slot_count {
            return Err(Error::InvalidResource(format!(
                "bind_shader_views: {} views for {} pipeline slots",
                views.len(),
                bound.texture_slot_count
            )));
        }
        if views.is_empty() {
            return Ok(());
        }

        unsafe {
            let set_layouts = [bound.set_layout];
            let allocate_info = vk::DescriptorSetAllocateInfo::default()
                .descriptor_pool(self.descriptor_pool)
                .set_layouts(&set_layouts);
            let sets = self
                .device
                .allocate_descriptor_sets(&allocate_info)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to allocate descriptor set: {:?}", e))
                })?;
            let set = sets[0];

            let mut image_infos = Vec::with_capacity(views.len());
            for view in views {
                // Only Vulkan views ever reach a Vulkan command list
                let vulkan_view = &*(view.as_ref() as *const dyn ShaderView
                    as *const VulkanShaderView);
                let texture = vulkan_view.vulkan_texture();
                if texture.current_layout() != vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL {
                    return Err(Error::InvalidResource(
                        "bind_shader_views: texture is still bound as a render target"
                            .to_string(),
                    ));
                }
                image_infos.push(
                    vk::DescriptorImageInfo::default()
                        .sampler(self.sampler)
                        .image_view(vulkan_view.view)
                        .image_layout(vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL),
                );
            }

            let writes: Vec<vk::WriteDescriptorSet> = image_infos
                .iter()
                .enumerate()
                .map(|(slot, info)| {
                    vk::WriteDescriptorSet::default()
                        .dst_set(set)
                        .dst_binding(slot as u32)
                        .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                        .image_info(std::slice::from_ref(info))
                })
                .collect();
            self.device.update_descriptor_sets(&writes, &[]);

            self.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                bound.layout,
                0,
                &[set],
                &[],
            );
        }
        Ok(())
    }

    fn push_constants(&mut self, data: &[u8]) -> Result<()> {
        let Some(bound) = &self.bound else {
            return Err(Error::InvalidResource(
                "push_constants: no pipeline bound".to_string(),
            ));
        };
        if data.len() as u32 != bound.constant_block_size {
            return Err(Error::InvalidResource(format!(
                "push_constants: {} bytes for a {} byte constant block",
                data.len(),
                bound.constant_block_size
            )));
        }
        unsafe {
            self.device.cmd_push_constants(
                self.command_buffer,
                bound.layout,
                bound.constant_stages,
                0,
                data,
            );
        }
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()> {
        // Only Vulkan buffers ever reach a Vulkan command list
        let vulkan_buffer =
            unsafe { &*(buffer.as_ref() as *const dyn Buffer as *const VulkanBuffer) };
        unsafe {
            self.device.cmd_bind_vertex_buffers(
                self.command_buffer,
                0,
                &[vulkan_buffer.buffer],
                &[offset],
            );
        }
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()> {
        let vulkan_buffer =
            unsafe { &*(buffer.as_ref() as *const dyn Buffer as *const VulkanBuffer) };
        let vk_index_type = match index_type {
            IndexType::U16 => vk::IndexType::UINT16,
            IndexType::U32 => vk::IndexType::UINT32,
        };
        unsafe {
            self.device.cmd_bind_index_buffer(
                self.command_buffer,
                vulkan_buffer.buffer,
                offset,
                vk_index_type,
            );
        }
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        unsafe {
            self.device
                .cmd_draw(self.command_buffer, vertex_count, 1, first_vertex, 0);
        }
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        unsafe {
            self.device.cmd_draw_indexed(
                self.command_buffer,
                index_count,
                1,
                first_index,
                vertex_offset,
                0,
            );
        }
        Ok(())
    }
}

impl Drop for VulkanCommandList {
    fn drop(&mut self) {
        unsafe {
            self.device
                .free_command_buffers(self.command_pool, &[self.command_buffer]);
            self.device.destroy_descriptor_pool(self.descriptor_pool, None);
        }
    }
}
