/// VulkanPipeline - Vulkan implementation of the Pipeline trait
///
/// Pipelines use dynamic rendering, so the target formats from the
/// descriptor go straight into `PipelineRenderingCreateInfo` and no render
/// pass object exists anywhere in the backend.

use std::ffi::CString;

use ash::vk;
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::renderer::{Pipeline, PipelineDesc, Shader};

use crate::vulkan::{
    blend_factor_to_vk, blend_op_to_vk, compare_op_to_vk, cull_mode_to_vk, format_to_vk,
    front_face_to_vk, shader_stage_flags_to_vk, topology_to_vk, vertex_format_to_vk,
};
use crate::vulkan_shader::VulkanShader;

/// Reject constant blocks larger than the device's push constant limit
///
/// `vkCreatePipelineLayout` would fail on such a range anyway; checking up
/// front turns that into a readable error naming both sizes. The guaranteed
/// minimum limit is 128 bytes.
pub(crate) fn check_constant_block_limit(size: u32, limit: u32) -> Result<()> {
    if size > limit {
        return Err(Error::BackendError(format!(
            "Pass constant block of {} bytes exceeds the device push constant limit of {} bytes",
            size, limit
        )));
    }
    Ok(())
}

pub struct VulkanPipeline {
    pub pipeline: vk::Pipeline,
    pub layout: vk::PipelineLayout,
    pub set_layout: vk::DescriptorSetLayout,
    pub texture_slot_count: u32,
    pub constant_block_size: u32,
    pub constant_stages: vk::ShaderStageFlags,
    pub device: ash::Device,
}

impl VulkanPipeline {
    pub(crate) fn create(device: &ash::Device, desc: &PipelineDesc) -> Result<Self> {
        unsafe {
            // Only Vulkan shaders ever reach a Vulkan device
            let vertex_shader = &*(desc.vertex_shader.as_ref() as *const dyn Shader
                as *const VulkanShader);
            let fragment_shader = &*(desc.fragment_shader.as_ref() as *const dyn Shader
                as *const VulkanShader);

            let entry_point_vert = CString::new(vertex_shader.entry_point.as_str())
                .map_err(|e| Error::InvalidResource(format!("Invalid entry point: {}", e)))?;
            let entry_point_frag = CString::new(fragment_shader.entry_point.as_str())
                .map_err(|e| Error::InvalidResource(format!("Invalid entry point: {}", e)))?;

            let shader_stages = [
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::VERTEX)
                    .module(vertex_shader.module)
                    .name(&entry_point_vert),
                vk::PipelineShaderStageCreateInfo::default()
                    .stage(vk::ShaderStageFlags::FRAGMENT)
                    .module(fragment_shader.module)
                    .name(&entry_point_frag),
            ];

            // Single interleaved vertex buffer at binding 0
            let vertex_bindings = [vk::VertexInputBindingDescription {
                binding: 0,
                stride: desc.vertex_layout.stride,
                input_rate: vk::VertexInputRate::VERTEX,
            }];
            let vertex_attributes: Vec<vk::VertexInputAttributeDescription> = desc
                .vertex_layout
                .attributes
                .iter()
                .map(|attribute| vk::VertexInputAttributeDescription {
                    location: attribute.location,
                    binding: 0,
                    format: vertex_format_to_vk(attribute.format),
                    offset: attribute.offset,
                })
                .collect();

            let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
                .vertex_binding_descriptions(&vertex_bindings)
                .vertex_attribute_descriptions(&vertex_attributes);

            let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
                .topology(topology_to_vk(desc.topology))
                .primitive_restart_enable(false);

            // Viewport and scissor are dynamic
            let viewports = [vk::Viewport::default()];
            let scissors = [vk::Rect2D::default()];
            let viewport_state = vk::PipelineViewportStateCreateInfo::default()
                .viewports(&viewports)
                .scissors(&scissors);

            let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
                .depth_clamp_enable(false)
                .rasterizer_discard_enable(false)
                .polygon_mode(vk::PolygonMode::FILL)
                .line_width(1.0)
                .cull_mode(cull_mode_to_vk(desc.rasterization.cull_mode))
                .front_face(front_face_to_vk(desc.rasterization.front_face))
                .depth_bias_enable(false);

            let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
                .sample_shading_enable(false)
                .rasterization_samples(vk::SampleCountFlags::TYPE_1);

            let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
                .depth_test_enable(desc.depth_stencil.depth_test_enable)
                .depth_write_enable(desc.depth_stencil.depth_write_enable)
                .depth_compare_op(compare_op_to_vk(desc.depth_stencil.depth_compare_op))
                .depth_bounds_test_enable(false)
                .stencil_test_enable(false);

            // The same blend state applies to every color target of the pass
            let blend = desc.color_blend;
            let blend_attachment = vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA)
                .blend_enable(blend.blend_enable)
                .src_color_blend_factor(blend_factor_to_vk(blend.src_color_factor))
                .dst_color_blend_factor(blend_factor_to_vk(blend.dst_color_factor))
                .color_blend_op(blend_op_to_vk(blend.color_blend_op))
                .src_alpha_blend_factor(blend_factor_to_vk(blend.src_alpha_factor))
                .dst_alpha_blend_factor(blend_factor_to_vk(blend.dst_alpha_factor))
                .alpha_blend_op(blend_op_to_vk(blend.alpha_blend_op));
            let blend_attachments = vec![blend_attachment; desc.color_formats.len()];

            let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
                .logic_op_enable(false)
                .attachments(&blend_attachments);

            let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
            let dynamic_state =
                vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

            // One descriptor set of combined image samplers for the fragment
            // stage, one binding per texture slot
            let bindings: Vec<vk::DescriptorSetLayoutBinding> = (0..desc.texture_slot_count)
                .map(|slot| {
                    vk::DescriptorSetLayoutBinding::default()
                        .binding(slot)
                        .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                        .descriptor_count(1)
                        .stage_flags(vk::ShaderStageFlags::FRAGMENT)
                })
                .collect();
            let set_layout_info =
                vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
            let set_layout = device
                .create_descriptor_set_layout(&set_layout_info, None)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to create set layout: {:?}", e))
                })?;

            // The pass constant block is pushed once per draw, visible to
            // the stages the descriptor names
            let constant_stages = shader_stage_flags_to_vk(desc.constant_stages);
            let push_constant_ranges = [vk::PushConstantRange::default()
                .stage_flags(constant_stages)
                .offset(0)
                .size(desc.constant_block_size)];
            let set_layouts = [set_layout];
            let mut layout_create_info =
                vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
            if desc.constant_block_size > 0 {
                layout_create_info = layout_create_info.push_constant_ranges(&push_constant_ranges);
            }
            let layout = device
                .create_pipeline_layout(&layout_create_info, None)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to create pipeline layout: {:?}", e))
                })?;

            let color_formats: Vec<vk::Format> =
                desc.color_formats.iter().map(|f| format_to_vk(*f)).collect();
            let mut rendering_info = vk::PipelineRenderingCreateInfo::default()
                .color_attachment_formats(&color_formats);
            if let Some(depth_format) = desc.depth_format {
                rendering_info = rendering_info.depth_attachment_format(format_to_vk(depth_format));
            }

            let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
                .stages(&shader_stages)
                .vertex_input_state(&vertex_input_state)
                .input_assembly_state(&input_assembly_state)
                .viewport_state(&viewport_state)
                .rasterization_state(&rasterization_state)
                .multisample_state(&multisample_state)
                .depth_stencil_state(&depth_stencil_state)
                .color_blend_state(&color_blend_state)
                .dynamic_state(&dynamic_state)
                .layout(layout)
                .push_next(&mut rendering_info);

            let pipelines = device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_create_info], None)
                .map_err(|e| {
                    Error::BackendError(format!("Failed to create graphics pipeline: {:?}", e.1))
                })?;

            Ok(Self {
                pipeline: pipelines[0],
                layout,
                set_layout,
                texture_slot_count: desc.texture_slot_count,
                constant_block_size: desc.constant_block_size,
                constant_stages,
                device: device.clone(),
            })
        }
    }
}

impl Pipeline for VulkanPipeline {}

impl Drop for VulkanPipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.layout, None);
            self.device.destroy_descriptor_set_layout(self.set_layout, None);
        }
    }
}
