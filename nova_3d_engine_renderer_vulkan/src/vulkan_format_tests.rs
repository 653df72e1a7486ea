//! Unit tests for Vulkan enum conversion functions
//!
//! Tests pure conversion functions without requiring a GPU.

use ash::vk;
use nova_3d_engine::renderer::{
    BlendFactor, BlendOp, CompareOp, CullMode, FrontFace, PrimitiveTopology, ShaderStageFlags,
    TextureFormat, VertexFormat,
};

use crate::vulkan::{
    blend_factor_to_vk, blend_op_to_vk, compare_op_to_vk, cull_mode_to_vk, format_to_vk,
    front_face_to_vk, image_aspect, shader_stage_flags_to_vk, topology_to_vk, vertex_format_to_vk,
};
use crate::vulkan_pipeline::check_constant_block_limit;

#[test]
fn test_texture_format_to_vk() {
    assert_eq!(format_to_vk(TextureFormat::R8G8B8A8_UNORM), vk::Format::R8G8B8A8_UNORM);
    assert_eq!(format_to_vk(TextureFormat::R8G8B8A8_SRGB), vk::Format::R8G8B8A8_SRGB);
    assert_eq!(format_to_vk(TextureFormat::B8G8R8A8_UNORM), vk::Format::B8G8R8A8_UNORM);
    assert_eq!(format_to_vk(TextureFormat::D32_FLOAT), vk::Format::D32_SFLOAT);
}

#[test]
fn test_image_aspect_follows_format_kind() {
    assert_eq!(image_aspect(TextureFormat::R8G8B8A8_UNORM), vk::ImageAspectFlags::COLOR);
    assert_eq!(image_aspect(TextureFormat::B8G8R8A8_UNORM), vk::ImageAspectFlags::COLOR);
    assert_eq!(image_aspect(TextureFormat::D32_FLOAT), vk::ImageAspectFlags::DEPTH);
}

#[test]
fn test_vertex_format_to_vk() {
    assert_eq!(vertex_format_to_vk(VertexFormat::Float32), vk::Format::R32_SFLOAT);
    assert_eq!(vertex_format_to_vk(VertexFormat::Float32x2), vk::Format::R32G32_SFLOAT);
    assert_eq!(vertex_format_to_vk(VertexFormat::Float32x3), vk::Format::R32G32B32_SFLOAT);
    assert_eq!(vertex_format_to_vk(VertexFormat::Float32x4), vk::Format::R32G32B32A32_SFLOAT);
}

#[test]
fn test_topology_to_vk() {
    assert_eq!(
        topology_to_vk(PrimitiveTopology::TriangleList),
        vk::PrimitiveTopology::TRIANGLE_LIST
    );
    assert_eq!(
        topology_to_vk(PrimitiveTopology::TriangleStrip),
        vk::PrimitiveTopology::TRIANGLE_STRIP
    );
}

#[test]
fn test_rasterization_state_to_vk() {
    assert_eq!(cull_mode_to_vk(CullMode::None), vk::CullModeFlags::NONE);
    assert_eq!(cull_mode_to_vk(CullMode::Front), vk::CullModeFlags::FRONT);
    assert_eq!(cull_mode_to_vk(CullMode::Back), vk::CullModeFlags::BACK);
    assert_eq!(
        front_face_to_vk(FrontFace::CounterClockwise),
        vk::FrontFace::COUNTER_CLOCKWISE
    );
    assert_eq!(front_face_to_vk(FrontFace::Clockwise), vk::FrontFace::CLOCKWISE);
}

#[test]
fn test_compare_op_to_vk() {
    assert_eq!(compare_op_to_vk(CompareOp::Never), vk::CompareOp::NEVER);
    assert_eq!(compare_op_to_vk(CompareOp::Less), vk::CompareOp::LESS);
    assert_eq!(compare_op_to_vk(CompareOp::LessOrEqual), vk::CompareOp::LESS_OR_EQUAL);
    assert_eq!(compare_op_to_vk(CompareOp::Greater), vk::CompareOp::GREATER);
    assert_eq!(
        compare_op_to_vk(CompareOp::GreaterOrEqual),
        vk::CompareOp::GREATER_OR_EQUAL
    );
    assert_eq!(compare_op_to_vk(CompareOp::Always), vk::CompareOp::ALWAYS);
}

#[test]
fn test_blend_state_to_vk() {
    assert_eq!(blend_factor_to_vk(BlendFactor::Zero), vk::BlendFactor::ZERO);
    assert_eq!(blend_factor_to_vk(BlendFactor::One), vk::BlendFactor::ONE);
    assert_eq!(blend_factor_to_vk(BlendFactor::SrcAlpha), vk::BlendFactor::SRC_ALPHA);
    assert_eq!(
        blend_factor_to_vk(BlendFactor::OneMinusSrcAlpha),
        vk::BlendFactor::ONE_MINUS_SRC_ALPHA
    );
    assert_eq!(blend_op_to_vk(BlendOp::Add), vk::BlendOp::ADD);
    assert_eq!(blend_op_to_vk(BlendOp::Subtract), vk::BlendOp::SUBTRACT);
    assert_eq!(
        blend_op_to_vk(BlendOp::ReverseSubtract),
        vk::BlendOp::REVERSE_SUBTRACT
    );
}

#[test]
fn test_shader_stage_flags_to_vk() {
    assert_eq!(
        shader_stage_flags_to_vk(ShaderStageFlags::VERTEX),
        vk::ShaderStageFlags::VERTEX
    );
    assert_eq!(
        shader_stage_flags_to_vk(ShaderStageFlags::FRAGMENT),
        vk::ShaderStageFlags::FRAGMENT
    );
    assert_eq!(
        shader_stage_flags_to_vk(ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT),
        vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT
    );
    assert_eq!(
        shader_stage_flags_to_vk(ShaderStageFlags::empty()),
        vk::ShaderStageFlags::empty()
    );
}

#[test]
fn test_constant_block_limit_rejects_oversized_blocks() {
    assert!(check_constant_block_limit(0, 128).is_ok());
    assert!(check_constant_block_limit(128, 128).is_ok());
    assert!(check_constant_block_limit(256, 256).is_ok());

    // A deferred G-buffer block (three mat4 plus material slots) overflows
    // a device advertising the guaranteed minimum
    let err = check_constant_block_limit(256, 128).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("256"));
    assert!(message.contains("128"));
}
