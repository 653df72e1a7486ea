//! Unit tests for pipeline state types
//!
//! Covers size calculations for vertex/index formats and the blend state
//! presets the deferred pipeline relies on.

use crate::renderer::{
    BlendFactor, BlendOp, ColorBlendState, CompareOp, DepthStencilState,
    IndexType, VertexFormat,
};

#[test]
fn test_vertex_format_size_bytes() {
    assert_eq!(VertexFormat::Float32.size_bytes(), 4);
    assert_eq!(VertexFormat::Float32x2.size_bytes(), 8);
    assert_eq!(VertexFormat::Float32x3.size_bytes(), 12);
    assert_eq!(VertexFormat::Float32x4.size_bytes(), 16);
}

#[test]
fn test_index_type_size_bytes() {
    assert_eq!(IndexType::U16.size_bytes(), 2);
    assert_eq!(IndexType::U32.size_bytes(), 4);
}

#[test]
fn test_opaque_blend_disables_blending() {
    let state = ColorBlendState::opaque();
    assert!(!state.blend_enable);
    assert_eq!(state.src_color_factor, BlendFactor::One);
    assert_eq!(state.dst_color_factor, BlendFactor::Zero);
}

#[test]
fn test_additive_blend_sums_contributions() {
    // Lighting passes accumulate, so both factors must be One with Add
    let state = ColorBlendState::additive();
    assert!(state.blend_enable);
    assert_eq!(state.src_color_factor, BlendFactor::One);
    assert_eq!(state.dst_color_factor, BlendFactor::One);
    assert_eq!(state.color_blend_op, BlendOp::Add);
    assert_eq!(state.src_alpha_factor, BlendFactor::One);
    assert_eq!(state.dst_alpha_factor, BlendFactor::One);
}

#[test]
fn test_depth_state_presets() {
    let enabled = DepthStencilState::enabled();
    assert!(enabled.depth_test_enable);
    assert!(enabled.depth_write_enable);
    assert_eq!(enabled.depth_compare_op, CompareOp::Less);

    let disabled = DepthStencilState::disabled();
    assert!(!disabled.depth_test_enable);
    assert!(!disabled.depth_write_enable);

    let read_only = DepthStencilState::read_only();
    assert!(read_only.depth_test_enable);
    assert!(!read_only.depth_write_enable);
}
