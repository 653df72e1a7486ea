//! Unit tests for StaticMesh
//!
//! The pass-keyed pipeline cache is the load-bearing behavior here: one
//! pipeline per distinct pass, however many times the mesh is rendered.

use std::path::Path;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crate::render::effect::Effect;
use crate::render::renderable::{Material, StaticMesh};
use crate::renderer::mock::MockDevice;
use crate::renderer::GraphicsDevice;

const MANIFEST: &str = r#"
pass a
    vs a.vert.spv main
    fs a.frag.spv main
    targets 2
    constant vec4 g_albedo_clr
    texture g_albedo_tex
end
pass b
    vs b.vert.spv main
    fs b.frag.spv main
    depth off
    targets 1
end
"#;

/// One triangle, 8 floats per vertex
fn triangle() -> (Vec<f32>, Vec<u32>) {
    let mut vertices = Vec::new();
    for position in [[0.0f32, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]] {
        vertices.extend_from_slice(&position);
        vertices.extend_from_slice(&[0.0, 0.0, 1.0]);
        vertices.extend_from_slice(&[0.0, 0.0]);
    }
    (vertices, vec![0, 1, 2])
}

#[test]
fn test_create_validates_geometry() {
    let device: Arc<dyn GraphicsDevice> = Arc::new(MockDevice::new());
    let (vertices, indices) = triangle();

    assert!(StaticMesh::create(&device, &vertices, &indices, Material::default()).is_ok());
    // Truncated vertex stream
    assert!(StaticMesh::create(&device, &vertices[..10], &indices, Material::default()).is_err());
    // Partial triangle
    assert!(StaticMesh::create(&device, &vertices, &[0, 1], Material::default()).is_err());
    // Empty
    assert!(StaticMesh::create(&device, &[], &indices, Material::default()).is_err());
}

#[test]
fn test_default_material_constants() {
    let material = Material::default();
    assert!((material.albedo.x - 0.58).abs() < 1e-6);
    assert!((material.metalness - 0.02).abs() < 1e-6);
    assert!((material.glossiness - 0.04).abs() < 1e-6);
    assert!(material.albedo_map.is_none());
}

#[test]
fn test_missing_texture_file_is_silent_fallback() {
    let device: Arc<dyn GraphicsDevice> = Arc::new(MockDevice::new());
    let mut material = Material::default();
    material.load_albedo_map(&device, "/nonexistent/texture.rgba", 4, 4);
    assert!(material.albedo_map.is_none());
}

#[test]
fn test_pipeline_cache_is_keyed_by_pass_identity() {
    let mock = MockDevice::new();
    let pipeline_count = mock.pipeline_count.clone();
    let device: Arc<dyn GraphicsDevice> = Arc::new(mock);

    let mut effect = Effect::from_source(&device, MANIFEST, Path::new("")).unwrap();
    let pass_a = effect.pass("a").unwrap();
    let pass_b = effect.pass("b").unwrap();

    let (vertices, indices) = triangle();
    let mesh = StaticMesh::create(&device, &vertices, &indices, Material::default()).unwrap();
    let mut cmd = device.create_command_list().unwrap();

    // A then B then A again: exactly two pipelines, not three
    mesh.render(&device, cmd.as_mut(), &mut effect, &pass_a).unwrap();
    mesh.render(&device, cmd.as_mut(), &mut effect, &pass_b).unwrap();
    mesh.render(&device, cmd.as_mut(), &mut effect, &pass_a).unwrap();

    assert_eq!(pipeline_count.load(Ordering::SeqCst), 2);
    assert_eq!(mesh.cached_pipeline_count(), 2);
}

#[test]
fn test_render_binds_buffers_and_draws_full_index_buffer() {
    let mock = MockDevice::new();
    let log = mock.log.clone();
    let device: Arc<dyn GraphicsDevice> = Arc::new(mock);

    let mut effect = Effect::from_source(&device, MANIFEST, Path::new("")).unwrap();
    let pass = effect.pass("a").unwrap();

    let (vertices, indices) = triangle();
    let mesh = StaticMesh::create(&device, &vertices, &indices, Material::default()).unwrap();
    assert_eq!(mesh.index_count(), 3);

    let mut cmd = device.create_command_list().unwrap();
    mesh.render(&device, cmd.as_mut(), &mut effect, &pass).unwrap();

    let commands = MockDevice::commands(&log);
    let draw_index = commands.iter().position(|c| c == "draw_indexed 3 0 0").unwrap();
    let vb_index = commands.iter().position(|c| c.starts_with("bind_vertex_buffer")).unwrap();
    let ib_index = commands.iter().position(|c| c.starts_with("bind_index_buffer")).unwrap();
    let pipeline_index = commands.iter().position(|c| c.starts_with("bind_pipeline")).unwrap();
    assert!(vb_index < draw_index);
    assert!(ib_index < draw_index);
    assert!(pipeline_index < draw_index);
    assert!(commands[ib_index].contains("U32"));
}
