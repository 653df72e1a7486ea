//! Unit tests for Effect manifest parsing and pass application

use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec4};

use crate::error::Error;
use crate::render::effect::{Effect, ParamType};
use crate::renderer::mock::MockDevice;
use crate::renderer::{GraphicsDevice, TextureDesc, TextureFormat, TextureUsage};

const MANIFEST: &str = r#"
# two-pass test effect
pass gbuffer
    vs gbuffer.vert.spv main
    fs gbuffer.frag.spv main
    depth on
    blend opaque
    cull back
    targets 2
    constant mat4 g_world
    constant vec4 g_albedo_clr
    constant float g_metalness_clr
end

pass ambient
    vs quad.vert.spv main
    fs ambient.frag.spv main
    depth off
    blend additive
    cull none
    targets 1
    constant vec4 g_light_color
    texture g_buffer_tex0
    texture g_buffer_tex1
end
"#;

fn load(device: &Arc<dyn GraphicsDevice>) -> Effect {
    Effect::from_source(device, MANIFEST, Path::new("assets")).unwrap()
}

fn mock_device() -> Arc<dyn GraphicsDevice> {
    Arc::new(MockDevice::new())
}

#[test]
fn test_manifest_parses_passes_and_state() {
    let device = mock_device();
    let effect = load(&device);
    assert_eq!(effect.pass_count(), 2);

    let gbuffer = effect.pass("gbuffer").unwrap();
    assert_eq!(gbuffer.color_formats.len(), 2);
    assert!(gbuffer.depth_stencil.depth_test_enable);
    assert!(!gbuffer.color_blend.blend_enable);
    assert_eq!(gbuffer.constants.len(), 3);
    assert_eq!(gbuffer.constants[0].param_type, ParamType::Mat4);

    let ambient = effect.pass("ambient").unwrap();
    assert_eq!(ambient.color_formats.len(), 1);
    assert!(!ambient.depth_stencil.depth_test_enable);
    assert!(ambient.color_blend.blend_enable);
    assert_eq!(ambient.textures, vec!["g_buffer_tex0", "g_buffer_tex1"]);

    // Identities are distinct
    assert_ne!(gbuffer.id, ambient.id);
}

#[test]
fn test_constant_stages_cover_both_pass_shaders() {
    use crate::renderer::ShaderStageFlags;

    let device = mock_device();
    let effect = load(&device);
    let gbuffer = effect.pass("gbuffer").unwrap();

    // The constant block is pushed once per draw and read by both stages,
    // so pipelines must declare both in their push constant range
    assert_eq!(
        gbuffer.constant_stages(),
        ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT
    );
}

#[test]
fn test_unknown_pass_is_an_error() {
    let device = mock_device();
    let effect = load(&device);
    assert!(effect.pass("missing").is_err());
}

#[test]
fn test_malformed_manifests_rejected_with_line_numbers() {
    let device = mock_device();
    let base = Path::new("");

    let no_end = "pass broken\n  vs a.spv main\n";
    let err = Effect::from_source(&device, no_end, base).unwrap_err();
    assert!(err.to_string().contains("broken"));

    let bad_directive = "pass p\n  frobnicate\nend\n";
    let err = Effect::from_source(&device, bad_directive, base).unwrap_err();
    assert!(err.to_string().contains("line 2"));

    let no_shader = "pass p\n  targets 1\nend\n";
    assert!(Effect::from_source(&device, no_shader, base).is_err());

    let orphan = "depth on\n";
    assert!(Effect::from_source(&device, orphan, base).is_err());
}

#[test]
fn test_shader_failure_carries_diagnostics() {
    let device = mock_device();
    let manifest = "pass p\n  vs broken.invalid main\n  fs p.frag.spv main\n  targets 1\nend\n";
    match Effect::from_source(&device, manifest, Path::new("")) {
        Err(Error::ShaderCompilation { path, diagnostics }) => {
            assert!(path.ends_with("broken.invalid"));
            assert!(!diagnostics.is_empty());
        }
        _ => panic!("expected ShaderCompilation error"),
    }
}

#[test]
fn test_constant_block_layout_is_16_byte_aligned() {
    let device = mock_device();
    let effect = load(&device);
    let gbuffer = effect.pass("gbuffer").unwrap();

    // mat4 (64) + vec4 (16) + float slot (16)
    assert_eq!(gbuffer.constant_block_size(), 96);
}

#[test]
fn test_serialize_constants_in_declared_order() {
    let device = mock_device();
    let mut effect = load(&device);
    let gbuffer = effect.pass("gbuffer").unwrap();

    effect.set_mat4("g_world", Mat4::IDENTITY);
    effect.set_vec4("g_albedo_clr", Vec4::new(0.58, 0.58, 0.58, 1.0));
    effect.set_f32("g_metalness_clr", 0.02);

    let block = effect.serialize_constants(&gbuffer).unwrap();
    assert_eq!(block.len(), 96);

    // Identity matrix starts with 1.0
    assert_eq!(f32::from_le_bytes(block[0..4].try_into().unwrap()), 1.0);
    // Albedo slot starts at 64
    assert_eq!(f32::from_le_bytes(block[64..68].try_into().unwrap()), 0.58);
    // Metalness slot starts at 80, padding stays zero
    assert_eq!(f32::from_le_bytes(block[80..84].try_into().unwrap()), 0.02);
    assert_eq!(&block[84..96], &[0u8; 12]);
}

#[test]
fn test_serialize_rejects_type_mismatch_and_zeroes_unset() {
    let device = mock_device();
    let mut effect = load(&device);
    let gbuffer = effect.pass("gbuffer").unwrap();

    // Unset variables serialize as zero
    let block = effect.serialize_constants(&gbuffer).unwrap();
    assert!(block.iter().all(|&b| b == 0));

    // Wrong type for a declared constant is a contract violation
    effect.set_f32("g_world", 1.0);
    assert!(effect.serialize_constants(&gbuffer).is_err());
}

#[test]
fn test_apply_pass_requires_declared_textures() {
    let mock = MockDevice::new();
    let log = mock.log.clone();
    let device: Arc<dyn GraphicsDevice> = Arc::new(mock);
    let mut effect = load(&device);
    let ambient = effect.pass("ambient").unwrap();

    let texture = device
        .create_texture(&TextureDesc {
            width: 8,
            height: 8,
            format: TextureFormat::R8G8B8A8_UNORM,
            usage: TextureUsage::SampledAndRenderTarget,
            data: None,
        })
        .unwrap();
    let view = device.create_shader_view(&texture).unwrap();

    let pipeline = device
        .create_pipeline(&crate::renderer::PipelineDesc {
            vertex_shader: ambient.vertex_shader.clone(),
            fragment_shader: ambient.fragment_shader.clone(),
            vertex_layout: Default::default(),
            topology: ambient.topology,
            rasterization: ambient.rasterization,
            depth_stencil: ambient.depth_stencil,
            color_blend: ambient.color_blend,
            color_formats: ambient.color_formats.clone(),
            depth_format: ambient.depth_format,
            constant_block_size: ambient.constant_block_size(),
            constant_stages: ambient.constant_stages(),
            texture_slot_count: ambient.textures.len() as u32,
        })
        .unwrap();

    let mut cmd = device.create_command_list().unwrap();

    // Only one of the two declared textures bound
    effect.set_texture("g_buffer_tex0", view.clone());
    assert!(effect.apply_pass(cmd.as_mut(), &ambient, &pipeline).is_err());

    effect.set_texture("g_buffer_tex1", view);
    effect.apply_pass(cmd.as_mut(), &ambient, &pipeline).unwrap();

    let commands = MockDevice::commands(&log);
    assert!(commands.iter().any(|c| c.starts_with("bind_pipeline")));
    assert!(commands.iter().any(|c| c.starts_with("push_constants 16")));
    assert!(commands.iter().any(|c| c.starts_with("bind_shader_views")));
}
