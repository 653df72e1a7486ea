//! Unit tests for the mock graphics device

use crate::error::Error;
use crate::renderer::device::GraphicsDevice;
use crate::renderer::mock::MockDevice;
use crate::renderer::{
    BufferDesc, BufferUsage, ShaderDesc, ShaderStage, TextureDesc, TextureFormat,
    TextureUsage, SWAP_CHAIN_BUFFER_COUNT,
};

fn rt_desc(width: u32, height: u32) -> TextureDesc {
    TextureDesc {
        width,
        height,
        format: TextureFormat::R8G8B8A8_UNORM,
        usage: TextureUsage::SampledAndRenderTarget,
        data: None,
    }
}

#[test]
fn test_texture_ids_are_unique() {
    let device = MockDevice::new();
    let a = device.create_texture(&rt_desc(64, 64)).unwrap();
    let b = device.create_texture(&rt_desc(64, 64)).unwrap();
    assert!(!std::sync::Arc::ptr_eq(&a, &b));
    let log = device.log.lock().unwrap();
    assert!(log[0].contains("id=1"));
    assert!(log[1].contains("id=2"));
}

#[test]
fn test_shader_view_requires_sampled_usage() {
    let device = MockDevice::new();
    let depth = device
        .create_texture(&TextureDesc {
            width: 32,
            height: 32,
            format: TextureFormat::D32_FLOAT,
            usage: TextureUsage::DepthStencil,
            data: None,
        })
        .unwrap();
    assert!(device.create_shader_view(&depth).is_err());

    let color = device.create_texture(&rt_desc(32, 32)).unwrap();
    assert!(device.create_shader_view(&color).is_ok());
}

#[test]
fn test_buffer_size_mismatch_rejected() {
    let device = MockDevice::new();
    let desc = BufferDesc { usage: BufferUsage::Vertex, size: 16 };
    assert!(device.create_buffer(&desc, &[0u8; 8]).is_err());
    assert!(device.create_buffer(&desc, &[0u8; 16]).is_ok());
}

#[test]
fn test_invalid_shader_path_reports_diagnostics() {
    let device = MockDevice::new();
    let result = device.create_shader(&ShaderDesc {
        path: "shaders/broken.invalid".to_string(),
        entry_point: "main".to_string(),
        stage: ShaderStage::Vertex,
    });
    match result {
        Err(Error::ShaderCompilation { path, diagnostics }) => {
            assert_eq!(path, "shaders/broken.invalid");
            assert!(!diagnostics.is_empty());
        }
        other => panic!("expected ShaderCompilation error, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_swap_chain_resize_changes_back_buffer_identity() {
    let device = MockDevice::new();
    let mut swap_chain = device.create_swap_chain(800, 600).unwrap();
    assert_eq!(swap_chain.buffer_count(), SWAP_CHAIN_BUFFER_COUNT);

    let before = swap_chain.back_buffer().unwrap();
    swap_chain.resize(1024, 768).unwrap();
    let after = swap_chain.back_buffer().unwrap();

    assert!(!std::sync::Arc::ptr_eq(&before, &after));
    assert_eq!(swap_chain.width(), 1024);
    assert_eq!(swap_chain.height(), 768);
    assert_eq!(after.info().width, 1024);
}

#[test]
fn test_command_list_records_into_shared_log() {
    let device = MockDevice::new();
    let mut cmd = device.create_command_list().unwrap();
    cmd.begin().unwrap();
    cmd.draw(3, 0).unwrap();
    cmd.end().unwrap();
    device.submit(cmd.as_mut()).unwrap();

    let log = device.log.lock().unwrap().clone();
    assert_eq!(log, vec!["begin", "draw 3 0", "end", "submit"]);
}
