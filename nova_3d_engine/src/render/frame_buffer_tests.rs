//! Unit tests for FrameBuffer
//!
//! All tests run against the mock device; assertions cover target counts,
//! lazy shader view caching, and the back-buffer wrapping rules.

use std::sync::Arc;

use crate::render::FrameBuffer;
use crate::renderer::mock::MockDevice;
use crate::renderer::GraphicsDevice;

fn device() -> Arc<dyn GraphicsDevice> {
    Arc::new(MockDevice::new())
}

#[test]
fn test_create_allocates_targets_with_matching_dimensions() {
    let device = device();
    let fb = FrameBuffer::create(device, 640, 480, 2).unwrap();

    assert_eq!(fb.color_target_count(), 2);
    assert_eq!(fb.width(), 640);
    assert_eq!(fb.height(), 480);
    for i in 0..2 {
        let info = fb.color_target(i).unwrap().info();
        assert_eq!((info.width, info.height), (640, 480));
    }
    let depth = fb.depth_target().info();
    assert_eq!((depth.width, depth.height), (640, 480));
}

#[test]
fn test_degenerate_dimensions_rejected() {
    assert!(FrameBuffer::create(device(), 0, 480, 1).is_err());
    assert!(FrameBuffer::create(device(), 640, 0, 1).is_err());
    assert!(FrameBuffer::create(device(), 640, 480, 0).is_err());
}

#[test]
fn test_shader_view_valid_for_every_target_index() {
    let device = device();
    let mut fb = FrameBuffer::create(device, 320, 240, 3).unwrap();

    for i in 0..3 {
        assert!(fb.shader_view(i).is_ok());
    }
    assert!(fb.shader_view(3).is_err());
}

#[test]
fn test_shader_view_is_created_lazily_and_cached() {
    let mock = MockDevice::new();
    let log = mock.log.clone();
    let device: Arc<dyn GraphicsDevice> = Arc::new(mock);
    let mut fb = FrameBuffer::create(device, 320, 240, 2).unwrap();

    let view_creates = |log: &Arc<std::sync::Mutex<Vec<String>>>| {
        log.lock()
            .unwrap()
            .iter()
            .filter(|c| c.starts_with("create_shader_view"))
            .count()
    };

    // Nothing created until first request
    assert_eq!(view_creates(&log), 0);

    let first = fb.shader_view(0).unwrap();
    assert_eq!(view_creates(&log), 1);

    // Second request returns the cached view, no new creation
    let second = fb.shader_view(0).unwrap();
    assert_eq!(view_creates(&log), 1);
    assert!(Arc::ptr_eq(&first, &second));

    fb.shader_view(1).unwrap();
    assert_eq!(view_creates(&log), 2);
}

#[test]
fn test_back_buffer_frame_buffer_refuses_shader_view() {
    let device = device();
    let mut swap_chain = device.create_swap_chain(800, 600).unwrap();
    swap_chain.resize(800, 600).unwrap();

    let back_buffer = swap_chain.back_buffer().unwrap();
    let mut fb = FrameBuffer::create_from_back_buffer(device, back_buffer).unwrap();

    assert_eq!(fb.color_target_count(), 1);
    assert_eq!((fb.width(), fb.height()), (800, 600));
    assert!(fb.shader_view(0).is_err());
}

#[test]
fn test_bind_emits_clear_ops_for_every_target() {
    let mock = MockDevice::new();
    let log = mock.log.clone();
    let device: Arc<dyn GraphicsDevice> = Arc::new(mock);
    let fb = FrameBuffer::create(device.clone(), 64, 64, 2).unwrap();

    let mut cmd = device.create_command_list().unwrap();
    fb.bind(cmd.as_mut(), Some([0.0, 0.0, 0.0, 1.0])).unwrap();
    fb.bind(cmd.as_mut(), None).unwrap();

    let commands = MockDevice::commands(&log);
    let passes: Vec<&String> = commands
        .iter()
        .filter(|c| c.starts_with("begin_target_pass"))
        .collect();
    assert_eq!(passes.len(), 2);
    // Cleared bind clears both color targets and depth
    assert_eq!(passes[0].matches(":clear").count(), 3);
    // Uncleared bind loads everything
    assert_eq!(passes[1].matches(":load").count(), 3);
}
