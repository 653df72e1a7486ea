/*!
Spinning cube rendered through the Nova 3D deferred pipeline.

The effect manifest and compiled shaders are expected under `assets/`
relative to the working directory; see `assets/shaders/compile.sh`.
*/

use std::sync::Arc;
use std::time::Instant;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowAttributes, WindowId};

use nova_3d_engine::glam::{Mat4, Vec3};
use nova_3d_engine::nova3d::render::{Material, RenderEngine, StaticMesh};
use nova_3d_engine::nova3d::GraphicsDevice;
use nova_3d_engine_renderer_vulkan::VulkanDevice;

const WINDOW_WIDTH: u32 = 1280;
const WINDOW_HEIGHT: u32 = 720;
const EFFECT_MANIFEST: &str = "assets/deferred.fx";

/// Unit cube centered at the origin, 24 vertices with face normals
fn cube_vertices() -> Vec<f32> {
    // Per face: normal, then four corners with texcoords
    let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +Z
        ([0.0, 0.0, 1.0], [
            [-0.5, -0.5, 0.5], [0.5, -0.5, 0.5], [0.5, 0.5, 0.5], [-0.5, 0.5, 0.5],
        ]),
        // -Z
        ([0.0, 0.0, -1.0], [
            [0.5, -0.5, -0.5], [-0.5, -0.5, -0.5], [-0.5, 0.5, -0.5], [0.5, 0.5, -0.5],
        ]),
        // +X
        ([1.0, 0.0, 0.0], [
            [0.5, -0.5, 0.5], [0.5, -0.5, -0.5], [0.5, 0.5, -0.5], [0.5, 0.5, 0.5],
        ]),
        // -X
        ([-1.0, 0.0, 0.0], [
            [-0.5, -0.5, -0.5], [-0.5, -0.5, 0.5], [-0.5, 0.5, 0.5], [-0.5, 0.5, -0.5],
        ]),
        // +Y
        ([0.0, 1.0, 0.0], [
            [-0.5, 0.5, 0.5], [0.5, 0.5, 0.5], [0.5, 0.5, -0.5], [-0.5, 0.5, -0.5],
        ]),
        // -Y
        ([0.0, -1.0, 0.0], [
            [-0.5, -0.5, -0.5], [0.5, -0.5, -0.5], [0.5, -0.5, 0.5], [-0.5, -0.5, 0.5],
        ]),
    ];
    let texcoords = [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]];

    let mut vertices = Vec::with_capacity(24 * 8);
    for (normal, corners) in &faces {
        for (corner, texcoord) in corners.iter().zip(&texcoords) {
            vertices.extend_from_slice(corner);
            vertices.extend_from_slice(normal);
            vertices.extend_from_slice(texcoord);
        }
    }
    vertices
}

fn cube_indices() -> Vec<u32> {
    let mut indices = Vec::with_capacity(36);
    for face in 0..6u32 {
        let base = face * 4;
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    indices
}

enum DemoApp {
    Pending,
    Running {
        window: Window,
        engine: RenderEngine,
        start: Instant,
    },
}

impl DemoApp {
    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn std::error::Error>> {
        let window_attrs = WindowAttributes::default()
            .with_title("Nova3D deferred demo")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = event_loop.create_window(window_attrs)?;
        let size = window.inner_size();

        let device: Arc<dyn GraphicsDevice> = Arc::new(VulkanDevice::new(&window)?);
        let mut engine =
            RenderEngine::create(device.clone(), size.width, size.height, EFFECT_MANIFEST)?;

        let mesh = Arc::new(StaticMesh::create(
            &device,
            &cube_vertices(),
            &cube_indices(),
            Material::default(),
        )?);
        engine.add_renderable(mesh);

        let camera = engine.camera_mut();
        camera.look_at(Vec3::new(0.0, 2.0, -3.0), Vec3::ZERO, Vec3::Y);
        camera.perspective(
            std::f32::consts::FRAC_PI_4,
            size.width as f32 / size.height as f32,
            0.1,
            100.0,
        );

        *self = DemoApp::Running {
            window,
            engine,
            start: Instant::now(),
        };
        Ok(())
    }
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if matches!(self, DemoApp::Pending) {
            if let Err(e) = self.start(event_loop) {
                eprintln!("Failed to start: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let DemoApp::Running { window, engine, start } = self else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if size.width > 0 && size.height > 0 {
                    if let Err(e) = engine.resize(size.width, size.height) {
                        eprintln!("Resize failed: {}", e);
                        event_loop.exit();
                        return;
                    }
                    engine.camera_mut().perspective(
                        std::f32::consts::FRAC_PI_4,
                        size.width as f32 / size.height as f32,
                        0.1,
                        100.0,
                    );
                }
            }
            WindowEvent::RedrawRequested => {
                let angle = start.elapsed().as_secs_f32() * 0.8;
                engine.camera_mut().world = Mat4::from_rotation_y(angle);
                if let Err(e) = engine.frame() {
                    eprintln!("Frame failed: {}", e);
                    event_loop.exit();
                    return;
                }
                window.request_redraw();
            }
            _ => {}
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = DemoApp::Pending;
    event_loop.run_app(&mut app)?;
    Ok(())
}
