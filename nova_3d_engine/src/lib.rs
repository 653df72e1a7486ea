/*!
# Nova 3D Engine

Core types for the Nova 3D deferred rendering engine.

This crate is platform-agnostic: all GPU access goes through trait-based
dynamic polymorphism, and backend crates (Vulkan today) provide the
concrete `GraphicsDevice` implementation.

## Architecture

- **GraphicsDevice**: Factory trait for GPU resources and command lists
- **RenderEngine**: Drives the deferred shading passes each frame
- **FrameBuffer**: Bindable color/depth target sets, rebuilt on resize
- **Effect**: Multi-pass shading technique loaded from a text manifest
- **StaticMesh / Quad**: Renderables with pass-keyed pipeline caches

Backend implementations provide concrete types that implement the
`renderer` traits.
*/

// Internal modules
mod error;
pub mod log;
pub mod render;
pub mod renderer;

// Main nova3d namespace module
pub mod nova3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine orchestrator
    pub use crate::render::RenderEngine;

    // Device factory trait
    pub use crate::renderer::GraphicsDevice;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{DefaultLogger, LogEntry, LogSeverity, Logger};
        // Note: engine_* macros are NOT re-exported here - they are internal only
    }

    // Render sub-module with the deferred pipeline components
    pub mod render {
        pub use crate::render::*;
    }

    // Renderer sub-module with the backend trait layer
    pub mod renderer {
        pub use crate::renderer::*;
    }
}

// Re-export math library at crate root
pub use glam;
