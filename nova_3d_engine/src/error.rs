//! Error types for the Nova3D engine
//!
//! This module defines the error types used throughout the engine,
//! including device initialization, resource creation, and shader loading.

use std::fmt;

/// Result type for Nova3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nova3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (Vulkan, DirectX, etc.)
    BackendError(String),

    /// Out of GPU memory
    OutOfMemory,

    /// Invalid resource (texture, buffer, frame buffer, etc.)
    InvalidResource(String),

    /// Initialization failed (device, swap chain, subsystems)
    InitializationFailed(String),

    /// Shader failed to compile or load; carries the compiler diagnostics
    ShaderCompilation {
        /// Path of the shader file that failed
        path: String,
        /// Human-readable diagnostic text from the compiler collaborator
        diagnostics: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::ShaderCompilation { path, diagnostics } => {
                write!(f, "Shader compilation failed for '{}': {}", path, diagnostics)
            }
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR and build an `Error::BackendError` from a format string
///
/// Used in `map_err` closures when forwarding backend failures:
///
/// ```ignore
/// device.create_image(&info, None)
///     .map_err(|e| engine_err!("nova3d::vulkan", "Failed to create image: {:?}", e))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::nova3d::Error::BackendError(message)
    }};
}

/// Log an ERROR and early-return an `Error::InvalidResource`
///
/// Used for contract violations caught at resource-creation or bind time:
///
/// ```ignore
/// if index >= self.color_targets.len() {
///     engine_bail!("nova3d::FrameBuffer", "target index {} out of range", index);
/// }
/// ```
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        return Err($crate::nova3d::Error::InvalidResource(message));
    }};
}
