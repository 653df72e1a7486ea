/// Light value types fed to the lighting passes

use glam::{Vec3, Vec4};

/// Ambient fill light applied in the first lighting pass
#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    /// World-space direction (transformed to eye space before binding)
    pub direction: Vec3,
    /// Light color
    pub color: Vec4,
    /// Attenuation attributes packed as the shaders expect
    pub attrib: Vec4,
}

impl Default for AmbientLight {
    fn default() -> Self {
        Self {
            direction: Vec3::new(0.0, 1.0, 0.0),
            color: Vec4::new(0.1, 0.1, 0.1, 1.0),
            attrib: Vec4::new(1.0, 1.0, 0.0, 0.0),
        }
    }
}

/// Directional sun light accumulated in the second lighting pass
///
/// The direction is recomputed from the camera every frame; only the color
/// is persistent state.
#[derive(Debug, Clone, Copy)]
pub struct DirectionalLight {
    /// Light color
    pub color: Vec4,
    /// Attenuation attributes packed as the shaders expect
    pub attrib: Vec4,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            color: Vec4::ONE,
            attrib: Vec4::new(1.0, 1.0, 0.0, 0.0),
        }
    }
}
