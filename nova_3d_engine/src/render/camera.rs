/// Camera - view/projection transforms bound as shader inputs
///
/// Pure value state with no GPU resource ownership. The engine rebinds the
/// transforms into the effect's variable table every frame.

use glam::{Mat4, Vec3};

use crate::render::effect::Effect;

/// Camera transforms and placement
#[derive(Debug, Clone)]
pub struct Camera {
    /// World/model transform applied to drawn geometry
    pub world: Mat4,
    /// View transform
    pub view: Mat4,
    /// Projection transform
    pub proj: Mat4,
    /// Eye position
    pub eye_pos: Vec3,
    /// Point the camera looks at
    pub look_at: Vec3,
    /// Up vector
    pub up: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            world: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            proj: Mat4::IDENTITY,
            eye_pos: Vec3::ZERO,
            look_at: Vec3::NEG_Z,
            up: Vec3::Y,
        }
    }
}

impl Camera {
    /// Rebuild the view transform from an eye position, target, and up vector
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        self.eye_pos = eye;
        self.look_at = target;
        self.up = up;
        self.view = Mat4::look_at_lh(eye, target, up);
    }

    /// Rebuild the projection transform
    ///
    /// # Arguments
    ///
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect` - Width / height
    /// * `near_plane` - Near clip distance (> 0)
    /// * `far_plane` - Far clip distance (> near)
    pub fn perspective(&mut self, fov_y: f32, aspect: f32, near_plane: f32, far_plane: f32) {
        self.proj = Mat4::perspective_lh(fov_y, aspect, near_plane, far_plane);
    }

    /// Direction the camera looks along, normalized
    pub fn view_direction(&self) -> Vec3 {
        (self.look_at - self.eye_pos).normalize_or_zero()
    }

    /// Write the transforms into the effect's variable table
    pub fn bind(&self, effect: &mut Effect) {
        effect.set_mat4("g_world", self.world);
        effect.set_mat4("g_view", self.view);
        effect.set_mat4("g_proj", self.proj);
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
