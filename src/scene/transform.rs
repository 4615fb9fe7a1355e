use glam::{Mat4, Vec3};

/// Position, Euler rotation in degrees and scale, with the model matrix
/// cached until one of them changes.
#[derive(Clone, Copy, Debug)]
pub struct Transform {
    position: Vec3,
    rotation: Vec3,
    scale: Vec3,
    dirty: bool,
    model: Mat4,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, Vec3::ONE)
    }
}

impl Transform {
    pub fn new(position: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
            dirty: true,
            model: Mat4::IDENTITY,
        }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Vec3::ZERO, Vec3::ONE)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.dirty = true;
    }

    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.dirty = true;
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// `T * Rx * Ry * Rz * S`, recomputed only after a setter ran.
    pub fn model_matrix(&mut self) -> &Mat4 {
        if self.dirty {
            self.model = compose(self.position, self.rotation, self.scale);
            self.dirty = false;
        }
        &self.model
    }
}

fn compose(position: Vec3, rotation: Vec3, scale: Vec3) -> Mat4 {
    Mat4::from_translation(position)
        * Mat4::from_rotation_x(rotation.x.to_radians())
        * Mat4::from_rotation_y(rotation.y.to_radians())
        * Mat4::from_rotation_z(rotation.z.to_radians())
        * Mat4::from_scale(scale)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let mut t = Transform::default();
        assert!(t.model_matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn translate_then_scale_ok() {
        let mut t = Transform::new(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::splat(2.0));
        // (1,0,0) -> (2,0,0) -> (3,2,3)
        let p = t.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::new(3.0, 2.0, 3.0), 1e-6));
    }

    #[test]
    fn rotations_apply_z_first() {
        let mut t = Transform::new(Vec3::ZERO, Vec3::new(90.0, 0.0, 90.0), Vec3::ONE);
        // Rz takes +X to +Y, then Rx takes +Y to +Z
        let p = t.model_matrix().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::Z, 1e-5));
    }

    #[test]
    fn matrix_is_cached_until_a_setter_runs() {
        let mut t = Transform::from_position(Vec3::new(1.0, 0.0, 0.0));
        let first = *t.model_matrix();
        assert!(!t.is_dirty());
        let second = *t.model_matrix();
        assert_eq!(first.to_cols_array(), second.to_cols_array());

        t.set_rotation(Vec3::new(0.0, 45.0, 0.0));
        assert!(t.is_dirty());
        let rotated = *t.model_matrix();
        assert_ne!(rotated, first);
        assert!(!t.is_dirty());
    }
}
