use glam::{Mat3, Mat4, Vec3};

/// Model transform operations shared by meshes and point clouds.
///
/// Implementors only expose their 4x4 affine matrix and enabled flag; every
/// operation returns `&mut Self` so calls can be chained.
pub trait Transformable {
    fn transform(&self) -> &Mat4;
    fn transform_mut(&mut self) -> &mut Mat4;
    fn set_enabled(&mut self, enabled: bool);

    /// Add `offset` to the translation
    fn translate(&mut self, offset: Vec3) -> &mut Self
    where
        Self: Sized,
    {
        let m = self.transform_mut();
        m.w_axis += offset.extend(0.0);
        self
    }

    /// Replace the translation
    fn set_translation(&mut self, translation: Vec3) -> &mut Self
    where
        Self: Sized,
    {
        let m = self.transform_mut();
        m.w_axis = translation.extend(1.0);
        self
    }

    /// Left-multiply the linear part by a rotation matrix; translation is kept
    fn rotate(&mut self, rotation: Mat3) -> &mut Self
    where
        Self: Sized,
    {
        let m = self.transform_mut();
        let linear = rotation * Mat3::from_mat4(*m);
        m.x_axis = linear.x_axis.extend(0.0);
        m.y_axis = linear.y_axis.extend(0.0);
        m.z_axis = linear.z_axis.extend(0.0);
        self
    }

    /// Scale row i of the linear part by `factors[i]`
    fn scale(&mut self, factors: Vec3) -> &mut Self
    where
        Self: Sized,
    {
        let m = self.transform_mut();
        for axis in [&mut m.x_axis, &mut m.y_axis, &mut m.z_axis] {
            *axis = (axis.truncate() * factors).extend(axis.w);
        }
        self
    }

    fn scale_uniform(&mut self, factor: f32) -> &mut Self
    where
        Self: Sized,
    {
        self.scale(Vec3::splat(factor))
    }

    /// transform <- matrix * transform
    fn apply_transform(&mut self, matrix: Mat4) -> &mut Self
    where
        Self: Sized,
    {
        let m = self.transform_mut();
        *m = matrix * *m;
        self
    }

    fn set_transform(&mut self, matrix: Mat4) -> &mut Self
    where
        Self: Sized,
    {
        *self.transform_mut() = matrix;
        self
    }

    fn enable(&mut self, enabled: bool) -> &mut Self
    where
        Self: Sized,
    {
        self.set_enabled(enabled);
        self
    }
}

/// Normal matrix (inverse transpose of the linear part) padded to a Mat4
pub fn normal_matrix(model: &Mat4) -> Mat4 {
    let linear = Mat3::from_mat4(*model);
    if linear.determinant() == 0.0 {
        return Mat4::IDENTITY;
    }
    let inverse = linear.inverse();
    if !inverse.is_finite() {
        return Mat4::IDENTITY;
    }
    Mat4::from_mat3(inverse.transpose())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dummy {
        transform: Mat4,
        enabled: bool,
    }

    impl Transformable for Dummy {
        fn transform(&self) -> &Mat4 {
            &self.transform
        }

        fn transform_mut(&mut self) -> &mut Mat4 {
            &mut self.transform
        }

        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = enabled;
        }
    }

    fn dummy() -> Dummy {
        Dummy { transform: Mat4::IDENTITY, enabled: true }
    }

    #[test]
    fn test_translate_accumulates() {
        let mut d = dummy();
        d.translate(Vec3::X).translate(Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(d.transform().w_axis.truncate(), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(d.transform().w_axis.w, 1.0);
    }

    #[test]
    fn test_set_translation_overrides() {
        let mut d = dummy();
        d.translate(Vec3::ONE).set_translation(Vec3::Z);
        assert_eq!(d.transform().w_axis.truncate(), Vec3::Z);
    }

    #[test]
    fn test_rotate_keeps_translation() {
        let mut d = dummy();
        d.translate(Vec3::new(1.0, 2.0, 3.0));
        d.rotate(Mat3::from_rotation_z(std::f32::consts::FRAC_PI_2));
        assert_eq!(d.transform().w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
        let x = d.transform().transform_vector3(Vec3::X);
        assert!((x - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_scale_scales_rows() {
        let mut d = dummy();
        d.rotate(Mat3::from_rotation_z(std::f32::consts::FRAC_PI_2));
        d.scale(Vec3::new(2.0, 3.0, 4.0));
        // X maps to Y before scaling, so the y row factor applies
        let x = d.transform().transform_vector3(Vec3::X);
        assert!((x - Vec3::new(0.0, 3.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_scale_uniform_leaves_translation() {
        let mut d = dummy();
        d.translate(Vec3::X).scale_uniform(5.0);
        assert_eq!(d.transform().x_axis.x, 5.0);
        assert_eq!(d.transform().w_axis.truncate(), Vec3::X);
    }

    #[test]
    fn test_apply_transform_left_multiplies() {
        let mut d = dummy();
        d.scale_uniform(2.0);
        d.apply_transform(Mat4::from_translation(Vec3::Y));
        let p = d.transform().transform_point3(Vec3::X);
        assert_eq!(p, Vec3::new(2.0, 1.0, 0.0));
    }

    #[test]
    fn test_enable_flag() {
        let mut d = dummy();
        d.enable(false);
        assert!(!d.enabled);
    }

    #[test]
    fn test_normal_matrix_of_non_uniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = normal_matrix(&m);
        assert!((n.x_axis.x - 0.5).abs() < 1e-6);
        assert_eq!(normal_matrix(&Mat4::ZERO), Mat4::IDENTITY);
    }

    #[test]
    fn test_normal_matrix_keeps_rotation_at_tiny_scale() {
        let m = Mat4::from_scale_rotation_translation(
            Vec3::splat(0.001),
            glam::Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2),
            Vec3::ZERO,
        );
        let n = normal_matrix(&m).transform_vector3(Vec3::Y).normalize();
        assert!((n - Vec3::NEG_Z).length() < 1e-5, "got {:?}", n);
    }
}
