//! Math utilities and types
//!
//! Provides the vector, matrix and color types used by material parameters
//! and uniform uploads.

use serde::{Deserialize, Serialize};

pub use nalgebra::{Matrix4, Vector2, Vector3};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Linear RGB color without alpha
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color3 {
    /// Red channel
    pub r: f32,
    /// Green channel
    pub g: f32,
    /// Blue channel
    pub b: f32,
}

impl Color3 {
    /// Create a color from its channels
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Opaque white (1, 1, 1)
    pub const fn white() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// Channels as an array, in RGB order
    pub const fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color3 {
    fn default() -> Self {
        Self::white()
    }
}

impl From<Vec3> for Color3 {
    fn from(v: Vec3) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Color3> for Vec3 {
    fn from(c: Color3) -> Self {
        Vec3::new(c.r, c.g, c.b)
    }
}

/// Extension trait for the texture-space matrices used by materials
pub trait Mat4Ext {
    /// Build a UV transform from scale, offset and rotation (radians)
    ///
    /// The 2D affine part lives in rows 0-1; translation is stored in the
    /// third column so shaders can multiply by `vec4(uv, 1.0, 0.0)`.
    fn uv_transform(scale: Vec2, offset: Vec2, rotation: f32) -> Mat4;

    /// True when the 2D affine part of the matrix is the identity
    fn is_identity_as_3x2(&self) -> bool;

    /// Matrix elements in column-major order, as uploaded to the GPU
    fn to_column_major(&self) -> [f32; 16];
}

impl Mat4Ext for Mat4 {
    fn uv_transform(scale: Vec2, offset: Vec2, rotation: f32) -> Mat4 {
        let (sin, cos) = rotation.sin_cos();
        let mut m = Mat4::identity();
        m[(0, 0)] = cos * scale.x;
        m[(0, 1)] = -sin * scale.y;
        m[(1, 0)] = sin * scale.x;
        m[(1, 1)] = cos * scale.y;
        m[(0, 2)] = offset.x;
        m[(1, 2)] = offset.y;
        m
    }

    #[allow(clippy::float_cmp)]
    fn is_identity_as_3x2(&self) -> bool {
        self[(0, 0)] == 1.0
            && self[(1, 1)] == 1.0
            && self[(0, 1)] == 0.0
            && self[(1, 0)] == 0.0
            && self[(0, 2)] == 0.0
            && self[(1, 2)] == 0.0
    }

    fn to_column_major(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        out.copy_from_slice(self.as_slice());
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity_uv_transform() {
        let m = Mat4::uv_transform(Vec2::new(1.0, 1.0), Vec2::zeros(), 0.0);
        assert!(m.is_identity_as_3x2());
        assert_eq!(m, Mat4::identity());
    }

    #[test]
    fn test_offset_breaks_identity() {
        let m = Mat4::uv_transform(Vec2::new(1.0, 1.0), Vec2::new(0.5, 0.0), 0.0);
        assert!(!m.is_identity_as_3x2());
        assert_relative_eq!(m[(0, 2)], 0.5);
    }

    #[test]
    fn test_column_major_layout() {
        let mut m = Mat4::identity();
        m[(0, 3)] = 7.0;
        let cols = m.to_column_major();
        // Column 3 starts at index 12
        assert_eq!(cols[12], 7.0);
        assert_eq!(cols[0], 1.0);
    }

    #[test]
    fn test_color_conversions() {
        let c = Color3::new(0.1, 0.2, 0.3);
        let v: Vec3 = c.into();
        assert_relative_eq!(v, Vec3::new(0.1, 0.2, 0.3));
        assert_eq!(Color3::from(v), c);
        assert_eq!(Color3::default(), Color3::white());
    }
}
