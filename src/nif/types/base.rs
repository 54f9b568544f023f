use bevy_math::{Mat4, Vec3};
use std::fmt;
use std::ops::Mul;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NifHeader {
    pub version_string: String,
    pub file_version: u32, // Represents the uint version read (e.g., 0x04000002)
    pub num_blocks: u32,
}

/// Row-major 3x3, `m[row][col]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix3x3(pub [[f32; 3]; 3]);

impl Default for Matrix3x3 {
    fn default() -> Self {
        Matrix3x3([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }
}

impl fmt::Display for Matrix3x3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0 {
            writeln!(f, "   |{:>8.3} {:>8.3} {:>8.3} |", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}

/// Row-major 4x4 in the row-vector convention: translation lives in the bottom row
/// and `a * b` applies `a` first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4x4(pub [[f32; 4]; 4]);

impl Default for Matrix4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4x4 {
    pub const IDENTITY: Matrix4x4 = Matrix4x4([
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    /// Rotation scaled uniformly in the upper-left block, translation in the bottom row.
    pub fn from_transform(rotation: &Matrix3x3, translation: Vec3, scale: f32) -> Self {
        let mut m = Self::IDENTITY.0;
        for (r, row) in rotation.0.iter().enumerate() {
            for (c, v) in row.iter().enumerate() {
                m[r][c] = v * scale;
            }
        }
        m[3][0] = translation.x;
        m[3][1] = translation.y;
        m[3][2] = translation.z;
        Matrix4x4(m)
    }

    // Our rows are glam's columns, so the transposition happens here and nowhere else.
    fn to_mat4(self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.0)
    }

    fn from_mat4(m: Mat4) -> Self {
        Matrix4x4(m.to_cols_array_2d())
    }

    pub fn inverse(&self) -> Self {
        Self::from_mat4(self.to_mat4().inverse())
    }

    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.0[3][0], self.0[3][1], self.0[3][2])
    }

    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.to_mat4().abs_diff_eq(other.to_mat4(), epsilon)
    }
}

impl Mul for Matrix4x4 {
    type Output = Matrix4x4;

    fn mul(self, rhs: Matrix4x4) -> Matrix4x4 {
        // (A·B)^T = B^T·A^T
        Matrix4x4::from_mat4(rhs.to_mat4() * self.to_mat4())
    }
}

impl fmt::Display for Matrix4x4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.0 {
            writeln!(
                f,
                "   |{:>8.3} {:>8.3} {:>8.3} {:>8.3} |",
                row[0], row[1], row[2], row[3]
            )?;
        }
        Ok(())
    }
}

/// Optional box volume on AV objects.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub unknown_int: u32,
    pub center: Vec3,
    pub axes: Matrix3x3,
    pub extent: Vec3, // half-sizes
}
