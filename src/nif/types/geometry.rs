use crate::nif::error::{NifError, Result};
use bevy_math::{Vec2, Vec3, Vec4};
use std::fmt::Write as _;

pub type Triangle = [u16; 3];

/// NiTriShapeData payload. Center and Radius live in the block's attributes.
///
/// Per-vertex arrays are either empty (absent on disk) or exactly `vertex_count`
/// long. Match groups are not stored: only whether the file had them, and they are
/// regenerated from vertex positions on write.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriShapeData {
    vertex_count: u16,
    pub(crate) vertices: Vec<Vec3>,
    pub(crate) normals: Vec<Vec3>,
    pub(crate) colors: Vec<Vec4>,
    pub(crate) uv_sets: Vec<Vec<Vec2>>,
    pub(crate) triangles: Vec<Triangle>,
    pub match_group_mode: bool,
}

fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(NifError::SizeMismatch {
            what,
            expected,
            actual,
        })
    }
}

impl TriShapeData {
    pub fn vertex_count(&self) -> usize {
        self.vertex_count as usize
    }

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn colors(&self) -> &[Vec4] {
        &self.colors
    }

    pub fn uv_sets(&self) -> &[Vec<Vec2>] {
        &self.uv_sets
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Resizes the vertex array and every per-vertex array already present.
    pub fn set_vertex_count(&mut self, n: u16) {
        let len = n as usize;
        self.vertex_count = n;
        self.vertices.resize(len, Vec3::ZERO);
        if !self.normals.is_empty() {
            self.normals.resize(len, Vec3::ZERO);
        }
        if !self.colors.is_empty() {
            self.colors.resize(len, Vec4::ZERO);
        }
        for set in self.uv_sets.iter_mut().filter(|s| !s.is_empty()) {
            set.resize(len, Vec2::ZERO);
        }
    }

    pub(crate) fn set_vertex_count_raw(&mut self, n: u16) {
        self.vertex_count = n;
    }

    pub fn set_uv_set_count(&mut self, n: usize) {
        let len = self.vertex_count();
        self.uv_sets.resize_with(n, || vec![Vec2::ZERO; len]);
    }

    pub fn set_triangle_count(&mut self, n: u16) {
        self.triangles.resize(n as usize, [0; 3]);
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) -> Result<()> {
        check_len("vertex count", self.vertex_count(), vertices.len())?;
        self.vertices = vertices;
        Ok(())
    }

    pub fn set_normals(&mut self, normals: Vec<Vec3>) -> Result<()> {
        check_len("vertex count", self.vertex_count(), normals.len())?;
        self.normals = normals;
        Ok(())
    }

    pub fn set_colors(&mut self, colors: Vec<Vec4>) -> Result<()> {
        check_len("vertex count", self.vertex_count(), colors.len())?;
        self.colors = colors;
        Ok(())
    }

    pub fn set_uv_set(&mut self, index: usize, uvs: Vec<Vec2>) -> Result<()> {
        check_len("vertex count", self.vertex_count(), uvs.len())?;
        let len = self.uv_sets.len();
        let set = self
            .uv_sets
            .get_mut(index)
            .ok_or(NifError::IndexOutOfRange { index, len })?;
        *set = uvs;
        Ok(())
    }

    pub fn set_triangles(&mut self, triangles: Vec<Triangle>) -> Result<()> {
        check_len("triangle count", self.triangles.len(), triangles.len())?;
        self.triangles = triangles;
        Ok(())
    }

    /// For every vertex, the other vertices at exactly the same position.
    pub fn match_groups(&self) -> Vec<Vec<u16>> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, v)| {
                self.vertices
                    .iter()
                    .enumerate()
                    .filter(|&(j, w)| i != j && v == w)
                    .map(|(j, _)| j as u16)
                    .collect()
            })
            .collect()
    }

    pub fn describe(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Vertices:  {}", self.vertex_count);
        if verbose {
            for v in &self.vertices {
                let _ = writeln!(out, "   ({:.3}, {:.3}, {:.3})", v.x, v.y, v.z);
            }
        } else if !self.vertices.is_empty() {
            out.push_str("   <<Data Not Shown>>\n");
        }

        let _ = writeln!(out, "Normals:  {}", self.normals.len());
        if verbose {
            for n in &self.normals {
                let _ = writeln!(out, "   ({:.3}, {:.3}, {:.3})", n.x, n.y, n.z);
            }
        } else if !self.normals.is_empty() {
            out.push_str("   <<Data Not Shown>>\n");
        }

        let _ = writeln!(out, "Vertex Colors:  {}", self.colors.len());
        if verbose {
            for c in &self.colors {
                let _ = writeln!(
                    out,
                    "   (R:  {:.3}, G:  {:.3}, B:  {:.3}, A:  {:.3})",
                    c.x, c.y, c.z, c.w
                );
            }
        } else if !self.colors.is_empty() {
            out.push_str("   <<Data Not Shown>>\n");
        }

        let _ = writeln!(out, "Texture Coordinate Sets:  {}", self.uv_sets.len());
        for (i, set) in self.uv_sets.iter().enumerate() {
            let _ = writeln!(out, "   UV Set {}:", i + 1);
            if verbose {
                for uv in set {
                    let _ = writeln!(out, "      (U:  {:.3}, V:  {:.3})", uv.x, uv.y);
                }
            } else if !set.is_empty() {
                out.push_str("      <<Data Not Shown>>\n");
            }
        }

        let _ = writeln!(out, "Triangles:  {}", self.triangles.len());
        if verbose {
            for t in &self.triangles {
                let _ = writeln!(out, "   ({}, {}, {})", t[0], t[1], t[2]);
            }
        } else if !self.triangles.is_empty() {
            out.push_str("   <<Data Not Shown>>\n");
        }

        let _ = writeln!(
            out,
            "Match Detection:  {}",
            if self.match_group_mode { "On" } else { "Off" }
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_groups_list_other_identical_vertices() {
        let mut data = TriShapeData::default();
        data.set_vertex_count(3);
        data.set_vertices(vec![Vec3::ZERO, Vec3::ZERO, Vec3::ONE])
            .unwrap();
        assert_eq!(data.match_groups(), vec![vec![1], vec![0], vec![]]);
    }

    #[test]
    fn setters_enforce_fixed_counts() {
        let mut data = TriShapeData::default();
        data.set_vertex_count(2);
        assert!(matches!(
            data.set_normals(vec![Vec3::X; 3]),
            Err(NifError::SizeMismatch {
                expected: 2,
                actual: 3,
                ..
            })
        ));
        data.set_normals(vec![Vec3::X; 2]).unwrap();

        data.set_triangle_count(1);
        assert!(data.set_triangles(vec![[0, 1, 1], [1, 0, 0]]).is_err());
        data.set_triangles(vec![[0, 1, 1]]).unwrap();

        assert!(matches!(
            data.set_uv_set(0, vec![Vec2::ZERO; 2]),
            Err(NifError::IndexOutOfRange { index: 0, len: 0 })
        ));
        data.set_uv_set_count(1);
        assert_eq!(data.uv_sets()[0].len(), 2);
    }

    #[test]
    fn growing_vertex_count_keeps_absent_arrays_absent() {
        let mut data = TriShapeData::default();
        data.set_vertex_count(2);
        data.set_colors(vec![Vec4::ONE; 2]).unwrap();
        data.set_vertex_count(4);
        assert_eq!(data.vertices().len(), 4);
        assert_eq!(data.colors().len(), 4);
        assert!(data.normals().is_empty());
    }
}
