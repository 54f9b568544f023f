use bevy_math::{Vec3, Vec4};
use std::fmt::Write as _;

/// NiRotatingParticlesData payload. Only partly understood: the optional arrays are
/// each preceded by a presence flag and sized by `vertex_count`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RotatingParticlesData {
    pub vertex_count: u16,
    pub vertices: Option<Vec<Vec3>>,
    pub unknown_int: u32,
    pub unknown_floats: [f32; 4],
    pub colors: Option<Vec<Vec4>>,
    pub unknown_int2: u32,
    pub unknown_short: u16,
    /// Usually equal to `vertex_count`.
    pub active_count: u16,
    pub unknown_float: f32,
    pub unknown_short2: u16,
    pub sizes: Option<Vec<f32>>,
    pub rotations: Option<Vec<Vec4>>,
}

impl RotatingParticlesData {
    pub fn describe(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Vertex Count:  {}\nUnknown Int:  {}\nUnknown Floats:  {:?}\nUnknown Int 2:  {}\nUnknown Short:  {}\nActive Count:  {}\nUnknown Float:  {:.3}\nUnknown Short 2:  {}",
            self.vertex_count,
            self.unknown_int,
            self.unknown_floats,
            self.unknown_int2,
            self.unknown_short,
            self.active_count,
            self.unknown_float,
            self.unknown_short2
        );
        describe_array(&mut out, "Vertices", self.vertices.as_deref(), verbose);
        describe_array(&mut out, "Colors", self.colors.as_deref(), verbose);
        describe_array(&mut out, "Sizes", self.sizes.as_deref(), verbose);
        describe_array(&mut out, "Rotations", self.rotations.as_deref(), verbose);
        out
    }
}

fn describe_array<T: std::fmt::Debug>(
    out: &mut String,
    title: &str,
    values: Option<&[T]>,
    verbose: bool,
) {
    match values {
        None => {
            let _ = writeln!(out, "{}:  None", title);
        }
        Some(values) => {
            let _ = writeln!(out, "{}:  {}", title, values.len());
            if verbose {
                for v in values {
                    let _ = writeln!(out, "   {:?}", v);
                }
            } else if !values.is_empty() {
                out.push_str("   <<Data Not Shown>>\n");
            }
        }
    }
}
