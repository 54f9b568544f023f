use super::base::{Matrix3x3, Matrix4x4};
use super::block::{BlockRef, WeakBlockRef};
use crate::nif::error::{NifError, Result};
use bevy_math::Vec3;
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// One bone's offset from the mesh plus the vertices it moves.
#[derive(Debug, Clone, PartialEq)]
pub struct BoneBinding {
    /// Filled in once the skin instance's bone list is known.
    pub bone: Option<WeakBlockRef>,
    pub rotation: Matrix3x3,
    pub translation: Vec3,
    pub scale: f32,
    pub unknown_floats: [f32; 4],
    /// Vertex index to weight. No sum constraint.
    pub weights: BTreeMap<u16, f32>,
}

impl Default for BoneBinding {
    fn default() -> Self {
        Self {
            bone: None,
            rotation: Matrix3x3::default(),
            translation: Vec3::ZERO,
            scale: 1.0,
            unknown_floats: [0.0; 4],
            weights: BTreeMap::new(),
        }
    }
}

impl BoneBinding {
    pub fn bone(&self) -> Option<BlockRef> {
        self.bone.as_ref().and_then(WeakBlockRef::upgrade)
    }

    /// Rotation and translation as a 4x4; the scale is not applied.
    pub fn offset_matrix(&self) -> Matrix4x4 {
        Matrix4x4::from_transform(&self.rotation, self.translation, 1.0)
    }
}

/// NiSkinData payload. Bindings keep file order.
#[derive(Debug, Clone, PartialEq)]
pub struct SkinData {
    pub rotation: Matrix3x3,
    pub translation: Vec3,
    pub scale: f32,
    /// Opaque word between the bone count and the first binding.
    pub unknown_index: i32,
    pub bindings: Vec<BoneBinding>,
}

impl Default for SkinData {
    fn default() -> Self {
        Self {
            rotation: Matrix3x3::default(),
            translation: Vec3::ZERO,
            scale: 1.0,
            unknown_index: -1,
            bindings: Vec::new(),
        }
    }
}

impl SkinData {
    /// Associates bone handles with the bindings, in binding order.
    pub fn set_bones(&mut self, bones: &[BlockRef]) -> Result<()> {
        if bones.len() != self.bindings.len() {
            return Err(NifError::SizeMismatch {
                what: "bone count",
                expected: self.bindings.len(),
                actual: bones.len(),
            });
        }
        for (binding, bone) in self.bindings.iter_mut().zip(bones) {
            binding.bone = Some(bone.downgrade());
        }
        Ok(())
    }

    /// Live bone handles, in binding order.
    pub fn bones(&self) -> Vec<BlockRef> {
        self.bindings.iter().filter_map(BoneBinding::bone).collect()
    }

    pub fn binding(&self, bone: &BlockRef) -> Option<&BoneBinding> {
        self.bindings
            .iter()
            .find(|b| b.bone.as_ref().is_some_and(|w| w.points_to(bone)))
    }

    pub fn weights(&self, bone: &BlockRef) -> Option<&BTreeMap<u16, f32>> {
        self.binding(bone).map(|b| &b.weights)
    }

    /// Replaces the weights of `bone`, adding a binding with an identity offset if
    /// the bone is new.
    pub fn add_bone(&mut self, bone: &BlockRef, weights: BTreeMap<u16, f32>) {
        let existing = self
            .bindings
            .iter_mut()
            .find(|b| b.bone.as_ref().is_some_and(|w| w.points_to(bone)));
        match existing {
            Some(binding) => binding.weights = weights,
            None => self.bindings.push(BoneBinding {
                bone: Some(bone.downgrade()),
                weights,
                ..Default::default()
            }),
        }
    }

    pub fn describe(&self, verbose: bool) -> String {
        let mut out = String::new();
        let _ = write!(out, "Rotate:\n{}", self.rotation);
        let _ = writeln!(
            out,
            "Translate:  ({:.3}, {:.3}, {:.3})\nScale:  {:.3}\nUnknown Index:  {}\nBones:  {}",
            self.translation.x,
            self.translation.y,
            self.translation.z,
            self.scale,
            self.unknown_index,
            self.bindings.len()
        );
        for (i, binding) in self.bindings.iter().enumerate() {
            match binding.bone() {
                Some(bone) => {
                    let _ = writeln!(out, "Bone {}:  {}", i + 1, bone);
                }
                None => {
                    let _ = writeln!(out, "Bone {}:  (unbound)", i + 1);
                }
            }
            let _ = write!(out, "   Offset:\n{}", binding.offset_matrix());
            let _ = writeln!(
                out,
                "   Scale:  {:.3}\n   Unknown Floats:  {:?}\n   Weights:  {}",
                binding.scale,
                binding.unknown_floats,
                binding.weights.len()
            );
            if verbose {
                for (vertex, weight) in &binding.weights {
                    let _ = writeln!(out, "      Vertex:  {}  Weight:  {:.3}", vertex, weight);
                }
            } else if !binding.weights.is_empty() {
                out.push_str("      <<Data Not Shown>>\n");
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::parser::block_parsers::create_block;

    #[test]
    fn bones_bind_in_order_and_weights_follow() {
        let a = create_block("NiNode").unwrap();
        let b = create_block("NiNode").unwrap();
        let mut skin = SkinData {
            bindings: vec![BoneBinding::default(), BoneBinding::default()],
            ..Default::default()
        };
        assert!(skin.set_bones(std::slice::from_ref(&a)).is_err());
        skin.set_bones(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(skin.bones(), vec![a.clone(), b.clone()]);

        skin.add_bone(&b, BTreeMap::from([(3, 0.5)]));
        assert_eq!(skin.bindings.len(), 2);
        assert_eq!(skin.weights(&b).unwrap().get(&3), Some(&0.5));

        let c = create_block("NiNode").unwrap();
        skin.add_bone(&c, BTreeMap::new());
        assert_eq!(skin.bones().len(), 3);
    }

    #[test]
    fn offset_ignores_scale() {
        let binding = BoneBinding {
            translation: Vec3::new(1.0, 2.0, 3.0),
            scale: 4.0,
            ..Default::default()
        };
        let m = binding.offset_matrix();
        assert_eq!(m.0[0][0], 1.0);
        assert_eq!(m.translation(), Vec3::new(1.0, 2.0, 3.0));
    }
}
