// src/nif/skeleton.rs
//
// Bone binding and bind-pose reconstruction for skinned meshes.

use crate::nif::error::{NifError, Result};
use crate::nif::types::{BlockRef, Capability, Matrix4x4};
use bevy_log::{debug, warn};

/// Runs [`bind_skin_instance`] on every skin instance in `blocks`.
pub fn bind_skins(blocks: &[BlockRef]) -> Result<()> {
    for instance in blocks
        .iter()
        .filter(|b| b.has_capability(Capability::SkinInstance))
    {
        bind_skin_instance(instance)?;
    }
    Ok(())
}

/// Hands the instance's bone list to its skin data, then straightens the skeleton and
/// moves the mesh into its bind pose.
pub fn bind_skin_instance(instance: &BlockRef) -> Result<()> {
    let (data, bones) = {
        let b = instance.borrow();
        b.require(Capability::SkinInstance)?;
        (
            b.require_attribute("Data")?.as_link()?,
            b.require_attribute("Bones")?.as_links()?,
        )
    };
    let Some(data) = data else {
        warn!("{} has no skin data, skipping", instance);
        return Ok(());
    };

    {
        let mut d = data.borrow_mut();
        let skin = d.skin_data_mut()?;
        if skin.bindings.len() != bones.len() {
            warn!(
                "{} lists {} live bones but its skin data has {} bindings, skipping",
                instance,
                bones.len(),
                skin.bindings.len()
            );
            return Ok(());
        }
        skin.set_bones(&bones)?;
    }
    debug!("Bound {} bones for {}", bones.len(), instance);

    straighten_skeleton(&data)?;
    reposition_tri_shape(&data)
}

/// For every bound bone whose first parent is also bound, sets the child's bind
/// position to `inverse(child offset) · parent offset`.
pub fn straighten_skeleton(skin_data: &BlockRef) -> Result<()> {
    let bound: Vec<(BlockRef, Matrix4x4)> = {
        let b = skin_data.borrow();
        b.skin_data()?
            .bindings
            .iter()
            .filter_map(|binding| binding.bone().map(|bone| (bone, binding.offset_matrix())))
            .collect()
    };

    for (parent_bone, parent_offset) in &bound {
        for (child_bone, child_offset) in &bound {
            if child_bone.parent().as_ref() != Some(parent_bone) {
                continue;
            }
            let child_pos = child_offset.inverse() * *parent_offset;
            child_bone.set_bind_position(child_pos)?;
        }
    }
    Ok(())
}

/// Sets the mesh bind position to `offset(first bone) · bind(first bone)`. The mesh
/// is the skin data's parent's parent.
pub fn reposition_tri_shape(skin_data: &BlockRef) -> Result<()> {
    let shape = skin_data
        .parent()
        .and_then(|instance| instance.parent())
        .ok_or_else(|| NifError::MissingParent(skin_data.to_string()))?;

    let first = {
        let b = skin_data.borrow();
        b.skin_data()?
            .bindings
            .first()
            .map(|binding| (binding.bone(), binding.offset_matrix()))
    };
    let Some((bone, offset)) = first else {
        warn!("Cannot reposition {}: its skin has no bones", shape);
        return Ok(());
    };
    let Some(bone) = bone else {
        warn!("Cannot reposition {}: first bone is not bound", shape);
        return Ok(());
    };

    let bone_bind = bone.bind_position()?;
    shape.set_bind_position(offset * bone_bind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::parser::block_parsers::create_block;
    use crate::nif::types::{BoneBinding, Matrix3x3};
    use bevy_math::Vec3;

    fn binding(rotation: Matrix3x3, translation: Vec3) -> BoneBinding {
        BoneBinding {
            rotation,
            translation,
            ..Default::default()
        }
    }

    /// shape -> instance -> data, with two bones where `child` hangs under `root`.
    fn skinned_scene() -> (BlockRef, BlockRef, BlockRef, BlockRef, BlockRef) {
        let shape = create_block("NiTriShape").unwrap();
        let instance = create_block("NiSkinInstance").unwrap();
        let data = create_block("NiSkinData").unwrap();
        let root = create_block("NiNode").unwrap();
        let child = create_block("NiNode").unwrap();

        shape.set_link("Skin Instance", Some(&instance)).unwrap();
        instance.set_link("Data", Some(&data)).unwrap();
        root.add_link("Children", &child).unwrap();
        instance.add_link("Bones", &root).unwrap();
        instance.add_link("Bones", &child).unwrap();

        let quarter_turn = Matrix3x3([[0.0, 1.0, 0.0], [-1.0, 0.0, 0.0], [0.0, 0.0, 1.0]]);
        {
            let mut d = data.borrow_mut();
            let skin = d.skin_data_mut().unwrap();
            skin.bindings.push(binding(Matrix3x3::default(), Vec3::new(0.0, 0.0, -1.0)));
            skin.bindings.push(binding(quarter_turn, Vec3::new(2.0, 0.0, 0.0)));
        }
        (shape, instance, data, root, child)
    }

    #[test]
    fn straighten_uses_inverse_child_times_parent() {
        let (_shape, instance, data, root, child) = skinned_scene();
        bind_skin_instance(&instance).unwrap();

        let (parent_offset, child_offset) = {
            let d = data.borrow();
            let skin = d.skin_data().unwrap();
            assert_eq!(skin.bones(), vec![root.clone(), child.clone()]);
            (
                skin.bindings[0].offset_matrix(),
                skin.bindings[1].offset_matrix(),
            )
        };
        let expected = child_offset.inverse() * parent_offset;
        assert!(child.bind_position().unwrap().approx_eq(&expected, 1e-5));
        // the root has no bound parent and keeps its identity bind
        assert_eq!(root.bind_position().unwrap(), Matrix4x4::IDENTITY);
    }

    #[test]
    fn reposition_places_mesh_at_first_bone() {
        let (shape, instance, data, root, _child) = skinned_scene();
        let root_bind = Matrix4x4::from_transform(&Matrix3x3::default(), Vec3::Y, 1.0);
        root.set_bind_position(root_bind).unwrap();
        bind_skin_instance(&instance).unwrap();

        let offset = data.borrow().skin_data().unwrap().bindings[0].offset_matrix();
        assert!(shape
            .bind_position()
            .unwrap()
            .approx_eq(&(offset * root_bind), 1e-6));
    }

    #[test]
    fn reposition_without_grandparent_fails() {
        let data = create_block("NiSkinData").unwrap();
        assert!(matches!(
            reposition_tri_shape(&data),
            Err(NifError::MissingParent(_))
        ));
    }

    #[test]
    fn bone_count_mismatch_is_skipped() {
        let (shape, instance, data, _root, child) = skinned_scene();
        instance.remove_link("Bones", &child).unwrap();
        bind_skin_instance(&instance).unwrap();
        assert!(data.borrow().skin_data().unwrap().bones().is_empty());
        assert_eq!(shape.bind_position().unwrap(), Matrix4x4::IDENTITY);
    }
}
