// src/nif/scene.rs
//
// Transform queries for blocks with the Node capability.

use crate::nif::error::Result;
use crate::nif::types::{BlockRef, Capability, Matrix4x4};
use std::collections::HashSet;

impl BlockRef {
    /// Rotation scaled by the uniform scale, translation in the bottom row.
    pub fn local_transform(&self) -> Result<Matrix4x4> {
        let block = self.borrow();
        block.require(Capability::Node)?;
        let rotation = block.require_attribute("Rotation")?.as_matrix()?;
        let translation = block.require_attribute("Translation")?.as_float3()?;
        let scale = block.require_attribute("Scale")?.as_float()?;
        Ok(Matrix4x4::from_transform(&rotation, translation, scale))
    }

    /// `parent.world · local`, walking first parents while they are nodes.
    pub fn world_transform(&self) -> Result<Matrix4x4> {
        let mut world = self.local_transform()?;
        let mut visited = HashSet::from([self.clone()]);
        let mut current = self.parent();
        while let Some(parent) = current {
            if !parent.has_capability(Capability::Node) || !visited.insert(parent.clone()) {
                break;
            }
            world = parent.local_transform()? * world;
            current = parent.parent();
        }
        Ok(world)
    }

    pub fn bind_position(&self) -> Result<Matrix4x4> {
        self.borrow().bind_position()
    }

    pub fn set_bind_position(&self, m: Matrix4x4) -> Result<()> {
        self.borrow_mut().set_bind_position(m)
    }

    /// Bind position relative to the parent's bind position.
    pub fn local_bind_position(&self) -> Result<Matrix4x4> {
        let bind = self.bind_position()?;
        match self.parent() {
            Some(parent) if parent.has_capability(Capability::Node) => {
                Ok(bind * parent.bind_position()?.inverse())
            }
            _ => Ok(bind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nif::parser::block_parsers::create_block;
    use crate::nif::types::{AttrValue, Matrix3x3};
    use bevy_math::Vec3;

    fn node_at(translation: Vec3, scale: f32) -> BlockRef {
        let node = create_block("NiNode").unwrap();
        {
            let mut b = node.borrow_mut();
            b.attribute_mut("Translation")
                .unwrap()
                .set(AttrValue::Float3(translation))
                .unwrap();
            b.attribute_mut("Scale")
                .unwrap()
                .set(AttrValue::Float(scale))
                .unwrap();
        }
        node
    }

    #[test]
    fn world_transform_composes_parent_chain() {
        let a = node_at(Vec3::new(1.0, 0.0, 0.0), 1.0);
        let b = node_at(Vec3::new(0.0, 2.0, 0.0), 2.0);
        let c = node_at(Vec3::new(0.0, 0.0, 3.0), 1.0);
        a.add_link("Children", &b).unwrap();
        b.add_link("Children", &c).unwrap();

        let expected = a.local_transform().unwrap()
            * b.local_transform().unwrap()
            * c.local_transform().unwrap();
        assert!(c.world_transform().unwrap().approx_eq(&expected, 1e-6));
        assert_eq!(a.world_transform().unwrap(), a.local_transform().unwrap());

        // scale lands on the diagonal, translation in the bottom row
        let local_b = b.local_transform().unwrap();
        assert_eq!(local_b.0[1][1], 2.0);
        assert_eq!(local_b.translation(), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn world_transform_stops_at_non_node_parent() {
        let node = node_at(Vec3::X, 1.0);
        let instance = create_block("NiSkinInstance").unwrap();
        node.add_parent(&instance);
        assert_eq!(node.world_transform().unwrap(), node.local_transform().unwrap());
    }

    #[test]
    fn world_transform_survives_parent_cycle() {
        let a = node_at(Vec3::X, 1.0);
        let b = node_at(Vec3::Y, 1.0);
        a.add_link("Children", &b).unwrap();
        b.add_link("Children", &a).unwrap();
        let world = a.world_transform().unwrap();
        let expected = b.local_transform().unwrap() * a.local_transform().unwrap();
        assert!(world.approx_eq(&expected, 1e-6));
    }

    #[test]
    fn local_bind_position_divides_out_parent() {
        let parent = node_at(Vec3::ZERO, 1.0);
        let child = node_at(Vec3::ZERO, 1.0);
        parent.add_link("Children", &child).unwrap();

        let identity = Matrix3x3::default();
        let parent_bind = Matrix4x4::from_transform(&identity, Vec3::new(0.0, 5.0, 0.0), 1.0);
        let child_bind = Matrix4x4::from_transform(&identity, Vec3::new(1.0, 5.0, 0.0), 1.0);
        parent.set_bind_position(parent_bind).unwrap();
        child.set_bind_position(child_bind).unwrap();

        let local = child.local_bind_position().unwrap();
        assert!(local.approx_eq(&(child_bind * parent_bind.inverse()), 1e-6));
        assert!((local.translation() - Vec3::X).length() < 1e-6);
        assert_eq!(parent.local_bind_position().unwrap(), parent_bind);
    }
}
