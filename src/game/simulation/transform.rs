use bevy::prelude::*;

use super::components::{SimGlobalTransform, SimTransform};

/// Recompute world transforms top-down: roots copy their local transform,
/// children compose onto their parent's freshly computed global.
///
/// Descendants without a `SimTransform` end the walk for their subtree.
pub fn propagate_transforms(
    mut roots: Query<(Entity, &SimTransform, &mut SimGlobalTransform), Without<ChildOf>>,
    mut descendants: Query<(&SimTransform, &mut SimGlobalTransform), With<ChildOf>>,
    children: Query<&Children>,
) {
    for (entity, local, mut global) in roots.iter_mut() {
        global.0 = *local;
        propagate_children(entity, local, &mut descendants, &children);
    }
}

fn propagate_children(
    parent: Entity,
    parent_global: &SimTransform,
    descendants: &mut Query<(&SimTransform, &mut SimGlobalTransform), With<ChildOf>>,
    children: &Query<&Children>,
) {
    let Ok(kids) = children.get(parent) else { return };

    for child in kids.iter() {
        let Ok((local, mut global)) = descendants.get_mut(child) else { continue };
        let composed = parent_global.compose(local);
        global.0 = composed;
        propagate_children(child, &composed, descendants, children);
    }
}
