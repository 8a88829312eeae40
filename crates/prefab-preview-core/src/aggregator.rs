//! World-space bounds of a node hierarchy.

use crate::bounds::Bounds;
use crate::scene::{NodeId, Scene};

/// Computes one world-space box enclosing every mesh renderer at or below `root`.
///
/// Every descendant is visited regardless of its active flag or whether its
/// renderer is enabled, so the result does not depend on visibility toggles.
/// If the subtree has no geometry, the result is a default box centered on
/// the root's world position. Any axis that ends up with zero extent is
/// clamped to half a unit.
#[must_use]
pub fn compute_world_bounds(scene: &Scene, root: NodeId) -> Bounds {
    match aggregate(scene, root) {
        Some(bounds) => bounds.with_min_extents(),
        None => {
            log::debug!("node {} has no geometry, using default bounds", root.index());
            Bounds::unit_at(scene.world_position(root))
        }
    }
}

/// Union of the node's own world box and the aggregate of each child.
fn aggregate(scene: &Scene, id: NodeId) -> Option<Bounds> {
    let node = scene.node(id)?;
    let own = own_world_bounds(scene, id);
    node.children()
        .iter()
        .filter_map(|child| aggregate(scene, *child))
        .fold(own, |acc, b| match acc {
            Some(acc) => Some(acc.union(&b)),
            None => Some(b),
        })
}

fn own_world_bounds(scene: &Scene, id: NodeId) -> Option<Bounds> {
    let node = scene.node(id)?;
    let renderer = node.mesh_renderer()?;
    renderer.world_bounds(&scene.local_to_world(id), node.transform().translation)
}
