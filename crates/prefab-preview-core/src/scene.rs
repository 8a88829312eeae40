//! Scene hierarchy.
//!
//! A [`Scene`] is an arena of [`Node`]s. Each node has a local [`Transform`]
//! relative to its parent, an active flag, a rendering layer, and a list of
//! [`Component`]s. Mesh renderers are the only components that contribute
//! geometry; behaviours are opaque scripts identified by their type path.

use glam::{Mat4, Quat, Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::bounds::Bounds;
use crate::error::{PreviewError, Result};
use crate::prefab::PrefabLink;
use crate::transform::Transform;

/// Number of rendering layers a node can be assigned to.
pub const MAX_LAYERS: u8 = 32;

/// Handle to a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(usize);

impl NodeId {
    /// Returns the arena slot index of this node.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// Triangle geometry in a node's local space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    /// Vertex positions.
    pub positions: Vec<Vec3>,
    /// Triangle vertex indices.
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    /// Creates a mesh from positions and triangles.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        Self {
            positions,
            triangles,
        }
    }

    /// An axis-aligned box centered on the origin with the given half-size.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let positions = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let triangles = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 6, 2],
            [3, 7, 6],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self::new(positions, triangles)
    }

    /// A flat quad in the XZ plane, facing +Y.
    pub fn quad(half_x: f32, half_z: f32) -> Self {
        let positions = vec![
            Vec3::new(-half_x, 0.0, -half_z),
            Vec3::new(half_x, 0.0, -half_z),
            Vec3::new(half_x, 0.0, half_z),
            Vec3::new(-half_x, 0.0, half_z),
        ];
        Self::new(positions, vec![[0, 2, 1], [0, 3, 2]])
    }

    /// Returns the local-space bounding box, or `None` for an empty mesh.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.positions.iter().copied())
    }
}

/// A component that draws a mesh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshRenderer {
    /// Geometry in the owning node's local space.
    pub mesh: Mesh,
    /// Base color (RGBA, linear).
    #[serde(default = "default_renderer_color")]
    pub color: Vec4,
    /// Whether the renderer draws.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// World bounds as last reported by a host engine, if any.
    ///
    /// Cleared whenever the owning node or one of its ancestors moves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_bounds: Option<Bounds>,
}

fn default_renderer_color() -> Vec4 {
    Vec4::new(0.8, 0.8, 0.8, 1.0)
}

fn default_true() -> bool {
    true
}

impl MeshRenderer {
    /// Creates an enabled renderer with the default color.
    pub fn new(mesh: Mesh) -> Self {
        Self {
            mesh,
            color: default_renderer_color(),
            enabled: true,
            reported_bounds: None,
        }
    }

    /// Sets the base color.
    #[must_use]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }

    /// Sets the host-reported world bounds.
    #[must_use]
    pub fn with_reported_bounds(mut self, bounds: Bounds) -> Self {
        self.reported_bounds = Some(bounds);
        self
    }

    /// Local-space bounding box of the mesh.
    #[must_use]
    pub fn local_bounds(&self) -> Option<Bounds> {
        self.mesh.local_bounds()
    }

    /// World-space bounding box of this renderer.
    ///
    /// Host-reported bounds are trusted unless they have zero size and a
    /// center that differs from the node's local position; such a box comes
    /// from a bounds query that was not valid yet. In that case, or when no
    /// bounds were reported, the local box is transformed to world space.
    #[must_use]
    pub fn world_bounds(&self, local_to_world: &Mat4, local_position: Vec3) -> Option<Bounds> {
        match self.reported_bounds {
            Some(reported) if !(reported.is_empty() && reported.center != local_position) => {
                Some(reported)
            }
            _ => self
                .local_bounds()
                .map(|local| local.transformed(local_to_world)),
        }
    }
}

/// A script attached to a node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Behaviour {
    /// Fully-qualified type path, e.g. `engine::rendering::LodGroup`.
    pub type_path: String,
    /// Whether the behaviour runs.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Behaviour {
    /// Creates an enabled behaviour.
    pub fn new(type_path: impl Into<String>) -> Self {
        Self {
            type_path: type_path.into(),
            enabled: true,
        }
    }

    /// Returns true if the type path lives under one of `namespaces`.
    #[must_use]
    pub fn is_in_namespaces(&self, namespaces: &[String]) -> bool {
        namespaces.iter().any(|ns| self.type_path.starts_with(ns.as_str()))
    }
}

/// A component attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Component {
    /// Geometry that is drawn and contributes to bounds.
    MeshRenderer(MeshRenderer),
    /// A script.
    Behaviour(Behaviour),
}

/// A node in the scene hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    name: String,
    transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    active_self: bool,
    layer: u8,
    components: Vec<Component>,
    prefab: Option<PrefabLink>,
}

impl Node {
    fn new(name: String, transform: Transform) -> Self {
        Self {
            name,
            transform,
            parent: None,
            children: Vec::new(),
            active_self: true,
            layer: 0,
            components: Vec::new(),
            prefab: None,
        }
    }

    /// Returns the node name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the local transform.
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Returns the parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Returns the children in insertion order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Returns the node's own active flag (ignores ancestors).
    #[must_use]
    pub fn active_self(&self) -> bool {
        self.active_self
    }

    /// Returns the rendering layer.
    #[must_use]
    pub fn layer(&self) -> u8 {
        self.layer
    }

    /// Returns the attached components.
    #[must_use]
    pub fn components(&self) -> &[Component] {
        &self.components
    }

    /// Returns the prefab link, if this node is a prefab instance root.
    #[must_use]
    pub fn prefab(&self) -> Option<&PrefabLink> {
        self.prefab.as_ref()
    }

    /// Returns the first mesh renderer on this node.
    #[must_use]
    pub fn mesh_renderer(&self) -> Option<&MeshRenderer> {
        self.components.iter().find_map(|c| match c {
            Component::MeshRenderer(r) => Some(r),
            Component::Behaviour(_) => None,
        })
    }

    /// Iterates over the attached behaviours.
    pub fn behaviours(&self) -> impl Iterator<Item = &Behaviour> {
        self.components.iter().filter_map(|c| match c {
            Component::Behaviour(b) => Some(b),
            Component::MeshRenderer(_) => None,
        })
    }
}

/// An arena-backed node hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of live nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    /// Returns true if the scene has no live nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if `id` refers to a live node.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Gets a node by id.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Gets a node by id, failing with [`PreviewError::NodeNotFound`].
    pub fn get(&self, id: NodeId) -> Result<&Node> {
        self.node(id).ok_or(PreviewError::NodeNotFound(id.0))
    }

    fn get_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(PreviewError::NodeNotFound(id.0))
    }

    /// Iterates over all live nodes.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| n.as_ref().map(|n| (NodeId(i), n)))
    }

    /// Adds a root node.
    pub fn spawn(&mut self, name: impl Into<String>, transform: Transform) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(Node::new(name.into(), transform)));
        id
    }

    /// Adds a node under `parent`; `transform` is relative to the parent.
    pub fn spawn_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<NodeId> {
        self.get(parent)?;
        let id = self.spawn(name, transform);
        self.get_mut(id)?.parent = Some(parent);
        self.get_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Attaches a component to a node.
    pub fn add_component(&mut self, id: NodeId, component: Component) -> Result<()> {
        self.get_mut(id)?.components.push(component);
        Ok(())
    }

    /// Marks a node as the root of a prefab instance.
    pub fn set_prefab_link(&mut self, id: NodeId, link: Option<PrefabLink>) -> Result<()> {
        self.get_mut(id)?.prefab = link;
        Ok(())
    }

    /// Sets the host-reported world bounds of a node's mesh renderers.
    pub fn set_reported_bounds(&mut self, id: NodeId, bounds: Option<Bounds>) -> Result<()> {
        for component in &mut self.get_mut(id)?.components {
            if let Component::MeshRenderer(renderer) = component {
                renderer.reported_bounds = bounds;
            }
        }
        Ok(())
    }

    /// Returns `id` and all of its descendants in pre-order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.node(current) else {
                continue;
            };
            out.push(current);
            stack.extend(node.children.iter().rev().copied());
        }
        out
    }

    /// Local-to-world matrix of a node.
    #[must_use]
    pub fn local_to_world(&self, id: NodeId) -> Mat4 {
        let mut matrix = Mat4::IDENTITY;
        let mut current = self.node(id);
        while let Some(node) = current {
            matrix = node.transform.to_matrix() * matrix;
            current = node.parent.and_then(|p| self.node(p));
        }
        matrix
    }

    fn parent_to_world(&self, id: NodeId) -> Mat4 {
        self.node(id)
            .and_then(|n| n.parent)
            .map_or(Mat4::IDENTITY, |p| self.local_to_world(p))
    }

    /// World-space position of a node.
    #[must_use]
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        self.local_to_world(id).w_axis.truncate()
    }

    /// World-space rotation of a node (product of ancestor rotations).
    #[must_use]
    pub fn world_rotation(&self, id: NodeId) -> Quat {
        let mut rotation = Quat::IDENTITY;
        let mut current = self.node(id);
        while let Some(node) = current {
            rotation = node.transform.rotation * rotation;
            current = node.parent.and_then(|p| self.node(p));
        }
        rotation.normalize()
    }

    /// Moves a node so that its world position is `position`.
    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) -> Result<()> {
        let local = self.parent_to_world(id).inverse().transform_point3(position);
        self.get_mut(id)?.transform.translation = local;
        self.clear_reported_bounds(id);
        Ok(())
    }

    /// Rotates a node so that its world rotation is `rotation`.
    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Quat) -> Result<()> {
        let parent_rotation = match self.get(id)?.parent {
            Some(p) => self.world_rotation(p),
            None => Quat::IDENTITY,
        };
        self.get_mut(id)?.transform.rotation = (parent_rotation.inverse() * rotation).normalize();
        self.clear_reported_bounds(id);
        Ok(())
    }

    /// Replaces a node's local transform.
    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform) -> Result<()> {
        self.get_mut(id)?.transform = transform;
        self.clear_reported_bounds(id);
        Ok(())
    }

    /// Sets a node's local scale.
    pub fn set_local_scale(&mut self, id: NodeId, scale: Vec3) -> Result<()> {
        self.get_mut(id)?.transform.scale = scale;
        self.clear_reported_bounds(id);
        Ok(())
    }

    /// Re-parents a node.
    ///
    /// With `keep_world` the local transform is recomputed so the node stays
    /// where it is in world space; otherwise the local transform is kept.
    /// Parenting a node under itself or one of its descendants is ignored.
    pub fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>, keep_world: bool) -> Result<()> {
        if let Some(p) = parent {
            self.get(p)?;
            if self.descendants(id).contains(&p) {
                log::warn!("ignoring re-parent of node {} under its own descendant", id.0);
                return Ok(());
            }
        }

        let world = self.local_to_world(id);
        if let Some(old) = self.get(id)?.parent {
            self.get_mut(old)?.children.retain(|c| *c != id);
        }
        self.get_mut(id)?.parent = parent;
        if let Some(p) = parent {
            self.get_mut(p)?.children.push(id);
        }

        if keep_world {
            let local = self.parent_to_world(id).inverse() * world;
            self.get_mut(id)?.transform = Transform::from_matrix(local);
        } else {
            self.clear_reported_bounds(id);
        }
        Ok(())
    }

    /// Drops host-reported bounds at or below `id`; they describe the old pose.
    fn clear_reported_bounds(&mut self, id: NodeId) {
        for node in self.descendants(id) {
            let Some(Some(node)) = self.nodes.get_mut(node.0) else {
                continue;
            };
            for component in &mut node.components {
                if let Component::MeshRenderer(renderer) = component {
                    renderer.reported_bounds = None;
                }
            }
        }
    }

    /// Sets a node's own active flag.
    pub fn set_active(&mut self, id: NodeId, active: bool) -> Result<()> {
        self.get_mut(id)?.active_self = active;
        Ok(())
    }

    /// Returns true if the node and all of its ancestors are active.
    #[must_use]
    pub fn active_in_hierarchy(&self, id: NodeId) -> bool {
        let mut current = self.node(id);
        while let Some(node) = current {
            if !node.active_self {
                return false;
            }
            current = node.parent.and_then(|p| self.node(p));
        }
        true
    }

    /// Sets a node's rendering layer.
    pub fn set_layer(&mut self, id: NodeId, layer: u8) -> Result<()> {
        self.get_mut(id)?.layer = layer.min(MAX_LAYERS - 1);
        Ok(())
    }

    /// Sets the rendering layer of a node and every descendant.
    pub fn set_layer_recursively(&mut self, id: NodeId, layer: u8) -> Result<()> {
        for node in self.descendants(id) {
            self.set_layer(node, layer)?;
        }
        Ok(())
    }

    /// Nodes at or below `id` that carry a mesh renderer.
    ///
    /// When `include_inactive` is false only renderers that are enabled on an
    /// active-in-hierarchy node are returned.
    #[must_use]
    pub fn renderers_in_children(&self, id: NodeId, include_inactive: bool) -> Vec<NodeId> {
        self.descendants(id)
            .into_iter()
            .filter(|n| {
                self.node(*n)
                    .and_then(Node::mesh_renderer)
                    .is_some_and(|r| include_inactive || (r.enabled && self.active_in_hierarchy(*n)))
            })
            .collect()
    }

    /// Removes components at or below `id` for which `keep` returns false.
    ///
    /// Returns the number of components removed.
    pub fn retain_components(
        &mut self,
        id: NodeId,
        mut keep: impl FnMut(&Component) -> bool,
    ) -> Result<usize> {
        let mut removed = 0;
        for node in self.descendants(id) {
            let components = &mut self.get_mut(node)?.components;
            let before = components.len();
            components.retain(&mut keep);
            removed += before - components.len();
        }
        Ok(removed)
    }

    /// Deep-copies the subtree rooted at `source` as a new root node placed at
    /// the given world position and rotation. Local scale, active flags,
    /// layers, components and the prefab link are copied.
    pub fn instantiate(&mut self, source: NodeId, position: Vec3, rotation: Quat) -> Result<NodeId> {
        let root = self.copy_subtree(source, None)?;
        self.set_world_position(root, position)?;
        self.set_world_rotation(root, rotation)?;
        Ok(root)
    }

    fn copy_subtree(&mut self, source: NodeId, parent: Option<NodeId>) -> Result<NodeId> {
        let mut copy = self.get(source)?.clone();
        let children = std::mem::take(&mut copy.children);
        copy.parent = parent;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Some(copy));
        if let Some(p) = parent {
            self.get_mut(p)?.children.push(id);
        }
        for child in children {
            self.copy_subtree(child, Some(id))?;
        }
        Ok(id)
    }

    /// Removes a node and its whole subtree.
    pub fn destroy(&mut self, id: NodeId) -> Result<()> {
        let parent = self.get(id)?.parent;
        if let Some(p) = parent {
            self.get_mut(p)?.children.retain(|c| *c != id);
        }
        for node in self.descendants(id) {
            self.nodes[node.0] = None;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-4
    }

    #[test]
    fn test_world_position_composes_parents() {
        let mut scene = Scene::new();
        let root = scene.spawn(
            "root",
            Transform::from_translation(Vec3::new(1.0, 0.0, 0.0)).with_scale(Vec3::splat(2.0)),
        );
        let child = scene
            .spawn_child(root, "child", Transform::from_translation(Vec3::new(0.0, 1.0, 0.0)))
            .unwrap();
        assert!(approx(scene.world_position(child), Vec3::new(1.0, 2.0, 0.0)));
    }

    #[test]
    fn test_set_world_position_under_rotated_parent() {
        let mut scene = Scene::new();
        let root = scene.spawn(
            "root",
            Transform::from_rotation(Quat::from_rotation_y(std::f32::consts::FRAC_PI_2)),
        );
        let child = scene.spawn_child(root, "child", Transform::identity()).unwrap();
        scene.set_world_position(child, Vec3::new(3.0, 0.0, 0.0)).unwrap();
        assert!(approx(scene.world_position(child), Vec3::new(3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_active_in_hierarchy() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::identity());
        let child = scene.spawn_child(root, "child", Transform::identity()).unwrap();
        assert!(scene.active_in_hierarchy(child));
        scene.set_active(root, false).unwrap();
        assert!(!scene.active_in_hierarchy(child));
        assert!(scene.node(child).unwrap().active_self());
    }

    #[test]
    fn test_renderers_in_children_filters_inactive() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::identity());
        let a = scene.spawn_child(root, "a", Transform::identity()).unwrap();
        let b = scene.spawn_child(root, "b", Transform::identity()).unwrap();
        let mesh = Component::MeshRenderer(MeshRenderer::new(Mesh::cuboid(Vec3::ONE)));
        scene.add_component(a, mesh.clone()).unwrap();
        scene.add_component(b, mesh).unwrap();
        scene.set_active(b, false).unwrap();

        assert_eq!(scene.renderers_in_children(root, false), vec![a]);
        assert_eq!(scene.renderers_in_children(root, true), vec![a, b]);
    }

    #[test]
    fn test_instantiate_and_destroy() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::identity());
        let child = scene
            .spawn_child(root, "child", Transform::from_translation(Vec3::X))
            .unwrap();
        scene.set_layer(child, 5).unwrap();

        let copy = scene
            .instantiate(root, Vec3::new(0.0, 10.0, 0.0), Quat::IDENTITY)
            .unwrap();
        assert_eq!(scene.len(), 4);
        let copy_child = scene.node(copy).unwrap().children()[0];
        assert_eq!(scene.node(copy_child).unwrap().layer(), 5);
        assert!(approx(scene.world_position(copy_child), Vec3::new(1.0, 10.0, 0.0)));

        scene.destroy(copy).unwrap();
        assert_eq!(scene.len(), 2);
        assert!(!scene.contains(copy_child));
        assert!(scene.contains(child));
    }

    #[test]
    fn test_set_parent_keep_world() {
        let mut scene = Scene::new();
        let a = scene.spawn("a", Transform::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        let b = scene.spawn("b", Transform::from_translation(Vec3::new(1.0, 1.0, 1.0)));
        scene.set_parent(b, Some(a), true).unwrap();
        assert!(approx(scene.world_position(b), Vec3::new(1.0, 1.0, 1.0)));
        assert_eq!(scene.node(a).unwrap().children(), &[b]);

        scene.set_parent(b, None, false).unwrap();
        assert!(approx(scene.world_position(b), Vec3::new(-4.0, 1.0, 1.0)));
        assert!(scene.node(a).unwrap().children().is_empty());
    }

    #[test]
    fn test_set_parent_rejects_cycles() {
        let mut scene = Scene::new();
        let a = scene.spawn("a", Transform::identity());
        let b = scene.spawn_child(a, "b", Transform::identity()).unwrap();
        scene.set_parent(a, Some(b), false).unwrap();
        assert_eq!(scene.node(a).unwrap().parent(), None);
    }

    #[test]
    fn test_retain_components() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::identity());
        let child = scene.spawn_child(root, "child", Transform::identity()).unwrap();
        scene
            .add_component(root, Component::Behaviour(Behaviour::new("game::Spinner")))
            .unwrap();
        scene
            .add_component(child, Component::Behaviour(Behaviour::new("engine::LodGroup")))
            .unwrap();
        let namespaces = vec!["engine::".to_string()];
        let removed = scene
            .retain_components(root, |c| match c {
                Component::Behaviour(b) => b.is_in_namespaces(&namespaces),
                Component::MeshRenderer(_) => true,
            })
            .unwrap();
        assert_eq!(removed, 1);
        assert_eq!(scene.node(child).unwrap().behaviours().count(), 1);
        assert_eq!(scene.node(root).unwrap().behaviours().count(), 0);
    }

    #[test]
    fn test_reported_bounds_quirk_falls_back_to_local() {
        let renderer = MeshRenderer::new(Mesh::cuboid(Vec3::ONE))
            .with_reported_bounds(Bounds::new(Vec3::new(9.0, 9.0, 9.0), Vec3::ZERO));
        let m = Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0));
        let b = renderer.world_bounds(&m, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(b.center, Vec3::new(2.0, 0.0, 0.0));
        assert_eq!(b.extents, Vec3::ONE);

        let trusted = MeshRenderer::new(Mesh::cuboid(Vec3::ONE))
            .with_reported_bounds(Bounds::new(Vec3::new(2.0, 0.0, 0.0), Vec3::splat(3.0)));
        let b = trusted.world_bounds(&m, Vec3::new(2.0, 0.0, 0.0)).unwrap();
        assert_eq!(b.extents, Vec3::splat(3.0));
    }

    #[test]
    fn test_moving_a_node_drops_reported_bounds() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::identity());
        let child = scene.spawn_child(root, "child", Transform::identity()).unwrap();
        let stale = Bounds::new(Vec3::ZERO, Vec3::ONE);
        scene
            .add_component(
                child,
                Component::MeshRenderer(
                    MeshRenderer::new(Mesh::cuboid(Vec3::ONE)).with_reported_bounds(stale),
                ),
            )
            .unwrap();

        let copy = scene
            .instantiate(root, Vec3::new(0.0, 1000.0, 0.0), Quat::IDENTITY)
            .unwrap();
        let copy_child = scene.node(copy).unwrap().children()[0];
        let copied = scene.node(copy_child).unwrap().mesh_renderer().unwrap();
        assert_eq!(copied.reported_bounds, None);
        let original = scene.node(child).unwrap().mesh_renderer().unwrap();
        assert_eq!(original.reported_bounds, Some(stale));

        scene.set_world_position(root, Vec3::new(5.0, 0.0, 0.0)).unwrap();
        let moved = scene.node(child).unwrap().mesh_renderer().unwrap();
        assert_eq!(moved.reported_bounds, None);
    }
}
