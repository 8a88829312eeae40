//! Prefab definitions.
//!
//! A [`PrefabDefinition`] is a serializable node tree. Instantiating one into a
//! [`Scene`] builds the nodes and stamps the root with a [`PrefabLink`], which
//! is what marks a node as a valid preview subject.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::scene::{Component, NodeId, Scene};
use crate::transform::Transform;

/// Kind of prefab asset a node is linked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PrefabAssetType {
    /// The node is not linked to any prefab asset.
    #[default]
    NotAPrefab,
    /// A regular prefab.
    Regular,
    /// A variant that overrides another prefab.
    Variant,
    /// An imported model.
    Model,
}

impl PrefabAssetType {
    /// Returns true for every kind except [`PrefabAssetType::NotAPrefab`].
    #[must_use]
    pub fn is_prefab(self) -> bool {
        self != PrefabAssetType::NotAPrefab
    }
}

/// Link from an instance root back to its prefab asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrefabLink {
    /// Name of the prefab asset.
    pub asset: String,
    /// Kind of the prefab asset.
    pub asset_type: PrefabAssetType,
}

/// One node of a prefab definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabNodeDef {
    /// Node name.
    pub name: String,
    /// Local transform.
    #[serde(default)]
    pub transform: Transform,
    /// Whether the node starts active.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Rendering layer.
    #[serde(default)]
    pub layer: u8,
    /// Attached components.
    #[serde(default)]
    pub components: Vec<Component>,
    /// Child nodes.
    #[serde(default)]
    pub children: Vec<PrefabNodeDef>,
}

fn default_active() -> bool {
    true
}

impl PrefabNodeDef {
    /// Creates an active node on layer 0 with no components or children.
    pub fn new(name: impl Into<String>, transform: Transform) -> Self {
        Self {
            name: name.into(),
            transform,
            active: true,
            layer: 0,
            components: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds a component.
    #[must_use]
    pub fn with_component(mut self, component: Component) -> Self {
        self.components.push(component);
        self
    }

    /// Adds a child node.
    #[must_use]
    pub fn with_child(mut self, child: PrefabNodeDef) -> Self {
        self.children.push(child);
        self
    }

    /// Sets the layer.
    #[must_use]
    pub fn with_layer(mut self, layer: u8) -> Self {
        self.layer = layer;
        self
    }

    /// Sets the active flag.
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

/// A reusable, serializable object template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrefabDefinition {
    /// Asset name.
    pub name: String,
    /// Asset kind. Defaults to [`PrefabAssetType::Regular`].
    #[serde(default = "default_asset_type")]
    pub asset_type: PrefabAssetType,
    /// Root node.
    pub root: PrefabNodeDef,
}

fn default_asset_type() -> PrefabAssetType {
    PrefabAssetType::Regular
}

impl PrefabDefinition {
    /// Creates a regular prefab definition.
    pub fn new(name: impl Into<String>, root: PrefabNodeDef) -> Self {
        Self {
            name: name.into(),
            asset_type: PrefabAssetType::Regular,
            root,
        }
    }

    /// Parses a definition from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a definition from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Serializes the definition to pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl Scene {
    /// Builds the nodes of `prefab` as a new root and links it to the asset.
    pub fn instantiate_prefab(&mut self, prefab: &PrefabDefinition) -> Result<NodeId> {
        let root = self.spawn(prefab.root.name.clone(), prefab.root.transform);
        self.apply_node_def(root, &prefab.root)?;
        self.set_prefab_link(
            root,
            Some(PrefabLink {
                asset: prefab.name.clone(),
                asset_type: prefab.asset_type,
            }),
        )?;
        log::debug!("instantiated prefab '{}' as node {}", prefab.name, root.index());
        Ok(root)
    }

    fn apply_node_def(&mut self, id: NodeId, def: &PrefabNodeDef) -> Result<()> {
        self.set_active(id, def.active)?;
        self.set_layer(id, def.layer)?;
        for component in &def.components {
            self.add_component(id, component.clone())?;
        }
        for child_def in &def.children {
            let child = self.spawn_child(id, child_def.name.clone(), child_def.transform)?;
            self.apply_node_def(child, child_def)?;
        }
        Ok(())
    }

    /// Asset type of the prefab `id` is linked to.
    #[must_use]
    pub fn prefab_asset_type(&self, id: NodeId) -> PrefabAssetType {
        self.node(id)
            .and_then(|n| n.prefab())
            .map_or(PrefabAssetType::NotAPrefab, |link| link.asset_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Mesh, MeshRenderer};
    use glam::Vec3;

    fn sample() -> PrefabDefinition {
        PrefabDefinition::new(
            "crate",
            PrefabNodeDef::new("crate", Transform::identity())
                .with_layer(4)
                .with_child(
                    PrefabNodeDef::new("lid", Transform::from_translation(Vec3::Y)).with_component(
                        Component::MeshRenderer(MeshRenderer::new(Mesh::cuboid(Vec3::splat(0.5)))),
                    ),
                ),
        )
    }

    #[test]
    fn test_instantiate_prefab_links_root() {
        let mut scene = Scene::new();
        let root = scene.instantiate_prefab(&sample()).unwrap();
        assert_eq!(scene.prefab_asset_type(root), PrefabAssetType::Regular);
        assert_eq!(scene.node(root).unwrap().layer(), 4);

        let lid = scene.node(root).unwrap().children()[0];
        assert_eq!(scene.prefab_asset_type(lid), PrefabAssetType::NotAPrefab);
        assert!(scene.node(lid).unwrap().mesh_renderer().is_some());
    }

    #[test]
    fn test_json_roundtrip() {
        let prefab = sample();
        let json = prefab.to_json_string().unwrap();
        let back = PrefabDefinition::from_json_str(&json).unwrap();
        assert_eq!(back, prefab);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "name": "lamp",
            "root": {
                "name": "lamp",
                "components": [
                    { "type": "behaviour", "type_path": "game::Flicker" }
                ]
            }
        }"#;
        let prefab = PrefabDefinition::from_json_str(json).unwrap();
        assert_eq!(prefab.asset_type, PrefabAssetType::Regular);
        assert!(prefab.root.active);
        assert_eq!(prefab.root.transform, Transform::identity());
        assert_eq!(prefab.root.components.len(), 1);
    }
}
