//! Core abstractions for prefab-preview.
//!
//! This crate provides the fundamental types used throughout prefab-preview:
//! - [`Bounds`] axis-aligned boxes and the transform-bounds routine
//! - [`Transform`] local transforms for scene nodes
//! - [`Scene`] hierarchy of nodes carrying mesh renderers and behaviours
//! - [`PrefabDefinition`] serializable object templates
//! - [`compute_world_bounds`] and [`compute_frame`], the automatic framing core
//! - [`PreviewOptions`] capture configuration

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Scene nodes and prefab definitions share field names on purpose
#![allow(clippy::struct_field_names)]

pub mod aggregator;
pub mod bounds;
pub mod error;
pub mod framing;
pub mod options;
pub mod prefab;
pub mod scene;
pub mod transform;

pub use aggregator::compute_world_bounds;
pub use bounds::{Bounds, DEFAULT_EXTENTS};
pub use error::{PreviewError, Result};
pub use framing::{compute_frame, CameraFrame};
pub use options::{CaptureMode, PreviewOptions, ProjectionMode, DEFAULT_BACKGROUND};
pub use prefab::{PrefabAssetType, PrefabDefinition, PrefabLink, PrefabNodeDef};
pub use scene::{Behaviour, Component, Mesh, MeshRenderer, Node, NodeId, Scene, MAX_LAYERS};
pub use transform::{euler_degrees_to_quat, Transform};

// Re-export glam types for convenience
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
