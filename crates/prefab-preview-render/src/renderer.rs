//! Offscreen renderer interface.

use glam::Mat4;
use prefab_preview_core::{MeshRenderer, NodeId, Scene};

use crate::camera::PreviewCamera;
use crate::error::RenderResult;
use crate::pixels::PixelBuffer;
use crate::target::{TargetDescriptor, TargetId};

/// Something that can render a scene into an offscreen target and read it back.
///
/// A renderer is borrowed mutably for the whole capture, so captures on the
/// same renderer are serialized.
pub trait OffscreenRenderer {
    /// Acquires a temporary target matching `desc`.
    fn acquire_target(&mut self, desc: &TargetDescriptor) -> RenderResult<TargetId>;

    /// Clears `target` to the camera background and draws every visible mesh
    /// renderer in `scene` (see [`visible_renderers`]).
    fn render(&mut self, target: TargetId, scene: &Scene, camera: &PreviewCamera) -> RenderResult<()>;

    /// Copies the full extent of `target` into a new pixel buffer.
    fn read_pixels(&mut self, target: TargetId) -> RenderResult<PixelBuffer>;

    /// Returns `target` to the pool. Unknown ids are ignored.
    fn release_target(&mut self, target: TargetId);

    /// Number of targets currently acquired and not yet released.
    fn targets_in_use(&self) -> usize;
}

/// A mesh renderer selected for drawing, with its local-to-world matrix.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    /// Owning node.
    pub node: NodeId,
    /// The renderer.
    pub renderer: &'a MeshRenderer,
    /// Local-to-world matrix of the node.
    pub local_to_world: Mat4,
}

/// Mesh renderers a camera sees: enabled, on an active-in-hierarchy node,
/// and on a layer in the camera's culling mask.
pub fn visible_renderers<'a>(
    scene: &'a Scene,
    camera: &'a PreviewCamera,
) -> impl Iterator<Item = DrawItem<'a>> + 'a {
    scene.iter().filter_map(move |(id, node)| {
        let renderer = node.mesh_renderer()?;
        if !renderer.enabled || !camera.renders_layer(node.layer()) || !scene.active_in_hierarchy(id) {
            return None;
        }
        Some(DrawItem {
            node: id,
            renderer,
            local_to_world: scene.local_to_world(id),
        })
    })
}

/// A render target that is released back to its renderer when dropped.
pub struct ScopedTarget<'r, R: OffscreenRenderer + ?Sized> {
    renderer: &'r mut R,
    id: TargetId,
}

impl<'r, R: OffscreenRenderer + ?Sized> ScopedTarget<'r, R> {
    /// Acquires a target from `renderer`.
    pub fn acquire(renderer: &'r mut R, desc: &TargetDescriptor) -> RenderResult<Self> {
        let id = renderer.acquire_target(desc)?;
        Ok(Self { renderer, id })
    }

    /// Id of the held target.
    #[must_use]
    pub fn id(&self) -> TargetId {
        self.id
    }

    /// Renders `scene` into the held target.
    pub fn render(&mut self, scene: &Scene, camera: &PreviewCamera) -> RenderResult<()> {
        self.renderer.render(self.id, scene, camera)
    }

    /// Reads back the held target.
    pub fn read_pixels(&mut self) -> RenderResult<PixelBuffer> {
        self.renderer.read_pixels(self.id)
    }
}

impl<R: OffscreenRenderer + ?Sized> Drop for ScopedTarget<'_, R> {
    fn drop(&mut self) {
        self.renderer.release_target(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pixels::color_to_rgba8;
    use crate::target::TargetPool;
    use prefab_preview_core::{Component, Mesh, Transform, Vec3};

    #[derive(Default)]
    struct FlatRenderer {
        pool: TargetPool<()>,
        last_draw_count: usize,
        background: [u8; 4],
    }

    impl OffscreenRenderer for FlatRenderer {
        fn acquire_target(&mut self, desc: &TargetDescriptor) -> RenderResult<TargetId> {
            self.pool.acquire(desc, |_| Ok(()))
        }

        fn render(&mut self, target: TargetId, scene: &Scene, camera: &PreviewCamera) -> RenderResult<()> {
            self.pool.get(target)?;
            self.last_draw_count = visible_renderers(scene, camera).count();
            self.background = color_to_rgba8(camera.background_color);
            Ok(())
        }

        fn read_pixels(&mut self, target: TargetId) -> RenderResult<PixelBuffer> {
            let (desc, ()) = self.pool.get(target)?;
            Ok(PixelBuffer::filled(desc.width, desc.height, self.background))
        }

        fn release_target(&mut self, target: TargetId) {
            self.pool.release(target);
        }

        fn targets_in_use(&self) -> usize {
            self.pool.in_use()
        }
    }

    fn mesh() -> Component {
        Component::MeshRenderer(MeshRenderer::new(Mesh::cuboid(Vec3::ONE)))
    }

    #[test]
    fn test_visible_renderers_respects_layer_and_active() {
        let mut scene = Scene::new();
        let root = scene.spawn("root", Transform::identity());
        scene.add_component(root, mesh()).unwrap();
        let other_layer = scene.spawn_child(root, "other", Transform::identity()).unwrap();
        scene.add_component(other_layer, mesh()).unwrap();
        scene.set_layer(other_layer, 8).unwrap();
        let hidden = scene.spawn_child(root, "hidden", Transform::identity()).unwrap();
        scene.add_component(hidden, mesh()).unwrap();
        scene.set_active(hidden, false).unwrap();

        let mut camera = PreviewCamera::new(1.0);
        camera.set_culling_layer(0);
        let nodes: Vec<NodeId> = visible_renderers(&scene, &camera).map(|d| d.node).collect();
        assert_eq!(nodes, vec![root]);
    }

    #[test]
    fn test_scoped_target_releases_on_drop() {
        let mut renderer = FlatRenderer::default();
        let scene = Scene::new();
        let camera = PreviewCamera::new(1.0);
        {
            let mut target = ScopedTarget::acquire(&mut renderer, &TargetDescriptor::new(8, 4, 24)).unwrap();
            target.render(&scene, &camera).unwrap();
            let pixels = target.read_pixels().unwrap();
            assert_eq!((pixels.width(), pixels.height()), (8, 4));
            assert_eq!(pixels.pixel(0, 0), Some([240, 240, 240, 255]));
        }
        assert_eq!(renderer.last_draw_count, 0);
        assert_eq!(renderer.targets_in_use(), 0);
    }

    #[test]
    fn test_scoped_target_releases_on_error_path() {
        fn fail_midway(renderer: &mut FlatRenderer) -> RenderResult<()> {
            let _target = ScopedTarget::acquire(renderer, &TargetDescriptor::default())?;
            Err(crate::error::RenderError::BufferMapFailed)
        }

        let mut renderer = FlatRenderer::default();
        assert!(fail_midway(&mut renderer).is_err());
        assert_eq!(renderer.targets_in_use(), 0);
    }
}
