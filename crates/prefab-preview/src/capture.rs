//! Preview capture orchestration.
//!
//! A capture stages the subject away from the working area, frames it,
//! renders it into a temporary target and reads the pixels back. Staging is
//! held by a [`StagedSubject`] guard and the target by a [`ScopedTarget`], so
//! the scene and the renderer are put back in order on every exit path.

use glam::{Quat, Vec3};
use prefab_preview_core::{
    compute_frame, compute_world_bounds, Bounds, CaptureMode, Component, NodeId, PreviewError,
    PreviewOptions, Result, Scene, Transform,
};
use prefab_preview_render::{
    OffscreenRenderer, PreviewCamera, PreviewImage, RenderError, ScopedTarget, TargetDescriptor,
};

fn render_error(e: RenderError) -> PreviewError {
    PreviewError::Render(e.to_string())
}

/// Activates `node` and every ancestor up to and including `root`.
fn activate_path(scene: &mut Scene, node: NodeId, root: NodeId) -> Result<()> {
    let mut current = node;
    loop {
        scene.set_active(current, true)?;
        if current == root {
            return Ok(());
        }
        match scene.get(current)?.parent() {
            Some(parent) => current = parent,
            None => return Ok(()),
        }
    }
}

/// Per-node state recorded before an in-place capture.
#[derive(Debug, Clone, Copy)]
struct SavedNode {
    id: NodeId,
    layer: u8,
    active: bool,
    reported_bounds: Option<Bounds>,
}

/// Everything an in-place capture changes on the subject.
#[derive(Debug, Clone)]
struct SavedSubject {
    parent: Option<NodeId>,
    transform: Transform,
    nodes: Vec<SavedNode>,
}

#[derive(Debug)]
enum Staging {
    /// A transient copy that is destroyed on drop.
    Copy,
    /// The subject itself, restored on drop.
    InPlace(SavedSubject),
}

/// The subject while it is staged for capture.
///
/// Dropping the guard destroys the transient copy or restores the subject.
pub struct StagedSubject<'s> {
    scene: &'s mut Scene,
    root: NodeId,
    staging: Staging,
}

impl<'s> StagedSubject<'s> {
    /// Spawns a transient copy of `source` at the staging pose.
    ///
    /// The source is deactivated while it is copied, so the copy starts
    /// inactive. Behaviours outside `builtin_namespaces` are removed from
    /// the copy. The source's own active flag is restored before returning.
    pub fn instantiate(
        scene: &'s mut Scene,
        source: NodeId,
        position: Vec3,
        rotation: Quat,
        builtin_namespaces: &[String],
    ) -> Result<Self> {
        let was_active = scene.get(source)?.active_self();
        let source_rotation = scene.world_rotation(source);

        scene.set_active(source, false)?;
        let copied = scene.instantiate(source, position, rotation * source_rotation.inverse());
        scene.set_active(source, was_active)?;
        let root = copied?;

        let mut guard = Self {
            scene,
            root,
            staging: Staging::Copy,
        };

        let stripped = guard.scene.retain_components(root, |c| match c {
            Component::Behaviour(b) => b.is_in_namespaces(builtin_namespaces),
            Component::MeshRenderer(_) => true,
        })?;
        if stripped > 0 {
            log::debug!("stripped {stripped} behaviours from preview copy");
        }
        Ok(guard)
    }

    /// Moves `subject` itself to the staging pose, detached and active.
    pub fn in_place(scene: &'s mut Scene, subject: NodeId, position: Vec3, rotation: Quat) -> Result<Self> {
        let node = scene.get(subject)?;
        let saved = SavedSubject {
            parent: node.parent(),
            transform: *node.transform(),
            nodes: scene
                .descendants(subject)
                .into_iter()
                .filter_map(|id| {
                    scene.node(id).map(|n| SavedNode {
                        id,
                        layer: n.layer(),
                        active: n.active_self(),
                        reported_bounds: n.mesh_renderer().and_then(|r| r.reported_bounds),
                    })
                })
                .collect(),
        };

        let mut guard = Self {
            scene,
            root: subject,
            staging: Staging::InPlace(saved),
        };
        guard.scene.set_active(subject, true)?;
        guard.scene.set_parent(subject, None, false)?;
        guard.scene.set_world_position(subject, position)?;
        guard.scene.set_world_rotation(subject, rotation)?;
        Ok(guard)
    }

    /// The staged root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// The scene holding the staged node.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    /// Mutable access to the scene holding the staged node.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut *self.scene
    }

    /// Returns true if the staged node is a transient copy.
    #[must_use]
    pub fn is_copy(&self) -> bool {
        matches!(self.staging, Staging::Copy)
    }

    fn restore(scene: &mut Scene, root: NodeId, saved: &SavedSubject) -> Result<()> {
        scene.set_parent(root, saved.parent, false)?;
        scene.set_local_transform(root, saved.transform)?;
        for node in &saved.nodes {
            scene.set_layer(node.id, node.layer)?;
            scene.set_active(node.id, node.active)?;
            scene.set_reported_bounds(node.id, node.reported_bounds)?;
        }
        Ok(())
    }
}

impl Drop for StagedSubject<'_> {
    fn drop(&mut self) {
        let result = match &self.staging {
            Staging::Copy => self.scene.destroy(self.root),
            Staging::InPlace(saved) => Self::restore(self.scene, self.root, saved),
        };
        if let Err(e) = result {
            log::error!("failed to clean up preview subject {}: {e}", self.root.index());
        }
    }
}

/// State of a single capture: options, camera and target descriptor.
///
/// Built by the caller for each capture; nothing is shared between sessions.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    options: PreviewOptions,
    camera: PreviewCamera,
    target: TargetDescriptor,
}

impl CaptureSession {
    /// Creates a session from capture options.
    #[must_use]
    pub fn new(options: PreviewOptions) -> Self {
        let camera = PreviewCamera::from_options(&options);
        let target = TargetDescriptor::from_options(&options);
        Self {
            options,
            camera,
            target,
        }
    }

    /// Overrides the background color.
    #[must_use]
    pub fn with_background(mut self, color: Vec3) -> Self {
        self.options.background_color = color;
        self.camera.background_color = color;
        self
    }

    /// Capture options.
    #[must_use]
    pub fn options(&self) -> &PreviewOptions {
        &self.options
    }

    /// The camera, as placed by the last capture.
    #[must_use]
    pub fn camera(&self) -> &PreviewCamera {
        &self.camera
    }

    /// Render target descriptor.
    #[must_use]
    pub fn target(&self) -> &TargetDescriptor {
        &self.target
    }

    /// Checks that `subject` can be previewed: it must be a prefab instance
    /// without a parent.
    pub fn validate(scene: &Scene, subject: NodeId) -> Result<()> {
        let node = scene.get(subject)?;
        if !scene.prefab_asset_type(subject).is_prefab() {
            return Err(PreviewError::InvalidSubjectKind(node.name().to_string()));
        }
        if node.parent().is_some() {
            return Err(PreviewError::NonRootSubject(node.name().to_string()));
        }
        Ok(())
    }

    /// Captures a preview of `subject`.
    ///
    /// Returns `Ok(None)` when the subject has no mesh renderer; no render
    /// target is acquired in that case.
    pub fn capture<R: OffscreenRenderer + ?Sized>(
        &mut self,
        renderer: &mut R,
        scene: &mut Scene,
        subject: NodeId,
    ) -> Result<Option<PreviewImage>> {
        Self::validate(scene, subject)?;

        let position = self.options.staging_position;
        let rotation = self.options.staging_rotation();
        let mut staged = match self.options.capture_mode {
            CaptureMode::Instantiate => StagedSubject::instantiate(
                scene,
                subject,
                position,
                rotation,
                &self.options.builtin_namespaces,
            )?,
            CaptureMode::InPlace => StagedSubject::in_place(scene, subject, position, rotation)?,
        };
        let root = staged.root();

        let renderers = staged.scene().renderers_in_children(root, true);
        if renderers.is_empty() {
            return Ok(None);
        }

        let scene = staged.scene_mut();
        scene.set_local_scale(root, self.options.preview_scale)?;
        for node in &renderers {
            activate_path(scene, *node, root)?;
        }

        let bounds = compute_world_bounds(scene, root);
        let frame = compute_frame(&bounds, self.camera.fov, self.camera.forward);
        self.camera.apply_frame(&frame);

        scene.set_layer_recursively(root, self.options.preview_layer)?;

        let mut target = ScopedTarget::acquire(renderer, &self.target).map_err(render_error)?;
        target.render(scene, &self.camera).map_err(render_error)?;
        let pixels = target.read_pixels().map_err(render_error)?;
        drop(target);

        PreviewImage::from_pixels(pixels).map(Some).map_err(render_error)
    }
}
