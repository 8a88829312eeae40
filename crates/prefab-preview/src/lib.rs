//! prefab-preview: thumbnail previews of prefab hierarchies.
//!
//! A preview is produced by staging a prefab instance away from the working
//! area, fitting a camera to its world-space bounds, rendering it offscreen
//! and reading the pixels back.
//!
//! # Quick Start
//!
//! ```no_run
//! use prefab_preview::*;
//!
//! fn main() -> Result<()> {
//!     init_logging();
//!
//!     let prefab = PrefabDefinition::from_json_file("crate.prefab.json")?;
//!     let mut scene = Scene::new();
//!     let subject = scene.instantiate_prefab(&prefab)?;
//!
//!     render_preview_to_file(&mut scene, subject, &PreviewOptions::default(), "crate.png")?;
//!     Ok(())
//! }
//! ```
//!
//! # Modes
//!
//! - [`CaptureMode::Instantiate`] renders a transient copy with gameplay
//!   behaviours stripped; the subject itself is left untouched.
//! - [`CaptureMode::InPlace`] renders the subject itself and restores its
//!   parent, transform, active flags and layers afterwards.

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]

mod capture;

pub use capture::{CaptureSession, StagedSubject};

// Re-export core types
pub use prefab_preview_core::{
    compute_frame, compute_world_bounds, Behaviour, Bounds, CameraFrame, CaptureMode, Component,
    Mesh, MeshRenderer, Node, NodeId, PrefabAssetType, PrefabDefinition, PrefabLink,
    PrefabNodeDef, PreviewError, PreviewOptions, ProjectionMode, Result, Scene, Transform,
    DEFAULT_BACKGROUND, Mat4, Quat, Vec2, Vec3, Vec4,
};

// Re-export render types
pub use prefab_preview_render::{
    HeadlessRenderer, OffscreenRenderer, PixelBuffer, PreviewCamera, PreviewImage, RenderError,
    TargetDescriptor, TargetId,
};

use std::path::Path;

use pollster::FutureExt;

/// Initializes logging from `RUST_LOG`. Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}

/// Captures a preview of `subject` with default options.
///
/// `background` overrides the default light-gray clear color. Returns `None`
/// (with a logged warning) when the subject is not a root prefab instance,
/// and `None` without a diagnostic when it has nothing to render.
pub fn get_preview<R: OffscreenRenderer + ?Sized>(
    renderer: &mut R,
    scene: &mut Scene,
    subject: NodeId,
    background: Option<Vec3>,
) -> Option<PreviewImage> {
    let mut options = PreviewOptions::default();
    if let Some(color) = background {
        options.background_color = color;
    }
    get_preview_with_options(renderer, scene, subject, &options)
}

/// Captures a preview of `subject` with explicit options.
///
/// Failures are logged and reported as `None`.
pub fn get_preview_with_options<R: OffscreenRenderer + ?Sized>(
    renderer: &mut R,
    scene: &mut Scene,
    subject: NodeId,
    options: &PreviewOptions,
) -> Option<PreviewImage> {
    match try_capture(renderer, scene, subject, options) {
        Ok(image) => image,
        Err(e @ (PreviewError::InvalidSubjectKind(_) | PreviewError::NonRootSubject(_))) => {
            log::warn!("cannot generate preview: {e}");
            None
        }
        Err(e) => {
            log::error!("preview capture failed: {e}");
            None
        }
    }
}

/// Captures a preview of `subject`, reporting rejections as errors.
///
/// `Ok(None)` means the subject has no mesh renderer.
pub fn try_capture<R: OffscreenRenderer + ?Sized>(
    renderer: &mut R,
    scene: &mut Scene,
    subject: NodeId,
    options: &PreviewOptions,
) -> Result<Option<PreviewImage>> {
    CaptureSession::new(options.clone()).capture(renderer, scene, subject)
}

/// Creates a headless renderer, captures `subject` and saves the preview.
///
/// Returns `Ok(false)` if there was nothing to render and no file was written.
///
/// # Example
/// ```no_run
/// use prefab_preview::*;
///
/// let mut scene = Scene::new();
/// let prefab = PrefabDefinition::new(
///     "crate",
///     PrefabNodeDef::new("crate", Transform::identity()).with_component(Component::MeshRenderer(
///         MeshRenderer::new(Mesh::cuboid(Vec3::splat(0.5))),
///     )),
/// );
/// let subject = scene.instantiate_prefab(&prefab).unwrap();
/// render_preview_to_file(&mut scene, subject, &PreviewOptions::default(), "crate.png").unwrap();
/// ```
pub fn render_preview_to_file(
    scene: &mut Scene,
    subject: NodeId,
    options: &PreviewOptions,
    path: impl AsRef<Path>,
) -> Result<bool> {
    let mut renderer = HeadlessRenderer::new()
        .block_on()
        .map_err(|e| PreviewError::Render(format!("failed to create headless renderer: {e}")))?;

    match try_capture(&mut renderer, scene, subject, options)? {
        Some(image) => {
            image
                .save(path)
                .map_err(|e| PreviewError::Render(format!("failed to save preview: {e}")))?;
            Ok(true)
        }
        None => Ok(false),
    }
}
