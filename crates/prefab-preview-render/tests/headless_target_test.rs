//! Headless renderer integration tests.
//!
//! These require a GPU adapter (real or software fallback). Without one the
//! test prints a notice and returns early.

use prefab_preview_core::{Component, Mesh, MeshRenderer, Scene, Transform, Vec3, Vec4};
use prefab_preview_render::{
    HeadlessRenderer, OffscreenRenderer, PreviewCamera, ScopedTarget, TargetDescriptor,
};

#[test]
fn headless_target_tests() {
    let mut renderer = match pollster::block_on(HeadlessRenderer::new()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Skipping headless tests: no GPU adapter available ({e})");
            return;
        }
    };

    let mut camera = PreviewCamera::new(1.0);
    camera.position = Vec3::new(0.0, 0.0, 5.0);
    camera.forward = Vec3::NEG_Z;
    camera.set_culling_layer(0);

    // --- Empty scene clears to background ---
    {
        let scene = Scene::new();
        let mut target = ScopedTarget::acquire(&mut renderer, &TargetDescriptor::new(64, 48, 24))
            .expect("acquire");
        target.render(&scene, &camera).expect("render");
        let pixels = target.read_pixels().expect("read");
        assert_eq!((pixels.width(), pixels.height()), (64, 48));
        assert!(pixels
            .as_bytes()
            .chunks(4)
            .all(|px| px == [240, 240, 240, 255]));
    }
    assert_eq!(renderer.targets_in_use(), 0);
    assert_eq!(renderer.pooled_targets(), 1);

    // --- A red cube covers the center ---
    {
        let mut scene = Scene::new();
        let cube = scene.spawn("cube", Transform::identity());
        scene
            .add_component(
                cube,
                Component::MeshRenderer(
                    MeshRenderer::new(Mesh::cuboid(Vec3::ONE)).with_color(Vec4::new(1.0, 0.0, 0.0, 1.0)),
                ),
            )
            .expect("add component");

        let mut target = ScopedTarget::acquire(&mut renderer, &TargetDescriptor::new(64, 48, 24))
            .expect("acquire");
        target.render(&scene, &camera).expect("render");
        let pixels = target.read_pixels().expect("read");
        let center = pixels.pixel(32, 24).expect("center pixel");
        assert!(center[0] > 50 && center[1] < 10 && center[2] < 10, "center = {center:?}");
        assert_eq!(pixels.pixel(0, 0), Some([240, 240, 240, 255]));

        // Other layers are culled
        scene.set_layer(cube, 5).expect("set layer");
        target.render(&scene, &camera).expect("render");
        let pixels = target.read_pixels().expect("read");
        assert_eq!(pixels.pixel(32, 24), Some([240, 240, 240, 255]));
    }

    // --- No depth buffer ---
    {
        let scene = Scene::new();
        let mut target = ScopedTarget::acquire(&mut renderer, &TargetDescriptor::new(16, 16, 0))
            .expect("acquire");
        target.render(&scene, &camera).expect("render");
        assert_eq!(target.read_pixels().expect("read").as_bytes().len(), 16 * 16 * 4);
    }
    assert_eq!(renderer.targets_in_use(), 0);
}
