//! Render preview thumbnails of a procedurally built prefab.
//!
//! Run with: cargo run --example prefab_preview_demo [prefab.json]
//!
//! Without an argument a small table prefab is built in code. Writes
//! `preview.png` and `preview_in_place.png` to the working directory.

use prefab_preview::*;

fn leg(name: &str, x: f32, z: f32) -> PrefabNodeDef {
    PrefabNodeDef::new(name, Transform::from_translation(Vec3::new(x, 0.4, z))).with_component(
        Component::MeshRenderer(
            MeshRenderer::new(Mesh::cuboid(Vec3::new(0.05, 0.4, 0.05)))
                .with_color(Vec4::new(0.45, 0.3, 0.2, 1.0)),
        ),
    )
}

fn table_prefab() -> PrefabDefinition {
    let top = PrefabNodeDef::new("top", Transform::from_translation(Vec3::new(0.0, 0.85, 0.0)))
        .with_component(Component::MeshRenderer(
            MeshRenderer::new(Mesh::cuboid(Vec3::new(0.8, 0.05, 0.5)))
                .with_color(Vec4::new(0.6, 0.42, 0.28, 1.0)),
        ));

    PrefabDefinition::new(
        "table",
        PrefabNodeDef::new("table", Transform::identity())
            .with_component(Component::Behaviour(Behaviour::new("game::Interactable")))
            .with_child(top)
            .with_child(leg("leg_0", -0.7, -0.4))
            .with_child(leg("leg_1", 0.7, -0.4))
            .with_child(leg("leg_2", -0.7, 0.4))
            .with_child(leg("leg_3", 0.7, 0.4)),
    )
}

fn main() -> Result<()> {
    init_logging();

    let prefab = match std::env::args().nth(1) {
        Some(path) => PrefabDefinition::from_json_file(path)?,
        None => table_prefab(),
    };

    let mut scene = Scene::new();
    let subject = scene.instantiate_prefab(&prefab)?;

    let options = PreviewOptions::default();
    if render_preview_to_file(&mut scene, subject, &options, "preview.png")? {
        println!("wrote preview.png");
    } else {
        println!("'{}' has nothing to render", prefab.name);
    }

    let in_place = options
        .with_capture_mode(CaptureMode::InPlace)
        .with_background(Vec3::new(0.2, 0.22, 0.25));
    if render_preview_to_file(&mut scene, subject, &in_place, "preview_in_place.png")? {
        println!("wrote preview_in_place.png");
    }

    Ok(())
}
