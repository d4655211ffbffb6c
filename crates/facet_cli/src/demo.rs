//! Built-in demo scene: a mirror floor, a tetrahedron and a glowing panel.

use std::sync::Arc;

use facet_core::{Face, Light, Material, Mesh};
use facet_math::Vec3;

/// Reflective floor quad at y = -1.
fn floor() -> Mesh {
    let positions = vec![
        Vec3::new(-3.0, -1.0, 0.0),
        Vec3::new(3.0, -1.0, 0.0),
        Vec3::new(3.0, -1.0, -6.0),
        Vec3::new(-3.0, -1.0, -6.0),
    ];
    let face = Face::with_attributes(vec![0, 1, 2, 3], vec![0; 4], Vec::new());

    let material = Material::new(
        "floor",
        Vec3::new(0.2, 0.2, 0.25),
        Vec3::new(0.5, 0.5, 0.6),
        Vec3::splat(0.3),
        Vec3::ZERO,
        16.0,
    )
    .with_reflectivity(0.4);

    Mesh::new(positions, vec![Vec3::Y], Vec::new(), vec![face]).with_material(Arc::new(material))
}

/// Smooth-shaded tetrahedron resting on the floor.
fn tetrahedron() -> Mesh {
    let positions = vec![
        Vec3::new(0.0, 0.6, -3.5),
        Vec3::new(-0.7, -1.0, -3.0),
        Vec3::new(0.7, -1.0, -3.0),
        Vec3::new(0.0, -1.0, -4.2),
    ];
    // Outward-facing winding
    let indices = [1, 2, 0, 2, 3, 0, 3, 1, 0, 1, 3, 2];

    let material = Material::new(
        "tetrahedron",
        Vec3::new(0.3, 0.05, 0.05),
        Vec3::new(0.8, 0.2, 0.15),
        Vec3::splat(0.6),
        Vec3::ZERO,
        32.0,
    );

    Mesh::from_triangles(positions, &indices).with_material(Arc::new(material))
}

/// Emissive panel above the tetrahedron, facing down.
fn light_panel() -> Mesh {
    let positions = vec![
        Vec3::new(-0.4, 1.5, -3.9),
        Vec3::new(0.4, 1.5, -3.9),
        Vec3::new(0.4, 1.5, -3.1),
        Vec3::new(-0.4, 1.5, -3.1),
    ];
    let face = Face::with_attributes(vec![0, 1, 2, 3], vec![0; 4], Vec::new());

    Mesh::new(positions, vec![Vec3::NEG_Y], Vec::new(), vec![face])
        .with_material(Arc::new(Material::light("panel", Vec3::splat(1.0))))
}

/// Demo meshes, in world space.
pub fn meshes() -> Vec<Mesh> {
    vec![floor(), tetrahedron(), light_panel()]
}

/// Point lights matching the demo: one under the panel and one at the eye.
pub fn lights() -> Vec<Light> {
    vec![
        Light::new(Vec3::new(0.0, 1.4, -3.5), Vec3::splat(3.0)),
        Light::new(Vec3::new(0.0, 0.0, 1.0), Vec3::ONE),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_core::RenderParameters;
    use facet_renderer::{
        background_color, color_to_rgba, render, CancelToken, RenderConfig, Scene,
    };

    #[test]
    fn test_demo_meshes_are_valid() {
        let meshes = meshes();
        for mesh in &meshes {
            assert!(mesh.validate().is_ok());
            assert!(mesh.material.is_some());
        }

        let triangles: usize = meshes.iter().map(Mesh::triangle_count).sum();
        assert_eq!(triangles, 2 + 4 + 2);
    }

    #[test]
    fn test_panel_is_a_light() {
        let panel = light_panel();
        assert!(panel.material.as_ref().is_some_and(|m| m.is_light()));
    }

    #[test]
    fn test_demo_render_hits_the_tetrahedron() {
        let params = RenderParameters {
            reflections_enabled: true,
            lights: lights(),
            ..Default::default()
        };
        let config = RenderConfig::default().with_resolution(32, 24);
        let scene = Scene::build(&meshes(), &params);
        assert_eq!(scene.len(), 8);

        let frame = render(&scene, &params, &config, &CancelToken::new()).expect("render");
        let center = frame.get(16, 12);
        assert_ne!(center, color_to_rgba(background_color(16, 12, &config)));
        assert_ne!(center, [0, 0, 0, 255]);
    }
}
