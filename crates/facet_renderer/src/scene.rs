//! Camera-space triangle soup rebuilt for every render.
//!
//! A `Scene` is a snapshot of (meshes, render parameters): every polygon is
//! fan-triangulated and moved into camera space with the current model-view
//! matrix, and the lights are moved with it. Nothing is updated in place;
//! a rebuild replaces the whole triangle list.

use std::sync::Arc;

use facet_core::{Face, Material, Mesh, RenderParameters};
use facet_math::{HomogeneousExt, Mat4, Ray, Vec2, Vec3, Vec4};

use crate::triangle::{Triangle, MISS};

/// A light moved into camera space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SceneLight {
    pub position: Vec3,
    pub color: Vec3,
}

/// Result of a nearest-hit query.
///
/// `t <= 0` (the [`MISS`] sentinel) means nothing was hit.
#[derive(Clone, Copy, Debug)]
pub struct CollisionInfo<'a> {
    /// The triangle that was hit, if any
    pub triangle: Option<&'a Triangle>,
    /// Distance along the ray to the hit
    pub t: f32,
}

impl<'a> CollisionInfo<'a> {
    /// A query result with no hit.
    pub const fn miss() -> Self {
        Self {
            triangle: None,
            t: MISS,
        }
    }

    /// Whether a triangle was hit in front of the ray origin.
    pub fn is_hit(&self) -> bool {
        self.t > 0.0 && self.triangle.is_some()
    }

    /// The hit triangle and distance, or `None` on a miss.
    pub fn hit(&self) -> Option<(&'a Triangle, f32)> {
        match self.triangle {
            Some(triangle) if self.t > 0.0 => Some((triangle, self.t)),
            _ => None,
        }
    }
}

/// The camera-space scene the raytracer queries.
#[derive(Clone, Debug)]
pub struct Scene {
    /// Triangles in camera space, in mesh/face order
    pub triangles: Vec<Triangle>,
    /// Lights in camera space, in parameter order
    pub lights: Vec<SceneLight>,
    /// Material for meshes that carry none
    default_material: Arc<Material>,
    /// Model-view matrix used for the last rebuild
    model_view: Mat4,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene with the default material.
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
            lights: Vec::new(),
            default_material: Arc::new(Material::default()),
            model_view: Mat4::IDENTITY,
        }
    }

    /// Build a scene from meshes and a parameter snapshot.
    pub fn build(meshes: &[Mesh], params: &RenderParameters) -> Self {
        let mut scene = Self::new();
        scene.update_scene(meshes, params);
        scene
    }

    /// Build a scene directly from camera-space triangles and lights.
    pub fn from_parts(triangles: Vec<Triangle>, lights: Vec<SceneLight>) -> Self {
        Self {
            triangles,
            lights,
            ..Self::new()
        }
    }

    /// Camera transform for a parameter snapshot.
    ///
    /// The user's translation is applied on top of a fixed step of one unit
    /// down -Z, after the arcball rotation:
    /// `translation(tx, ty, tz - 1) * rotation`.
    pub fn model_view(params: &RenderParameters) -> Mat4 {
        let t = params.translation;
        Mat4::from_translation(Vec3::new(t.x, t.y, t.z - 1.0)) * params.rotation
    }

    /// Material assigned to meshes without one.
    pub fn default_material(&self) -> &Arc<Material> {
        &self.default_material
    }

    /// Discard all triangles and lights and rebuild them from scratch.
    ///
    /// Faces with fewer than 3 corners or out-of-range indices are skipped
    /// with a warning.
    pub fn update_scene(&mut self, meshes: &[Mesh], params: &RenderParameters) {
        self.model_view = Self::model_view(params);
        self.triangles.clear();

        for (mesh_index, mesh) in meshes.iter().enumerate() {
            let material = mesh
                .material
                .clone()
                .unwrap_or_else(|| Arc::clone(&self.default_material));

            for (face_index, face) in mesh.faces.iter().enumerate() {
                if let Err(err) = mesh.check_face(face_index, face) {
                    log::warn!("Skipping face in mesh {}: {}", mesh_index, err);
                    continue;
                }

                // Fan triangulation: (0, i, i + 1)
                for i in 1..face.corner_count() - 1 {
                    let corners = [0, i, i + 1]
                        .map(|corner| self.corner(mesh, face, corner));

                    self.triangles.push(Triangle::new(
                        corners.map(|c| c.0),
                        corners.map(|c| c.1),
                        corners.map(|c| c.2),
                        Arc::clone(&material),
                    ));
                }
            }
        }

        self.lights = params
            .lights
            .iter()
            .map(|light| SceneLight {
                position: (self.model_view * light.position).point(),
                color: light.color,
            })
            .collect();

        log::debug!(
            "Rebuilt scene: {} meshes, {} triangles, {} lights",
            meshes.len(),
            self.triangles.len(),
            self.lights.len()
        );
    }

    /// Camera-space position, normal and UV of one face corner.
    fn corner(&self, mesh: &Mesh, face: &Face, corner: usize) -> (Vec3, Vec3, Vec2) {
        let position = mesh.positions[face.vertices[corner] as usize];
        let normal = mesh.normals[face.normals[corner] as usize];
        let uv = face
            .uvs
            .get(corner)
            .map_or(Vec2::ZERO, |&i| mesh.uvs[i as usize]);

        (
            (self.model_view * Vec4::from_point(position)).point(),
            (self.model_view * Vec4::from_vector(normal)).vector(),
            uv,
        )
    }

    /// Find the nearest triangle hit in front of the ray origin.
    ///
    /// Every triangle is tested; on an exact tie the first one wins.
    pub fn closest_triangle(&self, ray: &Ray) -> CollisionInfo<'_> {
        let mut closest = CollisionInfo::miss();

        for triangle in &self.triangles {
            let t = triangle.intersect(ray);
            if t > 0.0 && (closest.t <= 0.0 || t < closest.t) {
                closest = CollisionInfo {
                    triangle: Some(triangle),
                    t,
                };
            }
        }

        closest
    }

    /// Get the number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the scene has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use facet_core::Light;

    fn quad_mesh() -> Mesh {
        let positions = vec![
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ];
        let uvs = vec![Vec2::ZERO, Vec2::X, Vec2::ONE, Vec2::Y];
        let face = Face::with_attributes(vec![0, 1, 2, 3], vec![0, 0, 0, 0], vec![0, 1, 2, 3]);
        Mesh::new(positions, vec![Vec3::Z], uvs, vec![face])
    }

    #[test]
    fn test_model_view_steps_back_one_unit() {
        let params = RenderParameters::default();
        let mv = Scene::model_view(&params);

        let origin = (mv * Vec4::from_point(Vec3::ZERO)).point();
        assert_eq!(origin, Vec3::new(0.0, 0.0, -1.0));

        let normal = (mv * Vec4::from_vector(Vec3::Z)).vector();
        assert_eq!(normal, Vec3::Z);
    }

    #[test]
    fn test_model_view_applies_rotation_then_translation() {
        let params = RenderParameters {
            rotation: Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2),
            translation: Vec3::new(1.0, 0.0, 0.0),
            ..Default::default()
        };
        let mv = Scene::model_view(&params);

        // +X rotates onto -Z, then moves by (1, 0, -1)
        let p = (mv * Vec4::from_point(Vec3::X)).point();
        assert!((p - Vec3::new(1.0, 0.0, -2.0)).length() < 1e-5, "{:?}", p);
    }

    #[test]
    fn test_fan_triangulation() {
        let scene = Scene::build(&[quad_mesh()], &RenderParameters::default());
        assert_eq!(scene.len(), 2);

        let mesh = quad_mesh();
        let offset = Vec3::new(0.0, 0.0, -1.0);
        let [a, b] = [&scene.triangles[0], &scene.triangles[1]];

        // (0, 1, 2) and (0, 2, 3)
        assert_eq!(a.verts, [0, 1, 2].map(|i| mesh.positions[i] + offset));
        assert_eq!(b.verts, [0, 2, 3].map(|i| mesh.positions[i] + offset));
        assert_eq!(b.uvs, [Vec2::ZERO, Vec2::ONE, Vec2::Y]);
        assert_eq!(a.normals, [Vec3::Z; 3]);
    }

    #[test]
    fn test_default_material_fallback() {
        let scene = Scene::build(&[quad_mesh()], &RenderParameters::default());
        for tri in &scene.triangles {
            assert!(Arc::ptr_eq(&tri.material, scene.default_material()));
            assert_eq!(*tri.material, Material::default());
        }
    }

    #[test]
    fn test_mesh_material_is_shared() {
        let material = Arc::new(Material::default().with_reflectivity(0.5));
        let mesh = quad_mesh().with_material(Arc::clone(&material));
        let scene = Scene::build(&[mesh], &RenderParameters::default());

        for tri in &scene.triangles {
            assert!(Arc::ptr_eq(&tri.material, &material));
        }
    }

    #[test]
    fn test_invalid_faces_are_skipped() {
        let _ = env_logger::builder().is_test(true).try_init();

        let mut mesh = quad_mesh();
        mesh.faces.push(Face::new(vec![0, 1]));
        mesh.faces.push(Face::new(vec![0, 1, 42]));

        let scene = Scene::build(&[mesh], &RenderParameters::default());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_update_scene_is_deterministic() {
        let meshes = [quad_mesh()];
        let params = RenderParameters {
            rotation: Mat4::from_rotation_x(0.3) * Mat4::from_rotation_y(-0.7),
            translation: Vec3::new(0.1, 0.2, -0.3),
            ..Default::default()
        };

        let mut scene = Scene::build(&meshes, &params);
        let first = scene.clone();
        scene.update_scene(&meshes, &params);

        assert_eq!(first.len(), scene.len());
        for (a, b) in first.triangles.iter().zip(&scene.triangles) {
            assert_eq!(a.verts, b.verts);
            assert_eq!(a.normals, b.normals);
            assert_eq!(a.uvs, b.uvs);
        }
        assert_eq!(first.lights, scene.lights);
    }

    #[test]
    fn test_update_scene_replaces_triangles() {
        let mut scene = Scene::build(&[quad_mesh(), quad_mesh()], &RenderParameters::default());
        assert_eq!(scene.len(), 4);

        scene.update_scene(&[quad_mesh()], &RenderParameters::default());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_lights_move_to_camera_space() {
        let params = RenderParameters {
            lights: vec![Light::new(Vec3::new(0.0, 2.0, 0.0), Vec3::ONE)],
            ..Default::default()
        };
        let scene = Scene::build(&[], &params);

        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.lights[0].position, Vec3::new(0.0, 2.0, -1.0));
        assert_eq!(scene.lights[0].color, Vec3::ONE);
    }

    #[test]
    fn test_closest_triangle_picks_nearest() {
        let material = Arc::new(Material::default());
        let near = Triangle::flat(
            [Vec3::new(-1.0, -1.0, -2.0), Vec3::new(1.0, -1.0, -2.0), Vec3::new(0.0, 1.0, -2.0)],
            Arc::clone(&material),
        );
        let far = Triangle::flat(
            [Vec3::new(-1.0, -1.0, -5.0), Vec3::new(1.0, -1.0, -5.0), Vec3::new(0.0, 1.0, -5.0)],
            material,
        );
        // Far first, so the scan has to replace it
        let scene = Scene::from_parts(vec![far, near], Vec::new());

        let hit = scene.closest_triangle(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
        let (tri, t) = hit.hit().expect("should hit");
        assert!((t - 2.0).abs() < 1e-5);
        assert_eq!(tri.verts[0].z, -2.0);
    }

    #[test]
    fn test_closest_triangle_ignores_hits_behind() {
        let tri = Triangle::flat(
            [Vec3::new(-1.0, -1.0, 2.0), Vec3::new(1.0, -1.0, 2.0), Vec3::new(0.0, 1.0, 2.0)],
            Arc::new(Material::default()),
        );
        let scene = Scene::from_parts(vec![tri], Vec::new());

        let hit = scene.closest_triangle(&Ray::new(Vec3::ZERO, Vec3::NEG_Z));
        assert!(!hit.is_hit());
        assert!(hit.t <= 0.0);
        assert!(hit.hit().is_none());
    }

    #[test]
    fn test_empty_scene_misses() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        assert!(!scene.closest_triangle(&Ray::default()).is_hit());
    }
}
