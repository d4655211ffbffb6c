//! Triangle primitive for ray tracing.
//!
//! Intersection uses a plane-projection test: the hit point and the three
//! vertices are expressed in a 2D frame lying in the triangle's plane, and
//! three half-plane tests decide whether the point is inside. Barycentric
//! weights come from the same frame, as ratios of distances to each edge.

use std::sync::Arc;

use facet_core::Material;
use facet_math::{Ray, Vec2, Vec3, Vec3Ext};

use crate::Color;

/// Sentinel returned by [`Triangle::intersect`] when the ray misses.
pub const MISS: f32 = -1.0;

/// Slack for the half-plane tests, so points on a shared edge hit
/// at least one of the triangles meeting there.
const EDGE_TOLERANCE: f32 = 2e-5;

/// A camera-space triangle with per-vertex normals and UVs.
#[derive(Clone, Debug)]
pub struct Triangle {
    /// Vertices (camera space)
    pub verts: [Vec3; 3],
    /// Per-vertex normals (camera space, not necessarily unit length)
    pub normals: [Vec3; 3],
    /// Per-vertex texture coordinates
    pub uvs: [Vec2; 3],
    /// Shared material
    pub material: Arc<Material>,
}

/// Orthonormal frame in the plane of a triangle, anchored at its first vertex.
///
/// `u` runs along the first edge, `n` is the geometric normal implied by the
/// winding and `w = n × u`. In this frame the first vertex sits at the origin,
/// the second on the +u axis and the third at positive w.
struct PlanarFrame {
    origin: Vec3,
    u: Vec3,
    w: Vec3,
    n: Vec3,
    q: Vec2,
    r: Vec2,
}

impl PlanarFrame {
    fn new(verts: &[Vec3; 3]) -> Self {
        let [p, q, r] = *verts;

        let u = (q - p).unit();
        let n = u.cross(r - p).unit();
        let w = n.cross(u).unit();

        let mut frame = Self {
            origin: p,
            u,
            w,
            n,
            q: Vec2::ZERO,
            r: Vec2::ZERO,
        };
        frame.q = frame.project(q);
        frame.r = frame.project(r);
        frame
    }

    /// Planar coordinates of a point (its offset along n is dropped).
    #[inline]
    fn project(&self, point: Vec3) -> Vec2 {
        let d = point - self.origin;
        Vec2::new(d.dot(self.u), d.dot(self.w))
    }

    /// Inside-or-on-edge test against all three edges.
    fn contains(&self, o: Vec2) -> bool {
        let (p, q, r) = (Vec2::ZERO, self.q, self.r);

        let rp = r - p;
        let pq = p - q;
        let qr = q - r;

        rp.perp().dot(o - p) <= EDGE_TOLERANCE
            && pq.perp().dot(o - q) <= EDGE_TOLERANCE
            && qr.perp().dot(o - r) <= EDGE_TOLERANCE
    }
}

/// Signed distance along an edge normal.
#[inline]
fn edge_distance(edge_normal: Vec2, offset: Vec2) -> f32 {
    edge_normal.dot(offset) / edge_normal.length()
}

impl Triangle {
    /// Create a triangle from camera-space vertices, normals and UVs.
    pub fn new(verts: [Vec3; 3], normals: [Vec3; 3], uvs: [Vec2; 3], material: Arc<Material>) -> Self {
        Self {
            verts,
            normals,
            uvs,
            material,
        }
    }

    /// Create a flat-shaded triangle whose vertex normals all equal the face normal.
    pub fn flat(verts: [Vec3; 3], material: Arc<Material>) -> Self {
        let normal = (verts[1] - verts[0]).cross(verts[2] - verts[0]).unit();
        Self::new(verts, [normal; 3], [Vec2::ZERO; 3], material)
    }

    /// Intersect a ray with the triangle.
    ///
    /// Returns the ray parameter `t` of the hit on the triangle's plane when
    /// the hit lies inside the triangle (edges included). `t` may be zero or
    /// negative for triangles behind the ray origin; callers discard those.
    /// Returns [`MISS`] when the hit lies outside, and also when the ray runs
    /// parallel to the plane or the triangle is degenerate.
    pub fn intersect(&self, ray: &Ray) -> f32 {
        let frame = PlanarFrame::new(&self.verts);

        let denom = ray.direction.dot(frame.n);
        if denom == 0.0 {
            return MISS;
        }

        let t = (frame.origin - ray.origin).dot(frame.n) / denom;
        if !t.is_finite() {
            return MISS;
        }

        if frame.contains(frame.project(ray.at(t))) {
            t
        } else {
            MISS
        }
    }

    /// Barycentric weights `(alpha, beta, gamma)` of a point in the triangle's plane.
    ///
    /// Each weight is the point's distance to the edge opposite a vertex over
    /// that vertex's own distance to the same edge. The weights sum to 1 for
    /// points in the plane and are not renormalized or clamped.
    pub fn barycentric(&self, point: Vec3) -> Vec3 {
        let frame = PlanarFrame::new(&self.verts);
        let o = frame.project(point);
        let (p, q, r) = (Vec2::ZERO, frame.q, frame.r);

        let rp = r - p;
        let qr = q - r;
        let pq = p - q;

        let rp_normal = rp.perp();
        let qr_normal = qr.perp();
        let pq_normal = pq.perp();

        // Distances from o to each edge
        let o_to_qr = edge_distance(qr_normal, r - o);
        let o_to_rp = edge_distance(rp_normal, p - o);
        let o_to_pq = edge_distance(pq_normal, q - o);

        // Distances from each vertex to its opposite edge
        let p_to_qr = edge_distance(qr_normal, rp);
        let q_to_rp = edge_distance(rp_normal, pq);
        let r_to_pq = edge_distance(pq_normal, qr);

        Vec3::new(o_to_qr / p_to_qr, o_to_rp / q_to_rp, o_to_pq / r_to_pq)
    }

    /// Point in the triangle with the given barycentric weights.
    #[inline]
    pub fn point_at(&self, bc: Vec3) -> Vec3 {
        self.verts[0] * bc.x + self.verts[1] * bc.y + self.verts[2] * bc.z
    }

    /// Barycentric blend of the vertex normals, without normalization.
    #[inline]
    pub fn blend_normals(&self, bc: Vec3) -> Vec3 {
        self.normals[0] * bc.x + self.normals[1] * bc.y + self.normals[2] * bc.z
    }

    /// Unit shading normal at the given barycentric weights.
    #[inline]
    pub fn interpolate_normal(&self, bc: Vec3) -> Vec3 {
        self.blend_normals(bc).unit()
    }

    /// Texture coordinate at the given barycentric weights.
    #[inline]
    pub fn interpolate_uv(&self, bc: Vec3) -> Vec2 {
        self.uvs[0] * bc.x + self.uvs[1] * bc.y + self.uvs[2] * bc.z
    }

    /// Blinn-Phong color for a single light, with the eye at the camera origin.
    ///
    /// Ambient and emissive terms are always present. Diffuse and specular
    /// only apply when the shading normal faces the light, and are dropped
    /// entirely when `in_shadow` is set. All light terms use quadratic
    /// attenuation `1 / (1 + d²)`.
    pub fn calculate_phong(
        &self,
        light_position: Vec3,
        light_color: Vec3,
        bc: Vec3,
        in_shadow: bool,
    ) -> Color {
        let material = &*self.material;

        let p = self.point_at(bc);
        let normal = self.interpolate_normal(bc);

        // Keep vl unnormalized until its length has been used for attenuation
        let vl = light_position - p;
        let ve = (Vec3::ZERO - p).unit();

        let distance = vl.length();
        let attenuation = 1.0 / (1.0 + distance * distance);

        let ambient = light_color * material.ambient * attenuation;
        let emissive = material.emissive;

        let vl = vl.unit();
        let bisector = (vl + ve).unit();

        let mut diffuse = Color::ZERO;
        let mut specular = Color::ZERO;

        let n_dot_l = normal.dot(vl);
        if n_dot_l > 0.0 && !in_shadow {
            let highlight = normal.dot(bisector).max(0.0).powf(material.shininess);
            specular = light_color * material.specular * highlight * attenuation;
            diffuse = light_color * material.diffuse * n_dot_l * attenuation;
        }

        ambient + emissive + diffuse + specular
    }
}
