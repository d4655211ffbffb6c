//! Polygon mesh geometry handed to the raytracer.
//!
//! A mesh keeps separate position, normal and texture-coordinate arrays and
//! a list of polygonal faces that index into each of them per corner, the
//! way OBJ-style assets store them. The raytracer fan-triangulates the faces
//! every time it rebuilds its scene.

use std::sync::Arc;

use facet_math::{Vec2, Vec3};
use thiserror::Error;

use crate::material::Material;

/// Errors found when checking a mesh's face indices.
#[derive(Error, Debug, PartialEq)]
pub enum MeshError {
    #[error("Face {face} has {corners} corners, at least 3 are required")]
    TooFewCorners { face: usize, corners: usize },

    #[error("Face {face} has {vertices} vertex indices but {other} {kind} indices")]
    CornerMismatch {
        face: usize,
        vertices: usize,
        other: usize,
        kind: &'static str,
    },

    #[error("Face {face} references {kind} {index}, but only {len} exist")]
    IndexOutOfRange {
        face: usize,
        kind: &'static str,
        index: u32,
        len: usize,
    },
}

/// Result type for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// One polygon of a mesh, as per-corner indices.
///
/// `vertices` and `normals` must have the same length. `uvs` is either the
/// same length or empty, in which case every corner gets UV (0, 0).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Face {
    pub vertices: Vec<u32>,
    pub normals: Vec<u32>,
    pub uvs: Vec<u32>,
}

impl Face {
    /// Create a face whose corners use the same index for position and normal.
    pub fn new(indices: Vec<u32>) -> Self {
        Self {
            normals: indices.clone(),
            vertices: indices,
            uvs: Vec::new(),
        }
    }

    /// Create a face with independent position, normal and UV indices.
    pub fn with_attributes(vertices: Vec<u32>, normals: Vec<u32>, uvs: Vec<u32>) -> Self {
        Self {
            vertices,
            normals,
            uvs,
        }
    }

    /// Number of corners in the polygon.
    pub fn corner_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles a fan triangulation of this face produces.
    pub fn triangle_count(&self) -> usize {
        self.corner_count().saturating_sub(2)
    }
}

/// A polygon mesh with an optional shared material.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Vertex positions in object space
    pub positions: Vec<Vec3>,

    /// Vertex normals in object space
    pub normals: Vec<Vec3>,

    /// Texture coordinates
    pub uvs: Vec<Vec2>,

    /// Polygonal faces
    pub faces: Vec<Face>,

    /// Material (optional, the scene falls back to its default)
    pub material: Option<Arc<Material>>,
}

impl Mesh {
    /// Create a new mesh from its attribute arrays and faces.
    pub fn new(positions: Vec<Vec3>, normals: Vec<Vec3>, uvs: Vec<Vec2>, faces: Vec<Face>) -> Self {
        Self {
            positions,
            normals,
            uvs,
            faces,
            material: None,
        }
    }

    /// Build a mesh from a flat triangle index list, with smooth normals.
    ///
    /// Every 3 indices form a face; a trailing partial triangle is ignored.
    pub fn from_triangles(positions: Vec<Vec3>, indices: &[u32]) -> Self {
        let faces = indices
            .chunks_exact(3)
            .map(|tri| Face::new(tri.to_vec()))
            .collect();

        let mut mesh = Self::new(positions, Vec::new(), Vec::new(), faces);
        mesh.compute_normals();
        mesh
    }

    /// Set the material for this mesh.
    pub fn with_material(mut self, material: Arc<Material>) -> Self {
        self.material = Some(material);
        self
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Replaces any existing normals with one normal per position, and
    /// points every face's normal indices at its vertex indices. Face normals
    /// are not normalized before accumulation, so larger faces weigh more.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for face in &mut self.faces {
            if face.corner_count() >= 3
                && face.vertices.iter().all(|&i| (i as usize) < vertex_count)
            {
                let p0 = self.positions[face.vertices[0] as usize];
                for i in 1..face.corner_count() - 1 {
                    let p1 = self.positions[face.vertices[i] as usize];
                    let p2 = self.positions[face.vertices[i + 1] as usize];
                    let face_normal = (p1 - p0).cross(p2 - p0);

                    normals[face.vertices[0] as usize] += face_normal;
                    normals[face.vertices[i] as usize] += face_normal;
                    normals[face.vertices[i + 1] as usize] += face_normal;
                }
            }
            face.normals = face.vertices.clone();
        }

        for normal in &mut normals {
            let len = normal.length();
            if len > 0.0 {
                *normal /= len;
            } else {
                *normal = Vec3::Y; // Default up normal for degenerate cases
            }
        }

        self.normals = normals;
    }

    /// Get the number of triangles the faces fan-triangulate into.
    pub fn triangle_count(&self) -> usize {
        self.faces.iter().map(Face::triangle_count).sum()
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check that every face is a polygon and every index is in range.
    pub fn validate(&self) -> MeshResult<()> {
        for (face_index, face) in self.faces.iter().enumerate() {
            self.check_face(face_index, face)?;
        }
        Ok(())
    }

    /// Check a single face against the mesh's attribute arrays.
    pub fn check_face(&self, face_index: usize, face: &Face) -> MeshResult<()> {
        let corners = face.corner_count();
        if corners < 3 {
            return Err(MeshError::TooFewCorners {
                face: face_index,
                corners,
            });
        }

        if face.normals.len() != corners {
            return Err(MeshError::CornerMismatch {
                face: face_index,
                vertices: corners,
                other: face.normals.len(),
                kind: "normal",
            });
        }

        if !face.uvs.is_empty() && face.uvs.len() != corners {
            return Err(MeshError::CornerMismatch {
                face: face_index,
                vertices: corners,
                other: face.uvs.len(),
                kind: "uv",
            });
        }

        let checks: [(&[u32], usize, &'static str); 3] = [
            (&face.vertices, self.positions.len(), "position"),
            (&face.normals, self.normals.len(), "normal"),
            (&face.uvs, self.uvs.len(), "uv"),
        ];

        for (indices, len, kind) in checks {
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= len) {
                return Err(MeshError::IndexOutOfRange {
                    face: face_index,
                    kind,
                    index,
                    len,
                });
            }
        }

        Ok(())
    }
}
