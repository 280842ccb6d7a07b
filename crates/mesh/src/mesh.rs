use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::buffer::{IndexBuffer, IndexWidth, Semantic, VertexBuffer};
use crate::error::{MeshError, MeshResult};
use crate::geometry::{Aabb, Triangle, Vector3};
use crate::TriangleMesh;

/// An indexed triangle mesh.
///
/// A mesh owns a set of vertex buffers, at most one per [`Semantic`], that all
/// describe the same number of vertices, and a single triangle index buffer. A
/// position buffer is always present and every index is in range; both are
/// checked when the mesh is built.
///
/// Meshes are never edited in place. The editing operations in this crate take a
/// `&Mesh` and return a new one.
#[derive(Debug, PartialEq, Clone)]
pub struct Mesh {
    buffers: Vec<VertexBuffer>,
    indices: IndexBuffer,
    vertex_count: usize,
}

impl Mesh {
    pub fn new(buffers: Vec<VertexBuffer>, indices: IndexBuffer) -> MeshResult<Self> {
        let positions = buffers
            .iter()
            .find(|b| b.semantic() == Semantic::Position)
            .ok_or_else(|| MeshError::invalid_geometry("mesh has no position buffer"))?;
        if !positions.is_vector3() {
            return Err(MeshError::invalid_geometry(
                "position buffer must hold at least 3 x f32 per vertex",
            ));
        }
        let vertex_count = positions.vertex_count();

        for (i, b) in buffers.iter().enumerate() {
            if b.vertex_count() != vertex_count {
                return Err(MeshError::invalid_geometry(format!(
                    "{:?} buffer has {} vertices, positions have {}",
                    b.semantic(),
                    b.vertex_count(),
                    vertex_count
                )));
            }
            if buffers[..i].iter().any(|o| o.semantic() == b.semantic()) {
                return Err(MeshError::invalid_geometry(format!(
                    "duplicate {:?} buffer",
                    b.semantic()
                )));
            }
        }

        if let Some(&i) = indices.indices().iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::invalid_geometry(format!(
                "index {} out of range for {} vertices",
                i, vertex_count
            )));
        }

        Ok(Self {
            buffers,
            indices,
            vertex_count,
        })
    }

    /// Builds a mesh from tightly packed positions, optional normals and a 32-bit
    /// triangle list.
    pub fn from_parts(
        positions: &[Vector3],
        normals: Option<&[Vector3]>,
        indices: Vec<u32>,
    ) -> MeshResult<Self> {
        let mut buffers = vec![VertexBuffer::from_vectors(Semantic::Position, positions)];
        if let Some(normals) = normals {
            buffers.push(VertexBuffer::from_vectors(Semantic::Normal, normals));
        }
        Mesh::new(buffers, IndexBuffer::new(indices, IndexWidth::U32)?)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn buffers(&self) -> &[VertexBuffer] {
        self.buffers.as_slice()
    }

    pub fn buffer(&self, semantic: Semantic) -> Option<&VertexBuffer> {
        self.buffers.iter().find(|b| b.semantic() == semantic)
    }

    pub fn indices(&self) -> &IndexBuffer {
        &self.indices
    }

    pub fn positions(&self) -> &VertexBuffer {
        // Checked in `Mesh::new`.
        self.buffers
            .iter()
            .find(|b| b.semantic() == Semantic::Position)
            .unwrap_or(&self.buffers[0])
    }

    pub fn position(&self, i: usize) -> Option<Vector3> {
        self.positions().vector3(i)
    }

    /// Returns the normal of vertex `i` if the mesh carries a usable normal buffer.
    pub fn normal(&self, i: usize) -> Option<Vector3> {
        self.buffer(Semantic::Normal)?.vector3(i)
    }

    pub fn has_normals(&self) -> bool {
        self.buffer(Semantic::Normal)
            .map(|b| b.is_vector3())
            .unwrap_or(false)
    }

    pub fn triangle_indices(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.triangles()
    }

    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.indices.triangles().map(move |t| self.resolve(t))
    }

    pub fn bounds(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions().vectors())
    }

    /// Returns a copy of this mesh with the buffer for `buffer.semantic()` added or
    /// replaced.
    pub fn with_buffer(&self, buffer: VertexBuffer) -> MeshResult<Mesh> {
        let mut buffers: Vec<VertexBuffer> = self
            .buffers
            .iter()
            .filter(|b| b.semantic() != buffer.semantic())
            .cloned()
            .collect();
        buffers.push(buffer);
        Mesh::new(buffers, self.indices.clone())
    }

    fn resolve(&self, t: [u32; 3]) -> Triangle {
        let p = |i: u32| {
            self.position(i as usize)
                .unwrap_or_else(|| Vector3::new(0.0, 0.0, 0.0))
        };
        Triangle {
            p0: p(t[0]),
            p1: p(t[1]),
            p2: p(t[2]),
        }
    }
}

type PointKey = [OrderedFloat<f32>; 3];

impl TriangleMesh for Mesh {
    fn from_triangles(triangles: Vec<Triangle>) -> Self {
        // Triangle soups (such as STL) repeat every shared corner. Points that
        // compare equal are merged into a single vertex, so -0.0 and 0.0 share one.
        let mut lookup: HashMap<PointKey, u32> = HashMap::new();
        let mut points = Vec::new();
        let mut indices = Vec::with_capacity(triangles.len() * 3);
        for t in &triangles {
            for p in [t.p0, t.p1, t.p2] {
                let key = [OrderedFloat(p.x), OrderedFloat(p.y), OrderedFloat(p.z)];
                let index = *lookup.entry(key).or_insert_with(|| {
                    points.push(p);
                    (points.len() - 1) as u32
                });
                indices.push(index);
            }
        }
        log::debug!(
            "indexed {} triangles into {} unique vertices",
            triangles.len(),
            points.len()
        );
        Mesh {
            buffers: vec![VertexBuffer::from_vectors(Semantic::Position, &points)],
            vertex_count: points.len(),
            // Indices are produced from `points` above so they are always in range.
            indices: IndexBuffer::from_triangle_list(indices, IndexWidth::U32),
        }
    }

    fn triangle_count(&self) -> usize {
        self.indices.triangle_count()
    }

    fn triangle(&self, i: usize) -> Option<Triangle> {
        let t = self.indices.indices().get(i * 3..i * 3 + 3)?;
        Some(self.resolve([t[0], t[1], t[2]]))
    }
}
