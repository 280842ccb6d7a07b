use cgmath::{InnerSpace, Zero};

use crate::buffer::{Semantic, VertexBuffer};
use crate::error::MeshResult;
use crate::geometry::Vector3;
use crate::mesh::Mesh;

/// Returns a copy of `mesh` with an area-weighted vertex normal buffer.
///
/// Any existing normal buffer is replaced. Vertices that touch no triangle, or only
/// zero-area triangles, get a zero normal.
pub fn compute_vertex_normals(mesh: &Mesh) -> MeshResult<Mesh> {
    let mut normals = vec![Vector3::zero(); mesh.vertex_count()];
    for (t, corners) in mesh.triangles().zip(mesh.triangle_indices()) {
        // Magnitude is twice the triangle area, which weights the sum.
        let n = t.scaled_normal();
        for i in corners {
            normals[i as usize] += n;
        }
    }
    for n in normals.iter_mut() {
        let len = n.magnitude();
        if len > f32::EPSILON {
            *n /= len;
        } else {
            *n = Vector3::zero();
        }
    }
    log::debug!("computed normals for {} vertices", normals.len());
    mesh.with_buffer(VertexBuffer::from_vectors(Semantic::Normal, &normals))
}
