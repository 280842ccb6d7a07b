//! Whole-mesh edits that drop geometry and renumber what is left.
//!
//! Every edit follows the same shape:
//!
//!  1. decide which original vertices survive, producing a [`KeptVertexMap`],
//!  2. copy the surviving vertices of every buffer, in ascending original order,
//!  3. rewrite the triangle list through the map, dropping any triangle that
//!     touches a removed vertex.
//!
//! The input mesh is never modified and nothing is returned unless the whole edit
//! succeeds.

use std::collections::HashSet;

use cgmath::InnerSpace;

use crate::buffer::{IndexBuffer, VertexBuffer};
use crate::error::{MeshError, MeshResult};
use crate::geometry::{Aabb, Vector3};
use crate::mesh::Mesh;

/// Where an original vertex ended up after an edit.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum VertexSlot {
    Kept(u32),
    Deleted,
}

/// Maps every original vertex index to its compacted index, or marks it deleted.
///
/// Compacted indices are handed out in ascending original order so that an edit
/// never reshuffles the surviving vertices.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct KeptVertexMap {
    slots: Vec<VertexSlot>,
    kept: usize,
}

impl KeptVertexMap {
    /// Builds a map keeping every vertex for which `keep` returns true.
    pub fn from_predicate<F: FnMut(usize) -> bool>(vertex_count: usize, mut keep: F) -> Self {
        let mut next = 0u32;
        let slots = (0..vertex_count)
            .map(|i| {
                if keep(i) {
                    next += 1;
                    VertexSlot::Kept(next - 1)
                } else {
                    VertexSlot::Deleted
                }
            })
            .collect();
        Self {
            slots,
            kept: next as usize,
        }
    }

    pub fn from_deleted(vertex_count: usize, deleted: &HashSet<u32>) -> Self {
        Self::from_predicate(vertex_count, |i| !deleted.contains(&(i as u32)))
    }

    pub fn slot(&self, original: u32) -> VertexSlot {
        self.slots
            .get(original as usize)
            .copied()
            .unwrap_or(VertexSlot::Deleted)
    }

    pub fn get(&self, original: u32) -> Option<u32> {
        match self.slot(original) {
            VertexSlot::Kept(i) => Some(i),
            VertexSlot::Deleted => None,
        }
    }

    pub fn kept_count(&self) -> usize {
        self.kept
    }

    pub fn original_count(&self) -> usize {
        self.slots.len()
    }

    /// Original indices of the kept vertices, ascending.
    pub fn kept_originals(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| matches!(s, VertexSlot::Kept(_)))
            .map(|(i, _)| i)
    }

    /// Renumbers a triangle, or returns `None` if any corner was deleted.
    pub fn remap_triangle(&self, t: [u32; 3]) -> Option<[u32; 3]> {
        Some([self.get(t[0])?, self.get(t[1])?, self.get(t[2])?])
    }
}

/// Copies the kept vertices of every buffer and renumbers the surviving triangles.
fn apply_map(
    mesh: &Mesh,
    map: &KeptVertexMap,
    triangles: impl Iterator<Item = [u32; 3]>,
    operation: &'static str,
) -> MeshResult<Mesh> {
    if map.kept_count() == 0 {
        return Err(MeshError::EmptyResult { operation });
    }

    let indices: Vec<u32> = triangles
        .filter_map(|t| map.remap_triangle(t))
        .flatten()
        .collect();
    if indices.is_empty() {
        return Err(MeshError::DegenerateResult {
            operation,
            kept_vertices: map.kept_count(),
        });
    }

    let buffers: Vec<VertexBuffer> = mesh
        .buffers()
        .iter()
        .map(|b| b.compact(map.kept_originals()))
        .collect();

    log::debug!(
        "{}: {} -> {} vertices, {} -> {} triangles",
        operation,
        mesh.vertex_count(),
        map.kept_count(),
        mesh.indices().triangle_count(),
        indices.len() / 3
    );

    Mesh::new(
        buffers,
        IndexBuffer::from_triangle_list(indices, mesh.indices().width()),
    )
}

fn check_indices(indices: &HashSet<u32>, limit: usize, what: &str) -> MeshResult<()> {
    match indices.iter().find(|&&i| i as usize >= limit) {
        Some(i) => Err(MeshError::invalid_geometry(format!(
            "{} {} out of range, mesh has {}",
            what, i, limit
        ))),
        None => Ok(()),
    }
}

/// Removes the given vertices and every triangle that uses one of them.
///
/// The result has exactly `vertex_count - vertices.len()` vertices. Deleting every
/// vertex is an [`MeshError::EmptyResult`]; deleting enough that no triangle
/// survives is a [`MeshError::DegenerateResult`].
pub fn delete_vertices(mesh: &Mesh, vertices: &HashSet<u32>) -> MeshResult<Mesh> {
    check_indices(vertices, mesh.vertex_count(), "vertex")?;
    let map = KeptVertexMap::from_deleted(mesh.vertex_count(), vertices);
    apply_map(mesh, &map, mesh.triangle_indices(), "delete vertices")
}

/// Keeps only the triangles whose three corners lie inside the box `[min, max]`.
///
/// Unlike [`delete_vertices`] the test is made per triangle. A vertex shared by a
/// kept and a dropped triangle survives, and a vertex shared by several kept
/// triangles is copied once.
pub fn crop_to_bounds(mesh: &Mesh, min: Vector3, max: Vector3) -> MeshResult<Mesh> {
    let bounds = Aabb::new(min, max);
    let inside: Vec<bool> = mesh.positions().vectors().map(|p| bounds.contains(p)).collect();

    let kept: Vec<[u32; 3]> = mesh
        .triangle_indices()
        .filter(|t| t.iter().all(|&i| inside[i as usize]))
        .collect();
    if kept.is_empty() {
        return Err(MeshError::EmptyResult {
            operation: "crop to bounds",
        });
    }

    let mut referenced = vec![false; mesh.vertex_count()];
    for &i in kept.iter().flatten() {
        referenced[i as usize] = true;
    }
    let map = KeptVertexMap::from_predicate(mesh.vertex_count(), |i| referenced[i]);
    apply_map(mesh, &map, kept.into_iter(), "crop to bounds")
}

/// Removes the given triangles, then every vertex no triangle references any more.
pub fn delete_triangles(mesh: &Mesh, triangles: &HashSet<u32>) -> MeshResult<Mesh> {
    check_indices(triangles, mesh.indices().triangle_count(), "triangle")?;

    let kept: Vec<[u32; 3]> = mesh
        .triangle_indices()
        .enumerate()
        .filter(|(i, _)| !triangles.contains(&(*i as u32)))
        .map(|(_, t)| t)
        .collect();
    if kept.is_empty() {
        return Err(MeshError::EmptyResult {
            operation: "delete triangles",
        });
    }

    let mut referenced = vec![false; mesh.vertex_count()];
    for &i in kept.iter().flatten() {
        referenced[i as usize] = true;
    }
    let map = KeptVertexMap::from_predicate(mesh.vertex_count(), |i| referenced[i]);
    apply_map(mesh, &map, kept.into_iter(), "delete triangles")
}

/// Selects the vertices within `radius` of `center`, as a cleanup brush would.
pub fn vertices_within_radius(mesh: &Mesh, center: Vector3, radius: f32) -> HashSet<u32> {
    let r2 = radius * radius;
    mesh.positions()
        .vectors()
        .enumerate()
        .filter(|(_, p)| (*p - center).magnitude2() <= r2)
        .map(|(i, _)| i as u32)
        .collect()
}

/// Selects the vertices outside `bounds`.
pub fn vertices_outside_bounds(mesh: &Mesh, bounds: &Aabb) -> HashSet<u32> {
    mesh.positions()
        .vectors()
        .enumerate()
        .filter(|(_, p)| !bounds.contains(*p))
        .map(|(i, _)| i as u32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{IndexWidth, Semantic};
    use crate::ErrorCode;

    // A strip of two quads:
    //
    //   3 ---- 4 ---- 5
    //   | \    | \    |
    //   |  \   |  \   |
    //   0 ---- 1 ---- 2
    fn strip() -> Mesh {
        Mesh::from_parts(
            &[
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(2.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(2.0, 1.0, 0.0),
            ],
            None,
            vec![0, 1, 3, 1, 4, 3, 1, 2, 4, 2, 5, 4],
        )
        .unwrap()
    }

    fn set(items: &[u32]) -> HashSet<u32> {
        items.iter().copied().collect()
    }

    #[test]
    fn kept_map_uses_sentinel() {
        let map = KeptVertexMap::from_deleted(4, &set(&[1, 2]));
        assert_eq!(VertexSlot::Kept(0), map.slot(0));
        assert_eq!(VertexSlot::Deleted, map.slot(1));
        assert_eq!(VertexSlot::Kept(1), map.slot(3));
        assert_eq!(VertexSlot::Deleted, map.slot(99));
        assert_eq!(2, map.kept_count());
        assert_eq!(vec![0, 3], map.kept_originals().collect::<Vec<_>>());
        assert_eq!(None, map.remap_triangle([0, 1, 3]));
        assert_eq!(Some([1, 0, 1]), map.remap_triangle([3, 0, 3]));
    }

    #[test]
    fn delete_corner() {
        let mesh = delete_vertices(&strip(), &set(&[0])).unwrap();
        assert_eq!(5, mesh.vertex_count());
        assert_eq!(3, mesh.indices().triangle_count());
        assert_eq!(vec![0, 3, 2, 0, 1, 3, 1, 4, 3], mesh.indices().indices());
        assert_eq!(Some(Vector3::new(1.0, 0.0, 0.0)), mesh.position(0));
    }

    #[test]
    fn delete_nothing_is_a_copy() {
        let original = strip();
        let mesh = delete_vertices(&original, &HashSet::new()).unwrap();
        assert_eq!(original, mesh);
    }

    #[test]
    fn delete_everything_is_rejected() {
        let err = delete_vertices(&strip(), &(0..6).collect()).unwrap_err();
        assert_eq!(ErrorCode::EmptyResult, err.code());
    }

    #[test]
    fn delete_leaving_no_faces_is_degenerate() {
        // Four vertices survive, but every triangle touches 1 or 4.
        let err = delete_vertices(&strip(), &set(&[1, 4])).unwrap_err();
        assert_eq!(
            MeshError::DegenerateResult {
                operation: "delete vertices",
                kept_vertices: 4
            },
            err
        );
    }

    #[test]
    fn delete_rejects_out_of_range() {
        let err = delete_vertices(&strip(), &set(&[6])).unwrap_err();
        assert_eq!(ErrorCode::InvalidGeometry, err.code());
    }

    #[test]
    fn delete_keeps_index_width() {
        let original = strip();
        let indices = IndexBuffer::new(original.indices().indices().to_vec(), IndexWidth::U16).unwrap();
        let mesh = Mesh::new(original.buffers().to_vec(), indices).unwrap();
        let edited = delete_vertices(&mesh, &set(&[5])).unwrap();
        assert_eq!(IndexWidth::U16, edited.indices().width());
    }

    #[test]
    fn delete_compacts_interleaved_buffers() {
        use byteorder::{ByteOrder, LittleEndian};
        // 3 vertices, position then normal in each 24 byte stride.
        let mut data = vec![0u8; 72];
        LittleEndian::write_f32_into(
            &[
                0.0, 0.0, 0.0, 0.0, 0.0, 1.0, //
                1.0, 0.0, 0.0, 0.0, 1.0, 0.0, //
                0.0, 1.0, 0.0, 1.0, 0.0, 0.0,
            ],
            &mut data,
        );
        let mesh = Mesh::new(
            vec![
                VertexBuffer::new(Semantic::Position, data.clone(), 3, 3, 4, 24, 0).unwrap(),
                VertexBuffer::new(Semantic::Normal, data, 3, 3, 4, 24, 12).unwrap(),
            ],
            IndexBuffer::new(vec![0, 1, 2, 2, 1, 0], IndexWidth::U32).unwrap(),
        )
        .unwrap();
        // Nothing to delete, but the copy is still packed.
        let edited = delete_vertices(&mesh, &HashSet::new()).unwrap();
        let normals = edited.buffer(Semantic::Normal).unwrap();
        assert_eq!(12, normals.stride());
        assert_eq!(0, normals.offset());
        assert_eq!(Some(Vector3::new(1.0, 0.0, 0.0)), edited.normal(2));
        assert_eq!(Some(Vector3::new(0.0, 1.0, 0.0)), edited.position(2));
    }

    #[test]
    fn crop_keeps_contained_triangles() {
        let mesh = crop_to_bounds(
            &strip(),
            Vector3::new(-0.5, -0.5, -0.5),
            Vector3::new(1.0, 1.0, 0.5),
        )
        .unwrap();
        assert_eq!(4, mesh.vertex_count());
        assert_eq!(vec![0, 1, 2, 1, 3, 2], mesh.indices().indices());
    }

    #[test]
    fn crop_bounds_are_inclusive() {
        let mesh = crop_to_bounds(
            &strip(),
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(2.0, 1.0, 0.0),
        )
        .unwrap();
        assert_eq!(strip(), mesh);
    }

    #[test]
    fn crop_outside_everything_is_empty() {
        let err = crop_to_bounds(
            &strip(),
            Vector3::new(10.0, 10.0, 10.0),
            Vector3::new(11.0, 11.0, 11.0),
        )
        .unwrap_err();
        assert_eq!(ErrorCode::EmptyResult, err.code());
    }

    #[test]
    fn delete_triangles_drops_orphans() {
        let mesh = delete_triangles(&strip(), &set(&[0, 1])).unwrap();
        assert_eq!(4, mesh.vertex_count());
        assert_eq!(vec![0, 1, 2, 1, 3, 2], mesh.indices().indices());
        assert_eq!(Some(Vector3::new(1.0, 0.0, 0.0)), mesh.position(0));
    }

    #[test]
    fn delete_all_triangles_is_empty() {
        let err = delete_triangles(&strip(), &set(&[0, 1, 2, 3])).unwrap_err();
        assert_eq!(ErrorCode::EmptyResult, err.code());
    }

    #[test]
    fn brush_selection() {
        let selected = vertices_within_radius(&strip(), Vector3::new(0.0, 0.0, 0.0), 1.0);
        assert_eq!(set(&[0, 1, 3]), selected);
    }

    #[test]
    fn outside_selection() {
        let bounds = Aabb::new(Vector3::new(0.5, -1.0, -1.0), Vector3::new(3.0, 3.0, 1.0));
        assert_eq!(set(&[0, 3]), vertices_outside_bounds(&strip(), &bounds));
    }
}
