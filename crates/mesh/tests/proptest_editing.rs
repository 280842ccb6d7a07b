//! Property-based tests for the mesh editor.
//!
//! These tests use proptest to generate random meshes and verify the index
//! invariants that every edit must uphold.

use std::collections::HashSet;

use proptest::prelude::*;
use smileforge_mesh::{
    crop_to_bounds, delete_vertices, Aabb, IndexBuffer, IndexWidth, Mesh, MeshError, Semantic,
    Vector3, VertexBuffer,
};

fn arb_position() -> impl Strategy<Value = Vector3> {
    prop::array::uniform3(-10.0..10.0f32).prop_map(|[x, y, z]| Vector3::new(x, y, z))
}

/// A mesh of 3..40 vertices and 1..60 triangles with valid indices.
///
/// The color channel of vertex `i` is `(i, 0, 0)`, so every edited vertex can be
/// traced back to the vertex it was copied from.
fn arb_mesh() -> impl Strategy<Value = Mesh> {
    prop::collection::vec(arb_position(), 3..40).prop_flat_map(|positions| {
        let n = positions.len() as u32;
        prop::collection::vec(prop::array::uniform3(0..n), 1..60).prop_map(move |faces| {
            let ids: Vec<Vector3> = (0..positions.len())
                .map(|i| Vector3::new(i as f32, 0.0, 0.0))
                .collect();
            let indices = faces.into_iter().flatten().collect();
            Mesh::new(
                vec![
                    VertexBuffer::from_vectors(Semantic::Position, &positions),
                    VertexBuffer::from_vectors(Semantic::Color, &ids),
                ],
                IndexBuffer::new(indices, IndexWidth::U32).unwrap(),
            )
            .unwrap()
        })
    })
}

/// The original index of every vertex, read back from the color channel.
fn original_ids(mesh: &Mesh) -> Vec<u32> {
    let colors = mesh.buffer(Semantic::Color).unwrap();
    (0..mesh.vertex_count())
        .map(|i| colors.vector3(i).unwrap().x as u32)
        .collect()
}

fn arb_mesh_and_deletion() -> impl Strategy<Value = (Mesh, HashSet<u32>)> {
    arb_mesh().prop_flat_map(|mesh| {
        let n = mesh.vertex_count() as u32;
        let deleted = prop::collection::hash_set(0..n, 0..n as usize);
        (Just(mesh), deleted)
    })
}

proptest! {
    #[test]
    fn deletion_keeps_indices_in_range((mesh, deleted) in arb_mesh_and_deletion()) {
        match delete_vertices(&mesh, &deleted) {
            Ok(edited) => {
                prop_assert_eq!(mesh.vertex_count() - deleted.len(), edited.vertex_count());
                for &i in edited.indices().indices() {
                    prop_assert!((i as usize) < edited.vertex_count());
                }

                let ids = original_ids(&edited);
                for id in &ids {
                    prop_assert!(!deleted.contains(id));
                }
                // Surviving vertices keep their relative order.
                prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));

                // Every triangle without a deleted corner survives in order, and no other.
                let expected: Vec<[u32; 3]> = mesh
                    .indices()
                    .triangles()
                    .filter(|t| t.iter().all(|i| !deleted.contains(i)))
                    .collect();
                let actual: Vec<[u32; 3]> = edited
                    .indices()
                    .triangles()
                    .map(|t| t.map(|i| ids[i as usize]))
                    .collect();
                prop_assert_eq!(expected, actual);
            }
            Err(MeshError::DegenerateResult { .. }) => {}
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
    }

    #[test]
    fn crop_keeps_triangles_inside(mesh in arb_mesh(), min in arb_position(), max in arb_position()) {
        let (lo, hi) = (
            Vector3::new(min.x.min(max.x), min.y.min(max.y), min.z.min(max.z)),
            Vector3::new(min.x.max(max.x), min.y.max(max.y), min.z.max(max.z)),
        );
        let bounds = Aabb::new(lo, hi);
        match crop_to_bounds(&mesh, lo, hi) {
            Ok(cropped) => {
                for t in cropped.triangles() {
                    prop_assert!(bounds.contains(t.p0));
                    prop_assert!(bounds.contains(t.p1));
                    prop_assert!(bounds.contains(t.p2));
                }
                prop_assert!(cropped.vertex_count() <= mesh.vertex_count());
            }
            Err(e) => prop_assert_eq!(MeshError::EmptyResult { operation: "crop to bounds" }, e),
        }
    }
}
