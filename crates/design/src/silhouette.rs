use std::cmp::Reverse;
use std::collections::HashMap;
use std::hash::Hash;

use cgmath::InnerSpace;
use ordered_float::OrderedFloat;
use smileforge_mesh::{Mesh, MeshError, MeshResult, Vector3};

use crate::config::SilhouetteConfig;

/// How the points of a contour were selected.
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum ContourSource {
    /// Vertices whose normal is nearly perpendicular to the view direction.
    Rim,
    /// Front region fallback, used when no rim vertex was found.
    Fallback,
}

/// An ordered run of points approximating the outline of a mesh as seen from one
/// direction.
#[derive(Debug, PartialEq, Clone)]
pub struct SilhouetteContour {
    points: Vec<Vector3>,
    source: ContourSource,
}

impl SilhouetteContour {
    pub fn points(&self) -> &[Vector3] {
        self.points.as_slice()
    }

    pub fn source(&self) -> ContourSource {
        self.source
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Extracts the silhouette of `mesh` as seen along `view_direction`.
///
/// Rim vertices are those with `|dot(normal, view)| < rim_threshold`. If the mesh has
/// no normals, or no vertex passes the test, the vertices with `z > fallback_min_z`
/// are used instead. Either way the points are chained into a path by repeatedly
/// taking the nearest unvisited point. The result may be empty.
pub fn extract_silhouette(
    mesh: &Mesh,
    view_direction: Vector3,
    config: &SilhouetteConfig,
) -> SilhouetteContour {
    let mut points = Vec::new();
    if mesh.has_normals() && view_direction.magnitude2() > 0.0 {
        let view = view_direction.normalize();
        points = (0..mesh.vertex_count())
            .filter_map(|i| Some((mesh.position(i)?, mesh.normal(i)?)))
            .filter(|(_, n)| n.dot(view).abs() < config.rim_threshold)
            .map(|(p, _)| p)
            .collect();
    }

    let source = if points.is_empty() {
        log::warn!(
            "no rim vertices for view {:?}, using front region fallback",
            view_direction
        );
        points = mesh
            .positions()
            .vectors()
            .filter(|p| p.z > config.fallback_min_z)
            .collect();
        ContourSource::Fallback
    } else {
        ContourSource::Rim
    };

    log::debug!("silhouette: {} points ({:?})", points.len(), source);
    SilhouetteContour {
        points: chain_nearest(points),
        source,
    }
}

/// Orders points into a path by greedy nearest neighbour chaining, starting from the
/// first point. Ties go to the earliest remaining point.
pub fn chain_nearest(mut remaining: Vec<Vector3>) -> Vec<Vector3> {
    let mut path = Vec::with_capacity(remaining.len());
    if remaining.is_empty() {
        return path;
    }
    let mut current = remaining.remove(0);
    path.push(current);
    while !remaining.is_empty() {
        let mut best = 0;
        let mut best_distance = f32::INFINITY;
        for (i, p) in remaining.iter().enumerate() {
            let d = (*p - current).magnitude2();
            if d < best_distance {
                best = i;
                best_distance = d;
            }
        }
        current = remaining.remove(best);
        path.push(current);
    }
    path
}

/// Samples the biting surface: the highest vertices by y.
///
/// Returns `max(density, vertex_count / 5)` points, or every vertex if the mesh has
/// fewer, ordered from the highest down.
pub fn sample_occlusal_surface(mesh: &Mesh, density: usize) -> MeshResult<Vec<Vector3>> {
    if density == 0 {
        return Err(MeshError::InvalidParameter {
            name: "density",
            value: 0.0,
        });
    }
    let mut points: Vec<Vector3> = mesh.positions().vectors().collect();
    // Stable, so vertices of equal height keep their index order.
    points.sort_by_key(|p| Reverse(OrderedFloat(p.y)));
    let take = density.max(points.len() / 5).min(points.len());
    points.truncate(take);
    log::debug!(
        "sampled {} occlusal points from {} vertices",
        take,
        mesh.vertex_count()
    );
    Ok(points)
}

/// Memoizes contours per source mesh.
///
/// The caller chooses the key that identifies a mesh, such as a tooth id. An entry is
/// recomputed when it is requested for a different view direction.
#[derive(Debug)]
pub struct SilhouetteCache<K: Hash + Eq> {
    entries: HashMap<K, (Vector3, SilhouetteContour)>,
}

impl<K: Hash + Eq> Default for SilhouetteCache<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq> SilhouetteCache<K> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get_or_extract(
        &mut self,
        key: K,
        mesh: &Mesh,
        view_direction: Vector3,
        config: &SilhouetteConfig,
    ) -> &SilhouetteContour {
        let entry = self
            .entries
            .entry(key)
            .and_modify(|(view, contour)| {
                if *view != view_direction {
                    *view = view_direction;
                    *contour = extract_silhouette(mesh, view_direction, config);
                }
            })
            .or_insert_with(|| (view_direction, extract_silhouette(mesh, view_direction, config)));
        &entry.1
    }

    pub fn get(&self, key: &K) -> Option<&SilhouetteContour> {
        self.entries.get(key).map(|(_, c)| c)
    }

    /// Drops the cached contour for a mesh that has been edited.
    pub fn invalidate(&mut self, key: &K) {
        self.entries.remove(key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
