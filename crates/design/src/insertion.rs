use std::f32::consts::{PI, TAU};

use cgmath::InnerSpace;
use smileforge_mesh::{Mesh, MeshError, MeshResult, Vector3};

use crate::config::InsertionConfig;

/// A possible path of insertion for a restoration, scored against a prepared mesh.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct InsertionAxisCandidate {
    /// Unit direction.
    pub direction: Vector3,
    /// Radians between `direction` and vertical.
    pub angle_from_vertical: f32,
    /// Smallest `dot(face normal, direction)` over the occlusal-facing faces. Negative
    /// values mean some face is undercut along this axis.
    pub min_clearance: f32,
    pub score: f32,
}

impl InsertionAxisCandidate {
    pub fn has_undercut(&self) -> bool {
        self.min_clearance < 0.0
    }
}

// Two unit vectors spanning the plane perpendicular to `up`.
fn perpendicular_basis(up: Vector3) -> (Vector3, Vector3) {
    let reference = if up.z.abs() < 0.9 {
        Vector3::unit_z()
    } else {
        Vector3::unit_x()
    };
    let e1 = up.cross(reference).normalize();
    let e2 = up.cross(e1);
    (e1, e2)
}

/// Directions to evaluate, each paired with its tilt from `config.up`, in order of
/// increasing tilt.
pub fn candidate_directions(config: &InsertionConfig) -> MeshResult<Vec<(Vector3, f32)>> {
    if config.up.magnitude2() == 0.0 {
        return Err(MeshError::InvalidParameter {
            name: "up",
            value: 0.0,
        });
    }
    let step = MeshError::require_positive("tilt_step", config.tilt_step)?;
    // max_tilt is a polar angle, so it lies in [0, pi].
    if !config.max_tilt.is_finite() || config.max_tilt < 0.0 || config.max_tilt > PI {
        return Err(MeshError::InvalidParameter {
            name: "max_tilt",
            value: config.max_tilt,
        });
    }
    if config.azimuth_steps == 0 {
        return Err(MeshError::InvalidParameter {
            name: "azimuth_steps",
            value: 0.0,
        });
    }

    let up = config.up.normalize();
    let (e1, e2) = perpendicular_basis(up);
    // Small slack so that a max_tilt that is a multiple of the step is included.
    let tilts = (config.max_tilt / step + 1e-4).floor() as u32;

    let mut directions = vec![(up, 0.0)];
    for k in 1..=tilts {
        let tilt = k as f32 * step;
        let (sin_t, cos_t) = tilt.sin_cos();
        for j in 0..config.azimuth_steps {
            let azimuth = TAU * j as f32 / config.azimuth_steps as f32;
            let (sin_a, cos_a) = azimuth.sin_cos();
            let side = e1 * cos_a + e2 * sin_a;
            directions.push(((up * cos_t + side * sin_t).normalize(), tilt));
        }
    }
    Ok(directions)
}

/// Searches for the insertion axis with the best clearance, trading clearance against
/// tilt by `config.angle_weight`.
///
/// Only faces whose normal points into the upper hemisphere take part. Among equal
/// scores the less tilted candidate wins.
pub fn best_insertion_axis(mesh: &Mesh, config: &InsertionConfig) -> MeshResult<InsertionAxisCandidate> {
    let candidates = candidate_directions(config)?;
    let up = config.up.normalize();

    let normals: Vec<Vector3> = mesh
        .triangles()
        .filter_map(|t| t.normal())
        .filter(|n| n.dot(up) >= 0.0)
        .collect();
    if normals.is_empty() {
        return Err(MeshError::invalid_geometry(
            "no occlusal facing triangles to evaluate",
        ));
    }

    let mut best: Option<InsertionAxisCandidate> = None;
    for (direction, angle) in candidates {
        let min_clearance = normals
            .iter()
            .map(|n| n.dot(direction))
            .fold(f32::INFINITY, f32::min);
        let candidate = InsertionAxisCandidate {
            direction,
            angle_from_vertical: angle,
            min_clearance,
            score: min_clearance - config.angle_weight * angle,
        };
        if best.map_or(true, |b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }

    // Never empty: the untilted direction is always a candidate.
    let best = best.ok_or_else(|| MeshError::invalid_geometry("no insertion candidates"))?;
    log::debug!(
        "insertion axis {:?} at {:.1} degrees, clearance {:.3}",
        best.direction,
        best.angle_from_vertical.to_degrees(),
        best.min_clearance
    );
    Ok(best)
}
