use cgmath::InnerSpace;
use smileforge_mesh::{Aabb, Vector3};

use crate::config::ContactConfig;

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Ray {
    pub origin: Vector3,
    pub direction: Vector3,
}

impl Ray {
    pub fn new(origin: Vector3, direction: Vector3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vector3 {
        self.origin + self.direction * t
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub struct RayHit {
    /// Ray parameter of the hit, in units of the ray direction.
    pub t: f32,
    pub point: Vector3,
}

/// Intersects a ray with a box using the slab method.
///
/// Returns the first point the ray reaches: the entry point, or the exit point when the
/// ray starts inside the box. A ray starting on a face and pointing into the box hits
/// at `t = 0`. A ray starting on a face and pointing away misses.
pub fn intersect(ray: &Ray, aabb: &Aabb) -> Option<RayHit> {
    let mut tmin = f32::NEG_INFINITY;
    let mut tmax = f32::INFINITY;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        let (lo, hi) = (aabb.min[axis], aabb.max[axis]);
        if direction == 0.0 {
            // Parallel to this slab: either always inside it or never.
            if origin < lo || origin > hi {
                return None;
            }
            continue;
        }
        let t1 = (lo - origin) / direction;
        let t2 = (hi - origin) / direction;
        tmin = tmin.max(t1.min(t2));
        tmax = tmax.min(t1.max(t2));
    }

    if tmin > tmax || tmax < 0.0 || (tmax == 0.0 && tmin < 0.0) {
        return None;
    }
    let t = if tmin >= 0.0 { tmin } else { tmax };
    Some(RayHit {
        t,
        point: ray.at(t),
    })
}

/// One sample that touches or penetrates the antagonist.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Contact {
    pub sample: Vector3,
    /// Where the ray cast from `sample` meets the antagonist box.
    pub point: Vector3,
    /// Distance to the antagonist along the cast direction; negative when the sample is
    /// already inside it.
    pub gap: f32,
}

impl Contact {
    pub fn penetration(&self) -> f32 {
        (-self.gap).max(0.0)
    }
}

#[derive(Debug, PartialEq, Clone, Default)]
pub struct ContactReport {
    pub contacts: Vec<Contact>,
    pub max_penetration: f32,
    /// Samples whose ray never reached the antagonist.
    pub misses: usize,
}

impl ContactReport {
    pub fn is_clear(&self) -> bool {
        self.contacts.is_empty()
    }
}

/// Estimates occlusal contacts by casting a ray from every sample into the antagonist's
/// bounding box.
///
/// This approximates the antagonist by its box; it never tests the antagonist's
/// triangles. Samples within `contact_tolerance` of the box, or inside it, are contacts.
pub fn estimate_contacts(samples: &[Vector3], antagonist: &Aabb, config: &ContactConfig) -> ContactReport {
    let mut report = ContactReport::default();
    if config.direction.magnitude2() == 0.0 {
        log::warn!("contact direction is zero, no rays cast");
        report.misses = samples.len();
        return report;
    }
    let direction = config.direction.normalize();

    for &sample in samples {
        let contact = if antagonist.contains(sample) {
            // Depth is how far the sample sits past the face it entered through.
            let back = intersect(&Ray::new(sample, -direction), antagonist);
            let depth = back.map(|hit| hit.t).unwrap_or(0.0);
            Contact {
                sample,
                point: back.map(|hit| hit.point).unwrap_or(sample),
                gap: -depth,
            }
        } else {
            match intersect(&Ray::new(sample, direction), antagonist) {
                Some(hit) => Contact {
                    sample,
                    point: hit.point,
                    gap: hit.t,
                },
                None => {
                    report.misses += 1;
                    continue;
                }
            }
        };
        if contact.gap <= config.contact_tolerance {
            report.max_penetration = report.max_penetration.max(contact.penetration());
            report.contacts.push(contact);
        }
    }
    log::debug!(
        "{} contacts from {} samples, max penetration {:.3}",
        report.contacts.len(),
        samples.len(),
        report.max_penetration
    );
    report
}

/// Evaluates contacts with the sampled jaw translated by each offset in turn, as when
/// the jaw slides through an excursion.
pub fn simulate_jaw_path(
    samples: &[Vector3],
    antagonist: &Aabb,
    offsets: &[Vector3],
    config: &ContactConfig,
) -> Vec<ContactReport> {
    offsets
        .iter()
        .map(|&offset| {
            let moved: Vec<Vector3> = samples.iter().map(|&p| p + offset).collect();
            estimate_contacts(&moved, antagonist, config)
        })
        .collect()
}
