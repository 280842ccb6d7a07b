use cgmath::InnerSpace;

pub type Vector3 = cgmath::Vector3<f32>;

// We rely on Vector3 being repr(c).
static_assertions::assert_eq_size!(Vector3, [f32; 3]);
static_assertions::assert_eq_align!(Vector3, f32);

#[derive(Debug, PartialEq, Copy, Clone)]
#[repr(C)]
pub struct Triangle {
    pub p0: Vector3,
    pub p1: Vector3,
    pub p2: Vector3,
}

impl Triangle {
    /// The non-normalized face normal, following counter-clockwise winding.
    ///
    /// The length of this vector is twice the area of the triangle, which makes
    /// it convenient for area weighting.
    pub fn scaled_normal(&self) -> Vector3 {
        (self.p1 - self.p0).cross(self.p2 - self.p0)
    }

    /// The unit face normal, or `None` for a zero-area triangle.
    pub fn normal(&self) -> Option<Vector3> {
        let n = self.scaled_normal();
        let len = n.magnitude();
        if len > f32::EPSILON {
            Some(n / len)
        } else {
            None
        }
    }

    pub fn area(&self) -> f32 {
        self.scaled_normal().magnitude() * 0.5
    }
}

/// An axis-aligned bounding box.
///
/// All containment tests are inclusive on all six faces.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct Aabb {
    pub min: Vector3,
    pub max: Vector3,
}

impl Aabb {
    pub fn new(min: Vector3, max: Vector3) -> Self {
        Self { min, max }
    }

    /// Computes the tightest box around `points`. Returns `None` for an empty iterator.
    pub fn from_points<I: IntoIterator<Item = Vector3>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        Some(iter.fold(Aabb::new(first, first), |mut b, p| {
            b.expand(p);
            b
        }))
    }

    pub fn expand(&mut self, p: Vector3) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.min.z = self.min.z.min(p.z);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
        self.max.z = self.max.z.max(p.z);
    }

    pub fn contains(&self, p: Vector3) -> bool {
        p.x >= self.min.x
            && p.x <= self.max.x
            && p.y >= self.min.y
            && p.y <= self.max.y
            && p.z >= self.min.z
            && p.z <= self.max.z
    }

    /// Returns true if the two boxes share at least one point.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    pub fn size(&self) -> Vector3 {
        self.max - self.min
    }

    pub fn translated(&self, offset: Vector3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
