use cgmath::{ElementWise, Euler, InnerSpace, Matrix3, Matrix4, Quaternion, Rad, Zero};
use smileforge_mesh::{MeshError, MeshResult, Vector3};

use crate::config::CurveFitConfig;

/// Drawing state of a [`CurvePath`].
///
/// ```text
///   Empty --append--> Drawing --close--> Closed
///     ^                  |                 |
///     +------clear-------+-------clear-----+
/// ```
#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum CurveState {
    Empty,
    Drawing,
    Closed,
}

/// A polyline drawn by the user on the scan.
///
/// Points are appended while drawing. Once closed the path accepts no new points, but
/// existing points can still be dragged unless the path is locked. Closing finishes
/// the drawing; it does not join the last point back to the first.
#[derive(Debug, PartialEq, Clone)]
pub struct CurvePath {
    points: Vec<Vector3>,
    // Arc length from the first point to each point.
    cumulative: Vec<f32>,
    state: CurveState,
    locked: bool,
}

/// The closest point of a path to some query point.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct CurveProjection {
    pub arc_length: f32,
    pub point: Vector3,
    pub distance: f32,
}

impl CurvePath {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            cumulative: Vec::new(),
            state: CurveState::Empty,
            locked: false,
        }
    }

    /// Builds a path in the drawing state from already captured points.
    pub fn from_points<I: IntoIterator<Item = Vector3>>(points: I) -> Self {
        let mut path = Self::new();
        for p in points {
            path.push(p);
        }
        path
    }

    fn push(&mut self, p: Vector3) {
        let arc = match (self.points.last(), self.cumulative.last()) {
            (Some(&last), Some(&arc)) => arc + (p - last).magnitude(),
            _ => 0.0,
        };
        self.points.push(p);
        self.cumulative.push(arc);
        self.state = CurveState::Drawing;
    }

    pub fn append(&mut self, p: Vector3) -> MeshResult<()> {
        if self.state == CurveState::Closed {
            return Err(MeshError::invalid_state("cannot append to a closed curve"));
        }
        self.push(p);
        Ok(())
    }

    pub fn close(&mut self) -> MeshResult<()> {
        if self.points.len() < 3 {
            return Err(MeshError::invalid_state(format!(
                "closing a curve needs 3 points, it has {}",
                self.points.len()
            )));
        }
        self.state = CurveState::Closed;
        Ok(())
    }

    /// Drops every point and returns to the empty state.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// Moves point `i`, as when the user drags it.
    pub fn replace_point(&mut self, i: usize, p: Vector3) -> MeshResult<()> {
        if self.locked {
            return Err(MeshError::invalid_state("curve is locked"));
        }
        if i >= self.points.len() {
            return Err(MeshError::InvalidParameter {
                name: "point index",
                value: i as f32,
            });
        }
        self.points[i] = p;
        for j in i.max(1)..self.points.len() {
            self.cumulative[j] =
                self.cumulative[j - 1] + (self.points[j] - self.points[j - 1]).magnitude();
        }
        Ok(())
    }

    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn state(&self) -> CurveState {
        self.state
    }

    pub fn points(&self) -> &[Vector3] {
        self.points.as_slice()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn cumulative_lengths(&self) -> &[f32] {
        self.cumulative.as_slice()
    }

    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Position and unit tangent at `arc` along the path.
    ///
    /// `arc` is clamped to the path. Returns `None` for paths with no length.
    pub fn sample_at(&self, arc: f32) -> Option<(Vector3, Vector3)> {
        let length = self.length();
        if self.points.len() < 2 || length <= 0.0 {
            return None;
        }
        let arc = arc.clamp(0.0, length);
        // Linear scan for the first non-degenerate segment that reaches `arc`.
        let mut segment = None;
        for j in 0..self.points.len() - 1 {
            if self.cumulative[j + 1] > self.cumulative[j] {
                segment = Some(j);
                if self.cumulative[j + 1] >= arc {
                    break;
                }
            }
        }
        let j = segment?;
        let (a, b) = (self.points[j], self.points[j + 1]);
        let segment_length = self.cumulative[j + 1] - self.cumulative[j];
        let t = ((arc - self.cumulative[j]) / segment_length).clamp(0.0, 1.0);
        Some((a + (b - a) * t, (b - a) / segment_length))
    }

    /// Finds the point of the path closest to `p`, measured to each segment rather
    /// than to segment midpoints.
    pub fn nearest_point(&self, p: Vector3) -> Option<CurveProjection> {
        let first = *self.points.first()?;
        let mut best = CurveProjection {
            arc_length: 0.0,
            point: first,
            distance: (p - first).magnitude(),
        };
        for j in 0..self.points.len().saturating_sub(1) {
            let (a, b) = (self.points[j], self.points[j + 1]);
            let ab = b - a;
            let len2 = ab.magnitude2();
            let t = if len2 > 0.0 {
                ((p - a).dot(ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let q = a + ab * t;
            let distance = (p - q).magnitude();
            if distance < best.distance {
                best = CurveProjection {
                    arc_length: self.cumulative[j] + t * len2.sqrt(),
                    point: q,
                    distance,
                };
            }
        }
        Some(best)
    }
}

impl Default for CurvePath {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable identity of a tooth, such as `"T_1_L"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToothId(String);

impl ToothId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ToothId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Editable state of one tooth, including the user's manual adjustments.
#[derive(Debug, Clone, PartialEq)]
pub struct ToothState {
    pub id: ToothId,
    /// Mesial-distal width of the template tooth in millimetres.
    pub nominal_width: f32,
    /// Added to the placed position.
    pub offset: Vector3,
    /// Euler angles in radians, applied after the placed orientation.
    pub rotation: Vector3,
    /// Multiplied into the placed scale.
    pub scale: Vector3,
}

impl ToothState {
    pub fn new(id: impl Into<String>, nominal_width: f32) -> Self {
        Self {
            id: ToothId::new(id),
            nominal_width,
            offset: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

/// The teeth of a smile design, kept in their canonical left to right order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ToothRow {
    teeth: Vec<ToothState>,
}

impl ToothRow {
    pub fn new(teeth: Vec<ToothState>) -> Self {
        Self { teeth }
    }

    /// The six upper anterior teeth with typical widths, canine to canine.
    pub fn anterior() -> Self {
        Self::new(vec![
            ToothState::new("T_3_R", 7.5),
            ToothState::new("T_2_R", 6.5),
            ToothState::new("T_1_R", 8.5),
            ToothState::new("T_1_L", 8.5),
            ToothState::new("T_2_L", 6.5),
            ToothState::new("T_3_L", 7.5),
        ])
    }

    pub fn teeth(&self) -> &[ToothState] {
        self.teeth.as_slice()
    }

    pub fn len(&self) -> usize {
        self.teeth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teeth.is_empty()
    }

    pub fn get(&self, id: &ToothId) -> Option<&ToothState> {
        self.teeth.iter().find(|t| &t.id == id)
    }

    pub fn get_mut(&mut self, id: &ToothId) -> Option<&mut ToothState> {
        self.teeth.iter_mut().find(|t| &t.id == id)
    }

    /// Summed nominal width of the row in its template pose.
    pub fn nominal_width(&self) -> f32 {
        self.teeth.iter().map(|t| t.nominal_width).sum()
    }
}

/// Where a renderer should put a tooth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToothTransform {
    pub position: Vector3,
    pub rotation: Quaternion<f32>,
    pub scale: Vector3,
}

impl ToothTransform {
    pub fn to_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(self.rotation)
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// The tooth's local +z axis in world space.
    pub fn forward(&self) -> Vector3 {
        self.rotation * Vector3::unit_z()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedTooth {
    pub id: ToothId,
    /// Arc length of the tooth center along the curve; zero for procedural placement.
    pub arc_position: f32,
    pub transform: ToothTransform,
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum Placement {
    /// Teeth follow the drawn curve.
    Curve,
    /// The curve was too short to follow; teeth sit on a template arch.
    Procedural,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fit {
    pub placement: Placement,
    pub scale_to_fit: f32,
    /// In placement order along the curve.
    pub teeth: Vec<PlacedTooth>,
}

/// Orientation whose local +z is `tangent x up`, so the tooth faces out of the curve.
fn facing_rotation(tangent: Vector3, up: Vector3) -> Quaternion<f32> {
    let forward = tangent.cross(up);
    if forward.magnitude2() <= f32::EPSILON {
        // Drawn straight up or down: no meaningful facing.
        return Quaternion::new(1.0, 0.0, 0.0, 0.0);
    }
    let z = forward.normalize();
    let y = (up - z * up.dot(z)).normalize();
    let x = y.cross(z);
    Quaternion::from(Matrix3::from_cols(x, y, z))
}

fn with_overrides(tooth: &ToothState, position: Vector3, base: Quaternion<f32>, scale: f32) -> ToothTransform {
    let adjust = Quaternion::from(Euler {
        x: Rad(tooth.rotation.x),
        y: Rad(tooth.rotation.y),
        z: Rad(tooth.rotation.z),
    });
    ToothTransform {
        position: position + tooth.offset,
        rotation: base * adjust,
        scale: tooth.scale.mul_element_wise(scale),
    }
}

/// Places a row of teeth along a drawn curve.
///
/// Teeth are spread at equal arc-length intervals, each centered in its interval, and
/// scaled uniformly by `curve length / standard arch width`. A curve drawn from right
/// to left places the row in reverse so the canonical left tooth still lands on the
/// left. Each tooth faces `tangent x up`, with the tangent taken left to right, and the
/// tooth's manual offset, rotation and scale are applied on top.
///
/// Curves with fewer than `config.min_fit_points` points get [`Placement::Procedural`]
/// instead. Fewer than 2 points is an error.
pub fn fit_tooth_row_to_curve(
    curve: &CurvePath,
    row: &ToothRow,
    config: &CurveFitConfig,
) -> MeshResult<Fit> {
    if curve.len() < 2 {
        return Err(MeshError::insufficient_data(format!(
            "curve fitting needs 2 points, the curve has {}",
            curve.len()
        )));
    }
    if row.is_empty() {
        return Err(MeshError::insufficient_data("tooth row is empty"));
    }
    let standard_width = MeshError::require_positive(
        "standard_arch_width",
        config.standard_arch_width.unwrap_or_else(|| row.nominal_width()),
    )?;

    if curve.len() < config.min_fit_points {
        log::warn!(
            "curve has {} of {} points, using procedural placement",
            curve.len(),
            config.min_fit_points
        );
        return Ok(procedural_placement(row, config));
    }

    let length = curve.length();
    if length <= 0.0 {
        return Err(MeshError::insufficient_data("curve has zero length"));
    }
    let scale_to_fit = length / standard_width;

    let points = curve.points();
    let right_to_left = points[0].x > points[points.len() - 1].x;
    let ordered: Vec<&ToothState> = if right_to_left {
        row.teeth().iter().rev().collect()
    } else {
        row.teeth().iter().collect()
    };

    let step = length / ordered.len() as f32;
    let mut teeth = Vec::with_capacity(ordered.len());
    for (i, tooth) in ordered.into_iter().enumerate() {
        let arc = step * (i as f32 + 0.5);
        let (position, tangent) = curve
            .sample_at(arc)
            .ok_or_else(|| MeshError::insufficient_data("curve has zero length"))?;
        let tangent = if right_to_left { -tangent } else { tangent };
        let base = facing_rotation(tangent, config.world_up);
        log::trace!("{} at arc {:.2}: {:?}", tooth.id, arc, position);
        teeth.push(PlacedTooth {
            id: tooth.id.clone(),
            arc_position: arc,
            transform: with_overrides(tooth, position, base, scale_to_fit),
        });
    }

    log::debug!(
        "fit {} teeth to a {:.2}mm curve, scale {:.3}",
        teeth.len(),
        length,
        scale_to_fit
    );
    Ok(Fit {
        placement: Placement::Curve,
        scale_to_fit,
        teeth,
    })
}

/// Lays the row out at its nominal widths on a parabolic arch centered on the origin,
/// bending back toward -z on both sides.
fn procedural_placement(row: &ToothRow, config: &CurveFitConfig) -> Fit {
    let c = config.procedural_curvature;
    let mut cursor = -row.nominal_width() * 0.5;
    let teeth = row
        .teeth()
        .iter()
        .map(|tooth| {
            let x = cursor + tooth.nominal_width * 0.5;
            cursor += tooth.nominal_width;
            let position = Vector3::new(x, 0.0, -c * x * x);
            let tangent = Vector3::new(1.0, 0.0, -2.0 * c * x).normalize();
            PlacedTooth {
                id: tooth.id.clone(),
                arc_position: 0.0,
                transform: with_overrides(
                    tooth,
                    position,
                    facing_rotation(tangent, config.world_up),
                    1.0,
                ),
            }
        })
        .collect();
    Fit {
        placement: Placement::Procedural,
        scale_to_fit: 1.0,
        teeth,
    }
}
