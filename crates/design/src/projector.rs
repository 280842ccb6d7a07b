use cgmath::Vector2;
use smileforge_mesh::{MeshError, MeshResult, Vector3};

use crate::silhouette::SilhouetteContour;

/// Pixel dimensions of a photo.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct PhotoSize {
    pub width: f32,
    pub height: f32,
}

impl PhotoSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vector2<f32> {
        Vector2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// A pinhole camera that maps model space millimetres onto photo pixels.
///
/// Model space has +y up. The camera sits `distance_to_subject` millimetres from the
/// origin and depth grows along +z, away from the camera. `pitch` tilts the camera
/// about the x axis.
#[derive(Debug, PartialEq, Copy, Clone)]
pub struct CameraProjector {
    /// Focal length in millimetres.
    pub focal_length: f32,
    /// Sensor width in millimetres.
    pub sensor_width: f32,
    /// Distance from the camera to the model origin in millimetres.
    pub distance_to_subject: f32,
    /// Camera tilt from horizontal, in radians.
    pub pitch: f32,
}

impl Default for CameraProjector {
    fn default() -> Self {
        // A 35mm equivalent phone camera at a typical portrait distance.
        Self {
            focal_length: 26.0,
            sensor_width: 36.0,
            distance_to_subject: 300.0,
            pitch: 0.0,
        }
    }
}

impl CameraProjector {
    pub fn new(
        focal_length: f32,
        sensor_width: f32,
        distance_to_subject: f32,
        pitch: f32,
    ) -> MeshResult<Self> {
        if !pitch.is_finite() {
            return Err(MeshError::InvalidParameter {
                name: "pitch",
                value: pitch,
            });
        }
        Ok(Self {
            focal_length: MeshError::require_positive("focal_length", focal_length)?,
            sensor_width: MeshError::require_positive("sensor_width", sensor_width)?,
            distance_to_subject: MeshError::require_positive(
                "distance_to_subject",
                distance_to_subject,
            )?,
            pitch,
        })
    }

    /// Pixels per millimetre for an object at the subject distance.
    pub fn pixels_per_mm(&self, photo_width: f32) -> f32 {
        photo_width / (self.sensor_width * self.distance_to_subject / self.focal_length)
    }

    /// Projects `point` onto the photo.
    ///
    /// At depth zero the scale is exactly [`CameraProjector::pixels_per_mm`]; points
    /// nearer to the camera grow and points farther away shrink. Points at or behind
    /// the camera produce non-finite coordinates.
    pub fn project(&self, point: Vector3, photo: PhotoSize) -> Vector2<f32> {
        let (sin, cos) = self.pitch.sin_cos();
        let y = point.y * cos - point.z * sin;
        let z = point.y * sin + point.z * cos;

        // Millimetres on the sensor per millimetre in the scene.
        let depth_scale = self.focal_length / (self.distance_to_subject + z);
        let pixels_per_sensor_mm = photo.width / self.sensor_width;

        let pixel_x = point.x * depth_scale * pixels_per_sensor_mm;
        let pixel_y = y * depth_scale * pixels_per_sensor_mm;

        // Screen y grows downward.
        let center = photo.center();
        Vector2::new(center.x + pixel_x, center.y - pixel_y)
    }

    /// Returns a copy with `distance_to_subject` solved from a reference of known size.
    ///
    /// `reference_real_width` millimetres at depth zero are observed to span
    /// `reference_width_pixels` in a photo `photo_width` pixels wide.
    pub fn calibrate_from_reference(
        &self,
        reference_real_width: f32,
        reference_width_pixels: f32,
        photo_width: f32,
    ) -> MeshResult<Self> {
        let real = MeshError::require_positive("reference_real_width", reference_real_width)?;
        let pixels = MeshError::require_positive("reference_width_pixels", reference_width_pixels)?;
        let photo_width = MeshError::require_positive("photo_width", photo_width)?;

        let distance = real * photo_width * self.focal_length / (self.sensor_width * pixels);
        log::debug!(
            "calibrated subject distance {:.1}mm from {}mm over {}px",
            distance,
            real,
            pixels
        );
        Ok(Self {
            distance_to_subject: distance,
            ..*self
        })
    }

    /// Projects every point of a silhouette onto the photo.
    pub fn project_contour(&self, contour: &SilhouetteContour, photo: PhotoSize) -> Outline {
        Outline::from_points(
            contour
                .points()
                .iter()
                .map(|p| self.project(*p, photo))
                .collect(),
        )
    }
}

/// A projected silhouette in photo pixels.
#[derive(Debug, PartialEq, Clone)]
pub struct Outline {
    points: Vec<Vector2<f32>>,
    // The low/high point in this outline.
    limits_x: (f32, f32),
    limits_y: (f32, f32),
}

impl Outline {
    pub fn from_points(points: Vec<Vector2<f32>>) -> Self {
        let mut limits_x = (f32::INFINITY, f32::NEG_INFINITY);
        let mut limits_y = (f32::INFINITY, f32::NEG_INFINITY);
        for p in &points {
            limits_x = (limits_x.0.min(p.x), limits_x.1.max(p.x));
            limits_y = (limits_y.0.min(p.y), limits_y.1.max(p.y));
        }
        if points.is_empty() {
            limits_x = (0., 0.);
            limits_y = (0., 0.);
        }
        Self {
            points,
            limits_x,
            limits_y,
        }
    }

    pub fn points(&self) -> &[Vector2<f32>] {
        self.points.as_slice()
    }

    pub fn limits_x(&self) -> (f32, f32) {
        self.limits_x
    }

    pub fn limits_y(&self) -> (f32, f32) {
        self.limits_y
    }
}
