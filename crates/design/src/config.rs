use smileforge_mesh::Vector3;

/// Parameters for silhouette extraction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SilhouetteConfig {
    /// A vertex is on the rim when `|dot(normal, view)|` is below this value.
    pub rim_threshold: f32,
    /// Fallback selection: vertices with a z coordinate above this value.
    pub fallback_min_z: f32,
}

impl Default for SilhouetteConfig {
    fn default() -> Self {
        Self {
            rim_threshold: 0.2,
            fallback_min_z: 0.001,
        }
    }
}

/// Parameters for fitting a tooth row to a drawn curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveFitConfig {
    /// Curves with fewer points fall back to procedural placement.
    pub min_fit_points: usize,
    /// Unscaled width of the tooth row. When `None` the nominal widths are summed.
    pub standard_arch_width: Option<f32>,
    pub world_up: Vector3,
    /// Depth of the procedural arch per squared millimetre of lateral offset.
    pub procedural_curvature: f32,
}

impl Default for CurveFitConfig {
    fn default() -> Self {
        Self {
            min_fit_points: 5,
            standard_arch_width: None,
            world_up: Vector3::new(0.0, 1.0, 0.0),
            procedural_curvature: 0.01,
        }
    }
}

/// Parameters for occlusal contact estimation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactConfig {
    /// Direction of the ray cast from each sampled point toward the antagonist. The
    /// default points up, from the top of a lower arch into the upper arch.
    pub direction: Vector3,
    /// Samples whose gap to the antagonist is at most this are reported as contacts.
    pub contact_tolerance: f32,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            direction: Vector3::new(0.0, 1.0, 0.0),
            contact_tolerance: 0.1,
        }
    }
}

/// Parameters for the insertion axis search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InsertionConfig {
    pub up: Vector3,
    /// Largest tilt away from `up` to consider, in radians.
    pub max_tilt: f32,
    /// Tilt increment, in radians.
    pub tilt_step: f32,
    /// Number of azimuths sampled at every non-zero tilt.
    pub azimuth_steps: u32,
    /// Score penalty per radian of tilt.
    pub angle_weight: f32,
}

impl Default for InsertionConfig {
    fn default() -> Self {
        Self {
            up: Vector3::new(0.0, 1.0, 0.0),
            max_tilt: 30f32.to_radians(),
            tilt_step: 5f32.to_radians(),
            azimuth_steps: 12,
            angle_weight: 0.1,
        }
    }
}
