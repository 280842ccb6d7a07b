use cgmath::InnerSpace;
use float_eq::assert_float_eq;
use smileforge::*;
use smileforge_mesh::Aabb;

#[test]
fn sphere_outline_spans_its_diameter() {
    let sphere = smileforge_test_data::uv_sphere(10.0, 16, 32);
    let contour = extract_silhouette(
        &sphere,
        Vector3::new(0.0, 0.0, -1.0),
        &SilhouetteConfig::default(),
    );
    assert_eq!(ContourSource::Rim, contour.source());
    // Every rim point sits on the sphere's outline as seen along z.
    for p in contour.points() {
        assert!(p.z.abs() < 2.0, "{:?} is not on the rim", p);
    }

    let camera = CameraProjector::default();
    let photo = PhotoSize::new(4000.0, 3000.0);
    let outline = camera.project_contour(&contour, photo);
    assert_eq!(contour.len(), outline.points().len());
    let radius_px = 10.0 * camera.pixels_per_mm(photo.width);
    let (lo, hi) = outline.limits_x();
    assert_float_eq!(lo, 2000.0 - radius_px, abs <= 0.01);
    assert_float_eq!(hi, 2000.0 + radius_px, abs <= 0.01);
}

#[test]
fn three_point_curve_with_two_teeth() {
    let curve = CurvePath::from_points(vec![
        Vector3::new(-10.0, 0.0, 0.0),
        Vector3::new(0.0, 0.0, 2.0),
        Vector3::new(10.0, 0.0, 0.0),
    ]);
    let length = 2.0 * 104f32.sqrt();
    assert_float_eq!(curve.length(), length, abs <= 0.0001);

    let row = ToothRow::new(vec![ToothState::new("T_1_R", 5.0), ToothState::new("T_1_L", 5.0)]);
    let config = CurveFitConfig {
        min_fit_points: 3,
        ..CurveFitConfig::default()
    };
    let fit = fit_tooth_row_to_curve(&curve, &row, &config).unwrap();
    assert_eq!(Placement::Curve, fit.placement);
    assert_float_eq!(fit.scale_to_fit, length / 10.0, abs <= 0.0001);

    let [first, second] = [&fit.teeth[0], &fit.teeth[1]];
    assert_eq!("T_1_R", first.id.as_str());
    assert_float_eq!(first.arc_position, length / 4.0, abs <= 0.0001);
    assert_float_eq!(second.arc_position, 3.0 * length / 4.0, abs <= 0.0001);
    // Halfway along each segment.
    assert_float_eq!(first.transform.position.x, -5.0, abs <= 0.0001);
    assert_float_eq!(first.transform.position.z, 1.0, abs <= 0.0001);
    assert_float_eq!(second.transform.position.x, 5.0, abs <= 0.0001);

    // Facing is tangent x up along the first segment.
    let tangent = Vector3::new(10.0, 0.0, 2.0).normalize();
    let forward = first.transform.forward();
    assert_float_eq!(forward.x, -tangent.z, abs <= 0.0001);
    assert_float_eq!(forward.z, tangent.x, abs <= 0.0001);
}

#[test]
fn tooth_centers_advance_along_the_curve() {
    let curve = CurvePath::from_points(
        (0..12).map(|i| {
            let x = i as f32 * 4.0 - 22.0;
            Vector3::new(x, 0.0, -0.02 * x * x)
        }),
    );
    let fit = fit_tooth_row_to_curve(&curve, &ToothRow::anterior(), &CurveFitConfig::default()).unwrap();
    assert_eq!(Placement::Curve, fit.placement);
    for pair in fit.teeth.windows(2) {
        assert!(pair[0].arc_position < pair[1].arc_position);
        assert!(pair[0].transform.position.x < pair[1].transform.position.x);
    }
}

#[test]
fn arches_in_light_contact() {
    let lower = smileforge_test_data::cube(10.0);
    let samples = sample_occlusal_surface(&lower, 4).unwrap();
    assert_eq!(4, samples.len());
    assert!(samples.iter().all(|p| p.y == 10.0));

    let lower_bounds = lower.bounds().unwrap();
    let upper = lower_bounds.translated(Vector3::new(0.0, 10.05, 0.0));
    assert!(!lower_bounds.overlaps(&upper));

    let config = ContactConfig::default();
    let report = estimate_contacts(&samples, &upper, &config);
    assert_eq!(4, report.contacts.len());
    assert_eq!(0.0, report.max_penetration);

    let path = simulate_jaw_path(
        &samples,
        &upper,
        &[Vector3::new(0.0, 0.0, 0.0), Vector3::new(0.0, 0.5, 0.0)],
        &config,
    );
    assert_float_eq!(path[1].max_penetration, 0.45, abs <= 0.0001);
}

#[test]
fn cube_inserts_along_vertical() {
    let cube = smileforge_test_data::cube(10.0);
    let best = best_insertion_axis(&cube, &InsertionConfig::default()).unwrap();
    assert_eq!(Vector3::new(0.0, 1.0, 0.0), best.direction);
    assert_eq!(0.0, best.min_clearance);
    assert_eq!(0.0, best.score);
}

#[test]
fn no_samples_no_contacts() {
    let antagonist = Aabb::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0));
    let report = estimate_contacts(&[], &antagonist, &ContactConfig::default());
    assert!(report.is_clear());
    assert_eq!(0, report.misses);
}
