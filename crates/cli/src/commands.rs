use std::collections::HashSet;
use std::io::Write;

use anyhow::{bail, Context, Result};
use smileforge::{
    best_insertion_axis, estimate_contacts, extract_silhouette, sample_occlusal_surface,
    simulate_jaw_path, CameraProjector, ContactConfig, ContactReport, InsertionConfig, PhotoSize,
    SilhouetteConfig,
};
use smileforge_mesh::{
    compute_vertex_normals, crop_to_bounds, delete_vertices, vertices_within_radius, Mesh,
    Vector3,
};

use crate::args;
use crate::svg;

fn load(path: &str) -> Result<Mesh> {
    let mesh = smileforge_stl::read_stl::<Mesh, _>(path)
        .with_context(|| format!("failed to read stl {}", path))?;
    log::info!(
        "loaded {}: {} vertices, {} triangles",
        path,
        mesh.vertex_count(),
        mesh.indices().triangle_count()
    );
    Ok(mesh)
}

fn save(mesh: &Mesh, path: &str) -> Result<()> {
    smileforge_stl::write_stl(mesh, path).with_context(|| format!("failed to write stl {}", path))
}

pub fn info_command<W: Write>(args: args::InfoArgs, out: &mut W) -> Result<()> {
    let mesh = load(&args.stl_path)?;
    writeln!(out, "vertices: {}", mesh.vertex_count())?;
    writeln!(out, "triangles: {}", mesh.indices().triangle_count())?;
    if let Some(bounds) = mesh.bounds() {
        let size = bounds.size();
        writeln!(
            out,
            "bounds: ({}, {}, {}) .. ({}, {}, {})",
            bounds.min.x, bounds.min.y, bounds.min.z, bounds.max.x, bounds.max.y, bounds.max.z
        )?;
        writeln!(out, "size: {} x {} x {}", size.x, size.y, size.z)?;
    }
    Ok(())
}

pub fn delete_command<W: Write>(args: args::DeleteArgs, out: &mut W) -> Result<()> {
    let mesh = load(&args.stl_path)?;
    let mut vertices: HashSet<u32> = args.vertices.iter().copied().collect();
    if let Some(center) = args.center {
        vertices.extend(vertices_within_radius(&mesh, center, args.radius));
    }
    if vertices.is_empty() {
        bail!("nothing to delete, pass --vertices or --center");
    }
    let edited = delete_vertices(&mesh, &vertices)
        .with_context(|| format!("failed to delete {} vertices", vertices.len()))?;
    save(&edited, &args.output)?;
    writeln!(
        out,
        "deleted {} vertices, {} remain",
        mesh.vertex_count() - edited.vertex_count(),
        edited.vertex_count()
    )?;
    Ok(())
}

pub fn crop_command<W: Write>(args: args::CropArgs, out: &mut W) -> Result<()> {
    let mesh = load(&args.stl_path)?;
    let cropped = crop_to_bounds(&mesh, args.min, args.max).context("failed to crop")?;
    save(&cropped, &args.output)?;
    writeln!(
        out,
        "kept {} of {} triangles",
        cropped.indices().triangle_count(),
        mesh.indices().triangle_count()
    )?;
    Ok(())
}

pub fn outline_command<W: Write>(args: args::OutlineArgs, out: &mut W) -> Result<()> {
    let mesh = load(&args.stl_path)?;
    // Stl files carry facet normals only.
    let mesh = compute_vertex_normals(&mesh)?;
    let contour = extract_silhouette(&mesh, args.view, &SilhouetteConfig::default());
    let camera = CameraProjector::new(
        args.focal_length,
        args.sensor_width,
        args.distance,
        args.pitch.to_radians(),
    )?;
    let photo = PhotoSize::new(args.width, args.height);
    let outline = camera.project_contour(&contour, photo);

    let mut f = std::io::BufWriter::new(
        std::fs::File::create(&args.output)
            .with_context(|| format!("failed to create {}", args.output))?,
    );
    svg::write_outline(&mut f, &outline, photo)?;
    f.flush()?;
    writeln!(
        out,
        "outline: {} points ({:?}), {:.2} px/mm",
        outline.points().len(),
        contour.source(),
        camera.pixels_per_mm(photo.width)
    )?;
    Ok(())
}

fn print_report<W: Write>(out: &mut W, label: &str, report: &ContactReport) -> Result<()> {
    writeln!(
        out,
        "{}: {} contacts, max penetration {:.3} mm, {} misses",
        label,
        report.contacts.len(),
        report.max_penetration,
        report.misses
    )?;
    Ok(())
}

pub fn contacts_command<W: Write>(args: args::ContactsArgs, out: &mut W) -> Result<()> {
    let lower = load(&args.lower)?;
    let upper = load(&args.upper)?;
    let (lower_bounds, upper_bounds) = match (lower.bounds(), upper.bounds()) {
        (Some(l), Some(u)) => (l, u),
        _ => bail!("both arches need vertices"),
    };
    writeln!(out, "bounds overlap: {}", lower_bounds.overlaps(&upper_bounds))?;

    let samples = sample_occlusal_surface(&lower, args.density)?;
    let config = ContactConfig {
        contact_tolerance: args.tolerance,
        ..ContactConfig::default()
    };

    match args.excursion {
        None => print_report(out, "rest", &estimate_contacts(&samples, &upper_bounds, &config))?,
        Some(excursion) => {
            if args.steps == 0 {
                bail!("--steps must be at least 1");
            }
            let last = (args.steps - 1).max(1) as f32;
            let offsets: Vec<Vector3> = (0..args.steps)
                .map(|i| excursion * (i as f32 / last))
                .collect();
            let reports = simulate_jaw_path(&samples, &upper_bounds, &offsets, &config);
            for (offset, report) in offsets.iter().zip(&reports) {
                let label = format!("offset ({:.2}, {:.2}, {:.2})", offset.x, offset.y, offset.z);
                print_report(out, &label, report)?;
            }
        }
    }
    Ok(())
}

pub fn axis_command<W: Write>(args: args::AxisArgs, out: &mut W) -> Result<()> {
    let mesh = load(&args.stl_path)?;
    let config = InsertionConfig {
        max_tilt: args.max_tilt.to_radians(),
        tilt_step: args.tilt_step.to_radians(),
        azimuth_steps: args.azimuths,
        angle_weight: args.angle_weight,
        ..InsertionConfig::default()
    };
    let best = best_insertion_axis(&mesh, &config)?;
    writeln!(
        out,
        "axis: ({:.4}, {:.4}, {:.4}) tilt {:.1} deg, clearance {:.4}, score {:.4}{}",
        best.direction.x,
        best.direction.y,
        best.direction.z,
        best.angle_from_vertical.to_degrees(),
        best.min_clearance,
        best.score,
        if best.has_undercut() { " (undercut)" } else { "" }
    )?;
    Ok(())
}
