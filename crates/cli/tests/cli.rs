use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn smileforge(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_smileforge"))
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn write_cube(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, smileforge_test_data::stl_cube().bytes).unwrap();
    path
}

#[test]
fn info_reports_cube() {
    let dir = tempfile::tempdir().unwrap();
    let cube = write_cube(dir.path(), "cube.stl");
    let out = stdout(&smileforge(&["info", cube.to_str().unwrap()]));
    assert!(out.contains("vertices: 8"), "{}", out);
    assert!(out.contains("triangles: 12"), "{}", out);
    assert!(out.contains("size: 20 x 20 x 20"), "{}", out);
}

#[test]
fn crop_writes_smaller_mesh() {
    let dir = tempfile::tempdir().unwrap();
    let cube = write_cube(dir.path(), "cube.stl");
    let cropped = dir.path().join("cropped.stl");
    // Only the two triangles of the -z face lie in the z = 0 plane.
    let out = stdout(&smileforge(&[
        "crop",
        cube.to_str().unwrap(),
        "-o",
        cropped.to_str().unwrap(),
        "--min",
        "-1,-1,-1",
        "--max",
        "21,21,0",
    ]));
    assert!(out.contains("kept 2 of 12 triangles"), "{}", out);
    let mesh = smileforge_stl::read_stl::<smileforge_mesh::Mesh, _>(&cropped).unwrap();
    assert_eq!(4, mesh.vertex_count());
}

#[test]
fn deleting_every_vertex_fails() {
    let dir = tempfile::tempdir().unwrap();
    let cube = write_cube(dir.path(), "cube.stl");
    let output = smileforge(&[
        "delete",
        cube.to_str().unwrap(),
        "-o",
        dir.path().join("out.stl").to_str().unwrap(),
        "--center",
        "10,10,10",
        "--radius",
        "100",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty mesh"));
    assert!(!dir.path().join("out.stl").exists());
}

#[test]
fn outline_writes_svg() {
    let dir = tempfile::tempdir().unwrap();
    let cube = write_cube(dir.path(), "cube.stl");
    let svg = dir.path().join("outline.svg");
    let out = stdout(&smileforge(&[
        "outline",
        cube.to_str().unwrap(),
        "-o",
        svg.to_str().unwrap(),
    ]));
    assert!(out.starts_with("outline:"), "{}", out);
    let text = std::fs::read_to_string(&svg).unwrap();
    assert!(text.contains("<polyline"));
}

#[test]
fn contacts_and_axis_print_summaries() {
    let dir = tempfile::tempdir().unwrap();
    let lower = write_cube(dir.path(), "lower.stl");
    let upper = write_cube(dir.path(), "upper.stl");
    let out = stdout(&smileforge(&[
        "contacts",
        lower.to_str().unwrap(),
        upper.to_str().unwrap(),
    ]));
    assert!(out.contains("bounds overlap: true"), "{}", out);

    let out = stdout(&smileforge(&["axis", lower.to_str().unwrap()]));
    assert!(out.contains("tilt 0.0 deg"), "{}", out);
}
