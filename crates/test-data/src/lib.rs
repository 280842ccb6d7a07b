use std::f32::consts::PI;

use byteorder::{LittleEndian, WriteBytesExt};
use smileforge_mesh::{Mesh, Triangle, Vector3};

pub struct TestModel {
    pub bytes: Vec<u8>,
    pub triangles: usize,
    pub model_height: f32,
}

/// A strip of two quads split into four triangles.
///
/// ```text
///   3 ---- 4 ---- 5
///   | \    | \    |
///   |  \   |  \   |
///   0 ---- 1 ---- 2
/// ```
///
/// Vertex 0 is a corner used by exactly one triangle.
pub fn quad_strip() -> Mesh {
    Mesh::from_parts(
        &[
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(2.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
            Vector3::new(1.0, 1.0, 0.0),
            Vector3::new(2.0, 1.0, 0.0),
        ],
        None,
        vec![0, 1, 3, 1, 4, 3, 1, 2, 4, 2, 5, 4],
    )
    .unwrap()
}

/// The 12 outward facing triangles of an axis-aligned cube from `0` to `size`.
pub fn cube_triangles(size: f32) -> Vec<Triangle> {
    let p = |x: f32, y: f32, z: f32| Vector3::new(x * size, y * size, z * size);
    let quad = |a: Vector3, b: Vector3, c: Vector3, d: Vector3| {
        [
            Triangle { p0: a, p1: b, p2: c },
            Triangle { p0: a, p1: c, p2: d },
        ]
    };
    [
        // -z, +z
        quad(p(0., 0., 0.), p(0., 1., 0.), p(1., 1., 0.), p(1., 0., 0.)),
        quad(p(0., 0., 1.), p(1., 0., 1.), p(1., 1., 1.), p(0., 1., 1.)),
        // -y, +y
        quad(p(0., 0., 0.), p(1., 0., 0.), p(1., 0., 1.), p(0., 0., 1.)),
        quad(p(0., 1., 0.), p(0., 1., 1.), p(1., 1., 1.), p(1., 1., 0.)),
        // -x, +x
        quad(p(0., 0., 0.), p(0., 0., 1.), p(0., 1., 1.), p(0., 1., 0.)),
        quad(p(1., 0., 0.), p(1., 1., 0.), p(1., 1., 1.), p(1., 0., 1.)),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// A cube from `0` to `size` with 8 shared vertices and no normals.
pub fn cube(size: f32) -> Mesh {
    <Mesh as smileforge_mesh::TriangleMesh>::from_triangles(cube_triangles(size))
}

/// A UV sphere centered at the origin, with exact outward normals.
///
/// The poles lie on the y axis. `rings` counts the latitude bands and `segments` the
/// longitude bands.
pub fn uv_sphere(radius: f32, rings: u32, segments: u32) -> Mesh {
    let mut positions = Vec::new();
    let mut normals = Vec::new();
    for r in 0..=rings {
        let theta = PI * r as f32 / rings as f32;
        for s in 0..segments {
            let phi = 2.0 * PI * s as f32 / segments as f32;
            let n = Vector3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            normals.push(n);
            positions.push(n * radius);
        }
    }
    let mut indices = Vec::new();
    for r in 0..rings {
        for s in 0..segments {
            let a = r * segments + s;
            let b = r * segments + (s + 1) % segments;
            let c = a + segments;
            let d = b + segments;
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }
    Mesh::from_parts(&positions, Some(&normals), indices).unwrap()
}

/// Encodes triangles as a binary STL file.
pub fn binary_stl(triangles: &[Triangle]) -> Vec<u8> {
    let mut out = vec![0u8; 80];
    out.write_u32::<LittleEndian>(triangles.len() as u32).unwrap();
    for t in triangles {
        let n = t.normal().unwrap_or_else(|| Vector3::new(0.0, 0.0, 0.0));
        for v in [n, t.p0, t.p1, t.p2] {
            out.write_f32::<LittleEndian>(v.x).unwrap();
            out.write_f32::<LittleEndian>(v.y).unwrap();
            out.write_f32::<LittleEndian>(v.z).unwrap();
        }
        out.write_u16::<LittleEndian>(0).unwrap();
    }
    out
}

pub fn stl_cube() -> TestModel {
    let triangles = cube_triangles(20.0);
    TestModel {
        bytes: binary_stl(&triangles),
        triangles: triangles.len(),
        model_height: 20.0,
    }
}
