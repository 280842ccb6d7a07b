use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use smileforge_mesh::{Triangle, TriangleMesh, Vector3};
use std::io::{Read, Seek, Write};
use std::path::Path;

const HEADER: &[u8] = b"smileforge binary stl";
const MAX_PREALLOCATED_TRIANGLES: usize = 1 << 16;

fn read_vector<T: Read>(f: &mut T) -> std::io::Result<Vector3> {
    Ok(Vector3 {
        x: f.read_f32::<LittleEndian>()?,
        y: f.read_f32::<LittleEndian>()?,
        z: f.read_f32::<LittleEndian>()?,
    })
}

fn write_vector<T: Write>(f: &mut T, v: Vector3) -> std::io::Result<()> {
    f.write_f32::<LittleEndian>(v.x)?;
    f.write_f32::<LittleEndian>(v.y)?;
    f.write_f32::<LittleEndian>(v.z)
}

fn read_binary<M: TriangleMesh, T: Read + Seek>(f: &mut T) -> std::io::Result<M> {
    // Binary files start with an 80 byte header. There is no defined structure for this
    // header but some implementations will stash some metadata in this header. For now
    // we'll just skip the header and load the geometry.
    f.seek(std::io::SeekFrom::Start(80))?;

    // Immediately following the header is an unsigned 32-bit integer that indicates the
    // number of triagles that follow.
    let n_triangles = f.read_u32::<LittleEndian>()? as usize;

    // The count comes from the file, so it only sizes the first allocation up to a bound.
    let mut data = Vec::<Triangle>::with_capacity(n_triangles.min(MAX_PREALLOCATED_TRIANGLES));
    for _ in 0..n_triangles {
        // Each triangle is specified by a normal vector followed by 3 verticies of the
        // triangle. While the normal vector may be included, it is generally expected
        // that verticies be listed in counter-clockwise order and so the normal vector
        // maybe specified as (0, 0, 0).
        let _normal = read_vector(f)?;
        data.push(Triangle {
            p0: read_vector(f)?,
            p1: read_vector(f)?,
            p2: read_vector(f)?,
        });
        // After the triangle geometry there is a 2-byte unsigned integer called the
        // "attribute byte count". There is no standard structure of this field, but
        // some applications use this for color data.
        let _attribute_byte_count = f.read_u16::<LittleEndian>()?;
    }
    log::debug!("read {} stl triangles", n_triangles);
    Ok(M::from_triangles(data))
}

/// Writes `m` as a binary STL, recomputing each facet normal from its winding.
pub fn write_binary<M: TriangleMesh, T: Write>(m: &M, f: &mut T) -> std::io::Result<()> {
    let n_triangles = u32::try_from(m.triangle_count()).map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "too many triangles for a binary stl",
        )
    })?;

    let mut header = [0u8; 80];
    header[..HEADER.len()].copy_from_slice(HEADER);
    f.write_all(&header)?;
    f.write_u32::<LittleEndian>(n_triangles)?;
    for t in (0..m.triangle_count()).filter_map(|i| m.triangle(i)) {
        // Zero-area facets get the conventional (0, 0, 0) normal.
        write_vector(f, t.normal().unwrap_or(Vector3::new(0.0, 0.0, 0.0)))?;
        write_vector(f, t.p0)?;
        write_vector(f, t.p1)?;
        write_vector(f, t.p2)?;
        f.write_u16::<LittleEndian>(0)?;
    }
    log::debug!("wrote {} stl triangles", n_triangles);
    Ok(())
}

pub fn read_stl<M: TriangleMesh, P: AsRef<Path>>(p: P) -> std::io::Result<M> {
    let mut f = std::io::BufReader::new(std::fs::File::open(p)?);
    read_binary(&mut f)
}

pub fn parse_stl<M: TriangleMesh>(data: &[u8]) -> std::io::Result<M> {
    let mut c = std::io::Cursor::new(data);
    read_binary(&mut c)
}

pub fn write_stl<M: TriangleMesh, P: AsRef<Path>>(m: &M, p: P) -> std::io::Result<()> {
    let mut f = std::io::BufWriter::new(std::fs::File::create(p)?);
    write_binary(m, &mut f)?;
    f.flush()
}

pub trait StlReader: Read {
    fn read_stl<M: TriangleMesh>(&mut self) -> std::io::Result<M>;
}

impl<T: Read + Seek> StlReader for T {
    fn read_stl<M: TriangleMesh>(&mut self) -> std::io::Result<M> {
        read_binary(self)
    }
}
