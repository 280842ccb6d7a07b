use byteorder::{ByteOrder, LittleEndian};

use crate::error::{MeshError, MeshResult};
use crate::geometry::Vector3;

/// The attribute a vertex buffer carries.
#[derive(Debug, PartialEq, Eq, Hash, Copy, Clone)]
pub enum Semantic {
    Position,
    Normal,
    Color,
    TexCoord,
}

/// One attribute channel of a mesh.
///
/// The raw bytes may be interleaved with other attributes: vertex `i` starts at
/// `i * stride + offset` and spans `components_per_vertex * bytes_per_component`
/// bytes. Components are stored little-endian.
///
/// ```text
///   stride = 24, offset = 12, 3 x f32 normals behind 3 x f32 positions
///
///   | px py pz | nx ny nz | px py pz | nx ny nz | ...
///              ^ offset   ^ stride
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct VertexBuffer {
    semantic: Semantic,
    data: Vec<u8>,
    vertex_count: usize,
    components_per_vertex: usize,
    bytes_per_component: usize,
    stride: usize,
    offset: usize,
}

impl VertexBuffer {
    pub fn new(
        semantic: Semantic,
        data: Vec<u8>,
        vertex_count: usize,
        components_per_vertex: usize,
        bytes_per_component: usize,
        stride: usize,
        offset: usize,
    ) -> MeshResult<Self> {
        let overflow = || {
            MeshError::invalid_geometry(format!("{:?} buffer layout overflows usize", semantic))
        };
        let element_size = components_per_vertex
            .checked_mul(bytes_per_component)
            .ok_or_else(overflow)?;
        if element_size == 0 {
            return Err(MeshError::invalid_geometry(format!(
                "{:?} buffer has an empty vertex layout",
                semantic
            )));
        }
        if offset.checked_add(element_size).ok_or_else(overflow)? > stride {
            return Err(MeshError::invalid_geometry(format!(
                "{:?} buffer layout exceeds its stride: offset {} + {} > {}",
                semantic, offset, element_size, stride
            )));
        }
        // The final vertex does not need to be followed by a full stride.
        let required = match vertex_count {
            0 => 0,
            n => (n - 1)
                .checked_mul(stride)
                .and_then(|r| r.checked_add(offset + element_size))
                .ok_or_else(overflow)?,
        };
        if data.len() < required {
            return Err(MeshError::invalid_geometry(format!(
                "{:?} buffer holds {} bytes, {} vertices need {}",
                semantic,
                data.len(),
                vertex_count,
                required
            )));
        }
        Ok(Self {
            semantic,
            data,
            vertex_count,
            components_per_vertex,
            bytes_per_component,
            stride,
            offset,
        })
    }

    /// Builds a tightly packed buffer of 3 x f32 components.
    pub fn from_vectors(semantic: Semantic, vectors: &[Vector3]) -> Self {
        let mut data = vec![0u8; vectors.len() * 12];
        for (chunk, v) in data.chunks_exact_mut(12).zip(vectors) {
            LittleEndian::write_f32_into(&[v.x, v.y, v.z], chunk);
        }
        Self {
            semantic,
            data,
            vertex_count: vectors.len(),
            components_per_vertex: 3,
            bytes_per_component: 4,
            stride: 12,
            offset: 0,
        }
    }

    pub fn semantic(&self) -> Semantic {
        self.semantic
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn components_per_vertex(&self) -> usize {
        self.components_per_vertex
    }

    pub fn bytes_per_component(&self) -> usize {
        self.bytes_per_component
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.data.as_slice()
    }

    /// Size in bytes of one vertex's attribute.
    pub fn element_size(&self) -> usize {
        self.components_per_vertex * self.bytes_per_component
    }

    /// The raw attribute bytes of vertex `i`.
    pub fn element_bytes(&self, i: usize) -> Option<&[u8]> {
        if i >= self.vertex_count {
            return None;
        }
        let start = i * self.stride + self.offset;
        self.data.get(start..start + self.element_size())
    }

    /// Returns true when the first three components can be read as f32.
    pub fn is_vector3(&self) -> bool {
        self.components_per_vertex >= 3 && self.bytes_per_component == 4
    }

    /// Reads the first three f32 components of vertex `i`.
    pub fn vector3(&self, i: usize) -> Option<Vector3> {
        if !self.is_vector3() {
            return None;
        }
        let bytes = self.element_bytes(i)?;
        Some(Vector3::new(
            LittleEndian::read_f32(&bytes[0..4]),
            LittleEndian::read_f32(&bytes[4..8]),
            LittleEndian::read_f32(&bytes[8..12]),
        ))
    }

    pub fn vectors(&self) -> impl Iterator<Item = Vector3> + '_ {
        (0..self.vertex_count).filter_map(move |i| self.vector3(i))
    }

    /// Copies the attributes of the vertices yielded by `kept`, in that order, into a
    /// new tightly packed buffer (stride equals the element size, offset 0).
    pub fn compact<I: IntoIterator<Item = usize>>(&self, kept: I) -> Self {
        let element_size = self.element_size();
        let mut data = Vec::new();
        let mut vertex_count = 0;
        for i in kept {
            if let Some(bytes) = self.element_bytes(i) {
                data.extend_from_slice(bytes);
                vertex_count += 1;
            }
        }
        log::trace!(
            "compacted {:?} buffer: {} -> {} vertices",
            self.semantic,
            self.vertex_count,
            vertex_count
        );
        Self {
            semantic: self.semantic,
            data,
            vertex_count,
            components_per_vertex: self.components_per_vertex,
            bytes_per_component: self.bytes_per_component,
            stride: element_size,
            offset: 0,
        }
    }
}

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum IndexWidth {
    U16,
    U32,
}

impl IndexWidth {
    pub fn bytes(&self) -> usize {
        match self {
            IndexWidth::U16 => 2,
            IndexWidth::U32 => 4,
        }
    }
}

/// A triangle list. Every three consecutive indices form one triangle.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct IndexBuffer {
    width: IndexWidth,
    indices: Vec<u32>,
}

impl IndexBuffer {
    pub fn new(indices: Vec<u32>, width: IndexWidth) -> MeshResult<Self> {
        if indices.len() % 3 != 0 {
            return Err(MeshError::invalid_geometry(format!(
                "index count {} is not a multiple of 3",
                indices.len()
            )));
        }
        if width == IndexWidth::U16 {
            if let Some(i) = indices.iter().find(|&&i| i > u16::MAX as u32) {
                return Err(MeshError::invalid_geometry(format!(
                    "index {} does not fit a 16-bit index buffer",
                    i
                )));
            }
        }
        Ok(Self { width, indices })
    }

    /// Wraps indices that were produced from whole triangles of an existing buffer.
    pub(crate) fn from_triangle_list(indices: Vec<u32>, width: IndexWidth) -> Self {
        debug_assert_eq!(0, indices.len() % 3);
        Self { width, indices }
    }

    /// Decodes a little-endian index buffer.
    pub fn from_bytes(bytes: &[u8], width: IndexWidth) -> MeshResult<Self> {
        if bytes.len() % width.bytes() != 0 {
            return Err(MeshError::invalid_geometry(format!(
                "{} index bytes is not a multiple of the {}-byte index width",
                bytes.len(),
                width.bytes()
            )));
        }
        let indices = match width {
            IndexWidth::U16 => bytes
                .chunks_exact(2)
                .map(|c| LittleEndian::read_u16(c) as u32)
                .collect(),
            IndexWidth::U32 => bytes.chunks_exact(4).map(LittleEndian::read_u32).collect(),
        };
        Self::new(indices, width)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; self.indices.len() * self.width.bytes()];
        match self.width {
            IndexWidth::U16 => {
                for (chunk, &i) in out.chunks_exact_mut(2).zip(&self.indices) {
                    LittleEndian::write_u16(chunk, i as u16);
                }
            }
            IndexWidth::U32 => LittleEndian::write_u32_into(&self.indices, &mut out),
        }
        out
    }

    pub fn width(&self) -> IndexWidth {
        self.width
    }

    pub fn indices(&self) -> &[u32] {
        self.indices.as_slice()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interleaved_access() {
        // position (3 x f32) followed by normal (3 x f32) per vertex.
        let mut data = vec![0u8; 48];
        LittleEndian::write_f32_into(
            &[1.0, 2.0, 3.0, 0.0, 0.0, 1.0, 4.0, 5.0, 6.0, 0.0, 1.0, 0.0],
            &mut data,
        );
        let positions =
            VertexBuffer::new(Semantic::Position, data.clone(), 2, 3, 4, 24, 0).unwrap();
        let normals = VertexBuffer::new(Semantic::Normal, data, 2, 3, 4, 24, 12).unwrap();
        assert_eq!(Some(Vector3::new(4.0, 5.0, 6.0)), positions.vector3(1));
        assert_eq!(Some(Vector3::new(0.0, 0.0, 1.0)), normals.vector3(0));
        assert_eq!(None, normals.vector3(2));
    }

    #[test]
    fn layout_must_fit_stride() {
        let err = VertexBuffer::new(Semantic::Normal, vec![0; 48], 2, 3, 4, 12, 4).unwrap_err();
        assert_eq!(crate::ErrorCode::InvalidGeometry, err.code());
    }

    #[test]
    fn data_must_cover_vertex_count() {
        assert!(VertexBuffer::new(Semantic::Position, vec![0; 23], 2, 3, 4, 12, 0).is_err());
        assert!(VertexBuffer::new(Semantic::Position, vec![0; 24], 2, 3, 4, 12, 0).is_ok());
    }

    #[test]
    fn oversized_layout_is_invalid() {
        let err = VertexBuffer::new(Semantic::Position, vec![0; 12], usize::MAX, 3, 4, 12, 0)
            .unwrap_err();
        assert_eq!(crate::ErrorCode::InvalidGeometry, err.code());
        let err = VertexBuffer::new(Semantic::Position, vec![0; 12], 1, usize::MAX, 4, 12, 0)
            .unwrap_err();
        assert_eq!(crate::ErrorCode::InvalidGeometry, err.code());
        let err = VertexBuffer::new(Semantic::Position, vec![0; 12], 1, 3, 4, usize::MAX, usize::MAX)
            .unwrap_err();
        assert_eq!(crate::ErrorCode::InvalidGeometry, err.code());
    }

    #[test]
    fn compact_packs_tightly() {
        let mut data = vec![0u8; 72];
        LittleEndian::write_f32_into(
            &[
                0.0, 0.0, 0.0, 9.0, 9.0, 9.0, //
                1.0, 1.0, 1.0, 9.0, 9.0, 9.0, //
                2.0, 2.0, 2.0, 9.0, 9.0, 9.0,
            ],
            &mut data,
        );
        let positions = VertexBuffer::new(Semantic::Position, data, 3, 3, 4, 24, 0).unwrap();
        let packed = positions.compact(vec![0, 2]);
        assert_eq!(2, packed.vertex_count());
        assert_eq!(12, packed.stride());
        assert_eq!(0, packed.offset());
        assert_eq!(24, packed.as_bytes().len());
        assert_eq!(Some(Vector3::new(2.0, 2.0, 2.0)), packed.vector3(1));
    }

    #[test]
    fn index_buffer_rejects_partial_triangles() {
        assert!(IndexBuffer::new(vec![0, 1], IndexWidth::U32).is_err());
    }

    #[test]
    fn index_buffer_rejects_wide_u16() {
        assert!(IndexBuffer::new(vec![0, 1, 70_000], IndexWidth::U16).is_err());
    }

    #[test]
    fn index_buffer_bytes() {
        let ib = IndexBuffer::new(vec![0, 1, 2, 2, 1, 3], IndexWidth::U16).unwrap();
        let bytes = ib.to_bytes();
        assert_eq!(12, bytes.len());
        assert_eq!(ib, IndexBuffer::from_bytes(&bytes, IndexWidth::U16).unwrap());
        assert_eq!(
            vec![[0, 1, 2], [2, 1, 3]],
            ib.triangles().collect::<Vec<_>>()
        );
    }
}
