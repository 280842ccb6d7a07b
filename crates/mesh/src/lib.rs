mod buffer;
mod editor;
mod error;
mod geometry;
mod mesh;
mod normals;

pub use buffer::*;
pub use editor::*;
pub use error::*;
pub use geometry::*;
pub use mesh::*;
pub use normals::*;

pub trait TriangleMesh: Sized {
    /// Creates a TriangleMesh from a list of triangles.
    ///
    /// # Arguments
    ///
    /// * `triangles` - A vector of the triangles of the mesh.
    fn from_triangles(triangles: Vec<Triangle>) -> Self;

    /// Returns the number of triangles that comprises this mesh.
    fn triangle_count(&self) -> usize;

    /// Returns the positions of triangle `i`, or `None` if out of range.
    fn triangle(&self, i: usize) -> Option<Triangle>;
}
