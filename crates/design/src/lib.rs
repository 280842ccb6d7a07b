//! Geometric queries for smile design on top of [`smileforge_mesh`]: silhouette
//! extraction and photo projection, fitting a tooth row to a drawn curve, coarse
//! occlusal contacts, insertion axis search and a background edit worker.

mod collider;
mod config;
mod curve;
mod insertion;
mod projector;
mod silhouette;
mod worker;

pub use collider::*;
pub use config::*;
pub use curve::*;
pub use insertion::*;
pub use projector::*;
pub use silhouette::*;
pub use worker::*;

pub use smileforge_mesh::{ErrorCode, Mesh, MeshError, MeshResult, Vector3};
