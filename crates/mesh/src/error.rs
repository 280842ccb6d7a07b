//! Error types shared by every smileforge operation.
//!
//! Every failure is whole: when an operation returns an error no mesh was
//! produced. Each error carries a machine-readable [`ErrorCode`] so that a
//! calling UI layer can map failures to its own messages.

use thiserror::Error;

/// Result type alias for mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;

/// Machine-readable error codes, rendered as `SMILE-XXXX`.
///
/// - 1xxx = source geometry errors
/// - 2xxx = edit result errors
/// - 3xxx = query and parameter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// SMILE-1001: Source mesh is missing buffers or references out of range.
    InvalidGeometry = 1001,
    /// SMILE-2001: Edit would remove every vertex or triangle.
    EmptyResult = 2001,
    /// SMILE-2002: Vertices survived an edit but no triangle did.
    DegenerateResult = 2002,
    /// SMILE-3001: Not enough input data for the query.
    InsufficientData = 3001,
    /// SMILE-3002: Operation not permitted in the current state.
    InvalidState = 3002,
    /// SMILE-3003: Numeric parameter out of its valid range.
    InvalidParameter = 3003,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidGeometry => "SMILE-1001",
            ErrorCode::EmptyResult => "SMILE-2001",
            ErrorCode::DegenerateResult => "SMILE-2002",
            ErrorCode::InsufficientData => "SMILE-3001",
            ErrorCode::InvalidState => "SMILE-3002",
            ErrorCode::InvalidParameter => "SMILE-3003",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("{operation} would produce an empty mesh")]
    EmptyResult { operation: &'static str },

    #[error("{operation} kept {kept_vertices} vertices but no triangles")]
    DegenerateResult {
        operation: &'static str,
        kept_vertices: usize,
    },

    #[error("insufficient data: {reason}")]
    InsufficientData { reason: String },

    #[error("invalid state: {reason}")]
    InvalidState { reason: String },

    #[error("invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f32 },
}

impl MeshError {
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        MeshError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub fn insufficient_data(reason: impl Into<String>) -> Self {
        MeshError::InsufficientData {
            reason: reason.into(),
        }
    }

    pub fn invalid_state(reason: impl Into<String>) -> Self {
        MeshError::InvalidState {
            reason: reason.into(),
        }
    }

    /// Rejects values that are not finite and strictly positive.
    pub fn require_positive(name: &'static str, value: f32) -> MeshResult<f32> {
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(MeshError::InvalidParameter { name, value })
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            MeshError::InvalidGeometry { .. } => ErrorCode::InvalidGeometry,
            MeshError::EmptyResult { .. } => ErrorCode::EmptyResult,
            MeshError::DegenerateResult { .. } => ErrorCode::DegenerateResult,
            MeshError::InsufficientData { .. } => ErrorCode::InsufficientData,
            MeshError::InvalidState { .. } => ErrorCode::InvalidState,
            MeshError::InvalidParameter { .. } => ErrorCode::InvalidParameter,
        }
    }
}
