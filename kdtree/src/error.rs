use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum KdTreeError {
    #[error("kdtree: dimension must be positive")]
    ZeroDimension,

    #[error("kdtree: {len} coordinates do not divide into rows of {dim}")]
    RaggedCoordinates { len: usize, dim: usize },

    #[error("kdtree: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("kdtree: radius must not be NaN")]
    NanRadius,
}
