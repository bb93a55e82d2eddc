use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("resolution must be a positive number of millimetres, got {0}")]
    InvalidResolution(f64),
    #[error("layer count must be a positive odd integer, got {0}")]
    InvalidLayerCount(u32),
    #[error("unknown boundary metric `{0}` (expected `t` or `d`)")]
    UnknownMetric(String),
    #[error("unknown layering model `{0}` (expected `v` or `d`)")]
    UnknownModel(String),
    #[error("offset {0} mm must be finite and within ±100 mm")]
    InvalidOffset(f64),
    #[error("subject identifier must not be empty")]
    EmptySubject,
    #[error("volume shapes differ: {left} vs {right} voxels")]
    ShapeMismatch { left: usize, right: usize },
}
