use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    #[error("Cannot normalize a zero-length vector")]
    ZeroVector,

    #[error("Aspect ratio is undefined for degenerate size {width} x {height}")]
    DegenerateSize { width: f32, height: f32 },

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

pub type Result<T> = std::result::Result<T, ViewerError>;

impl ViewerError {
    /// Returns an error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ViewerError::ZeroVector => "ZERO_VECTOR",
            ViewerError::DegenerateSize { .. } => "DEGENERATE_SIZE",
            ViewerError::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }
}
