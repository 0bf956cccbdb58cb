//! Errors surfaced to callers of the draw engine

/// Reasons a run refuses to start or settings are rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// Fewer than two entries to draw from
    InsufficientEntries { found: usize },
    /// Batch test asked for zero balls
    EmptyBatch,
    /// Settings break an invariant
    InvalidSettings(&'static str),
}

impl std::fmt::Display for DrawError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawError::InsufficientEntries { found } => {
                write!(f, "Not enough entries: need at least 2, found {found}")
            }
            DrawError::EmptyBatch => write!(f, "Batch test needs at least one ball"),
            DrawError::InvalidSettings(reason) => write!(f, "Invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for DrawError {}
