//! Surface tree error types

use thiserror::Error;

use crate::SurfaceId;

/// Errors from structural surface tree edits
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    /// The id does not name a live surface
    #[error("unknown surface {0:?}")]
    UnknownSurface(SurfaceId),

    /// Attaching would make a surface its own ancestor
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: SurfaceId, child: SurfaceId },
}

/// Result type for surface tree operations
pub type Result<T> = std::result::Result<T, SurfaceError>;
