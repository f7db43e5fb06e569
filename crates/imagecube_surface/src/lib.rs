//! Image Cube Surfaces
//!
//! The visual surfaces an image cube animates, and the seam it reaches them
//! through.
//!
//! - **Values**: typed lengths, colours and clip rectangles parsed from
//!   CSS-like text
//! - **Styles**: ordered property maps plus border/padding metrics
//! - **StyleSystem**: the host interface for reading, writing, cloning and
//!   navigating surfaces
//! - **SurfaceTree**: an in-memory `StyleSystem` for headless use
//!
//! # Example
//!
//! ```rust
//! use imagecube_surface::{Property, Style, StyleSystem, SurfaceTree, Value};
//!
//! let mut tree = SurfaceTree::new();
//! let container = tree.insert(Style::parse("width: 200px; height: 100px"));
//! let panel = tree.insert_child(container, Style::new()).unwrap();
//!
//! tree.apply(panel, &[(Property::Opacity, Value::number(0.5))]);
//! assert_eq!(tree.style(panel).unwrap().get(Property::Opacity), Some(&Value::number(0.5)));
//! assert_eq!(tree.size(container).width, 200.0);
//! ```

pub mod color;
pub mod error;
pub mod geometry;
pub mod metrics;
pub mod style;
pub mod system;
pub mod tree;
pub mod value;

use slotmap::new_key_type;

new_key_type! {
    /// Identifies one surface in a [`StyleSystem`]
    pub struct SurfaceId;
}

pub use color::Rgb;
pub use error::{Result, SurfaceError};
pub use geometry::{Point, Rect, Size};
pub use style::{Edges, Property, Style};
pub use system::StyleSystem;
pub use tree::{SurfaceSnapshot, SurfaceTree};
pub use value::{ClipRect, Unit, Value};
