//! Box metrics read from styles
//!
//! Border widths and paddings are read the way a browser reports them:
//! numeric values are taken as-is, while border keywords map to fixed pixel
//! widths. Anything unreadable reads as zero rather than failing.

use crate::style::{Edges, Property, Style};
use crate::value::Value;

/// Pixel width of a border keyword: `thin` 1, `medium` 3, `thick` 5.
///
/// Unknown keywords are no border.
pub fn keyword_border_width(word: &str) -> f32 {
    match word {
        "thin" => 1.0,
        "medium" => 3.0,
        "thick" => 5.0,
        _ => 0.0,
    }
}

/// Width of one border side; a missing value is no border
pub fn border_width(value: Option<&Value>) -> f32 {
    match value {
        None => 0.0,
        Some(v) => match (v.as_number(), v.as_keyword()) {
            (Some(n), _) => n,
            (None, Some(word)) => keyword_border_width(word),
            (None, None) => 0.0,
        },
    }
}

/// Padding of one side; anything non-numeric is zero
pub fn padding(value: Option<&Value>) -> f32 {
    value.and_then(Value::as_number).unwrap_or(0.0)
}

/// All four border widths of a style
pub fn border_widths(style: &Style) -> Edges<f32> {
    Edges::from_array(Property::BORDER_WIDTH.map(|p| border_width(style.get(p))))
}

/// All four paddings of a style
pub fn paddings(style: &Style) -> Edges<f32> {
    Edges::from_array(Property::PADDING.map(|p| padding(style.get(p))))
}
