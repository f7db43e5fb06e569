//! Style properties and per-surface style maps

use std::fmt;

use indexmap::IndexMap;
use tracing::debug;

use crate::value::Value;

/// Every property a surface can carry
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    Left,
    Top,
    Width,
    Height,
    PaddingLeft,
    PaddingRight,
    PaddingTop,
    PaddingBottom,
    BorderLeftWidth,
    BorderRightWidth,
    BorderTopWidth,
    BorderBottomWidth,
    Opacity,
    LineHeight,
    LetterSpacing,
    Position,
    Overflow,
    ZIndex,
    BackgroundColor,
    Clip,
    /// Legacy alpha filter, mirrors `Opacity`
    Filter,
}

impl Property {
    /// Padding properties in left, right, top, bottom order
    pub const PADDING: [Property; 4] = [
        Property::PaddingLeft,
        Property::PaddingRight,
        Property::PaddingTop,
        Property::PaddingBottom,
    ];

    /// Border width properties in left, right, top, bottom order
    pub const BORDER_WIDTH: [Property; 4] = [
        Property::BorderLeftWidth,
        Property::BorderRightWidth,
        Property::BorderTopWidth,
        Property::BorderBottomWidth,
    ];

    pub fn css_name(&self) -> &'static str {
        match self {
            Property::Left => "left",
            Property::Top => "top",
            Property::Width => "width",
            Property::Height => "height",
            Property::PaddingLeft => "padding-left",
            Property::PaddingRight => "padding-right",
            Property::PaddingTop => "padding-top",
            Property::PaddingBottom => "padding-bottom",
            Property::BorderLeftWidth => "border-left-width",
            Property::BorderRightWidth => "border-right-width",
            Property::BorderTopWidth => "border-top-width",
            Property::BorderBottomWidth => "border-bottom-width",
            Property::Opacity => "opacity",
            Property::LineHeight => "line-height",
            Property::LetterSpacing => "letter-spacing",
            Property::Position => "position",
            Property::Overflow => "overflow",
            Property::ZIndex => "z-index",
            Property::BackgroundColor => "background-color",
            Property::Clip => "clip",
            Property::Filter => "filter",
        }
    }

    pub fn from_css_name(name: &str) -> Option<Property> {
        let prop = match name.trim().to_ascii_lowercase().as_str() {
            "left" => Property::Left,
            "top" => Property::Top,
            "width" => Property::Width,
            "height" => Property::Height,
            "padding-left" => Property::PaddingLeft,
            "padding-right" => Property::PaddingRight,
            "padding-top" => Property::PaddingTop,
            "padding-bottom" => Property::PaddingBottom,
            "border-left-width" => Property::BorderLeftWidth,
            "border-right-width" => Property::BorderRightWidth,
            "border-top-width" => Property::BorderTopWidth,
            "border-bottom-width" => Property::BorderBottomWidth,
            "opacity" => Property::Opacity,
            "line-height" => Property::LineHeight,
            "letter-spacing" => Property::LetterSpacing,
            "position" => Property::Position,
            "overflow" => Property::Overflow,
            "z-index" => Property::ZIndex,
            "background-color" | "background" => Property::BackgroundColor,
            "clip" => Property::Clip,
            "filter" => Property::Filter,
            _ => return None,
        };
        Some(prop)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.css_name())
    }
}

/// Four per-side values
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges<T> {
    pub left: T,
    pub right: T,
    pub top: T,
    pub bottom: T,
}

impl<T: Copy> Edges<T> {
    pub fn all(value: T) -> Self {
        Self {
            left: value,
            right: value,
            top: value,
            bottom: value,
        }
    }

    /// Values in left, right, top, bottom order
    pub fn to_array(&self) -> [T; 4] {
        [self.left, self.right, self.top, self.bottom]
    }

    pub fn from_array([left, right, top, bottom]: [T; 4]) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }
}

impl Edges<f32> {
    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

impl<T: std::ops::Add<Output = T> + Copy> std::ops::Add for Edges<T> {
    type Output = Edges<T>;

    fn add(self, rhs: Self) -> Self::Output {
        Edges {
            left: self.left + rhs.left,
            right: self.right + rhs.right,
            top: self.top + rhs.top,
            bottom: self.bottom + rhs.bottom,
        }
    }
}

/// An ordered property map; insertion order is kept for stable output
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    props: IndexMap<Property, Value>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `name: value; name: value` declarations.
    ///
    /// Unknown property names are skipped and logged.
    pub fn parse(declarations: &str) -> Style {
        let mut style = Style::new();
        for decl in declarations.split(';') {
            let Some((name, value)) = decl.split_once(':') else {
                continue;
            };
            match Property::from_css_name(name) {
                Some(prop) => style.set(prop, Value::parse(value)),
                None => debug!(property = name.trim(), "skipping unknown style property"),
            }
        }
        style
    }

    /// Builder: set a property
    pub fn with(mut self, prop: Property, value: impl Into<Value>) -> Self {
        self.set(prop, value.into());
        self
    }

    pub fn get(&self, prop: Property) -> Option<&Value> {
        self.props.get(&prop)
    }

    pub fn set(&mut self, prop: Property, value: Value) {
        self.props.insert(prop, value);
    }

    pub fn remove(&mut self, prop: Property) -> Option<Value> {
        self.props.shift_remove(&prop)
    }

    /// Pixel value of a property, if it holds one
    pub fn px(&self, prop: Property) -> Option<f32> {
        self.get(prop).and_then(Value::as_px)
    }

    pub fn keyword(&self, prop: Property) -> Option<&str> {
        self.get(prop).and_then(Value::as_keyword)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Property, &Value)> {
        self.props.iter().map(|(p, v)| (*p, v))
    }

    pub fn len(&self) -> usize {
        self.props.len()
    }

    pub fn is_empty(&self) -> bool {
        self.props.is_empty()
    }

    /// Apply a batch of changes over this style
    pub fn extend<I: IntoIterator<Item = (Property, Value)>>(&mut self, changes: I) {
        for (prop, value) in changes {
            self.set(prop, value);
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (prop, value) in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{prop}: {value};")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations() {
        let style = Style::parse("position: absolute; width: 200px; bogus: 1; opacity: 0.5");
        assert_eq!(style.len(), 3);
        assert_eq!(style.keyword(Property::Position), Some("absolute"));
        assert_eq!(style.px(Property::Width), Some(200.0));
        assert_eq!(style.get(Property::Opacity), Some(&Value::number(0.5)));
    }

    #[test]
    fn display_keeps_insertion_order() {
        let style = Style::new()
            .with(Property::Left, Value::px(1.0))
            .with(Property::Top, Value::px(2.0));
        assert_eq!(style.to_string(), "left: 1px; top: 2px;");
    }

    #[test]
    fn remove_preserves_order_of_the_rest() {
        let mut style = Style::parse("left: 1px; top: 2px; width: 3px");
        style.remove(Property::Top);
        assert_eq!(style.to_string(), "left: 1px; width: 3px;");
    }

    #[test]
    fn edges_sum_per_axis() {
        let edges = Edges::from_array([1.0, 2.0, 3.0, 4.0]);
        assert_eq!(edges.horizontal(), 3.0);
        assert_eq!(edges.vertical(), 7.0);
        assert_eq!((edges + Edges::all(1.0)).to_array(), [2.0, 3.0, 4.0, 5.0]);
    }
}
