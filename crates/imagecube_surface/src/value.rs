//! Typed style values
//!
//! Values are parsed from CSS-like text (`12px`, `1.25em`, `0.8`,
//! `rgb(0,0,0)`, `rect(0px, 10px, 20px, 0px)`, `thin`). Anything that is not
//! a number, colour or clip rectangle is kept as a lower-cased keyword.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::tag_no_case,
    character::complete::{char, digit0, digit1, multispace0, multispace1, one_of},
    combinator::{all_consuming, map, map_res, opt, recognize, value},
    sequence::{delimited, pair, tuple},
    IResult,
};

use crate::color::Rgb;

/// Unit attached to a numeric value
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Px,
    Em,
    Percent,
    /// Unitless number (opacity, z-index)
    None,
}

impl Unit {
    pub fn suffix(&self) -> &'static str {
        match self {
            Unit::Px => "px",
            Unit::Em => "em",
            Unit::Percent => "%",
            Unit::None => "",
        }
    }
}

/// A clip rectangle, edges measured from the surface's top-left corner
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ClipRect {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl ClipRect {
    pub fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }
}

/// A single style value
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Length(f32, Unit),
    Color(Rgb),
    Clip(ClipRect),
    Keyword(String),
}

impl Value {
    pub fn px(v: f32) -> Self {
        Value::Length(v, Unit::Px)
    }

    pub fn em(v: f32) -> Self {
        Value::Length(v, Unit::Em)
    }

    pub fn number(v: f32) -> Self {
        Value::Length(v, Unit::None)
    }

    pub fn keyword(word: impl Into<String>) -> Self {
        Value::Keyword(word.into())
    }

    /// Parse CSS-like text; never fails, unrecognised text becomes a keyword
    pub fn parse(input: &str) -> Value {
        let input = input.trim();
        if let Ok((_, v)) = all_consuming(parse_dimension)(input) {
            return v;
        }
        if let Ok((_, clip)) = all_consuming(parse_clip)(input) {
            return Value::Clip(clip);
        }
        if let Some(color) = Rgb::parse(input) {
            return Value::Color(color);
        }
        Value::Keyword(input.to_ascii_lowercase())
    }

    /// Numeric magnitude, if this is a length or number
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Value::Length(v, _) => Some(*v),
            _ => None,
        }
    }

    /// Pixel magnitude; unitless numbers count as pixels
    pub fn as_px(&self) -> Option<f32> {
        match self {
            Value::Length(v, Unit::Px | Unit::None) => Some(*v),
            _ => None,
        }
    }

    pub fn as_keyword(&self) -> Option<&str> {
        match self {
            Value::Keyword(word) => Some(word),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Length(v, unit) => write!(f, "{v}{}", unit.suffix()),
            Value::Color(color) => write!(f, "{color}"),
            Value::Clip(clip) => write!(
                f,
                "rect({}px, {}px, {}px, {}px)",
                clip.top, clip.right, clip.bottom, clip.left
            ),
            Value::Keyword(word) => f.write_str(word),
        }
    }
}

impl From<Rgb> for Value {
    fn from(color: Rgb) -> Self {
        Value::Color(color)
    }
}

impl From<ClipRect> for Value {
    fn from(clip: ClipRect) -> Self {
        Value::Clip(clip)
    }
}

/// Plain decimal number; no exponent, so `1em` is not read as `1e...`
fn number(input: &str) -> IResult<&str, f32> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
        ))),
        str::parse::<f32>,
    )(input)
}

fn parse_unit(input: &str) -> IResult<&str, Unit> {
    alt((
        value(Unit::Px, tag_no_case("px")),
        value(Unit::Em, tag_no_case("em")),
        value(Unit::Percent, char('%')),
    ))(input)
}

/// Parse `12`, `12px`, `-0.4em`, `50%`
fn parse_dimension(input: &str) -> IResult<&str, Value> {
    map(tuple((number, opt(parse_unit))), |(v, unit)| {
        Value::Length(v, unit.unwrap_or(Unit::None))
    })(input)
}

/// A clip edge: a pixel length or `auto` (treated as 0)
fn parse_clip_edge(input: &str) -> IResult<&str, f32> {
    alt((
        map(tuple((number, opt(tag_no_case("px")))), |(v, _)| v),
        value(0.0, tag_no_case("auto")),
    ))(input)
}

fn clip_separator(input: &str) -> IResult<&str, ()> {
    alt((
        value((), delimited(multispace0, char(','), multispace0)),
        value((), multispace1),
    ))(input)
}

/// Parse `rect(top, right, bottom, left)`
fn parse_clip(input: &str) -> IResult<&str, ClipRect> {
    let (input, _) = tag_no_case("rect")(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = multispace0(input)?;
    let (input, (top, _, right, _, bottom, _, left)) = tuple((
        parse_clip_edge,
        clip_separator,
        parse_clip_edge,
        clip_separator,
        parse_clip_edge,
        clip_separator,
        parse_clip_edge,
    ))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char(')')(input)?;

    Ok((input, ClipRect::new(top, right, bottom, left)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lengths_with_units() {
        assert_eq!(Value::parse("12px"), Value::px(12.0));
        assert_eq!(Value::parse("-0.4em"), Value::em(-0.4));
        assert_eq!(Value::parse("0.8"), Value::number(0.8));
        assert_eq!(Value::parse("50%"), Value::Length(50.0, Unit::Percent));
    }

    #[test]
    fn parses_clip_rect() {
        assert_eq!(
            Value::parse("rect(0px, 100px, 20px, 0px)"),
            Value::Clip(ClipRect::new(0.0, 100.0, 20.0, 0.0))
        );
        assert_eq!(
            Value::parse("rect(1 2 3 auto)"),
            Value::Clip(ClipRect::new(1.0, 2.0, 3.0, 0.0))
        );
    }

    #[test]
    fn parses_colors_and_keywords() {
        assert_eq!(Value::parse("white"), Value::Color(Rgb::WHITE));
        assert_eq!(Value::parse("Medium"), Value::keyword("medium"));
        assert_eq!(Value::parse("absolute"), Value::keyword("absolute"));
    }

    #[test]
    fn display_matches_css_text() {
        assert_eq!(Value::px(10.5).to_string(), "10.5px");
        assert_eq!(Value::em(1.25).to_string(), "1.25em");
        assert_eq!(Value::number(0.5).to_string(), "0.5");
        assert_eq!(
            Value::Clip(ClipRect::new(0.0, 5.0, 10.0, 0.0)).to_string(),
            "rect(0px, 5px, 10px, 0px)"
        );
    }

    #[test]
    fn as_px_ignores_relative_units() {
        assert_eq!(Value::px(3.0).as_px(), Some(3.0));
        assert_eq!(Value::number(3.0).as_px(), Some(3.0));
        assert_eq!(Value::em(3.0).as_px(), None);
        assert_eq!(Value::keyword("thin").as_px(), None);
    }
}
