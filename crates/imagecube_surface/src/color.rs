//! RGB colours and CSS colour parsing
//!
//! Components are kept in the 0-255 range as floats so they can be
//! interpolated without rounding between frames.

use std::fmt;

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while_m_n},
    character::complete::{char, multispace0},
    combinator::{all_consuming, map, map_res},
    number::complete::float,
    sequence::{delimited, terminated, tuple},
    IResult,
};

/// An opaque RGB colour with 0-255 components
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(255.0, 255.0, 255.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Parse `rgb(r, g, b)`, `rgb(r%, g%, b%)`, `#rrggbb`, `#rgb` or a named colour
    pub fn parse(input: &str) -> Option<Rgb> {
        let input = input.trim();

        if let Ok((_, color)) = all_consuming(parse_rgb_percent)(input) {
            return Some(color);
        }
        if let Ok((_, color)) = all_consuming(parse_rgb_color)(input) {
            return Some(color);
        }
        if let Ok((_, color)) = all_consuming(parse_hex_color)(input) {
            return Some(color);
        }

        named_color(input)
    }

    /// Linear interpolation between two colours
    pub fn lerp(&self, other: &Rgb, t: f32) -> Rgb {
        Rgb::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

fn ws(input: &str) -> IResult<&str, &str> {
    multispace0(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(ws, char(','), ws)(input)
}

/// Parse rgb(r, g, b) with 0-255 components
fn parse_rgb_color(input: &str) -> IResult<&str, Rgb> {
    let (input, _) = tag_no_case("rgb")(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, (r, _, g, _, b)) = tuple((float, comma, float, comma, float))(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;

    Ok((input, Rgb::new(r, g, b)))
}

fn percent(input: &str) -> IResult<&str, f32> {
    terminated(float, char('%'))(input)
}

/// Parse rgb(r%, g%, b%)
fn parse_rgb_percent(input: &str) -> IResult<&str, Rgb> {
    let (input, _) = tag_no_case("rgb")(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char('(')(input)?;
    let (input, _) = ws(input)?;
    let (input, (r, _, g, _, b)) = tuple((percent, comma, percent, comma, percent))(input)?;
    let (input, _) = ws(input)?;
    let (input, _) = char(')')(input)?;

    Ok((input, Rgb::new(r * 2.55, g * 2.55, b * 2.55)))
}

fn hex_digits(count: usize) -> impl Fn(&str) -> IResult<&str, u8> {
    move |input| {
        map_res(
            take_while_m_n(count, count, |c: char| c.is_ascii_hexdigit()),
            move |hex: &str| {
                if count == 1 {
                    u8::from_str_radix(&hex.repeat(2), 16)
                } else {
                    u8::from_str_radix(hex, 16)
                }
            },
        )(input)
    }
}

/// Parse hex colour: #RRGGBB or #RGB
fn parse_hex_color(input: &str) -> IResult<&str, Rgb> {
    let (input, _) = char('#')(input)?;
    alt((
        map(
            all_consuming(tuple((hex_digits(2), hex_digits(2), hex_digits(2)))),
            |(r, g, b)| Rgb::new(r as f32, g as f32, b as f32),
        ),
        map(
            all_consuming(tuple((hex_digits(1), hex_digits(1), hex_digits(1)))),
            |(r, g, b)| Rgb::new(r as f32, g as f32, b as f32),
        ),
    ))(input)
}

/// Parse named colours
fn named_color(name: &str) -> Option<Rgb> {
    let rgb = |r: u8, g: u8, b: u8| Some(Rgb::new(r as f32, g as f32, b as f32));
    match name.to_ascii_lowercase().as_str() {
        "aqua" | "cyan" => rgb(0, 255, 255),
        "azure" => rgb(240, 255, 255),
        "beige" => rgb(245, 245, 220),
        "black" => rgb(0, 0, 0),
        "blue" => rgb(0, 0, 255),
        "brown" => rgb(165, 42, 42),
        "darkblue" => rgb(0, 0, 139),
        "darkcyan" => rgb(0, 139, 139),
        "darkgrey" => rgb(169, 169, 169),
        "darkgreen" => rgb(0, 100, 0),
        "darkkhaki" => rgb(189, 183, 107),
        "darkmagenta" => rgb(139, 0, 139),
        "darkolivegreen" => rgb(85, 107, 47),
        "darkorange" => rgb(255, 140, 0),
        "darkorchid" => rgb(153, 50, 204),
        "darkred" => rgb(139, 0, 0),
        "darksalmon" => rgb(233, 150, 122),
        "darkviolet" => rgb(148, 0, 211),
        "fuchsia" | "magenta" => rgb(255, 0, 255),
        "gold" => rgb(255, 215, 0),
        "green" => rgb(0, 128, 0),
        "indigo" => rgb(75, 0, 130),
        "khaki" => rgb(240, 230, 140),
        "lightblue" => rgb(173, 216, 230),
        "lightcyan" => rgb(224, 255, 255),
        "lightgreen" => rgb(144, 238, 144),
        "lightgrey" => rgb(211, 211, 211),
        "lightpink" => rgb(255, 182, 193),
        "lightyellow" => rgb(255, 255, 224),
        "lime" => rgb(0, 255, 0),
        "maroon" => rgb(128, 0, 0),
        "navy" => rgb(0, 0, 128),
        "olive" => rgb(128, 128, 0),
        "orange" => rgb(255, 165, 0),
        "pink" => rgb(255, 192, 203),
        "purple" | "violet" => rgb(128, 0, 128),
        "red" => rgb(255, 0, 0),
        "silver" => rgb(192, 192, 192),
        "white" => rgb(255, 255, 255),
        "yellow" => rgb(255, 255, 0),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rgb_function() {
        assert_eq!(
            Rgb::parse("rgb(10, 20,30)"),
            Some(Rgb::new(10.0, 20.0, 30.0))
        );
    }

    #[test]
    fn parses_rgb_percentages() {
        let color = Rgb::parse("rgb(100%, 0%, 50%)").unwrap();
        assert!((color.r - 255.0).abs() < 1e-3);
        assert_eq!(color.g, 0.0);
        assert!((color.b - 127.5).abs() < 1e-3);
    }

    #[test]
    fn parses_hex_forms() {
        assert_eq!(Rgb::parse("#ff8000"), Some(Rgb::new(255.0, 128.0, 0.0)));
        assert_eq!(Rgb::parse("#FFF"), Some(Rgb::WHITE));
        assert_eq!(Rgb::parse("#12345"), None);
    }

    #[test]
    fn parses_named_colors() {
        assert_eq!(Rgb::parse(" Black "), Some(Rgb::BLACK));
        assert_eq!(Rgb::parse("navy"), Some(Rgb::new(0.0, 0.0, 128.0)));
        assert_eq!(Rgb::parse("transparent"), None);
    }

    #[test]
    fn lerp_reaches_both_ends() {
        let from = Rgb::BLACK;
        let to = Rgb::WHITE;
        assert_eq!(from.lerp(&to, 0.0), from);
        assert_eq!(from.lerp(&to, 1.0), to);
        assert_eq!(from.lerp(&to, 0.5), Rgb::new(127.5, 127.5, 127.5));
    }
}
