//! Easing functions for animations
//!
//! Easings are addressed by name in configuration (`"linear"`, `"swing"`,
//! `"ease-in-out"`, `"cubic-bezier(0.25, 0.1, 0.25, 1)"`, ...). Unknown names
//! resolve to [`Easing::Linear`].

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Easing function type
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Easing {
    #[default]
    Linear,
    /// Cosine ease-in-out, the classic "swing" curve
    Swing,
    EaseIn,
    EaseOut,
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    CubicBezier(f32, f32, f32, f32),
}

impl Easing {
    /// Eased value of a linear progress `t` in `[0, 1]`
    pub fn apply(&self, t: f32) -> f32 {
        match *self {
            Easing::Linear => t,
            Easing::Swing => 0.5 - (t * std::f32::consts::PI).cos() / 2.0,
            Easing::EaseInQuad => power_in(t, 2),
            Easing::EaseOutQuad => power_out(t, 2),
            Easing::EaseInOutQuad => power_in_out(t, 2),
            Easing::EaseIn | Easing::EaseInCubic => power_in(t, 3),
            Easing::EaseOut | Easing::EaseOutCubic => power_out(t, 3),
            Easing::EaseInOut | Easing::EaseInOutCubic => power_in_out(t, 3),
            Easing::EaseInQuart => power_in(t, 4),
            Easing::EaseOutQuart => power_out(t, 4),
            Easing::EaseInOutQuart => power_in_out(t, 4),
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, x1, y1, x2, y2),
        }
    }

    /// Resolve an easing by name.
    ///
    /// Accepts kebab-case, camelCase and `cubic-bezier(x1, y1, x2, y2)`.
    /// Anything unrecognised falls back to `Linear`.
    pub fn from_name(name: &str) -> Self {
        let trimmed = name.trim();
        if let Some(args) = trimmed
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            let parts: Vec<f32> = args
                .split(',')
                .filter_map(|p| p.trim().parse::<f32>().ok())
                .collect();
            if let [x1, y1, x2, y2] = parts[..] {
                return Easing::CubicBezier(x1, y1, x2, y2);
            }
            debug!(easing = name, "malformed cubic-bezier, using linear");
            return Easing::Linear;
        }

        let key: String = trimmed
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "linear" => Easing::Linear,
            "swing" => Easing::Swing,
            "easein" => Easing::EaseIn,
            "easeout" => Easing::EaseOut,
            "ease" | "easeinout" => Easing::EaseInOut,
            "easeinquad" => Easing::EaseInQuad,
            "easeoutquad" => Easing::EaseOutQuad,
            "easeinoutquad" => Easing::EaseInOutQuad,
            "easeincubic" => Easing::EaseInCubic,
            "easeoutcubic" => Easing::EaseOutCubic,
            "easeinoutcubic" => Easing::EaseInOutCubic,
            "easeinquart" => Easing::EaseInQuart,
            "easeoutquart" => Easing::EaseOutQuart,
            "easeinoutquart" => Easing::EaseInOutQuart,
            _ => {
                debug!(easing = name, "unknown easing, using linear");
                Easing::Linear
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Easing::Linear => "linear",
            Easing::Swing => "swing",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseInQuad => "ease-in-quad",
            Easing::EaseOutQuad => "ease-out-quad",
            Easing::EaseInOutQuad => "ease-in-out-quad",
            Easing::EaseInCubic => "ease-in-cubic",
            Easing::EaseOutCubic => "ease-out-cubic",
            Easing::EaseInOutCubic => "ease-in-out-cubic",
            Easing::EaseInQuart => "ease-in-quart",
            Easing::EaseOutQuart => "ease-out-quart",
            Easing::EaseInOutQuart => "ease-in-out-quart",
            Easing::CubicBezier(x1, y1, x2, y2) => {
                return write!(f, "cubic-bezier({x1}, {y1}, {x2}, {y2})");
            }
        };
        f.write_str(name)
    }
}

impl From<String> for Easing {
    fn from(name: String) -> Self {
        Easing::from_name(&name)
    }
}

impl From<Easing> for String {
    fn from(easing: Easing) -> Self {
        easing.to_string()
    }
}

fn power_in(t: f32, power: i32) -> f32 {
    t.powi(power)
}

fn power_out(t: f32, power: i32) -> f32 {
    1.0 - (1.0 - t).powi(power)
}

fn power_in_out(t: f32, power: i32) -> f32 {
    if t < 0.5 {
        2f32.powi(power - 1) * t.powi(power)
    } else {
        1.0 - (2.0 - 2.0 * t).powi(power) / 2.0
    }
}

/// CSS `cubic-bezier()` timing: solve the curve for `x = t`, then read `y`.
///
/// Worked in f64 so successive frames do not jitter.
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }
    let s = solve_for_x(t as f64, x1 as f64, x2 as f64);
    bezier_at(s, y1 as f64, y2 as f64) as f32
}

/// Curve parameter whose x coordinate is `target`
fn solve_for_x(target: f64, x1: f64, x2: f64) -> f64 {
    const EPSILON: f64 = 1e-7;

    // Newton steps converge fast on well-behaved curves
    let mut s = target;
    for _ in 0..8 {
        let error = bezier_at(s, x1, x2) - target;
        if error.abs() < EPSILON {
            return s;
        }
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < EPSILON {
            break;
        }
        s -= error / slope;
    }

    // Flat spots: bisect instead
    let (mut lo, mut hi) = (0.0, 1.0);
    s = target;
    for _ in 0..20 {
        let x = bezier_at(s, x1, x2);
        if (x - target).abs() < EPSILON {
            break;
        }
        if x < target {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    s
}

/// Polynomial coefficients of a unit bezier with control values `p1`, `p2`
fn bezier_coefficients(p1: f64, p2: f64) -> (f64, f64, f64) {
    (1.0 - 3.0 * p2 + 3.0 * p1, 3.0 * p2 - 6.0 * p1, 3.0 * p1)
}

fn bezier_at(s: f64, p1: f64, p2: f64) -> f64 {
    let (a, b, c) = bezier_coefficients(p1, p2);
    ((a * s + b) * s + c) * s
}

fn bezier_slope(s: f64, p1: f64, p2: f64) -> f64 {
    let (a, b, c) = bezier_coefficients(p1, p2);
    (3.0 * a * s + 2.0 * b) * s + c
}
