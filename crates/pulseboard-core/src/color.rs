//! Colour parsing, interpolation, and the palettes charts draw with.

use std::fmt;

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let s = s.strip_prefix('#').unwrap_or(s);
        if s.len() != 6 || !s.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&s[i..i + 2], 16).ok();
        Some(Rgb {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }

    /// Linear interpolation towards `other`; `t` is clamped to `[0, 1]`.
    pub fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Nine-step sequential blues, light to dark.
pub const SCHEME_BLUES: [&str; 9] = [
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];

fn rgb(hex: &str) -> Rgb {
    Rgb::parse_hex(hex).unwrap_or(Rgb { r: 0, g: 0, b: 0 })
}

/// Continuous blues ramp, `t` in `[0, 1]` from lightest to darkest.
pub fn interpolate_blues(t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = (SCHEME_BLUES.len() - 1) as f64;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(SCHEME_BLUES.len() - 2);
    rgb(SCHEME_BLUES[i]).lerp(rgb(SCHEME_BLUES[i + 1]), pos - i as f64)
}

/// Piecewise-linear ramp through `(value, colour)` stops sorted by value.
/// Values outside the stops clamp to the end colours.
pub fn ramp(stops: &[(f64, &str)], v: f64) -> Rgb {
    match stops {
        [] => rgb("#000000"),
        [(_, only)] => rgb(only),
        _ => {
            let (first, last) = (stops[0], stops[stops.len() - 1]);
            if v <= first.0 {
                return rgb(first.1);
            }
            if v >= last.0 {
                return rgb(last.1);
            }
            for pair in stops.windows(2) {
                let ((v0, c0), (v1, c1)) = (pair[0], pair[1]);
                if v >= v0 && v <= v1 {
                    let t = if v1 == v0 { 0.0 } else { (v - v0) / (v1 - v0) };
                    return rgb(c0).lerp(rgb(c1), t);
                }
            }
            rgb(last.1)
        }
    }
}

/// Ordinal palette lookup, darkest first, cycling through the blues scheme.
pub fn ordinal_blues(index: usize) -> Rgb {
    let n = SCHEME_BLUES.len();
    rgb(SCHEME_BLUES[n - 1 - index % n])
}
