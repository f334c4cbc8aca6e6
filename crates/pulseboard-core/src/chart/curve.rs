//! Path geometry: monotone cubic curves, areas, and annular sectors.

use std::f64::consts::PI;

fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

/// Tangent at `p1` from its neighbours (Steffen's monotone method).
fn interior_slope(p0: (f64, f64), p1: (f64, f64), p2: (f64, f64)) -> f64 {
    let h0 = p1.0 - p0.0;
    let h1 = p2.0 - p1.0;
    if h0 == 0.0 || h1 == 0.0 {
        return 0.0;
    }
    let s0 = (p1.1 - p0.1) / h0;
    let s1 = (p2.1 - p1.1) / h1;
    let p = (s0 * h1 + s1 * h0) / (h0 + h1);
    let t = (sign(s0) + sign(s1)) * s0.abs().min(s1.abs()).min(0.5 * p.abs());
    if t.is_finite() {
        t
    } else {
        0.0
    }
}

/// Tangent at an endpoint given the adjacent interior tangent.
fn end_slope(p0: (f64, f64), p1: (f64, f64), t: f64) -> f64 {
    let h = p1.0 - p0.0;
    if h == 0.0 {
        t
    } else {
        (3.0 * (p1.1 - p0.1) / h - t) / 2.0
    }
}

/// One cubic segment per consecutive point pair: `(start, c1, c2, end)`.
type Segment = ((f64, f64), (f64, f64), (f64, f64), (f64, f64));

fn monotone_segments(points: &[(f64, f64)]) -> Vec<Segment> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }
    if n == 2 {
        let (a, b) = (points[0], points[1]);
        return vec![(a, a, b, b)];
    }
    let mut tangents = vec![0.0; n];
    for i in 1..n - 1 {
        tangents[i] = interior_slope(points[i - 1], points[i], points[i + 1]);
    }
    tangents[0] = end_slope(points[0], points[1], tangents[1]);
    tangents[n - 1] = end_slope(points[n - 2], points[n - 1], tangents[n - 2]);

    points
        .windows(2)
        .enumerate()
        .map(|(i, w)| {
            let (p0, p1) = (w[0], w[1]);
            let dx = (p1.0 - p0.0) / 3.0;
            (
                p0,
                (p0.0 + dx, p0.1 + dx * tangents[i]),
                (p1.0 - dx, p1.1 - dx * tangents[i + 1]),
                p1,
            )
        })
        .collect()
}

fn segment_commands(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(|(_, c1, c2, p)| {
            format!(
                "C{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
                c1.0, c1.1, c2.0, c2.1, p.0, p.1
            )
        })
        .collect()
}

/// SVG path data for a monotone-in-x smoothed line through `points`.
pub fn monotone_path(points: &[(f64, f64)]) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    let mut d = format!("M{:.2},{:.2}", first.0, first.1);
    d.push_str(&segment_commands(&monotone_segments(points)));
    d
}

/// Closed area between the smoothed line and the horizontal `baseline`.
pub fn monotone_area(points: &[(f64, f64)], baseline: f64) -> String {
    let (Some(first), Some(last)) = (points.first(), points.last()) else {
        return String::new();
    };
    let mut d = format!("M{:.2},{:.2}", first.0, baseline);
    d.push_str(&format!("L{:.2},{:.2}", first.0, first.1));
    d.push_str(&segment_commands(&monotone_segments(points)));
    d.push_str(&format!("L{:.2},{:.2}Z", last.0, baseline));
    d
}

fn bezier_point(s: &Segment, t: f64) -> (f64, f64) {
    let u = 1.0 - t;
    let (a, b, c, d) = *s;
    let w = [u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t];
    (
        w[0] * a.0 + w[1] * b.0 + w[2] * c.0 + w[3] * d.0,
        w[0] * a.1 + w[1] * b.1 + w[2] * c.1 + w[3] * d.1,
    )
}

/// Approximate length of [`monotone_path`] through `points`.
pub fn monotone_length(points: &[(f64, f64)]) -> f64 {
    const STEPS: usize = 16;
    let mut total = 0.0;
    for seg in monotone_segments(points) {
        let mut prev = seg.0;
        for step in 1..=STEPS {
            let p = bezier_point(&seg, step as f64 / STEPS as f64);
            total += ((p.0 - prev.0).powi(2) + (p.1 - prev.1).powi(2)).sqrt();
            prev = p;
        }
    }
    total
}

/// Point at `angle` radians (0 at twelve o'clock, clockwise) on a circle.
fn polar(angle: f64, radius: f64) -> (f64, f64) {
    (radius * angle.sin(), -radius * angle.cos())
}

/// SVG path data for the annular sector between two angles.
///
/// Both the outer and inner edges are emitted as two half-arcs so that a
/// full circle still draws, and so that every sector path has the same
/// command structure (which lets a sweep animation interpolate between
/// a zero-angle wedge and the final sector).
pub fn arc_path(start: f64, end: f64, inner: f64, outer: f64) -> String {
    let mid = (start + end) / 2.0;
    let o0 = polar(start, outer);
    let o1 = polar(mid, outer);
    let o2 = polar(end, outer);
    let i0 = polar(end, inner);
    let i1 = polar(mid, inner);
    let i2 = polar(start, inner);
    format!(
        "M{:.2},{:.2}A{r:.2},{r:.2},0,0,1,{:.2},{:.2}A{r:.2},{r:.2},0,0,1,{:.2},{:.2}\
         L{:.2},{:.2}A{ri:.2},{ri:.2},0,0,0,{:.2},{:.2}A{ri:.2},{ri:.2},0,0,0,{:.2},{:.2}Z",
        o0.0,
        o0.1,
        o1.0,
        o1.1,
        o2.0,
        o2.1,
        i0.0,
        i0.1,
        i1.0,
        i1.1,
        i2.0,
        i2.1,
        r = outer,
        ri = inner,
    )
}

/// Start/end angles for each value, laid out clockwise from twelve
/// o'clock in input order. Zero total yields zero-width sectors.
pub fn pie_angles(values: &[f64]) -> Vec<(f64, f64)> {
    let total: f64 = values.iter().sum();
    let mut angle = 0.0;
    values
        .iter()
        .map(|v| {
            let span = if total > 0.0 { v / total * 2.0 * PI } else { 0.0 };
            let start = angle;
            angle += span;
            (start, angle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotone_path_shapes() {
        assert_eq!(monotone_path(&[]), "");
        assert_eq!(monotone_path(&[(1.0, 2.0)]), "M1.00,2.00");
        let d = monotone_path(&[(0.0, 0.0), (10.0, 10.0), (20.0, 0.0)]);
        assert!(d.starts_with("M0.00,0.00C"));
        assert_eq!(d.matches('C').count(), 2);
    }

    #[test]
    fn test_monotone_does_not_overshoot_flat_runs() {
        // A flat interior point must get a zero tangent.
        let t = interior_slope((0.0, 0.0), (1.0, 5.0), (2.0, 5.0));
        assert_eq!(t, 0.0);
    }

    #[test]
    fn test_length_of_straight_line() {
        let len = monotone_length(&[(0.0, 0.0), (30.0, 40.0)]);
        assert!((len - 50.0).abs() < 1e-6);
    }

    #[test]
    fn test_area_is_closed() {
        let d = monotone_area(&[(0.0, 5.0), (10.0, 2.0)], 100.0);
        assert!(d.starts_with("M0.00,100.00L0.00,5.00"));
        assert!(d.ends_with("L10.00,100.00Z"));
    }

    #[test]
    fn test_pie_angles_cover_circle() {
        let angles = pie_angles(&[1.0, 1.0, 2.0]);
        assert_eq!(angles.len(), 3);
        assert!((angles[0].1 - PI / 2.0).abs() < 1e-9);
        assert!((angles[2].1 - 2.0 * PI).abs() < 1e-9);
        assert!(pie_angles(&[0.0, 0.0]).iter().all(|(a, b)| a == b));
    }

    #[test]
    fn test_arc_path_structure_is_stable() {
        let full = arc_path(0.0, 2.0 * PI, 10.0, 20.0);
        let wedge = arc_path(0.0, 0.0, 10.0, 20.0);
        let commands = |d: &str| d.chars().filter(|c| c.is_ascii_alphabetic()).collect::<String>();
        assert_eq!(commands(&full), commands(&wedge));
    }
}
