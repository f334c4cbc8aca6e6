//! Axis scales.
//!
//! [`LinearScale`] maps a continuous domain onto a pixel range and can round
//! its domain out to "nice" tick boundaries. [`BandScale`] divides a pixel
//! range into evenly spaced bands for categorical axes.

/// Continuous linear mapping from `domain` to `range`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

/// Tick step for a span divided into roughly `count` intervals, snapped to
/// 1, 2, 5 or 10 times a power of ten.
fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let span = (stop - start).abs();
    if span == 0.0 || count == 0 || !span.is_finite() {
        return 0.0;
    }
    let raw = span / count as f64;
    let power = 10f64.powf(raw.log10().floor());
    let error = raw / power;
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };
    factor * power
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a domain value into the range. A zero-width domain maps every
    /// value to the middle of the range.
    pub fn map(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (v - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Extend the domain outward to multiples of the tick step.
    pub fn nice(mut self, count: usize) -> Self {
        let (d0, d1) = self.domain;
        let step = tick_step(d0, d1, count);
        if step > 0.0 {
            let lo = (d0.min(d1) / step).floor() * step;
            let hi = (d0.max(d1) / step).ceil() * step;
            self.domain = if d0 <= d1 { (lo, hi) } else { (hi, lo) };
        }
        self
    }

    /// Tick values inside the domain, roughly `count` of them.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let step = tick_step(lo, hi, count);
        if step == 0.0 {
            return vec![lo];
        }
        let first = (lo / step).ceil() as i64;
        let last = (hi / step).floor() as i64;
        (first..=last).map(|i| i as f64 * step).collect()
    }
}

/// Evenly spaced bands over a pixel range, one per domain key.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding: f64,
}

impl BandScale {
    /// `padding` is the fraction of each step left empty, applied both
    /// between bands and at the outer edges.
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self {
            domain,
            range,
            padding: padding.clamp(0.0, 1.0),
        }
    }

    fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        (r1 - r0) / (n - self.padding + 2.0 * self.padding).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Start coordinate of the band for `key`.
    pub fn position(&self, key: &str) -> Option<f64> {
        let index = self.domain.iter().position(|k| k == key)?;
        Some(self.position_at(index))
    }

    /// Start coordinate of the band at `index`.
    pub fn position_at(&self, index: usize) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let step = self.step();
        let start = r0 + (r1 - r0 - step * (n - self.padding)) / 2.0;
        start + step * index as f64
    }

    /// Centre coordinate of the band at `index`.
    pub fn center_at(&self, index: usize) -> f64 {
        self.position_at(index) + self.bandwidth() / 2.0
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_map() {
        let s = LinearScale::new((0.0, 10.0), (0.0, 200.0));
        assert!((s.map(5.0) - 100.0).abs() < 1e-9);
        let inverted = LinearScale::new((0.0, 10.0), (200.0, 0.0));
        assert!((inverted.map(10.0) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_domain_maps_to_midpoint() {
        let s = LinearScale::new((2020.0, 2020.0), (0.0, 100.0));
        assert!((s.map(2020.0) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_nice_rounds_out() {
        let s = LinearScale::new((0.0, 23.0), (0.0, 1.0)).nice(10);
        assert_eq!(s.domain, (0.0, 24.0));
        let s = LinearScale::new((0.0, 0.96), (0.0, 1.0)).nice(10);
        assert!((s.domain.1 - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_ticks() {
        let s = LinearScale::new((0.0, 10.0), (0.0, 1.0));
        assert_eq!(s.ticks(5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let flat = LinearScale::new((3.0, 3.0), (0.0, 1.0));
        assert_eq!(flat.ticks(5), vec![3.0]);
    }

    #[test]
    fn test_band_without_padding() {
        let b = BandScale::new(vec!["a".into(), "b".into()], (0.0, 100.0), 0.0);
        assert!((b.bandwidth() - 50.0).abs() < 1e-9);
        assert_eq!(b.position("b"), Some(50.0));
        assert_eq!(b.position("c"), None);
    }

    #[test]
    fn test_band_with_padding_stays_in_range() {
        let keys: Vec<String> = (0..5).map(|i| i.to_string()).collect();
        let b = BandScale::new(keys, (0.0, 300.0), 0.2);
        let first = b.position_at(0);
        let last_end = b.position_at(4) + b.bandwidth();
        assert!(first > 0.0);
        assert!(last_end < 300.0);
        assert!((first - (300.0 - last_end)).abs() < 1e-9);
    }
}
