//! Per-kind encoding descriptors.
//!
//! Every chart is drawn by the same renderer; what differs between the
//! seven dashboard charts is captured here as data.

use crate::models::AggregateKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Geometry {
    /// Categorical y band axis, linear x axis, bars grow rightwards.
    HorizontalBars,
    /// Categorical x band axis, linear y axis, bars grow upwards.
    VerticalBars,
    /// One point per bucket over a band axis, joined by a smoothed line
    /// with a filled area beneath and a dashed reference line.
    PointLine,
    /// Pie (`inner_ratio == 0`) or donut sectors sized by share of total.
    Arcs { inner_ratio: f64 },
    /// Three co-plotted year-trend series on shared linear axes.
    MultiLine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Largest metric first; ties broken by label.
    ValueDesc,
    /// Ascending by bucket value or year.
    KeyAsc,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorStrategy {
    Fixed(&'static str),
    /// Sequential blues keyed by rank, darkest for rank 0.
    RankRamp,
    /// Ramp over the entry's numeric key.
    MagnitudeRamp(&'static [(f64, &'static str)]),
    /// Categorical blues palette by index.
    Ordinal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Margin {
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const ZERO: Margin = Margin::new(0.0, 0.0, 0.0, 0.0);
}

/// A co-plotted series of a multi-line chart.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Series {
    pub name: &'static str,
    pub color: &'static str,
}

pub const YEAR_SERIES: [Series; 3] = [
    Series {
        name: "Intensity",
        color: "#228be6",
    },
    Series {
        name: "Likelihood",
        color: "#12b886",
    },
    Series {
        name: "Relevance",
        color: "#7950f2",
    },
];

pub const INTENSITY_STOPS: &[(f64, &str)] = &[(1.0, "#4dabf7"), (5.0, "#228be6"), (10.0, "#1864ab")];
pub const LIKELIHOOD_STOPS: &[(f64, &str)] = &[(1.0, "#38d9a9"), (4.0, "#12b886")];

/// Everything the renderer needs to know about one chart kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoding {
    pub kind: AggregateKind,
    pub title: &'static str,
    pub geometry: Geometry,
    pub sort: SortOrder,
    pub color: ColorStrategy,
    pub margin: Margin,
    pub x_label: Option<&'static str>,
    pub y_label: Option<&'static str>,
    /// Print the metric at the end of each bar.
    pub value_labels: bool,
    /// Legend entries shown for arc charts (largest first).
    pub legend_top_n: usize,
    /// Legend labels longer than this are truncated with `...`.
    pub legend_max_chars: usize,
    /// Text drawn in the donut hole.
    pub center_label: Option<&'static str>,
}

impl Encoding {
    pub fn with_legend_top_n(mut self, n: usize) -> Self {
        self.legend_top_n = n;
        self
    }
}

/// The descriptor for one aggregate kind.
pub fn encoding_for(kind: AggregateKind) -> Encoding {
    let base = Encoding {
        kind,
        title: kind.title(),
        geometry: Geometry::HorizontalBars,
        sort: SortOrder::ValueDesc,
        color: ColorStrategy::RankRamp,
        margin: Margin::new(30.0, 40.0, 50.0, 100.0),
        x_label: None,
        y_label: None,
        value_labels: false,
        legend_top_n: 6,
        legend_max_chars: 15,
        center_label: None,
    };
    match kind {
        AggregateKind::Topic | AggregateKind::Country => Encoding {
            x_label: Some("Count"),
            value_labels: true,
            ..base
        },
        AggregateKind::Intensity => Encoding {
            geometry: Geometry::VerticalBars,
            sort: SortOrder::KeyAsc,
            color: ColorStrategy::MagnitudeRamp(INTENSITY_STOPS),
            margin: Margin::new(30.0, 30.0, 50.0, 60.0),
            x_label: Some("Intensity"),
            y_label: Some("Count"),
            ..base
        },
        AggregateKind::Likelihood => Encoding {
            geometry: Geometry::PointLine,
            sort: SortOrder::KeyAsc,
            color: ColorStrategy::MagnitudeRamp(LIKELIHOOD_STOPS),
            margin: Margin::new(30.0, 30.0, 50.0, 60.0),
            x_label: Some("Likelihood"),
            y_label: Some("Count"),
            ..base
        },
        AggregateKind::Region => Encoding {
            geometry: Geometry::Arcs { inner_ratio: 0.5 },
            color: ColorStrategy::Ordinal,
            margin: Margin::ZERO,
            center_label: Some("Regions"),
            ..base
        },
        AggregateKind::Sector => Encoding {
            geometry: Geometry::Arcs { inner_ratio: 0.0 },
            color: ColorStrategy::Ordinal,
            margin: Margin::ZERO,
            ..base
        },
        AggregateKind::YearTrend => Encoding {
            geometry: Geometry::MultiLine,
            sort: SortOrder::KeyAsc,
            color: ColorStrategy::Fixed("#228be6"),
            margin: Margin::new(30.0, 100.0, 50.0, 60.0),
            x_label: Some("Year"),
            y_label: Some("Average Value"),
            ..base
        },
    }
}
