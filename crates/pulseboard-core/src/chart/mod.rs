//! Generalized chart renderer.
//!
//! One renderer draws all seven dashboard charts. The differences between
//! them (geometry, sort order, colour strategy, labels) come from the
//! per-kind [`Encoding`] returned by [`encoding_for`]:
//!
//! | Kind | Geometry | Order | Colour |
//! |------|----------|-------|--------|
//! | topic, country | horizontal bars + value labels | value desc | blues by rank |
//! | intensity | vertical bars | bucket asc | ramp over intensity |
//! | likelihood | points + smoothed line + area + dashed mean | bucket asc | ramp over likelihood |
//! | region | donut + legend | value desc | ordinal blues |
//! | sector | pie + legend | value desc | ordinal blues |
//! | year trend | three lines + points + legend | year asc | fixed per series |
//!
//! Rendering is a pure function of `(entries, encoding, viewport)`; an
//! empty entry list renders the "no data" placeholder.

mod curve;
mod encoding;
mod scene;

pub use curve::{arc_path, monotone_area, monotone_length, monotone_path, pie_angles};
pub use encoding::{
    encoding_for, ColorStrategy, Encoding, Geometry, Margin, Series, SortOrder, INTENSITY_STOPS,
    LIKELIHOOD_STOPS, YEAR_SERIES,
};
pub use scene::{
    Anchor, Animation, Element, Gradient, Scene, Shape, Tooltip, Viewport, LOADING_MESSAGE,
    NO_DATA_MESSAGE,
};

use crate::color::{interpolate_blues, ordinal_blues, ramp};
use crate::models::{format_number, AggregateEntry, AggregateKind, YearTrend};
use crate::scale::{BandScale, LinearScale};

const AXIS_COLOR: &str = "currentColor";
const LABEL_SIZE: f64 = 12.0;
const TICK_COUNT: usize = 5;
/// The likelihood reference line sits at this fraction of the mean bucket.
const REFERENCE_SCALE: f64 = 0.7;

/// Render `entries` with the default encoding for `kind`.
pub fn render_kind(kind: AggregateKind, entries: &[AggregateEntry], viewport: Viewport) -> Scene {
    render(entries, &encoding_for(kind), viewport)
}

/// Render an aggregate sequence into a scene.
pub fn render(entries: &[AggregateEntry], encoding: &Encoding, viewport: Viewport) -> Scene {
    if entries.is_empty() {
        return Scene::empty(encoding.title, viewport);
    }
    let sorted = sort_entries(entries, encoding.sort);
    match encoding.geometry {
        Geometry::HorizontalBars => horizontal_bars(&sorted, encoding, viewport),
        Geometry::VerticalBars => vertical_bars(&sorted, encoding, viewport),
        Geometry::PointLine => point_line(&sorted, encoding, viewport),
        Geometry::Arcs { inner_ratio } => arcs(&sorted, encoding, viewport, inner_ratio),
        Geometry::MultiLine => multi_line(&sorted, encoding, viewport),
    }
}

/// Sort a copy of `entries` for display.
pub fn sort_entries(entries: &[AggregateEntry], order: SortOrder) -> Vec<AggregateEntry> {
    let mut sorted = entries.to_vec();
    match order {
        SortOrder::ValueDesc => sorted.sort_by(|a, b| {
            b.metric()
                .total_cmp(&a.metric())
                .then_with(|| a.label().cmp(&b.label()))
        }),
        SortOrder::KeyAsc => sorted.sort_by(|a, b| {
            let ka = a.numeric_key().unwrap_or(f64::NEG_INFINITY);
            let kb = b.numeric_key().unwrap_or(f64::NEG_INFINITY);
            ka.total_cmp(&kb).then_with(|| a.label().cmp(&b.label()))
        }),
    }
    sorted
}

/// Shorten a legend label to `max` characters plus `...`.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let mut s: String = label.chars().take(max).collect();
        s.push_str("...");
        s
    } else {
        label.to_string()
    }
}

fn fill_for(strategy: ColorStrategy, rank: usize, total: usize, entry: &AggregateEntry) -> String {
    match strategy {
        ColorStrategy::Fixed(c) => c.to_string(),
        ColorStrategy::RankRamp => {
            let n = total.max(1) as f64;
            interpolate_blues((n - rank as f64) / n).to_string()
        }
        ColorStrategy::MagnitudeRamp(stops) => {
            ramp(stops, entry.numeric_key().unwrap_or(0.0)).to_string()
        }
        ColorStrategy::Ordinal => ordinal_blues(rank).to_string(),
    }
}

fn text(x: f64, y: f64, s: impl Into<String>, anchor: Anchor) -> Shape {
    Shape::Text {
        x,
        y,
        text: s.into(),
        anchor,
        size: LABEL_SIZE,
        bold: false,
        vertical: false,
    }
}

fn axis_line(x1: f64, y1: f64, x2: f64, y2: f64) -> Element {
    Element::new(
        "axis",
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            stroke: AXIS_COLOR.to_string(),
            dash: None,
            opacity: 1.0,
        },
    )
}

/// Bottom axis for a linear x scale at height `y`.
fn bottom_linear_axis(scene: &mut Scene, x: &LinearScale, y: f64, width: f64) {
    scene.push(axis_line(0.0, y, width, y));
    for tick in x.ticks(TICK_COUNT) {
        let px = x.map(tick);
        scene.push(axis_line(px, y, px, y + 6.0));
        scene.push(Element::new(
            "axis",
            text(px, y + 18.0, format_number(tick), Anchor::Middle),
        ));
    }
}

/// Left axis for a linear y scale.
fn left_linear_axis(scene: &mut Scene, y: &LinearScale, height: f64) {
    scene.push(axis_line(0.0, 0.0, 0.0, height));
    for tick in y.ticks(TICK_COUNT) {
        let py = y.map(tick);
        scene.push(axis_line(-6.0, py, 0.0, py));
        scene.push(Element::new(
            "axis",
            text(-9.0, py + 4.0, format_number(tick), Anchor::End),
        ));
    }
}

fn axis_labels(scene: &mut Scene, encoding: &Encoding, width: f64, height: f64) {
    if let Some(label) = encoding.x_label {
        scene.push(Element::new(
            "axis-label",
            text(width / 2.0, height + encoding.margin.bottom - 10.0, label, Anchor::Middle),
        ));
    }
    if let Some(label) = encoding.y_label {
        scene.push(Element::new(
            "axis-label",
            Shape::Text {
                x: -height / 2.0,
                y: -encoding.margin.left + 20.0,
                text: label.to_string(),
                anchor: Anchor::Middle,
                size: LABEL_SIZE,
                bold: false,
                vertical: true,
            },
        ));
    }
}

fn inner_size(encoding: &Encoding, viewport: Viewport) -> (f64, f64) {
    let m = encoding.margin;
    (
        (viewport.width - m.left - m.right).max(1.0),
        (viewport.height - m.top - m.bottom).max(1.0),
    )
}

fn count_tooltip(encoding: &Encoding, entry: &AggregateEntry) -> Tooltip {
    let count = format!("Count: {}", entry.count().unwrap_or(0));
    match encoding.kind {
        AggregateKind::Intensity => Tooltip::new([format!("Intensity: {}", entry.label()), count]),
        AggregateKind::Likelihood => {
            Tooltip::new([format!("Likelihood: {}", entry.label()), count])
        }
        _ => Tooltip::new([entry.label(), count]),
    }
}

/// Upper end of a count axis. Never below 1, so all-zero data keeps a
/// real domain and zero bars stay at the baseline.
fn max_metric(entries: &[AggregateEntry]) -> f64 {
    entries
        .iter()
        .map(AggregateEntry::metric)
        .fold(0.0, f64::max)
        .max(1.0)
}

fn horizontal_bars(entries: &[AggregateEntry], encoding: &Encoding, viewport: Viewport) -> Scene {
    let (width, height) = inner_size(encoding, viewport);
    let mut scene = Scene::new(
        encoding.title,
        viewport,
        (encoding.margin.left, encoding.margin.top),
    );
    let x = LinearScale::new((0.0, max_metric(entries)), (0.0, width)).nice(10);
    let y = BandScale::new(entries.iter().map(|e| e.label()).collect(), (0.0, height), 0.2);
    let n = entries.len();

    bottom_linear_axis(&mut scene, &x, height, width);
    scene.push(axis_line(0.0, 0.0, 0.0, height));
    for (i, entry) in entries.iter().enumerate() {
        scene.push(Element::new(
            "axis",
            text(-9.0, y.center_at(i) + 4.0, entry.label(), Anchor::End),
        ));
    }
    axis_labels(&mut scene, encoding, width, height);

    for (i, entry) in entries.iter().enumerate() {
        let delay = i as u32 * 50;
        scene.push(
            Element::new(
                "bar",
                Shape::Rect {
                    x: 0.0,
                    y: y.position_at(i),
                    width: x.map(entry.metric()),
                    height: y.bandwidth(),
                    fill: fill_for(encoding.color, i, n, entry),
                },
            )
            .animate(Animation::GrowWidth {
                delay_ms: delay,
                duration_ms: 800,
            })
            .tooltip(count_tooltip(encoding, entry)),
        );
        if encoding.value_labels {
            scene.push(
                Element::new(
                    "value-label",
                    text(
                        x.map(entry.metric()) + 5.0,
                        y.center_at(i) + 4.0,
                        entry.count().unwrap_or(0).to_string(),
                        Anchor::Start,
                    ),
                )
                .animate(Animation::FadeIn {
                    delay_ms: delay + 400,
                    duration_ms: 800,
                }),
            );
        }
    }
    scene
}

fn vertical_bars(entries: &[AggregateEntry], encoding: &Encoding, viewport: Viewport) -> Scene {
    let (width, height) = inner_size(encoding, viewport);
    let mut scene = Scene::new(
        encoding.title,
        viewport,
        (encoding.margin.left, encoding.margin.top),
    );
    let x = BandScale::new(entries.iter().map(|e| e.label()).collect(), (0.0, width), 0.3);
    let y = LinearScale::new((0.0, max_metric(entries)), (height, 0.0)).nice(10);
    let n = entries.len();

    scene.push(axis_line(0.0, height, width, height));
    for (i, entry) in entries.iter().enumerate() {
        scene.push(Element::new(
            "axis",
            text(x.center_at(i), height + 18.0, entry.label(), Anchor::Middle),
        ));
    }
    left_linear_axis(&mut scene, &y, height);
    axis_labels(&mut scene, encoding, width, height);

    for (i, entry) in entries.iter().enumerate() {
        let top = y.map(entry.metric());
        scene.push(
            Element::new(
                "bar",
                Shape::Rect {
                    x: x.position_at(i),
                    y: top,
                    width: x.bandwidth(),
                    height: height - top,
                    fill: fill_for(encoding.color, i, n, entry),
                },
            )
            .animate(Animation::GrowHeight {
                baseline: height,
                delay_ms: i as u32 * 50,
                duration_ms: 800,
            })
            .tooltip(count_tooltip(encoding, entry)),
        );
    }
    scene
}

fn point_line(entries: &[AggregateEntry], encoding: &Encoding, viewport: Viewport) -> Scene {
    let (width, height) = inner_size(encoding, viewport);
    let mut scene = Scene::new(
        encoding.title,
        viewport,
        (encoding.margin.left, encoding.margin.top),
    );
    let x = BandScale::new(entries.iter().map(|e| e.label()).collect(), (0.0, width), 0.4);
    let y = LinearScale::new((0.0, max_metric(entries)), (height, 0.0)).nice(10);
    let n = entries.len();
    let line_color = match encoding.color {
        ColorStrategy::MagnitudeRamp(stops) => stops.last().map_or("#12b886", |s| s.1),
        ColorStrategy::Fixed(c) => c,
        _ => "#12b886",
    };

    scene.push(axis_line(0.0, height, width, height));
    for (i, entry) in entries.iter().enumerate() {
        scene.push(Element::new(
            "axis",
            text(x.center_at(i), height + 18.0, entry.label(), Anchor::Middle),
        ));
    }
    left_linear_axis(&mut scene, &y, height);
    axis_labels(&mut scene, encoding, width, height);
    scene.push(Element::new(
        "title",
        Shape::Text {
            x: width / 2.0,
            y: -encoding.margin.top / 2.0,
            text: encoding.title.to_string(),
            anchor: Anchor::Middle,
            size: 16.0,
            bold: true,
            vertical: false,
        },
    ));

    let points: Vec<(f64, f64)> = entries
        .iter()
        .enumerate()
        .map(|(i, e)| (x.center_at(i), y.map(e.metric())))
        .collect();

    let gradient_id = format!("{}-area", encoding.kind.short_name());
    scene.gradients.push(Gradient {
        id: gradient_id.clone(),
        color: line_color.to_string(),
        top_opacity: 0.8,
        bottom_opacity: 0.0,
    });
    scene.push(
        Element::new(
            "area",
            Shape::Path {
                d: monotone_area(&points, height),
                fill: Some(format!("url(#{})", gradient_id)),
                stroke: None,
                stroke_width: 0.0,
                opacity: 0.2,
            },
        )
        .animate(Animation::FadeIn {
            delay_ms: 800,
            duration_ms: 800,
        }),
    );

    let mean_key = entries
        .iter()
        .filter_map(AggregateEntry::numeric_key)
        .sum::<f64>()
        / n as f64;
    let reference_y = y.map(mean_key * REFERENCE_SCALE);
    scene.push(
        Element::new(
            "reference",
            Shape::Line {
                x1: 0.0,
                y1: reference_y,
                x2: width,
                y2: reference_y,
                stroke: "#666666".to_string(),
                dash: Some("3,3".to_string()),
                opacity: 0.5,
            },
        )
        .animate(Animation::FadeIn {
            delay_ms: 800,
            duration_ms: 500,
        }),
    );

    scene.push(
        Element::new(
            "line",
            Shape::Path {
                d: monotone_path(&points),
                fill: None,
                stroke: Some(line_color.to_string()),
                stroke_width: 2.0,
                opacity: 1.0,
            },
        )
        .animate(Animation::StrokeReveal {
            length: monotone_length(&points),
            duration_ms: 1500,
        }),
    );

    for (i, (entry, (cx, cy))) in entries.iter().zip(&points).enumerate() {
        scene.push(
            Element::new(
                "dot",
                Shape::Circle {
                    cx: *cx,
                    cy: *cy,
                    r: 5.0,
                    fill: fill_for(encoding.color, i, n, entry),
                },
            )
            .animate(Animation::FadeIn {
                delay_ms: i as u32 * 100,
                duration_ms: 800,
            })
            .tooltip(count_tooltip(encoding, entry)),
        );
    }
    scene
}

fn arcs(
    entries: &[AggregateEntry],
    encoding: &Encoding,
    viewport: Viewport,
    inner_ratio: f64,
) -> Scene {
    let values: Vec<f64> = entries.iter().map(AggregateEntry::metric).collect();
    let total: f64 = values.iter().sum();
    if total <= 0.0 {
        return Scene::empty(encoding.title, viewport);
    }
    let mut scene = Scene::new(
        encoding.title,
        viewport,
        (viewport.width / 2.0, viewport.height / 2.0),
    );
    let radius = viewport.width.min(viewport.height) / 2.0 * 0.8;
    let inner = radius * inner_ratio.clamp(0.0, 0.95);
    let n = entries.len();

    for (i, (entry, (start, end))) in entries.iter().zip(pie_angles(&values)).enumerate() {
        let share = entry.metric() / total * 100.0;
        scene.push(
            Element::new(
                "arc",
                Shape::Path {
                    d: arc_path(start, end, inner, radius),
                    fill: Some(fill_for(encoding.color, i, n, entry)),
                    stroke: Some("white".to_string()),
                    stroke_width: 2.0,
                    opacity: 0.8,
                },
            )
            .animate(Animation::Sweep {
                from: arc_path(0.0, 0.0, inner, radius),
                delay_ms: 0,
                duration_ms: 800,
            })
            .tooltip(Tooltip::new([
                entry.label(),
                format!("Count: {}", entry.count().unwrap_or(0)),
                format!("{:.1}% of total", share),
            ])),
        );
    }

    if let Some(label) = encoding.center_label {
        scene.push(
            Element::new(
                "center-label",
                Shape::Text {
                    x: 0.0,
                    y: 6.0,
                    text: label.to_string(),
                    anchor: Anchor::Middle,
                    size: 19.0,
                    bold: true,
                    vertical: false,
                },
            )
            .animate(Animation::FadeIn {
                delay_ms: 800,
                duration_ms: 500,
            }),
        );
    }

    // Entries are value-descending, so the legend is the first N.
    const SWATCH: f64 = 12.0;
    const SPACING: f64 = 4.0;
    let shown = encoding.legend_top_n.min(n);
    let row = SWATCH + SPACING + 5.0;
    let offset = row * shown as f64 / 2.0;
    for (i, entry) in entries.iter().take(shown).enumerate() {
        let lx = radius + 20.0;
        let ly = i as f64 * row - offset;
        let fade = Animation::FadeIn {
            delay_ms: 800 + i as u32 * 100,
            duration_ms: 500,
        };
        scene.push(
            Element::new(
                "legend",
                Shape::Rect {
                    x: lx,
                    y: ly,
                    width: SWATCH,
                    height: SWATCH,
                    fill: fill_for(encoding.color, i, n, entry),
                },
            )
            .animate(fade.clone()),
        );
        scene.push(
            Element::new(
                "legend",
                Shape::Text {
                    x: lx + SWATCH + SPACING,
                    y: ly + SWATCH - SPACING / 2.0,
                    text: truncate_label(&entry.label(), encoding.legend_max_chars),
                    anchor: Anchor::Start,
                    size: 10.0,
                    bold: false,
                    vertical: false,
                },
            )
            .animate(fade),
        );
    }
    scene
}

fn year_value(t: &YearTrend, series: usize) -> f64 {
    match series {
        0 => t.avg_intensity,
        1 => t.avg_likelihood,
        _ => t.avg_relevance,
    }
}

fn multi_line(entries: &[AggregateEntry], encoding: &Encoding, viewport: Viewport) -> Scene {
    let trends: Vec<&YearTrend> = entries
        .iter()
        .filter_map(|e| match e {
            AggregateEntry::YearTrend(t) => Some(t),
            _ => None,
        })
        .collect();
    if trends.is_empty() {
        return Scene::empty(encoding.title, viewport);
    }

    let (width, height) = inner_size(encoding, viewport);
    let mut scene = Scene::new(
        encoding.title,
        viewport,
        (encoding.margin.left, encoding.margin.top),
    );
    let first_year = trends[0].year as f64;
    let last_year = trends[trends.len() - 1].year as f64;
    let x = LinearScale::new((first_year, last_year), (0.0, width));
    let peak = entries.iter().map(AggregateEntry::metric).fold(0.0, f64::max);
    let y = LinearScale::new((0.0, (peak * 1.1).max(1.0)), (height, 0.0)).nice(10);

    scene.push(axis_line(0.0, height, width, height));
    for t in &trends {
        let px = x.map(t.year as f64);
        scene.push(axis_line(px, height, px, height + 6.0));
        scene.push(Element::new(
            "axis",
            text(px, height + 18.0, t.year.to_string(), Anchor::Middle),
        ));
    }
    left_linear_axis(&mut scene, &y, height);
    axis_labels(&mut scene, encoding, width, height);

    for (s, series) in YEAR_SERIES.iter().enumerate() {
        let points: Vec<(f64, f64)> = trends
            .iter()
            .map(|t| (x.map(t.year as f64), y.map(year_value(t, s))))
            .collect();
        scene.push(
            Element::new(
                "line",
                Shape::Path {
                    d: monotone_path(&points),
                    fill: None,
                    stroke: Some(series.color.to_string()),
                    stroke_width: 2.0,
                    opacity: 1.0,
                },
            )
            .animate(Animation::StrokeReveal {
                length: monotone_length(&points),
                duration_ms: 1500,
            }),
        );
    }

    for (s, series) in YEAR_SERIES.iter().enumerate() {
        for (i, t) in trends.iter().enumerate() {
            scene.push(
                Element::new(
                    "dot",
                    Shape::Circle {
                        cx: x.map(t.year as f64),
                        cy: y.map(year_value(t, s)),
                        r: 4.0,
                        fill: series.color.to_string(),
                    },
                )
                .animate(Animation::FadeIn {
                    delay_ms: 1500 + i as u32 * 50,
                    duration_ms: 300,
                })
                .tooltip(Tooltip::new([
                    format!("Year: {}", t.year),
                    format!("Intensity: {:.1}", t.avg_intensity),
                    format!("Likelihood: {:.1}", t.avg_likelihood),
                    format!("Relevance: {:.1}", t.avg_relevance),
                ])),
            );
        }
    }

    for (i, series) in YEAR_SERIES.iter().enumerate() {
        let ly = i as f64 * 20.0;
        scene.push(Element::new(
            "legend",
            Shape::Rect {
                x: width + 10.0,
                y: ly,
                width: 10.0,
                height: 10.0,
                fill: series.color.to_string(),
            },
        ));
        scene.push(Element::new(
            "legend",
            text(width + 25.0, ly + 9.0, series.name, Anchor::Start),
        ));
    }
    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    fn topics() -> Vec<AggregateEntry> {
        vec![
            AggregateEntry::category("gas", 1),
            AggregateEntry::category("oil", 5),
            AggregateEntry::category("gdp", 3),
        ]
    }

    fn bar_labels(scene: &Scene) -> Vec<String> {
        scene
            .elements_of("bar")
            .map(|e| e.tooltip.as_ref().unwrap().lines[0].clone())
            .collect()
    }

    #[test]
    fn test_empty_renders_placeholder() {
        for kind in AggregateKind::ALL {
            let scene = render_kind(kind, &[], Viewport::default());
            assert!(scene.is_empty());
            assert!(!scene.is_loading());
            assert_eq!(scene.elements_of("bar").count(), 0);
        }
        assert!(Scene::loading("Topics", Viewport::default()).is_loading());
    }

    #[test]
    fn test_topic_bars_sorted_descending() {
        let scene = render_kind(AggregateKind::Topic, &topics(), Viewport::default());
        assert_eq!(bar_labels(&scene), vec!["oil", "gdp", "gas"]);
        assert_eq!(scene.elements_of("value-label").count(), 3);

        let widths: Vec<f64> = scene
            .elements_of("bar")
            .map(|e| match e.shape {
                Shape::Rect { width, .. } => width,
                _ => panic!("bar is not a rect"),
            })
            .collect();
        assert!(widths[0] > widths[1] && widths[1] > widths[2]);
        assert!(scene
            .elements_of("bar")
            .all(|e| matches!(e.animation, Animation::GrowWidth { .. })));
    }

    #[test]
    fn test_rank_ramp_darkens_top_rank() {
        let scene = render_kind(AggregateKind::Topic, &topics(), Viewport::default());
        let fills: Vec<String> = scene
            .elements_of("bar")
            .map(|e| match &e.shape {
                Shape::Rect { fill, .. } => fill.clone(),
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(fills[0], crate::color::SCHEME_BLUES[8]);
        assert_ne!(fills[0], fills[2]);
    }

    #[test]
    fn test_intensity_bars_ascending() {
        let entries = vec![
            AggregateEntry::bucket(7.0, 1),
            AggregateEntry::bucket(3.0, 4),
            AggregateEntry::bucket(5.0, 2),
        ];
        let scene = render_kind(AggregateKind::Intensity, &entries, Viewport::default());
        assert_eq!(
            bar_labels(&scene),
            vec!["Intensity: 3", "Intensity: 5", "Intensity: 7"]
        );
        assert!(scene
            .elements_of("bar")
            .all(|e| matches!(e.animation, Animation::GrowHeight { .. })));
    }

    #[test]
    fn test_likelihood_point_line() {
        let entries = vec![
            AggregateEntry::bucket(2.0, 15),
            AggregateEntry::bucket(1.0, 7),
            AggregateEntry::bucket(3.0, 25),
        ];
        let scene = render_kind(AggregateKind::Likelihood, &entries, Viewport::default());
        assert_eq!(scene.elements_of("dot").count(), 3);
        assert_eq!(scene.elements_of("line").count(), 1);
        assert_eq!(scene.elements_of("area").count(), 1);
        let reference = scene.elements_of("reference").next().unwrap();
        assert!(matches!(&reference.shape, Shape::Line { dash: Some(d), .. } if d == "3,3"));
        assert_eq!(scene.gradients.len(), 1);
    }

    #[test]
    fn test_donut_tooltip_has_share() {
        let entries = vec![
            AggregateEntry::category("Asia", 30),
            AggregateEntry::category("World", 10),
        ];
        let scene = render_kind(AggregateKind::Region, &entries, Viewport::default());
        let arcs: Vec<&Element> = scene.elements_of("arc").collect();
        assert_eq!(arcs.len(), 2);
        assert_eq!(
            arcs[0].tooltip.as_ref().unwrap().lines,
            vec!["Asia", "Count: 30", "75.0% of total"]
        );
        assert!(scene.elements_of("center-label").next().is_some());
        assert!(matches!(arcs[0].animation, Animation::Sweep { .. }));
    }

    #[test]
    fn test_pie_legend_top_n_and_truncation() {
        let entries: Vec<AggregateEntry> = (0..8)
            .map(|i| AggregateEntry::category(format!("Financial services {}", i), 10 + i))
            .collect();
        let scene = render_kind(AggregateKind::Sector, &entries, Viewport::default());
        let labels: Vec<String> = scene
            .elements_of("legend")
            .filter_map(|e| match &e.shape {
                Shape::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(labels.len(), 6);
        assert_eq!(labels[0], "Financial servi...");
        assert!(scene.elements_of("center-label").next().is_none());
    }

    #[test]
    fn test_all_zero_pie_is_empty() {
        let entries = vec![AggregateEntry::category("Energy", 0)];
        assert!(render_kind(AggregateKind::Sector, &entries, Viewport::default()).is_empty());
    }

    #[test]
    fn test_year_trend_three_series() {
        let entries: Vec<AggregateEntry> = [2018, 2016, 2017]
            .into_iter()
            .map(|year| {
                AggregateEntry::YearTrend(YearTrend {
                    year,
                    avg_intensity: 4.0,
                    avg_likelihood: 2.0,
                    avg_relevance: 3.0,
                })
            })
            .collect();
        let scene = render_kind(AggregateKind::YearTrend, &entries, Viewport::default());
        assert_eq!(scene.elements_of("line").count(), 3);
        assert_eq!(scene.elements_of("dot").count(), 9);
        let first_dot = scene.elements_of("dot").next().unwrap();
        assert_eq!(first_dot.tooltip.as_ref().unwrap().lines[0], "Year: 2016");
        assert_eq!(scene.elements_of("legend").count(), 6);
    }

    #[test]
    fn test_single_year_does_not_produce_nan() {
        let entries = vec![AggregateEntry::YearTrend(YearTrend {
            year: 2020,
            avg_intensity: 1.0,
            avg_likelihood: 1.0,
            avg_relevance: 1.0,
        })];
        let scene = render_kind(AggregateKind::YearTrend, &entries, Viewport::default());
        for e in scene.elements_of("dot") {
            if let Shape::Circle { cx, cy, .. } = e.shape {
                assert!(cx.is_finite() && cy.is_finite());
            }
        }
    }

    #[test]
    fn test_zero_counts_sit_on_the_baseline() {
        let topics = vec![
            AggregateEntry::category("oil", 0),
            AggregateEntry::category("gas", 0),
        ];
        let scene = render_kind(AggregateKind::Topic, &topics, Viewport::default());
        for bar in scene.elements_of("bar") {
            if let Shape::Rect { width, .. } = bar.shape {
                assert_eq!(width, 0.0);
            }
        }

        let buckets = vec![AggregateEntry::bucket(3.0, 0)];
        let scene = render_kind(AggregateKind::Intensity, &buckets, Viewport::default());
        let bar = scene.elements_of("bar").next().unwrap();
        if let Shape::Rect { height, .. } = bar.shape {
            assert_eq!(height, 0.0);
        }

        let scene = render_kind(AggregateKind::Likelihood, &[AggregateEntry::bucket(2.0, 0)], Viewport::default());
        let (_, inner_height) = inner_size(&encoding_for(AggregateKind::Likelihood), Viewport::default());
        for dot in scene.elements_of("dot") {
            if let Shape::Circle { cy, .. } = dot.shape {
                assert_eq!(cy, inner_height);
            }
        }
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Energy", 15), "Energy");
        assert_eq!(truncate_label("Northern America!", 15), "Northern Americ...");
    }
}
