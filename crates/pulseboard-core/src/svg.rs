//! SVG serialization of a [`Scene`].
//!
//! Entrance animations are expressed as SMIL `<animate>` elements so the
//! output animates in any browser without script. Tooltips become
//! `<title>` children, which browsers show on hover.

use std::fmt::Write;

use crate::chart::{Anchor, Animation, Element, Scene, Shape};

const STYLE: &str = ".bar:hover,.dot:hover{opacity:.8}\
.arc{transition:transform .2s}.arc:hover{transform:scale(1.1)}\
.placeholder{fill:#868e96}";

/// Escape text for use in SVG content and attribute values.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn anchor_attr(anchor: Anchor) -> &'static str {
    match anchor {
        Anchor::Start => "start",
        Anchor::Middle => "middle",
        Anchor::End => "end",
    }
}

fn secs(ms: u32) -> String {
    format!("{}s", ms as f64 / 1000.0)
}

/// `<animate>` children for an element's entrance animation.
fn animation_markup(element: &Element) -> String {
    let anim = |attr: &str, from: &str, to: &str, delay: u32, dur: u32| {
        format!(
            r#"<animate attributeName="{}" from="{}" to="{}" begin="{}" dur="{}" fill="freeze"/>"#,
            attr,
            from,
            to,
            secs(delay),
            secs(dur)
        )
    };
    match (&element.animation, &element.shape) {
        (Animation::None, _) => String::new(),
        (Animation::GrowWidth { delay_ms, duration_ms }, Shape::Rect { width, .. }) => {
            anim("width", "0", &format!("{:.2}", width), *delay_ms, *duration_ms)
        }
        (
            Animation::GrowHeight {
                baseline,
                delay_ms,
                duration_ms,
            },
            Shape::Rect { y, height, .. },
        ) => {
            let mut s = anim(
                "y",
                &format!("{:.2}", baseline),
                &format!("{:.2}", y),
                *delay_ms,
                *duration_ms,
            );
            s.push_str(&anim(
                "height",
                "0",
                &format!("{:.2}", height),
                *delay_ms,
                *duration_ms,
            ));
            s
        }
        (
            Animation::Sweep {
                from,
                delay_ms,
                duration_ms,
            },
            Shape::Path { d, .. },
        ) => anim("d", from, d, *delay_ms, *duration_ms),
        (Animation::StrokeReveal { length, duration_ms }, _) => anim(
            "stroke-dashoffset",
            &format!("{:.2}", length),
            "0",
            0,
            *duration_ms,
        ),
        (Animation::FadeIn { delay_ms, duration_ms }, _) => {
            anim("opacity", "0", "1", *delay_ms, *duration_ms)
        }
        // Animation does not apply to this shape; draw it in place.
        _ => String::new(),
    }
}

/// Presentation attributes that must hold the pre-animation state when
/// the element first appears. Geometry starting states are written by
/// [`write_element`] itself.
fn initial_attrs(element: &Element) -> String {
    match &element.animation {
        Animation::StrokeReveal { length, .. } => format!(
            r#" stroke-dasharray="{:.2} {:.2}" stroke-dashoffset="{:.2}""#,
            length, length, length
        ),
        Animation::FadeIn { .. } => r#" opacity="0""#.to_string(),
        _ => String::new(),
    }
}

fn write_element(out: &mut String, element: &Element) -> std::fmt::Result {
    let class = element.class;
    let init = initial_attrs(element);
    let mut children = String::new();
    if let Some(tooltip) = &element.tooltip {
        let text: Vec<String> = tooltip.lines.iter().map(|l| escape(l)).collect();
        write!(children, "<title>{}</title>", text.join("\n"))?;
    }
    children.push_str(&animation_markup(element));

    match &element.shape {
        Shape::Rect {
            x,
            y,
            width,
            height,
            fill,
        } => {
            // Growing bars are written in their collapsed state; the
            // <animate> children carry them to the final geometry.
            let (y, width, height) = match element.animation {
                Animation::GrowWidth { .. } => (*y, 0.0, *height),
                Animation::GrowHeight { baseline, .. } => (baseline, *width, 0.0),
                _ => (*y, *width, *height),
            };
            write!(
                out,
                r#"<rect class="{}" x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"{}>{}</rect>"#,
                class,
                x,
                y,
                width.max(0.0),
                height.max(0.0),
                escape(fill),
                init,
                children
            )
        }
        Shape::Path {
            d,
            fill,
            stroke,
            stroke_width,
            opacity,
        } => {
            let fill = fill.as_deref().unwrap_or("none");
            let mut attrs = format!(r#" fill="{}""#, escape(fill));
            if let Some(stroke) = stroke {
                write!(
                    attrs,
                    r#" stroke="{}" stroke-width="{}""#,
                    escape(stroke),
                    stroke_width
                )?;
            }
            if *opacity < 1.0 {
                write!(attrs, r#" fill-opacity="{}""#, opacity)?;
            }
            let d = match &element.animation {
                Animation::Sweep { from, .. } => from,
                _ => d,
            };
            write!(
                out,
                r#"<path class="{}" d="{}"{}{}>{}</path>"#,
                class, d, attrs, init, children
            )
        }
        Shape::Circle { cx, cy, r, fill } => write!(
            out,
            r#"<circle class="{}" cx="{:.2}" cy="{:.2}" r="{}" fill="{}"{}>{}</circle>"#,
            class,
            cx,
            cy,
            r,
            escape(fill),
            init,
            children
        ),
        Shape::Line {
            x1,
            y1,
            x2,
            y2,
            stroke,
            dash,
            opacity,
        } => {
            let mut attrs = String::new();
            if let Some(dash) = dash {
                write!(attrs, r#" stroke-dasharray="{}""#, escape(dash))?;
            }
            if *opacity < 1.0 {
                write!(attrs, r#" stroke-opacity="{}""#, opacity)?;
            }
            write!(
                out,
                r#"<line class="{}" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="{}"{}{}>{}</line>"#,
                class,
                x1,
                y1,
                x2,
                y2,
                escape(stroke),
                attrs,
                init,
                children
            )
        }
        Shape::Text {
            x,
            y,
            text,
            anchor,
            size,
            bold,
            vertical,
        } => {
            let mut attrs = format!(
                r#" text-anchor="{}" font-size="{}""#,
                anchor_attr(*anchor),
                size
            );
            if *bold {
                attrs.push_str(r#" font-weight="bold""#);
            }
            if *vertical {
                attrs.push_str(r#" transform="rotate(-90)""#);
            }
            write!(
                out,
                r#"<text class="{}" x="{:.2}" y="{:.2}" fill="currentColor"{}{}>{}{}</text>"#,
                class,
                x,
                y,
                attrs,
                init,
                escape(text),
                children
            )
        }
    }
}

/// Serialize a scene as a standalone SVG document.
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_svg(&mut out, scene);
    out
}

fn write_svg(out: &mut String, scene: &Scene) -> std::fmt::Result {
    let vp = scene.viewport;
    write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}" font-family="sans-serif" role="img" aria-label="{}">"#,
        vp.width,
        vp.height,
        vp.width,
        vp.height,
        escape(&scene.title)
    )?;
    write!(out, "<style>{}</style>", STYLE)?;

    if !scene.gradients.is_empty() {
        out.push_str("<defs>");
        for g in &scene.gradients {
            write!(
                out,
                r#"<linearGradient id="{}" x1="0" y1="0" x2="0" y2="1"><stop offset="0%" stop-color="{}" stop-opacity="{}"/><stop offset="100%" stop-color="{}" stop-opacity="{}"/></linearGradient>"#,
                escape(&g.id),
                escape(&g.color),
                g.top_opacity,
                escape(&g.color),
                g.bottom_opacity
            )?;
        }
        out.push_str("</defs>");
    }

    write!(
        out,
        r#"<g transform="translate({:.2},{:.2})">"#,
        scene.origin.0, scene.origin.1
    )?;
    for element in &scene.elements {
        write_element(out, element)?;
    }
    out.push_str("</g></svg>");
    Ok(())
}
