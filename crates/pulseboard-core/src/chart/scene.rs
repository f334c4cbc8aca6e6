//! The drawable scene a renderer produces.
//!
//! A [`Scene`] is a flat list of [`Element`]s positioned relative to the
//! scene origin. Each element carries its final geometry, an optional
//! entrance [`Animation`] and an optional hover [`Tooltip`]. Scenes are
//! plain data: serializing to SVG lives in [`crate::svg`], interaction
//! state lives in [`crate::surface`].

/// Output size for a chart, in pixels. `height` is the caller's height
/// hint; `width` stands in for the container width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 300.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        fill: String,
    },
    Path {
        d: String,
        fill: Option<String>,
        stroke: Option<String>,
        stroke_width: f64,
        opacity: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        stroke: String,
        dash: Option<String>,
        opacity: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        anchor: Anchor,
        size: f64,
        bold: bool,
        /// Rotate -90° about the text position (vertical axis labels).
        vertical: bool,
    },
}

/// How an element enters the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    None,
    /// Bars grow from zero width, anchored at their left edge.
    GrowWidth { delay_ms: u32, duration_ms: u32 },
    /// Bars grow from zero height, anchored at the `baseline` y coordinate.
    GrowHeight {
        baseline: f64,
        delay_ms: u32,
        duration_ms: u32,
    },
    /// Arc sweeps open from the zero-angle wedge described by `from`.
    Sweep {
        from: String,
        delay_ms: u32,
        duration_ms: u32,
    },
    /// Stroke drawn progressively over a path of the given length.
    StrokeReveal { length: f64, duration_ms: u32 },
    FadeIn { delay_ms: u32, duration_ms: u32 },
}

/// Hover content for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub lines: Vec<String>,
}

impl Tooltip {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// CSS class, e.g. `bar`, `arc`, `dot`, `axis`, `legend`.
    pub class: &'static str,
    pub shape: Shape,
    pub animation: Animation,
    pub tooltip: Option<Tooltip>,
}

impl Element {
    pub fn new(class: &'static str, shape: Shape) -> Self {
        Self {
            class,
            shape,
            animation: Animation::None,
            tooltip: None,
        }
    }

    pub fn animate(mut self, animation: Animation) -> Self {
        self.animation = animation;
        self
    }

    pub fn tooltip(mut self, tooltip: Tooltip) -> Self {
        self.tooltip = Some(tooltip);
        self
    }
}

/// Vertical fill gradient referenced by `url(#id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Gradient {
    pub id: String,
    pub color: String,
    pub top_opacity: f64,
    pub bottom_opacity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub title: String,
    pub viewport: Viewport,
    /// Translation applied to every element.
    pub origin: (f64, f64),
    pub gradients: Vec<Gradient>,
    pub elements: Vec<Element>,
    /// Set for the empty-data and loading states; such scenes have no
    /// data geometry.
    pub placeholder: Option<String>,
}

pub const NO_DATA_MESSAGE: &str = "No data for current filters";
pub const LOADING_MESSAGE: &str = "Loading...";

impl Scene {
    pub fn new(title: impl Into<String>, viewport: Viewport, origin: (f64, f64)) -> Self {
        Self {
            title: title.into(),
            viewport,
            origin,
            gradients: Vec::new(),
            elements: Vec::new(),
            placeholder: None,
        }
    }

    fn placeholder(title: &str, viewport: Viewport, message: &str) -> Self {
        let mut scene = Scene::new(title, viewport, (0.0, 0.0));
        scene.placeholder = Some(message.to_string());
        scene.elements.push(Element::new(
            "placeholder",
            Shape::Text {
                x: viewport.width / 2.0,
                y: viewport.height / 2.0,
                text: message.to_string(),
                anchor: Anchor::Middle,
                size: 14.0,
                bold: false,
                vertical: false,
            },
        ));
        scene
    }

    /// The zero-length aggregate state.
    pub fn empty(title: &str, viewport: Viewport) -> Self {
        Scene::placeholder(title, viewport, NO_DATA_MESSAGE)
    }

    /// The state while aggregates are still being fetched.
    pub fn loading(title: &str, viewport: Viewport) -> Self {
        Scene::placeholder(title, viewport, LOADING_MESSAGE)
    }

    pub fn is_empty(&self) -> bool {
        self.placeholder.as_deref() == Some(NO_DATA_MESSAGE)
    }

    pub fn is_loading(&self) -> bool {
        self.placeholder.as_deref() == Some(LOADING_MESSAGE)
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    /// Elements of the given class, in drawing order.
    pub fn elements_of<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements.iter().filter(move |e| e.class == class)
    }
}
