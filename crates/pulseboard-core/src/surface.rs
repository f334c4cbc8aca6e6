//! Drawing surfaces and the shared tooltip overlay.
//!
//! Every mounted chart shares one [`Overlay`], the process-wide layer that
//! floating tooltips are drawn into. A [`ChartSurface`] owns exactly one
//! slot in it. Dropping the surface releases the slot, including while a
//! tooltip is showing, so unmounting a chart mid-hover never leaves a
//! stray tooltip behind.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use uuid::Uuid;

use crate::chart::Scene;
use crate::svg::to_svg;

/// The tooltip a surface currently shows in the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipSlot {
    pub chart: String,
    pub lines: Vec<String>,
    pub visible: bool,
}

/// Shared tooltip layer. Cloning yields another handle to the same layer.
#[derive(Debug, Clone, Default)]
pub struct Overlay {
    slots: Arc<Mutex<HashMap<Uuid, TooltipSlot>>>,
}

impl Overlay {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<Uuid, TooltipSlot>> {
        self.slots.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of allocated slots (one per mounted surface).
    pub fn len(&self) -> usize {
        self.slots().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots().is_empty()
    }

    /// Tooltips currently showing, as `(chart title, lines)`.
    pub fn visible(&self) -> Vec<(String, Vec<String>)> {
        let mut shown: Vec<(String, Vec<String>)> = self
            .slots()
            .values()
            .filter(|s| s.visible)
            .map(|s| (s.chart.clone(), s.lines.clone()))
            .collect();
        shown.sort();
        shown
    }
}

/// One chart's drawing surface.
#[derive(Debug)]
pub struct ChartSurface {
    id: Uuid,
    overlay: Overlay,
    scene: Option<Scene>,
    hovered: Option<usize>,
}

impl ChartSurface {
    /// Mount a surface and allocate its overlay slot.
    pub fn mount(overlay: &Overlay) -> Self {
        let id = Uuid::new_v4();
        overlay.slots().insert(
            id,
            TooltipSlot {
                chart: String::new(),
                lines: Vec::new(),
                visible: false,
            },
        );
        Self {
            id,
            overlay: overlay.clone(),
            scene: None,
            hovered: None,
        }
    }

    /// Replace everything on the surface with `scene`.
    ///
    /// Any showing tooltip refers to the old geometry and is hidden.
    pub fn draw(&mut self, scene: Scene) {
        self.pointer_leave();
        self.scene = Some(scene);
    }

    pub fn scene(&self) -> Option<&Scene> {
        self.scene.as_ref()
    }

    /// Pointer entered the element at `index`. Returns whether a tooltip
    /// is now showing.
    pub fn pointer_enter(&mut self, index: usize) -> bool {
        let Some(scene) = &self.scene else {
            return false;
        };
        let Some(tooltip) = scene.elements.get(index).and_then(|e| e.tooltip.as_ref()) else {
            self.pointer_leave();
            return false;
        };
        if let Some(slot) = self.overlay.slots().get_mut(&self.id) {
            slot.chart = scene.title.clone();
            slot.lines = tooltip.lines.clone();
            slot.visible = true;
        }
        self.hovered = Some(index);
        true
    }

    pub fn pointer_leave(&mut self) {
        self.hovered = None;
        if let Some(slot) = self.overlay.slots().get_mut(&self.id) {
            slot.visible = false;
            slot.lines.clear();
        }
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// The current scene as SVG; empty before the first draw.
    pub fn svg(&self) -> String {
        self.scene.as_ref().map(to_svg).unwrap_or_default()
    }
}

impl Drop for ChartSurface {
    fn drop(&mut self) {
        self.overlay.slots().remove(&self.id);
    }
}
