//! Viewer interaction as a pure state machine.
//!
//! Pointer and key events go in, a new [`ViewerState`] and at most one
//! [`ViewerOutput`] come out. The hand tool (or a middle-button drag) pans;
//! the eyedropper samples on release; scroll zooms around the cursor; Home
//! resets the view.

use glam::Vec2;
use serde::{Deserialize, Serialize};

// ── Constants ───────────────────────────────────────────────────────────────

const ZOOM_MIN: f32 = 0.1;
const ZOOM_MAX: f32 = 20.0;
/// Multiplicative zoom per scroll-wheel line.
const ZOOM_FACTOR: f32 = 1.1;

// ── Events ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    /// Switch the primary button to the eyedropper.
    Eyedropper,
    /// Switch the primary button to the hand tool.
    Hand,
    /// Abort the current drag.
    Escape,
    /// Reset zoom and pan.
    Home,
}

/// The tool bound to the primary button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Hand,
    Eyedropper,
}

/// Discrete input events, positions in view (screen) space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ViewerEvent {
    Press { button: PointerButton, position: Vec2 },
    Move { position: Vec2 },
    Release { button: PointerButton, position: Vec2 },
    /// Positive `lines` zooms in.
    Scroll { lines: f32, position: Vec2 },
    Key { key: Key },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum ViewerMode {
    #[default]
    Idle,
    /// Dragging the view; `anchor` is where the drag started and `origin`
    /// the offset at that moment.
    Panning {
        button: PointerButton,
        anchor: Vec2,
        origin: Vec2,
    },
    /// Eyedropper held down; the pick happens on release.
    Sampling,
}

/// What a transition produced for the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ViewerOutput {
    /// The view offset or zoom changed.
    ViewChanged { offset: Vec2, zoom: f32 },
    /// Cursor is over this image pixel (may be outside the image).
    Hover { x: i64, y: i64 },
    /// The eyedropper picked this image pixel (may be outside the image).
    Sample { x: i64, y: i64 },
}

// ── State machine ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewerState {
    pub mode: ViewerMode,
    pub tool: Tool,
    /// Screen position of image pixel (0, 0).
    pub offset: Vec2,
    pub zoom: f32,
}

impl Default for ViewerState {
    fn default() -> Self {
        Self {
            mode: ViewerMode::Idle,
            tool: Tool::Hand,
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewerState {
    /// Map a view position to integer image coordinates.
    pub fn to_image_coords(&self, position: Vec2) -> (i64, i64) {
        let p = (position - self.offset) / self.zoom;
        (p.x.floor() as i64, p.y.floor() as i64)
    }

    fn view_changed(&self) -> Option<ViewerOutput> {
        Some(ViewerOutput::ViewChanged {
            offset: self.offset,
            zoom: self.zoom,
        })
    }

    fn hover(&self, position: Vec2) -> Option<ViewerOutput> {
        let (x, y) = self.to_image_coords(position);
        Some(ViewerOutput::Hover { x, y })
    }

    /// Apply one event.
    pub fn handle(self, event: ViewerEvent) -> (Self, Option<ViewerOutput>) {
        let mut next = self;
        let output = match (self.mode, event) {
            // Idle
            (ViewerMode::Idle, ViewerEvent::Press { button, position }) => {
                match (button, self.tool) {
                    (PointerButton::Middle, _) | (PointerButton::Primary, Tool::Hand) => {
                        next.mode = ViewerMode::Panning {
                            button,
                            anchor: position,
                            origin: self.offset,
                        };
                        None
                    }
                    (PointerButton::Primary, Tool::Eyedropper) => {
                        next.mode = ViewerMode::Sampling;
                        self.hover(position)
                    }
                    (PointerButton::Secondary, _) => None,
                }
            }
            (ViewerMode::Idle, ViewerEvent::Move { position }) => self.hover(position),

            // Panning
            (ViewerMode::Panning { anchor, origin, .. }, ViewerEvent::Move { position }) => {
                next.offset = origin + (position - anchor);
                next.view_changed()
            }
            (
                ViewerMode::Panning {
                    button,
                    anchor,
                    origin,
                },
                ViewerEvent::Release {
                    button: released,
                    position,
                },
            ) if released == button => {
                next.offset = origin + (position - anchor);
                next.mode = ViewerMode::Idle;
                (next.offset != self.offset).then(|| next.view_changed()).flatten()
            }
            (ViewerMode::Panning { origin, .. }, ViewerEvent::Key { key: Key::Escape }) => {
                next.offset = origin;
                next.mode = ViewerMode::Idle;
                next.view_changed()
            }

            // Sampling
            (ViewerMode::Sampling, ViewerEvent::Move { position }) => self.hover(position),
            (
                ViewerMode::Sampling,
                ViewerEvent::Release {
                    button: PointerButton::Primary,
                    position,
                },
            ) => {
                next.mode = ViewerMode::Idle;
                let (x, y) = self.to_image_coords(position);
                Some(ViewerOutput::Sample { x, y })
            }
            (ViewerMode::Sampling, ViewerEvent::Key { key: Key::Escape }) => {
                next.mode = ViewerMode::Idle;
                None
            }

            // Any mode except an active drag
            (ViewerMode::Idle | ViewerMode::Sampling, ViewerEvent::Scroll { lines, position }) => {
                let zoom = (self.zoom * ZOOM_FACTOR.powf(lines)).clamp(ZOOM_MIN, ZOOM_MAX);
                // Keep the image point under the cursor fixed.
                let image_point = (position - self.offset) / self.zoom;
                next.zoom = zoom;
                next.offset = position - image_point * zoom;
                next.view_changed()
            }
            (ViewerMode::Idle, ViewerEvent::Key { key: Key::Home }) => {
                next.offset = Vec2::ZERO;
                next.zoom = 1.0;
                next.view_changed()
            }
            (ViewerMode::Idle, ViewerEvent::Key { key: Key::Eyedropper }) => {
                next.tool = Tool::Eyedropper;
                None
            }
            (ViewerMode::Idle, ViewerEvent::Key { key: Key::Hand }) => {
                next.tool = Tool::Hand;
                None
            }

            _ => None,
        };
        (next, output)
    }

    /// Fold a sequence of events, collecting outputs.
    pub fn run(self, events: impl IntoIterator<Item = ViewerEvent>) -> (Self, Vec<ViewerOutput>) {
        let mut state = self;
        let mut outputs = Vec::new();
        for event in events {
            let (next, output) = state.handle(event);
            state = next;
            outputs.extend(output);
        }
        (state, outputs)
    }
}
