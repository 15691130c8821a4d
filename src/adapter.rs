//! Element model adapter boundary
//!
//! The hint engine never touches a live document tree directly. Everything
//! it needs — geometry, attributes, hit-testing, the click-handler signal —
//! comes through the [`PageAdapter`] trait, and activation goes back out
//! through [`ClickSimulator`]. The in-memory snapshot model in
//! [`crate::page`] implements both for the CLI harness and the tests.

use serde::{Deserialize, Serialize};

/// Opaque handle to an interactive element
///
/// The engine only compares and stores these; the adapter owns the mapping
/// back to real elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// A point in absolute page coordinates (scroll included)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned box in absolute page coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True if the box covers any area at all
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// The visible window onto the page
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportInfo {
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportInfo {
    /// The viewport as a rect in absolute page coordinates
    pub fn bounds(&self) -> Rect {
        Rect::new(self.scroll_x, self.scroll_y, self.width, self.height)
    }
}

/// Read-only view of the document the overlay targets
///
/// Element iteration follows document order; that order is what keeps
/// allocation deterministic. `element_at` is the host's hit-test
/// (`elementFromPoint` equivalent) and returns the topmost element,
/// which may be a descendant of the element being probed.
pub trait PageAdapter {
    /// Current page URL, matched against override-rule patterns
    fn url(&self) -> &str;

    /// Every element in the document, in document order
    fn all_elements(&self) -> Vec<ElementId>;

    /// Lowercased tag name ("a", "button", ...)
    fn tag(&self, el: ElementId) -> &str;

    /// An HTML attribute by name, if present and non-empty
    fn attribute(&self, el: ElementId, name: &str) -> Option<&str>;

    /// Visible text content, if any
    fn text_content(&self, el: ElementId) -> Option<&str>;

    /// Native declared shortcut (the `accesskey` attribute)
    fn declared_shortcut(&self, el: ElementId) -> Option<&str>;

    /// Whether the page attached a click/mousedown handler to this element
    ///
    /// There is no direct query for this in a live document; hosts populate
    /// it by intercepting handler-attachment calls.
    fn has_click_handler(&self, el: ElementId) -> bool;

    /// Offset box size in pixels
    fn offset_size(&self, el: ElementId) -> (f64, f64);

    /// Absolute page position, accounting for scroll and fixed positioning
    fn absolute_position(&self, el: ElementId) -> Point;

    fn parent(&self, el: ElementId) -> Option<ElementId>;

    fn first_child(&self, el: ElementId) -> Option<ElementId>;

    /// Topmost element at a point in absolute page coordinates
    fn element_at(&self, p: Point) -> Option<ElementId>;

    fn viewport(&self) -> ViewportInfo;

    /// False once the element has been removed from the document
    fn is_attached(&self, el: ElementId) -> bool;
}

/// Synthesizes a click against an element handle
///
/// Implementations must treat a detached handle as a no-op; the controller
/// additionally guards with [`PageAdapter::is_attached`], so a dispatch
/// against a stale handle never escapes to the host page.
pub trait ClickSimulator {
    /// Click `target`, carrying the platform new-tab modifier when asked
    fn click(&mut self, target: ElementId, new_tab: bool);
}
