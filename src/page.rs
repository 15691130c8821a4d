//! In-memory page snapshot
//!
//! A serde-deserializable stand-in for a live document: the CLI harness
//! loads one from JSON and the test suite builds them programmatically.
//! Elements are stored in document order; hit-testing treats later
//! elements as painted on top (children follow their parents in document
//! order, so a descendant wins the hit before its ancestor).

use std::collections::HashMap;

use serde::Deserialize;

use crate::adapter::{ClickSimulator, ElementId, PageAdapter, Point, Rect, ViewportInfo};

/// One element of a page snapshot
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotElement {
    pub tag: String,
    /// Box in absolute page coordinates
    pub rect: Rect,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub attrs: HashMap<String, String>,
    #[serde(default)]
    pub access_key: Option<String>,
    #[serde(default)]
    pub has_click_handler: bool,
    /// CSS `position: fixed` — the box tracks the viewport, not the page
    #[serde(default)]
    pub fixed: bool,
    /// Index of the parent element within the snapshot
    #[serde(default)]
    pub parent: Option<usize>,
    /// Simulates removal from the document after snapshotting
    #[serde(default)]
    pub detached: bool,
}

impl SnapshotElement {
    pub fn new(tag: &str, rect: Rect) -> Self {
        Self {
            tag: tag.to_lowercase(),
            rect,
            text: None,
            attrs: HashMap::new(),
            access_key: None,
            has_click_handler: false,
            fixed: false,
            parent: None,
            detached: false,
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.attrs.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_access_key(mut self, key: &str) -> Self {
        self.access_key = Some(key.to_string());
        self
    }

    pub fn with_click_handler(mut self) -> Self {
        self.has_click_handler = true;
        self
    }

    pub fn with_parent(mut self, parent: usize) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn fixed(mut self) -> Self {
        self.fixed = true;
        self
    }
}

/// A complete page snapshot implementing [`PageAdapter`]
#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotPage {
    pub url: String,
    pub viewport: ViewportInfo,
    pub elements: Vec<SnapshotElement>,
}

impl SnapshotPage {
    pub fn new(url: &str, viewport: ViewportInfo) -> Self {
        Self {
            url: url.to_string(),
            viewport,
            elements: Vec::new(),
        }
    }

    /// Parse a snapshot from its JSON form
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Append an element, returning its id
    pub fn push(&mut self, element: SnapshotElement) -> ElementId {
        self.elements.push(element);
        ElementId(self.elements.len() - 1)
    }

    /// Mark an element as removed from the document
    pub fn detach(&mut self, el: ElementId) {
        if let Some(e) = self.elements.get_mut(el.0) {
            e.detached = true;
        }
    }

    fn get(&self, el: ElementId) -> Option<&SnapshotElement> {
        self.elements.get(el.0)
    }

    fn absolute_rect(&self, e: &SnapshotElement) -> Rect {
        if e.fixed {
            Rect::new(
                e.rect.x + self.viewport.scroll_x,
                e.rect.y + self.viewport.scroll_y,
                e.rect.width,
                e.rect.height,
            )
        } else {
            e.rect
        }
    }
}

impl PageAdapter for SnapshotPage {
    fn url(&self) -> &str {
        &self.url
    }

    fn all_elements(&self) -> Vec<ElementId> {
        (0..self.elements.len())
            .filter(|&i| !self.elements[i].detached)
            .map(ElementId)
            .collect()
    }

    fn tag(&self, el: ElementId) -> &str {
        self.get(el).map(|e| e.tag.as_str()).unwrap_or("")
    }

    fn attribute(&self, el: ElementId, name: &str) -> Option<&str> {
        self.get(el)
            .and_then(|e| e.attrs.get(name))
            .map(|s| s.as_str())
            .filter(|s| !s.is_empty())
    }

    fn text_content(&self, el: ElementId) -> Option<&str> {
        self.get(el)
            .and_then(|e| e.text.as_deref())
            .filter(|s| !s.trim().is_empty())
    }

    fn declared_shortcut(&self, el: ElementId) -> Option<&str> {
        self.get(el)
            .and_then(|e| e.access_key.as_deref())
            .filter(|s| !s.is_empty())
    }

    fn has_click_handler(&self, el: ElementId) -> bool {
        self.get(el).map(|e| e.has_click_handler).unwrap_or(false)
    }

    fn offset_size(&self, el: ElementId) -> (f64, f64) {
        self.get(el)
            .map(|e| (e.rect.width, e.rect.height))
            .unwrap_or((0.0, 0.0))
    }

    fn absolute_position(&self, el: ElementId) -> Point {
        self.get(el)
            .map(|e| self.absolute_rect(e).origin())
            .unwrap_or_default()
    }

    fn parent(&self, el: ElementId) -> Option<ElementId> {
        self.get(el).and_then(|e| e.parent).map(ElementId)
    }

    fn first_child(&self, el: ElementId) -> Option<ElementId> {
        self.elements
            .iter()
            .position(|e| e.parent == Some(el.0) && !e.detached)
            .map(ElementId)
    }

    fn element_at(&self, p: Point) -> Option<ElementId> {
        // Later elements paint on top of earlier ones.
        self.elements
            .iter()
            .enumerate()
            .rev()
            .find(|(_, e)| !e.detached && self.absolute_rect(e).contains(p))
            .map(|(i, _)| ElementId(i))
    }

    fn viewport(&self) -> ViewportInfo {
        self.viewport
    }

    fn is_attached(&self, el: ElementId) -> bool {
        self.get(el).map(|e| !e.detached).unwrap_or(false)
    }
}

/// Click simulator that records dispatches instead of performing them
///
/// Backs the CLI replay output and the controller tests.
#[derive(Debug, Default)]
pub struct RecordingClicker {
    pub clicks: Vec<(ElementId, bool)>,
}

impl RecordingClicker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<(ElementId, bool)> {
        self.clicks.last().copied()
    }
}

impl ClickSimulator for RecordingClicker {
    fn click(&mut self, target: ElementId, new_tab: bool) {
        self.clicks.push((target, new_tab));
    }
}
