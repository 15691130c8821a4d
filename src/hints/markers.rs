//! Marker presentation state
//!
//! The engine decides what is bound to what; drawing is the host's job.
//! This module owns the per-activation marker list and exposes exactly
//! what a renderer needs: position, the matched/remainder split of each
//! sequence while the user is typing, and whether the dispatch would
//! open in a new tab. Markers live and die with the activation.

use crate::adapter::{ElementId, PageAdapter, Point};
use crate::hints::allocator::AssignmentTable;

/// One marker anchored at a bound element
#[derive(Debug, Clone)]
pub struct Marker {
    pub sequence: String,
    pub anchor: ElementId,
    pub position: Point,
}

/// Render style for a marker given the current input buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Sequence still reachable from the typed prefix
    Active,
    /// Reachable, and dispatch would open in a new tab
    ActiveNewTab,
    /// Typed prefix rules this marker out
    Inactive,
}

/// What a renderer draws for one marker
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerView<'a> {
    /// The part of the sequence the user has already typed
    pub matched: &'a str,
    /// The rest of the sequence
    pub remainder: &'a str,
    pub position: Point,
    pub style: MarkerStyle,
}

/// All markers of the current activation, owned as a unit
#[derive(Debug, Default)]
pub struct MarkerSet {
    markers: Vec<Marker>,
    active_prefix: String,
    new_tab: bool,
}

impl MarkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the marker list from an assignment table
    ///
    /// One marker per bound occurrence: the canonical element and every
    /// shared-destination duplicate anchor.
    pub fn rebuild(&mut self, adapter: &impl PageAdapter, table: &AssignmentTable) {
        self.markers.clear();
        self.active_prefix.clear();
        for (sequence, assignment) in table.iter() {
            for &anchor in &assignment.anchors {
                self.markers.push(Marker {
                    sequence: sequence.to_string(),
                    anchor,
                    position: adapter.absolute_position(anchor),
                });
            }
        }
        // Document order keeps the render list stable across rebuilds.
        self.markers.sort_by_key(|m| m.anchor);
    }

    /// Update the highlighted prefix as the user types
    pub fn set_prefix(&mut self, prefix: &str) {
        self.active_prefix.clear();
        self.active_prefix.push_str(prefix);
    }

    pub fn set_new_tab(&mut self, new_tab: bool) {
        self.new_tab = new_tab;
    }

    /// Remove every marker; atomic with table teardown
    pub fn clear(&mut self) {
        self.markers.clear();
        self.active_prefix.clear();
        self.new_tab = false;
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Per-marker render instructions for the current input state
    pub fn views(&self) -> Vec<MarkerView<'_>> {
        self.markers
            .iter()
            .map(|m| {
                if m.sequence.starts_with(&self.active_prefix) {
                    let split = self.active_prefix.len();
                    MarkerView {
                        matched: &m.sequence[..split],
                        remainder: &m.sequence[split..],
                        position: m.position,
                        style: if self.new_tab {
                            MarkerStyle::ActiveNewTab
                        } else {
                            MarkerStyle::Active
                        },
                    }
                } else {
                    MarkerView {
                        matched: "",
                        remainder: &m.sequence,
                        position: m.position,
                        style: MarkerStyle::Inactive,
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{ElementId, Rect, ViewportInfo};
    use crate::page::{SnapshotElement, SnapshotPage};

    fn page_with_links(n: usize) -> SnapshotPage {
        let mut page = SnapshotPage::new(
            "https://example.com",
            ViewportInfo {
                scroll_x: 0.0,
                scroll_y: 0.0,
                width: 800.0,
                height: 600.0,
            },
        );
        for i in 0..n {
            page.push(SnapshotElement::new(
                "a",
                Rect::new(10.0, 10.0 + 30.0 * i as f64, 100.0, 20.0),
            ));
        }
        page
    }

    #[test]
    fn test_rebuild_creates_marker_per_anchor() {
        let page = page_with_links(2);
        let mut table = AssignmentTable::new();
        table.bind("f", ElementId(0));
        table.bind("j", ElementId(1));
        table.add_anchor("f", ElementId(1)); // duplicate-destination anchor

        let mut markers = MarkerSet::new();
        markers.rebuild(&page, &table);
        assert_eq!(markers.len(), 3);
    }

    #[test]
    fn test_views_split_matched_prefix() {
        let page = page_with_links(1);
        let mut table = AssignmentTable::new();
        table.bind("fj", ElementId(0));

        let mut markers = MarkerSet::new();
        markers.rebuild(&page, &table);
        markers.set_prefix("f");

        let views = markers.views();
        assert_eq!(views[0].matched, "f");
        assert_eq!(views[0].remainder, "j");
        assert_eq!(views[0].style, MarkerStyle::Active);
    }

    #[test]
    fn test_views_inactive_when_prefix_rules_out() {
        let page = page_with_links(2);
        let mut table = AssignmentTable::new();
        table.bind("fj", ElementId(0));
        table.bind("ka", ElementId(1));

        let mut markers = MarkerSet::new();
        markers.rebuild(&page, &table);
        markers.set_prefix("f");

        let views = markers.views();
        let inactive: Vec<_> = views
            .iter()
            .filter(|v| v.style == MarkerStyle::Inactive)
            .collect();
        assert_eq!(inactive.len(), 1);
        assert_eq!(inactive[0].remainder, "ka");
    }

    #[test]
    fn test_new_tab_style() {
        let page = page_with_links(1);
        let mut table = AssignmentTable::new();
        table.bind("f", ElementId(0));

        let mut markers = MarkerSet::new();
        markers.rebuild(&page, &table);
        markers.set_new_tab(true);
        assert_eq!(markers.views()[0].style, MarkerStyle::ActiveNewTab);
    }

    #[test]
    fn test_clear_removes_everything() {
        let page = page_with_links(1);
        let mut table = AssignmentTable::new();
        table.bind("f", ElementId(0));

        let mut markers = MarkerSet::new();
        markers.rebuild(&page, &table);
        markers.set_prefix("f");
        markers.clear();
        assert!(markers.is_empty());
        assert!(markers.views().is_empty());
    }
}
