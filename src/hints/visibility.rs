//! Visibility and occlusion filtering
//!
//! An element only deserves a marker if a user could actually click it:
//! its box must cover area, intersect the viewport, and a hit-test must
//! resolve back to it (or a descendant) rather than to something painted
//! on top. Probing the center alone misses links that wrap across lines,
//! so four inset corners are tried as well.

use crate::adapter::{ElementId, PageAdapter, Point, Rect};
use crate::hints::candidates::is_clickable;

/// Whether the element, or its first child for zero-size wrappers, is
/// interactable at its current screen position
pub fn is_visible(adapter: &impl PageAdapter, el: ElementId) -> bool {
    let pos = adapter.absolute_position(el);
    if in_viewport(adapter, el, pos) {
        return true;
    }
    // Zero-size wrappers sometimes hold a perfectly visible child
    // (an anchor around an image, typically). Retry once against it.
    let (width, height) = adapter.offset_size(el);
    if width == 0.0 || height == 0.0 {
        if let Some(child) = adapter.first_child(el) {
            let child_pos = adapter.absolute_position(child);
            return in_viewport(adapter, child, child_pos);
        }
    }
    false
}

/// Viewport intersection plus occlusion probing at center and corners
fn in_viewport(adapter: &impl PageAdapter, el: ElementId, pos: Point) -> bool {
    let (width, height) = adapter.offset_size(el);
    let bounds = Rect::new(pos.x, pos.y, width, height);
    if !bounds.has_area() {
        return false;
    }
    if pos.x < 0.0 || pos.y < 0.0 {
        return false;
    }
    if !bounds.intersects(&adapter.viewport().bounds()) {
        return false;
    }

    // If something else intercepts the click at every probe point, the
    // element is covered; whatever covers it gets its own marker.
    probe_points(&bounds)
        .iter()
        .any(|&p| resolves_to_element(adapter, el, p))
}

/// Center first, then the four inset corners
fn probe_points(bounds: &Rect) -> [Point; 5] {
    [
        bounds.center(),
        Point::new(bounds.x + 1.0, bounds.y + 1.0),
        Point::new(bounds.right() - 1.0, bounds.y + 1.0),
        Point::new(bounds.x + 1.0, bounds.bottom() - 1.0),
        Point::new(bounds.right() - 1.0, bounds.bottom() - 1.0),
    ]
}

/// Walk up from the hit-test result looking for `el`
///
/// Reaching a different clickable element first means a click at this
/// point would go there instead, so the probe fails.
fn resolves_to_element(adapter: &impl PageAdapter, el: ElementId, p: Point) -> bool {
    let mut current = adapter.element_at(p);
    while let Some(hit) = current {
        if hit == el {
            return true;
        }
        if is_clickable(adapter, hit) {
            return false;
        }
        current = adapter.parent(hit);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::ViewportInfo;
    use crate::page::{SnapshotElement, SnapshotPage};

    fn page() -> SnapshotPage {
        SnapshotPage::new(
            "https://example.com",
            ViewportInfo {
                scroll_x: 0.0,
                scroll_y: 0.0,
                width: 800.0,
                height: 600.0,
            },
        )
    }

    #[test]
    fn test_plain_link_is_visible() {
        let mut p = page();
        let a = p.push(SnapshotElement::new("a", Rect::new(10.0, 10.0, 100.0, 20.0)));
        assert!(is_visible(&p, a));
    }

    #[test]
    fn test_offscreen_link_is_not_visible() {
        let mut p = page();
        let below_fold = p.push(SnapshotElement::new("a", Rect::new(10.0, 2000.0, 100.0, 20.0)));
        let negative = p.push(SnapshotElement::new("a", Rect::new(-50.0, 10.0, 20.0, 20.0)));
        assert!(!is_visible(&p, below_fold));
        assert!(!is_visible(&p, negative));
    }

    #[test]
    fn test_zero_area_is_not_visible() {
        let mut p = page();
        let a = p.push(SnapshotElement::new("a", Rect::new(10.0, 10.0, 0.0, 20.0)));
        assert!(!is_visible(&p, a));
    }

    #[test]
    fn test_covered_by_clickable_overlay_is_not_visible() {
        let mut p = page();
        let link = p.push(SnapshotElement::new("a", Rect::new(10.0, 10.0, 100.0, 20.0)));
        // A dialog button painted over the whole link area.
        let _overlay = p.push(
            SnapshotElement::new("button", Rect::new(0.0, 0.0, 300.0, 300.0)).with_text("Close"),
        );
        assert!(!is_visible(&p, link));
    }

    #[test]
    fn test_hit_on_descendant_counts() {
        let mut p = page();
        let link = p.push(SnapshotElement::new("a", Rect::new(10.0, 10.0, 100.0, 20.0)));
        // A span inside the link covers it entirely; the parent walk from
        // the span reaches the link without crossing anything clickable.
        let _span = p.push(
            SnapshotElement::new("span", Rect::new(10.0, 10.0, 100.0, 20.0))
                .with_parent(link.0),
        );
        assert!(is_visible(&p, link));
    }

    #[test]
    fn test_corner_probe_rescues_partially_covered_link() {
        let mut p = page();
        let link = p.push(SnapshotElement::new("a", Rect::new(0.0, 0.0, 100.0, 20.0)));
        // Covers the center but leaves the left edge reachable.
        let _cover = p.push(SnapshotElement::new("button", Rect::new(40.0, 0.0, 100.0, 20.0)));
        assert!(is_visible(&p, link));
    }

    #[test]
    fn test_zero_size_wrapper_with_visible_child() {
        let mut p = page();
        let wrapper = p.push(SnapshotElement::new("a", Rect::new(10.0, 10.0, 0.0, 0.0)));
        let _img = p.push(
            SnapshotElement::new("img", Rect::new(10.0, 10.0, 64.0, 64.0)).with_parent(wrapper.0),
        );
        assert!(is_visible(&p, wrapper));
    }

    #[test]
    fn test_zero_size_wrapper_without_children() {
        let mut p = page();
        let wrapper = p.push(SnapshotElement::new("a", Rect::new(10.0, 10.0, 0.0, 0.0)));
        assert!(!is_visible(&p, wrapper));
    }
}
