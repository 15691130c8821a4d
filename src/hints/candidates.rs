//! Candidate classification and the working element pool
//!
//! Decides which elements are worth a shortcut (clickability), derives the
//! label-based preferred characters the single-character allocator tries
//! first, and tracks the shrinking pool of elements still eligible as the
//! override / declared-shortcut / allocation stages consume them.

use std::collections::HashMap;

use crate::adapter::{ElementId, PageAdapter};

/// Native tags that are interactive without any handler attached
const CLICKABLE_TAGS: [&str; 5] = ["a", "input", "button", "textarea", "select"];

/// ARIA roles that qualify an element for a shortcut
const CLICKABLE_ROLES: [&str; 2] = ["button", "link"];

/// Whether an element can meaningfully receive a click
///
/// True for native interactive tags, qualifying ARIA roles, and anything
/// the adapter saw a click/mousedown handler attached to.
pub fn is_clickable(adapter: &impl PageAdapter, el: ElementId) -> bool {
    if adapter.has_click_handler(el) {
        return true;
    }
    if CLICKABLE_TAGS.contains(&adapter.tag(el)) {
        return true;
    }
    match adapter.attribute(el, "role") {
        Some(role) => CLICKABLE_ROLES.contains(&role),
        None => false,
    }
}

/// Destination identity used to dedupe shared-target anchors
///
/// Click handlers routinely override a link's target, so only plain
/// anchors count as having a stable destination.
pub fn destination(adapter: &impl PageAdapter, el: ElementId) -> Option<String> {
    if adapter.tag(el) == "a" && !adapter.has_click_handler(el) {
        adapter.attribute(el, "href").map(|s| s.to_string())
    } else {
        None
    }
}

/// Fold a handful of common diacritics to their ASCII base character
pub fn fold_diacritic(c: char) -> char {
    match c {
        'á' | 'ä' | 'à' | 'â' | 'å' => 'a',
        'ó' | 'ö' | 'ò' | 'ô' => 'o',
        'é' | 'ë' | 'è' | 'ê' => 'e',
        'ú' | 'ü' | 'ù' | 'û' => 'u',
        'í' | 'ï' | 'ì' | 'î' => 'i',
        'ç' => 'c',
        'ß' => 's',
        'ñ' => 'n',
        _ => c,
    }
}

/// Best available label for an element
///
/// Text content first, then the value/alt/name/id attributes.
pub fn label_text(adapter: &impl PageAdapter, el: ElementId) -> Option<String> {
    if let Some(text) = adapter.text_content(el) {
        return Some(text.to_string());
    }
    for attr in ["value", "alt", "name", "id"] {
        if let Some(value) = adapter.attribute(el, attr) {
            return Some(value.to_string());
        }
    }
    None
}

/// Characters to try first when assigning a single-character shortcut
///
/// Word-initial characters of the label lead (the character after each
/// space), followed by every label character. All output is lowercased
/// with diacritics folded; duplicates are harmless because the allocator
/// consumes each sequence at most once.
pub fn preferred_characters(adapter: &impl PageAdapter, el: ElementId) -> Vec<char> {
    let Some(label) = label_text(adapter, el) else {
        return Vec::new();
    };
    let lower = label.to_lowercase();

    let mut preferred = Vec::new();
    let mut next_is_preferred = true;
    for c in lower.chars() {
        if c == ' ' {
            next_is_preferred = true;
            continue;
        }
        if next_is_preferred {
            preferred.push(fold_diacritic(c));
        }
        next_is_preferred = false;
    }
    preferred.extend(lower.chars().filter(|&c| c != ' ').map(fold_diacritic));
    preferred
}

/// The working set of elements still eligible for assignment
///
/// Owned by the allocation pass, decoupled from any live host structure.
/// Removal is O(1) swap-remove; document order is recovered by filtering
/// the adapter's element list through membership, so scrambled internal
/// order never leaks into allocation.
#[derive(Debug, Default)]
pub struct ElementPool {
    items: Vec<ElementId>,
    positions: HashMap<ElementId, usize>,
}

impl ElementPool {
    /// Seed the pool with every element of the document
    pub fn from_adapter(adapter: &impl PageAdapter) -> Self {
        let items = adapter.all_elements();
        let positions = items.iter().enumerate().map(|(i, &el)| (el, i)).collect();
        Self { items, positions }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, el: ElementId) -> bool {
        self.positions.contains_key(&el)
    }

    /// Remove an element in O(1); no-op if it is already gone
    pub fn remove(&mut self, el: ElementId) {
        let Some(pos) = self.positions.remove(&el) else {
            return;
        };
        self.items.swap_remove(pos);
        if let Some(&moved) = self.items.get(pos) {
            self.positions.insert(moved, pos);
        }
    }

    /// Iterate pool members in arbitrary (internal) order
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.items.iter().copied()
    }

    /// Pool members in document order
    pub fn in_document_order(&self, adapter: &impl PageAdapter) -> Vec<ElementId> {
        adapter
            .all_elements()
            .into_iter()
            .filter(|el| self.contains(*el))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{Rect, ViewportInfo};
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

    fn rect() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 20.0)
    }

    #[test]
    fn test_clickable_tags_and_roles() {
        let mut p = page();
        let a = p.push(SnapshotElement::new("a", rect()));
        let div = p.push(SnapshotElement::new("div", rect()));
        let role_btn = p.push(SnapshotElement::new("span", rect()).with_attr("role", "button"));
        let handler = p.push(SnapshotElement::new("li", rect()).with_click_handler());

        assert!(is_clickable(&p, a));
        assert!(!is_clickable(&p, div));
        assert!(is_clickable(&p, role_btn));
        assert!(is_clickable(&p, handler));
    }

    #[test]
    fn test_destination_only_for_plain_anchors() {
        let mut p = page();
        let plain = p.push(SnapshotElement::new("a", rect()).with_attr("href", "/x"));
        let scripted = p.push(
            SnapshotElement::new("a", rect())
                .with_attr("href", "/x")
                .with_click_handler(),
        );
        let button = p.push(SnapshotElement::new("button", rect()).with_attr("href", "/x"));

        assert_eq!(destination(&p, plain), Some("/x".to_string()));
        assert_eq!(destination(&p, scripted), None);
        assert_eq!(destination(&p, button), None);
    }

    #[test]
    fn test_preferred_characters_word_initials_first() {
        let mut p = page();
        let el = p.push(SnapshotElement::new("a", rect()).with_text("Sign out"));
        let chars = preferred_characters(&p, el);
        assert_eq!(&chars[..2], &['s', 'o']);
        // Full label follows the word initials.
        assert!(chars[2..].starts_with(&['s', 'i', 'g', 'n']));
    }

    #[test]
    fn test_preferred_characters_fold_diacritics() {
        let mut p = page();
        let el = p.push(SnapshotElement::new("a", rect()).with_text("Ünterstützung"));
        let chars = preferred_characters(&p, el);
        assert_eq!(chars[0], 'u');
        assert!(!chars.contains(&'ü'));
    }

    #[test]
    fn test_label_falls_back_through_attributes() {
        let mut p = page();
        let by_alt = p.push(SnapshotElement::new("input", rect()).with_attr("alt", "Search"));
        let by_id = p.push(SnapshotElement::new("input", rect()).with_attr("id", "submit"));
        assert_eq!(label_text(&p, by_alt), Some("Search".to_string()));
        assert_eq!(label_text(&p, by_id), Some("submit".to_string()));
    }

    #[test]
    fn test_pool_swap_remove_keeps_membership() {
        let mut p = page();
        let ids: Vec<_> = (0..5)
            .map(|_| p.push(SnapshotElement::new("a", rect())))
            .collect();
        let mut pool = ElementPool::from_adapter(&p);
        assert_eq!(pool.len(), 5);

        pool.remove(ids[1]);
        pool.remove(ids[3]);
        assert_eq!(pool.len(), 3);
        assert!(pool.contains(ids[0]));
        assert!(!pool.contains(ids[1]));
        assert!(pool.contains(ids[4]));

        // Double removal is harmless.
        pool.remove(ids[1]);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_pool_document_order_survives_removal() {
        let mut p = page();
        let ids: Vec<_> = (0..4)
            .map(|_| p.push(SnapshotElement::new("a", rect())))
            .collect();
        let mut pool = ElementPool::from_adapter(&p);
        pool.remove(ids[0]);

        assert_eq!(pool.in_document_order(&p), vec![ids[1], ids[2], ids[3]]);
    }
}
