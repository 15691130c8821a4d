//! Collision-free shortcut allocation
//!
//! Runs once per overlay activation, in stages: override rules first,
//! then site-declared shortcuts, then generated sequences over the
//! visible clickable candidates. The [`AssignmentTable`] it produces
//! guarantees that bound sequences are pairwise distinct and that no
//! bound sequence is a prefix or suffix of another, so exact-match
//! lookup during typing is never ambiguous.

use std::collections::{HashMap, HashSet};

use crate::adapter::{ElementId, PageAdapter};
use crate::config::Preferences;
use crate::hints::candidates::{
    destination, is_clickable, preferred_characters, ElementPool,
};
use crate::hints::overrides;
use crate::hints::visibility::is_visible;

/// One bound sequence: the element a dispatch goes to, plus every anchor
/// that should carry a marker for it
///
/// Anchors beyond the first only exist for shared-destination duplicates.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub element: ElementId,
    pub anchors: Vec<ElementId>,
}

/// Sequence → element table for one activation
#[derive(Debug, Default)]
pub struct AssignmentTable {
    by_sequence: HashMap<String, Assignment>,
}

impl AssignmentTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sequence.is_empty()
    }

    /// Drop every binding; part of atomic overlay teardown
    pub fn clear(&mut self) {
        self.by_sequence.clear();
    }

    pub fn contains(&self, sequence: &str) -> bool {
        self.by_sequence.contains_key(sequence)
    }

    /// Bind a sequence to its canonical element
    ///
    /// Sequences are never rebound within an activation.
    pub fn bind(&mut self, sequence: &str, element: ElementId) {
        debug_assert!(
            !self.by_sequence.contains_key(sequence),
            "sequence {:?} bound twice",
            sequence
        );
        self.by_sequence.insert(
            sequence.to_string(),
            Assignment {
                element,
                anchors: vec![element],
            },
        );
    }

    /// Attach another marker anchor to an existing binding
    pub fn add_anchor(&mut self, sequence: &str, anchor: ElementId) {
        if let Some(assignment) = self.by_sequence.get_mut(sequence) {
            assignment.anchors.push(anchor);
        }
    }

    /// Exact-match lookup of a typed buffer
    pub fn lookup(&self, sequence: &str) -> Option<ElementId> {
        self.by_sequence.get(sequence).map(|a| a.element)
    }

    /// Whether the buffer could still grow into a bound sequence
    pub fn is_prefix_of_bound(&self, buffer: &str) -> bool {
        self.by_sequence
            .keys()
            .any(|seq| seq.len() > buffer.len() && seq.starts_with(buffer))
    }

    /// Prefix/suffix collision test against every bound sequence
    ///
    /// Equal sequences collide too; a colliding candidate would make
    /// exact-match resolution ambiguous.
    pub fn collides(&self, candidate: &str) -> bool {
        self.by_sequence
            .keys()
            .any(|seq| seq.starts_with(candidate) || candidate.starts_with(seq))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Assignment)> {
        self.by_sequence.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Bound sequences in sorted order, for stable display
    pub fn sequences_sorted(&self) -> Vec<&str> {
        let mut seqs: Vec<&str> = self.by_sequence.keys().map(|s| s.as_str()).collect();
        seqs.sort_unstable();
        seqs
    }
}

/// The ordered shortcut alphabet, duplicates removed
#[derive(Debug, Clone)]
pub struct Alphabet {
    keys: Vec<char>,
}

impl Alphabet {
    /// Build from the preference string, preserving typing-ease order
    pub fn from_preference(keys: &str) -> Self {
        let mut seen = HashSet::new();
        let keys = keys.chars().filter(|c| seen.insert(*c)).collect();
        Self { keys }
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[char] {
        &self.keys
    }
}

/// Accumulates bindings across the allocation stages
///
/// The destination map lets every later anchor with an already-bound
/// destination reuse the first-bound shortcut instead of consuming a
/// fresh sequence.
#[derive(Debug, Default)]
pub(crate) struct Binder {
    pub table: AssignmentTable,
    destination_map: HashMap<String, String>,
}

impl Binder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Bind and remember the destination for duplicate anchors
    pub(crate) fn bind(&mut self, adapter: &impl PageAdapter, el: ElementId, sequence: &str) {
        self.table.bind(sequence, el);
        if let Some(dest) = destination(adapter, el) {
            self.destination_map
                .entry(dest)
                .or_insert_with(|| sequence.to_string());
        }
    }

    /// Sequence already bound for this destination, if any
    pub(crate) fn bound_for_destination(
        &self,
        adapter: &impl PageAdapter,
        el: ElementId,
    ) -> Option<String> {
        destination(adapter, el).and_then(|dest| self.destination_map.get(&dest).cloned())
    }
}

/// Run the full allocation for one activation
///
/// Override rules and declared shortcuts consume elements from the pool
/// before the general pass labels whatever remains visible. Exhausting
/// the sequence space leaves the tail of the page unlabeled; that is
/// expected, not an error.
pub fn build_assignments(adapter: &impl PageAdapter, prefs: &Preferences) -> AssignmentTable {
    let mut pool = ElementPool::from_adapter(adapter);
    let mut binder = Binder::new();

    overrides::apply(adapter, prefs, &mut pool, &mut binder);
    bind_declared_shortcuts(adapter, prefs, &mut pool, &mut binder);

    let visible = visible_candidates(adapter, &pool);
    assign_generated_sequences(adapter, prefs, &visible, &mut binder);

    tracing::debug!(
        bound = binder.table.len(),
        visible = visible.len(),
        "allocation complete"
    );
    binder.table
}

/// Stage 4.2: site-declared shortcuts
///
/// Every element carrying a declared shortcut leaves the pool here,
/// bound or not; a skipped one never falls through to the generated
/// pass. Collisions are skipped unless the preferences opt into
/// binding through them.
fn bind_declared_shortcuts(
    adapter: &impl PageAdapter,
    prefs: &Preferences,
    pool: &mut ElementPool,
    binder: &mut Binder,
) {
    for el in pool.in_document_order(adapter) {
        let Some(declared) = adapter.declared_shortcut(el) else {
            continue;
        };
        let sequence = declared.to_string();
        pool.remove(el);

        if let Some(existing) = binder.bound_for_destination(adapter, el) {
            binder.table.add_anchor(&existing, el);
            continue;
        }
        if binder.table.contains(&sequence) {
            continue;
        }
        if binder.table.collides(&sequence) && !prefs.declared_shortcuts_bypass_collisions {
            tracing::debug!(sequence, "declared shortcut collides, skipping");
            continue;
        }
        binder.bind(adapter, el, &sequence);
    }
}

/// Stage 4.3: the visible clickable candidates, in document order
fn visible_candidates(adapter: &impl PageAdapter, pool: &ElementPool) -> Vec<ElementId> {
    pool.in_document_order(adapter)
        .into_iter()
        .filter(|&el| is_clickable(adapter, el) && is_visible(adapter, el))
        .collect()
}

/// Visible candidates that will need a fresh sequence
///
/// Shared-destination duplicates reuse an existing binding, so they do
/// not count toward required capacity.
fn distinct_count(adapter: &impl PageAdapter, visible: &[ElementId]) -> usize {
    let mut seen = HashSet::new();
    let mut count = 0;
    for &el in visible {
        if let Some(dest) = destination(adapter, el) {
            if !seen.insert(dest) {
                continue;
            }
        }
        count += 1;
    }
    count
}

/// Minimal sequence length covering `needed` candidates
///
/// Length escalates only when single characters cannot cover the page:
/// `free` first characters times `alphabet`^(k-1) trailing combinations.
fn required_length(free: usize, alphabet: usize, max_length: usize, needed: usize) -> usize {
    let mut length = 1;
    let mut covered = free;
    while length < max_length && covered < needed {
        length += 1;
        covered = covered.saturating_mul(alphabet);
    }
    length
}

/// Every length-`remaining`+prefix sequence over the alphabet
fn expand_sequences(prefix: String, keys: &[char], remaining: usize, out: &mut Vec<String>) {
    if remaining == 0 {
        out.push(prefix);
        return;
    }
    for &key in keys {
        let mut next = prefix.clone();
        next.push(key);
        expand_sequences(next, keys, remaining - 1, out);
    }
}

/// The ordered candidate sequence set for this activation
///
/// Length 1: the free characters themselves. Longer: every sequence
/// whose first character is a free single, Cartesian-expanded over the
/// whole alphabet for the trailing positions.
fn candidate_sequences(alphabet: &Alphabet, free: &[char], length: usize) -> Vec<String> {
    if length == 1 {
        return free.iter().map(|c| c.to_string()).collect();
    }
    let mut out = Vec::new();
    for &first in free {
        expand_sequences(first.to_string(), alphabet.keys(), length - 1, &mut out);
    }
    out
}

/// Stage 4.4: assign generated sequences to the visible candidates
fn assign_generated_sequences(
    adapter: &impl PageAdapter,
    prefs: &Preferences,
    visible: &[ElementId],
    binder: &mut Binder,
) {
    let alphabet = Alphabet::from_preference(&prefs.alphabet);
    let free: Vec<char> = alphabet
        .keys()
        .iter()
        .copied()
        .filter(|c| !binder.table.contains(&c.to_string()))
        .collect();

    let needed = distinct_count(adapter, visible);
    let length = required_length(
        free.len(),
        alphabet.len(),
        prefs.max_sequence_length(),
        needed,
    );

    // Consumed slots become None so document order and the preferred-
    // character lookup stay in sync without shifting the vector.
    let mut sequences: Vec<Option<String>> = candidate_sequences(&alphabet, &free, length)
        .into_iter()
        .filter(|seq| !binder.table.collides(seq))
        .map(Some)
        .collect();
    let slot_index: HashMap<String, usize> = sequences
        .iter()
        .enumerate()
        .filter_map(|(i, seq)| seq.as_ref().map(|s| (s.clone(), i)))
        .collect();
    let mut next_free = 0;

    for &el in visible {
        if let Some(existing) = binder.bound_for_destination(adapter, el) {
            binder.table.add_anchor(&existing, el);
            continue;
        }

        let mut chosen = None;
        if length == 1 {
            for c in preferred_characters(adapter, el) {
                if let Some(&slot) = slot_index.get(c.to_string().as_str()) {
                    if sequences[slot].is_some() {
                        chosen = sequences[slot].take();
                        break;
                    }
                }
            }
        }
        if chosen.is_none() {
            while next_free < sequences.len() && sequences[next_free].is_none() {
                next_free += 1;
            }
            if next_free >= sequences.len() {
                // Sequence space exhausted; the rest of the page stays
                // unlabeled.
                break;
            }
            chosen = sequences[next_free].take();
            next_free += 1;
        }
        if let Some(sequence) = chosen {
            binder.bind(adapter, el, &sequence);
        }
    }
}
