//! Declarative override rules
//!
//! Overrides let a user pin a shortcut to a specific element on matching
//! pages, or suppress an element entirely. The rule list is plain JSON
//! parsed with serde — never executable text — and any parse or regex
//! failure degrades to an empty list so a broken rule can't take down
//! allocation for the rest of the page.

use regex::Regex;
use serde::Deserialize;

use crate::adapter::{ElementId, PageAdapter};
use crate::config::Preferences;
use crate::hints::allocator::Binder;
use crate::hints::candidates::{is_clickable, ElementPool};

/// How a rule locates its target element(s)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Match the `id` attribute; at most one element
    Id,
    /// Match the `name` attribute; may hit several elements
    Name,
    /// Match exact text content (or the `value` attribute)
    Text,
}

/// A single override rule as written in the preferences
///
/// An absent (or empty) `shortcut` suppresses the target instead of
/// binding it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideRule {
    pub match_kind: MatchKind,
    pub match_value: String,
    pub url_pattern: String,
    #[serde(default)]
    pub shortcut: Option<String>,
}

impl OverrideRule {
    /// The shortcut to bind, treating the empty string as suppression
    fn effective_shortcut(&self) -> Option<&str> {
        self.shortcut.as_deref().filter(|s| !s.is_empty())
    }
}

/// A rule with its URL pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: OverrideRule,
    pattern: Regex,
}

impl CompiledRule {
    pub fn matches_url(&self, url: &str) -> bool {
        self.pattern.is_match(url)
    }
}

/// Parse and compile a serialized rule list
///
/// Malformed JSON or an invalid pattern yields an empty list with a
/// warning; configuration problems are recovered here, never surfaced.
pub fn parse_rules(json: &str) -> Vec<CompiledRule> {
    if json.trim().is_empty() {
        return Vec::new();
    }
    let rules: Vec<OverrideRule> = match serde_json::from_str(json) {
        Ok(rules) => rules,
        Err(e) => {
            tracing::warn!("Ignoring malformed override rules: {}", e);
            return Vec::new();
        }
    };

    let mut compiled = Vec::with_capacity(rules.len());
    for rule in rules {
        match Regex::new(&rule.url_pattern) {
            Ok(pattern) => compiled.push(CompiledRule { rule, pattern }),
            Err(e) => {
                tracing::warn!(
                    pattern = %rule.url_pattern,
                    "Ignoring override rules with invalid URL pattern: {}",
                    e
                );
                return Vec::new();
            }
        }
    }
    compiled
}

/// Stage 4.1: apply the preference override rules
///
/// Rules bind before every other stage, so an override shortcut can
/// never be displaced by a declared or generated one. Bound and
/// suppressed targets leave the pool either way.
pub(crate) fn apply(
    adapter: &impl PageAdapter,
    prefs: &Preferences,
    pool: &mut ElementPool,
    binder: &mut Binder,
) {
    let rules = parse_rules(&prefs.override_rules);
    let url = adapter.url();

    for compiled in rules.iter().filter(|r| r.matches_url(url)) {
        match compiled.rule.match_kind {
            MatchKind::Id => apply_id_rule(adapter, &compiled.rule, pool, binder),
            MatchKind::Name => apply_name_rule(adapter, &compiled.rule, pool, binder),
            MatchKind::Text => apply_text_rule(adapter, &compiled.rule, pool, binder),
        }
    }
}

fn apply_id_rule(
    adapter: &impl PageAdapter,
    rule: &OverrideRule,
    pool: &mut ElementPool,
    binder: &mut Binder,
) {
    let target = pool
        .in_document_order(adapter)
        .into_iter()
        .find(|&el| adapter.attribute(el, "id") == Some(rule.match_value.as_str()));
    let Some(el) = target else {
        return;
    };
    if let Some(shortcut) = rule.effective_shortcut() {
        bind_unless_taken(adapter, binder, el, shortcut);
    }
    pool.remove(el);
}

fn apply_name_rule(
    adapter: &impl PageAdapter,
    rule: &OverrideRule,
    pool: &mut ElementPool,
    binder: &mut Binder,
) {
    let matches: Vec<ElementId> = pool
        .in_document_order(adapter)
        .into_iter()
        .filter(|&el| adapter.attribute(el, "name") == Some(rule.match_value.as_str()))
        .collect();

    if let Some(shortcut) = rule.effective_shortcut() {
        // Only the first matching element is bound.
        if let Some(&first) = matches.first() {
            bind_unless_taken(adapter, binder, first, shortcut);
            pool.remove(first);
        }
    } else {
        // Suppression removes every match.
        for el in matches {
            pool.remove(el);
        }
    }
}

fn apply_text_rule(
    adapter: &impl PageAdapter,
    rule: &OverrideRule,
    pool: &mut ElementPool,
    binder: &mut Binder,
) {
    let matches_text = |el: ElementId| {
        adapter
            .text_content(el)
            .or_else(|| adapter.attribute(el, "value"))
            == Some(rule.match_value.as_str())
    };

    let Some(shortcut) = rule.effective_shortcut() else {
        for el in pool.in_document_order(adapter) {
            if matches_text(el) {
                pool.remove(el);
            }
        }
        return;
    };

    // Prefer a clickable match over a non-clickable one.
    let ordered = pool.in_document_order(adapter);
    let target = ordered
        .iter()
        .copied()
        .find(|&el| is_clickable(adapter, el) && matches_text(el))
        .or_else(|| ordered.iter().copied().find(|&el| matches_text(el)));
    if let Some(el) = target {
        bind_unless_taken(adapter, binder, el, shortcut);
        pool.remove(el);
    }
}

/// Bind an override shortcut unless an earlier rule already used it
fn bind_unless_taken(
    adapter: &impl PageAdapter,
    binder: &mut Binder,
    el: ElementId,
    shortcut: &str,
) {
    if binder.table.contains(shortcut) {
        tracing::warn!(shortcut, "override shortcut already bound, skipping");
        return;
    }
    binder.bind(adapter, el, shortcut);
}
