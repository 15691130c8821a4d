//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::time::{Duration, Instant};

use pagehint::adapter::{Rect, ViewportInfo};
use pagehint::config::Preferences;
use pagehint::hints::HintController;
use pagehint::keys::{Key, KeyInput, Modifiers};
use pagehint::page::{RecordingClicker, SnapshotElement, SnapshotPage};

pub fn viewport() -> ViewportInfo {
    ViewportInfo {
        scroll_x: 0.0,
        scroll_y: 0.0,
        width: 800.0,
        height: 600.0,
    }
}

/// An empty page at the default test URL
pub fn empty_page() -> SnapshotPage {
    SnapshotPage::new("https://example.com/", viewport())
}

/// A page with `n` in-viewport links, each with a distinct href
pub fn page_with_links(n: usize) -> SnapshotPage {
    let mut page = empty_page();
    for i in 0..n {
        page.push(link(i, &format!("Link {}", i), &format!("/page/{}", i)));
    }
    page
}

/// A link placed on a grid so every element stays inside the viewport
pub fn link(index: usize, text: &str, href: &str) -> SnapshotElement {
    let col = index % 6;
    let row = index / 6;
    SnapshotElement::new(
        "a",
        Rect::new(10.0 + 130.0 * col as f64, 10.0 + 30.0 * row as f64, 120.0, 20.0),
    )
    .with_text(text)
    .with_attr("href", href)
}

/// Tap the default trigger: overlay comes up in same-tab mode
pub fn tap_trigger(ctl: &mut HintController, page: &SnapshotPage, t: Instant) {
    tap(ctl, page, Key::Control, t);
}

/// Tap the new-tab trigger
pub fn tap_newtab_trigger(ctl: &mut HintController, page: &SnapshotPage, t: Instant) {
    tap(ctl, page, Key::Alt, t);
}

/// A quick key tap (down then up, 50ms apart)
pub fn tap(ctl: &mut HintController, page: &SnapshotPage, key: Key, t: Instant) {
    let mut clicker = RecordingClicker::new();
    ctl.handle_key_down(page, &mut clicker, KeyInput::plain(key, t));
    ctl.handle_key_up(page, KeyInput::plain(key, t + Duration::from_millis(50)));
}

/// Type one character into the overlay, recording any dispatch
pub fn type_char(
    ctl: &mut HintController,
    page: &SnapshotPage,
    clicker: &mut RecordingClicker,
    c: char,
    t: Instant,
) {
    let shift = c.is_uppercase();
    let key = Key::Char(c.to_lowercase().next().unwrap_or(c));
    let modifiers = Modifiers::new(false, shift, false, false);
    ctl.handle_key_down(page, clicker, KeyInput::new(key, modifiers, t));
    ctl.handle_key_up(page, KeyInput::new(key, modifiers, t + Duration::from_millis(20)));
}

/// Type a whole sequence, spacing keystrokes 50ms apart
pub fn type_sequence(
    ctl: &mut HintController,
    page: &SnapshotPage,
    clicker: &mut RecordingClicker,
    keys: &str,
    start: Instant,
) {
    let mut t = start;
    for c in keys.chars() {
        type_char(ctl, page, clicker, c, t);
        t += Duration::from_millis(50);
    }
}

/// Preferences with a small fixed alphabet, handy for escalation tests
pub fn prefs_with_alphabet(alphabet: &str, single_char_only: bool) -> Preferences {
    Preferences {
        alphabet: alphabet.to_string(),
        single_char_only,
        ..Preferences::default()
    }
}
