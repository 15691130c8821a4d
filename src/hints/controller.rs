//! Keystroke-driven overlay controller
//!
//! One controller instance per document context, owning the session
//! state: trigger arming, the typed sequence buffer, the assignment
//! table and the markers. The protocol:
//!
//! ```text
//! Idle --trigger down--> ArmingTrigger --trigger up ≤ 200ms--> Active
//!      Active/Matching --character--> Matching / dispatch / reset
//! ```
//!
//! Activation runs the whole allocation synchronously inside the
//! trigger key-up; geometry is computed once per activation, never per
//! keystroke. Dispatch happens inside the matching key-down and the
//! following key-up is swallowed; `Dispatched` is therefore transient
//! and the stored state after a dispatch is `Idle` (or `Active` again
//! when repeat dispatch is on in new-tab mode). Any pointer event or
//! resize tears the overlay down unconditionally.

use std::time::{Duration, Instant};

use crate::adapter::{ClickSimulator, PageAdapter};
use crate::config::Preferences;
use crate::hints::allocator::{build_assignments, AssignmentTable};
use crate::hints::markers::MarkerSet;
use crate::keys::{Key, KeyInput};

/// Max time between trigger key-down and key-up. A longer hold almost
/// always means the key was used as an ordinary modifier.
pub const MAX_TRIGGER_DURATION: Duration = Duration::from_millis(200);

/// Observable state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// Trigger key is down; waiting for a quick release
    ArmingTrigger,
    /// Overlay shown, empty buffer
    Active,
    /// Overlay shown, buffer matches a strict prefix of bound sequences
    Matching,
}

/// What the host should do with the event it just delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDisposition {
    /// Let the event propagate to the page
    PassThrough,
    /// The overlay swallowed the event
    Consumed,
}

impl KeyDisposition {
    pub fn is_consumed(self) -> bool {
        self == KeyDisposition::Consumed
    }
}

#[derive(Debug, Clone, Copy)]
struct Arm {
    since: Instant,
    key: Key,
}

/// Per-document overlay controller
#[derive(Debug)]
pub struct HintController {
    prefs: Preferences,
    arm: Option<Arm>,
    overlay_visible: bool,
    open_in_new_tab: bool,
    consume_next_key_up: bool,
    buffer: String,
    assignments: AssignmentTable,
    markers: MarkerSet,
}

impl HintController {
    pub fn new(prefs: Preferences) -> Self {
        Self {
            prefs,
            arm: None,
            overlay_visible: false,
            open_in_new_tab: false,
            consume_next_key_up: false,
            buffer: String::new(),
            assignments: AssignmentTable::new(),
            markers: MarkerSet::new(),
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub fn phase(&self) -> Phase {
        if self.overlay_visible {
            if self.buffer.is_empty() {
                Phase::Active
            } else {
                Phase::Matching
            }
        } else if self.arm.is_some() {
            Phase::ArmingTrigger
        } else {
            Phase::Idle
        }
    }

    pub fn is_overlay_visible(&self) -> bool {
        self.overlay_visible
    }

    pub fn open_in_new_tab(&self) -> bool {
        self.open_in_new_tab
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn assignments(&self) -> &AssignmentTable {
        &self.assignments
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Whether this key currently acts as a trigger
    ///
    /// The new-tab trigger only arms from scratch when the preferences
    /// allow it; once the overlay is up it always toggles.
    fn is_trigger_role(&self, key: Key) -> bool {
        key == self.prefs.trigger
            || (key == self.prefs.trigger_newtab
                && (self.overlay_visible || !self.prefs.newtab_only_when_triggered))
    }

    /// Feed a key-down event
    pub fn handle_key_down(
        &mut self,
        adapter: &impl PageAdapter,
        clicker: &mut impl ClickSimulator,
        input: KeyInput,
    ) -> KeyDisposition {
        self.consume_next_key_up = false;

        if self.is_trigger_role(input.key) {
            match &mut self.arm {
                // Some platforms repeat key-down while the key is held;
                // the first event owns the arm time.
                Some(arm) => arm.key = input.key,
                None => {
                    self.arm = Some(Arm {
                        since: input.time,
                        key: input.key,
                    });
                }
            }
            return KeyDisposition::PassThrough;
        }
        self.arm = None;

        if !self.overlay_visible {
            return KeyDisposition::PassThrough;
        }
        // A bare shift must reach the page so shifted characters resolve
        // with the right case.
        if input.key == Key::Shift {
            return KeyDisposition::PassThrough;
        }
        self.consume_next_key_up = true;

        match input.key {
            Key::Backspace => {
                self.buffer.pop();
            }
            key => match key.to_char(input.modifiers.shift()) {
                Some(c) => self.buffer.push(c),
                None => {
                    // Escape and friends: not sequence characters.
                    self.hide();
                    return KeyDisposition::Consumed;
                }
            },
        }
        self.resolve_buffer(adapter, clicker);
        KeyDisposition::Consumed
    }

    /// Feed a key-up event
    pub fn handle_key_up(&mut self, adapter: &impl PageAdapter, input: KeyInput) -> KeyDisposition {
        match self.arm.take() {
            Some(arm) if arm.key == input.key => {
                if self.overlay_visible {
                    self.toggle_or_close(input.key);
                    KeyDisposition::Consumed
                } else if input.time.duration_since(arm.since) <= MAX_TRIGGER_DURATION {
                    self.activate(adapter, input.key);
                    KeyDisposition::Consumed
                } else {
                    // Held too long: an ordinary modifier press.
                    tracing::trace!("trigger held past arming window");
                    KeyDisposition::PassThrough
                }
            }
            _ => {
                if self.consume_next_key_up {
                    self.consume_next_key_up = false;
                    KeyDisposition::Consumed
                } else {
                    KeyDisposition::PassThrough
                }
            }
        }
    }

    /// Pointer activity cancels the overlay in any state
    pub fn handle_pointer_event(&mut self) {
        self.arm = None;
        if self.overlay_visible {
            self.hide();
        }
    }

    /// Resize invalidates all cached geometry; tear down
    pub fn handle_resize(&mut self) {
        self.arm = None;
        if self.overlay_visible {
            self.hide();
        }
    }

    /// Match the buffer against the table and act on the result
    fn resolve_buffer(&mut self, adapter: &impl PageAdapter, clicker: &mut impl ClickSimulator) {
        if let Some(target) = self.assignments.lookup(&self.buffer) {
            tracing::debug!(sequence = %self.buffer, new_tab = self.open_in_new_tab, "dispatching");
            if adapter.is_attached(target) {
                clicker.click(target, self.open_in_new_tab);
            } else {
                tracing::debug!("dispatch target detached, dropping click");
            }
            if self.open_in_new_tab {
                // Keep the overlay and table for repeat dispatch; only
                // the buffer resets.
                self.buffer.clear();
                self.markers.set_prefix("");
            } else {
                self.hide();
            }
            return;
        }

        if self.buffer.is_empty() || self.assignments.is_prefix_of_bound(&self.buffer) {
            self.markers.set_prefix(&self.buffer);
            return;
        }

        // Dispatch miss: silent reset.
        tracing::trace!(sequence = %self.buffer, "no match, hiding");
        self.hide();
    }

    /// A trigger tap while the overlay is up
    ///
    /// The other trigger role toggles "open in new tab" in place. The
    /// same role again — which is always the case when both roles map
    /// to one key — is a plain re-trigger and closes the overlay.
    fn toggle_or_close(&mut self, key: Key) {
        let wants_new_tab = key == self.prefs.trigger_newtab;
        if self.open_in_new_tab == wants_new_tab {
            self.hide();
        } else {
            self.open_in_new_tab = wants_new_tab;
            self.markers.set_new_tab(wants_new_tab);
        }
    }

    /// Run allocation and show the overlay
    fn activate(&mut self, adapter: &impl PageAdapter, key: Key) {
        self.open_in_new_tab = key == self.prefs.trigger_newtab;
        self.assignments = build_assignments(adapter, &self.prefs);
        self.markers.rebuild(adapter, &self.assignments);
        self.markers.set_new_tab(self.open_in_new_tab);
        self.buffer.clear();
        self.overlay_visible = true;
        tracing::debug!(
            bound = self.assignments.len(),
            new_tab = self.open_in_new_tab,
            "overlay shown"
        );
    }

    /// Atomic teardown: markers and table go together
    fn hide(&mut self) {
        self.assignments.clear();
        self.markers.clear();
        self.buffer.clear();
        self.open_in_new_tab = false;
        self.overlay_visible = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{Rect, ViewportInfo};
    use crate::page::{RecordingClicker, SnapshotElement, SnapshotPage};

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
            page.push(
                SnapshotElement::new("a", Rect::new(10.0, 10.0 + 30.0 * i as f64, 100.0, 20.0))
                    .with_attr("href", &format!("/{}", i)),
            );
        }
        page
    }

    fn controller() -> HintController {
        HintController::new(Preferences::default())
    }

    fn tap_trigger(ctl: &mut HintController, page: &SnapshotPage, t: Instant) {
        let mut clicker = RecordingClicker::new();
        ctl.handle_key_down(page, &mut clicker, KeyInput::plain(Key::Control, t));
        ctl.handle_key_up(page, KeyInput::plain(Key::Control, t + Duration::from_millis(50)));
    }

    #[test]
    fn test_phase_starts_idle() {
        assert_eq!(controller().phase(), Phase::Idle);
    }

    #[test]
    fn test_trigger_down_arms() {
        let page = page_with_links(2);
        let mut ctl = controller();
        let mut clicker = RecordingClicker::new();
        ctl.handle_key_down(&page, &mut clicker, KeyInput::plain(Key::Control, Instant::now()));
        assert_eq!(ctl.phase(), Phase::ArmingTrigger);
    }

    #[test]
    fn test_repeated_key_down_keeps_arm_time() {
        let page = page_with_links(2);
        let mut ctl = controller();
        let mut clicker = RecordingClicker::new();
        let t0 = Instant::now();
        ctl.handle_key_down(&page, &mut clicker, KeyInput::plain(Key::Control, t0));
        // Held-key repeat 150ms later must not reset the window.
        ctl.handle_key_down(
            &page,
            &mut clicker,
            KeyInput::plain(Key::Control, t0 + Duration::from_millis(150)),
        );
        let up = KeyInput::plain(Key::Control, t0 + Duration::from_millis(300));
        assert_eq!(ctl.handle_key_up(&page, up), KeyDisposition::PassThrough);
        assert_eq!(ctl.phase(), Phase::Idle);
    }

    #[test]
    fn test_quick_tap_activates() {
        let page = page_with_links(2);
        let mut ctl = controller();
        tap_trigger(&mut ctl, &page, Instant::now());
        assert_eq!(ctl.phase(), Phase::Active);
        assert!(ctl.is_overlay_visible());
        assert_eq!(ctl.assignments().len(), 2);
    }

    #[test]
    fn test_pointer_event_hides_everything() {
        let page = page_with_links(2);
        let mut ctl = controller();
        tap_trigger(&mut ctl, &page, Instant::now());
        ctl.handle_pointer_event();
        assert_eq!(ctl.phase(), Phase::Idle);
        assert!(ctl.markers().is_empty());
        assert!(ctl.assignments().is_empty());
    }
}
