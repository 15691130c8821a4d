//! Key and modifier types for the input state machine
//!
//! The engine is host-agnostic: the embedding layer (browser glue, test
//! harness, CLI replay) converts its native key events into [`KeyInput`]
//! values and feeds them to the controller. Timestamps travel with the
//! events so trigger debouncing is deterministic under test.

use std::fmt;
use std::time::Instant;

/// Modifier keys as a bitfield for efficient storage and comparison
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Modifiers(u8);

impl Modifiers {
    pub const NONE: Modifiers = Modifiers(0);
    pub const CTRL: Modifiers = Modifiers(0b0001);
    pub const SHIFT: Modifiers = Modifiers(0b0010);
    pub const ALT: Modifiers = Modifiers(0b0100);
    pub const META: Modifiers = Modifiers(0b1000); // Cmd on macOS, Win on Windows

    /// Create modifiers from individual flags
    pub const fn new(ctrl: bool, shift: bool, alt: bool, meta: bool) -> Self {
        let mut bits = 0u8;
        if ctrl {
            bits |= 0b0001;
        }
        if shift {
            bits |= 0b0010;
        }
        if alt {
            bits |= 0b0100;
        }
        if meta {
            bits |= 0b1000;
        }
        Modifiers(bits)
    }

    #[inline]
    pub const fn ctrl(self) -> bool {
        self.0 & 0b0001 != 0
    }

    #[inline]
    pub const fn shift(self) -> bool {
        self.0 & 0b0010 != 0
    }

    #[inline]
    pub const fn alt(self) -> bool {
        self.0 & 0b0100 != 0
    }

    #[inline]
    pub const fn meta(self) -> bool {
        self.0 & 0b1000 != 0
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if self.ctrl() {
            parts.push("Ctrl");
        }
        if self.shift() {
            parts.push("Shift");
        }
        if self.alt() {
            parts.push(if cfg!(target_os = "macos") {
                "Option"
            } else {
                "Alt"
            });
        }
        if self.meta() {
            parts.push(if cfg!(target_os = "macos") {
                "Cmd"
            } else {
                "Win"
            });
        }
        write!(f, "{}", parts.join("+"))
    }
}

/// A logical key as seen by the hint engine
///
/// Character keys are normalized to lowercase at the adapter boundary;
/// the controller re-applies case from the shift modifier when building
/// the sequence buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    /// A character key (normalized to lowercase)
    Char(char),

    // Modifier keys are first-class here because the overlay trigger is
    // a tapped modifier (Control by default, Alt for the new-tab role).
    Control,
    Alt,
    Shift,
    Meta,

    // Named keys the state machine reacts to
    Backspace,
    Enter,
    Escape,
    Space,
    Tab,
}

impl Key {
    /// True for keys that act as modifiers rather than input
    pub const fn is_modifier(self) -> bool {
        matches!(self, Key::Control | Key::Alt | Key::Shift | Key::Meta)
    }

    /// The character this key contributes to a sequence buffer, if any
    pub fn to_char(self, shift: bool) -> Option<char> {
        match self {
            Key::Char(c) => {
                if shift {
                    c.to_uppercase().next()
                } else {
                    c.to_lowercase().next()
                }
            }
            Key::Space => Some(' '),
            _ => None,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Control => write!(f, "Control"),
            Key::Alt => write!(f, "Alt"),
            Key::Shift => write!(f, "Shift"),
            Key::Meta => write!(f, "Meta"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Space => write!(f, "Space"),
            Key::Tab => write!(f, "Tab"),
        }
    }
}

/// Error from parsing a key name in the preferences file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidKeyName(pub String);

impl fmt::Display for InvalidKeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Unknown key name: {}", self.0)
    }
}

impl std::error::Error for InvalidKeyName {}

/// Parse a key name like "control", "alt" or "a" into a [`Key`]
///
/// Used by the preferences loader for the trigger key settings.
pub fn parse_key_name(name: &str) -> Result<Key, InvalidKeyName> {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "ctrl" | "control" => Ok(Key::Control),
        "alt" | "option" | "opt" => Ok(Key::Alt),
        "shift" => Ok(Key::Shift),
        "meta" | "super" | "cmd" | "win" => Ok(Key::Meta),
        "backspace" => Ok(Key::Backspace),
        "enter" | "return" => Ok(Key::Enter),
        "escape" | "esc" => Ok(Key::Escape),
        "space" => Ok(Key::Space),
        "tab" => Ok(Key::Tab),
        _ => {
            let mut chars = lower.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Key::Char(c)),
                _ => Err(InvalidKeyName(name.to_string())),
            }
        }
    }
}

/// A single key event as delivered to the controller
#[derive(Clone, Copy, Debug)]
pub struct KeyInput {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Event timestamp; drives the trigger-arming window
    pub time: Instant,
}

impl KeyInput {
    pub fn new(key: Key, modifiers: Modifiers, time: Instant) -> Self {
        Self {
            key,
            modifiers,
            time,
        }
    }

    /// A plain (unmodified) key event
    pub fn plain(key: Key, time: Instant) -> Self {
        Self::new(key, Modifiers::NONE, time)
    }
}
