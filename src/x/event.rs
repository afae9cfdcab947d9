//! Backend-agnostic X event types.
//!
//! The backend decodes raw protocol events (including atom comparisons,
//! which need the interned atom table) so that the window-management core
//! only ever sees these semantic values.
use crate::{core::bindings::KeyCombo, pure::Rect, Xid};

/// The X events the window manager reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XEvent {
    /// A window is asking to be mapped and managed
    MapRequest(Xid),
    /// A window was unmapped. `from_root` is false for synthetic withdraw
    /// notifications delivered against the window itself.
    UnmapNotify {
        id: Xid,
        from_root: bool,
    },
    /// A window was destroyed
    Destroy(Xid),
    /// A window asked to be moved / resized / restacked
    ConfigureRequest(ConfigureRequestData),
    /// The root window geometry changed
    RootResize(Rect),
    /// A grabbed key combination was pressed (modifier mask already cleaned)
    KeyPress(KeyCombo),
    /// The pointer entered a window (grab-generated crossings are dropped by
    /// the backend)
    Enter(Xid),
    /// A grabbed mouse button was pressed on a window
    ButtonPress(ButtonPressData),
    /// A mouse button was released
    ButtonRelease,
    /// The pointer moved while a grabbed button was held
    Motion {
        root_x: i16,
        root_y: i16,
    },
    /// A property changed on a window
    PropertyNotify {
        id: Xid,
        kind: PropertyKind,
    },
    /// An EWMH client message arrived
    ClientMessage {
        id: Xid,
        kind: ClientMessageKind,
    },
}

/// The verbatim content of a ConfigureRequest, for pass-through handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigureRequestData {
    pub id: Xid,
    pub x: i16,
    pub y: i16,
    pub w: u16,
    pub h: u16,
    pub border_width: u16,
    pub sibling: Xid,
    pub stack_mode: u8,
    /// Raw ConfigWindow value mask naming the fields the client supplied
    pub mask: u16,
}

/// Properties whose changes the core cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// WM_HINTS (urgency flag)
    Hints,
    /// _NET_WM_STATE (demands-attention)
    NetWmState,
    /// Anything else
    Other,
}

/// Decoded EWMH client messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientMessageKind {
    /// _NET_CURRENT_DESKTOP: switch to the given workspace
    CurrentDesktop(usize),
    /// _NET_ACTIVE_WINDOW: focus the target window
    ActiveWindow,
    /// _NET_CLOSE_WINDOW: close the target window
    CloseWindow,
    /// _NET_WM_STATE naming _NET_WM_STATE_FULLSCREEN
    Fullscreen(StateAction),
    /// A message type the manager does not handle
    Other,
}

/// The action field of a _NET_WM_STATE client message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateAction {
    Remove,
    Add,
    Toggle,
}

impl StateAction {
    /// Decode the wire value (0 = remove, 1 = add, 2 = toggle).
    pub fn from_raw(raw: u32) -> Option<Self> {
        match raw {
            0 => Some(Self::Remove),
            1 => Some(Self::Add),
            2 => Some(Self::Toggle),
            _ => None,
        }
    }
}

impl std::fmt::Display for XEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use XEvent::*;

        match self {
            MapRequest(_) => write!(f, "MapRequest"),
            UnmapNotify { .. } => write!(f, "UnmapNotify"),
            Destroy(_) => write!(f, "Destroy"),
            ConfigureRequest(_) => write!(f, "ConfigureRequest"),
            RootResize(_) => write!(f, "RootResize"),
            KeyPress(_) => write!(f, "KeyPress"),
            Enter(_) => write!(f, "Enter"),
            ButtonPress(_) => write!(f, "ButtonPress"),
            ButtonRelease => write!(f, "ButtonRelease"),
            Motion { .. } => write!(f, "Motion"),
            PropertyNotify { .. } => write!(f, "PropertyNotify"),
            ClientMessage { .. } => write!(f, "ClientMessage"),
        }
    }
}

/// A grabbed button press on a managed window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonPressData {
    pub id: Xid,
    pub button: u8,
    /// Raw modifier state at press time
    pub mask: u16,
    pub root_x: i16,
    pub root_y: i16,
}
