//! The abstraction layer between the window-management core and the X server.
use crate::{core::bindings::KeyCombo, pure::Rect, Result, Xid};
use std::os::unix::io::RawFd;

pub mod atom;
pub mod event;

#[cfg(test)]
pub mod mock;

pub use atom::Atom;
pub use event::{ConfigureRequestData, XEvent};

/// Basic attributes of a window as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowAttributes {
    /// Windows with override-redirect set manage their own geometry and are
    /// never managed.
    pub override_redirect: bool,
    /// Whether the window is currently viewable (mapped, ancestors mapped).
    pub viewable: bool,
}

/// ICCCM WM_STATE values written to managed windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WmStateHint {
    Withdrawn,
    Normal,
    Iconic,
}

/// A handle on a running X connection.
///
/// This is the seam between the window-management state machine and the
/// protocol library: [crate::core::WindowManager] is generic over it, the
/// production implementation is [crate::x11rb::X11rbConnection] and tests
/// substitute a recording mock. Methods that query the server report absent
/// or malformed properties as `None` / `false` / defaults rather than
/// errors; only connection-level failures surface as `Err`.
pub trait XConn {
    /// The geometry of the managed screen.
    fn screen_rect(&self) -> Rect;

    /// Claim the substructure-redirect event mask on the root window.
    ///
    /// Fails with [crate::Error::WmAlreadyRunning] if another window manager
    /// holds it.
    fn become_wm(&self) -> Result<()>;

    /// Create the supporting check window and advertise EWMH support:
    /// _NET_SUPPORTED, _NET_SUPPORTING_WM_CHECK, _NET_WM_NAME,
    /// _NET_NUMBER_OF_DESKTOPS and _NET_DESKTOP_NAMES.
    fn init_ewmh(&self, wm_name: &str, workspace_names: &[String]) -> Result<()>;

    /// Flush any buffered requests to the server.
    fn flush(&self);

    /// Return the next buffered event without blocking.
    fn poll_event(&self) -> Result<Option<XEvent>>;

    /// Block until the X connection (or, when given, `extra_fd`) is
    /// readable. Buffered requests are flushed first.
    fn await_activity(&self, extra_fd: Option<RawFd>) -> Result<()>;

    /// Grab the given key combinations on the root window, registering each
    /// with all NumLock / CapsLock permutations.
    fn grab_keys(&self, combos: &[KeyCombo]) -> Result<()>;

    /// Grab the move / resize button chords on a managed window.
    fn grab_buttons(&self, id: Xid) -> Result<()>;

    /// Resolve a keysym to a keycode via the server's keyboard mapping.
    fn keycode_for_keysym(&self, keysym: u32) -> Option<u8>;

    // Queries

    /// All direct children of the root window.
    fn existing_windows(&self) -> Result<Vec<Xid>>;

    /// The attributes of a window. An `Err` here also doubles as "the
    /// window is gone".
    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes>;

    /// Current geometry of a window, excluding its border.
    fn window_geometry(&self, id: Xid) -> Result<Rect>;

    /// The (instance, class) pair from WM_CLASS.
    fn window_class(&self, id: Xid) -> Option<(String, String)>;

    /// The window title from _NET_WM_NAME, falling back to WM_NAME.
    fn window_title(&self, id: Xid) -> String;

    /// Whether _NET_WM_WINDOW_TYPE names one of the auto-floated types.
    fn window_type_floats(&self, id: Xid) -> bool;

    /// Whether the window declares itself a dock / panel.
    fn window_is_dock(&self, id: Xid) -> bool;

    /// Whether WM_TRANSIENT_FOR is set.
    fn window_is_transient(&self, id: Xid) -> bool;

    /// Reserved screen edges from _NET_WM_STRUT_PARTIAL or _NET_WM_STRUT as
    /// `[left, right, top, bottom]`.
    fn window_struts(&self, id: Xid) -> Option<[u32; 4]>;

    /// The workspace recorded on the window via _NET_WM_DESKTOP.
    fn window_desktop(&self, id: Xid) -> Option<u32>;

    /// Whether the WM_HINTS urgency bit is set.
    fn window_has_urgency_hint(&self, id: Xid) -> bool;

    /// Whether _NET_WM_STATE contains _NET_WM_STATE_DEMANDS_ATTENTION.
    fn window_demands_attention(&self, id: Xid) -> bool;

    /// Whether WM_PROTOCOLS contains WM_DELETE_WINDOW.
    fn supports_delete(&self, id: Xid) -> bool;

    // Commands

    /// Subscribe to enter / structure / property events on a client window.
    fn watch_client_events(&self, id: Xid) -> Result<()>;

    fn map_window(&self, id: Xid) -> Result<()>;

    fn unmap_window(&self, id: Xid) -> Result<()>;

    /// Set position and size (and border width) in one configure request.
    fn position_window(&self, id: Xid, r: Rect, border: u16) -> Result<()>;

    /// Move a window without touching its size.
    fn move_window(&self, id: Xid, x: i16, y: i16) -> Result<()>;

    /// Resize a window without touching its position.
    fn resize_window(&self, id: Xid, w: u16, h: u16) -> Result<()>;

    /// Raise a window to the top of the stacking order.
    fn raise_window(&self, id: Xid) -> Result<()>;

    fn set_border_color(&self, id: Xid, color: u32) -> Result<()>;

    fn set_border_width(&self, id: Xid, width: u16) -> Result<()>;

    /// Give the window input focus (revert-to-parent).
    fn focus_window(&self, id: Xid) -> Result<()>;

    /// Forward a configure request from an unmanaged or floating client
    /// verbatim.
    fn configure_passthrough(&self, req: &ConfigureRequestData) -> Result<()>;

    /// Send a synthetic ConfigureNotify carrying the managed geometry.
    fn send_configure_notify(&self, id: Xid, r: Rect, border: u16) -> Result<()>;

    /// Ask a client to close itself via WM_DELETE_WINDOW.
    fn send_delete(&self, id: Xid) -> Result<()>;

    /// Forcibly disconnect a client.
    fn kill_client(&self, id: Xid) -> Result<()>;

    /// Rewrite WM_HINTS with the urgency bit masked off.
    fn clear_urgency_hint(&self, id: Xid) -> Result<()>;

    /// Record the ICCCM WM_STATE of a managed window.
    fn set_wm_state(&self, id: Xid, state: WmStateHint) -> Result<()>;

    // EWMH mirror

    /// Replace _NET_CLIENT_LIST on the root.
    fn set_client_list(&self, clients: &[Xid]) -> Result<()>;

    /// Replace _NET_CURRENT_DESKTOP on the root.
    fn set_current_desktop(&self, ix: usize) -> Result<()>;

    /// Replace _NET_ACTIVE_WINDOW on the root (`None` clears it).
    fn set_active_window(&self, id: Option<Xid>) -> Result<()>;

    /// Replace _NET_WM_DESKTOP on a client window.
    fn set_client_desktop(&self, id: Xid, ix: usize) -> Result<()>;
}
