//! A recording in-memory connection for exercising the window-management
//! core without an X server.
use crate::{
    core::bindings::KeyCombo,
    pure::Rect,
    x::{ConfigureRequestData, WindowAttributes, WmStateHint, XConn, XEvent},
    Error, Result, Xid,
};
use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
    os::unix::io::RawFd,
};

/// Requests issued against the mock, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    BecomeWm,
    InitEwmh,
    GrabKeys(Vec<KeyCombo>),
    GrabButtons(Xid),
    WatchClient(Xid),
    Map(Xid),
    Unmap(Xid),
    Position { id: Xid, r: Rect, border: u16 },
    Move { id: Xid, x: i16, y: i16 },
    Resize { id: Xid, w: u16, h: u16 },
    Raise(Xid),
    BorderColor { id: Xid, color: u32 },
    BorderWidth { id: Xid, width: u16 },
    Focus(Xid),
    Passthrough(Xid),
    ConfigureNotify { id: Xid, r: Rect, border: u16 },
    Delete(Xid),
    Kill(Xid),
    ClearUrgency(Xid),
    WmState { id: Xid, state: WmStateHint },
    ClientList(Vec<Xid>),
    CurrentDesktop(usize),
    ActiveWindow(Option<Xid>),
    ClientDesktop { id: Xid, ix: usize },
}

/// A fake X server holding per-window state and recording every request.
#[derive(Debug, Default)]
pub struct MockConn {
    pub screen: Rect,
    pub requests: RefCell<Vec<Request>>,

    // per-window server side state
    windows: RefCell<HashMap<Xid, WindowAttributes>>,
    geometries: RefCell<HashMap<Xid, Rect>>,
    classes: RefCell<HashMap<Xid, (String, String)>>,
    titles: RefCell<HashMap<Xid, String>>,
    urgency_hints: RefCell<HashSet<Xid>>,
    attention: RefCell<HashSet<Xid>>,
    struts: RefCell<HashMap<Xid, [u32; 4]>>,
    desktops: RefCell<HashMap<Xid, u32>>,
    transient: RefCell<HashSet<Xid>>,
    float_types: RefCell<HashSet<Xid>>,
    docks: RefCell<HashSet<Xid>>,
    deletable: RefCell<HashSet<Xid>>,
}

impl MockConn {
    pub fn new(screen: Rect) -> Self {
        Self {
            screen,
            ..Default::default()
        }
    }

    /// Register a window on the fake server.
    pub fn add_window(&self, id: Xid, geometry: Rect, class: &str) {
        self.windows.borrow_mut().insert(
            id,
            WindowAttributes {
                override_redirect: false,
                viewable: true,
            },
        );
        self.geometries.borrow_mut().insert(id, geometry);
        if !class.is_empty() {
            self.classes
                .borrow_mut()
                .insert(id, (class.to_string(), class.to_string()));
        }
    }

    /// Remove a window, as if the client destroyed it.
    pub fn destroy_window(&self, id: Xid) {
        self.windows.borrow_mut().remove(&id);
        self.geometries.borrow_mut().remove(&id);
    }

    pub fn set_urgency_hint(&self, id: Xid, urgent: bool) {
        if urgent {
            self.urgency_hints.borrow_mut().insert(id);
        } else {
            self.urgency_hints.borrow_mut().remove(&id);
        }
    }

    pub fn set_title(&self, id: Xid, title: &str) {
        self.titles.borrow_mut().insert(id, title.to_string());
    }

    pub fn set_struts(&self, id: Xid, struts: [u32; 4]) {
        self.struts.borrow_mut().insert(id, struts);
    }

    pub fn set_desktop(&self, id: Xid, desktop: u32) {
        self.desktops.borrow_mut().insert(id, desktop);
    }

    pub fn set_transient(&self, id: Xid) {
        self.transient.borrow_mut().insert(id);
    }

    pub fn set_floating_type(&self, id: Xid) {
        self.float_types.borrow_mut().insert(id);
    }

    pub fn set_dock(&self, id: Xid) {
        self.docks.borrow_mut().insert(id);
    }

    pub fn set_deletable(&self, id: Xid) {
        self.deletable.borrow_mut().insert(id);
    }

    pub fn set_demands_attention(&self, id: Xid) {
        self.attention.borrow_mut().insert(id);
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.borrow().clone()
    }

    pub fn clear_requests(&self) {
        self.requests.borrow_mut().clear();
    }

    fn record(&self, req: Request) {
        self.requests.borrow_mut().push(req);
    }
}

impl XConn for MockConn {
    fn screen_rect(&self) -> Rect {
        self.screen
    }

    fn become_wm(&self) -> Result<()> {
        self.record(Request::BecomeWm);
        Ok(())
    }

    fn init_ewmh(&self, _wm_name: &str, _workspace_names: &[String]) -> Result<()> {
        self.record(Request::InitEwmh);
        Ok(())
    }

    fn flush(&self) {}

    fn poll_event(&self) -> Result<Option<XEvent>> {
        Ok(None)
    }

    fn await_activity(&self, _extra_fd: Option<RawFd>) -> Result<()> {
        Ok(())
    }

    fn grab_keys(&self, combos: &[KeyCombo]) -> Result<()> {
        self.record(Request::GrabKeys(combos.to_vec()));
        Ok(())
    }

    fn grab_buttons(&self, id: Xid) -> Result<()> {
        self.record(Request::GrabButtons(id));
        Ok(())
    }

    fn keycode_for_keysym(&self, keysym: u32) -> Option<u8> {
        // identity-ish mapping good enough for binding tests
        Some((keysym & 0x7f) as u8)
    }

    fn existing_windows(&self) -> Result<Vec<Xid>> {
        let mut ids: Vec<Xid> = self.windows.borrow().keys().copied().collect();
        ids.sort();
        Ok(ids)
    }

    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        self.windows
            .borrow()
            .get(&id)
            .copied()
            .ok_or(Error::UnknownClient(id))
    }

    fn window_geometry(&self, id: Xid) -> Result<Rect> {
        self.geometries
            .borrow()
            .get(&id)
            .copied()
            .ok_or(Error::UnknownClient(id))
    }

    fn window_class(&self, id: Xid) -> Option<(String, String)> {
        self.classes.borrow().get(&id).cloned()
    }

    fn window_title(&self, id: Xid) -> String {
        self.titles.borrow().get(&id).cloned().unwrap_or_default()
    }

    fn window_type_floats(&self, id: Xid) -> bool {
        self.float_types.borrow().contains(&id)
    }

    fn window_is_dock(&self, id: Xid) -> bool {
        self.docks.borrow().contains(&id)
    }

    fn window_is_transient(&self, id: Xid) -> bool {
        self.transient.borrow().contains(&id)
    }

    fn window_struts(&self, id: Xid) -> Option<[u32; 4]> {
        self.struts.borrow().get(&id).copied()
    }

    fn window_desktop(&self, id: Xid) -> Option<u32> {
        self.desktops.borrow().get(&id).copied()
    }

    fn window_has_urgency_hint(&self, id: Xid) -> bool {
        self.urgency_hints.borrow().contains(&id)
    }

    fn window_demands_attention(&self, id: Xid) -> bool {
        self.attention.borrow().contains(&id)
    }

    fn supports_delete(&self, id: Xid) -> bool {
        self.deletable.borrow().contains(&id)
    }

    fn watch_client_events(&self, id: Xid) -> Result<()> {
        self.record(Request::WatchClient(id));
        Ok(())
    }

    fn map_window(&self, id: Xid) -> Result<()> {
        self.record(Request::Map(id));
        Ok(())
    }

    fn unmap_window(&self, id: Xid) -> Result<()> {
        self.record(Request::Unmap(id));
        Ok(())
    }

    fn position_window(&self, id: Xid, r: Rect, border: u16) -> Result<()> {
        self.geometries.borrow_mut().insert(id, r);
        self.record(Request::Position { id, r, border });
        Ok(())
    }

    fn move_window(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        if let Some(r) = self.geometries.borrow_mut().get_mut(&id) {
            r.x = x;
            r.y = y;
        }
        self.record(Request::Move { id, x, y });
        Ok(())
    }

    fn resize_window(&self, id: Xid, w: u16, h: u16) -> Result<()> {
        if let Some(r) = self.geometries.borrow_mut().get_mut(&id) {
            r.w = w;
            r.h = h;
        }
        self.record(Request::Resize { id, w, h });
        Ok(())
    }

    fn raise_window(&self, id: Xid) -> Result<()> {
        self.record(Request::Raise(id));
        Ok(())
    }

    fn set_border_color(&self, id: Xid, color: u32) -> Result<()> {
        self.record(Request::BorderColor { id, color });
        Ok(())
    }

    fn set_border_width(&self, id: Xid, width: u16) -> Result<()> {
        self.record(Request::BorderWidth { id, width });
        Ok(())
    }

    fn focus_window(&self, id: Xid) -> Result<()> {
        self.record(Request::Focus(id));
        Ok(())
    }

    fn configure_passthrough(&self, req: &ConfigureRequestData) -> Result<()> {
        self.record(Request::Passthrough(req.id));
        Ok(())
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, border: u16) -> Result<()> {
        self.record(Request::ConfigureNotify { id, r, border });
        Ok(())
    }

    fn send_delete(&self, id: Xid) -> Result<()> {
        self.record(Request::Delete(id));
        Ok(())
    }

    fn kill_client(&self, id: Xid) -> Result<()> {
        self.record(Request::Kill(id));
        Ok(())
    }

    fn clear_urgency_hint(&self, id: Xid) -> Result<()> {
        self.urgency_hints.borrow_mut().remove(&id);
        self.record(Request::ClearUrgency(id));
        Ok(())
    }

    fn set_wm_state(&self, id: Xid, state: WmStateHint) -> Result<()> {
        self.record(Request::WmState { id, state });
        Ok(())
    }

    fn set_client_list(&self, clients: &[Xid]) -> Result<()> {
        self.record(Request::ClientList(clients.to_vec()));
        Ok(())
    }

    fn set_current_desktop(&self, ix: usize) -> Result<()> {
        self.record(Request::CurrentDesktop(ix));
        Ok(())
    }

    fn set_active_window(&self, id: Option<Xid>) -> Result<()> {
        self.record(Request::ActiveWindow(id));
        Ok(())
    }

    fn set_client_desktop(&self, id: Xid, ix: usize) -> Result<()> {
        self.record(Request::ClientDesktop { id, ix });
        Ok(())
    }
}
