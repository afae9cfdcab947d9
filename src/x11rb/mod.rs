//! The production [XConn] implementation, talking to the X server via x11rb.
use crate::{
    core::bindings::{modmask, KeyCombo, BUTTON_MOVE, BUTTON_RESIZE},
    pure::Rect,
    x::{
        atom::{Atom, AUTO_FLOAT_WINDOW_TYPES, EWMH_SUPPORTED_ATOMS},
        event::{
            ButtonPressData, ClientMessageKind, ConfigureRequestData, PropertyKind, StateAction,
            XEvent,
        },
        WindowAttributes, WmStateHint, XConn,
    },
    Error, Result, Xid,
};
use nix::{
    errno::Errno,
    poll::{poll, PollFd, PollFlags},
};
use std::{
    collections::HashMap,
    os::unix::io::{AsRawFd, RawFd},
};
use strum::IntoEnumIterator;
use tracing::{trace, warn};
use x11rb::{
    connection::Connection,
    properties::{WmClass, WmHints},
    protocol::{
        xproto::{
            AtomEnum, ButtonIndex, ChangeWindowAttributesAux, ClientMessageEvent,
            ConfigWindow, ConfigureNotifyEvent, ConfigureWindowAux, ConnectionExt as _,
            CreateWindowAux, EventMask, Grab, GrabMode, InputFocus, MapState, ModMask,
            NotifyMode, PropMode, StackMode, WindowClass, CLIENT_MESSAGE_EVENT,
            CONFIGURE_NOTIFY_EVENT,
        },
        Event,
    },
    rust_connection::RustConnection,
    wrapper::ConnectionExt as _,
    CURRENT_TIME, NONE,
};

// ICCCM WM_STATE values
const WM_STATE_WITHDRAWN: u32 = 0;
const WM_STATE_NORMAL: u32 = 1;
const WM_STATE_ICONIC: u32 = 3;

/// A live connection to the X server.
///
/// Atoms and the keyboard mapping are fetched once at connection time; the
/// check window used for _NET_SUPPORTING_WM_CHECK is created eagerly so
/// that [XConn::init_ewmh] only has to write properties.
#[derive(Debug)]
pub struct X11rbConnection {
    conn: RustConnection,
    root: Xid,
    check_win: u32,
    screen_rect: Rect,
    atoms: HashMap<Atom, u32>,
    auto_float_types: Vec<u32>,
    min_keycode: u8,
    keysyms_per_keycode: u8,
    keysyms: Vec<u32>,
}

impl X11rbConnection {
    /// Connect to the display named in `$DISPLAY`.
    pub fn new() -> Result<Self> {
        let (conn, screen_num) = x11rb::connect(None)?;

        let (root, root_visual, screen_rect, min_keycode, max_keycode) = {
            let setup = conn.setup();
            let screen = &setup.roots[screen_num];
            (
                screen.root,
                screen.root_visual,
                Rect::new(0, 0, screen.width_in_pixels, screen.height_in_pixels),
                setup.min_keycode,
                setup.max_keycode,
            )
        };

        // send all InternAtom requests up front, then collect the replies
        let cookies: Vec<_> = Atom::iter()
            .map(|a| Ok((a, conn.intern_atom(false, a.as_ref().as_bytes())?)))
            .collect::<Result<_>>()?;
        let atoms = cookies
            .into_iter()
            .map(|(a, c)| Ok((a, c.reply()?.atom)))
            .collect::<Result<HashMap<_, _>>>()?;

        let auto_float_types = AUTO_FLOAT_WINDOW_TYPES
            .iter()
            .filter_map(|a| atoms.get(a).copied())
            .collect();

        let mapping = conn
            .get_keyboard_mapping(min_keycode, max_keycode - min_keycode + 1)?
            .reply()?;

        let check_win = conn.generate_id()?;
        let aux = CreateWindowAux::new().override_redirect(1);
        conn.create_window(
            0,
            check_win,
            root,
            0,
            0,
            1,
            1,
            0,
            WindowClass::INPUT_ONLY,
            root_visual,
            &aux,
        )?;

        Ok(Self {
            conn,
            root: Xid(root),
            check_win,
            screen_rect,
            atoms,
            auto_float_types,
            min_keycode,
            keysyms_per_keycode: mapping.keysyms_per_keycode,
            keysyms: mapping.keysyms,
        })
    }

    fn atom(&self, a: Atom) -> u32 {
        self.atoms[&a]
    }

    /// Fetch a property's values as u32s, treating every failure mode as
    /// "not set".
    fn prop_u32s(&self, id: Xid, prop: u32) -> Option<Vec<u32>> {
        self.conn
            .get_property(false, *id, prop, AtomEnum::ANY, 0, 1024)
            .ok()?
            .reply()
            .ok()?
            .value32()
            .map(|vals| vals.collect())
    }

    fn str_prop(&self, id: Xid, prop: u32) -> Option<String> {
        let value = self
            .conn
            .get_property(false, *id, prop, AtomEnum::ANY, 0, 1024)
            .ok()?
            .reply()
            .ok()?
            .value;

        if value.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&value).into_owned())
        }
    }

    fn window_has_type_in(&self, id: Xid, types: &[u32]) -> bool {
        self.prop_u32s(id, self.atom(Atom::NetWmWindowType))
            .map(|atoms| atoms.iter().any(|a| types.contains(a)))
            .unwrap_or(false)
    }

    fn decode(&self, event: Event) -> Option<XEvent> {
        match event {
            Event::MapRequest(e) => Some(XEvent::MapRequest(Xid(e.window))),

            Event::UnmapNotify(e) => Some(XEvent::UnmapNotify {
                id: Xid(e.window),
                from_root: Xid(e.event) == self.root,
            }),

            Event::DestroyNotify(e) => Some(XEvent::Destroy(Xid(e.window))),

            Event::ConfigureRequest(e) => Some(XEvent::ConfigureRequest(ConfigureRequestData {
                id: Xid(e.window),
                x: e.x,
                y: e.y,
                w: e.width,
                h: e.height,
                border_width: e.border_width,
                sibling: Xid(e.sibling),
                stack_mode: u32::from(e.stack_mode) as u8,
                mask: u16::from(e.value_mask),
            })),

            Event::ConfigureNotify(e) if Xid(e.window) == self.root => {
                Some(XEvent::RootResize(Rect::new(0, 0, e.width, e.height)))
            }

            Event::KeyPress(e) => {
                Some(XEvent::KeyPress(KeyCombo::new(u16::from(e.state), e.detail).cleaned()))
            }

            Event::EnterNotify(e) if e.mode == NotifyMode::NORMAL => {
                Some(XEvent::Enter(Xid(e.event)))
            }

            Event::ButtonPress(e) => Some(XEvent::ButtonPress(ButtonPressData {
                id: Xid(e.event),
                button: e.detail,
                mask: u16::from(e.state),
                root_x: e.root_x,
                root_y: e.root_y,
            })),

            Event::ButtonRelease(_) => Some(XEvent::ButtonRelease),

            Event::MotionNotify(e) => Some(XEvent::Motion {
                root_x: e.root_x,
                root_y: e.root_y,
            }),

            Event::PropertyNotify(e) if Xid(e.window) != self.root => {
                let kind = if e.atom == self.atom(Atom::WmHints) {
                    PropertyKind::Hints
                } else if e.atom == self.atom(Atom::NetWmState) {
                    PropertyKind::NetWmState
                } else {
                    PropertyKind::Other
                };

                Some(XEvent::PropertyNotify {
                    id: Xid(e.window),
                    kind,
                })
            }

            Event::ClientMessage(e) => {
                let data = e.data.as_data32();
                let kind = if e.type_ == self.atom(Atom::NetCurrentDesktop) {
                    ClientMessageKind::CurrentDesktop(data[0] as usize)
                } else if e.type_ == self.atom(Atom::NetActiveWindow) {
                    ClientMessageKind::ActiveWindow
                } else if e.type_ == self.atom(Atom::NetCloseWindow) {
                    ClientMessageKind::CloseWindow
                } else if e.type_ == self.atom(Atom::NetWmState) {
                    let fullscreen = self.atom(Atom::NetWmStateFullscreen);
                    if data[1] == fullscreen || data[2] == fullscreen {
                        match StateAction::from_raw(data[0]) {
                            Some(action) => ClientMessageKind::Fullscreen(action),
                            None => ClientMessageKind::Other,
                        }
                    } else {
                        ClientMessageKind::Other
                    }
                } else {
                    ClientMessageKind::Other
                };

                Some(XEvent::ClientMessage {
                    id: Xid(e.window),
                    kind,
                })
            }

            _ => None,
        }
    }
}

impl XConn for X11rbConnection {
    fn screen_rect(&self) -> Rect {
        self.screen_rect
    }

    fn become_wm(&self) -> Result<()> {
        let mask = EventMask::SUBSTRUCTURE_REDIRECT
            | EventMask::SUBSTRUCTURE_NOTIFY
            | EventMask::ENTER_WINDOW
            | EventMask::LEAVE_WINDOW
            | EventMask::PROPERTY_CHANGE
            | EventMask::BUTTON_PRESS;
        let aux = ChangeWindowAttributesAux::new().event_mask(mask);

        self.conn
            .change_window_attributes(*self.root, &aux)?
            .check()
            .map_err(|_| Error::WmAlreadyRunning)
    }

    fn init_ewmh(&self, wm_name: &str, workspace_names: &[String]) -> Result<()> {
        let root = *self.root;
        let utf8 = self.atom(Atom::UTF8String);

        self.conn.change_property8(
            PropMode::REPLACE,
            self.check_win,
            self.atom(Atom::NetWmName),
            utf8,
            wm_name.as_bytes(),
        )?;

        let check_atom = self.atom(Atom::NetSupportingWmCheck);
        for win in [root, self.check_win] {
            self.conn.change_property32(
                PropMode::REPLACE,
                win,
                check_atom,
                AtomEnum::WINDOW,
                &[self.check_win],
            )?;
        }

        let supported: Vec<u32> = EWMH_SUPPORTED_ATOMS.iter().map(|a| self.atom(*a)).collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            root,
            self.atom(Atom::NetSupported),
            AtomEnum::ATOM,
            &supported,
        )?;

        self.conn.change_property32(
            PropMode::REPLACE,
            root,
            self.atom(Atom::NetNumberOfDesktops),
            AtomEnum::CARDINAL,
            &[workspace_names.len() as u32],
        )?;

        // desktop names are NUL separated and NUL terminated
        let mut names = Vec::new();
        for name in workspace_names {
            names.extend_from_slice(name.as_bytes());
            names.push(0);
        }
        self.conn.change_property8(
            PropMode::REPLACE,
            root,
            self.atom(Atom::NetDesktopNames),
            utf8,
            &names,
        )?;

        self.conn
            .delete_property(root, self.atom(Atom::NetClientList))?;
        self.conn.flush()?;

        Ok(())
    }

    fn flush(&self) {
        if let Err(e) = self.conn.flush() {
            warn!(%e, "unable to flush X connection");
        }
    }

    fn poll_event(&self) -> Result<Option<XEvent>> {
        loop {
            match self.conn.poll_for_event()? {
                None => return Ok(None),
                Some(raw) => {
                    if let Some(event) = self.decode(raw) {
                        return Ok(Some(event));
                    }
                    trace!("dropping unhandled X event");
                }
            }
        }
    }

    fn await_activity(&self, extra_fd: Option<RawFd>) -> Result<()> {
        self.conn.flush()?;

        let mut fds = vec![PollFd::new(
            self.conn.stream().as_raw_fd(),
            PollFlags::POLLIN,
        )];
        if let Some(fd) = extra_fd {
            fds.push(PollFd::new(fd, PollFlags::POLLIN));
        }

        match poll(&mut fds, -1) {
            Ok(_) | Err(Errno::EINTR) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn grab_keys(&self, combos: &[KeyCombo]) -> Result<()> {
        self.conn
            .ungrab_key(Grab::ANY, *self.root, ModMask::ANY)?;

        // NumLock and CapsLock change the modifier state without changing
        // what the user meant, so each grab is registered four times
        let permutations = [
            0,
            modmask::MOD2,
            modmask::LOCK,
            modmask::MOD2 | modmask::LOCK,
        ];

        for combo in combos {
            for extra in permutations {
                self.conn.grab_key(
                    false,
                    *self.root,
                    (combo.mask | extra).into(),
                    combo.code,
                    GrabMode::ASYNC,
                    GrabMode::ASYNC,
                )?;
            }
        }

        self.conn.flush()?;

        Ok(())
    }

    fn grab_buttons(&self, id: Xid) -> Result<()> {
        let mask = u32::from(
            EventMask::BUTTON_PRESS | EventMask::BUTTON_RELEASE | EventMask::POINTER_MOTION,
        ) as u16;

        for button in [BUTTON_MOVE, BUTTON_RESIZE] {
            self.conn.grab_button(
                false,
                *id,
                mask.into(),
                GrabMode::ASYNC,
                GrabMode::ASYNC,
                NONE,
                NONE,
                ButtonIndex::from(button),
                u16::from(ModMask::M4).into(),
            )?;
        }

        Ok(())
    }

    fn keycode_for_keysym(&self, keysym: u32) -> Option<u8> {
        let per = self.keysyms_per_keycode as usize;
        if per == 0 {
            return None;
        }

        for (i, chunk) in self.keysyms.chunks(per).enumerate() {
            if chunk.contains(&keysym) {
                return Some(self.min_keycode + i as u8);
            }
        }

        None
    }

    fn existing_windows(&self) -> Result<Vec<Xid>> {
        let reply = self.conn.query_tree(*self.root)?.reply()?;

        Ok(reply.children.into_iter().map(Xid).collect())
    }

    fn window_attributes(&self, id: Xid) -> Result<WindowAttributes> {
        let attrs = self.conn.get_window_attributes(*id)?.reply()?;

        Ok(WindowAttributes {
            override_redirect: attrs.override_redirect,
            viewable: attrs.map_state == MapState::VIEWABLE,
        })
    }

    fn window_geometry(&self, id: Xid) -> Result<Rect> {
        let geo = self.conn.get_geometry(*id)?.reply()?;

        Ok(Rect::new(geo.x, geo.y, geo.width, geo.height))
    }

    fn window_class(&self, id: Xid) -> Option<(String, String)> {
        let reply = WmClass::get(&self.conn, *id).ok()?.reply_unchecked().ok()??;

        Some((
            String::from_utf8_lossy(reply.instance()).into_owned(),
            String::from_utf8_lossy(reply.class()).into_owned(),
        ))
    }

    fn window_title(&self, id: Xid) -> String {
        self.str_prop(id, self.atom(Atom::NetWmName))
            .or_else(|| self.str_prop(id, self.atom(Atom::WmName)))
            .unwrap_or_default()
    }

    fn window_type_floats(&self, id: Xid) -> bool {
        self.window_has_type_in(id, &self.auto_float_types)
    }

    fn window_is_dock(&self, id: Xid) -> bool {
        self.window_has_type_in(id, &[self.atom(Atom::NetWindowTypeDock)])
    }

    fn window_is_transient(&self, id: Xid) -> bool {
        self.prop_u32s(id, self.atom(Atom::WmTransientFor))
            .map(|v| !v.is_empty())
            .unwrap_or(false)
    }

    fn window_struts(&self, id: Xid) -> Option<[u32; 4]> {
        // prefer the more precise partial property, use the first four
        // values of either
        let vals = self
            .prop_u32s(id, self.atom(Atom::NetWmStrutPartial))
            .filter(|v| v.len() >= 4)
            .or_else(|| {
                self.prop_u32s(id, self.atom(Atom::NetWmStrut))
                    .filter(|v| v.len() >= 4)
            })?;

        Some([vals[0], vals[1], vals[2], vals[3]])
    }

    fn window_desktop(&self, id: Xid) -> Option<u32> {
        self.prop_u32s(id, self.atom(Atom::NetWmDesktop))?
            .first()
            .copied()
    }

    fn window_has_urgency_hint(&self, id: Xid) -> bool {
        WmHints::get(&self.conn, *id)
            .ok()
            .and_then(|cookie| cookie.reply().ok())
            .map(|hints| hints.urgent)
            .unwrap_or(false)
    }

    fn window_demands_attention(&self, id: Xid) -> bool {
        let attention = self.atom(Atom::NetWmStateDemandsAttention);

        self.prop_u32s(id, self.atom(Atom::NetWmState))
            .map(|atoms| atoms.contains(&attention))
            .unwrap_or(false)
    }

    fn supports_delete(&self, id: Xid) -> bool {
        let delete = self.atom(Atom::WmDeleteWindow);

        self.prop_u32s(id, self.atom(Atom::WmProtocols))
            .map(|protos| protos.contains(&delete))
            .unwrap_or(false)
    }

    fn watch_client_events(&self, id: Xid) -> Result<()> {
        let mask =
            EventMask::ENTER_WINDOW | EventMask::STRUCTURE_NOTIFY | EventMask::PROPERTY_CHANGE;
        let aux = ChangeWindowAttributesAux::new().event_mask(mask);
        self.conn.change_window_attributes(*id, &aux)?;

        Ok(())
    }

    fn map_window(&self, id: Xid) -> Result<()> {
        self.conn.map_window(*id)?;

        Ok(())
    }

    fn unmap_window(&self, id: Xid) -> Result<()> {
        self.conn.unmap_window(*id)?;

        Ok(())
    }

    fn position_window(&self, id: Xid, r: Rect, border: u16) -> Result<()> {
        let aux = ConfigureWindowAux::new()
            .x(r.x as i32)
            .y(r.y as i32)
            .width(r.w as u32)
            .height(r.h as u32)
            .border_width(border as u32);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn move_window(&self, id: Xid, x: i16, y: i16) -> Result<()> {
        let aux = ConfigureWindowAux::new().x(x as i32).y(y as i32);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn resize_window(&self, id: Xid, w: u16, h: u16) -> Result<()> {
        let aux = ConfigureWindowAux::new().width(w as u32).height(h as u32);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn raise_window(&self, id: Xid) -> Result<()> {
        let aux = ConfigureWindowAux::new().stack_mode(StackMode::ABOVE);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn set_border_color(&self, id: Xid, color: u32) -> Result<()> {
        let aux = ChangeWindowAttributesAux::new().border_pixel(color);
        self.conn.change_window_attributes(*id, &aux)?;

        Ok(())
    }

    fn set_border_width(&self, id: Xid, width: u16) -> Result<()> {
        let aux = ConfigureWindowAux::new().border_width(width as u32);
        self.conn.configure_window(*id, &aux)?;

        Ok(())
    }

    fn focus_window(&self, id: Xid) -> Result<()> {
        self.conn
            .set_input_focus(InputFocus::PARENT, *id, CURRENT_TIME)?;

        Ok(())
    }

    fn configure_passthrough(&self, req: &ConfigureRequestData) -> Result<()> {
        let mut aux = ConfigureWindowAux::new();

        if req.mask & u16::from(ConfigWindow::X) != 0 {
            aux = aux.x(req.x as i32);
        }
        if req.mask & u16::from(ConfigWindow::Y) != 0 {
            aux = aux.y(req.y as i32);
        }
        if req.mask & u16::from(ConfigWindow::WIDTH) != 0 {
            aux = aux.width(req.w as u32);
        }
        if req.mask & u16::from(ConfigWindow::HEIGHT) != 0 {
            aux = aux.height(req.h as u32);
        }
        if req.mask & u16::from(ConfigWindow::BORDER_WIDTH) != 0 {
            aux = aux.border_width(req.border_width as u32);
        }
        if req.mask & u16::from(ConfigWindow::SIBLING) != 0 {
            aux = aux.sibling(*req.sibling);
        }
        if req.mask & u16::from(ConfigWindow::STACK_MODE) != 0 {
            aux = aux.stack_mode(StackMode::from(req.stack_mode));
        }

        self.conn.configure_window(*req.id, &aux)?;

        Ok(())
    }

    fn send_configure_notify(&self, id: Xid, r: Rect, border: u16) -> Result<()> {
        let event = ConfigureNotifyEvent {
            response_type: CONFIGURE_NOTIFY_EVENT,
            sequence: 0,
            event: *id,
            window: *id,
            above_sibling: NONE,
            x: r.x,
            y: r.y,
            width: r.w,
            height: r.h,
            border_width: border,
            override_redirect: false,
        };
        self.conn
            .send_event(false, *id, EventMask::STRUCTURE_NOTIFY, event)?;

        Ok(())
    }

    fn send_delete(&self, id: Xid) -> Result<()> {
        let event = ClientMessageEvent {
            response_type: CLIENT_MESSAGE_EVENT,
            format: 32,
            sequence: 0,
            window: *id,
            type_: self.atom(Atom::WmProtocols),
            data: [self.atom(Atom::WmDeleteWindow), CURRENT_TIME, 0, 0, 0].into(),
        };
        self.conn
            .send_event(false, *id, EventMask::NO_EVENT, event)?;

        Ok(())
    }

    fn kill_client(&self, id: Xid) -> Result<()> {
        self.conn.kill_client(*id)?;

        Ok(())
    }

    fn clear_urgency_hint(&self, id: Xid) -> Result<()> {
        let hints = WmHints::get(&self.conn, *id)
            .ok()
            .and_then(|cookie| cookie.reply().ok());

        if let Some(mut hints) = hints {
            if hints.urgent {
                hints.urgent = false;
                hints.set(&self.conn, *id)?;
            }
        }

        Ok(())
    }

    fn set_wm_state(&self, id: Xid, state: WmStateHint) -> Result<()> {
        let value = match state {
            WmStateHint::Withdrawn => WM_STATE_WITHDRAWN,
            WmStateHint::Normal => WM_STATE_NORMAL,
            WmStateHint::Iconic => WM_STATE_ICONIC,
        };
        let wm_state = self.atom(Atom::WmState);

        // format is [state, icon-window]
        self.conn
            .change_property32(PropMode::REPLACE, *id, wm_state, wm_state, &[value, NONE])?;

        Ok(())
    }

    fn set_client_list(&self, clients: &[Xid]) -> Result<()> {
        let ids: Vec<u32> = clients.iter().map(|id| **id).collect();
        self.conn.change_property32(
            PropMode::REPLACE,
            *self.root,
            self.atom(Atom::NetClientList),
            AtomEnum::WINDOW,
            &ids,
        )?;

        Ok(())
    }

    fn set_current_desktop(&self, ix: usize) -> Result<()> {
        self.conn.change_property32(
            PropMode::REPLACE,
            *self.root,
            self.atom(Atom::NetCurrentDesktop),
            AtomEnum::CARDINAL,
            &[ix as u32],
        )?;

        Ok(())
    }

    fn set_active_window(&self, id: Option<Xid>) -> Result<()> {
        self.conn.change_property32(
            PropMode::REPLACE,
            *self.root,
            self.atom(Atom::NetActiveWindow),
            AtomEnum::WINDOW,
            &[id.map(|id| *id).unwrap_or(NONE)],
        )?;

        Ok(())
    }

    fn set_client_desktop(&self, id: Xid, ix: usize) -> Result<()> {
        self.conn.change_property32(
            PropMode::REPLACE,
            *id,
            self.atom(Atom::NetWmDesktop),
            AtomEnum::CARDINAL,
            &[ix as u32],
        )?;

        Ok(())
    }
}
