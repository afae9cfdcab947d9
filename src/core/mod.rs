//! The window-management state machine.
//!
//! [WindowManager] owns every piece of mutable state (workspaces, the client
//! registry, focus, struts, the drag and scratchpad state) and is the only
//! place where the invariants tying them together are maintained: a focused
//! client is always a member of its workspace's list, a client is in exactly
//! one workspace list and the registry, and the EWMH mirror is rewritten
//! after every state change.
use crate::{
    core::{
        actions::KeyAction,
        bindings::KeyCombo,
        config::Config,
        drag::DragState,
        rules::apply_rules,
        scratchpad::Scratchpad,
    },
    ipc::{self, IpcServer},
    layout::{Layout, Message},
    pure::{Rect, Workspace},
    util::spawn,
    x::{
        event::{ClientMessageKind, ConfigureRequestData, PropertyKind, StateAction, XEvent},
        WmStateHint, XConn,
    },
    Result, Xid,
};
use nix::sys::signal::{signal, SigHandler, Signal};
use std::collections::HashMap;
use tracing::{debug, error, info, trace, warn};

pub mod actions;
pub mod bindings;
pub mod config;
pub mod drag;
pub mod rules;
pub mod scratchpad;

/// The name advertised through _NET_WM_NAME on the check window.
pub const WM_NAME: &str = "oxwm";

/// A managed top-level window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Client {
    pub id: Xid,
    /// Last committed geometry, excluding the border
    pub geometry: Rect,
    /// Whether the window is currently mapped on the server
    pub mapped: bool,
    /// Floating clients are excluded from tiling and keep free geometry
    pub floating: bool,
    /// Set while the client holds _NET_WM_STATE_FULLSCREEN
    pub fullscreen: bool,
    /// Index of the workspace owning this client
    pub workspace: usize,
    /// Latched attention flag, cleared on focus
    pub urgent: bool,
}

/// How the main loop finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitAction {
    Quit,
    Restart,
}

/// The window manager: owner of all state and sole mutator of the
/// cross-component invariants.
pub struct WindowManager<X: XConn> {
    pub(crate) x: X,
    pub(crate) config: Config,
    bindings: HashMap<KeyCombo, KeyAction>,
    pub(crate) workspaces: Vec<Workspace>,
    pub(crate) current: usize,
    pub(crate) clients: HashMap<Xid, Client>,
    pub(crate) focused: Option<Xid>,
    layouts: Vec<Layout>,
    pub(crate) struts: [u32; 4],
    pub(crate) scratchpad: Scratchpad,
    pub(crate) drag: Option<DragState>,
    pub(crate) screen: Rect,
    running: bool,
    restart: bool,
}

impl<X: XConn> WindowManager<X> {
    pub fn new(x: X, config: Config) -> Self {
        let screen = x.screen_rect();
        let workspaces = config
            .workspace_names
            .iter()
            .enumerate()
            .map(|(i, name)| Workspace::new(i, name.clone()))
            .collect();
        let scratchpad = config.scratchpad.clone();

        Self {
            x,
            config,
            bindings: HashMap::new(),
            workspaces,
            current: 0,
            clients: HashMap::new(),
            focused: None,
            layouts: Layout::all(),
            struts: [0; 4],
            scratchpad,
            drag: None,
            screen,
            running: true,
            restart: false,
        }
    }

    /// Claim the root window, advertise EWMH support, grab bindings, adopt
    /// existing windows and enter the event loop.
    ///
    /// Returns whether the process should exit or re-exec itself.
    pub fn run(&mut self, mut ipc: Option<&mut IpcServer>) -> Result<ExitAction> {
        // children are fully detached; never collect them
        if let Err(e) = unsafe { signal(Signal::SIGCHLD, SigHandler::SigIgn) } {
            warn!(%e, "unable to ignore SIGCHLD");
        }

        self.init()?;
        info!(screen = ?self.screen, "{WM_NAME} is running");

        while self.running {
            if let Some(srv) = ipc.as_deref_mut() {
                while let Some(stream) = srv.try_accept() {
                    ipc::handle_connection(stream, self);
                }
            }

            while let Some(event) = self.x.poll_event()? {
                trace!(%event, "handling event");
                if let Err(e) = self.handle_event(event) {
                    error!(%e, "error handling event");
                }
                if !self.running {
                    break;
                }
            }

            if !self.running {
                break;
            }

            self.x.flush();
            self.x.await_activity(ipc.as_deref().map(|s| s.raw_fd()))?;
        }

        Ok(if self.restart {
            ExitAction::Restart
        } else {
            ExitAction::Quit
        })
    }

    fn init(&mut self) -> Result<()> {
        self.x.become_wm()?;
        self.x.init_ewmh(WM_NAME, &self.config.workspace_names)?;

        let grabbed = self.resolve_bindings();
        self.x.grab_keys(&grabbed)?;

        self.scan()?;
        self.update_struts()?;
        self.tile()?;
        self.x.set_current_desktop(self.current)?;
        self.update_client_list()?;

        for cmd in self.config.autostart.clone() {
            if let Err(e) = spawn(&cmd) {
                warn!(%cmd, %e, "unable to run autostart command");
            }
        }

        Ok(())
    }

    /// Resolve the configured keysym bindings against the server's keyboard
    /// mapping, returning the combos to grab.
    fn resolve_bindings(&mut self) -> Vec<KeyCombo> {
        let mut grabbed = Vec::with_capacity(self.config.keys.len());

        for spec in &self.config.keys {
            match self.x.keycode_for_keysym(spec.keysym) {
                Some(code) => {
                    let combo = KeyCombo::new(spec.mask, code).cleaned();
                    self.bindings.insert(combo, spec.action.clone());
                    grabbed.push(combo);
                }
                None => warn!(keysym = spec.keysym, "no keycode for bound keysym"),
            }
        }

        grabbed
    }

    /// Adopt pre-existing windows, typically after a restart.
    ///
    /// A window's _NET_WM_DESKTOP (written by us before the re-exec) wins
    /// over rule-assigned workspaces.
    fn scan(&mut self) -> Result<()> {
        for id in self.x.existing_windows()? {
            let Ok(attrs) = self.x.window_attributes(id) else {
                continue;
            };
            if attrs.override_redirect || !attrs.viewable || self.x.window_is_dock(id) {
                continue;
            }

            let hint = self
                .x
                .window_desktop(id)
                .map(|d| d as usize)
                .filter(|&d| d < self.workspaces.len());

            self.manage_client(id, hint)?;
        }

        Ok(())
    }

    // Event dispatch

    pub(crate) fn handle_event(&mut self, event: XEvent) -> Result<()> {
        use XEvent::*;

        match event {
            MapRequest(id) => self.handle_map_request(id),
            UnmapNotify { id, from_root } => self.handle_unmap_notify(id, from_root),
            Destroy(id) => self.handle_destroy(id),
            ConfigureRequest(req) => self.handle_configure_request(req),
            RootResize(r) => {
                self.screen = r;
                self.tile()
            }
            KeyPress(combo) => {
                if let Some(action) = self.bindings.get(&combo.cleaned()).cloned() {
                    self.run_action(&action);
                }
                Ok(())
            }
            Enter(id) => self.handle_enter(id),
            ButtonPress(data) => self.handle_button_press(data),
            ButtonRelease => self.handle_button_release(),
            Motion { root_x, root_y } => self.handle_motion(root_x, root_y),
            PropertyNotify { id, kind } => self.handle_property_notify(id, kind),
            ClientMessage { id, kind } => self.handle_client_message(id, kind),
        }
    }

    fn handle_map_request(&mut self, id: Xid) -> Result<()> {
        let Ok(attrs) = self.x.window_attributes(id) else {
            return Ok(());
        };
        if attrs.override_redirect {
            return Ok(());
        }

        self.x.map_window(id)?;

        // docks are left unmanaged but reserve screen space
        if self.x.window_is_dock(id) {
            debug!(%id, "dock window mapped");
            self.update_struts()?;
            return self.tile();
        }

        if self.scratchpad.window() == Some(id) {
            return Ok(());
        }
        if let Some((_, class)) = self.x.window_class(id) {
            if self.scratchpad.wants(&class) {
                return self.adopt_scratchpad(id);
            }
        }

        self.manage(id)
    }

    fn handle_unmap_notify(&mut self, id: Xid, from_root: bool) -> Result<()> {
        // synthetic withdraws are sent against the window itself
        if !from_root || !self.clients.contains_key(&id) {
            return Ok(());
        }

        if self.x.window_attributes(id).is_err() {
            debug!(%id, "unmapped window is gone, unmanaging");
            return self.unmanage(id);
        }

        if let Some(c) = self.clients.get_mut(&id) {
            c.mapped = false;
        }

        Ok(())
    }

    fn handle_destroy(&mut self, id: Xid) -> Result<()> {
        if self.scratchpad_destroyed(id) {
            return Ok(());
        }

        self.unmanage(id)
    }

    /// Tiled clients do not get to pick their own geometry but are owed a
    /// synthetic ConfigureNotify carrying the truth; everyone else is
    /// honoured verbatim.
    fn handle_configure_request(&mut self, req: ConfigureRequestData) -> Result<()> {
        match self.clients.get(&req.id) {
            Some(c) if !c.floating => {
                self.x
                    .send_configure_notify(req.id, c.geometry, self.config.border_width)
            }
            _ => self.x.configure_passthrough(&req),
        }
    }

    fn handle_enter(&mut self, id: Xid) -> Result<()> {
        if !self.config.focus_follows_mouse {
            return Ok(());
        }

        match self.clients.get(&id) {
            Some(c) if c.workspace == self.current => self.focus(id),
            _ => Ok(()),
        }
    }

    fn handle_property_notify(&mut self, id: Xid, kind: PropertyKind) -> Result<()> {
        match kind {
            PropertyKind::Hints => self.refresh_urgency(id),
            PropertyKind::NetWmState => {
                if self.x.window_demands_attention(id) && self.focused != Some(id) {
                    self.set_urgent(id, true)
                } else {
                    Ok(())
                }
            }
            PropertyKind::Other => Ok(()),
        }
    }

    fn handle_client_message(&mut self, id: Xid, kind: ClientMessageKind) -> Result<()> {
        match kind {
            ClientMessageKind::CurrentDesktop(n) => self.switch_workspace(n),
            ClientMessageKind::ActiveWindow => {
                let Some(ws) = self.clients.get(&id).map(|c| c.workspace) else {
                    return Ok(());
                };
                if ws != self.current {
                    self.switch_workspace(ws)?;
                }
                self.focus(id)
            }
            ClientMessageKind::CloseWindow => {
                if self.clients.contains_key(&id) {
                    self.close_window(id)
                } else {
                    Ok(())
                }
            }
            ClientMessageKind::Fullscreen(action) => {
                let enable = match action {
                    StateAction::Add => true,
                    StateAction::Remove => false,
                    StateAction::Toggle => {
                        !self.clients.get(&id).map(|c| c.fullscreen).unwrap_or(false)
                    }
                };
                self.set_fullscreen(id, enable)
            }
            ClientMessageKind::Other => Ok(()),
        }
    }

    // Manage / unmanage

    /// Bring a new window under management.
    pub fn manage(&mut self, id: Xid) -> Result<()> {
        self.manage_client(id, None)
    }

    fn manage_client(&mut self, id: Xid, desktop_hint: Option<usize>) -> Result<()> {
        if self.clients.contains_key(&id) {
            return Ok(());
        }

        let geometry = match self.x.window_geometry(id) {
            Ok(r) => r,
            Err(e) => {
                warn!(%id, %e, "unable to read geometry for new window");
                return Ok(());
            }
        };

        let (instance, class) = self.x.window_class(id).unwrap_or_default();
        let title = self.x.window_title(id);
        let outcome = apply_rules(&self.config.rules, &class, &instance, &title);

        let floating = outcome.floating
            || self.x.window_type_floats(id)
            || self.x.window_is_transient(id);

        let target = desktop_hint
            .or(outcome.workspace)
            .filter(|&n| n < self.workspaces.len())
            .unwrap_or(self.current);

        debug!(%id, %class, floating, target, "managing new client");

        self.register_client(id, geometry, floating, target);
        self.x.watch_client_events(id)?;
        self.x.set_border_color(id, self.config.unfocused_border)?;
        self.x.set_border_width(id, self.config.border_width)?;
        self.x.grab_buttons(id)?;

        self.workspaces[target].add(id);

        if target == self.current {
            self.x.set_wm_state(id, WmStateHint::Normal)?;
        } else {
            // rule-assigned to a hidden workspace: put it away immediately
            self.x.unmap_window(id)?;
            self.x.set_wm_state(id, WmStateHint::Iconic)?;
            if let Some(c) = self.clients.get_mut(&id) {
                c.mapped = false;
            }
            self.workspaces[target].focus_client(id);
        }

        self.x.set_client_desktop(id, target)?;
        self.tile()?;
        if target == self.current {
            self.focus(id)?;
        }

        self.update_client_list()
    }

    pub(crate) fn register_client(
        &mut self,
        id: Xid,
        geometry: Rect,
        floating: bool,
        workspace: usize,
    ) {
        self.clients.insert(
            id,
            Client {
                id,
                geometry,
                mapped: true,
                floating,
                fullscreen: false,
                workspace,
                urgent: false,
            },
        );
    }

    /// Forget a window: drop it from its workspace and the registry and
    /// re-focus whatever its workspace offers next.
    pub fn unmanage(&mut self, id: Xid) -> Result<()> {
        let Some(ws) = self.clients.get(&id).map(|c| c.workspace) else {
            return Ok(());
        };

        debug!(%id, "unmanaging client");
        self.workspaces[ws].remove(id);
        self.clients.remove(&id);

        // best effort: the window may already be gone
        let _ = self.x.set_wm_state(id, WmStateHint::Withdrawn);

        if self.focused == Some(id) {
            self.focused = None;
            match self.workspaces[ws].focused() {
                Some(next) => self.focus(next)?,
                None => self.x.set_active_window(None)?,
            }
        }

        self.tile()?;
        self.update_client_list()
    }

    // Focus

    /// The sole entry point for moving input focus.
    pub fn focus(&mut self, id: Xid) -> Result<()> {
        if !self.clients.contains_key(&id) {
            return Ok(());
        }

        if let Some(prev) = self.focused.filter(|&p| p != id) {
            if let Some(pc) = self.clients.get(&prev) {
                let color = if pc.urgent {
                    self.config.urgent_border
                } else {
                    self.config.unfocused_border
                };
                self.x.set_border_color(prev, color)?;
            }
        }

        let (workspace, was_urgent) = match self.clients.get_mut(&id) {
            Some(c) => {
                let was = c.urgent;
                c.urgent = false;
                (c.workspace, was)
            }
            None => return Ok(()),
        };

        // urgency never survives focus, in memory or on the wire
        if was_urgent {
            self.x.clear_urgency_hint(id)?;
        }

        self.x.focus_window(id)?;
        self.x.set_border_color(id, self.config.focused_border)?;
        self.x.raise_window(id)?;

        self.focused = Some(id);
        self.workspaces[workspace].focus_client(id);

        self.x.set_active_window(Some(id))
    }

    pub fn focus_next(&mut self) -> Result<()> {
        match self.workspaces[self.current].focus_next() {
            Some(id) => self.focus(id),
            None => Ok(()),
        }
    }

    pub fn focus_prev(&mut self) -> Result<()> {
        match self.workspaces[self.current].focus_prev() {
            Some(id) => self.focus(id),
            None => Ok(()),
        }
    }

    pub fn focus_master(&mut self) -> Result<()> {
        match self.workspaces[self.current].focus_master() {
            Some(id) => self.focus(id),
            None => Ok(()),
        }
    }

    // Tiling

    /// Re-run the current workspace's layout and commit the resulting
    /// geometry.
    pub fn tile(&mut self) -> Result<()> {
        let ws = &self.workspaces[self.current];
        let clients = &self.clients;
        let tiled =
            ws.tiled_clients(|id| clients.get(&id).map(|c| c.floating).unwrap_or(true));

        let fullscreen: Vec<Xid> = ws
            .clients()
            .copied()
            .filter(|id| clients.get(id).map(|c| c.fullscreen).unwrap_or(false))
            .collect();

        let area = self.usable_area();
        let rects = ws.layout.arrange(tiled.len(), area);

        // under a monocle only the visible window needs a configure; the
        // obscured ones stay mapped with stale geometry
        let visible = if ws.layout.is_monocle() {
            ws.focused().or_else(|| tiled.first().copied())
        } else {
            None
        };

        let gap = self.config.gap;
        let bw = self.config.border_width;

        let mut commits = Vec::with_capacity(tiled.len());
        for (&id, r) in tiled.iter().zip(rects) {
            if let Some(v) = visible {
                if id != v {
                    continue;
                }
            }

            let r = r.shrink(gap);
            let mut w = r.w;
            let mut h = r.h;
            if w > 2 * bw {
                w -= 2 * bw;
            }
            if h > 2 * bw {
                h -= 2 * bw;
            }

            commits.push((id, Rect::new(r.x, r.y, w, h)));
        }

        for (id, r) in commits {
            if let Some(c) = self.clients.get_mut(&id) {
                c.geometry = r;
            }
            self.x.position_window(id, r, bw)?;
        }

        // fullscreen clients cover the whole screen, struts and all
        let screen = self.screen;
        for id in fullscreen {
            self.x.position_window(id, screen, 0)?;
        }

        Ok(())
    }

    /// The screen minus struts and the outer gap.
    fn usable_area(&self) -> Rect {
        let gap = self.config.gap;
        let [left, right, top, bottom] = self.struts;

        Rect::new(
            self.screen.x + gap as i16 + left as i16,
            self.screen.y + gap as i16 + top as i16,
            self.screen
                .w
                .saturating_sub(2 * gap)
                .saturating_sub(left as u16 + right as u16),
            self.screen
                .h
                .saturating_sub(2 * gap)
                .saturating_sub(top as u16 + bottom as u16),
        )
    }

    // Workspaces

    /// Hide the current workspace and show workspace `n`.
    pub fn switch_workspace(&mut self, n: usize) -> Result<()> {
        if n >= self.workspaces.len() || n == self.current {
            return Ok(());
        }

        let hide: Vec<Xid> = self.workspaces[self.current].clients().copied().collect();
        for id in hide {
            self.x.unmap_window(id)?;
            self.x.set_wm_state(id, WmStateHint::Iconic)?;
            if let Some(c) = self.clients.get_mut(&id) {
                c.mapped = false;
            }
        }

        self.current = n;

        let show: Vec<Xid> = self.workspaces[n].clients().copied().collect();
        for id in show {
            self.x.map_window(id)?;
            self.x.set_wm_state(id, WmStateHint::Normal)?;
            if let Some(c) = self.clients.get_mut(&id) {
                c.mapped = true;
            }
        }

        self.tile()?;

        match self.workspaces[n].focused().or_else(|| self.workspaces[n].first()) {
            Some(id) => self.focus(id)?,
            None => {
                self.focused = None;
                self.x.set_active_window(None)?;
            }
        }

        self.x.set_current_desktop(n)?;
        info!(workspace = n + 1, "switched workspace");

        Ok(())
    }

    /// Move a client to workspace `n`, hiding it if `n` is not visible.
    pub fn move_to_workspace(&mut self, id: Xid, n: usize) -> Result<()> {
        if n >= self.workspaces.len() {
            return Ok(());
        }
        let Some(source) = self.clients.get(&id).map(|c| c.workspace) else {
            return Ok(());
        };
        if n == source {
            return Ok(());
        }

        self.workspaces[source].remove(id);
        self.workspaces[n].add(id);
        if let Some(c) = self.clients.get_mut(&id) {
            c.workspace = n;
        }

        self.x.set_client_desktop(id, n)?;

        if n != self.current {
            self.x.unmap_window(id)?;
            self.x.set_wm_state(id, WmStateHint::Iconic)?;
            if let Some(c) = self.clients.get_mut(&id) {
                c.mapped = false;
            }
        }

        if self.focused == Some(id) {
            self.focused = None;
            match self.workspaces[source]
                .focused()
                .or_else(|| self.workspaces[source].first())
            {
                Some(next) => self.focus(next)?,
                None => self.x.set_active_window(None)?,
            }
        }

        info!(%id, workspace = n + 1, "moved window to workspace");
        self.tile()
    }

    pub fn move_focused_to_workspace(&mut self, n: usize) -> Result<()> {
        match self.focused {
            Some(id) => self.move_to_workspace(id, n),
            None => Ok(()),
        }
    }

    // Stack order

    pub fn swap_next(&mut self) -> Result<()> {
        self.workspaces[self.current].swap_next();
        self.tile()
    }

    pub fn swap_prev(&mut self) -> Result<()> {
        self.workspaces[self.current].swap_prev();
        self.tile()
    }

    pub fn swap_master(&mut self) -> Result<()> {
        self.workspaces[self.current].swap_master();
        self.tile()
    }

    // Layouts

    pub fn send_layout_message(&mut self, m: Message) -> Result<()> {
        self.workspaces[self.current].handle_message(m);
        self.tile()
    }

    /// Rotate the current workspace to the next layout, sinking any
    /// floating clients back into the tiled set first.
    pub fn next_layout(&mut self) -> Result<()> {
        self.sink_workspace_clients();
        let layouts = self.layouts.clone();
        self.workspaces[self.current].next_layout(&layouts);
        self.announce_layout();
        self.tile()
    }

    /// Replace the current workspace's layout, sinking floating clients.
    pub fn set_layout(&mut self, layout: Layout) -> Result<()> {
        self.sink_workspace_clients();
        self.workspaces[self.current].layout = layout;
        self.announce_layout();
        self.tile()
    }

    pub fn current_layout_name(&self) -> &'static str {
        self.workspaces[self.current].layout.name()
    }

    fn sink_workspace_clients(&mut self) {
        let ids: Vec<Xid> = self.workspaces[self.current].clients().copied().collect();
        for id in ids {
            if let Some(c) = self.clients.get_mut(&id) {
                c.floating = false;
                c.fullscreen = false;
            }
        }
    }

    fn announce_layout(&self) {
        info!(layout = self.current_layout_name(), "layout changed");
    }

    // Floating

    pub fn toggle_float(&mut self) -> Result<()> {
        let Some(id) = self.focused else {
            return Ok(());
        };
        if let Some(c) = self.clients.get_mut(&id) {
            c.floating = !c.floating;
            if !c.floating {
                c.fullscreen = false;
            }
        }

        self.tile()
    }

    pub fn float_focused(&mut self) -> Result<()> {
        let Some(id) = self.focused else {
            return Ok(());
        };
        if let Some(c) = self.clients.get_mut(&id) {
            c.floating = true;
        }

        self.tile()
    }

    pub fn sink_focused(&mut self) -> Result<()> {
        let Some(id) = self.focused else {
            return Ok(());
        };
        match self.clients.get_mut(&id) {
            Some(c) if c.floating => {
                c.floating = false;
                c.fullscreen = false;
                self.tile()
            }
            _ => Ok(()),
        }
    }

    // Fullscreen

    /// Apply or remove fullscreen state.
    ///
    /// Entering marks the client floating and covers the whole screen with
    /// no border; leaving re-tiles it. The pre-fullscreen floating flag is
    /// not preserved.
    pub fn set_fullscreen(&mut self, id: Xid, enable: bool) -> Result<()> {
        let screen = self.screen;
        let bw = self.config.border_width;

        let Some(c) = self.clients.get_mut(&id) else {
            return Ok(());
        };

        if enable {
            c.floating = true;
            c.fullscreen = true;
            c.geometry = screen;
            self.x.position_window(id, screen, 0)?;
        } else {
            c.floating = false;
            c.fullscreen = false;
            self.x.set_border_width(id, bw)?;
        }

        self.tile()
    }

    // Closing windows

    /// Gracefully close the focused client.
    pub fn kill_focused(&mut self) -> Result<()> {
        match self.focused {
            Some(id) => self.close_window(id),
            None => Ok(()),
        }
    }

    /// Gracefully close every client on the current workspace.
    pub fn kill_all(&mut self) -> Result<()> {
        let ids: Vec<Xid> = self.workspaces[self.current].clients().copied().collect();
        for id in ids {
            self.close_window(id)?;
        }

        Ok(())
    }

    /// WM_DELETE_WINDOW when the client speaks it, KillClient otherwise.
    pub fn close_window(&mut self, id: Xid) -> Result<()> {
        if self.x.supports_delete(id) {
            self.x.send_delete(id)
        } else {
            self.x.kill_client(id)
        }
    }

    // Urgency

    /// Re-read the WM_HINTS urgency bit for a client (latched on the
    /// in-memory record; the focused window never latches).
    fn refresh_urgency(&mut self, id: Xid) -> Result<()> {
        if self.focused == Some(id) {
            return Ok(());
        }

        let urgent = self.x.window_has_urgency_hint(id);
        self.set_urgent(id, urgent)
    }

    fn set_urgent(&mut self, id: Xid, urgent: bool) -> Result<()> {
        let Some(c) = self.clients.get_mut(&id) else {
            return Ok(());
        };
        if c.urgent == urgent {
            return Ok(());
        }

        debug!(%id, urgent, "urgency changed");
        c.urgent = urgent;
        let color = if urgent {
            self.config.urgent_border
        } else {
            self.config.unfocused_border
        };

        self.x.set_border_color(id, color)
    }

    // Struts

    /// Recompute the reserved screen edges from every window declaring
    /// struts.
    pub fn update_struts(&mut self) -> Result<()> {
        let mut struts = [0u32; 4];

        for id in self.x.existing_windows()? {
            if let Some(s) = self.x.window_struts(id) {
                for (acc, v) in struts.iter_mut().zip(s) {
                    *acc = (*acc).max(v);
                }
            }
        }

        debug!(?struts, "struts updated");
        self.struts = struts;

        Ok(())
    }

    // EWMH mirror

    fn update_client_list(&mut self) -> Result<()> {
        let mut ids: Vec<Xid> = self
            .workspaces
            .iter()
            .flat_map(|ws| ws.clients().copied().collect::<Vec<_>>())
            .collect();
        if let Some(sp) = self.scratchpad.window() {
            ids.push(sp);
        }

        self.x.set_client_list(&ids)
    }

    // Lifecycle

    pub(crate) fn exit(&mut self, restart: bool) {
        self.running = false;
        self.restart = restart;
    }
}
