//! A singleton floating terminal that can be toggled over any workspace.
use crate::{
    core::WindowManager,
    util::spawn,
    x::{WmStateHint, XConn},
    Result, Xid,
};
use tracing::{debug, info, warn};

/// The scratchpad: one lazily spawned window identified by WM_CLASS, shown
/// centred over the current workspace or hidden, never tiled and never part
/// of a workspace client list.
#[derive(Debug, Clone)]
pub struct Scratchpad {
    /// Command used to spawn the window when it does not exist yet
    pub command: String,
    /// WM_CLASS value identifying the scratchpad window when it maps
    pub class: String,
    /// Width as a percentage of the screen
    pub width_pct: u16,
    /// Height as a percentage of the screen
    pub height_pct: u16,

    window: Option<Xid>,
    visible: bool,
}

impl Default for Scratchpad {
    fn default() -> Self {
        Self::new("kitty --class scratchpad", "scratchpad", 70, 60)
    }
}

impl Scratchpad {
    pub fn new(
        command: impl Into<String>,
        class: impl Into<String>,
        width_pct: u16,
        height_pct: u16,
    ) -> Self {
        Self {
            command: command.into(),
            class: class.into(),
            width_pct,
            height_pct,
            window: None,
            visible: false,
        }
    }

    pub fn window(&self) -> Option<Xid> {
        self.window
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Whether a newly mapped window with this WM_CLASS should be adopted.
    pub fn wants(&self, class: &str) -> bool {
        self.window.is_none() && class.eq_ignore_ascii_case(&self.class)
    }
}

impl<X: XConn> WindowManager<X> {
    /// Toggle the scratchpad: spawn it on first use, otherwise flip its
    /// visibility.
    pub fn toggle_scratchpad(&mut self) -> Result<()> {
        // a bound window may have died without us noticing
        if let Some(id) = self.scratchpad.window {
            if self.x.window_attributes(id).is_err() {
                debug!(%id, "bound scratchpad window no longer exists");
                self.scratchpad.window = None;
                self.scratchpad.visible = false;
                self.clients.remove(&id);
            }
        }

        match self.scratchpad.window {
            None => {
                info!(cmd = %self.scratchpad.command, "spawning scratchpad");
                if let Err(e) = spawn(&self.scratchpad.command) {
                    warn!(%e, "unable to spawn scratchpad command");
                }
                Ok(())
            }
            Some(id) if self.scratchpad.visible => {
                self.x.unmap_window(id)?;
                self.x.set_wm_state(id, WmStateHint::Iconic)?;
                self.scratchpad.visible = false;
                if let Some(c) = self.clients.get_mut(&id) {
                    c.mapped = false;
                }
                Ok(())
            }
            Some(id) => self.show_scratchpad(id),
        }
    }

    /// Adopt a freshly mapped window as the scratchpad.
    ///
    /// The window joins the client registry as a permanently floating
    /// client but is not added to any workspace list.
    pub(crate) fn adopt_scratchpad(&mut self, id: Xid) -> Result<()> {
        let geometry = match self.x.window_geometry(id) {
            Ok(r) => r,
            Err(e) => {
                warn!(%id, %e, "unable to read scratchpad geometry");
                return Ok(());
            }
        };

        debug!(%id, "binding scratchpad window");
        self.scratchpad.window = Some(id);
        self.register_client(id, geometry, true, self.current);
        self.x.watch_client_events(id)?;
        self.x.set_border_width(id, self.config.border_width)?;
        self.x.grab_buttons(id)?;

        self.show_scratchpad(id)
    }

    /// Drop the binding when the scratchpad window is destroyed.
    pub(crate) fn scratchpad_destroyed(&mut self, id: Xid) -> bool {
        if self.scratchpad.window != Some(id) {
            return false;
        }

        debug!(%id, "scratchpad window destroyed");
        self.scratchpad.window = None;
        self.scratchpad.visible = false;
        self.clients.remove(&id);

        true
    }

    fn show_scratchpad(&mut self, id: Xid) -> Result<()> {
        let r = self
            .screen
            .scale_w(self.scratchpad.width_pct as f64 / 100.0)
            .scale_h(self.scratchpad.height_pct as f64 / 100.0)
            .centered_in(&self.screen)
            .unwrap_or(self.screen);

        if let Some(c) = self.clients.get_mut(&id) {
            c.geometry = r;
            c.mapped = true;
        }

        self.x.position_window(id, r, self.config.border_width)?;
        self.x.raise_window(id)?;
        self.x.map_window(id)?;
        self.x.set_wm_state(id, WmStateHint::Normal)?;
        self.scratchpad.visible = true;
        self.focus(id)
    }
}
