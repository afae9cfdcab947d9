//! Mouse-driven move and resize of floating windows.
use crate::{
    core::{
        bindings::{modmask, BUTTON_MOVE, BUTTON_RESIZE},
        WindowManager,
    },
    pure::Rect,
    x::{event::ButtonPressData, XConn},
    Result, Xid,
};
use tracing::debug;

/// Resizes snap to this floor in both dimensions.
const MIN_DRAG_SIZE: u16 = 100;

/// An in-progress pointer drag. At most one exists at a time.
#[derive(Debug, Clone, Copy)]
pub struct DragState {
    pub window: Xid,
    /// Pointer position when the drag started
    pub start_x: i16,
    pub start_y: i16,
    /// Window geometry when the drag started
    pub start: Rect,
    /// true = resize (button 3), false = move (button 1)
    pub resizing: bool,
}

impl<X: XConn> WindowManager<X> {
    /// Begin a drag on `Mod+Button1` (move) or `Mod+Button3` (resize).
    ///
    /// A tiled target is promoted to floating first so it can leave the
    /// layout.
    pub(crate) fn handle_button_press(&mut self, data: ButtonPressData) -> Result<()> {
        let ButtonPressData {
            id, button, mask, ..
        } = data;

        if !self.clients.contains_key(&id) {
            return Ok(());
        }

        if let Some(c) = self.clients.get_mut(&id) {
            if !c.floating {
                c.floating = true;
                self.tile()?;
            }
        }

        self.focus(id)?;

        if mask & modmask::MOD4 == 0 || !matches!(button, BUTTON_MOVE | BUTTON_RESIZE) {
            return Ok(());
        }

        let start = match self.x.window_geometry(id) {
            Ok(r) => r,
            Err(_) => return Ok(()),
        };

        debug!(%id, resizing = button == BUTTON_RESIZE, "starting drag");
        self.drag = Some(DragState {
            window: id,
            start_x: data.root_x,
            start_y: data.root_y,
            start,
            resizing: button == BUTTON_RESIZE,
        });

        self.x.raise_window(id)
    }

    /// Recompute geometry from the drag anchor plus the pointer delta.
    pub(crate) fn handle_motion(&mut self, root_x: i16, root_y: i16) -> Result<()> {
        let Some(drag) = self.drag else {
            return Ok(());
        };

        let dx = root_x - drag.start_x;
        let dy = root_y - drag.start_y;

        if drag.resizing {
            let w = (drag.start.w as i32 + dx as i32).max(MIN_DRAG_SIZE as i32) as u16;
            let h = (drag.start.h as i32 + dy as i32).max(MIN_DRAG_SIZE as i32) as u16;
            self.x.resize_window(drag.window, w, h)
        } else {
            let x = drag.start.x + dx;
            let y = drag.start.y + dy;
            self.x.move_window(drag.window, x, y)
        }
    }

    /// End the drag, reading the final geometry back into the client record.
    pub(crate) fn handle_button_release(&mut self) -> Result<()> {
        let Some(drag) = self.drag.take() else {
            return Ok(());
        };

        debug!(window = %drag.window, "drag finished");
        if let Ok(r) = self.x.window_geometry(drag.window) {
            if let Some(c) = self.clients.get_mut(&drag.window) {
                c.geometry = r;
            }
        }

        Ok(())
    }
}
