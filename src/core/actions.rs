//! The actions that key bindings and IPC commands can trigger.
//!
//! Actions are plain data rather than closures so that the binding table is
//! a simple map and the same vocabulary can be re-used verbatim by the IPC
//! dispatch.
use crate::{
    core::WindowManager,
    layout::{Layout, Message},
    util::spawn,
    x::XConn,
};
use tracing::{error, info};

/// An operation on the window manager, triggered by a key binding or an IPC
/// command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Run an external command (via `sh -c`, detached)
    Spawn(String),
    /// Gracefully close the focused window
    Kill,
    /// Gracefully close every window on the current workspace
    KillAll,
    FocusNext,
    FocusPrev,
    FocusMaster,
    SwapNext,
    SwapPrev,
    SwapMaster,
    /// Shrink the master area of the current layout
    Shrink,
    /// Expand the master area of the current layout
    Expand,
    IncMaster,
    DecMaster,
    /// Rotate to the next layout in the shared rotation
    NextLayout,
    /// Reset the current workspace back to the default layout
    ResetLayout,
    /// Flip the focused window between floating and tiled
    ToggleFloat,
    /// Push the focused window back into the tiled set
    Sink,
    ToggleScratchpad,
    SwitchWorkspace(usize),
    MoveToWorkspace(usize),
    /// Re-exec the current binary in place
    Restart,
    Quit,
}

impl<X: XConn> WindowManager<X> {
    /// Apply a [KeyAction] to the manager.
    ///
    /// Failures are logged rather than propagated: a broken user action must
    /// never take down the event loop.
    pub(crate) fn run_action(&mut self, action: &KeyAction) {
        use KeyAction::*;

        let res = match action {
            Spawn(cmd) => {
                if let Err(e) = spawn(cmd) {
                    error!(%cmd, %e, "unable to spawn command");
                }
                Ok(())
            }
            Kill => self.kill_focused(),
            KillAll => self.kill_all(),
            FocusNext => self.focus_next(),
            FocusPrev => self.focus_prev(),
            FocusMaster => self.focus_master(),
            SwapNext => self.swap_next(),
            SwapPrev => self.swap_prev(),
            SwapMaster => self.swap_master(),
            Shrink => self.send_layout_message(Message::Shrink),
            Expand => self.send_layout_message(Message::Expand),
            IncMaster => self.send_layout_message(Message::IncMaster),
            DecMaster => self.send_layout_message(Message::DecMaster),
            NextLayout => self.next_layout(),
            ResetLayout => self.set_layout(Layout::default()),
            ToggleFloat => self.toggle_float(),
            Sink => self.sink_focused(),
            ToggleScratchpad => self.toggle_scratchpad(),
            SwitchWorkspace(n) => self.switch_workspace(*n),
            MoveToWorkspace(n) => self.move_focused_to_workspace(*n),
            Restart => {
                info!("restart requested");
                self.exit(true);
                Ok(())
            }
            Quit => {
                info!("quit requested");
                self.exit(false);
                Ok(())
            }
        };

        if let Err(e) = res {
            error!(?action, %e, "error running action");
        }
    }
}
