//! oxwm :: a tiling window manager for X11 in the style of dwm and xmonad
//!
//! oxwm manages a single screen split into nine virtual workspaces, each with
//! an independent client list and layout. Clients are arranged by one of six
//! tiling algorithms (see [layout]) unless they are floating, in which case
//! they keep whatever geometry they asked for. ICCCM and EWMH properties are
//! kept in sync so that external panels and pagers work out of the box, and a
//! small line protocol over a unix socket (see [ipc]) exposes the same
//! operations that are reachable from the keyboard.
//!
//! The window-management core ([core::WindowManager]) is written against the
//! [x::XConn] trait rather than a concrete X library, keeping the state
//! machine testable without a running X server. The only production backend
//! is [x11rb::X11rbConnection].
use std::{fmt, ops::Deref};

pub mod core;
pub mod ipc;
pub mod layout;
pub mod pure;
pub mod util;
pub mod x;
pub mod x11rb;

/// An X11 resource ID.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Clone, Copy)]
pub struct Xid(pub(crate) u32);

impl fmt::Display for Xid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Deref for Xid {
    type Target = u32;

    fn deref(&self) -> &u32 {
        &self.0
    }
}

impl From<u32> for Xid {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<Xid> for u32 {
    fn from(id: Xid) -> Self {
        id.0
    }
}

/// Ways in which oxwm can fail at runtime.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Unable to establish a connection to the X server
    #[error(transparent)]
    Connect(#[from] ::x11rb::errors::ConnectError),

    /// The underlying connection to the X server failed
    #[error(transparent)]
    Connection(#[from] ::x11rb::errors::ConnectionError),

    /// Could not get the reply for an X request
    #[error(transparent)]
    Reply(#[from] ::x11rb::errors::ReplyError),

    /// Could not get the reply for an X request or generate a resource id
    #[error(transparent)]
    ReplyOrId(#[from] ::x11rb::errors::ReplyOrIdError),

    /// Another window manager already holds substructure redirect on the root
    #[error("another window manager is already running")]
    WmAlreadyRunning,

    /// IO error from the control socket or process spawning
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A system call made while waiting for events failed
    #[error("system call failed: {0}")]
    Sys(#[from] nix::errno::Errno),

    /// An operation referenced a client that is not in the registry
    #[error("{0} is not a known client window")]
    UnknownClient(Xid),
}

/// A Result where the error type is [Error]
pub type Result<T> = std::result::Result<T, Error>;
