//! The control socket: a line-oriented command protocol over a unix socket.
//!
//! Commands re-enter the window manager through the same operations the key
//! bindings use. The listener is non-blocking and serviced on the main loop
//! between X events, so commands are atomic with respect to event handling
//! by construction. One request is handled per connection; the response is
//! a single JSON object followed by a newline.
use crate::{
    core::WindowManager,
    layout::Message,
    x::XConn,
    Result, Xid,
};
use serde::Serialize;
use std::{
    env, fs,
    io::{BufRead, BufReader, Write},
    os::unix::{
        fs::PermissionsExt,
        io::{AsRawFd, RawFd},
        net::{UnixListener, UnixStream},
    },
    path::PathBuf,
    time::Duration,
};
use tracing::{debug, info, warn};

/// Socket name under `$XDG_RUNTIME_DIR` (or `/tmp`).
const SOCKET_NAME: &str = "oxwm.sock";

/// How long a client gets to send its request line / accept our response.
const CLIENT_IO_TIMEOUT: Duration = Duration::from_millis(500);

/// The listening side of the control socket.
#[derive(Debug)]
pub struct IpcServer {
    listener: UnixListener,
    path: PathBuf,
}

impl IpcServer {
    /// Bind the control socket, replacing any stale socket file.
    pub fn bind() -> Result<Self> {
        let dir = env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".to_string());
        let path = PathBuf::from(dir).join(SOCKET_NAME);

        if path.exists() {
            fs::remove_file(&path)?;
        }

        let listener = UnixListener::bind(&path)?;
        listener.set_nonblocking(true)?;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;

        info!(path = %path.display(), "control socket bound");

        Ok(Self { listener, path })
    }

    /// The listener fd, for inclusion in the main loop's poll set.
    pub fn raw_fd(&self) -> RawFd {
        self.listener.as_raw_fd()
    }

    /// Accept a pending connection, if any.
    pub fn try_accept(&self) -> Option<UnixStream> {
        match self.listener.accept() {
            Ok((stream, _)) => {
                let _ = stream.set_read_timeout(Some(CLIENT_IO_TIMEOUT));
                let _ = stream.set_write_timeout(Some(CLIENT_IO_TIMEOUT));
                Some(stream)
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => None,
            Err(e) => {
                warn!(%e, "error accepting control connection");
                None
            }
        }
    }
}

impl Drop for IpcServer {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Read one request from the stream, run it and send the JSON response.
pub(crate) fn handle_connection<X: XConn>(stream: UnixStream, wm: &mut WindowManager<X>) {
    let mut reader = BufReader::new(stream);
    let mut line = String::new();

    if let Err(e) = reader.read_line(&mut line) {
        warn!(%e, "error reading control request");
        return;
    }

    debug!(request = %line.trim(), "control request");
    let response = match parse(line.trim()) {
        Ok(cmd) => handle_command(wm, &cmd),
        Err(message) => IpcResponse::failure(message),
    };

    let mut stream = reader.into_inner();
    match serde_json::to_string(&response) {
        Ok(json) => {
            if let Err(e) = writeln!(stream, "{json}") {
                warn!(%e, "error writing control response");
            }
        }
        Err(e) => warn!(%e, "unable to serialize control response"),
    }
}

/// A decoded request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpcCommand {
    /// Zero-based workspace index
    WorkspaceSwitch(usize),
    WorkspaceMove(usize),
    WindowClose,
    WindowFocusNext,
    WindowFocusPrev,
    WindowFocusMaster,
    WindowFloat,
    WindowSink,
    WindowSwapNext,
    WindowSwapPrev,
    LayoutNext,
    LayoutReset,
    LayoutShrink,
    LayoutExpand,
    QueryWorkspaces,
    QueryWindows,
    QueryFocused,
    QueryLayout,
    ActionRestart,
    ActionQuit,
    ActionScratchpad,
    Help,
}

/// Parse a request line. The leading token is case-insensitive; workspace
/// numbers are 1-based on the wire.
pub fn parse(line: &str) -> std::result::Result<IpcCommand, String> {
    use IpcCommand::*;

    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((head, args)) = parts.split_first() else {
        return Err("empty command".to_string());
    };

    match (head.to_lowercase().as_str(), args) {
        ("workspace", ["switch", n]) => parse_workspace(n).map(WorkspaceSwitch),
        ("workspace", ["move", n]) => parse_workspace(n).map(WorkspaceMove),
        ("workspace", _) => Err("usage: workspace <switch|move> <1-9>".to_string()),

        ("window", ["close"]) => Ok(WindowClose),
        ("window", ["focus", "next"]) => Ok(WindowFocusNext),
        ("window", ["focus", "prev"]) => Ok(WindowFocusPrev),
        ("window", ["focus", "master"]) => Ok(WindowFocusMaster),
        ("window", ["float"]) => Ok(WindowFloat),
        ("window", ["sink"]) => Ok(WindowSink),
        ("window", ["swap", "next"]) => Ok(WindowSwapNext),
        ("window", ["swap", "prev"]) => Ok(WindowSwapPrev),
        ("window", _) => {
            Err("usage: window <close|focus|float|sink|swap> [next|prev|master]".to_string())
        }

        ("layout", ["next"]) => Ok(LayoutNext),
        ("layout", ["reset"]) => Ok(LayoutReset),
        ("layout", ["shrink"]) => Ok(LayoutShrink),
        ("layout", ["expand"]) => Ok(LayoutExpand),
        ("layout", _) => Err("usage: layout <next|reset|shrink|expand>".to_string()),

        ("query", ["workspaces"]) => Ok(QueryWorkspaces),
        ("query", ["windows"]) => Ok(QueryWindows),
        ("query", ["focused"]) => Ok(QueryFocused),
        ("query", ["layout"]) => Ok(QueryLayout),
        ("query", _) => Err("usage: query <workspaces|windows|focused|layout>".to_string()),

        ("action", ["restart"]) => Ok(ActionRestart),
        ("action", ["quit"]) => Ok(ActionQuit),
        ("action", ["scratchpad"]) => Ok(ActionScratchpad),
        ("action", _) => Err("usage: action <restart|quit|scratchpad>".to_string()),

        ("help", _) => Ok(Help),

        (other, _) => Err(format!("unknown command: {other}")),
    }
}

fn parse_workspace(raw: &str) -> std::result::Result<usize, String> {
    match raw.parse::<usize>() {
        Ok(n) if (1..=9).contains(&n) => Ok(n - 1),
        _ => Err("workspace must be 1-9".to_string()),
    }
}

/// The wire response: `{success, message?, data?}`.
#[derive(Debug, Serialize, PartialEq)]
pub struct IpcResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl IpcResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: None,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
        }
    }

    fn data(value: serde_json::Value) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(value),
        }
    }
}

#[derive(Debug, Serialize)]
struct WorkspaceInfo {
    id: usize,
    name: String,
    current: bool,
    windows: usize,
}

#[derive(Debug, Serialize)]
struct WindowInfo {
    id: u32,
    title: String,
    class: String,
    workspace: usize,
    floating: bool,
    focused: bool,
    urgent: bool,
}

const HELP_TEXT: &str = "\
Available commands:
  workspace switch <1-9>           - Switch to workspace
  workspace move <1-9>             - Move focused window to workspace
  window close                     - Close focused window
  window focus <next|prev|master>  - Change focus
  window float                     - Float focused window
  window sink                      - Sink focused window back into the tiling
  window swap <next|prev>          - Swap focused window
  layout next                      - Cycle to next layout
  layout reset                     - Reset to the default layout
  layout shrink                    - Shrink master area
  layout expand                    - Expand master area
  query workspaces                 - List all workspaces
  query windows                    - List all windows
  query focused                    - Focused window info
  query layout                     - Current layout name
  action restart                   - Restart the window manager
  action quit                      - Quit the window manager
  action scratchpad                - Toggle the scratchpad
  help                             - Show this help";

/// Run a decoded command against the window manager.
pub(crate) fn handle_command<X: XConn>(
    wm: &mut WindowManager<X>,
    cmd: &IpcCommand,
) -> IpcResponse {
    use IpcCommand::*;

    // operations shared with the key bindings are best-effort: X errors are
    // already logged by the facade, the caller just gets success=false
    let run = |res: Result<()>, msg: &str| match res {
        Ok(()) => IpcResponse::success(msg),
        Err(e) => IpcResponse::failure(e.to_string()),
    };

    match cmd {
        WorkspaceSwitch(n) => run(
            wm.switch_workspace(*n),
            &format!("switched to workspace {}", n + 1),
        ),
        WorkspaceMove(n) => {
            if wm.focused.is_none() {
                return IpcResponse::failure("no focused window");
            }
            run(
                wm.move_focused_to_workspace(*n),
                &format!("moved window to workspace {}", n + 1),
            )
        }

        WindowClose => {
            if wm.focused.is_none() {
                return IpcResponse::failure("no focused window");
            }
            run(wm.kill_focused(), "window closed")
        }
        WindowFocusNext => run(wm.focus_next(), "focus changed"),
        WindowFocusPrev => run(wm.focus_prev(), "focus changed"),
        WindowFocusMaster => run(wm.focus_master(), "focus changed"),
        WindowFloat => {
            if wm.focused.is_none() {
                return IpcResponse::failure("no focused window");
            }
            run(wm.float_focused(), "window floating")
        }
        WindowSink => {
            if wm.focused.is_none() {
                return IpcResponse::failure("no focused window");
            }
            run(wm.sink_focused(), "window sunk")
        }
        WindowSwapNext => run(wm.swap_next(), "window swapped"),
        WindowSwapPrev => run(wm.swap_prev(), "window swapped"),

        LayoutNext => {
            let res = wm.next_layout();
            run(res, &format!("layout: {}", wm.current_layout_name()))
        }
        LayoutReset => run(wm.set_layout(Default::default()), "layout reset"),
        LayoutShrink => run(wm.send_layout_message(Message::Shrink), "master shrunk"),
        LayoutExpand => run(wm.send_layout_message(Message::Expand), "master expanded"),

        QueryWorkspaces => workspaces_response(wm),
        QueryWindows => windows_response(wm),
        QueryFocused => focused_response(wm),
        QueryLayout => IpcResponse::data(wm.current_layout_name().into()),

        ActionRestart => {
            wm.exit(true);
            IpcResponse::success("restarting")
        }
        ActionQuit => {
            wm.exit(false);
            IpcResponse::success("quitting")
        }
        ActionScratchpad => run(wm.toggle_scratchpad(), "scratchpad toggled"),

        Help => IpcResponse::success(HELP_TEXT),
    }
}

fn workspaces_response<X: XConn>(wm: &WindowManager<X>) -> IpcResponse {
    let infos: Vec<WorkspaceInfo> = wm
        .workspaces
        .iter()
        .map(|ws| WorkspaceInfo {
            id: ws.id() + 1,
            name: ws.name().to_string(),
            current: ws.id() == wm.current,
            windows: ws.len(),
        })
        .collect();

    match serde_json::to_value(infos) {
        Ok(v) => IpcResponse::data(v),
        Err(e) => IpcResponse::failure(e.to_string()),
    }
}

fn window_info<X: XConn>(wm: &WindowManager<X>, id: Xid) -> Option<WindowInfo> {
    let c = wm.clients.get(&id)?;

    Some(WindowInfo {
        id: *id,
        title: wm.x.window_title(id),
        class: wm
            .x
            .window_class(id)
            .map(|(_, class)| class)
            .unwrap_or_default(),
        workspace: c.workspace + 1,
        floating: c.floating,
        focused: wm.focused == Some(id),
        urgent: c.urgent,
    })
}

fn windows_response<X: XConn>(wm: &WindowManager<X>) -> IpcResponse {
    let mut ids: Vec<Xid> = wm.clients.keys().copied().collect();
    ids.sort();

    let infos: Vec<WindowInfo> = ids.into_iter().filter_map(|id| window_info(wm, id)).collect();

    match serde_json::to_value(infos) {
        Ok(v) => IpcResponse::data(v),
        Err(e) => IpcResponse::failure(e.to_string()),
    }
}

fn focused_response<X: XConn>(wm: &WindowManager<X>) -> IpcResponse {
    let Some(info) = wm.focused.and_then(|id| window_info(wm, id)) else {
        return IpcResponse::failure("no focused window");
    };

    match serde_json::to_value(info) {
        Ok(v) => IpcResponse::data(v),
        Err(e) => IpcResponse::failure(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::config::Config, pure::Rect, x::mock::MockConn};
    use simple_test_case::test_case;

    #[test_case("workspace switch 3", IpcCommand::WorkspaceSwitch(2); "switch")]
    #[test_case("WORKSPACE move 9", IpcCommand::WorkspaceMove(8); "move is case insensitive")]
    #[test_case("window close", IpcCommand::WindowClose; "close")]
    #[test_case("window focus next", IpcCommand::WindowFocusNext; "focus next")]
    #[test_case("window swap prev", IpcCommand::WindowSwapPrev; "swap prev")]
    #[test_case("layout shrink", IpcCommand::LayoutShrink; "shrink")]
    #[test_case("query workspaces", IpcCommand::QueryWorkspaces; "query workspaces")]
    #[test_case("action scratchpad", IpcCommand::ActionScratchpad; "scratchpad")]
    #[test_case("help", IpcCommand::Help; "help")]
    #[test]
    fn parse_valid(line: &str, expected: IpcCommand) {
        assert_eq!(parse(line), Ok(expected));
    }

    #[test_case(""; "empty")]
    #[test_case("workspace switch 0"; "workspace below range")]
    #[test_case("workspace switch 10"; "workspace above range")]
    #[test_case("workspace teleport 3"; "unknown subcommand")]
    #[test_case("window focus sideways"; "unknown direction")]
    #[test_case("frobnicate"; "unknown command")]
    #[test]
    fn parse_invalid(line: &str) {
        assert!(parse(line).is_err());
    }

    #[test]
    fn responses_serialize_to_the_wire_format() {
        let r = IpcResponse::success("done");
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"success":true,"message":"done"}"#
        );

        let r = IpcResponse::data(serde_json::json!([1, 2]));
        assert_eq!(
            serde_json::to_string(&r).unwrap(),
            r#"{"success":true,"data":[1,2]}"#
        );
    }

    fn test_wm() -> WindowManager<MockConn> {
        let conn = MockConn::new(Rect::new(0, 0, 1920, 1080));
        conn.add_window(Xid(1), Rect::new(0, 0, 100, 100), "kitty");
        conn.add_window(Xid(2), Rect::new(0, 0, 100, 100), "kitty");

        let mut wm = WindowManager::new(conn, Config::default());
        wm.manage(Xid(1)).unwrap();
        wm.manage(Xid(2)).unwrap();

        wm
    }

    #[test]
    fn query_workspaces_reports_window_counts() {
        let mut wm = test_wm();
        let resp = handle_command(&mut wm, &IpcCommand::QueryWorkspaces);

        assert!(resp.success);
        let data = resp.data.expect("data to be set");
        let list = data.as_array().expect("data to be an array");

        assert_eq!(list.len(), 9);
        assert_eq!(list[0]["id"], 1);
        assert_eq!(list[0]["name"], "1");
        assert_eq!(list[0]["current"], true);
        assert_eq!(list[0]["windows"], 2);
        assert_eq!(list[8]["id"], 9);
        assert_eq!(list[8]["windows"], 0);
    }

    #[test]
    fn query_focused_reports_the_focused_window() {
        let mut wm = test_wm();
        let resp = handle_command(&mut wm, &IpcCommand::QueryFocused);

        assert!(resp.success);
        let data = resp.data.expect("data to be set");
        assert_eq!(data["id"], 2);
        assert_eq!(data["focused"], true);
        assert_eq!(data["class"], "kitty");
    }

    #[test]
    fn query_layout_reports_the_layout_name() {
        let mut wm = test_wm();
        let resp = handle_command(&mut wm, &IpcCommand::QueryLayout);

        assert_eq!(resp.data, Some("tall".into()));
    }

    #[test]
    fn move_without_focus_fails() {
        let conn = MockConn::new(Rect::new(0, 0, 1920, 1080));
        let mut wm = WindowManager::new(conn, Config::default());

        let resp = handle_command(&mut wm, &IpcCommand::WorkspaceMove(3));
        assert!(!resp.success);
        assert_eq!(resp.message.as_deref(), Some("no focused window"));
    }

    #[test]
    fn quit_command_stops_the_manager() {
        let mut wm = test_wm();
        let resp = handle_command(&mut wm, &IpcCommand::ActionQuit);

        assert!(resp.success);
    }
}
