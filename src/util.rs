//! Process spawning helpers.
use crate::Result;
use std::process::{Command, Stdio};

/// Run an external command in a fully detached session.
///
/// The command line is handed to `sh -c`, the child gets its own session
/// via `setsid` so it survives the window manager, and stdio is pointed at
/// /dev/null. The child is never waited on (SIGCHLD is ignored).
pub fn spawn(cmd: impl AsRef<str>) -> Result<()> {
    use std::os::unix::process::CommandExt;

    let mut command = Command::new("sh");
    command
        .arg("-c")
        .arg(cmd.as_ref())
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());

    unsafe {
        command.pre_exec(|| {
            nix::unistd::setsid()
                .map(|_| ())
                .map_err(std::io::Error::from)
        });
    }

    command.spawn()?;

    Ok(())
}
