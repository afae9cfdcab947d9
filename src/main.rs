//! oxwm :: a tiling window manager for X11 in the style of dwm and xmonad
use oxwm::{
    core::{config::Config, ExitAction, WindowManager},
    ipc::IpcServer,
    x11rb::X11rbConnection,
};
use std::{env, os::unix::process::CommandExt, process};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() == 2 && args[1] == "-v" {
        println!("oxwm-{}", env!("CARGO_PKG_VERSION"));
        process::exit(0);
    } else if args.len() > 1 {
        eprintln!("usage: oxwm [-v]");
        process::exit(1);
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let conn = match X11rbConnection::new() {
        Ok(conn) => conn,
        Err(e) => {
            error!(%e, "unable to connect to the X server");
            process::exit(1);
        }
    };

    let mut ipc = match IpcServer::bind() {
        Ok(srv) => Some(srv),
        Err(e) => {
            warn!(%e, "unable to bind control socket, IPC disabled");
            None
        }
    };

    let mut wm = WindowManager::new(conn, Config::default());

    match wm.run(ipc.as_mut()) {
        Ok(ExitAction::Quit) => info!("exiting"),
        Ok(ExitAction::Restart) => {
            drop(ipc); // release the socket before the new image binds it
            info!("restarting in place");
            let e = process::Command::new(env::current_exe().unwrap_or_else(|_| "oxwm".into()))
                .args(env::args().skip(1))
                .exec();
            error!(%e, "unable to re-exec");
            process::exit(1);
        }
        Err(e) => {
            error!(%e, "fatal error");
            process::exit(1);
        }
    }
}
