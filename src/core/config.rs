//! Static configuration: appearance, bindings, rules and startup commands.
use crate::core::{
    actions::KeyAction,
    bindings::{keysym::*, modmask, KeySpec},
    rules::{default_rules, Rule},
    scratchpad::Scratchpad,
};

/// Accents from the Catppuccin Frappe palette.
pub mod color {
    /// Border colour for the focused window
    pub const LAVENDER: u32 = 0xbabbf1;
    /// Border colour for unfocused windows
    pub const SURFACE0: u32 = 0x414559;
    /// Border colour for windows demanding attention
    pub const RED: u32 = 0xe78284;
}

/// Everything tunable about the window manager.
#[derive(Debug, Clone)]
pub struct Config {
    pub border_width: u16,
    pub gap: u16,
    pub focused_border: u32,
    pub unfocused_border: u32,
    pub urgent_border: u32,
    pub focus_follows_mouse: bool,
    /// The primary modifier for all default chords (Mod4 = Super)
    pub mod_mask: u16,
    pub terminal: String,
    pub launcher: String,
    pub workspace_names: Vec<String>,
    pub keys: Vec<KeySpec>,
    pub rules: Vec<Rule>,
    pub scratchpad: Scratchpad,
    /// Commands spawned (detached) once the manager is initialised
    pub autostart: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let terminal = "kitty".to_string();
        let launcher = "rofi -show run".to_string();

        Self {
            border_width: 2,
            gap: 2,
            focused_border: color::LAVENDER,
            unfocused_border: color::SURFACE0,
            urgent_border: color::RED,
            focus_follows_mouse: true,
            mod_mask: modmask::MOD4,
            keys: default_keys(modmask::MOD4, &terminal, &launcher),
            terminal,
            launcher,
            workspace_names: (1..=9).map(|n| n.to_string()).collect(),
            rules: default_rules(),
            scratchpad: Scratchpad::default(),
            autostart: Vec::new(),
        }
    }
}

/// The default chord table.
fn default_keys(m: u16, terminal: &str, launcher: &str) -> Vec<KeySpec> {
    use KeyAction::*;

    let shift = modmask::SHIFT;
    let ctrl = modmask::CONTROL;

    let mut keys = vec![
        // applications
        KeySpec::new(m, XK_RETURN, Spawn(terminal.to_string())),
        KeySpec::new(
            m | shift,
            XK_RETURN,
            Spawn(format!("{terminal} --class floating")),
        ),
        KeySpec::new(m, XK_D, Spawn(launcher.to_string())),
        // window management
        KeySpec::new(m, XK_Q, Kill),
        KeySpec::new(m | shift, XK_Q, KillAll),
        KeySpec::new(m, XK_J, FocusNext),
        KeySpec::new(m, XK_K, FocusPrev),
        KeySpec::new(m, XK_TAB, FocusNext),
        KeySpec::new(m, XK_M, FocusMaster),
        KeySpec::new(m | shift, XK_J, SwapNext),
        KeySpec::new(m | shift, XK_K, SwapPrev),
        KeySpec::new(m | shift, XK_M, SwapMaster),
        // layout
        KeySpec::new(m, XK_H, Shrink),
        KeySpec::new(m, XK_L, Expand),
        KeySpec::new(m, XK_COMMA, IncMaster),
        KeySpec::new(m, XK_PERIOD, DecMaster),
        KeySpec::new(m, XK_SPACE, NextLayout),
        KeySpec::new(m | shift, XK_SPACE, ResetLayout),
        // floating
        KeySpec::new(m, XK_T, ToggleFloat),
        KeySpec::new(m, XK_S, Sink),
        // scratchpad
        KeySpec::new(m, XK_GRAVE, ToggleScratchpad),
        // session
        KeySpec::new(m | shift, XK_R, Restart),
        KeySpec::new(m | ctrl, XK_Q, Quit),
    ];

    let digits = [XK_1, XK_2, XK_3, XK_4, XK_5, XK_6, XK_7, XK_8, XK_9];
    for (ws, &sym) in digits.iter().enumerate() {
        keys.push(KeySpec::new(m, sym, SwitchWorkspace(ws)));
        keys.push(KeySpec::new(m | shift, sym, MoveToWorkspace(ws)));
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bindings::KeyCombo;
    use std::collections::HashSet;

    #[test]
    fn default_config_has_nine_workspaces() {
        let config = Config::default();

        assert_eq!(config.workspace_names.len(), 9);
        assert_eq!(config.workspace_names[0], "1");
    }

    #[test]
    fn default_chords_are_unique() {
        let config = Config::default();
        let mut seen = HashSet::new();

        for spec in &config.keys {
            let combo = KeyCombo::new(spec.mask, 0).cleaned();
            assert!(
                seen.insert((combo.mask, spec.keysym)),
                "duplicate binding for mask={} keysym={:#x}",
                combo.mask,
                spec.keysym
            );
        }
    }
}
