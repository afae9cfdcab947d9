//! Key and mouse binding primitives.
use crate::core::actions::KeyAction;

/// X modifier mask bits.
pub mod modmask {
    pub const SHIFT: u16 = 1 << 0;
    pub const LOCK: u16 = 1 << 1;
    pub const CONTROL: u16 = 1 << 2;
    pub const MOD1: u16 = 1 << 3;
    pub const MOD2: u16 = 1 << 4;
    pub const MOD4: u16 = 1 << 6;
}

/// Modifier bits stripped before binding lookup: NumLock (Mod2) and
/// CapsLock (Lock) must not change what a chord means.
pub const IGNORED_MODIFIERS: u16 = modmask::LOCK | modmask::MOD2;

/// Mouse buttons grabbed on managed windows for move / resize.
pub const BUTTON_MOVE: u8 = 1;
pub const BUTTON_RESIZE: u8 = 3;

/// A modifier mask and keycode pair: the key of the binding table.
///
/// Two combos are the same binding iff their *cleaned* masks and codes are
/// equal; construct table keys through [KeyCombo::cleaned].
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct KeyCombo {
    /// The held modifier mask
    pub mask: u16,
    /// The keycode that was pressed
    pub code: u8,
}

impl KeyCombo {
    pub fn new(mask: u16, code: u8) -> Self {
        Self { mask, code }
    }

    /// This combo with the NumLock and CapsLock bits masked out.
    pub fn cleaned(&self) -> Self {
        Self {
            mask: self.mask & !IGNORED_MODIFIERS,
            code: self.code,
        }
    }
}

/// A keybinding before keysym resolution: what the config declares.
///
/// Keysyms are resolved to keycodes against the server's keyboard mapping
/// when the bindings are grabbed.
#[derive(Debug, Clone)]
pub struct KeySpec {
    pub mask: u16,
    pub keysym: u32,
    pub action: KeyAction,
}

impl KeySpec {
    pub fn new(mask: u16, keysym: u32, action: KeyAction) -> Self {
        Self {
            mask,
            keysym,
            action,
        }
    }
}

/// The keysyms referenced by the default bindings.
///
/// Values are from X11/keysymdef.h; Latin-1 keysyms equal their codepoint.
#[allow(missing_docs)]
pub mod keysym {
    pub const XK_RETURN: u32 = 0xff0d;
    pub const XK_TAB: u32 = 0xff09;
    pub const XK_SPACE: u32 = 0x0020;
    pub const XK_COMMA: u32 = 0x002c;
    pub const XK_PERIOD: u32 = 0x002e;
    pub const XK_GRAVE: u32 = 0x0060;

    pub const XK_1: u32 = 0x0031;
    pub const XK_2: u32 = 0x0032;
    pub const XK_3: u32 = 0x0033;
    pub const XK_4: u32 = 0x0034;
    pub const XK_5: u32 = 0x0035;
    pub const XK_6: u32 = 0x0036;
    pub const XK_7: u32 = 0x0037;
    pub const XK_8: u32 = 0x0038;
    pub const XK_9: u32 = 0x0039;

    pub const XK_D: u32 = 0x0064;
    pub const XK_H: u32 = 0x0068;
    pub const XK_J: u32 = 0x006a;
    pub const XK_K: u32 = 0x006b;
    pub const XK_L: u32 = 0x006c;
    pub const XK_M: u32 = 0x006d;
    pub const XK_Q: u32 = 0x0071;
    pub const XK_R: u32 = 0x0072;
    pub const XK_S: u32 = 0x0073;
    pub const XK_T: u32 = 0x0074;
}
