use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Platform;

// Central table: variant, name, Windows virtual-key, macOS kVK, X11 keysym.
// Extend this list to support more keys; everything else derives from it.
macro_rules! key_table {
    ($m:ident) => {
        $m! {
            A => "A", 0x41, 0x00, 0x61;
            B => "B", 0x42, 0x0B, 0x62;
            C => "C", 0x43, 0x08, 0x63;
            D => "D", 0x44, 0x02, 0x64;
            E => "E", 0x45, 0x0E, 0x65;
            F => "F", 0x46, 0x03, 0x66;
            G => "G", 0x47, 0x05, 0x67;
            H => "H", 0x48, 0x04, 0x68;
            I => "I", 0x49, 0x22, 0x69;
            J => "J", 0x4A, 0x26, 0x6A;
            K => "K", 0x4B, 0x28, 0x6B;
            L => "L", 0x4C, 0x25, 0x6C;
            M => "M", 0x4D, 0x2E, 0x6D;
            N => "N", 0x4E, 0x2D, 0x6E;
            O => "O", 0x4F, 0x1F, 0x6F;
            P => "P", 0x50, 0x23, 0x70;
            Q => "Q", 0x51, 0x0C, 0x71;
            R => "R", 0x52, 0x0F, 0x72;
            S => "S", 0x53, 0x01, 0x73;
            T => "T", 0x54, 0x11, 0x74;
            U => "U", 0x55, 0x20, 0x75;
            V => "V", 0x56, 0x09, 0x76;
            W => "W", 0x57, 0x0D, 0x77;
            X => "X", 0x58, 0x07, 0x78;
            Y => "Y", 0x59, 0x10, 0x79;
            Z => "Z", 0x5A, 0x06, 0x7A;
            Digit0 => "0", 0x30, 0x1D, 0x30;
            Digit1 => "1", 0x31, 0x12, 0x31;
            Digit2 => "2", 0x32, 0x13, 0x32;
            Digit3 => "3", 0x33, 0x14, 0x33;
            Digit4 => "4", 0x34, 0x15, 0x34;
            Digit5 => "5", 0x35, 0x17, 0x35;
            Digit6 => "6", 0x36, 0x16, 0x36;
            Digit7 => "7", 0x37, 0x1A, 0x37;
            Digit8 => "8", 0x38, 0x1C, 0x38;
            Digit9 => "9", 0x39, 0x19, 0x39;
            F1 => "F1", 0x70, 0x7A, 0xFFBE;
            F2 => "F2", 0x71, 0x78, 0xFFBF;
            F3 => "F3", 0x72, 0x63, 0xFFC0;
            F4 => "F4", 0x73, 0x76, 0xFFC1;
            F5 => "F5", 0x74, 0x60, 0xFFC2;
            F6 => "F6", 0x75, 0x61, 0xFFC3;
            F7 => "F7", 0x76, 0x62, 0xFFC4;
            F8 => "F8", 0x77, 0x64, 0xFFC5;
            F9 => "F9", 0x78, 0x65, 0xFFC6;
            F10 => "F10", 0x79, 0x6D, 0xFFC7;
            F11 => "F11", 0x7A, 0x67, 0xFFC8;
            F12 => "F12", 0x7B, 0x6F, 0xFFC9;
            Space => "Space", 0x20, 0x31, 0x20;
            Return => "Return", 0x0D, 0x24, 0xFF0D;
            Escape => "Escape", 0x1B, 0x35, 0xFF1B;
            Delete => "Delete", 0x2E, 0x75, 0xFFFF;
            Tab => "Tab", 0x09, 0x30, 0xFF09;
            Left => "Left", 0x25, 0x7B, 0xFF51;
            Right => "Right", 0x27, 0x7C, 0xFF53;
            Up => "Up", 0x26, 0x7E, 0xFF52;
            Down => "Down", 0x28, 0x7D, 0xFF54;
        }
    };
}

macro_rules! define_keys {
    ( $( $k:ident => $name:literal, $win:literal, $mac:literal, $x11:literal; )* ) => {
        /// A primary (non-modifier) key that a binding may use.
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
        pub enum Key {
            $(
                #[allow(missing_docs)]
                $k,
            )*
        }

        impl Key {
            /// Every supported key, in table order.
            pub const ALL: &'static [Self] = &[ $( Self::$k, )* ];

            /// Canonical configuration name, e.g. `"G"`, `"7"`, `"F4"`, `"Escape"`.
            pub fn name(self) -> &'static str {
                match self {
                    $( Self::$k => $name, )*
                }
            }

            /// Parses a canonical key name. Matching is case-sensitive.
            ///
            /// `"Enter"` is accepted as an alias for `Return`.
            pub fn from_name(s: &str) -> Option<Self> {
                match s {
                    $( $name => Some(Self::$k), )*
                    "Enter" => Some(Self::Return),
                    _ => None,
                }
            }

            /// The platform-level key code for this key on `platform`.
            pub fn code(self, platform: Platform) -> u32 {
                match platform {
                    Platform::Windows => match self { $( Self::$k => $win, )* },
                    Platform::MacOs => match self { $( Self::$k => $mac, )* },
                    Platform::Linux => match self { $( Self::$k => $x11, )* },
                }
            }
        }
    };
}

key_table!(define_keys);

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
