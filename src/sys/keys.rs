use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum KeyCode {
    ControlL,
    ShiftL,
    AltL,
    SuperL,
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,
    Slash,
    Minus,
    Equal,
    Comma,
    Period,
    Tab,
    Space,
    Enter,
    Escape,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
}

impl KeyCode {
    pub fn is_modifier(&self) -> bool {
        matches!(self, KeyCode::ControlL | KeyCode::ShiftL | KeyCode::AltL | KeyCode::SuperL)
    }
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use KeyCode::*;
        let s = match self {
            ControlL => "Ctrl",
            ShiftL => "Shift",
            AltL => "Alt",
            SuperL => "Meta",
            KeyA => "A",
            KeyB => "B",
            KeyC => "C",
            KeyD => "D",
            KeyE => "E",
            KeyF => "F",
            KeyG => "G",
            KeyH => "H",
            KeyI => "I",
            KeyJ => "J",
            KeyK => "K",
            KeyL => "L",
            KeyM => "M",
            KeyN => "N",
            KeyO => "O",
            KeyP => "P",
            KeyQ => "Q",
            KeyR => "R",
            KeyS => "S",
            KeyT => "T",
            KeyU => "U",
            KeyV => "V",
            KeyW => "W",
            KeyX => "X",
            KeyY => "Y",
            KeyZ => "Z",
            Digit0 => "0",
            Digit1 => "1",
            Digit2 => "2",
            Digit3 => "3",
            Digit4 => "4",
            Digit5 => "5",
            Digit6 => "6",
            Digit7 => "7",
            Digit8 => "8",
            Digit9 => "9",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            Slash => "Slash",
            Minus => "Minus",
            Equal => "Equal",
            Comma => "Comma",
            Period => "Period",
            Tab => "Tab",
            Space => "Space",
            Enter => "Enter",
            Escape => "Escape",
            ArrowLeft => "Left",
            ArrowRight => "Right",
            ArrowUp => "Up",
            ArrowDown => "Down",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for KeyCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = match s.trim().to_uppercase().as_str() {
            "CTRL" | "CONTROL" | "CONTROL_L" => KeyCode::ControlL,
            "SHIFT" | "SHIFT_L" => KeyCode::ShiftL,
            "ALT" | "ALT_L" => KeyCode::AltL,
            "META" | "SUPER" | "SUPER_L" | "LOGO" => KeyCode::SuperL,
            "A" => KeyCode::KeyA,
            "B" => KeyCode::KeyB,
            "C" => KeyCode::KeyC,
            "D" => KeyCode::KeyD,
            "E" => KeyCode::KeyE,
            "F" => KeyCode::KeyF,
            "G" => KeyCode::KeyG,
            "H" => KeyCode::KeyH,
            "I" => KeyCode::KeyI,
            "J" => KeyCode::KeyJ,
            "K" => KeyCode::KeyK,
            "L" => KeyCode::KeyL,
            "M" => KeyCode::KeyM,
            "N" => KeyCode::KeyN,
            "O" => KeyCode::KeyO,
            "P" => KeyCode::KeyP,
            "Q" => KeyCode::KeyQ,
            "R" => KeyCode::KeyR,
            "S" => KeyCode::KeyS,
            "T" => KeyCode::KeyT,
            "U" => KeyCode::KeyU,
            "V" => KeyCode::KeyV,
            "W" => KeyCode::KeyW,
            "X" => KeyCode::KeyX,
            "Y" => KeyCode::KeyY,
            "Z" => KeyCode::KeyZ,
            "0" => KeyCode::Digit0,
            "1" => KeyCode::Digit1,
            "2" => KeyCode::Digit2,
            "3" => KeyCode::Digit3,
            "4" => KeyCode::Digit4,
            "5" => KeyCode::Digit5,
            "6" => KeyCode::Digit6,
            "7" => KeyCode::Digit7,
            "8" => KeyCode::Digit8,
            "9" => KeyCode::Digit9,
            "F1" => KeyCode::F1,
            "F2" => KeyCode::F2,
            "F3" => KeyCode::F3,
            "F4" => KeyCode::F4,
            "F5" => KeyCode::F5,
            "F6" => KeyCode::F6,
            "F7" => KeyCode::F7,
            "F8" => KeyCode::F8,
            "F9" => KeyCode::F9,
            "F10" => KeyCode::F10,
            "F11" => KeyCode::F11,
            "F12" => KeyCode::F12,
            "/" | "SLASH" => KeyCode::Slash,
            "-" | "MINUS" => KeyCode::Minus,
            "=" | "EQUAL" => KeyCode::Equal,
            "," | "COMMA" => KeyCode::Comma,
            "." | "PERIOD" => KeyCode::Period,
            "TAB" => KeyCode::Tab,
            "SPACE" => KeyCode::Space,
            "ENTER" | "RETURN" => KeyCode::Enter,
            "ESC" | "ESCAPE" => KeyCode::Escape,
            "LEFT" | "ARROWLEFT" => KeyCode::ArrowLeft,
            "RIGHT" | "ARROWRIGHT" => KeyCode::ArrowRight,
            "UP" | "ARROWUP" => KeyCode::ArrowUp,
            "DOWN" | "ARROWDOWN" => KeyCode::ArrowDown,
            other => return Err(anyhow::anyhow!("Unrecognized key token: {}", other)),
        };
        Ok(code)
    }
}

/// Keys pressed together, in order, then released in reverse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord(Vec<KeyCode>);

impl KeyChord {
    pub fn new(keys: Vec<KeyCode>) -> Self { KeyChord(keys) }

    pub fn keys(&self) -> &[KeyCode] { &self.0 }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(|k| k.to_string()).collect();
        write!(f, "{}", parts.join(" + "))
    }
}

impl FromStr for KeyChord {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut keys = Vec::new();
        // "+" is a separator, so a literal plus key can't be expressed; none of
        // the shell bindings need it.
        for part in s.split('+').map(|p| p.trim()).filter(|p| !p.is_empty()) {
            keys.push(KeyCode::from_str(part)?);
        }
        if keys.iter().all(|k| k.is_modifier()) {
            return Err(anyhow::anyhow!("No key specified in chord: {}", s));
        }
        Ok(KeyChord(keys))
    }
}

impl Serialize for KeyChord {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where S: serde::Serializer {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for KeyChord {
    fn deserialize<D>(deserializer: D) -> Result<KeyChord, D::Error>
    where D: serde::Deserializer<'de> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum ChordRepr {
            Str(String),
            Keys(Vec<String>),
        }

        let s = match ChordRepr::deserialize(deserializer)? {
            ChordRepr::Str(s) => s,
            ChordRepr::Keys(keys) => keys.join(" + "),
        };
        KeyChord::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parses_modifier_chords() {
        let chord: KeyChord = "Ctrl + W".parse().unwrap();
        assert_eq!(chord.keys(), &[KeyCode::ControlL, KeyCode::KeyW]);

        let chord: KeyChord = "Meta+Slash".parse().unwrap();
        assert_eq!(chord.keys(), &[KeyCode::SuperL, KeyCode::Slash]);

        let chord: KeyChord = "super + /".parse().unwrap();
        assert_eq!(chord.keys(), &[KeyCode::SuperL, KeyCode::Slash]);
    }

    #[test]
    fn parses_single_key() {
        let chord: KeyChord = "F12".parse().unwrap();
        assert_eq!(chord.keys(), &[KeyCode::F12]);
        assert_eq!(chord.to_string(), "F12");
    }

    #[test]
    fn rejects_modifier_only_and_unknown_keys() {
        assert!("Ctrl + Shift".parse::<KeyChord>().is_err());
        assert!("".parse::<KeyChord>().is_err());
        assert!("Ctrl + Banana".parse::<KeyChord>().is_err());
    }

    #[test]
    fn display_reparses() {
        let chord: KeyChord = "ctrl + alt + t".parse().unwrap();
        assert_eq!(chord.to_string(), "Ctrl + Alt + T");
        assert_eq!(chord.to_string().parse::<KeyChord>().unwrap(), chord);
    }
}
