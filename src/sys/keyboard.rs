use crate::sys::keys::KeyChord;

/// Synthesizes key events through a virtual keyboard device.
pub trait KeyInjector {
    /// Presses every key of the chord in order, then releases them in
    /// reverse. Fire-and-forget.
    fn send_key_chord(&mut self, chord: &KeyChord);
}
