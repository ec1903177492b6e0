//! Keystroke classification tables
//!
//! Raw-mode terminals deliver each keystroke as its VT byte sequence. These
//! tables sort those sequences into the handful of classes the input reader
//! reacts to.

/// Ctrl-C
pub const INTERRUPT: u8 = 0x03;
/// Ctrl-D
pub const END_OF_TRANSMISSION: u8 = 0x04;
/// ESC, the first byte of every escape sequence
pub const ESCAPE: u8 = 0x1B;

/// Sent to the peer when there is nothing left to erase
pub const BELL: &[u8] = b"\x07";

/// Cursor left one column, then erase to end of line
pub const ERASE_LEFT: &[u8] = b"\x08\x1b[K";

/// Backspace keys and the sequence that visually erases one character
pub const BACKSPACE: &[(&[u8], &[u8])] = &[
    (b"\x08", ERASE_LEFT), // Ctrl-H / BS
    (b"\x7f", ERASE_LEFT), // DEL
];

/// Line terminators
pub const ENTER: &[&[u8]] = &[b"\r", b"\n", b"\r\n"];

/// Acknowledged but never echoed or buffered
pub const UNSUPPORTED: &[&[u8]] = &[
    b"\x1b",
    // Arrow keys, normal and application cursor mode
    b"\x1b[A",
    b"\x1b[B",
    b"\x1b[C",
    b"\x1b[D",
    b"\x1bOA",
    b"\x1bOB",
    b"\x1bOC",
    b"\x1bOD",
    b"\x05", // Ctrl-E
    b"\x0c", // Ctrl-L
    b"\x15", // Ctrl-U
];

/// What a single read from the peer means to the line editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyClass {
    /// Erase one character; carries the erase sequence to echo
    Backspace(&'static [u8]),
    /// Ctrl-C
    Interrupt,
    /// Ctrl-D
    EndOfTransmission,
    /// Escape sequences and keys the editor ignores
    Unsupported,
    /// Submit the line
    Enter,
    /// Ordinary input to echo and buffer
    Text,
}

/// Progress through an escape sequence whose bytes arrive over several reads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EscapeState {
    #[default]
    Idle,
    /// ESC seen, introducer not yet
    Escape,
    /// Inside a CSI (`ESC [`) or SS3 (`ESC O`) sequence
    Sequence,
}

impl EscapeState {
    pub fn is_pending(self) -> bool {
        self != Self::Idle
    }

    /// Step over one byte. Returns the next state and whether the byte was
    /// part of the sequence.
    pub fn advance(self, byte: u8) -> (Self, bool) {
        match self {
            Self::Idle => (Self::Idle, false),
            Self::Escape => match byte {
                b'[' | b'O' => (Self::Sequence, true),
                _ => (Self::Idle, false),
            },
            Self::Sequence => match byte {
                // Parameter and intermediate bytes
                0x20..=0x3f => (Self::Sequence, true),
                // Final byte
                0x40..=0x7e => (Self::Idle, true),
                _ => (Self::Idle, false),
            },
        }
    }

    /// Consume the leading bytes of `data` that continue the sequence.
    /// Returns the state afterwards and how many bytes were consumed.
    pub fn skip(self, data: &[u8]) -> (Self, usize) {
        let mut state = self;
        let mut used = 0;
        for &byte in data {
            if !state.is_pending() {
                break;
            }
            let (next, consumed) = state.advance(byte);
            state = next;
            if !consumed {
                break;
            }
            used += 1;
        }
        (state, used)
    }

    /// State left behind by a chunk that starts with ESC
    pub fn after_chunk(data: &[u8]) -> Self {
        match data.split_first() {
            Some((&ESCAPE, rest)) => Self::Escape.skip(rest).0,
            _ => Self::Idle,
        }
    }
}

/// Look up the erase sequence for a backspace key
pub fn backspace_erase(data: &[u8]) -> Option<&'static [u8]> {
    BACKSPACE
        .iter()
        .find(|(key, _)| *key == data)
        .map(|(_, erase)| *erase)
}

pub fn is_enter(data: &[u8]) -> bool {
    ENTER.iter().any(|key| *key == data)
}

pub fn is_unsupported(data: &[u8]) -> bool {
    data.first() == Some(&ESCAPE) || UNSUPPORTED.iter().any(|key| *key == data)
}

/// Classify a chunk, checking classes in the order the line editor
/// applies them: backspace, interrupt, EOF, unsupported, enter, text.
pub fn classify(data: &[u8]) -> KeyClass {
    if let Some(erase) = backspace_erase(data) {
        return KeyClass::Backspace(erase);
    }
    match data.first() {
        Some(&INTERRUPT) => return KeyClass::Interrupt,
        Some(&END_OF_TRANSMISSION) => return KeyClass::EndOfTransmission,
        _ => {}
    }
    if is_unsupported(data) {
        KeyClass::Unsupported
    } else if is_enter(data) {
        KeyClass::Enter
    } else {
        KeyClass::Text
    }
}
