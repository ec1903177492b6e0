//! Interactive line reader
//!
//! Reads keystrokes from a raw-mode peer one chunk at a time and keeps an
//! edit buffer in step with what the peer sees. Each chunk is classified
//! (see [`keys`](super::keys)) and either edits the buffer, echoes back,
//! or ends the line.
//!
//! ```text
//!            ┌──────────── text / backspace / unsupported ──┐
//!            ▼                                               │
//!  begin ─▶ Reading ─────────────────────────────────────────┘
//!            │  ▲
//!       ^C   │  │ next chunk
//!            ▼  │
//!          Interrupted
//!
//!  Reading ── enter ──▶ Submitted(line)
//!  Reading ── ^D ─────▶ Aborted ("q")
//!  Reading ── closed ─▶ Eof ("")
//! ```
//!
//! Escape sequences split across one-byte reads (`ESC`, `[`, `A`) are
//! tracked until their final byte, so none of their bytes reach the buffer.

use tracing::{debug, warn};

use super::keys::{self, EscapeState, KeyClass};
use super::parser::TtyParser;
use super::peer::Peer;
use crate::text::{wrap_str_with_line_feed, wrap_with_line_feed};

/// Returned in place of a line when the user presses Ctrl-D
pub const ABORT_SENTINEL: &str = "q";

/// Reader settings for one prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderOptions {
    /// Written once when reading starts, and again after Ctrl-C
    pub prompt: String,
    /// Echo `mask_char` instead of the typed bytes
    pub sensitive: bool,
    pub mask_char: char,
    /// Line breaks written before the prompt
    pub before: usize,
    /// Line breaks written after the prompt
    pub after: usize,
    /// Bytes requested per read
    pub recv_size: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            prompt: "Opt> ".to_string(),
            sensitive: false,
            mask_char: '*',
            before: 0,
            after: 0,
            recv_size: 1,
        }
    }
}

impl ReaderOptions {
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }
}

/// Reader state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    Reading,
    /// Ctrl-C seen; the buffer was dropped and the prompt rewritten
    Interrupted,
    Eof,
    Submitted,
    Aborted,
}

impl ReaderState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Eof | Self::Submitted | Self::Aborted)
    }
}

/// How a read ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// Enter pressed; the parsed command line
    Submitted(String),
    /// Ctrl-D pressed
    Aborted,
    /// Peer closed or failed
    Eof,
}

impl ReadOutcome {
    /// Collapse to the line handed upstream: the command, `"q"` on abort,
    /// or empty on EOF.
    pub fn into_line(self) -> String {
        match self {
            Self::Submitted(line) => line,
            Self::Aborted => ABORT_SENTINEL.to_string(),
            Self::Eof => String::new(),
        }
    }
}

/// Line editor bound to one peer
#[derive(Debug)]
pub struct InputReader {
    options: ReaderOptions,
    parser: TtyParser,
    buffer: Vec<Vec<u8>>,
    state: ReaderState,
    escape: EscapeState,
}

impl InputReader {
    pub fn new(options: ReaderOptions) -> Self {
        Self::with_parser(options, TtyParser::default())
    }

    pub fn with_parser(options: ReaderOptions, parser: TtyParser) -> Self {
        Self {
            options,
            parser,
            buffer: Vec::new(),
            state: ReaderState::Reading,
            escape: EscapeState::Idle,
        }
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.options
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Chunks typed since the last submit or reset
    pub fn buffer(&self) -> &[Vec<u8>] {
        &self.buffer
    }

    /// The parser used on submit, for reuse on command output
    pub fn parser_mut(&mut self) -> &mut TtyParser {
        &mut self.parser
    }

    /// Write the prompt and read until the line ends
    pub fn read_line<P: Peer + ?Sized>(&mut self, peer: &mut P) -> ReadOutcome {
        self.begin(peer);

        loop {
            let data = match peer.recv(self.options.recv_size) {
                Ok(data) => data,
                Err(e) => {
                    warn!("peer read failed: {}", e);
                    Vec::new()
                }
            };
            if data.is_empty() || peer.is_closed() {
                return self.end_of_input();
            }
            if let Some(outcome) = self.feed(&data, peer) {
                return outcome;
            }
        }
    }

    /// Start a fresh line: clear the buffer and write the prompt
    pub fn begin<P: Peer + ?Sized>(&mut self, peer: &mut P) {
        self.buffer.clear();
        self.state = ReaderState::Reading;
        self.escape = EscapeState::Idle;
        let prompt =
            wrap_str_with_line_feed(&self.options.prompt, self.options.before, self.options.after);
        send_text(peer, &prompt);
    }

    /// Apply one chunk read from the peer.
    ///
    /// Returns the outcome once the line is finished, `None` while still
    /// reading. A chunk fed after a finished line starts the next one.
    pub fn feed<P: Peer + ?Sized>(&mut self, data: &[u8], peer: &mut P) -> Option<ReadOutcome> {
        if self.state != ReaderState::Reading {
            self.state = ReaderState::Reading;
        }

        let data = if self.escape.is_pending() {
            let (escape, used) = self.escape.skip(data);
            self.escape = escape;
            if used == data.len() {
                send(peer, b"");
                return None;
            }
            &data[used..]
        } else {
            data
        };

        match keys::classify(data) {
            KeyClass::Backspace(erase) => {
                if self.buffer.pop().is_some() {
                    send(peer, erase);
                } else {
                    send(peer, keys::BELL);
                }
                None
            }
            KeyClass::Interrupt => {
                send_text(peer, &format!("^C\r\n{} ", self.options.prompt));
                self.buffer.clear();
                self.state = ReaderState::Interrupted;
                debug!("input interrupted");
                None
            }
            KeyClass::EndOfTransmission => {
                self.buffer.clear();
                self.state = ReaderState::Aborted;
                debug!("input aborted");
                Some(ReadOutcome::Aborted)
            }
            KeyClass::Unsupported => {
                self.escape = EscapeState::after_chunk(data);
                send(peer, b"");
                None
            }
            KeyClass::Enter => {
                send(peer, &wrap_with_line_feed(b"", 0, 2));
                let line = self.parser.parse_input(&self.buffer);
                self.buffer.clear();
                self.state = ReaderState::Submitted;
                debug!(len = line.len(), "input submitted");
                Some(ReadOutcome::Submitted(line.trim().to_string()))
            }
            KeyClass::Text => {
                if self.options.sensitive {
                    let mask = self.options.mask_char.to_string().repeat(data.len());
                    send_text(peer, &mask);
                } else {
                    send(peer, data);
                }
                self.buffer.push(data.to_vec());
                None
            }
        }
    }

    fn end_of_input(&mut self) -> ReadOutcome {
        self.buffer.clear();
        self.escape = EscapeState::Idle;
        self.state = ReaderState::Eof;
        debug!("peer closed during input");
        ReadOutcome::Eof
    }
}

/// Prompt once on `peer` and return the line: the command, `"q"` on
/// Ctrl-D, or empty if the peer went away.
pub fn net_input<P: Peer + ?Sized>(peer: &mut P, prompt: &str, sensitive: bool) -> String {
    let options = ReaderOptions::with_prompt(prompt).sensitive(sensitive);
    InputReader::new(options).read_line(peer).into_line()
}

fn send<P: Peer + ?Sized>(peer: &mut P, data: &[u8]) {
    if let Err(e) = peer.send(data) {
        debug!("peer write failed: {}", e);
    }
}

fn send_text<P: Peer + ?Sized>(peer: &mut P, text: &str) {
    if let Err(e) = peer.send_text(text) {
        debug!("peer write failed: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::core::parser::PromptPattern;
    use crate::core::peer::testing::ScriptedPeer;
    use crate::core::screen::VirtualScreen;

    fn reader() -> InputReader {
        InputReader::new(ReaderOptions::default())
    }

    #[test]
    fn test_submit_line() {
        let mut peer = ScriptedPeer::typing("ls -la\r");
        let outcome = reader().read_line(&mut peer);

        assert_eq!(outcome, ReadOutcome::Submitted("ls -la".to_string()));
        assert_eq!(peer.output_text(), "Opt> ls -la\r\n\r\n");
    }

    #[test]
    fn test_prompt_in_input_is_stripped() {
        let mut peer = ScriptedPeer::new([&b"user@host$ ls -la"[..], b"\r"]);
        assert_eq!(reader().read_line(&mut peer).into_line(), "ls -la");
    }

    #[test]
    fn test_backspace_removes_last_chunk() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::default();
        reader.begin(&mut peer);

        reader.feed(b"a", &mut peer);
        reader.feed(b"b", &mut peer);
        assert_eq!(reader.buffer(), &[b"a".to_vec(), b"b".to_vec()]);

        peer.sent.clear();
        assert_eq!(reader.feed(b"\x7f", &mut peer), None);
        assert_eq!(reader.buffer(), &[b"a".to_vec()]);
        assert_eq!(peer.output(), keys::ERASE_LEFT);

        let outcome = reader.feed(b"\r", &mut peer);
        assert_eq!(outcome, Some(ReadOutcome::Submitted("a".to_string())));
    }

    #[test]
    fn test_backspace_on_empty_rings_bell() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::default();
        reader.begin(&mut peer);
        peer.sent.clear();

        reader.feed(b"\x08", &mut peer);
        reader.feed(b"\x7f", &mut peer);

        assert!(reader.buffer().is_empty());
        assert_eq!(peer.sent, vec![keys::BELL.to_vec(), keys::BELL.to_vec()]);
        assert_eq!(reader.state(), ReaderState::Reading);
    }

    #[test]
    fn test_erased_text_not_submitted() {
        let mut peer = ScriptedPeer::typing("lsx\x7f /tmp\r");
        assert_eq!(reader().read_line(&mut peer).into_line(), "ls /tmp");
    }

    #[test]
    fn test_interrupt_clears_buffer() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::typing("rm -rf\x03");
        peer.push(b"\r");

        let outcome = reader.read_line(&mut peer);

        assert_eq!(outcome, ReadOutcome::Submitted(String::new()));
        assert!(peer.output_text().contains("^C\r\nOpt>  "));
    }

    #[test]
    fn test_interrupt_state() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::default();
        reader.begin(&mut peer);

        reader.feed(b"x", &mut peer);
        reader.feed(b"\x03", &mut peer);
        assert_eq!(reader.state(), ReaderState::Interrupted);
        assert!(reader.buffer().is_empty());

        reader.feed(b"y", &mut peer);
        assert_eq!(reader.state(), ReaderState::Reading);
        assert_eq!(reader.buffer(), &[b"y".to_vec()]);
    }

    /// Reader whose screen already shows text; any parse would blank it
    fn reader_with_stale_screen() -> InputReader {
        let mut screen = VirtualScreen::default();
        screen.feed(b"stale");
        let parser = TtyParser::new(screen, PromptPattern::default());
        InputReader::with_parser(ReaderOptions::default(), parser)
    }

    #[test]
    fn test_eot_aborts() {
        let mut reader = reader_with_stale_screen();
        let mut peer = ScriptedPeer::typing("exit\x04more");

        let outcome = reader.read_line(&mut peer);

        assert_eq!(outcome, ReadOutcome::Aborted);
        assert_eq!(outcome.into_line(), "q");
        assert_eq!(reader.state(), ReaderState::Aborted);
        assert!(reader.buffer().is_empty());
        // Nothing after ^D is read
        assert_eq!(peer.reads, 5);
        // The parser never ran, and no submit line breaks were echoed
        assert!(!reader.parser_mut().screen().is_blank());
        assert!(!peer.output_text().contains("\r\n\r\n"));
    }

    #[test]
    fn test_enter_runs_parser() {
        let mut reader = reader_with_stale_screen();
        let mut peer = ScriptedPeer::typing("exit\r");

        assert!(matches!(reader.read_line(&mut peer), ReadOutcome::Submitted(_)));
        assert!(reader.parser_mut().screen().is_blank());
    }

    #[test]
    fn test_eot_on_empty_line() {
        let mut peer = ScriptedPeer::typing("\x04");
        assert_eq!(net_input(&mut peer, "> ", false), "q");
    }

    #[test]
    fn test_unsupported_not_buffered() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::new([&b"a"[..], b"\x1b[A", b"\x1b", b"\x15", b"\r"]);

        let outcome = reader.read_line(&mut peer);

        assert_eq!(outcome, ReadOutcome::Submitted("a".to_string()));
        // Prompt, echo, three empty acks, line breaks
        assert_eq!(peer.sent.iter().filter(|s| s.is_empty()).count(), 3);
        assert!(!peer.output().contains(&keys::ESCAPE));
    }

    #[test]
    fn test_arrow_key_typed_bytewise() {
        let mut peer = ScriptedPeer::typing("ls\x1b[A\r");
        let outcome = reader().read_line(&mut peer);

        assert_eq!(outcome, ReadOutcome::Submitted("ls".to_string()));
        assert_eq!(peer.output_text(), "Opt> ls\r\n\r\n");
    }

    #[test]
    fn test_escape_sequences_typed_bytewise() {
        // Up in application mode, Ctrl-Right, Delete, then Alt-x
        let mut peer = ScriptedPeer::typing("a\x1bOA\x1b[1;5Cb\x1b[3~\x1bxc\r");
        let mut reader = reader();

        assert_eq!(reader.read_line(&mut peer).into_line(), "abxc");
        assert!(!peer.output().contains(&keys::ESCAPE));
    }

    #[test]
    fn test_escape_split_across_chunks() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::new([&b"cd"[..], b"\x1b[", b"D", b" /", b"\r"]);

        let line = reader.read_line(&mut peer).into_line();

        assert_eq!(line, "cd /");
    }

    #[test]
    fn test_feed_after_submit_resumes_reading() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::default();
        reader.begin(&mut peer);

        reader.feed(b"a", &mut peer);
        assert!(reader.feed(b"\r", &mut peer).is_some());
        assert_eq!(reader.state(), ReaderState::Submitted);

        assert_eq!(reader.feed(b"b", &mut peer), None);
        assert_eq!(reader.state(), ReaderState::Reading);
        assert_eq!(reader.buffer(), &[b"b".to_vec()]);

        assert_eq!(reader.feed(b"\x04", &mut peer), Some(ReadOutcome::Aborted));
        reader.feed(b"c", &mut peer);
        assert_eq!(reader.state(), ReaderState::Reading);
        assert_eq!(reader.buffer(), &[b"c".to_vec()]);
    }

    #[test]
    fn test_sensitive_masks_echo() {
        let options = ReaderOptions::default().sensitive(true);
        let mut reader = InputReader::new(options);
        let mut peer = ScriptedPeer::new([&b"p"[..], "é".as_bytes(), b"w"]);
        reader.begin(&mut peer);
        peer.sent.clear();

        while let Ok(chunk) = peer.recv(1) {
            if chunk.is_empty() {
                break;
            }
            reader.feed(&chunk, &mut peer);
        }

        assert_eq!(peer.output_text(), "****");
        assert_eq!(reader.buffer().concat(), "péw".as_bytes());

        let outcome = reader.feed(b"\r", &mut peer);
        assert_eq!(outcome, Some(ReadOutcome::Submitted("péw".to_string())));
    }

    #[test]
    fn test_custom_mask() {
        let mut options = ReaderOptions::with_prompt("Password: ").sensitive(true);
        options.mask_char = '#';
        let mut peer = ScriptedPeer::typing("abc\r");

        let line = InputReader::new(options).read_line(&mut peer).into_line();

        assert_eq!(line, "abc");
        assert_eq!(peer.output_text(), "Password: ###\r\n\r\n");
    }

    #[test]
    fn test_closed_peer_is_eof() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::typing("partial");

        let outcome = reader.read_line(&mut peer);

        assert_eq!(outcome, ReadOutcome::Eof);
        assert_eq!(outcome.into_line(), "");
        assert_eq!(reader.state(), ReaderState::Eof);
        assert!(reader.buffer().is_empty());
    }

    #[test]
    fn test_read_error_is_eof() {
        struct BrokenPeer;

        impl Peer for BrokenPeer {
            fn recv(&mut self, _n: usize) -> io::Result<Vec<u8>> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
            fn send(&mut self, _data: &[u8]) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
            }
            fn is_closed(&self) -> bool {
                false
            }
        }

        assert_eq!(reader().read_line(&mut BrokenPeer), ReadOutcome::Eof);
    }

    #[test]
    fn test_prompt_line_feeds() {
        let mut options = ReaderOptions::with_prompt("Opt> ");
        options.before = 1;
        options.after = 1;
        let mut peer = ScriptedPeer::typing("\r");

        InputReader::new(options).read_line(&mut peer);

        assert!(peer.output_text().starts_with("\r\nOpt> \r\n"));
    }

    #[test]
    fn test_reader_reusable_across_lines() {
        let mut reader = reader();
        let mut peer = ScriptedPeer::typing("pwd\rwhoami\r");

        assert_eq!(reader.read_line(&mut peer).into_line(), "pwd");
        assert_eq!(reader.read_line(&mut peer).into_line(), "whoami");
        assert_eq!(reader.read_line(&mut peer), ReadOutcome::Eof);
    }

    #[test]
    fn test_terminal_states() {
        assert!(ReaderState::Submitted.is_terminal());
        assert!(ReaderState::Aborted.is_terminal());
        assert!(ReaderState::Eof.is_terminal());
        assert!(!ReaderState::Reading.is_terminal());
        assert!(!ReaderState::Interrupted.is_terminal());
    }
}
