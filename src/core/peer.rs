//! Peer channel
//!
//! The remote end of an interactive session: an SSH channel, a socket, or
//! the local tty in raw mode. The input reader only needs blocking reads and
//! best-effort writes.

use std::io::{self, Read, Write};

/// Transport capability used by the input reader
pub trait Peer {
    /// Blocking read of up to `n` bytes. Returns an empty vector once the
    /// channel is closed.
    fn recv(&mut self, n: usize) -> io::Result<Vec<u8>>;

    /// Write raw bytes to the peer
    fn send(&mut self, data: &[u8]) -> io::Result<()>;

    /// Write text to the peer as UTF-8
    fn send_text(&mut self, text: &str) -> io::Result<()> {
        self.send(text.as_bytes())
    }

    /// Liveness flag, checked on every read
    fn is_closed(&self) -> bool;
}

/// A peer over any reader/writer pair
pub struct IoPeer<R, W> {
    reader: R,
    writer: W,
    closed: bool,
}

impl<R: Read, W: Write> IoPeer<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            closed: false,
        }
    }

    /// Mark the channel closed. The next read returns empty.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl<R: Read, W: Write> Peer for IoPeer<R, W> {
    fn recv(&mut self, n: usize) -> io::Result<Vec<u8>> {
        if self.closed {
            return Ok(Vec::new());
        }
        let mut buffer = vec![0u8; n.max(1)];
        loop {
            match self.reader.read(&mut buffer) {
                Ok(0) => {
                    self.closed = true;
                    return Ok(Vec::new());
                }
                Ok(len) => {
                    buffer.truncate(len);
                    return Ok(buffer);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.closed = true;
                    return Err(e);
                }
            }
        }
    }

    fn send(&mut self, data: &[u8]) -> io::Result<()> {
        if data.is_empty() {
            return self.writer.flush();
        }
        self.writer.write_all(data)?;
        self.writer.flush()
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::VecDeque;
    use std::io;

    use super::Peer;

    /// Replays scripted reads and records every write
    #[derive(Default)]
    pub struct ScriptedPeer {
        input: VecDeque<Vec<u8>>,
        pub sent: Vec<Vec<u8>>,
        pub reads: usize,
        pub closed: bool,
    }

    impl ScriptedPeer {
        pub fn new<I, B>(chunks: I) -> Self
        where
            I: IntoIterator<Item = B>,
            B: AsRef<[u8]>,
        {
            Self {
                input: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
                ..Default::default()
            }
        }

        /// One chunk per byte, like a raw tty
        pub fn typing(text: &str) -> Self {
            Self::new(text.bytes().map(|b| [b]))
        }

        pub fn push(&mut self, chunk: &[u8]) {
            self.input.push_back(chunk.to_vec());
        }

        pub fn output(&self) -> Vec<u8> {
            self.sent.concat()
        }

        pub fn output_text(&self) -> String {
            String::from_utf8_lossy(&self.output()).into_owned()
        }
    }

    impl Peer for ScriptedPeer {
        fn recv(&mut self, _n: usize) -> io::Result<Vec<u8>> {
            self.reads += 1;
            match self.input.pop_front() {
                Some(chunk) => Ok(chunk),
                None => {
                    self.closed = true;
                    Ok(Vec::new())
                }
            }
        }

        fn send(&mut self, data: &[u8]) -> io::Result<()> {
            self.sent.push(data.to_vec());
            Ok(())
        }

        fn is_closed(&self) -> bool {
            self.closed
        }
    }
}
