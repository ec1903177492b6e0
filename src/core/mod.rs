//! Core input pipeline components.
//!
//! - **keys**: keystroke classification tables
//! - **screen**: virtual terminal screen over the `vt100` emulator
//! - **parser**: command and output reconstruction from rendered rows
//! - **peer**: transport the reader talks to
//! - **reader**: raw-mode line editor state machine
//!
//! # Architecture
//!
//! ```text
//! InputReader
//! ├── Peer (blocking reads, echo writes)
//! ├── InputBuffer (raw chunks since last submit)
//! └── TtyParser
//!     ├── PromptPattern (regex)
//!     └── VirtualScreen (vt100 grid, reset after every parse)
//! ```

pub mod keys;
pub mod parser;
pub mod peer;
pub mod reader;
pub mod screen;
