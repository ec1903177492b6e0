//! ttyline - line input for raw-mode terminal sessions
//!
//! Turns the keystroke stream of a raw-mode peer (an SSH channel, a socket,
//! a local tty) into edited command lines, and turns command output back
//! into plain text by rendering it on a virtual screen.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::io;
//! use ttyline::{InputReader, IoPeer, ReaderOptions};
//!
//! let mut peer = IoPeer::new(io::stdin(), io::stdout());
//! let mut reader = InputReader::new(ReaderOptions::with_prompt("Opt> "));
//! let line = reader.read_line(&mut peer).into_line();
//! ```
//!
//! # Keys
//!
//! | Key | Action |
//! |-----|--------|
//! | Backspace / Ctrl-H | Erase last input, or ring the bell |
//! | Ctrl-C | Drop the line and prompt again |
//! | Ctrl-D | Abort, returns `"q"` |
//! | Enter | Submit the line |
//! | Arrows, Esc, Ctrl-E/L/U | Ignored |

pub mod config;
pub mod core;
pub mod error;
pub mod session;
pub mod text;

pub use crate::core::parser::{PromptPattern, TtyParser};
pub use crate::core::peer::{IoPeer, Peer};
pub use crate::core::reader::{net_input, InputReader, ReadOutcome, ReaderOptions, ReaderState};
pub use crate::core::screen::VirtualScreen;
pub use crate::error::{Error, Result};
pub use crate::session::{Action, CommandRecord, Executor, Session, ShellExecutor};
