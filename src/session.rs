//! Interactive session
//!
//! Drives one input reader against one peer: reads a line, dispatches it to
//! a built-in action or an executor, writes the result back, and records
//! each executed command with its parsed output.

use std::io;
use std::process::Command;

use tracing::{debug, info, warn};

use crate::core::peer::Peer;
use crate::core::reader::{InputReader, ReadOutcome};
use crate::text::{format_columns, matches_any, max_display_width, natural_key};

/// Runs a submitted command line and returns its raw output
pub trait Executor {
    fn execute(&mut self, command: &str) -> io::Result<Vec<u8>>;
}

/// Executes through the platform shell
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExecutor;

impl Executor for ShellExecutor {
    fn execute(&mut self, command: &str) -> io::Result<Vec<u8>> {
        #[cfg(windows)]
        let output = Command::new("cmd").args(["/C", command]).output()?;
        #[cfg(not(windows))]
        let output = Command::new("sh").args(["-c", command]).output()?;

        let mut data = output.stdout;
        data.extend_from_slice(&output.stderr);
        Ok(data)
    }
}

/// A command and the output it produced, as a person would have read them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    pub command: String,
    pub output: String,
}

/// What a submitted line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Blank line
    Nothing,
    Help,
    /// List all targets
    List,
    /// List targets containing the needle
    Search(String),
    Quit,
    Run(String),
}

impl Action {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Nothing,
            "h" | "?" => Self::Help,
            "p" => Self::List,
            "q" | "exit" => Self::Quit,
            _ => match line.strip_prefix('/') {
                Some(needle) => Self::Search(needle.trim().to_string()),
                None => Self::Run(line.to_string()),
            },
        }
    }
}

const HELP: &str = concat!(
    "  p         List targets\r\n",
    "  /<text>   Search targets\r\n",
    "  h         Show this help\r\n",
    "  q         Quit\r\n",
    "  <command> Run a shell command\r\n",
);

/// One peer, one reader, one executor
pub struct Session<P, E> {
    peer: P,
    reader: InputReader,
    executor: E,
    targets: Vec<String>,
    records: Vec<CommandRecord>,
}

impl<P: Peer, E: Executor> Session<P, E> {
    pub fn new(peer: P, reader: InputReader, executor: E) -> Self {
        Self {
            peer,
            reader,
            executor,
            targets: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Targets shown by `p` and searched by `/`, kept in natural order
    pub fn with_targets(mut self, mut targets: Vec<String>) -> Self {
        targets.sort_by_key(|t| natural_key(t));
        self.targets = targets;
        self
    }

    pub fn records(&self) -> &[CommandRecord] {
        &self.records
    }

    pub fn peer(&self) -> &P {
        &self.peer
    }

    /// Read and dispatch lines until the peer quits or goes away
    pub fn run(&mut self) {
        info!("session started");
        loop {
            let line = match self.reader.read_line(&mut self.peer) {
                ReadOutcome::Submitted(line) => line,
                ReadOutcome::Aborted => {
                    debug!("session aborted by user");
                    break;
                }
                ReadOutcome::Eof => {
                    debug!("peer closed");
                    break;
                }
            };
            if !self.dispatch(Action::parse(&line)) {
                break;
            }
        }
        info!(commands = self.records.len(), "session ended");
    }

    /// Handle one action. Returns false when the session should end.
    pub fn dispatch(&mut self, action: Action) -> bool {
        match action {
            Action::Nothing => {}
            Action::Help => self.write(HELP.as_bytes()),
            Action::List => {
                let targets = self.targets.clone();
                self.list(&targets);
            }
            Action::Search(needle) => {
                let found: Vec<String> = self
                    .targets
                    .iter()
                    .filter(|t| matches_any(&[t.as_str()], &needle))
                    .cloned()
                    .collect();
                self.list(&found);
            }
            Action::Quit => return false,
            Action::Run(command) => self.run_command(&command),
        }
        true
    }

    fn run_command(&mut self, command: &str) {
        let raw = match self.executor.execute(command) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("command failed to start: {}", e);
                format!("{}: {}\n", command, e).into_bytes()
            }
        };
        let echoed = to_crlf(&raw);
        self.write(&echoed);

        // Command output is always followed by a prompt on a live terminal
        let prompt = self.reader.options().prompt.clone();
        let output = self
            .reader
            .parser_mut()
            .parse_output_lines(&[echoed, prompt.into_bytes()]);

        info!(command = %command, output_lines = output.lines().count(), "command recorded");
        self.records.push(CommandRecord {
            command: command.to_string(),
            output,
        });
    }

    fn list(&mut self, targets: &[String]) {
        if targets.is_empty() {
            self.write(b"No targets\r\n");
            return;
        }
        let index_width = targets.len().to_string().len();
        let name_width = max_display_width(targets);
        let mut out = String::new();
        for (i, target) in targets.iter().enumerate() {
            let row = format_columns(&[index_width, name_width], &[(i + 1).to_string(), target.clone()]);
            out.push_str(row.trim_end());
            out.push_str("\r\n");
        }
        self.write(out.as_bytes());
    }

    fn write(&mut self, data: &[u8]) {
        if let Err(e) = self.peer.send(data) {
            debug!("peer write failed: {}", e);
        }
    }
}

/// Raw-mode terminals need CR before every LF
fn to_crlf(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut prev = 0u8;
    for &b in data {
        if b == b'\n' && prev != b'\r' {
            out.push(b'\r');
        }
        out.push(b);
        prev = b;
    }
    out
}
