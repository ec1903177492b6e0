//! Command and output reconstruction
//!
//! Interactive input arrives as keystrokes, not text: a user may type, erase,
//! and retype, and a shell may redraw the line around them. Rather than
//! replaying edits by hand, the parser renders the bytes on a virtual screen
//! and reads back what a person would have seen.

use regex::Regex;
use tracing::debug;

use super::screen::VirtualScreen;
use crate::error::{Error, Result};

/// Matches `user@host$ `, `[user@host ~]# ` and `mysql> ` style prompts
pub const DEFAULT_PROMPT_PATTERN: &str = r"^\[?.*@.*\]?[\$#]\s|mysql>\s";

/// Compiled pattern for prompt residue at the start of a command line
#[derive(Debug, Clone)]
pub struct PromptPattern {
    regex: Regex,
}

impl Default for PromptPattern {
    fn default() -> Self {
        Self {
            regex: Regex::new(DEFAULT_PROMPT_PATTERN).expect("default prompt pattern is valid"),
        }
    }
}

impl PromptPattern {
    /// Compile a custom prompt pattern
    pub fn new(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::PromptPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { regex })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Remove the first prompt match from a line
    pub fn strip<'a>(&self, line: &'a str) -> std::borrow::Cow<'a, str> {
        self.regex.replace(line, "")
    }
}

/// Rebuilds typed commands and command output from raw terminal bytes.
///
/// Every parse starts from and returns to a blank screen, so one parser can
/// serve any number of sequential calls. It must not be shared between
/// concurrent parses.
#[derive(Debug)]
pub struct TtyParser {
    screen: VirtualScreen,
    prompt: PromptPattern,
}

impl Default for TtyParser {
    fn default() -> Self {
        Self::new(VirtualScreen::default(), PromptPattern::default())
    }
}

impl TtyParser {
    pub fn new(screen: VirtualScreen, prompt: PromptPattern) -> Self {
        Self { screen, prompt }
    }

    /// Parser with a screen of the given size and the default prompt pattern
    pub fn with_size(width: u16, height: u16) -> Self {
        Self::new(VirtualScreen::new(width, height), PromptPattern::default())
    }

    pub fn prompt_pattern(&self) -> &PromptPattern {
        &self.prompt
    }

    /// The underlying screen. Blank between parse calls.
    pub fn screen(&self) -> &VirtualScreen {
        &self.screen
    }

    /// Reconstruct the command a user typed.
    ///
    /// Only the last non-blank rendered row is kept; earlier rows of a
    /// multi-line paste are dropped. A leading prompt is stripped once.
    pub fn parse_input<B: AsRef<[u8]>>(&mut self, chunks: &[B]) -> String {
        self.feed_all(chunks);

        let lines = self.screen.rendered_lines();
        let command = lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .last()
            .map(|line| self.prompt.strip(line).trim().to_string())
            .unwrap_or_default();

        self.screen.reset();
        debug!(len = command.len(), "parsed input line");
        command
    }

    /// Reconstruct command output, dropping the trailing prompt row.
    ///
    /// Non-blank rows are joined with `sep`. With fewer than two non-blank
    /// rows there is nothing but the prompt and the result is empty.
    pub fn parse_output<B: AsRef<[u8]>>(&mut self, chunks: &[B], sep: &str) -> String {
        self.feed_all(chunks);

        let mut output: Vec<String> = self
            .screen
            .rendered_lines()
            .into_iter()
            .filter(|line| !line.trim().is_empty())
            .collect();
        output.pop();

        self.screen.reset();
        debug!(lines = output.len(), "parsed command output");
        output.join(sep).trim().to_string()
    }

    /// [`parse_output`](Self::parse_output) with `\n` as separator
    pub fn parse_output_lines<B: AsRef<[u8]>>(&mut self, chunks: &[B]) -> String {
        self.parse_output(chunks, "\n")
    }

    fn feed_all<B: AsRef<[u8]>>(&mut self, chunks: &[B]) {
        for chunk in chunks {
            self.screen.feed(chunk.as_ref());
        }
    }
}
