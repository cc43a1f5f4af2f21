//! Line input for the interactive session.
//!
//! Reads go through [`LineInput`] so the session can be driven by a script
//! in tests; [`ConsoleInput`] is the terminal-backed implementation.

use std::io::{self, BufRead};

use console::Term;

/// Source of answers to interactive prompts.
pub trait LineInput: Send + Sync {
    /// Show `prompt` and return one line of input, trimmed.
    fn read_line(&self, prompt: &str) -> io::Result<String>;
}

/// Reads from the controlling terminal.
#[derive(Debug, Clone)]
pub struct ConsoleInput {
    term: Term,
}

impl ConsoleInput {
    pub fn new() -> Self {
        Self {
            term: Term::stdout(),
        }
    }
}

impl Default for ConsoleInput {
    fn default() -> Self {
        Self::new()
    }
}

impl LineInput for ConsoleInput {
    fn read_line(&self, prompt: &str) -> io::Result<String> {
        self.term.write_str(prompt)?;
        self.term.flush()?;
        if self.term.is_term() {
            return Ok(self.term.read_line()?.trim().to_string());
        }

        // Piped input: stop on EOF instead of re-prompting forever
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "input closed"));
        }
        Ok(line.trim().to_string())
    }
}

/// Top-level menu entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Quick,
    ManualResolution,
    AudioOnly,
}

impl MenuChoice {
    pub const ENTRIES: [(&'static str, MenuChoice); 3] = [
        ("Quick download (best available, MP4)", MenuChoice::Quick),
        ("Choose resolution manually", MenuChoice::ManualResolution),
        ("Audio only (MP3)", MenuChoice::AudioOnly),
    ];

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::Quick),
            "2" => Some(Self::ManualResolution),
            "3" => Some(Self::AudioOnly),
            _ => None,
        }
    }
}

/// 1-based pick from a list of `len` entries
pub fn parse_index(input: &str, len: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Some(n - 1),
        _ => None,
    }
}

/// Only an explicit `y` confirms
pub fn is_yes(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("y")
}
