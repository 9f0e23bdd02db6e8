//! Replays a line-oriented command script against a document.
//!
//! Script format, one command per line (blank lines and `#` comments are
//! skipped):
//!
//! ```text
//! # cursor to line 6, column 7
//! move 6 7
//! key ctrl+shift+Right
//! type hello\n
//! clip some text
//! word 1 6
//! goto 9
//! undo
//! redo
//! tick
//! ```
//!
//! `type` and `clip` take the rest of the line verbatim, with `\n`, `\t`,
//! `\\` and `\#` escapes. `tick` closes the typing run and settles
//! highlighting.

use anyhow::{anyhow, bail, Context, Result};
use codepad_core::constants::DEFAULT_BRACE_PAIRS;
use codepad_core::input::parse_chord;
use codepad_core::{
    ClassifiedSpan, Clipboard, Editor, EditorConfig, EditorEvent, Key, MemoryClipboard, Modifiers,
    MoveFlags, Position, Selection, TokenClassifier,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// How long the replay waits for a background highlight pass to land.
pub const HIGHLIGHT_SETTLE_TIMEOUT: Duration = Duration::from_secs(2);

/// One parsed script command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Move { line: usize, column: usize },
    Key { key: Key, modifiers: Modifiers },
    Type(String),
    Clip(String),
    Word { line: usize, column: usize },
    Goto(usize),
    Undo,
    Redo,
    Tick,
}

/// Parse a whole script.
///
/// # Errors
/// Fails on the first malformed line, naming its line number.
pub fn parse_script(source: &str) -> Result<Vec<Command>> {
    source
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(|(idx, line)| {
            parse_command(line).with_context(|| format!("script line {}: {:?}", idx + 1, line))
        })
        .collect()
}

fn parse_command(line: &str) -> Result<Command> {
    let line = line.trim_start();
    let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
    let command = match verb.to_ascii_lowercase().as_str() {
        "move" => {
            let (line, column) = parse_pair(rest)?;
            Command::Move { line, column }
        }
        "word" => {
            let (line, column) = parse_pair(rest)?;
            Command::Word { line, column }
        }
        "goto" => Command::Goto(parse_number(rest.trim())?),
        "key" => {
            let (key, modifiers) = parse_chord(strip_comment(rest))?;
            Command::Key { key, modifiers }
        }
        "type" => Command::Type(unescape(rest)?),
        "clip" => Command::Clip(unescape(rest)?),
        "undo" => Command::Undo,
        "redo" => Command::Redo,
        "tick" => Command::Tick,
        other => bail!("unknown command `{}`", other),
    };
    Ok(command)
}

fn strip_comment(text: &str) -> &str {
    text.split_once(" #").map_or(text, |(head, _)| head).trim()
}

fn parse_number(text: &str) -> Result<usize> {
    text.parse()
        .map_err(|_| anyhow!("expected a number, got `{}`", text))
}

fn parse_pair(text: &str) -> Result<(usize, usize)> {
    let mut parts = strip_comment(text).split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(line), Some(column), None) => Ok((parse_number(line)?, parse_number(column)?)),
        _ => bail!("expected `LINE COLUMN`, got `{}`", text.trim()),
    }
}

fn unescape(text: &str) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('\\') => out.push('\\'),
            Some('#') => out.push('#'),
            Some(other) => bail!("unknown escape `\\{}`", other),
            None => bail!("dangling `\\` at end of text"),
        }
    }
    Ok(out)
}

/// Per-line slice of a [`ReplayReport`].
#[derive(Debug, Serialize)]
pub struct LineReport {
    pub number: usize,
    pub text: String,
    pub spans: Vec<ClassifiedSpan>,
}

/// Editor state after a replay, suitable for `--json` output.
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub content: String,
    pub cursor: Position,
    pub selection: Option<Selection>,
    pub selected_text: String,
    pub line_count: usize,
    pub version: u64,
    pub can_undo: bool,
    pub can_redo: bool,
    pub lines: Vec<LineReport>,
    pub events: Vec<EditorEvent>,
}

/// Drives an [`Editor`] with a shared in-memory clipboard.
pub struct Replayer {
    editor: Editor,
    clipboard: MemoryClipboard,
    events: Vec<EditorEvent>,
}

impl Replayer {
    /// Editor over `content` with the built-in token classifier and the
    /// default brace pairs.
    ///
    /// # Errors
    /// Fails when the highlight worker cannot start.
    pub fn new(config: EditorConfig, content: &str) -> Result<Self> {
        let clipboard = MemoryClipboard::default();
        let mut editor = Editor::new(config)
            .with_clipboard(Box::new(clipboard.clone()))
            .with_brace_pairs(DEFAULT_BRACE_PAIRS.iter().copied())
            .with_classifier(Arc::new(TokenClassifier))
            .context("starting highlighter")?;
        editor.set_content(content);
        Ok(Self {
            editor,
            clipboard,
            events: Vec::new(),
        })
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    /// Run one command.
    ///
    /// # Errors
    /// Only clipboard failures surface here; edits themselves never fail.
    pub fn apply(&mut self, command: &Command) -> Result<()> {
        tracing::debug!(?command, "replay");
        match command {
            Command::Move { line, column } => {
                self.editor.move_cursor_to(*line, *column, MoveFlags::NONE)
            }
            Command::Key { key, modifiers } => {
                if !self.editor.handle_key(*key, *modifiers) {
                    tracing::warn!(%key, ?modifiers, "unhandled key chord");
                }
            }
            Command::Type(text) => text.chars().for_each(|ch| self.editor.handle_character(ch)),
            Command::Clip(text) => self.clipboard.set_text(text)?,
            Command::Word { line, column } => self.editor.highlight_word_at(*line, *column),
            Command::Goto(line) => self.editor.goto_line(*line),
            Command::Undo => {
                self.editor.undo();
            }
            Command::Redo => {
                self.editor.redo();
            }
            Command::Tick => {
                self.settle();
            }
        }
        self.events.extend(self.editor.drain_events());
        Ok(())
    }

    /// Run every command in order.
    ///
    /// # Errors
    /// Stops at the first failing command.
    pub fn run(&mut self, commands: &[Command]) -> Result<()> {
        for (idx, command) in commands.iter().enumerate() {
            self.apply(command)
                .with_context(|| format!("command {} ({:?})", idx + 1, command))?;
        }
        Ok(())
    }

    /// Commit pending text and wait for the resulting highlight pass.
    ///
    /// # Returns
    /// Number of lines that received spans.
    pub fn settle(&mut self) -> usize {
        self.editor.flush();
        let mut applied = self.editor.tick();
        if applied == 0 && self.editor.config().background_highlight {
            applied = self.editor.wait_for_highlight(HIGHLIGHT_SETTLE_TIMEOUT);
        }
        self.events.extend(self.editor.drain_events());
        applied
    }

    /// Settle and snapshot the editor.
    pub fn finish(mut self) -> ReplayReport {
        self.settle();
        let editor = &self.editor;
        let lines = editor
            .lines()
            .lines()
            .iter()
            .map(|line| LineReport {
                number: line.number(),
                text: line.text().to_string(),
                spans: line.spans().to_vec(),
            })
            .collect();
        ReplayReport {
            content: editor.content(),
            cursor: editor.cursor(),
            selection: editor.selection(),
            selected_text: editor.selected_text(),
            line_count: editor.line_count(),
            version: editor.version(),
            can_undo: editor.can_undo(),
            can_redo: editor.can_redo(),
            lines,
            events: self.events,
        }
    }
}

/// Parse `script`, replay it over `content`, and report the final state.
///
/// # Errors
/// Propagates script parse errors and command failures.
pub fn replay(config: EditorConfig, content: &str, script: &str) -> Result<ReplayReport> {
    let commands = parse_script(script)?;
    let mut replayer = Replayer::new(config, content)?;
    replayer.run(&commands)?;
    Ok(replayer.finish())
}
