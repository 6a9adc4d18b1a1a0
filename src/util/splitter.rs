//! Comment-aware statement splitting for SQL scripts.
//!
//! The scanner walks the script once, tracking whether it sits inside a
//! string literal, a delimited identifier or a comment. Only a delimiter seen
//! at the lexical top level ends a statement. Comment text is dropped; the
//! newline ending a line comment is kept so line structure survives, and a
//! block comment wedged between two tokens leaves a single space behind.

use crate::engine::dialect::SqlDialect;
use crate::error::{DatasourceError, Result};
use std::iter::{FusedIterator, Peekable};
use std::str::CharIndices;

/// Lexical state of the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexState {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    BracketedIdentifier,
    LineComment,
    BlockComment,
}

impl LexState {
    pub fn describe(self) -> &'static str {
        match self {
            LexState::Normal => "top-level text",
            LexState::SingleQuoted => "single-quoted string",
            LexState::DoubleQuoted => "double-quoted identifier",
            LexState::BracketedIdentifier => "bracketed identifier",
            LexState::LineComment => "line comment",
            LexState::BlockComment => "block comment",
        }
    }
}

/// Lazily yields the statements of a script, in order.
pub struct Statements<'a> {
    chars: Peekable<CharIndices<'a>>,
    dialect: &'a dyn SqlDialect,
    state: LexState,
    region_start: usize,
    buffer: String,
}

impl<'a> Statements<'a> {
    pub fn new(script: &'a str, dialect: &'a dyn SqlDialect) -> Self {
        Self {
            chars: script.char_indices().peekable(),
            dialect,
            state: LexState::Normal,
            region_start: 0,
            buffer: String::new(),
        }
    }

    /// State the scanner is currently in. Once the iterator is exhausted this
    /// is the state the script ended in.
    pub fn state(&self) -> LexState {
        self.state
    }

    /// Byte offset where the current non-top-level region opened.
    pub fn region_start(&self) -> usize {
        self.region_start
    }

    fn enter(&mut self, state: LexState, offset: usize) {
        self.state = state;
        self.region_start = offset;
    }

    fn next_is(&mut self, expected: char) -> bool {
        matches!(self.chars.peek(), Some(&(_, c)) if c == expected)
    }

    fn closing_char(&self) -> Option<char> {
        match self.state {
            LexState::SingleQuoted => Some('\''),
            LexState::DoubleQuoted => Some('"'),
            LexState::BracketedIdentifier => self.dialect.identifier_quotes().map(|(_, close)| close),
            _ => None,
        }
    }

    fn opening_state(&self, ch: char) -> Option<LexState> {
        match ch {
            '\'' => Some(LexState::SingleQuoted),
            '"' => Some(LexState::DoubleQuoted),
            _ => match self.dialect.identifier_quotes() {
                Some((open, _)) if open == ch => Some(LexState::BracketedIdentifier),
                _ => None,
            },
        }
    }

    /// Keep the text on both sides of a removed block comment from fusing
    /// into one token (`-/**/-` must not become `--`).
    fn separate_tokens(&mut self) {
        let left = self.buffer.chars().next_back().is_some_and(|c| !c.is_whitespace());
        let right = matches!(self.chars.peek(), Some(&(_, c)) if !c.is_whitespace());
        if left && right {
            self.buffer.push(' ');
        }
    }

    fn take_statement(&mut self) -> Option<String> {
        let trimmed = self.buffer.trim();
        let statement = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self.buffer.clear();
        statement
    }
}

impl Iterator for Statements<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        while let Some((offset, ch)) = self.chars.next() {
            match self.state {
                LexState::Normal => {
                    if ch == self.dialect.statement_delimiter() {
                        self.buffer.push(ch);
                        if let Some(statement) = self.take_statement() {
                            return Some(statement);
                        }
                    } else if ch == '-' && self.next_is('-') {
                        self.chars.next();
                        self.enter(LexState::LineComment, offset);
                    } else if ch == '/' && self.next_is('*') {
                        self.chars.next();
                        self.enter(LexState::BlockComment, offset);
                    } else if let Some(state) = self.opening_state(ch) {
                        self.enter(state, offset);
                        self.buffer.push(ch);
                    } else {
                        self.buffer.push(ch);
                    }
                }
                LexState::SingleQuoted | LexState::DoubleQuoted | LexState::BracketedIdentifier => {
                    self.buffer.push(ch);
                    if Some(ch) == self.closing_char() {
                        // A doubled closer is an escaped literal character.
                        if self.next_is(ch) {
                            self.chars.next();
                            self.buffer.push(ch);
                        } else {
                            self.state = LexState::Normal;
                        }
                    }
                }
                LexState::LineComment => {
                    if ch == '\n' {
                        self.buffer.push(ch);
                        self.state = LexState::Normal;
                    }
                }
                LexState::BlockComment => {
                    if ch == '*' && self.next_is('/') {
                        self.chars.next();
                        self.state = LexState::Normal;
                        self.separate_tokens();
                    }
                }
            }
        }

        // Whatever is left, including an unterminated region, is the tail.
        self.take_statement()
    }
}

impl FusedIterator for Statements<'_> {}

/// Split a script into statements, dropping comments.
///
/// Unterminated quotes, brackets and comments are tolerated: the scan simply
/// ends in that state and the buffered text becomes the last statement.
pub fn split(script: &str, dialect: &dyn SqlDialect) -> Vec<String> {
    Statements::new(script, dialect).collect()
}

/// Like [`split`], but rejects a script ending inside a string literal,
/// delimited identifier or block comment.
pub fn split_strict(script: &str, dialect: &dyn SqlDialect) -> Result<Vec<String>> {
    let mut statements = Statements::new(script, dialect);
    let collected: Vec<String> = statements.by_ref().collect();

    match statements.state() {
        LexState::Normal | LexState::LineComment => Ok(collected),
        state => Err(DatasourceError::UnterminatedRegion {
            region: state.describe(),
            offset: statements.region_start(),
        }),
    }
}
