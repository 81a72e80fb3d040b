//! Streaming regex search over one file with contextual surrounding lines.
//!
//! Matches are grouped into blocks: up to `context` lines before the first
//! match, the matching lines themselves, and up to `context` lines after the
//! last one. Matches whose context windows touch are coalesced into a single
//! block instead of emitted separately.

use crate::chunk::Span;
use crate::classify::Label;
use crate::error::{Result, ViewerError};
use log::debug;
use regex::Regex;
use std::collections::VecDeque;
use std::io::{self, BufRead};
use std::mem;

/// Compile a user-supplied search pattern.
///
/// Rejects patterns that fail to compile and patterns that match the empty
/// string; the latter would match at every position and defeat context
/// coalescing. Runs before any file is opened.
pub fn compile_pattern(source: &str) -> Result<Regex> {
    let pattern =
        Regex::new(source).map_err(|err| ViewerError::invalid_pattern(err.to_string()))?;
    if pattern.is_match("") {
        return Err(ViewerError::invalid_pattern(
            "pattern matches the empty string",
        ));
    }
    Ok(pattern)
}

/// Line reader that replaces invalid UTF-8 instead of failing and strips
/// `\n` / `\r\n` terminators.
pub struct LossyLines<R> {
    reader: R,
}

/// Read lines from `reader`, replacing invalid UTF-8 bytes.
pub fn read_lines_lossy<R: BufRead>(reader: R) -> LossyLines<R> {
    LossyLines { reader }
}

impl<R: BufRead> Iterator for LossyLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut buf = Vec::new();
        match self.reader.read_until(b'\n', &mut buf) {
            Ok(0) => None,
            Ok(_) => {
                if buf.last() == Some(&b'\n') {
                    buf.pop();
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&buf).into_owned()))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// One line inside a [`MatchBlock`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrepLine {
    /// 1-based line number within the file
    pub number: usize,

    /// The line text, terminator stripped
    pub text: String,

    /// Whether this line matched the pattern (as opposed to being context)
    pub is_match: bool,

    /// One span per non-overlapping match occurrence; empty for context lines
    pub match_spans: Vec<Span>,
}

/// One contiguous region of a file: leading context, one or more matching
/// lines, trailing context.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchBlock {
    pub lines: Vec<GrepLine>,
}

impl MatchBlock {
    /// 1-based number of the block's first line, for `#L` style anchors.
    pub fn first_line(&self) -> usize {
        self.lines.first().map(|line| line.number).unwrap_or(0)
    }
}

/// Streaming adapter from lines to match blocks.
///
/// Holds at most `context + 1` lines of look-back plus the currently open
/// block; input is consumed lazily, so dropping the iterator abandons the
/// rest of the file unread.
pub struct ContextualGrep<I> {
    lines: I,
    pattern: Regex,
    /// 1-based resume hint: earlier lines feed the look-back ring but are
    /// not match-tested
    start_line: Option<usize>,
    context: usize,
    lookback: VecDeque<GrepLine>,
    open: Vec<GrepLine>,
    post_remaining: usize,
    next_index: usize,
    done: bool,
}

impl<I> ContextualGrep<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    pub fn new(lines: I, pattern: Regex, start_line: Option<usize>, context: usize) -> Self {
        Self {
            lines,
            pattern,
            start_line,
            context,
            lookback: VecDeque::with_capacity(context + 1),
            open: Vec::new(),
            post_remaining: 0,
            next_index: 0,
            done: false,
        }
    }

    fn take_open(&mut self) -> MatchBlock {
        MatchBlock {
            lines: mem::take(&mut self.open),
        }
    }
}

impl<I> Iterator for ContextualGrep<I>
where
    I: Iterator<Item = io::Result<String>>,
{
    type Item = Result<MatchBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        loop {
            let text = match self.lines.next() {
                None => {
                    self.done = true;
                    if self.open.is_empty() {
                        return None;
                    }
                    return Some(Ok(self.take_open()));
                }
                Some(Err(err)) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
                Some(Ok(text)) => text,
            };
            let number = self.next_index + 1;
            self.next_index += 1;

            // feed the look-back ring before anything else, so skipped and
            // non-matching lines are available as pre-context later
            while self.lookback.len() > self.context {
                self.lookback.pop_front();
            }
            self.lookback.push_back(GrepLine {
                number,
                text: text.clone(),
                is_match: false,
                match_spans: Vec::new(),
            });

            if let Some(start) = self.start_line {
                if number < start {
                    continue;
                }
            }

            if !self.pattern.is_match(&text) {
                if self.post_remaining > 0 {
                    self.open.push(GrepLine {
                        number,
                        text,
                        is_match: false,
                        match_spans: Vec::new(),
                    });
                    self.post_remaining -= 1;
                }
                if !self.open.is_empty() && self.post_remaining == 0 {
                    return Some(Ok(self.take_open()));
                }
                continue;
            }

            let match_spans = self
                .pattern
                .find_iter(&text)
                .map(|m| Span::new(Label::SearchMatch, m.start(), m.end()))
                .collect();
            let entry = GrepLine {
                number,
                text,
                is_match: true,
                match_spans,
            };

            if self.open.is_empty() {
                // new block: seed with the pre-context ring, whose last
                // entry is the current line
                debug!("match block opens at line {number}");
                self.open.extend(self.lookback.iter().cloned());
                self.open.pop();
            }
            self.open.push(entry);
            self.post_remaining = self.context;
        }
    }
}
