//! Tree-wide contextual search: walk a log subtree, grep every file, render
//! each match block.
//!
//! Hits stream out one at a time, so a caller enforcing the result cap with
//! `take(n)` stops the tree walk early; files past the cap are never opened.

use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::grep::{ContextualGrep, LossyLines, compile_pattern, read_lines_lossy};
use crate::listing::walk_files;
use crate::render::{RenderedLine, render_line};
use crate::sandbox::{EntryKind, Sandbox};
use log::debug;
use regex::Regex;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

/// One rendered match block from one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    /// Sandbox-relative path of the file the block came from
    pub file: PathBuf,

    /// 1-based number of the block's first line, for `#L` style anchors
    pub first_line: usize,

    /// The block's lines, match lines highlighted and match occurrences
    /// tagged for the renderer
    pub lines: Vec<RenderedLine>,
}

type FileGrep = ContextualGrep<LossyLines<BufReader<File>>>;

/// Streaming search over a log subtree.
pub struct Searcher {
    pattern: Regex,
    config: ViewerConfig,
    walk: Box<dyn Iterator<Item = Result<crate::sandbox::SandboxedPath>>>,
    current: Option<(PathBuf, FileGrep)>,
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("pattern", &self.pattern)
            .field("config", &self.config)
            .field("current_file", &self.current.as_ref().map(|(path, _)| path))
            .finish_non_exhaustive()
    }
}

impl Searcher {
    /// Validate the pattern and resolve the starting directory, before any
    /// log file is opened.
    pub fn new(
        sandbox: &Sandbox,
        relative: &str,
        pattern_source: &str,
        config: &ViewerConfig,
    ) -> Result<Self> {
        config.validate().map_err(ViewerError::InvalidConfig)?;
        let pattern = compile_pattern(pattern_source)?;
        let start = sandbox.resolve(relative, EntryKind::Directory)?;
        debug!(
            "searching {} for /{pattern_source}/",
            start.absolute.display()
        );
        Ok(Self {
            pattern,
            config: config.clone(),
            walk: Box::new(walk_files(sandbox, &start)),
            current: None,
        })
    }

    fn open_file(&mut self, relative: PathBuf, absolute: PathBuf) -> Result<()> {
        debug!("grepping {}", relative.display());
        let file = File::open(&absolute)?;
        let grep = ContextualGrep::new(
            read_lines_lossy(BufReader::new(file)),
            self.pattern.clone(),
            None,
            self.config.context_lines,
        );
        self.current = Some((relative, grep));
        Ok(())
    }
}

impl Iterator for Searcher {
    type Item = Result<SearchHit>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((relative, grep)) = &mut self.current {
                match grep.next() {
                    Some(Ok(block)) => {
                        let first_line = block.first_line();
                        let lines = block
                            .lines
                            .iter()
                            .map(|line| {
                                render_line(
                                    &line.text,
                                    &line.match_spans,
                                    line.number,
                                    line.is_match,
                                    &self.config,
                                )
                            })
                            .collect();
                        return Some(Ok(SearchHit {
                            file: relative.clone(),
                            first_line,
                            lines,
                        }));
                    }
                    Some(Err(err)) => {
                        self.current = None;
                        return Some(Err(err));
                    }
                    None => {
                        self.current = None;
                    }
                }
                continue;
            }

            match self.walk.next()? {
                Ok(file) => {
                    if let Err(err) = self.open_file(file.relative, file.absolute) {
                        return Some(Err(err));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
