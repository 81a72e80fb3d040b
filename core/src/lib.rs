//! # Logview Core
//!
//! Classified HTML rendering and contextual regex search for IRC log trees.
//!
//! ## Philosophy
//!
//! The engine turns raw, externally produced log lines into safe,
//! order-preserving markup fragments:
//! - An ordered rule table tags substrings with semantic roles
//!   (timestamp, nickname, keyword, …), first matching rule wins
//! - A sweep-line partitioner merges overlapping and nested spans (rule
//!   output plus ad-hoc search-match spans) into contiguous, non-overlapping
//!   chunks that reconstruct the line exactly
//! - Search streams blocks of matching lines with bounded context, coalescing
//!   adjacent matches, so a result cap stops the tree walk early
//! - Every filesystem access goes through a path sandbox; nothing outside the
//!   configured root is ever read
//!
//! ## Architecture
//!
//! ```text
//! Request path
//!     │
//!     ├──> Sandbox ── canonicalize + containment check
//!     │
//!     ├──> per line: classify ──> Span[]
//!     │                │
//!     │                └──> chunkify (+ search-match spans) ──> Chunk[]
//!     │                         │
//!     │                         └──> render ──> { timestamp, nickname, message }
//!     │
//!     └──> search: walk ──> ContextualGrep ──> MatchBlock ──> SearchHit
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use logview_core::{Sandbox, Searcher, ViewerConfig};
//!
//! # fn main() -> logview_core::Result<()> {
//! let config = ViewerConfig::default();
//! let sandbox = Sandbox::new("/var/lib/znc/moddata/log")?;
//! let searcher = Searcher::new(&sandbox, "", r"deploy.*failed", &config)?;
//! for hit in searcher.take(config.max_results) {
//!     let hit = hit?;
//!     println!("{}#L{}", hit.file.display(), hit.first_line);
//! }
//! # Ok(())
//! # }
//! ```

mod chunk;
mod classify;
mod config;
mod error;
mod grep;
mod listing;
mod render;
mod sandbox;
mod search;

pub use chunk::{Chunk, Span, chunkify};
pub use classify::{Label, classify};
pub use config::ViewerConfig;
pub use error::{Result, ViewerError};
pub use grep::{
    ContextualGrep, GrepLine, LossyLines, MatchBlock, compile_pattern, read_lines_lossy,
};
pub use listing::{Crumb, DirEntryInfo, breadcrumbs, list_dir, pretty_number, walk_files};
pub use render::{RenderedLine, color_bucket, html_escape, render_line};
pub use sandbox::{EntryKind, Sandbox, SandboxedPath};
pub use search::{SearchHit, Searcher};
