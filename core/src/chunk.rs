//! Span partitioning: merge arbitrarily overlapping or nested labeled spans
//! into an ordered run of non-overlapping chunks.

use crate::classify::Label;
use std::collections::BTreeSet;

/// A labeled half-open byte range within one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub label: Label,
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(label: Label, start: usize, end: usize) -> Self {
        Self { label, start, end }
    }
}

/// A maximal run of text sharing exactly one label set.
///
/// Concatenating the texts of a chunk sequence reproduces the partitioned
/// line exactly; chunks are contiguous and never overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Labels of every span covering this chunk, in span input order
    pub labels: Vec<Label>,
    pub text: &'a str,
}

/// Partition `line` into chunks along every span boundary.
///
/// Sweep-line interval merge: collect all span boundaries plus `0` and
/// `line.len()` into a sorted breakpoint set, then label each consecutive
/// `[a, b)` pair with every span fully containing it. Empty and inverted
/// spans are ignored. Each line is partitioned independently.
pub fn chunkify<'a>(line: &'a str, spans: &[Span]) -> Vec<Chunk<'a>> {
    let mut breakpoints = BTreeSet::new();
    breakpoints.insert(0);
    breakpoints.insert(line.len());
    for span in spans {
        if span.start >= span.end {
            continue;
        }
        breakpoints.insert(span.start);
        breakpoints.insert(span.end);
    }

    let cuts: Vec<usize> = breakpoints.into_iter().collect();
    let mut chunks = Vec::with_capacity(cuts.len().saturating_sub(1));
    for pair in cuts.windows(2) {
        let (start, end) = (pair[0], pair[1]);
        let labels = spans
            .iter()
            .filter(|span| span.start < span.end && span.start <= start && end <= span.end)
            .map(|span| span.label)
            .collect();
        chunks.push(Chunk {
            labels,
            text: &line[start..end],
        });
    }

    chunks
}
