//! Ordered pattern rules that tag substrings of a log line with semantic
//! roles.
//!
//! The table walks in a fixed order and the first rule whose pattern matches
//! the line wins; every other rule is ignored for that line. The patterns are
//! derived from the irssi/xchat log grammars popularized by pygments.

use crate::chunk::Span;
use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Semantic role attached to a span of one log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Label {
    /// De-emphasized text: log open/close markers, join/part details
    Muted,
    /// Leading timestamp, including enclosing brackets and trailing space
    Timestamp,
    /// The `<nick>` cluster including the angle brackets
    NicknameBracket,
    /// The nickname itself
    Nickname,
    /// A `word:` mention immediately after the nickname bracket
    Prefix,
    /// Structural marker: the `*` of an action line, `***` or `-!-` of a
    /// join/part line
    Keyword,
    /// A search match occurrence
    SearchMatch,
    /// Synthesized color bucket for nickname text
    NicknameColor(u32),
}

impl Label {
    /// CSS class fragment for this label; the renderer prepends the
    /// configured namespace prefix.
    pub fn class_name(self) -> Cow<'static, str> {
        match self {
            Label::Muted => Cow::Borrowed("muted"),
            Label::Timestamp => Cow::Borrowed("timestamp"),
            Label::NicknameBracket => Cow::Borrowed("nickname-bracket"),
            Label::Nickname => Cow::Borrowed("nickname"),
            Label::Prefix => Cow::Borrowed("prefix"),
            Label::Keyword => Cow::Borrowed("keyword"),
            Label::SearchMatch => Cow::Borrowed("searchword"),
            Label::NicknameColor(bucket) => Cow::Owned(format!("nickname-color-{bucket}")),
        }
    }
}

/// Reusable timestamp grammar fragment. One optional capture group: an
/// optional bracket/paren-delimited cluster of date digit groups, a `T` or
/// space separator, and one or more time digit groups, with the delimiter and
/// trailing whitespace absorbed into the span. When the group does not
/// participate no span is emitted.
const TIMESTAMP: &str = r"
    (
      # irssi / xchat and friends
      (?: \[ | \( )?                 # opening bracket or paren
        (?:
            (?: (?:\d{1,4} [-/])*    # date as - or /-separated digit groups
                (?:\d{1,4})
             [T\x20])?               # date/time separator: T or space
            (?: \d?\d [:.])*         # time as :/.-separated 1-2 digit groups
                (?: \d?\d)
        )
      (?: \] | \) )? \s+             # closing bracket or paren
    )?
";

struct Rule {
    pattern: Regex,
    /// Label covering the entire line when the rule matches
    whole: Option<Label>,
    /// Per-capture-group labels, position-aligned; `None` leaves the group
    /// unlabeled
    groups: &'static [Option<Label>],
}

impl Rule {
    fn new(source: String, whole: Option<Label>, groups: &'static [Option<Label>]) -> Self {
        Self {
            pattern: Regex::new(&source).expect("rule pattern compiles"),
            whole,
            groups,
        }
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        // log open/close marker
        Rule::new(
            r"(?x) ^ \*{4} (.*) \*{4} $".to_string(),
            Some(Label::Muted),
            &[None],
        ),
        // a line that is only a timestamp and a bracketed nickname; ordered
        // before the general message rule, which would mis-tag the trailer
        Rule::new(
            format!(r"(?x) ^ {TIMESTAMP} (\s* < ([^>]*) > \s*) $"),
            None,
            &[
                Some(Label::Timestamp),
                Some(Label::NicknameBracket),
                Some(Label::Nickname),
            ],
        ),
        // normal messages, with an optional `word:` mention after the
        // bracket. `word://` is a URL, not a mention: the regex crate has no
        // lookahead, so `(?!//)` becomes an explicit guard that consumes at
        // most two unlabeled message-body characters.
        Rule::new(
            format!(r"(?x) ^ {TIMESTAMP} (\s* < (.*?) > \s*) (?: (\S+) : (?: [^/] | /[^/] | /?$ ) )? .* $"),
            None,
            &[
                Some(Label::Timestamp),
                Some(Label::NicknameBracket),
                Some(Label::Nickname),
                Some(Label::Prefix),
            ],
        ),
        // action messages: `* nick does something`
        Rule::new(
            format!(r"(?x) ^ {TIMESTAMP} (\s* [*] \s+) (\S+ \s+) .* $"),
            None,
            &[
                Some(Label::Timestamp),
                Some(Label::Keyword),
                Some(Label::Nickname),
            ],
        ),
        // join / part / mode lines: `***` or bracket-punctuation like `-!-`
        Rule::new(
            format!(r"(?x) ^ {TIMESTAMP} (\s* (?: \*{{3}} | <? - [!@=P]? - >? ) \s*) (.*) $"),
            None,
            &[
                Some(Label::Timestamp),
                Some(Label::Keyword),
                Some(Label::Muted),
            ],
        ),
        // catch-all: salvage a leading timestamp from anything else
        Rule::new(
            format!(r"(?x) ^ {TIMESTAMP} .* $"),
            None,
            &[Some(Label::Timestamp)],
        ),
    ]
});

/// Tag one log line with role spans.
///
/// First-match-wins over the rule table: the earliest matching rule supplies
/// every span, later rules are ignored. A line matching no rule (or only the
/// catch-all with no timestamp) yields an empty set and renders unlabeled.
pub fn classify(line: &str) -> Vec<Span> {
    for rule in RULES.iter() {
        let Some(caps) = rule.pattern.captures(line) else {
            continue;
        };

        let mut spans = Vec::new();
        if let Some(label) = rule.whole {
            if let Some(m) = caps.get(0) {
                if m.start() < m.end() {
                    spans.push(Span::new(label, m.start(), m.end()));
                }
            }
        }
        for (i, group) in rule.groups.iter().enumerate() {
            let Some(label) = group else { continue };
            let Some(m) = caps.get(i + 1) else { continue };
            if m.start() < m.end() {
                spans.push(Span::new(*label, m.start(), m.end()));
            }
        }
        return spans;
    }

    Vec::new()
}
