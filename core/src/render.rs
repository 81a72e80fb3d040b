//! Turn classified chunks into escaped HTML fragments.
//!
//! One call renders one line; nothing is cached or shared between calls. The
//! line is expected to arrive with its terminator already stripped and is
//! never re-trimmed here, so caller-supplied match spans stay aligned.

use crate::chunk::{Span, chunkify};
use crate::classify::{Label, classify};
use crate::config::ViewerConfig;
use log::trace;
use serde::Serialize;

/// One rendered log line, split into the three logical fields the host
/// places into its own page template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedLine {
    /// Escaped markup for the leading timestamp, possibly empty
    pub timestamp: String,

    /// Escaped markup for the nickname cluster (bracket, action star, join
    /// marker), possibly empty
    pub nickname: String,

    /// Escaped markup for the message body
    pub message: String,

    /// 1-based line number
    pub number: usize,

    /// Whether this line is a search match
    pub highlighted: bool,
}

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// FNV-1a 32-bit. Spelled out rather than taken from `DefaultHasher` so the
/// nickname-to-bucket mapping is reproducible across builds.
fn fnv1a32(text: &str) -> u32 {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in text.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    hash
}

/// Deterministic color bucket for a nickname: identical text always lands in
/// the same bucket, different text spreads pseudo-randomly over the palette.
pub fn color_bucket(nickname: &str, buckets: u32) -> u32 {
    fnv1a32(nickname.trim()) % buckets.max(1)
}

/// Render one line: classify it, merge in `extra_spans` (e.g. search match
/// highlights), partition, and serialize the chunks into the three output
/// fields.
///
/// Chunks are bucketed left to right with a one-way latch: until a chunk
/// belongs to neither the nickname cluster nor the timestamp, structured
/// prefix parts go to their own fields; from the first "other" chunk on,
/// everything is message body. Chunks labeled as nickname or mention text
/// additionally get a synthesized color label derived from the chunk text.
pub fn render_line(
    line: &str,
    extra_spans: &[Span],
    number: usize,
    highlighted: bool,
    config: &ViewerConfig,
) -> RenderedLine {
    let mut spans = classify(line);
    spans.extend_from_slice(extra_spans);
    let chunks = chunkify(line, &spans);
    trace!("line {number}: {} spans, {} chunks", spans.len(), chunks.len());

    let mut timestamp = String::new();
    let mut nickname = String::new();
    let mut message = String::new();
    let mut in_other = false;

    for chunk in chunks {
        let mut labels = chunk.labels;
        if labels
            .iter()
            .any(|label| matches!(label, Label::Nickname | Label::Prefix))
        {
            labels.push(Label::NicknameColor(color_bucket(
                chunk.text,
                config.color_buckets,
            )));
        }

        let target = if in_other {
            &mut message
        } else if labels
            .iter()
            .any(|label| matches!(label, Label::NicknameBracket | Label::Keyword | Label::Nickname))
        {
            &mut nickname
        } else if labels.contains(&Label::Timestamp) {
            &mut timestamp
        } else {
            in_other = true;
            &mut message
        };
        push_chunk(target, &labels, chunk.text, &config.class_prefix);
    }

    RenderedLine {
        timestamp,
        nickname,
        message,
        number,
        highlighted,
    }
}

fn push_chunk(out: &mut String, labels: &[Label], text: &str, class_prefix: &str) {
    if labels.is_empty() {
        out.push_str(&html_escape(text));
        return;
    }

    out.push_str("<span class=\"");
    for (i, label) in labels.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(class_prefix);
        out.push_str(&label.class_name());
    }
    out.push_str("\">");
    out.push_str(&html_escape(text));
    out.push_str("</span>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn render(line: &str, extra: &[Span]) -> RenderedLine {
        render_line(line, extra, 1, false, &ViewerConfig::default())
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape(r#"<a href="x">&'y'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&amp;&#39;y&#39;&lt;/a&gt;"
        );
        assert_eq!(html_escape("plain"), "plain");
    }

    #[test]
    fn test_color_bucket_is_stable() {
        let a = color_bucket("bob", 10);
        assert_eq!(a, color_bucket("bob", 10));
        assert_eq!(a, color_bucket("  bob ", 10));
        assert!(a < 10);
        // fnv1a32("bob") == 2261164244
        assert_eq!(a, 4);
        assert_eq!(color_bucket("alice", 10), 9);
    }

    #[test]
    fn test_plain_line_goes_to_message() {
        let rendered = render("no structure here", &[]);
        assert_eq!(rendered.timestamp, "");
        assert_eq!(rendered.nickname, "");
        assert_eq!(rendered.message, "no structure here");
    }

    #[test]
    fn test_message_fields() {
        let rendered = render("[12:00] <bob> hello & goodbye", &[]);
        assert_eq!(
            rendered.timestamp,
            r#"<span class="log-timestamp">[12:00] </span>"#
        );
        assert_eq!(
            rendered.nickname,
            concat!(
                r#"<span class="log-nickname-bracket">&lt;</span>"#,
                r#"<span class="log-nickname-bracket log-nickname log-nickname-color-4">bob</span>"#,
                r#"<span class="log-nickname-bracket">&gt; </span>"#,
            )
        );
        assert_eq!(rendered.message, "hello &amp; goodbye");
    }

    #[test]
    fn test_mention_prefix_gets_color() {
        let rendered = render("<bob> alice: hi", &[]);
        assert!(
            rendered
                .message
                .contains(r#"<span class="log-prefix log-nickname-color-9">alice</span>"#),
            "message was: {}",
            rendered.message
        );
    }

    #[test]
    fn test_rendering_is_idempotent() {
        let line = "[12:00] <bob> hello";
        let first = render(line, &[]);
        let second = render(line, &[]);
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_span_composes_with_nickname() {
        // match overlaps the nickname: both labels survive on the overlap
        let rendered = render("<bob> hi", &[Span::new(Label::SearchMatch, 1, 4)]);
        assert!(
            rendered.nickname.contains(
                r#"<span class="log-nickname-bracket log-nickname log-searchword log-nickname-color-4">bob</span>"#
            ),
            "nickname was: {}",
            rendered.nickname
        );
    }

    #[test]
    fn test_search_span_in_timestamp_stays_in_timestamp_field() {
        let rendered = render("[12:00] <bob> hi", &[Span::new(Label::SearchMatch, 1, 3)]);
        assert!(
            rendered
                .timestamp
                .contains(r#"<span class="log-timestamp log-searchword">12</span>"#),
            "timestamp was: {}",
            rendered.timestamp
        );
    }

    #[test]
    fn test_latch_keeps_later_chunks_in_message() {
        // once the message body starts, nothing moves back into the
        // structured fields
        let rendered = render("<bob> see <eve> later", &[]);
        assert!(rendered.message.contains("&lt;eve&gt;"));
        assert!(!rendered.nickname.contains("eve"));
    }

    #[test]
    fn test_action_line_star_and_nick_in_nickname_field() {
        let rendered = render("* bob waves", &[]);
        assert!(rendered.nickname.contains(r#"<span class="log-keyword">* </span>"#));
        assert!(
            rendered
                .nickname
                .contains(r#"<span class="log-nickname log-nickname-color-4">bob </span>"#),
            "nickname was: {}",
            rendered.nickname
        );
        assert_eq!(rendered.message, "waves");
    }

    #[test]
    fn test_custom_class_prefix() {
        let config = ViewerConfig {
            class_prefix: "irc-".to_string(),
            ..ViewerConfig::default()
        };
        let rendered = render_line("-!- bob joined", &[], 1, false, &config);
        assert!(rendered.nickname.contains(r#"class="irc-keyword""#));
        assert!(rendered.message.contains(r#"class="irc-muted""#));
    }
}
