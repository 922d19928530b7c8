//! Rich text tokenizer
//!
//! `{name}` becomes an image reference; everything else is text. Names may not
//! contain braces, so `{}` and unbalanced braces stay literal text.

use std::sync::LazyLock;

use regex::Regex;

static REFERENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([^{}]+)\}").expect("reference pattern is valid"));

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// A piece of rich text source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RichToken {
    Text(String),
    ImageRef(String),
}

impl RichToken {
    /// Source form of the token
    pub fn to_source(&self) -> String {
        match self {
            RichToken::Text(text) => text.clone(),
            RichToken::ImageRef(name) => format!("{{{name}}}"),
        }
    }
}

/// Split source text into text runs and image references, in order
pub fn tokenize(source: &str) -> Vec<RichToken> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for caps in REFERENCE.captures_iter(source) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            tokens.push(RichToken::Text(source[last..whole.start()].to_owned()));
        }
        tokens.push(RichToken::ImageRef(name.as_str().to_owned()));
        last = whole.end();
    }
    if last < source.len() {
        tokens.push(RichToken::Text(source[last..].to_owned()));
    }
    tokens
}

/// Join tokens back into source text
pub fn to_source(tokens: &[RichToken]) -> String {
    tokens.iter().map(RichToken::to_source).collect()
}

/// Split text into alternating word and whitespace runs, keeping every
/// character (concatenating the segments gives back `text`)
pub fn split_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut last = 0;
    for m in WHITESPACE.find_iter(text) {
        if m.start() > last {
            segments.push(&text[last..m.start()]);
        }
        segments.push(m.as_str());
        last = m.end();
    }
    if last < text.len() {
        segments.push(&text[last..]);
    }
    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RichToken {
        RichToken::Text(s.to_owned())
    }

    fn image(s: &str) -> RichToken {
        RichToken::ImageRef(s.to_owned())
    }

    #[test]
    fn test_tokenize_mixed() {
        assert_eq!(
            tokenize("Hi {wave} there{smile}!"),
            vec![text("Hi "), image("wave"), text(" there"), image("smile"), text("!")]
        );
    }

    #[test]
    fn test_tokenize_adjacent_refs() {
        assert_eq!(tokenize("{a}{b}"), vec![image("a"), image("b")]);
    }

    #[test]
    fn test_tokenize_literal_braces() {
        assert_eq!(tokenize("{}"), vec![text("{}")]);
        assert_eq!(tokenize("{a{b}"), vec![text("{a"), image("b")]);
        assert_eq!(tokenize("plain"), vec![text("plain")]);
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_to_source_round_trip() {
        let source = "Well {intrigued} that's {satisfied} nice";
        assert_eq!(to_source(&tokenize(source)), source);
    }

    #[test]
    fn test_split_segments_keeps_whitespace() {
        assert_eq!(split_segments("Hello  big\tworld "), vec!["Hello", "  ", "big", "\t", "world", " "]);
        assert_eq!(split_segments(" lead"), vec![" ", "lead"]);
        assert!(split_segments("").is_empty());
    }
}
