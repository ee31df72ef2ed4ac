//! Tokenizer for quoted spans and protected values

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::ops::Range;

/// A single-quoted span, never crossing a line break
static QUOTED_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'(.*?)'").expect("Invalid quoted span regex"));

/// Quoted value of a `material:` key
static MATERIAL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"material:\s*'(.*?)'").expect("Invalid material regex"));

/// Content between a pair of braces
static BRACE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(.*?)\}").expect("Invalid brace regex"));

/// Stands in for `{` while text is handed to the translation service
pub const START_MARKER: &str = "__START_MARKER__";

/// Stands in for `}` while text is handed to the translation service
pub const END_MARKER: &str = "__END_MARKER__";

/// Lexical token over a source document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Text copied verbatim, quotes included
    Literal(Range<usize>),
    /// Text between a pair of quotes, quotes excluded
    Quoted(Range<usize>),
}

/// Tokenized source document
#[derive(Debug)]
pub struct Lexed<'a> {
    /// Original text
    source: &'a str,
    /// Tokens in source order
    tokens: Vec<Token>,
    /// Byte ranges of `{...}` regions, braces included
    braced: Vec<Range<usize>>,
}

impl<'a> Lexed<'a> {
    /// Split `source` into literal text and quoted spans
    ///
    /// Concatenating the text of every token gives back `source` byte for
    /// byte.
    pub fn new(source: &'a str) -> Self {
        let mut tokens = Vec::new();
        let mut pos = 0;

        for caps in QUOTED_REGEX.captures_iter(source) {
            let Some(inner) = caps.get(1) else {
                continue;
            };

            // Opening quote belongs to the literal run before the span
            tokens.push(Token::Literal(pos..inner.start()));
            tokens.push(Token::Quoted(inner.range()));
            pos = inner.end();
        }

        tokens.push(Token::Literal(pos..source.len()));
        tokens.retain(|t| !matches!(t, Token::Literal(r) if r.is_empty()));

        let braced = BRACE_REGEX.find_iter(source).map(|m| m.range()).collect();

        Self {
            source,
            tokens,
            braced,
        }
    }

    /// Original text
    pub fn source(&self) -> &'a str {
        self.source
    }

    /// Tokens in source order
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Whether a quoted token reaches into a `{...}` region
    ///
    /// A region lying wholly inside the span does not count: it is masked
    /// from the service and checked after translation instead.
    pub fn is_braced(&self, token: &Token) -> bool {
        let Token::Quoted(r) = token else {
            return false;
        };

        self.braced.iter().any(|b| {
            let overlaps = r.start < b.end && b.start < r.end;
            let contains = r.start <= b.start && b.end <= r.end;
            overlaps && !contains
        })
    }

    /// Text of a token
    pub fn text(&self, token: &Token) -> &'a str {
        match token {
            Token::Literal(r) | Token::Quoted(r) => &self.source[r.clone()],
        }
    }

    /// Every quoted span in order, duplicates included
    pub fn spans(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.tokens.iter().filter_map(move |t| match t {
            Token::Quoted(r) => Some(&self.source[r.clone()]),
            Token::Literal(_) => None,
        })
    }

    /// Quoted spans deduplicated by text, in order of first appearance
    pub fn unique_spans(&self) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        self.spans().filter(|s| seen.insert(*s)).collect()
    }

    /// Texts of quoted spans with at least one occurrence outside braces
    pub fn free_spans(&self) -> HashSet<&'a str> {
        self.tokens
            .iter()
            .filter(|t| matches!(t, Token::Quoted(_)) && !self.is_braced(t))
            .map(|t| self.text(t))
            .collect()
    }
}

/// Texts never sent for translation
#[derive(Debug, Default, Clone)]
pub struct ProtectedSet {
    /// Values of `material:` keys
    materials: HashSet<String>,
    /// Contents of `{...}` regions
    braced: HashSet<String>,
}

impl ProtectedSet {
    /// Collect `material:` values and brace contents of the original text
    pub fn from_source(source: &str) -> Self {
        let materials = MATERIAL_REGEX
            .captures_iter(source)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .collect();

        let braced = brace_regions(source)
            .into_iter()
            .map(str::to_string)
            .collect();

        Self { materials, braced }
    }

    /// Whether `text` must stay untranslated
    pub fn contains(&self, text: &str) -> bool {
        self.materials.contains(text) || self.braced.contains(text)
    }

    /// Whether `text` is protected as a `material:` value
    pub fn is_material(&self, text: &str) -> bool {
        self.materials.contains(text)
    }
}

/// Contents of every `{...}` region, in order
pub fn brace_regions(text: &str) -> Vec<&str> {
    BRACE_REGEX
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Replace braces with marker tokens
pub fn mark_braces(text: &str) -> String {
    text.replace('{', START_MARKER).replace('}', END_MARKER)
}

/// Restore braces from marker tokens
pub fn restore_braces(text: &str) -> String {
    text.replace(START_MARKER, "{").replace(END_MARKER, "}")
}
