// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Search highlighting over rendered page text. Spans are recomputed for every
// render and never stored.

/// A run of page text, either plain or matching the query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightSpan<'a> {
    Text(&'a str),
    Match(&'a str),
}

impl<'a> HighlightSpan<'a> {
    pub fn as_str(&self) -> &'a str {
        match self {
            Self::Text(s) | Self::Match(s) => s,
        }
    }

    pub fn is_match(&self) -> bool {
        matches!(self, Self::Match(_))
    }
}

/// Split `text` into plain and matching spans, case-insensitively and without
/// overlaps. An empty query returns the text as a single plain span.
pub fn highlight<'a>(text: &'a str, query: &str) -> Vec<HighlightSpan<'a>> {
    let needle: Vec<char> = query.chars().collect();
    if needle.is_empty() {
        return vec![HighlightSpan::Text(text)];
    }

    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let byte_at = |index: usize| chars.get(index).map_or(text.len(), |(offset, _)| *offset);

    let mut spans = Vec::new();
    let mut plain_start = 0;
    let mut i = 0;
    while i + needle.len() <= chars.len() {
        let hit = needle
            .iter()
            .enumerate()
            .all(|(j, wanted)| same_ignoring_case(chars[i + j].1, *wanted));
        if !hit {
            i += 1;
            continue;
        }

        let start = byte_at(i);
        let end = byte_at(i + needle.len());
        if plain_start < start {
            spans.push(HighlightSpan::Text(&text[plain_start..start]));
        }
        spans.push(HighlightSpan::Match(&text[start..end]));
        plain_start = end;
        i += needle.len();
    }
    if plain_start < text.len() || spans.is_empty() {
        spans.push(HighlightSpan::Text(&text[plain_start..]));
    }
    spans
}

fn same_ignoring_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// The viewer's current search query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
}

impl SearchState {
    pub fn is_active(&self) -> bool {
        !self.query.is_empty()
    }

    pub fn highlight<'a>(&self, text: &'a str) -> Vec<HighlightSpan<'a>> {
        highlight(text, &self.query)
    }

    pub fn match_count(&self, text: &str) -> usize {
        if !self.is_active() {
            return 0;
        }
        self.highlight(text).iter().filter(|span| span.is_match()).count()
    }
}
