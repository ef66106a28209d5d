// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Format detection: a priority-ordered rule table consulted by declared MIME
// type first and file extension second.

use tracing::debug;

/// Which handler an input file is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Pdf,
    Image,
    PlainText,
    /// Comma-separated rows.
    Csv,
    /// Tab-separated rows.
    Tsv,
    WordDocument,
    Workbook,
    /// No rule matched; the adapter substitutes a placeholder.
    Unknown,
}

/// One detection rule. MIME entries ending in `/` match as prefixes.
#[derive(Debug, Clone, Copy)]
pub struct FormatRule {
    pub kind: SourceKind,
    pub mime_types: &'static [&'static str],
    pub extensions: &'static [&'static str],
}

const DEFAULT_RULES: &[FormatRule] = &[
    FormatRule {
        kind: SourceKind::Pdf,
        mime_types: &["application/pdf", "application/x-pdf"],
        extensions: &["pdf"],
    },
    FormatRule {
        kind: SourceKind::Image,
        mime_types: &["image/"],
        extensions: &["jpg", "jpeg", "png", "gif", "bmp", "webp", "tif", "tiff"],
    },
    FormatRule {
        kind: SourceKind::Csv,
        mime_types: &["text/csv"],
        extensions: &["csv"],
    },
    FormatRule {
        kind: SourceKind::Tsv,
        mime_types: &["text/tab-separated-values"],
        extensions: &["tsv", "tab"],
    },
    FormatRule {
        kind: SourceKind::PlainText,
        mime_types: &["text/plain", "text/markdown"],
        extensions: &["txt", "text", "md", "log"],
    },
    FormatRule {
        kind: SourceKind::WordDocument,
        mime_types: &[
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "application/msword",
            "application/vnd.oasis.opendocument.text",
        ],
        extensions: &["docx", "doc", "odt"],
    },
    FormatRule {
        kind: SourceKind::Workbook,
        mime_types: &[
            "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            "application/vnd.ms-excel",
            "application/vnd.oasis.opendocument.spreadsheet",
        ],
        extensions: &["xlsx", "xls", "ods"],
    },
];

/// Resolves a file to a [`SourceKind`].
///
/// New formats are added as rules, not as branches.
#[derive(Debug, Clone)]
pub struct FormatMatcher {
    rules: Vec<FormatRule>,
}

impl Default for FormatMatcher {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES.to_vec(),
        }
    }
}

impl FormatMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule; earlier rules win on conflicts.
    pub fn with_rule(mut self, rule: FormatRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Resolve by declared MIME type, then by extension. When both are present
    /// and disagree, the MIME type wins.
    pub fn resolve(&self, mime: Option<&str>, file_name: &str) -> SourceKind {
        if let Some(kind) = mime.and_then(|m| self.by_mime(m)) {
            debug!(file_name, ?kind, "format resolved by MIME type");
            return kind;
        }
        if let Some(kind) = self.by_extension(file_name) {
            debug!(file_name, ?kind, "format resolved by extension");
            return kind;
        }
        SourceKind::Unknown
    }

    fn by_mime(&self, mime: &str) -> Option<SourceKind> {
        // Drop parameters such as "; charset=utf-8".
        let essence = mime.split(';').next()?.trim().to_ascii_lowercase();
        if essence.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| {
                rule.mime_types.iter().any(|pattern| {
                    if pattern.ends_with('/') {
                        essence.starts_with(pattern)
                    } else {
                        essence == *pattern
                    }
                })
            })
            .map(|rule| rule.kind)
    }

    fn by_extension(&self, file_name: &str) -> Option<SourceKind> {
        let (_, ext) = file_name.rsplit_once('.')?;
        let ext = ext.to_ascii_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.extensions.contains(&ext.as_str()))
            .map(|rule| rule.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mime_wins_over_conflicting_extension() {
        let matcher = FormatMatcher::new();
        assert_eq!(
            matcher.resolve(Some("application/pdf"), "scan.png"),
            SourceKind::Pdf
        );
    }

    #[test]
    fn extension_used_when_mime_missing_or_unknown() {
        let matcher = FormatMatcher::new();
        assert_eq!(matcher.resolve(None, "Report.DOCX"), SourceKind::WordDocument);
        assert_eq!(
            matcher.resolve(Some("application/octet-stream"), "budget.xlsx"),
            SourceKind::Workbook
        );
        assert_eq!(matcher.resolve(Some(""), "rows.csv"), SourceKind::Csv);
    }

    #[test]
    fn image_mime_matches_by_prefix_and_parameters_are_ignored() {
        let matcher = FormatMatcher::new();
        assert_eq!(matcher.resolve(Some("image/heic"), "x"), SourceKind::Image);
        assert_eq!(
            matcher.resolve(Some("text/plain; charset=utf-8"), "x.bin"),
            SourceKind::PlainText
        );
    }

    #[test]
    fn unmatched_is_unknown() {
        let matcher = FormatMatcher::new();
        assert_eq!(matcher.resolve(None, "slides.pptx"), SourceKind::Unknown);
        assert_eq!(matcher.resolve(None, "README"), SourceKind::Unknown);
    }

    #[test]
    fn added_rules_extend_detection() {
        let matcher = FormatMatcher::new().with_rule(FormatRule {
            kind: SourceKind::PlainText,
            mime_types: &["application/json"],
            extensions: &["json"],
        });
        assert_eq!(matcher.resolve(None, "data.json"), SourceKind::PlainText);
    }
}
