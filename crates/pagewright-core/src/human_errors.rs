// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages.
//
// A failed job or viewer open surfaces exactly one of these: a plain summary,
// a suggestion, and whether offering "try again" makes sense.

use crate::error::PagewrightError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Nothing was lost; the output is usable but degraded.
    Degraded,
    /// The user should pick a different file or operation.
    ActionRequired,
    /// Cannot be fixed by retrying with the same input.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Whether a retry affordance should be offered.
    pub retriable: bool,
    pub severity: Severity,
}

/// Convert a `PagewrightError` into a `HumanError`.
pub fn humanize_error(err: &PagewrightError) -> HumanError {
    match err {
        PagewrightError::UnsupportedFormat(detail) => HumanError {
            message: "This file type isn't supported, so a placeholder page was created.".into(),
            suggestion: format!("Save the file as PDF, text, or an image and try again. ({detail})"),
            retriable: true,
            severity: Severity::Degraded,
        },

        PagewrightError::UnreadableDocument(_) => HumanError {
            message: "We couldn't read the text in this document.".into(),
            suggestion: "The file may be damaged or password protected. Try opening and re-saving it first.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PagewrightError::UnreadableWorkbook(_) => HumanError {
            message: "We couldn't read this spreadsheet.".into(),
            suggestion: "Try saving the first sheet as CSV and converting that instead.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PagewrightError::CorruptInput(_) => HumanError {
            message: "One of the PDFs is damaged, so nothing was merged.".into(),
            suggestion: "Check each file opens on its own, then try the merge again without the broken one.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PagewrightError::InvalidInput(detail) => HumanError {
            message: "These files can't be used with this tool.".into(),
            suggestion: format!("Pick a different tool or different files. ({detail})"),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PagewrightError::Image(_) => HumanError {
            message: "There's a problem with this image.".into(),
            suggestion: "The image may be damaged or in an unusual format. Try saving it as a JPEG or PNG first.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PagewrightError::EmptyOutput | PagewrightError::Pdf(_) => HumanError {
            message: "Failed to process file. Please try a different format.".into(),
            suggestion: "The document came out empty. Try a different file or format.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        PagewrightError::PipelineBusy => HumanError {
            message: "The last result is still open.".into(),
            suggestion: "Close the previous result before starting a new conversion.".into(),
            retriable: false,
            severity: Severity::ActionRequired,
        },

        PagewrightError::NoActiveJob | PagewrightError::Cancelled => HumanError {
            message: "The conversion was stopped.".into(),
            suggestion: "Start it again when you're ready.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PagewrightError::RenderError(_) => HumanError {
            message: "This PDF can't be displayed.".into(),
            suggestion: "The file may be damaged or not a PDF. Try downloading it again.".into(),
            retriable: true,
            severity: Severity::Permanent,
        },

        PagewrightError::CollaboratorUnavailable(what) => HumanError {
            message: "This conversion isn't available on this device.".into(),
            suggestion: format!("Try converting the file to PDF another way. ({what})"),
            retriable: false,
            severity: Severity::Permanent,
        },

        PagewrightError::Io(_) => HumanError {
            message: "We couldn't read or save a file.".into(),
            suggestion: "Check the file still exists and there is free space, then try again.".into(),
            retriable: true,
            severity: Severity::ActionRequired,
        },

        PagewrightError::Serialization(_) => HumanError {
            message: "Settings could not be read.".into(),
            suggestion: "Default settings are being used instead.".into(),
            retriable: false,
            severity: Severity::Degraded,
        },
    }
}
