//! Fancy diagnostics support using `ariadne`.
//!
//! This module converts [`SmWarningWithRange`] and [`FieldFormatError`] carrying a source range into `ariadne::Report`, which resolves lines and columns from the byte ranges.
//!
//! # Usage Example
//!
//! ```rust
//! use openchart_rs::{diagnostics::emit_sm_warnings, sm::parse_sm};
//!
//! let source = "#TITLE:Test;\n#INVALID:field;\n";
//! let output = parse_sm(source).expect("no malformed value");
//!
//! emit_sm_warnings("test.sm", source, &output.warnings);
//! ```

use std::ops::Range;

use ariadne::{Color, Label, Report, ReportKind, Source};

use crate::sm::{FieldFormatError, SmWarning, SmWarningWithRange};

/// Simple source container that holds the filename and source text.
///
/// ```rust
/// use openchart_rs::diagnostics::SimpleSource;
///
/// let source_text = "#TITLE:test;\n";
/// let source = SimpleSource::new("test.sm", source_text);
/// assert_eq!(source.text(), source_text);
/// ```
pub struct SimpleSource<'a> {
    /// Name of the source file.
    name: &'a str,
    /// Source text content.
    text: &'a str,
}

impl<'a> SimpleSource<'a> {
    /// Creates a new source container.
    #[must_use]
    pub const fn new(name: &'a str, text: &'a str) -> Self {
        Self { name, text }
    }

    /// The source text.
    #[must_use]
    pub const fn text(&self) -> &'a str {
        self.text
    }

    /// The source file name.
    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }
}

/// Conversion of positioned errors into `ariadne::Report`.
pub trait ToAriadne {
    /// Builds the report, using `src` for the file name.
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)>;
}

/// Builds a styled `Report` with one label.
#[must_use]
pub fn build_report<'a>(
    src: &SimpleSource<'a>,
    kind: ReportKind<'a>,
    range: Range<usize>,
    title: &str,
    label_message: impl ToString,
    color: Color,
) -> Report<'a, (String, Range<usize>)> {
    let filename = src.name().to_string();
    Report::build(kind, (filename.clone(), range.clone()))
        .with_message(title)
        .with_label(
            Label::new((filename, range))
                .with_message(label_message.to_string())
                .with_color(color),
        )
        .finish()
}

impl ToAriadne for SmWarningWithRange {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        let title = match self.content() {
            SmWarning::UnknownField { .. } => "Unknown field",
            SmWarning::DuplicateField { .. } => "Duplicated field",
            SmWarning::MissingSemicolon { .. } => "Unterminated field",
            SmWarning::TextOutsideField => "Stray text",
        };
        build_report(
            src,
            ReportKind::Warning,
            self.range(),
            title,
            self.content(),
            Color::Blue,
        )
    }
}

impl ToAriadne for FieldFormatError {
    fn to_report<'a>(&self, src: &SimpleSource<'a>) -> Report<'a, (String, Range<usize>)> {
        let range = self.range.clone().unwrap_or(0..0);
        build_report(
            src,
            ReportKind::Error,
            range,
            &format!("Malformed #{}", self.field),
            self.reason,
            Color::Red,
        )
    }
}

/// Prints reports of `warnings` to stderr.
pub fn emit_sm_warnings<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a SmWarningWithRange>,
) {
    let simple = SimpleSource::new(name, source);
    let ariadne_source = Source::from(source);
    for w in warnings {
        let report = w.to_report(&simple);
        let _ = report.eprint((name.to_string(), ariadne_source.clone()));
    }
}

/// Collects reports of `warnings` without printing.
#[must_use]
pub fn collect_sm_reports<'a>(
    name: &'a str,
    source: &'a str,
    warnings: impl IntoIterator<Item = &'a SmWarningWithRange>,
) -> Vec<Report<'a, (String, Range<usize>)>> {
    let simple = SimpleSource::new(name, source);
    warnings.into_iter().map(|w| w.to_report(&simple)).collect()
}
