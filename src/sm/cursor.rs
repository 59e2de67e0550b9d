//! The record lexer, splitting SM source into `#NAME:value;` records.
//!
//! `//` starts a comment until the end of line, both inside and outside records. Names are trimmed and uppercased. A record missing its `;` is closed before the next line starting with `#`, or at the end of input.

use std::ops::Range;

use log::trace;

use super::{SmWarning, SmWarningWithRange, mixin::SourceRangeMixinExt};

/// A record read by [`Cursor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The uppercased name without `#`.
    pub name: String,
    /// The value between `:` and `;`, with comments removed. Not trimmed.
    pub value: String,
    /// Where the name is in the source.
    pub name_range: Range<usize>,
    /// Where the value is in the source.
    pub value_range: Range<usize>,
}

/// Reads records one by one from the source.
pub struct Cursor<'a> {
    /// The source str.
    source: &'a str,
    /// The byte index of the next character.
    index: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at the start of `source`.
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self { source, index: 0 }
    }

    /// The current byte index in the source.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    fn rest(&self) -> &'a str {
        &self.source[self.index..]
    }

    fn skip_comment(&mut self) {
        self.index += self.rest().find('\n').unwrap_or(self.rest().len());
    }

    /// Skips whitespaces and comments.
    fn skip_trivia(&mut self) {
        loop {
            let trimmed = self.rest().trim_start();
            self.index = self.source.len() - trimmed.len();
            if !trimmed.starts_with("//") {
                break;
            }
            self.skip_comment();
        }
    }

    /// Whether the line after the line feed at `index` starts with `#`.
    fn next_line_starts_record(&self, index: usize) -> bool {
        self.source[index + 1..]
            .trim_start_matches([' ', '\t', '\r'])
            .starts_with('#')
    }

    /// Reads the next record, pushing the warnings found into `warnings`. Returns `None` at the end of input.
    pub fn next_record(&mut self, warnings: &mut Vec<SmWarningWithRange>) -> Option<Record> {
        loop {
            self.skip_trivia();
            if self.rest().is_empty() {
                return None;
            }
            if self.rest().starts_with('#') {
                break;
            }
            let start = self.index;
            self.index += self.rest().find('#').unwrap_or(self.rest().len());
            let end = self.source[..self.index].trim_end().len();
            warnings.push(SmWarning::TextOutsideField.into_wrapper_range(start..end));
        }

        let name_start = self.index + 1;
        let name_len = self.source[name_start..]
            .find([':', ';', '\n'])
            .unwrap_or(self.source.len() - name_start);
        let name_range = name_start..name_start + name_len;
        let name = self.source[name_range.clone()].trim().to_ascii_uppercase();
        self.index = name_range.end;

        match self.rest().chars().next() {
            Some(':') => {
                self.index += 1;
            }
            Some(';') => {
                self.index += 1;
                trace!("empty record #{name}");
                return Some(Record {
                    name,
                    value: String::new(),
                    value_range: name_range.end..name_range.end,
                    name_range,
                });
            }
            _ => {
                warnings.push(
                    SmWarning::MissingSemicolon { name: name.clone() }
                        .into_wrapper_range(name_range.clone()),
                );
                return Some(Record {
                    name,
                    value: String::new(),
                    value_range: name_range.end..name_range.end,
                    name_range,
                });
            }
        }

        let value_start = self.index;
        let mut value = String::new();
        let value_end = loop {
            let rest = self.rest();
            if rest.starts_with("//") {
                self.skip_comment();
                continue;
            }
            let Some(c) = rest.chars().next() else {
                warnings.push(
                    SmWarning::MissingSemicolon { name: name.clone() }
                        .into_wrapper_range(name_range.clone()),
                );
                break self.index;
            };
            match c {
                ';' => {
                    self.index += 1;
                    break self.index - 1;
                }
                '\n' if self.next_line_starts_record(self.index) => {
                    warnings.push(
                        SmWarning::MissingSemicolon { name: name.clone() }
                            .into_wrapper_range(name_range.clone()),
                    );
                    let end = self.index;
                    self.index += 1;
                    break end;
                }
                c => {
                    value.push(c);
                    self.index += c.len_utf8();
                }
            }
        };
        trace!("record #{name} at {value_start}..{value_end}");

        Some(Record {
            name,
            value,
            name_range,
            value_range: value_start..value_end,
        })
    }
}
