//! Reading and writing SM text.
//!
//! Reading assembles the records from [`super::cursor::Cursor`] into [`StepFileData`], typing each value with [`super::field_parser`]. Writing emits the header records in [`HeaderField::ALL`] order, then one `#NOTES` record per chart.

use std::{collections::HashSet, fmt::Write as _};

use itertools::Itertools;
use log::{debug, warn};

use super::{
    DisplayBpm, DuplicateFieldPolicy, FieldFormatError, FieldFormatReason, SmChart, SmNote,
    SmParseOutput, SmWarning, StepFileData,
    cursor::Cursor,
    field::HeaderField,
    field_parser::{
        parse_bool, parse_bpm_list, parse_chart, parse_display_bpm, parse_number, parse_stop_list,
    },
    mixin::SourceRangeMixinExt,
};
use crate::format::{FormatError, FormatSerializer};

/// Reads and writes SM text.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmSerializer {
    /// How to treat a header record appearing twice.
    pub duplicate_policy: DuplicateFieldPolicy,
}

impl SmSerializer {
    /// Creates a serializer resolving duplicated header records by `policy`.
    #[must_use]
    pub const fn with_duplicate_policy(policy: DuplicateFieldPolicy) -> Self {
        Self {
            duplicate_policy: policy,
        }
    }

    /// Parses SM source into the data with the warnings found.
    ///
    /// # Errors
    ///
    /// Returns [`FieldFormatError`] with its source range on the first malformed value, or on a duplicated header record under [`DuplicateFieldPolicy::Halt`].
    pub fn parse(&self, source: &str) -> Result<SmParseOutput, FieldFormatError> {
        let mut cursor = Cursor::new(source);
        let mut warnings = Vec::new();
        let mut data = StepFileData::default();
        let mut seen = HashSet::new();

        while let Some(record) = cursor.next_record(&mut warnings) {
            if record.name == "NOTES" {
                let chart = parse_chart(&record.value)
                    .map_err(|err| err.with_range(record.value_range.clone()))?;
                data.charts.push(chart);
                continue;
            }
            let Some(field) = HeaderField::from_name(&record.name) else {
                warnings.push(
                    SmWarning::UnknownField { name: record.name }
                        .into_wrapper_range(record.name_range),
                );
                continue;
            };
            if !seen.insert(field) {
                match self.duplicate_policy {
                    DuplicateFieldPolicy::Halt => {
                        return Err(FieldFormatError::new(
                            field.name(),
                            record.value.trim(),
                            FieldFormatReason::Duplicated,
                        )
                        .with_range(record.name_range));
                    }
                    DuplicateFieldPolicy::UseOlder => {
                        warnings.push(
                            SmWarning::DuplicateField { name: record.name }
                                .into_wrapper_range(record.name_range),
                        );
                        continue;
                    }
                    DuplicateFieldPolicy::UseNewer => {
                        warnings.push(
                            SmWarning::DuplicateField {
                                name: record.name.clone(),
                            }
                            .into_wrapper_range(record.name_range.clone()),
                        );
                    }
                }
            }
            assign_field(&mut data, field, &record.value)
                .map_err(|err| err.with_range(record.value_range))?;
        }

        debug!(
            "parsed SM with {} chart(s) and {} warning(s)",
            data.charts.len(),
            warnings.len()
        );
        Ok(SmParseOutput { data, warnings })
    }
}

/// Parses SM source with the default [`SmSerializer`].
///
/// # Errors
///
/// Same as [`SmSerializer::parse`].
pub fn parse_sm(source: &str) -> Result<SmParseOutput, FieldFormatError> {
    SmSerializer::default().parse(source)
}

/// Stores a header value into `data`. A blank value of a typed field leaves it absent.
fn assign_field(
    data: &mut StepFileData,
    field: HeaderField,
    value: &str,
) -> Result<(), FieldFormatError> {
    let text = value.trim();
    let number = || -> Result<Option<f64>, FieldFormatError> {
        if text.is_empty() {
            return Ok(None);
        }
        parse_number(field.name(), text).map(Some)
    };
    match field {
        HeaderField::Title => data.meta.title = Some(text.to_owned()),
        HeaderField::Subtitle => data.meta.subtitle = Some(text.to_owned()),
        HeaderField::Artist => data.meta.artist = Some(text.to_owned()),
        HeaderField::TitleTranslit => data.meta.title_translit = Some(text.to_owned()),
        HeaderField::SubtitleTranslit => data.meta.subtitle_translit = Some(text.to_owned()),
        HeaderField::ArtistTranslit => data.meta.artist_translit = Some(text.to_owned()),
        HeaderField::Genre => data.meta.genre = Some(text.to_owned()),
        HeaderField::Credit => data.meta.credit = Some(text.to_owned()),
        HeaderField::Banner => data.display.banner = Some(text.to_owned()),
        HeaderField::Background => data.display.background = Some(text.to_owned()),
        HeaderField::LyricsPath => data.display.lyrics_path = Some(text.to_owned()),
        HeaderField::CdTitle => data.display.cd_title = Some(text.to_owned()),
        HeaderField::BgChanges => data.display.bg_changes = Some(text.to_owned()),
        HeaderField::FgChanges => data.display.fg_changes = Some(text.to_owned()),
        HeaderField::Music => data.song.music = Some(text.to_owned()),
        HeaderField::Offset => data.play.offset = number()?,
        HeaderField::SampleStart => data.song.sample_start = number()?,
        HeaderField::SampleLength => data.song.sample_length = number()?,
        HeaderField::Selectable => {
            data.display.selectable = if text.is_empty() {
                None
            } else {
                Some(parse_bool(field.name(), text)?)
            };
        }
        HeaderField::DisplayBpm => {
            data.display.display_bpm = if text.is_empty() {
                None
            } else {
                Some(parse_display_bpm(text)?)
            };
        }
        HeaderField::Bpms => data.play.bpms = parse_bpm_list(text)?,
        HeaderField::Stops => data.play.stops = parse_stop_list(text)?,
    }
    Ok(())
}

/// The text of `field` to write, or `None` if absent.
fn field_text(data: &StepFileData, field: HeaderField) -> Option<String> {
    let number = |value: Option<f64>| value.map(|value| value.to_string());
    match field {
        HeaderField::Title => data.meta.title.clone(),
        HeaderField::Subtitle => data.meta.subtitle.clone(),
        HeaderField::Artist => data.meta.artist.clone(),
        HeaderField::TitleTranslit => data.meta.title_translit.clone(),
        HeaderField::SubtitleTranslit => data.meta.subtitle_translit.clone(),
        HeaderField::ArtistTranslit => data.meta.artist_translit.clone(),
        HeaderField::Genre => data.meta.genre.clone(),
        HeaderField::Credit => data.meta.credit.clone(),
        HeaderField::Banner => data.display.banner.clone(),
        HeaderField::Background => data.display.background.clone(),
        HeaderField::LyricsPath => data.display.lyrics_path.clone(),
        HeaderField::CdTitle => data.display.cd_title.clone(),
        HeaderField::BgChanges => data.display.bg_changes.clone(),
        HeaderField::FgChanges => data.display.fg_changes.clone(),
        HeaderField::Music => data.song.music.clone(),
        HeaderField::Offset => number(data.play.offset),
        HeaderField::SampleStart => number(data.song.sample_start),
        HeaderField::SampleLength => number(data.song.sample_length),
        HeaderField::Selectable => data
            .display
            .selectable
            .map(|selectable| if selectable { "YES" } else { "NO" }.to_owned()),
        HeaderField::DisplayBpm => data.display.display_bpm.map(|bpm| match bpm {
            DisplayBpm::Fixed(value) => value.to_string(),
            DisplayBpm::Range { lower, upper } => format!("{lower}:{upper}"),
            DisplayBpm::Random => "*".to_owned(),
        }),
        HeaderField::Bpms => (!data.play.bpms.is_empty()).then(|| {
            data.play
                .bpms
                .iter()
                .map(|bpm| format!("{}={}", bpm.beat, bpm.value))
                .join(",")
        }),
        HeaderField::Stops => (!data.play.stops.is_empty()).then(|| {
            data.play
                .stops
                .iter()
                .map(|stop| format!("{}={}", stop.beat, stop.duration))
                .join(",")
        }),
    }
}

/// Checks that `text` is read back as written in `field`. Segments of `#NOTES` must not have `:` also.
///
/// # Errors
///
/// Returns [`FieldFormatReason::UnwritableText`] if `text` has a line break, `;` or `//`, starts or ends with whitespace, or has `:` in `#NOTES`.
pub(crate) fn check_text(field: &str, text: &str) -> Result<(), FieldFormatError> {
    let breaks = text.contains(['\n', '\r', ';'])
        || text.contains("//")
        || text.trim() != text
        || (field == "NOTES" && text.contains(':'));
    if breaks {
        return Err(FieldFormatError::new(
            field,
            text,
            FieldFormatReason::UnwritableText,
        ));
    }
    Ok(())
}

/// Checks every text of `data` with [`check_text`].
fn check_writable(data: &StepFileData) -> Result<(), FieldFormatError> {
    for field in HeaderField::ALL {
        if let Some(text) = field_text(data, field) {
            check_text(field.name(), &text)?;
        }
    }
    for chart in &data.charts {
        check_text("NOTES", chart.chart_type.name())?;
        check_text("NOTES", &chart.author)?;
        check_text("NOTES", chart.difficulty.name())?;
    }
    Ok(())
}

fn write_chart(out: &mut String, chart: &SmChart) -> std::fmt::Result {
    writeln!(
        out,
        "//---------------{} - {}----------------",
        chart.chart_type, chart.author
    )?;
    writeln!(out, "#NOTES:")?;
    writeln!(out, "     {}:", chart.chart_type)?;
    writeln!(out, "     {}:", chart.author)?;
    writeln!(out, "     {}:", chart.difficulty)?;
    writeln!(out, "     {}:", chart.meter)?;
    writeln!(out, "     {}:", chart.groove_radar.iter().join(","))?;
    let grid = chart
        .measures
        .iter()
        .map(|measure| {
            measure
                .rows
                .iter()
                .map(|row| row.iter().copied().map(SmNote::to_char).collect::<String>())
                .join("\n")
        })
        .join("\n,\n");
    writeln!(out, "{grid}")?;
    writeln!(out, ";")
}

fn write_sm(out: &mut String, data: &StepFileData) -> std::fmt::Result {
    for field in HeaderField::ALL {
        if let Some(text) = field_text(data, field) {
            writeln!(out, "{field}:{text};")?;
        }
    }
    for chart in &data.charts {
        writeln!(out)?;
        write_chart(out, chart)?;
    }
    Ok(())
}

impl FormatSerializer for SmSerializer {
    type Data = StepFileData;

    /// Writes `data` as SM text.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::Field`] with [`FieldFormatReason::UnwritableText`] if a text would not be read back as written.
    fn serialize(&self, data: &StepFileData) -> Result<Vec<u8>, FormatError> {
        check_writable(data)?;
        let mut out = String::new();
        write_sm(&mut out, data)?;
        Ok(out.into_bytes())
    }

    fn deserialize(&self, bytes: &[u8]) -> Result<StepFileData, FormatError> {
        let source = std::str::from_utf8(bytes)?;
        let source = source.strip_prefix('\u{feff}').unwrap_or(source);
        let SmParseOutput { data, warnings } = self.parse(source)?;
        for warning in warnings {
            warn!("{warning}");
        }
        Ok(data)
    }
}
