//! Parsers of SM record values.
//!
//! These are pure functions over the value text, so they can be used without reading a whole file. Errors from them have no source range; [`super::serializer`] attaches it.

use itertools::Itertools;

use super::{
    ChartType, Difficulty, DisplayBpm, FieldFormatError, FieldFormatReason, Measure, SmBpm,
    SmChart, SmNote, SmStop,
};

/// Parses a finite number. Surrounding whitespaces are ignored.
///
/// # Errors
///
/// Returns [`FieldFormatReason::InvalidNumber`] if `token` is not a finite number.
pub fn parse_number(field: &str, token: &str) -> Result<f64, FieldFormatError> {
    token
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| FieldFormatError::new(field, token, FieldFormatReason::InvalidNumber))
}

/// Parses a boolean of `YES`/`NO`, also accepting `TRUE`/`FALSE` and `1`/`0`, case-insensitively.
///
/// # Errors
///
/// Returns [`FieldFormatReason::InvalidBool`] for other text.
pub fn parse_bool(field: &str, value: &str) -> Result<bool, FieldFormatError> {
    match value.trim().to_ascii_uppercase().as_str() {
        "YES" | "TRUE" | "1" => Ok(true),
        "NO" | "FALSE" | "0" => Ok(false),
        _ => Err(FieldFormatError::new(
            field,
            value,
            FieldFormatReason::InvalidBool,
        )),
    }
}

/// Parses a `#DISPLAYBPM` value: `*` for random, `lower:upper` for a range, or a number.
///
/// # Errors
///
/// Returns [`FieldFormatReason::InvalidNumber`] if a bound is not a number, or [`FieldFormatReason::MalformedDisplayBpm`] if there are more than two bounds.
pub fn parse_display_bpm(value: &str) -> Result<DisplayBpm, FieldFormatError> {
    const FIELD: &str = "DISPLAYBPM";
    let value = value.trim();
    if value == "*" {
        return Ok(DisplayBpm::Random);
    }
    let parts: Vec<_> = value.split(':').collect();
    match parts.as_slice() {
        [fixed] => Ok(DisplayBpm::Fixed(parse_number(FIELD, fixed)?)),
        [lower, upper] => Ok(DisplayBpm::Range {
            lower: parse_number(FIELD, lower)?,
            upper: parse_number(FIELD, upper)?,
        }),
        _ => Err(FieldFormatError::new(
            FIELD,
            value,
            FieldFormatReason::MalformedDisplayBpm,
        )),
    }
}

/// Parses `,`-separated `beat=value` pairs. Blank entries are skipped, so blank text is an empty list.
fn parse_pairs(field: &str, value: &str) -> Result<Vec<(f64, f64)>, FieldFormatError> {
    value
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(|entry| -> Result<(f64, f64), FieldFormatError> {
            let (beat, value) = entry.split('=').collect_tuple().ok_or_else(|| {
                FieldFormatError::new(field, entry.trim(), FieldFormatReason::MalformedPair)
            })?;
            Ok((parse_number(field, beat)?, parse_number(field, value)?))
        })
        .collect()
}

/// Parses a `#BPMS` value, `beat=bpm` pairs separated by `,`.
///
/// # Errors
///
/// Returns [`FieldFormatReason::MalformedPair`] if an entry is not a pair, or [`FieldFormatReason::InvalidNumber`] if a side of it is not a number.
pub fn parse_bpm_list(value: &str) -> Result<Vec<SmBpm>, FieldFormatError> {
    Ok(parse_pairs("BPMS", value)?
        .into_iter()
        .map(|(beat, value)| SmBpm { beat, value })
        .collect())
}

/// Parses a `#STOPS` value, `beat=seconds` pairs separated by `,`.
///
/// # Errors
///
/// Same as [`parse_bpm_list`].
pub fn parse_stop_list(value: &str) -> Result<Vec<SmStop>, FieldFormatError> {
    Ok(parse_pairs("STOPS", value)?
        .into_iter()
        .map(|(beat, duration)| SmStop { beat, duration })
        .collect())
}

/// Parses a `#NOTES` value of six `:`-separated segments: chart type, author, difficulty, meter, groove radar and note grid.
///
/// An empty meter is read as zero.
///
/// # Errors
///
/// Returns [`FieldFormatReason::SegmentCount`] if there are not six segments, or any error from the segments.
pub fn parse_chart(value: &str) -> Result<SmChart, FieldFormatError> {
    const FIELD: &str = "NOTES";
    let segments: Vec<_> = value.split(':').map(str::trim).collect();
    let [chart_type, author, difficulty, meter, groove_radar, grid] = segments.as_slice() else {
        return Err(FieldFormatError::new(
            FIELD,
            segments.first().copied().unwrap_or_default(),
            FieldFormatReason::SegmentCount {
                expected: 6,
                found: segments.len(),
            },
        ));
    };

    let meter = if meter.is_empty() {
        0
    } else {
        meter.parse().map_err(|_| {
            FieldFormatError::new(FIELD, *meter, FieldFormatReason::InvalidNumber)
        })?
    };
    let groove_radar = groove_radar
        .split(',')
        .filter(|value| !value.trim().is_empty())
        .map(|value| parse_number(FIELD, value))
        .collect::<Result<_, _>>()?;

    Ok(SmChart {
        chart_type: ChartType::from_name(chart_type),
        author: (*author).to_owned(),
        difficulty: Difficulty::from_name(difficulty),
        meter,
        groove_radar,
        measures: parse_note_grid(grid)?,
    })
}

/// Parses a note grid into measures separated by `,`. Every row must have the same number of cells.
///
/// # Errors
///
/// Returns [`FieldFormatReason::UnknownNote`] for an unknown cell, or [`FieldFormatReason::InconsistentRowWidth`] if rows differ in width.
pub fn parse_note_grid(grid: &str) -> Result<Vec<Measure>, FieldFormatError> {
    const FIELD: &str = "NOTES";
    if grid.trim().is_empty() {
        return Ok(Vec::new());
    }
    let mut width = None;
    let mut measures = Vec::new();
    for measure in grid.split(',') {
        let mut rows = Vec::new();
        for line in measure.lines() {
            let line = line.split("//").next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let row = line
                .chars()
                .map(|c| {
                    SmNote::from_char(c).ok_or_else(|| {
                        FieldFormatError::new(FIELD, line, FieldFormatReason::UnknownNote(c))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let expected = *width.get_or_insert(row.len());
            if row.len() != expected {
                return Err(FieldFormatError::new(
                    FIELD,
                    line,
                    FieldFormatReason::InconsistentRowWidth {
                        expected,
                        found: row.len(),
                    },
                ));
            }
            rows.push(row);
        }
        measures.push(Measure { rows });
    }
    Ok(measures)
}
