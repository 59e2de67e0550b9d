//! Conversion between [`StepFileData`] and [`Project`].
//!
//! A row of a measure with `n` rows sits at `4 * i / n` beats from the start of the measure. Holds and rolls are read as a head (`2` or `4`) closed by the next tail (`3`) on the same key; rolls become plain holds.

use std::collections::BTreeMap;

use log::{debug, warn};

use super::{
    ChartType, Difficulty, FieldFormatError, FieldFormatReason, Measure, MetaData, PlayData,
    SmBpm, SmChart, SmNote, SongData, StepFileData, serializer::check_text,
};
use crate::{
    chart::{
        Chart,
        obj::{BeatObject, Bpm, ChartObject},
        value::{Beat, BeatDuration, KeyCount, KeyIndex},
    },
    format::{ConversionCause, ConversionError, DataValidationError, ProjectConverter},
    project::{Project, SongMetadata},
};

/// Rows per measure StepMania can write, from the coarsest.
const RESOLUTIONS: [usize; 10] = [4, 8, 12, 16, 24, 32, 48, 64, 96, 192];

/// How far a beat may be off a row to be placed on it.
const EPSILON: f64 = 1e-6;

/// The most measures written for one chart.
const MAX_MEASURES: usize = 100_000;

/// Converts between [`StepFileData`] and [`Project`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SmConverter;

impl ProjectConverter for SmConverter {
    type Data = StepFileData;

    fn to_native(&self, data: StepFileData) -> Result<Project, ConversionError> {
        let StepFileData {
            meta, song, play, charts, ..
        } = data;

        let bpms = play
            .bpms
            .iter()
            .map(|bpm| Bpm::new(bpm.value, bpm.beat))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| ConversionError::Load(err.into()))?;
        let charts = charts
            .into_iter()
            .map(|chart| chart_to_native(chart, &bpms))
            .collect::<Result<Vec<_>, _>>()
            .map_err(ConversionError::Load)?;
        debug!("converted {} SM chart(s)", charts.len());

        let song = (meta.title.is_some() || meta.artist.is_some() || song.music.is_some()).then(
            || SongMetadata {
                artist: meta.artist.clone().unwrap_or_default(),
                title: meta.title.clone().unwrap_or_default(),
                audio_file_path: song.music.unwrap_or_default(),
            },
        );
        Ok(Project {
            name: meta.title.unwrap_or_default(),
            song,
            charts,
            format_version: None,
        })
    }

    fn from_native(&self, project: &Project) -> Result<StepFileData, ConversionError> {
        let bpms = shared_bpms(&project.charts).map_err(ConversionError::Store)?;
        let charts = project
            .charts
            .iter()
            .map(chart_from_native)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ConversionError::Store)?;

        let title = project.song.as_ref().map_or_else(
            || (!project.name.is_empty()).then(|| project.name.clone()),
            |song| Some(song.title.clone()),
        );
        let texts = [
            ("TITLE", title.as_deref()),
            ("ARTIST", project.song.as_ref().map(|song| song.artist.as_str())),
            (
                "MUSIC",
                project.song.as_ref().map(|song| song.audio_file_path.as_str()),
            ),
        ];
        for (field, text) in texts {
            if let Some(text) = text {
                writable(field, text).map_err(ConversionError::Store)?;
            }
        }
        Ok(StepFileData {
            meta: MetaData {
                title,
                artist: project.song.as_ref().map(|song| song.artist.clone()),
                ..Default::default()
            },
            song: SongData {
                music: project
                    .song
                    .as_ref()
                    .map(|song| song.audio_file_path.clone()),
                ..Default::default()
            },
            play: PlayData {
                bpms,
                ..Default::default()
            },
            charts,
            ..Default::default()
        })
    }
}

/// Fails if `text` would not be read back as written in `field`.
fn writable(field: &str, text: &str) -> Result<(), ConversionCause> {
    check_text(field, text).map_err(|err| ConversionCause::Unsupported(err.to_string()))
}

fn chart_to_native(data: SmChart, bpms: &[Bpm]) -> Result<Chart, ConversionCause> {
    let width = data
        .measures
        .iter()
        .find_map(|measure| measure.rows.first())
        .map(Vec::len);
    let keys = match (data.chart_type.key_count(), width) {
        (Some(keys), Some(width)) if keys as usize != width => {
            return Err(FieldFormatError::new(
                "NOTES",
                data.chart_type.name(),
                FieldFormatReason::InconsistentRowWidth {
                    expected: keys as usize,
                    found: width,
                },
            )
            .into());
        }
        (Some(keys), _) => keys,
        (None, Some(width)) => width as u32,
        (None, None) => {
            return Err(ConversionCause::Unsupported(format!(
                "unknown key count of chart type `{}`",
                data.chart_type
            )));
        }
    };

    let mut chart = Chart::new(KeyCount::new(keys)?);
    chart.author = data.author;
    chart.chart_name = data.difficulty.name().to_owned();
    chart.add_bpms(bpms.iter().copied())?;
    chart.add_objects(read_objects(&data.measures, keys as usize)?)?;
    Ok(chart)
}

fn read_objects(measures: &[Measure], keys: usize) -> Result<Vec<ChartObject>, ConversionCause> {
    let mut objects = Vec::new();
    let mut heads: Vec<Option<Beat>> = vec![None; keys];
    let mut skipped = 0usize;
    for (index, measure) in measures.iter().enumerate() {
        let rows = measure.rows.len();
        for (row_index, row) in measure.rows.iter().enumerate() {
            let beat = Beat::new(index as f64 * 4.0 + 4.0 * row_index as f64 / rows as f64)?;
            for ((key, note), head) in row.iter().enumerate().zip(heads.iter_mut()) {
                let key = KeyIndex(key as u32);
                match note {
                    SmNote::Empty => {}
                    SmNote::Tap => objects.push(ChartObject::tap(key, beat)),
                    SmNote::HoldHead | SmNote::RollHead => {
                        if let Some(open) = head.replace(beat) {
                            return Err(
                                DataValidationError::HoldHeadWithoutTail { key, beat: open }.into()
                            );
                        }
                    }
                    SmNote::Tail => {
                        let start = head
                            .take()
                            .ok_or(DataValidationError::HoldTailWithoutHead { key, beat })?;
                        let length = BeatDuration::new(beat.as_f64() - start.as_f64())?;
                        objects.push(ChartObject::hold(key, start, length));
                    }
                    SmNote::Mine | SmNote::Lift | SmNote::Fake | SmNote::KeySound => skipped += 1,
                }
            }
        }
    }
    if let Some((key, beat)) = heads
        .iter()
        .enumerate()
        .find_map(|(key, head)| head.map(|beat| (KeyIndex(key as u32), beat)))
    {
        return Err(DataValidationError::HoldHeadWithoutTail { key, beat }.into());
    }
    if skipped > 0 {
        debug!("skipped {skipped} note(s) without a native object");
    }
    Ok(objects)
}

/// The BPM schedule every chart shares, as SM has only one.
fn shared_bpms(charts: &[Chart]) -> Result<Vec<SmBpm>, ConversionCause> {
    let Some((first, rest)) = charts.split_first() else {
        return Ok(Vec::new());
    };
    if rest.iter().any(|chart| chart.bpms() != first.bpms()) {
        return Err(ConversionCause::Unsupported(
            "charts with different BPM changes".into(),
        ));
    }
    Ok(first
        .bpms()
        .iter()
        .map(|bpm| SmBpm {
            beat: bpm.beat().as_f64(),
            value: bpm.value(),
        })
        .collect())
}

fn chart_from_native(chart: &Chart) -> Result<SmChart, ConversionCause> {
    let keys = chart.key_count().get();
    let chart_type = ChartType::from_key_count(keys)
        .ok_or_else(|| ConversionCause::Unsupported(format!("charts of {keys} keys")))?;
    writable("NOTES", &chart.author)?;
    writable("NOTES", &chart.chart_name)?;

    let mut cells = BTreeMap::new();
    let mut place = |beat: Beat, key: KeyIndex, note: SmNote| {
        if cells.insert((beat, key), note).is_some() {
            return Err(ConversionCause::Unsupported(format!(
                "two notes on key {key} at beat {beat}"
            )));
        }
        Ok(())
    };
    for obj in chart.iter_objects() {
        match obj {
            ChartObject::Tap(tap) => place(tap.beat, tap.key, SmNote::Tap)?,
            ChartObject::Hold(hold) => {
                place(hold.beat, hold.key, SmNote::HoldHead)?;
                place(hold.end(), hold.key, SmNote::Tail)?;
            }
        }
    }

    let measure_count = match cells.keys().next_back() {
        Some((beat, _)) => measure_index(*beat)? + 1,
        None => 1,
    };
    let mut by_measure = vec![Vec::new(); measure_count];
    for ((beat, key), note) in cells {
        let index = measure_index(beat)?;
        let offset = (beat.as_f64() - index as f64 * 4.0) / 4.0;
        if let Some(measure) = by_measure.get_mut(index) {
            measure.push((offset, key, note));
        }
    }

    let measures = by_measure
        .iter()
        .map(|cells| quantize(cells, keys as usize))
        .collect::<Result<Vec<_>, _>>()?;
    debug!(
        "wrote {} object(s) of a {chart_type} chart",
        chart.object_count()
    );
    Ok(SmChart {
        chart_type,
        author: chart.author.clone(),
        difficulty: Difficulty::from_name(&chart.chart_name),
        meter: 1,
        groove_radar: Vec::new(),
        measures,
    })
}

/// The index of the measure where `beat` is, up to [`MAX_MEASURES`].
fn measure_index(beat: Beat) -> Result<usize, ConversionCause> {
    let index = (beat.as_f64() / 4.0).floor();
    if index >= MAX_MEASURES as f64 {
        return Err(ConversionCause::Unsupported(format!(
            "beat {beat} beyond {MAX_MEASURES} measures"
        )));
    }
    Ok(index as usize)
}

/// Lays out the cells of a measure, given as offsets in `[0, 1)` of the measure, on the coarsest resolution placing all of them exactly.
///
/// Off every resolution, cells are rounded to the nearest 192nd row. Rounding which merges two cells or reaches the next measure fails, as the notes would not be read back.
fn quantize(cells: &[(f64, KeyIndex, SmNote)], keys: usize) -> Result<Measure, ConversionCause> {
    let fits = |rows: usize| {
        cells.iter().all(|(offset, _, _)| {
            let position = offset * rows as f64;
            (position - position.round()).abs() < EPSILON
        })
    };
    let rows = RESOLUTIONS
        .into_iter()
        .find(|&rows| fits(rows))
        .unwrap_or_else(|| {
            warn!("notes off the 192nd grid are moved to the nearest row");
            192
        });

    let mut grid = vec![vec![SmNote::Empty; keys]; rows];
    for &(offset, key, note) in cells {
        let row = (offset * rows as f64).round() as usize;
        let Some(cell) = grid.get_mut(row).and_then(|row| row.get_mut(key.as_usize())) else {
            return Err(ConversionCause::Unsupported(format!(
                "note on key {key} too close to the next measure in 192nd rows"
            )));
        };
        if *cell != SmNote::Empty {
            return Err(ConversionCause::Unsupported(format!(
                "notes on key {key} too close to tell apart in 192nd rows"
            )));
        }
        *cell = note;
    }
    Ok(Measure { rows: grid })
}
