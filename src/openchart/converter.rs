//! Conversion between [`ProjectData`] and [`Project`].

use itertools::Itertools;
use log::debug;

use super::{
    BpmData, ChartData, ObjectData, ObjectKind, ProjectData, ProjectMetadata, RowData, SongData,
    VERSION,
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

/// Converts between [`ProjectData`] and [`Project`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenChartConverter;

impl ProjectConverter for OpenChartConverter {
    type Data = ProjectData;

    fn to_native(&self, data: ProjectData) -> Result<Project, ConversionError> {
        data.validate()
            .map_err(|err| ConversionError::Load(err.into()))?;

        let song = data.song.map(|song| SongMetadata {
            artist: song.artist,
            title: song.title,
            audio_file_path: song.path,
        });
        let charts = data
            .charts
            .into_iter()
            .map(chart_to_native)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ConversionError::Load)?;
        debug!("converted {} OpenChart chart(s)", charts.len());

        Ok(Project {
            name: song.as_ref().map(|song| song.title.clone()).unwrap_or_default(),
            song,
            charts,
            format_version: data.metadata.and_then(|metadata| metadata.version),
        })
    }

    fn from_native(&self, project: &Project) -> Result<ProjectData, ConversionError> {
        let data = ProjectData {
            metadata: Some(ProjectMetadata {
                version: Some(VERSION.into()),
            }),
            song: project.song.as_ref().map(|song| SongData {
                artist: song.artist.clone(),
                title: song.title.clone(),
                path: song.audio_file_path.clone(),
            }),
            charts: project.charts.iter().map(chart_from_native).collect(),
        };
        data.validate()
            .map_err(|err| ConversionError::Store(err.into()))?;
        Ok(data)
    }
}

fn chart_to_native(data: ChartData) -> Result<Chart, ConversionCause> {
    let mut chart = Chart::new(KeyCount::try_from(data.key_count)?);
    chart.author = data.author;
    chart.chart_name = data.chart_name;

    let bpms = data
        .bpms
        .iter()
        .map(|bpm| Bpm::new(bpm.value, bpm.beat))
        .collect::<Result<Vec<_>, _>>()?;
    chart.add_bpms(bpms)?;

    let mut objects = Vec::new();
    for row in data.rows {
        let beat = Beat::new(row.beat)?;
        for obj in row.objects {
            objects.push(object_to_native(obj, beat)?);
        }
    }
    chart.add_objects(objects)?;
    Ok(chart)
}

fn object_to_native(data: ObjectData, beat: Beat) -> Result<ChartObject, ConversionCause> {
    let key = KeyIndex::try_from(data.key)?;
    Ok(match data.kind {
        ObjectKind::Tap => ChartObject::tap(key, beat),
        ObjectKind::Hold => {
            let length = data
                .length
                .ok_or(DataValidationError::MissingField("length"))?;
            ChartObject::hold(key, beat, BeatDuration::new(length)?)
        }
    })
}

fn chart_from_native(chart: &Chart) -> ChartData {
    let mut objects: Vec<&ChartObject> = chart.iter_objects().collect();
    objects.sort_by_key(|obj| (obj.beat(), obj.key()));

    let mut rows = Vec::new();
    for (beat, row) in &objects.into_iter().chunk_by(|obj| obj.beat()) {
        rows.push(RowData {
            beat: beat.as_f64(),
            objects: row.map(object_from_native).collect(),
        });
    }

    ChartData {
        author: chart.author.clone(),
        chart_name: chart.chart_name.clone(),
        key_count: chart.key_count().get().into(),
        bpms: chart
            .bpms()
            .iter()
            .map(|bpm| BpmData {
                value: bpm.value(),
                beat: bpm.beat().as_f64(),
            })
            .collect(),
        rows,
    }
}

fn object_from_native(obj: &ChartObject) -> ObjectData {
    match obj {
        ChartObject::Tap(tap) => ObjectData {
            kind: ObjectKind::Tap,
            key: tap.key.get().into(),
            length: None,
        },
        ChartObject::Hold(hold) => ObjectData {
            kind: ObjectKind::Hold,
            key: hold.key.get().into(),
            length: Some(hold.length.as_f64()),
        },
    }
}
