//! Tests for `openchart_rs::openchart`.

use openchart_rs::{
    openchart::{ChartData, ProjectMetadata},
    prelude::*,
};
use pretty_assertions::assert_eq;

fn sample_project() -> Project {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart.author = "Charter".into();
    chart.chart_name = "Hard".into();
    chart
        .add_bpms([Bpm::new(150.0, 0.0).unwrap(), Bpm::new(200.0, 16.0).unwrap()])
        .unwrap();
    chart
        .add_objects([
            ChartObject::tap(KeyIndex(0), Beat::ZERO),
            ChartObject::tap(KeyIndex(3), Beat::ZERO),
            ChartObject::hold(
                KeyIndex(1),
                Beat::new(0.75).unwrap(),
                BeatDuration::new(2.25).unwrap(),
            ),
        ])
        .unwrap();

    let mut project = Project::new("Title").with_song(SongMetadata {
        artist: "Artist".into(),
        title: "Title".into(),
        audio_file_path: "song.ogg".into(),
    });
    project.push_chart(chart);
    project.push_chart(Chart::new(KeyCount::new(7).unwrap()));
    project
}

#[test]
fn loads_file() {
    let source = include_str!("files/two_charts.oc");
    let project = OpenChartFormat::default().load(source.as_bytes()).unwrap();

    assert_eq!(project.name, "Title");
    assert_eq!(project.format_version.as_deref(), Some("0.1"));
    assert_eq!(
        project.song,
        Some(SongMetadata {
            artist: "Artist".into(),
            title: "Title".into(),
            audio_file_path: "audio/song.ogg".into(),
        })
    );
    assert_eq!(project.charts.len(), 2);

    let hard = &project.charts[0];
    assert_eq!(hard.author, "Charter");
    assert_eq!(hard.chart_name, "Hard");
    assert_eq!(hard.key_count().get(), 4);
    assert_eq!(hard.bpms().len(), 2);
    assert_eq!(hard.object_count(), 4);
    assert_eq!(
        hard.objects(KeyIndex(2)).unwrap().to_vec(),
        vec![ChartObject::hold(
            KeyIndex(2),
            Beat::new(1.5).unwrap(),
            BeatDuration::new(1.0).unwrap(),
        )]
    );

    let easy = &project.charts[1];
    assert_eq!(easy.key_count().get(), 6);
    assert_eq!(easy.object_count(), 0);
}

#[test]
fn round_trip_keeps_fields() {
    let format = OpenChartFormat::default();
    let project = sample_project();
    let bytes = format.save(&project).unwrap();
    let loaded = format.load(&bytes).unwrap();

    assert_eq!(loaded.format_version.as_deref(), Some("0.1"));
    assert_eq!(loaded.song, project.song);
    assert_eq!(loaded.charts, project.charts);

    let compact = OpenChartFormat {
        serializer: OpenChartSerializer::compact(),
        ..Default::default()
    };
    let bytes = compact.save(&project).unwrap();
    assert!(!bytes.contains(&b'\n'));
    assert_eq!(compact.load(&bytes).unwrap().charts, project.charts);
}

#[test]
fn saved_rows_group_objects_by_beat() {
    let data = OpenChartConverter.from_native(&sample_project()).unwrap();
    assert_eq!(
        data.metadata,
        Some(ProjectMetadata {
            version: Some("0.1".into())
        })
    );
    let ChartData { rows, .. } = &data.charts[0];
    let shape: Vec<(f64, Vec<i64>)> = rows
        .iter()
        .map(|row| (row.beat, row.objects.iter().map(|obj| obj.key).collect()))
        .collect();
    assert_eq!(shape, vec![(0.0, vec![0, 3]), (0.75, vec![1])]);
}

#[test]
fn missing_version_fails_to_load() {
    let source = r#"{ "metadata": {}, "charts": [] }"#;
    match OpenChartFormat::default().load(source.as_bytes()) {
        Err(FormatError::Conversion(err)) => assert_eq!(
            err.cause(),
            &ConversionCause::Validation(DataValidationError::MissingField("metadata.version"))
        ),
        other => panic!("expected a conversion error, got {other:?}"),
    }
}

#[test]
fn invalid_values_fail_to_load() {
    let cases = [
        (
            r#"{ "metadata": { "version": "0.1" }, "charts": [{ "keyCount": 0 }] }"#,
            ConversionCause::Chart(ChartError::ValueRange(ValueRangeError::ZeroKeyCount(0))),
        ),
        (
            r#"{ "metadata": { "version": "0.1" }, "charts": [{ "keyCount": 4, "bpms": [{ "value": -1, "beat": 0 }] }] }"#,
            ConversionCause::Chart(ChartError::ValueRange(ValueRangeError::NonPositiveBpm(-1.0))),
        ),
        (
            r#"{ "metadata": { "version": "0.1" }, "charts": [{ "keyCount": 4, "rows": [{ "beat": 0, "objects": [{ "type": "hold", "key": 0 }] }] }] }"#,
            ConversionCause::Validation(DataValidationError::MissingField("length")),
        ),
        (
            r#"{ "metadata": { "version": "0.1" }, "charts": [{ "keyCount": 4, "rows": [{ "beat": 0, "objects": [{ "type": "tap", "key": 4 }] }] }] }"#,
            ConversionCause::Chart(ChartError::Placement(PlacementError::KeyIndexOutOfRange {
                key: KeyIndex(4),
                key_count: KeyCount::new(4).unwrap(),
            })),
        ),
    ];
    for (source, expected) in cases {
        match OpenChartFormat::default().load(source.as_bytes()) {
            Err(FormatError::Conversion(err)) => assert_eq!(err.cause(), &expected, "{source}"),
            other => panic!("expected a conversion error for {source}, got {other:?}"),
        }
    }
}

#[test]
fn json_error_reports_path() {
    let source = r#"{ "metadata": { "version": "0.1" }, "charts": [{ "keyCount": "four" }] }"#;
    match OpenChartFormat::default().load(source.as_bytes()) {
        Err(FormatError::Json { path, .. }) => assert_eq!(path, "charts[0].keyCount"),
        other => panic!("expected a JSON error, got {other:?}"),
    }
}
