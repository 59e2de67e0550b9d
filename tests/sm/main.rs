//! Tests for `openchart_rs::sm`.

mod field_parser;

use openchart_rs::{
    prelude::*,
    sm::{ChartType, DisplayBpm, Difficulty, SmBpm, SmStop},
};
use pretty_assertions::assert_eq;

fn beat(value: f64) -> Beat {
    Beat::new(value).unwrap()
}

fn tap(key: u32, at: f64) -> ChartObject {
    ChartObject::tap(KeyIndex(key), beat(at))
}

fn hold(key: u32, at: f64, length: f64) -> ChartObject {
    ChartObject::hold(KeyIndex(key), beat(at), BeatDuration::new(length).unwrap())
}

#[test]
fn minimal_file_to_project() {
    let source = include_str!("files/minimal.sm");
    let project = SmFormat::default().load(source.as_bytes()).unwrap();

    assert_eq!(project.name, "Minimal");
    assert_eq!(
        project.song,
        Some(SongMetadata {
            artist: "Nobody".into(),
            title: "Minimal".into(),
            audio_file_path: "minimal.ogg".into(),
        })
    );
    assert_eq!(project.charts.len(), 1);

    let chart = &project.charts[0];
    assert_eq!(chart.key_count().get(), 4);
    assert_eq!(chart.bpms().to_vec(), vec![Bpm::new(120.0, 0.0).unwrap()]);
    assert_eq!(chart.bpms().as_slice()[0].value(), 120.0);
    assert_eq!(chart.chart_name, "Beginner");
    assert_eq!(
        chart.iter_objects().copied().collect::<Vec<_>>(),
        vec![tap(0, 0.0), tap(1, 1.0), tap(2, 2.0), tap(3, 3.0)]
    );
}

#[test]
fn header_fields() {
    let source = include_str!("files/holds.sm");
    let SmParseOutput { data, warnings } = parse_sm(source).unwrap();

    assert_eq!(
        warnings
            .into_iter()
            .map(SmWarningWithRange::into_content)
            .collect::<Vec<_>>(),
        vec![SmWarning::UnknownField {
            name: "ATTACKS".into()
        }]
    );
    assert_eq!(data.meta.title.as_deref(), Some("Holding Pattern"));
    assert_eq!(data.meta.subtitle.as_deref(), Some("(Extended Mix)"));
    assert_eq!(data.meta.title_translit.as_deref(), Some(""));
    assert_eq!(data.meta.genre.as_deref(), Some("Trance"));
    assert_eq!(data.meta.credit.as_deref(), Some("tester"));
    assert_eq!(data.display.banner.as_deref(), Some("banner.png"));
    assert_eq!(data.display.selectable, Some(true));
    assert_eq!(
        data.display.display_bpm,
        Some(DisplayBpm::Range {
            lower: 140.0,
            upper: 280.0
        })
    );
    assert_eq!(data.song.sample_start, Some(30.5));
    assert_eq!(data.song.sample_length, Some(12.0));
    assert_eq!(data.play.offset, Some(-0.012));
    assert_eq!(
        data.play.bpms,
        vec![
            SmBpm {
                beat: 0.0,
                value: 140.0
            },
            SmBpm {
                beat: 8.0,
                value: 280.0
            },
        ]
    );
    assert_eq!(
        data.play.stops,
        vec![SmStop {
            beat: 4.0,
            duration: 0.25
        }]
    );

    assert_eq!(data.charts.len(), 2);
    let single = &data.charts[0];
    assert_eq!(single.chart_type, ChartType::DanceSingle);
    assert_eq!(single.author, "Sustain");
    assert_eq!(single.difficulty, Difficulty::Hard);
    assert_eq!(single.meter, 9);
    assert_eq!(single.groove_radar, vec![0.5, 0.6, 0.1, 0.2, 0.3]);
    assert_eq!(
        single
            .measures
            .iter()
            .map(|measure| measure.rows.len())
            .collect::<Vec<_>>(),
        vec![4, 8, 4]
    );
    let double = &data.charts[1];
    assert_eq!(double.chart_type, ChartType::DanceDouble);
    assert!(double.groove_radar.is_empty());
}

#[test]
fn holds_and_rolls_become_holds() {
    let source = include_str!("files/holds.sm");
    let project = SmFormat::default().load(source.as_bytes()).unwrap();
    let single = &project.charts[0];

    assert_eq!(single.author, "Sustain");
    assert_eq!(single.chart_name, "Hard");
    assert_eq!(
        single.iter_objects().copied().collect::<Vec<_>>(),
        vec![
            hold(0, 0.0, 2.0),
            tap(1, 2.0),
            hold(2, 4.0, 1.5),
            tap(3, 5.5),
        ]
    );
    assert_eq!(single.bpms().len(), 2);

    let double = &project.charts[1];
    assert_eq!(double.key_count().get(), 8);
    assert_eq!(double.chart_name, "Challenge");
    assert_eq!(
        double.iter_objects().copied().collect::<Vec<_>>(),
        vec![tap(0, 0.0), tap(7, 0.0)]
    );
}

#[test]
fn project_round_trip() {
    let format = SmFormat::default();
    let source = include_str!("files/holds.sm");
    let project = format.load(source.as_bytes()).unwrap();

    let saved = format.save(&project).unwrap();
    let text = String::from_utf8(saved.clone()).unwrap();
    assert!(text.contains("#BPMS:0=140,8=280;"));
    let reloaded = format.load(&saved).unwrap();

    assert_eq!(reloaded.name, project.name);
    assert_eq!(reloaded.song, project.song);
    assert_eq!(reloaded.charts, project.charts);
}

#[test]
fn saving_quantizes_measures() {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart.add_bpm(Bpm::new(150.0, 0.0).unwrap()).unwrap();
    chart
        .add_objects([
            tap(0, 0.0),
            tap(1, 1.0 / 3.0),
            hold(2, 4.5, 3.0),
            tap(3, 9.0),
        ])
        .unwrap();
    let mut project = Project::new("Quantized");
    project.push_chart(chart);

    let data = SmConverter.from_native(&project).unwrap();
    assert_eq!(data.meta.title.as_deref(), Some("Quantized"));
    let rows: Vec<usize> = data.charts[0]
        .measures
        .iter()
        .map(|measure| measure.rows.len())
        .collect();
    // 1/3 beat needs 12ths, 4.5 needs 8ths, the tail at 7.5 too, and 9 fits quarters.
    assert_eq!(rows, vec![12, 8, 4]);

    let reloaded = SmConverter.to_native(data).unwrap();
    assert_eq!(reloaded.charts[0].object_count(), 4);
    assert_eq!(
        reloaded.charts[0].objects(KeyIndex(2)).unwrap().to_vec(),
        vec![hold(2, 4.5, 3.0)]
    );
}

#[test]
fn unsupported_projects_fail_to_save() {
    let store_cause = |project: &Project| match SmConverter.from_native(project) {
        Err(err) => err.cause().clone(),
        Ok(_) => panic!("expected an error"),
    };

    let mut project = Project::new("nine keys");
    project.push_chart(Chart::new(KeyCount::new(9).unwrap()));
    assert!(matches!(
        store_cause(&project),
        ConversionCause::Unsupported(_)
    ));

    let mut tail_on_tap = Chart::new(KeyCount::new(4).unwrap());
    tail_on_tap
        .add_objects([hold(0, 0.0, 1.0), tap(0, 1.0)])
        .unwrap();
    let mut project = Project::new("collision");
    project.push_chart(tail_on_tap);
    assert!(matches!(
        store_cause(&project),
        ConversionCause::Unsupported(_)
    ));

    let mut slow = Chart::new(KeyCount::new(4).unwrap());
    slow.add_bpm(Bpm::new(60.0, 0.0).unwrap()).unwrap();
    let mut fast = Chart::new(KeyCount::new(4).unwrap());
    fast.add_bpm(Bpm::new(180.0, 0.0).unwrap()).unwrap();
    let mut project = Project::new("tempo");
    project.push_chart(slow);
    project.push_chart(fast);
    assert!(matches!(
        store_cause(&project),
        ConversionCause::Unsupported(_)
    ));
}

fn save_error(project: &Project) -> ConversionCause {
    match SmFormat::default().save(project) {
        Err(FormatError::Conversion(err)) => err.cause().clone(),
        other => panic!("expected a conversion error, got {other:?}"),
    }
}

fn project_with(objects: impl IntoIterator<Item = ChartObject>) -> Project {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart.add_bpm(Bpm::new(120.0, 0.0).unwrap()).unwrap();
    chart.add_objects(objects).unwrap();
    let mut project = Project::new("Song");
    project.push_chart(chart);
    project
}

#[test]
fn texts_breaking_records_fail_to_save() {
    let mut project = project_with([tap(0, 0.0)]);
    project.charts[0].author = "DJ: X".into();
    assert!(matches!(
        save_error(&project),
        ConversionCause::Unsupported(_)
    ));

    let mut project = project_with([tap(0, 0.0)]);
    project.charts[0].chart_name = "Hard//Edit".into();
    assert!(matches!(
        save_error(&project),
        ConversionCause::Unsupported(_)
    ));

    let project = project_with([tap(0, 0.0)]).with_song(SongMetadata {
        artist: "A;B".into(),
        title: "Song".into(),
        audio_file_path: "song.ogg".into(),
    });
    assert!(matches!(
        save_error(&project),
        ConversionCause::Unsupported(_)
    ));

    // `:` is only a separator inside `#NOTES`
    let project = project_with([tap(0, 0.0)]).with_song(SongMetadata {
        artist: "Someone".into(),
        title: "Song: Remix".into(),
        audio_file_path: "song.ogg".into(),
    });
    let format = SmFormat::default();
    let reloaded = format.load(&format.save(&project).unwrap()).unwrap();
    assert_eq!(reloaded.song, project.song);
    assert_eq!(reloaded.charts[0].object_count(), 1);
}

#[test]
fn notes_merged_by_rounding_fail_to_save() {
    let project = project_with([tap(0, 0.0), tap(0, 0.001)]);
    assert!(matches!(
        save_error(&project),
        ConversionCause::Unsupported(_)
    ));

    let project = project_with([hold(0, 0.0, 0.001)]);
    assert!(matches!(
        save_error(&project),
        ConversionCause::Unsupported(_)
    ));

    let project = project_with([tap(1, 3.9999)]);
    assert!(matches!(
        save_error(&project),
        ConversionCause::Unsupported(_)
    ));

    // different keys on the same rounded row are fine
    let project = project_with([tap(0, 0.0), tap(1, 0.001)]);
    let format = SmFormat::default();
    let reloaded = format.load(&format.save(&project).unwrap()).unwrap();
    assert_eq!(reloaded.charts[0].object_count(), 2);
}

#[test]
fn far_beats_fail_to_save() {
    let project = project_with([tap(0, 1e20)]);
    assert!(matches!(
        save_error(&project),
        ConversionCause::Unsupported(_)
    ));
}

#[test]
fn malformed_files_fail() {
    let cases = [
        ("#BPMS:0=120=4;", FieldFormatReason::MalformedPair),
        ("#DISPLAYBPM:fast;", FieldFormatReason::InvalidNumber),
        ("#SELECTABLE:MAYBE;", FieldFormatReason::InvalidBool),
        (
            "#NOTES:dance-single:a:Easy:1:1000;",
            FieldFormatReason::SegmentCount {
                expected: 6,
                found: 5,
            },
        ),
        (
            "#NOTES:dance-single:a:Easy:1::10X0;",
            FieldFormatReason::UnknownNote('X'),
        ),
    ];
    for (source, reason) in cases {
        match SmFormat::default().load(source.as_bytes()) {
            Err(FormatError::Field(err)) => {
                assert_eq!(err.reason, reason, "{source}");
                assert!(err.range.is_some(), "{source}");
            }
            other => panic!("expected a field error for {source}, got {other:?}"),
        }
    }
}

#[test]
fn broken_holds_fail_to_load() {
    let orphan = "#BPMS:0=120;#NOTES:dance-single:::1::0000\n0003;";
    match SmFormat::default().load(orphan.as_bytes()) {
        Err(FormatError::Conversion(err)) => assert_eq!(
            err.cause(),
            &ConversionCause::Validation(DataValidationError::HoldTailWithoutHead {
                key: KeyIndex(3),
                beat: beat(2.0),
            })
        ),
        other => panic!("expected a conversion error, got {other:?}"),
    }

    let unclosed = "#BPMS:0=120;#NOTES:dance-single:::1::2000;";
    assert!(matches!(
        SmFormat::default().load(unclosed.as_bytes()),
        Err(FormatError::Conversion(_))
    ));
}

#[test]
fn row_width_must_match_chart_type() {
    let source = "#NOTES:dance-single:::1::10000;";
    match SmFormat::default().load(source.as_bytes()) {
        Err(FormatError::Conversion(err)) => assert!(matches!(
            err.cause(),
            ConversionCause::Field(FieldFormatError {
                reason: FieldFormatReason::InconsistentRowWidth {
                    expected: 4,
                    found: 5
                },
                ..
            })
        )),
        other => panic!("expected a conversion error, got {other:?}"),
    }

    let unknown = "#NOTES:techno-single5:::1::01000;";
    let project = SmFormat::default().load(unknown.as_bytes()).unwrap();
    assert_eq!(project.charts[0].key_count().get(), 5);
    assert_eq!(project.charts[0].chart_name, "");
}

#[cfg(feature = "diagnostics")]
#[test]
fn warnings_render_as_reports() {
    let source = "#TITLE:Song\n#WHAT:ever;\nstray";
    let SmParseOutput { warnings, .. } = parse_sm(source).unwrap();
    assert_eq!(warnings.len(), 3);
    let reports = openchart_rs::diagnostics::collect_sm_reports("test.sm", source, &warnings);
    assert_eq!(reports.len(), 3);

    let err = parse_sm("#OFFSET:soon;").unwrap_err();
    let report = err.to_report(&SimpleSource::new("test.sm", "#OFFSET:soon;"));
    let mut rendered = Vec::new();
    report
        .write(
            ("test.sm".to_string(), ariadne::Source::from("#OFFSET:soon;")),
            &mut rendered,
        )
        .unwrap();
    assert!(String::from_utf8_lossy(&rendered).contains("Malformed #OFFSET"));
}
