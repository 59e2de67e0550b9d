use openchart_rs::sm::{
    DisplayBpm, FieldFormatReason, SmBpm, SmStop,
    field_parser::{parse_bpm_list, parse_chart, parse_display_bpm, parse_stop_list},
};
use pretty_assertions::assert_eq;

#[test]
fn blank_bpm_lists_are_empty() {
    for source in ["", " ", ",", " , \n,"] {
        assert_eq!(parse_bpm_list(source), Ok(vec![]), "{source:?}");
        assert_eq!(parse_stop_list(source), Ok(vec![]), "{source:?}");
    }
}

#[test]
fn bpm_list_entries() {
    assert_eq!(
        parse_bpm_list("0=100"),
        Ok(vec![SmBpm {
            beat: 0.0,
            value: 100.0
        }])
    );
    assert_eq!(
        parse_bpm_list("1.2345=123.45"),
        Ok(vec![SmBpm {
            beat: 1.2345,
            value: 123.45
        }])
    );
    assert_eq!(
        parse_bpm_list("0.000=150.000,\n64.000=75.000"),
        Ok(vec![
            SmBpm {
                beat: 0.0,
                value: 150.0
            },
            SmBpm {
                beat: 64.0,
                value: 75.0
            },
        ])
    );
    // Values are not range-checked until converted into a chart.
    assert_eq!(
        parse_bpm_list("100=0"),
        Ok(vec![SmBpm {
            beat: 100.0,
            value: 0.0
        }])
    );
}

#[test]
fn malformed_bpm_lists() {
    for (source, reason) in [
        ("0", FieldFormatReason::MalformedPair),
        ("0=1=2", FieldFormatReason::MalformedPair),
        ("a=120", FieldFormatReason::InvalidNumber),
        ("0=fast", FieldFormatReason::InvalidNumber),
    ] {
        let err = parse_bpm_list(source).unwrap_err();
        assert_eq!(err.field, "BPMS");
        assert_eq!(err.reason, reason, "{source}");
    }
}

#[test]
fn stop_list_entries() {
    assert_eq!(
        parse_stop_list("16=0.5,32.5=1"),
        Ok(vec![
            SmStop {
                beat: 16.0,
                duration: 0.5
            },
            SmStop {
                beat: 32.5,
                duration: 1.0
            },
        ])
    );
    assert_eq!(parse_stop_list("16").unwrap_err().field, "STOPS");
}

#[test]
fn display_bpm_grammars() {
    assert_eq!(
        parse_display_bpm("120:180"),
        Ok(DisplayBpm::Range {
            lower: 120.0,
            upper: 180.0
        })
    );
    assert_eq!(parse_display_bpm("*"), Ok(DisplayBpm::Random));
    assert_eq!(parse_display_bpm("150"), Ok(DisplayBpm::Fixed(150.0)));
    assert_eq!(parse_display_bpm(" 150.5 "), Ok(DisplayBpm::Fixed(150.5)));

    for source in ["abc", "", "120:abc", "1:2:3", "**"] {
        assert!(parse_display_bpm(source).is_err(), "{source:?}");
    }
    assert_eq!(
        parse_display_bpm("1:2:3").map_err(|err| err.reason),
        Err(FieldFormatReason::MalformedDisplayBpm)
    );
}

#[test]
fn chart_segments() {
    let chart = parse_chart("dance-solo:Author:Medium::::").map_err(|err| err.reason);
    assert_eq!(
        chart,
        Err(FieldFormatReason::SegmentCount {
            expected: 6,
            found: 7
        })
    );

    let chart = parse_chart("\n  dance-solo:\n  Author:\n  Medium:\n  :\n  :\n").unwrap();
    assert_eq!(chart.meter, 0);
    assert_eq!(chart.author, "Author");
    assert!(chart.measures.is_empty());
    assert!(chart.groove_radar.is_empty());
}
