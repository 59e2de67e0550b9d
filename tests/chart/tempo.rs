use openchart_rs::prelude::*;

use super::{assert_close, beat, bpm};

fn chart_with(bpms: &[Bpm]) -> Chart {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart.add_bpms(bpms.iter().copied()).unwrap();
    chart
}

#[test]
fn chart_without_bpm_has_no_converter() {
    let chart = Chart::new(KeyCount::new(4).unwrap());
    assert_eq!(chart.time_converter(), Err(ChartError::EmptyTempoSchedule));
}

#[test]
fn piecewise_schedule() {
    // 4 beats at 120, 4 beats at 240, then 60
    let chart = chart_with(&[bpm(120.0, 0.0), bpm(240.0, 4.0), bpm(60.0, 8.0)]);
    let converter = chart.time_converter().unwrap();

    assert_close(0.0, converter.beat_to_time(beat(0.0)), "start");
    assert_close(2.0, converter.beat_to_time(beat(4.0)), "first change");
    assert_close(2.5, converter.beat_to_time(beat(6.0)), "inside the fast part");
    assert_close(3.0, converter.beat_to_time(beat(8.0)), "second change");
    assert_close(5.0, converter.beat_to_time(beat(10.0)), "slow part");

    for time in [0.0, 0.75, 2.0, 2.5, 3.0, 4.2, 100.0] {
        let beat = converter.time_to_beat(time).unwrap();
        assert_close(time, converter.beat_to_time(beat), "round trip");
    }
    assert_eq!(converter.bpm_at(beat(5.0)).value(), 240.0);
}

#[test]
fn later_bpm_change_is_picked_up() {
    let mut chart = chart_with(&[bpm(120.0, 0.0)]);
    chart.add_bpm(bpm(60.0, 4.0)).unwrap();
    let converter = chart.time_converter().unwrap();
    assert_close(4.0, converter.beat_to_time(beat(6.0)), "after the change");
}

#[test]
fn beat_lines_follow_tempo() {
    let chart = chart_with(&[bpm(60.0, 0.0), bpm(120.0, 2.0)]);
    let converter = chart.time_converter().unwrap();

    let lines: Vec<_> = converter.beats(1.5).take(4).collect();
    let beats: Vec<f64> = lines.iter().map(|line| line.beat.as_f64()).collect();
    assert_eq!(beats, vec![2.0, 3.0, 4.0, 5.0]);
    for (line, expected) in lines.iter().zip([2.0, 2.5, 3.0, 3.5]) {
        assert_close(expected, line.time, "beat line time");
    }
    assert!(lines.iter().any(|line| line.beat.is_start_of_measure()));

    let from_start: Vec<_> = converter.beats(-3.0).take(2).map(|line| line.beat).collect();
    assert_eq!(from_start, vec![Beat::ZERO, Beat::whole(1)]);
}

#[test]
fn negative_time_is_rejected() {
    let converter = TimeConverter::new(&[bpm(120.0, 0.0)]).unwrap();
    assert_eq!(
        converter.time_to_beat(-1.0),
        Err(ValueRangeError::NegativeTime(-1.0))
    );
    assert!(converter.time_to_beat(f64::NAN).is_err());
}

#[cfg(feature = "serde")]
#[test]
fn deserialized_bpm_is_validated() {
    assert!(serde_json::from_str::<Bpm>(r#"{"value":0.0,"beat":0.0}"#).is_err());
    assert!(serde_json::from_str::<Bpm>(r#"{"value":-1.0,"beat":0.0}"#).is_err());

    let bpm: Bpm = serde_json::from_str(r#"{"value":60.0,"beat":0.0}"#).unwrap();
    let converter = chart_with(&[bpm]).time_converter().unwrap();
    assert_close(1.0, converter.beat_to_time(beat(1.0)), "one beat at 60 BPM");
}
