use std::{cell::RefCell, rc::Rc};

use openchart_rs::prelude::*;
use pretty_assertions::assert_eq;

use super::{beat, bpm, hold, tap};

fn recorder(chart: &mut Chart) -> (Rc<RefCell<Vec<ChartEvent>>>, ChartSubscription) {
    let events = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&events);
    let subscription = chart.subscribe(move |event| log.borrow_mut().push(event.clone()));
    (events, subscription)
}

#[test]
fn key_count_notification() {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    let (events, _) = recorder(&mut chart);

    assert_eq!(chart.set_key_count(KeyCount::new(4).unwrap()), Ok(false));
    assert!(events.borrow().is_empty());

    assert_eq!(chart.set_key_count(KeyCount::new(7).unwrap()), Ok(true));
    assert_eq!(chart.columns().len(), 7);
    assert_eq!(
        *events.borrow(),
        vec![ChartEvent::KeyCountChanged {
            previous: KeyCount::new(4).unwrap(),
            current: KeyCount::new(7).unwrap(),
        }]
    );
}

#[test]
fn shrinking_keeps_objects() {
    let mut chart = Chart::new(KeyCount::new(6).unwrap());
    chart.add_object(tap(5, 0.0)).unwrap();
    assert_eq!(
        chart.set_key_count(KeyCount::new(4).unwrap()),
        Err(ChartError::ColumnNotEmpty { key: KeyIndex(5) })
    );
    assert_eq!(chart.key_count().get(), 6);

    assert!(chart.remove_object(&tap(5, 0.0)));
    assert_eq!(chart.set_key_count(KeyCount::new(4).unwrap()), Ok(true));
    assert_eq!(chart.objects(KeyIndex(5)), None);
}

#[test]
fn objects_go_to_their_keys() {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart
        .add_objects([tap(0, 1.0), tap(3, 0.0), hold(0, 2.0, 1.0), tap(3, 0.5)])
        .unwrap();
    assert_eq!(chart.object_count(), 4);
    assert_eq!(
        chart.objects(KeyIndex(0)).unwrap().to_vec(),
        vec![tap(0, 1.0), hold(0, 2.0, 1.0)]
    );
    assert_eq!(chart.objects(KeyIndex(1)).map(Timeline::len), Some(0));

    assert_eq!(
        chart.add_object(tap(4, 0.0)),
        Err(PlacementError::KeyIndexOutOfRange {
            key: KeyIndex(4),
            key_count: KeyCount::new(4).unwrap(),
        })
    );
}

#[test]
fn batch_across_keys_is_atomic() {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart.add_object(hold(2, 0.0, 4.0)).unwrap();
    let result = chart.add_objects([tap(0, 0.0), tap(1, 1.0), tap(2, 1.0)]);
    assert_eq!(
        result,
        Err(PlacementError::Overlap {
            beat: beat(1.0),
            neighbor: beat(0.0),
        })
    );
    assert_eq!(chart.object_count(), 1);
}

#[test]
fn updates_stay_on_their_key() {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart.add_objects([tap(1, 0.0), tap(1, 2.0)]).unwrap();

    assert_eq!(chart.move_object(KeyIndex(1), beat(0.0), beat(3.0)), Ok(true));
    assert_eq!(
        chart.update_object(KeyIndex(1), beat(2.0), |obj| {
            *obj = tap(2, 2.0);
            Ok::<_, ChartError>(())
        }),
        Err(ChartError::KeyChanged {
            expected: KeyIndex(1),
            actual: KeyIndex(2),
        })
    );
    assert_eq!(
        chart.objects(KeyIndex(1)).unwrap().to_vec(),
        vec![tap(1, 2.0), tap(1, 3.0)]
    );
    assert_eq!(chart.remove_at(KeyIndex(1), beat(3.0)), Some(tap(1, 3.0)));
}

#[test]
fn bus_forwards_every_timeline() {
    let mut chart = Chart::new(KeyCount::new(2).unwrap());
    let (events, subscription) = recorder(&mut chart);

    chart.add_bpm(bpm(150.0, 0.0)).unwrap();
    chart.add_object(tap(1, 0.0)).unwrap();
    chart.set_key_count(KeyCount::new(3).unwrap()).unwrap();
    chart.add_object(tap(2, 1.0)).unwrap();
    assert_eq!(
        *events.borrow(),
        vec![
            ChartEvent::Bpm(TimelineEvent::Added(bpm(150.0, 0.0))),
            ChartEvent::Object {
                key: KeyIndex(1),
                event: TimelineEvent::Added(tap(1, 0.0)),
            },
            ChartEvent::KeyCountChanged {
                previous: KeyCount::new(2).unwrap(),
                current: KeyCount::new(3).unwrap(),
            },
            ChartEvent::Object {
                key: KeyIndex(2),
                event: TimelineEvent::Added(tap(2, 1.0)),
            },
        ]
    );

    assert!(chart.unsubscribe(subscription));
    assert!(!chart.unsubscribe(subscription));
    chart.add_object(tap(0, 0.0)).unwrap();
    assert_eq!(events.borrow().len(), 4);
}

#[test]
fn clone_drops_listeners() {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart.author = "someone".into();
    chart.add_object(tap(0, 0.0)).unwrap();
    let (events, _) = recorder(&mut chart);

    let mut copy = chart.clone();
    assert_eq!(copy, chart);
    copy.add_object(tap(0, 1.0)).unwrap();
    assert!(events.borrow().is_empty());
    assert_ne!(copy, chart);
}

#[test]
fn bpm_edits_reach_listeners() {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    let (events, _) = recorder(&mut chart);

    chart.add_bpms([bpm(120.0, 0.0), bpm(180.0, 8.0)]).unwrap();
    assert_eq!(
        chart.update_bpm(beat(8.0), |bpm| bpm.set_value(90.0).map(drop)),
        Ok(true)
    );
    assert_eq!(
        chart.update_bpm(beat(0.0), |bpm| bpm.set_value(0.0).map(drop)),
        Err(ChartError::ValueRange(ValueRangeError::NonPositiveBpm(0.0)))
    );
    assert_eq!(chart.remove_bpm(beat(8.0)), Some(bpm(90.0, 8.0)));
    chart.clear_bpms();
    chart.add_bpm(bpm(60.0, 0.0)).unwrap();

    assert_eq!(
        *events.borrow(),
        vec![
            ChartEvent::Bpm(TimelineEvent::Added(bpm(120.0, 0.0))),
            ChartEvent::Bpm(TimelineEvent::Added(bpm(180.0, 8.0))),
            ChartEvent::Bpm(TimelineEvent::Changed {
                previous: bpm(180.0, 8.0),
                current: bpm(90.0, 8.0),
            }),
            ChartEvent::Bpm(TimelineEvent::Removed(bpm(90.0, 8.0))),
            ChartEvent::Bpm(TimelineEvent::Cleared),
            ChartEvent::Bpm(TimelineEvent::Added(bpm(60.0, 0.0))),
        ]
    );
    assert_eq!(chart.bpms().to_vec(), vec![bpm(60.0, 0.0)]);
}

#[test]
fn object_update_errors_pass_through() {
    let mut chart = Chart::new(KeyCount::new(4).unwrap());
    chart.add_object(hold(0, 0.0, 1.0)).unwrap();

    assert_eq!(
        chart.update_object(KeyIndex(0), beat(0.0), |obj| {
            if let ChartObject::Hold(hold) = obj {
                hold.length = BeatDuration::new(-1.0)?;
            }
            Ok::<_, ValueRangeError>(())
        }),
        Err(ChartError::ValueRange(ValueRangeError::NegativeDuration(-1.0)))
    );
    assert_eq!(
        chart.update_object(KeyIndex(0), beat(0.0), |obj| {
            if let ChartObject::Hold(hold) = obj {
                hold.length = BeatDuration::new(2.0)?;
            }
            Ok::<_, ValueRangeError>(())
        }),
        Ok(true)
    );
    assert_eq!(chart.iter_objects().next(), Some(&hold(0, 0.0, 2.0)));
    assert_eq!(
        chart.update_object(KeyIndex(0), beat(5.0), |_| Ok::<_, ChartError>(())),
        Err(ChartError::NotFound { beat: beat(5.0) })
    );
}
