//! Conversion between beats and elapsed seconds by a BPM schedule.

use super::{
    ChartError,
    obj::{BeatObject, Bpm},
    value::{Beat, ValueRangeError},
};

/// A span of the schedule where the tempo is constant.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    start: Beat,
    start_time: f64,
    bpm: Bpm,
}

impl Segment {
    fn time_at(&self, beat: Beat) -> f64 {
        self.start_time + (beat.as_f64() - self.start.as_f64()) * self.bpm.seconds_per_beat()
    }

    fn beat_at(&self, time: f64) -> f64 {
        self.start.as_f64() + (time - self.start_time) * self.bpm.beats_per_second()
    }
}

/// Converts beats into seconds from the start of a chart, and back.
///
/// The first BPM of the schedule governs from beat zero even if it is placed later, and each following BPM takes effect from its own beat.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeConverter {
    segments: Vec<Segment>,
}

impl TimeConverter {
    /// Creates a converter from BPM changes, precomputing the time where each change takes effect.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::EmptyTempoSchedule`] if `bpms` is empty.
    pub fn new(bpms: &[Bpm]) -> Result<Self, ChartError> {
        let mut sorted = bpms.to_vec();
        sorted.sort_by_key(BeatObject::beat);
        let mut iter = sorted.into_iter();
        let first = iter.next().ok_or(ChartError::EmptyTempoSchedule)?;

        let mut segments = vec![Segment {
            start: Beat::ZERO,
            start_time: 0.0,
            bpm: first,
        }];
        for bpm in iter {
            let start_time = segments
                .last()
                .map_or(0.0, |last| last.time_at(bpm.beat()));
            segments.push(Segment {
                start: bpm.beat(),
                start_time,
                bpm,
            });
        }
        Ok(Self { segments })
    }

    fn segment_by_beat(&self, beat: Beat) -> &Segment {
        let idx = self
            .segments
            .partition_point(|segment| segment.start <= beat)
            .saturating_sub(1);
        &self.segments[idx]
    }

    fn segment_by_time(&self, time: f64) -> &Segment {
        let idx = self
            .segments
            .partition_point(|segment| segment.start_time <= time)
            .saturating_sub(1);
        &self.segments[idx]
    }

    /// The BPM in effect on `beat`.
    #[must_use]
    pub fn bpm_at(&self, beat: Beat) -> &Bpm {
        &self.segment_by_beat(beat).bpm
    }

    /// Seconds elapsed from the start of the chart until `beat`.
    #[must_use]
    pub fn beat_to_time(&self, beat: Beat) -> f64 {
        self.segment_by_beat(beat).time_at(beat)
    }

    /// The beat reached when `time` seconds elapsed from the start of the chart.
    ///
    /// # Errors
    ///
    /// Returns [`ValueRangeError::NegativeTime`] if `time` is negative, or [`ValueRangeError::NotFinite`] if it is NaN or infinite.
    pub fn time_to_beat(&self, time: f64) -> Result<Beat, ValueRangeError> {
        if !time.is_finite() {
            return Err(ValueRangeError::NotFinite(time));
        }
        if time < 0.0 {
            return Err(ValueRangeError::NegativeTime(time));
        }
        Beat::new(self.segment_by_time(time).beat_at(time))
    }

    /// Iterates every whole beat at or after `from_time` seconds, with its time. It starts from beat zero if `from_time` is negative.
    ///
    /// The iterator never ends by itself, so take as many as needed. Call this again to restart from another time.
    #[must_use]
    pub fn beats(&self, from_time: f64) -> BeatLines<'_> {
        let next = if from_time > 0.0 {
            self.first_whole_beat_from(from_time)
        } else {
            Some(0)
        };
        BeatLines {
            converter: self,
            next,
        }
    }

    fn first_whole_beat_from(&self, time: f64) -> Option<u32> {
        if !time.is_finite() {
            return None;
        }
        let estimate = self.segment_by_time(time).beat_at(time).ceil();
        if estimate > f64::from(u32::MAX) {
            return None;
        }
        let mut beat = estimate as u32;
        // rounding error may put the estimate one beat off
        while beat > 0 && self.beat_to_time(Beat::whole(beat - 1)) >= time {
            beat -= 1;
        }
        while self.beat_to_time(Beat::whole(beat)) < time {
            beat = beat.checked_add(1)?;
        }
        Some(beat)
    }
}

/// A whole beat and the seconds when it comes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatTime {
    /// The beat.
    pub beat: Beat,
    /// Seconds from the start of the chart.
    pub time: f64,
}

/// An iterator of beat lines, created by [`TimeConverter::beats`].
#[derive(Debug, Clone)]
pub struct BeatLines<'a> {
    converter: &'a TimeConverter,
    next: Option<u32>,
}

impl Iterator for BeatLines<'_> {
    type Item = BeatTime;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.checked_add(1);
        let beat = Beat::whole(current);
        Some(BeatTime {
            beat,
            time: self.converter.beat_to_time(beat),
        })
    }
}

impl std::iter::FusedIterator for BeatLines<'_> {}
