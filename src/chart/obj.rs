//! Definitions of the objects placed on a chart timeline.

use super::{
    PlacementError,
    value::{Beat, BeatDuration, KeyIndex, ValueRangeError},
};

/// An object placed on a beat of a [`super::timeline::Timeline`].
pub trait BeatObject: Clone + PartialEq {
    /// The beat where the object is placed.
    fn beat(&self) -> Beat;

    /// Moves the object onto `beat`.
    fn set_beat(&mut self, beat: Beat);

    /// The length of the object if it spans over some beats. Objects having a length occupy `[beat, beat + length)`.
    fn length(&self) -> Option<BeatDuration> {
        None
    }
}

/// Checks whether `obj` can be placed between its neighbors `prev` and `next` on the same timeline.
///
/// # Errors
///
/// Returns [`PlacementError::DuplicateBeat`] if a neighbor is on the same beat, or [`PlacementError::Overlap`] if the span of `prev` reaches `obj` or the span of `obj` reaches `next`.
pub fn check_placement<T: BeatObject>(
    prev: Option<&T>,
    obj: &T,
    next: Option<&T>,
) -> Result<(), PlacementError> {
    let beat = obj.beat();
    if let Some(neighbor) = prev.into_iter().chain(next).find(|n| n.beat() == beat) {
        return Err(PlacementError::DuplicateBeat {
            beat: neighbor.beat(),
        });
    }
    if let Some(prev) = prev.filter(|prev| spans_over(*prev, beat)) {
        return Err(PlacementError::Overlap {
            beat,
            neighbor: prev.beat(),
        });
    }
    if let Some(next) = next.filter(|next| spans_over(obj, next.beat())) {
        return Err(PlacementError::Overlap {
            beat,
            neighbor: next.beat(),
        });
    }
    Ok(())
}

fn spans_over<T: BeatObject>(obj: &T, beat: Beat) -> bool {
    obj.length()
        .is_some_and(|length| obj.beat() <= beat && beat < obj.beat().after(length))
}

/// A change of the tempo in beats per minute.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "BpmRepr"))]
pub struct Bpm {
    value: f64,
    beat: Beat,
}

/// Unvalidated fields of [`Bpm`], to be checked by [`Bpm::new`] on deserialization.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct BpmRepr {
    value: f64,
    beat: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<BpmRepr> for Bpm {
    type Error = ValueRangeError;

    fn try_from(repr: BpmRepr) -> Result<Self, Self::Error> {
        Self::new(repr.value, repr.beat)
    }
}

impl Bpm {
    /// Creates a new BPM change of `value` beats per minute, taking effect at `beat`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueRangeError::NonPositiveBpm`] if `value` is not greater than zero, or any error of [`Beat::new`] for `beat`.
    pub fn new(value: f64, beat: f64) -> Result<Self, ValueRangeError> {
        Ok(Self {
            value: Self::validate(value)?,
            beat: Beat::new(beat)?,
        })
    }

    /// Creates a new BPM change at the validated `beat`.
    ///
    /// # Errors
    ///
    /// Returns [`ValueRangeError::NonPositiveBpm`] if `value` is not greater than zero.
    pub fn at(value: f64, beat: Beat) -> Result<Self, ValueRangeError> {
        Ok(Self {
            value: Self::validate(value)?,
            beat,
        })
    }

    fn validate(value: f64) -> Result<f64, ValueRangeError> {
        if !value.is_finite() {
            return Err(ValueRangeError::NotFinite(value));
        }
        if value <= 0.0 {
            return Err(ValueRangeError::NonPositiveBpm(value));
        }
        Ok(value)
    }

    /// Beats per minute. Most songs are somewhere in the range of 120 to 200.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Sets the beats per minute. Returns whether the value was changed.
    ///
    /// # Errors
    ///
    /// Returns [`ValueRangeError::NonPositiveBpm`] if `value` is not greater than zero. The value is not changed then.
    pub fn set_value(&mut self, value: f64) -> Result<bool, ValueRangeError> {
        let value = Self::validate(value)?;
        let changed = self.value.to_bits() != value.to_bits();
        self.value = value;
        Ok(changed)
    }

    /// The number of beats in one second.
    #[must_use]
    pub fn beats_per_second(&self) -> f64 {
        self.value / 60.0
    }

    /// The length of one beat in seconds.
    #[must_use]
    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.value
    }
}

impl BeatObject for Bpm {
    fn beat(&self) -> Beat {
        self.beat
    }

    fn set_beat(&mut self, beat: Beat) {
        self.beat = beat;
    }
}

/// A note to be hit once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TapNote {
    /// The key where the note is placed.
    pub key: KeyIndex,
    /// The beat where the note is placed.
    pub beat: Beat,
}

/// A note to be held down from its beat for its length.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HoldNote {
    /// The key where the note is placed.
    pub key: KeyIndex,
    /// The beat where holding starts.
    pub beat: Beat,
    /// How long to hold.
    pub length: BeatDuration,
}

impl HoldNote {
    /// The beat where holding ends.
    #[must_use]
    pub fn end(&self) -> Beat {
        self.beat.after(self.length)
    }
}

/// An object which a player interacts with.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ChartObject {
    /// See [`TapNote`].
    Tap(TapNote),
    /// See [`HoldNote`].
    Hold(HoldNote),
}

impl ChartObject {
    /// Creates a tap note.
    #[must_use]
    pub const fn tap(key: KeyIndex, beat: Beat) -> Self {
        Self::Tap(TapNote { key, beat })
    }

    /// Creates a hold note.
    #[must_use]
    pub const fn hold(key: KeyIndex, beat: Beat, length: BeatDuration) -> Self {
        Self::Hold(HoldNote { key, beat, length })
    }

    /// The key where the object is placed.
    #[must_use]
    pub const fn key(&self) -> KeyIndex {
        match self {
            Self::Tap(tap) => tap.key,
            Self::Hold(hold) => hold.key,
        }
    }
}

impl BeatObject for ChartObject {
    fn beat(&self) -> Beat {
        match self {
            Self::Tap(tap) => tap.beat,
            Self::Hold(hold) => hold.beat,
        }
    }

    fn set_beat(&mut self, beat: Beat) {
        match self {
            Self::Tap(tap) => tap.beat = beat,
            Self::Hold(hold) => hold.beat = beat,
        }
    }

    fn length(&self) -> Option<BeatDuration> {
        match self {
            Self::Tap(_) => None,
            Self::Hold(hold) => Some(hold.length),
        }
    }
}

impl From<TapNote> for ChartObject {
    fn from(value: TapNote) -> Self {
        Self::Tap(value)
    }
}

impl From<HoldNote> for ChartObject {
    fn from(value: HoldNote) -> Self {
        Self::Hold(value)
    }
}
