//! Validated scalar types placing objects on a chart.

use thiserror::Error;

/// An error of assigning a value out of the domain of its type.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValueRangeError {
    /// A beat must not be negative.
    #[error("beat cannot be negative: {0}")]
    NegativeBeat(f64),
    /// A length in beats must not be negative.
    #[error("beat duration cannot be negative: {0}")]
    NegativeDuration(f64),
    /// A BPM must be greater than zero.
    #[error("BPM must be greater than zero: {0}")]
    NonPositiveBpm(f64),
    /// A chart must have one key at least.
    #[error("key count must be greater than zero: {0}")]
    ZeroKeyCount(i64),
    /// A key index must not be negative.
    #[error("key index cannot be negative: {0}")]
    NegativeKeyIndex(i64),
    /// A key index must fit in 32 bits.
    #[error("key index is too large: {0}")]
    KeyIndexOverflow(i64),
    /// An elapsed time must not be negative.
    #[error("time cannot be negative: {0}")]
    NegativeTime(f64),
    /// NaN or infinity was given.
    #[error("finite number expected: {0}")]
    NotFinite(f64),
}

fn finite(value: f64) -> Result<f64, ValueRangeError> {
    value
        .is_finite()
        .then_some(value)
        .ok_or(ValueRangeError::NotFinite(value))
}

/// A position on the musical timeline in beats, independent from the tempo. It is finite and not negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
#[repr(transparent)]
pub struct Beat(f64);

impl Beat {
    /// The first beat of a chart.
    pub const ZERO: Self = Self(0.0);

    /// Beats in a measure of 4/4 time, which chart grids assume.
    pub const PER_MEASURE: u32 = 4;

    /// Creates a new beat.
    ///
    /// # Errors
    ///
    /// Returns [`ValueRangeError::NegativeBeat`] if `value` is negative, or [`ValueRangeError::NotFinite`] if it is NaN or infinite.
    pub fn new(value: f64) -> Result<Self, ValueRangeError> {
        let value = finite(value)?;
        if value < 0.0 {
            return Err(ValueRangeError::NegativeBeat(value));
        }
        // normalize -0.0, which would compare as less than 0.0 in `total_cmp`
        Ok(Self(value + 0.0))
    }

    /// Creates a beat on the `n`-th whole beat.
    #[must_use]
    pub const fn whole(n: u32) -> Self {
        Self(n as f64)
    }

    /// Gets the internal value.
    #[inline]
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        self.0
    }

    /// Whether this beat is on the first beat of a measure.
    #[must_use]
    pub fn is_start_of_measure(self) -> bool {
        self.0 % f64::from(Self::PER_MEASURE) == 0.0
    }

    /// Returns the beat `duration` after this one.
    #[must_use]
    pub fn after(self, duration: BeatDuration) -> Self {
        Self(self.0 + duration.0)
    }

    /// Returns the length from `earlier` to this beat, or `None` if `earlier` is after this.
    #[must_use]
    pub fn since(self, earlier: Self) -> Option<BeatDuration> {
        BeatDuration::new(self.0 - earlier.0).ok()
    }
}

impl Eq for Beat {}

impl PartialOrd for Beat {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Beat {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl std::hash::Hash for Beat {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

impl TryFrom<f64> for Beat {
    type Error = ValueRangeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Beat> for f64 {
    fn from(value: Beat) -> Self {
        value.0
    }
}

impl std::fmt::Display for Beat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A length measured in beats. It is finite and not negative.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "f64", into = "f64"))]
#[repr(transparent)]
pub struct BeatDuration(f64);

impl BeatDuration {
    /// Zero length.
    pub const ZERO: Self = Self(0.0);

    /// Creates a new length.
    ///
    /// # Errors
    ///
    /// Returns [`ValueRangeError::NegativeDuration`] if `value` is negative, or [`ValueRangeError::NotFinite`] if it is NaN or infinite.
    pub fn new(value: f64) -> Result<Self, ValueRangeError> {
        let value = finite(value)?;
        if value < 0.0 {
            return Err(ValueRangeError::NegativeDuration(value));
        }
        Ok(Self(value + 0.0))
    }

    /// Gets the internal value.
    #[inline]
    #[must_use]
    pub const fn as_f64(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for BeatDuration {
    type Error = ValueRangeError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BeatDuration> for f64 {
    fn from(value: BeatDuration) -> Self {
        value.0
    }
}

/// An index of the key, or column, where an object is placed. The first key is `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyIndex(pub u32);

impl KeyIndex {
    /// Gets the internal value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Gets the index as `usize` for indexing columns.
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<i64> for KeyIndex {
    type Error = ValueRangeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(ValueRangeError::NegativeKeyIndex(value));
        }
        u32::try_from(value)
            .map(Self)
            .map_err(|_| ValueRangeError::KeyIndexOverflow(value))
    }
}

impl From<u32> for KeyIndex {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for KeyIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The number of keys, or columns, of a chart. It is one at least.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct KeyCount(std::num::NonZeroU32);

impl KeyCount {
    /// Creates a new key count.
    ///
    /// # Errors
    ///
    /// Returns [`ValueRangeError::ZeroKeyCount`] if `count` is zero.
    pub fn new(count: u32) -> Result<Self, ValueRangeError> {
        std::num::NonZeroU32::new(count)
            .map(Self)
            .ok_or(ValueRangeError::ZeroKeyCount(0))
    }

    /// Gets the internal value.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Whether `key` is one of keys in this count.
    #[must_use]
    pub const fn contains(self, key: KeyIndex) -> bool {
        key.0 < self.0.get()
    }

    /// Iterates all the key indices, in ascending order.
    pub fn keys(self) -> impl DoubleEndedIterator<Item = KeyIndex> {
        (0..self.get()).map(KeyIndex)
    }
}

impl TryFrom<i64> for KeyCount {
    type Error = ValueRangeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u32::try_from(value)
            .ok()
            .and_then(std::num::NonZeroU32::new)
            .map(Self)
            .ok_or(ValueRangeError::ZeroKeyCount(value))
    }
}

impl TryFrom<u32> for KeyCount {
    type Error = ValueRangeError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<KeyCount> for u32 {
    fn from(value: KeyCount) -> Self {
        value.get()
    }
}

impl std::fmt::Display for KeyCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
