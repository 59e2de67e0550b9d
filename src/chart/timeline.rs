//! An ordered collection of objects placed on beats.

use std::ops::{Bound, RangeBounds};

use log::trace;

use super::{
    ChartError, PlacementError,
    notify::{Notifier, Subscription},
    obj::{BeatObject, check_placement},
    value::Beat,
};

/// A change happened on a [`Timeline`].
#[derive(Debug, Clone, PartialEq)]
pub enum TimelineEvent<T> {
    /// The object was inserted.
    Added(T),
    /// The object was removed.
    Removed(T),
    /// The object was updated in place, and possibly moved to another position.
    Changed {
        /// The object before the update.
        previous: T,
        /// The object after the update.
        current: T,
    },
    /// All the objects were removed at once.
    Cleared,
}

/// Objects of one type sorted in strictly ascending order of beat.
///
/// No two objects share a beat, and no object having a length spans over its successor. Every mutation keeps these, or fails and leaves the timeline unchanged.
///
/// Listeners registered with [`Timeline::subscribe`] are called synchronously on every successful mutation. Cloning a timeline copies the objects only.
#[derive(Debug, Clone)]
pub struct Timeline<T> {
    items: Vec<T>,
    notifier: Notifier<TimelineEvent<T>>,
}

impl<T> Default for Timeline<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            notifier: Notifier::new(),
        }
    }
}

/// Objects merged by [`Timeline::merge_batch`], with the indices of the new ones.
#[derive(Debug)]
pub(crate) struct MergedBatch<T> {
    merged: Option<Vec<T>>,
    inserted: Vec<usize>,
}

impl<T> Default for MergedBatch<T> {
    fn default() -> Self {
        Self {
            merged: None,
            inserted: Vec::new(),
        }
    }
}

impl<T: PartialEq> PartialEq for Timeline<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items == other.items
    }
}

impl<T: BeatObject> Timeline<T> {
    /// Creates an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a timeline from objects in any order.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlacementError`] found in `objects`.
    pub fn from_objects(objects: impl IntoIterator<Item = T>) -> Result<Self, PlacementError> {
        let mut timeline = Self::new();
        timeline.add_batch(objects)?;
        Ok(timeline)
    }

    fn position(&self, beat: Beat) -> Result<usize, usize> {
        self.items.binary_search_by_key(&beat, BeatObject::beat)
    }

    /// Inserts `obj` at its sorted position without notification, returning the index.
    fn place(&mut self, obj: T) -> Result<usize, PlacementError> {
        let last = self.items.last();
        if last.is_none_or(|last| last.beat() < obj.beat()) {
            check_placement(last, &obj, None)?;
            self.items.push(obj);
            return Ok(self.items.len() - 1);
        }
        let Err(idx) = self.position(obj.beat()) else {
            return Err(PlacementError::DuplicateBeat { beat: obj.beat() });
        };
        let prev = idx.checked_sub(1).map(|prev| &self.items[prev]);
        check_placement(prev, &obj, self.items.get(idx))?;
        self.items.insert(idx, obj);
        Ok(idx)
    }

    /// Inserts `obj` at its sorted position.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::DuplicateBeat`] if an object is already on the beat of `obj`, or [`PlacementError::Overlap`] if `obj` and a neighbor span over each other. The timeline is unchanged then.
    pub fn add(&mut self, obj: T) -> Result<(), PlacementError> {
        let idx = self.place(obj)?;
        self.notifier
            .emit(&TimelineEvent::Added(self.items[idx].clone()));
        Ok(())
    }

    /// Inserts all of `objects`, same as [`Timeline::add`] for each of them in ascending order of beat.
    ///
    /// The batch is sorted once and then merged through the existing objects with one forward cursor. Either the whole batch is inserted or nothing is, and an [`TimelineEvent::Added`] event is emitted for each object after the whole batch is inserted.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlacementError`] found, including a duplicate beat inside `objects` themselves.
    pub fn add_batch(&mut self, objects: impl IntoIterator<Item = T>) -> Result<(), PlacementError> {
        let batch = self.merge_batch(objects)?;
        self.commit_batch(batch);
        Ok(())
    }

    /// Validates `objects` against this timeline, without modifying it.
    pub(crate) fn merge_batch(
        &self,
        objects: impl IntoIterator<Item = T>,
    ) -> Result<MergedBatch<T>, PlacementError> {
        let mut batch: Vec<T> = objects.into_iter().collect();
        if batch.is_empty() {
            return Ok(MergedBatch::default());
        }
        batch.sort_by_key(BeatObject::beat);

        let mut merged = Vec::with_capacity(self.items.len() + batch.len());
        let mut inserted = Vec::with_capacity(batch.len());
        let mut cursor = 0;
        for obj in batch {
            while let Some(item) = self
                .items
                .get(cursor)
                .filter(|item| item.beat() < obj.beat())
            {
                merged.push(item.clone());
                cursor += 1;
            }
            check_placement(merged.last(), &obj, self.items.get(cursor))?;
            inserted.push(merged.len());
            merged.push(obj);
        }
        merged.extend_from_slice(&self.items[cursor..]);
        trace!(
            "merged {} objects into a timeline of {}",
            inserted.len(),
            self.items.len()
        );
        Ok(MergedBatch {
            merged: Some(merged),
            inserted,
        })
    }

    /// Replaces the objects with a batch from [`Timeline::merge_batch`] on this timeline, which must not have been modified since.
    pub(crate) fn commit_batch(&mut self, batch: MergedBatch<T>) {
        let Some(merged) = batch.merged else {
            return;
        };
        self.items = merged;
        for idx in batch.inserted {
            self.notifier
                .emit(&TimelineEvent::Added(self.items[idx].clone()));
        }
    }

    /// Removes the object on `beat`, returning it if there was.
    pub fn remove(&mut self, beat: Beat) -> Option<T> {
        let idx = self.position(beat).ok()?;
        let removed = self.items.remove(idx);
        self.notifier.emit(&TimelineEvent::Removed(removed.clone()));
        Some(removed)
    }

    /// Removes the object equal to `obj`. Returns whether it was removed.
    pub fn remove_object(&mut self, obj: &T) -> bool {
        if self.get(obj.beat()) != Some(obj) {
            return false;
        }
        self.remove(obj.beat()).is_some()
    }

    /// Removes all the objects, emitting only one [`TimelineEvent::Cleared`] event.
    pub fn clear(&mut self) {
        self.items.clear();
        self.notifier.emit(&TimelineEvent::Cleared);
    }

    /// Updates the object on `beat` in place with `update`, moving it if its beat was changed.
    ///
    /// The update is atomic: if `update` fails or the updated object cannot be placed, the object keeps its old state and position. A [`TimelineEvent::Changed`] event is emitted only when the object was changed. Returns whether it was changed.
    ///
    /// # Errors
    ///
    /// - [`ChartError::NotFound`] if there is no object on `beat`.
    /// - Any error from `update`, such as [`ChartError::ValueRange`].
    /// - [`ChartError::Placement`] if the updated object conflicts with its new neighbors.
    pub fn update<E>(
        &mut self,
        beat: Beat,
        update: impl FnOnce(&mut T) -> Result<(), E>,
    ) -> Result<bool, ChartError>
    where
        ChartError: From<E>,
    {
        let idx = self
            .position(beat)
            .map_err(|_| ChartError::NotFound { beat })?;
        let mut current = self.items[idx].clone();
        update(&mut current)?;
        if current == self.items[idx] {
            return Ok(false);
        }

        let previous = self.items.remove(idx);
        if let Err(err) = self.place(current.clone()) {
            self.items.insert(idx, previous);
            return Err(err.into());
        }
        self.notifier
            .emit(&TimelineEvent::Changed { previous, current });
        Ok(true)
    }

    /// Moves the object on `beat` onto `new_beat`. See [`Timeline::update`] for the failure behavior.
    ///
    /// # Errors
    ///
    /// Same as [`Timeline::update`].
    pub fn update_beat(&mut self, beat: Beat, new_beat: Beat) -> Result<bool, ChartError> {
        self.update(beat, |obj| {
            obj.set_beat(new_beat);
            Ok::<_, ChartError>(())
        })
    }

    /// Gets the object on `beat`.
    #[must_use]
    pub fn get(&self, beat: Beat) -> Option<&T> {
        self.position(beat).ok().map(|idx| &self.items[idx])
    }

    /// Whether an object is on `beat`.
    #[must_use]
    pub fn contains(&self, beat: Beat) -> bool {
        self.position(beat).is_ok()
    }

    /// The objects whose beats are in `range`, in ascending order.
    #[must_use]
    pub fn range(&self, range: impl RangeBounds<Beat>) -> &[T] {
        let start = match range.start_bound() {
            Bound::Included(start) => self.items.partition_point(|item| item.beat() < *start),
            Bound::Excluded(start) => self.items.partition_point(|item| item.beat() <= *start),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(end) => self.items.partition_point(|item| item.beat() <= *end),
            Bound::Excluded(end) => self.items.partition_point(|item| item.beat() < *end),
            Bound::Unbounded => self.items.len(),
        };
        self.items.get(start..end).unwrap_or_default()
    }
}

impl<T> Timeline<T> {
    /// Registers `listener` to be called on every change of this timeline.
    pub fn subscribe(&mut self, listener: impl FnMut(&TimelineEvent<T>) + 'static) -> Subscription {
        self.notifier.subscribe(listener)
    }

    /// Removes the listener registered as `subscription`. Returns whether it was registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.notifier.unsubscribe(subscription)
    }

    /// Iterates the objects in ascending order of beat.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The objects in ascending order of beat.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Copies the objects into a new `Vec`, in ascending order of beat.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.items.clone()
    }

    /// The earliest object.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.items.first()
    }

    /// The latest object.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.items.last()
    }

    /// The number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T> IntoIterator for &'a Timeline<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
