//! The chart model: BPM changes and objects placed on keys.
//!
//! A [`Chart`] owns a [`Timeline`] of [`Bpm`]s shared by all keys, and one [`Timeline`] of [`ChartObject`]s for each key. Both of them keep their objects sorted and validated, see [`timeline`] for the rules.
//!
//! Every mutation is notified synchronously to the listeners of the mutated timeline, and to the listeners of the whole chart registered with [`Chart::subscribe`]. The timelines are edited only through the methods of [`Chart`], so they stay attached to those listeners.

pub mod notify;
pub mod obj;
pub mod tempo;
pub mod timeline;
pub mod value;

use std::{cell::RefCell, rc::Rc};

use thiserror::Error;

use self::{
    notify::Subscription,
    obj::{Bpm, ChartObject},
    tempo::TimeConverter,
    timeline::{Timeline, TimelineEvent},
    value::{Beat, KeyCount, KeyIndex, ValueRangeError},
};

/// An error of placing an object on a timeline.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum PlacementError {
    /// Another object is already on the beat.
    #[error("another object is already placed on beat {beat}")]
    DuplicateBeat {
        /// The conflicting beat.
        beat: Beat,
    },
    /// A hold spans over its neighbor.
    #[error("object on beat {beat} overlaps its neighbor on beat {neighbor}")]
    Overlap {
        /// The beat of the object being placed.
        beat: Beat,
        /// The beat of the neighbor overlapped.
        neighbor: Beat,
    },
    /// The key of the object does not exist in the chart.
    #[error("key {key} is out of range for {key_count} keys")]
    KeyIndexOutOfRange {
        /// The key of the object.
        key: KeyIndex,
        /// The number of keys of the chart.
        key_count: KeyCount,
    },
}

/// An error of modifying a chart.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ChartError {
    /// A value was out of its domain.
    #[error(transparent)]
    ValueRange(#[from] ValueRangeError),
    /// An object could not be placed.
    #[error(transparent)]
    Placement(#[from] PlacementError),
    /// No object was on the beat to update.
    #[error("no object is placed on beat {beat}")]
    NotFound {
        /// The beat looked up.
        beat: Beat,
    },
    /// An update tried to move an object to another key.
    #[error("object on key {expected} cannot be moved to key {actual}")]
    KeyChanged {
        /// The key where the object is.
        expected: KeyIndex,
        /// The key the update assigned.
        actual: KeyIndex,
    },
    /// Shrinking the key count would drop objects.
    #[error("key {key} still has objects")]
    ColumnNotEmpty {
        /// The first key having objects to be dropped.
        key: KeyIndex,
    },
    /// The chart has no BPM to convert beats into time.
    #[error("tempo schedule has no BPM")]
    EmptyTempoSchedule,
}

/// A change happened on a [`Chart`].
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// The BPM timeline changed.
    Bpm(TimelineEvent<Bpm>),
    /// The timeline on `key` changed.
    Object {
        /// The key of the timeline.
        key: KeyIndex,
        /// What changed.
        event: TimelineEvent<ChartObject>,
    },
    /// The number of keys changed.
    KeyCountChanged {
        /// The count before.
        previous: KeyCount,
        /// The count after.
        current: KeyCount,
    },
}

/// A token of a listener registered with [`Chart::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartSubscription(u64);

type SharedListener = Rc<RefCell<dyn FnMut(&ChartEvent)>>;

/// A chart listener and its registrations on each timeline.
struct BusListener {
    id: ChartSubscription,
    callback: SharedListener,
    bpm: Subscription,
    keys: Vec<Subscription>,
}

fn forward_bpm(callback: &SharedListener) -> impl FnMut(&TimelineEvent<Bpm>) + 'static {
    let callback = Rc::clone(callback);
    move |event| (*callback.borrow_mut())(&ChartEvent::Bpm(event.clone()))
}

fn forward_object(
    callback: &SharedListener,
    key: KeyIndex,
) -> impl FnMut(&TimelineEvent<ChartObject>) + 'static {
    let callback = Rc::clone(callback);
    move |event| {
        (*callback.borrow_mut())(&ChartEvent::Object {
            key,
            event: event.clone(),
        });
    }
}

/// One playable arrangement of a song, with a fixed number of keys.
pub struct Chart {
    key_count: KeyCount,
    bpms: Timeline<Bpm>,
    columns: Vec<Timeline<ChartObject>>,
    /// Who made the chart.
    pub author: String,
    /// The name of the chart, usually its difficulty.
    pub chart_name: String,
    listeners: Vec<BusListener>,
    next_listener: u64,
}

impl Chart {
    /// Creates an empty chart with `key_count` keys.
    #[must_use]
    pub fn new(key_count: KeyCount) -> Self {
        Self {
            key_count,
            bpms: Timeline::new(),
            columns: key_count.keys().map(|_| Timeline::new()).collect(),
            author: String::new(),
            chart_name: String::new(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    /// The number of keys.
    #[must_use]
    pub const fn key_count(&self) -> KeyCount {
        self.key_count
    }

    /// Changes the number of keys. Returns whether it was changed.
    ///
    /// New keys start empty. [`ChartEvent::KeyCountChanged`] is emitted only if the count was changed.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::ColumnNotEmpty`] if a key to be dropped still has objects. The chart is unchanged then.
    pub fn set_key_count(&mut self, key_count: KeyCount) -> Result<bool, ChartError> {
        let previous = self.key_count;
        if previous == key_count {
            return Ok(false);
        }
        let kept = key_count.get() as usize;
        if let Some(key) = self
            .columns
            .iter()
            .enumerate()
            .skip(kept)
            .find_map(|(key, column)| (!column.is_empty()).then_some(key))
        {
            return Err(ChartError::ColumnNotEmpty {
                key: KeyIndex(key as u32),
            });
        }

        self.columns.truncate(kept);
        for listener in &mut self.listeners {
            listener.keys.truncate(kept);
        }
        for key in key_count.keys().skip(self.columns.len()) {
            let mut column = Timeline::new();
            for listener in &mut self.listeners {
                listener
                    .keys
                    .push(column.subscribe(forward_object(&listener.callback, key)));
            }
            self.columns.push(column);
        }
        self.key_count = key_count;

        let event = ChartEvent::KeyCountChanged {
            previous,
            current: key_count,
        };
        for listener in &self.listeners {
            (*listener.callback.borrow_mut())(&event);
        }
        Ok(true)
    }

    /// The BPM changes.
    #[must_use]
    pub const fn bpms(&self) -> &Timeline<Bpm> {
        &self.bpms
    }

    /// Places a BPM change, with [`Timeline::add`].
    ///
    /// # Errors
    ///
    /// Same as [`Timeline::add`].
    pub fn add_bpm(&mut self, bpm: Bpm) -> Result<(), PlacementError> {
        self.bpms.add(bpm)
    }

    /// Places all of `bpms` at once, with [`Timeline::add_batch`].
    ///
    /// # Errors
    ///
    /// Same as [`Timeline::add_batch`].
    pub fn add_bpms(&mut self, bpms: impl IntoIterator<Item = Bpm>) -> Result<(), PlacementError> {
        self.bpms.add_batch(bpms)
    }

    /// Removes the BPM change on `beat`, returning it if there was.
    pub fn remove_bpm(&mut self, beat: Beat) -> Option<Bpm> {
        self.bpms.remove(beat)
    }

    /// Updates the BPM change on `beat` in place, with [`Timeline::update`].
    ///
    /// # Errors
    ///
    /// Same as [`Timeline::update`].
    pub fn update_bpm<E>(
        &mut self,
        beat: Beat,
        update: impl FnOnce(&mut Bpm) -> Result<(), E>,
    ) -> Result<bool, ChartError>
    where
        ChartError: From<E>,
    {
        self.bpms.update(beat, update)
    }

    /// Removes all the BPM changes.
    pub fn clear_bpms(&mut self) {
        self.bpms.clear();
    }

    /// The objects on `key`, or `None` if the key does not exist.
    #[must_use]
    pub fn objects(&self, key: KeyIndex) -> Option<&Timeline<ChartObject>> {
        self.columns.get(key.as_usize())
    }

    /// The timelines of all the keys, in order of key.
    #[must_use]
    pub fn columns(&self) -> &[Timeline<ChartObject>] {
        &self.columns
    }

    /// Iterates all the objects, in order of key and then beat.
    pub fn iter_objects(&self) -> impl Iterator<Item = &ChartObject> {
        self.columns.iter().flatten()
    }

    /// The number of objects on all the keys.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.columns.iter().map(Timeline::len).sum()
    }

    fn column_mut(&mut self, key: KeyIndex) -> Result<&mut Timeline<ChartObject>, PlacementError> {
        let key_count = self.key_count;
        self.columns
            .get_mut(key.as_usize())
            .ok_or(PlacementError::KeyIndexOutOfRange { key, key_count })
    }

    /// Places `obj` on its key.
    ///
    /// # Errors
    ///
    /// Returns [`PlacementError::KeyIndexOutOfRange`] if the key of `obj` does not exist, or any error of [`Timeline::add`].
    pub fn add_object(&mut self, obj: ChartObject) -> Result<(), PlacementError> {
        self.column_mut(obj.key())?.add(obj)
    }

    /// Places all of `objects` on their keys, with [`Timeline::add_batch`] for each key.
    ///
    /// Either all of them are placed or nothing is.
    ///
    /// # Errors
    ///
    /// Returns the first [`PlacementError`] found.
    pub fn add_objects(
        &mut self,
        objects: impl IntoIterator<Item = ChartObject>,
    ) -> Result<(), PlacementError> {
        let mut by_key: Vec<Vec<ChartObject>> = vec![Vec::new(); self.columns.len()];
        for obj in objects {
            let key = obj.key();
            by_key
                .get_mut(key.as_usize())
                .ok_or(PlacementError::KeyIndexOutOfRange {
                    key,
                    key_count: self.key_count,
                })?
                .push(obj);
        }
        let merged = self
            .columns
            .iter()
            .zip(by_key)
            .map(|(column, batch)| column.merge_batch(batch))
            .collect::<Result<Vec<_>, _>>()?;
        for (column, batch) in self.columns.iter_mut().zip(merged) {
            column.commit_batch(batch);
        }
        Ok(())
    }

    /// Removes the object equal to `obj`. Returns whether it was removed.
    pub fn remove_object(&mut self, obj: &ChartObject) -> bool {
        self.columns
            .get_mut(obj.key().as_usize())
            .is_some_and(|column| column.remove_object(obj))
    }

    /// Removes the object on `beat` of `key`, returning it if there was.
    pub fn remove_at(&mut self, key: KeyIndex, beat: Beat) -> Option<ChartObject> {
        self.columns.get_mut(key.as_usize())?.remove(beat)
    }

    /// Updates the object on `beat` of `key` in place, with [`Timeline::update`]. The update must not change the key.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::KeyChanged`] if `update` changed the key, [`ChartError::Placement`] if `key` does not exist, or any error of [`Timeline::update`].
    pub fn update_object<E>(
        &mut self,
        key: KeyIndex,
        beat: Beat,
        update: impl FnOnce(&mut ChartObject) -> Result<(), E>,
    ) -> Result<bool, ChartError>
    where
        ChartError: From<E>,
    {
        self.column_mut(key)?.update::<ChartError>(beat, |obj| {
            update(obj).map_err(ChartError::from)?;
            if obj.key() != key {
                return Err(ChartError::KeyChanged {
                    expected: key,
                    actual: obj.key(),
                });
            }
            Ok(())
        })
    }

    /// Moves the object on `beat` of `key` onto `new_beat`.
    ///
    /// # Errors
    ///
    /// Same as [`Chart::update_object`].
    pub fn move_object(
        &mut self,
        key: KeyIndex,
        beat: Beat,
        new_beat: Beat,
    ) -> Result<bool, ChartError> {
        self.column_mut(key)?.update_beat(beat, new_beat)
    }

    /// Creates a converter between beats and time by the current BPM changes.
    ///
    /// # Errors
    ///
    /// Returns [`ChartError::EmptyTempoSchedule`] if there are no BPM changes.
    pub fn time_converter(&self) -> Result<TimeConverter, ChartError> {
        TimeConverter::new(self.bpms.as_slice())
    }

    /// Registers `listener` to be called on every change of this chart, including keys added later.
    pub fn subscribe(&mut self, listener: impl FnMut(&ChartEvent) + 'static) -> ChartSubscription {
        let id = ChartSubscription(self.next_listener);
        self.next_listener += 1;
        let callback: SharedListener = Rc::new(RefCell::new(listener));
        let bpm = self.bpms.subscribe(forward_bpm(&callback));
        let keys = self
            .key_count
            .keys()
            .zip(&mut self.columns)
            .map(|(key, column)| column.subscribe(forward_object(&callback, key)))
            .collect();
        self.listeners.push(BusListener {
            id,
            callback,
            bpm,
            keys,
        });
        id
    }

    /// Removes the listener registered as `subscription` from the chart and all of its timelines. Returns whether it was registered.
    pub fn unsubscribe(&mut self, subscription: ChartSubscription) -> bool {
        let Some(idx) = self.listeners.iter().position(|l| l.id == subscription) else {
            return false;
        };
        let listener = self.listeners.remove(idx);
        self.bpms.unsubscribe(listener.bpm);
        for (column, key_subscription) in self.columns.iter_mut().zip(listener.keys) {
            column.unsubscribe(key_subscription);
        }
        true
    }
}

/// Copies the key count, objects and metadata. Listeners are not copied.
impl Clone for Chart {
    fn clone(&self) -> Self {
        Self {
            key_count: self.key_count,
            bpms: self.bpms.clone(),
            columns: self.columns.clone(),
            author: self.author.clone(),
            chart_name: self.chart_name.clone(),
            listeners: Vec::new(),
            next_listener: 0,
        }
    }
}

impl PartialEq for Chart {
    fn eq(&self, other: &Self) -> bool {
        self.key_count == other.key_count
            && self.bpms == other.bpms
            && self.columns == other.columns
            && self.author == other.author
            && self.chart_name == other.chart_name
    }
}

impl std::fmt::Debug for Chart {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chart")
            .field("key_count", &self.key_count)
            .field("bpms", &self.bpms)
            .field("columns", &self.columns)
            .field("author", &self.author)
            .field("chart_name", &self.chart_name)
            .finish_non_exhaustive()
    }
}
