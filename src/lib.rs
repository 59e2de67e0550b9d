//! The chart data core of a rhythm game chart editor.
//!
//! A chart is modeled as an ordered, validated timeline of events placed on beats: BPM changes shared by the whole chart, and playable objects placed on each key (column). This crate provides that model and converts it from/into chart files.
//!
//! - [`chart`] provides the value types ([`chart::value::Beat`], [`chart::value::KeyCount`], ...), the beat-ordered [`chart::timeline::Timeline`] with its placement checks and change events, the [`chart::Chart`] aggregate and the beat/time conversion in [`chart::tempo`].
//! - [`project`] bundles charts with the song metadata.
//! - [`format`] defines how a file format plugs in: a serializer between raw bytes and a format-specific data object, and a converter between that data object and [`project::Project`].
//! - [`openchart`] is the native JSON format, and [`sm`] is the legacy StepMania `.sm` format.
//!
//! In detail, our policies are:
//!
//! - Invalid values are rejected where they are assigned, never clamped.
//! - Mutations of a collection are atomic: a rejected insertion or update leaves it unchanged.
//! - Events are dispatched synchronously on the mutating thread. Nothing in this crate is thread-safe by itself.
//! - Only UTF-8 input is supported.
//!
//! # Example
//!
//! ```
//! use openchart_rs::prelude::*;
//!
//! let source = "#TITLE:Song;#BPMS:0=120;#NOTES:dance-single:me:Easy:1::1000,0000;";
//! let project = SmFormat::default().load(source.as_bytes()).unwrap();
//! let chart = &project.charts[0];
//! assert_eq!(chart.key_count().get(), 4);
//!
//! let converter = chart.time_converter().unwrap();
//! assert_eq!(converter.beat_to_time(Beat::whole(4)), 2.0);
//! ```

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod chart;
#[cfg(feature = "diagnostics")]
pub mod diagnostics;
pub mod format;
#[cfg(feature = "openchart")]
pub mod openchart;
pub mod prelude;
pub mod project;
pub mod sm;
